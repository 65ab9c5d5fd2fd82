//! Batch lookup of [`Agent`]s.

use std::{
    collections::{HashMap, HashSet},
    fmt,
    future::Future,
};

use futures::{stream::FuturesUnordered, FutureExt as _, StreamExt as _};

use crate::frontend::{Agent, Property};

/// Fetches the [`Agent`]s with the provided `ids` concurrently.
///
/// Duplicated IDs are fetched once. An [`Agent`] failing to be fetched is
/// logged and substituted with an [`Agent::placeholder()`].
pub async fn fetch_all<F, Fut, E>(
    ids: impl IntoIterator<Item = i64>,
    fetch: F,
) -> HashMap<i64, Agent>
where
    F: Fn(i64) -> Fut,
    Fut: Future<Output = Result<Agent, E>>,
    E: fmt::Display,
{
    let mut seen = HashSet::new();
    ids.into_iter()
        .filter(|id| seen.insert(*id))
        .map(|id| fetch(id).map(move |res| (id, res)))
        .collect::<FuturesUnordered<_>>()
        .map(|(id, res)| {
            let agent = res.unwrap_or_else(|e| {
                tracing::warn!("failed to fetch agent #{id}: {e}");
                Agent::placeholder(id)
            });
            (id, agent)
        })
        .collect()
        .await
}

/// Attaches the [`Agent`]s out of the provided map to the [`Property`]
/// listings handled by them.
///
/// Embedded [`Agent`]s carrying real details are kept untouched.
pub fn attach(properties: &mut [Property], agents: &HashMap<i64, Agent>) {
    for p in properties {
        let Some(id) = p.agent_id else {
            continue;
        };
        let embedded = p
            .agent
            .as_ref()
            .is_some_and(|a| a != &Agent::placeholder(id));
        if !embedded {
            p.agent = agents.get(&id).cloned();
        }
    }
}

/// Returns the IDs of the [`Agent`]s handling the provided [`Property`]
/// listings.
pub(crate) fn ids_of(properties: &[Property]) -> Vec<i64> {
    properties.iter().filter_map(|p| p.agent_id).collect()
}

#[cfg(test)]
mod spec {
    use std::{cell::RefCell, collections::HashMap};

    use crate::frontend::{Agent, Property};

    use super::{attach, fetch_all};

    fn agent(id: i64) -> Agent {
        Agent {
            id,
            first_name: format!("Agent{id}"),
            ..Agent::default()
        }
    }

    #[tokio::test]
    async fn substitutes_placeholders_for_failures() {
        let calls = RefCell::new(vec![]);

        let agents = fetch_all([1, 2, 1, 3], |id| {
            calls.borrow_mut().push(id);
            async move {
                if id == 2 {
                    Err("connection reset")
                } else {
                    Ok(agent(id))
                }
            }
        })
        .await;

        let mut calls = calls.into_inner();
        calls.sort_unstable();
        assert_eq!(calls, [1, 2, 3]);
        assert_eq!(agents.len(), 3);
        assert_eq!(agents[&1], agent(1));
        assert_eq!(agents[&2], Agent::placeholder(2));
        assert_eq!(agents[&3].first_name, "Agent3");
    }

    #[test]
    fn keeps_embedded_agents() {
        let mut properties = [
            Property {
                agent_id: Some(1),
                agent: Some(Agent::placeholder(1)),
                ..Property::default()
            },
            Property {
                agent_id: Some(2),
                agent: Some(Agent {
                    id: 2,
                    first_name: "Embedded".into(),
                    ..Agent::default()
                }),
                ..Property::default()
            },
            Property::default(),
        ];
        let agents = HashMap::from([(1, agent(1)), (2, agent(2))]);

        attach(&mut properties, &agents);

        assert_eq!(properties[0].agent, Some(agent(1)));
        assert_eq!(
            properties[1].agent.as_ref().unwrap().first_name,
            "Embedded",
        );
        assert_eq!(properties[2].agent, None);
    }
}
