//! Client-side filtering of [`Property`] listings.

use common::Status;

use crate::frontend::Property;

/// Filter of already fetched [`Property`] listings.
///
/// Unset criteria don't restrict the listings.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Filter {
    /// Case-insensitive term matched against the title, description,
    /// address, city, property number and agent name.
    pub term: Option<String>,

    /// Required [`Status`].
    pub status: Option<Status>,

    /// Required property type, case-insensitive.
    pub kind: Option<String>,

    /// Required city, case-insensitive.
    pub city: Option<String>,

    /// Lowest acceptable price.
    pub min_price: Option<f64>,

    /// Highest acceptable price.
    pub max_price: Option<f64>,

    /// Lowest acceptable number of bedrooms.
    pub min_bedrooms: Option<u16>,
}

impl Filter {
    /// Indicates whether the provided [`Property`] satisfies this [`Filter`].
    #[must_use]
    pub fn matches(&self, p: &Property) -> bool {
        let term = self
            .term
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase);
        if let Some(term) = term {
            let agent = p.agent.as_ref().map(|a| a.full_name());
            let found = [
                Some(p.title.as_str()),
                Some(p.description.as_str()),
                Some(p.address.as_str()),
                Some(p.city.as_str()),
                Some(p.property_number.as_str()),
                agent.as_deref(),
            ]
            .into_iter()
            .flatten()
            .any(|s| s.to_lowercase().contains(&term));
            if !found {
                return false;
            }
        }

        self.status.is_none_or(|s| p.status == Some(s))
            && eq_ignore_case(self.kind.as_deref(), &p.kind)
            && eq_ignore_case(self.city.as_deref(), &p.city)
            && self.min_price.is_none_or(|min| p.price >= min)
            && self.max_price.is_none_or(|max| p.price <= max)
            && self.min_bedrooms.is_none_or(|min| p.bedrooms >= min)
    }

    /// Retains only the [`Property`] listings satisfying this [`Filter`].
    #[must_use]
    pub fn apply(&self, mut properties: Vec<Property>) -> Vec<Property> {
        properties.retain(|p| self.matches(p));
        properties
    }
}

/// Indicates whether the `actual` value equals the `required` one, ignoring
/// case. Absent `required` value matches anything.
fn eq_ignore_case(required: Option<&str>, actual: &str) -> bool {
    required
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .is_none_or(|r| r.eq_ignore_ascii_case(actual.trim()))
}

#[cfg(test)]
mod spec {
    use common::Status;

    use crate::frontend::{Agent, Property};

    use super::Filter;

    fn listings() -> Vec<Property> {
        vec![
            Property {
                id: 1,
                title: "Seaside Villa".into(),
                kind: "Villa".into(),
                city: "Lapu-Lapu City".into(),
                status: Some(Status::Available),
                price: 12_500_000.0,
                bedrooms: 4,
                agent: Some(Agent {
                    first_name: "Maria".into(),
                    last_name: "Santos".into(),
                    ..Agent::default()
                }),
                ..Property::default()
            },
            Property {
                id: 2,
                title: "Downtown Condo".into(),
                property_number: "PROP-000002".into(),
                kind: "Condominium".into(),
                city: "Cebu City".into(),
                status: Some(Status::Pending),
                price: 4_200_000.0,
                bedrooms: 1,
                ..Property::default()
            },
        ]
    }

    fn ids(filter: &Filter) -> Vec<i64> {
        filter.apply(listings()).into_iter().map(|p| p.id).collect()
    }

    #[test]
    fn empty_filter_keeps_everything() {
        assert_eq!(ids(&Filter::default()), [1, 2]);
        assert_eq!(
            ids(&Filter {
                term: Some("  ".into()),
                ..Filter::default()
            }),
            [1, 2],
        );
    }

    #[test]
    fn matches_term_anywhere() {
        for (term, expected) in [
            ("villa", vec![1]),
            ("SANTOS", vec![1]),
            ("prop-000002", vec![2]),
            ("cebu", vec![2]),
            ("castle", vec![]),
        ] {
            let filter = Filter {
                term: Some(term.into()),
                ..Filter::default()
            };
            assert_eq!(ids(&filter), expected, "{term}");
        }
    }

    #[test]
    fn combines_criteria() {
        let filter = Filter {
            status: Some(Status::Available),
            kind: Some("villa".into()),
            min_price: Some(10_000_000.0),
            min_bedrooms: Some(3),
            ..Filter::default()
        };
        assert_eq!(ids(&filter), [1]);

        let filter = Filter {
            city: Some("cebu city".into()),
            max_price: Some(5_000_000.0),
            ..Filter::default()
        };
        assert_eq!(ids(&filter), [2]);

        let filter = Filter {
            max_price: Some(1.0),
            ..Filter::default()
        };
        assert!(ids(&filter).is_empty());
    }
}
