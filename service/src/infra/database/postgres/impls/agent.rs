//! [`Agent`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::operations::{By, Select};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{agent, Agent},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

/// Reads an [`Agent`] from the provided [`Row`].
fn from_row(row: &Row) -> Agent {
    Agent {
        id: row.get("id"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        email: row.get("email"),
        phone: row.get("phone"),
        license_number: row.get("license_number"),
        profile_picture_url: row.get("profile_picture_url"),
    }
}

impl<C, IDs> Database<Select<By<HashMap<agent::Id, Agent>, IDs>>>
    for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[agent::Id]>,
{
    type Ok = HashMap<agent::Id, Agent>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<agent::Id, Agent>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        // Avoid subtle change for SQL.
        let ids: &[agent::Id] = ids.as_ref();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        const SQL: &str = "\
            SELECT id, first_name, last_name, \
                   email, phone, license_number, profile_picture_url \
            FROM agents \
            WHERE id = ANY($1::INT8[])";
        Ok(self
            .query(SQL, &[&ids])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(|row| {
                let agent = from_row(row);
                (agent.id, agent)
            })
            .collect())
    }
}

impl<C> Database<Select<By<Option<Agent>, agent::Id>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<agent::Id, Agent>, [agent::Id; 1]>>,
        Ok = HashMap<agent::Id, Agent>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Agent>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Agent>, agent::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .execute(Select(By::new([id])))
            .await
            .map_err(tracerr::wrap!())?
            .remove(&id))
    }
}

impl<C> Database<Select<By<Vec<Agent>, Vec<agent::Id>>>> for Postgres<C>
where
    C: Connection,
    Self: for<'i> Database<
        Select<By<HashMap<agent::Id, Agent>, &'i [agent::Id]>>,
        Ok = HashMap<agent::Id, Agent>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<Agent>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Agent>, Vec<agent::Id>>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        let mut agents = self
            .execute(Select(By::new(ids.as_slice())))
            .await
            .map_err(tracerr::wrap!())?;
        Ok(ids.iter().filter_map(|id| agents.remove(id)).collect())
    }
}

impl<C> Database<Select<By<Vec<Agent>, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Agent>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Agent>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT id, first_name, last_name, \
                   email, phone, license_number, profile_picture_url \
            FROM agents \
            ORDER BY last_name, first_name, id";
        Ok(self
            .query(SQL, &[])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}
