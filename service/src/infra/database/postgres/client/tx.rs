//! [`Tx`] client definitions.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};
use tokio_postgres::{types::ToSql, Row, ToStatement};
use tracerr::Traced;

use crate::infra::database::{
    self,
    postgres::{connection, Connection},
};

use super::NonTx;

/// Transactional Postgres database client.
///
/// The transaction is begun lazily on the first operation, and is rolled
/// back if this client is dropped without being committed.
#[derive(Clone, Debug)]
pub struct Tx {
    /// [`NonTx`] client to take a [`Connection`] from.
    non_tx: NonTx,

    /// Lazily begun [`connection::Tx`].
    tx: Arc<Mutex<Option<connection::Tx>>>,
}

impl Tx {
    /// Creates a new [`Tx`] client from the provided [`NonTx`] client.
    #[must_use]
    pub fn from_non_tx(client: NonTx) -> Self {
        Self {
            non_tx: client,
            tx: Arc::new(Mutex::new(None)),
        }
    }

    /// Returns the underlying [`connection::Tx`] of this [`Tx`] client,
    /// beginning it if it's not begun yet.
    async fn connection(
        &self,
    ) -> Result<MutexGuard<'_, Option<connection::Tx>>, Traced<database::Error>>
    {
        let mut guard = self.tx.lock().await;
        if guard.is_none() {
            let conn = self
                .non_tx
                .connection()
                .await
                .map_err(tracerr::wrap!())?;
            *guard = Some(
                connection::Tx::begin(conn)
                    .await
                    .map_err(tracerr::wrap!())?,
            );
        }
        Ok(guard)
    }

    /// Commits this [`Tx`] client.
    ///
    /// # Errors
    ///
    /// If failed to commit transaction of this [`Tx`] client.
    pub async fn commit(&self) -> Result<(), Traced<database::Error>> {
        let Some(tx) = self.tx.lock().await.take() else {
            // Nothing has been done, so nothing to commit.
            return Ok(());
        };
        tx.commit().await.map_err(tracerr::wrap!())
    }
}

/// Runs the provided operation on the [`connection::Tx`] of the [`Tx`]
/// client.
macro_rules! on_tx {
    ($client:expr, |$conn:ident| $op:expr) => {{
        let guard = $client.connection().await.map_err(tracerr::wrap!())?;
        let $conn = guard.as_ref().expect("begun above");
        $op.await.map_err(tracerr::wrap!())
    }};
}

impl Connection for Tx {
    async fn query<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Vec<Row>, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        on_tx!(self, |conn| conn.query(stmt, params))
    }

    async fn query_opt<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Option<Row>, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        on_tx!(self, |conn| conn.query_opt(stmt, params))
    }

    async fn query_one<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Row, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        on_tx!(self, |conn| conn.query_one(stmt, params))
    }

    async fn exec<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<u64, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        on_tx!(self, |conn| conn.exec(stmt, params))
    }
}
