//! [`CleanExpiredOtps`] [`Task`].

use std::{convert::Infallible, error::Error, time};

use common::operations::{By, Delete, Perform, Start};
use tokio::time::interval;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{otp, Otp},
    infra::{database, Database},
    Service,
};

use super::Task;

/// Configuration for [`CleanExpiredOtps`] [`Task`].
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Interval between expired [`Otp`]s cleaning.
    pub interval: time::Duration,

    /// Duration an expired [`Otp`] is retained for before being deleted.
    pub retention: time::Duration,
}

/// [`Task`] for deleting long expired [`Otp`]s.
#[derive(Clone, Copy, Debug)]
pub struct CleanExpiredOtps<S> {
    /// [`Config`] of this [`Task`].
    config: Config,

    /// [`Service`] instance.
    service: S,
}

impl<Db> Task<Start<By<CleanExpiredOtps<Self>, Config>>> for Service<Db>
where
    CleanExpiredOtps<Service<Db>>:
        Task<Perform<()>, Ok = u64, Err: Error> + 'static,
    Self: Clone,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Start(by): Start<By<CleanExpiredOtps<Self>, Config>>,
    ) -> Result<Self::Ok, Self::Err> {
        let config = by.into_inner();
        let task = CleanExpiredOtps {
            config,
            service: self.clone(),
        };

        let mut interval = interval(task.config.interval);
        loop {
            let _ = interval.tick().await;
            match task.execute(Perform(())).await {
                Ok(0) => {}
                Ok(n) => {
                    log::info!("`task::CleanExpiredOtps` deleted {n} `Otp`s");
                }
                Err(e) => {
                    log::error!("`task::CleanExpiredOtps` failed: {e}");
                }
            }
        }
    }
}

impl<Db> Task<Perform<()>> for CleanExpiredOtps<Service<Db>>
where
    Db: Database<
        Delete<By<Otp, otp::ExpirationDateTime>>,
        Ok = u64,
        Err = Traced<database::Error>,
    >,
{
    type Ok = u64;
    type Err = ExecutionError;

    async fn execute(&self, _: Perform<()>) -> Result<Self::Ok, Self::Err> {
        let deadline =
            otp::ExpirationDateTime::now() - self.config.retention;
        self.service
            .database()
            .execute(Delete(By::new(deadline)))
            .await
            .map_err(tracerr::wrap!())
    }
}

/// Error of [`CleanExpiredOtps`] execution.
pub type ExecutionError = Traced<database::Error>;
