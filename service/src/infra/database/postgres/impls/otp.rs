//! [`Otp`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Lock, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{otp, Otp},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

impl<C> Database<Insert<Otp>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Otp>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(otp): Insert<Otp>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(otp)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Otp>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(otp): Update<Otp>,
    ) -> Result<Self::Ok, Self::Err> {
        let Otp {
            id,
            email,
            code,
            expires_at,
            used,
            attempts,
            created_at,
        } = otp;

        let attempts = i16::try_from(attempts).unwrap_or(i16::MAX);

        const SQL: &str = "\
            INSERT INTO otps (\
                id, email, code, expires_at, used, attempts, created_at\
            ) VALUES (\
                $1::UUID, $2::VARCHAR, $3::VARCHAR, $4::TIMESTAMPTZ, \
                $5::BOOLEAN, $6::INT2, $7::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET used = EXCLUDED.used, \
                attempts = EXCLUDED.attempts";
        self.exec(
            SQL,
            &[
                &id,
                &email,
                &code,
                &expires_at,
                &used,
                &attempts,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Lock<By<Otp, otp::Email>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Otp, otp::Email>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let email: otp::Email = by.into_inner();

        // There may be no rows to lock yet, so an advisory lock is used,
        // released once the transaction ends.
        const SQL: &str = "\
            SELECT pg_advisory_xact_lock(hashtext('otps:' || $1::VARCHAR))";
        self.query_one(SQL, &[&email])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Select<By<Option<Otp>, otp::Email>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Otp>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Otp>, otp::Email>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let email: otp::Email = by.into_inner();

        const SQL: &str = "\
            SELECT id, email, code, expires_at, used, attempts, created_at \
            FROM otps \
            WHERE email = $1::VARCHAR \
            ORDER BY created_at DESC \
            LIMIT 1";
        Ok(self
            .query_opt(SQL, &[&email])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| Otp {
                id: row.get("id"),
                email: row.get("email"),
                code: row.get("code"),
                expires_at: row.get("expires_at"),
                used: row.get("used"),
                attempts: u16::try_from(row.get::<_, i16>("attempts"))
                    .expect("`attempts` is non-negative"),
                created_at: row.get("created_at"),
            }))
    }
}

impl<C> Database<Delete<By<Otp, otp::ExpirationDateTime>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = u64;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Otp, otp::ExpirationDateTime>>,
    ) -> Result<Self::Ok, Self::Err> {
        let deadline: otp::ExpirationDateTime = by.into_inner();

        const SQL: &str = "\
            DELETE FROM otps \
            WHERE expires_at < $1::TIMESTAMPTZ";
        self.exec(SQL, &[&deadline])
            .await
            .map_err(tracerr::wrap!())
    }
}
