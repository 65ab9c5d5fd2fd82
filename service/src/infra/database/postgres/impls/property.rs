//! [`Property`]-related [`Database`] implementations.

use std::{collections::HashMap, fmt::Write as _};

use common::operations::{By, Delete, Insert, Lock, Select, Update};
use postgres_types::ToSql;
use rust_decimal::Decimal;
use tokio_postgres::Row;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        property::{self, Image, Video},
        Property,
    },
    infra::{
        database::{
            self,
            postgres::{Connection, FuzzPattern},
            Postgres,
        },
        Database,
    },
    read,
};

/// Reads a non-negative `INT4` column as [`u16`].
fn get_u16(row: &Row, column: &str) -> u16 {
    u16::try_from(row.get::<_, i32>(column))
        .unwrap_or_else(|_| panic!("`{column}` overflow"))
}

/// Pushes the provided `param` and appends the `condition` referring it as
/// `$` to the `filters`.
fn push_filter<'p>(
    params: &mut Vec<&'p (dyn ToSql + Sync)>,
    filters: &mut String,
    param: &'p (dyn ToSql + Sync),
    condition: &str,
) {
    params.push(param);
    let idx = params.len();
    let condition = condition.replace('$', &format!("${idx}"));
    _ = write!(filters, " AND {condition}");
}

/// Reads a [`Property`] without its media from the provided [`Row`].
fn from_row(row: &Row) -> Property {
    let id: property::Id = row.get("id");
    let amenities = property::Amenities::from_json(row.get("amenities"))
        .unwrap_or_else(|e| {
            log::warn!("malformed amenities of `Property(id: {id})`: {e}");
            property::Amenities::default()
        });

    Property {
        id,
        number: row.get("property_number"),
        title: row.get("title"),
        description: row.get("description"),
        kind: row.get("kind"),
        status: row.get("status"),
        rejection_reason: row.get("rejection_reason"),
        price: row.get("price"),
        listed_at: row.get("listed_at"),
        location: property::Location {
            address: row.get("address"),
            city: row.get("city"),
            state: row.get("state"),
            zip_code: row.get("zip_code"),
            country: row.get("country"),
            latitude: row.get("latitude"),
            longitude: row.get("longitude"),
        },
        layout: property::Layout {
            bedrooms: get_u16(row, "bedrooms"),
            bathrooms: row.get("bathrooms"),
            kitchens: get_u16(row, "kitchens"),
            garages: get_u16(row, "garages"),
            area: common::Area::sqm(row.get::<_, Decimal>("area_sqm")),
            age: get_u16(row, "property_age"),
            floor: get_u16(row, "floor_number"),
        },
        amenities,
        agent_id: row.get("agent_id"),
        owner_id: row.get("owner_id"),
        images: vec![],
        videos: vec![],
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl<C, IDs> Database<Select<By<HashMap<property::Id, Property>, IDs>>>
    for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[property::Id]>,
    Self: for<'i> Database<
            Select<By<HashMap<property::Id, Vec<Image>>, &'i [property::Id]>>,
            Ok = HashMap<property::Id, Vec<Image>>,
            Err = Traced<database::Error>,
        > + for<'i> Database<
            Select<By<HashMap<property::Id, Vec<Video>>, &'i [property::Id]>>,
            Ok = HashMap<property::Id, Vec<Video>>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = HashMap<property::Id, Property>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<property::Id, Property>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        // Avoid subtle change for SQL.
        let ids: &[property::Id] = ids.as_ref();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        const SQL: &str = "\
            SELECT id, property_number, \
                   title, description, kind, status, rejection_reason, \
                   price, listed_at, \
                   address, city, state, zip_code, country, \
                   latitude, longitude, \
                   bedrooms, bathrooms, kitchens, garages, area_sqm, \
                   property_age, floor_number, \
                   amenities, agent_id, owner_id, \
                   created_at, updated_at \
            FROM properties \
            WHERE id = ANY($1::INT8[])";
        let mut properties = self
            .query(SQL, &[&ids])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(|row| {
                let p = from_row(row);
                (p.id, p)
            })
            .collect::<HashMap<_, _>>();

        let mut images = self
            .execute(Select(By::<HashMap<_, Vec<Image>>, _>::new(ids)))
            .await
            .map_err(tracerr::wrap!())?;
        let mut videos = self
            .execute(Select(By::<HashMap<_, Vec<Video>>, _>::new(ids)))
            .await
            .map_err(tracerr::wrap!())?;
        for (id, p) in &mut properties {
            p.images = images.remove(id).unwrap_or_default();
            p.videos = videos.remove(id).unwrap_or_default();
        }

        Ok(properties)
    }
}

impl<C> Database<Select<By<Option<Property>, property::Id>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<property::Id, Property>, [property::Id; 1]>>,
        Ok = HashMap<property::Id, Property>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Property>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Property>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .execute(Select(By::new([id])))
            .await
            .map_err(tracerr::wrap!())?
            .remove(&id))
    }
}

impl<C> Database<Select<By<Vec<Property>, read::property::list::Selector>>>
    for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<property::Id, Property>, Vec<property::Id>>>,
        Ok = HashMap<property::Id, Property>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<Property>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Property>, read::property::list::Selector>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::property::list::Criteria {
            term,
            status,
            kind,
            city,
            min_price,
            max_price,
            min_bedrooms,
            min_bathrooms,
            agent_id,
            owner_id,
        } = by.into_inner().into_criteria();

        let pattern = term.as_ref().map(|t| FuzzPattern::new(t.as_ref()));
        let term = term.map(|t| t.to_string());
        let min_bedrooms = min_bedrooms.map(i32::from);

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![];
        let mut filters = String::new();
        if let Some(p) = &pattern {
            push_filter(
                &mut ps,
                &mut filters,
                p,
                "LOWER(title || ' ' || description || ' ' || kind || ' ' || \
                       address || ' ' || city || ' ' || state) \
                 SIMILAR TO LOWER($::VARCHAR)",
            );
        }
        if let Some(s) = &status {
            push_filter(&mut ps, &mut filters, s, "status = $::INT2");
        }
        if let Some(k) = &kind {
            push_filter(
                &mut ps,
                &mut filters,
                k,
                "LOWER(kind) = LOWER($::VARCHAR)",
            );
        }
        if let Some(c) = &city {
            push_filter(
                &mut ps,
                &mut filters,
                c,
                "LOWER(city) = LOWER($::VARCHAR)",
            );
        }
        if let Some(p) = &min_price {
            push_filter(&mut ps, &mut filters, p, "price >= $::NUMERIC");
        }
        if let Some(p) = &max_price {
            push_filter(&mut ps, &mut filters, p, "price <= $::NUMERIC");
        }
        if let Some(n) = &min_bedrooms {
            push_filter(&mut ps, &mut filters, n, "bedrooms >= $::INT4");
        }
        if let Some(n) = &min_bathrooms {
            push_filter(&mut ps, &mut filters, n, "bathrooms >= $::NUMERIC");
        }
        if let Some(id) = &agent_id {
            push_filter(&mut ps, &mut filters, id, "agent_id = $::INT8");
        }
        if let Some(id) = &owner_id {
            push_filter(&mut ps, &mut filters, id, "owner_id = $::INT8");
        }
        let mut ordering = String::new();
        if let Some(t) = &term {
            ps.push(t);
            ordering = format!(
                "LEVENSHTEIN(LOWER(LEFT(title, 255)), \
                             LOWER(LEFT(${}::VARCHAR, 255)), 1, 1, 0), ",
                ps.len(),
            );
        }

        let sql = format!(
            "SELECT id \
             FROM properties \
             WHERE true{filters} \
             ORDER BY {ordering}created_at DESC, id DESC",
        );
        let ids = self
            .query(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| row.get::<_, property::Id>("id"))
            .collect::<Vec<_>>();

        let mut properties = self
            .execute(Select(By::new(ids.clone())))
            .await
            .map_err(tracerr::wrap!())?;
        Ok(ids.iter().filter_map(|id| properties.remove(id)).collect())
    }
}

impl<C> Database<Insert<property::New>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Property;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(new): Insert<property::New>,
    ) -> Result<Self::Ok, Self::Err> {
        let property::New {
            details,
            status,
            created_at,
        } = new;
        let property::Details {
            title,
            description,
            kind,
            price,
            listed_at,
            location,
            layout,
            amenities,
            agent_id,
            owner_id,
        } = details;

        let bedrooms = i32::from(layout.bedrooms);
        let bathrooms = Decimal::from(layout.bathrooms);
        let kitchens = i32::from(layout.kitchens);
        let garages = i32::from(layout.garages);
        let area = layout.area.in_sqm();
        let age = i32::from(layout.age);
        let floor = i32::from(layout.floor);
        let amenities_json = amenities.to_json();

        // Both the `id` and the `property_number` are derived from the same
        // sequence value.
        const SQL: &str = "\
            WITH next AS (SELECT nextval('properties_id_seq') AS id) \
            INSERT INTO properties (\
                id, property_number, \
                title, description, kind, status, rejection_reason, \
                price, listed_at, \
                address, city, state, zip_code, country, \
                latitude, longitude, \
                bedrooms, bathrooms, kitchens, garages, area_sqm, \
                property_age, floor_number, \
                amenities, agent_id, owner_id, \
                created_at, updated_at \
            ) \
            SELECT next.id, 'PROP-' || LPAD(next.id::TEXT, 6, '0'), \
                   $1::VARCHAR, $2::VARCHAR, $3::VARCHAR, $4::INT2, NULL, \
                   $5::NUMERIC, $6::TIMESTAMPTZ, \
                   $7::VARCHAR, $8::VARCHAR, $9::VARCHAR, \
                   $10::VARCHAR, $11::VARCHAR, \
                   $12::FLOAT8, $13::FLOAT8, \
                   $14::INT4, $15::NUMERIC, $16::INT4, $17::INT4, \
                   $18::NUMERIC, \
                   $19::INT4, $20::INT4, \
                   $21::TEXT, $22::INT8, $23::INT8, \
                   $24::TIMESTAMPTZ, $24::TIMESTAMPTZ \
            FROM next \
            RETURNING id, property_number";
        let row = self
            .query_one(
                SQL,
                &[
                    &title,
                    &description,
                    &kind,
                    &status,
                    &price,
                    &listed_at,
                    &location.address,
                    &location.city,
                    &location.state,
                    &location.zip_code,
                    &location.country,
                    &location.latitude,
                    &location.longitude,
                    &bedrooms,
                    &bathrooms,
                    &kitchens,
                    &garages,
                    &area,
                    &age,
                    &floor,
                    &amenities_json,
                    &agent_id,
                    &owner_id,
                    &created_at,
                ],
            )
            .await
            .map_err(tracerr::wrap!())?;

        Ok(Property {
            id: row.get("id"),
            number: row.get("property_number"),
            title,
            description,
            kind,
            status,
            rejection_reason: None,
            price,
            listed_at,
            location,
            layout,
            amenities,
            agent_id,
            owner_id,
            images: vec![],
            videos: vec![],
            created_at: created_at.coerce(),
            updated_at: created_at.coerce(),
        })
    }
}

impl<C> Database<Update<Property>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(property): Update<Property>,
    ) -> Result<Self::Ok, Self::Err> {
        let Property {
            id,
            number: _,
            title,
            description,
            kind,
            status,
            rejection_reason,
            price,
            listed_at,
            location,
            layout,
            amenities,
            agent_id,
            owner_id,
            images: _,
            videos: _,
            created_at: _,
            updated_at,
        } = property;

        let bedrooms = i32::from(layout.bedrooms);
        let bathrooms = Decimal::from(layout.bathrooms);
        let kitchens = i32::from(layout.kitchens);
        let garages = i32::from(layout.garages);
        let area = layout.area.in_sqm();
        let age = i32::from(layout.age);
        let floor = i32::from(layout.floor);
        let amenities = amenities.to_json();

        const SQL: &str = "\
            UPDATE properties \
            SET title = $2::VARCHAR, \
                description = $3::VARCHAR, \
                kind = $4::VARCHAR, \
                status = $5::INT2, \
                rejection_reason = $6::VARCHAR, \
                price = $7::NUMERIC, \
                listed_at = $8::TIMESTAMPTZ, \
                address = $9::VARCHAR, \
                city = $10::VARCHAR, \
                state = $11::VARCHAR, \
                zip_code = $12::VARCHAR, \
                country = $13::VARCHAR, \
                latitude = $14::FLOAT8, \
                longitude = $15::FLOAT8, \
                bedrooms = $16::INT4, \
                bathrooms = $17::NUMERIC, \
                kitchens = $18::INT4, \
                garages = $19::INT4, \
                area_sqm = $20::NUMERIC, \
                property_age = $21::INT4, \
                floor_number = $22::INT4, \
                amenities = $23::TEXT, \
                agent_id = $24::INT8, \
                owner_id = $25::INT8, \
                updated_at = $26::TIMESTAMPTZ \
            WHERE id = $1::INT8";
        self.exec(
            SQL,
            &[
                &id,
                &title,
                &description,
                &kind,
                &status,
                &rejection_reason,
                &price,
                &listed_at,
                &location.address,
                &location.city,
                &location.state,
                &location.zip_code,
                &location.country,
                &location.latitude,
                &location.longitude,
                &bedrooms,
                &bathrooms,
                &kitchens,
                &garages,
                &area,
                &age,
                &floor,
                &amenities,
                &agent_id,
                &owner_id,
                &updated_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Lock<By<Property, property::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Property, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: property::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM properties \
            WHERE id = $1::INT8 \
            FOR UPDATE";
        self.query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Delete<By<Property, property::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Property, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: property::Id = by.into_inner();

        // Media are removed by `ON DELETE CASCADE`.
        const SQL: &str = "\
            DELETE FROM properties \
            WHERE id = $1::INT8";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
