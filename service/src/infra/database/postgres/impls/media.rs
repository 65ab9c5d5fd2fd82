//! [`Image`]- and [`Video`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::{
    operations::{By, Delete, Insert, Select},
    DateTime,
};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::property::{self, media, Image, Video},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Reads an [`Image`] from the provided [`Row`].
fn image_from_row(row: &Row) -> Image {
    Image {
        id: row.get("id"),
        property_id: row.get("property_id"),
        url: row.get("image_url"),
        created_at: row.get("created_at"),
    }
}

/// Reads a [`Video`] from the provided [`Row`].
fn video_from_row(row: &Row) -> Video {
    Video {
        id: row.get("id"),
        property_id: row.get("property_id"),
        url: row.get("video_url"),
        thumbnail_url: row.get("thumbnail_url"),
        duration: row.get("duration"),
        file_size: u64::try_from(row.get::<_, i64>("file_size"))
            .expect("`file_size` is non-negative"),
        name: row.get("name"),
        created_at: row.get("created_at"),
    }
}

impl<C, IDs> Database<Select<By<HashMap<property::Id, Vec<Image>>, IDs>>>
    for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[property::Id]>,
{
    type Ok = HashMap<property::Id, Vec<Image>>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<property::Id, Vec<Image>>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        // Avoid subtle change for SQL.
        let ids: &[property::Id] = ids.as_ref();

        const SQL: &str = "\
            SELECT id, property_id, image_url, created_at \
            FROM property_images \
            WHERE property_id = ANY($1::INT8[]) \
            ORDER BY id";
        let mut images = HashMap::<_, Vec<_>>::new();
        for row in self.query(SQL, &[&ids]).await.map_err(tracerr::wrap!())? {
            let image = image_from_row(&row);
            images.entry(image.property_id).or_default().push(image);
        }
        Ok(images)
    }
}

impl<C, IDs> Database<Select<By<HashMap<property::Id, Vec<Video>>, IDs>>>
    for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[property::Id]>,
{
    type Ok = HashMap<property::Id, Vec<Video>>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<property::Id, Vec<Video>>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        // Avoid subtle change for SQL.
        let ids: &[property::Id] = ids.as_ref();

        const SQL: &str = "\
            SELECT id, property_id, video_url, thumbnail_url, \
                   duration, file_size, name, created_at \
            FROM property_videos \
            WHERE property_id = ANY($1::INT8[]) \
            ORDER BY id";
        let mut videos = HashMap::<_, Vec<_>>::new();
        for row in self.query(SQL, &[&ids]).await.map_err(tracerr::wrap!())? {
            let video = video_from_row(&row);
            videos.entry(video.property_id).or_default().push(video);
        }
        Ok(videos)
    }
}

impl<C> Database<Insert<(property::Id, media::NewImage)>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Image;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert((property_id, new)): Insert<(property::Id, media::NewImage)>,
    ) -> Result<Self::Ok, Self::Err> {
        let media::NewImage { url } = new;
        let created_at: media::ImageCreationDateTime = DateTime::now().coerce();

        const SQL: &str = "\
            INSERT INTO property_images (property_id, image_url, created_at) \
            VALUES ($1::INT8, $2::VARCHAR, $3::TIMESTAMPTZ) \
            RETURNING id";
        let row = self
            .query_one(SQL, &[&property_id, &url, &created_at])
            .await
            .map_err(tracerr::wrap!())?;

        Ok(Image {
            id: row.get("id"),
            property_id,
            url,
            created_at,
        })
    }
}

impl<C> Database<Insert<(property::Id, media::NewVideo)>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Video;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert((property_id, new)): Insert<(property::Id, media::NewVideo)>,
    ) -> Result<Self::Ok, Self::Err> {
        let media::NewVideo {
            url,
            file_size,
            name,
        } = new;
        let created_at: media::VideoCreationDateTime = DateTime::now().coerce();
        let size = i64::try_from(file_size).unwrap_or(i64::MAX);

        const SQL: &str = "\
            INSERT INTO property_videos (\
                property_id, video_url, thumbnail_url, \
                duration, file_size, name, created_at\
            ) VALUES (\
                $1::INT8, $2::VARCHAR, NULL, \
                0, $3::INT8, $4::VARCHAR, $5::TIMESTAMPTZ\
            ) \
            RETURNING id";
        let row = self
            .query_one(SQL, &[&property_id, &url, &size, &name, &created_at])
            .await
            .map_err(tracerr::wrap!())?;

        Ok(Video {
            id: row.get("id"),
            property_id,
            url,
            thumbnail_url: None,
            duration: 0.0,
            file_size,
            name,
            created_at,
        })
    }
}

impl<C> Database<Delete<By<Vec<Image>, media::Url>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Image>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Vec<Image>, media::Url>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let url: media::Url = by.into_inner();

        const SQL: &str = "\
            DELETE FROM property_images \
            WHERE image_url = $1::VARCHAR \
            RETURNING id, property_id, image_url, created_at";
        Ok(self
            .query(SQL, &[&url])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(image_from_row)
            .collect())
    }
}

impl<C> Database<Delete<By<Vec<Video>, media::Url>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Video>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Vec<Video>, media::Url>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let url: media::Url = by.into_inner();

        const SQL: &str = "\
            DELETE FROM property_videos \
            WHERE video_url = $1::VARCHAR \
            RETURNING id, property_id, video_url, thumbnail_url, \
                      duration, file_size, name, created_at";
        Ok(self
            .query(SQL, &[&url])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(video_from_row)
            .collect())
    }
}

impl<C> Database<Select<By<read::media::IsReferenced, media::Url>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = read::media::IsReferenced;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<read::media::IsReferenced, media::Url>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let url: media::Url = by.into_inner();

        const SQL: &str = "\
            SELECT EXISTS (SELECT 1 \
                           FROM property_images \
                           WHERE image_url = $1::VARCHAR) \
                OR EXISTS (SELECT 1 \
                           FROM property_videos \
                           WHERE video_url = $1::VARCHAR \
                              OR thumbnail_url = $1::VARCHAR)";
        self.query_one(SQL, &[&url])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| read::media::IsReferenced(row.get(0)))
    }
}
