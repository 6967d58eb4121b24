//! PostgreSQL-backed `EventRepository` and `NewsPostRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ContentRepositoryError, EventRepository, NewsPostRepository};
use crate::domain::{EventId, EventRecord, NewsPostId, NewsPostRecord, Slug};

use super::diesel_error_mapping::{
    is_unique_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{EventRow, EventWrite, NewsPostRow, NewsPostWrite, RowDecodeError};
use super::pool::{DbPool, PoolError};
use super::schema::{events, news_posts};

/// Diesel implementation of both content ports.
#[derive(Clone)]
pub struct DieselContentRepository {
    pool: DbPool,
}

impl DieselContentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ContentRepositoryError {
    map_basic_pool_error(error, ContentRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ContentRepositoryError {
    map_basic_diesel_error(
        error,
        ContentRepositoryError::query,
        ContentRepositoryError::connection,
    )
}

fn map_write_error(error: diesel::result::Error, slug: &Slug) -> ContentRepositoryError {
    if is_unique_violation(&error) {
        return ContentRepositoryError::duplicate_slug(slug.as_str());
    }
    map_diesel_error(error)
}

fn map_decode_error(error: RowDecodeError) -> ContentRepositoryError {
    ContentRepositoryError::query(error.to_string())
}

#[async_trait]
impl EventRepository for DieselContentRepository {
    async fn insert(&self, record: &EventRecord) -> Result<(), ContentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(events::table)
            .values(EventWrite::from(record))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_write_error(err, &record.slug))
    }

    async fn update(&self, record: &EventRecord) -> Result<(), ContentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let affected = diesel::update(events::table.filter(events::id.eq(record.id.as_uuid())))
            .set(EventWrite::from(record))
            .execute(&mut conn)
            .await
            .map_err(|err| map_write_error(err, &record.slug))?;
        if affected == 0 {
            return Err(ContentRepositoryError::not_found(record.id.to_string()));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &EventId) -> Result<Option<EventRecord>, ContentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<EventRow> = events::table
            .filter(events::id.eq(id.as_uuid()))
            .select(EventRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(EventRecord::try_from)
            .transpose()
            .map_err(map_decode_error)
    }

    async fn find_by_slug(
        &self,
        slug: &Slug,
    ) -> Result<Option<EventRecord>, ContentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<EventRow> = events::table
            .filter(events::slug.eq(slug.as_str()))
            .select(EventRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(EventRecord::try_from)
            .transpose()
            .map_err(map_decode_error)
    }

    async fn list_all(&self) -> Result<Vec<EventRecord>, ContentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<EventRow> = events::table
            .order((events::starts_at.asc(), events::id.asc()))
            .select(EventRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter()
            .map(EventRecord::try_from)
            .collect::<Result<_, _>>()
            .map_err(map_decode_error)
    }
}

#[async_trait]
impl NewsPostRepository for DieselContentRepository {
    async fn insert(&self, record: &NewsPostRecord) -> Result<(), ContentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(news_posts::table)
            .values(NewsPostWrite::from(record))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_write_error(err, &record.slug))
    }

    async fn update(&self, record: &NewsPostRecord) -> Result<(), ContentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let affected =
            diesel::update(news_posts::table.filter(news_posts::id.eq(record.id.as_uuid())))
                .set(NewsPostWrite::from(record))
                .execute(&mut conn)
                .await
                .map_err(|err| map_write_error(err, &record.slug))?;
        if affected == 0 {
            return Err(ContentRepositoryError::not_found(record.id.to_string()));
        }
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &NewsPostId,
    ) -> Result<Option<NewsPostRecord>, ContentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<NewsPostRow> = news_posts::table
            .filter(news_posts::id.eq(id.as_uuid()))
            .select(NewsPostRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(NewsPostRecord::try_from)
            .transpose()
            .map_err(map_decode_error)
    }

    async fn find_by_slug(
        &self,
        slug: &Slug,
    ) -> Result<Option<NewsPostRecord>, ContentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<NewsPostRow> = news_posts::table
            .filter(news_posts::slug.eq(slug.as_str()))
            .select(NewsPostRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(NewsPostRecord::try_from)
            .transpose()
            .map_err(map_decode_error)
    }

    async fn list_all(&self) -> Result<Vec<NewsPostRecord>, ContentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<NewsPostRow> = news_posts::table
            .order((news_posts::created_at.desc(), news_posts::id.asc()))
            .select(NewsPostRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter()
            .map(NewsPostRecord::try_from)
            .collect::<Result<_, _>>()
            .map_err(map_decode_error)
    }
}
