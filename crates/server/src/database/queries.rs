use sqlx::{Error as SqlxError, PgExecutor};
use tracing::instrument;

use crate::database::connection::DbConnection;
use crate::models::resource::CatalogRow;

/// Five-way left join behind every read endpoint. One output row per
/// (resource, type, tag) combination, so multi-tagged resources repeat.
const CATALOG_SELECT: &str = "
    SELECT
        res.id AS id, res.title AS title, res.author AS author, res.url AS url,
        res.description AS description, rtg.cat_tags AS cat_tags,
        rt.content_type AS content_type, rec.recommender AS recommender,
        rec.is_faculty AS is_faculty, rec.mark_stage AS mark_stage,
        rec.was_used AS was_used, rv.vote AS vote
    FROM
        resources res
        LEFT JOIN resource_type rt ON res.id = rt.id
        LEFT JOIN resource_tags rtg ON res.id = rtg.id
        LEFT JOIN recommendations rec ON res.id = rec.id
        LEFT JOIN resource_votes rv ON res.id = rv.id
";

impl DbConnection {
    pub async fn list_resources(&self) -> Result<Vec<CatalogRow>, SqlxError> {
        list_resources(self.pool()).await
    }

    pub async fn search_resources(&self, term: &str) -> Result<Vec<CatalogRow>, SqlxError> {
        search_resources(self.pool(), term).await
    }

    pub async fn search_tags(&self, term: &str) -> Result<Vec<CatalogRow>, SqlxError> {
        search_tags(self.pool(), term).await
    }
}

#[instrument(skip(executor))]
pub async fn list_resources<'a, E: PgExecutor<'a>>(
    executor: E,
) -> Result<Vec<CatalogRow>, SqlxError> {
    let query = format!("{CATALOG_SELECT} ORDER BY rv.id DESC;");
    let rows: Vec<CatalogRow> = sqlx::query_as(&query).fetch_all(executor).await?;
    Ok(rows)
}

#[instrument(skip(executor))]
pub async fn search_resources<'a, E: PgExecutor<'a>>(
    executor: E,
    term: &str,
) -> Result<Vec<CatalogRow>, SqlxError> {
    // raw term bound into ILIKE, so %/_ keep their wildcard meaning
    let query = format!(
        "{CATALOG_SELECT}
    WHERE
        res.title ILIKE '%'||$1||'%' OR
        res.author ILIKE '%'||$1||'%' OR
        res.description ILIKE '%'||$1||'%' OR
        rtg.cat_tags ILIKE '%'||$1||'%';"
    );
    let rows: Vec<CatalogRow> = sqlx::query_as(&query).bind(term).fetch_all(executor).await?;
    Ok(rows)
}

#[instrument(skip(executor))]
pub async fn search_tags<'a, E: PgExecutor<'a>>(
    executor: E,
    term: &str,
) -> Result<Vec<CatalogRow>, SqlxError> {
    let query = format!(
        "{CATALOG_SELECT}
    WHERE
        rtg.cat_tags ILIKE '%'||$1||'%';"
    );
    let rows: Vec<CatalogRow> = sqlx::query_as(&query).bind(term).fetch_all(executor).await?;
    Ok(rows)
}
