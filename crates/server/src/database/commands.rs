use sqlx::{Error as SqlxError, PgExecutor, Postgres, Row, Transaction};
use tracing::{info, instrument};

use crate::database::connection::DbConnection;
use crate::models::resource::{
    CreateResourceRequest, CreateResourceResponse, CreatedResource, RecommendationRow, ResourceId,
};
use crate::models::vote::{VoteDirection, VoteRow};

impl DbConnection {
    /// Inserts the resource with its types, tags and recommendation in one
    /// transaction. Any failure rolls the whole submission back.
    pub async fn create_resource(
        &self,
        request: &CreateResourceRequest,
    ) -> Result<CreateResourceResponse, SqlxError> {
        let mut transaction = self.pool().begin().await?;
        let response = create_resource(&mut transaction, request).await?;
        transaction.commit().await?;
        Ok(response)
    }

    pub async fn apply_vote(
        &self,
        id: ResourceId,
        direction: VoteDirection,
    ) -> Result<VoteRow, SqlxError> {
        apply_vote(self.pool(), id, direction).await
    }
}

#[instrument(skip_all)]
pub async fn create_resource(
    transaction: &mut Transaction<'_, Postgres>,
    request: &CreateResourceRequest,
) -> Result<CreateResourceResponse, SqlxError> {
    let id: ResourceId = sqlx::query(
        "
            INSERT INTO resources (title, author, url, description)
            VALUES ($1, $2, $3, $4) RETURNING id;
        ",
    )
    .bind(&request.title)
    .bind(&request.author)
    .bind(&request.url)
    .bind(&request.description)
    .fetch_one(transaction.as_mut())
    .await?
    .try_get("id")?;

    let mut content_types = Vec::new();
    if let Some(requested) = &request.content_type {
        for content_type in requested {
            let inserted: String = sqlx::query_scalar(
                "
                    INSERT INTO resource_type (id, content_type)
                    VALUES ($1, $2) RETURNING content_type;
                ",
            )
            .bind(id)
            .bind(content_type)
            .fetch_one(transaction.as_mut())
            .await?;
            content_types.push(inserted);
        }
    }

    let mut cat_tags = Vec::new();
    if let Some(requested) = &request.cat_tags {
        for tag in requested {
            let inserted: String = sqlx::query_scalar(
                "
                    INSERT INTO resource_tags (id, cat_tags)
                    VALUES ($1, $2) RETURNING cat_tags;
                ",
            )
            .bind(id)
            .bind(tag)
            .fetch_one(transaction.as_mut())
            .await?;
            cat_tags.push(inserted);
        }
    }

    let recommendation: RecommendationRow = sqlx::query_as(
        "
            INSERT INTO recommendations (id, recommender, is_faculty, mark_stage, was_used)
            VALUES ($1, $2, $3, $4, $5) RETURNING *;
        ",
    )
    .bind(id)
    .bind(&request.recommender)
    .bind(request.is_faculty)
    .bind(&request.mark_stage)
    .bind(request.was_used)
    .fetch_one(transaction.as_mut())
    .await?;

    info!("created resource with id: {id}");
    Ok(CreateResourceResponse(
        vec![CreatedResource { id }],
        content_types,
        cat_tags,
        vec![recommendation],
    ))
}

/// Atomic upsert: first vote inserts the row at ±1, later votes adjust the
/// stored count in the same statement, so concurrent votes never lose updates.
#[instrument(skip(executor))]
pub async fn apply_vote<'a, E: PgExecutor<'a>>(
    executor: E,
    id: ResourceId,
    direction: VoteDirection,
) -> Result<VoteRow, SqlxError> {
    let row: VoteRow = sqlx::query_as(
        "
            INSERT INTO resource_votes (id, vote) VALUES ($1, $2)
            ON CONFLICT (id) DO UPDATE SET vote = resource_votes.vote + $2
            RETURNING id, vote;
        ",
    )
    .bind(id)
    .bind(direction.delta())
    .fetch_one(executor)
    .await?;
    Ok(row)
}
