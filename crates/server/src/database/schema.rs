use sqlx::{Error as SqlxError, Postgres, Transaction};
use tracing::instrument;

use crate::database::connection::DbConnection;

impl DbConnection {
    pub async fn init_schema(&self) -> Result<(), SqlxError> {
        let mut transaction = self.pool().begin().await?;
        create_all_tables(&mut transaction).await?;
        transaction.commit().await?;
        Ok(())
    }

    pub async fn drop_schema(&self) -> Result<(), SqlxError> {
        let mut transaction = self.pool().begin().await?;
        drop_all_tables(&mut transaction).await?;
        transaction.commit().await?;
        Ok(())
    }
}

#[instrument(skip_all)]
pub async fn create_all_tables(
    transaction: &mut Transaction<'_, Postgres>,
) -> Result<(), SqlxError> {
    sqlx::query(
        "
            CREATE TABLE resources (
                id              int PRIMARY KEY GENERATED ALWAYS AS IDENTITY,
                title           TEXT NOT NULL,
                author          TEXT NOT NULL,
                url             TEXT NOT NULL,
                description     TEXT NOT NULL
            );
        ",
    )
    .execute(transaction.as_mut())
    .await?;
    sqlx::query(
        "
            CREATE TABLE resource_type (
                id              int NOT NULL REFERENCES resources(id),
                content_type    TEXT NOT NULL
            );
        ",
    )
    .execute(transaction.as_mut())
    .await?;
    sqlx::query(
        "
            CREATE TABLE resource_tags (
                id              int NOT NULL REFERENCES resources(id),
                cat_tags        TEXT NOT NULL
            );
        ",
    )
    .execute(transaction.as_mut())
    .await?;
    sqlx::query(
        "
            CREATE TABLE recommendations (
                id              int NOT NULL REFERENCES resources(id),
                recommender     TEXT NOT NULL,
                is_faculty      BOOLEAN NOT NULL,
                mark_stage      TEXT NOT NULL,
                was_used        BOOLEAN NOT NULL
            );
        ",
    )
    .execute(transaction.as_mut())
    .await?;
    // keyed by resource id, at most one vote row per resource
    sqlx::query(
        "
            CREATE TABLE resource_votes (
                id              int PRIMARY KEY REFERENCES resources(id),
                vote            int NOT NULL
            );
        ",
    )
    .execute(transaction.as_mut())
    .await?;
    Ok(())
}

#[instrument(skip_all)]
pub async fn drop_all_tables(transaction: &mut Transaction<'_, Postgres>) -> Result<(), SqlxError> {
    let statements = [
        "DROP TABLE IF EXISTS resource_votes;",
        "DROP TABLE IF EXISTS recommendations;",
        "DROP TABLE IF EXISTS resource_tags;",
        "DROP TABLE IF EXISTS resource_type;",
        "DROP TABLE IF EXISTS resources;",
    ];
    for statement in &statements {
        sqlx::query(statement).execute(transaction.as_mut()).await?;
    }
    Ok(())
}
