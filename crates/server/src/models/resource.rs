use serde::{Deserialize, Serialize};

pub type ResourceId = i32;

/// Flat record produced by the catalog join. Fields coming from child tables
/// with no matching row serialize as null.
#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct CatalogRow {
    pub id: ResourceId,
    pub title: String,
    pub author: String,
    pub url: String,
    pub description: String,
    pub cat_tags: Option<String>,
    pub content_type: Option<String>,
    pub recommender: Option<String>,
    pub is_faculty: Option<bool>,
    pub mark_stage: Option<String>,
    pub was_used: Option<bool>,
    pub vote: Option<i32>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CreateResourceRequest {
    pub title: String,
    pub author: String,
    pub url: String,
    pub description: String,
    pub recommender: String,
    pub is_faculty: bool,
    pub was_used: bool,
    pub mark_stage: String,
    pub cat_tags: Option<Vec<String>>,
    pub content_type: Option<Vec<String>>,
}

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct CreatedResource {
    pub id: ResourceId,
}

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct RecommendationRow {
    pub id: ResourceId,
    pub recommender: String,
    pub is_faculty: bool,
    pub mark_stage: String,
    pub was_used: bool,
}

/// Serializes as the four-element array the create endpoint answers with:
/// [resource ids, content types, tags, recommendation rows].
#[derive(Clone, Debug, Serialize)]
pub struct CreateResourceResponse(
    pub Vec<CreatedResource>,
    pub Vec<String>,
    pub Vec<String>,
    pub Vec<RecommendationRow>,
);
