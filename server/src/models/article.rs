use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// How many articles the home page shows.
pub const FEATURED_ARTICLE_LIMIT: i64 = 5;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub category: String,
    pub author_name: Option<String>,
    pub published_date: DateTime<Utc>,
    pub is_featured: bool,
    pub views: i64,
    #[serde(skip_serializing)]
    pub is_active: bool,
}
