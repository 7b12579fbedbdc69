use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::Json;

use super::events::TitleQuery;
use crate::models::article::FEATURED_ARTICLE_LIMIT;
use crate::models::Article;
use crate::state::AppState;
use crate::utils::error::AppError;

pub async fn list_articles(State(state): State<AppState>) -> Result<Json<Vec<Article>>, AppError> {
    Ok(Json(state.store.list_articles().await?))
}

pub async fn list_featured_articles(
    State(state): State<AppState>,
) -> Result<Json<Vec<Article>>, AppError> {
    let rows = state
        .store
        .list_featured_articles(FEATURED_ARTICLE_LIMIT)
        .await?;
    Ok(Json(rows))
}

/// Each fetch counts as one view.
pub async fn get_article(
    State(state): State<AppState>,
    Path(article_id): Path<String>,
) -> Result<Json<Article>, AppError> {
    state
        .store
        .view_article(&article_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Article not found".to_string()))
}

pub async fn search_articles(
    State(state): State<AppState>,
    query: Result<Query<TitleQuery>, QueryRejection>,
) -> Result<Json<Vec<Article>>, AppError> {
    let Query(query) = query?;
    let term = query.title.unwrap_or_default();
    Ok(Json(state.store.search_articles(term.trim()).await?))
}

pub async fn list_articles_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<Vec<Article>>, AppError> {
    Ok(Json(state.store.list_articles_by_category(&category).await?))
}
