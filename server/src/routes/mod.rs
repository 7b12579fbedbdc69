use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_security_headers_layer};
use crate::handlers::{articles, events, health_check, not_found, participation, users};
use crate::state::AppState;

fn api_routes() -> Router<AppState> {
    // Per-route fallbacks turn a wrong method into the same 404 envelope as
    // an unknown path.
    Router::new()
        .route("/health", get(health_check).fallback(not_found))
        .route(
            "/users/register",
            post(users::register_user).fallback(not_found),
        )
        .route("/users/login", post(users::login).fallback(not_found))
        .route("/users/:id", get(users::get_user).fallback(not_found))
        .route(
            "/events",
            get(events::list_events)
                .post(events::create_event)
                .fallback(not_found),
        )
        .route(
            "/events/search",
            get(events::search_events).fallback(not_found),
        )
        .route(
            "/events/organizer/:organizer_id",
            get(events::list_events_by_organizer).fallback(not_found),
        )
        .route("/events/:id", get(events::get_event).fallback(not_found))
        .route(
            "/participation",
            post(participation::register_participation).fallback(not_found),
        )
        .route(
            "/participation/user/:user_id",
            get(participation::list_user_participations).fallback(not_found),
        )
        .route("/articles", get(articles::list_articles).fallback(not_found))
        .route(
            "/articles/featured",
            get(articles::list_featured_articles).fallback(not_found),
        )
        .route(
            "/articles/search",
            get(articles::search_articles).fallback(not_found),
        )
        .route(
            "/articles/category/:category",
            get(articles::list_articles_by_category).fallback(not_found),
        )
        .route("/articles/:id", get(articles::get_article).fallback(not_found))
}

/// Full application router without process-level concerns, so tests can
/// drive it directly.
pub fn create_routes(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .fallback(not_found)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(create_security_headers_layer())
        .layer(create_cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
