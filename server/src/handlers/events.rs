use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{required, rupiah};
use crate::models::{new_id, Event, EventRow, Location, NewEvent};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::created;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub organizer_id: Option<String>,
    pub organizer_name: Option<String>,
    pub location: Option<Location>,
    pub event_start_time: Option<DateTime<Utc>>,
    pub event_end_time: Option<DateTime<Utc>>,
    pub target_volunteer_count: Option<i32>,
    pub participation_fee_idr: Option<Decimal>,
    pub category: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TitleQuery {
    pub title: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EventCreated {
    event_id: String,
}

fn to_events(rows: Vec<EventRow>) -> Json<Vec<Event>> {
    Json(rows.into_iter().map(Event::from).collect())
}

pub async fn list_events(State(state): State<AppState>) -> Result<Json<Vec<Event>>, AppError> {
    let rows = state.store.list_active_events().await?;
    Ok(to_events(rows))
}

pub async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> Result<Json<Event>, AppError> {
    let row = state
        .store
        .find_active_event(&event_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;
    Ok(Json(Event::from(row)))
}

pub async fn search_events(
    State(state): State<AppState>,
    query: Result<Query<TitleQuery>, QueryRejection>,
) -> Result<Json<Vec<Event>>, AppError> {
    let Query(query) = query?;
    let title = query.title.unwrap_or_default();
    let rows = state.store.search_active_events(title.trim()).await?;
    Ok(to_events(rows))
}

pub async fn list_events_by_organizer(
    State(state): State<AppState>,
    Path(organizer_id): Path<String>,
) -> Result<Json<Vec<Event>>, AppError> {
    let rows = state.store.list_events_by_organizer(&organizer_id).await?;
    Ok(to_events(rows))
}

pub async fn create_event(
    State(state): State<AppState>,
    payload: Result<Json<CreateEventRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(req) = payload?;

    let title = required(req.title, "title")?;
    let description = required(req.description, "description")?;
    let organizer_id = required(req.organizer_id, "organizerId")?;
    let category = required(req.category, "category")?;

    let target_volunteer_count = match req.target_volunteer_count {
        Some(n) if n > 0 => n,
        Some(_) => {
            return Err(AppError::ValidationError(
                "targetVolunteerCount must be greater than zero".to_string(),
            ))
        }
        None => {
            return Err(AppError::ValidationError(
                "targetVolunteerCount is required".to_string(),
            ))
        }
    };

    let participation_fee_idr = rupiah(
        req.participation_fee_idr.unwrap_or(Decimal::ZERO),
        "participationFeeIdr",
    )?;

    if let (Some(start), Some(end)) = (req.event_start_time, req.event_end_time) {
        if end < start {
            return Err(AppError::ValidationError(
                "eventEndTime must not be before eventStartTime".to_string(),
            ));
        }
    }

    let organizer = state
        .store
        .find_user(&organizer_id)
        .await?
        .filter(|user| user.is_organization())
        .ok_or_else(|| {
            AppError::Forbidden("Only organizations can create events".to_string())
        })?;

    let event = state
        .store
        .create_event(NewEvent {
            id: new_id("event"),
            title,
            description,
            image_url: req.image_url,
            organizer_name: req.organizer_name.or(organizer.organization_name),
            organizer_id,
            event_start_time: req.event_start_time,
            event_end_time: req.event_end_time,
            target_volunteer_count,
            participation_fee_idr,
            category,
            location: req.location.unwrap_or_default(),
        })
        .await?;

    info!(
        event_id = %event.id,
        organizer_id = %event.organizer_id,
        target = event.target_volunteer_count,
        "Event created"
    );

    Ok(created(
        EventCreated { event_id: event.id },
        "Event created",
    ))
}
