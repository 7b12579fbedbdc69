use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{required, rupiah};
use crate::models::{new_id, NewParticipation, Participation};
use crate::state::AppState;
use crate::store::StoreError;
use crate::utils::error::AppError;
use crate::utils::response::created;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterParticipationRequest {
    pub user_id: Option<String>,
    pub event_id: Option<String>,
    pub donation_amount: Option<Decimal>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Registered {
    participation_id: String,
}

pub async fn register_participation(
    State(state): State<AppState>,
    payload: Result<Json<RegisterParticipationRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(req) = payload?;

    let user_id = required(req.user_id, "userId")?;
    let event_id = required(req.event_id, "eventId")?;
    let donation_amount = rupiah(
        req.donation_amount.unwrap_or(Decimal::ZERO),
        "donationAmount",
    )?;

    let result = state
        .store
        .register_participation(NewParticipation {
            id: new_id("part"),
            user_id: user_id.clone(),
            event_id: event_id.clone(),
            donation_amount,
        })
        .await;

    let participation = match result {
        Ok(participation) => participation,
        Err(e @ (StoreError::EventFull | StoreError::AlreadyRegistered)) => {
            warn!(%event_id, %user_id, reason = %e, "Registration turned away");
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };

    info!(
        participation_id = %participation.id,
        %event_id,
        %user_id,
        "Volunteer registered"
    );

    Ok(created(
        Registered {
            participation_id: participation.id,
        },
        "Registration successful",
    ))
}

pub async fn list_user_participations(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Participation>>, AppError> {
    let rows = state.store.list_participations_for_user(&user_id).await?;
    Ok(Json(rows))
}
