use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Flat `events` row. Location columns are nested into [`Location`] on the
/// way out.
#[derive(Debug, Clone, FromRow)]
pub struct EventRow {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub organizer_id: String,
    pub organizer_name: Option<String>,
    pub event_start_time: Option<DateTime<Utc>>,
    pub event_end_time: Option<DateTime<Utc>>,
    pub target_volunteer_count: i32,
    pub current_volunteer_count: i32,
    pub registered_volunteer_ids: Vec<String>,
    pub participation_fee_idr: Decimal,
    pub category: String,
    pub is_active: bool,
    pub location_country: Option<String>,
    pub location_province: Option<String>,
    pub location_city: Option<String>,
    pub location_district: Option<String>,
    pub location_village: Option<String>,
    pub location_rt_rw: Option<String>,
    pub location_latitude: Option<f64>,
    pub location_longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub country: Option<String>,
    pub province: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub village: Option<String>,
    pub rt_rw: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct NewEvent {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub organizer_id: String,
    pub organizer_name: Option<String>,
    pub event_start_time: Option<DateTime<Utc>>,
    pub event_end_time: Option<DateTime<Utc>>,
    pub target_volunteer_count: i32,
    pub participation_fee_idr: Decimal,
    pub category: String,
    pub location: Location,
}

impl NewEvent {
    pub fn into_row(self, created_at: DateTime<Utc>) -> EventRow {
        EventRow {
            id: self.id,
            title: self.title,
            description: self.description,
            image_url: self.image_url,
            organizer_id: self.organizer_id,
            organizer_name: self.organizer_name,
            event_start_time: self.event_start_time,
            event_end_time: self.event_end_time,
            target_volunteer_count: self.target_volunteer_count,
            current_volunteer_count: 0,
            registered_volunteer_ids: Vec::new(),
            participation_fee_idr: self.participation_fee_idr,
            category: self.category,
            is_active: true,
            location_country: self.location.country,
            location_province: self.location.province,
            location_city: self.location.city,
            location_district: self.location.district,
            location_village: self.location.village,
            location_rt_rw: self.location.rt_rw,
            location_latitude: self.location.latitude,
            location_longitude: self.location.longitude,
            created_at,
        }
    }
}

/// Response shape: row columns keep their snake_case names, the location
/// columns move into a camelCase [`Location`].
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub organizer_id: String,
    pub organizer_name: Option<String>,
    pub event_start_time: Option<DateTime<Utc>>,
    pub event_end_time: Option<DateTime<Utc>>,
    pub target_volunteer_count: i32,
    pub current_volunteer_count: i32,
    pub registered_volunteer_ids: Vec<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub participation_fee_idr: Decimal,
    pub category: String,
    pub is_active: bool,
    pub location: Location,
    pub created_at: DateTime<Utc>,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            image_url: row.image_url,
            organizer_id: row.organizer_id,
            organizer_name: row.organizer_name,
            event_start_time: row.event_start_time,
            event_end_time: row.event_end_time,
            target_volunteer_count: row.target_volunteer_count,
            current_volunteer_count: row.current_volunteer_count,
            registered_volunteer_ids: row.registered_volunteer_ids,
            participation_fee_idr: row.participation_fee_idr,
            category: row.category,
            is_active: row.is_active,
            location: Location {
                country: row.location_country,
                province: row.location_province,
                city: row.location_city,
                district: row.location_district,
                village: row.location_village,
                rt_rw: row.location_rt_rw,
                latitude: row.location_latitude,
                longitude: row.location_longitude,
            },
            created_at: row.created_at,
        }
    }
}
