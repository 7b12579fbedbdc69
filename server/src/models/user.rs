use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Volunteer,
    Organization,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Volunteer => "volunteer",
            UserType::Organization => "organization",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "volunteer" => Ok(UserType::Volunteer),
            "organization" => Ok(UserType::Organization),
            other => Err(format!("unknown user type '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub user_type: String,
    pub full_name: Option<String>,
    pub nik: Option<String>,
    pub organization_name: Option<String>,
    pub npwp: Option<String>,
    pub phone_number: Option<String>,
    pub profile_image_path: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    pub fn is_organization(&self) -> bool {
        self.user_type == UserType::Organization.as_str()
    }

    /// Person name for volunteers, organization name otherwise.
    pub fn display_name(&self) -> Option<String> {
        self.full_name
            .clone()
            .or_else(|| self.organization_name.clone())
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub user_type: UserType,
    pub full_name: Option<String>,
    pub nik: Option<String>,
    pub organization_name: Option<String>,
    pub npwp: Option<String>,
}

/// Public profile. Never carries the password hash.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub user_type: String,
    pub full_name: Option<String>,
    pub nik: Option<String>,
    pub npwp: Option<String>,
    pub phone_number: Option<String>,
    pub profile_image_path: Option<String>,
}

impl From<UserRow> for UserProfile {
    fn from(row: UserRow) -> Self {
        let full_name = row.display_name();
        Self {
            id: row.id,
            email: row.email,
            user_type: row.user_type,
            full_name,
            nik: row.nik,
            npwp: row.npwp,
            phone_number: row.phone_number,
            profile_image_path: row.profile_image_path,
        }
    }
}
