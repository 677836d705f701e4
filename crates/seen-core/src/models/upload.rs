use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;
use uuid::Uuid;

/// Media kind enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "media_kind", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            MediaKind::Image => write!(f, "image"),
            MediaKind::Video => write!(f, "video"),
        }
    }
}

/// Provenance of an upload's coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "location_source", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum LocationSource {
    Exif,
    UserSupplied,
    Manual,
    Address,
}

/// Verification status classification for an upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "verification_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Unverified,
    Verified,
    PotentialIssues,
}

impl Display for VerificationStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            VerificationStatus::Unverified => write!(f, "unverified"),
            VerificationStatus::Verified => write!(f, "verified"),
            VerificationStatus::PotentialIssues => write!(f, "potential_issues"),
        }
    }
}

/// One user-submitted geo-tagged media asset plus its metadata and
/// verification state.
///
/// A record with a non-null `deleted_at` is soft-deleted and excluded from
/// every read path; rows are never hard-deleted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Upload {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub media_url: String,
    pub media_kind: MediaKind,
    pub description: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub location_source: Option<LocationSource>,
    pub captured_at: Option<DateTime<Utc>>,
    pub location_name: Option<String>,
    pub verified: bool,
    pub verification_result: Option<String>,
    pub verification_status: VerificationStatus,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Upload {
    /// Coordinate pair, present only when both components are set.
    pub fn coordinate(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some((lat, lng)),
            _ => None,
        }
    }

    /// Verification is pending while no result text has been written.
    pub fn verification_pending(&self) -> bool {
        self.verification_result.is_none()
    }
}
