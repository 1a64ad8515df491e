//! Core data types shared by the repository and the HTTP layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted note as returned by the API.
///
/// `tags` preserve insertion order; `summary` and `elaboration` are written
/// only by their respective LLM endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub title: String,
    pub body: String,
    pub summary: String,
    pub elaboration: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for `POST /api/notes`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateNote {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

/// Request body for `PUT /api/notes/{id}`.
///
/// Absent fields are left unchanged; a present `tags` array replaces the
/// full tag set (no merge).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateNote {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}
