//! Record model and its wire mapping
//!
//! The usuarios API speaks Spanish field names (`nombre`, `correo`,
//! `fecha_registro`); the domain uses `name`, `email` and `registered_at`.
//! The mapping lives entirely in the serde attributes below.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

/// Server-assigned record identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        RecordId(id)
    }
}

/// A user record as held by the authority.
///
/// `id` and `registered_at` are assigned by the authority and never written
/// by the client; [`RecordDraft`] is the only client-side write payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "correo")]
    pub email: String,
    #[serde(rename = "fecha_registro", default)]
    pub registered_at: RegisteredAt,
}

impl Record {
    /// The editable part of this record.
    pub fn draft(&self) -> RecordDraft {
        RecordDraft {
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Body of create and update requests: `{nombre, correo}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDraft {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "correo")]
    pub email: String,
}

impl RecordDraft {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        RecordDraft {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// Registration timestamp as received.
///
/// A value that does not parse is kept verbatim so one odd record cannot fail
/// a whole listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RegisteredAt {
    At(DateTime<Utc>),
    Unparsed(String),
    /// `null` or absent.
    #[default]
    Missing,
}

impl RegisteredAt {
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            RegisteredAt::At(ts) => Some(*ts),
            _ => None,
        }
    }

    pub fn parse(raw: &str) -> Self {
        match parse_registered_at(raw) {
            Some(ts) => RegisteredAt::At(ts),
            None => {
                debug!(raw, "keeping unrecognized registration timestamp");
                RegisteredAt::Unparsed(raw.to_string())
            }
        }
    }
}

impl From<DateTime<Utc>> for RegisteredAt {
    fn from(ts: DateTime<Utc>) -> Self {
        RegisteredAt::At(ts)
    }
}

impl Serialize for RegisteredAt {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RegisteredAt::At(ts) => {
                serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            RegisteredAt::Unparsed(raw) => serializer.serialize_str(raw),
            RegisteredAt::Missing => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for RegisteredAt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<String>::deserialize(deserializer)? {
            Some(raw) => RegisteredAt::parse(&raw),
            None => RegisteredAt::Missing,
        })
    }
}

/// Parse a registration timestamp in any of the shapes the authority emits.
///
/// Accepts RFC 3339, RFC 2822 (`Mon, 01 Jan 2024 00:00:00 GMT`),
/// `YYYY-MM-DD HH:MM:SS`, ISO-style `YYYY-MM-DDTHH:MM:SS` (with or without
/// fractional seconds) and bare `YYYY-MM-DD`. Naive values are taken as UTC.
pub fn parse_registered_at(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = DateTime::parse_from_rfc2822(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}
