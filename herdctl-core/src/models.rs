//! Livestock domain records
//!
//! Field names on the wire are camelCase and match the column names in every
//! backend, so a storage row deserializes straight into these types.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// An animal as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Animal {
    pub id: i64,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub ear_tag: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_int")]
    pub age: Option<i64>,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub breed: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_int")]
    pub births: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub registration_date: Option<String>,
}

/// Body of `POST /api/animals`.
///
/// `id` and `registrationDate` are assigned by the system; if a client sends
/// them they are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAnimal {
    #[serde(rename = "type", default, deserialize_with = "de::lenient_text")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_text")]
    pub ear_tag: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_int")]
    pub age: Option<i64>,
    #[serde(default, deserialize_with = "de::lenient_text")]
    pub birth_date: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_text")]
    pub breed: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_text")]
    pub gender: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_int")]
    pub births: Option<i64>,
    #[serde(default, deserialize_with = "de::lenient_text")]
    pub notes: Option<String>,
}

/// A breeding event between a cow and a bull.
///
/// `cowId`/`bullId` are not checked against existing animals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreedingRecord {
    pub id: i64,
    #[serde(default, deserialize_with = "de::lenient_int")]
    pub cow_id: Option<i64>,
    #[serde(default, deserialize_with = "de::lenient_int")]
    pub bull_id: Option<i64>,
    #[serde(default)]
    pub breeding_date: Option<String>,
    #[serde(default)]
    pub expected_birth_date: Option<String>,
    #[serde(default)]
    pub registered_date: Option<String>,
    #[serde(default, deserialize_with = "de::flag")]
    pub birth_registered: bool,
    #[serde(default)]
    pub actual_birth_date: Option<String>,
}

impl BreedingRecord {
    /// Birth status as recorded in storage.
    pub fn birth_status(&self) -> BirthStatus {
        match (&self.actual_birth_date, self.birth_registered) {
            (Some(date), true) => BirthStatus::Registered {
                actual_birth_date: date.clone(),
            },
            _ => BirthStatus::Unregistered,
        }
    }
}

/// Body of `POST /api/breeding`.
///
/// Only these four fields are read. Birth status always starts unregistered.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBreedingRecord {
    #[serde(default, deserialize_with = "de::lenient_int")]
    pub cow_id: Option<i64>,
    #[serde(default, deserialize_with = "de::lenient_int")]
    pub bull_id: Option<i64>,
    #[serde(default, deserialize_with = "de::lenient_text")]
    pub breeding_date: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_text")]
    pub expected_birth_date: Option<String>,
}

/// Body of `PUT /api/breeding/{id}/birth`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BirthRegistration {
    #[serde(default, deserialize_with = "de::lenient_text")]
    pub actual_birth_date: Option<String>,
}

/// Two-state birth status of a breeding record.
///
/// Both transitions are idempotent: registering an already registered record
/// overwrites the date, clearing an unregistered record changes nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BirthStatus {
    Unregistered,
    Registered { actual_birth_date: String },
}

impl BirthStatus {
    /// An absent or empty date clears the registration.
    pub fn from_request(actual_birth_date: Option<String>) -> Self {
        match actual_birth_date {
            Some(date) if !date.is_empty() => Self::Registered {
                actual_birth_date: date,
            },
            _ => Self::Unregistered,
        }
    }

    pub fn is_registered(&self) -> bool {
        matches!(self, Self::Registered { .. })
    }

    pub fn actual_birth_date(&self) -> Option<&str> {
        match self {
            Self::Registered { actual_birth_date } => Some(actual_birth_date),
            Self::Unregistered => None,
        }
    }
}

impl From<BirthRegistration> for BirthStatus {
    fn from(req: BirthRegistration) -> Self {
        Self::from_request(req.actual_birth_date)
    }
}

/// Result of a delete-by-id: 0 when nothing matched, 1 when a row was removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deleted {
    pub deleted: u64,
}

/// Format an instant the way registration dates are stored,
/// e.g. `2024-03-01T08:15:30.123Z`.
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Deserializers that absorb backend and client encoding differences.
mod de {
    use serde::de::{self, Deserializer, Unexpected};
    use serde::Deserialize;
    use serde_json::Value;

    /// Integer field that may arrive as a number, a numeric string, an empty
    /// string or null.
    pub fn lenient_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => Ok(Some(i)),
                // i64::MAX as f64 rounds up to 2^63, which is already out of range
                (None, Some(f))
                    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 =>
                {
                    Ok(Some(f as i64))
                }
                _ => Err(de::Error::invalid_value(
                    Unexpected::Other("non-integer or out-of-range number"),
                    &"an integer",
                )),
            },
            Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
            Some(Value::String(s)) => s.trim().parse().map(Some).map_err(|_| {
                de::Error::invalid_value(Unexpected::Str(&s), &"an integer")
            }),
            Some(other) => Err(de::Error::invalid_type(
                Unexpected::Other(value_kind(&other)),
                &"an integer",
            )),
        }
    }

    /// Free-form text field. Numbers and booleans are kept as their JSON
    /// text, so `1234` becomes `"1234"`.
    pub fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(Value::Bool(b)) => Ok(Some(b.to_string())),
            Some(other) => Err(de::Error::invalid_type(
                Unexpected::Other(value_kind(&other)),
                &"text",
            )),
        }
    }

    /// Boolean column stored natively, as 0/1, or null.
    pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => Ok(false),
            Some(Value::Bool(b)) => Ok(b),
            Some(Value::Number(n)) => Ok(n.as_f64().is_some_and(|f| f != 0.0)),
            Some(other) => Err(de::Error::invalid_type(
                Unexpected::Other(value_kind(&other)),
                &"a boolean or 0/1",
            )),
        }
    }

    fn value_kind(value: &Value) -> &'static str {
        match value {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }
}
