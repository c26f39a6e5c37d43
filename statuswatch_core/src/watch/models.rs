use crate::{Error, Result};
use chrono::Utc;
use serde_json::Value;
use std::fmt;

/// Time marker bounding the next fetch window (Unix seconds).
///
/// Created at process start, then owned by the watch engine. It only moves
/// forward via an explicit server-supplied timestamp.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Cursor(i64);

impl Cursor {
    /// Cursor at the current wall-clock time.
    pub fn now() -> Self {
        Self(Utc::now().timestamp())
    }

    pub fn from_timestamp(ts: i64) -> Self {
        Self(ts)
    }

    pub fn timestamp(&self) -> i64 {
        self.0
    }

    /// Move to the server-supplied time when present; otherwise stay put.
    pub fn advance(&mut self, server_time: Option<i64>) {
        if let Some(ts) = server_time {
            self.0 = ts;
        }
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One fetched, validated response payload. Lives for a single poll cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    homeworks: Vec<Value>,
    current_date: Option<i64>,
}

impl Snapshot {
    /// Check a raw API response against the expected shape.
    ///
    /// An empty `homeworks` array is valid and signals "no change".
    /// `current_date` is surfaced only when it is an integer.
    #[tracing::instrument(level = "debug", skip(raw))]
    pub fn validate(raw: Value) -> Result<Self> {
        let Value::Object(mut map) = raw else {
            return Err(Error::Shape("api response must be a json object".to_string()));
        };

        let homeworks = map
            .remove("homeworks")
            .ok_or_else(|| Error::Shape("api response is missing the \"homeworks\" key".to_string()))?;
        let Value::Array(homeworks) = homeworks else {
            return Err(Error::Shape("\"homeworks\" must be an array".to_string()));
        };

        let current_date = map.get("current_date").and_then(Value::as_i64);

        Ok(Self {
            homeworks,
            current_date,
        })
    }

    pub fn homeworks(&self) -> &[Value] {
        &self.homeworks
    }

    /// The most recent homework in the snapshot, if any.
    pub fn first(&self) -> Option<&Value> {
        self.homeworks.first()
    }

    pub fn current_date(&self) -> Option<i64> {
        self.current_date
    }
}

/// Recognized review states and their fixed display phrases.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ReviewStatus {
    Approved,
    Reviewing,
    Rejected,
}

impl ReviewStatus {
    pub fn parse(tag: &str) -> Result<Self> {
        match tag {
            "approved" => Ok(Self::Approved),
            "reviewing" => Ok(Self::Reviewing),
            "rejected" => Ok(Self::Rejected),
            other => Err(Error::UnknownStatus(other.to_string())),
        }
    }

    pub fn phrase(&self) -> &'static str {
        match self {
            Self::Approved => "Работа проверена: ревьюеру всё понравилось. Ура!",
            Self::Reviewing => "Работа взята на проверку ревьюером.",
            Self::Rejected => "Работа проверена: у ревьюера есть замечания.",
        }
    }
}

/// Derive the human-readable verdict for one homework item.
///
/// The item must carry string `status` and `homework_name` fields, and the
/// status tag must be one of the recognized review states.
#[tracing::instrument(level = "debug", skip(item))]
pub fn interpret(item: &Value) -> Result<String> {
    let status = item
        .get("status")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::Shape("homework item is missing the \"status\" key".to_string()))?;
    let name = item.get("homework_name").and_then(Value::as_str).ok_or_else(|| {
        Error::Shape("homework item is missing the \"homework_name\" key".to_string())
    })?;

    let status = ReviewStatus::parse(status)?;
    Ok(format!(
        "Изменился статус проверки работы \"{name}\". {}",
        status.phrase()
    ))
}
