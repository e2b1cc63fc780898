//! Forgiving deserializers for the persisted quest log.
//!
//! The data file may come from older versions or be edited by hand. Each
//! helper accepts any JSON value and substitutes a documented fallback
//! instead of failing the whole load.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

use crate::new_id;
use crate::progression::Character;
use crate::quest::{Difficulty, QuestType, QuestValue};

/// The Unix epoch, used for quests whose creation time is unknown
pub fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::default()
}

/// Parse an ISO-8601 style timestamp string
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }
    None
}

fn timestamp_value(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_timestamp(s),
        _ => None,
    }
}

/// Default for a missing quest `createdAt`
pub fn missing_epoch() -> DateTime<Utc> {
    warn!("Missing createdAt on quest, assigning epoch");
    epoch()
}

/// Timestamp, or the epoch when unreadable
pub fn timestamp_or_epoch<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(timestamp_value(&value).unwrap_or_else(|| {
        warn!(raw = %value, "Unreadable createdAt, assigning epoch");
        epoch()
    }))
}

/// Default for a missing chain or idea `createdAt`
pub fn missing_now() -> DateTime<Utc> {
    warn!("Missing createdAt, assigning current time");
    Utc::now()
}

/// Timestamp, or the current time when unreadable
pub fn timestamp_or_now<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(timestamp_value(&value).unwrap_or_else(|| {
        warn!(raw = %value, "Unreadable createdAt, assigning current time");
        Utc::now()
    }))
}

/// Optional timestamp; anything unreadable becomes `None`
pub fn optional_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    let parsed = timestamp_value(&value);
    if parsed.is_none() {
        warn!(raw = %value, "Unreadable timestamp, clearing it");
    }
    Ok(parsed)
}

/// Identifier, or a fresh one when absent or unusable
pub fn id_or_new<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) if !s.trim().is_empty() => s,
        Value::Number(n) => n.to_string(),
        other => {
            let id = new_id();
            warn!(raw = %other, new_id = %id, "Unusable id, assigning a new one");
            id
        }
    })
}

/// Optional reference id; null and empty strings mean "none"
pub fn optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Free text; numbers are stringified, anything else becomes empty
pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

/// Boolean flag; anything that is not `true` is false
pub fn boolean<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(matches!(value, Value::Bool(true)))
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Optional finite number; numeric strings are accepted
pub fn optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    let parsed = number(&value).filter(|n| n.is_finite());
    if parsed.is_none() {
        warn!(raw = %value, "Unreadable number, ignoring it");
    }
    Ok(parsed)
}

/// Optional difficulty, clamped into range
pub fn difficulty<'de, D>(deserializer: D) -> Result<Option<Difficulty>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    let parsed = number(&value).map(Difficulty::new);
    if parsed.is_none() {
        warn!(raw = %value, "Unreadable difficulty, clearing it");
    }
    Ok(parsed)
}

/// Quest value, clamped into range; unreadable values become 0
pub fn quest_value<'de, D>(deserializer: D) -> Result<QuestValue, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(number(&value).map(QuestValue::from).unwrap_or_default())
}

/// Optional quest value, clamped into range
pub fn optional_quest_value<'de, D>(deserializer: D) -> Result<Option<QuestValue>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(number(&value).map(QuestValue::from))
}

/// Quest type; unknown kinds fall back to side quests
pub fn quest_type<'de, D>(deserializer: D) -> Result<QuestType, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let parsed = value.as_str().and_then(|s| s.parse().ok());
    Ok(parsed.unwrap_or_else(|| {
        warn!(raw = %value, "Unknown questType, treating as side");
        QuestType::Side
    }))
}

/// Sequence that drops entries it cannot read
pub fn skip_invalid<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    let items = match value {
        Value::Array(items) => items,
        Value::Null => return Ok(Vec::new()),
        other => {
            warn!(raw = %other, "Expected a list, ignoring it");
            return Ok(Vec::new());
        }
    };

    let mut out = Vec::with_capacity(items.len());
    for item in items {
        match serde_json::from_value::<T>(item) {
            Ok(parsed) => out.push(parsed),
            Err(e) => warn!("Skipping unreadable entry: {}", e),
        }
    }
    Ok(out)
}

/// Character record, or one with an unknown creation time when unreadable
pub fn character<'de, D>(deserializer: D) -> Result<Character, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_else(|e| {
        warn!("Unreadable character, using defaults: {}", e);
        Character::recovered()
    }))
}
