use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A scraped post as the backend reports it.
///
/// Deserialization never fails for an object: missing, `null` or mistyped
/// fields fall back to their defaults. Text fields accept numbers, counters
/// accept numeric strings and floats, and `images` keeps only its string
/// entries. Serializing
/// writes the canonical camelCase keys, so a serialized list can be fed back
/// through the normalizer unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Post {
    #[serde(alias = "_id", deserialize_with = "lenient_text")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient_author")]
    pub user: Option<PostAuthor>,
    #[serde(deserialize_with = "lenient_text")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient_images")]
    pub images: Vec<String>,
    #[serde(deserialize_with = "lenient_count")]
    pub likes_count: u64,
    #[serde(deserialize_with = "lenient_count")]
    pub comments_count: u64,
    #[serde(deserialize_with = "lenient_text")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PostAuthor {
    #[serde(deserialize_with = "lenient_text")]
    pub username: Option<String>,
}

impl Post {
    pub fn author(&self) -> Option<&str> {
        self.user
            .as_ref()
            .and_then(|user| user.username.as_deref())
            .filter(|name| !name.is_empty())
    }

    /// Creation time, if `createdAt` is present and parseable.
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        self.created_at.as_deref().and_then(parse_timestamp)
    }
}

/// Parses the timestamp shapes the backend has been seen to emit: RFC 3339,
/// naive ISO date-times (read as UTC), bare dates, bare four-digit years
/// (January 1st), and epoch milliseconds.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }
    if raw.len() == 4 && raw.bytes().all(|byte| byte.is_ascii_digit()) {
        return raw
            .parse::<i32>()
            .ok()
            .and_then(|year| Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).single());
    }
    raw.parse::<i64>()
        .ok()
        .and_then(|millis| Utc.timestamp_millis_opt(millis).single())
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    })
}

/// Non-negative counts; anything else reads as zero. Fractions are truncated.
fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let count = match Value::deserialize(deserializer)? {
        Value::Number(number) => number.as_u64().or_else(|| number.as_f64().map(truncate_count)),
        Value::String(text) => text.trim().parse::<f64>().ok().map(truncate_count),
        _ => None,
    };
    Ok(count.unwrap_or(0))
}

fn truncate_count(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value as u64
    } else {
        0
    }
}

fn lenient_images<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(entries) => entries
            .into_iter()
            .filter_map(|entry| match entry {
                Value::String(url) => Some(url),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

fn lenient_author<'de, D>(deserializer: D) -> Result<Option<PostAuthor>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        author @ Value::Object(_) => PostAuthor::deserialize(author).ok(),
        _ => None,
    })
}
