use serde::{Deserialize, Deserializer, Serialize};

/// A single active giveaway as listed by the GamerPower API.
///
/// Only the fields the alert needs are kept; everything else in the upstream
/// object is ignored. Optional text fields accept `null` as well as absence.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Giveaway {
    /// Upstream sends a number; normalized to its decimal string form.
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(rename = "open_giveaway_url", default, deserialize_with = "null_as_empty")]
    pub url: String,
    #[serde(rename = "image", default, deserialize_with = "null_as_empty")]
    pub image_url: String,
    #[serde(default)]
    pub worth: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub platforms: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_empty")]
    pub kind: String,
    #[serde(default)]
    pub end_date: Option<String>,
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(u64),
        Text(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Number(n) => n.to_string(),
        RawId::Text(s) => s,
    })
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Outcome of one fetch-diff-notify-persist pass, reported as a JSON line.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub timestamp: String,
    /// Listings returned by the API.
    pub fetched: usize,
    /// Distinct ids that passed the type filter.
    pub eligible: usize,
    /// Eligible ids skipped because they were already in history.
    pub already_seen: usize,
    /// Ids notified this run, in notification order.
    pub notified: Vec<String>,
    /// Ids whose notification failed; they stay out of history.
    pub failed: Vec<String>,
    pub history_saved: bool,
    pub history_size: usize,
    pub dry_run: bool,
}
