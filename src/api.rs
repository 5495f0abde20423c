use std::time::Duration;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::types::Giveaway;

/// Anything that can list the currently active giveaways.
#[async_trait]
pub trait GiveawaySource {
    async fn fetch_active(&self) -> Result<Vec<Giveaway>>;
}

/// GamerPower listing client, filtered to a single platform.
pub struct GamerPowerClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl GamerPowerClient {
    /// Build a client for `{api_base}/giveaways?platform={platform}`.
    pub fn new(api_base: &Url, platform: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            endpoint: listing_url(api_base, platform)?,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

/// Listing endpoint for one platform. A trailing slash on the base is optional.
pub fn listing_url(api_base: &Url, platform: &str) -> Result<Url> {
    let base = api_base.as_str().trim_end_matches('/');
    let mut url = Url::parse(&format!("{base}/giveaways"))
        .with_context(|| format!("invalid API base {api_base}"))?;
    url.query_pairs_mut().append_pair("platform", platform);
    Ok(url)
}

/// Turn a listing body into giveaways.
///
/// GamerPower answers with a bare array when giveaways are live and with a
/// `{"status": .., "status_message": ..}` object when there are none; the
/// latter is an empty listing. Entries are converted one by one: a malformed
/// entry is logged and dropped, its neighbours are kept. Any other body shape
/// is an error.
pub fn parse_listing(body: Value) -> Result<Vec<Giveaway>> {
    let entries = match body {
        Value::Array(entries) => entries,
        Value::Object(obj) if obj.contains_key("status") => {
            let status = obj.get("status").cloned().unwrap_or(Value::Null);
            let message = obj
                .get("status_message")
                .and_then(Value::as_str)
                .unwrap_or_default();
            info!("Upstream reported no listings (status {status}): {message}");
            return Ok(Vec::new());
        }
        other => bail!(
            "unexpected listing body: expected an array or a status object, got {}",
            json_kind(&other)
        ),
    };

    let mut giveaways = Vec::with_capacity(entries.len());
    for entry in entries {
        let id = entry.get("id").cloned().unwrap_or(Value::Null);
        let kind = entry.get("type").cloned().unwrap_or(Value::Null);
        match serde_json::from_value::<Giveaway>(entry) {
            Ok(g) => giveaways.push(g),
            Err(e) => warn!("Skipping malformed listing entry id={id} type={kind}: {e}"),
        }
    }
    Ok(giveaways)
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[async_trait]
impl GiveawaySource for GamerPowerClient {
    /// One GET, no retry. Network errors, non-2xx statuses and non-JSON
    /// bodies all propagate.
    async fn fetch_active(&self) -> Result<Vec<Giveaway>> {
        let resp = self
            .http
            .get(self.endpoint.clone())
            .send()
            .await
            .with_context(|| format!("GET {} failed", self.endpoint))?
            .error_for_status()
            .context("giveaway listing returned an error status")?;
        let body: Value = resp
            .json()
            .await
            .context("giveaway listing is not valid JSON")?;
        let giveaways = parse_listing(body)?;
        debug!("Fetched {} giveaway(s)", giveaways.len());
        Ok(giveaways)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::serve_once;
    use serde_json::json;

    fn ids(list: &[Giveaway]) -> Vec<&str> {
        list.iter().map(|g| g.id.as_str()).collect()
    }

    // ── listing_url ────────────────────────────────────────────────

    #[test]
    fn listing_url_default_base() {
        let base = Url::parse(crate::GAMERPOWER_API_BASE).unwrap();
        let url = listing_url(&base, "pc").unwrap();
        assert_eq!(url.as_str(), "https://www.gamerpower.com/api/giveaways?platform=pc");
    }

    #[test]
    fn listing_url_trailing_slash_and_encoding() {
        let base = Url::parse("http://localhost:8080/api/").unwrap();
        let url = listing_url(&base, "epic-games-store").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/api/giveaways?platform=epic-games-store"
        );
    }

    #[test]
    fn client_builds_endpoint() {
        let base = Url::parse(crate::GAMERPOWER_API_BASE).unwrap();
        let client = GamerPowerClient::new(&base, "steam", Duration::from_secs(5)).unwrap();
        assert_eq!(
            client.endpoint().as_str(),
            "https://www.gamerpower.com/api/giveaways?platform=steam"
        );
    }

    // ── parse_listing ──────────────────────────────────────────────

    #[test]
    fn array_passes_through_in_order() {
        let list = parse_listing(json!([
            { "id": 3, "title": "C", "type": "Game" },
            { "id": 2, "title": "B", "type": "DLC" },
            { "id": 1, "title": "A", "type": "Game" }
        ]))
        .unwrap();
        assert_eq!(ids(&list), vec!["3", "2", "1"]);
    }

    #[test]
    fn status_object_is_empty() {
        let list = parse_listing(json!({
            "status": 0,
            "status_message": "No active giveaways available at the moment, please try again later."
        }))
        .unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn dlc_with_null_fields_does_not_break_listing() {
        let list = parse_listing(json!([
            { "id": 1, "title": "New game", "type": "Game" },
            { "id": 2, "title": "Some DLC", "type": "DLC", "description": null, "platforms": null }
        ]))
        .unwrap();
        assert_eq!(ids(&list), vec!["1", "2"]);
    }

    #[test]
    fn dlc_without_title_is_dropped() {
        let list = parse_listing(json!([
            { "id": 1, "title": "New game", "type": "Game" },
            { "id": 2, "type": "DLC" }
        ]))
        .unwrap();
        assert_eq!(ids(&list), vec!["1"]);
    }

    #[test]
    fn malformed_game_dropped_neighbours_kept() {
        let list = parse_listing(json!([
            { "id": 3, "title": "Newest", "type": "Game" },
            { "id": 2, "title": 42, "type": "Game" },
            { "id": 1, "title": "Oldest", "type": "Game" }
        ]))
        .unwrap();
        assert_eq!(ids(&list), vec!["3", "1"]);
    }

    #[test]
    fn unrelated_object_is_an_error() {
        let err = parse_listing(json!({ "error": "nope" })).unwrap_err();
        assert!(err.to_string().contains("an object"));
    }

    // ── fetch_active over HTTP ─────────────────────────────────────

    fn client_for(base: Url) -> GamerPowerClient {
        GamerPowerClient::new(&base, "pc", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn fetch_parses_json_listing() {
        let base = serve_once(
            "200 OK",
            "application/json",
            r#"[{"id":2,"title":"B","type":"Game"},{"id":1,"title":"A","type":"DLC","image":null}]"#,
        )
        .await;
        let list = client_for(base).fetch_active().await.unwrap();
        assert_eq!(ids(&list), vec!["2", "1"]);
    }

    #[tokio::test]
    async fn fetch_server_error_is_fatal() {
        let base = serve_once("500 Internal Server Error", "application/json", "[]").await;
        let err = client_for(base).fetch_active().await.unwrap_err();
        assert!(format!("{err:#}").contains("error status"));
    }

    #[tokio::test]
    async fn fetch_html_body_is_fatal() {
        let base = serve_once("200 OK", "text/html", "<html><body>Maintenance</body></html>").await;
        let err = client_for(base).fetch_active().await.unwrap_err();
        assert!(format!("{err:#}").contains("not valid JSON"));
    }
}
