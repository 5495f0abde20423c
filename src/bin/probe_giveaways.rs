//! Probe: GamerPower giveaways listing
//!
//! Hits GET https://www.gamerpower.com/api/giveaways?platform=<platform> and documents:
//! - Response shape and fields
//! - Type breakdown (Game / DLC / Early Access)
//! - Whether every entry parses into our `Giveaway` record
//! - Latency

use std::collections::BTreeMap;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use serde_json::Value;
use url::Url;

use giveaway_alert::api::listing_url;
use giveaway_alert::types::Giveaway;
use giveaway_alert::{DEFAULT_PLATFORM, GAMERPOWER_API_BASE};

#[derive(Parser)]
#[command(name = "probe_giveaways", about = "Dump the GamerPower listing shape")]
struct Cli {
    /// Platform filter
    #[arg(long, default_value = DEFAULT_PLATFORM)]
    platform: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let url = listing_url(&Url::parse(GAMERPOWER_API_BASE)?, &cli.platform)?;

    println!("=== Probe: GamerPower giveaways ===");
    println!("URL: {url}");
    println!();

    let start = Instant::now();
    let resp = client.get(url).send().await?;
    let latency = start.elapsed();
    let status = resp.status();
    let body: Value = resp.json().await?;
    println!("Status: {status}");
    println!("Latency: {latency:?}");
    println!();

    let Some(arr) = body.as_array() else {
        println!("Response is not an array:");
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    };

    println!("Giveaway count: {}", arr.len());
    if let Some(first) = arr.first() {
        println!("\nSample giveaway (first):");
        println!("{}", serde_json::to_string_pretty(first)?);
        println!("\nFields present:");
        if let Some(obj) = first.as_object() {
            for key in obj.keys() {
                println!("  - {key}");
            }
        }
    }
    println!();

    println!("--- Type breakdown ---");
    let mut types: BTreeMap<String, usize> = BTreeMap::new();
    for item in arr {
        let kind = item.get("type").and_then(Value::as_str).unwrap_or("<missing>");
        *types.entry(kind.to_string()).or_default() += 1;
    }
    for (kind, count) in &types {
        println!("  {kind}: {count}");
    }
    println!();

    println!("--- Parse check ---");
    let mut failures = 0;
    for item in arr {
        if let Err(e) = serde_json::from_value::<Giveaway>(item.clone()) {
            failures += 1;
            println!("  id={} failed: {e}", item.get("id").unwrap_or(&Value::Null));
        }
    }
    println!("Parsed {}/{} entries", arr.len() - failures, arr.len());

    Ok(())
}
