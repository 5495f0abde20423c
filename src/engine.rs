use std::collections::HashSet;

use anyhow::Result;
use tracing::{info, warn};

use crate::GAME_TYPE;
use crate::api::GiveawaySource;
use crate::history::HistoryStore;
use crate::notifier::Notifier;
use crate::types::{Giveaway, RunSummary};

/// Pick the giveaways to announce, in announcement order.
///
/// Upstream lists newest first, so the list is walked in reverse: when several
/// new games show up in one run the oldest is announced first. Only
/// `type == "Game"` entries qualify, ids in `seen` are skipped, and an id
/// repeated within the listing is selected once.
pub fn select_new<'a>(giveaways: &'a [Giveaway], seen: &HashSet<String>) -> Vec<&'a Giveaway> {
    let mut picked: HashSet<&str> = HashSet::new();
    let mut out = Vec::new();
    for giveaway in giveaways.iter().rev() {
        if giveaway.kind != GAME_TYPE || seen.contains(&giveaway.id) {
            continue;
        }
        if picked.insert(giveaway.id.as_str()) {
            out.push(giveaway);
        }
    }
    out
}

/// One fetch-diff-notify-persist pass.
///
/// A failed delivery is logged and recorded; its id stays out of history so
/// the next run tries again. History is written only when at least one alert
/// went out, and never in dry-run mode. Fetch and save errors propagate.
pub async fn run_once<S, N>(
    source: &S,
    notifier: &N,
    store: &HistoryStore,
    dry_run: bool,
) -> Result<RunSummary>
where
    S: GiveawaySource + ?Sized,
    N: Notifier + ?Sized,
{
    let mut history = store.load();
    let seen: HashSet<String> = history.iter().cloned().collect();
    info!("Loaded {} seen id(s) from {}", seen.len(), store.path().display());

    info!("Fetching giveaways...");
    let giveaways = source.fetch_active().await?;

    let eligible_ids: HashSet<&str> = giveaways
        .iter()
        .filter(|g| g.kind == GAME_TYPE)
        .map(|g| g.id.as_str())
        .collect();
    let eligible = eligible_ids.len();
    let already_seen = eligible_ids.iter().filter(|id| seen.contains(**id)).count();

    let mut notified = Vec::new();
    let mut failed = Vec::new();

    for giveaway in select_new(&giveaways, &seen) {
        info!("Found new game: {} ({})", giveaway.title, giveaway.id);
        match notifier.send(giveaway).await {
            Ok(()) => {
                history.push(giveaway.id.clone());
                notified.push(giveaway.id.clone());
            }
            Err(e) => {
                warn!("Failed to notify giveaway {} ({}): {e:#}", giveaway.id, giveaway.title);
                failed.push(giveaway.id.clone());
            }
        }
    }

    let dirty = !notified.is_empty();
    let history_saved = if dirty && !dry_run {
        info!("Saving {} new id(s) to history...", notified.len());
        store.save(&history)?;
        true
    } else {
        if !dirty {
            info!("No new games found");
        } else {
            info!("Dry run — history left untouched");
        }
        false
    };

    Ok(RunSummary {
        timestamp: chrono::Utc::now().to_rfc3339(),
        fetched: giveaways.len(),
        eligible,
        already_seen,
        notified,
        failed,
        history_saved,
        history_size: history.len(),
        dry_run,
    })
}
