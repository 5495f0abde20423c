pub mod api;
pub mod config;
pub mod engine;
pub mod history;
pub mod notifier;
pub mod reporter;
pub mod types;

#[cfg(test)]
mod test_support;

/// GamerPower public API base URL (no auth required)
pub const GAMERPOWER_API_BASE: &str = "https://www.gamerpower.com/api";

/// Platform filter sent with every listing request
pub const DEFAULT_PLATFORM: &str = "pc";

/// Environment variable holding the Discord webhook URL
pub const WEBHOOK_URL_VAR: &str = "WEBHOOK_URL";

/// Only listings of this type are announced (DLC, early access etc. are skipped)
pub const GAME_TYPE: &str = "Game";
