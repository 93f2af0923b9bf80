use crate::error::{AppError, Result};

pub const FEED_BASE_URL: &str =
    "https://sportsbook-nash.draftkings.com/api/sportscontent/dkusoh/v1";

/// Transport-level bound on a single fetch cycle (seconds).
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Field-inventory sampling bounds. Label counting and pattern detection
/// still scan per the analyzer contract; only the inventories are capped.
pub const MAX_MARKET_SAMPLES: usize = 10;
pub const MAX_SELECTION_SAMPLES: usize = 20;

/// Max sample values retained per field in a structure report.
pub const MAX_FIELD_VALUE_SAMPLES: usize = 3;

/// Classifier ratio thresholds over the label distribution.
pub mod label_ratios {
    /// Over/Under share above which a feed is an over/under board.
    pub const OVER_UNDER_MIN: f64 = 0.8;
    /// Ordinal-label share above which a feed is a standings board.
    pub const ORDINAL_MIN: f64 = 0.8;
    /// "+"-suffixed share above which a feed is a threshold board.
    pub const PLUS_SUFFIX_MIN: f64 = 0.5;
}

/// Known category ids with a fixed market shape. The feed does not document
/// these; they are the codes observed on the NFL league and live here so a
/// correction never touches classifier logic.
pub mod category_codes {
    /// Player props reuse Over/Under labels, so this code overrides the
    /// over/under ratio rule.
    pub const PLAYER_PROPS: &str = "1000";
    pub const THRESHOLD: &str = "1031";
    pub const ROOKIE_PROPS: &str = "1286";
    pub const DIVISION_STANDINGS: &str = "1006";
}

pub const DEFAULT_LEAGUE_ID: &str = "88808";

/// Static category/subcategory id catalog, loaded best-effort.
pub const REFERENCE_CATALOG_PATH: &str = "id_reference.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub feed_base_url: String,
    pub log_level: String,
    /// League to fetch (LEAGUE_ID). Defaults to NFL.
    pub league_id: String,
    /// Category to fetch (CATEGORY_ID). Required.
    pub category_id: String,
    /// Client-side post-filter on market subcategoryId (SUBCATEGORY_ID).
    /// Empty means no filtering.
    pub subcategory_id: Option<String>,
    /// When set (RAW_DUMP_DIR), the untouched feed document is written there
    /// before parsing.
    pub raw_dump_dir: Option<String>,
    /// Path to the id reference catalog (REFERENCE_PATH).
    pub reference_path: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let league_id = std::env::var("LEAGUE_ID")
            .unwrap_or_else(|_| DEFAULT_LEAGUE_ID.to_string())
            .trim()
            .to_string();
        let category_id = std::env::var("CATEGORY_ID")
            .unwrap_or_default()
            .trim()
            .to_string();

        if league_id.is_empty() || category_id.is_empty() {
            return Err(AppError::Config(
                "LEAGUE_ID and CATEGORY_ID cannot be empty".to_string(),
            ));
        }

        let subcategory_id = std::env::var("SUBCATEGORY_ID")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Ok(Self {
            feed_base_url: std::env::var("FEED_BASE_URL")
                .unwrap_or_else(|_| FEED_BASE_URL.to_string()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            league_id,
            category_id,
            subcategory_id,
            raw_dump_dir: std::env::var("RAW_DUMP_DIR")
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            reference_path: std::env::var("REFERENCE_PATH")
                .unwrap_or_else(|_| REFERENCE_CATALOG_PATH.to_string()),
        })
    }
}
