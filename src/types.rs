use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Feed records — verbatim from the feed, ids normalized to strings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct Market {
    pub id: String,
    /// Free-text label; encodes subject/prop-type via naming conventions.
    pub name: String,
    pub subcategory_id: Option<String>,
    pub event_id: Option<String>,
    /// The original feed object, kept for structure analysis.
    #[serde(skip)]
    pub raw: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Selection {
    pub market_id: String,
    /// Free-text, e.g. "Over", "Under", "1st", "2750+", or a proper name.
    pub label: String,
    /// Optional numeric line.
    pub points: Option<f64>,
    /// American odds display string as sent by the feed. May use the
    /// non-ASCII minus glyph U+2212.
    pub odds_american: Option<String>,
    #[serde(skip)]
    pub raw: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub id: String,
    /// Ordered as sent by the feed; standings markets key off the first entry.
    pub participants: Vec<Participant>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Participant {
    pub name: String,
}

// ---------------------------------------------------------------------------
// Market classification
// ---------------------------------------------------------------------------

/// Ordinal-finish labels used by standings markets.
pub const ORDINAL_LABELS: &[&str] = &["1st", "2nd", "3rd", "4th"];

/// The closed set of market shapes the extractor knows how to handle.
/// Exactly one value is chosen per fetch, before per-selection extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketType {
    PlayerProps,
    OverUnder,
    DivisionStandings,
    Threshold,
    RookieProps,
    StandardFutures,
    Unknown,
}

impl std::fmt::Display for MarketType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MarketType::PlayerProps => "player_props",
            MarketType::OverUnder => "over_under",
            MarketType::DivisionStandings => "division_standings",
            MarketType::Threshold => "threshold",
            MarketType::RookieProps => "rookie_props",
            MarketType::StandardFutures => "standard_futures",
            MarketType::Unknown => "unknown",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Normalized output
// ---------------------------------------------------------------------------

/// The universal output unit; one per retained selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedRecord {
    pub subject: String,
    pub proposition: String,
    pub odds: String,
}

/// One-row-per-subject shape produced by the over/under pivot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PivotRow {
    pub participant: String,
    pub line: String,
    pub over_odds: String,
    pub under_odds: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Table {
    /// One row per selection: {Subject, Proposition, Odds}.
    Standard(Vec<NormalizedRecord>),
    /// One row per subject: {Participant, Line, Over Odds, Under Odds}.
    Pivoted(Vec<PivotRow>),
}

impl Table {
    pub fn is_empty(&self) -> bool {
        match self {
            Table::Standard(rows) => rows.is_empty(),
            Table::Pivoted(rows) => rows.is_empty(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Table::Standard(rows) => rows.len(),
            Table::Pivoted(rows) => rows.len(),
        }
    }
}

/// Empty results are a distinct condition, not a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    Ok,
    NoData,
}

impl std::fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanStatus::Ok => write!(f, "ok"),
            ScanStatus::NoData => write!(f, "no data"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScanResult {
    pub table: Table,
    pub status: ScanStatus,
    pub market_type: MarketType,
}

// ---------------------------------------------------------------------------
// Channel message types — worker → main, one ordered queue
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum WorkerMsg {
    /// Human-readable progress line for the log surface.
    Progress(String),
    Finished(ScanResult),
    /// Terminal error for this fetch cycle; no partial table follows.
    Failed(String),
}
