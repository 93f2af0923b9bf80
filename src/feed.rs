use std::collections::HashMap;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::{Config, HTTP_TIMEOUT_SECS};
use crate::error::{AppError, Result};
use crate::types::{Event, Market, Participant, Selection};

/// Fetch one league/category document. Subcategory filtering is a client-side
/// post-filter, not a separate endpoint call.
pub async fn fetch_feed(cfg: &Config) -> Result<serde_json::Value> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .build()?;

    let url = format!(
        "{}/leagues/{}/categories/{}",
        cfg.feed_base_url, cfg.league_id, cfg.category_id
    );
    debug!("GET {url}");

    let resp = client.get(&url).send().await?.error_for_status()?;
    let doc: serde_json::Value = resp.json().await?;
    Ok(doc)
}

/// Write the untouched document next to nothing else, named by
/// category/subcategory. Pass-through; parsing never reads it back.
pub async fn dump_raw(cfg: &Config, doc: &serde_json::Value) -> Result<String> {
    let dir = match &cfg.raw_dump_dir {
        Some(d) => d,
        None => return Err(AppError::Config("raw dump dir not set".to_string())),
    };
    let name = match &cfg.subcategory_id {
        Some(sub) => format!("raw_{}_{}.json", cfg.category_id, sub),
        None => format!("raw_{}.json", cfg.category_id),
    };
    let path = format!("{dir}/{name}");
    tokio::fs::create_dir_all(dir).await?;
    tokio::fs::write(&path, serde_json::to_vec_pretty(doc)?).await?;
    Ok(path)
}

// ---------------------------------------------------------------------------
// Normalization — raw document → typed collections + lookup indices
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct FeedDocument {
    pub markets: Vec<Market>,
    pub selections: Vec<Selection>,
    pub events: Vec<Event>,
}

#[derive(Debug, Default)]
pub struct NormalizeStats {
    pub markets_total: usize,
    pub markets_unparsed: usize,
    pub selections_total: usize,
    pub selections_unparsed: usize,
    pub events_total: usize,
}

/// Decode the three record collections from the raw document. Field shapes
/// vary by sport/category, so records are dug out of `Value` tolerantly;
/// a record missing its id is dropped and counted, never fatal.
pub fn normalize(doc: &serde_json::Value) -> Result<(FeedDocument, NormalizeStats)> {
    if !doc.is_object() {
        return Err(AppError::Feed("feed document was not an object".to_string()));
    }

    let mut out = FeedDocument::default();
    let mut stats = NormalizeStats::default();

    for item in array_field(doc, "markets") {
        stats.markets_total += 1;
        match parse_market(item) {
            Some(m) => out.markets.push(m),
            None => stats.markets_unparsed += 1,
        }
    }

    for item in array_field(doc, "selections") {
        stats.selections_total += 1;
        match parse_selection(item) {
            Some(s) => out.selections.push(s),
            None => stats.selections_unparsed += 1,
        }
    }

    for item in array_field(doc, "events") {
        stats.events_total += 1;
        if let Some(e) = parse_event(item) {
            out.events.push(e);
        }
    }

    if stats.markets_unparsed > 0 || stats.selections_unparsed > 0 {
        warn!(
            "Dropped unparseable records: markets={} selections={}",
            stats.markets_unparsed, stats.selections_unparsed
        );
    }

    Ok((out, stats))
}

fn array_field<'a>(doc: &'a serde_json::Value, key: &str) -> &'a [serde_json::Value] {
    doc.get(key).and_then(|v| v.as_array()).map(Vec::as_slice).unwrap_or(&[])
}

/// Feed ids arrive as strings in some categories and numbers in others.
pub fn id_string(v: &serde_json::Value) -> Option<String> {
    match v {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn number_field(v: &serde_json::Value) -> Option<f64> {
    v.as_f64().or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
}

pub fn parse_market(v: &serde_json::Value) -> Option<Market> {
    let obj = v.as_object()?;
    let id = obj.get("id").and_then(id_string)?;
    let name = obj
        .get("name")
        .and_then(|n| n.as_str())
        .unwrap_or("")
        .to_string();

    Some(Market {
        id,
        name,
        subcategory_id: obj.get("subcategoryId").and_then(id_string),
        event_id: obj.get("eventId").and_then(id_string),
        raw: obj.clone(),
    })
}

pub fn parse_selection(v: &serde_json::Value) -> Option<Selection> {
    let obj = v.as_object()?;
    let market_id = obj.get("marketId").and_then(id_string)?;

    let label = obj
        .get("label")
        .and_then(|l| l.as_str())
        .unwrap_or("")
        .trim()
        .to_string();

    let points = obj.get("points").and_then(number_field);

    let odds_american = obj
        .get("displayOdds")
        .and_then(|o| o.get("american"))
        .and_then(|a| a.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    Some(Selection {
        market_id,
        label,
        points,
        odds_american,
        raw: obj.clone(),
    })
}

pub fn parse_event(v: &serde_json::Value) -> Option<Event> {
    let obj = v.as_object()?;
    let id = obj.get("id").and_then(id_string)?;

    let participants = obj
        .get("participants")
        .and_then(|p| p.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|p| {
                    let name = p.get("name")?.as_str()?.trim();
                    if name.is_empty() {
                        None
                    } else {
                        Some(Participant { name: name.to_string() })
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    Some(Event { id, participants })
}

// ---------------------------------------------------------------------------
// FeedIndex
// ---------------------------------------------------------------------------

/// Lookup indices over the subcategory-filtered market set. Selections whose
/// market id is not in `markets_by_id` are dropped before extraction.
#[derive(Debug)]
pub struct FeedIndex {
    pub markets_by_id: HashMap<String, Market>,
    pub events_by_id: HashMap<String, Event>,
    pub market_to_event: HashMap<String, String>,
}

impl FeedIndex {
    pub fn build(doc: &FeedDocument, subcategory_id: Option<&str>) -> Self {
        let mut markets_by_id = HashMap::new();
        let mut market_to_event = HashMap::new();

        for market in &doc.markets {
            let keep = match subcategory_id {
                Some(sub) => market.subcategory_id.as_deref() == Some(sub),
                None => true,
            };
            if !keep {
                continue;
            }
            if let Some(event_id) = &market.event_id {
                market_to_event.insert(market.id.clone(), event_id.clone());
            }
            markets_by_id.insert(market.id.clone(), market.clone());
        }

        let events_by_id = doc
            .events
            .iter()
            .map(|e| (e.id.clone(), e.clone()))
            .collect();

        Self { markets_by_id, events_by_id, market_to_event }
    }

    /// Selections surviving the subcategory filter, in feed order.
    pub fn retained_selections<'a>(&self, doc: &'a FeedDocument) -> Vec<&'a Selection> {
        doc.selections
            .iter()
            .filter(|s| self.markets_by_id.contains_key(&s.market_id))
            .collect()
    }
}
