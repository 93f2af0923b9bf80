use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

use crate::config::{MAX_FIELD_VALUE_SAMPLES, MAX_MARKET_SAMPLES, MAX_SELECTION_SAMPLES};
use crate::progress::ProgressLog;
use crate::types::{Market, Selection};

// ---------------------------------------------------------------------------
// StructureReport — derived, non-authoritative, rebuilt fresh per fetch
// ---------------------------------------------------------------------------

/// Field names seen on sampled records, with a capped number of sample
/// values per field.
#[derive(Debug, Default, Serialize)]
pub struct FieldInventory {
    pub fields: BTreeMap<String, Vec<String>>,
}

impl FieldInventory {
    fn record(&mut self, obj: &serde_json::Map<String, serde_json::Value>) {
        for (key, value) in obj {
            let samples = self.fields.entry(key.clone()).or_default();
            if samples.len() < MAX_FIELD_VALUE_SAMPLES {
                samples.push(value_preview(value));
            }
        }
    }
}

/// Market-name conventions the feed is known to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NamePattern {
    /// "<subject> - <prop type>"
    DashSeparated,
    /// "<subject> Regular Season ..."
    RegularSeason,
    /// "<subject> Total ..."
    TotalPhrase,
    /// "<subject> to ..."
    ToPhrase,
    /// "<subject> Over ..." / "<subject> Under ..."
    OverUnderPhrase,
    /// "... Finishing Position ..."
    FinishingPosition,
}

#[derive(Debug, Default, Serialize)]
pub struct StructureReport {
    pub market_fields: FieldInventory,
    pub selection_fields: FieldInventory,
    /// label → occurrence count, over all selections.
    pub label_counts: HashMap<String, usize>,
    pub name_patterns: BTreeSet<NamePattern>,
    /// market name → inferred subject.
    pub participant_guesses: HashMap<String, String>,
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

/// Build a structure report for one fetched feed. Pure over its inputs:
/// field inventories sample the first 10 markets / 20 selections, label
/// counting scans every selection, pattern detection scans the sampled
/// markets, and a participant guess is attempted for every market name.
pub fn analyze(
    markets: &[Market],
    selections: &[Selection],
    progress: &ProgressLog,
) -> StructureReport {
    progress.line(format!(
        "  Analyzing structure: {} markets, {} selections...",
        markets.len(),
        selections.len()
    ));

    let mut report = StructureReport::default();

    for market in markets.iter().take(MAX_MARKET_SAMPLES) {
        report.market_fields.record(&market.raw);
        for pattern in detect_patterns(&market.name) {
            report.name_patterns.insert(pattern);
        }
    }

    for selection in selections.iter().take(MAX_SELECTION_SAMPLES) {
        report.selection_fields.record(&selection.raw);
    }

    for selection in selections {
        if selection.label.is_empty() {
            continue;
        }
        *report.label_counts.entry(selection.label.clone()).or_insert(0) += 1;
    }

    for market in markets {
        if let Some(subject) = guess_subject(market, selections) {
            report.participant_guesses.insert(market.name.clone(), subject);
        }
    }

    progress.line(format!(
        "  Structure: {} market fields, {} selection fields, {} distinct labels, {} subject guesses",
        report.market_fields.fields.len(),
        report.selection_fields.fields.len(),
        report.label_counts.len(),
        report.participant_guesses.len(),
    ));

    report
}

fn detect_patterns(name: &str) -> Vec<NamePattern> {
    let mut found = Vec::new();
    if name.contains(" - ") {
        found.push(NamePattern::DashSeparated);
    }
    if name.contains(" Regular Season") {
        found.push(NamePattern::RegularSeason);
    }
    if name.contains(" Total") {
        found.push(NamePattern::TotalPhrase);
    }
    if name.contains(" to ") {
        found.push(NamePattern::ToPhrase);
    }
    if name.contains(" Over") || name.contains(" Under") {
        found.push(NamePattern::OverUnderPhrase);
    }
    if name.contains("Finishing Position") {
        found.push(NamePattern::FinishingPosition);
    }
    found
}

// ---------------------------------------------------------------------------
// Participant guessing
// ---------------------------------------------------------------------------

/// Ordered prefix markers: text before the first matching marker is the
/// subject. Order matters — "Regular Season" must beat the bare "Over"
/// marker on names like "Team A Regular Season Over 5.5 Wins".
const SUBJECT_MARKERS: &[&str] =
    &[" Regular Season", " Total", " to ", " Over", " Under"];

/// Extract a subject from a market name via the ordered marker list.
/// A capture whose trimmed length is ≤ 2 chars is treated as spurious and
/// scanning continues with the next marker.
pub fn subject_from_name(name: &str) -> Option<&str> {
    for marker in SUBJECT_MARKERS {
        if let Some(pos) = name.find(marker) {
            let prefix = name[..pos].trim();
            if prefix.chars().count() > 2 {
                return Some(prefix);
            }
        }
    }
    None
}

/// Try, in order: a participant-like field on a sample selection of this
/// market, a " - " split of the name, then the marker prefixes. No match
/// records no guess.
fn guess_subject(market: &Market, selections: &[Selection]) -> Option<String> {
    if let Some(sample) = selections.iter().find(|s| s.market_id == market.id) {
        for (key, value) in &sample.raw {
            if !is_participant_field(key) {
                continue;
            }
            if let Some(name) = value.as_str() {
                let name = name.trim();
                if !name.is_empty() {
                    return Some(name.to_string());
                }
            }
        }
    }

    if let Some((subject, _)) = market.name.split_once(" - ") {
        let subject = subject.trim();
        if !subject.is_empty() {
            return Some(subject.to_string());
        }
    }

    subject_from_name(&market.name).map(str::to_string)
}

/// Participant identity sometimes rides on a dedicated selection field. The
/// generic "label" field never counts — it also carries Over/Under and
/// ordinal strings.
fn is_participant_field(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    key != "label" && (key.contains("participant") || key == "competitor" || key == "player")
}

fn value_preview(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
