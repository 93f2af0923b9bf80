use crate::analyzer::subject_from_name;
use crate::feed::FeedIndex;
use crate::types::{Market, MarketType, NormalizedRecord, Selection, ORDINAL_LABELS};

/// The shape-specific rule chosen for one selection. Selection happens in
/// `rule_for` (ordered, first applicable wins), application in `apply` —
/// one match arm per variant, so precedence and per-variant behavior are
/// testable in isolation.
#[derive(Debug, PartialEq)]
pub enum ExtractionRule<'a> {
    /// Standings market with an ordinal label and a resolvable event:
    /// subject is the event's first participant.
    StandingsPlace { participant: &'a str },
    /// Props market, "Subject - Prop Type" name, Over/Under label.
    PropLine { subject: &'a str, prop_type: &'a str },
    /// Threshold-style "2750+" buckets; subject before " - " or "Any Player".
    ThresholdBucket { subject: Option<&'a str> },
    /// Any Over/Under selection carrying a line.
    DirectionalLine { subject: &'a str },
    /// "... Finishing Position" markets: label is the subject, points is
    /// the finishing slot.
    FinishingPosition { position: Option<f64> },
    /// Always applicable: label and market name verbatim.
    Verbatim,
}

/// Produce exactly one normalized record for a retained selection.
pub fn extract(
    selection: &Selection,
    market: &Market,
    index: &FeedIndex,
    market_type: MarketType,
) -> NormalizedRecord {
    let rule = rule_for(selection, market, index, market_type);
    apply(&rule, selection, market)
}

fn rule_for<'a>(
    selection: &'a Selection,
    market: &'a Market,
    index: &'a FeedIndex,
    market_type: MarketType,
) -> ExtractionRule<'a> {
    let label = selection.label.as_str();
    let name = market.name.as_str();
    let directional = label == "Over" || label == "Under";

    if market_type == MarketType::DivisionStandings && ORDINAL_LABELS.contains(&label) {
        // Standings markets are keyed by ordinal finish; the real-world
        // subject lives on the owning event. Unresolvable events fall
        // through to the later rules.
        let participant = index
            .market_to_event
            .get(&market.id)
            .and_then(|event_id| index.events_by_id.get(event_id))
            .and_then(|event| event.participants.first());
        if let Some(p) = participant {
            return ExtractionRule::StandingsPlace { participant: &p.name };
        }
    }

    if market_type == MarketType::PlayerProps && directional {
        if let Some((subject, prop_type)) = name.split_once(" - ") {
            return ExtractionRule::PropLine {
                subject: subject.trim(),
                prop_type: prop_type.trim(),
            };
        }
    }

    if matches!(market_type, MarketType::Threshold | MarketType::RookieProps)
        && label.ends_with('+')
    {
        let subject = name.split_once(" - ").map(|(s, _)| s.trim());
        return ExtractionRule::ThresholdBucket { subject };
    }

    if directional && selection.points.is_some() {
        let subject = subject_from_name(name).unwrap_or_else(|| name.trim());
        return ExtractionRule::DirectionalLine { subject };
    }

    if name.contains("Finishing Position") {
        return ExtractionRule::FinishingPosition { position: selection.points };
    }

    ExtractionRule::Verbatim
}

fn apply(rule: &ExtractionRule<'_>, selection: &Selection, market: &Market) -> NormalizedRecord {
    let (subject, proposition) = match rule {
        ExtractionRule::StandingsPlace { participant } => (
            participant.to_string(),
            format!("{} Place", selection.label),
        ),
        ExtractionRule::PropLine { subject, prop_type } => {
            let proposition = match selection.points {
                Some(points) => {
                    format!("{} - {} {}", prop_type, selection.label, fmt_points(points))
                }
                None => format!("{} - {}", prop_type, selection.label),
            };
            (subject.to_string(), proposition)
        }
        ExtractionRule::ThresholdBucket { subject } => (
            subject.unwrap_or("Any Player").to_string(),
            format!("{} - {}", market.name, selection.label),
        ),
        ExtractionRule::DirectionalLine { subject } => {
            // points is present by rule construction.
            let points = selection.points.unwrap_or_default();
            (
                subject.to_string(),
                format!("{} {}", selection.label, fmt_points(points)),
            )
        }
        ExtractionRule::FinishingPosition { position } => {
            let proposition = match position {
                Some(p) => {
                    let n = *p as i64;
                    format!("Finish {}{}", n, ordinal_suffix(n))
                }
                None => "N/A".to_string(),
            };
            (selection.label.clone(), proposition)
        }
        ExtractionRule::Verbatim => (selection.label.clone(), market.name.clone()),
    };

    NormalizedRecord {
        subject: placeholder_if_empty(subject),
        proposition: placeholder_if_empty(proposition),
        odds: normalize_odds(selection.odds_american.as_deref()),
    }
}

fn placeholder_if_empty(s: String) -> String {
    if s.trim().is_empty() {
        "N/A".to_string()
    } else {
        s
    }
}

/// Lines print the way the feed means them: 275.0 → "275", 5.5 → "5.5".
pub fn fmt_points(points: f64) -> String {
    format!("{points}")
}

/// English ordinal suffix, including the 11–13 exception.
pub fn ordinal_suffix(n: i64) -> &'static str {
    if (11..=13).contains(&(n % 100).abs()) {
        return "th";
    }
    match (n % 10).abs() {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}

/// The feed renders negative American odds with U+2212. Downstream writers
/// want plain ASCII; missing or empty odds become "N/A". Idempotent.
pub fn normalize_odds(odds: Option<&str>) -> String {
    match odds {
        Some(s) if !s.trim().is_empty() => s.replace('\u{2212}', "-"),
        _ => "N/A".to_string(),
    }
}
