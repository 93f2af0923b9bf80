use std::collections::HashMap;

use tracing::debug;

use crate::analyzer::StructureReport;
use crate::config::{category_codes, label_ratios};
use crate::types::{MarketType, ORDINAL_LABELS};

/// Aggregate label-shape counts the rules score against.
#[derive(Debug, Default, PartialEq)]
pub struct LabelStats {
    pub total: usize,
    pub over_under: usize,
    pub ordinal: usize,
    pub plus_suffixed: usize,
}

impl LabelStats {
    pub fn from_counts(counts: &HashMap<String, usize>) -> Self {
        let mut stats = LabelStats::default();
        for (label, &count) in counts {
            stats.total += count;
            if label == "Over" || label == "Under" {
                stats.over_under += count;
            }
            if ORDINAL_LABELS.contains(&label.as_str()) {
                stats.ordinal += count;
            }
            if label.ends_with('+') {
                stats.plus_suffixed += count;
            }
        }
        stats
    }

    fn ratio(&self, count: usize) -> f64 {
        count as f64 / self.total as f64
    }
}

// ---------------------------------------------------------------------------
// Rule table — evaluated strictly in order; first Some wins. New market
// shapes are added by appending a rule, never by threading conditionals
// through existing ones.
// ---------------------------------------------------------------------------

struct Rule {
    name: &'static str,
    apply: fn(&LabelStats, &str) -> Option<MarketType>,
}

const LABEL_RULES: &[Rule] = &[
    // Over/Under is the most common and most specific signal, so it goes
    // first. Props feeds reuse the same labels and are told apart only by
    // the reserved category code.
    Rule {
        name: "over_under_ratio",
        apply: |stats, hint| {
            if stats.ratio(stats.over_under) > label_ratios::OVER_UNDER_MIN {
                if hint == category_codes::PLAYER_PROPS {
                    Some(MarketType::PlayerProps)
                } else {
                    Some(MarketType::OverUnder)
                }
            } else {
                None
            }
        },
    },
    Rule {
        name: "ordinal_ratio",
        apply: |stats, _| {
            if stats.ratio(stats.ordinal) > label_ratios::ORDINAL_MIN {
                Some(MarketType::DivisionStandings)
            } else {
                None
            }
        },
    },
    Rule {
        name: "plus_suffix_ratio",
        apply: |stats, _| {
            if stats.ratio(stats.plus_suffixed) > label_ratios::PLUS_SUFFIX_MIN {
                Some(MarketType::Threshold)
            } else {
                None
            }
        },
    },
];

/// Category codes whose shape is known even when the labels say nothing.
const HINT_TABLE: &[(&str, MarketType)] = &[
    (category_codes::PLAYER_PROPS, MarketType::PlayerProps),
    (category_codes::THRESHOLD, MarketType::Threshold),
    (category_codes::ROOKIE_PROPS, MarketType::RookieProps),
    (category_codes::DIVISION_STANDINGS, MarketType::DivisionStandings),
];

/// Classify one fetched feed. Deterministic and pure over the label
/// distribution and the category hint; record order never matters.
pub fn classify(report: &StructureReport, category_hint: &str) -> MarketType {
    let stats = LabelStats::from_counts(&report.label_counts);

    if stats.total > 0 {
        for rule in LABEL_RULES {
            if let Some(market_type) = (rule.apply)(&stats, category_hint) {
                debug!("Rule {} fired: {market_type}", rule.name);
                return market_type;
            }
        }
    }

    for (code, market_type) in HINT_TABLE {
        if category_hint == *code {
            return *market_type;
        }
    }

    MarketType::StandardFutures
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(counts: &[(&str, usize)]) -> StructureReport {
        let mut r = StructureReport::default();
        for (label, count) in counts {
            r.label_counts.insert(label.to_string(), *count);
        }
        r
    }

    #[test]
    fn over_under_dominated_feed() {
        let r = report(&[("Over", 10), ("Under", 10), ("Yes", 1)]);
        assert_eq!(classify(&r, ""), MarketType::OverUnder);
    }

    #[test]
    fn player_props_code_overrides_over_under() {
        let r = report(&[("Over", 10), ("Under", 10)]);
        assert_eq!(
            classify(&r, category_codes::PLAYER_PROPS),
            MarketType::PlayerProps
        );
        // Any other hint keeps the label-based answer.
        assert_eq!(classify(&r, "9999"), MarketType::OverUnder);
    }

    #[test]
    fn ordinal_dominated_feed_is_standings() {
        let r = report(&[("1st", 4), ("2nd", 4), ("3rd", 4), ("4th", 4), ("Over", 1)]);
        assert_eq!(classify(&r, ""), MarketType::DivisionStandings);
    }

    #[test]
    fn plus_suffix_majority_is_threshold() {
        let r = report(&[("2750+", 3), ("3000+", 3), ("Josh Allen", 2)]);
        assert_eq!(classify(&r, ""), MarketType::Threshold);
    }

    #[test]
    fn below_threshold_ratios_fall_to_hint_table() {
        let r = report(&[("Over", 1), ("Josh Allen", 9)]);
        assert_eq!(classify(&r, category_codes::ROOKIE_PROPS), MarketType::RookieProps);
        assert_eq!(
            classify(&r, category_codes::DIVISION_STANDINGS),
            MarketType::DivisionStandings
        );
        assert_eq!(classify(&r, category_codes::THRESHOLD), MarketType::Threshold);
    }

    #[test]
    fn empty_labels_use_hint_then_default() {
        let r = report(&[]);
        assert_eq!(classify(&r, category_codes::PLAYER_PROPS), MarketType::PlayerProps);
        assert_eq!(classify(&r, "1234567"), MarketType::StandardFutures);
    }

    #[test]
    fn unknown_everything_defaults_to_standard_futures() {
        let r = report(&[("Bills", 5), ("Jets", 5)]);
        assert_eq!(classify(&r, ""), MarketType::StandardFutures);
    }

    #[test]
    fn classification_ignores_insertion_order() {
        let a = report(&[("Over", 5), ("Under", 5)]);
        let b = report(&[("Under", 5), ("Over", 5)]);
        assert_eq!(classify(&a, ""), classify(&b, ""));
    }

    #[test]
    fn exact_threshold_does_not_fire() {
        // Ratio rules are strict inequalities: 8/10 over/under is not > 0.8.
        let r = report(&[("Over", 4), ("Under", 4), ("Bills", 2)]);
        assert_eq!(classify(&r, ""), MarketType::StandardFutures);
    }
}
