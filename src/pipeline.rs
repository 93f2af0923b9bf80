use tracing::warn;

use crate::analyzer;
use crate::classifier;
use crate::config::Config;
use crate::error::Result;
use crate::extractor;
use crate::feed::{self, FeedIndex};
use crate::formatter;
use crate::progress::ProgressLog;
use crate::reference::ReferenceCatalog;
use crate::types::{NormalizedRecord, ScanResult, ScanStatus, Table};

/// One full fetch-parse-format cycle. Runs on the worker task; everything
/// the front end should see goes through `progress`, and the single
/// terminal result comes back as the return value.
pub async fn run_cycle(
    cfg: &Config,
    catalog: &ReferenceCatalog,
    progress: &ProgressLog,
) -> Result<ScanResult> {
    progress.line("Scraping sportsbook feed...");
    progress.line(format!(
        "  League ID: {}, Category ID: {}, Sub-Category ID: {}",
        cfg.league_id,
        cfg.category_id,
        cfg.subcategory_id.as_deref().unwrap_or("None"),
    ));

    let doc = feed::fetch_feed(cfg).await?;
    progress.line("  Successfully fetched data feed.");

    if cfg.raw_dump_dir.is_some() {
        match feed::dump_raw(cfg, &doc).await {
            Ok(path) => progress.line(format!("  Raw response saved to {path}.")),
            // The dump is a side channel; a failed write never kills the cycle.
            Err(e) => warn!("Raw dump failed: {e}"),
        }
    }

    process_document(&doc, cfg, catalog, progress)
}

/// Everything after the network call: normalize, analyze, classify,
/// extract, format. Split out so the whole engine is testable on inline
/// JSON documents.
pub fn process_document(
    doc: &serde_json::Value,
    cfg: &Config,
    catalog: &ReferenceCatalog,
    progress: &ProgressLog,
) -> Result<ScanResult> {
    let (feed, stats) = feed::normalize(doc)?;
    progress.line(format!(
        "  Feed contains {} markets, {} selections, {} events.",
        stats.markets_total, stats.selections_total, stats.events_total,
    ));

    let index = FeedIndex::build(&feed, cfg.subcategory_id.as_deref());
    if let Some(sub) = &cfg.subcategory_id {
        let sub_label = catalog
            .label_for_subcategory(sub)
            .map(|l| format!(" ({l})"))
            .unwrap_or_default();
        progress.line(format!(
            "  Sub-category {sub}{sub_label} filter: {} of {} markets retained.",
            index.markets_by_id.len(),
            feed.markets.len(),
        ));
    }

    let report = analyzer::analyze(&feed.markets, &feed.selections, progress);

    let hint = cfg.category_id.as_str();
    let hint_label = catalog
        .label_for_category(hint)
        .map(|l| format!(" ({l})"))
        .unwrap_or_default();
    let market_type = classifier::classify(&report, hint);
    progress.line(format!(
        "  Market type: {market_type} (category hint {hint}{hint_label})"
    ));

    let records: Vec<NormalizedRecord> = index
        .retained_selections(&feed)
        .into_iter()
        .filter_map(|selection| {
            index
                .markets_by_id
                .get(&selection.market_id)
                .map(|market| extractor::extract(selection, market, &index, market_type))
        })
        .collect();
    progress.line(format!("  Parsed {} betting selections.", records.len()));

    if records.is_empty() {
        progress.line("NOTE: No bets found for this combination.");
        return Ok(ScanResult {
            table: Table::Standard(Vec::new()),
            status: ScanStatus::NoData,
            market_type,
        });
    }

    let table = formatter::format(records, market_type);
    match &table {
        Table::Pivoted(_) => {
            progress.line("  Pattern detected: Over/Under. Applying pivot format...")
        }
        Table::Standard(_) => progress.line("  Applying standard format..."),
    }

    Ok(ScanResult { table, status: ScanStatus::Ok, market_type })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::category_codes;
    use crate::progress::test_log;
    use crate::types::MarketType;
    use serde_json::json;

    fn cfg(category_id: &str, subcategory_id: Option<&str>) -> Config {
        Config {
            feed_base_url: "http://unused".to_string(),
            log_level: "info".to_string(),
            league_id: "88808".to_string(),
            category_id: category_id.to_string(),
            subcategory_id: subcategory_id.map(str::to_string),
            raw_dump_dir: None,
            reference_path: "does-not-exist.json".to_string(),
        }
    }

    #[test]
    fn season_wins_feed_pivots_into_participant_rows() {
        let doc = json!({
            "markets": [{"id": 1, "name": "Team A Regular Season Wins", "subcategoryId": 10}],
            "selections": [
                {"marketId": 1, "label": "Over", "points": 5.5, "displayOdds": {"american": "-110"}},
                {"marketId": 1, "label": "Under", "points": 5.5, "displayOdds": {"american": "\u{2212}110"}},
            ],
        });
        let (log, _rx) = test_log();
        let result =
            process_document(&doc, &cfg("634", None), &ReferenceCatalog::default(), &log).unwrap();

        assert_eq!(result.status, ScanStatus::Ok);
        assert_eq!(result.market_type, MarketType::OverUnder);
        let Table::Pivoted(rows) = result.table else { panic!("expected pivot") };
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].participant, "Team A");
        assert_eq!(rows[0].line, "5.5");
        assert_eq!(rows[0].over_odds, "-110");
        assert_eq!(rows[0].under_odds, "-110");
    }

    #[test]
    fn player_props_hint_keeps_prop_rows_unpivoted() {
        let doc = json!({
            "markets": [{"id": 1, "name": "Josh Allen - Passing Yards", "subcategoryId": 10}],
            "selections": [
                {"marketId": 1, "label": "Over", "points": 275, "displayOdds": {"american": "-115"}},
                {"marketId": 1, "label": "Under", "points": 275, "displayOdds": {"american": "-105"}},
            ],
        });
        let (log, _rx) = test_log();
        let result = process_document(
            &doc,
            &cfg(category_codes::PLAYER_PROPS, None),
            &ReferenceCatalog::default(),
            &log,
        )
        .unwrap();

        assert_eq!(result.market_type, MarketType::PlayerProps);
        let Table::Standard(rows) = result.table else { panic!("expected standard") };
        assert_eq!(rows[0].subject, "Josh Allen");
        assert_eq!(rows[0].proposition, "Passing Yards - Over 275");
        assert_eq!(rows[1].proposition, "Passing Yards - Under 275");
    }

    #[test]
    fn subcategory_filter_drops_everything_yields_no_data() {
        let doc = json!({
            "markets": [{"id": 1, "name": "MVP", "subcategoryId": 10}],
            "selections": [
                {"marketId": 1, "label": "Josh Allen", "displayOdds": {"american": "+600"}},
            ],
        });
        let (log, mut rx) = test_log();
        let result = process_document(
            &doc,
            &cfg("634", Some("999")),
            &ReferenceCatalog::default(),
            &log,
        )
        .unwrap();

        assert_eq!(result.status, ScanStatus::NoData);
        assert!(result.table.is_empty());

        // The "no data" note is narrated, distinguishable from failure.
        let mut saw_note = false;
        while let Ok(msg) = rx.try_recv() {
            if let crate::types::WorkerMsg::Progress(line) = msg {
                saw_note |= line.contains("No bets found");
            }
        }
        assert!(saw_note);
    }

    #[test]
    fn retained_record_count_matches_resolvable_selections() {
        let doc = json!({
            "markets": [
                {"id": 1, "name": "MVP", "subcategoryId": 10},
                {"id": 2, "name": "Coach of the Year", "subcategoryId": 11},
            ],
            "selections": [
                {"marketId": 1, "label": "Josh Allen", "displayOdds": {"american": "+600"}},
                {"marketId": 1, "label": "Lamar Jackson", "displayOdds": {"american": "+450"}},
                {"marketId": 2, "label": "Sean McDermott", "displayOdds": {"american": "+700"}},
                {"marketId": 999, "label": "Orphan", "displayOdds": {"american": "+100"}},
            ],
        });
        let (log, _rx) = test_log();

        // Unfiltered: only the orphan drops.
        let result =
            process_document(&doc, &cfg("634", None), &ReferenceCatalog::default(), &log).unwrap();
        assert_eq!(result.table.len(), 3);

        // Filtered to subcategory 10: the orphan and market 2's selection drop.
        let result = process_document(
            &doc,
            &cfg("634", Some("10")),
            &ReferenceCatalog::default(),
            &log,
        )
        .unwrap();
        assert_eq!(result.table.len(), 2);
        assert_eq!(result.market_type, MarketType::StandardFutures);
    }

    #[test]
    fn standings_feed_resolves_subjects_through_events() {
        let doc = json!({
            "markets": [
                {"id": 1, "name": "AFC East 2025", "subcategoryId": 10, "eventId": 100},
            ],
            "selections": [
                {"marketId": 1, "label": "1st", "displayOdds": {"american": "-150"}},
                {"marketId": 1, "label": "2nd", "displayOdds": {"american": "+200"}},
            ],
            "events": [
                {"id": 100, "participants": [{"name": "Buffalo Bills"}]},
            ],
        });
        let (log, _rx) = test_log();
        let result =
            process_document(&doc, &cfg("634", None), &ReferenceCatalog::default(), &log).unwrap();

        assert_eq!(result.market_type, MarketType::DivisionStandings);
        let Table::Standard(rows) = result.table else { panic!("expected standard") };
        assert_eq!(rows[0].subject, "Buffalo Bills");
        assert_eq!(rows[0].proposition, "1st Place");
        assert_eq!(rows[1].proposition, "2nd Place");
    }

    #[test]
    fn empty_feed_is_no_data_not_an_error() {
        let (log, _rx) = test_log();
        let result = process_document(
            &json!({"markets": [], "selections": [], "events": []}),
            &cfg("634", None),
            &ReferenceCatalog::default(),
            &log,
        )
        .unwrap();
        assert_eq!(result.status, ScanStatus::NoData);
    }
}
