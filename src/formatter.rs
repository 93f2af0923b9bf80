use std::collections::HashMap;

use crate::types::{MarketType, NormalizedRecord, PivotRow, Table};

/// Reshape extracted records into their final table. Only over/under boards
/// pivot; everything else stays one row per selection. A pivot that cannot
/// parse every proposition is a formatting failure, not a crash: the
/// standard table comes back unreshaped.
pub fn format(records: Vec<NormalizedRecord>, market_type: MarketType) -> Table {
    if market_type != MarketType::OverUnder {
        return Table::Standard(records);
    }
    match pivot(&records) {
        Some(rows) => Table::Pivoted(rows),
        None => Table::Standard(records),
    }
}

struct PartialRow {
    line: Option<String>,
    over_odds: Option<String>,
    under_odds: Option<String>,
}

/// One row per subject, subjects in first-encounter order, first row wins
/// on duplicate directions. Returns None unless every proposition matches
/// "(Over|Under) <number>".
fn pivot(records: &[NormalizedRecord]) -> Option<Vec<PivotRow>> {
    let mut order: Vec<&str> = Vec::new();
    let mut rows: HashMap<&str, PartialRow> = HashMap::new();

    for record in records {
        let (is_over, line) = parse_direction(&record.proposition)?;

        let row = rows.entry(&record.subject).or_insert_with(|| {
            order.push(&record.subject);
            PartialRow { line: None, over_odds: None, under_odds: None }
        });

        if row.line.is_none() {
            row.line = Some(line.to_string());
        }
        let slot = if is_over { &mut row.over_odds } else { &mut row.under_odds };
        if slot.is_none() {
            *slot = Some(record.odds.clone());
        }
    }

    let placeholder = || "N/A".to_string();
    Some(
        order
            .into_iter()
            .map(|subject| {
                let row = rows.remove(subject).expect("subject recorded in order");
                PivotRow {
                    participant: subject.to_string(),
                    line: row.line.unwrap_or_else(placeholder),
                    over_odds: row.over_odds.unwrap_or_else(placeholder),
                    under_odds: row.under_odds.unwrap_or_else(placeholder),
                }
            })
            .collect(),
    )
}

/// "(Over|Under) <number>" → (is_over, line). Anything else is a mismatch.
fn parse_direction(proposition: &str) -> Option<(bool, &str)> {
    let (direction, line) = proposition.split_once(' ')?;
    let is_over = match direction {
        "Over" => true,
        "Under" => false,
        _ => return None,
    };
    let line = line.trim();
    if line.is_empty() || !line.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }
    line.parse::<f64>().ok()?;
    Some((is_over, line))
}

// ---------------------------------------------------------------------------
// Plain-text rendering — the stand-in for the external delimited writer
// ---------------------------------------------------------------------------

pub fn render(table: &Table) -> String {
    let (header, rows): (Vec<&str>, Vec<Vec<&str>>) = match table {
        Table::Standard(records) => (
            vec!["Subject", "Proposition", "Odds"],
            records
                .iter()
                .map(|r| vec![r.subject.as_str(), r.proposition.as_str(), r.odds.as_str()])
                .collect(),
        ),
        Table::Pivoted(records) => (
            vec!["Participant", "Line", "Over Odds", "Under Odds"],
            records
                .iter()
                .map(|r| {
                    vec![
                        r.participant.as_str(),
                        r.line.as_str(),
                        r.over_odds.as_str(),
                        r.under_odds.as_str(),
                    ]
                })
                .collect(),
        ),
    };

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let mut out = String::new();
    render_row(&mut out, &header, &widths);
    for row in &rows {
        render_row(&mut out, row, &widths);
    }
    out
}

fn render_row(out: &mut String, cells: &[&str], widths: &[usize]) {
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            out.push_str("  ");
        }
        out.push_str(cell);
        if i + 1 < cells.len() {
            for _ in cell.chars().count()..widths[i] {
                out.push(' ');
            }
        }
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(subject: &str, proposition: &str, odds: &str) -> NormalizedRecord {
        NormalizedRecord {
            subject: subject.to_string(),
            proposition: proposition.to_string(),
            odds: odds.to_string(),
        }
    }

    #[test]
    fn over_under_pairs_pivot_to_one_row_per_subject() {
        let records = vec![
            record("Team A", "Over 5.5", "-110"),
            record("Team A", "Under 5.5", "-110"),
        ];
        let table = format(records, MarketType::OverUnder);
        assert_eq!(
            table,
            Table::Pivoted(vec![PivotRow {
                participant: "Team A".to_string(),
                line: "5.5".to_string(),
                over_odds: "-110".to_string(),
                under_odds: "-110".to_string(),
            }])
        );
    }

    #[test]
    fn every_input_lands_in_exactly_one_column_pair() {
        let records = vec![
            record("Team A", "Over 5.5", "-110"),
            record("Team B", "Over 8.5", "+100"),
            record("Team A", "Under 5.5", "-105"),
            record("Team B", "Under 8.5", "-120"),
        ];
        let table = format(records, MarketType::OverUnder);
        let Table::Pivoted(rows) = table else { panic!("expected pivot") };
        assert_eq!(rows.len(), 2); // one row per distinct subject
        assert_eq!(rows[0].participant, "Team A");
        assert_eq!((rows[0].over_odds.as_str(), rows[0].under_odds.as_str()), ("-110", "-105"));
        assert_eq!(rows[1].participant, "Team B");
        assert_eq!((rows[1].line.as_str(), rows[1].over_odds.as_str()), ("8.5", "+100"));
    }

    #[test]
    fn duplicate_direction_rows_keep_first_encountered() {
        let records = vec![
            record("Team A", "Over 5.5", "-110"),
            record("Team A", "Over 6.5", "-200"),
        ];
        let Table::Pivoted(rows) = format(records, MarketType::OverUnder) else {
            panic!("expected pivot")
        };
        assert_eq!(rows[0].line, "5.5");
        assert_eq!(rows[0].over_odds, "-110");
        assert_eq!(rows[0].under_odds, "N/A");
    }

    #[test]
    fn unmatched_proposition_aborts_the_pivot() {
        let records = vec![
            record("Team A", "Over 5.5", "-110"),
            record("Jets", "Super Bowl Winner", "+900"),
        ];
        let table = format(records.clone(), MarketType::OverUnder);
        assert_eq!(table, Table::Standard(records));
    }

    #[test]
    fn non_over_under_types_pass_through() {
        let records = vec![record("Team A", "Over 5.5", "-110")];
        for market_type in [
            MarketType::PlayerProps,
            MarketType::DivisionStandings,
            MarketType::Threshold,
            MarketType::StandardFutures,
        ] {
            assert_eq!(
                format(records.clone(), market_type),
                Table::Standard(records.clone())
            );
        }
    }

    #[test]
    fn direction_parse_rejects_malformed_lines() {
        assert_eq!(parse_direction("Over 275"), Some((true, "275")));
        assert_eq!(parse_direction("Under 5.5"), Some((false, "5.5")));
        assert!(parse_direction("Over").is_none());
        assert!(parse_direction("Over five").is_none());
        assert!(parse_direction("Exactly 5.5").is_none());
        assert!(parse_direction("Over -5.5").is_none());
    }

    #[test]
    fn render_emits_header_and_aligned_rows() {
        let table = Table::Standard(vec![record("Josh Allen", "Passing Yards - Over 275", "-115")]);
        let text = render(&table);
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("Subject"));
        let row = lines.next().unwrap();
        assert!(row.contains("Josh Allen") && row.ends_with("-115"));
    }
}
