//! Cross-strategy pivot of combined statistics.
//!
//! Reads the combined table of every strategy for one group and test set and
//! lays them side by side: the group's network fields once, then the
//! extraction fields of each strategy suffixed with its name.

use std::collections::BTreeMap;

use crate::codec::Table;
use crate::core::{CaseId, Group, Strategy};
use crate::errors::{BenchError, MalformedRecordError, MissingJoinKeyError};
use crate::store::CorpusStore;

use super::join::group_primary_header;
use super::records::EXTRACTION_STATISTICS_HEADER;

/// Extraction columns carried into the pivot: everything after the case id
/// and strategy columns.
fn pivoted_extraction_fields() -> &'static [&'static str] {
    &EXTRACTION_STATISTICS_HEADER[2..]
}

/// One strategy's combined table, indexed by case and column name.
struct CombinedTable {
    columns: Vec<String>,
    rows: BTreeMap<CaseId, Vec<String>>,
}

impl CombinedTable {
    fn from_table(table: Table) -> Self {
        let columns = table.header().to_vec();
        let rows = table
            .rows()
            .iter()
            .map(|row| (CaseId::new(row[0].as_str()), row.clone()))
            .collect();
        Self { columns, rows }
    }

    fn column(&self, name: &str, source: &str) -> Result<usize, MalformedRecordError> {
        self.columns.iter().position(|c| c == name).ok_or_else(|| {
            MalformedRecordError::new(
                source,
                1,
                self.columns.join("\t"),
                format!("missing column {name}"),
            )
        })
    }
}

/// Picks the strategy whose cases key the pivot rows: `preferred` when it is
/// among `strategies`, otherwise the first configured strategy.
pub fn reference_strategy(
    strategies: &[Strategy],
    preferred: Strategy,
) -> Result<Strategy, BenchError> {
    if strategies.contains(&preferred) {
        return Ok(preferred);
    }
    match strategies.first() {
        Some(&fallback) => {
            tracing::warn!(
                %preferred,
                %fallback,
                "Reference strategy not configured, using fallback"
            );
            Ok(fallback)
        }
        None => Err(BenchError::MissingReferenceStrategy { configured: preferred }),
    }
}

/// Builds the pivot table of `group` and test set `test_set`.
///
/// Every strategy's combined table must exist and must contain every case of
/// the reference strategy's table.
pub fn pivot(
    store: &CorpusStore,
    strategies: &[Strategy],
    preferred_reference: Strategy,
    group: Group,
    test_set: &str,
) -> Result<Table, BenchError> {
    let reference = reference_strategy(strategies, preferred_reference)?;
    let naming = store.naming();

    let mut combined = Vec::with_capacity(strategies.len());
    for &strategy in strategies {
        let name = naming.combined_file(strategy, group, test_set);
        let table = store.read_table(&name)?;
        combined.push((strategy, name, CombinedTable::from_table(table)));
    }

    let primary = group_primary_header(group);
    let mut header: Vec<String> = primary.iter().map(|f| (*f).to_string()).collect();
    for &strategy in strategies {
        header.extend(
            pivoted_extraction_fields()
                .iter()
                .map(|field| format!("{field}-{strategy}")),
        );
    }

    let Some((_, reference_name, reference_table)) =
        combined.iter().find(|(s, _, _)| *s == reference)
    else {
        return Err(BenchError::MissingReferenceStrategy { configured: reference });
    };
    let primary_columns = primary[1..]
        .iter()
        .map(|field| reference_table.column(field, reference_name))
        .collect::<Result<Vec<_>, _>>()?;

    let mut table = Table::new(header);
    for (case, reference_row) in &reference_table.rows {
        let mut fields: Vec<String> =
            primary_columns.iter().map(|&i| reference_row[i].clone()).collect();

        for (strategy, name, strategy_table) in &combined {
            let row = strategy_table
                .rows
                .get(case)
                .ok_or_else(|| MissingJoinKeyError::new(case.clone(), *strategy, reference))?;
            for field in pivoted_extraction_fields() {
                let column = strategy_table.column(field, name)?;
                fields.push(row[column].clone());
            }
        }
        table.push(case, fields)?;
    }

    tracing::debug!(%group, test_set, %reference, cases = table.len(), "Pivoted statistics");
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::NamingScheme;
    use crate::stats::records::NETWORK_STATISTICS_HEADER;
    use crate::core::FuzzParameters;
    use tempfile::TempDir;

    fn combined_text(cases: &[&str], strategy: Strategy, time: &str) -> String {
        let mut header = vec!["id".to_string()];
        header.extend(NETWORK_STATISTICS_HEADER[1..].iter().map(|f| (*f).to_string()));
        header.extend(EXTRACTION_STATISTICS_HEADER[1..].iter().map(|f| (*f).to_string()));
        let mut text = header.join("\t");
        text.push('\n');
        for case in cases {
            let mut row = vec![(*case).to_string()];
            row.extend((1..NETWORK_STATISTICS_HEADER.len()).map(|i| i.to_string()));
            row.extend([strategy.to_string(), time.to_string()]);
            row.extend(["7", "0", "3", "1", "2", "2", "2.0"].map(String::from));
            text.push_str(&row.join("\t"));
            text.push('\n');
        }
        text
    }

    fn setup(group: Group, contents: Vec<(Strategy, Vec<&str>)>) -> (TempDir, CorpusStore) {
        let dir = TempDir::new().unwrap();
        let store = CorpusStore::new(dir.path(), NamingScheme::default());
        for (strategy, cases) in contents {
            let name = store.naming().combined_file(strategy, group, "t");
            store.write_atomic(&name, &combined_text(&cases, strategy, "11")).unwrap();
        }
        (dir, store)
    }

    #[test]
    fn test_reference_strategy_selection() {
        let strategies = [Strategy::LongestFirst, Strategy::Random];
        assert_eq!(reference_strategy(&strategies, Strategy::Random).unwrap(), Strategy::Random);
        assert_eq!(
            reference_strategy(&[Strategy::LongestFirst], Strategy::Random).unwrap(),
            Strategy::LongestFirst
        );
        assert!(matches!(
            reference_strategy(&[], Strategy::Random),
            Err(BenchError::MissingReferenceStrategy { .. })
        ));
    }

    #[test]
    fn test_pivot_layout() {
        let group = Group::Fuzzed(FuzzParameters::new(0, 1));
        let (_dir, store) = setup(
            group,
            vec![
                (Strategy::Random, vec!["C10", "C2"]),
                (Strategy::LongestFirst, vec!["C2", "C10"]),
            ],
        );

        let strategies = [Strategy::Random, Strategy::LongestFirst];
        let table = pivot(&store, &strategies, Strategy::Random, group, "t").unwrap();

        assert_eq!(table.header()[0], "testId");
        assert_eq!(table.header()[NETWORK_STATISTICS_HEADER.len()], "time(msec)-Random");
        assert_eq!(
            table.header().last().map(String::as_str),
            Some("avgProcedureLength-LongestFirst")
        );
        assert_eq!(table.header().len(), NETWORK_STATISTICS_HEADER.len() + 2 * 8);

        let cases: Vec<&str> = table.rows().iter().map(|r| r[0].as_str()).collect();
        assert_eq!(cases, vec!["C2", "C10"]);
        assert_eq!(table.rows()[0][NETWORK_STATISTICS_HEADER.len()], "11");
        assert!(!table.to_tsv().contains("\t\n"));
    }

    #[test]
    fn test_pivot_missing_join_key() {
        let (_dir, store) = setup(
            Group::Unrolled,
            vec![(Strategy::Random, vec!["C1", "C4"]), (Strategy::LongestFirst, vec!["C1"])],
        );

        let err = pivot(
            &store,
            &[Strategy::Random, Strategy::LongestFirst],
            Strategy::Random,
            Group::Unrolled,
            "t",
        )
        .unwrap_err();

        match err {
            BenchError::MissingJoinKey(e) => {
                assert_eq!(e.case, CaseId::new("C4"));
                assert_eq!(e.strategy, Strategy::LongestFirst);
                assert_eq!(e.reference, Strategy::Random);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_pivot_missing_combined_table() {
        let (_dir, store) = setup(Group::Unrolled, vec![(Strategy::Random, vec!["C1"])]);
        let err = pivot(
            &store,
            &[Strategy::Random, Strategy::ShortestFirst],
            Strategy::Random,
            Group::Unrolled,
            "t",
        )
        .unwrap_err();
        assert!(matches!(err, BenchError::MissingArtifact { .. }));
    }
}
