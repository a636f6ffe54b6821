//! Accumulation of one strategy's extraction statistics into a single file.

use crate::codec::Table;
use crate::core::{CaseId, Strategy};
use crate::errors::BenchError;
use crate::store::CorpusStore;

use super::records::EXTRACTION_STATISTICS_HEADER;

/// Columns appended to every accumulated row, filled from the corpus file id.
pub const CORPUS_PARAMETER_COLUMNS: [&str; 4] =
    ["length", "numProcesses", "numIfs", "numProcedures"];

/// Concatenates every plain `stats-extraction-<strategy>-<id>` file, adding
/// the four corpus parameters of `<id>` to each row.
///
/// Files whose id is not a four-number tuple are skipped.
pub fn accumulate(store: &CorpusStore, strategy: Strategy) -> Result<Table, BenchError> {
    let naming = store.naming();
    let header = EXTRACTION_STATISTICS_HEADER
        .iter()
        .chain(CORPUS_PARAMETER_COLUMNS.iter())
        .copied();
    let mut table = Table::new(header);

    for file in store.list_files(&naming.extraction_statistics_prefix(strategy))? {
        let parameters = match file.id.corpus_parameters() {
            Some(parameters) if parameters.len() == CORPUS_PARAMETER_COLUMNS.len() => parameters,
            _ => {
                if !file.id.is_derived() {
                    tracing::warn!(file = %file.name, "Not a corpus parameter tuple, skipping");
                }
                continue;
            }
        };

        let stats = store.read_table(&file.name)?;
        for row in stats.rows() {
            let mut fields: Vec<String> = row[1..].to_vec();
            fields.extend(parameters.iter().map(u64::to_string));
            table.push(&CaseId::new(row[0].as_str()), fields)?;
        }
    }

    tracing::debug!(%strategy, rows = table.len(), "Accumulated extraction statistics");
    Ok(table)
}
