//! Outer join of statistics files by case id.

use std::collections::BTreeMap;

use regex::Regex;

use crate::codec::Table;
use crate::core::{CaseId, Group, Strategy};
use crate::errors::{BenchError, MalformedRecordError};
use crate::store::CorpusStore;

use super::records::{
    EXTRACTION_STATISTICS_HEADER, NETWORK_STATISTICS_HEADER, PROJECTION_STATISTICS_HEADER,
};

/// Value written for the fields of a source that has no row for a case.
pub const MISSING_MARKER: &str = "NA";

/// Header of the case id column of combined tables.
pub const COMBINED_KEY_HEADER: &str = "id";

#[derive(Debug, Clone)]
struct JoinSource {
    name: String,
    fields: Vec<String>,
}

/// Outer join of several keyed sources.
///
/// Every case present in any source yields exactly one row; the fields of a
/// source lacking that case are filled with [`MISSING_MARKER`]. Rows come out
/// in case id order.
#[derive(Debug, Clone, Default)]
pub struct OuterJoin {
    sources: Vec<JoinSource>,
    rows: BTreeMap<CaseId, Vec<Option<Vec<String>>>>,
}

impl OuterJoin {
    /// Creates an empty join.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a source with its fields (case id column excluded) and returns
    /// its index.
    pub fn add_source(&mut self, name: impl Into<String>, fields: Vec<String>) -> usize {
        self.sources.push(JoinSource {
            name: name.into(),
            fields,
        });
        for values in self.rows.values_mut() {
            values.push(None);
        }
        self.sources.len() - 1
    }

    /// Returns the number of distinct cases seen.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if no case was inserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Records the values of `case` for `source`. A later row for the same
    /// case and source replaces the earlier one. `source` must come from
    /// [`OuterJoin::add_source`].
    pub fn insert(
        &mut self,
        source: usize,
        case: CaseId,
        values: Vec<String>,
    ) -> Result<(), MalformedRecordError> {
        let Some(declared) = self.sources.get(source) else {
            return Err(MalformedRecordError::new(
                format!("source #{source}"),
                0,
                format!("{case}\t{}", values.join("\t")),
                format!("no such join source, {} declared", self.sources.len()),
            ));
        };
        if values.len() != declared.fields.len() {
            return Err(MalformedRecordError::new(
                declared.name.clone(),
                0,
                format!("{case}\t{}", values.join("\t")),
                format!("expected {} fields, found {}", declared.fields.len(), values.len()),
            ));
        }

        let source_count = self.sources.len();
        let slots = self.rows.entry(case.clone()).or_insert_with(|| vec![None; source_count]);
        if slots[source].is_some() {
            tracing::warn!(source = %declared.name, %case, "Duplicate case, keeping the last row");
        }
        slots[source] = Some(values);
        Ok(())
    }

    /// Produces the joined table. The header is `key_header` followed by every
    /// source's fields in declaration order.
    pub fn into_table(self, key_header: &str) -> Result<Table, MalformedRecordError> {
        let mut header = vec![key_header.to_string()];
        for source in &self.sources {
            header.extend(source.fields.iter().cloned());
        }

        let mut table = Table::new(header);
        for (case, slots) in self.rows {
            let mut fields = Vec::new();
            for (source, slot) in self.sources.iter().zip(slots) {
                match slot {
                    Some(values) => fields.extend(values),
                    None => fields.extend(source.fields.iter().map(|_| MISSING_MARKER.to_string())),
                }
            }
            table.push(&case, fields)?;
        }
        Ok(table)
    }
}

/// Header of the network statistics that open a group's combined table.
#[must_use]
pub fn group_primary_header(group: Group) -> &'static [&'static str] {
    match group {
        Group::Plain => &PROJECTION_STATISTICS_HEADER,
        Group::Fuzzed(_) | Group::Unrolled => &NETWORK_STATISTICS_HEADER,
    }
}

/// Compiles a test set pattern so that it must match a whole file id.
pub fn full_match(pattern: &str) -> Result<Regex, BenchError> {
    Ok(Regex::new(&format!("^(?:{pattern})$"))?)
}

/// Joins the statistics files of one working directory.
#[derive(Debug, Clone, Copy)]
pub struct Aggregator<'a> {
    store: &'a CorpusStore,
}

impl<'a> Aggregator<'a> {
    /// Creates an aggregator over `store`.
    #[must_use]
    pub fn new(store: &'a CorpusStore) -> Self {
        Self { store }
    }

    /// Combines the network statistics of `group` with the extraction
    /// statistics of `strategy` over the files whose id fully matches
    /// `pattern`.
    pub fn combine(
        &self,
        strategy: Strategy,
        group: Group,
        pattern: &str,
    ) -> Result<Table, BenchError> {
        let naming = self.store.naming();
        let selection = full_match(pattern)?;
        let mut join = OuterJoin::new();

        self.load_source(
            &mut join,
            &naming.group_network_statistics_prefix(group),
            group_primary_header(group),
            &selection,
        )?;
        self.load_source(
            &mut join,
            &naming.group_extraction_statistics_prefix(strategy, group),
            &EXTRACTION_STATISTICS_HEADER,
            &selection,
        )?;

        tracing::debug!(%strategy, %group, pattern, cases = join.len(), "Combined statistics");
        Ok(join.into_table(COMBINED_KEY_HEADER)?)
    }

    fn load_source(
        &self,
        join: &mut OuterJoin,
        prefix: &str,
        header: &[&str],
        selection: &Regex,
    ) -> Result<(), BenchError> {
        let fields = header[1..].iter().map(|f| (*f).to_string()).collect();
        let source = join.add_source(prefix, fields);

        for file in self.store.list_files(prefix)? {
            if !selection.is_match(file.id.as_str()) {
                continue;
            }
            let table = self.store.read_table(&file.name)?;
            if table.header() != header {
                return Err(MalformedRecordError::new(
                    file.name.clone(),
                    1,
                    table.header().join("\t"),
                    format!("expected header starting with {}", header.join(",")),
                )
                .into());
            }
            for row in table.rows() {
                join.insert(source, CaseId::new(row[0].as_str()), row[1..].to_vec())?;
            }
        }
        Ok(())
    }
}
