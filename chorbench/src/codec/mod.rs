//! Tab-separated record codec.
//!
//! Every artifact and statistics file is one header line of field names
//! followed by one line per record. The first field of every record is the
//! case id. Header lines are recognized by their literal prefix (`testId`,
//! `testID` or `id`), never by position, so a case id must not start with
//! one of those prefixes.

use crate::core::CaseId;
use crate::errors::MalformedRecordError;

/// Field separator.
pub const SEPARATOR: char = '\t';

/// Prefixes that mark a header line.
pub const HEADER_PREFIXES: [&str; 3] = ["testId", "testID", "id"];

/// Returns true if the line is a header line.
#[must_use]
pub fn is_header(line: &str) -> bool {
    HEADER_PREFIXES.iter().any(|prefix| line.starts_with(prefix))
}

/// Splits a line at the first separator into `(case id, rest)`.
#[must_use]
pub fn split_key(line: &str) -> Option<(&str, &str)> {
    line.split_once(SEPARATOR)
}

/// Splits a line into exactly `field_count` fields.
///
/// The last field keeps any further separators. Returns `None` when the line
/// has fewer fields than requested.
#[must_use]
pub fn split_record(line: &str, field_count: usize) -> Option<Vec<&str>> {
    let fields: Vec<&str> = line.splitn(field_count, SEPARATOR).collect();
    (fields.len() == field_count).then_some(fields)
}

/// Reads `(case id, rest of line)` pairs, skipping header and blank lines.
pub fn parse_keyed(
    source: &str,
    text: &str,
) -> Result<Vec<(CaseId, String)>, MalformedRecordError> {
    let mut records = Vec::new();
    for (index, line) in text.lines().enumerate() {
        if line.trim().is_empty() || is_header(line) {
            continue;
        }
        let (key, rest) = split_key(line).ok_or_else(|| {
            MalformedRecordError::new(source, index + 1, line, "no field separator")
        })?;
        records.push((CaseId::new(key), rest.to_string()));
    }
    Ok(records)
}

/// An in-memory table: header plus rows, each row starting with its case id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Creates an empty table with the given header.
    #[must_use]
    pub fn new<I, S>(header: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            header: header.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Returns the header.
    #[must_use]
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Returns the rows.
    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Appends a row for `case`. `fields` excludes the case id.
    pub fn push(&mut self, case: &CaseId, fields: Vec<String>) -> Result<(), MalformedRecordError> {
        let mut row = Vec::with_capacity(fields.len() + 1);
        row.push(case.to_string());
        row.extend(fields);

        let line_number = self.rows.len() + 2;
        if row.len() != self.header.len() {
            return Err(MalformedRecordError::new(
                "<table>",
                line_number,
                row.join("\t"),
                format!("expected {} fields, found {}", self.header.len(), row.len()),
            ));
        }
        if let Some(bad) = row.iter().find(|f| f.contains(SEPARATOR) || f.contains('\n')) {
            return Err(MalformedRecordError::new(
                "<table>",
                line_number,
                bad.clone(),
                "field contains a separator or line break",
            ));
        }

        self.rows.push(row);
        Ok(())
    }

    /// Serializes the table: header line, then one line per row.
    #[must_use]
    pub fn to_tsv(&self) -> String {
        let sep = SEPARATOR.to_string();
        let mut out = self.header.join(&sep);
        out.push('\n');
        for row in &self.rows {
            out.push_str(&row.join(&sep));
            out.push('\n');
        }
        out
    }

    /// Parses a table whose first line is its header.
    ///
    /// Data lines must carry at least as many fields as the header; the last
    /// field absorbs any surplus separators. Blank lines and repeated header
    /// lines are skipped.
    pub fn parse(source: &str, text: &str) -> Result<Self, MalformedRecordError> {
        let mut lines = text.lines().enumerate();
        let header_line = lines
            .by_ref()
            .find(|(_, line)| !line.trim().is_empty())
            .map(|(_, line)| line)
            .unwrap_or_default();
        if !is_header(header_line) {
            return Err(MalformedRecordError::new(source, 1, header_line, "missing header line"));
        }

        let header: Vec<String> = header_line.split(SEPARATOR).map(str::to_string).collect();
        let mut rows = Vec::new();
        for (index, line) in lines {
            if line.trim().is_empty() || is_header(line) {
                continue;
            }
            let fields = split_record(line, header.len()).ok_or_else(|| {
                MalformedRecordError::new(
                    source,
                    index + 1,
                    line,
                    format!(
                        "expected {} fields, found {}",
                        header.len(),
                        line.split(SEPARATOR).count()
                    ),
                )
            })?;
            rows.push(fields.into_iter().map(str::to_string).collect());
        }

        Ok(Self { header, rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_is_header() {
        assert!(is_header("testId\tnetwork"));
        assert!(is_header("testID\tnetwork"));
        assert!(is_header("id\tnumberOfActions"));
        assert!(!is_header("C1\tid"));
    }

    #[test]
    fn test_split_record_exact_count() {
        assert_eq!(split_record("C1\tRandom\ta; b", 3), Some(vec!["C1", "Random", "a; b"]));
        assert_eq!(split_record("C1\tRandom\t", 3), Some(vec!["C1", "Random", ""]));
        assert_eq!(split_record("C1\tRandom", 3), None);
        assert_eq!(split_record("C1\tRandom\tx\ty", 3), Some(vec!["C1", "Random", "x\ty"]));
    }

    #[test]
    fn test_parse_keyed_skips_header() {
        let text = "testId\tnetwork\nC1\tp { main {stop} }\n\nC2\tq { main {stop} }\n";
        let records = parse_keyed("projection-1", text).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].0, CaseId::new("C1"));
        assert_eq!(records[1].1, "q { main {stop} }");
    }

    #[test]
    fn test_parse_keyed_rejects_unsplittable_line() {
        let err = parse_keyed("projection-1", "testId\tnetwork\nC1 no tab\n").unwrap_err();
        assert_eq!(err.line_number, 2);
        assert_eq!(err.reason, "no field separator");
    }

    #[test]
    fn test_table_round_trip() {
        let mut table = Table::new(["testId", "a", "b"]);
        table.push(&CaseId::new("C1"), vec!["1".into(), "2.5".into()]).unwrap();
        table.push(&CaseId::new("C2"), vec!["3".into(), "0".into()]).unwrap();

        let text = table.to_tsv();
        assert_eq!(text, "testId\ta\tb\nC1\t1\t2.5\nC2\t3\t0\n");
        assert_eq!(Table::parse("t", &text).unwrap(), table);
    }

    #[test]
    fn test_table_push_checks_width() {
        let mut table = Table::new(["testId", "a"]);
        assert!(table.push(&CaseId::new("C1"), vec![]).is_err());
        assert!(table.push(&CaseId::new("C1"), vec!["x\ty".into()]).is_err());
        assert!(table.is_empty());
    }

    #[test]
    fn test_table_parse_short_line() {
        let err = Table::parse("stats", "testId\ta\tb\nC1\t1\n").unwrap_err();
        assert_eq!(err.line_number, 2);
        assert!(err.reason.contains("expected 3 fields, found 2"));
    }

    #[test]
    fn test_table_parse_missing_header() {
        assert!(Table::parse("stats", "C1\t1\n").is_err());
    }
}
