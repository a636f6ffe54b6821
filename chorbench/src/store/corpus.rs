//! Choreography corpus grammar.
//!
//! ```text
//! *** C1 ***
//! def X { a.e -> b; stop }
//! main { X }
//!
//! *** C2 ***
//! main { a.e -> b; stop }
//! ```
//!
//! A `***name***` line opens a case, `def` and `main` lines form its body
//! (joined with single spaces) and a blank line closes it. A case still open
//! at end of file is kept when it has a body.

use std::collections::BTreeMap;

use crate::core::CaseId;
use crate::errors::MalformedCorpusError;

/// Ordered mapping from case id to case body.
pub type CaseMap = BTreeMap<CaseId, String>;

const DELIMITER: &str = "***";

#[derive(Debug, Default)]
struct OpenCase {
    name: Option<String>,
    body: Vec<String>,
}

impl OpenCase {
    fn close(
        &mut self,
        cases: &mut CaseMap,
        file: &str,
        line_number: usize,
        line: &str,
    ) -> Result<(), MalformedCorpusError> {
        let name = self.name.take();
        let body = std::mem::take(&mut self.body);
        let Some(name) = name else {
            return Ok(());
        };
        let id = CaseId::new(name);
        if cases.contains_key(&id) {
            return Err(MalformedCorpusError::new(
                file,
                line_number,
                line,
                format!("duplicate case {id}"),
            ));
        }
        cases.insert(id, body.join(" "));
        Ok(())
    }
}

/// Parses a choreography corpus file.
///
/// `file` names the source in error messages.
pub fn parse_corpus(file: &str, text: &str) -> Result<CaseMap, MalformedCorpusError> {
    let mut cases = CaseMap::new();
    let mut open = OpenCase::default();

    for (index, line) in text.lines().enumerate() {
        let line_number = index + 1;
        if let Some(rest) = line.strip_prefix(DELIMITER) {
            if open.name.is_some() {
                open.close(&mut cases, file, line_number, line)?;
            }
            let name = rest.split(DELIMITER).next().unwrap_or_default().trim();
            if name.is_empty() {
                return Err(MalformedCorpusError::new(file, line_number, line, "empty case name"));
            }
            open.name = Some(name.to_string());
        } else if line.starts_with("def") || line.starts_with("main") {
            if open.name.is_none() {
                return Err(MalformedCorpusError::new(
                    file,
                    line_number,
                    line,
                    "case body without a ***name*** line",
                ));
            }
            open.body.push(line.trim_end().to_string());
        } else if line.trim().is_empty() {
            open.close(&mut cases, file, line_number, line)?;
        } else {
            return Err(MalformedCorpusError::new(file, line_number, line, "unrecognized line"));
        }
    }

    if !open.body.is_empty() {
        let last = text.lines().count();
        open.close(&mut cases, file, last, "")?;
    }

    Ok(cases)
}
