//! Network and extraction artifact files.

use crate::codec::{self, Table};
use crate::core::{CaseId, Strategy};
use crate::errors::MalformedRecordError;

use super::corpus::CaseMap;

/// Header of projected, fuzzed and unrolled network files.
pub const NETWORK_HEADER: [&str; 2] = ["testId", "network"];

/// Header of extraction files.
pub const EXTRACTION_HEADER: [&str; 3] = ["testId", "strategy", "choreography"];

/// Builds a network artifact table.
pub fn network_table<'a, I>(networks: I) -> Result<Table, MalformedRecordError>
where
    I: IntoIterator<Item = (&'a CaseId, &'a String)>,
{
    let mut table = Table::new(NETWORK_HEADER);
    for (case, network) in networks {
        table.push(case, vec![network.clone()])?;
    }
    Ok(table)
}

/// Parses a network artifact file into `case -> network`.
pub fn parse_networks(source: &str, text: &str) -> Result<CaseMap, MalformedRecordError> {
    Ok(codec::parse_keyed(source, text)?.into_iter().collect())
}

/// Builds an extraction artifact table. An empty choreography marks a case
/// that could not be extracted.
pub fn extraction_table<'a, I>(
    strategy: Strategy,
    choreographies: I,
) -> Result<Table, MalformedRecordError>
where
    I: IntoIterator<Item = (&'a CaseId, &'a str)>,
{
    let mut table = Table::new(EXTRACTION_HEADER);
    for (case, choreography) in choreographies {
        table.push(case, vec![strategy.to_string(), choreography.to_string()])?;
    }
    Ok(table)
}

/// Parses an extraction artifact file into `case -> choreography`.
pub fn parse_extractions(source: &str, text: &str) -> Result<CaseMap, MalformedRecordError> {
    let table = Table::parse(source, text)?;
    if table.header().len() != EXTRACTION_HEADER.len() {
        return Err(MalformedRecordError::new(
            source,
            1,
            table.header().join("\t"),
            format!("expected {} header fields", EXTRACTION_HEADER.len()),
        ));
    }
    Ok(table
        .rows()
        .iter()
        .map(|row| (CaseId::new(row[0].as_str()), row[2].clone()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_network_table_round_trip() {
        let mut networks = CaseMap::new();
        networks.insert(CaseId::new("C2"), "b { main { stop } }".to_string());
        networks.insert(CaseId::new("C1"), "a { main { stop } }".to_string());

        let text = network_table(&networks).unwrap().to_tsv();
        assert_eq!(
            text,
            "testId\tnetwork\nC1\ta { main { stop } }\nC2\tb { main { stop } }\n"
        );
        assert_eq!(parse_networks("projection-1", &text).unwrap(), networks);
    }

    #[test]
    fn test_extraction_table_round_trip() {
        let c1 = CaseId::new("C1");
        let c2 = CaseId::new("C2");
        let rows = vec![(&c1, "main { a.e -> b; stop }"), (&c2, "")];

        let text = extraction_table(Strategy::Random, rows).unwrap().to_tsv();
        assert!(text.starts_with("testId\tstrategy\tchoreography\n"));
        assert!(text.contains("C2\tRandom\t\n"));

        let parsed = parse_extractions("extraction-Random-1", &text).unwrap();
        assert_eq!(parsed[&c1], "main { a.e -> b; stop }");
        assert_eq!(parsed[&c2], "");
    }

    #[test]
    fn test_parse_extractions_short_line() {
        let text = "testId\tstrategy\tchoreography\nC1\tRandom\n";
        assert!(parse_extractions("extraction-Random-1", text).is_err());
    }
}
