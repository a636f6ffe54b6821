//! Combining, pivoting and accumulating hand-written statistics files.

use pretty_assertions::assert_eq;
use std::sync::Arc;
use tempfile::TempDir;

use chorbench::config::{PipelineConfig, TestSet};
use chorbench::core::{Group, Strategy};
use chorbench::errors::BenchError;
use chorbench::events::NoOpEventSink;
use chorbench::pipeline::Pipeline;
use chorbench::stats::{
    Aggregator, CORPUS_PARAMETER_COLUMNS, EXTRACTION_STATISTICS_HEADER, MISSING_MARKER,
    NETWORK_STATISTICS_HEADER, PROJECTION_STATISTICS_HEADER,
};
use chorbench::testing::FakeAnalyses;

fn tsv(header: &[&str], rows: &[Vec<String>]) -> String {
    let mut text = header.join("\t");
    text.push('\n');
    for row in rows {
        text.push_str(&row.join("\t"));
        text.push('\n');
    }
    text
}

fn projection_row(case: &str, actions: u64) -> Vec<String> {
    let mut row = vec![case.to_string(), actions.to_string()];
    row.extend((2..PROJECTION_STATISTICS_HEADER.len()).map(|_| "0".to_string()));
    row
}

fn network_row(case: &str) -> Vec<String> {
    let mut row = vec![case.to_string()];
    row.extend((1..NETWORK_STATISTICS_HEADER.len()).map(|_| "1".to_string()));
    row
}

fn extraction_row(case: &str, strategy: Strategy, nodes: u64) -> Vec<String> {
    [
        case.to_string(),
        strategy.to_string(),
        "4".to_string(),
        nodes.to_string(),
        "0".to_string(),
        "3".to_string(),
        "1".to_string(),
        "2".to_string(),
        "2".to_string(),
        "2.0".to_string(),
    ]
    .to_vec()
}

fn pipeline(dir: &TempDir, strategies: Vec<Strategy>) -> Pipeline {
    let config = PipelineConfig::new()
        .with_working_dir(dir.path())
        .with_strategies(strategies)
        .with_groups(vec![Group::Plain])
        .with_test_sets(vec![TestSet::new("comms-only", r"(\d+)-6-0-0")]);
    Pipeline::new(config, Box::new(FakeAnalyses::new()), Arc::new(NoOpEventSink)).unwrap()
}

fn write(dir: &TempDir, name: &str, contents: &str) {
    std::fs::write(dir.path().join(name), contents).unwrap();
}

#[test]
fn outer_join_keeps_every_case_once() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "stats-projection-10-6-0-0",
        &tsv(&PROJECTION_STATISTICS_HEADER, &[projection_row("C1", 5), projection_row("C2", 6)]),
    );
    write(
        &dir,
        "stats-projection-20-6-0-0",
        &tsv(&PROJECTION_STATISTICS_HEADER, &[projection_row("C3", 7)]),
    );
    write(
        &dir,
        "stats-extraction-Random-10-6-0-0",
        &tsv(
            &EXTRACTION_STATISTICS_HEADER,
            &[
                extraction_row("C2", Strategy::Random, 11),
                extraction_row("C4", Strategy::Random, 12),
            ],
        ),
    );
    // Not in the test set.
    write(
        &dir,
        "stats-extraction-Random-10-5-0-0",
        &tsv(&EXTRACTION_STATISTICS_HEADER, &[extraction_row("C9", Strategy::Random, 1)]),
    );

    let pipeline = pipeline(&dir, vec![Strategy::Random]);
    let set = TestSet::new("comms-only", r"(\d+)-6-0-0");
    let table = pipeline.combine(Strategy::Random, Group::Plain, &set).unwrap();

    let cases: Vec<&str> = table.rows().iter().map(|row| row[0].as_str()).collect();
    assert_eq!(cases, vec!["C1", "C2", "C3", "C4"]);
    assert_eq!(table.header()[0], "id");
    assert_eq!(
        table.header().len(),
        PROJECTION_STATISTICS_HEADER.len() + EXTRACTION_STATISTICS_HEADER.len() - 1
    );

    let width = PROJECTION_STATISTICS_HEADER.len();
    assert_eq!(table.rows()[0][width], MISSING_MARKER);
    assert_eq!(table.rows()[1][1], "6");
    assert_eq!(table.rows()[1][width], "Random");
    assert_eq!(table.rows()[3][1], MISSING_MARKER);
    assert_eq!(table.rows()[3][width + 2], "12");

    assert!(pipeline.store().contains("stats-Random-comms-only"));
}

#[test]
fn header_mismatch_is_rejected() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "stats-fuzzing-0-1-10-6-0-0",
        &tsv(&PROJECTION_STATISTICS_HEADER, &[projection_row("C1", 5)]),
    );
    let pipeline = pipeline(&dir, vec![Strategy::Random]);

    let err = Aggregator::new(pipeline.store())
        .combine(Strategy::Random, "fuzzed-0-1".parse().unwrap(), r"\d.*")
        .unwrap_err();
    assert!(matches!(err, BenchError::MalformedRecord(_)));
}

#[test]
fn fuzzed_group_joins_network_statistics() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "stats-fuzzing-0-1-10-6-0-0",
        &tsv(&NETWORK_STATISTICS_HEADER, &[network_row("C1")]),
    );
    write(
        &dir,
        "stats-extraction-Random-fuzzed-0-1-10-6-0-0",
        &tsv(&EXTRACTION_STATISTICS_HEADER, &[extraction_row("C1", Strategy::Random, 8)]),
    );
    let pipeline = pipeline(&dir, vec![Strategy::Random]);
    let set = TestSet::new("comms-only", r"(\d+)-6-0-0");

    let table = pipeline
        .combine(Strategy::Random, "fuzzed-0-1".parse().unwrap(), &set)
        .unwrap();

    assert_eq!(
        table.header().len(),
        NETWORK_STATISTICS_HEADER.len() + EXTRACTION_STATISTICS_HEADER.len() - 1
    );
    assert_eq!(table.rows()[0][NETWORK_STATISTICS_HEADER.len() + 2], "8");
    assert!(pipeline.store().contains("stats-Random-fuzzed-0-1-comms-only"));
}

#[test]
fn full_statistics_build_pivots_every_strategy() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "stats-projection-10-6-0-0",
        &tsv(&PROJECTION_STATISTICS_HEADER, &[projection_row("C2", 5), projection_row("C10", 6)]),
    );
    for (strategy, nodes) in [(Strategy::Random, 10), (Strategy::LongestFirst, 20)] {
        write(
            &dir,
            &format!("stats-extraction-{strategy}-10-6-0-0"),
            &tsv(
                &EXTRACTION_STATISTICS_HEADER,
                &[extraction_row("C10", strategy, nodes), extraction_row("C2", strategy, nodes)],
            ),
        );
    }

    let pipeline = pipeline(&dir, vec![Strategy::LongestFirst, Strategy::Random]);
    let written = pipeline.make_combined_statistics().unwrap();
    assert_eq!(
        written,
        vec!["stats-LongestFirst-comms-only", "stats-Random-comms-only", "stats-comms-only"]
    );

    let pivot = pipeline.store().read_table("stats-comms-only").unwrap();
    assert_eq!(pivot.header()[0], "testId");
    assert!(pivot.header().contains(&"nodes-Random".to_string()));
    assert!(pivot.header().contains(&"nodes-LongestFirst".to_string()));

    let nodes_random = pivot.header().iter().position(|h| h == "nodes-Random").unwrap();
    let nodes_longest = pivot.header().iter().position(|h| h == "nodes-LongestFirst").unwrap();
    assert!(nodes_longest < nodes_random);
    assert_eq!(pivot.rows()[0][0], "C2");
    assert_eq!(pivot.rows()[0][nodes_random], "10");
    assert_eq!(pivot.rows()[1][nodes_longest], "20");
}

#[test]
fn pivot_requires_every_reference_case() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "stats-projection-10-6-0-0",
        &tsv(&PROJECTION_STATISTICS_HEADER, &[projection_row("C1", 5)]),
    );
    write(
        &dir,
        "stats-extraction-Random-10-6-0-0",
        &tsv(&EXTRACTION_STATISTICS_HEADER, &[extraction_row("C1", Strategy::Random, 3)]),
    );
    write(
        &dir,
        "stats-extraction-LongestFirst-10-6-0-0",
        &tsv(&EXTRACTION_STATISTICS_HEADER, &[]),
    );

    let pipeline = pipeline(&dir, vec![Strategy::Random, Strategy::LongestFirst]);
    let set = TestSet::new("comms-only", r"(\d+)-6-0-0");
    pipeline.combine(Strategy::Random, Group::Plain, &set).unwrap();
    pipeline.combine(Strategy::LongestFirst, Group::Plain, &set).unwrap();

    // LongestFirst still has the C1 row from the projection side, filled with NA.
    let pivot = pipeline.pivot(Group::Plain, "comms-only").unwrap();
    assert_eq!(pivot.len(), 1);

    std::fs::write(
        dir.path().join("stats-LongestFirst-comms-only"),
        tsv(&["id"], &[]),
    )
    .unwrap();
    let err = pipeline.pivot(Group::Plain, "comms-only").unwrap_err();
    assert!(matches!(err, BenchError::MissingJoinKey(_)));
}

#[test]
fn pivot_without_combined_tables_is_missing_artifact() {
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline(&dir, vec![Strategy::Random]);

    let err = pipeline.pivot(Group::Unrolled, "comms-only").unwrap_err();
    assert!(matches!(err, BenchError::MissingArtifact { .. }));
}

#[test]
fn accumulation_appends_corpus_parameters() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "stats-extraction-Random-10-6-0-0",
        &tsv(&EXTRACTION_STATISTICS_HEADER, &[extraction_row("C1", Strategy::Random, 3)]),
    );
    write(
        &dir,
        "stats-extraction-Random-20-6-2-1",
        &tsv(&EXTRACTION_STATISTICS_HEADER, &[extraction_row("C1", Strategy::Random, 4)]),
    );
    write(
        &dir,
        "stats-extraction-Random-fuzzed-0-1-10-6-0-0",
        &tsv(&EXTRACTION_STATISTICS_HEADER, &[extraction_row("C1", Strategy::Random, 5)]),
    );

    let pipeline = pipeline(&dir, vec![Strategy::Random]);
    let table = pipeline.accumulate(Strategy::Random).unwrap();

    assert_eq!(table.len(), 2);
    assert_eq!(
        &table.header()[EXTRACTION_STATISTICS_HEADER.len()..],
        CORPUS_PARAMETER_COLUMNS
    );
    assert_eq!(
        &table.rows()[1][EXTRACTION_STATISTICS_HEADER.len()..],
        ["20", "6", "2", "1"]
    );
    assert!(pipeline.store().contains("stats-Random.tsv"));
}
