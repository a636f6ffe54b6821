//! End-to-end runs of the pipeline over a temporary working directory.

use pretty_assertions::assert_eq;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

use chorbench::config::{PipelineConfig, TestSet};
use chorbench::core::{CaseId, FuzzParameters, Strategy};
use chorbench::errors::BenchError;
use chorbench::events::{CollectingEventSink, NoOpEventSink, PipelineEvent};
use chorbench::pipeline::{fuzz_until_valid, CheckpointMode, Pipeline, RetryConfig};
use chorbench::stats::PROJECTION_STATISTICS_HEADER;
use chorbench::store::{network_table, parse_corpus, parse_networks};
use chorbench::testing::{corpus_text, FakeAnalyses};

const TWO_CASES: &[(&str, &str)] = &[
    ("C1", "def X { a.e -> b; stop }\nmain { X }"),
    ("C2", "def Y { b.e -> a; stop }\nmain { Y }"),
];

fn seed(dir: &Path, id: &str, cases: &[(&str, &str)]) {
    fs::write(dir.join(format!("choreography-{id}")), corpus_text(cases)).unwrap();
}

fn config(dir: &Path) -> PipelineConfig {
    PipelineConfig::new()
        .with_working_dir(dir)
        .with_strategies(vec![Strategy::Random, Strategy::LongestFirst])
        .with_test_sets(vec![TestSet::new("all", r"\d.*")])
}

fn pipeline(
    config: PipelineConfig,
    analyses: FakeAnalyses,
) -> (Pipeline, Arc<CollectingEventSink>) {
    let events = Arc::new(CollectingEventSink::new());
    let pipeline = Pipeline::new(config, Box::new(analyses), events.clone()).unwrap();
    (pipeline, events)
}

fn snapshot(dir: &Path) -> BTreeMap<String, String> {
    fs::read_dir(dir)
        .unwrap()
        .map(Result::unwrap)
        .filter(|entry| entry.file_type().unwrap().is_file())
        .map(|entry| {
            (
                entry.file_name().into_string().unwrap(),
                fs::read_to_string(entry.path()).unwrap(),
            )
        })
        .collect()
}

#[test]
fn corpus_survives_artifact_round_trip() {
    let text = corpus_text(TWO_CASES);
    let cases = parse_corpus("choreography-1", &text).unwrap();

    let written = network_table(&cases).unwrap().to_tsv();
    let reparsed = parse_networks("projection-1", &written).unwrap();

    assert_eq!(reparsed, cases);
}

#[test]
fn projection_statistics_have_one_line_per_case() {
    let dir = TempDir::new().unwrap();
    seed(dir.path(), "10-2-0-1", TWO_CASES);
    let (pipeline, _) = pipeline(config(dir.path()), FakeAnalyses::new());

    pipeline.project().unwrap();

    let stats = pipeline.store().read("stats-projection-10-2-0-1").unwrap();
    let lines: Vec<&str> = stats.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], PROJECTION_STATISTICS_HEADER.join("\t"));
    assert!(lines[1].starts_with("C1\t"));
    assert!(lines[2].starts_with("C2\t"));
    assert_eq!(lines[1].split('\t').count(), PROJECTION_STATISTICS_HEADER.len());
}

#[test]
fn second_run_changes_nothing() {
    let dir = TempDir::new().unwrap();
    seed(dir.path(), "10-2-0-1", TWO_CASES);

    let (first, _) = pipeline(config(dir.path()), FakeAnalyses::new());
    let summary = first.run_all().unwrap();
    assert!(summary.stages.iter().any(|report| !report.written.is_empty()));
    let before = snapshot(dir.path());

    let (second, events) = pipeline(config(dir.path()), FakeAnalyses::new());
    let summary = second.run_all().unwrap();
    let after = snapshot(dir.path());

    assert_eq!(after, before);
    assert!(summary.stages.iter().all(|report| report.written.is_empty()));
    assert!(events.events_of_type("stage.started").is_empty());
    assert!(events.events_of_type("case.started").is_empty());
}

#[test]
fn presence_checkpointing_is_idempotent() {
    let dir = TempDir::new().unwrap();
    seed(dir.path(), "10-2-0-0", TWO_CASES);
    let config = config(dir.path()).with_checkpoint(CheckpointMode::Presence);

    let (first, _) = pipeline(config.clone(), FakeAnalyses::new());
    first.project().unwrap();
    first.extract_all().unwrap();
    let before = snapshot(dir.path());

    let (second, events) = pipeline(config, FakeAnalyses::new());
    second.project().unwrap();
    second.extract_all().unwrap();

    assert_eq!(snapshot(dir.path()), before);
    assert_eq!(events.events_of_type("stage.skipped").len(), 3);
    assert!(!dir.path().join(".checkpoints").exists());
}

#[test]
fn rows_are_sorted_by_case_number() {
    let dir = TempDir::new().unwrap();
    seed(
        dir.path(),
        "10-2-0-0",
        &[
            ("C10", "main { a.e -> b; stop }"),
            ("C2", "main { b.e -> a; stop }"),
            ("C29", "main { stop }"),
        ],
    );
    let (pipeline, _) = pipeline(config(dir.path()), FakeAnalyses::new());
    pipeline.project().unwrap();
    pipeline.extract(Strategy::Random).unwrap();

    let all = TestSet::new("all", r"\d.*");
    let combined = pipeline
        .combine(Strategy::Random, chorbench::core::Group::Plain, &all)
        .unwrap();
    let cases: Vec<&str> = combined.rows().iter().map(|row| row[0].as_str()).collect();
    assert_eq!(cases, vec!["C2", "C10", "C29"]);

    let projection = pipeline.store().read_table("projection-10-2-0-0").unwrap();
    let cases: Vec<&str> = projection.rows().iter().map(|row| row[0].as_str()).collect();
    assert_eq!(cases, vec!["C2", "C10", "C29"]);
}

#[test]
fn soundness_counts_only_existing_extractions() {
    let dir = TempDir::new().unwrap();
    seed(
        dir.path(),
        "10-2-0-0",
        &[
            ("C1", "main { a.e -> b; stop }"),
            ("C2", "main { b.e -> a; stop }"),
            ("C3", "main { stop }"),
        ],
    );
    let analyses = FakeAnalyses::new()
        .with_unextractable(Strategy::LongestFirst)
        .with_inconclusive("main { stop }");
    let config = config(dir.path()).with_strategies(vec![
        Strategy::Random,
        Strategy::LongestFirst,
        Strategy::ShortestFirst,
    ]);
    let (pipeline, events) = pipeline(config, analyses);

    pipeline.project().unwrap();
    pipeline.extract(Strategy::Random).unwrap();
    pipeline.extract(Strategy::LongestFirst).unwrap();

    let report = pipeline.verify_soundness().unwrap();

    assert_eq!(report.tally.total(), 6);
    assert_eq!(report.tally.ok, 2);
    assert_eq!(report.tally.maybe, 1);
    assert_eq!(report.tally.fail, 3);
    assert_eq!(report.skipped, 3);

    let totals = events.events_of_type("soundness.totals");
    assert_eq!(
        totals,
        vec![PipelineEvent::SoundnessTotals {
            tally: report.tally,
            skipped: 3,
        }]
    );
}

#[test]
fn unmutated_fuzzing_needs_one_attempt() {
    let analyses = FakeAnalyses::new().with_fuzz_refusals(5);
    let result = fuzz_until_valid(
        &analyses,
        &RetryConfig::default(),
        &NoOpEventSink,
        "C1",
        "net[main { stop }]",
        FuzzParameters::new(0, 0),
    )
    .unwrap();

    assert_eq!(result.attempts, 1);
    assert_eq!(result.network, "net[main { stop }]");
    assert!(result.elapsed_ms >= 0.0);
}

#[test]
fn fuzzing_gives_up_after_the_configured_bound() {
    let dir = TempDir::new().unwrap();
    seed(dir.path(), "10-2-0-0", TWO_CASES);
    let config = config(dir.path()).with_generation(RetryConfig::new().with_max_attempts(3));
    let (pipeline, events) = pipeline(config, FakeAnalyses::new().with_fuzz_refusals(10));

    pipeline.project().unwrap();
    let err = pipeline.fuzz(FuzzParameters::new(1, 0)).unwrap_err();

    assert!(matches!(err, BenchError::GenerationExhausted { attempts: 3, .. }));
    assert_eq!(events.events_of_type("generation.retry").len(), 2);
    assert!(!pipeline.store().contains("projection-fuzzed-1-0-10-2-0-0"));
}

#[test]
fn every_strategy_extracts_a_one_case_corpus() {
    let dir = TempDir::new().unwrap();
    seed(dir.path(), "5-2-0-0", &[("C1", "main { a.e -> b; stop }")]);
    let config = config(dir.path()).with_strategies(Strategy::benchmarked());
    let (pipeline, _) = pipeline(config, FakeAnalyses::new());

    pipeline.project().unwrap();
    let reports = pipeline.extract_all().unwrap();
    assert_eq!(reports.len(), 10);

    for strategy in Strategy::benchmarked() {
        let name = format!("extraction-{strategy}-5-2-0-0");
        let extractions = pipeline.store().read_extractions(&name).unwrap();
        assert_eq!(extractions.len(), 1, "{name}");
        assert_eq!(extractions[&CaseId::new("C1")], "main { a.e -> b; stop }");
    }
}

#[test]
fn derived_networks_are_extracted_but_not_refuzzed() {
    let dir = TempDir::new().unwrap();
    seed(dir.path(), "10-2-0-1", TWO_CASES);
    let config = config(dir.path()).with_fuzz_parameters(vec![FuzzParameters::new(0, 1)]);
    let (pipeline, _) = pipeline(config, FakeAnalyses::new());

    pipeline.run_all().unwrap();
    let store = pipeline.store();

    assert!(store.contains("projection-fuzzed-0-1-10-2-0-1"));
    assert!(store.contains("projection-unrolled-10-2-0-1"));
    assert!(!store.contains("projection-fuzzed-0-1-unrolled-10-2-0-1"));
    assert!(!store.contains("projection-unrolled-fuzzed-0-1-10-2-0-1"));
    assert!(store.contains("extraction-Random-fuzzed-0-1-10-2-0-1"));
    assert!(store.contains("stats-extraction-LongestFirst-unrolled-10-2-0-1"));
    assert!(store.contains("stats-all"));
    assert!(store.contains("stats-fuzzed-0-1-all"));
    assert!(store.contains("stats-Random-unrolled-all"));
}

#[test]
fn missing_working_directory_is_reported() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent");
    let (pipeline, _) = pipeline(config(&missing), FakeAnalyses::new());

    let err = pipeline.verify_soundness().unwrap_err();
    assert!(matches!(err, BenchError::NotADirectory { .. }));
}
