//! `chorbench` command-line interface.

use anyhow::{bail, Context};
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use chorbench::analyses::{
    Analyses, ChoreographyStatistics, CommandAnalyses, CommandConfig, Extraction, NetworkStatistics,
    ProgramStatistics,
};
use chorbench::config::PipelineConfig;
use chorbench::core::{FuzzParameters, Group, Strategy, Verdict};
use chorbench::errors::AnalysisError;
use chorbench::events::LoggingEventSink;
use chorbench::observability::init_tracing;
use chorbench::pipeline::{Pipeline, StageReport};

#[derive(Parser)]
#[command(name = "chorbench")]
#[command(about = "Benchmark pipeline for choreography projection and extraction")]
#[command(version)]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Working directory holding corpus, artifact and statistics files
    #[arg(long, global = true)]
    working_dir: Option<PathBuf>,

    /// Analyzer program answering JSON requests on stdin
    #[arg(long, global = true)]
    analyzer: Option<PathBuf>,

    /// More output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Only warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Project every choreography corpus file
    Project,
    /// Extract projected networks
    Extract {
        /// Only this strategy (default: every configured strategy)
        #[arg(long)]
        strategy: Option<Strategy>,
    },
    /// Fuzz projected networks
    Fuzz {
        /// Deletions per network (requires --swaps)
        #[arg(long, requires = "swaps")]
        deletions: Option<u32>,
        /// Swaps per network (requires --deletions)
        #[arg(long, requires = "deletions")]
        swaps: Option<u32>,
    },
    /// Unroll and shift projected networks with procedures
    Unroll,
    /// Compare extracted choreographies with their sources
    Soundness,
    /// Outer-join network and extraction statistics
    Combine {
        /// Only this group: plain, unrolled or fuzzed-<d>-<s>
        #[arg(long)]
        group: Option<Group>,
        /// Only this test set
        #[arg(long)]
        test_set: Option<String>,
        /// Only this strategy
        #[arg(long)]
        strategy: Option<Strategy>,
    },
    /// Lay the combined statistics of every strategy side by side
    Pivot {
        /// Group: plain, unrolled or fuzzed-<d>-<s>
        #[arg(long)]
        group: Group,
        /// Test set name
        #[arg(long)]
        test_set: String,
    },
    /// Concatenate one strategy's extraction statistics
    Accumulate {
        /// Strategy
        #[arg(long)]
        strategy: Strategy,
    },
    /// Run every stage, then build the combined statistics
    All,
    /// List checkpoint records
    Status,
}

/// Stands in for the analyzer when none is configured. Statistics commands
/// never call it.
struct NoAnalyzer;

impl NoAnalyzer {
    fn fail<T>(analysis: &str) -> Result<T, AnalysisError> {
        Err(AnalysisError::failed(
            analysis,
            "no analyzer configured (use --analyzer or the `analyzer` config key)",
        ))
    }
}

impl Analyses for NoAnalyzer {
    fn project(&self, _choreography: &str) -> Result<String, AnalysisError> {
        Self::fail("project")
    }

    fn extract(&self, _network: &str, _strategy: Strategy) -> Result<Extraction, AnalysisError> {
        Self::fail("extract")
    }

    fn bisimilar(&self, _original: &str, _extracted: &str) -> Result<Verdict, AnalysisError> {
        Self::fail("bisimilar")
    }

    fn fuzz(&self, _network: &str, _deletions: u32, _swaps: u32) -> Result<String, AnalysisError> {
        Self::fail("fuzz")
    }

    fn unfold(
        &self,
        _network: &str,
        _probability: f64,
        _iterations: u32,
    ) -> Result<String, AnalysisError> {
        Self::fail("unfold")
    }

    fn shift(&self, _network: &str, _probability: f64) -> Result<String, AnalysisError> {
        Self::fail("shift")
    }

    fn choreography_statistics(
        &self,
        _choreography: &str,
    ) -> Result<ChoreographyStatistics, AnalysisError> {
        Self::fail("choreography_statistics")
    }

    fn network_statistics(&self, _network: &str) -> Result<NetworkStatistics, AnalysisError> {
        Self::fail("network_statistics")
    }

    fn program_statistics(&self, _choreography: &str) -> Result<ProgramStatistics, AnalysisError> {
        Self::fail("program_statistics")
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(dir) = &cli.working_dir {
        config = config.with_working_dir(dir);
    }
    if let Some(program) = &cli.analyzer {
        config = config.with_analyzer(CommandConfig::new(program));
    }
    Ok(config)
}

fn print_reports(reports: &[StageReport]) {
    for report in reports {
        println!(
            "{}: {} written, {} up to date",
            report.stage,
            report.written.len(),
            report.skipped.len()
        );
    }
}

fn run(cli: &Cli, pipeline: &Pipeline) -> anyhow::Result<()> {
    let config = pipeline.config();
    match &cli.command {
        Commands::Project => print_reports(&[pipeline.project()?]),
        Commands::Extract { strategy } => match strategy {
            Some(strategy) => print_reports(&[pipeline.extract(*strategy)?]),
            None => print_reports(&pipeline.extract_all()?),
        },
        Commands::Fuzz { deletions, swaps } => match (deletions, swaps) {
            (Some(deletions), Some(swaps)) => {
                print_reports(&[pipeline.fuzz(FuzzParameters::new(*deletions, *swaps))?]);
            }
            _ => print_reports(&pipeline.fuzz_all()?),
        },
        Commands::Unroll => print_reports(&[pipeline.unroll_and_shift()?]),
        Commands::Soundness => {
            let report = pipeline.verify_soundness()?;
            println!(
                "Ok: {}, Timeout: {}, Fail: {}, not extracted: {}",
                report.tally.ok, report.tally.maybe, report.tally.fail, report.skipped
            );
        }
        Commands::Combine {
            group: None,
            test_set: None,
            strategy: None,
        } => {
            for name in pipeline.make_combined_statistics()? {
                println!("{name}");
            }
        }
        Commands::Combine {
            group,
            test_set,
            strategy,
        } => {
            let groups = group.map_or_else(|| config.groups.clone(), |g| vec![g]);
            let strategies = strategy.map_or_else(|| config.strategies.clone(), |s| vec![s]);
            let test_sets = match test_set {
                Some(name) => match config.test_set(name) {
                    Some(set) => vec![set.clone()],
                    None => bail!("Unknown test set: {name}"),
                },
                None => config.test_sets.clone(),
            };
            for &group in &groups {
                for set in &test_sets {
                    for &strategy in &strategies {
                        let table = pipeline.combine(strategy, group, set)?;
                        println!(
                            "{}: {} rows",
                            config.naming.combined_file(strategy, group, &set.name),
                            table.len()
                        );
                    }
                }
            }
        }
        Commands::Pivot { group, test_set } => {
            let table = pipeline.pivot(*group, test_set)?;
            println!("{}: {} rows", config.naming.pivot_file(*group, test_set), table.len());
        }
        Commands::Accumulate { strategy } => {
            let table = pipeline.accumulate(*strategy)?;
            println!("{}: {} rows", config.naming.accumulated_file(*strategy), table.len());
        }
        Commands::All => {
            let summary = pipeline.run_all()?;
            print_reports(&summary.stages);
            println!("{} statistics files written", summary.statistics.len());
        }
        Commands::Status => {
            for record in pipeline.status()? {
                println!(
                    "{:?}\t{}\t{}\t{}",
                    record.status,
                    record.stage,
                    record.artifact,
                    record.updated_at.to_rfc3339()
                );
            }
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let directive = match (cli.quiet, cli.verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    init_tracing(directive);

    let config = load_config(&cli)?;
    let analyses: Box<dyn Analyses> = match &config.analyzer {
        Some(analyzer) => Box::new(CommandAnalyses::new(analyzer.clone())),
        None => Box::new(NoAnalyzer),
    };
    let pipeline = Pipeline::new(config, analyses, Arc::new(LoggingEventSink::new()))
        .context("Invalid configuration")?;

    run(&cli, &pipeline)
}
