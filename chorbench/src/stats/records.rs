//! Per-stage statistics records and their headers.

use crate::analyses::{
    ChoreographyStatistics, Extraction, GraphStatistics, NetworkStatistics, ProgramStatistics,
};
use crate::codec::Table;
use crate::core::{CaseId, Strategy};
use crate::errors::MalformedRecordError;

/// Header of projection statistics files.
pub const PROJECTION_STATISTICS_HEADER: [&str; 18] = [
    "testId",
    "numberOfActions",
    "numberOfProcesses",
    "numberOfProcedures",
    "numberOfConditionals",
    "minLengthOfProcesses",
    "maxLengthOfProcesses",
    "avgLengthOfProcesses",
    "minNumberOfProceduresInProcesses",
    "maxNumberOfProceduresInProcesses",
    "avgNumberOfProceduresInProcesses",
    "minNumberOfConditionalsInProcesses",
    "maxNumberOfConditionalsInProcesses",
    "avgNumberOfConditionalsInProcesses",
    "numberOfProcessesWithConditionals",
    "minProcedureLengthInProcesses",
    "maxProcedureLengthInProcesses",
    "avgProcedureLengthInProcesses",
];

/// Header of fuzzing and unrolling statistics files.
pub const NETWORK_STATISTICS_HEADER: [&str; 14] = [
    "testId",
    "minLengthOfProcesses",
    "maxLengthOfProcesses",
    "avgLengthOfProcesses",
    "minNumberOfProceduresInProcesses",
    "maxNumberOfProceduresInProcesses",
    "avgNumberOfProceduresInProcesses",
    "minNumberOfConditionalsInProcesses",
    "maxNumberOfConditionalsInProcesses",
    "avgNumberOfConditionalsInProcesses",
    "numberOfProcessesWithConditionals",
    "minProcedureLengthInProcesses",
    "maxProcedureLengthInProcesses",
    "avgProcedureLengthInProcesses",
];

/// Header of extraction statistics files.
pub const EXTRACTION_STATISTICS_HEADER: [&str; 10] = [
    "testId",
    "strategy",
    "time(msec)",
    "nodes",
    "badLoops",
    "mainLength",
    "numOfProcedures",
    "minProcedureLength",
    "maxProcedureLength",
    "avgProcedureLength",
];

/// Formats an average the way the statistics files expect: whole values keep
/// one decimal (`3.0`), others use the shortest exact form (`2.5`).
#[must_use]
pub fn format_average(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

/// A row of a statistics file, minus its case id.
pub trait StatisticsRecord {
    /// The file header, case id column first.
    const HEADER: &'static [&'static str];

    /// The values following the case id, in header order.
    fn fields(&self) -> Vec<String>;
}

/// Builds a statistics table from `(case, record)` pairs.
pub fn statistics_table<'a, R, I>(records: I) -> Result<Table, MalformedRecordError>
where
    R: StatisticsRecord + 'a,
    I: IntoIterator<Item = (&'a CaseId, &'a R)>,
{
    let mut table = Table::new(R::HEADER.iter().copied());
    for (case, record) in records {
        table.push(case, record.fields())?;
    }
    Ok(table)
}

impl StatisticsRecord for NetworkStatistics {
    const HEADER: &'static [&'static str] = &NETWORK_STATISTICS_HEADER;

    fn fields(&self) -> Vec<String> {
        vec![
            self.min_length_of_processes.to_string(),
            self.max_length_of_processes.to_string(),
            format_average(self.avg_length_of_processes),
            self.min_number_of_procedures_in_processes.to_string(),
            self.max_number_of_procedures_in_processes.to_string(),
            format_average(self.avg_number_of_procedures_in_processes),
            self.min_number_of_conditionals_in_processes.to_string(),
            self.max_number_of_conditionals_in_processes.to_string(),
            format_average(self.avg_number_of_conditionals_in_processes),
            self.number_of_processes_with_conditionals.to_string(),
            self.min_procedure_length_in_processes.to_string(),
            self.max_procedure_length_in_processes.to_string(),
            format_average(self.avg_procedure_length_in_processes),
        ]
    }
}

/// Statistics of one projected case: the source choreography and its network.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionStatistics {
    /// Metrics of the choreography.
    pub choreography: ChoreographyStatistics,
    /// Metrics of the projected network.
    pub network: NetworkStatistics,
}

impl StatisticsRecord for ProjectionStatistics {
    const HEADER: &'static [&'static str] = &PROJECTION_STATISTICS_HEADER;

    fn fields(&self) -> Vec<String> {
        let mut fields = vec![
            self.choreography.number_of_actions.to_string(),
            self.choreography.number_of_processes.to_string(),
            self.choreography.number_of_procedures.to_string(),
            self.choreography.number_of_conditionals.to_string(),
        ];
        fields.extend(self.network.fields());
        fields
    }
}

/// Statistics of one extracted case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionStatistics {
    /// The strategy used.
    pub strategy: Strategy,
    /// Wall-clock extraction time in milliseconds.
    pub time_ms: u128,
    /// Graph exploration counters.
    pub graph: GraphStatistics,
    /// Metrics of the extracted program, all zero when unextractable.
    pub program: ProgramStatistics,
}

impl ExtractionStatistics {
    /// Builds the record of an extraction. `program` is only consulted when a
    /// choreography was extracted.
    pub fn from_extraction<F, E>(
        strategy: Strategy,
        time_ms: u128,
        extraction: &Extraction,
        program: F,
    ) -> Result<Self, E>
    where
        F: FnOnce(&str) -> Result<ProgramStatistics, E>,
    {
        use crate::analyses::ExtractionOutcome;

        let program = match &extraction.outcome {
            ExtractionOutcome::Extracted(choreography) => program(choreography)?,
            ExtractionOutcome::Unextractable => ProgramStatistics::default(),
        };
        Ok(Self {
            strategy,
            time_ms,
            graph: extraction.graph,
            program,
        })
    }
}

impl StatisticsRecord for ExtractionStatistics {
    const HEADER: &'static [&'static str] = &EXTRACTION_STATISTICS_HEADER;

    fn fields(&self) -> Vec<String> {
        let lengths = &self.program.procedure_lengths;
        let min = lengths.iter().min().copied().unwrap_or(0);
        let max = lengths.iter().max().copied().unwrap_or(0);
        #[allow(clippy::cast_precision_loss)]
        let avg = if lengths.is_empty() {
            "0".to_string()
        } else {
            format_average(lengths.iter().sum::<u64>() as f64 / lengths.len() as f64)
        };

        vec![
            self.strategy.to_string(),
            self.time_ms.to_string(),
            self.graph.nodes.to_string(),
            self.graph.bad_loops.to_string(),
            self.program.number_of_actions.to_string(),
            self.program.number_of_procedures.to_string(),
            min.to_string(),
            max.to_string(),
            avg,
        ]
    }
}
