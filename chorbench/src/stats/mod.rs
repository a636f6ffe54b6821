//! Statistics records, joins and pivots.
//!
//! Stages write one statistics file per input file. This module turns those
//! per-file tables into the wide tables used for comparison:
//! - [`Aggregator::combine`] outer-joins a group's network statistics with one
//!   strategy's extraction statistics
//! - [`pivot`] lays the combined tables of every strategy side by side
//! - [`accumulate`] concatenates one strategy's extraction statistics

mod accumulate;
mod join;
mod pivot;
mod records;

pub use accumulate::{accumulate, CORPUS_PARAMETER_COLUMNS};
pub use join::{
    full_match, group_primary_header, Aggregator, OuterJoin, COMBINED_KEY_HEADER, MISSING_MARKER,
};
pub use pivot::{pivot, reference_strategy};
pub use records::{
    format_average, statistics_table, ExtractionStatistics, ProjectionStatistics, StatisticsRecord,
    EXTRACTION_STATISTICS_HEADER, NETWORK_STATISTICS_HEADER, PROJECTION_STATISTICS_HEADER,
};
