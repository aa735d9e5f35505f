//! The `OutputWriter` trait implemented by all backend writers.

use crate::{OccupancyRow, OutputResult, TickSummaryRow};

/// A sink for simulation output.
///
/// Failures are returned here; [`SimOutputObserver`][crate::SimOutputObserver]
/// keeps the first one for [`take_error`][crate::SimOutputObserver::take_error].
pub trait OutputWriter {
    /// Write every occupied tile of one snapshot.
    fn write_occupancy(&mut self, rows: &[OccupancyRow]) -> OutputResult<()>;

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()>;

    /// Flush all underlying handles.  Idempotent.
    fn finish(&mut self) -> OutputResult<()>;
}
