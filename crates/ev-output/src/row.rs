//! Plain data row types written by output backends.

/// Counts at the end of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSummaryRow {
    pub tick:        u64,
    /// Agents activated during the tick.
    pub activations: u64,
    pub live:        u64,
    pub departed:    u64,
}

/// One occupied tile at a snapshot tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OccupancyRow {
    pub tick:     u64,
    pub agent_id: u32,
    pub space_id: u16,
    pub x:        u32,
    pub y:        u32,
}
