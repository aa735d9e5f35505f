//! `SimOutputObserver<W>` bridges `SimObserver` to an `OutputWriter`.

use ev_core::Tick;
use ev_sim::{SimObserver, World};

use crate::row::{OccupancyRow, TickSummaryRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that writes a summary row every tick and the occupancy
/// table at every snapshot.
///
/// `SimObserver` methods cannot fail, so the first writer error is stored and
/// later ones are dropped.  Check [`take_error`][Self::take_error] after
/// `sim.run()` returns.
pub struct SimOutputObserver<W: OutputWriter> {
    writer:     W,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, last_error: None }
    }

    /// Take the stored write error, if any.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer.
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_tick_end(&mut self, tick: Tick, activations: usize, world: &World) {
        let row = TickSummaryRow {
            tick:        tick.0,
            activations: activations as u64,
            live:        world.live_count() as u64,
            departed:    world.departed_count() as u64,
        };
        let result = self.writer.write_tick_summary(&row);
        self.store_err(result);
    }

    fn on_snapshot(&mut self, tick: Tick, world: &World) {
        let rows: Vec<OccupancyRow> = world
            .occupancy()
            .map(|(at, agent)| OccupancyRow {
                tick:     tick.0,
                agent_id: agent.0,
                space_id: at.space.0,
                x:        at.pos.x,
                y:        at.pos.y,
            })
            .collect();

        if !rows.is_empty() {
            let result = self.writer.write_occupancy(&rows);
            self.store_err(result);
        }
    }

    fn on_sim_end(&mut self, _final_tick: Tick, _world: &World) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
