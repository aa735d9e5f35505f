//! two_rooms: a room draining through one doorway into a hall.
//!
//! ```text
//!   room (space 0, 5×5)             hall (space 1, 6×3)
//!   . . . . .
//!   . . . . .                       . . . . . .
//!   . . . . D  ──── link ────────▶  E . . . . X
//!   . . . . .                       . . . . . .
//!   . . . . .
//! ```
//!
//! `D` is the room's exit, linked to the hall entrance `E`; `X` is unlinked,
//! so pedestrians stepping onto it leave.  Costs are the Chebyshev distance to
//! each space's exit.
//!
//! Usage: `two_rooms [config.json]`.  Output CSVs land in `output/two_rooms`.

use std::fs::File;
use std::io::Cursor;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result, ensure};
use log::{error, info};

use ev_core::{AgentId, SimConfig, SimRng, SpaceId, Tick, TileRef};
use ev_grid::{load_links_reader, load_space_reader};
use ev_output::{CsvWriter, OutputWriter, SimOutputObserver};
use ev_sim::{Activation, SimBuilder, SimObserver, World};

// ── Constants ─────────────────────────────────────────────────────────────────

const PEDESTRIANS:           usize = 16;
const SEED:                  u64   = 42;
const TOTAL_TICKS:           u64   = 2_000;
const OUTPUT_INTERVAL_TICKS: u64   = 10;
const OUTPUT_DIR:            &str  = "output/two_rooms";

// ── Layout CSV ────────────────────────────────────────────────────────────────

const ROOM_CSV: &str = "\
x,y,cost,exit\n\
0,0,4,0\n1,0,3,0\n2,0,2,0\n3,0,2,0\n4,0,2,0\n\
0,1,4,0\n1,1,3,0\n2,1,2,0\n3,1,1,0\n4,1,1,0\n\
0,2,4,0\n1,2,3,0\n2,2,2,0\n3,2,1,0\n4,2,0,1\n\
0,3,4,0\n1,3,3,0\n2,3,2,0\n3,3,1,0\n4,3,1,0\n\
0,4,4,0\n1,4,3,0\n2,4,2,0\n3,4,2,0\n4,4,2,0\n\
";

const HALL_CSV: &str = "\
x,y,cost,exit\n\
0,0,5,0\n1,0,4,0\n2,0,3,0\n3,0,2,0\n4,0,1,0\n5,0,1,0\n\
0,1,5,0\n1,1,4,0\n2,1,3,0\n3,1,2,0\n4,1,1,0\n5,1,0,1\n\
0,2,5,0\n1,2,4,0\n2,2,3,0\n3,2,2,0\n4,2,1,0\n5,2,1,0\n\
";

const LINKS_CSV: &str = "\
from_space,from_x,from_y,to_space,to_x,to_y\n\
0,4,2,1,0,1\n\
";

// ── Observer wrapper ──────────────────────────────────────────────────────────

/// Forwards to the CSV observer and tallies what pedestrians did.
struct ProgressObserver<W: OutputWriter> {
    inner:       SimOutputObserver<W>,
    moves:       usize,
    blocked:     usize,
    stayed:      usize,
    departures:  Vec<(Tick, AgentId)>,
}

impl<W: OutputWriter> ProgressObserver<W> {
    fn new(inner: SimOutputObserver<W>) -> Self {
        Self { inner, moves: 0, blocked: 0, stayed: 0, departures: Vec::new() }
    }
}

impl<W: OutputWriter> SimObserver for ProgressObserver<W> {
    fn on_activation(&mut self, tick: Tick, agent: AgentId, outcome: &Activation) {
        match outcome {
            Activation::Moved { .. } => self.moves += 1,
            Activation::Blocked { .. } => self.blocked += 1,
            Activation::Stayed { .. } => self.stayed += 1,
            Activation::Departed { .. } => self.departures.push((tick, agent)),
        }
    }

    fn on_tick_end(&mut self, tick: Tick, activations: usize, world: &World) {
        self.inner.on_tick_end(tick, activations, world);
    }

    fn on_snapshot(&mut self, tick: Tick, world: &World) {
        info!("{tick}: {} inside, {} out", world.live_count(), world.departed_count());
        self.inner.on_snapshot(tick, world);
    }

    fn on_sim_end(&mut self, final_tick: Tick, world: &World) {
        self.inner.on_sim_end(final_tick, world);
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn load_config() -> Result<SimConfig> {
    let Some(path) = std::env::args().nth(1) else {
        return Ok(SimConfig {
            total_ticks:           TOTAL_TICKS,
            seed:                  SEED,
            output_interval_ticks: OUTPUT_INTERVAL_TICKS,
            ..SimConfig::default()
        });
    };
    let file = File::open(&path).with_context(|| format!("opening {path}"))?;
    let config = serde_json::from_reader(file).with_context(|| format!("parsing {path}"))?;
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = load_config()?;
    info!(
        "config: {} ticks, seed {}, tie-break {:?}",
        config.total_ticks, config.seed, config.tie_break
    );

    // 1. Layout.
    let mut spaces = vec![
        load_space_reader(Cursor::new(ROOM_CSV), SpaceId(0))?,
        load_space_reader(Cursor::new(HALL_CSV), SpaceId(1))?,
    ];
    let links = load_links_reader(Cursor::new(LINKS_CSV), &mut spaces)?;
    info!("layout: {} spaces, {links} links", spaces.len());

    // 2. Random start tiles in the room, drawn from a stream separate from
    //    the one that drives movement.
    let mut starts: Vec<TileRef> = spaces[0]
        .tiles()
        .filter(|t| !t.is_exit())
        .map(|t| t.at())
        .collect();
    ensure!(starts.len() >= PEDESTRIANS, "room holds only {} pedestrians", starts.len());
    SimRng::new(config.seed).child(1).shuffle(&mut starts);
    starts.truncate(PEDESTRIANS);

    // 3. Build sim.
    let mut sim = SimBuilder::new(config, spaces)
        .pedestrians(starts, Tick::ZERO)
        .build()?;

    // 4. Output.
    std::fs::create_dir_all(OUTPUT_DIR)?;
    let writer = CsvWriter::new(Path::new(OUTPUT_DIR))?;
    let mut obs = ProgressObserver::new(SimOutputObserver::new(writer));

    // 5. Run.
    let t0 = Instant::now();
    sim.run(&mut obs)?;
    let elapsed = t0.elapsed();

    if let Some(e) = obs.inner.take_error() {
        error!("output error: {e}");
    }

    // 6. Summary.
    println!("Simulation finished at {} in {:.3} s", sim.now, elapsed.as_secs_f64());
    println!(
        "  moves: {}  blocked: {}  stayed: {}  departed: {}/{}",
        obs.moves,
        obs.blocked,
        obs.stayed,
        sim.departed_count(),
        PEDESTRIANS
    );
    if !sim.is_evacuated() {
        println!("  still inside: {:?}", sim.world.live_agents());
    }
    println!();
    println!("{:<10} {:<8}", "Agent", "Left at");
    println!("{}", "-".repeat(18));
    for (tick, agent) in &obs.departures {
        println!("{:<10} {:<8}", agent.0, tick.0);
    }

    Ok(())
}
