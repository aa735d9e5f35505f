//! Integration tests for ev-sim.

use ev_core::{AgentId, SimConfig, SpaceId, TieBreak, Tick, TilePos, TileRef, UniformSource};
use ev_grid::{Space, SpaceBuilder};

use crate::{Activation, SimObserver, World};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn test_config(total_ticks: u64) -> SimConfig {
    SimConfig {
        total_ticks,
        seed:                  42,
        output_interval_ticks: 0,
        tie_break:             TieBreak::Insertion,
        stop_when_evacuated:   true,
    }
}

fn tref(space: u16, x: u32, y: u32) -> TileRef {
    TileRef::new(SpaceId(space), TilePos::new(x, y))
}

/// A 1×n row with the given costs; exits at the listed x positions.
fn row(id: u16, costs: &[f64], exits: &[u32]) -> Space {
    let mut b = SpaceBuilder::from_rows(SpaceId(id), &[costs.to_vec()]).unwrap();
    for &x in exits {
        b.mark_exit(TilePos::new(x, 0)).unwrap();
    }
    b.build().unwrap()
}

/// A `w×h` room whose cost is the Chebyshev distance to `door`, which is an
/// exit tile.
fn room(id: u16, w: u32, h: u32, door: TilePos) -> SpaceBuilder {
    let mut b = SpaceBuilder::new(SpaceId(id), w, h);
    for y in 0..h {
        for x in 0..w {
            let p = TilePos::new(x, y);
            b.set_cost(p, p.chebyshev(door) as f64).unwrap();
        }
    }
    b.mark_exit(door).unwrap();
    b
}

/// Records every activation and checks world-level invariants at the end of
/// every tick.
#[derive(Default)]
struct Recorder {
    log:       Vec<(Tick, AgentId, Activation)>,
    ticks:     usize,
    snapshots: Vec<Tick>,
}

impl Recorder {
    fn outcomes_of(&self, agent: AgentId) -> Vec<Activation> {
        self.log.iter().filter(|(_, a, _)| *a == agent).map(|(_, _, o)| *o).collect()
    }
}

impl SimObserver for Recorder {
    fn on_activation(&mut self, tick: Tick, agent: AgentId, outcome: &Activation) {
        self.log.push((tick, agent, *outcome));
    }

    fn on_tick_end(&mut self, _tick: Tick, _activations: usize, world: &World) {
        self.ticks += 1;
        // Conservation.
        assert_eq!(world.live_count() + world.departed_count(), world.initial_count());
        // Every live agent on exactly one tile, no tile shared.
        let mut seen: Vec<AgentId> = world.occupancy().map(|(_, a)| a).collect();
        assert_eq!(seen.len(), world.live_count());
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), world.live_count());
        assert!(seen.iter().all(|&a| world.is_live(a)));
    }

    fn on_snapshot(&mut self, tick: Tick, _world: &World) {
        self.snapshots.push(tick);
    }
}

/// Always returns the scripted indices in turn.
struct Scripted(Vec<usize>);

impl UniformSource for Scripted {
    fn pick_index(&mut self, n: usize) -> Option<usize> {
        if n == 0 {
            return None;
        }
        Some(self.0.remove(0) % n)
    }
}

// ── Delay rule ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod delay {
    use crate::reschedule_delay;

    #[test]
    fn delay_is_one_plus_floor_cost() {
        assert_eq!(reschedule_delay(0.0), 1);
        assert_eq!(reschedule_delay(0.9), 1);
        assert_eq!(reschedule_delay(1.0), 2);
        assert_eq!(reschedule_delay(2.7), 3);
        assert_eq!(reschedule_delay(10.0), 11);
    }
}

// ── SimBuilder validation ─────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use super::*;
    use crate::{SimBuilder, SimError};
    use ev_grid::GridError;

    #[test]
    fn builds_and_registers_first_wake() {
        let sim = SimBuilder::new(test_config(10), vec![row(0, &[2.0, 1.0, 0.0], &[2])])
            .pedestrian(tref(0, 0, 0), Tick(3))
            .pedestrian(tref(0, 1, 0), Tick(0))
            .build()
            .unwrap();
        assert_eq!(sim.live_count(), 2);
        assert_eq!(sim.world.occupant(tref(0, 0, 0)).unwrap(), Some(AgentId(0)));
        assert_eq!(sim.world.occupant(tref(0, 1, 0)).unwrap(), Some(AgentId(1)));
        let h = sim.agent(AgentId(0)).unwrap().handle().unwrap();
        assert_eq!(sim.scheduler.due_tick(h), Some(Tick(3)));
        assert_eq!(sim.scheduler.next_tick(), Some(Tick(0)));
    }

    #[test]
    fn shared_start_tile_rejected() {
        let result = SimBuilder::new(test_config(10), vec![row(0, &[1.0, 0.0], &[1])])
            .pedestrians([tref(0, 0, 0), tref(0, 0, 0)], Tick(0))
            .build();
        assert!(matches!(
            result,
            Err(SimError::Grid(GridError::OccupancyViolation { .. }))
        ));
    }

    #[test]
    fn dangling_link_rejected_at_build() {
        let result = SimBuilder::new(test_config(10), vec![row(0, &[1.0, 0.0], &[1])])
            .link(tref(0, 1, 0), tref(3, 0, 0))
            .build();
        assert!(matches!(
            result,
            Err(SimError::Grid(GridError::DanglingLink { .. }))
        ));
    }

    #[test]
    fn link_from_interior_rejected() {
        let result = SimBuilder::new(test_config(10), vec![row(0, &[1.0, 0.0], &[1])])
            .link(tref(0, 0, 0), tref(0, 1, 0))
            .build();
        assert!(matches!(result, Err(SimError::Grid(GridError::NotAnExit(_)))));
    }

    #[test]
    fn placement_out_of_bounds_rejected() {
        let result = SimBuilder::new(test_config(10), vec![row(0, &[1.0, 0.0], &[1])])
            .pedestrian(tref(0, 5, 0), Tick(0))
            .build();
        assert!(matches!(result, Err(SimError::Grid(GridError::OutOfBounds { .. }))));
    }

    #[test]
    fn zero_ticks_rejected() {
        let result = SimBuilder::new(test_config(0), vec![row(0, &[0.0], &[0])]).build();
        assert!(matches!(result, Err(SimError::Config(_))));
    }
}

// ── World occupancy ───────────────────────────────────────────────────────────

#[cfg(test)]
mod world_tests {
    use super::*;
    use crate::SimError;
    use ev_grid::GridError;

    fn world() -> World {
        World::new(vec![row(0, &[2.0, 1.0, 0.0], &[2])]).unwrap()
    }

    #[test]
    fn relocate_moves_occupancy() {
        let mut w = world();
        w.place(AgentId(0), tref(0, 0, 0)).unwrap();
        w.relocate(AgentId(0), tref(0, 0, 0), tref(0, 1, 0)).unwrap();
        assert_eq!(w.occupant(tref(0, 0, 0)).unwrap(), None);
        assert_eq!(w.occupant(tref(0, 1, 0)).unwrap(), Some(AgentId(0)));
    }

    #[test]
    fn relocate_onto_occupied_leaves_world_untouched() {
        let mut w = world();
        w.place(AgentId(0), tref(0, 0, 0)).unwrap();
        w.place(AgentId(1), tref(0, 1, 0)).unwrap();
        let err = w.relocate(AgentId(0), tref(0, 0, 0), tref(0, 1, 0)).unwrap_err();
        assert!(matches!(err, SimError::Grid(GridError::OccupancyViolation { .. })));
        assert_eq!(w.occupant(tref(0, 0, 0)).unwrap(), Some(AgentId(0)));
        assert_eq!(w.occupant(tref(0, 1, 0)).unwrap(), Some(AgentId(1)));
    }

    #[test]
    fn relocate_from_wrong_tile_rejected() {
        let mut w = world();
        w.place(AgentId(0), tref(0, 0, 0)).unwrap();
        let err = w.relocate(AgentId(0), tref(0, 1, 0), tref(0, 2, 0)).unwrap_err();
        assert!(matches!(err, SimError::Grid(GridError::NotOccupied { .. })));
        assert_eq!(w.occupant(tref(0, 2, 0)).unwrap(), None);
    }

    #[test]
    fn depart_updates_counts() {
        let mut w = world();
        w.place(AgentId(0), tref(0, 2, 0)).unwrap();
        w.place(AgentId(1), tref(0, 0, 0)).unwrap();
        w.depart(AgentId(0), tref(0, 2, 0)).unwrap();
        assert_eq!(w.live_count(), 1);
        assert_eq!(w.departed_count(), 1);
        assert_eq!(w.initial_count(), 2);
        assert!(!w.is_live(AgentId(0)));
        assert_eq!(w.live_agents(), vec![AgentId(1)]);
        assert!(matches!(w.depart(AgentId(0), tref(0, 2, 0)), Err(SimError::NotLive(_))));
    }

    #[test]
    fn duplicate_placement_rejected() {
        let mut w = world();
        w.place(AgentId(0), tref(0, 0, 0)).unwrap();
        assert!(matches!(
            w.place(AgentId(0), tref(0, 1, 0)),
            Err(SimError::DuplicateAgent(_))
        ));
        assert_eq!(w.occupant(tref(0, 1, 0)).unwrap(), None);
    }

    #[test]
    fn unknown_space_lookup() {
        let w = world();
        assert!(w.tile(tref(9, 0, 0)).is_err());
        assert!(w.space(SpaceId(0)).is_ok());
    }
}

// ── Movement protocol, activated directly ─────────────────────────────────────

#[cfg(test)]
mod protocol {
    use super::*;
    use crate::{Activate, Pedestrian, SimError, StepContext};
    use ev_schedule::Scheduler;

    /// 3×3 room, all cost 0 except the centre (cost 1).
    fn bowl() -> World {
        let mut b = SpaceBuilder::new(SpaceId(0), 3, 3);
        b.set_cost(TilePos::new(1, 1), 1.0).unwrap();
        World::new(vec![b.build().unwrap()]).unwrap()
    }

    fn activate_once(
        world:     &mut World,
        scheduler: &mut Scheduler,
        ped:       &mut Pedestrian,
        id:        AgentId,
        script:    Vec<usize>,
    ) -> crate::SimResult<Activation> {
        let mut rng = Scripted(script);
        let mut ctx = StepContext { tick: Tick(10), world, scheduler, rng: &mut rng };
        ped.activate(id, &mut ctx)
    }

    #[test]
    fn uniform_draw_indexes_neighbors_in_scan_order() {
        for (draw, expect) in [(0, tref(0, 0, 0)), (3, tref(0, 0, 1)), (7, tref(0, 2, 2))] {
            let mut world = bowl();
            let mut sched = Scheduler::default();
            world.place(AgentId(0), tref(0, 1, 1)).unwrap();
            let mut ped = Pedestrian::new(tref(0, 1, 1));
            let out = activate_once(&mut world, &mut sched, &mut ped, AgentId(0), vec![draw]).unwrap();
            assert_eq!(out, Activation::Moved { from: tref(0, 1, 1), to: expect, next: Tick(11) });
            assert_eq!(ped.at(), expect);
            assert_eq!(world.occupant(expect).unwrap(), Some(AgentId(0)));
        }
    }

    #[test]
    fn occupied_neighbors_are_not_candidates() {
        let mut world = bowl();
        let mut sched = Scheduler::default();
        world.place(AgentId(0), tref(0, 1, 1)).unwrap();
        // Fill every neighbor except (2, 2).
        let mut next_id = 1;
        for (x, y) in [(0, 0), (1, 0), (2, 0), (0, 1), (2, 1), (0, 2), (1, 2)] {
            world.place(AgentId(next_id), tref(0, x, y)).unwrap();
            next_id += 1;
        }
        let mut ped = Pedestrian::new(tref(0, 1, 1));
        // Draw index 0 of a single-candidate set.
        let out = activate_once(&mut world, &mut sched, &mut ped, AgentId(0), vec![0]).unwrap();
        assert_eq!(out.position(), Some(tref(0, 2, 2)));
    }

    #[test]
    fn fully_blocked_interior_stays() {
        // Centre cost 1, ring cost 2 except two occupied cost-0 tiles.
        let mut b = SpaceBuilder::new(SpaceId(0), 3, 3);
        for y in 0..3 {
            for x in 0..3 {
                b.set_cost(TilePos::new(x, y), 2.0).unwrap();
            }
        }
        b.set_cost(TilePos::new(1, 1), 1.0).unwrap();
        b.set_cost(TilePos::new(0, 0), 0.0).unwrap();
        b.set_cost(TilePos::new(2, 2), 0.0).unwrap();
        let mut world = World::new(vec![b.build().unwrap()]).unwrap();
        world.place(AgentId(0), tref(0, 1, 1)).unwrap();
        world.place(AgentId(1), tref(0, 0, 0)).unwrap();
        world.place(AgentId(2), tref(0, 2, 2)).unwrap();
        let mut sched = Scheduler::default();
        let mut ped = Pedestrian::new(tref(0, 1, 1));

        let out = activate_once(&mut world, &mut sched, &mut ped, AgentId(0), vec![]).unwrap();
        assert_eq!(out, Activation::Stayed { at: tref(0, 1, 1), next: Tick(12) });
        assert_eq!(ped.at(), tref(0, 1, 1));
        assert_eq!(sched.due_tick(ped.handle().unwrap()), Some(Tick(12)));
    }

    #[test]
    fn departed_pedestrian_cannot_be_reactivated() {
        let mut world = World::new(vec![row(0, &[0.0], &[0])]).unwrap();
        let mut sched = Scheduler::default();
        world.place(AgentId(0), tref(0, 0, 0)).unwrap();
        let mut ped = Pedestrian::new(tref(0, 0, 0));

        let out = activate_once(&mut world, &mut sched, &mut ped, AgentId(0), vec![]).unwrap();
        assert_eq!(out, Activation::Departed { from: tref(0, 0, 0) });
        assert_eq!(out.next_wake(), None);
        assert!(ped.has_departed());
        assert!(ped.handle().is_none());
        assert!(sched.is_empty());
        assert_eq!(world.occupant(tref(0, 0, 0)).unwrap(), None);

        let again = activate_once(&mut world, &mut sched, &mut ped, AgentId(0), vec![]);
        assert!(matches!(again, Err(SimError::Departed(AgentId(0)))));
    }

    #[test]
    fn departure_leaves_no_registration_behind() {
        let mut world = World::new(vec![row(0, &[0.0], &[0])]).unwrap();
        let mut sched = Scheduler::default();
        world.place(AgentId(0), tref(0, 0, 0)).unwrap();
        let mut ped = Pedestrian::new(tref(0, 0, 0));
        let handle = sched.schedule_once(Tick(10), AgentId(0)).unwrap();
        ped.set_handle(handle);
        assert_eq!(sched.pop_due(Tick(10)), Some((handle, AgentId(0))));

        activate_once(&mut world, &mut sched, &mut ped, AgentId(0), vec![]).unwrap();
        assert!(ped.handle().is_none());
        assert!(!sched.is_live(handle));
        assert!(sched.is_empty());
    }
}

// ── Scenarios ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod scenarios {
    use super::*;
    use crate::SimBuilder;

    /// 1×3 corridor `[2, 1, 0]`, unlinked exit on the right.
    #[test]
    fn corridor_departs_after_three_activations() {
        let mut sim = SimBuilder::new(test_config(100), vec![row(0, &[2.0, 1.0, 0.0], &[2])])
            .pedestrian(tref(0, 0, 0), Tick(0))
            .build()
            .unwrap();
        let mut rec = Recorder::default();
        sim.run(&mut rec).unwrap();

        assert_eq!(
            rec.log,
            vec![
                (Tick(0), AgentId(0), Activation::Moved { from: tref(0, 0, 0), to: tref(0, 1, 0), next: Tick(2) }),
                (Tick(2), AgentId(0), Activation::Moved { from: tref(0, 1, 0), to: tref(0, 2, 0), next: Tick(3) }),
                (Tick(3), AgentId(0), Activation::Departed { from: tref(0, 2, 0) }),
            ]
        );
        assert!(!sim.world.is_live(AgentId(0)));
        assert!(sim.is_evacuated());
        assert_eq!(sim.departed_count(), 1);
        assert!(sim.scheduler.is_empty());
        // Stopped early instead of running all 100 ticks.
        assert_eq!(sim.now, Tick(4));
        assert_eq!(rec.ticks, 4);
    }

    /// Doorway queueing: the exit-tile agent waits while the entrance it
    /// leads to stays occupied.
    #[test]
    fn blocked_exit_waits_while_entrance_occupied() {
        // 1×2 row: exit (cost 1) linked to its own neighbor (cost 0).  The
        // neighbor's occupant has nowhere lower to go, so it never leaves.
        let sim_spaces = vec![row(0, &[1.0, 0.0], &[0])];
        let mut sim = SimBuilder::new(test_config(30), sim_spaces)
            .link(tref(0, 0, 0), tref(0, 1, 0))
            .pedestrian(tref(0, 0, 0), Tick(0))
            .pedestrian(tref(0, 1, 0), Tick(0))
            .build()
            .unwrap();
        let mut rec = Recorder::default();
        sim.run_ticks(30, &mut rec).unwrap();

        let outcomes = rec.outcomes_of(AgentId(0));
        assert_eq!(outcomes.len(), 15); // every 2 ticks
        assert!(outcomes.iter().all(|o| matches!(o, Activation::Blocked { at, .. } if *at == tref(0, 0, 0))));
        assert_eq!(sim.agent(AgentId(0)).unwrap().at(), tref(0, 0, 0));
        assert_eq!(sim.live_count(), 2);
    }

    /// Doorway queueing across spaces: the agent moves once the entrance
    /// frees up.
    #[test]
    fn blocked_exit_moves_once_entrance_frees() {
        let mut door = SpaceBuilder::from_rows(SpaceId(0), &[vec![1.0]]).unwrap();
        door.mark_exit(TilePos::new(0, 0)).unwrap();
        let hall = row(1, &[1.0, 0.0], &[1]);
        let mut sim = SimBuilder::new(test_config(100), vec![door.build().unwrap(), hall])
            .link(tref(0, 0, 0), tref(1, 0, 0))
            .pedestrian(tref(0, 0, 0), Tick(0)) // A: waits at the door
            .pedestrian(tref(1, 0, 0), Tick(0)) // B: stands on the entrance
            .build()
            .unwrap();
        let mut rec = Recorder::default();
        sim.run(&mut rec).unwrap();

        let (a, b) = (AgentId(0), AgentId(1));
        assert_eq!(
            rec.log,
            vec![
                (Tick(0), a, Activation::Blocked { at: tref(0, 0, 0), next: Tick(2) }),
                (Tick(0), b, Activation::Moved { from: tref(1, 0, 0), to: tref(1, 1, 0), next: Tick(1) }),
                (Tick(1), b, Activation::Departed { from: tref(1, 1, 0) }),
                (Tick(2), a, Activation::Moved { from: tref(0, 0, 0), to: tref(1, 0, 0), next: Tick(4) }),
                (Tick(4), a, Activation::Moved { from: tref(1, 0, 0), to: tref(1, 1, 0), next: Tick(5) }),
                (Tick(5), a, Activation::Departed { from: tref(1, 1, 0) }),
            ]
        );
        assert!(sim.is_evacuated());
    }

    /// The only lower-or-equal neighbor is occupied: stay, and reschedule
    /// from the unchanged tile.
    #[test]
    fn only_eligible_neighbor_occupied() {
        let mut sim = SimBuilder::new(test_config(10), vec![row(0, &[2.0, 1.0, 5.0], &[])])
            .pedestrian(tref(0, 0, 0), Tick(0))
            .pedestrian(tref(0, 1, 0), Tick(0))
            .build()
            .unwrap();
        let mut rec = Recorder::default();
        sim.step(&mut rec).unwrap();

        assert_eq!(
            rec.outcomes_of(AgentId(0)),
            vec![Activation::Stayed { at: tref(0, 0, 0), next: Tick(3) }]
        );
        let h = sim.agent(AgentId(0)).unwrap().handle().unwrap();
        assert_eq!(sim.scheduler.due_tick(h), Some(Tick(3)));
        assert_eq!(sim.world.occupant(tref(0, 0, 0)).unwrap(), Some(AgentId(0)));
    }

    #[test]
    fn huge_cost_parks_pedestrian_without_overflow() {
        let mut sim = SimBuilder::new(test_config(10), vec![row(0, &[1e30, 1e30], &[])])
            .pedestrian(tref(0, 0, 0), Tick(1))
            .build()
            .unwrap();
        let mut rec = Recorder::default();
        sim.step(&mut rec).unwrap();
        sim.step(&mut rec).unwrap();

        assert_eq!(
            rec.log,
            vec![(
                Tick(1),
                AgentId(0),
                Activation::Moved { from: tref(0, 0, 0), to: tref(0, 1, 0), next: Tick(u64::MAX) }
            )]
        );
        sim.run(&mut rec).unwrap();
        assert_eq!(rec.log.len(), 1);
        assert_eq!(sim.now, Tick(10));
        assert_eq!(sim.live_count(), 1);
    }

    #[test]
    fn snapshots_follow_interval() {
        let config = SimConfig { output_interval_ticks: 2, ..test_config(100) };
        let mut sim = SimBuilder::new(config, vec![row(0, &[2.0, 1.0, 0.0], &[2])])
            .pedestrian(tref(0, 0, 0), Tick(0))
            .build()
            .unwrap();
        let mut rec = Recorder::default();
        sim.run(&mut rec).unwrap();
        assert_eq!(rec.snapshots, vec![Tick(0), Tick(2)]);
    }

    #[test]
    fn runs_to_end_tick_without_stop() {
        let config = SimConfig { stop_when_evacuated: false, ..test_config(20) };
        let mut sim = SimBuilder::new(config, vec![row(0, &[0.0], &[0])])
            .pedestrian(tref(0, 0, 0), Tick(0))
            .build()
            .unwrap();
        sim.run(&mut crate::NoopObserver).unwrap();
        assert_eq!(sim.now, Tick(20));
        assert!(sim.is_evacuated());
    }
}

// ── Same-tick contention ──────────────────────────────────────────────────────

#[cfg(test)]
mod tie_break {
    use super::*;
    use crate::{Pedestrian, Sim};
    use ev_schedule::Scheduler;

    /// Two linked exits feeding one entrance; agent 1 is registered before
    /// agent 0.
    fn contention(tie_break: TieBreak) -> Sim {
        let mut s0 = SpaceBuilder::from_rows(SpaceId(0), &[vec![0.0, 3.0, 0.0]]).unwrap();
        for x in [0, 2] {
            s0.mark_exit(TilePos::new(x, 0)).unwrap();
            s0.link_exit(TilePos::new(x, 0), tref(1, 0, 0)).unwrap();
        }
        let s1 = row(1, &[1.0, 0.0], &[1]);
        let mut world = World::new(vec![s0.build().unwrap(), s1]).unwrap();
        world.place(AgentId(0), tref(0, 0, 0)).unwrap();
        world.place(AgentId(1), tref(0, 2, 0)).unwrap();

        let mut scheduler = Scheduler::new(tie_break);
        let mut p0 = Pedestrian::new(tref(0, 0, 0));
        let mut p1 = Pedestrian::new(tref(0, 2, 0));
        p1.set_handle(scheduler.schedule_once(Tick(0), AgentId(1)).unwrap());
        p0.set_handle(scheduler.schedule_once(Tick(0), AgentId(0)).unwrap());

        let config = SimConfig { tie_break, ..test_config(50) };
        Sim::new(config, world, scheduler, vec![p0, p1]).unwrap()
    }

    #[test]
    fn insertion_order_first_registrant_wins() {
        let mut sim = contention(TieBreak::Insertion);
        let mut rec = Recorder::default();
        sim.step(&mut rec).unwrap();
        assert_eq!(
            rec.log,
            vec![
                (Tick(0), AgentId(1), Activation::Moved { from: tref(0, 2, 0), to: tref(1, 0, 0), next: Tick(2) }),
                (Tick(0), AgentId(0), Activation::Blocked { at: tref(0, 0, 0), next: Tick(1) }),
            ]
        );
    }

    #[test]
    fn agent_order_lowest_id_wins() {
        let mut sim = contention(TieBreak::AgentOrder);
        let mut rec = Recorder::default();
        sim.step(&mut rec).unwrap();
        assert_eq!(
            rec.log,
            vec![
                (Tick(0), AgentId(0), Activation::Moved { from: tref(0, 0, 0), to: tref(1, 0, 0), next: Tick(2) }),
                (Tick(0), AgentId(1), Activation::Blocked { at: tref(0, 2, 0), next: Tick(1) }),
            ]
        );
    }

    #[test]
    fn both_eventually_leave() {
        for tb in [TieBreak::Insertion, TieBreak::AgentOrder] {
            let mut sim = contention(tb);
            sim.run(&mut Recorder::default()).unwrap();
            assert!(sim.is_evacuated());
            assert_eq!(sim.departed_count(), 2);
        }
    }
}

// ── Whole-run properties ──────────────────────────────────────────────────────

#[cfg(test)]
mod properties {
    use super::*;
    use crate::{Sim, SimBuilder, reschedule_delay};

    /// 5×5 room draining through (4, 2) into a 6×3 hall that exits at (5, 1).
    /// 15 pedestrians fill the left three columns of the room.
    fn two_rooms(seed: u64) -> Sim {
        let mut r = room(0, 5, 5, TilePos::new(4, 2));
        r.link_exit(TilePos::new(4, 2), tref(1, 0, 1)).unwrap();
        let hall = room(1, 6, 3, TilePos::new(5, 1));
        let starts = (0..5).flat_map(|y| (0..3).map(move |x| tref(0, x, y)));
        let config = SimConfig { seed, ..test_config(5_000) };
        SimBuilder::new(config, vec![r.build().unwrap(), hall.build().unwrap()])
            .pedestrians(starts, Tick(0))
            .build()
            .unwrap()
    }

    fn cost(sim: &Sim, at: TileRef) -> f64 {
        sim.world.tile(at).unwrap().cost()
    }

    #[test]
    fn everyone_evacuates_and_invariants_hold() {
        let mut sim = two_rooms(7);
        let mut rec = Recorder::default();
        sim.run(&mut rec).unwrap();

        assert!(sim.is_evacuated());
        assert_eq!(sim.departed_count(), 15);
        assert!(sim.scheduler.is_empty());
        assert!(sim.agents.iter().all(|p| p.has_departed()));

        for &(tick, agent, outcome) in &rec.log {
            // Interior moves never climb the floor field.
            if let Activation::Moved { from, to, .. } = outcome {
                if from.space == to.space {
                    assert!(cost(&sim, to) <= cost(&sim, from), "{agent} climbed {from} -> {to}");
                }
            }
            // Delay derived from the tile occupied afterwards.
            if let (Some(next), Some(at)) = (outcome.next_wake(), outcome.position()) {
                assert_eq!(next - tick, reschedule_delay(cost(&sim, at)));
            }
        }

        // Departed agents never reappear.
        for i in 0..15 {
            let outcomes = rec.outcomes_of(AgentId(i));
            let departures = outcomes
                .iter()
                .filter(|o| matches!(o, Activation::Departed { .. }))
                .count();
            assert_eq!(departures, 1);
            assert!(matches!(outcomes.last(), Some(Activation::Departed { .. })));
        }
    }

    #[test]
    fn same_seed_same_trajectories() {
        let mut a = two_rooms(123);
        let mut b = two_rooms(123);
        let mut ra = Recorder::default();
        let mut rb = Recorder::default();
        a.run(&mut ra).unwrap();
        b.run(&mut rb).unwrap();
        assert_eq!(ra.log, rb.log);
        assert_eq!(a.now, b.now);
    }
}

// ── Other agent kinds ─────────────────────────────────────────────────────────

#[cfg(test)]
mod custom_agents {
    use super::*;
    use crate::{Activate, Sim, SimResult, StepContext};
    use ev_schedule::{ScheduleHandle, Scheduler};

    /// Stationary beacon that counts its activations via a repeating
    /// registration.
    struct Beacon {
        at:     TileRef,
        handle: ScheduleHandle,
        pings:  u32,
    }

    impl Activate for Beacon {
        fn activate(&mut self, _id: AgentId, ctx: &mut StepContext<'_>) -> SimResult<Activation> {
            self.pings += 1;
            let next = ctx.scheduler.due_tick(self.handle).unwrap_or(ctx.tick);
            Ok(Activation::Stayed { at: self.at, next })
        }
    }

    #[test]
    fn repeating_agent_runs_on_its_interval() {
        let mut world = World::new(vec![row(0, &[0.0, 0.0], &[])]).unwrap();
        world.place(AgentId(0), tref(0, 0, 0)).unwrap();
        let mut scheduler = Scheduler::default();
        let handle = scheduler.schedule_repeating(Tick(1), 4, AgentId(0)).unwrap();
        let beacon = Beacon { at: tref(0, 0, 0), handle, pings: 0 };

        let mut sim = Sim::new(test_config(20), world, scheduler, vec![beacon]).unwrap();
        let mut rec = Recorder::default();
        sim.run(&mut rec).unwrap();

        assert_eq!(sim.agents[0].pings, 5); // ticks 1, 5, 9, 13, 17
        assert_eq!(
            rec.log.iter().map(|(t, ..)| t.0).collect::<Vec<_>>(),
            vec![1, 5, 9, 13, 17]
        );
        assert_eq!(rec.log[0].2.next_wake(), Some(Tick(5)));
        assert_eq!(sim.now, Tick(20));
    }
}
