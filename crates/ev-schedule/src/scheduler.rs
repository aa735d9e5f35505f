//! `Scheduler`: sparse, tick-keyed activation queue.
//!
//! # Why this shape
//!
//! Pedestrians far from an exit wait many ticks between activations, so most
//! agents are idle on any given tick.  Agents register the tick at which they
//! need attention next, and each tick the simulation pops only the agents due
//! then: O(active) work instead of O(N).
//!
//! # Same-tick order
//!
//! Entries due at the same tick are handed out in [`TieBreak`] order:
//!
//! | Policy       | Order within a tick                                    |
//! |--------------|--------------------------------------------------------|
//! | `Insertion`  | registration order (a repeating entry counts as newly registered each time it is re-queued) |
//! | `AgentOrder` | ascending `AgentId`, then registration order           |
//!
//! # Cancellation
//!
//! Cancelling removes the queued entry immediately, so a cancelled handle can
//! never be popped, even if it was due later in the tick currently being
//! processed.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt;

use ev_core::{AgentId, TieBreak, Tick};

use crate::{ScheduleError, ScheduleResult};

// ── ScheduleHandle ────────────────────────────────────────────────────────────

/// Token identifying one registration.  Used to cancel it or to look up
/// when it fires next.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct ScheduleHandle(u64);

impl fmt::Display for ScheduleHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H{}", self.0)
    }
}

// ── Internal records ──────────────────────────────────────────────────────────

/// One queued firing.
#[derive(Copy, Clone, Debug)]
struct Entry {
    agent:  AgentId,
    handle: ScheduleHandle,
}

/// A live registration.  Invariant: exactly one `Entry` for it sits in the
/// queue at `due`.
#[derive(Copy, Clone, Debug)]
struct Registration {
    agent:    AgentId,
    due:      Tick,
    interval: Option<u64>,
}

// ── Scheduler ─────────────────────────────────────────────────────────────────

/// A priority queue mapping simulation ticks → registrations due at that tick.
pub struct Scheduler {
    queue:         BTreeMap<Tick, VecDeque<Entry>>,
    registrations: HashMap<ScheduleHandle, Registration>,
    tie_break:     TieBreak,
    /// Latest tick passed to `pop_due`; nothing may be scheduled before it.
    now:           Tick,
    next_handle:   u64,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(TieBreak::default())
    }
}

impl Scheduler {
    pub fn new(tie_break: TieBreak) -> Self {
        Self {
            queue:         BTreeMap::new(),
            registrations: HashMap::new(),
            tie_break,
            now:           Tick::ZERO,
            next_handle:   0,
        }
    }

    #[inline]
    pub fn tie_break(&self) -> TieBreak {
        self.tie_break
    }

    // ── Registration ──────────────────────────────────────────────────────

    /// Activate `agent` once at `at`.
    ///
    /// # Errors
    ///
    /// [`ScheduleError::InPast`] if `at` is earlier than the tick currently
    /// being processed.
    pub fn schedule_once(&mut self, at: Tick, agent: AgentId) -> ScheduleResult<ScheduleHandle> {
        self.register(at, agent, None)
    }

    /// Activate `agent` at `first` and then every `interval` ticks until the
    /// returned handle is cancelled.
    ///
    /// # Errors
    ///
    /// [`ScheduleError::ZeroInterval`] if `interval == 0`;
    /// [`ScheduleError::InPast`] as for [`schedule_once`](Self::schedule_once).
    pub fn schedule_repeating(
        &mut self,
        first:    Tick,
        interval: u64,
        agent:    AgentId,
    ) -> ScheduleResult<ScheduleHandle> {
        if interval == 0 {
            return Err(ScheduleError::ZeroInterval);
        }
        self.register(first, agent, Some(interval))
    }

    fn register(
        &mut self,
        at:       Tick,
        agent:    AgentId,
        interval: Option<u64>,
    ) -> ScheduleResult<ScheduleHandle> {
        if at < self.now {
            return Err(ScheduleError::InPast { at, now: self.now });
        }
        let handle = ScheduleHandle(self.next_handle);
        self.next_handle += 1;
        self.registrations.insert(handle, Registration { agent, due: at, interval });
        self.enqueue(at, agent, handle);
        Ok(handle)
    }

    fn enqueue(&mut self, at: Tick, agent: AgentId, handle: ScheduleHandle) {
        let entry = Entry { agent, handle };

        let bucket = self.queue.entry(at).or_default();
        match self.tie_break {
            TieBreak::Insertion => bucket.push_back(entry),
            TieBreak::AgentOrder => {
                // Placing after every entry with agent <= ours keeps
                // registration order among equal agents.
                let i = bucket.partition_point(|e| e.agent <= agent);
                bucket.insert(i, entry);
            }
        }
    }

    /// Cancel a registration.  Returns `false` if it had already fired (one-shot)
    /// or was already cancelled.
    pub fn cancel(&mut self, handle: ScheduleHandle) -> bool {
        let Some(reg) = self.registrations.remove(&handle) else {
            return false;
        };
        if let Some(bucket) = self.queue.get_mut(&reg.due) {
            bucket.retain(|e| e.handle != handle);
            if bucket.is_empty() {
                self.queue.remove(&reg.due);
            }
        }
        true
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// `true` while the registration can still fire.
    #[inline]
    pub fn is_live(&self, handle: ScheduleHandle) -> bool {
        self.registrations.contains_key(&handle)
    }

    /// The tick at which `handle` fires next, if it is live.
    pub fn due_tick(&self, handle: ScheduleHandle) -> Option<Tick> {
        self.registrations.get(&handle).map(|r| r.due)
    }

    /// The agent a live registration belongs to.
    pub fn agent_of(&self, handle: ScheduleHandle) -> Option<AgentId> {
        self.registrations.get(&handle).map(|r| r.agent)
    }

    /// The earliest tick with at least one queued entry, or `None` if empty.
    pub fn next_tick(&self) -> Option<Tick> {
        self.queue.keys().next().copied()
    }

    /// Number of live registrations.
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Number of distinct future ticks that have at least one queued entry.
    pub fn tick_count(&self) -> usize {
        self.queue.len()
    }

    // ── Firing ────────────────────────────────────────────────────────────

    /// Remove and return the next entry due at exactly `now`.
    ///
    /// One-shot registrations are retired as they are popped.  Repeating
    /// ones are re-queued at `now + interval` before returning, so the
    /// handle stays live.
    ///
    /// Returns `None` once nothing more is due at `now`.  Entries scheduled
    /// at `now` while the tick is being drained are picked up by later
    /// calls.
    pub fn pop_due(&mut self, now: Tick) -> Option<(ScheduleHandle, AgentId)> {
        self.now = self.now.max(now);

        loop {
            let bucket = self.queue.get_mut(&now)?;
            let entry = bucket.pop_front()?;
            if bucket.is_empty() {
                self.queue.remove(&now);
            }

            // Cancellation removes entries eagerly, so this only skips
            // entries whose registration is gone.
            let Some(reg) = self.registrations.get_mut(&entry.handle) else {
                continue;
            };
            let interval = reg.interval;
            match interval {
                None => {
                    self.registrations.remove(&entry.handle);
                }
                Some(interval) => {
                    let next = now + interval;
                    reg.due = next;
                    self.enqueue(next, entry.agent, entry.handle);
                }
            }
            return Some((entry.handle, entry.agent));
        }
    }
}
