#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Movement-point bookkeeping and deterministic path execution.
//!
//! A [`PathAgent`] walks a previously planned path one step at a time, paying
//! each destination tile's cost from its [`MovementLedger`]. Steps are
//! committed individually: a blocked or unaffordable step stops the walk but
//! never undoes the steps already taken, and the unwalked remainder is kept for
//! the next turn.

use std::collections::VecDeque;

use overland_core::{
    AgentId, CornerCutting, Direction8, EnterMask8, Event, GridCoord, OccupancyQuery,
    StopReason, TileDataProvider,
};

/// Per-agent movement-point budget.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MovementLedger {
    current: u32,
    max: u32,
}

impl MovementLedger {
    /// Creates a ledger filled to the provided maximum.
    #[must_use]
    pub const fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    /// Movement points still available.
    #[must_use]
    pub const fn current(&self) -> u32 {
        self.current
    }

    /// Daily pool size.
    #[must_use]
    pub const fn max(&self) -> u32 {
        self.max
    }

    /// Replaces the pool size, optionally refilling the current balance to it.
    ///
    /// Day-advance services call this with `refill = true`, which discards any
    /// leftover points from the previous day.
    pub fn set_max(&mut self, max: u32, refill: bool) {
        self.max = max;
        if refill {
            self.current = max;
        }
    }

    /// Returns points to the balance. The balance may exceed the pool size.
    pub fn refund(&mut self, amount: u32) {
        self.current = self.current.saturating_add(amount);
    }

    /// Spends at most `amount` points and reports how many were consumed.
    pub fn spend_up_to(&mut self, amount: u32) -> u32 {
        let spent = amount.min(self.current);
        self.current -= spent;
        spent
    }

    /// Reports whether the balance covers `cost` in full.
    #[must_use]
    pub const fn can_afford(&self, cost: u32) -> bool {
        cost <= self.current
    }

    /// Reports whether the balance is empty.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.current == 0
    }
}

/// Directions of travel an agent is allowed to use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EntryRules {
    /// Permitted directions of travel.
    pub allowed: EnterMask8,
    /// Whether diagonal steps may squeeze past blocked corner cells.
    pub corner_cutting: CornerCutting,
}

impl EntryRules {
    /// Rules permitting only the provided directions, without corner cutting.
    #[must_use]
    pub const fn new(allowed: EnterMask8) -> Self {
        Self {
            allowed,
            corner_cutting: CornerCutting::Disallow,
        }
    }

    /// Replaces the corner-cutting policy.
    #[must_use]
    pub const fn with_corner_cutting(mut self, corner_cutting: CornerCutting) -> Self {
        self.corner_cutting = corner_cutting;
        self
    }
}

impl Default for EntryRules {
    fn default() -> Self {
        Self::new(EnterMask8::ALL)
    }
}

/// Summary of a single [`PathAgent::advance_all_available`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AdvanceReport {
    /// Number of steps committed during the call.
    pub steps_committed: u32,
    /// Position of the agent after the call.
    pub position: GridCoord,
    /// Movement points spent during the call.
    pub spent: u32,
    /// Why the agent stopped.
    pub stop_reason: StopReason,
}

/// Agent that executes a planned path against live tile and occupancy data.
#[derive(Clone, Debug)]
pub struct PathAgent {
    agent: AgentId,
    position: GridCoord,
    rules: EntryRules,
    ledger: MovementLedger,
    pending: VecDeque<GridCoord>,
}

impl PathAgent {
    /// Creates an idle agent standing on `position`.
    #[must_use]
    pub fn new(
        agent: AgentId,
        position: GridCoord,
        rules: EntryRules,
        ledger: MovementLedger,
    ) -> Self {
        Self {
            agent,
            position,
            rules,
            ledger,
            pending: VecDeque::new(),
        }
    }

    /// Identifier of the agent.
    #[must_use]
    pub const fn agent(&self) -> AgentId {
        self.agent
    }

    /// Cell the agent currently stands on.
    #[must_use]
    pub const fn position(&self) -> GridCoord {
        self.position
    }

    /// Entry rules the agent moves under.
    #[must_use]
    pub const fn rules(&self) -> EntryRules {
        self.rules
    }

    /// Movement-point ledger of the agent.
    #[must_use]
    pub const fn ledger(&self) -> &MovementLedger {
        &self.ledger
    }

    /// Mutable access to the ledger for day-advance services.
    pub fn ledger_mut(&mut self) -> &mut MovementLedger {
        &mut self.ledger
    }

    /// Reports whether the agent has steps left to walk.
    #[must_use]
    pub fn has_path(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Steps remaining on the current path, excluding the agent's position.
    pub fn pending_path(&self) -> impl ExactSizeIterator<Item = GridCoord> + '_ {
        self.pending.iter().copied()
    }

    /// Validates `candidate` against the current tile data and adopts it.
    ///
    /// The path must start at the agent's position and consist of single steps
    /// whose directions are permitted both by the agent and by every
    /// destination tile. Unless the rules allow corner cutting, both corner
    /// cells of a diagonal step must be passable too. Occupancy is not
    /// consulted here; it is checked again when each step executes. Returns `false` and leaves the agent untouched
    /// when any step is illegal.
    pub fn set_path<P>(&mut self, tiles: &P, candidate: &[GridCoord]) -> bool
    where
        P: TileDataProvider + ?Sized,
    {
        let Some((&first, rest)) = candidate.split_first() else {
            return false;
        };
        if first != self.position {
            return false;
        }

        let mut from = first;
        for &to in rest {
            if self.step_cost(tiles, from, to).is_none() {
                tracing::debug!(
                    agent = self.agent.get(),
                    ?from,
                    ?to,
                    "rejected path with illegal step"
                );
                return false;
            }
            from = to;
        }

        self.pending = rest.iter().copied().collect();
        true
    }

    /// Drops the remaining path, leaving the agent idle.
    pub fn clear_path(&mut self) {
        self.pending.clear();
    }

    /// Cost of the next pending step under the current tile data, if it is legal.
    #[must_use]
    pub fn next_step_cost<P>(&self, tiles: &P) -> Option<u32>
    where
        P: TileDataProvider + ?Sized,
    {
        let next = *self.pending.front()?;
        self.step_cost(tiles, self.position, next)
    }

    /// Commits as many pending steps as the ledger and the live map allow.
    ///
    /// Each committed step emits [`Event::AgentStepped`]. Blocked and
    /// unaffordable steps are neither entered nor paid for, and the remaining
    /// path is retained.
    pub fn advance_all_available<P, Q>(
        &mut self,
        tiles: &P,
        occupancy: &Q,
        out: &mut Vec<Event>,
    ) -> AdvanceReport
    where
        P: TileDataProvider + ?Sized,
        Q: OccupancyQuery + ?Sized,
    {
        let mut steps_committed = 0;
        let mut spent = 0;

        let stop_reason = loop {
            let Some(&next) = self.pending.front() else {
                break if steps_committed == 0 {
                    StopReason::NoPath
                } else {
                    StopReason::ReachedGoal
                };
            };

            let Some(cost) = self.step_cost(tiles, self.position, next) else {
                break StopReason::BlockedByTerrain;
            };
            if self.occupied_by_other(occupancy, next) {
                break StopReason::BlockedByOccupant;
            }
            if !self.ledger.can_afford(cost) {
                break StopReason::InsufficientMovePoints;
            }

            let paid = self.ledger.spend_up_to(cost);
            spent += paid;
            steps_committed += 1;
            let from = self.position;
            self.position = next;
            let _ = self.pending.pop_front();
            out.push(Event::AgentStepped {
                agent: self.agent,
                from,
                to: next,
                cost: paid,
            });

            if self.pending.is_empty() {
                break StopReason::ReachedGoal;
            }
        };

        tracing::debug!(
            agent = self.agent.get(),
            steps_committed,
            spent,
            remaining = self.pending.len(),
            ?stop_reason,
            "advance finished"
        );

        AdvanceReport {
            steps_committed,
            position: self.position,
            spent,
            stop_reason,
        }
    }

    fn step_cost<P>(&self, tiles: &P, from: GridCoord, to: GridCoord) -> Option<u32>
    where
        P: TileDataProvider + ?Sized,
    {
        let direction = Direction8::between(from, to)?;
        if !self.rules.allowed.contains(direction.mask()) {
            return None;
        }
        let tile = tiles.tile(to)?;
        if !tile.is_passable() || !tile.accepts_entry(direction) {
            return None;
        }
        if let Some(corners) = self.guarded_corners(from, direction) {
            let passable =
                |cell: GridCoord| tiles.tile(cell).is_some_and(|tile| tile.is_passable());
            if !corners.into_iter().all(passable) {
                return None;
            }
        }
        Some(tile.move_cost(direction.is_diagonal()))
    }

    /// Whether another agent stands on `next` or on a corner the step from
    /// the current position must keep clear.
    fn occupied_by_other<Q>(&self, occupancy: &Q, next: GridCoord) -> bool
    where
        Q: OccupancyQuery + ?Sized,
    {
        if occupancy.is_occupied_by_other(next, self.agent) {
            return true;
        }
        Direction8::between(self.position, next)
            .and_then(|direction| self.guarded_corners(self.position, direction))
            .is_some_and(|corners| {
                corners
                    .into_iter()
                    .any(|cell| occupancy.is_occupied_by_other(cell, self.agent))
            })
    }

    fn guarded_corners(&self, from: GridCoord, direction: Direction8) -> Option<[GridCoord; 2]> {
        match self.rules.corner_cutting {
            CornerCutting::Allow => None,
            CornerCutting::Disallow => direction.corners(from),
        }
    }
}
