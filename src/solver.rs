use std::collections::{HashSet, VecDeque};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::game::{Direction, Grid};
use crate::state::{PushRule, Rules, State, TargetRule};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveResult {
    /// Moves from the initial position to a solved board, fewest first.
    Solved(Vec<Direction>),
    /// The state budget ran out before the search finished.
    Cutoff,
    /// Every reachable state was explored without reaching a goal.
    Impossible,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
    #[error("no player found on board")]
    NoPlayer,
}

#[derive(Debug, Clone, Copy)]
pub struct SolverConfig {
    pub target_rule: TargetRule,
    pub push_rule: PushRule,
    /// Maximum number of states to expand before giving up. `None` searches
    /// until the frontier is empty.
    pub max_states: Option<usize>,
    /// Emit a progress event every this many expanded states (0 disables).
    pub progress_interval: usize,
}

impl SolverConfig {
    pub fn rules(&self) -> Rules {
        Rules {
            target: self.target_rule,
            push: self.push_rule,
        }
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            target_rule: TargetRule::Blocking,
            push_rule: PushRule::Merging,
            max_states: None,
            progress_interval: 100_000,
        }
    }
}

/// Breadth-first solver. Holds only configuration and the stats of the last
/// search, so separate instances can run on separate boards independently.
pub struct Solver {
    config: SolverConfig,
    states_expanded: usize,
    max_frontier: usize,
}

impl Solver {
    pub fn new(config: SolverConfig) -> Self {
        Solver {
            config,
            states_expanded: 0,
            max_frontier: 0,
        }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Solve the board using breadth-first search.
    ///
    /// Duplicates are suppressed lazily: a state may sit in the frontier
    /// several times and is skipped when dequeued if its layout was already
    /// expanded. Memory grows with the number of reachable layouts, so boards
    /// with large open areas may exhaust it before the search completes.
    pub fn solve(&mut self, grid: &Grid) -> Result<SolveResult, SolveError> {
        // Targets are read from here for the whole search; states overwrite
        // them as boxes and the player move.
        let original = grid.clone();
        let initial = State::initial(&original).ok_or(SolveError::NoPlayer)?;

        self.states_expanded = 0;
        self.max_frontier = 1;

        debug!(
            rows = original.rows(),
            cols = original.cols(),
            boxes = original.box_count(),
            rules = ?self.config.rules(),
            "starting search"
        );

        let rules = self.config.rules();
        let mut frontier = VecDeque::from([initial]);
        let mut visited: HashSet<Vec<u8>> = HashSet::new();

        while let Some(state) = frontier.pop_front() {
            if state.is_goal(&original) {
                info!(
                    moves = state.path().len(),
                    states = self.states_expanded,
                    max_frontier = self.max_frontier,
                    "solved"
                );
                return Ok(SolveResult::Solved(state.into_path()));
            }

            if !visited.insert(state.key()) {
                continue;
            }

            if let Some(max_states) = self.config.max_states {
                if self.states_expanded >= max_states {
                    warn!(
                        states = self.states_expanded,
                        frontier = frontier.len(),
                        "state budget exhausted"
                    );
                    return Ok(SolveResult::Cutoff);
                }
            }

            self.states_expanded += 1;
            if self.config.progress_interval > 0
                && self.states_expanded % self.config.progress_interval == 0
            {
                debug!(
                    states = self.states_expanded,
                    visited = visited.len(),
                    frontier = frontier.len(),
                    depth = state.path().len(),
                    "searching"
                );
            }

            frontier.extend(state.successors(rules, &original));
            self.max_frontier = self.max_frontier.max(frontier.len());
        }

        info!(
            states = self.states_expanded,
            max_frontier = self.max_frontier,
            "no solution"
        );
        Ok(SolveResult::Impossible)
    }

    /// States expanded by the last call to `solve`.
    pub fn states_expanded(&self) -> usize {
        self.states_expanded
    }

    /// Largest frontier seen during the last call to `solve`.
    pub fn max_frontier(&self) -> usize {
        self.max_frontier
    }
}

impl Default for Solver {
    fn default() -> Self {
        Self::new(SolverConfig::default())
    }
}
