use arrayvec::ArrayVec;

use crate::game::{ALL_DIRECTIONS, Cell, Direction, Grid, Position};

/// Whether the player may stand on a target cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetRule {
    /// Targets block the player exactly like walls. Boxes can still be
    /// pushed onto them.
    #[default]
    Blocking,
    /// Targets are ordinary floor for the player.
    Walkable,
}

/// What happens when a box is pushed into another box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PushRule {
    /// Only a wall stops a push. A box pushed into another box lands on
    /// the same cell and the two become one.
    #[default]
    Merging,
    /// A box stops a push just like a wall.
    Blocking,
}

/// Movement rules applied by [`State::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rules {
    pub target: TargetRule,
    pub push: PushRule,
}

/// An immutable search node: a full copy of the board, where the player
/// stands on it, and the moves that led here from the initial state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    grid: Grid,
    player: Position,
    path: Vec<Direction>,
}

impl State {
    /// Starting state for `grid`, or `None` if it has no player.
    pub fn initial(grid: &Grid) -> Option<Self> {
        let player = grid.find_player()?;
        Some(State {
            grid: grid.clone(),
            player,
            path: Vec::new(),
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn player(&self) -> Position {
        self.player
    }

    pub fn path(&self) -> &[Direction] {
        &self.path
    }

    pub fn into_path(self) -> Vec<Direction> {
        self.path
    }

    /// Canonical key: the board's markers, row-major. The player position is
    /// part of the layout, so equal keys mean equal states.
    pub fn key(&self) -> Vec<u8> {
        self.grid
            .cells()
            .iter()
            .map(|cell| cell.marker() as u8)
            .collect()
    }

    /// Check if every box sits on a cell that was a target in `original`.
    /// A board without boxes is trivially solved.
    pub fn is_goal(&self, original: &Grid) -> bool {
        self.grid
            .iter()
            .all(|(pos, cell)| cell != Cell::Box || original.at(pos) == Cell::Target)
    }

    /// Move the player one step in `dir`, pushing a box if one is in the way.
    /// Returns `None` if the move is blocked.
    ///
    /// `original` is the board the search started from. Under
    /// `TargetRule::Walkable` a vacated target cell is restored from it, so
    /// the key only depends on where the boxes and the player are. Otherwise
    /// vacated cells become empty floor.
    pub fn step(&self, dir: Direction, rules: Rules, original: &Grid) -> Option<State> {
        let next = self.grid.offset(self.player, dir)?;
        let vacated = match rules.target {
            TargetRule::Walkable if original.get(self.player) == Some(Cell::Target) => {
                Cell::Target
            }
            _ => Cell::Empty,
        };

        let grid = match self.grid.get(next)? {
            Cell::Wall => return None,
            Cell::Target if rules.target == TargetRule::Blocking => return None,
            Cell::Box => {
                let beyond = self.grid.offset(next, dir)?;
                match self.grid.get(beyond)? {
                    Cell::Wall | Cell::Player => return None,
                    Cell::Box if rules.push == PushRule::Blocking => return None,
                    Cell::Empty | Cell::Target | Cell::Box => self.grid.with_cells(&[
                        (beyond, Cell::Box),
                        (self.player, vacated),
                        (next, Cell::Player),
                    ]),
                }
            }
            Cell::Empty | Cell::Target => self
                .grid
                .with_cells(&[(self.player, vacated), (next, Cell::Player)]),
            Cell::Player => return None,
        };

        let mut path = Vec::with_capacity(self.path.len() + 1);
        path.extend_from_slice(&self.path);
        path.push(dir);

        Some(State {
            grid,
            player: next,
            path,
        })
    }

    /// All states one move away, in `ALL_DIRECTIONS` order.
    pub fn successors(&self, rules: Rules, original: &Grid) -> ArrayVec<State, 4> {
        ALL_DIRECTIONS
            .iter()
            .filter_map(|&dir| self.step(dir, rules, original))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Direction::*;

    const BLOCKING: Rules = Rules {
        target: TargetRule::Blocking,
        push: PushRule::Merging,
    };

    const WALKABLE: Rules = Rules {
        target: TargetRule::Walkable,
        push: PushRule::Merging,
    };

    const BOX_BLOCKS: Rules = Rules {
        target: TargetRule::Blocking,
        push: PushRule::Blocking,
    };

    fn grid(text: &str) -> Grid {
        Grid::from_text(text).unwrap()
    }

    /// Initial state of `text` together with the board it was built from.
    fn start(text: &str) -> (State, Grid) {
        let original = grid(text);
        (State::initial(&original).unwrap(), original)
    }

    fn replay(start: &State, original: &Grid, moves: &[Direction]) -> Option<State> {
        let mut state = start.clone();
        for &dir in moves {
            state = state.step(dir, BLOCKING, original)?;
        }
        Some(state)
    }

    #[test]
    fn test_initial_state() {
        let (s, _) = start("WWWW\nW.PW\nWWWW");
        assert_eq!(s.player(), Position::new(1, 2));
        assert!(s.path().is_empty());
    }

    #[test]
    fn test_step_walk() {
        let (s, original) = start("WWWWW\nWP..W\nWWWWW");
        let next = s.step(Right, BLOCKING, &original).unwrap();
        assert_eq!(next.grid(), &grid("WWWWW\nW.P.W\nWWWWW"));
        assert_eq!(next.player(), Position::new(1, 2));
        assert_eq!(next.path(), &[Right]);
        // Parent is untouched.
        assert_eq!(s.grid(), &original);
    }

    #[test]
    fn test_step_into_wall() {
        let (s, original) = start("WWWW\nWP.W\nWWWW");
        assert!(s.step(Up, BLOCKING, &original).is_none());
        assert!(s.step(Down, BLOCKING, &original).is_none());
        assert!(s.step(Left, BLOCKING, &original).is_none());
    }

    #[test]
    fn test_step_push() {
        let (s, original) = start("WWWWWW\nWPB..W\nWWWWWW");
        let next = s.step(Right, BLOCKING, &original).unwrap();
        assert_eq!(next.grid(), &grid("WWWWWW\nW.PB.W\nWWWWWW"));
        assert_eq!(next.player(), Position::new(1, 2));
    }

    #[test]
    fn test_push_all_directions() {
        let tests = vec![
            (Up, "WWWWW\nW...W\nW.B.W\nW.P.W\nWWWWW", "WWWWW\nW.B.W\nW.P.W\nW...W\nWWWWW"),
            (Down, "WWWWW\nW.P.W\nW.B.W\nW...W\nWWWWW", "WWWWW\nW...W\nW.P.W\nW.B.W\nWWWWW"),
            (Left, "WWWWW\nW.BPW\nWWWWW", "WWWWW\nWBP.W\nWWWWW"),
            (Right, "WWWWW\nWPB.W\nWWWWW", "WWWWW\nW.PBW\nWWWWW"),
        ];

        for (dir, before, after) in tests {
            let (s, original) = start(before);
            let next = s.step(dir, BLOCKING, &original);
            assert_eq!(
                next.map(|s| s.grid().clone()),
                Some(grid(after)),
                "Failed for {:?}",
                dir
            );
        }
    }

    #[test]
    fn test_push_blocked_by_wall() {
        let (s, original) = start("WWWWW\nWPBWW\nWWWWW");
        assert!(s.step(Right, BLOCKING, &original).is_none());
        assert!(s.step(Right, BOX_BLOCKS, &original).is_none());
    }

    #[test]
    fn test_push_into_box_merges() {
        let (s, original) = start("WWWWWW\nWPBBTW\nWWWWWW");
        let merged = s.step(Right, BLOCKING, &original).unwrap();
        assert_eq!(merged.grid(), &grid("WWWWWW\nW.PBTW\nWWWWWW"));
        assert_eq!(merged.grid().box_count(), 1);
        assert_eq!(merged.player(), Position::new(1, 2));
    }

    #[test]
    fn test_push_into_box_blocked() {
        let (s, original) = start("WWWWWW\nWPBBTW\nWWWWWW");
        assert!(s.step(Right, BOX_BLOCKS, &original).is_none());
    }

    #[test]
    fn test_push_onto_target() {
        let (s, original) = start("WWWWW\nWPBTW\nWWWWW");
        let next = s.step(Right, BLOCKING, &original).unwrap();
        assert_eq!(next.grid(), &grid("WWWWW\nW.PBW\nWWWWW"));
    }

    #[test]
    fn test_push_onto_border_target() {
        let (s, original) = start("WWTWW\nW.B.W\nW.P.W\nWWWWW");
        let next = s.step(Up, BLOCKING, &original).unwrap();
        assert_eq!(next.grid().at(Position::new(0, 2)), Cell::Box);
        assert_eq!(next.player(), Position::new(1, 2));
        assert_eq!(next.grid().to_string(), "WWBWW\nW.P.W\nW...W\nWWWWW\n");

        // The box is now on the border; pushing it further leaves the board.
        assert!(next.step(Up, BLOCKING, &original).is_none());
    }

    #[test]
    fn test_target_blocks_player() {
        let (s, original) = start("WWWWW\nWPTBW\nWWWWW");
        assert!(s.step(Right, BLOCKING, &original).is_none());
    }

    #[test]
    fn test_target_walkable() {
        let (s, original) = start("WWWWW\nWPT.W\nWWWWW");
        let on_target = s.step(Right, WALKABLE, &original).unwrap();
        assert_eq!(on_target.grid(), &grid("WWWWW\nW.P.W\nWWWWW"));

        // Leaving the target puts it back.
        let off_target = on_target.step(Right, WALKABLE, &original).unwrap();
        assert_eq!(off_target.grid(), &grid("WWWWW\nW.TPW\nWWWWW"));
    }

    #[test]
    fn test_walkable_key_ignores_visited_targets() {
        let (s, original) = start("WWWWWW\nW.PT.W\nWWWWWW");
        let direct = s.step(Left, WALKABLE, &original).unwrap();
        let across = [Right, Right, Left, Left, Left]
            .iter()
            .try_fold(s.clone(), |state, &dir| state.step(dir, WALKABLE, &original))
            .unwrap();
        assert_eq!(across.player(), direct.player());
        assert_eq!(across.key(), direct.key());
    }

    #[test]
    fn test_blocking_rule_clears_pushed_over_target() {
        // A box pushed across a target leaves floor behind, which the player
        // may then walk on.
        let (s, original) = start("WWWWWW\nWPBT.W\nWWWWWW");
        let on_target = s.step(Right, BLOCKING, &original).unwrap();
        let past_target = on_target.step(Right, BLOCKING, &original).unwrap();
        assert_eq!(past_target.grid(), &grid("WWWWWW\nW..PBW\nWWWWWW"));
    }

    #[test]
    fn test_successors_order() {
        let (s, original) = start("WWWWW\nW...W\nW.P.W\nW...W\nWWWWW");
        let dirs: Vec<Direction> = s
            .successors(BLOCKING, &original)
            .iter()
            .map(|next| next.path()[0])
            .collect();
        assert_eq!(dirs, vec![Up, Down, Left, Right]);
    }

    #[test]
    fn test_successors_skip_blocked() {
        let (s, original) = start("WWWWW\nWPB.W\nWT..W\nWWWWW");
        let successors = s.successors(BLOCKING, &original);
        assert_eq!(successors.len(), 1);
        assert_eq!(successors[0].path(), &[Right]);

        let successors = s.successors(WALKABLE, &original);
        assert_eq!(successors.len(), 2);
    }

    #[test]
    fn test_box_count_preserved_without_merges() {
        let (s, original) = start("WWWWWW\nW.B..W\nWBPB.W\nW.B..W\nWWWWWW");
        for next in s.successors(BLOCKING, &original) {
            assert_eq!(next.grid().box_count(), 4);
            assert_eq!(next.grid().find_player(), Some(next.player()));
            assert_eq!(next.path().len(), 1);
        }
    }

    #[test]
    fn test_key_ignores_path() {
        let (s, original) = start("WWWWW\nWP..W\nWWWWW");
        let there_and_back = replay(&s, &original, &[Right, Left]).unwrap();
        assert_eq!(there_and_back.key(), s.key());
        assert_ne!(there_and_back.path(), s.path());

        let moved = s.step(Right, BLOCKING, &original).unwrap();
        assert_ne!(moved.key(), s.key());
    }

    #[test]
    fn test_is_goal() {
        let (s, original) = start("WWWWW\nWPBTW\nWWWWW");
        assert!(!s.is_goal(&original));

        let pushed = s.step(Right, BLOCKING, &original).unwrap();
        assert!(pushed.is_goal(&original));
    }

    #[test]
    fn test_is_goal_no_boxes() {
        let (s, original) = start("WWWWW\nWP.TW\nWWWWW");
        assert!(s.is_goal(&original));
    }

    #[test]
    fn test_is_goal_uses_original_targets() {
        // Once the box covers the target the current grid no longer shows it.
        let (s, original) = start("WWWWWW\nWPBT.W\nWWWWWW");
        let on_target = s.step(Right, BLOCKING, &original).unwrap();
        assert!(on_target.is_goal(&original));
        assert!(!on_target.is_goal(on_target.grid()));

        let past_target = on_target.step(Right, BLOCKING, &original).unwrap();
        assert!(!past_target.is_goal(&original));
    }

    #[test]
    fn test_replay_blocked() {
        let (s, original) = start("WWWWW\nWP..W\nWWWWW");
        assert!(replay(&s, &original, &[Right, Right, Right]).is_none());
        let end = replay(&s, &original, &[Right, Right]).unwrap();
        assert_eq!(end.player(), Position::new(1, 3));
    }
}
