use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Empty,
    Wall,
    Target,
    Box,
    Player,
}

impl Cell {
    /// Parse a single board marker.
    ///
    /// Markers:
    /// - `W` = Wall
    /// - `.` = Empty floor
    /// - `T` = Target (destination for a box)
    /// - `B` = Box
    /// - `P` = Player
    pub fn from_marker(ch: char) -> Option<Cell> {
        match ch {
            'W' => Some(Cell::Wall),
            '.' => Some(Cell::Empty),
            'T' => Some(Cell::Target),
            'B' => Some(Cell::Box),
            'P' => Some(Cell::Player),
            _ => None,
        }
    }

    pub fn marker(self) -> char {
        match self {
            Cell::Wall => 'W',
            Cell::Empty => '.',
            Cell::Target => 'T',
            Cell::Box => 'B',
            Cell::Player => 'P',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Order in which moves are tried. Fixing it makes the returned solution
/// reproducible among equally short ones.
pub const ALL_DIRECTIONS: [Direction; 4] = [
    Direction::Up,
    Direction::Down,
    Direction::Left,
    Direction::Right,
];

impl Direction {
    /// Unit step as (row delta, column delta).
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }

    pub fn letter(self) -> char {
        match self {
            Direction::Up => 'U',
            Direction::Down => 'D',
            Direction::Left => 'L',
            Direction::Right => 'R',
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "Up"),
            Direction::Down => write!(f, "Down"),
            Direction::Left => write!(f, "Left"),
            Direction::Right => write!(f, "Right"),
        }
    }
}

/// Render a move sequence in compact `UDLR` form.
pub fn moves_to_string(moves: &[Direction]) -> String {
    moves.iter().map(|dir| dir.letter()).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Position { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Reasons a board is rejected before any search starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("empty board")]
    Empty,
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("invalid marker '{ch}' at ({row}, {col})")]
    InvalidMarker { ch: char, row: usize, col: usize },
    #[error("no player found on board")]
    NoPlayer,
    #[error("multiple players found")]
    MultiplePlayers,
    #[error("board is not enclosed by walls at ({row}, {col})")]
    NotEnclosed { row: usize, col: usize },
}

/// Rectangular board of cells, stored row-major. Dimensions are fixed at
/// construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    cells: Vec<Cell>,
    rows: usize,
    cols: usize,
}

impl Grid {
    /// Parse a board from text, one row per line.
    ///
    /// Blank lines around the board and whitespace around each row are
    /// ignored. The board must be rectangular, contain exactly one player
    /// and have no floor, box or player on its border.
    pub fn from_text(text: &str) -> Result<Self, GridError> {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .skip_while(|line| line.is_empty())
            .collect();
        let end = lines
            .iter()
            .rposition(|line| !line.is_empty())
            .map_or(0, |idx| idx + 1);
        let lines = &lines[..end];

        if lines.is_empty() {
            return Err(GridError::Empty);
        }

        let rows = lines.len();
        let cols = lines[0].chars().count();
        let mut cells = Vec::with_capacity(rows * cols);
        let mut player = None;

        for (row, line) in lines.iter().enumerate() {
            let found = line.chars().count();
            if found != cols {
                return Err(GridError::RaggedRow {
                    row,
                    expected: cols,
                    found,
                });
            }
            for (col, ch) in line.chars().enumerate() {
                let cell =
                    Cell::from_marker(ch).ok_or(GridError::InvalidMarker { ch, row, col })?;
                if cell == Cell::Player {
                    if player.is_some() {
                        return Err(GridError::MultiplePlayers);
                    }
                    player = Some(Position::new(row, col));
                }
                cells.push(cell);
            }
        }

        if player.is_none() {
            return Err(GridError::NoPlayer);
        }

        let grid = Grid { cells, rows, cols };
        grid.check_enclosed()?;
        Ok(grid)
    }

    /// Border cells must keep the player and boxes inside. Targets are
    /// allowed on the border: the player cannot enter them by default and
    /// a box pushed onto one can go no further.
    fn check_enclosed(&self) -> Result<(), GridError> {
        for row in 0..self.rows {
            for col in 0..self.cols {
                let on_border =
                    row == 0 || col == 0 || row == self.rows - 1 || col == self.cols - 1;
                if !on_border {
                    continue;
                }
                match self.at(Position::new(row, col)) {
                    Cell::Wall | Cell::Target => {}
                    Cell::Empty | Cell::Box | Cell::Player => {
                        return Err(GridError::NotEnclosed { row, col });
                    }
                }
            }
        }
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Classify an in-bounds cell. Panics if `pos` is outside the board.
    pub fn at(&self, pos: Position) -> Cell {
        assert!(
            pos.row < self.rows && pos.col < self.cols,
            "Position {} out of bounds",
            pos
        );
        self.cells[pos.row * self.cols + pos.col]
    }

    /// Bounds-checked variant of [`Grid::at`].
    pub fn get(&self, pos: Position) -> Option<Cell> {
        if pos.row < self.rows && pos.col < self.cols {
            Some(self.cells[pos.row * self.cols + pos.col])
        } else {
            None
        }
    }

    /// Step from `pos` in `dir`. Returns `None` when the step leaves the board.
    pub fn offset(&self, pos: Position, dir: Direction) -> Option<Position> {
        let (drow, dcol) = dir.delta();
        let row = pos.row.checked_add_signed(drow)?;
        let col = pos.col.checked_add_signed(dcol)?;
        if row < self.rows && col < self.cols {
            Some(Position::new(row, col))
        } else {
            None
        }
    }

    pub fn find_player(&self) -> Option<Position> {
        self.cells
            .iter()
            .position(|&cell| cell == Cell::Player)
            .map(|idx| Position::new(idx / self.cols, idx % self.cols))
    }

    pub fn box_count(&self) -> usize {
        self.cells.iter().filter(|&&cell| cell == Cell::Box).count()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Iterate over every cell together with its position, row-major.
    pub fn iter(&self) -> impl Iterator<Item = (Position, Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(idx, &cell)| (Position::new(idx / self.cols, idx % self.cols), cell))
    }

    /// Copy of this grid with the given cells overwritten, in order.
    pub(crate) fn with_cells(&self, writes: &[(Position, Cell)]) -> Grid {
        let mut cells = self.cells.clone();
        for &(pos, cell) in writes {
            cells[pos.row * self.cols + pos.col] = cell;
        }
        Grid {
            cells,
            rows: self.rows,
            cols: self.cols,
        }
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.cols) {
            let line: String = row.iter().map(|cell| cell.marker()).collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
