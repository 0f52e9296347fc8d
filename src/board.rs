//! Square game board and cell access primitives

use crate::error::{EngineError, Result};
use crate::piece::{Piece, Symbol};
use crate::source::PieceSource;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Grid sizes supported by the built-in modes
pub const MIN_BOARD_SIZE: usize = 3;
pub const MAX_BOARD_SIZE: usize = 16;

/// A cell position. Row 0 is the top row; gravity pulls toward higher rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Orthogonal neighbours (Manhattan distance of exactly one)
    pub fn is_adjacent(&self, other: Coord) -> bool {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col) == 1
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// The game board: `size` x `size` cells, each holding a piece or nothing.
///
/// Cells are only empty while a resolution step is in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    size: usize,
    /// Stored row-major, `cells[row * size + col]`
    cells: Vec<Option<Piece>>,
}

impl Board {
    /// Create a board with every cell empty
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![None; size * size],
        }
    }

    /// Create a board filled with random normal pieces
    pub fn random(size: usize, source: &mut PieceSource) -> Self {
        let mut board = Self::new(size);
        for cell in board.cells.iter_mut() {
            *cell = Some(source.next_piece());
        }
        board
    }

    /// Build a board from letter rows: `A`..`Z` are symbols, `.` is an empty cell.
    /// Whitespace inside a row is ignored.
    pub fn parse(rows: &[&str]) -> Result<Self> {
        let size = rows.len();
        if size == 0 {
            return Err(EngineError::MalformedBoard("no rows".to_string()));
        }

        let mut board = Self::new(size);
        for (row, line) in rows.iter().enumerate() {
            let cells: Vec<char> = line.chars().filter(|c| !c.is_whitespace()).collect();
            if cells.len() != size {
                return Err(EngineError::MalformedBoard(format!(
                    "row {} has {} cells, expected {}",
                    row,
                    cells.len(),
                    size
                )));
            }
            for (col, c) in cells.into_iter().enumerate() {
                let piece = match c {
                    '.' => None,
                    _ => match Symbol::from_letter(c) {
                        Some(symbol) => Some(Piece::normal(symbol)),
                        None => {
                            return Err(EngineError::MalformedBoard(format!(
                                "unexpected '{}' at ({}, {})",
                                c, row, col
                            )));
                        }
                    },
                };
                board.cells[row * size + col] = piece;
            }
        }
        Ok(board)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Check that a coordinate lies on the board
    pub fn is_valid(&self, coord: Coord) -> bool {
        coord.row < self.size && coord.col < self.size
    }

    /// Get the piece at a coordinate.
    /// Returns None for empty cells and for coordinates off the board.
    pub fn get(&self, coord: Coord) -> Option<Piece> {
        if !self.is_valid(coord) {
            return None;
        }
        self.cells[self.index(coord)]
    }

    /// Set a cell.
    ///
    /// # Panics
    /// On a coordinate off the board; callers validate with [`Board::is_valid`].
    pub fn set(&mut self, coord: Coord, piece: Option<Piece>) {
        let index = self.index(coord);
        self.cells[index] = piece;
    }

    /// Empty a cell and return what it held
    pub fn take(&mut self, coord: Coord) -> Option<Piece> {
        let index = self.index(coord);
        self.cells[index].take()
    }

    /// Exchange the contents of two cells.
    ///
    /// # Panics
    /// On a coordinate off the board.
    pub fn swap(&mut self, a: Coord, b: Coord) {
        let (a, b) = (self.index(a), self.index(b));
        self.cells.swap(a, b);
    }

    /// Every coordinate, row-major
    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        (0..self.size).flat_map(move |row| (0..self.size).map(move |col| Coord::new(row, col)))
    }

    /// True when no cell is empty
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// Snapshot of the board as nested rows, for presentation layers
    pub fn rows(&self) -> Vec<Vec<Option<Piece>>> {
        self.cells.chunks(self.size).map(<[_]>::to_vec).collect()
    }

    fn index(&self, coord: Coord) -> usize {
        assert!(
            self.is_valid(coord),
            "{}",
            EngineError::InvalidCoordinate {
                row: coord.row,
                col: coord.col,
                size: self.size,
            }
        );
        coord.row * self.size + coord.col
    }
}

impl Serialize for Board {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.rows().serialize(serializer)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.size {
            for col in 0..self.size {
                if col > 0 {
                    write!(f, " ")?;
                }
                match self.get(Coord::new(row, col)) {
                    Some(piece) => write!(f, "{:<2}", piece.to_string())?,
                    None => write!(f, ". ")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
