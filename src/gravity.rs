//! Gravity and refill
//!
//! Surviving pieces fall to the bottom of their column keeping their order,
//! then every empty cell left at the top is filled with a new random piece.

use crate::board::{Board, Coord};
use crate::piece::Piece;
use crate::source::PieceSource;
use serde::Serialize;

/// A piece that fell from one cell to another
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Fall {
    pub from: Coord,
    pub to: Coord,
}

/// A freshly generated piece and where it landed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Placed {
    pub coord: Coord,
    pub piece: Piece,
}

/// What one gravity/refill step did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Refill {
    pub falls: Vec<Fall>,
    pub new_pieces: Vec<Placed>,
}

/// Compact every column downward. Returns the moves made, column by column,
/// bottom-up.
pub fn collapse(board: &mut Board) -> Vec<Fall> {
    let size = board.size();
    let mut falls = Vec::new();

    for col in 0..size {
        let mut write_row = size;
        for read_row in (0..size).rev() {
            let from = Coord::new(read_row, col);
            if board.get(from).is_none() {
                continue;
            }
            write_row -= 1;
            if write_row != read_row {
                let to = Coord::new(write_row, col);
                let piece = board.take(from);
                board.set(to, piece);
                falls.push(Fall { from, to });
            }
        }
    }
    falls
}

/// Fill every empty cell with a new normal piece, row-major from the top
pub fn refill(board: &mut Board, source: &mut PieceSource) -> Vec<Placed> {
    let empty: Vec<Coord> = board.coords().filter(|&c| board.get(c).is_none()).collect();
    empty
        .into_iter()
        .map(|coord| {
            let piece = source.next_piece();
            board.set(coord, Some(piece));
            Placed { coord, piece }
        })
        .collect()
}

/// Collapse then refill; afterwards the board is full again
pub fn settle(board: &mut Board, source: &mut PieceSource) -> Refill {
    let falls = collapse(board);
    let new_pieces = refill(board, source);
    debug_assert!(board.is_full());
    Refill { falls, new_pieces }
}
