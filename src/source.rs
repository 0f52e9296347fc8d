//! Random piece generation
//!
//! Every refilled cell gets a normal piece with a uniformly random symbol.
//! The source is seedable so a whole session can be replayed.

use crate::piece::{Piece, Symbol};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seeded generator of new pieces
#[derive(Debug, Clone)]
pub struct PieceSource {
    rng: ChaCha8Rng,
    /// Palette size; symbols are drawn from `0..symbols`
    symbols: u8,
}

impl PieceSource {
    /// Create a source with a fixed seed (replays, tests)
    pub fn with_seed(symbols: u8, seed: u64) -> Self {
        assert!(symbols > 0, "piece palette must not be empty");
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            symbols,
        }
    }

    /// Draw a random symbol
    pub fn next_symbol(&mut self) -> Symbol {
        Symbol(self.rng.gen_range(0..self.symbols))
    }

    /// Draw a new normal piece
    pub fn next_piece(&mut self) -> Piece {
        Piece::normal(self.next_symbol())
    }
}
