//! MATCHRS - a match-three resolution engine
//!
//! Swap two pieces, find the runs, detonate the specials, let gravity and
//! the refill do the rest, and repeat until the board settles.

pub mod board;
pub mod error;
pub mod event;
pub mod game;
pub mod gravity;
pub mod matcher;
pub mod mode;
pub mod piece;
pub mod score;
pub mod settings;
pub mod source;
pub mod special;

pub use board::{Board, Coord};
pub use error::{EngineError, Result};
pub use event::TurnEvent;
pub use game::{Game, GameResult, GameState, Phase, Rejection, Selection, TurnOutcome};
pub use matcher::{MatchGroup, Shape};
pub use mode::GameMode;
pub use piece::{Orientation, Piece, PieceKind, SpecialKind, Symbol};
pub use settings::Settings;
pub use special::{RuleSet, SpecialRule};
