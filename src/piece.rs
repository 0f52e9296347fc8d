//! Piece definitions: symbols, special kinds and orientation

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of symbols in the default palette
pub const DEFAULT_SYMBOLS: u8 = 5;

/// Matching identity of a piece (the picture shown on the tile)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(pub u8);

impl Symbol {
    /// Letter used by board fixtures and the text dump: 0 -> 'A', 1 -> 'B', ...
    pub fn letter(self) -> char {
        (b'A' + self.0 % 26) as char
    }

    /// Parse a fixture letter back into a symbol
    pub fn from_letter(c: char) -> Option<Symbol> {
        c.is_ascii_uppercase().then(|| Symbol(c as u8 - b'A'))
    }
}

/// Direction of a run or of a line bomb's blast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Special piece types, in rule priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialKind {
    /// Clears its full row and column
    CrossBomb,
    /// Clears the 3x3 block around it
    Bomb,
    /// Reward for a line of five; removed without a blast
    Rainbow,
    /// Clears its full row or column depending on orientation
    LineBomb,
}

impl SpecialKind {
    pub fn name(&self) -> &'static str {
        match self {
            SpecialKind::CrossBomb => "Cross Bomb",
            SpecialKind::Bomb => "Bomb",
            SpecialKind::Rainbow => "Rainbow",
            SpecialKind::LineBomb => "Line Bomb",
        }
    }

    /// Rule priority, lower wins. Shapes before lengths, bigger rewards first.
    pub fn priority(&self) -> u8 {
        match self {
            SpecialKind::CrossBomb => 0,
            SpecialKind::Bomb => 1,
            SpecialKind::Rainbow => 2,
            SpecialKind::LineBomb => 3,
        }
    }

    /// Glyph used by the text dump for a special piece
    fn glyph(&self, orientation: Option<Orientation>) -> char {
        match (self, orientation) {
            (SpecialKind::CrossBomb, _) => '+',
            (SpecialKind::Bomb, _) => '*',
            (SpecialKind::Rainbow, _) => '@',
            (SpecialKind::LineBomb, Some(Orientation::Vertical)) => '|',
            (SpecialKind::LineBomb, _) => '-',
        }
    }
}

/// Normal piece or one of the special kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PieceKind {
    #[default]
    Normal,
    Special(SpecialKind),
}

/// A piece on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub kind: PieceKind,
    pub symbol: Symbol,
    /// Only meaningful for line bombs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation: Option<Orientation>,
}

impl Piece {
    /// A plain piece
    pub fn normal(symbol: Symbol) -> Self {
        Self {
            kind: PieceKind::Normal,
            symbol,
            orientation: None,
        }
    }

    /// A special piece. Orientation is dropped for kinds other than line bombs.
    pub fn special(kind: SpecialKind, symbol: Symbol, orientation: Option<Orientation>) -> Self {
        Self {
            kind: PieceKind::Special(kind),
            symbol,
            orientation: if kind == SpecialKind::LineBomb {
                orientation
            } else {
                None
            },
        }
    }

    pub fn special_kind(&self) -> Option<SpecialKind> {
        match self.kind {
            PieceKind::Normal => None,
            PieceKind::Special(kind) => Some(kind),
        }
    }

    pub fn is_special(&self) -> bool {
        self.special_kind().is_some()
    }

    /// Two pieces match when their symbols agree, whatever their kind
    pub fn matches(&self, other: &Piece) -> bool {
        self.symbol == other.symbol
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.special_kind() {
            None => write!(f, "{}", self.symbol.letter()),
            Some(kind) => write!(f, "{}{}", self.symbol.letter(), kind.glyph(self.orientation)),
        }
    }
}
