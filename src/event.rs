//! Turn events: what happened during a swap, in order.
//!
//! The engine never animates or plays sounds itself. Presentation and audio
//! layers replay this stream at their own pace.

use crate::board::Coord;
use crate::gravity::{Fall, Placed};
use crate::piece::{Orientation, SpecialKind};
use serde::Serialize;

/// One step of a resolved turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnEvent {
    /// The swap made no match and was undone
    Reverted,
    /// A special piece was caught in a clear and set off its blast
    Detonated { coord: Coord, kind: SpecialKind },
    /// Cells removed by one cascade pass
    Cleared {
        coords: Vec<Coord>,
        score_delta: u64,
        combo: u32,
    },
    /// A special piece was placed where its match group was
    SpecialSpawned {
        coord: Coord,
        kind: SpecialKind,
        #[serde(skip_serializing_if = "Option::is_none")]
        orientation: Option<Orientation>,
    },
    /// Pieces fell and new ones filled the gaps
    Refilled {
        moves: Vec<Fall>,
        new_pieces: Vec<Placed>,
    },
    /// Experience crossed a level threshold
    LevelUp { level: u32 },
    /// The cascade was cut short by the pass limit
    CascadeLimitReached { passes: u32 },
    /// The board has settled
    CascadeEnd,
}

impl TurnEvent {
    pub fn name(&self) -> &'static str {
        match self {
            TurnEvent::Reverted => "reverted",
            TurnEvent::Detonated { .. } => "detonated",
            TurnEvent::Cleared { .. } => "cleared",
            TurnEvent::SpecialSpawned { .. } => "special_spawned",
            TurnEvent::Refilled { .. } => "refilled",
            TurnEvent::LevelUp { .. } => "level_up",
            TurnEvent::CascadeLimitReached { .. } => "cascade_limit_reached",
            TurnEvent::CascadeEnd => "cascade_end",
        }
    }
}
