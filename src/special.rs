//! Special piece rules and blast radii
//!
//! A match group that qualifies for a rule leaves a special piece behind
//! instead of being cleared completely. When a special piece is itself
//! cleared it detonates, pulling its blast radius into the clear.

use crate::board::{Board, Coord};
use crate::error::{EngineError, Result};
use crate::matcher::{MatchGroup, Shape};
use crate::piece::{Orientation, Piece, SpecialKind};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Shortest line that may be configured to create a special piece
pub const MIN_SPECIAL_LENGTH: usize = 4;

/// When a rule fires
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    /// The group's shape is one of these
    Shape { shapes: Vec<Shape> },
    /// The group is a straight line of exactly this length
    Match { length: usize },
}

impl Condition {
    fn accepts(&self, group: &MatchGroup) -> bool {
        match self {
            Condition::Shape { shapes } => shapes.contains(&group.shape),
            Condition::Match { length } => {
                group.shape == Shape::Line && group.length() == *length
            }
        }
    }
}

/// Maps a creation condition to the special piece it produces
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialRule {
    pub kind: SpecialKind,
    pub condition: Condition,
}

/// A special piece waiting to be written once its group has been cleared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spawn {
    pub coord: Coord,
    pub piece: Piece,
}

/// Validated rules, held in priority order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<SpecialRule>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::standard()
    }
}

impl RuleSet {
    /// Validate rules and order them by [`SpecialKind::priority`].
    ///
    /// The order rules were written in never matters: cross bombs are tried
    /// first, then bombs, rainbows and line bombs.
    pub fn new(mut rules: Vec<SpecialRule>) -> Result<Self> {
        let mut kinds = HashSet::new();
        for rule in &rules {
            if !kinds.insert(rule.kind) {
                return Err(EngineError::Configuration(format!(
                    "more than one rule creates {}",
                    rule.kind.name()
                )));
            }
            match &rule.condition {
                Condition::Shape { shapes } if shapes.is_empty() => {
                    return Err(EngineError::Configuration(format!(
                        "{} rule lists no shapes",
                        rule.kind.name()
                    )));
                }
                Condition::Shape { shapes } if shapes.contains(&Shape::Line) => {
                    return Err(EngineError::Configuration(format!(
                        "{} rule uses 'line' as a shape; use a match length instead",
                        rule.kind.name()
                    )));
                }
                Condition::Match { length } if *length < MIN_SPECIAL_LENGTH => {
                    return Err(EngineError::Configuration(format!(
                        "{} rule needs a length of at least {}, got {}",
                        rule.kind.name(),
                        MIN_SPECIAL_LENGTH,
                        length
                    )));
                }
                _ => {}
            }
        }

        rules.sort_by_key(|rule| rule.kind.priority());
        Ok(Self { rules })
    }

    /// The stock rules: cross -> cross bomb, L/T -> bomb, 5 in a line ->
    /// rainbow, 4 in a line -> line bomb
    pub fn standard() -> Self {
        Self {
            rules: standard_rules(),
        }
    }

    pub fn rules(&self) -> &[SpecialRule] {
        &self.rules
    }

    /// The special kind a group earns, first matching rule wins
    pub fn classify(&self, group: &MatchGroup) -> Option<SpecialKind> {
        self.rules
            .iter()
            .find(|rule| rule.condition.accepts(group))
            .map(|rule| rule.kind)
    }

    /// Decide whether a group leaves a special piece behind, and where.
    ///
    /// The piece goes to the group's pivot if it has one, else to the cell of
    /// the group that the player swapped, else to the group's midpoint.
    pub fn plan_spawn(
        &self,
        group: &MatchGroup,
        board: &Board,
        swap: Option<(Coord, Coord)>,
    ) -> Option<Spawn> {
        let kind = self.classify(group)?;
        let symbol = board.get(*group.coords.first()?)?.symbol;

        let coord = group
            .pivot
            .or_else(|| {
                let (a, b) = swap?;
                group.coords.iter().copied().find(|&c| c == a || c == b)
            })
            .unwrap_or_else(|| group.midpoint());

        Some(Spawn {
            coord,
            piece: Piece::special(kind, symbol, group.orientation),
        })
    }
}

/// Rules matching the stock game configuration, already in priority order
pub fn standard_rules() -> Vec<SpecialRule> {
    vec![
        SpecialRule {
            kind: SpecialKind::CrossBomb,
            condition: Condition::Shape {
                shapes: vec![Shape::Cross],
            },
        },
        SpecialRule {
            kind: SpecialKind::Bomb,
            condition: Condition::Shape {
                shapes: vec![Shape::L, Shape::T],
            },
        },
        SpecialRule {
            kind: SpecialKind::Rainbow,
            condition: Condition::Match { length: 5 },
        },
        SpecialRule {
            kind: SpecialKind::LineBomb,
            condition: Condition::Match { length: 4 },
        },
    ]
}

/// Cells cleared when `piece` detonates at `at`, clipped to the board.
/// Normal pieces and rainbows have no blast; a rainbow is only removed.
pub fn blast_radius(piece: &Piece, at: Coord, board: &Board) -> Vec<Coord> {
    let size = board.size();
    let row = |r: usize| (0..size).map(move |c| Coord::new(r, c));
    let col = |c: usize| (0..size).map(move |r| Coord::new(r, c));

    match piece.special_kind() {
        None => Vec::new(),
        Some(SpecialKind::Bomb) => {
            let rows = at.row.saturating_sub(1)..=(at.row + 1).min(size - 1);
            rows.flat_map(|r| {
                let cols = at.col.saturating_sub(1)..=(at.col + 1).min(size - 1);
                cols.map(move |c| Coord::new(r, c))
            })
            .collect()
        }
        Some(SpecialKind::CrossBomb) => row(at.row)
            .chain(col(at.col).filter(|c| c.row != at.row))
            .collect(),
        Some(SpecialKind::LineBomb) => match piece.orientation {
            Some(Orientation::Vertical) => col(at.col).collect(),
            _ => row(at.row).collect(),
        },
        Some(SpecialKind::Rainbow) => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::find_match_groups;
    use crate::piece::Symbol;

    fn line(coords: &[(usize, usize)], orientation: Orientation) -> MatchGroup {
        MatchGroup {
            coords: coords.iter().map(|&(r, c)| Coord::new(r, c)).collect(),
            shape: Shape::Line,
            orientation: Some(orientation),
            pivot: None,
        }
    }

    fn shaped(shape: Shape, pivot: (usize, usize)) -> MatchGroup {
        MatchGroup {
            coords: vec![Coord::new(pivot.0, pivot.1)],
            shape,
            orientation: None,
            pivot: Some(Coord::new(pivot.0, pivot.1)),
        }
    }

    #[test]
    fn test_standard_classification() {
        let rules = RuleSet::standard();
        let three = line(&[(0, 0), (0, 1), (0, 2)], Orientation::Horizontal);
        let four = line(&[(0, 0), (0, 1), (0, 2), (0, 3)], Orientation::Horizontal);
        let five = line(
            &[(0, 0), (1, 0), (2, 0), (3, 0), (4, 0)],
            Orientation::Vertical,
        );
        let six = line(
            &[(0, 0), (0, 1), (0, 2), (0, 3), (0, 4), (0, 5)],
            Orientation::Horizontal,
        );

        assert_eq!(rules.classify(&three), None);
        assert_eq!(rules.classify(&four), Some(SpecialKind::LineBomb));
        assert_eq!(rules.classify(&five), Some(SpecialKind::Rainbow));
        assert_eq!(rules.classify(&six), None);
        assert_eq!(rules.classify(&shaped(Shape::L, (2, 2))), Some(SpecialKind::Bomb));
        assert_eq!(rules.classify(&shaped(Shape::T, (2, 2))), Some(SpecialKind::Bomb));
        assert_eq!(
            rules.classify(&shaped(Shape::Cross, (2, 2))),
            Some(SpecialKind::CrossBomb)
        );
    }

    #[test]
    fn test_priority_ignores_config_order() {
        let mut reversed = standard_rules();
        reversed.reverse();
        // An overlapping rule: bombs also for crosses
        reversed[2] = SpecialRule {
            kind: SpecialKind::Bomb,
            condition: Condition::Shape {
                shapes: vec![Shape::Cross, Shape::L, Shape::T],
            },
        };
        let rules = RuleSet::new(reversed).unwrap();
        assert_eq!(rules.rules()[0].kind, SpecialKind::CrossBomb);
        assert_eq!(
            rules.classify(&shaped(Shape::Cross, (1, 1))),
            Some(SpecialKind::CrossBomb)
        );
    }

    #[test]
    fn test_invalid_rules() {
        let duplicate = vec![
            SpecialRule {
                kind: SpecialKind::Bomb,
                condition: Condition::Shape {
                    shapes: vec![Shape::L],
                },
            },
            SpecialRule {
                kind: SpecialKind::Bomb,
                condition: Condition::Match { length: 4 },
            },
        ];
        assert!(matches!(
            RuleSet::new(duplicate),
            Err(EngineError::Configuration(_))
        ));

        let short = vec![SpecialRule {
            kind: SpecialKind::LineBomb,
            condition: Condition::Match { length: 3 },
        }];
        assert!(RuleSet::new(short).is_err());

        let no_shapes = vec![SpecialRule {
            kind: SpecialKind::Bomb,
            condition: Condition::Shape { shapes: vec![] },
        }];
        assert!(RuleSet::new(no_shapes).is_err());

        let line_shape = vec![SpecialRule {
            kind: SpecialKind::Bomb,
            condition: Condition::Shape {
                shapes: vec![Shape::Line],
            },
        }];
        assert!(RuleSet::new(line_shape).is_err());

        assert!(RuleSet::new(Vec::new()).is_ok());
    }

    #[test]
    fn test_spawn_position() {
        let board = Board::parse(&["BCDEB", "AAAAC", "DEABD", "EBDCE", "BCEDB"]).unwrap();
        let groups = find_match_groups(&board);
        let rules = RuleSet::standard();

        // Midpoint without a swap
        let spawn = rules.plan_spawn(&groups[0], &board, None).unwrap();
        assert_eq!(spawn.coord, Coord::new(1, 2));
        assert_eq!(spawn.piece.special_kind(), Some(SpecialKind::LineBomb));
        assert_eq!(spawn.piece.orientation, Some(Orientation::Horizontal));
        assert_eq!(spawn.piece.symbol, Symbol(0));

        // Swapped cell wins over the midpoint
        let swap = Some((Coord::new(0, 0), Coord::new(1, 0)));
        let spawn = rules.plan_spawn(&groups[0], &board, swap).unwrap();
        assert_eq!(spawn.coord, Coord::new(1, 0));
    }

    #[test]
    fn test_spawn_at_pivot() {
        let board = Board::parse(&["BCDEB", "CAAAC", "DEABD", "EBACE", "BCDEB"]).unwrap();
        let groups = find_match_groups(&board);
        let swap = Some((Coord::new(3, 2), Coord::new(4, 2)));
        let spawn = RuleSet::standard()
            .plan_spawn(&groups[0], &board, swap)
            .unwrap();
        assert_eq!(spawn.coord, Coord::new(1, 2));
        assert_eq!(spawn.piece.special_kind(), Some(SpecialKind::Bomb));
        assert_eq!(spawn.piece.orientation, None);
    }

    #[test]
    fn test_cross_bomb_blast() {
        let board = Board::new(8);
        let piece = Piece::special(SpecialKind::CrossBomb, Symbol(0), None);
        let blast = blast_radius(&piece, Coord::new(3, 3), &board);
        assert_eq!(blast.len(), 15);
        assert!(blast.iter().all(|c| c.row == 3 || c.col == 3));
        let unique: HashSet<_> = blast.iter().collect();
        assert_eq!(unique.len(), 15);
    }

    #[test]
    fn test_bomb_blast_clipped() {
        let board = Board::new(6);
        let piece = Piece::special(SpecialKind::Bomb, Symbol(0), None);
        assert_eq!(blast_radius(&piece, Coord::new(2, 2), &board).len(), 9);
        assert_eq!(blast_radius(&piece, Coord::new(0, 0), &board).len(), 4);
        assert_eq!(blast_radius(&piece, Coord::new(5, 3), &board).len(), 6);
    }

    #[test]
    fn test_line_bomb_blast() {
        let board = Board::new(8);
        let vertical =
            Piece::special(SpecialKind::LineBomb, Symbol(0), Some(Orientation::Vertical));
        let blast = blast_radius(&vertical, Coord::new(2, 5), &board);
        assert_eq!(blast.len(), 8);
        assert!(blast.iter().all(|c| c.col == 5));

        let horizontal =
            Piece::special(SpecialKind::LineBomb, Symbol(0), Some(Orientation::Horizontal));
        let blast = blast_radius(&horizontal, Coord::new(2, 5), &board);
        assert!(blast.iter().all(|c| c.row == 2));
    }

    #[test]
    fn test_rainbow_has_no_blast() {
        let board = Board::parse(&["ABA", "BAB", "CCA"]).unwrap();
        let piece = Piece::special(SpecialKind::Rainbow, Symbol(0), None);
        assert!(blast_radius(&piece, Coord::new(1, 1), &board).is_empty());
    }

    #[test]
    fn test_normal_piece_has_no_blast() {
        let board = Board::new(6);
        assert!(blast_radius(&Piece::normal(Symbol(1)), Coord::new(1, 1), &board).is_empty());
    }
}
