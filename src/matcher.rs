//! Match detection
//!
//! Finds every run of three or more identical symbols, merges crossing
//! horizontal and vertical runs into L, T and cross shapes, and reports the
//! result as disjoint match groups.

use crate::board::{Board, Coord};
use crate::piece::Orientation;
use serde::{Deserialize, Serialize};

/// Shortest run that counts as a match
pub const MIN_RUN: usize = 3;

/// Shape of a match group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    /// A single straight run
    Line,
    /// Two runs meeting at their ends
    #[serde(alias = "L")]
    L,
    /// One run ending in the middle of another
    #[serde(alias = "T")]
    T,
    /// Two runs crossing in both their middles
    Cross,
}

/// A set of cells cleared together by one match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchGroup {
    /// Member cells; lines are in scan order, shapes start with the horizontal run
    pub coords: Vec<Coord>,
    pub shape: Shape,
    /// Set for lines only
    pub orientation: Option<Orientation>,
    /// Set for shapes only: where the two runs intersect
    pub pivot: Option<Coord>,
}

impl MatchGroup {
    /// Number of cells in the group (the run length for lines)
    pub fn length(&self) -> usize {
        self.coords.len()
    }

    pub fn contains(&self, coord: Coord) -> bool {
        self.coords.contains(&coord)
    }

    /// Middle cell of the group, `coords[floor(length / 2)]`
    pub fn midpoint(&self) -> Coord {
        self.coords[self.coords.len() / 2]
    }
}

/// Find all match groups on the board.
///
/// Shaped groups come first, then horizontal lines, then vertical lines,
/// each in scan order. No coordinate appears in two groups.
pub fn find_match_groups(board: &Board) -> Vec<MatchGroup> {
    let size = board.size();
    let index = |c: Coord| c.row * size + c.col;

    let horizontal = scan_runs(board, Orientation::Horizontal);
    let vertical = scan_runs(board, Orientation::Vertical);

    let mut vertical_at: Vec<Option<usize>> = vec![None; size * size];
    for (i, run) in vertical.iter().enumerate() {
        for &c in run {
            vertical_at[index(c)] = Some(i);
        }
    }

    // Which group claimed each cell
    let mut owner: Vec<Option<usize>> = vec![None; size * size];
    let mut groups: Vec<MatchGroup> = Vec::new();

    for h_run in &horizontal {
        for &pivot in h_run {
            let Some(v) = vertical_at[index(pivot)] else {
                continue;
            };
            let v_run = &vertical[v];

            let target = match owner[index(pivot)] {
                // Compound shape: fold both runs into the group that owns the pivot
                Some(g) => g,
                None => {
                    let Some(shape) = classify(pivot, h_run, v_run) else {
                        continue;
                    };
                    groups.push(MatchGroup {
                        coords: Vec::with_capacity(h_run.len() + v_run.len()),
                        shape,
                        orientation: None,
                        pivot: Some(pivot),
                    });
                    groups.len() - 1
                }
            };

            for &c in h_run.iter().chain(v_run) {
                if owner[index(c)].is_none() {
                    owner[index(c)] = Some(target);
                    groups[target].coords.push(c);
                }
            }
        }
    }

    for (runs, orientation) in [
        (&horizontal, Orientation::Horizontal),
        (&vertical, Orientation::Vertical),
    ] {
        for run in runs {
            if run.iter().any(|&c| owner[index(c)].is_some()) {
                continue;
            }
            for &c in run {
                owner[index(c)] = Some(groups.len());
            }
            groups.push(MatchGroup {
                coords: run.clone(),
                shape: Shape::Line,
                orientation: Some(orientation),
                pivot: None,
            });
        }
    }

    groups
}

/// True if the board holds at least one run of three
pub fn has_matches(board: &Board) -> bool {
    !scan_runs(board, Orientation::Horizontal).is_empty()
        || !scan_runs(board, Orientation::Vertical).is_empty()
}

/// True if any group runs through one of the two swapped cells
pub fn touches_swap(groups: &[MatchGroup], a: Coord, b: Coord) -> bool {
    groups.iter().any(|group| group.contains(a) || group.contains(b))
}

/// Find the first adjacent swap that would create a match through one of
/// the swapped cells.
///
/// Cells are tried row-major, each against its right then its lower neighbour.
pub fn find_swap(board: &Board) -> Option<(Coord, Coord)> {
    let size = board.size();
    let mut scratch = board.clone();

    for a in board.coords() {
        let neighbours = [
            (a.col + 1 < size).then(|| Coord::new(a.row, a.col + 1)),
            (a.row + 1 < size).then(|| Coord::new(a.row + 1, a.col)),
        ];
        for b in neighbours.into_iter().flatten() {
            scratch.swap(a, b);
            let found = touches_swap(&find_match_groups(&scratch), a, b);
            scratch.swap(a, b);
            if found {
                return Some((a, b));
            }
        }
    }
    None
}

/// Classify the union of two crossing runs by how many arms leave the pivot
fn classify(pivot: Coord, h_run: &[Coord], v_run: &[Coord]) -> Option<Shape> {
    let up = v_run.iter().any(|c| c.row < pivot.row);
    let down = v_run.iter().any(|c| c.row > pivot.row);
    let left = h_run.iter().any(|c| c.col < pivot.col);
    let right = h_run.iter().any(|c| c.col > pivot.col);

    match [up, down, left, right].iter().filter(|&&arm| arm).count() {
        4 => Some(Shape::Cross),
        3 => Some(Shape::T),
        2 if (up || down) && (left || right) => Some(Shape::L),
        _ => None,
    }
}

/// Maximal runs of at least [`MIN_RUN`] identical symbols along one axis.
/// Horizontal runs come row-major, vertical runs column-major.
fn scan_runs(board: &Board, orientation: Orientation) -> Vec<Vec<Coord>> {
    let size = board.size();
    let at = |line: usize, offset: usize| match orientation {
        Orientation::Horizontal => Coord::new(line, offset),
        Orientation::Vertical => Coord::new(offset, line),
    };

    let mut runs = Vec::new();
    for line in 0..size {
        let mut start = 0;
        while start < size {
            let Some(piece) = board.get(at(line, start)) else {
                start += 1;
                continue;
            };
            let mut end = start + 1;
            while end < size && board.get(at(line, end)).is_some_and(|p| p.matches(&piece)) {
                end += 1;
            }
            if end - start >= MIN_RUN {
                runs.push((start..end).map(|offset| at(line, offset)).collect());
            }
            start = end;
        }
    }
    runs
}
