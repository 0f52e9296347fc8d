//! Core game state and turn resolution

use crate::board::{Board, Coord};
use crate::error::{EngineError, Result};
use crate::event::TurnEvent;
use crate::gravity;
use crate::matcher::{find_match_groups, has_matches, touches_swap, MatchGroup};
use crate::mode::{GameMode, ModeState};
use crate::score::Score;
use crate::settings::Settings;
use crate::source::PieceSource;
use crate::special::{blast_radius, RuleSet, Spawn};
use std::collections::{BTreeSet, VecDeque};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Where the engine is within a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for a swap
    Idle,
    /// A swap has been applied and is being checked for matches
    SwapPending,
    /// Clearing matches; the value is the cascade depth
    Resolving(u32),
}

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Playing,
    Over(GameResult),
}

/// Final numbers of a finished session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameResult {
    pub score: u64,
    pub level: u32,
    pub high_score: u64,
    pub new_high_score: bool,
    /// Score reached the mode's clear threshold
    pub cleared: bool,
}

/// Why a swap request did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Another swap is still resolving
    Busy,
    /// The session has ended
    GameOver,
    /// A coordinate is off the board
    InvalidCoordinate(Coord),
    /// The cells do not share an edge
    NotAdjacent,
}

/// Result of a swap request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Nothing happened
    Rejected(Rejection),
    /// The swap ran to completion; events in the order they happened
    Completed(Vec<TurnEvent>),
}

impl TurnOutcome {
    pub fn events(&self) -> &[TurnEvent] {
        match self {
            TurnOutcome::Rejected(_) => &[],
            TurnOutcome::Completed(events) => events,
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, TurnOutcome::Rejected(_))
    }
}

/// Result of picking a cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Busy, finished or off the board
    Ignored,
    /// The cell is now selected
    Selected(Coord),
    /// The selection was dropped without a swap
    Deselected,
    /// The cell was next to the selection, so the two were swapped
    Swapped(TurnOutcome),
}

/// The main game struct
#[derive(Debug)]
pub struct Game {
    /// The game board
    pub board: Board,
    /// Score, level and combo
    pub score: Score,
    /// Playing or finished
    pub state: GameState,
    /// Mode and countdown
    pub mode_state: ModeState,
    /// Cell picked by the player, waiting for a second pick
    pub selected: Option<Coord>,
    /// Best score seen this run; survives new games
    pub high_score: u64,
    phase: Phase,
    rules: RuleSet,
    source: PieceSource,
    settings: Settings,
}

impl Game {
    /// Create a new game with a random seed
    pub fn new(settings: Settings, mode: GameMode) -> Result<Self> {
        Self::with_seed(settings, mode, rand::random())
    }

    /// Create a new game with a fixed seed (replays, tests)
    pub fn with_seed(settings: Settings, mode: GameMode, seed: u64) -> Result<Self> {
        let rules = settings.validate()?;
        let mut source = PieceSource::with_seed(settings.engine.symbols, seed);
        let board = generate_board(
            settings.mode(mode).grid_size,
            &mut source,
            settings.engine.init_retry_limit,
        );
        info!("New {} game, seed={}", mode.name(), seed);
        Ok(Self::assemble(settings, mode, rules, source, board))
    }

    /// Start from a prepared board (puzzles, replays, tests).
    /// The board must be full; it may hold matches, which wait for the first swap.
    pub fn from_board(settings: Settings, mode: GameMode, board: Board, seed: u64) -> Result<Self> {
        let rules = settings.validate()?;
        if !board.is_full() {
            return Err(EngineError::MalformedBoard(
                "starting board has empty cells".to_string(),
            ));
        }
        let source = PieceSource::with_seed(settings.engine.symbols, seed);
        Ok(Self::assemble(settings, mode, rules, source, board))
    }

    fn assemble(
        settings: Settings,
        mode: GameMode,
        rules: RuleSet,
        source: PieceSource,
        board: Board,
    ) -> Self {
        Self {
            board,
            score: Score::new(
                settings.scoring.combo_bonus_multiplier,
                settings.scoring.level_up_exp_base,
            ),
            state: GameState::Playing,
            mode_state: ModeState::new(mode, settings.mode(mode)),
            selected: None,
            high_score: 0,
            phase: Phase::Idle,
            rules,
            source,
            settings,
        }
    }

    /// Reset for a new session in `mode`, keeping the high score.
    /// Returns a snapshot of the fresh board.
    pub fn new_game(&mut self, mode: GameMode) -> Board {
        let mode_settings = self.settings.mode(mode);
        self.board = generate_board(
            mode_settings.grid_size,
            &mut self.source,
            self.settings.engine.init_retry_limit,
        );
        self.mode_state = ModeState::new(mode, mode_settings);
        self.score = Score::new(
            self.settings.scoring.combo_bonus_multiplier,
            self.settings.scoring.level_up_exp_base,
        );
        self.state = GameState::Playing;
        self.selected = None;
        self.phase = Phase::Idle;
        info!("New {} game, high score {}", mode.name(), self.high_score);
        self.board.clone()
    }

    /// Get the current game mode
    pub fn mode(&self) -> GameMode {
        self.mode_state.mode
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_over(&self) -> bool {
        matches!(self.state, GameState::Over(_))
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Handle a click on a cell: select, deselect, or swap with the selection
    pub fn select(&mut self, coord: Coord) -> Selection {
        if self.phase != Phase::Idle || self.is_over() || !self.board.is_valid(coord) {
            return Selection::Ignored;
        }

        match self.selected.take() {
            None => {
                self.selected = Some(coord);
                Selection::Selected(coord)
            }
            Some(previous) if previous.is_adjacent(coord) => {
                Selection::Swapped(self.request_swap(previous, coord))
            }
            Some(_) => Selection::Deselected,
        }
    }

    /// Swap two adjacent cells and resolve everything that follows.
    ///
    /// A swap that makes no match is undone and reported as
    /// [`TurnEvent::Reverted`]. Invalid requests are rejected without
    /// touching any state.
    pub fn request_swap(&mut self, a: Coord, b: Coord) -> TurnOutcome {
        if self.phase != Phase::Idle {
            return TurnOutcome::Rejected(Rejection::Busy);
        }
        if self.is_over() {
            return TurnOutcome::Rejected(Rejection::GameOver);
        }
        if let Some(&invalid) = [a, b].iter().find(|&&c| !self.board.is_valid(c)) {
            return TurnOutcome::Rejected(Rejection::InvalidCoordinate(invalid));
        }
        if !a.is_adjacent(b) {
            return TurnOutcome::Rejected(Rejection::NotAdjacent);
        }

        self.phase = Phase::SwapPending;
        self.board.swap(a, b);

        let mut events = Vec::new();
        let groups = find_match_groups(&self.board);
        // Groups left over from a capped cascade do not make a swap valid
        if !touches_swap(&groups, a, b) {
            self.board.swap(a, b);
            debug!("Swap {} <-> {} made no match, reverted", a, b);
            events.push(TurnEvent::Reverted);
        } else {
            self.resolve(groups, Some((a, b)), &mut events);
        }

        self.phase = Phase::Idle;
        TurnOutcome::Completed(events)
    }

    /// Advance the session clock. Returns the result when time runs out.
    pub fn advance(&mut self, dt: Duration) -> Option<GameResult> {
        if self.is_over() {
            return None;
        }
        self.mode_state.advance(dt);
        self.mode_state.is_expired().then(|| self.finish())
    }

    /// End the session now and record the high score
    pub fn finish(&mut self) -> GameResult {
        if let GameState::Over(result) = self.state {
            return result;
        }

        let new_high_score = self.score.points > self.high_score;
        if new_high_score {
            self.high_score = self.score.points;
        }
        let result = GameResult {
            score: self.score.points,
            level: self.score.level,
            high_score: self.high_score,
            new_high_score,
            cleared: self.mode_state.is_cleared(self.score.points),
        };
        self.state = GameState::Over(result);
        self.selected = None;
        info!(
            "Game over: score={} level={} cleared={} new_high={}",
            result.score, result.level, result.cleared, result.new_high_score
        );
        result
    }

    /// Run cascade passes until the board settles or the pass limit is hit
    fn resolve(
        &mut self,
        mut groups: Vec<MatchGroup>,
        mut swap: Option<(Coord, Coord)>,
        events: &mut Vec<TurnEvent>,
    ) {
        let limit = self.settings.engine.max_cascade_passes;
        let mut passes = 0;

        loop {
            self.phase = Phase::Resolving(passes);
            if !self.resolve_pass(&groups, swap, events) {
                break;
            }
            passes += 1;
            swap = None;

            groups = find_match_groups(&self.board);
            if groups.is_empty() {
                break;
            }
            if passes >= limit {
                warn!(
                    "Cascade stopped after {} passes with {} groups still on the board",
                    passes,
                    groups.len()
                );
                events.push(TurnEvent::CascadeLimitReached { passes });
                break;
            }
        }

        debug!("Board settled after {} passes, score {}", passes, self.score.points);
        self.score.reset_combo();
        events.push(TurnEvent::CascadeEnd);
    }

    /// One cascade pass. Returns false if there was nothing to clear.
    fn resolve_pass(
        &mut self,
        groups: &[MatchGroup],
        swap: Option<(Coord, Coord)>,
        events: &mut Vec<TurnEvent>,
    ) -> bool {
        let spawns: Vec<Spawn> = groups
            .iter()
            .filter_map(|group| self.rules.plan_spawn(group, &self.board, swap))
            .collect();

        let mut cleared = self.clear_set(groups, events);
        for spawn in &spawns {
            assert!(
                cleared.remove(&spawn.coord),
                "special spawn at {} is missing from the clear set",
                spawn.coord
            );
        }
        if cleared.is_empty() {
            return false;
        }

        let score_delta = self.score.add_clear(cleared.len());
        debug!(
            "Pass {}: {} groups, {} cells cleared, +{} points",
            self.score.combo,
            groups.len(),
            cleared.len(),
            score_delta
        );
        events.push(TurnEvent::Cleared {
            coords: cleared.iter().copied().collect(),
            score_delta,
            combo: self.score.combo,
        });

        for &coord in &cleared {
            self.board.set(coord, None);
        }
        for spawn in spawns {
            self.board.set(spawn.coord, Some(spawn.piece));
            if let Some(kind) = spawn.piece.special_kind() {
                events.push(TurnEvent::SpecialSpawned {
                    coord: spawn.coord,
                    kind,
                    orientation: spawn.piece.orientation,
                });
            }
        }

        let refill = gravity::settle(&mut self.board, &mut self.source);
        events.push(TurnEvent::Refilled {
            moves: refill.falls,
            new_pieces: refill.new_pieces,
        });

        for level in self.score.check_level_up() {
            info!("Level up: {}", level);
            events.push(TurnEvent::LevelUp { level });
        }
        true
    }

    /// Every cell the groups clear, including blasts of special pieces
    /// caught in them, transitively. Each special detonates once.
    fn clear_set(&self, groups: &[MatchGroup], events: &mut Vec<TurnEvent>) -> BTreeSet<Coord> {
        let mut cleared = BTreeSet::new();
        let mut frontier: VecDeque<Coord> = groups
            .iter()
            .flat_map(|group| group.coords.iter().copied())
            .collect();

        while let Some(coord) = frontier.pop_front() {
            if !cleared.insert(coord) {
                continue;
            }
            let Some(piece) = self.board.get(coord) else {
                continue;
            };
            if let Some(kind) = piece.special_kind() {
                debug!("{} detonates at {}", kind.name(), coord);
                events.push(TurnEvent::Detonated { coord, kind });
                frontier.extend(blast_radius(&piece, coord, &self.board));
            }
        }
        cleared
    }
}

/// Generate a starting board without matches, giving up after `limit`
/// attempts and keeping the last board.
fn generate_board(size: usize, source: &mut PieceSource, limit: u32) -> Board {
    let mut attempts = 0;
    loop {
        let board = Board::random(size, source);
        attempts += 1;
        if !has_matches(&board) {
            debug!("Starting board found after {} attempts", attempts);
            return board;
        }
        if attempts >= limit.max(1) {
            warn!(
                "No match-free starting board after {} attempts, keeping the last one",
                attempts
            );
            return board;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::find_swap;
    use crate::piece::{Orientation, Piece, SpecialKind, Symbol};

    const F: Symbol = Symbol(5);

    /// 8x8 rows with no two equal neighbours: symbol (2 * row + col) % 5
    fn base_rows() -> Vec<Vec<char>> {
        (0..8)
            .map(|r| {
                (0..8)
                    .map(|c| Symbol(((2 * r + c) % 5) as u8).letter())
                    .collect()
            })
            .collect()
    }

    fn build(plants: &[(usize, usize, char)]) -> Board {
        let mut rows = base_rows();
        for &(r, c, ch) in plants {
            rows[r][c] = ch;
        }
        let rows: Vec<String> = rows.into_iter().map(|r| r.into_iter().collect()).collect();
        let refs: Vec<&str> = rows.iter().map(String::as_str).collect();
        let board = Board::parse(&refs).unwrap();
        assert!(!has_matches(&board), "fixture already holds a match");
        board
    }

    fn game_with(board: Board, settings: Settings) -> Game {
        Game::from_board(settings, GameMode::Normal, board, 7).unwrap()
    }

    fn cleared_events(events: &[TurnEvent]) -> Vec<(&Vec<Coord>, u64, u32)> {
        events
            .iter()
            .filter_map(|e| match e {
                TurnEvent::Cleared {
                    coords,
                    score_delta,
                    combo,
                } => Some((coords, *score_delta, *combo)),
                _ => None,
            })
            .collect()
    }

    /// Swapping (3,2) and (4,2) makes a horizontal four of F in row 3
    fn four_in_a_row() -> Board {
        build(&[(3, 0, 'F'), (3, 1, 'F'), (3, 3, 'F'), (4, 2, 'F')])
    }

    #[test]
    fn test_new_game_has_no_matches() {
        let game = Game::with_seed(Settings::default(), GameMode::Normal, 11).unwrap();
        assert_eq!(game.board.size(), 8);
        assert!(game.board.is_full());
        assert!(!has_matches(&game.board));
        assert_eq!(game.phase(), Phase::Idle);
        assert_eq!(game.mode_state.time_remaining(), Duration::from_secs(60));
    }

    #[test]
    fn test_init_retry_limit_keeps_last_board() {
        let mut settings = Settings::default();
        settings.engine.init_retry_limit = 1;
        let game = Game::with_seed(settings, GameMode::Easy, 3).unwrap();
        assert_eq!(game.board.size(), 6);
        assert!(game.board.is_full());
    }

    #[test]
    fn test_invalid_settings_fail_startup() {
        let mut settings = Settings::default();
        settings.engine.symbols = 1;
        assert!(matches!(
            Game::with_seed(settings, GameMode::Normal, 0),
            Err(EngineError::Configuration(_))
        ));
    }

    #[test]
    fn test_from_board_rejects_holes() {
        let board = Board::parse(&["ABC", "B.A", "CAB"]).unwrap();
        assert!(matches!(
            Game::from_board(Settings::default(), GameMode::Easy, board, 0),
            Err(EngineError::MalformedBoard(_))
        ));
    }

    #[test]
    fn test_rejected_swaps() {
        let mut game = game_with(four_in_a_row(), Settings::default());
        let before = game.board.clone();

        assert_eq!(
            game.request_swap(Coord::new(0, 0), Coord::new(0, 2)),
            TurnOutcome::Rejected(Rejection::NotAdjacent)
        );
        assert_eq!(
            game.request_swap(Coord::new(0, 0), Coord::new(1, 1)),
            TurnOutcome::Rejected(Rejection::NotAdjacent)
        );
        assert_eq!(
            game.request_swap(Coord::new(7, 7), Coord::new(7, 8)),
            TurnOutcome::Rejected(Rejection::InvalidCoordinate(Coord::new(7, 8)))
        );

        game.phase = Phase::Resolving(0);
        assert_eq!(
            game.request_swap(Coord::new(3, 2), Coord::new(4, 2)),
            TurnOutcome::Rejected(Rejection::Busy)
        );
        assert_eq!(game.select(Coord::new(3, 2)), Selection::Ignored);
        game.phase = Phase::Idle;

        assert_eq!(game.board, before);
        assert_eq!(game.score.points, 0);
    }

    #[test]
    fn test_swap_without_match_reverts() {
        let mut game = game_with(build(&[]), Settings::default());
        let before = game.board.clone();
        let outcome = game.request_swap(Coord::new(0, 0), Coord::new(0, 1));
        assert_eq!(outcome, TurnOutcome::Completed(vec![TurnEvent::Reverted]));
        assert_eq!(game.board, before);
        assert_eq!(game.score.points, 0);
        assert_eq!(game.phase(), Phase::Idle);
    }

    #[test]
    fn test_four_in_a_row_spawns_line_bomb() {
        let mut game = game_with(four_in_a_row(), Settings::default());
        let outcome = game.request_swap(Coord::new(3, 2), Coord::new(4, 2));
        let events = outcome.events();

        assert_eq!(
            events[0],
            TurnEvent::Cleared {
                coords: vec![Coord::new(3, 0), Coord::new(3, 1), Coord::new(3, 3)],
                score_delta: 33,
                combo: 1,
            }
        );
        assert_eq!(
            events[1],
            TurnEvent::SpecialSpawned {
                coord: Coord::new(3, 2),
                kind: SpecialKind::LineBomb,
                orientation: Some(Orientation::Horizontal),
            }
        );
        assert!(matches!(events[2], TurnEvent::Refilled { .. }));
        assert_eq!(events.last(), Some(&TurnEvent::CascadeEnd));
        assert!(game.score.points >= 33);
        assert_eq!(game.score.combo, 0);
    }

    #[test]
    fn test_cross_bomb_detonation() {
        let mut board = build(&[(3, 4, 'F'), (2, 5, 'F')]);
        board.set(
            Coord::new(3, 3),
            Some(Piece::special(SpecialKind::CrossBomb, F, None)),
        );
        let mut game = game_with(board, Settings::default());
        let outcome = game.request_swap(Coord::new(2, 5), Coord::new(3, 5));
        let events = outcome.events();

        assert_eq!(
            events[0],
            TurnEvent::Detonated {
                coord: Coord::new(3, 3),
                kind: SpecialKind::CrossBomb,
            }
        );
        let (coords, score_delta, combo) = cleared_events(events)[0];
        assert_eq!(coords.len(), 15);
        assert!(coords.iter().all(|c| c.row == 3 || c.col == 3));
        assert_eq!(score_delta, 165);
        assert_eq!(combo, 1);
    }

    #[test]
    fn test_rainbow_is_removed_without_blast() {
        let mut board = build(&[(3, 4, 'F'), (2, 5, 'F')]);
        board.set(
            Coord::new(3, 3),
            Some(Piece::special(SpecialKind::Rainbow, F, None)),
        );
        let mut game = game_with(board, Settings::default());
        let outcome = game.request_swap(Coord::new(2, 5), Coord::new(3, 5));
        let events = outcome.events();

        assert_eq!(
            events[0],
            TurnEvent::Detonated {
                coord: Coord::new(3, 3),
                kind: SpecialKind::Rainbow,
            }
        );
        assert_eq!(
            events[1],
            TurnEvent::Cleared {
                coords: vec![Coord::new(3, 3), Coord::new(3, 4), Coord::new(3, 5)],
                score_delta: 33,
                combo: 1,
            }
        );
    }

    #[test]
    fn test_bomb_chain_terminates() {
        let mut board = build(&[(5, 1, 'F'), (4, 2, 'F')]);
        board.set(
            Coord::new(5, 0),
            Some(Piece::special(SpecialKind::Bomb, F, None)),
        );
        for col in 0..8 {
            let coord = Coord::new(6, col);
            let symbol = board.get(coord).unwrap().symbol;
            board.set(coord, Some(Piece::special(SpecialKind::Bomb, symbol, None)));
        }
        assert!(!has_matches(&board));

        let mut game = game_with(board, Settings::default());
        let outcome = game.request_swap(Coord::new(4, 2), Coord::new(5, 2));
        let events = outcome.events();

        let detonated: Vec<Coord> = events
            .iter()
            .filter_map(|e| match e {
                TurnEvent::Detonated { coord, .. } => Some(*coord),
                _ => None,
            })
            .collect();
        assert!(detonated.contains(&Coord::new(5, 0)));
        for col in 0..8 {
            assert!(detonated.contains(&Coord::new(6, col)));
        }

        let (coords, score_delta, _) = cleared_events(events)[0];
        assert_eq!(coords.len(), 26);
        assert_eq!(score_delta, 286);
        assert_eq!(events.last(), Some(&TurnEvent::CascadeEnd));
        assert_eq!(game.phase(), Phase::Idle);
        assert!(game.board.is_full());
    }

    /// Clearing row 6, cols 0-2 drops two G pieces next to a third
    fn falling_cascade() -> Board {
        build(&[
            (6, 0, 'F'),
            (6, 1, 'F'),
            (7, 2, 'F'),
            (5, 1, 'G'),
            (5, 2, 'G'),
            (6, 3, 'G'),
        ])
    }

    #[test]
    fn test_cascade_combo_increases() {
        let mut game = game_with(falling_cascade(), Settings::default());
        let outcome = game.request_swap(Coord::new(6, 2), Coord::new(7, 2));
        let cleared = cleared_events(outcome.events());

        assert!(cleared.len() >= 2);
        for (i, (_, _, combo)) in cleared.iter().enumerate() {
            assert_eq!(*combo, i as u32 + 1);
        }
        let (second, delta, _) = cleared[1];
        for col in 1..=3 {
            assert!(second.contains(&Coord::new(6, col)));
        }
        assert!(delta >= 36);
        assert_eq!(game.score.combo, 0);
    }

    #[test]
    fn test_cascade_limit() {
        let mut settings = Settings::default();
        settings.engine.max_cascade_passes = 1;
        let mut game = game_with(falling_cascade(), settings);
        let outcome = game.request_swap(Coord::new(6, 2), Coord::new(7, 2));
        let events = outcome.events();

        assert_eq!(cleared_events(events).len(), 1);
        assert!(events.contains(&TurnEvent::CascadeLimitReached { passes: 1 }));
        assert_eq!(events.last(), Some(&TurnEvent::CascadeEnd));
        assert_eq!(game.score.combo, 0);
        assert_eq!(game.phase(), Phase::Idle);
        // The G run is still waiting on the board
        assert!(has_matches(&game.board));

        // It does not make an unrelated swap valid
        let before = game.board.clone();
        let outcome = game.request_swap(Coord::new(7, 6), Coord::new(7, 7));
        assert_eq!(outcome, TurnOutcome::Completed(vec![TurnEvent::Reverted]));
        assert_eq!(game.board, before);
    }

    #[test]
    fn test_level_up_events() {
        let mut settings = Settings::default();
        settings.scoring.level_up_exp_base = 1;
        let mut game = game_with(four_in_a_row(), settings);
        let outcome = game.request_swap(Coord::new(3, 2), Coord::new(4, 2));
        assert!(outcome.events().contains(&TurnEvent::LevelUp { level: 2 }));
        assert!(outcome.events().contains(&TurnEvent::LevelUp { level: 3 }));
        assert!(game.score.level >= 3);
    }

    #[test]
    fn test_selection_flow() {
        let mut game = game_with(four_in_a_row(), Settings::default());

        assert_eq!(game.select(Coord::new(3, 2)), Selection::Selected(Coord::new(3, 2)));
        assert_eq!(game.select(Coord::new(3, 2)), Selection::Deselected);
        assert_eq!(game.selected, None);

        game.select(Coord::new(3, 2));
        assert_eq!(game.select(Coord::new(6, 6)), Selection::Deselected);
        assert_eq!(game.selected, None);

        assert_eq!(game.select(Coord::new(9, 9)), Selection::Ignored);

        game.select(Coord::new(3, 2));
        match game.select(Coord::new(4, 2)) {
            Selection::Swapped(TurnOutcome::Completed(events)) => {
                assert!(matches!(events[0], TurnEvent::Cleared { .. }));
            }
            other => panic!("expected a swap, got {:?}", other),
        }
        assert_eq!(game.selected, None);
    }

    #[test]
    fn test_timer_ends_game() {
        let mut game = game_with(four_in_a_row(), Settings::default());
        game.request_swap(Coord::new(3, 2), Coord::new(4, 2));
        let points = game.score.points;

        assert_eq!(game.advance(Duration::from_secs(59)), None);
        let result = game.advance(Duration::from_secs(2)).unwrap();
        assert_eq!(result.score, points);
        assert!(result.new_high_score);
        assert_eq!(result.high_score, points);
        assert_eq!(result.cleared, points >= 4000);
        assert!(game.is_over());

        assert_eq!(
            game.request_swap(Coord::new(0, 0), Coord::new(0, 1)),
            TurnOutcome::Rejected(Rejection::GameOver)
        );
        assert_eq!(game.advance(Duration::from_secs(1)), None);
        assert_eq!(game.finish(), result);
    }

    #[test]
    fn test_new_game_keeps_high_score() {
        let mut game = game_with(four_in_a_row(), Settings::default());
        game.request_swap(Coord::new(3, 2), Coord::new(4, 2));
        let points = game.score.points;
        game.finish();

        let board = game.new_game(GameMode::Easy);
        assert_eq!(board.size(), 6);
        assert_eq!(game.board, board);
        assert_eq!(game.score.points, 0);
        assert_eq!(game.score.level, 1);
        assert_eq!(game.high_score, points);
        assert_eq!(game.state, GameState::Playing);
        assert_eq!(game.mode(), GameMode::Easy);

        // A lower score does not replace the high score
        let result = game.finish();
        assert!(!result.new_high_score);
        assert_eq!(result.high_score, points);
    }

    #[test]
    fn test_autoplay_turns_settle() {
        for seed in 0..20 {
            let mut game = Game::with_seed(Settings::default(), GameMode::Normal, seed).unwrap();
            for _ in 0..10 {
                let Some((a, b)) = find_swap(&game.board) else {
                    break;
                };
                let outcome = game.request_swap(a, b);
                let cleared = cleared_events(outcome.events());
                assert!(!cleared.is_empty());
                for (i, (_, _, combo)) in cleared.iter().enumerate() {
                    assert_eq!(*combo, i as u32 + 1);
                }
                assert_eq!(game.score.combo, 0);
                assert_eq!(game.phase(), Phase::Idle);
                assert!(game.board.is_full());
            }
        }
    }
}
