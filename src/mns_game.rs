// Game session: one board plus the difficulty it was built from,
// the keyboard cursor and the play timer

use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::time::{Duration, Instant};
use tracing::info;

use crate::mns_board::{Board, CellState, GameStatus};
use crate::mns_error::Result;

/// Smallest and largest side length reachable by resizing
pub const MIN_SIDE: usize = 3;
pub const MAX_SIDE: usize = 36;

/// Difficulty presets (digit keys 1-5) and resized custom boards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Beginner,                    // 9x9, 10 mines
    Easy,                        // 10x10, 12 mines
    Medium,                      // 16x16, 40 mines
    Hard,                        // 24x16, 70 mines
    Expert,                      // 30x16, 99 mines
    Custom(usize, usize, usize), // width, height, mines
}

pub const PRESETS: [Difficulty; 5] = [
    Difficulty::Beginner,
    Difficulty::Easy,
    Difficulty::Medium,
    Difficulty::Hard,
    Difficulty::Expert,
];

impl Serialize for Difficulty {
    /// Serialize difficulty as a human-readable name
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Difficulty {
    /// Custom comes back as 0x0x0; the config loader fills in custom_w/h/n
    fn deserialize<D>(deserializer: D) -> std::result::Result<Difficulty, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PRESETS
            .iter()
            .copied()
            .find(|d| d.name() == s)
            .or_else(|| (s == "Custom").then_some(Difficulty::Custom(0, 0, 0)))
            .ok_or_else(|| serde::de::Error::custom(format!("unknown difficulty `{s}`")))
    }
}

impl Difficulty {
    /// Board dimensions and mine count (width, height, mines)
    pub fn params(&self) -> (usize, usize, usize) {
        match self {
            Difficulty::Beginner => (9, 9, 10),
            Difficulty::Easy => (10, 10, 12),
            Difficulty::Medium => (16, 16, 40),
            Difficulty::Hard => (24, 16, 70),
            Difficulty::Expert => (30, 16, 99),
            Difficulty::Custom(w, h, n) => (*w, *h, *n),
        }
    }

    /// Stable identifier used in the config file
    pub fn name(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "Beginner",
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::Expert => "Expert",
            Difficulty::Custom(_, _, _) => "Custom",
        }
    }

    /// Preset bound to a digit key ('1'..='5')
    pub fn from_digit(c: char) -> Option<Difficulty> {
        let i = c.to_digit(10)? as usize;
        PRESETS.get(i.checked_sub(1)?).copied()
    }

    /// Grow or shrink both sides by `delta`, keeping the mine density
    pub fn resized(&self, delta: isize) -> Difficulty {
        let (w, h, n) = self.params();
        let side = |s: usize| (s as isize + delta).clamp(MIN_SIDE as isize, MAX_SIDE as isize) as usize;
        let (nw, nh) = (side(w), side(h));
        let total = nw * nh;
        let density = n as f64 / (w * h).max(1) as f64;
        let mines = ((density * total as f64).round() as usize).clamp(1, total - 1);
        Difficulty::Custom(nw, nh, mines)
    }
}

/// A running game. Owned by the event loop; every mutation goes through here.
#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    difficulty: Difficulty,
    seed: u64,
    pub cursor: (usize, usize),
    start_time: Option<Instant>, // set while the clock runs
    elapsed: Duration,           // frozen play time once the game ends
}

impl Game {
    pub fn new(difficulty: Difficulty, seed: u64) -> Result<Self> {
        let (w, h, n) = difficulty.params();
        let board = Board::new(w, h, n, seed)?;
        info!(difficulty = difficulty.name(), w, h, mines = n, seed, "new game");
        Ok(Game {
            board,
            difficulty,
            seed,
            cursor: (0, 0),
            start_time: None,
            elapsed: Duration::ZERO,
        })
    }

    pub fn fresh_seed() -> u64 {
        rand::thread_rng().r#gen()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn status(&self) -> GameStatus {
        self.board.status()
    }

    /// Reveal a cell. The first accepted reveal starts the clock,
    /// reaching Won or Lost stops it.
    pub fn reveal(&mut self, x: usize, y: usize) -> Result<GameStatus> {
        let before = self.board.revealed_count();
        let status = self.board.reveal(x, y)?;
        if self.board.revealed_count() > before && self.start_time.is_none() {
            self.start_time = Some(Instant::now());
        }
        if status != GameStatus::InProgress {
            self.stop_clock();
        }
        Ok(status)
    }

    pub fn toggle_flag(&mut self, x: usize, y: usize) -> Result<CellState> {
        self.board.toggle_flag(x, y)
    }

    pub fn reveal_at_cursor(&mut self) -> Result<GameStatus> {
        let (x, y) = self.cursor;
        self.reveal(x, y)
    }

    pub fn flag_at_cursor(&mut self) -> Result<CellState> {
        let (x, y) = self.cursor;
        self.toggle_flag(x, y)
    }

    pub fn step_cursor(&mut self, dx: isize, dy: isize) {
        let nx = (self.cursor.0 as isize + dx).clamp(0, (self.board.width() - 1) as isize) as usize;
        let ny = (self.cursor.1 as isize + dy).clamp(0, (self.board.height() - 1) as isize) as usize;
        self.cursor = (nx, ny);
    }

    /// New board with the same parameters ('r')
    pub fn restart(&mut self, seed: u64) -> Result<()> {
        self.rebuild(self.difficulty, seed)
    }

    /// Switch to another difficulty and start over
    pub fn select(&mut self, difficulty: Difficulty, seed: u64) -> Result<()> {
        self.rebuild(difficulty, seed)
    }

    /// Grow or shrink the board. Nothing happens at the size limits.
    pub fn resize(&mut self, delta: isize, seed: u64) -> Result<()> {
        let next = self.difficulty.resized(delta);
        let (w, h, _) = next.params();
        if (w, h) == (self.board.width(), self.board.height()) {
            return Ok(());
        }
        self.rebuild(next, seed)
    }

    fn rebuild(&mut self, difficulty: Difficulty, seed: u64) -> Result<()> {
        let (w, h, n) = difficulty.params();
        self.board.reset(w, h, n, seed)?;
        self.difficulty = difficulty;
        self.seed = seed;
        self.cursor = (self.cursor.0.min(w - 1), self.cursor.1.min(h - 1));
        self.start_time = None;
        self.elapsed = Duration::ZERO;
        info!(difficulty = difficulty.name(), w, h, mines = n, seed, "new game");
        Ok(())
    }

    fn stop_clock(&mut self) {
        if let Some(t0) = self.start_time.take() {
            self.elapsed = t0.elapsed();
        }
    }

    pub fn is_running(&self) -> bool {
        self.start_time.is_some()
    }

    pub fn elapsed(&self) -> Duration {
        match self.start_time {
            Some(t0) => t0.elapsed(),
            None => self.elapsed,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_board(board: Board) -> Self {
        let (w, h, n) = (board.width(), board.height(), board.mine_count());
        Game {
            board,
            difficulty: Difficulty::Custom(w, h, n),
            seed: 0,
            cursor: (0, 0),
            start_time: None,
            elapsed: Duration::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mns_error::BoardError;

    #[test]
    fn every_preset_builds_a_board() {
        for d in PRESETS {
            let (w, h, n) = d.params();
            let game = Game::new(d, 5).unwrap();
            assert_eq!(game.board().width(), w);
            assert_eq!(game.board().height(), h);
            assert_eq!(game.board().mine_count(), n);
        }
    }

    #[test]
    fn digits_map_to_presets() {
        assert_eq!(Difficulty::from_digit('1'), Some(Difficulty::Beginner));
        assert_eq!(Difficulty::from_digit('3'), Some(Difficulty::Medium));
        assert_eq!(Difficulty::from_digit('5'), Some(Difficulty::Expert));
        assert_eq!(Difficulty::from_digit('0'), None);
        assert_eq!(Difficulty::from_digit('6'), None);
        assert_eq!(Difficulty::from_digit('x'), None);
    }

    #[test]
    fn resize_keeps_density_and_clamps() {
        assert_eq!(Difficulty::Medium.resized(4), Difficulty::Custom(20, 20, 63));
        assert_eq!(Difficulty::Custom(3, 3, 2).resized(-1), Difficulty::Custom(3, 3, 2));
        assert_eq!(Difficulty::Custom(36, 36, 100).resized(1), Difficulty::Custom(36, 36, 100));
        // density rounding never produces an unplayable board
        assert_eq!(Difficulty::Custom(4, 4, 15).resized(-1), Difficulty::Custom(3, 3, 8));
        assert_eq!(Difficulty::Custom(4, 4, 1).resized(-1), Difficulty::Custom(3, 3, 1));
    }

    #[test]
    fn restart_keeps_difficulty_with_new_layout() {
        let mut game = Game::new(Difficulty::Expert, 1).unwrap();
        let first = game.board().peek_solution();
        game.restart(2).unwrap();
        assert_eq!(game.difficulty(), Difficulty::Expert);
        assert_eq!(game.seed(), 2);
        assert_ne!(game.board().peek_solution(), first);
    }

    #[test]
    fn select_switches_preset_and_clamps_cursor() {
        let mut game = Game::new(Difficulty::Expert, 1).unwrap();
        game.cursor = (29, 15);
        game.select(Difficulty::Beginner, 3).unwrap();
        assert_eq!(game.difficulty(), Difficulty::Beginner);
        assert_eq!(game.board().width(), 9);
        assert_eq!(game.cursor, (8, 8));
        assert_eq!(game.status(), GameStatus::InProgress);
    }

    #[test]
    fn invalid_selection_leaves_game_untouched() {
        let mut game = Game::new(Difficulty::Beginner, 1).unwrap();
        let err = game.select(Difficulty::Custom(1, 1, 1), 2).unwrap_err();
        assert!(matches!(err, BoardError::InvalidConfiguration { .. }));
        assert_eq!(game.difficulty(), Difficulty::Beginner);
        assert_eq!(game.seed(), 1);
    }

    #[test]
    fn resize_grows_and_stops_at_limits() {
        let mut game = Game::new(Difficulty::Beginner, 1).unwrap();
        game.resize(1, 2).unwrap();
        assert_eq!(game.difficulty(), Difficulty::Custom(10, 10, 12));
        assert_eq!(game.board().mine_count(), 12);

        let mut tiny = Game::new(Difficulty::Custom(3, 3, 1), 1).unwrap();
        tiny.reveal(0, 0).unwrap();
        let revealed = tiny.board().revealed_count();
        tiny.resize(-1, 9).unwrap();
        assert_eq!(tiny.seed(), 1);
        assert_eq!(tiny.board().revealed_count(), revealed);
    }

    #[test]
    fn clock_runs_from_first_reveal_until_end() {
        let board = Board::from_mines(4, 1, &[(3, 0)]).unwrap();
        let mut game = Game::with_board(board);
        assert!(!game.is_running());
        assert_eq!(game.elapsed(), Duration::ZERO);

        game.toggle_flag(2, 0).unwrap();
        assert!(!game.is_running());

        game.reveal(0, 0).unwrap();
        assert_eq!(game.board().revealed_count(), 2);
        assert!(game.is_running());

        assert_eq!(game.reveal(3, 0).unwrap(), GameStatus::Lost);
        assert!(!game.is_running());
        let frozen = game.elapsed();
        assert_eq!(game.elapsed(), frozen);
    }

    #[test]
    fn restart_resets_clock() {
        let board = Board::from_mines(4, 1, &[(3, 0)]).unwrap();
        let mut game = Game::with_board(board);
        game.reveal(0, 0).unwrap();
        assert!(game.is_running());
        game.restart(4).unwrap();
        assert!(!game.is_running());
        assert_eq!(game.elapsed(), Duration::ZERO);
    }

    #[test]
    fn cursor_actions_target_cursor_cell() {
        let board = Board::from_mines(3, 3, &[(2, 2)]).unwrap();
        let mut game = Game::with_board(board);
        game.step_cursor(-1, -1);
        assert_eq!(game.cursor, (0, 0));
        game.step_cursor(5, 5);
        assert_eq!(game.cursor, (2, 2));
        assert_eq!(game.flag_at_cursor().unwrap(), CellState::Flagged);
        game.step_cursor(-2, -2);
        assert_eq!(game.reveal_at_cursor().unwrap(), GameStatus::Won);
    }
}
