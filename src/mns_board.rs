// Board model for Minesweeper
// Owns the minefield, enforces reveal/flag rules and decides win/loss

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index;
use tracing::{debug, info};

use crate::mns_error::{BoardError, Result};

/// Visible state of a single cell
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    #[default]
    Hidden,
    Revealed,
    Flagged,
}

/// Overall game result; `Won` and `Lost` are terminal
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    #[default]
    InProgress,
    Won,
    Lost,
}

/// A single cell on the minesweeper board
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub is_mine: bool,
    pub adjacent_mine_count: u8, // 0-8, fixed once mines are placed
    pub state: CellState,
}

/// Per-cell mine map handed out for the "view solution" overlay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    width: usize,
    mines: Vec<bool>,
}

impl Solution {
    pub fn is_mine(&self, x: usize, y: usize) -> bool {
        x < self.width && self.mines.get(y * self.width + x).copied().unwrap_or(false)
    }
}

/// The minefield. Cells are stored row-major, index `y * w + x`.
#[derive(Debug, Clone)]
pub struct Board {
    w: usize,
    h: usize,
    mines: usize,
    cells: Vec<Cell>,
    status: GameStatus,
    revealed: usize,
    flags: usize,
    hidden_safe: usize, // safe cells still to reveal; zero means won
    triggered: Option<(usize, usize)>,
}

/// Clipped Moore neighbourhood of (x, y), excluding the cell itself
fn neighbors_of(x: usize, y: usize, w: usize, h: usize) -> impl Iterator<Item = (usize, usize)> {
    let xs = x.saturating_sub(1)..=(x + 1).min(w - 1);
    let ys = y.saturating_sub(1)..=(y + 1).min(h - 1);
    ys.flat_map(move |ny| xs.clone().map(move |nx| (nx, ny)))
        .filter(move |&pos| pos != (x, y))
}

fn validate(w: usize, h: usize, mines: usize) -> Result<()> {
    let total = w.saturating_mul(h);
    if w == 0 || h == 0 || mines == 0 || mines >= total {
        return Err(BoardError::InvalidConfiguration {
            width: w,
            height: h,
            mines,
        });
    }
    Ok(())
}

impl Board {
    /// Build a board with `mines` mines sampled uniformly from all cells.
    /// The same seed always yields the same layout.
    pub fn new(w: usize, h: usize, mines: usize, seed: u64) -> Result<Self> {
        validate(w, h, mines)?;
        let mut rng = StdRng::seed_from_u64(seed);
        let positions: Vec<(usize, usize)> = index::sample(&mut rng, w * h, mines)
            .into_iter()
            .map(|i| (i % w, i / w))
            .collect();
        let board = Self::from_mines(w, h, &positions)?;
        debug!(w, h, mines, seed, "board generated");
        Ok(board)
    }

    /// Build a board from an explicit mine layout. Duplicate positions collapse.
    pub fn from_mines(w: usize, h: usize, positions: &[(usize, usize)]) -> Result<Self> {
        if w == 0 || h == 0 {
            return Err(BoardError::InvalidConfiguration {
                width: w,
                height: h,
                mines: positions.len(),
            });
        }
        let mut cells = vec![Cell::default(); w * h];
        for &(x, y) in positions {
            if x >= w || y >= h {
                return Err(BoardError::OutOfBounds { x, y });
            }
            cells[y * w + x].is_mine = true;
        }
        let mines = cells.iter().filter(|c| c.is_mine).count();
        validate(w, h, mines)?;

        let mut board = Board {
            w,
            h,
            mines,
            cells,
            status: GameStatus::InProgress,
            revealed: 0,
            flags: 0,
            hidden_safe: w * h - mines,
            triggered: None,
        };
        board.count_adjacent();
        Ok(board)
    }

    /// Discard the current grid and rebuild it as `new` would.
    /// The old board is kept if the new parameters are rejected.
    pub fn reset(&mut self, w: usize, h: usize, mines: usize, seed: u64) -> Result<()> {
        *self = Board::new(w, h, mines, seed)?;
        Ok(())
    }

    fn count_adjacent(&mut self) {
        for y in 0..self.h {
            for x in 0..self.w {
                let adj = self
                    .neighbors(x, y)
                    .filter(|&(nx, ny)| self.cells[ny * self.w + nx].is_mine)
                    .count() as u8;
                let idx = self.index(x, y);
                self.cells[idx].adjacent_mine_count = adj;
            }
        }
    }

    fn index(&self, x: usize, y: usize) -> usize {
        y * self.w + x
    }

    fn checked_index(&self, x: usize, y: usize) -> Result<usize> {
        if x < self.w && y < self.h {
            Ok(self.index(x, y))
        } else {
            Err(BoardError::OutOfBounds { x, y })
        }
    }

    pub fn width(&self) -> usize {
        self.w
    }

    pub fn height(&self) -> usize {
        self.h
    }

    pub fn mine_count(&self) -> usize {
        self.mines
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed
    }

    pub fn flag_count(&self) -> usize {
        self.flags
    }

    /// Mine counter for display: total mines minus placed flags.
    /// Goes negative when the player over-flags.
    pub fn remaining_mines(&self) -> isize {
        self.mines as isize - self.flags as isize
    }

    /// The mine whose reveal lost the game, if any
    pub fn triggered_mine(&self) -> Option<(usize, usize)> {
        self.triggered
    }

    pub fn cell(&self, x: usize, y: usize) -> Result<&Cell> {
        let idx = self.checked_index(x, y)?;
        Ok(&self.cells[idx])
    }

    pub fn neighbors(&self, x: usize, y: usize) -> impl Iterator<Item = (usize, usize)> + use<> {
        neighbors_of(x, y, self.w, self.h)
    }

    /// Whether the cell's content should be shown: revealed cells always,
    /// and every mine once the game is lost.
    pub fn is_exposed(&self, x: usize, y: usize) -> bool {
        self.cell(x, y).is_ok_and(|c| {
            c.state == CellState::Revealed || (self.status == GameStatus::Lost && c.is_mine)
        })
    }

    pub fn peek_solution(&self) -> Solution {
        Solution {
            width: self.w,
            mines: self.cells.iter().map(|c| c.is_mine).collect(),
        }
    }

    /// Reveal the cell at (x, y).
    /// - Flagged or revealed cells, and finished games, are left untouched
    /// - A mine ends the game
    /// - A zero cell opens its connected zero region plus the numbered border
    pub fn reveal(&mut self, x: usize, y: usize) -> Result<GameStatus> {
        let idx = self.checked_index(x, y)?;
        if self.status != GameStatus::InProgress || self.cells[idx].state != CellState::Hidden {
            return Ok(self.status);
        }

        if self.cells[idx].is_mine {
            self.cells[idx].state = CellState::Revealed;
            self.revealed += 1;
            self.triggered = Some((x, y));
            self.status = GameStatus::Lost;
            info!(x, y, "mine revealed, game lost");
            return Ok(self.status);
        }

        let opened = self.flood_reveal(x, y);
        debug!(x, y, opened, "safe reveal");

        if self.hidden_safe == 0 {
            self.status = GameStatus::Won;
            info!(revealed = self.revealed, "all safe cells revealed, game won");
        }
        Ok(self.status)
    }

    fn open(&mut self, idx: usize) {
        self.cells[idx].state = CellState::Revealed;
        self.revealed += 1;
        self.hidden_safe -= 1;
    }

    /// Work-list expansion from a safe hidden cell. A cell is pushed only on its
    /// Hidden -> Revealed transition, so nothing is visited twice.
    fn flood_reveal(&mut self, x: usize, y: usize) -> usize {
        let start = self.index(x, y);
        self.open(start);
        let mut opened = 1;
        let mut stack = vec![(x, y)];

        while let Some((cx, cy)) = stack.pop() {
            if self.cells[self.index(cx, cy)].adjacent_mine_count != 0 {
                continue;
            }
            for (nx, ny) in self.neighbors(cx, cy) {
                let n = self.index(nx, ny);
                // neighbours of a zero cell are never mines; flags stay put
                if self.cells[n].state == CellState::Hidden {
                    debug_assert!(!self.cells[n].is_mine);
                    self.open(n);
                    opened += 1;
                    stack.push((nx, ny));
                }
            }
        }

        debug_assert!(opened <= self.w * self.h);
        opened
    }

    /// Flip a hidden cell to flagged or back. Revealed cells and finished
    /// games are left alone. Returns the cell's resulting state.
    pub fn toggle_flag(&mut self, x: usize, y: usize) -> Result<CellState> {
        let idx = self.checked_index(x, y)?;
        if self.status != GameStatus::InProgress {
            return Ok(self.cells[idx].state);
        }
        let cell = &mut self.cells[idx];
        match cell.state {
            CellState::Hidden => {
                cell.state = CellState::Flagged;
                self.flags += 1;
            }
            CellState::Flagged => {
                cell.state = CellState::Hidden;
                self.flags -= 1;
            }
            CellState::Revealed => {}
        }
        Ok(cell.state)
    }
}
