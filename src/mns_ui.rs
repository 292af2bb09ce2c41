use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Span, Spans, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::{Frame, Terminal};
use std::error::Error;
use std::fmt::Debug;
use std::io;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use unicode_width::UnicodeWidthStr;

use crate::mns_board::{Board, CellState, GameStatus, Solution};
use crate::mns_color::{Depth, Palette};
use crate::mns_config::Config;
use crate::mns_error::Result as BoardResult;
use crate::mns_game::{Difficulty, Game};

/// Terminal columns per board cell; each cell is one row tall
pub const CELL_WIDTH: u16 = 2;

// Tab is "held" while press/repeat events keep arriving. Terminals that never
// report releases drop the overlay after this long without a repeat.
const PEEK_HOLD: Duration = Duration::from_millis(600);

const TICK_RATE: Duration = Duration::from_millis(200);

// (key, label) pairs shown in the top bar
const MENU_ITEMS: [(&str, &str); 6] = [
    ("1-5", "Difficulty"),
    ("R", "Restart"),
    ("Tab", "Solution"),
    ("+/-", "Size"),
    ("F", "Flag"),
    ("Esc", "Exit"),
];

/// What a single board cell looks like on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    Hidden,
    Flag,
    WrongFlag,
    Empty,
    Number(u8),
    Mine,
    Exploded,
    SolutionMine,
}

/// Decide how to draw (x, y). After a loss every mine shows and misplaced
/// flags are marked; after a win the remaining mines show as flags.
pub fn face(board: &Board, x: usize, y: usize, peek: Option<&Solution>) -> Face {
    let Ok(cell) = board.cell(x, y) else {
        return Face::Hidden;
    };
    if board.triggered_mine() == Some((x, y)) {
        return Face::Exploded;
    }
    let status = board.status();
    match cell.state {
        CellState::Revealed if cell.adjacent_mine_count == 0 => Face::Empty,
        CellState::Revealed => Face::Number(cell.adjacent_mine_count),
        CellState::Flagged if status == GameStatus::Lost && !cell.is_mine => Face::WrongFlag,
        CellState::Flagged => Face::Flag,
        CellState::Hidden if board.is_exposed(x, y) => Face::Mine,
        CellState::Hidden if status == GameStatus::Won && cell.is_mine => Face::Flag,
        CellState::Hidden if peek.is_some_and(|s| s.is_mine(x, y)) => Face::SolutionMine,
        CellState::Hidden => Face::Hidden,
    }
}

/// Map a terminal position inside the bordered board block to a cell
pub fn cell_at(board_rect: Rect, column: u16, row: u16, w: usize, h: usize) -> Option<(usize, usize)> {
    let (x0, y0) = (board_rect.x + 1, board_rect.y + 1);
    if column < x0 || row < y0 {
        return None;
    }
    let x = ((column - x0) / CELL_WIDTH) as usize;
    let y = (row - y0) as usize;
    (x < w && y < h).then_some((x, y))
}

#[derive(Debug, PartialEq, Eq)]
pub enum Action {
    Continue,
    Quit,
}

// Runtime UI variables kept between frames
#[derive(Debug, Default)]
pub struct UiState {
    peek: Option<(Solution, Instant)>, // solution overlay and when it lapses
    board_rect: Option<Rect>,
}

impl UiState {
    pub fn new() -> Self {
        UiState::default()
    }

    fn peeking(&self) -> Option<&Solution> {
        self.peek
            .as_ref()
            .filter(|(_, until)| Instant::now() < *until)
            .map(|(s, _)| s)
    }

    fn clear_peek(&mut self) {
        self.peek = None;
    }
}

// Board errors from the UI are stray input (e.g. a click on the border); log and carry on
fn report<T: Debug>(what: &str, result: BoardResult<T>) {
    match result {
        Ok(v) => debug!(action = what, outcome = ?v),
        Err(e) => debug!(action = what, error = %e, "ignored"),
    }
}

pub fn handle_key(game: &mut Game, ui: &mut UiState, key: KeyEvent) -> Action {
    if key.kind == KeyEventKind::Release {
        if key.code == KeyCode::Tab {
            ui.clear_peek();
        }
        return Action::Continue;
    }
    let pressed = key.kind == KeyEventKind::Press;

    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => return Action::Quit,
        KeyCode::Tab => ui.peek = Some((game.board().peek_solution(), Instant::now() + PEEK_HOLD)),
        KeyCode::Char('r') | KeyCode::Char('R') if pressed => {
            ui.clear_peek();
            report("restart", game.restart(Game::fresh_seed()));
        }
        KeyCode::Char(c @ '1'..='5') if pressed => {
            if let Some(d) = Difficulty::from_digit(c) {
                ui.clear_peek();
                report("select", game.select(d, Game::fresh_seed()));
            }
        }
        KeyCode::Char('+') | KeyCode::Char('=') if pressed => {
            ui.clear_peek();
            report("grow", game.resize(1, Game::fresh_seed()));
        }
        KeyCode::Char('-') if pressed => {
            ui.clear_peek();
            report("shrink", game.resize(-1, Game::fresh_seed()));
        }
        KeyCode::Left => game.step_cursor(-1, 0),
        KeyCode::Right => game.step_cursor(1, 0),
        KeyCode::Up => game.step_cursor(0, -1),
        KeyCode::Down => game.step_cursor(0, 1),
        KeyCode::Char(' ') | KeyCode::Enter => report("reveal", game.reveal_at_cursor()),
        KeyCode::Char('f') | KeyCode::Char('F') if pressed => report("flag", game.flag_at_cursor()),
        _ => {}
    }
    Action::Continue
}

pub fn handle_mouse(game: &mut Game, ui: &mut UiState, me: MouseEvent) -> Action {
    let Some(rect) = ui.board_rect else {
        return Action::Continue;
    };
    let (w, h) = (game.board().width(), game.board().height());
    let Some((x, y)) = cell_at(rect, me.column, me.row, w, h) else {
        return Action::Continue;
    };
    match me.kind {
        MouseEventKind::Moved => game.cursor = (x, y),
        MouseEventKind::Down(MouseButton::Left) => {
            game.cursor = (x, y);
            report("reveal", game.reveal(x, y));
        }
        MouseEventKind::Down(MouseButton::Right) => {
            game.cursor = (x, y);
            report("flag", game.toggle_flag(x, y));
        }
        _ => {}
    }
    Action::Continue
}

pub fn run(cfg: &Config) -> std::result::Result<(), Box<dyn Error>> {
    let mut game = Game::new(cfg.difficulty, Game::fresh_seed())?;
    let palette = Palette::new(cfg.ascii_icons, Depth::detect());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnableMouseCapture, terminal::EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // restore the terminal even when the loop fails
    let result = event_loop(&mut terminal, &mut game, cfg, &palette);
    info!(seed = game.seed(), status = ?game.status(), "session closed");

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, terminal::LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

fn event_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    game: &mut Game,
    cfg: &Config,
    palette: &Palette,
) -> std::result::Result<(), Box<dyn Error>> {
    let mut ui = UiState::new();
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| draw(f, game, &mut ui, cfg, palette))?;

        let timeout = TICK_RATE.checked_sub(last_tick.elapsed()).unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            let action = match event::read()? {
                Event::Key(key) => handle_key(game, &mut ui, key),
                Event::Mouse(me) => handle_mouse(game, &mut ui, me),
                _ => Action::Continue,
            };
            if action == Action::Quit {
                return Ok(());
            }
        }

        if last_tick.elapsed() >= TICK_RATE {
            last_tick = Instant::now();
        }
    }
}

fn draw<B: Backend>(f: &mut Frame<B>, game: &Game, ui: &mut UiState, cfg: &Config, palette: &Palette) {
    let board = game.board();
    let size = f.size();
    let board_w = (board.width() as u16) * CELL_WIDTH + 3;
    let board_h = board.height() as u16 + 2;
    let min_twidth = 60u16.max(board_w + 2);
    let min_theight = board_h + 6;
    if size.width < min_twidth || size.height < min_theight {
        let warn_lines = vec![
            Spans::from(Span::raw("Terminal size too small.")),
            Spans::from(Span::raw(format!("Minimum required: {} x {}", min_twidth, min_theight))),
        ];
        let warn = Paragraph::new(Text::from(warn_lines))
            .block(Block::default().borders(Borders::ALL).title("Resize Terminal"))
            .alignment(Alignment::Center);
        f.render_widget(Clear, size);
        let area = center_rect(40u16.min(size.width.saturating_sub(2)), 5u16.min(size.height.saturating_sub(2)), size);
        f.render_widget(warn, area);
        ui.board_rect = None;
        return;
    }

    // layout: top key row, centre board, bottom status
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([Constraint::Length(3), Constraint::Min(6), Constraint::Length(3)].as_ref())
        .split(size);

    let key_style = Style::default().fg(palette.key_fg).add_modifier(Modifier::BOLD);
    let mut spans_vec: Vec<Span> = vec![Span::raw(" ")];
    for (i, (key, label)) in MENU_ITEMS.iter().enumerate() {
        if i > 0 {
            spans_vec.push(Span::raw("   "));
        }
        spans_vec.push(Span::styled(key.to_string(), key_style));
        spans_vec.push(Span::raw(format!(": {}", label)));
    }
    let menu = Paragraph::new(Spans::from(spans_vec)).block(Block::default().borders(Borders::ALL));
    f.render_widget(menu, chunks[0]);

    // status row: counters on the left, difficulty on the right
    let state_text = match board.status() {
        GameStatus::InProgress if !game.is_running() => "Ready",
        GameStatus::InProgress => "Playing",
        GameStatus::Won => "Cleared!",
        GameStatus::Lost => "Boom!",
    };
    let left_text = format!(
        " Mines: {}   Flags: {}   Time: {}s   {}",
        board.remaining_mines(),
        board.flag_count(),
        game.elapsed().as_secs(),
        state_text
    );
    let right_text = format!(
        "{} {}x{} / {} ",
        game.difficulty().name(),
        board.width(),
        board.height(),
        board.mine_count()
    );
    let inner_w = chunks[2].width.saturating_sub(2) as usize;
    let used = left_text.as_str().width() + right_text.as_str().width();
    let mid_spaces = inner_w.saturating_sub(used).max(1);
    let status = Paragraph::new(Spans::from(vec![
        Span::raw(left_text),
        Span::raw(" ".repeat(mid_spaces)),
        Span::styled(right_text, key_style),
    ]))
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(status, chunks[2]);

    // board
    let board_area = center_rect(board_w, board_h, chunks[1]);
    ui.board_rect = Some(board_area);
    let peek = ui.peeking();
    let mut lines = vec![];
    for y in 0..board.height() {
        let mut spans = vec![];
        for x in 0..board.width() {
            let mut style = Style::default().bg(palette.board_bg);
            let glyph = match face(board, x, y, peek) {
                Face::Hidden => palette.hidden,
                Face::Flag => palette.flag,
                Face::WrongFlag => palette.wrong_flag,
                Face::SolutionMine => palette.solution,
                Face::Mine => palette.mine,
                Face::Exploded => {
                    style = style.bg(palette.exploded_bg);
                    palette.mine
                }
                Face::Empty => (" ", palette.hidden.1),
                Face::Number(n) => (DIGITS[n as usize], palette.number(n)),
            };
            style = style.fg(glyph.1);
            if game.cursor == (x, y) && board.status() == GameStatus::InProgress {
                style = style.bg(palette.cursor_bg);
            }
            if cfg.show_indicator && game.cursor == (x, y) {
                let indicator_style = style.fg(palette.indicator.1).add_modifier(Modifier::BOLD);
                spans.push(Span::styled(palette.indicator.0, indicator_style));
                spans.push(Span::styled(glyph.0, style));
            } else {
                spans.push(Span::styled(format!(" {}", glyph.0), style));
            }
        }
        // one-column pad so the right edge shares the board background
        spans.push(Span::styled(" ", Style::default().bg(palette.board_bg)));
        lines.push(Spans::from(spans));
    }
    let title = if peek.is_some() { "Solution" } else { game.difficulty().name() };
    let paragraph = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title(title).title_alignment(Alignment::Center));
    f.render_widget(paragraph, board_area);

    // end-of-game banner
    let banner = match board.status() {
        GameStatus::InProgress => None,
        GameStatus::Won => Some(("Victory", format!("All mines cleared in {}s!", game.elapsed().as_secs()))),
        GameStatus::Lost => Some(("Failure", "Mine exploded, you lose!".to_string())),
    };
    if let Some((title, message)) = banner {
        let area = bottom_centered_block(44, 6, chunks[1]);
        f.render_widget(Clear, area);
        let lines = vec![
            Spans::from(Span::raw("")),
            Spans::from(Span::raw(message)),
            Spans::from(Span::raw("R: New game   1-5: Difficulty")),
        ];
        let p = Paragraph::new(Text::from(lines))
            .block(Block::default().borders(Borders::ALL).title(title))
            .alignment(Alignment::Center);
        f.render_widget(p, area);
    }
}

const DIGITS: [&str; 9] = ["0", "1", "2", "3", "4", "5", "6", "7", "8"];

fn center_rect(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn bottom_centered_block(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + r.height.saturating_sub(height);
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}
