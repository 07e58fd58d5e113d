/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Compose the next frame into the `front` buffer
///   2. Compare each cell with the `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// One tile is two terminal columns by one row. The actor is drawn in the
/// tile that contains its centre.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    terminal::{self, Clear, ClearType},
};

use crate::domain::entity::DashPhase;
use crate::domain::tile::Tile;
use crate::sim::session::{GameSession, GameState};

// ── Palette ──

const BASE_BG: Color = Color::Rgb { r: 18, g: 18, b: 18 };
const WALL: Color = Color::Rgb { r: 35, g: 70, b: 95 };
const SPIKE: Color = Color::Rgb { r: 220, g: 70, b: 70 };
const GOAL: Color = Color::Rgb { r: 80, g: 200, b: 120 };
const SPAWN: Color = Color::Rgb { r: 60, g: 90, b: 130 };
const HUD_BG: Color = Color::Rgb { r: 30, g: 30, b: 50 };
const TITLE: Color = Color::Rgb { r: 255, g: 200, b: 50 };

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: BASE_BG };

    /// Never equal to a composed cell; forces a full repaint.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }

    /// Write `s` horizontally centred on row `y`.
    fn put_centered(&mut self, y: usize, s: &str, fg: Color) {
        let x = self.width.saturating_sub(s.chars().count()) / 2;
        self.put_str(x, y, s, fg, BASE_BG);
    }
}

// ── Renderer ──

/// Terminal columns per tile.
const CELL_W: usize = 2;

const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    last_state: Option<GameState>,
    /// Terminal accepted the keyboard enhancement flags (reports releases).
    key_release: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            last_state: None,
            key_release: false,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(BASE_BG),
            Clear(ClearType::All)
        )?;
        self.sync_size()?;

        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            self.key_release = execute!(
                self.writer,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )
            .is_ok();
        }
        log::info!("terminal key release reporting: {}", self.key_release);
        Ok(())
    }

    pub fn reports_key_release(&self) -> bool {
        self.key_release
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        if self.key_release {
            execute!(self.writer, PopKeyboardEnhancementFlags)?;
            self.key_release = false;
        }
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    /// Track terminal size; any change invalidates the back buffer.
    fn sync_size(&mut self) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        let (tw, th) = (tw as usize, th as usize);
        if tw != self.front.width || th != self.front.height {
            self.front.resize(tw, th);
            self.back.resize(tw, th);
            self.invalidate()?;
        }
        Ok(())
    }

    fn invalidate(&mut self) -> io::Result<()> {
        self.back.cells.fill(Cell::INVALID);
        queue!(self.writer, SetBackgroundColor(BASE_BG), Clear(ClearType::All))
    }

    pub fn render(&mut self, session: &GameSession) -> io::Result<()> {
        self.sync_size()?;

        if self.last_state != Some(session.state) {
            self.invalidate()?;
            self.last_state = Some(session.state);
        }

        self.front.clear();
        compose(&mut self.front, session);
        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }

                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }
}

// ── Compose: build front buffer content ──

fn compose(buf: &mut FrameBuffer, s: &GameSession) {
    match s.state {
        GameState::Start => compose_start(buf),
        GameState::Play => compose_play(buf, s),
        GameState::Win => compose_win(buf, s),
    }
}

fn compose_start(buf: &mut FrameBuffer) {
    let top = buf.height.saturating_sub(9) / 2;
    buf.put_centered(top, "D A S H L I T E", TITLE);
    buf.put_centered(top + 3, "Move: A/D or \u{2190}/\u{2192}", Color::White);
    buf.put_centered(top + 4, "Jump: SPACE / W / \u{2191}   Dash: K / X / J", Color::White);
    buf.put_centered(top + 5, "Restart: R   Quit: ESC / Q", Color::DarkGrey);
    buf.put_centered(top + 7, "Press ENTER (or SPACE) to start", GOAL);
}

fn compose_win(buf: &mut FrameBuffer, s: &GameSession) {
    let top = buf.height.saturating_sub(6) / 2;
    buf.put_centered(top, "YOU WIN!", TITLE);
    let msg = format!("You cleared all {} levels.", s.level_count());
    buf.put_centered(top + 2, &msg, Color::White);
    buf.put_centered(top + 4, "Press R to restart", GOAL);
}

fn compose_play(buf: &mut FrameBuffer, s: &GameSession) {
    // ── HUD row ──
    let dash = if s.can_dash() { "READY" } else { "USED" };
    let hud = format!(
        " Level {}/{}  {}   Dash: {} ",
        s.current_level + 1, s.level_count(), s.level_name(), dash,
    );
    buf.fill_row(HUD_ROW, HUD_BG);
    buf.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);

    // ── Map ──
    for (r, c, tile) in s.grid.cells() {
        let (glyph, fg, bg) = tile_glyph(tile);
        let (x, y) = (c * CELL_W, MAP_ROW + r);
        buf.set(x, y, Cell::new(glyph[0], fg, bg));
        buf.set(x + 1, y, Cell::new(glyph[1], fg, bg));
    }

    // ── Actor ──
    if let Some((r, c)) = actor_cell(s) {
        let fg = match s.actor.dash_phase() {
            DashPhase::Dashing => Color::Cyan,
            DashPhase::AirborneSpent => Color::Rgb { r: 120, g: 120, b: 160 },
            DashPhase::GroundedArmed | DashPhase::AirborneArmed => Color::White,
        };
        let (x, y) = (c * CELL_W, MAP_ROW + r);
        let bg = buf.get(x, y).bg;
        buf.set(x, y, Cell::new('\u{2588}', fg, bg));
        buf.set(x + 1, y, Cell::new('\u{2588}', fg, bg));
    }

    let (rows, _) = s.grid.dimensions();
    buf.put_str(0, MAP_ROW + rows + 1, " R: restart   ESC: quit", Color::DarkGrey, BASE_BG);
}

fn tile_glyph(tile: Tile) -> ([char; 2], Color, Color) {
    match tile {
        Tile::Solid => ([' ', ' '], WALL, WALL),
        Tile::Hazard => (['\u{25b2}', '\u{25b2}'], SPIKE, BASE_BG),
        Tile::Goal => (['[', ']'], GOAL, BASE_BG),
        Tile::Spawn => (['\u{00b7}', '\u{00b7}'], SPAWN, BASE_BG),
        Tile::Empty => ([' ', ' '], Color::White, BASE_BG),
    }
}

/// Grid cell (row, col) containing the actor's centre, if on the map.
fn actor_cell(s: &GameSession) -> Option<(usize, usize)> {
    let ts = s.grid.tile_size();
    let a = &s.actor;
    let cx = ((a.x + a.w / 2.0) / ts).floor();
    let cy = ((a.y + a.h / 2.0) / ts).floor();
    if !cx.is_finite() || !cy.is_finite() || cx < 0.0 || cy < 0.0 {
        return None;
    }
    let (row, col) = (cy as i64, cx as i64);
    s.grid.in_bounds(row, col).then_some((row as usize, col as usize))
}
