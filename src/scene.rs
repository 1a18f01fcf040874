// SPDX-License-Identifier: MIT
//
// The star field scene — state, keys, simulation step, drawing.
//
// Layout for a terminal of `cols × rows`:
//
//   row 0 .. rows-3   white frame around the field
//   row rows-2        help text
//   row rows-1        info bar
//
// The field is the frame's interior, `(cols-2) × (rows-4)` cells. Stars live
// in field coordinates and drift left, one column per step; faint stars move
// every other step for a bit of parallax. New stars appear in the rightmost
// column. A step happens every `interval` frames.

use cell_term::{Bg, Cell, Color, Fg, RenderSession, Screen, Size};

/// Smallest terminal the scene can be laid out in.
pub const MIN_SIZE: Size = Size { cols: 40, rows: 20 };

/// Slowest scroll speed (frames per step).
pub const MAX_INTERVAL: u32 = 30;

const DEFAULT_INTERVAL: u32 = 3;

/// Percent chance per row and step that a star spawns.
const SPAWN_PERCENT: u32 = 4;

const FRAME: Cell = Cell::styled(' ', Fg::new(Color::White), Bg::new(Color::White));
const BRIGHT_STAR: Cell = Cell::styled('*', Fg::new(Color::White).bright().bold(), Bg::DEFAULT);
const FAINT_STAR: Cell = Cell::styled('.', Fg::new(Color::Cyan), Bg::DEFAULT);
const INFO: Fg = Fg::new(Color::White);
const HELP: Fg = Fg::new(Color::Yellow);

// ─── Canvas ──────────────────────────────────────────────────────────────────

/// Anything the scene can be drawn onto.
pub trait Canvas {
    fn put(&mut self, x: u16, y: u16, cell: Cell);
    fn text(&mut self, x: u16, y: u16, text: &str, fg: Fg, bg: Bg);
}

impl Canvas for Screen {
    fn put(&mut self, x: u16, y: u16, cell: Cell) {
        self.set_cell(x, y, cell);
    }

    fn text(&mut self, x: u16, y: u16, text: &str, fg: Fg, bg: Bg) {
        self.set_string(x, y, text, fg, bg);
    }
}

impl Canvas for RenderSession {
    fn put(&mut self, x: u16, y: u16, cell: Cell) {
        self.set_cell(x, y, cell);
    }

    fn text(&mut self, x: u16, y: u16, text: &str, fg: Fg, bg: Bg) {
        self.set_string(x, y, text, fg, bg);
    }
}

// ─── Rng ─────────────────────────────────────────────────────────────────────

/// Linear congruential generator (Numerical Recipes constants).
#[derive(Debug, Clone)]
pub struct Rng {
    state: u32,
}

impl Rng {
    #[must_use]
    pub const fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    pub const fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        self.state
    }

    /// Uniform-ish value in `[0, max)`. `max` must be positive.
    pub const fn below(&mut self, max: u32) -> u32 {
        (self.next_u32() >> 8) % max
    }
}

// ─── Scene ───────────────────────────────────────────────────────────────────

/// What the main loop should do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Redraw,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Star {
    x: u16,
    y: u16,
    bright: bool,
}

#[derive(Debug)]
pub struct Scene {
    term: Size,
    stars: Vec<Star>,
    frame: u64,
    steps: u64,
    interval: u32,
    last_key: Option<u8>,
    rng: Rng,
}

impl Scene {
    /// A scene for a terminal of `term` cells, which must fit [`MIN_SIZE`].
    #[must_use]
    pub fn new(term: Size, seed: u32) -> Self {
        debug_assert!(term.fits(MIN_SIZE));
        Self {
            term,
            stars: Vec::new(),
            frame: 0,
            steps: 0,
            interval: DEFAULT_INTERVAL,
            last_key: None,
            rng: Rng::new(seed),
        }
    }

    /// Field dimensions (interior of the frame).
    #[must_use]
    pub const fn field(&self) -> Size {
        Size {
            cols: self.term.cols - 2,
            rows: self.term.rows - 4,
        }
    }

    #[must_use]
    pub const fn interval(&self) -> u32 {
        self.interval
    }

    #[must_use]
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    #[must_use]
    pub fn star_count(&self) -> usize {
        self.stars.len()
    }

    /// Follow a terminal resize. Stars outside the new field are dropped.
    pub fn resize(&mut self, term: Size) {
        if term == self.term {
            return;
        }
        debug_assert!(term.fits(MIN_SIZE));
        self.term = term;
        let field = self.field();
        self.stars.retain(|s| s.x < field.cols && s.y < field.rows);
    }

    pub fn handle_key(&mut self, key: u8) -> Action {
        self.last_key = Some(key);
        match key {
            b'q' | b'Q' => Action::Quit,
            b'r' | b'R' => Action::Redraw,
            b'+' => {
                self.interval = self.interval.saturating_sub(1).max(1);
                Action::Continue
            }
            b'-' => {
                self.interval = (self.interval + 1).min(MAX_INTERVAL);
                Action::Continue
            }
            _ => Action::Continue,
        }
    }

    /// Advance one frame, stepping the simulation every `interval` frames.
    pub fn tick(&mut self) {
        self.frame += 1;
        if self.frame % u64::from(self.interval.max(1)) == 0 {
            self.step();
        }
    }

    fn step(&mut self) {
        self.steps += 1;
        let odd = self.steps % 2 == 1;

        self.stars.retain_mut(|s| {
            if s.bright || odd {
                if s.x == 0 {
                    return false;
                }
                s.x -= 1;
            }
            true
        });

        let field = self.field();
        for y in 0..field.rows {
            if self.rng.below(100) < SPAWN_PERCENT {
                let bright = self.rng.below(3) == 0;
                self.stars.push(Star {
                    x: field.cols - 1,
                    y,
                    bright,
                });
            }
        }
    }

    /// Draw the whole scene. The canvas is expected to be cleared and sized
    /// to the terminal.
    pub fn draw(&self, canvas: &mut impl Canvas) {
        self.draw_frame(canvas);

        for s in &self.stars {
            let cell = if s.bright { BRIGHT_STAR } else { FAINT_STAR };
            canvas.put(s.x + 1, s.y + 1, cell);
        }

        let key = match self.last_key {
            Some(k) if k.is_ascii_graphic() => format!("'{}'", char::from(k)),
            Some(k) => format!("0x{k:02x}"),
            None => "-".to_owned(),
        };
        let info = format!(
            "FRAME: {}    SIZE: {}    SPEED: 1/{}    STARS: {}    KEY: {key}",
            self.frame,
            self.term,
            self.interval,
            self.stars.len()
        );
        canvas.text(0, self.term.rows - 1, &info, INFO, Bg::DEFAULT);
        canvas.text(
            0,
            self.term.rows - 2,
            "q quit   r redraw   + faster   - slower",
            HELP,
            Bg::DEFAULT,
        );
    }

    fn draw_frame(&self, canvas: &mut impl Canvas) {
        let right = self.term.cols - 1;
        let bottom = self.term.rows - 3;
        for x in 0..=right {
            canvas.put(x, 0, FRAME);
            canvas.put(x, bottom, FRAME);
        }
        for y in 0..=bottom {
            canvas.put(0, y, FRAME);
            canvas.put(right, y, FRAME);
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TERM: Size = Size { cols: 40, rows: 20 };

    fn session_for(term: Size) -> RenderSession {
        RenderSession::new(term.cols, term.rows).unwrap()
    }

    fn row_text(session: &RenderSession, y: u16) -> String {
        session.desired().row(y).unwrap().iter().map(|c| c.ch).collect()
    }

    // ── Keys ────────────────────────────────────────────────────────────

    #[test]
    fn quit_and_redraw_keys() {
        let mut scene = Scene::new(TERM, 7);
        assert_eq!(scene.handle_key(b'q'), Action::Quit);
        assert_eq!(scene.handle_key(b'r'), Action::Redraw);
        assert_eq!(scene.handle_key(b'x'), Action::Continue);
    }

    #[test]
    fn speed_is_clamped() {
        let mut scene = Scene::new(TERM, 7);
        for _ in 0..100 {
            scene.handle_key(b'+');
        }
        assert_eq!(scene.interval(), 1);
        for _ in 0..100 {
            scene.handle_key(b'-');
        }
        assert_eq!(scene.interval(), MAX_INTERVAL);
    }

    // ── Simulation ──────────────────────────────────────────────────────

    #[test]
    fn fastest_speed_steps_every_frame() {
        let mut scene = Scene::new(TERM, 7);
        while scene.interval() > 1 {
            scene.handle_key(b'+');
        }
        for _ in 0..50 {
            scene.tick();
        }
        assert_eq!(scene.steps, 50);
    }

    #[test]
    fn default_speed_steps_every_third_frame() {
        let mut scene = Scene::new(TERM, 7);
        for _ in 0..9 {
            scene.tick();
        }
        assert_eq!(scene.frame(), 9);
        assert_eq!(scene.steps, 3);
    }

    #[test]
    fn stars_stay_inside_the_field() {
        let mut scene = Scene::new(TERM, 12_345);
        for _ in 0..2_000 {
            scene.tick();
        }
        let field = scene.field();
        assert!(scene.star_count() > 0);
        assert!(scene.stars.iter().all(|s| s.x < field.cols && s.y < field.rows));
    }

    #[test]
    fn shrinking_drops_outside_stars() {
        let mut scene = Scene::new(Size { cols: 80, rows: 40 }, 99);
        for _ in 0..600 {
            scene.tick();
        }
        scene.resize(TERM);
        let field = scene.field();
        assert!(scene.stars.iter().all(|s| s.x < field.cols && s.y < field.rows));
    }

    // ── Drawing ─────────────────────────────────────────────────────────

    #[test]
    fn frame_surrounds_field() {
        let scene = Scene::new(TERM, 1);
        let mut session = session_for(TERM);
        scene.draw(&mut session);

        let g = session.desired();
        assert_eq!(*g.get(0, 0).unwrap(), FRAME);
        assert_eq!(*g.get(39, 17).unwrap(), FRAME);
        assert_eq!(*g.get(0, 17).unwrap(), FRAME);
        assert_eq!(*g.get(1, 1).unwrap(), Cell::DEFAULT);
        assert_eq!(*g.get(38, 16).unwrap(), Cell::DEFAULT);
    }

    #[test]
    fn info_bar_and_help_rows() {
        let mut scene = Scene::new(TERM, 1);
        scene.handle_key(b'x');
        scene.tick();
        let mut session = session_for(TERM);
        scene.draw(&mut session);

        let info = row_text(&session, 19);
        assert!(info.starts_with("FRAME: 1    SIZE: 40x20"), "{info}");
        assert!(row_text(&session, 18).starts_with("q quit"));
    }

    #[test]
    fn non_printable_key_is_shown_in_hex() {
        let mut scene = Scene::new(Size { cols: 120, rows: 20 }, 1);
        scene.handle_key(0x1b);
        let mut session = session_for(Size { cols: 120, rows: 20 });
        scene.draw(&mut session);
        assert!(row_text(&session, 19).contains("KEY: 0x1b"));
    }

    #[test]
    fn stars_are_drawn_offset_by_frame() {
        let mut scene = Scene::new(TERM, 1);
        scene.stars.push(Star { x: 0, y: 0, bright: true });
        let mut session = session_for(TERM);
        scene.draw(&mut session);
        assert_eq!(*session.desired().get(1, 1).unwrap(), BRIGHT_STAR);
    }

    #[test]
    fn steady_scene_flushes_nothing_new() {
        let scene = Scene::new(TERM, 1);
        let mut session = session_for(TERM);
        let mut out = Vec::new();

        scene.draw(&mut session);
        session.flush_to(&mut out).unwrap();

        session.clear_default();
        scene.draw(&mut session);
        let stats = session.flush_to(&mut out).unwrap();
        assert_eq!(stats.cells_rendered, 0);
    }

    #[test]
    fn rng_is_deterministic() {
        let mut a = Rng::new(42);
        let mut b = Rng::new(42);
        for _ in 0..10 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
        assert!(Rng::new(0).below(10) < 10);
    }
}
