use std::io::{self, Write};
use log::info;
use crossterm::{
    cursor::MoveTo,
    execute,
    style::{Color, SetBackgroundColor},
};

use crate::types::{PlayfieldBounds, Vector2D};

pub const BACKGROUND: Color = Color::Green;

// --- ScreenBuffer for headless rendering ---
pub struct ScreenBuffer {
    pub buffer: Vec<Vec<char>>,
    pub width: u16,
    pub height: u16,
    pub cursor_x: u16,
    pub cursor_y: u16,
}

impl ScreenBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        ScreenBuffer {
            buffer: vec![vec![' '; width as usize]; height as usize],
            width,
            height,
            cursor_x: 0,
            cursor_y: 0,
        }
    }

    pub fn move_to(&mut self, x: u16, y: u16) {
        self.cursor_x = x;
        self.cursor_y = y;
    }

    pub fn write_char(&mut self, c: char) {
        if self.cursor_y < self.height && self.cursor_x < self.width {
            self.buffer[self.cursor_y as usize][self.cursor_x as usize] = c;
        }
    }

    pub fn write_str(&mut self, s: &str) {
        for c in s.chars() {
            self.write_char(c);
            self.cursor_x = self.cursor_x.saturating_add(1);
        }
    }

    pub fn row(&self, y: u16) -> String {
        self.buffer
            .get(y as usize)
            .map(|row| row.iter().collect())
            .unwrap_or_default()
    }

    pub fn print_to_log(&self) {
        info!("--- Screen Buffer ---");
        for row in &self.buffer {
            info!("{}", row.iter().collect::<String>());
        }
        info!("---------------------");
    }
}

impl Write for ScreenBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let s = String::from_utf8_lossy(buf);
        self.write_str(&s);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// --- OutputTarget: the real terminal or a ScreenBuffer ---
pub enum OutputTarget {
    Stdout(io::Stdout),
    ScreenBuffer(ScreenBuffer),
}

impl OutputTarget {
    pub fn execute_move_to(&mut self, command: MoveTo) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => execute!(s, command),
            OutputTarget::ScreenBuffer(sb) => {
                sb.move_to(command.0, command.1);
                Ok(())
            },
        }
    }

    pub fn execute_other_command(&mut self, command: impl crossterm::Command) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => execute!(s, command),
            OutputTarget::ScreenBuffer(_) => Ok(()), // No terminal state to change
        }
    }

    pub fn set_background(&mut self, color: Color) -> io::Result<()> {
        self.execute_other_command(SetBackgroundColor(color))
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            OutputTarget::Stdout(s) => s.write(buf),
            OutputTarget::ScreenBuffer(sb) => sb.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => s.flush(),
            OutputTarget::ScreenBuffer(sb) => sb.flush(),
        }
    }
}

// --- World-to-cell mapping ---

/// Scales the playfield onto a `width` x `height` character grid. World y grows
/// upwards, rows grow downwards.
#[derive(Clone, Copy, Debug)]
pub struct Viewport {
    pub bounds: PlayfieldBounds,
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(bounds: PlayfieldBounds, width: u16, height: u16) -> Self {
        Viewport { bounds, width, height }
    }

    pub fn to_cell(&self, position: Vector2D) -> Option<(u16, u16)> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        let fx = (position.x - self.bounds.x_min) / self.bounds.width();
        let fy = (self.bounds.y_max - position.y) / self.bounds.height();
        if !(0.0..=1.0).contains(&fx) || !(0.0..=1.0).contains(&fy) {
            return None;
        }
        let x = (fx * (self.width - 1) as f64).round() as u16;
        let y = (fy * (self.height - 1) as f64).round() as u16;
        Some((x, y))
    }
}

// --- GameGrid: one frame of world sprites ---
pub struct GameGrid {
    pub grid: Vec<Vec<char>>,
    pub viewport: Viewport,
}

impl GameGrid {
    pub fn new(bounds: PlayfieldBounds, width: u16, height: u16) -> Self {
        GameGrid {
            grid: vec![vec![' '; width as usize]; height as usize],
            viewport: Viewport::new(bounds, width, height),
        }
    }

    pub fn width(&self) -> u16 {
        self.viewport.width
    }

    pub fn height(&self) -> u16 {
        self.viewport.height
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.viewport = Viewport::new(self.viewport.bounds, width, height);
        self.clear();
    }

    pub fn set_char(&mut self, x: u16, y: u16, c: char) {
        if y < self.height() && x < self.width() {
            self.grid[y as usize][x as usize] = c;
        }
    }

    pub fn char_at(&self, x: u16, y: u16) -> Option<char> {
        self.grid.get(y as usize).and_then(|row| row.get(x as usize)).copied()
    }

    /// Positions outside the playfield are not drawn.
    pub fn set_world_char(&mut self, position: Vector2D, c: char) {
        if let Some((x, y)) = self.viewport.to_cell(position) {
            self.set_char(x, y, c);
        }
    }

    pub fn clear(&mut self) {
        self.grid = vec![vec![' '; self.width() as usize]; self.height() as usize];
    }

    pub fn render(&self, stdout: &mut OutputTarget) -> io::Result<()> {
        for y in 0..self.height() {
            stdout.execute_move_to(MoveTo(0, y))?;
            write!(stdout, "{}", self.grid[y as usize].iter().collect::<String>())?;
        }
        Ok(())
    }

    pub fn clear_screen_manual(&self, stdout: &mut OutputTarget) -> io::Result<()> {
        for y in 0..self.height() {
            stdout.execute_move_to(MoveTo(0, y))?;
            write!(stdout, "{}", " ".repeat(self.width() as usize))?;
        }
        stdout.execute_move_to(MoveTo(0, 0))?;
        Ok(())
    }
}

// --- ScoreBoard: the always-visible score text ---
pub struct ScoreBoard {
    pub anchor: Vector2D,
    pub text: String,
    clear_width: usize,
}

impl ScoreBoard {
    pub fn new(anchor: Vector2D) -> Self {
        ScoreBoard { anchor, text: String::new(), clear_width: 0 }
    }

    /// Replaces the whole text; nothing of the previous value is kept.
    pub fn write_score(&mut self, score: i32) {
        self.text = format!("Score: {}", score);
        self.clear_width = self.clear_width.max(self.text.chars().count());
    }

    pub fn render(&self, viewport: &Viewport, stdout: &mut OutputTarget) -> io::Result<()> {
        let (x, y) = viewport.to_cell(self.anchor).unwrap_or((0, 0));
        // Blank out the widest text ever shown so a shorter value leaves nothing behind.
        stdout.execute_move_to(MoveTo(x, y))?;
        write!(stdout, "{}", " ".repeat(self.clear_width))?;
        stdout.execute_move_to(MoveTo(x, y))?;
        write!(stdout, "{}", self.text)?;
        Ok(())
    }
}
