//! Terminal stand-in for the LED panel and the IR remote.

use std::io::{self, Stdout, Write};
use std::time::Duration;

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, QueueableCommand};
use tracing::warn;
use unicode_width::UnicodeWidthStr;

use led_arcade::display::{FrameBuffer, Rgb24, Surface};
use led_arcade::error::Result;
use led_arcade::input::{Command, InputSource};

/// Terminal columns per LED.
const CELL_W: usize = 2;
const LED: &str = "  ";

/// Truncates or pads `text` to exactly `width` terminal columns. A wide
/// glyph that would straddle the edge is dropped.
pub fn fit_to_width(text: &str, width: usize) -> String {
    let mut fitted = String::with_capacity(width);
    let mut used = 0;
    for ch in text.chars() {
        let mut buf = [0u8; 4];
        let w = UnicodeWidthStr::width(&*ch.encode_utf8(&mut buf));
        if used + w > width {
            break;
        }
        fitted.push(ch);
        used += w;
    }
    fitted.extend(std::iter::repeat(' ').take(width - used));
    fitted
}

/// Raw mode and the alternate screen for as long as it lives.
pub struct TerminalGuard;

impl TerminalGuard {
    pub fn enter() -> Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen, Hide)?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        restore();
    }
}

/// Best effort; also called from the panic hook.
pub fn restore() {
    let _ = execute!(io::stdout(), ResetColor, Show, LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
}

/// Redraws only the LEDs that changed since the last frame.
pub struct Renderer {
    width: usize,
    height: usize,
    last: Vec<Option<Rgb24>>,
    last_status: String,
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
}

impl Renderer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            last: vec![None; width * height],
            last_status: String::new(),
            needs_full: true,
            origin_x: 0,
            origin_y: 1,
        }
    }

    fn recenter(&mut self) -> Result<()> {
        let (term_w, term_h) = terminal::size()?;
        let needed_w = (self.width * CELL_W) as u16;
        let needed_h = self.height as u16 + 1;
        let origin_x = term_w.saturating_sub(needed_w) / 2;
        let origin_y = term_h.saturating_sub(needed_h) / 2 + 1;
        if (origin_x, origin_y) != (self.origin_x, self.origin_y) {
            self.origin_x = origin_x;
            self.origin_y = origin_y;
            self.needs_full = true;
        }
        Ok(())
    }

    pub fn render(&mut self, out: &mut Stdout, frame: &FrameBuffer, status: &str) -> Result<()> {
        self.recenter()?;
        if self.needs_full {
            out.queue(Clear(ClearType::All))?;
        }

        if self.needs_full || status != self.last_status {
            out.queue(MoveTo(self.origin_x, self.origin_y - 1))?;
            out.queue(Clear(ClearType::CurrentLine))?;
            out.queue(SetForegroundColor(Color::White))?;
            out.queue(Print(fit_to_width(status, self.width * CELL_W)))?;
            out.queue(ResetColor)?;
            self.last_status = status.to_string();
        }

        for y in 0..self.height.min(frame.height()) {
            for x in 0..self.width.min(frame.width()) {
                let color = frame.get_pixel(x, y);
                let idx = y * self.width + x;
                if self.needs_full || self.last[idx] != Some(color) {
                    self.last[idx] = Some(color);
                    self.draw_led(out, x, y, color)?;
                }
            }
        }
        self.needs_full = false;

        out.flush()?;
        Ok(())
    }

    fn draw_led(&self, out: &mut Stdout, x: usize, y: usize, color: Rgb24) -> Result<()> {
        let x_pos = self.origin_x + (x * CELL_W) as u16;
        let y_pos = self.origin_y + y as u16;
        out.queue(MoveTo(x_pos, y_pos))?;
        out.queue(SetBackgroundColor(Color::Rgb {
            r: color.r,
            g: color.g,
            b: color.b,
        }))?;
        out.queue(Print(LED))?;
        out.queue(ResetColor)?;
        Ok(())
    }
}

/// Keyboard standing in for the remote. Auto-repeat becomes `Held`.
#[derive(Debug, Default)]
pub struct KeyInput;

impl KeyInput {
    pub fn new() -> Self {
        Self
    }

    fn read(&mut self) -> Result<Option<Command>> {
        while event::poll(Duration::from_millis(0))? {
            if let Event::Key(key) = event::read()? {
                if let Some(command) = map_key(key) {
                    return Ok(Some(command));
                }
            }
        }
        Ok(None)
    }
}

impl InputSource for KeyInput {
    fn poll_command(&mut self) -> Option<Command> {
        match self.read() {
            Ok(command) => command,
            Err(err) => {
                warn!(%err, "reading terminal input failed");
                None
            }
        }
    }
}

pub fn map_key(key: KeyEvent) -> Option<Command> {
    let command = match key.code {
        KeyCode::Up | KeyCode::Char('k') => Command::Up,
        KeyCode::Down | KeyCode::Char('j') => Command::Down,
        KeyCode::Left | KeyCode::Char('h') => Command::Left,
        KeyCode::Right | KeyCode::Char('l') => Command::Right,
        KeyCode::Enter | KeyCode::Char(' ') => Command::Select,
        KeyCode::Esc | KeyCode::Char('q') => Command::Home,
        KeyCode::Char('a') => Command::A,
        KeyCode::Char('b') => Command::B,
        KeyCode::Char('c') => Command::C,
        _ => return None,
    };
    match key.kind {
        KeyEventKind::Press => Some(command),
        KeyEventKind::Repeat => Some(Command::Held),
        KeyEventKind::Release => None,
    }
}
