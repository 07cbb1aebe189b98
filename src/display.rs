use crate::error::MachineError;
use std::io;
use tui::backend::CrosstermBackend;
use tui::layout::Rect;
use tui::style::{Color, Style};
use tui::symbols::Marker;
use tui::widgets::canvas::{Canvas, Points};
use tui::widgets::{Block, Borders};
use tui::Terminal;

pub const CHIP8_DISPLAY_WIDTH: usize = 64;
pub const CHIP8_DISPLAY_HEIGHT: usize = 32;

/// Display is used by the interpreter to draw things on the screen. It should
/// abstract the implementation details, so a variety of kinds of screen would
/// work.
pub trait Display {
    /// turn every pixel off
    fn clear(&mut self);

    /// XOR `bit` into the pixel at (x, y); true if that turned a lit pixel
    /// off. Coordinates past the edge wrap round to the other side.
    fn draw_pixel(&mut self, x: usize, y: usize, bit: bool) -> bool;

    /// push the current frame out to whatever is showing it
    fn present(&mut self) -> Result<(), io::Error> {
        Ok(())
    }
}

// store useful metadata about the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Resolution(usize, usize);

impl Resolution {
    fn pixel_count(&self) -> usize {
        self.0 * self.1
    }
    /// rounded up, so a partial last byte still has room
    fn byte_count(&self) -> usize {
        (self.pixel_count() + 7) / 8
    }

    fn x_bounds(&self) -> [f64; 2] {
        [0.0, (self.0 - 1) as f64]
    }

    fn y_bounds(&self) -> [f64; 2] {
        [-1.0 * (self.1 - 1) as f64, 0.0]
    }

    /// bit offset of (x, y), wrapping both axes
    fn offset(&self, x: usize, y: usize) -> usize {
        (y % self.1) * self.0 + (x % self.0)
    }
}

/// Packed one-bit-per-pixel framebuffer, MSB leftmost, rows top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    resolution: Resolution,
    data: Vec<u8>,
    dirty: bool,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::with_resolution(Resolution(CHIP8_DISPLAY_WIDTH, CHIP8_DISPLAY_HEIGHT))
    }
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Result<Self, MachineError> {
        if width == 0 || height == 0 {
            return Err(MachineError::InvalidConfig(format!(
                "display must be at least 1x1, got {}x{}",
                width, height
            )));
        }
        Ok(Self::with_resolution(Resolution(width, height)))
    }

    fn with_resolution(resolution: Resolution) -> Self {
        FrameBuffer {
            resolution,
            data: vec![0; resolution.byte_count()],
            dirty: true,
        }
    }

    pub fn width(&self) -> usize {
        self.resolution.0
    }

    pub fn height(&self) -> usize {
        self.resolution.1
    }

    pub fn get(&self, x: usize, y: usize) -> bool {
        let bit = self.resolution.offset(x, y);
        self.data[bit / 8] & (0x80 >> (bit % 8)) != 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn lit_count(&self) -> usize {
        self.data.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// true once after anything changed
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    /// (x, y) of every pixel that is `lit`, with y pointing down the canvas
    fn bitplane(&self, lit: bool) -> impl Iterator<Item = (f64, f64)> + '_ {
        let w = self.resolution.0;
        (0..self.resolution.pixel_count()).filter_map(move |count| {
            let on = self.data[count / 8] & (0x80 >> (count % 8)) != 0;
            if on == lit {
                Some((
                    (count % w) as f64,        // x
                    -1.0 * (count / w) as f64, // y
                ))
            } else {
                None
            }
        })
    }
}

impl Display for FrameBuffer {
    fn clear(&mut self) {
        self.data.iter_mut().for_each(|b| *b = 0);
        self.dirty = true;
    }

    fn draw_pixel(&mut self, x: usize, y: usize, bit: bool) -> bool {
        if !bit {
            return false;
        }
        let offset = self.resolution.offset(x, y);
        let mask = 0x80 >> (offset % 8);
        let byte = &mut self.data[offset / 8];
        let collision = *byte & mask != 0;
        *byte ^= mask;
        self.dirty = true;
        collision
    }
}

/// monochrome display in a terminal, rendered using TUI and Crossterm
pub struct MonoTermDisplay {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    frame: FrameBuffer,
}

impl MonoTermDisplay {
    pub fn new(x: usize, y: usize) -> Result<MonoTermDisplay, MachineError> {
        let frame = FrameBuffer::new(x, y)?;
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;
        Ok(MonoTermDisplay {
            terminal,
            frame,
        })
    }

    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }
}

impl Display for MonoTermDisplay {
    fn clear(&mut self) {
        self.frame.clear()
    }

    fn draw_pixel(&mut self, x: usize, y: usize, bit: bool) -> bool {
        self.frame.draw_pixel(x, y, bit)
    }

    /// redraws only if the frame changed since last time
    fn present(&mut self) -> Result<(), io::Error> {
        if !self.frame.take_dirty() {
            return Ok(());
        }
        let frame = &self.frame;
        let resolution = frame.resolution;
        // for now this assumes a 1:1 ratio between terminal, chip8 and the
        // internal TUI canvas
        self.terminal.draw(|f| {
            let size = Rect::new(0, 0, 2 + resolution.0 as u16, 2 + resolution.1 as u16);

            let canvas = Canvas::default()
                .block(
                    Block::default()
                        .title("CHIP-8")
                        .borders(Borders::ALL)
                        .style(Style::default().bg(Color::Black)),
                )
                .x_bounds(resolution.x_bounds())
                .y_bounds(resolution.y_bounds())
                .marker(Marker::Block)
                .paint(|ctx| {
                    ctx.draw(&Points {
                        coords: &frame.bitplane(false).collect::<Vec<_>>(),
                        color: Color::Black,
                    });
                    ctx.draw(&Points {
                        coords: &frame.bitplane(true).collect::<Vec<_>>(),
                        color: Color::White,
                    });
                });
            f.render_widget(canvas, size);
        })?;
        Ok(())
    }
}
