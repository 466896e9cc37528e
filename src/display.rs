//! Pixel surface shared by every pattern and game.
//!
//! Cores never draw directly: a step returns [`RenderCommands`] and the host
//! replays them onto whatever [`Surface`] it owns.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb24 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb24 {
    pub const BLACK: Rgb24 = Rgb24::new(0, 0, 0);
    pub const WHITE: Rgb24 = Rgb24::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Sum of squared per-channel differences.
    pub fn distance_sq(self, other: Rgb24) -> u32 {
        let dr = self.r as i32 - other.r as i32;
        let dg = self.g as i32 - other.g as i32;
        let db = self.b as i32 - other.b as i32;
        (dr * dr + dg * dg + db * db) as u32
    }
}

pub trait Surface {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    fn set_pixel(&mut self, x: usize, y: usize, color: Rgb24);
    fn get_pixel(&self, x: usize, y: usize) -> Rgb24;
    fn clear(&mut self, color: Rgb24);
    fn present(&mut self);
}

/// Plain in-memory surface.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    width: usize,
    height: usize,
    pixels: Vec<Rgb24>,
    presents: u64,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgb24::BLACK; width * height],
            presents: 0,
        }
    }

    pub fn pixels(&self) -> &[Rgb24] {
        &self.pixels
    }

    /// Number of times the buffer has been presented.
    pub fn presents(&self) -> u64 {
        self.presents
    }
}

impl Surface for FrameBuffer {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn set_pixel(&mut self, x: usize, y: usize, color: Rgb24) {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] = color;
        }
    }

    fn get_pixel(&self, x: usize, y: usize) -> Rgb24 {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x]
        } else {
            Rgb24::BLACK
        }
    }

    fn clear(&mut self, color: Rgb24) {
        self.pixels.fill(color);
    }

    fn present(&mut self) {
        self.presents += 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderCommand {
    Clear(Rgb24),
    SetPixel { x: usize, y: usize, color: Rgb24 },
    Present,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderCommands {
    commands: Vec<RenderCommand>,
}

impl RenderCommands {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self, color: Rgb24) {
        self.commands.push(RenderCommand::Clear(color));
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, color: Rgb24) {
        self.commands.push(RenderCommand::SetPixel { x, y, color });
    }

    pub fn present(&mut self) {
        self.commands.push(RenderCommand::Present);
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RenderCommand> {
        self.commands.iter()
    }

    pub fn present_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, RenderCommand::Present))
            .count()
    }

    /// Replays the commands in order onto `surface`.
    pub fn apply(&self, surface: &mut impl Surface) {
        for command in &self.commands {
            match *command {
                RenderCommand::Clear(color) => surface.clear(color),
                RenderCommand::SetPixel { x, y, color } => surface.set_pixel(x, y, color),
                RenderCommand::Present => surface.present(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_sum_of_squares() {
        let a = Rgb24::new(10, 20, 30);
        let b = Rgb24::new(13, 16, 30);
        assert_eq!(a.distance_sq(b), 9 + 16);
        assert_eq!(b.distance_sq(a), 25);
        assert_eq!(Rgb24::BLACK.distance_sq(Rgb24::WHITE), 3 * 255 * 255);
    }

    #[test]
    fn out_of_range_access_is_ignored() {
        let mut fb = FrameBuffer::new(2, 2);
        fb.set_pixel(5, 0, Rgb24::WHITE);
        assert!(fb.pixels().iter().all(|p| *p == Rgb24::BLACK));
        assert_eq!(fb.get_pixel(0, 9), Rgb24::BLACK);
    }

    #[test]
    fn commands_replay_in_order() {
        let mut cmds = RenderCommands::new();
        cmds.clear(Rgb24::WHITE);
        cmds.set_pixel(1, 0, Rgb24::new(1, 2, 3));
        cmds.present();

        let mut fb = FrameBuffer::new(2, 1);
        cmds.apply(&mut fb);
        assert_eq!(fb.get_pixel(0, 0), Rgb24::WHITE);
        assert_eq!(fb.get_pixel(1, 0), Rgb24::new(1, 2, 3));
        assert_eq!(fb.presents(), 1);
        assert_eq!(cmds.present_count(), 1);
    }
}
