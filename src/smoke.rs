//! Rainbow smoke: greedy color placement.
//!
//! Every color of a palette goes, in order, onto the available cell whose
//! colored neighbors match it best. A cell becomes available once one of its
//! eight neighbors is colored, and stops being available when it is colored
//! itself, so the picture grows as one connected blob.

use rand::Rng;
use tracing::{debug, info};

use crate::clock::Millis;
use crate::config::Tuning;
use crate::display::{RenderCommands, Rgb24};
use crate::palette::{create_palette, PaletteOrder};

/// How a candidate cell is scored against its colored neighbors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    /// Smallest distance to any colored neighbor.
    Nearest,
    /// Mean distance over all colored neighbors.
    Average,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    ClosestNeighbor,
    ClosestAverage,
    /// Nearest and Average take turns, one placement each.
    Alternating,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [
        Strategy::ClosestNeighbor,
        Strategy::ClosestAverage,
        Strategy::Alternating,
    ];

    pub fn random(rng: &mut impl Rng) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    pub fn metric_for(self, placement: usize) -> Metric {
        match self {
            Strategy::ClosestNeighbor => Metric::Nearest,
            Strategy::ClosestAverage => Metric::Average,
            Strategy::Alternating if placement % 2 == 0 => Metric::Nearest,
            Strategy::Alternating => Metric::Average,
        }
    }
}

/// Per-cell placement state: colored, available, or neither.
#[derive(Debug, Clone)]
pub struct SmokeCanvas {
    width: usize,
    height: usize,
    colors: Vec<Option<Rgb24>>,
    available: Vec<bool>,
}

impl SmokeCanvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            colors: vec![None; width * height],
            available: vec![false; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn color_at(&self, x: usize, y: usize) -> Option<Rgb24> {
        self.colors[y * self.width + x]
    }

    pub fn has_color(&self, x: usize, y: usize) -> bool {
        self.color_at(x, y).is_some()
    }

    pub fn is_available(&self, x: usize, y: usize) -> bool {
        self.available[y * self.width + x]
    }

    pub fn colored_count(&self) -> usize {
        self.colors.iter().filter(|c| c.is_some()).count()
    }

    pub fn available_count(&self) -> usize {
        self.available.iter().filter(|a| **a).count()
    }

    /// No cell is both available and colored.
    pub fn invariant_holds(&self) -> bool {
        self.available
            .iter()
            .zip(&self.colors)
            .all(|(available, color)| !(*available && color.is_some()))
    }

    /// In-bounds cells of the 8-neighborhood. No wraparound.
    fn neighbors(&self, x: usize, y: usize) -> impl Iterator<Item = (usize, usize)> {
        let (w, h) = (self.width as isize, self.height as isize);
        let (x, y) = (x as isize, y as isize);
        (-1isize..=1)
            .flat_map(move |dy| (-1isize..=1).map(move |dx| (dx, dy)))
            .filter(|&(dx, dy)| dx != 0 || dy != 0)
            .map(move |(dx, dy)| (x + dx, y + dy))
            .filter(move |&(nx, ny)| nx >= 0 && ny >= 0 && nx < w && ny < h)
            .map(|(nx, ny)| (nx as usize, ny as usize))
    }

    /// Colors the cell and opens its uncolored neighbors.
    pub fn place(&mut self, x: usize, y: usize, color: Rgb24) {
        let idx = y * self.width + x;
        self.colors[idx] = Some(color);
        self.available[idx] = false;

        let neighbors: Vec<_> = self.neighbors(x, y).collect();
        for (nx, ny) in neighbors {
            let n = ny * self.width + nx;
            if self.colors[n].is_none() {
                self.available[n] = true;
            }
        }
    }

    fn score(&self, x: usize, y: usize, color: Rgb24, metric: Metric) -> Option<u32> {
        let mut count = 0u32;
        let mut total = 0u32;
        let mut nearest = u32::MAX;
        for (nx, ny) in self.neighbors(x, y) {
            let Some(neighbor) = self.color_at(nx, ny) else {
                continue;
            };
            let d = neighbor.distance_sq(color);
            count += 1;
            total += d;
            nearest = nearest.min(d);
        }
        if count == 0 {
            return None;
        }
        Some(match metric {
            Metric::Nearest => nearest,
            Metric::Average => total / count,
        })
    }

    /// The available cell that scores lowest for `color`; ties go to a coin
    /// flip.
    pub fn best_cell(
        &self,
        color: Rgb24,
        metric: Metric,
        rng: &mut impl Rng,
    ) -> Option<(usize, usize)> {
        let mut best: Option<((usize, usize), u32)> = None;
        for y in 0..self.height {
            for x in 0..self.width {
                if !self.is_available(x, y) {
                    continue;
                }
                let Some(score) = self.score(x, y, color, metric) else {
                    continue;
                };
                match best {
                    Some((_, smallest)) if score > smallest => {}
                    Some((_, smallest)) if score == smallest && !rng.gen_bool(0.5) => {}
                    _ => best = Some(((x, y), score)),
                }
            }
        }
        best.map(|(cell, _)| cell)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: usize,
    pub y: usize,
    pub color: Rgb24,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmokeState {
    Placing { next: usize },
    Resting { remaining_ms: Millis },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SmokeStep {
    pub commands: RenderCommands,
    /// The stop check fired; the pattern is done.
    pub stopped: bool,
}

pub struct RainbowSmoke {
    canvas: SmokeCanvas,
    palette: Vec<Rgb24>,
    order: Option<PaletteOrder>,
    strategy: Strategy,
    state: SmokeState,
    since_flush: usize,
    flush_every: usize,
    rest_ms: Millis,
}

impl RainbowSmoke {
    /// Starts a run with a random palette order and strategy.
    pub fn new(width: usize, height: usize, tuning: &Tuning, rng: &mut impl Rng) -> Self {
        let mut smoke = Self::with_palette(
            width,
            height,
            Vec::new(),
            Strategy::ClosestNeighbor,
            tuning,
        );
        smoke.begin_run(rng);
        smoke
    }

    /// A single run over a caller-supplied palette. Later runs pick their own.
    pub fn with_palette(
        width: usize,
        height: usize,
        palette: Vec<Rgb24>,
        strategy: Strategy,
        tuning: &Tuning,
    ) -> Self {
        Self {
            canvas: SmokeCanvas::new(width, height),
            palette,
            order: None,
            strategy,
            state: SmokeState::Placing { next: 0 },
            since_flush: 0,
            flush_every: tuning.smoke_flush_every.max(1),
            rest_ms: tuning.smoke_rest_ms,
        }
    }

    pub fn canvas(&self) -> &SmokeCanvas {
        &self.canvas
    }

    pub fn state(&self) -> SmokeState {
        self.state
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn order(&self) -> Option<PaletteOrder> {
        self.order
    }

    fn begin_run(&mut self, rng: &mut impl Rng) {
        let count = self.canvas.width() * self.canvas.height();
        let order = PaletteOrder::random(rng);
        self.palette = create_palette(order, count, rng);
        self.order = Some(order);
        self.strategy = Strategy::random(rng);
        self.canvas = SmokeCanvas::new(self.canvas.width(), self.canvas.height());
        self.state = SmokeState::Placing { next: 0 };
        self.since_flush = 0;
        info!(order = ?order, strategy = ?self.strategy, "rainbow smoke run started");
    }

    /// Places the next palette color. `None` once the run is complete.
    pub fn place_next(&mut self, rng: &mut impl Rng) -> Option<Placement> {
        let SmokeState::Placing { next } = self.state else {
            return None;
        };
        let color = *self.palette.get(next)?;

        let (x, y) = if next == 0 {
            (
                rng.gen_range(0..self.canvas.width()),
                rng.gen_range(0..self.canvas.height()),
            )
        } else {
            let metric = self.strategy.metric_for(next);
            self.canvas.best_cell(color, metric, rng)?
        };

        self.canvas.place(x, y, color);
        debug_assert!(self.canvas.invariant_holds());
        self.state = SmokeState::Placing { next: next + 1 };
        Some(Placement { x, y, color })
    }

    fn run_complete(&self) -> bool {
        matches!(self.state, SmokeState::Placing { next } if next >= self.palette.len())
    }

    /// Flushes the tail of the run and starts the rest.
    fn finish_run(&mut self, commands: &mut RenderCommands) {
        if self.since_flush > 0 {
            commands.present();
            self.since_flush = 0;
        }
        debug!(placed = self.canvas.colored_count(), "rainbow smoke run complete");
        self.state = SmokeState::Resting {
            remaining_ms: self.rest_ms,
        };
    }

    /// Runs one batch of placements, or one slice of the rest between runs.
    ///
    /// `should_stop` is checked on entry and after every placement.
    pub fn step(
        &mut self,
        elapsed: Millis,
        rng: &mut impl Rng,
        should_stop: &mut dyn FnMut() -> bool,
    ) -> SmokeStep {
        let mut commands = RenderCommands::new();
        if should_stop() {
            return SmokeStep {
                commands,
                stopped: true,
            };
        }

        match self.state {
            SmokeState::Resting { remaining_ms } => {
                if elapsed >= remaining_ms {
                    self.begin_run(rng);
                } else {
                    self.state = SmokeState::Resting {
                        remaining_ms: remaining_ms - elapsed,
                    };
                }
            }
            SmokeState::Placing { next } => {
                if next == 0 {
                    commands.clear(Rgb24::BLACK);
                }
                loop {
                    let Some(placement) = self.place_next(rng) else {
                        self.finish_run(&mut commands);
                        break;
                    };
                    commands.set_pixel(placement.x, placement.y, placement.color);
                    self.since_flush += 1;
                    if should_stop() {
                        commands.present();
                        return SmokeStep {
                            commands,
                            stopped: true,
                        };
                    }
                    if self.run_complete() {
                        self.finish_run(&mut commands);
                        break;
                    }
                    if self.since_flush == self.flush_every {
                        commands.present();
                        self.since_flush = 0;
                        break;
                    }
                }
            }
        }

        SmokeStep {
            commands,
            stopped: false,
        }
    }
}
