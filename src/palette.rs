//! Color palettes for the smoke pattern: one color per grid cell, in the
//! order they will be placed.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::display::Rgb24;

const HUE_STEPS_PER_BAND: usize = 16;

/// Enumeration order of a palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteOrder {
    /// RGB cube, red varies fastest, blue slowest.
    RedFirst,
    /// RGB cube, green varies fastest, red slowest.
    GreenFirst,
    /// RGB cube, blue varies fastest, red slowest.
    BlueFirst,
    /// Hue bands: a saturation ramp then a value ramp for each hue.
    HueSweep,
}

impl PaletteOrder {
    pub const ALL: [PaletteOrder; 4] = [
        PaletteOrder::RedFirst,
        PaletteOrder::GreenFirst,
        PaletteOrder::BlueFirst,
        PaletteOrder::HueSweep,
    ];

    /// Cube orders are shuffled after generation; the hue sweep keeps its
    /// order so the bands stay visible.
    pub fn shuffled(self) -> bool {
        !matches!(self, PaletteOrder::HueSweep)
    }

    pub fn random(rng: &mut impl Rng) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

/// Builds exactly `count` colors in `order`, shuffling when the order asks
/// for it.
pub fn create_palette(order: PaletteOrder, count: usize, rng: &mut impl Rng) -> Vec<Rgb24> {
    let mut colors = match order {
        PaletteOrder::RedFirst => cube(count, |fast, mid, slow| (fast, mid, slow)),
        PaletteOrder::GreenFirst => cube(count, |fast, mid, slow| (slow, fast, mid)),
        PaletteOrder::BlueFirst => cube(count, |fast, mid, slow| (slow, mid, fast)),
        PaletteOrder::HueSweep => hue_sweep(count),
    };
    if order.shuffled() {
        colors.shuffle(rng);
    }
    colors
}

/// Smallest per-channel step count whose cube holds `count` colors.
pub fn cube_steps(count: usize) -> usize {
    let mut n = 1;
    while n * n * n < count {
        n += 1;
    }
    n
}

fn cube(count: usize, channels: impl Fn(u8, u8, u8) -> (u8, u8, u8)) -> Vec<Rgb24> {
    let steps = cube_steps(count);
    let level = |i: usize| -> u8 {
        if steps > 1 {
            (i * 255 / (steps - 1)) as u8
        } else {
            255
        }
    };
    let mut colors = Vec::with_capacity(count);
    'fill: for slow in 0..steps {
        for mid in 0..steps {
            for fast in 0..steps {
                if colors.len() == count {
                    break 'fill;
                }
                let (r, g, b) = channels(level(fast), level(mid), level(slow));
                colors.push(Rgb24::new(r, g, b));
            }
        }
    }
    colors
}

fn hue_sweep(count: usize) -> Vec<Rgb24> {
    let per_hue = HUE_STEPS_PER_BAND * 2;
    let hues = count.div_ceil(per_hue).max(1);
    let mut colors = Vec::with_capacity(count);
    'fill: for h in 0..hues {
        let hue = if hues > 1 {
            h as f32 * 360.0 / (hues - 1) as f32
        } else {
            0.0
        };
        for s in 0..HUE_STEPS_PER_BAND {
            if colors.len() == count {
                break 'fill;
            }
            let saturation = s as f32 / (HUE_STEPS_PER_BAND - 1) as f32;
            colors.push(hsv_to_rgb(hue, saturation, 1.0));
        }
        for v in (1..=HUE_STEPS_PER_BAND).rev() {
            if colors.len() == count {
                break 'fill;
            }
            let value = v as f32 / HUE_STEPS_PER_BAND as f32;
            colors.push(hsv_to_rgb(hue, 1.0, value));
        }
    }
    colors
}

/// `hue` in degrees, `saturation` and `value` in 0..=1.
pub fn hsv_to_rgb(hue: f32, saturation: f32, value: f32) -> Rgb24 {
    let saturation = saturation.clamp(0.0, 1.0);
    let value = value.clamp(0.0, 1.0);
    let to_byte = |c: f32| (c * 255.0).round() as u8;

    if saturation == 0.0 {
        let grey = to_byte(value);
        return Rgb24::new(grey, grey, grey);
    }

    let h = hue.rem_euclid(360.0) / 60.0;
    let sector = h.floor();
    let f = h - sector;
    let p = value * (1.0 - saturation);
    let q = value * (1.0 - saturation * f);
    let t = value * (1.0 - saturation * (1.0 - f));
    let (r, g, b) = match sector as u32 {
        0 => (value, t, p),
        1 => (q, value, p),
        2 => (p, value, t),
        3 => (p, q, value),
        4 => (t, p, value),
        _ => (value, p, q),
    };
    Rgb24::new(to_byte(r), to_byte(g), to_byte(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn cube_steps_cover_count() {
        assert_eq!(cube_steps(1024), 11);
        assert_eq!(cube_steps(1000), 10);
        assert_eq!(cube_steps(4), 2);
        assert_eq!(cube_steps(1), 1);
    }

    #[test]
    fn every_order_yields_exact_count() {
        let mut rng = StdRng::seed_from_u64(5);
        for order in PaletteOrder::ALL {
            for count in [1, 4, 7, 1024] {
                assert_eq!(create_palette(order, count, &mut rng).len(), count);
            }
        }
    }

    #[test]
    fn cube_orders_differ_in_fastest_channel() {
        let mut rng = StdRng::seed_from_u64(5);
        let red = cube(1024, |f, m, s| (f, m, s));
        assert_eq!(red[0], Rgb24::new(0, 0, 0));
        assert_eq!(red[1], Rgb24::new(25, 0, 0));
        assert_eq!(red[10], Rgb24::new(255, 0, 0));
        assert_eq!(red[11], Rgb24::new(0, 25, 0));

        let green = cube(1024, |f, m, s| (s, f, m));
        assert_eq!(green[1], Rgb24::new(0, 25, 0));
        let blue = cube(1024, |f, m, s| (s, m, f));
        assert_eq!(blue[1], Rgb24::new(0, 0, 25));

        // Shuffling keeps the same multiset of distinct colors.
        let shuffled = create_palette(PaletteOrder::RedFirst, 1024, &mut rng);
        let a: HashSet<_> = shuffled.iter().collect();
        let b: HashSet<_> = red.iter().collect();
        assert_eq!(a, b);
        assert_eq!(a.len(), 1024);
    }

    #[test]
    fn hue_sweep_is_not_shuffled() {
        let mut rng = StdRng::seed_from_u64(9);
        let colors = create_palette(PaletteOrder::HueSweep, 1024, &mut rng);
        // First band is red: white fading to full red, then darkening.
        assert_eq!(colors[0], Rgb24::WHITE);
        assert_eq!(colors[15], Rgb24::new(255, 0, 0));
        assert_eq!(colors[16], Rgb24::new(255, 0, 0));
        assert_eq!(colors[31], Rgb24::new(16, 0, 0));
    }

    #[test]
    fn hsv_primaries() {
        assert_eq!(hsv_to_rgb(0.0, 1.0, 1.0), Rgb24::new(255, 0, 0));
        assert_eq!(hsv_to_rgb(120.0, 1.0, 1.0), Rgb24::new(0, 255, 0));
        assert_eq!(hsv_to_rgb(240.0, 1.0, 1.0), Rgb24::new(0, 0, 255));
        assert_eq!(hsv_to_rgb(360.0, 1.0, 1.0), Rgb24::new(255, 0, 0));
        assert_eq!(hsv_to_rgb(77.0, 0.0, 0.5), Rgb24::new(128, 128, 128));
    }
}
