// MIT License

// Copyright (c) 2022 AnonmousDapper

use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};

use line_drawing::{Bresenham, BresenhamCircle};

use half::f16;

use crate::config::{Config, Seed, Shape, State};

pub type Size = i32;
pub type Point = (Size, Size);

pub trait Render {
    type Color;

    fn pixel(&mut self, point: Point, color: Self::Color);

    fn line(&mut self, origin: Point, end: Point, color: Self::Color);

    fn square(&mut self, origin: Point, length: Size, color: Self::Color);

    fn circle(&mut self, origin: Point, radius: Size, color: Self::Color);

    fn fill(&mut self, color: Self::Color);

    // higher-level methods
    fn seed(&mut self, seed: &Seed);
}

/// Square image of half-float texels, painted on the CPU and uploaded once
/// as the initial simulation state.
pub struct Canvas {
    size: Size,
    frame: Vec<RgbaF16>,
}

impl Canvas {
    pub fn new(size: u32) -> Self {
        let side = size.min(Size::MAX as u32) as usize;

        Self {
            size: side as Size,
            frame: vec![RgbaF16::default(); side * side],
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let mut canvas = Self::new(config.grid_size);

        canvas.fill(RgbaF16::from(config.background));
        for seed in &config.seeds {
            canvas.seed(seed);
        }

        canvas
    }

    #[inline]
    pub fn size(&self) -> u32 {
        self.size as u32
    }

    #[inline]
    fn as_idx(&self, x: Size, y: Size) -> usize {
        let side = self.size as usize;
        y.rem_euclid(self.size) as usize * side + x.rem_euclid(self.size) as usize
    }

    pub fn get(&self, (x, y): Point) -> RgbaF16 {
        self.frame[self.as_idx(x, y)]
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.frame)
    }
}

impl Render for Canvas {
    type Color = RgbaF16;

    #[inline]
    fn pixel(&mut self, (x, y): Point, color: Self::Color) {
        if self.size == 0 {
            return;
        }

        let idx = self.as_idx(x, y);
        self.frame[idx] = color;
    }

    #[inline]
    fn line(&mut self, origin: Point, end: Point, color: Self::Color) {
        for point in Bresenham::new(origin, end) {
            self.pixel(point, color);
        }
    }

    #[inline]
    fn square(&mut self, (x, y): Point, length: Size, color: Self::Color) {
        for dx in x..(x + length) {
            for dy in y..(y + length) {
                self.pixel((dx, dy), color)
            }
        }
    }

    #[inline]
    fn circle(&mut self, (x, y): Point, radius: Size, color: Self::Color) {
        let mut rows: HashMap<Size, (Size, Size)> = HashMap::new();

        for (px, py) in BresenhamCircle::new(x, y, radius) {
            let span = rows.entry(py).or_insert((px, px));
            span.0 = span.0.min(px);
            span.1 = span.1.max(px);
        }

        for (row, (start, end)) in rows {
            self.line((start, row), (end, row), color);
        }
    }

    #[inline]
    fn fill(&mut self, color: Self::Color) {
        self.frame.fill(color);
    }

    #[inline]
    fn seed(&mut self, seed: &Seed) {
        let x = seed.position.x.round() as Size;
        let y = seed.position.y.round() as Size;
        let radius = seed.radius.round() as Size;
        let color = RgbaF16::from(seed.state);

        match (seed.shape, radius) {
            (_, r) if r <= 0 => {}
            (_, 1) => self.pixel((x, y), color),
            (Shape::Circle, r) => self.circle((x, y), r, color),
            (Shape::Square, r) => self.square((x - r, y - r), r * 2, color),
        };
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct RgbaF16 {
    r: f16,
    g: f16,
    b: f16,
    a: f16,
}

impl RgbaF16 {
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self {
            r: f16::from_f32(r),
            g: f16::from_f32(g),
            b: f16::from_f32(b),
            a: f16::from_f32(a),
        }
    }

    pub fn to_f32(self) -> State {
        [
            self.r.to_f32(),
            self.g.to_f32(),
            self.b.to_f32(),
            self.a.to_f32(),
        ]
    }
}

impl From<State> for RgbaF16 {
    fn from([r, g, b, a]: State) -> Self {
        Self::new(r, g, b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Point as Position;

    const BACKGROUND: State = [1.0, 0.0, 0.0, 1.0];
    const SEED: State = [1.0, 1.0, 0.0, 1.0];

    fn seed(x: f32, y: f32, radius: f32, shape: Shape) -> Seed {
        Seed {
            position: Position::new(x, y),
            radius,
            shape,
            state: SEED,
        }
    }

    fn count(canvas: &Canvas, state: State) -> usize {
        let size = canvas.size() as Size;
        let color = RgbaF16::from(state);

        (0..size)
            .flat_map(|y| (0..size).map(move |x| (x, y)))
            .filter(|p| canvas.get(*p) == color)
            .count()
    }

    #[test]
    fn texels_are_eight_bytes() {
        let canvas = Canvas::new(16);

        assert_eq!(canvas.as_bytes().len(), 16 * 16 * 8);
    }

    #[test]
    fn indexes_past_i32_area() {
        // 46341^2 no longer fits an i32
        let canvas = Canvas {
            size: 46_341,
            frame: Vec::new(),
        };

        assert_eq!(canvas.as_idx(46_340, 46_340), 46_341 * 46_341 - 1);
        assert_eq!(canvas.as_idx(-1, 0), 46_340);
    }

    #[test]
    fn empty_canvas_has_no_texels() {
        let mut canvas = Canvas::new(0);
        canvas.pixel((3, 3), RgbaF16::from(SEED));

        assert!(canvas.as_bytes().is_empty());
    }

    #[test]
    fn pixels_wrap_around() {
        let mut canvas = Canvas::new(8);
        let color = RgbaF16::from(SEED);

        canvas.pixel((-1, 8), color);

        assert_eq!(canvas.get((7, 0)), color);
        assert_eq!(count(&canvas, SEED), 1);
    }

    #[test]
    fn square_seed_covers_its_extent() {
        let mut canvas = Canvas::new(32);
        canvas.fill(RgbaF16::from(BACKGROUND));
        canvas.seed(&seed(16.0, 16.0, 3.0, Shape::Square));

        assert_eq!(count(&canvas, SEED), 36);
        assert_eq!(canvas.get((13, 13)).to_f32(), SEED);
        assert_eq!(canvas.get((19, 19)).to_f32(), BACKGROUND);
    }

    #[test]
    fn circle_seed_is_a_filled_disc() {
        let mut canvas = Canvas::new(64);
        canvas.fill(RgbaF16::from(BACKGROUND));
        canvas.seed(&seed(32.0, 32.0, 10.0, Shape::Circle));

        assert_eq!(canvas.get((32, 32)).to_f32(), SEED);
        assert_eq!(canvas.get((32, 28)).to_f32(), SEED);
        assert_eq!(canvas.get((0, 0)).to_f32(), BACKGROUND);

        let painted = count(&canvas, SEED);
        let area = std::f32::consts::PI * 100.0;
        assert!((painted as f32) > area * 0.7 && (painted as f32) < area * 1.3);
    }

    #[test]
    fn empty_seed_paints_nothing() {
        let mut canvas = Canvas::new(8);
        canvas.seed(&seed(4.0, 4.0, 0.0, Shape::Circle));

        assert_eq!(count(&canvas, SEED), 0);
    }

    #[test]
    fn default_config_paints_background_and_seed() {
        let config = Config::default();
        let canvas = Canvas::from_config(&config);

        assert_eq!(canvas.size(), config.grid_size);
        assert_eq!(canvas.get((0, 0)).to_f32(), config.background);

        let center = (config.grid_size / 2) as Size;
        assert_eq!(canvas.get((center, center)).to_f32(), config.seeds[0].state);
    }
}
