//! Integer-deterministic raster primitives for the face compositor.
//!
//! All drawing is plain scanline arithmetic over an RGB8 buffer; there is no
//! anti-aliasing and no floating-point accumulation across pixels, so output
//! is byte-identical for identical inputs on every platform.

pub type Rgb8 = [u8; 3];

/// Fixed-size RGB8 raster, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRgb {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl FrameRgb {
    pub fn filled(width: u32, height: u32, color: Rgb8) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize * 3);
        for _ in 0..(width as usize * height as usize) {
            data.extend_from_slice(&color);
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn put_pixel(&mut self, x: i32, y: i32, color: Rgb8) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 3;
        self.data[idx..idx + 3].copy_from_slice(&color);
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgb8 {
        let idx = (y as usize * self.width as usize + x as usize) * 3;
        [self.data[idx], self.data[idx + 1], self.data[idx + 2]]
    }
}

/// Inclusive bounding box, PIL-style: the ellipse touches all four edges.
#[derive(Clone, Copy, Debug)]
pub struct BBox {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl BBox {
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    fn center(&self) -> (f64, f64) {
        (
            f64::from(self.x0 + self.x1) / 2.0,
            f64::from(self.y0 + self.y1) / 2.0,
        )
    }

    fn radii(&self) -> (f64, f64) {
        (
            f64::from(self.x1 - self.x0) / 2.0,
            f64::from(self.y1 - self.y0) / 2.0,
        )
    }
}

fn inside(x: i32, y: i32, cx: f64, cy: f64, rx: f64, ry: f64) -> bool {
    if rx <= 0.0 || ry <= 0.0 {
        return false;
    }
    let dx = f64::from(x) - cx;
    let dy = f64::from(y) - cy;
    (dx / rx) * (dx / rx) + (dy / ry) * (dy / ry) <= 1.0
}

/// Fill the ellipse inscribed in `bbox`.
pub fn fill_ellipse(frame: &mut FrameRgb, bbox: BBox, color: Rgb8) {
    let (cx, cy) = bbox.center();
    let (rx, ry) = bbox.radii();
    for y in bbox.y0..=bbox.y1 {
        for x in bbox.x0..=bbox.x1 {
            if inside(x, y, cx, cy, rx, ry) {
                frame.put_pixel(x, y, color);
            }
        }
    }
}

/// Stroke the ellipse inscribed in `bbox` with an inward border of `width`
/// pixels.
pub fn stroke_ellipse(frame: &mut FrameRgb, bbox: BBox, color: Rgb8, width: u32) {
    let (cx, cy) = bbox.center();
    let (rx, ry) = bbox.radii();
    let w = f64::from(width);
    let irx = (rx - w).max(0.0);
    let iry = (ry - w).max(0.0);
    for y in bbox.y0..=bbox.y1 {
        for x in bbox.x0..=bbox.x1 {
            if inside(x, y, cx, cy, rx, ry) && !inside(x, y, cx, cy, irx, iry) {
                frame.put_pixel(x, y, color);
            }
        }
    }
}

/// Draw the lower half (0°..180°, measured clockwise from 3 o'clock with y
/// pointing down) of the ellipse outline inscribed in `bbox`, with an inward
/// stroke of `width` pixels.
pub fn arc_lower_half(frame: &mut FrameRgb, bbox: BBox, color: Rgb8, width: u32) {
    let (cx, cy) = bbox.center();
    let (rx, ry) = bbox.radii();
    let w = f64::from(width);
    let irx = (rx - w).max(0.0);
    let iry = (ry - w).max(0.0);
    for y in bbox.y0..=bbox.y1 {
        if f64::from(y) < cy {
            continue;
        }
        for x in bbox.x0..=bbox.x1 {
            if inside(x, y, cx, cy, rx, ry) && !inside(x, y, cx, cy, irx, iry) {
                frame.put_pixel(x, y, color);
            }
        }
    }
}
