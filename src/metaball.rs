//! CPU metaball compositor: soft gradients → blur → steep threshold.
//!
//! ## Pipeline
//!
//! | Stage      | What happens                                                   |
//! |------------|----------------------------------------------------------------|
//! | Gradient   | each body is a soft disc `g(d) = (1 - (d/R)²)²`, `R = r·scale` |
//! | Blur       | separable Gaussian over the gradient buffer                    |
//! | Threshold  | smoothstep ramp around `threshold` → alpha; colour is the      |
//! |            | contribution-weighted mix of body colours                      |
//!
//! Blur is linear, so blurring the summed buffer equals summing blurred discs.
//! The compositor therefore blurs one gradient disc per distinct radius into a
//! cached [`Stamp`] and splats that stamp into each body's local bounding box
//! (influence radius + kernel radius).  Per-frame cost is
//! O(bodies × stamp area) for accumulation plus one linear pass for the
//! threshold, independent of how many bodies overlap.
//!
//! The field is sampled every `sample_spacing` u; sample `(i, j)` sits at the
//! viewport point `((i + ½)·s, (j + ½)·s)`, `j = 0` at the bottom.

use crate::config::DemoConfig;
use crate::constants::*;
use bevy::prelude::*;
use std::collections::HashMap;

/// Tuning for the compositor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetaballSettings {
    pub influence_scale: f32,
    pub blur_sigma: f32,
    pub threshold: f32,
    pub edge_band: f32,
    pub sample_spacing: f32,
}

impl Default for MetaballSettings {
    fn default() -> Self {
        Self {
            influence_scale: METABALL_INFLUENCE_SCALE,
            blur_sigma: METABALL_BLUR_SIGMA,
            threshold: METABALL_THRESHOLD,
            edge_band: METABALL_EDGE_BAND,
            sample_spacing: METABALL_SAMPLE_SPACING,
        }
    }
}

impl MetaballSettings {
    pub fn from_config(config: &DemoConfig) -> Self {
        Self {
            influence_scale: config.metaball_influence_scale,
            blur_sigma: config.metaball_blur_sigma,
            threshold: config.metaball_threshold,
            edge_band: config.metaball_edge_band,
            sample_spacing: config.metaball_sample_spacing,
        }
    }
}

/// Pre-blurred gradient disc, `size × size` samples centred on `half`.
#[derive(Debug, Clone)]
struct Stamp {
    half: i32,
    size: usize,
    weights: Vec<f32>,
}

impl Stamp {
    fn build(radius: f32, settings: &MetaballSettings) -> Self {
        let spacing = settings.sample_spacing;
        let influence = (radius * settings.influence_scale / spacing).max(0.5);
        let sigma = settings.blur_sigma / spacing;
        let kernel = gaussian_kernel(sigma);
        let kernel_half = (kernel.len() / 2) as i32;

        let half = influence.ceil() as i32 + kernel_half;
        let size = (2 * half + 1) as usize;

        let mut gradient = vec![0.0f32; size * size];
        for y in 0..size {
            for x in 0..size {
                let dx = x as f32 - half as f32;
                let dy = y as f32 - half as f32;
                let t = (dx * dx + dy * dy) / (influence * influence);
                if t < 1.0 {
                    let g = 1.0 - t;
                    gradient[y * size + x] = g * g;
                }
            }
        }

        let mut temp = vec![0.0f32; size * size];
        blur_horizontal(&gradient, &mut temp, size, &kernel);
        blur_vertical(&temp, &mut gradient, size, &kernel);

        Self {
            half,
            size,
            weights: gradient,
        }
    }

    fn weight(&self, dx: i32, dy: i32) -> f32 {
        let x = (dx + self.half) as usize;
        let y = (dy + self.half) as usize;
        self.weights[y * self.size + x]
    }
}

/// Normalised 1-D Gaussian with radius `ceil(3σ)` samples (at least 1 tap).
fn gaussian_kernel(sigma: f32) -> Vec<f32> {
    if !(sigma > 0.0) {
        return vec![1.0];
    }
    let half = (3.0 * sigma).ceil() as i32;
    let mut kernel: Vec<f32> = (-half..=half)
        .map(|i| {
            let x = i as f32;
            (-x * x / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f32 = kernel.iter().sum();
    for k in &mut kernel {
        *k /= sum;
    }
    kernel
}

/// Horizontal pass over a square buffer; samples past the edge count as zero.
fn blur_horizontal(src: &[f32], dst: &mut [f32], size: usize, kernel: &[f32]) {
    let half = (kernel.len() / 2) as i32;
    for y in 0..size {
        for x in 0..size {
            let mut acc = 0.0;
            for (ki, &kv) in kernel.iter().enumerate() {
                let sx = x as i32 + ki as i32 - half;
                if (0..size as i32).contains(&sx) {
                    acc += src[y * size + sx as usize] * kv;
                }
            }
            dst[y * size + x] = acc;
        }
    }
}

fn blur_vertical(src: &[f32], dst: &mut [f32], size: usize, kernel: &[f32]) {
    let half = (kernel.len() / 2) as i32;
    for y in 0..size {
        for x in 0..size {
            let mut acc = 0.0;
            for (ki, &kv) in kernel.iter().enumerate() {
                let sy = y as i32 + ki as i32 - half;
                if (0..size as i32).contains(&sy) {
                    acc += src[sy as usize * size + x] * kv;
                }
            }
            dst[y * size + x] = acc;
        }
    }
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// One composited frame.
#[derive(Debug, Clone, Default)]
pub struct MetaballLayer {
    /// Samples per row.
    pub width: usize,
    /// Rows.
    pub height: usize,
    /// World units between samples.
    pub spacing: f32,
    pub threshold: f32,
    /// Blurred field value per sample, row 0 at the bottom.
    field: Vec<f32>,
    /// Field-weighted linear RGB sum per sample.
    color: Vec<[f32; 3]>,
    /// RGBA8 output, row 0 at the **top** (texture order).
    pixels: Vec<u8>,
}

impl MetaballLayer {
    fn reset(&mut self, width: usize, height: usize, spacing: f32, threshold: f32) {
        let n = width * height;
        self.width = width;
        self.height = height;
        self.spacing = spacing;
        self.threshold = threshold;
        self.field.clear();
        self.field.resize(n, 0.0);
        self.color.clear();
        self.color.resize(n, [0.0; 3]);
        self.pixels.clear();
        self.pixels.resize(n * 4, 0);
    }

    /// Sample index nearest to a viewport point, if inside the grid.
    fn sample_index(&self, at: Vec2) -> Option<usize> {
        if self.spacing <= 0.0 {
            return None;
        }
        let x = (at.x / self.spacing).floor();
        let y = (at.y / self.spacing).floor();
        if x < 0.0 || y < 0.0 || x >= self.width as f32 || y >= self.height as f32 {
            return None;
        }
        Some(y as usize * self.width + x as usize)
    }

    /// Blurred field value at a viewport point (0 outside the grid).
    pub fn field_at(&self, at: Vec2) -> f32 {
        self.sample_index(at).map_or(0.0, |i| self.field[i])
    }

    /// Whether the point is inside a blob (field at or above threshold).
    pub fn is_inside(&self, at: Vec2) -> bool {
        self.field_at(at) >= self.threshold
    }

    /// RGBA8 pixels, top row first, `width × height × 4` bytes.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Number of 4-connected regions of above-threshold samples.
    pub fn count_regions(&self) -> usize {
        let mut visited = vec![false; self.field.len()];
        let mut stack = Vec::new();
        let mut regions = 0;

        for start in 0..self.field.len() {
            if visited[start] || self.field[start] < self.threshold {
                continue;
            }
            regions += 1;
            visited[start] = true;
            stack.push(start);
            while let Some(i) = stack.pop() {
                let (x, y) = (i % self.width, i / self.width);
                let mut visit = |j: usize| {
                    if !visited[j] && self.field[j] >= self.threshold {
                        visited[j] = true;
                        stack.push(j);
                    }
                };
                if x > 0 {
                    visit(i - 1);
                }
                if x + 1 < self.width {
                    visit(i + 1);
                }
                if y > 0 {
                    visit(i - self.width);
                }
                if y + 1 < self.height {
                    visit(i + self.width);
                }
            }
        }
        regions
    }
}

/// Turns a set of circular bodies into one blended, thresholded image.
#[derive(Resource, Debug, Default)]
pub struct MetaballCompositor {
    settings: MetaballSettings,
    stamps: HashMap<u32, Stamp>,
    layer: MetaballLayer,
}

impl MetaballCompositor {
    pub fn new(settings: MetaballSettings) -> Self {
        Self {
            settings,
            stamps: HashMap::new(),
            layer: MetaballLayer::default(),
        }
    }

    pub fn settings(&self) -> &MetaballSettings {
        &self.settings
    }

    /// Replace the settings; cached stamps are rebuilt lazily.
    pub fn set_settings(&mut self, settings: MetaballSettings) {
        if settings != self.settings {
            self.settings = settings;
            self.stamps.clear();
        }
    }

    /// The most recent output.
    pub fn layer(&self) -> &MetaballLayer {
        &self.layer
    }

    /// Composite `(position, radius, colour)` triples over a `viewport`-sized
    /// area and return the resulting layer.
    pub fn composite<I>(&mut self, viewport: Vec2, bodies: I) -> &MetaballLayer
    where
        I: IntoIterator<Item = (Vec2, f32, Color)>,
    {
        let settings = self.settings;
        let spacing = settings.sample_spacing;
        let width = (viewport.x / spacing).ceil().max(1.0) as usize;
        let height = (viewport.y / spacing).ceil().max(1.0) as usize;
        self.layer.reset(width, height, spacing, settings.threshold);

        for (position, radius, color) in bodies {
            if !(radius > 0.0) || !position.is_finite() {
                continue;
            }
            let stamp = self
                .stamps
                .entry(radius.to_bits())
                .or_insert_with(|| Stamp::build(radius, &settings));
            splat(&mut self.layer, stamp, position, color);
        }

        resolve(&mut self.layer, &settings);
        &self.layer
    }
}

/// Add one body's blurred gradient into the field, clipped to the grid.
fn splat(layer: &mut MetaballLayer, stamp: &Stamp, position: Vec2, color: Color) {
    let fx = (position.x / layer.spacing - 0.5).round();
    let fy = (position.y / layer.spacing - 0.5).round();
    let (w, h) = (layer.width as i32, layer.height as i32);
    let reach = stamp.half as f32;
    // Off-grid stamps are skipped before the integer casts can saturate.
    if fx + reach < 0.0
        || fy + reach < 0.0
        || fx - reach > (w - 1) as f32
        || fy - reach > (h - 1) as f32
    {
        return;
    }
    let (cx, cy) = (fx as i32, fy as i32);
    let rgb = color.to_linear();

    let y0 = (cy - stamp.half).max(0);
    let y1 = (cy + stamp.half).min(h - 1);
    let x0 = (cx - stamp.half).max(0);
    let x1 = (cx + stamp.half).min(w - 1);

    for y in y0..=y1 {
        let row = y as usize * layer.width;
        for x in x0..=x1 {
            let weight = stamp.weight(x - cx, y - cy);
            if weight <= 0.0 {
                continue;
            }
            let i = row + x as usize;
            layer.field[i] += weight;
            let c = &mut layer.color[i];
            c[0] += rgb.red * weight;
            c[1] += rgb.green * weight;
            c[2] += rgb.blue * weight;
        }
    }
}

/// Threshold the field into RGBA8 pixels (flipping rows into texture order).
fn resolve(layer: &mut MetaballLayer, settings: &MetaballSettings) {
    let lo = settings.threshold - settings.edge_band;
    let hi = settings.threshold + settings.edge_band;

    for y in 0..layer.height {
        let out_row = layer.height - 1 - y;
        for x in 0..layer.width {
            let i = y * layer.width + x;
            let field = layer.field[i];
            let alpha = smoothstep(lo, hi, field);
            let o = (out_row * layer.width + x) * 4;
            if alpha <= 0.0 {
                layer.pixels[o..o + 4].copy_from_slice(&[0, 0, 0, 0]);
                continue;
            }
            let [r, g, b] = layer.color[i];
            let srgb = Color::linear_rgb(r / field, g / field, b / field).to_srgba();
            layer.pixels[o] = to_byte(srgb.red);
            layer.pixels[o + 1] = to_byte(srgb.green);
            layer.pixels[o + 2] = to_byte(srgb.blue);
            layer.pixels[o + 3] = to_byte(alpha);
        }
    }
}

fn to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Vec2 = Vec2::new(800.0, 400.0);

    fn red() -> Color {
        Color::srgb(1.0, 0.0, 0.0)
    }

    #[test]
    fn kernel_is_normalised_and_symmetric() {
        let k = gaussian_kernel(2.0);
        assert_eq!(k.len(), 13);
        assert!((k.iter().sum::<f32>() - 1.0).abs() < 1e-5);
        assert!((k[0] - k[12]).abs() < 1e-7);
        assert_eq!(gaussian_kernel(0.0), vec![1.0]);
    }

    #[test]
    fn isolated_body_is_a_roughly_circular_blob() {
        let mut compositor = MetaballCompositor::default();
        let centre = Vec2::new(400.0, 200.0);
        let layer = compositor.composite(VIEWPORT, [(centre, 30.0, red())]);

        assert_eq!(layer.count_regions(), 1);
        assert!(layer.is_inside(centre));
        for angle in [0.0f32, 1.0, 2.0, 3.0, 4.0, 5.0] {
            let dir = Vec2::from_angle(angle);
            assert!(layer.is_inside(centre + dir * 24.0), "inside at angle {angle}");
            assert!(!layer.is_inside(centre + dir * 45.0), "outside at angle {angle}");
        }
        assert!(!layer.is_inside(Vec2::new(100.0, 100.0)));
    }

    #[test]
    fn overlapping_bodies_fuse_into_one_region() {
        let mut compositor = MetaballCompositor::default();
        let a = Vec2::new(380.0, 200.0);
        let b = Vec2::new(420.0, 200.0);
        let layer = compositor.composite(VIEWPORT, [(a, 30.0, red()), (b, 30.0, red())]);

        assert_eq!(layer.count_regions(), 1);
        for step in 0..=40 {
            let p = a.lerp(b, step as f32 / 40.0);
            assert!(layer.is_inside(p), "gap at {p:?}");
        }
    }

    #[test]
    fn distant_bodies_stay_disjoint() {
        let mut compositor = MetaballCompositor::default();
        let a = Vec2::new(150.0, 200.0);
        let b = Vec2::new(650.0, 200.0);
        let layer = compositor.composite(VIEWPORT, [(a, 30.0, red()), (b, 30.0, red())]);

        assert_eq!(layer.count_regions(), 2);
        assert!(layer.is_inside(a) && layer.is_inside(b));
        assert_eq!(layer.field_at(Vec2::new(400.0, 200.0)), 0.0);
    }

    #[test]
    fn pixels_are_flipped_into_texture_order_and_coloured() {
        let mut compositor = MetaballCompositor::default();
        // Body near the bottom of the viewport → near the last texture rows.
        let layer = compositor.composite(VIEWPORT, [(Vec2::new(400.0, 40.0), 30.0, red())]);
        assert_eq!(layer.pixels().len(), layer.width * layer.height * 4);

        let x = (400.0 / layer.spacing) as usize;
        let bottom_row = layer.height - 1 - (40.0 / layer.spacing) as usize;
        let o = (bottom_row * layer.width + x) * 4;
        assert_eq!(&layer.pixels()[o..o + 4], &[255, 0, 0, 255]);

        let top = (2 * layer.width + x) * 4;
        assert_eq!(layer.pixels()[top + 3], 0, "top rows are transparent");
    }

    #[test]
    fn colours_blend_where_blobs_meet() {
        let mut compositor = MetaballCompositor::default();
        let a = Vec2::new(380.0, 200.0);
        let b = Vec2::new(420.0, 200.0);
        let blue = Color::srgb(0.0, 0.0, 1.0);
        let layer = compositor.composite(VIEWPORT, [(a, 30.0, red()), (b, 30.0, blue)]);

        let x = (400.0 / layer.spacing) as usize;
        let row = layer.height - 1 - (200.0 / layer.spacing) as usize;
        let o = (row * layer.width + x) * 4;
        let px = &layer.pixels()[o..o + 4];
        assert!(px[0] > 100 && px[2] > 100, "expected a red/blue mix, got {px:?}");
    }

    #[test]
    fn bodies_outside_viewport_are_clipped_not_panicking() {
        let mut compositor = MetaballCompositor::default();
        let layer = compositor.composite(
            VIEWPORT,
            [
                (Vec2::new(-10.0, -10.0), 30.0, red()),
                (Vec2::new(5000.0, 200.0), 30.0, red()),
                (Vec2::new(f32::NAN, 0.0), 30.0, red()),
                (Vec2::new(100.0, 100.0), 0.0, red()),
            ],
        );
        assert_eq!(layer.count_regions(), 1);
    }

    #[test]
    fn far_away_bodies_are_skipped() {
        let mut compositor = MetaballCompositor::default();
        let layer = compositor.composite(
            VIEWPORT,
            [
                (Vec2::new(1.0e12, 200.0), 30.0, red()),
                (Vec2::new(-1.0e12, -1.0e12), 30.0, red()),
                (Vec2::new(400.0, f32::MAX), 30.0, red()),
            ],
        );
        assert_eq!(layer.count_regions(), 0);
        assert!(layer.pixels().iter().all(|&b| b == 0));
    }

    #[test]
    fn settings_change_rebuilds_stamps() {
        let mut compositor = MetaballCompositor::default();
        let centre = Vec2::new(400.0, 200.0);
        compositor.composite(VIEWPORT, [(centre, 30.0, red())]);
        let before = compositor.layer().field_at(centre);

        compositor.set_settings(MetaballSettings {
            influence_scale: 1.0,
            ..MetaballSettings::default()
        });
        compositor.composite(VIEWPORT, [(centre, 30.0, red())]);
        let after_probe = centre + Vec2::new(40.0, 0.0);
        assert!(!compositor.layer().is_inside(after_probe));
        assert!(compositor.layer().field_at(centre) > 0.0);
        assert!(before > 0.0);
    }
}
