//! Frequency bar visualizer.
//!
//! Each frame pulls a magnitude snapshot from a [`FrequencySource`] and draws
//! one bar per bin onto a [`Surface`].

use crate::config::{Rgb, VisualizerConfig};
use crate::error::Result;

/// Real-time frequency magnitudes, one byte (0-255) per bin.
pub trait FrequencySource {
    fn bin_count(&self) -> usize;
    fn read_frequencies(&self, out: &mut [u8]);
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bar {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Gradient opacity, magnitude / 255.
    pub alpha: f64,
}

/// A 2D drawing target sized in drawing-buffer pixels.
pub trait Surface {
    fn size(&self) -> (f64, f64);
    fn clear(&mut self);
    /// Fill `bar` with a vertical gradient, `bottom` at the surface's bottom
    /// edge and `top` at its top edge.
    fn fill_bar(&mut self, bar: &Bar, top: Rgb, bottom: Rgb) -> Result<()>;
}

/// Lay out one bar per magnitude, left to right, anchored to the bottom edge.
pub fn layout_bars(magnitudes: &[u8], width: f64, height: f64, config: &VisualizerConfig) -> Vec<Bar> {
    if magnitudes.is_empty() {
        return Vec::new();
    }
    let bar_width = width / magnitudes.len() as f64 * config.bar_scale;
    let mut x = 0.0;
    magnitudes
        .iter()
        .map(|&magnitude| {
            let bar_height = f64::from(magnitude) / config.height_divisor;
            let bar = Bar {
                x,
                y: height - bar_height,
                width: bar_width,
                height: bar_height,
                alpha: f64::from(magnitude) / 255.0,
            };
            x += bar_width + config.bar_gap;
            bar
        })
        .collect()
}

pub struct Visualizer<S> {
    source: Option<S>,
    magnitudes: Vec<u8>,
    config: VisualizerConfig,
}

impl<S: FrequencySource> Visualizer<S> {
    pub fn new(config: VisualizerConfig) -> Self {
        Self {
            source: None,
            magnitudes: Vec::new(),
            config,
        }
    }

    pub fn config(&self) -> &VisualizerConfig {
        &self.config
    }

    pub fn is_ready(&self) -> bool {
        self.source.is_some()
    }

    /// Attach the analyser and size the snapshot buffer to its bin count.
    /// Returns `false` and keeps the existing source if one is attached.
    pub fn attach(&mut self, source: S) -> bool {
        if self.source.is_some() {
            return false;
        }
        self.magnitudes = vec![0; source.bin_count()];
        self.source = Some(source);
        true
    }

    /// Latest snapshot pulled by [`render_frame`](Self::render_frame).
    pub fn magnitudes(&self) -> &[u8] {
        &self.magnitudes
    }

    /// Draw one frame. Returns `Ok(false)` without touching the surface when
    /// no analyser is attached yet.
    pub fn render_frame<T: Surface>(&mut self, surface: &mut T) -> Result<bool> {
        let Some(source) = &self.source else {
            return Ok(false);
        };
        source.read_frequencies(&mut self.magnitudes);

        surface.clear();
        let (width, height) = surface.size();
        for bar in layout_bars(&self.magnitudes, width, height, &self.config) {
            surface.fill_bar(&bar, self.config.top_color, self.config.bottom_color)?;
        }
        Ok(true)
    }
}
