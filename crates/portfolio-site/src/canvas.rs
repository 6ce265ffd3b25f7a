//! Canvas sizing and the 2D-context drawing surface.

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, Window};

use crate::config::{ElementIds, Rgb};
use crate::dom;
use crate::error::{Result, SiteError};
use crate::visualizer::{Bar, Surface};

/// A canvas whose drawing buffer can differ from its on-screen size.
pub trait CanvasLayout {
    /// On-screen size of the element, in CSS pixels.
    fn layout_size(&self) -> (u32, u32);
    fn buffer_size(&self) -> (u32, u32);
    fn set_buffer_size(&mut self, width: u32, height: u32);
}

/// Match the drawing buffer to the element's layout size. Without this the
/// browser stretches the buffer and the bars come out distorted.
pub fn sync_buffer_to_layout<C: CanvasLayout>(canvas: &mut C) {
    let (width, height) = canvas.layout_size();
    if canvas.buffer_size() != (width, height) {
        canvas.set_buffer_size(width, height);
    }
}

impl CanvasLayout for HtmlCanvasElement {
    fn layout_size(&self) -> (u32, u32) {
        (
            self.offset_width().max(0) as u32,
            self.offset_height().max(0) as u32,
        )
    }

    fn buffer_size(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    fn set_buffer_size(&mut self, width: u32, height: u32) {
        self.set_width(width);
        self.set_height(height);
    }
}

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or(SiteError::NoCanvasContext)?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| SiteError::NoCanvasContext)?;
        Ok(Self { canvas, ctx })
    }
}

impl Surface for CanvasSurface {
    fn size(&self) -> (f64, f64) {
        (f64::from(self.canvas.width()), f64::from(self.canvas.height()))
    }

    fn clear(&mut self) {
        let (width, height) = self.size();
        self.ctx.clear_rect(0.0, 0.0, width, height);
    }

    fn fill_bar(&mut self, bar: &Bar, top: Rgb, bottom: Rgb) -> Result<()> {
        let (_, height) = self.size();
        let gradient = self.ctx.create_linear_gradient(0.0, height, 0.0, 0.0);
        gradient.add_color_stop(0.0, &bottom.css_with_alpha(bar.alpha))?;
        gradient.add_color_stop(1.0, &top.css_with_alpha(bar.alpha))?;
        self.ctx.set_fill_style_canvas_gradient(&gradient);
        self.ctx.fill_rect(bar.x, bar.y, bar.width, bar.height);
        Ok(())
    }
}

/// Size the visualizer canvas now and after every window resize, and return
/// its drawing surface.
pub fn install(window: &Window, document: &Document, ids: &ElementIds) -> Result<CanvasSurface> {
    let mut canvas: HtmlCanvasElement = dom::element_by_id(document, &ids.visualizer, "canvas")?;
    sync_buffer_to_layout(&mut canvas);

    let mut resized = canvas.clone();
    dom::listen(window, "resize", move |_| sync_buffer_to_layout(&mut resized))?;

    CanvasSurface::new(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeCanvas {
        layout: (u32, u32),
        buffer: (u32, u32),
        writes: usize,
    }

    impl CanvasLayout for FakeCanvas {
        fn layout_size(&self) -> (u32, u32) {
            self.layout
        }

        fn buffer_size(&self) -> (u32, u32) {
            self.buffer
        }

        fn set_buffer_size(&mut self, width: u32, height: u32) {
            self.buffer = (width, height);
            self.writes += 1;
        }
    }

    #[test]
    fn resize_matches_buffer_to_layout() {
        // canvas default buffer is 300x150
        let mut canvas = FakeCanvas {
            layout: (1280, 240),
            buffer: (300, 150),
            writes: 0,
        };
        sync_buffer_to_layout(&mut canvas);
        assert_eq!(canvas.buffer_size(), (1280, 240));

        canvas.layout = (800, 200);
        sync_buffer_to_layout(&mut canvas);
        assert_eq!(canvas.buffer_size(), canvas.layout_size());
        assert_eq!(canvas.writes, 2);
    }

    #[test]
    fn unchanged_layout_leaves_buffer_alone() {
        let mut canvas = FakeCanvas {
            layout: (640, 160),
            buffer: (640, 160),
            writes: 0,
        };
        sync_buffer_to_layout(&mut canvas);
        assert_eq!(canvas.writes, 0);
    }
}
