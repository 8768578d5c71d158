//! Overlay canvas renderer for the particle field.

use std::f64::consts::PI;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, Window};

use super::ParticleField;
use crate::config::ParticleConfig;

pub const CANVAS_ID: &str = "rt-particles";

pub struct ParticleSystem {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    field: ParticleField,
}

impl ParticleSystem {
    /// Create (or reuse) the full-viewport overlay and seed the particles.
    pub fn init(
        win: &Window,
        doc: &Document,
        config: &ParticleConfig,
        rng: &mut impl rand::Rng,
    ) -> Result<Self, JsValue> {
        let canvas: HtmlCanvasElement = if let Some(el) = doc.get_element_by_id(CANVAS_ID) {
            el.dyn_into()?
        } else {
            let c: HtmlCanvasElement = doc.create_element("canvas")?.dyn_into()?;
            c.set_id(CANVAS_ID);
            c.set_attribute(
                "style",
                &format!(
                    "position:fixed; top:0; left:0; width:100%; height:100%; pointer-events:none; z-index:-1; opacity:{};",
                    config.canvas_opacity
                ),
            )?;
            doc.body()
                .ok_or_else(|| JsValue::from_str("no body"))?
                .append_child(&c)?;
            c
        };
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("no 2d context"))?
            .dyn_into()?;

        let (w, h) = viewport(win);
        canvas.set_width(w as u32);
        canvas.set_height(h as u32);
        let field = ParticleField::seeded(config, w, h, rng);
        log::debug!("particle canvas {w}x{h}, {} particles", field.particles().len());
        Ok(Self { canvas, ctx, field })
    }

    /// Re-fit the canvas to the viewport. Particle coordinates are not rescaled.
    pub fn resize(&mut self, win: &Window) {
        let (w, h) = viewport(win);
        self.canvas.set_width(w as u32);
        self.canvas.set_height(h as u32);
        self.field.resize(w, h);
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    /// One animation frame: clear, step, draw.
    pub fn frame(&mut self) {
        let (w, h) = self.field.bounds();
        self.ctx.clear_rect(0.0, 0.0, w, h);
        self.field.step();
        for p in self.field.particles() {
            self.ctx.begin_path();
            if self.ctx.arc(p.x, p.y, p.size, 0.0, PI * 2.0).is_err() {
                continue;
            }
            self.ctx.set_fill_style_str(&p.fill_style());
            self.ctx.fill();
        }
    }
}

fn viewport(win: &Window) -> (f64, f64) {
    let w = win.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    let h = win.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    (w, h)
}
