//! HTML canvas 2D backend

use glam::Vec2;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use super::{Canvas, TextAlign, TextStyle, Viewport};
use crate::assets::Loader;
use crate::error::AssetError;
use crate::sim::Rect;

pub struct Canvas2d {
    element: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    pub assets: Loader<HtmlImageElement>,
    pub viewport: Viewport,
}

impl Canvas2d {
    pub fn new(element: HtmlCanvasElement, width: u32, height: u32) -> Result<Self, JsValue> {
        element.set_width(width);
        element.set_height(height);
        let ctx = element
            .get_context("2d")?
            .ok_or("2d context unavailable")?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self {
            element,
            ctx,
            assets: Loader::new(),
            viewport: Viewport::default(),
        })
    }

    pub fn element(&self) -> &HtmlCanvasElement {
        &self.element
    }

    /// CSS background behind everything the engine draws
    pub fn set_background(&self, url: &str) -> Result<(), JsValue> {
        self.element
            .style()
            .set_property("background-image", &format!("url(\"{url}\")"))
    }
}

impl Canvas for Canvas2d {
    fn clear(&mut self) {
        let size = self.size();
        self.ctx.clear_rect(0.0, 0.0, size.x as f64, size.y as f64);
    }

    fn draw_image(&mut self, key: &str, dest: Rect) -> Result<(), AssetError> {
        let image = self.assets.get(key)?;
        let r = self.viewport.to_screen(dest);
        if let Err(e) = self.ctx.draw_image_with_html_image_element_and_dw_and_dh(
            image,
            r.pos.x as f64,
            r.pos.y as f64,
            r.size.x as f64,
            r.size.y as f64,
        ) {
            log::warn!("drawImage failed for {key}: {e:?}");
        }
        Ok(())
    }

    fn draw_text(&mut self, text: &str, pos: Vec2, style: &TextStyle) {
        self.ctx.set_fill_style_str(style.color);
        self.ctx.set_font(&style.font());
        self.ctx.set_text_align(match style.align {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
        });
        if let Err(e) = self.ctx.fill_text(text, pos.x as f64, pos.y as f64) {
            log::warn!("fillText failed for {text:?}: {e:?}");
        }
    }

    fn size(&self) -> Vec2 {
        Vec2::new(self.element.width() as f32, self.element.height() as f32)
    }
}
