//! Drawing contract between the engine and a display backend
//!
//! The engine hands over world-space rectangles and asset keys. Mapping to
//! screen pixels (scale and offset) is the backend's job, via [`Viewport`].

#[cfg(target_arch = "wasm32")]
pub mod canvas2d;

use glam::Vec2;

use crate::assets::Loader;
use crate::error::AssetError;
use crate::sim::Rect;

#[cfg(target_arch = "wasm32")]
pub use canvas2d::Canvas2d;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
}

/// Overlay text style. Text positions are in screen pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub color: &'static str,
    pub size_px: f32,
    pub align: TextAlign,
}

impl TextStyle {
    pub fn new(color: &'static str, size_px: f32) -> Self {
        Self {
            color,
            size_px,
            align: TextAlign::Left,
        }
    }

    pub fn centered(mut self) -> Self {
        self.align = TextAlign::Center;
        self
    }

    /// CSS font shorthand
    pub fn font(&self) -> String {
        format!("{}px Arial", self.size_px)
    }
}

/// Display backend used by the render pass
pub trait Canvas {
    fn clear(&mut self);
    /// Draw the asset stored under `key` into a world-space rectangle.
    fn draw_image(&mut self, key: &str, dest: Rect) -> Result<(), AssetError>;
    fn draw_text(&mut self, text: &str, pos: Vec2, style: &TextStyle);
    /// Screen size in pixels
    fn size(&self) -> Vec2;
}

/// World -> screen mapping: `(p + offset) * scale`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scale: Vec2,
    pub offset: Vec2,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scale: Vec2::ONE,
            offset: Vec2::ZERO,
        }
    }
}

impl Viewport {
    /// Stretch a `world` sized area over a `screen` sized canvas
    pub fn fit(world: Vec2, screen: Vec2) -> Self {
        Self {
            scale: screen / world,
            offset: Vec2::ZERO,
        }
    }

    pub fn set_scale(&mut self, x: f32, y: f32) {
        self.scale = Vec2::new(x, y);
    }

    pub fn set_offset(&mut self, x: f32, y: f32) {
        self.offset = Vec2::new(x, y);
    }

    pub fn to_screen(&self, rect: Rect) -> Rect {
        Rect {
            pos: (rect.pos + self.offset) * self.scale,
            size: (rect.size * self.scale).abs(),
        }
    }
}

/// A recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    Image { key: String, dest: Rect },
    Text { text: String, pos: Vec2 },
}

/// Backend without a display: resolves assets and records screen-space calls.
///
/// Used by the native runner and by tests.
pub struct RecordingCanvas<A> {
    pub assets: Loader<A>,
    pub viewport: Viewport,
    size: Vec2,
    commands: Vec<DrawCommand>,
}

impl<A> RecordingCanvas<A> {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            assets: Loader::new(),
            viewport: Viewport::default(),
            size: Vec2::new(width, height),
            commands: Vec::new(),
        }
    }

    /// Calls since the last clear
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn images(&self) -> impl Iterator<Item = (&str, Rect)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Image { key, dest } => Some((key.as_str(), *dest)),
            _ => None,
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

impl<A> Canvas for RecordingCanvas<A> {
    fn clear(&mut self) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear);
    }

    fn draw_image(&mut self, key: &str, dest: Rect) -> Result<(), AssetError> {
        self.assets.get(key)?;
        self.commands.push(DrawCommand::Image {
            key: key.to_owned(),
            dest: self.viewport.to_screen(dest),
        });
        Ok(())
    }

    fn draw_text(&mut self, text: &str, pos: Vec2, _style: &TextStyle) {
        self.commands.push(DrawCommand::Text {
            text: text.to_owned(),
            pos,
        });
    }

    fn size(&self) -> Vec2 {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_maps_world_to_screen() {
        let mut vp = Viewport::fit(Vec2::new(21.0, 30.0), Vec2::new(420.0, 600.0));
        assert_eq!(vp.scale, Vec2::new(20.0, 20.0));
        vp.set_offset(1.0, 0.0);
        let r = vp.to_screen(Rect::new(1.0, 2.0, 0.5, 1.0));
        assert_eq!(r, Rect::new(40.0, 40.0, 10.0, 20.0));
    }

    #[test]
    fn test_flipped_scale_keeps_size_positive() {
        let mut vp = Viewport::default();
        vp.set_scale(-2.0, 1.0);
        let r = vp.to_screen(Rect::new(1.0, 1.0, 3.0, 1.0));
        assert_eq!(r.pos.x, -2.0);
        assert_eq!(r.size, Vec2::new(6.0, 1.0));
    }

    #[test]
    fn test_recording_canvas_requires_loaded_asset() {
        let mut canvas: RecordingCanvas<()> = RecordingCanvas::new(100.0, 100.0);
        let dest = Rect::new(0.0, 0.0, 1.0, 1.0);
        assert_eq!(
            canvas.draw_image("ball", dest),
            Err(AssetError::NotFound("ball".into()))
        );
        canvas.assets.request("ball", "ball.png");
        canvas.assets.complete("ball", ());
        canvas.clear();
        canvas.draw_image("ball", dest).unwrap();
        canvas.draw_text("hi", Vec2::ZERO, &TextStyle::new("#fff", 10.0));
        assert_eq!(canvas.images().count(), 1);
        assert_eq!(canvas.texts().collect::<Vec<_>>(), vec!["hi"]);
        assert_eq!(canvas.commands()[0], DrawCommand::Clear);
    }
}
