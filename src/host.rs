//! Interfaces to external collaborators
//!
//! The engine draws through a renderer, measures text through a shaper and
//! asks the owning widget for invalidation. All of these are supplied by
//! the embedder; the engine never reaches into widget trees or a windowing
//! system directly.

use crate::css::value::Color;
use crate::geometry::Rect;
use crate::state::TextDirection;

/// The owning widget, as the engine sees it. Invalidation requests from
/// change propagation land here.
pub trait WidgetHost {
  /// Type name used in runtime warnings ("node trough, owner ProgressBar").
  fn type_name(&self) -> &'static str;

  /// The widget's allocation in toplevel coordinates. Fallback draw
  /// rectangle, and the origin shift for gadget-local boxes.
  fn allocation(&self) -> Rect;

  /// Whether the widget has its own backing window. Windowless widgets
  /// draw in their parent's coordinate space, so gadget-local boxes
  /// subtract the widget allocation offset.
  fn has_window(&self) -> bool {
    false
  }

  fn direction(&self) -> TextDirection {
    TextDirection::Ltr
  }

  fn queue_resize(&self);
  fn queue_allocate(&self);
  fn queue_draw(&self);
}

/// Minimal 2D surface the engine draws with. Backgrounds, borders and
/// outlines reduce to filled rectangles; content draws text layouts and
/// icons.
pub trait Renderer {
  fn fill_rect(&mut self, rect: Rect, color: Color);
  fn draw_layout(&mut self, layout: &dyn TextLayout, x: i32, y: i32, color: Color);
  fn draw_icon(&mut self, icon: &dyn IconSource, rect: Rect);
}

/// Font ascent and descent in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontMetrics {
  pub ascent: i32,
  pub descent: i32,
}

/// A shaped run of text.
pub trait TextLayout {
  fn pixel_size(&self) -> (i32, i32);
  /// Distance from the layout top to its baseline.
  fn baseline(&self) -> i32;
}

/// Text shaping service.
pub trait TextShaper {
  fn layout(&self, text: &str) -> Box<dyn TextLayout>;
  /// Shapes marked-up text; `None` when the markup does not parse, in
  /// which case callers fall back to the raw text.
  fn layout_markup(&self, markup: &str) -> Option<Box<dyn TextLayout>>;
  fn font_metrics(&self) -> FontMetrics;
}

/// An icon with an intrinsic pixel size.
pub trait IconSource {
  fn width(&self) -> i32;
  fn height(&self) -> i32;
}
