//! Background, border and focus-outline rendering
//!
//! Everything here reduces to filled rectangles on the renderer. `rect` is
//! always the border-box (the margin-box shrunk by the margin).

use crate::css::properties::PropertyId;
use crate::geometry::Rect;
use crate::host::Renderer;
use crate::state::JunctionSides;
use crate::style::computed::ComputedStyle;

pub fn render_background(style: &ComputedStyle, renderer: &mut dyn Renderer, rect: Rect) {
  let color = style.color(PropertyId::BackgroundColor);
  if color.is_transparent() || rect.is_empty() {
    return;
  }
  renderer.fill_rect(rect, color);
}

/// Draws the border as four strips with the per-side widths from the
/// style. Sides named in `junction` abut an adjacent box and are skipped so
/// the shared edge is not drawn twice.
pub fn render_border(
  style: &ComputedStyle,
  renderer: &mut dyn Renderer,
  rect: Rect,
  junction: JunctionSides,
) {
  let color = style.color(PropertyId::BorderColor);
  if color.is_transparent() || rect.is_empty() {
    return;
  }
  let border = style.border();

  if border.top > 0 && !junction.contains(JunctionSides::TOP) {
    renderer.fill_rect(Rect::new(rect.x, rect.y, rect.width, border.top), color);
  }
  if border.bottom > 0 && !junction.contains(JunctionSides::BOTTOM) {
    renderer.fill_rect(
      Rect::new(rect.x, rect.y + rect.height - border.bottom, rect.width, border.bottom),
      color,
    );
  }
  let inner_y = rect.y + border.top;
  let inner_h = rect.height - border.top - border.bottom;
  if border.left > 0 && !junction.contains(JunctionSides::LEFT) {
    renderer.fill_rect(Rect::new(rect.x, inner_y, border.left, inner_h), color);
  }
  if border.right > 0 && !junction.contains(JunctionSides::RIGHT) {
    renderer.fill_rect(
      Rect::new(rect.x + rect.width - border.right, inner_y, border.right, inner_h),
      color,
    );
  }
}

/// The rectangle the focus outline occupies, `outline-offset` outside the
/// border-box. Degenerate boxes smaller than a negative offset collapse the
/// outline onto their center line.
fn outline_rect(style: &ComputedStyle, rect: Rect) -> Rect {
  let width = style.pixels(PropertyId::OutlineWidth);
  let offset = style.pixels(PropertyId::OutlineOffset);

  let (x, w) = if rect.width <= -2 * offset {
    (rect.x + rect.width / 2 - width, 2 * width)
  } else {
    (rect.x - offset - width, rect.width + 2 * (offset + width))
  };
  let (y, h) = if rect.height <= -2 * offset {
    (rect.y + rect.height / 2 - width, 2 * width)
  } else {
    (rect.y - offset - width, rect.height + 2 * (offset + width))
  };
  Rect::new(x, y, w, h)
}

/// The clip the focus outline would need, or `None` when no outline is
/// configured.
pub fn outline_clip(style: &ComputedStyle, rect: Rect) -> Option<Rect> {
  if style.pixels(PropertyId::OutlineWidth) <= 0 {
    return None;
  }
  Some(outline_rect(style, rect))
}

pub fn render_outline(style: &ComputedStyle, renderer: &mut dyn Renderer, rect: Rect) {
  let width = style.pixels(PropertyId::OutlineWidth);
  if width <= 0 {
    return;
  }
  let color = style.color(PropertyId::OutlineColor);
  if color.is_transparent() {
    return;
  }
  let outer = outline_rect(style, rect);
  renderer.fill_rect(Rect::new(outer.x, outer.y, outer.width, width), color);
  renderer.fill_rect(
    Rect::new(outer.x, outer.y + outer.height - width, outer.width, width),
    color,
  );
  let inner_h = outer.height - 2 * width;
  renderer.fill_rect(Rect::new(outer.x, outer.y + width, width, inner_h), color);
  renderer.fill_rect(
    Rect::new(outer.x + outer.width - width, outer.y + width, width, inner_h),
    color,
  );
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::css::properties::{Value, ALL_PROPERTIES, PROPERTY_COUNT};
  use crate::css::value::{Color, Length};
  use crate::host::{IconSource, TextLayout};
  use crate::style::computed::DEFAULT_FONT_SIZE;

  struct RectLog(Vec<(Rect, Color)>);

  impl Renderer for RectLog {
    fn fill_rect(&mut self, rect: Rect, color: Color) {
      self.0.push((rect, color));
    }
    fn draw_layout(&mut self, _: &dyn TextLayout, _: i32, _: i32, _: Color) {}
    fn draw_icon(&mut self, _: &dyn IconSource, _: Rect) {}
  }

  fn style_with(sets: &[(crate::css::properties::PropertyId, Value)]) -> ComputedStyle {
    let mut values: [Value; PROPERTY_COUNT] = std::array::from_fn(|i| ALL_PROPERTIES[i].initial_value());
    for (p, v) in sets {
      values[p.index()] = v.clone();
    }
    ComputedStyle::from_parts(values, DEFAULT_FONT_SIZE)
  }

  #[test]
  fn junction_sides_suppress_their_strip() {
    let style = style_with(&[
      (PropertyId::BorderTopWidth, Value::Length(Length::px(2.0))),
      (PropertyId::BorderBottomWidth, Value::Length(Length::px(2.0))),
      (PropertyId::BorderLeftWidth, Value::Length(Length::px(2.0))),
      (PropertyId::BorderRightWidth, Value::Length(Length::px(2.0))),
    ]);
    let mut log = RectLog(Vec::new());
    render_border(&style, &mut log, Rect::new(0, 0, 50, 20), JunctionSides::LEFT);
    assert_eq!(log.0.len(), 3);
    // No strip starts at the left edge spanning the full height.
    assert!(log.0.iter().all(|(r, _)| !(r.x == 0 && r.width == 2)));
  }

  #[test]
  fn outline_sits_offset_outside_the_border_box() {
    let style = style_with(&[
      (PropertyId::OutlineWidth, Value::Length(Length::px(2.0))),
      (PropertyId::OutlineOffset, Value::Length(Length::px(3.0))),
    ]);
    let clip = outline_clip(&style, Rect::new(10, 10, 20, 20)).unwrap();
    assert_eq!(clip, Rect::new(5, 5, 30, 30));
  }

  #[test]
  fn no_outline_means_no_clip() {
    let style = style_with(&[]);
    assert!(outline_clip(&style, Rect::new(0, 0, 10, 10)).is_none());
  }

  #[test]
  fn transparent_background_draws_nothing() {
    let style = style_with(&[]);
    let mut log = RectLog(Vec::new());
    render_background(&style, &mut log, Rect::new(0, 0, 10, 10));
    assert!(log.0.is_empty());
  }
}
