//! Integer geometry for allocation and clipping
//!
//! The engine allocates in whole device-independent pixels: allocations,
//! clips and box edges are all integer rectangles. The coordinate system has
//! its origin at the top-left corner, X growing right and Y growing down.

use std::fmt;

/// A rectangle in allocation space.
///
/// Used for widget allocations, gadget boxes and clip regions. Width and
/// height may be negative transiently ("not yet allocated" is encoded as
/// -1x-1); all public box getters clamp to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
  pub x: i32,
  pub y: i32,
  pub width: i32,
  pub height: i32,
}

impl Rect {
  pub const ZERO: Self = Self {
    x: 0,
    y: 0,
    width: 0,
    height: 0,
  };

  pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
    Self { x, y, width, height }
  }

  /// Whether the point lies inside the rectangle. The right and bottom
  /// edges are exclusive.
  pub fn contains_point(&self, x: i32, y: i32) -> bool {
    x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
  }

  /// Smallest rectangle covering both `self` and `other`.
  pub fn union(&self, other: &Rect) -> Rect {
    let x1 = self.x.min(other.x);
    let y1 = self.y.min(other.y);
    let x2 = (self.x + self.width).max(other.x + other.width);
    let y2 = (self.y + self.height).max(other.y + other.height);
    Rect::new(x1, y1, x2 - x1, y2 - y1)
  }

  /// Whether `other` lies entirely inside `self`.
  pub fn contains_rect(&self, other: &Rect) -> bool {
    other.x >= self.x
      && other.y >= self.y
      && other.x + other.width <= self.x + self.width
      && other.y + other.height <= self.y + self.height
  }

  /// Shrinks the rectangle by a border on each side. Dimensions are not
  /// clamped; callers decide how to handle negative results.
  pub fn shrink(&self, border: &Border) -> Rect {
    Rect::new(
      self.x + border.left,
      self.y + border.top,
      self.width - border.left - border.right,
      self.height - border.top - border.bottom,
    )
  }

  /// Grows the rectangle by a border on each side.
  pub fn inflate(&self, border: &Border) -> Rect {
    Rect::new(
      self.x - border.left,
      self.y - border.top,
      self.width + border.left + border.right,
      self.height + border.top + border.bottom,
    )
  }

  pub fn is_empty(&self) -> bool {
    self.width <= 0 || self.height <= 0
  }
}

impl fmt::Display for Rect {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
  }
}

/// Four per-side integers.
///
/// Used interchangeably for margins, border widths, paddings and shadow
/// extents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Border {
  pub top: i32,
  pub right: i32,
  pub bottom: i32,
  pub left: i32,
}

impl Border {
  pub const ZERO: Self = Self {
    top: 0,
    right: 0,
    bottom: 0,
    left: 0,
  };

  pub const fn new(top: i32, right: i32, bottom: i32, left: i32) -> Self {
    Self {
      top,
      right,
      bottom,
      left,
    }
  }

  /// Per-side sum of two borders.
  pub fn add(&self, other: &Border) -> Border {
    Border::new(
      self.top + other.top,
      self.right + other.right,
      self.bottom + other.bottom,
      self.left + other.left,
    )
  }

  pub fn horizontal(&self) -> i32 {
    self.left + self.right
  }

  pub fn vertical(&self) -> i32 {
    self.top + self.bottom
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn union_covers_both() {
    let a = Rect::new(0, 0, 10, 10);
    let b = Rect::new(5, 5, 10, 10);
    let u = a.union(&b);
    assert_eq!(u, Rect::new(0, 0, 15, 15));
    assert!(u.contains_rect(&a));
    assert!(u.contains_rect(&b));
  }

  #[test]
  fn contains_point_excludes_far_edges() {
    let r = Rect::new(10, 10, 5, 5);
    assert!(r.contains_point(10, 10));
    assert!(r.contains_point(14, 14));
    assert!(!r.contains_point(15, 10));
    assert!(!r.contains_point(10, 15));
  }

  #[test]
  fn shrink_then_inflate_round_trips() {
    let r = Rect::new(0, 0, 100, 50);
    let b = Border::new(1, 2, 3, 4);
    assert_eq!(r.shrink(&b).inflate(&b), r);
  }
}
