//! Frozen computed-style snapshots
//!
//! A snapshot holds one value per property in the closed set. Snapshots are
//! immutable once built; change detection diffs two snapshots property by
//! property and folds each differing property's categories into a
//! [`ChangeMask`].

use crate::css::properties::{PropertyId, Value, ALL_PROPERTIES, PROPERTY_COUNT};
use crate::css::value::{round_length, round_length_ceil, Color, Length, ShadowList};
use crate::geometry::Border;
use crate::style::change::ChangeMask;

/// Default font size in pixels when no ancestor sets one.
pub const DEFAULT_FONT_SIZE: f64 = 14.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ComputedStyle {
  values: [Value; PROPERTY_COUNT],
  /// Font size resolved to pixels during the cascade, cached for the
  /// length queries below.
  font_size: f64,
}

impl ComputedStyle {
  /// Every property at its initial value.
  pub fn initial() -> ComputedStyle {
    let values = std::array::from_fn(|i| ALL_PROPERTIES[i].initial_value());
    ComputedStyle {
      values,
      font_size: DEFAULT_FONT_SIZE,
    }
  }

  pub(crate) fn from_parts(values: [Value; PROPERTY_COUNT], font_size: f64) -> ComputedStyle {
    ComputedStyle { values, font_size }
  }

  pub fn get(&self, property: PropertyId) -> &Value {
    &self.values[property.index()]
  }

  /// Font size in pixels, already resolved against the ancestor chain.
  pub fn font_size(&self) -> f64 {
    self.font_size
  }

  fn length(&self, property: PropertyId) -> Length {
    match self.get(property) {
      Value::Length(l) => *l,
      _ => Length::ZERO,
    }
  }

  /// A length property reduced to whole pixels. Ordinary lengths round
  /// down above one pixel and up below it; minimum sizes always round up
  /// so a fractional minimum never loses a pixel.
  pub fn pixels(&self, property: PropertyId) -> i32 {
    let reduced = self.length(property).reduce(100.0, self.font_size);
    match property {
      PropertyId::MinWidth | PropertyId::MinHeight => round_length_ceil(reduced),
      _ => round_length(reduced),
    }
  }

  pub fn color(&self, property: PropertyId) -> Color {
    match self.get(property) {
      Value::Color(c) => *c,
      _ => Color::TRANSPARENT,
    }
  }

  pub fn shadows(&self, property: PropertyId) -> &ShadowList {
    match self.get(property) {
      Value::Shadows(s) => s,
      _ => {
        static NONE: ShadowList = ShadowList {
          shadows: smallvec::SmallVec::new_const(),
        };
        &NONE
      }
    }
  }

  pub fn margin(&self) -> Border {
    Border::new(
      self.pixels(PropertyId::MarginTop),
      self.pixels(PropertyId::MarginRight),
      self.pixels(PropertyId::MarginBottom),
      self.pixels(PropertyId::MarginLeft),
    )
  }

  pub fn border(&self) -> Border {
    Border::new(
      self.pixels(PropertyId::BorderTopWidth),
      self.pixels(PropertyId::BorderRightWidth),
      self.pixels(PropertyId::BorderBottomWidth),
      self.pixels(PropertyId::BorderLeftWidth),
    )
  }

  pub fn padding(&self) -> Border {
    Border::new(
      self.pixels(PropertyId::PaddingTop),
      self.pixels(PropertyId::PaddingRight),
      self.pixels(PropertyId::PaddingBottom),
      self.pixels(PropertyId::PaddingLeft),
    )
  }

  /// The outward inflation the box-shadow list forces on the clip.
  pub fn shadow_extents(&self) -> Border {
    let mut extents = Border::ZERO;
    self.shadows(PropertyId::BoxShadow).extents(&mut extents);
    extents
  }

  /// Folds the categories of every property that differs between the two
  /// snapshots. Equal snapshots produce the empty mask.
  pub fn changes(&self, other: &ComputedStyle) -> ChangeMask {
    let mut mask = ChangeMask::empty();
    for property in ALL_PROPERTIES {
      if self.values[property.index()] != other.values[property.index()] {
        mask |= property.affects();
      }
    }
    mask
  }
}

impl Default for ComputedStyle {
  fn default() -> Self {
    Self::initial()
  }
}
