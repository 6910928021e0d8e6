//! Typed CSS values: lengths, colors, shadows
//!
//! Values stay unresolved in computed-style snapshots (a percentage is kept
//! as a percentage) and reduce to pixels only when queried, so that change
//! detection compares what the rule author wrote.

use crate::geometry::Border;
use smallvec::SmallVec;
use std::fmt;

/// Unit of a length value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
  /// Device-independent pixels.
  Px,
  /// Percentage of a reference size supplied at query time.
  Percent,
  /// Multiples of the current font size.
  Em,
}

/// A scalar plus unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Length {
  pub value: f64,
  pub unit: Unit,
}

impl Length {
  pub const ZERO: Self = Self {
    value: 0.0,
    unit: Unit::Px,
  };

  pub const fn px(value: f64) -> Self {
    Self {
      value,
      unit: Unit::Px,
    }
  }

  pub const fn percent(value: f64) -> Self {
    Self {
      value,
      unit: Unit::Percent,
    }
  }

  pub const fn em(value: f64) -> Self {
    Self {
      value,
      unit: Unit::Em,
    }
  }

  /// Reduces to pixels. `reference` resolves percentages (the caller picks
  /// it; box code uses 100), `font_size` resolves font-relative units.
  pub fn reduce(&self, reference: f64, font_size: f64) -> f64 {
    match self.unit {
      Unit::Px => self.value,
      Unit::Percent => self.value * reference / 100.0,
      Unit::Em => self.value * font_size,
    }
  }

  /// Smaller of two lengths, compared after reduction.
  pub fn min(self, other: Length, reference: f64, font_size: f64) -> Length {
    if self.reduce(reference, font_size) <= other.reduce(reference, font_size) {
      self
    } else {
      other
    }
  }

  /// Larger of two lengths, compared after reduction.
  pub fn max(self, other: Length, reference: f64, font_size: f64) -> Length {
    if self.reduce(reference, font_size) >= other.reduce(reference, font_size) {
      self
    } else {
      other
    }
  }

  /// Clamps between `lo` and `hi` after reduction.
  pub fn clamp(self, lo: Length, hi: Length, reference: f64, font_size: f64) -> Length {
    self.max(lo, reference, font_size).min(hi, reference, font_size)
  }
}

impl fmt::Display for Length {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.unit {
      Unit::Px => write!(f, "{}px", self.value),
      Unit::Percent => write!(f, "{}%", self.value),
      Unit::Em => write!(f, "{}em", self.value),
    }
  }
}

/// Rounds an ordinary length to whole pixels: toward zero when >= 1,
/// toward +inf when < 1. Keeps sub-pixel hairlines from collapsing to
/// nothing. Exactly 1.0 floors to 1; negative values round toward zero.
pub fn round_length(d: f64) -> i32 {
  if d < 1.0 {
    d.ceil() as i32
  } else {
    d.floor() as i32
  }
}

/// Rounds min-width/min-height upward, so a fractional minimum never
/// under-allocates by a pixel.
pub fn round_length_ceil(d: f64) -> i32 {
  d.ceil() as i32
}

/// An RGBA color with its premultiplied form precomputed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
  pub red: f32,
  pub green: f32,
  pub blue: f32,
  pub alpha: f32,
}

impl Color {
  pub const TRANSPARENT: Self = Self {
    red: 0.0,
    green: 0.0,
    blue: 0.0,
    alpha: 0.0,
  };
  pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
  pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);

  pub const fn rgb(red: f32, green: f32, blue: f32) -> Self {
    Self {
      red,
      green,
      blue,
      alpha: 1.0,
    }
  }

  pub const fn rgba(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
    Self {
      red,
      green,
      blue,
      alpha,
    }
  }

  pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
    Self::rgba(
      r as f32 / 255.0,
      g as f32 / 255.0,
      b as f32 / 255.0,
      a as f32 / 255.0,
    )
  }

  /// Components with alpha premultiplied, as the renderer consumes them.
  pub fn premultiplied(&self) -> [f32; 4] {
    [
      self.red * self.alpha,
      self.green * self.alpha,
      self.blue * self.alpha,
      self.alpha,
    ]
  }

  pub fn is_transparent(&self) -> bool {
    self.alpha <= 0.0
  }
}

impl fmt::Display for Color {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let r = (self.red * 255.0).round() as u8;
    let g = (self.green * 255.0).round() as u8;
    let b = (self.blue * 255.0).round() as u8;
    if (self.alpha - 1.0).abs() < f32::EPSILON {
      write!(f, "rgb({},{},{})", r, g, b)
    } else {
      write!(f, "rgba({},{},{},{})", r, g, b, self.alpha)
    }
  }
}

/// One box shadow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shadow {
  pub hoffset: Length,
  pub voffset: Length,
  pub blur: Length,
  pub spread: Length,
  pub color: Color,
  pub inset: bool,
}

impl fmt::Display for Shadow {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.inset {
      write!(f, "inset ")?;
    }
    write!(f, "{} {}", self.hoffset, self.voffset)?;
    let blur = self.blur.value != 0.0;
    let spread = self.spread.value != 0.0;
    if blur || spread {
      write!(f, " {}", self.blur)?;
    }
    if spread {
      write!(f, " {}", self.spread)?;
    }
    write!(f, " {}", self.color)
  }
}

/// Radius of the clip a gaussian blur needs, in whole pixels.
///
/// 3/4 * sqrt(2*pi) per side covers the significant tail of the kernel.
fn blur_clip_radius(blur: f64) -> f64 {
  let scale = 0.75 * (2.0 * std::f64::consts::PI).sqrt();
  (blur * scale + 0.5).floor()
}

/// Ordered list of shadows; empty means `box-shadow: none`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShadowList {
  pub shadows: SmallVec<[Shadow; 2]>,
}

impl ShadowList {
  pub fn none() -> Self {
    Self::default()
  }

  pub fn is_none(&self) -> bool {
    self.shadows.is_empty()
  }

  /// Merges the outward inflation of every non-inset shadow into
  /// `extents`. Each side keeps the maximum over the list; inset shadows
  /// never inflate the clip.
  pub fn extents(&self, extents: &mut Border) {
    for shadow in &self.shadows {
      if shadow.inset {
        continue;
      }
      let clip = blur_clip_radius(shadow.blur.reduce(0.0, 0.0));
      let spread = shadow.spread.reduce(0.0, 0.0);
      let hoffset = shadow.hoffset.reduce(0.0, 0.0);
      let voffset = shadow.voffset.reduce(0.0, 0.0);

      extents.top = extents.top.max((clip + spread - voffset).ceil() as i32);
      extents.right = extents.right.max((clip + spread + hoffset).ceil() as i32);
      extents.bottom = extents.bottom.max((clip + spread + voffset).ceil() as i32);
      extents.left = extents.left.max((clip + spread - hoffset).ceil() as i32);
    }
  }
}

impl fmt::Display for ShadowList {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.shadows.is_empty() {
      return f.write_str("none");
    }
    for (i, shadow) in self.shadows.iter().enumerate() {
      if i > 0 {
        f.write_str(", ")?;
      }
      write!(f, "{}", shadow)?;
    }
    Ok(())
  }
}
