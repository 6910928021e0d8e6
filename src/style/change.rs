//! Style-change categories and their reduction to invalidation requests.

use bitflags::bitflags;

bitflags! {
  /// What a computed-style difference touches. Produced by diffing two
  /// snapshots property by property, consumed by change propagation.
  #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
  pub struct ChangeMask: u8 {
    /// Measured size may differ; requires a full resize cycle.
    const SIZE = 1 << 0;
    /// The clip region may differ; requires re-allocation.
    const CLIP = 1 << 1;
    /// Pixels may differ; requires a redraw.
    const REDRAW = 1 << 2;
    /// Text attributes (foreground, text shadow) changed.
    const TEXT_ATTRS = 1 << 3;
    /// Font properties changed; font-derived caches must be dropped.
    const FONT = 1 << 4;
  }
}

/// The invalidation request a change mask reduces to. Exactly one request
/// is issued per change; the strongest category wins because each level
/// subsumes the ones below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invalidation {
  Resize,
  Allocate,
  Draw,
  None,
}

impl ChangeMask {
  pub fn invalidation(self) -> Invalidation {
    if self.contains(ChangeMask::SIZE) {
      Invalidation::Resize
    } else if self.contains(ChangeMask::CLIP) {
      Invalidation::Allocate
    } else if self.contains(ChangeMask::REDRAW) {
      Invalidation::Draw
    } else {
      Invalidation::None
    }
  }
}

/// Payload of the style-changed signal: both snapshots plus the folded
/// difference mask. The mask is never empty when the signal fires.
#[derive(Debug, Clone)]
pub struct StyleChange {
  pub old: std::rc::Rc<crate::style::computed::ComputedStyle>,
  pub new: std::rc::Rc<crate::style::computed::ComputedStyle>,
  pub mask: ChangeMask,
}
