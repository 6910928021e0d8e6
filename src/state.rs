//! Widget state flags, junction sides, orientation and text direction.

use bitflags::bitflags;

bitflags! {
  /// Interaction state of a node, matched by state pseudo-classes.
  #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
  pub struct StateFlags: u16 {
    const ACTIVE = 1 << 0;
    const HOVER = 1 << 1;
    const SELECTED = 1 << 2;
    const DISABLED = 1 << 3;
    const INDETERMINATE = 1 << 4;
    const FOCUSED = 1 << 5;
    const BACKDROP = 1 << 6;
    const DIR_LTR = 1 << 7;
    const DIR_RTL = 1 << 8;
    const LINK = 1 << 9;
    const VISITED = 1 << 10;
    const CHECKED = 1 << 11;
    const DROP_ACTIVE = 1 << 12;
  }
}

impl StateFlags {
  /// The pseudo-class name for a single flag, as serialization emits it.
  pub fn pseudo_name(self) -> Option<&'static str> {
    Some(match self {
      StateFlags::ACTIVE => "active",
      StateFlags::HOVER => "hover",
      StateFlags::SELECTED => "selected",
      StateFlags::DISABLED => "disabled",
      StateFlags::INDETERMINATE => "indeterminate",
      StateFlags::FOCUSED => "focus",
      StateFlags::BACKDROP => "backdrop",
      StateFlags::DIR_LTR => "dir(ltr)",
      StateFlags::DIR_RTL => "dir(rtl)",
      StateFlags::LINK => "link",
      StateFlags::VISITED => "visited",
      StateFlags::CHECKED => "checked",
      StateFlags::DROP_ACTIVE => "drop(active)",
      _ => return None,
    })
  }
}

bitflags! {
  /// Sides of a box that abut an adjacent box. Border rendering skips
  /// junction sides so adjacent boxes do not double their shared edge.
  #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
  pub struct JunctionSides: u8 {
    const TOP = 1 << 0;
    const RIGHT = 1 << 1;
    const BOTTOM = 1 << 2;
    const LEFT = 1 << 3;
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
  Horizontal,
  Vertical,
}

impl Orientation {
  pub fn flip(self) -> Orientation {
    match self {
      Orientation::Horizontal => Orientation::Vertical,
      Orientation::Vertical => Orientation::Horizontal,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextDirection {
  Ltr,
  Rtl,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn single_flags_have_pseudo_names() {
    assert_eq!(StateFlags::HOVER.pseudo_name(), Some("hover"));
    assert_eq!(StateFlags::FOCUSED.pseudo_name(), Some("focus"));
    assert_eq!((StateFlags::HOVER | StateFlags::ACTIVE).pseudo_name(), None);
  }
}
