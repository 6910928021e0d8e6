//! Per-screen provider registry
//!
//! A screen owns the ordered provider list every node on it cascades
//! against. Adding or removing a provider bumps the screen serial; node
//! style caches tagged with an older serial are stale and recompute on the
//! next query.

use crate::css::provider::StyleProvider;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

pub struct Screen {
  /// Ascending priority; insertion order preserved among equals.
  providers: RefCell<Vec<(u16, Rc<StyleProvider>)>>,
  serial: Cell<u64>,
}

impl Screen {
  pub fn new() -> Rc<Screen> {
    Rc::new(Screen {
      providers: RefCell::new(Vec::new()),
      serial: Cell::new(0),
    })
  }

  /// Registers `provider` at `priority`, after any provider already at the
  /// same priority so later additions win ties.
  pub fn add_provider(&self, provider: Rc<StyleProvider>, priority: u16) {
    let mut providers = self.providers.borrow_mut();
    let pos = providers.partition_point(|(p, _)| *p <= priority);
    providers.insert(pos, (priority, provider));
    drop(providers);
    self.bump();
  }

  /// Unregisters `provider`; a no-op when it was never added.
  pub fn remove_provider(&self, provider: &Rc<StyleProvider>) {
    let mut providers = self.providers.borrow_mut();
    let before = providers.len();
    providers.retain(|(_, p)| !Rc::ptr_eq(p, provider));
    let removed = providers.len() != before;
    drop(providers);
    if removed {
      self.bump();
    }
  }

  pub fn serial(&self) -> u64 {
    self.serial.get()
  }

  fn bump(&self) {
    self.serial.set(self.serial.get() + 1);
  }

  /// The provider list in cascade order. Cloned so the cascade never holds
  /// a borrow across node recursion.
  pub(crate) fn providers_snapshot(&self) -> Vec<(u16, Rc<StyleProvider>)> {
    self.providers.borrow().clone()
  }

  /// Every declaration matching `node` across all providers, ordered by
  /// (priority, specificity, source order).
  pub fn declarations_for_node<T: crate::css::selector::SelectorTarget>(
    &self,
    node: &T,
  ) -> Vec<crate::style::cascade::MatchedDeclaration> {
    crate::style::cascade::declarations_for_node(node, &self.providers_snapshot())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::css::provider::{PRIORITY_APPLICATION, PRIORITY_THEME, PRIORITY_USER};

  #[test]
  fn providers_stay_ordered_by_priority_then_insertion() {
    let screen = Screen::new();
    let a = StyleProvider::new();
    let b = StyleProvider::new();
    let c = StyleProvider::new();
    let d = StyleProvider::new();
    screen.add_provider(a.clone(), PRIORITY_USER);
    screen.add_provider(b.clone(), PRIORITY_THEME);
    screen.add_provider(c.clone(), PRIORITY_APPLICATION);
    screen.add_provider(d.clone(), PRIORITY_THEME);

    let order: Vec<u16> = screen.providers_snapshot().iter().map(|(p, _)| *p).collect();
    assert_eq!(order, vec![PRIORITY_THEME, PRIORITY_THEME, PRIORITY_APPLICATION, PRIORITY_USER]);
    // b precedes d at the shared priority.
    let snapshot = screen.providers_snapshot();
    assert!(Rc::ptr_eq(&snapshot[0].1, &b));
    assert!(Rc::ptr_eq(&snapshot[1].1, &d));
  }

  #[test]
  fn add_and_remove_bump_the_serial() {
    let screen = Screen::new();
    let p = StyleProvider::new();
    let s0 = screen.serial();
    screen.add_provider(p.clone(), PRIORITY_APPLICATION);
    let s1 = screen.serial();
    assert_ne!(s0, s1);
    screen.remove_provider(&p);
    assert_ne!(s1, screen.serial());
    // Removing again changes nothing.
    let s2 = screen.serial();
    screen.remove_provider(&p);
    assert_eq!(s2, screen.serial());
  }
}
