//! The style node tree
//!
//! Nodes carry the selector-visible configuration (name, id, classes,
//! state, visibility) plus tree links. Every mutation revalidates the
//! node's subtree eagerly: the cascade reruns, the old and new snapshots
//! are diffed into a change mask, and the node's style-changed handlers run
//! when the mask is non-empty.
//!
//! Handles are `Rc`-backed and cheap to clone; equality is identity.

use crate::css::selector::SelectorTarget;
use crate::error::{Error, Result};
use crate::intern::{intern, try_intern, Symbol};
use crate::state::{JunctionSides, StateFlags};
use crate::style::cascade::compute_style;
use crate::style::change::StyleChange;
use crate::style::computed::ComputedStyle;
use crate::tree::screen::Screen;
use smallvec::SmallVec;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

pub type StyleChangedHandler = Box<dyn Fn(&StyleChange)>;

struct NodeInner {
  screen: Rc<Screen>,
  name: Cell<Option<Symbol>>,
  id: Cell<Option<Symbol>>,
  /// Kept sorted so configuration equality is order-independent.
  classes: RefCell<SmallVec<[Symbol; 4]>>,
  state: Cell<StateFlags>,
  visible: Cell<bool>,
  junction_sides: Cell<JunctionSides>,
  parent: RefCell<Weak<NodeInner>>,
  children: RefCell<Vec<StyleNode>>,
  style: RefCell<Option<Rc<ComputedStyle>>>,
  /// Screen serial the cached style was computed under.
  style_serial: Cell<u64>,
  handlers: RefCell<Vec<StyleChangedHandler>>,
}

#[derive(Clone)]
pub struct StyleNode(Rc<NodeInner>);

impl PartialEq for StyleNode {
  fn eq(&self, other: &StyleNode) -> bool {
    Rc::ptr_eq(&self.0, &other.0)
  }
}
impl Eq for StyleNode {}

impl fmt::Debug for StyleNode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("StyleNode")
      .field("name", &self.0.name.get())
      .field("id", &self.0.id.get())
      .field("classes", &self.0.classes.borrow())
      .field("state", &self.0.state.get())
      .field("visible", &self.0.visible.get())
      .finish()
  }
}

impl StyleNode {
  pub fn new(name: &str, screen: &Rc<Screen>) -> StyleNode {
    StyleNode(Rc::new(NodeInner {
      screen: screen.clone(),
      name: Cell::new(Some(intern(name))),
      id: Cell::new(None),
      classes: RefCell::new(SmallVec::new()),
      state: Cell::new(StateFlags::empty()),
      visible: Cell::new(true),
      junction_sides: Cell::new(JunctionSides::empty()),
      parent: RefCell::new(Weak::new()),
      children: RefCell::new(Vec::new()),
      style: RefCell::new(None),
      style_serial: Cell::new(0),
      handlers: RefCell::new(Vec::new()),
    }))
  }

  pub fn screen(&self) -> &Rc<Screen> {
    &self.0.screen
  }

  pub fn name(&self) -> Option<Symbol> {
    self.0.name.get()
  }

  pub fn set_name(&self, name: &str) {
    let name = Some(intern(name));
    if self.0.name.replace(name) != name {
      self.revalidate_subtree();
    }
  }

  pub fn id(&self) -> Option<Symbol> {
    self.0.id.get()
  }

  pub fn set_id(&self, id: Option<&str>) {
    let id = id.map(intern);
    if self.0.id.replace(id) != id {
      self.revalidate_subtree();
    }
  }

  pub fn add_class(&self, class: &str) {
    let class = intern(class);
    let mut classes = self.0.classes.borrow_mut();
    if let Err(pos) = classes.binary_search(&class) {
      classes.insert(pos, class);
      drop(classes);
      self.revalidate_subtree();
    }
  }

  pub fn remove_class(&self, class: &str) {
    // Never interned means never added anywhere.
    let Some(class) = try_intern(class) else {
      return;
    };
    let mut classes = self.0.classes.borrow_mut();
    if let Ok(pos) = classes.binary_search(&class) {
      classes.remove(pos);
      drop(classes);
      self.revalidate_subtree();
    }
  }

  pub fn has_class(&self, class: &str) -> bool {
    match try_intern(class) {
      Some(class) => self.0.classes.borrow().binary_search(&class).is_ok(),
      None => false,
    }
  }

  pub fn classes(&self) -> Vec<Symbol> {
    self.0.classes.borrow().to_vec()
  }

  pub fn get_state(&self) -> StateFlags {
    self.0.state.get()
  }

  pub fn set_state(&self, state: StateFlags) {
    if self.0.state.replace(state) != state {
      self.revalidate_subtree();
    }
  }

  pub fn add_state(&self, state: StateFlags) {
    self.set_state(self.0.state.get() | state);
  }

  pub fn remove_state(&self, state: StateFlags) {
    self.set_state(self.0.state.get() - state);
  }

  pub fn get_visible(&self) -> bool {
    self.0.visible.get()
  }

  /// Invisible nodes keep their tree position but are skipped by sibling
  /// combinators, so toggling visibility can restyle following siblings.
  pub fn set_visible(&self, visible: bool) {
    if self.0.visible.replace(visible) != visible {
      match self.parent() {
        Some(parent) => parent.revalidate_subtree(),
        None => self.revalidate_subtree(),
      }
    }
  }

  pub fn junction_sides(&self) -> JunctionSides {
    self.0.junction_sides.get()
  }

  pub fn set_junction_sides(&self, sides: JunctionSides) {
    self.0.junction_sides.set(sides);
  }

  pub fn parent(&self) -> Option<StyleNode> {
    self.0.parent.borrow().upgrade().map(StyleNode)
  }

  pub fn children(&self) -> Vec<StyleNode> {
    self.0.children.borrow().clone()
  }

  pub fn first_child(&self) -> Option<StyleNode> {
    self.0.children.borrow().first().cloned()
  }

  pub fn last_child(&self) -> Option<StyleNode> {
    self.0.children.borrow().last().cloned()
  }

  fn position_in(&self, parent: &StyleNode) -> Option<usize> {
    parent.0.children.borrow().iter().position(|c| c == self)
  }

  fn is_ancestor_of(&self, other: &StyleNode) -> bool {
    let mut current = Some(other.clone());
    while let Some(node) = current {
      if node == *self {
        return true;
      }
      current = node.parent();
    }
    false
  }

  fn unlink(&self) -> Option<StyleNode> {
    let parent = self.parent()?;
    let pos = self.position_in(&parent)?;
    parent.0.children.borrow_mut().remove(pos);
    *self.0.parent.borrow_mut() = Weak::new();
    Some(parent)
  }

  fn link_at(&self, parent: &StyleNode, compute_index: impl Fn(&StyleNode) -> Result<usize>) -> Result<()> {
    if self.is_ancestor_of(parent) {
      return Err(Error::InvalidRelation("node would become its own ancestor"));
    }
    // Validate before unlinking so a failed insert leaves the tree alone.
    compute_index(parent)?;
    let old_parent = self.unlink();
    // Recompute: a same-parent unlink shifted the child list.
    let index = compute_index(parent)?;
    parent.0.children.borrow_mut().insert(index, self.clone());
    *self.0.parent.borrow_mut() = Rc::downgrade(&parent.0);
    if let Some(old) = old_parent {
      if old != *parent {
        old.revalidate_subtree();
      }
    }
    // Siblings after the insertion point can match differently too, so
    // the whole parent subtree revalidates.
    parent.revalidate_subtree();
    Ok(())
  }

  /// Appends under `parent`, or detaches when `parent` is `None`.
  pub fn set_parent(&self, parent: Option<&StyleNode>) -> Result<()> {
    match parent {
      Some(parent) => self.link_at(parent, |p| Ok(p.0.children.borrow().len())),
      None => {
        self.detach();
        Ok(())
      }
    }
  }

  /// Inserts under `parent` immediately before `sibling`; appends when
  /// `sibling` is `None`.
  pub fn insert_before(&self, parent: &StyleNode, sibling: Option<&StyleNode>) -> Result<()> {
    if sibling == Some(self) {
      return Err(Error::InvalidRelation("node cannot be its own sibling"));
    }
    match sibling {
      Some(sibling) => self.link_at(parent, |p| {
        sibling
          .position_in(p)
          .ok_or(Error::InvalidRelation("sibling is not a child of parent"))
      }),
      None => self.link_at(parent, |p| Ok(p.0.children.borrow().len())),
    }
  }

  /// Inserts under `parent` immediately after `sibling`; prepends when
  /// `sibling` is `None`.
  pub fn insert_after(&self, parent: &StyleNode, sibling: Option<&StyleNode>) -> Result<()> {
    if sibling == Some(self) {
      return Err(Error::InvalidRelation("node cannot be its own sibling"));
    }
    match sibling {
      Some(sibling) => self.link_at(parent, |p| {
        sibling
          .position_in(p)
          .map(|pos| pos + 1)
          .ok_or(Error::InvalidRelation("sibling is not a child of parent"))
      }),
      None => self.link_at(parent, |_| Ok(0)),
    }
  }

  /// Removes the node from its parent. The node keeps its own subtree and
  /// restyles it against a parentless cascade.
  pub fn detach(&self) {
    if let Some(old_parent) = self.unlink() {
      old_parent.revalidate_subtree();
      self.revalidate_subtree();
    }
  }

  pub fn previous_sibling(&self) -> Option<StyleNode> {
    let parent = self.parent()?;
    let pos = self.position_in(&parent)?;
    if pos == 0 {
      None
    } else {
      Some(parent.0.children.borrow()[pos - 1].clone())
    }
  }

  pub fn next_sibling(&self) -> Option<StyleNode> {
    let parent = self.parent()?;
    let pos = self.position_in(&parent)?;
    let next = parent.0.children.borrow().get(pos + 1).cloned();
    next
  }

  /// Registers a style-changed handler. Handlers run after the node's
  /// cached style has been replaced, so querying from inside one sees the
  /// new snapshot.
  pub fn connect_style_changed(&self, handler: impl Fn(&StyleChange) + 'static) {
    self.0.handlers.borrow_mut().push(Box::new(handler));
  }

  /// The computed style, recomputing if the cache is stale. Recomputation
  /// that changes the snapshot fires style-changed.
  pub fn style(&self) -> Rc<ComputedStyle> {
    let serial = self.0.screen.serial();
    if self.0.style_serial.get() == serial {
      if let Some(style) = self.0.style.borrow().as_ref() {
        return style.clone();
      }
    }
    self.recompute(serial)
  }

  fn recompute(&self, serial: u64) -> Rc<ComputedStyle> {
    let parent_style = self.parent().map(|p| p.style());
    let providers = self.0.screen.providers_snapshot();
    let new = Rc::new(compute_style(self, &providers, parent_style.as_deref()));

    let old = self.0.style.borrow_mut().replace(new.clone());
    self.0.style_serial.set(serial);

    if let Some(old) = old {
      let mask = old.changes(&new);
      if !mask.is_empty() {
        let change = StyleChange {
          old,
          new: new.clone(),
          mask,
        };
        // Handlers may connect more handlers; emission must not hold the
        // borrow. Handlers connected during emission fire next time.
        let handlers = std::mem::take(&mut *self.0.handlers.borrow_mut());
        for handler in &handlers {
          handler(&change);
        }
        let mut current = self.0.handlers.borrow_mut();
        let added = std::mem::take(&mut *current);
        *current = handlers;
        current.extend(added);
      }
    }
    new
  }

  /// Recomputes this node and every descendant, parents first, firing
  /// style-changed wherever the snapshot differs.
  fn revalidate_subtree(&self) {
    let serial = self.0.screen.serial();
    self.recompute(serial);
    for child in self.children() {
      child.revalidate_subtree();
    }
  }
}

impl SelectorTarget for StyleNode {
  fn node_name(&self) -> Option<Symbol> {
    self.0.name.get()
  }

  fn node_id(&self) -> Option<Symbol> {
    self.0.id.get()
  }

  fn has_style_class(&self, class: Symbol) -> bool {
    self.0.classes.borrow().binary_search(&class).is_ok()
  }

  fn state(&self) -> StateFlags {
    self.0.state.get()
  }

  fn styled_parent(&self) -> Option<StyleNode> {
    self.parent()
  }

  fn previous_visible_sibling(&self) -> Option<StyleNode> {
    let mut current = self.previous_sibling();
    while let Some(node) = current {
      if node.get_visible() {
        return Some(node);
      }
      current = node.previous_sibling();
    }
    None
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::css::properties::PropertyId;
  use crate::css::provider::{StyleProvider, PRIORITY_APPLICATION};
  use crate::css::value::Color;
  use crate::style::change::ChangeMask;

  fn screen_with(text: &str) -> Rc<Screen> {
    let screen = Screen::new();
    let provider = StyleProvider::new();
    provider.load_from_text(text);
    screen.add_provider(provider, PRIORITY_APPLICATION);
    screen
  }

  #[test]
  fn class_toggles_are_idempotent() {
    let screen = Screen::new();
    let node = StyleNode::new("label", &screen);
    node.add_class("dim");
    node.add_class("dim");
    assert_eq!(node.classes().len(), 1);
    node.remove_class("dim");
    assert!(!node.has_class("dim"));
    // Removing a class that was never added is a no-op.
    node.remove_class("never-added-class");
    assert!(node.classes().is_empty());
  }

  #[test]
  fn state_flip_fires_redraw_not_size() {
    let screen = screen_with("label:hover { color: green; }");
    let node = StyleNode::new("label", &screen);
    assert_eq!(node.style().color(PropertyId::Color), Color::BLACK);

    let seen: Rc<RefCell<Vec<ChangeMask>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    node.connect_style_changed(move |change| sink.borrow_mut().push(change.mask));

    node.add_state(StateFlags::HOVER);
    assert_eq!(
      node.style().color(PropertyId::Color),
      Color::from_rgba8(0, 128, 0, 255)
    );
    node.remove_state(StateFlags::HOVER);
    assert_eq!(node.style().color(PropertyId::Color), Color::BLACK);

    let masks = seen.borrow();
    assert_eq!(masks.len(), 2);
    for mask in masks.iter() {
      assert!(mask.contains(ChangeMask::REDRAW));
      assert!(!mask.contains(ChangeMask::SIZE));
    }
  }

  #[test]
  fn reparenting_restyles_against_the_new_ancestry() {
    let screen = screen_with("box label { color: red; }");
    let root = StyleNode::new("box", &screen);
    let label = StyleNode::new("label", &screen);
    assert_eq!(label.style().color(PropertyId::Color), Color::BLACK);
    label.set_parent(Some(&root)).unwrap();
    assert_eq!(label.style().color(PropertyId::Color), Color::rgb(1.0, 0.0, 0.0));
    label.detach();
    assert_eq!(label.style().color(PropertyId::Color), Color::BLACK);
    assert!(label.parent().is_none());
  }

  #[test]
  fn insert_before_and_after_order_children() {
    let screen = Screen::new();
    let parent = StyleNode::new("box", &screen);
    let a = StyleNode::new("a", &screen);
    let b = StyleNode::new("b", &screen);
    let c = StyleNode::new("c", &screen);
    a.set_parent(Some(&parent)).unwrap();
    c.set_parent(Some(&parent)).unwrap();
    b.insert_before(&parent, Some(&c)).unwrap();
    assert_eq!(parent.children(), vec![a.clone(), b.clone(), c.clone()]);

    let d = StyleNode::new("d", &screen);
    d.insert_after(&parent, None).unwrap();
    assert_eq!(parent.children()[0], d);
  }

  #[test]
  fn insert_with_foreign_sibling_is_an_error() {
    let screen = Screen::new();
    let parent = StyleNode::new("box", &screen);
    let other = StyleNode::new("box", &screen);
    let stray = StyleNode::new("a", &screen);
    stray.set_parent(Some(&other)).unwrap();
    let node = StyleNode::new("b", &screen);
    assert!(node.insert_before(&parent, Some(&stray)).is_err());
  }

  #[test]
  fn ancestry_cycles_are_rejected() {
    let screen = Screen::new();
    let a = StyleNode::new("a", &screen);
    let b = StyleNode::new("b", &screen);
    b.set_parent(Some(&a)).unwrap();
    assert!(a.set_parent(Some(&b)).is_err());
  }

  #[test]
  fn invisible_siblings_are_skipped_by_adjacency() {
    let screen = screen_with("image + button { color: red; }");
    let parent = StyleNode::new("box", &screen);
    let image = StyleNode::new("image", &screen);
    let spacer = StyleNode::new("spacer", &screen);
    let button = StyleNode::new("button", &screen);
    image.set_parent(Some(&parent)).unwrap();
    spacer.set_parent(Some(&parent)).unwrap();
    button.set_parent(Some(&parent)).unwrap();
    assert_eq!(button.style().color(PropertyId::Color), Color::BLACK);

    spacer.set_visible(false);
    assert_eq!(button.style().color(PropertyId::Color), Color::rgb(1.0, 0.0, 0.0));
  }

  #[test]
  fn provider_change_invalidates_through_the_serial() {
    let screen = Screen::new();
    let node = StyleNode::new("label", &screen);
    assert_eq!(node.style().color(PropertyId::Color), Color::BLACK);

    let provider = StyleProvider::new();
    provider.load_from_text("label { color: white; }");
    screen.add_provider(provider.clone(), PRIORITY_APPLICATION);
    assert_eq!(node.style().color(PropertyId::Color), Color::WHITE);

    screen.remove_provider(&provider);
    assert_eq!(node.style().color(PropertyId::Color), Color::BLACK);
  }

  #[test]
  fn equal_configurations_compute_equal_styles() {
    let screen = screen_with("label.a.b:hover { color: red; }");
    let x = StyleNode::new("label", &screen);
    x.add_class("a");
    x.add_class("b");
    x.add_state(StateFlags::HOVER);
    let y = StyleNode::new("label", &screen);
    // Same configuration reached along a different history.
    y.add_state(StateFlags::HOVER);
    y.add_class("b");
    y.add_class("zzz");
    y.add_class("a");
    y.remove_class("zzz");
    assert_eq!(*x.style(), *y.style());
  }
}
