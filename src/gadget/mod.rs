//! Gadgets: one CSS box per widget sub-region
//!
//! A gadget pairs a style node with measure/allocate/draw. The gadget owns
//! the box model: content callbacks only ever see the content box, with
//! margin, border and padding already accounted for, and min-width /
//! min-height already enforced.
//!
//! Runtime style problems (negative allocations, under-sized for_size,
//! minimum above natural) are never fatal. They log a warning naming the
//! node and the owner widget's type, then fall back to a defined result.

pub mod render;

use crate::css::properties::PropertyId;
use crate::geometry::{Border, Rect};
use crate::host::{Renderer, WidgetHost};
use crate::state::{JunctionSides, Orientation, StateFlags};
use crate::style::change::{Invalidation, StyleChange};
use crate::style::computed::ComputedStyle;
use crate::tree::node::StyleNode;
use std::cell::Cell;
use std::rc::{Rc, Weak};

/// Result of a measure pass. Baselines are -1 when the content has none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeRequest {
  pub minimum: i32,
  pub natural: i32,
  pub minimum_baseline: i32,
  pub natural_baseline: i32,
}

impl SizeRequest {
  pub const ZERO: Self = Self {
    minimum: 0,
    natural: 0,
    minimum_baseline: -1,
    natural_baseline: -1,
  };

  pub fn without_baseline(minimum: i32, natural: i32) -> Self {
    Self {
      minimum,
      natural,
      minimum_baseline: -1,
      natural_baseline: -1,
    }
  }
}

/// Content callbacks of a gadget: the four hooks a widget author supplies.
///
/// `measure` and `allocate` speak in content-box terms. `draw` returns
/// whether a focus outline should be rendered around the gadget.
/// `style_changed` returning true claims the change; returning false lets
/// the gadget apply the default mask reduction against the widget host.
pub trait GadgetContent {
  fn measure(&self, gadget: &Gadget, orientation: Orientation, for_size: i32) -> SizeRequest;

  /// Returns the content clip, or `Rect::ZERO` when the content does not
  /// extend past its box.
  fn allocate(&self, gadget: &Gadget, content: &Rect, baseline: i32) -> Rect {
    let _ = (gadget, content, baseline);
    Rect::ZERO
  }

  fn draw(&self, gadget: &Gadget, renderer: &mut dyn Renderer, content: &Rect) -> bool {
    let _ = (gadget, renderer, content);
    false
  }

  fn style_changed(&self, gadget: &Gadget, change: &StyleChange) -> bool {
    let _ = (gadget, change);
    false
  }
}

/// Content with no intrinsic size; for purely decorative boxes like
/// troughs and slider knobs.
pub struct EmptyContent;

impl GadgetContent for EmptyContent {
  fn measure(&self, _: &Gadget, _: Orientation, _: i32) -> SizeRequest {
    SizeRequest::ZERO
  }
}

pub struct Gadget {
  node: StyleNode,
  owner: Weak<dyn WidgetHost>,
  content: Box<dyn GadgetContent>,
  allocated_size: Cell<Rect>,
  allocated_baseline: Cell<i32>,
}

impl Gadget {
  /// Builds a gadget on `node`. The gadget subscribes to the node's
  /// style-changed signal and translates change masks into invalidation
  /// requests on the owner, unless the content claims the change first.
  pub fn new(node: StyleNode, owner: Weak<dyn WidgetHost>, content: Box<dyn GadgetContent>) -> Rc<Gadget> {
    let gadget = Rc::new(Gadget {
      node,
      owner,
      content,
      allocated_size: Cell::new(Rect::new(0, 0, -1, -1)),
      allocated_baseline: Cell::new(-1),
    });
    let weak = Rc::downgrade(&gadget);
    gadget.node.connect_style_changed(move |change| {
      if let Some(gadget) = weak.upgrade() {
        gadget.handle_style_change(change);
      }
    });
    gadget
  }

  pub fn node(&self) -> &StyleNode {
    &self.node
  }

  pub fn owner(&self) -> Option<Rc<dyn WidgetHost>> {
    self.owner.upgrade()
  }

  pub fn get_visible(&self) -> bool {
    self.node.get_visible()
  }

  pub fn set_visible(&self, visible: bool) {
    self.node.set_visible(visible);
  }

  pub fn add_class(&self, class: &str) {
    self.node.add_class(class);
  }

  pub fn remove_class(&self, class: &str) {
    self.node.remove_class(class);
  }

  pub fn set_state(&self, state: StateFlags) {
    self.node.set_state(state);
  }

  pub fn add_state(&self, state: StateFlags) {
    self.node.add_state(state);
  }

  pub fn remove_state(&self, state: StateFlags) {
    self.node.remove_state(state);
  }

  fn node_name(&self) -> &'static str {
    self.node.name().map_or("(anonymous)", |s| s.as_str())
  }

  fn owner_name(&self) -> &'static str {
    self.owner.upgrade().map_or("(unowned)", |o| o.type_name())
  }

  fn handle_style_change(&self, change: &StyleChange) {
    if self.content.style_changed(self, change) {
      return;
    }
    let Some(owner) = self.owner.upgrade() else {
      return;
    };
    match change.mask.invalidation() {
      Invalidation::Resize => owner.queue_resize(),
      Invalidation::Allocate => owner.queue_allocate(),
      Invalidation::Draw => owner.queue_draw(),
      Invalidation::None => {}
    }
  }

  /// Minimum and natural size along `orientation`, given `for_size`
  /// already allocated on the opposite axis (or -1 if unknown). Both the
  /// input and the result are margin-box sizes.
  pub fn measure(&self, orientation: Orientation, mut for_size: i32) -> SizeRequest {
    if !self.node.get_visible() {
      return SizeRequest::ZERO;
    }

    let style = self.node.style();
    let margin = style.margin();
    let border = style.border();
    let padding = style.padding();
    let boxes = margin.add(&border).add(&padding);

    let (extra_size, extra_opposite, extra_baseline, min_size, min_for_size) = match orientation {
      Orientation::Horizontal => (
        boxes.horizontal(),
        boxes.vertical(),
        boxes.left,
        style.pixels(PropertyId::MinWidth),
        style.pixels(PropertyId::MinHeight),
      ),
      Orientation::Vertical => (
        boxes.vertical(),
        boxes.horizontal(),
        boxes.top,
        style.pixels(PropertyId::MinHeight),
        style.pixels(PropertyId::MinWidth),
      ),
    };

    if for_size > -1 {
      if for_size < min_for_size {
        log::warn!(
          "for_size smaller than min-size ({} < {}) while measuring gadget (node {}, owner {})",
          for_size,
          min_for_size,
          self.node_name(),
          self.owner_name()
        );
      }
      for_size = 0.max(for_size - extra_opposite);
    }

    let content = self.content.measure(self, orientation, for_size);
    let minimum = content.minimum;
    let mut natural = content.natural;
    if minimum > natural {
      log::warn!(
        "minimum size {} exceeds natural size {} (node {}, owner {})",
        minimum,
        natural,
        self.node_name(),
        self.owner_name()
      );
      natural = minimum;
    }

    let forced_minimum = minimum.max(min_size);
    let forced_natural = natural.max(min_size);

    // A forced minimum centers the content, so the baseline shifts by half
    // the expansion, then by the leading box edges.
    let shift = |baseline: i32, forced: i32, raw: i32| -> i32 {
      if baseline <= -1 {
        return -1;
      }
      let shifted = (baseline as f64 + 0.5 * (forced - raw) as f64) as i32;
      0.max(shifted + extra_baseline)
    };

    SizeRequest {
      minimum: 0.max(forced_minimum + extra_size),
      natural: 0.max(forced_natural + extra_size),
      minimum_baseline: shift(content.minimum_baseline, forced_minimum, minimum),
      natural_baseline: shift(content.natural_baseline, forced_natural, natural),
    }
  }

  /// Assigns the margin-box `allocation` plus `baseline` and returns the
  /// clip: the margin-box inflated by shadow extents, unioned with the
  /// content clip and the focus-outline clip. The caller unions the result
  /// into its own clip.
  pub fn allocate(&self, allocation: Rect, mut baseline: i32) -> Rect {
    if !self.node.get_visible() {
      return Rect::ZERO;
    }

    self.allocated_size.set(allocation);
    self.allocated_baseline.set(baseline);

    let style = self.node.style();
    let margin = style.margin();
    let extents = margin.add(&style.border()).add(&style.padding());

    let mut content = allocation.shrink(&extents);
    if baseline >= 0 {
      baseline -= extents.top;
    }
    if content.width < 0 {
      log::warn!(
        "Negative content width {} (allocation {}, extents {}x{}) while allocating gadget (node {}, owner {})",
        content.width,
        allocation.width,
        extents.left,
        extents.right,
        self.node_name(),
        self.owner_name()
      );
      content.width = 0;
    }
    if content.height < 0 {
      log::warn!(
        "Negative content height {} (allocation {}, extents {}x{}) while allocating gadget (node {}, owner {})",
        content.height,
        allocation.height,
        extents.top,
        extents.bottom,
        self.node_name(),
        self.owner_name()
      );
      content.height = 0;
    }

    let content_clip = self.content.allocate(self, &content, baseline);

    let shadow = style.shadow_extents();
    let mut clip = Rect::new(
      allocation.x + margin.left - shadow.left,
      allocation.y + margin.top - shadow.top,
      0.max(allocation.width - margin.horizontal() + shadow.horizontal()),
      0.max(allocation.height - margin.vertical() + shadow.vertical()),
    );

    if content_clip.width > 0 && content_clip.height > 0 {
      clip = clip.union(&content_clip);
    }

    let border_box = allocation.shrink(&margin);
    if let Some(outline) = render::outline_clip(&style, border_box) {
      clip = clip.union(&outline);
    }

    clip
  }

  /// Draws background, border, content and (when the content requests it)
  /// the focus outline, in that order, at the allocated position.
  pub fn draw(&self, renderer: &mut dyn Renderer) {
    if !self.node.get_visible() {
      return;
    }

    let mut margin_box = self.margin_box();
    if margin_box.width < 0 || margin_box.height < 0 {
      log::warn!(
        "Drawing a gadget with negative dimensions. Did you forget to allocate a size? (node {} owner {})",
        self.node_name(),
        self.owner_name()
      );
      let fallback = self.owner.upgrade().map_or(Rect::ZERO, |o| o.allocation());
      margin_box = Rect::new(0, 0, fallback.width, fallback.height);
    }

    let style = self.node.style();
    let margin = style.margin();
    let border_box = margin_box.shrink(&margin);

    render::render_background(&style, renderer, border_box);
    render::render_border(&style, renderer, border_box, self.node.junction_sides());

    let content_box = border_box.shrink(&style.border().add(&style.padding()));
    let mut draw_focus = false;
    if content_box.width > 0 && content_box.height > 0 {
      draw_focus = self.content.draw(self, renderer, &content_box);
    }
    if draw_focus {
      render::render_outline(&style, renderer, border_box);
    }
  }

  pub fn allocated_size(&self) -> Rect {
    self.allocated_size.get()
  }

  pub fn allocated_baseline(&self) -> i32 {
    self.allocated_baseline.get()
  }

  /// Translates an allocation-space rectangle into the gadget's local
  /// frame. Windowless owners draw in their parent's coordinates, so the
  /// widget allocation offset is subtracted.
  fn shift(&self, mut rect: Rect) -> Rect {
    if let Some(owner) = self.owner.upgrade() {
      if !owner.has_window() {
        let alloc = owner.allocation();
        rect.x -= alloc.x;
        rect.y -= alloc.y;
      }
    }
    rect
  }

  pub fn margin_box(&self) -> Rect {
    self.shift(self.allocated_size.get())
  }

  pub fn border_box(&self) -> Rect {
    let style = self.node.style();
    self.shift(self.allocated_size.get().shrink(&style.margin()))
  }

  pub fn content_box(&self) -> Rect {
    let style = self.node.style();
    let extents = style.margin().add(&style.border()).add(&style.padding());
    self.shift(self.allocated_size.get().shrink(&extents))
  }

  pub fn margin_box_contains_point(&self, x: i32, y: i32) -> bool {
    self.node.get_visible() && self.margin_box().contains_point(x, y)
  }

  pub fn border_box_contains_point(&self, x: i32, y: i32) -> bool {
    self.node.get_visible() && self.border_box().contains_point(x, y)
  }

  pub fn content_box_contains_point(&self, x: i32, y: i32) -> bool {
    self.node.get_visible() && self.content_box().contains_point(x, y)
  }

  pub fn style(&self) -> Rc<ComputedStyle> {
    self.node.style()
  }

  pub fn set_junction_sides(&self, sides: JunctionSides) {
    self.node.set_junction_sides(sides);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::css::provider::{StyleProvider, PRIORITY_APPLICATION};
  use crate::state::TextDirection;
  use crate::tree::screen::Screen;
  use std::cell::RefCell;

  struct Host {
    resizes: Cell<u32>,
    allocates: Cell<u32>,
    draws: Cell<u32>,
    allocation: Cell<Rect>,
  }

  impl Host {
    fn new() -> Rc<Host> {
      Rc::new(Host {
        resizes: Cell::new(0),
        allocates: Cell::new(0),
        draws: Cell::new(0),
        allocation: Cell::new(Rect::ZERO),
      })
    }
  }

  impl WidgetHost for Host {
    fn type_name(&self) -> &'static str {
      "TestWidget"
    }
    fn allocation(&self) -> Rect {
      self.allocation.get()
    }
    fn direction(&self) -> TextDirection {
      TextDirection::Ltr
    }
    fn queue_resize(&self) {
      self.resizes.set(self.resizes.get() + 1);
    }
    fn queue_allocate(&self) {
      self.allocates.set(self.allocates.get() + 1);
    }
    fn queue_draw(&self) {
      self.draws.set(self.draws.get() + 1);
    }
  }

  struct FixedContent {
    width: i32,
    height: i32,
  }

  impl GadgetContent for FixedContent {
    fn measure(&self, _: &Gadget, orientation: Orientation, _: i32) -> SizeRequest {
      match orientation {
        Orientation::Horizontal => SizeRequest::without_baseline(self.width, self.width),
        Orientation::Vertical => SizeRequest::without_baseline(self.height, self.height),
      }
    }
  }

  fn screen_with(text: &str) -> Rc<Screen> {
    let screen = Screen::new();
    let provider = StyleProvider::new();
    provider.load_from_text(text);
    screen.add_provider(provider, PRIORITY_APPLICATION);
    screen
  }

  fn boxed_gadget(screen: &Rc<Screen>, host: &Rc<Host>, width: i32, height: i32) -> Rc<Gadget> {
    let node = StyleNode::new("node", screen);
    Gadget::new(
      node,
      Rc::downgrade(host) as Weak<dyn WidgetHost>,
      Box::new(FixedContent { width, height }),
    )
  }

  #[test]
  fn measure_sums_margin_border_padding_around_content() {
    let screen = screen_with(
      "node { margin: 1px 2px 3px 4px; border-width: 5px 6px 7px 8px; padding: 9px 10px 11px 12px; }",
    );
    let host = Host::new();
    let gadget = boxed_gadget(&screen, &host, 20, 30);

    let h = gadget.measure(Orientation::Horizontal, -1);
    assert_eq!(h.minimum, 4 + 8 + 12 + 20 + 10 + 6 + 2);
    assert_eq!(h.minimum, 62);
    let v = gadget.measure(Orientation::Vertical, -1);
    assert_eq!(v.minimum, 1 + 5 + 9 + 30 + 11 + 7 + 3);
    assert_eq!(v.minimum, 66);
  }

  #[test]
  fn min_size_forces_the_measured_minimum() {
    let screen = screen_with("node { min-width: 50px; }");
    let host = Host::new();
    let gadget = boxed_gadget(&screen, &host, 20, 30);
    let h = gadget.measure(Orientation::Horizontal, -1);
    assert_eq!(h.minimum, 50);
    assert_eq!(h.natural, 50);
  }

  #[test]
  fn invisible_gadget_measures_zero() {
    let screen = screen_with("node { min-width: 50px; padding: 10px; }");
    let host = Host::new();
    let gadget = boxed_gadget(&screen, &host, 20, 30);
    gadget.set_visible(false);
    assert_eq!(gadget.measure(Orientation::Horizontal, -1), SizeRequest::ZERO);
    assert_eq!(gadget.allocate(Rect::new(0, 0, 100, 100), -1), Rect::ZERO);
  }

  #[test]
  fn measure_is_monotone_in_for_size() {
    struct Tradeoff;
    impl GadgetContent for Tradeoff {
      fn measure(&self, _: &Gadget, orientation: Orientation, for_size: i32) -> SizeRequest {
        // Fixed area of 600: wider allocation needs less height.
        match orientation {
          Orientation::Vertical if for_size > 0 => {
            let h = (600 + for_size - 1) / for_size;
            SizeRequest::without_baseline(h, h)
          }
          _ => SizeRequest::without_baseline(600, 600),
        }
      }
    }
    let screen = Screen::new();
    let host = Host::new();
    let gadget = Gadget::new(
      StyleNode::new("node", &screen),
      Rc::downgrade(&host) as Weak<dyn WidgetHost>,
      Box::new(Tradeoff),
    );
    let mut last = i32::MAX;
    for for_size in [10, 20, 30, 60, 120] {
      let v = gadget.measure(Orientation::Vertical, for_size);
      assert!(v.minimum <= last);
      last = v.minimum;
    }
  }

  #[test]
  fn shadow_inflates_the_clip() {
    let screen = screen_with("node { box-shadow: 5px 5px, -3px 0; }");
    let host = Host::new();
    let gadget = boxed_gadget(&screen, &host, 20, 30);
    let clip = gadget.allocate(Rect::new(10, 10, 100, 40), -1);
    // Margin-box must stay inside the clip.
    assert!(clip.contains_rect(&Rect::new(10, 10, 100, 40)));
    assert!(clip.contains_rect(&Rect::new(7, 10, 108, 45)));
  }

  #[test]
  fn clip_stays_within_shadow_and_outline_extents() {
    let screen = screen_with("node { box-shadow: 5px 5px; outline-width: 2px; outline-offset: 1px; }");
    let host = Host::new();
    let gadget = boxed_gadget(&screen, &host, 20, 30);
    let alloc = Rect::new(0, 0, 50, 50);
    let clip = gadget.allocate(alloc, -1);
    assert!(clip.contains_rect(&alloc));
    let bound = alloc
      .inflate(&gadget.style().shadow_extents())
      .union(&alloc.inflate(&Border::new(3, 3, 3, 3)));
    assert!(bound.contains_rect(&clip));
  }

  #[test]
  fn negative_content_allocation_clamps_to_zero() {
    let screen = screen_with("node { padding: 30px; }");
    let host = Host::new();
    let seen = Rc::new(RefCell::new(Rect::new(-1, -1, -1, -1)));
    struct Capture(Rc<RefCell<Rect>>);
    impl GadgetContent for Capture {
      fn measure(&self, _: &Gadget, _: Orientation, _: i32) -> SizeRequest {
        SizeRequest::ZERO
      }
      fn allocate(&self, _: &Gadget, content: &Rect, _: i32) -> Rect {
        *self.0.borrow_mut() = *content;
        Rect::ZERO
      }
    }
    let gadget = Gadget::new(
      StyleNode::new("node", &screen),
      Rc::downgrade(&host) as Weak<dyn WidgetHost>,
      Box::new(Capture(seen.clone())),
    );
    gadget.allocate(Rect::new(0, 0, 20, 20), -1);
    let content = *seen.borrow();
    assert_eq!(content.width, 0);
    assert_eq!(content.height, 0);
  }

  #[test]
  fn style_changes_reduce_to_the_strongest_request() {
    let screen = Screen::new();
    let host = Host::new();
    let gadget = boxed_gadget(&screen, &host, 10, 10);
    gadget.node().style();

    let provider = StyleProvider::new();
    provider.load_from_text("node { padding: 4px; }");
    screen.add_provider(provider.clone(), PRIORITY_APPLICATION);
    gadget.node().style();
    assert_eq!(host.resizes.get(), 1);
    assert_eq!(host.draws.get(), 0);

    let redraw = StyleProvider::new();
    redraw.load_from_text("node { background-color: red; }");
    screen.add_provider(redraw, PRIORITY_APPLICATION);
    gadget.node().style();
    assert_eq!(host.resizes.get(), 1);
    assert_eq!(host.draws.get(), 1);
  }

  #[test]
  fn contains_point_is_false_when_invisible() {
    let screen = Screen::new();
    let host = Host::new();
    let gadget = boxed_gadget(&screen, &host, 10, 10);
    gadget.allocate(Rect::new(0, 0, 20, 20), -1);
    assert!(gadget.margin_box_contains_point(5, 5));
    gadget.set_visible(false);
    assert!(!gadget.margin_box_contains_point(5, 5));
  }
}
