//! Progress bar built from gadgets
//!
//! Three boxes: a `progressbar` root, a `trough` and a `progress` child
//! inside it, plus an optional `text` box for the value label. The widget
//! has two display regimes. In fraction mode the progress box fills the
//! trough proportionally; in activity mode a fixed-width block bounces
//! between the trough ends, driven by `pulse` timestamps and frame ticks.

use crate::gadget::{Gadget, GadgetContent, SizeRequest};
use crate::geometry::Rect;
use crate::host::{Renderer, TextShaper, WidgetHost};
use crate::state::{Orientation, TextDirection};
use crate::tree::node::StyleNode;
use crate::tree::screen::Screen;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

const MIN_HORIZONTAL_BAR_WIDTH: i32 = 150;
const MIN_HORIZONTAL_BAR_HEIGHT: i32 = 6;
const MIN_VERTICAL_BAR_WIDTH: i32 = 7;
const MIN_VERTICAL_BAR_HEIGHT: i32 = 80;

/// Fraction of the trough the activity block moves per pulse interval.
const DEFAULT_PULSE_STEP: f64 = 0.1;
/// The activity block is one Nth of the trough plus the progress minimum.
const ACTIVITY_BLOCKS: i32 = 5;

#[derive(Clone, Copy, PartialEq, Eq)]
enum ActivityDir {
  Forward,
  Backward,
}

pub struct ProgressBar {
  host: Weak<dyn WidgetHost>,
  shaper: Rc<dyn TextShaper>,

  root: Rc<Gadget>,
  text_gadget: Rc<Gadget>,
  trough: Rc<Gadget>,
  progress: Rc<Gadget>,

  orientation: Cell<Orientation>,
  inverted: Cell<bool>,
  fraction: Cell<f64>,
  show_text: Cell<bool>,
  text: RefCell<Option<String>>,

  pulse_step: Cell<f64>,
  activity_mode: Cell<bool>,
  activity_pos: Cell<f64>,
  activity_dir: Cell<ActivityDir>,
  /// Timestamps (µs) of the last two pulses. `pulse1 == 0` means the
  /// activity block is parked, waiting for the next pulse.
  pulse1: Cell<i64>,
  pulse2: Cell<i64>,
  /// Start of the activity tick timeline, in µs.
  tick_start: Cell<i64>,
  last_iteration: Cell<f64>,
}

struct RootContent(Weak<ProgressBar>);
struct TextContent(Weak<ProgressBar>);
struct TroughContent(Weak<ProgressBar>);

fn attach(child: &StyleNode, parent: &StyleNode) {
  // Freshly created nodes on the same screen cannot form a cycle.
  child
    .set_parent(Some(parent))
    .expect("attaching a fresh style node");
}

impl ProgressBar {
  pub fn new(screen: &Rc<Screen>, host: Weak<dyn WidgetHost>, shaper: Rc<dyn TextShaper>) -> Rc<ProgressBar> {
    let root_node = StyleNode::new("progressbar", screen);
    root_node.add_class("horizontal");
    let text_node = StyleNode::new("text", screen);
    text_node.set_visible(false);
    attach(&text_node, &root_node);
    let trough_node = StyleNode::new("trough", screen);
    attach(&trough_node, &root_node);
    let progress_node = StyleNode::new("progress", screen);
    attach(&progress_node, &trough_node);

    let bar = Rc::new_cyclic(|weak: &Weak<ProgressBar>| ProgressBar {
      host: host.clone(),
      shaper,
      root: Gadget::new(root_node, host.clone(), Box::new(RootContent(weak.clone()))),
      text_gadget: Gadget::new(text_node, host.clone(), Box::new(TextContent(weak.clone()))),
      trough: Gadget::new(trough_node, host.clone(), Box::new(TroughContent(weak.clone()))),
      progress: Gadget::new(progress_node, host, Box::new(crate::gadget::EmptyContent)),
      orientation: Cell::new(Orientation::Horizontal),
      inverted: Cell::new(false),
      fraction: Cell::new(0.0),
      show_text: Cell::new(false),
      text: RefCell::new(None),
      pulse_step: Cell::new(DEFAULT_PULSE_STEP),
      activity_mode: Cell::new(false),
      activity_pos: Cell::new(0.0),
      activity_dir: Cell::new(ActivityDir::Forward),
      pulse1: Cell::new(0),
      pulse2: Cell::new(0),
      tick_start: Cell::new(0),
      last_iteration: Cell::new(0.0),
    });
    bar.update_fraction_classes();
    bar.update_node_classes();
    bar
  }

  pub fn node(&self) -> &StyleNode {
    self.root.node()
  }

  pub fn trough_node(&self) -> &StyleNode {
    self.trough.node()
  }

  pub fn progress_node(&self) -> &StyleNode {
    self.progress.node()
  }

  pub fn fraction(&self) -> f64 {
    self.fraction.get()
  }

  /// Leaves activity mode and shows `fraction` of the trough filled.
  pub fn set_fraction(&self, fraction: f64) {
    self.fraction.set(fraction.clamp(0.0, 1.0));
    if self.activity_mode.get() {
      self.act_mode_leave();
    }
    self.update_fraction_classes();
    self.update_node_classes();
    self.queue_allocate();
  }

  pub fn text(&self) -> Option<String> {
    self.text.borrow().clone()
  }

  pub fn set_text(&self, text: Option<&str>) {
    *self.text.borrow_mut() = text.map(str::to_owned);
    self.queue_resize();
  }

  pub fn show_text(&self) -> bool {
    self.show_text.get()
  }

  pub fn set_show_text(&self, show: bool) {
    if self.show_text.get() == show {
      return;
    }
    self.show_text.set(show);
    self.text_gadget.set_visible(show);
    self.queue_resize();
  }

  pub fn inverted(&self) -> bool {
    self.inverted.get()
  }

  pub fn set_inverted(&self, inverted: bool) {
    if self.inverted.get() == inverted {
      return;
    }
    self.inverted.set(inverted);
    self.update_node_classes();
    self.queue_allocate();
  }

  pub fn orientation(&self) -> Orientation {
    self.orientation.get()
  }

  pub fn set_orientation(&self, orientation: Orientation) {
    if self.orientation.get() == orientation {
      return;
    }
    self.orientation.set(orientation);
    let node = self.root.node();
    match orientation {
      Orientation::Horizontal => {
        node.add_class("horizontal");
        node.remove_class("vertical");
      }
      Orientation::Vertical => {
        node.add_class("vertical");
        node.remove_class("horizontal");
      }
    }
    self.update_node_classes();
    self.queue_resize();
  }

  pub fn pulse_step(&self) -> f64 {
    self.pulse_step.get()
  }

  pub fn set_pulse_step(&self, step: f64) {
    self.pulse_step.set(step.clamp(0.0, 1.0));
  }

  pub fn is_activity_mode(&self) -> bool {
    self.activity_mode.get()
  }

  /// Current activity-block position in `[0, 1]` along the trough.
  pub fn activity_position(&self) -> f64 {
    self.activity_pos.get()
  }

  /// Switches to activity mode (on the first call) and records a pulse at
  /// `now` µs. The tick callback paces block movement off the interval
  /// between the last two pulses.
  pub fn pulse(&self, now: i64) {
    if !self.activity_mode.get() {
      self.act_mode_enter(now);
    }
    self.pulse1.set(self.pulse2.get());
    self.pulse2.set(now);
  }

  /// Frame-clock tick. Moves the activity block by a step proportional to
  /// the elapsed tick time over the pulse interval; when pulses stop
  /// arriving for three intervals the block parks until the next pulse.
  pub fn tick(&self, frame_time: i64) {
    if self.pulse2.get() == 0 && self.pulse1.get() == 0 {
      return;
    }

    let iteration = (frame_time - self.tick_start.get()) as f64 / 1_000_000.0;
    let pulse_iterations = (self.pulse2.get() - self.pulse1.get()) as f64 / 1_000_000.0;
    let current_iterations = (frame_time - self.pulse1.get()) as f64 / 1_000_000.0;

    let step = self.pulse_step.get() * (iteration - self.last_iteration.get())
      / pulse_iterations.max(current_iterations);
    self.last_iteration.set(iteration);

    if current_iterations > 3.0 * pulse_iterations {
      self.pulse1.set(0);
      return;
    }

    self.advance_activity(step);
    self.queue_allocate();
  }

  /// One bounce step: the block moves by `step` in its current direction
  /// and reverses when it hits an end of the trough.
  pub fn advance_activity(&self, step: f64) {
    match self.activity_dir.get() {
      ActivityDir::Forward => {
        let pos = self.activity_pos.get() + step;
        if pos > 1.0 {
          self.activity_pos.set(1.0);
          self.activity_dir.set(ActivityDir::Backward);
        } else {
          self.activity_pos.set(pos);
        }
      }
      ActivityDir::Backward => {
        let pos = self.activity_pos.get() - step;
        if pos <= 0.0 {
          self.activity_pos.set(0.0);
          self.activity_dir.set(ActivityDir::Forward);
        } else {
          self.activity_pos.set(pos);
        }
      }
    }
    self.update_node_classes();
  }

  pub fn measure(&self, orientation: Orientation, for_size: i32) -> SizeRequest {
    self.root.measure(orientation, for_size)
  }

  /// Allocates the whole widget and returns the draw clip.
  pub fn size_allocate(&self, allocation: Rect) -> Rect {
    self.root.allocate(allocation, -1)
  }

  pub fn draw(&self, renderer: &mut dyn Renderer) {
    self.root.draw(renderer);
  }

  /// `inverted` with the text direction folded in: horizontal bars flip in
  /// right-to-left locales.
  fn effective_inverted(&self) -> bool {
    let mut inverted = self.inverted.get();
    if self.direction() == TextDirection::Rtl && self.orientation.get() == Orientation::Horizontal {
      inverted = !inverted;
    }
    inverted
  }

  fn direction(&self) -> TextDirection {
    self.host.upgrade().map_or(TextDirection::Ltr, |h| h.direction())
  }

  fn act_mode_enter(&self, now: i64) {
    self.activity_mode.set(true);
    self.progress.add_class("pulse");
    if !self.effective_inverted() {
      self.activity_pos.set(0.0);
      self.activity_dir.set(ActivityDir::Forward);
    } else {
      self.activity_pos.set(1.0);
      self.activity_dir.set(ActivityDir::Backward);
    }
    self.pulse1.set(0);
    self.pulse2.set(0);
    self.tick_start.set(now);
    self.last_iteration.set(0.0);
    self.update_fraction_classes();
    self.update_node_classes();
  }

  fn act_mode_leave(&self) {
    self.activity_mode.set(false);
    self.progress.remove_class("pulse");
    self.update_node_classes();
  }

  /// `empty` / `full` on the trough, only meaningful in fraction mode.
  fn update_fraction_classes(&self) {
    let activity = self.activity_mode.get();
    let fraction = self.fraction.get();
    set_class(self.trough.node(), "empty", !activity && fraction <= 0.0);
    set_class(self.trough.node(), "full", !activity && fraction >= 1.0);
  }

  /// Edge classes on the progress box: which trough ends the box touches.
  fn update_node_classes(&self) {
    let horizontal = self.orientation.get() == Orientation::Horizontal;
    let (mut left, mut right, mut top, mut bottom) = (false, false, false, false);

    if self.activity_mode.get() {
      let pos = self.activity_pos.get();
      if horizontal {
        left = pos <= 0.0;
        right = pos >= 1.0;
      } else {
        top = pos <= 0.0;
        bottom = pos >= 1.0;
      }
    } else {
      let inverted = self.effective_inverted();
      let fraction = self.fraction.get();
      if horizontal {
        left = !inverted || fraction >= 1.0;
        right = inverted || fraction >= 1.0;
      } else {
        top = !inverted || fraction >= 1.0;
        bottom = inverted || fraction >= 1.0;
      }
    }

    let node = self.progress.node();
    set_class(node, "left", left);
    set_class(node, "right", right);
    set_class(node, "top", top);
    set_class(node, "bottom", bottom);
  }

  /// The text shown in the label: the custom string, or the fraction as a
  /// whole percentage.
  fn effective_text(&self) -> String {
    match &*self.text.borrow() {
      Some(text) => text.clone(),
      None => format!("{:.0}%", self.fraction.get() * 100.0),
    }
  }

  /// Positions the progress box inside the trough's content area.
  fn allocate_progress(&self, content: &Rect) -> Rect {
    let horizontal = self.orientation.get() == Orientation::Horizontal;
    let bar_axis = if horizontal { Orientation::Horizontal } else { Orientation::Vertical };
    let progress_min = self.progress.measure(bar_axis, -1).minimum;

    let mut alloc = *content;
    if self.activity_mode.get() {
      let pos = self.activity_pos.get();
      if horizontal {
        alloc.width = progress_min + (content.width - progress_min) / ACTIVITY_BLOCKS;
        alloc.x = content.x + (pos * (content.width - alloc.width) as f64) as i32;
      } else {
        alloc.height = progress_min + (content.height - progress_min) / ACTIVITY_BLOCKS;
        alloc.y = content.y + (pos * (content.height - alloc.height) as f64) as i32;
      }
    } else {
      let fraction = self.fraction.get();
      let inverted = self.effective_inverted();
      if horizontal {
        alloc.width = progress_min + ((content.width - progress_min) as f64 * fraction) as i32;
        if inverted {
          alloc.x = content.x + content.width - alloc.width;
        }
      } else {
        alloc.height = progress_min + ((content.height - progress_min) as f64 * fraction) as i32;
        if inverted {
          alloc.y = content.y + content.height - alloc.height;
        }
      }
    }
    alloc
  }

  fn queue_resize(&self) {
    if let Some(host) = self.host.upgrade() {
      host.queue_resize();
    }
  }

  fn queue_allocate(&self) {
    if let Some(host) = self.host.upgrade() {
      host.queue_allocate();
    }
  }
}

fn set_class(node: &StyleNode, class: &str, present: bool) {
  if present {
    node.add_class(class);
  } else {
    node.remove_class(class);
  }
}

impl GadgetContent for RootContent {
  fn measure(&self, _: &Gadget, orientation: Orientation, for_size: i32) -> SizeRequest {
    let Some(bar) = self.0.upgrade() else {
      return SizeRequest::ZERO;
    };
    let trough = bar.trough.measure(orientation, for_size);
    if !bar.show_text.get() {
      return trough;
    }
    let text = bar.text_gadget.measure(orientation, for_size);
    // The label stacks on the cross axis and shares the bar axis.
    if orientation == bar.orientation.get() {
      SizeRequest::without_baseline(trough.minimum.max(text.minimum), trough.natural.max(text.natural))
    } else {
      SizeRequest::without_baseline(trough.minimum + text.minimum, trough.natural + text.natural)
    }
  }

  fn allocate(&self, _: &Gadget, content: &Rect, _: i32) -> Rect {
    let Some(bar) = self.0.upgrade() else {
      return Rect::ZERO;
    };
    let mut trough_rect = *content;
    let mut clip = Rect::ZERO;
    if bar.show_text.get() {
      let mut text_rect = *content;
      match bar.orientation.get() {
        Orientation::Horizontal => {
          let h = bar.text_gadget.measure(Orientation::Vertical, -1).minimum;
          text_rect.height = h;
          trough_rect.y += h;
          trough_rect.height -= h;
        }
        Orientation::Vertical => {
          let w = bar.text_gadget.measure(Orientation::Horizontal, -1).minimum;
          text_rect.width = w;
          trough_rect.x += w;
          trough_rect.width -= w;
        }
      }
      clip = bar.text_gadget.allocate(text_rect, -1);
    }
    let trough_clip = bar.trough.allocate(trough_rect, -1);
    if clip.width > 0 && clip.height > 0 {
      trough_clip.union(&clip)
    } else {
      trough_clip
    }
  }

  fn draw(&self, _: &Gadget, renderer: &mut dyn Renderer, _: &Rect) -> bool {
    let Some(bar) = self.0.upgrade() else {
      return false;
    };
    if bar.show_text.get() {
      bar.text_gadget.draw(renderer);
    }
    bar.trough.draw(renderer);
    false
  }
}

impl GadgetContent for TextContent {
  fn measure(&self, _: &Gadget, orientation: Orientation, _: i32) -> SizeRequest {
    let Some(bar) = self.0.upgrade() else {
      return SizeRequest::ZERO;
    };
    let layout = bar.shaper.layout(&bar.effective_text());
    let (w, h) = layout.pixel_size();
    match orientation {
      Orientation::Horizontal => SizeRequest::without_baseline(w, w),
      Orientation::Vertical => SizeRequest::without_baseline(h, h),
    }
  }

  fn draw(&self, gadget: &Gadget, renderer: &mut dyn Renderer, content: &Rect) -> bool {
    let Some(bar) = self.0.upgrade() else {
      return false;
    };
    let layout = bar.shaper.layout(&bar.effective_text());
    let (w, h) = layout.pixel_size();
    let x = content.x + (content.width - w) / 2;
    let y = content.y + (content.height - h) / 2;
    let color = gadget.style().color(crate::css::properties::PropertyId::Color);
    renderer.draw_layout(&*layout, x, y, color);
    false
  }
}

impl GadgetContent for TroughContent {
  fn measure(&self, _: &Gadget, orientation: Orientation, _: i32) -> SizeRequest {
    let Some(bar) = self.0.upgrade() else {
      return SizeRequest::ZERO;
    };
    let size = match (bar.orientation.get(), orientation) {
      (Orientation::Horizontal, Orientation::Horizontal) => MIN_HORIZONTAL_BAR_WIDTH,
      (Orientation::Horizontal, Orientation::Vertical) => MIN_HORIZONTAL_BAR_HEIGHT,
      (Orientation::Vertical, Orientation::Horizontal) => MIN_VERTICAL_BAR_WIDTH,
      (Orientation::Vertical, Orientation::Vertical) => MIN_VERTICAL_BAR_HEIGHT,
    };
    SizeRequest::without_baseline(size, size)
  }

  fn allocate(&self, _: &Gadget, content: &Rect, _: i32) -> Rect {
    let Some(bar) = self.0.upgrade() else {
      return Rect::ZERO;
    };
    let alloc = bar.allocate_progress(content);
    bar.progress.allocate(alloc, -1)
  }

  fn draw(&self, _: &Gadget, renderer: &mut dyn Renderer, _: &Rect) -> bool {
    let Some(bar) = self.0.upgrade() else {
      return false;
    };
    if bar.activity_mode.get() || bar.fraction.get() > 0.0 {
      bar.progress.draw(renderer);
    }
    false
  }
}
