//! Slider scale built from gadgets
//!
//! The `scale` root holds a `trough` with a `highlight` (the filled span
//! between the start and the slider) and a `slider` knob, plus one `marks`
//! strip per side. Each mark is its own `mark` box containing an
//! `indicator` and, when given text, a `label`. Mark text is markup; when
//! the markup does not parse the raw string is shown instead.

use crate::css::properties::PropertyId;
use crate::gadget::{EmptyContent, Gadget, GadgetContent, SizeRequest};
use crate::geometry::Rect;
use crate::host::{Renderer, TextLayout, TextShaper, WidgetHost};
use crate::state::{Orientation, TextDirection};
use crate::tree::node::StyleNode;
use crate::tree::screen::Screen;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

/// Minimum pixel gap kept between marks on the same side.
const MIN_MARK_SEPARATION: i32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkPosition {
  Top,
  Bottom,
}

struct Mark {
  value: f64,
  position: MarkPosition,
  gadget: Rc<Gadget>,
  indicator: Rc<Gadget>,
  label: Option<Rc<Gadget>>,
  stop_position: Cell<i32>,
}

pub struct Scale {
  host: Weak<dyn WidgetHost>,
  shaper: Rc<dyn TextShaper>,

  root: Rc<Gadget>,
  value_gadget: Rc<Gadget>,
  trough: Rc<Gadget>,
  highlight: Rc<Gadget>,
  slider: Rc<Gadget>,
  top_marks: Rc<Gadget>,
  bottom_marks: Rc<Gadget>,

  /// Sorted by value.
  marks: RefCell<Vec<Rc<Mark>>>,
  orientation: Cell<Orientation>,
  inverted: Cell<bool>,
  draw_value: Cell<bool>,
  digits: Cell<u8>,
  lower: Cell<f64>,
  upper: Cell<f64>,
  value: Cell<f64>,
  /// Trough content box in allocation space, stashed during allocation so
  /// mark strips can place themselves against it.
  trough_content: Cell<Rect>,
}

struct RootContent(Weak<Scale>);
struct TroughContent(Weak<Scale>);
struct MarksContent(Weak<Scale>, MarkPosition);
struct ValueContent(Weak<Scale>);

struct MarkContent {
  indicator: Rc<Gadget>,
  label: Option<Rc<Gadget>>,
  position: MarkPosition,
  scale: Weak<Scale>,
}

/// Shapes a markup label, falling back to the raw text when the markup
/// does not parse.
struct LabelContent {
  shaper: Rc<dyn TextShaper>,
  markup: String,
}

impl LabelContent {
  fn layout(&self) -> Box<dyn TextLayout> {
    match self.shaper.layout_markup(&self.markup) {
      Some(layout) => layout,
      None => self.shaper.layout(&self.markup),
    }
  }
}

fn attach(child: &StyleNode, parent: &StyleNode) {
  // Freshly created nodes on the same screen cannot form a cycle.
  child
    .set_parent(Some(parent))
    .expect("attaching a fresh style node");
}

impl Scale {
  pub fn new(screen: &Rc<Screen>, host: Weak<dyn WidgetHost>, shaper: Rc<dyn TextShaper>) -> Rc<Scale> {
    let root_node = StyleNode::new("scale", screen);
    root_node.add_class("horizontal");
    let value_node = StyleNode::new("value", screen);
    value_node.set_visible(false);
    attach(&value_node, &root_node);
    let top_node = StyleNode::new("marks", screen);
    top_node.add_class("top");
    top_node.set_visible(false);
    attach(&top_node, &root_node);
    let trough_node = StyleNode::new("trough", screen);
    attach(&trough_node, &root_node);
    let highlight_node = StyleNode::new("highlight", screen);
    attach(&highlight_node, &trough_node);
    let slider_node = StyleNode::new("slider", screen);
    attach(&slider_node, &trough_node);
    let bottom_node = StyleNode::new("marks", screen);
    bottom_node.add_class("bottom");
    bottom_node.set_visible(false);
    attach(&bottom_node, &root_node);

    Rc::new_cyclic(|weak: &Weak<Scale>| Scale {
      host: host.clone(),
      shaper,
      root: Gadget::new(root_node, host.clone(), Box::new(RootContent(weak.clone()))),
      value_gadget: Gadget::new(value_node, host.clone(), Box::new(ValueContent(weak.clone()))),
      trough: Gadget::new(trough_node, host.clone(), Box::new(TroughContent(weak.clone()))),
      highlight: Gadget::new(highlight_node, host.clone(), Box::new(EmptyContent)),
      slider: Gadget::new(slider_node, host.clone(), Box::new(EmptyContent)),
      top_marks: Gadget::new(
        top_node,
        host.clone(),
        Box::new(MarksContent(weak.clone(), MarkPosition::Top)),
      ),
      bottom_marks: Gadget::new(
        bottom_node,
        host,
        Box::new(MarksContent(weak.clone(), MarkPosition::Bottom)),
      ),
      marks: RefCell::new(Vec::new()),
      orientation: Cell::new(Orientation::Horizontal),
      inverted: Cell::new(false),
      draw_value: Cell::new(false),
      digits: Cell::new(1),
      lower: Cell::new(0.0),
      upper: Cell::new(1.0),
      value: Cell::new(0.0),
      trough_content: Cell::new(Rect::ZERO),
    })
  }

  pub fn node(&self) -> &StyleNode {
    self.root.node()
  }

  pub fn slider_node(&self) -> &StyleNode {
    self.slider.node()
  }

  pub fn value(&self) -> f64 {
    self.value.get()
  }

  pub fn set_value(&self, value: f64) {
    let clamped = value.clamp(self.lower.get(), self.upper.get());
    if clamped == self.value.get() {
      return;
    }
    self.value.set(clamped);
    self.queue_allocate();
  }

  pub fn set_range(&self, lower: f64, upper: f64) {
    self.lower.set(lower);
    self.upper.set(upper.max(lower));
    self.value.set(self.value.get().clamp(lower, self.upper.get()));
    self.queue_allocate();
  }

  pub fn draw_value(&self) -> bool {
    self.draw_value.get()
  }

  /// Shows the current value as a label next to the trough.
  pub fn set_draw_value(&self, draw: bool) {
    if self.draw_value.get() == draw {
      return;
    }
    self.draw_value.set(draw);
    self.value_gadget.set_visible(draw);
    self.queue_resize();
  }

  /// Decimal places in the value label.
  pub fn set_digits(&self, digits: u8) {
    self.digits.set(digits);
    self.queue_resize();
  }

  fn formatted_value(&self) -> String {
    format!("{:.*}", self.digits.get() as usize, self.value.get())
  }

  pub fn inverted(&self) -> bool {
    self.inverted.get()
  }

  pub fn set_inverted(&self, inverted: bool) {
    if self.inverted.get() == inverted {
      return;
    }
    self.inverted.set(inverted);
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
    self.queue_resize();
  }

  /// Adds a mark at `value` on the given side, keeping marks sorted by
  /// value. `markup` labels the mark; `None` shows only the indicator.
  pub fn add_mark(self: &Rc<Self>, value: f64, position: MarkPosition, markup: Option<&str>) {
    let screen = self.root.node().screen().clone();
    let mark_node = StyleNode::new("mark", &screen);
    let strip = match position {
      MarkPosition::Top => &self.top_marks,
      MarkPosition::Bottom => &self.bottom_marks,
    };
    attach(&mark_node, strip.node());

    let indicator_node = StyleNode::new("indicator", &screen);
    attach(&indicator_node, &mark_node);
    let indicator = Gadget::new(indicator_node, self.host.clone(), Box::new(EmptyContent));

    let label = markup.map(|markup| {
      let label_node = StyleNode::new("label", &screen);
      attach(&label_node, &mark_node);
      Gadget::new(
        label_node,
        self.host.clone(),
        Box::new(LabelContent {
          shaper: self.shaper.clone(),
          markup: markup.to_owned(),
        }),
      )
    });

    let gadget = Gadget::new(
      mark_node,
      self.host.clone(),
      Box::new(MarkContent {
        indicator: indicator.clone(),
        label: label.clone(),
        position,
        scale: Rc::downgrade(self),
      }),
    );

    let mark = Rc::new(Mark {
      value,
      position,
      gadget,
      indicator,
      label,
      stop_position: Cell::new(0),
    });

    let mut marks = self.marks.borrow_mut();
    let at = marks.partition_point(|m| m.value <= value);
    marks.insert(at, mark);
    drop(marks);

    strip.set_visible(true);
    self.queue_resize();
  }

  pub fn clear_marks(&self) {
    for mark in self.marks.borrow_mut().drain(..) {
      mark.gadget.node().detach();
    }
    self.top_marks.set_visible(false);
    self.bottom_marks.set_visible(false);
    self.queue_resize();
  }

  pub fn mark_count(&self) -> usize {
    self.marks.borrow().len()
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

  fn direction(&self) -> TextDirection {
    self.host.upgrade().map_or(TextDirection::Ltr, |h| h.direction())
  }

  /// Whether increasing values run toward the trough origin.
  fn should_invert(&self) -> bool {
    let mut inverted = self.inverted.get();
    if self.direction() == TextDirection::Rtl && self.orientation.get() == Orientation::Horizontal {
      inverted = !inverted;
    }
    inverted
  }

  fn normalize(&self, value: f64) -> f64 {
    let span = self.upper.get() - self.lower.get();
    if span <= 0.0 {
      return 0.0;
    }
    let mut pos = (value - self.lower.get()) / span;
    if self.should_invert() {
      pos = 1.0 - pos;
    }
    pos
  }

  /// Axis coordinate (allocation space) of the trough position for `value`.
  fn stop_for_value(&self, value: f64) -> i32 {
    let content = self.trough_content.get();
    let pos = self.normalize(value);
    match self.orientation.get() {
      Orientation::Horizontal => content.x + (pos * content.width as f64) as i32,
      Orientation::Vertical => content.y + (pos * content.height as f64) as i32,
    }
  }

  /// Slider rectangle inside the trough content box.
  fn allocate_slider(&self, content: &Rect) -> Rect {
    let pos = self.normalize(self.value.get());
    match self.orientation.get() {
      Orientation::Horizontal => {
        let w = self.slider.measure(Orientation::Horizontal, -1).minimum;
        let x = content.x + (pos * (content.width - w) as f64) as i32;
        Rect::new(x, content.y, w, content.height)
      }
      Orientation::Vertical => {
        let h = self.slider.measure(Orientation::Vertical, -1).minimum;
        let y = content.y + (pos * (content.height - h) as f64) as i32;
        Rect::new(content.x, y, content.width, h)
      }
    }
  }

  /// Highlight rectangle: from the trough origin to the slider center, or
  /// from the slider center to the end when inverted.
  fn allocate_highlight(&self, content: &Rect, slider: &Rect) -> Rect {
    let inverted = self.should_invert();
    match self.orientation.get() {
      Orientation::Horizontal => {
        let center = slider.x + slider.width / 2;
        if inverted {
          Rect::new(center, content.y, content.x + content.width - center, content.height)
        } else {
          Rect::new(content.x, content.y, center - content.x, content.height)
        }
      }
      Orientation::Vertical => {
        let center = slider.y + slider.height / 2;
        if inverted {
          Rect::new(content.x, center, content.width, content.y + content.height - center)
        } else {
          Rect::new(content.x, content.y, content.width, center - content.y)
        }
      }
    }
  }

  fn marks_on(&self, position: MarkPosition) -> Vec<Rc<Mark>> {
    self
      .marks
      .borrow()
      .iter()
      .filter(|m| m.position == position)
      .cloned()
      .collect()
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

impl GadgetContent for RootContent {
  fn measure(&self, _: &Gadget, orientation: Orientation, for_size: i32) -> SizeRequest {
    let Some(scale) = self.0.upgrade() else {
      return SizeRequest::ZERO;
    };
    let trough = scale.trough.measure(orientation, for_size);
    let top = scale.top_marks.measure(orientation, -1);
    let bottom = scale.bottom_marks.measure(orientation, -1);
    let value = scale.value_gadget.measure(orientation, -1);
    if orientation == scale.orientation.get() {
      SizeRequest::without_baseline(
        trough.minimum.max(top.minimum).max(bottom.minimum).max(value.minimum),
        trough.natural.max(top.natural).max(bottom.natural).max(value.natural),
      )
    } else {
      SizeRequest::without_baseline(
        trough.minimum + top.minimum + bottom.minimum + value.minimum,
        trough.natural + top.natural + bottom.natural + value.natural,
      )
    }
  }

  fn allocate(&self, _: &Gadget, content: &Rect, _: i32) -> Rect {
    let Some(scale) = self.0.upgrade() else {
      return Rect::ZERO;
    };
    let horizontal = scale.orientation.get() == Orientation::Horizontal;
    let cross = if horizontal { Orientation::Vertical } else { Orientation::Horizontal };
    let top_size = scale.top_marks.measure(cross, -1).minimum;
    let bottom_size = scale.bottom_marks.measure(cross, -1).minimum;

    // The value label takes a strip on the leading cross edge.
    let mut content = *content;
    let mut value_clip = Rect::ZERO;
    if scale.draw_value.get() {
      let size = scale.value_gadget.measure(cross, -1).minimum;
      let value_rect = if horizontal {
        let r = Rect::new(content.x, content.y, content.width, size);
        content.y += size;
        content.height -= size;
        r
      } else {
        let r = Rect::new(content.x, content.y, size, content.height);
        content.x += size;
        content.width -= size;
        r
      };
      value_clip = scale.value_gadget.allocate(value_rect, -1);
    }
    let content = &content;

    let (top_rect, trough_rect, bottom_rect) = if horizontal {
      (
        Rect::new(content.x, content.y, content.width, top_size),
        Rect::new(
          content.x,
          content.y + top_size,
          content.width,
          content.height - top_size - bottom_size,
        ),
        Rect::new(content.x, content.y + content.height - bottom_size, content.width, bottom_size),
      )
    } else {
      (
        Rect::new(content.x, content.y, top_size, content.height),
        Rect::new(
          content.x + top_size,
          content.y,
          content.width - top_size - bottom_size,
          content.height,
        ),
        Rect::new(content.x + content.width - bottom_size, content.y, bottom_size, content.height),
      )
    };

    // Marks position themselves against the trough, so it allocates first.
    let mut clip = scale.trough.allocate(trough_rect, -1);
    for (strip, rect) in [(&scale.top_marks, top_rect), (&scale.bottom_marks, bottom_rect)] {
      let strip_clip = strip.allocate(rect, -1);
      if strip_clip.width > 0 && strip_clip.height > 0 {
        clip = clip.union(&strip_clip);
      }
    }
    if value_clip.width > 0 && value_clip.height > 0 {
      clip = clip.union(&value_clip);
    }
    clip
  }

  fn draw(&self, _: &Gadget, renderer: &mut dyn Renderer, _: &Rect) -> bool {
    let Some(scale) = self.0.upgrade() else {
      return false;
    };
    if scale.draw_value.get() {
      scale.value_gadget.draw(renderer);
    }
    scale.top_marks.draw(renderer);
    scale.bottom_marks.draw(renderer);
    scale.trough.draw(renderer);
    true
  }
}

impl GadgetContent for ValueContent {
  fn measure(&self, _: &Gadget, orientation: Orientation, _: i32) -> SizeRequest {
    let Some(scale) = self.0.upgrade() else {
      return SizeRequest::ZERO;
    };
    // Reserve room for the widest end of the range so the label does not
    // resize while dragging.
    let digits = scale.digits.get() as usize;
    let widest = [scale.lower.get(), scale.upper.get()]
      .iter()
      .map(|v| {
        let layout = scale.shaper.layout(&format!("{:.*}", digits, v));
        layout.pixel_size()
      })
      .fold((0, 0), |acc, (w, h)| (acc.0.max(w), acc.1.max(h)));
    match orientation {
      Orientation::Horizontal => SizeRequest::without_baseline(widest.0, widest.0),
      Orientation::Vertical => SizeRequest::without_baseline(widest.1, widest.1),
    }
  }

  fn draw(&self, gadget: &Gadget, renderer: &mut dyn Renderer, content: &Rect) -> bool {
    let Some(scale) = self.0.upgrade() else {
      return false;
    };
    let layout = scale.shaper.layout(&scale.formatted_value());
    let (w, h) = layout.pixel_size();
    let x = content.x + (content.width - w) / 2;
    let y = content.y + (content.height - h) / 2;
    renderer.draw_layout(&*layout, x, y, gadget.style().color(PropertyId::Color));
    false
  }
}

impl GadgetContent for TroughContent {
  fn measure(&self, _: &Gadget, orientation: Orientation, _: i32) -> SizeRequest {
    let Some(scale) = self.0.upgrade() else {
      return SizeRequest::ZERO;
    };
    // The trough must hold the slider in both directions.
    scale.slider.measure(orientation, -1)
  }

  fn allocate(&self, _: &Gadget, content: &Rect, _: i32) -> Rect {
    let Some(scale) = self.0.upgrade() else {
      return Rect::ZERO;
    };
    scale.trough_content.set(*content);
    let slider_rect = scale.allocate_slider(content);
    let highlight_rect = scale.allocate_highlight(content, &slider_rect);
    let mut clip = scale.highlight.allocate(highlight_rect, -1);
    let slider_clip = scale.slider.allocate(slider_rect, -1);
    if slider_clip.width > 0 && slider_clip.height > 0 {
      clip = if clip.width > 0 && clip.height > 0 {
        clip.union(&slider_clip)
      } else {
        slider_clip
      };
    }
    clip
  }

  fn draw(&self, _: &Gadget, renderer: &mut dyn Renderer, _: &Rect) -> bool {
    let Some(scale) = self.0.upgrade() else {
      return false;
    };
    scale.highlight.draw(renderer);
    scale.slider.draw(renderer);
    false
  }
}

impl GadgetContent for MarksContent {
  fn measure(&self, _: &Gadget, orientation: Orientation, _: i32) -> SizeRequest {
    let Some(scale) = self.0.upgrade() else {
      return SizeRequest::ZERO;
    };
    let marks = scale.marks_on(self.1);
    if marks.is_empty() {
      return SizeRequest::ZERO;
    }
    if orientation == scale.orientation.get() {
      // Marks sit side by side along the trough.
      let mut minimum = MIN_MARK_SEPARATION * (marks.len() as i32 - 1);
      for mark in &marks {
        minimum += mark.gadget.measure(orientation, -1).minimum;
      }
      SizeRequest::without_baseline(minimum, minimum)
    } else {
      let mut minimum = 0;
      for mark in &marks {
        minimum = minimum.max(mark.gadget.measure(orientation, -1).minimum);
      }
      SizeRequest::without_baseline(minimum, minimum)
    }
  }

  fn allocate(&self, _: &Gadget, content: &Rect, _: i32) -> Rect {
    let Some(scale) = self.0.upgrade() else {
      return Rect::ZERO;
    };
    let orientation = scale.orientation.get();
    let marks = scale.marks_on(self.1);

    // Stops ascend along the axis so the separation clamp below can walk
    // them left to right.
    let mut placed: Vec<(Rc<Mark>, i32)> = marks
      .iter()
      .map(|m| (m.clone(), scale.stop_for_value(m.value)))
      .collect();
    placed.sort_by_key(|(_, stop)| *stop);

    let axis_start = match orientation {
      Orientation::Horizontal => content.x,
      Orientation::Vertical => content.y,
    };
    let axis_end = match orientation {
      Orientation::Horizontal => content.x + content.width,
      Orientation::Vertical => content.y + content.height,
    };

    let mut clip = Rect::ZERO;
    let mut min_pos = axis_start;
    for (i, (mark, stop)) in placed.iter().enumerate() {
      mark.stop_position.set(*stop);
      let size = mark.gadget.measure(orientation, -1).minimum;
      let max_pos = placed
        .get(i + 1)
        .map_or(axis_end, |(_, next)| next - MIN_MARK_SEPARATION);

      let mut pos = stop - size / 2;
      if pos < min_pos {
        pos = min_pos;
      }
      if pos + size > max_pos {
        pos = max_pos - size;
      }
      if pos < 0 {
        pos = 0;
      }
      min_pos = pos + size + MIN_MARK_SEPARATION;

      let alloc = match orientation {
        Orientation::Horizontal => Rect::new(pos, content.y, size, content.height),
        Orientation::Vertical => Rect::new(content.x, pos, content.width, size),
      };
      let mark_clip = mark.gadget.allocate(alloc, -1);
      if mark_clip.width > 0 && mark_clip.height > 0 {
        clip = if clip.width > 0 && clip.height > 0 {
          clip.union(&mark_clip)
        } else {
          mark_clip
        };
      }
    }
    clip
  }

  fn draw(&self, _: &Gadget, renderer: &mut dyn Renderer, _: &Rect) -> bool {
    let Some(scale) = self.0.upgrade() else {
      return false;
    };
    for mark in scale.marks_on(self.1) {
      mark.gadget.draw(renderer);
    }
    false
  }
}

impl GadgetContent for MarkContent {
  fn measure(&self, _: &Gadget, orientation: Orientation, _: i32) -> SizeRequest {
    let Some(scale) = self.scale.upgrade() else {
      return SizeRequest::ZERO;
    };
    let indicator = self.indicator.measure(orientation, -1);
    let label = self
      .label
      .as_ref()
      .map_or(SizeRequest::ZERO, |l| l.measure(orientation, -1));
    if orientation == scale.orientation.get() {
      SizeRequest::without_baseline(
        indicator.minimum.max(label.minimum),
        indicator.natural.max(label.natural),
      )
    } else {
      SizeRequest::without_baseline(indicator.minimum + label.minimum, indicator.natural + label.natural)
    }
  }

  fn allocate(&self, _: &Gadget, content: &Rect, _: i32) -> Rect {
    let Some(scale) = self.scale.upgrade() else {
      return Rect::ZERO;
    };
    let horizontal = scale.orientation.get() == Orientation::Horizontal;
    let cross = if horizontal { Orientation::Vertical } else { Orientation::Horizontal };
    let indicator_size = self.indicator.measure(cross, -1).minimum;

    // Indicators hug the trough: top-side marks put the label first,
    // bottom-side marks put it last.
    let (indicator_rect, label_rect) = if horizontal {
      match self.position {
        MarkPosition::Top => (
          Rect::new(
            content.x,
            content.y + content.height - indicator_size,
            content.width,
            indicator_size,
          ),
          Rect::new(content.x, content.y, content.width, content.height - indicator_size),
        ),
        MarkPosition::Bottom => (
          Rect::new(content.x, content.y, content.width, indicator_size),
          Rect::new(
            content.x,
            content.y + indicator_size,
            content.width,
            content.height - indicator_size,
          ),
        ),
      }
    } else {
      match self.position {
        MarkPosition::Top => (
          Rect::new(
            content.x + content.width - indicator_size,
            content.y,
            indicator_size,
            content.height,
          ),
          Rect::new(content.x, content.y, content.width - indicator_size, content.height),
        ),
        MarkPosition::Bottom => (
          Rect::new(content.x, content.y, indicator_size, content.height),
          Rect::new(
            content.x + indicator_size,
            content.y,
            content.width - indicator_size,
            content.height,
          ),
        ),
      }
    };

    let mut clip = self.indicator.allocate(indicator_rect, -1);
    if let Some(label) = &self.label {
      let label_clip = label.allocate(label_rect, -1);
      if label_clip.width > 0 && label_clip.height > 0 {
        clip = clip.union(&label_clip);
      }
    }
    clip
  }

  fn draw(&self, _: &Gadget, renderer: &mut dyn Renderer, _: &Rect) -> bool {
    self.indicator.draw(renderer);
    if let Some(label) = &self.label {
      label.draw(renderer);
    }
    false
  }
}

impl GadgetContent for LabelContent {
  fn measure(&self, _: &Gadget, orientation: Orientation, _: i32) -> SizeRequest {
    let (w, h) = self.layout().pixel_size();
    match orientation {
      Orientation::Horizontal => SizeRequest::without_baseline(w, w),
      Orientation::Vertical => SizeRequest::without_baseline(h, h),
    }
  }

  fn draw(&self, gadget: &Gadget, renderer: &mut dyn Renderer, content: &Rect) -> bool {
    let layout = self.layout();
    let (w, h) = layout.pixel_size();
    let x = content.x + (content.width - w) / 2;
    let y = content.y + (content.height - h) / 2;
    renderer.draw_layout(&*layout, x, y, gadget.style().color(PropertyId::Color));
    false
  }
}
