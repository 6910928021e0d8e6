//! Icon display widget
//!
//! A single `image` box. The content size is the icon's intrinsic size
//! plus the configured padding; the vertical request carries a baseline so
//! icons line up with neighboring text. The baseline alignment ratio comes
//! from the current font and is cached until the font changes.

use crate::gadget::{Gadget, GadgetContent, SizeRequest};
use crate::geometry::Rect;
use crate::host::{IconSource, Renderer, TextShaper, WidgetHost};
use crate::state::Orientation;
use crate::style::change::{ChangeMask, StyleChange};
use crate::tree::node::StyleNode;
use crate::tree::screen::Screen;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

pub struct Image {
  host: Weak<dyn WidgetHost>,
  shaper: Rc<dyn TextShaper>,
  gadget: Rc<Gadget>,
  icon: RefCell<Option<Rc<dyn IconSource>>>,
  xpad: Cell<i32>,
  ypad: Cell<i32>,
  /// Fraction of the height above the baseline; 0.0 means not yet
  /// computed for the current font.
  baseline_align: Cell<f32>,
}

struct ImageContent(Weak<Image>);

impl Image {
  pub fn new(screen: &Rc<Screen>, host: Weak<dyn WidgetHost>, shaper: Rc<dyn TextShaper>) -> Rc<Image> {
    Rc::new_cyclic(|weak: &Weak<Image>| Image {
      host: host.clone(),
      shaper,
      gadget: Gadget::new(StyleNode::new("image", screen), host, Box::new(ImageContent(weak.clone()))),
      icon: RefCell::new(None),
      xpad: Cell::new(0),
      ypad: Cell::new(0),
      baseline_align: Cell::new(0.0),
    })
  }

  pub fn node(&self) -> &StyleNode {
    self.gadget.node()
  }

  pub fn set_icon(&self, icon: Option<Rc<dyn IconSource>>) {
    *self.icon.borrow_mut() = icon;
    self.queue_resize();
  }

  pub fn set_padding(&self, xpad: i32, ypad: i32) {
    self.xpad.set(xpad.max(0));
    self.ypad.set(ypad.max(0));
    self.queue_resize();
  }

  pub fn measure(&self, orientation: Orientation, for_size: i32) -> SizeRequest {
    self.gadget.measure(orientation, for_size)
  }

  /// Allocates the widget and returns the draw clip.
  pub fn size_allocate(&self, allocation: Rect, baseline: i32) -> Rect {
    self.gadget.allocate(allocation, baseline)
  }

  pub fn draw(&self, renderer: &mut dyn Renderer) {
    self.gadget.draw(renderer);
  }

  fn content_size(&self) -> (i32, i32) {
    let (w, h) = self
      .icon
      .borrow()
      .as_ref()
      .map_or((0, 0), |icon| (icon.width(), icon.height()));
    (w + 2 * self.xpad.get(), h + 2 * self.ypad.get())
  }

  fn baseline_align(&self) -> f32 {
    if self.baseline_align.get() == 0.0 {
      let metrics = self.shaper.font_metrics();
      let total = metrics.ascent + metrics.descent;
      if total > 0 {
        self.baseline_align.set(metrics.ascent as f32 / total as f32);
      }
    }
    self.baseline_align.get()
  }

  fn queue_resize(&self) {
    if let Some(host) = self.host.upgrade() {
      host.queue_resize();
    }
  }
}

impl GadgetContent for ImageContent {
  fn measure(&self, _: &Gadget, orientation: Orientation, _: i32) -> SizeRequest {
    let Some(image) = self.0.upgrade() else {
      return SizeRequest::ZERO;
    };
    let (width, height) = image.content_size();
    match orientation {
      Orientation::Horizontal => SizeRequest::without_baseline(width, width),
      Orientation::Vertical => {
        let baseline = (height as f32 * image.baseline_align()) as i32;
        SizeRequest {
          minimum: height,
          natural: height,
          minimum_baseline: baseline,
          natural_baseline: baseline,
        }
      }
    }
  }

  fn draw(&self, _: &Gadget, renderer: &mut dyn Renderer, content: &Rect) -> bool {
    let Some(image) = self.0.upgrade() else {
      return false;
    };
    if let Some(icon) = image.icon.borrow().as_ref() {
      let rect = Rect::new(
        content.x + (content.width - icon.width()) / 2,
        content.y + (content.height - icon.height()) / 2,
        icon.width(),
        icon.height(),
      );
      renderer.draw_icon(icon.as_ref(), rect);
    }
    false
  }

  fn style_changed(&self, _: &Gadget, change: &StyleChange) -> bool {
    if change.mask.contains(ChangeMask::FONT) {
      if let Some(image) = self.0.upgrade() {
        image.baseline_align.set(0.0);
      }
    }
    // The default invalidation handling still applies.
    false
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::css::provider::{StyleProvider, PRIORITY_APPLICATION};
  use crate::host::{FontMetrics, TextLayout};

  struct Host;
  impl WidgetHost for Host {
    fn type_name(&self) -> &'static str {
      "Image"
    }
    fn allocation(&self) -> Rect {
      Rect::ZERO
    }
    fn queue_resize(&self) {}
    fn queue_allocate(&self) {}
    fn queue_draw(&self) {}
  }

  struct FixedLayout;
  impl TextLayout for FixedLayout {
    fn pixel_size(&self) -> (i32, i32) {
      (0, 0)
    }
    fn baseline(&self) -> i32 {
      0
    }
  }

  struct Shaper(Cell<(i32, i32)>);
  impl TextShaper for Shaper {
    fn layout(&self, _: &str) -> Box<dyn TextLayout> {
      Box::new(FixedLayout)
    }
    fn layout_markup(&self, _: &str) -> Option<Box<dyn TextLayout>> {
      None
    }
    fn font_metrics(&self) -> FontMetrics {
      let (ascent, descent) = self.0.get();
      FontMetrics { ascent, descent }
    }
  }

  struct Icon(i32, i32);
  impl IconSource for Icon {
    fn width(&self) -> i32 {
      self.0
    }
    fn height(&self) -> i32 {
      self.1
    }
  }

  fn image_with(shaper: Rc<Shaper>) -> (Rc<Image>, Rc<Host>, Rc<Screen>) {
    let screen = Screen::new();
    let host = Rc::new(Host);
    let image = Image::new(&screen, Rc::downgrade(&host) as Weak<dyn WidgetHost>, shaper);
    (image, host, screen)
  }

  #[test]
  fn size_is_icon_plus_padding() {
    let (image, _host, _screen) = image_with(Rc::new(Shaper(Cell::new((8, 2)))));
    image.set_icon(Some(Rc::new(Icon(16, 24))));
    image.set_padding(3, 5);
    assert_eq!(image.measure(Orientation::Horizontal, -1).minimum, 16 + 6);
    assert_eq!(image.measure(Orientation::Vertical, -1).minimum, 24 + 10);
  }

  #[test]
  fn baseline_follows_the_font_proportions() {
    let (image, _host, _screen) = image_with(Rc::new(Shaper(Cell::new((9, 3)))));
    image.set_icon(Some(Rc::new(Icon(16, 16))));
    let v = image.measure(Orientation::Vertical, -1);
    // ascent 9 of 12: three quarters of the height sit above the baseline.
    assert_eq!(v.minimum_baseline, 12);
  }

  #[test]
  fn font_change_recomputes_the_baseline_ratio() {
    let shaper = Rc::new(Shaper(Cell::new((9, 3))));
    let (image, _host, screen) = image_with(shaper.clone());
    image.set_icon(Some(Rc::new(Icon(16, 16))));
    assert_eq!(image.measure(Orientation::Vertical, -1).minimum_baseline, 12);

    // New metrics take effect only after a font-affecting style change.
    shaper.0.set((8, 8));
    assert_eq!(image.measure(Orientation::Vertical, -1).minimum_baseline, 12);
    let provider = StyleProvider::new();
    provider.load_from_text("image { font-size: 20px; }");
    screen.add_provider(provider, PRIORITY_APPLICATION);
    image.node().style();
    assert_eq!(image.measure(Orientation::Vertical, -1).minimum_baseline, 8);
  }

  #[test]
  fn empty_image_measures_zero() {
    let (image, _host, _screen) = image_with(Rc::new(Shaper(Cell::new((1, 1)))));
    assert_eq!(image.measure(Orientation::Horizontal, -1).minimum, 0);
    assert_eq!(image.measure(Orientation::Vertical, -1).minimum, 0);
  }
}
