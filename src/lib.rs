//! CSS styling and box layout for widget toolkits
//!
//! The crate turns CSS text into per-node computed styles and turns those
//! styles into box geometry. The pieces, bottom to top:
//!
//! - [`css`]: parsing. Providers load stylesheets into rules made of
//!   selectors and typed declarations, collecting diagnostics instead of
//!   failing.
//! - [`style`]: the cascade. Matched declarations reduce to an immutable
//!   computed-style snapshot per node; comparing snapshots yields a change
//!   mask that drives invalidation.
//! - [`tree`]: the style-node tree widgets describe themselves with:
//!   names, ids, classes and state flags, matched against provider rules.
//! - [`gadget`]: the box model. A gadget ties one style node to
//!   measure/allocate/draw callbacks and handles margin, border, padding,
//!   min sizes, clips and shadows around them.
//! - [`widgets`]: worked examples (progress bar, scale, image) showing how
//!   gadget trees compose into a widget.
//!
//! The embedder supplies the outside world through the traits in [`host`]:
//! a renderer, a text shaper and the owning widget.

pub mod css;
pub mod error;
pub mod gadget;
pub mod geometry;
pub mod host;
pub mod intern;
pub mod state;
pub mod style;
pub mod tree;
pub mod widgets;

pub use crate::css::diagnostics::{Diagnostic, DiagnosticKind, SourceRange};
pub use crate::css::properties::{PropertyId, Value};
pub use crate::css::provider::{
  StyleProvider, PRIORITY_APPLICATION, PRIORITY_FALLBACK, PRIORITY_SETTINGS, PRIORITY_THEME,
  PRIORITY_USER,
};
pub use crate::css::value::{Color, Length, Shadow, ShadowList, Unit};
pub use crate::error::{Error, Result};
pub use crate::gadget::{Gadget, GadgetContent, SizeRequest};
pub use crate::geometry::{Border, Rect};
pub use crate::host::{FontMetrics, IconSource, Renderer, TextLayout, TextShaper, WidgetHost};
pub use crate::state::{JunctionSides, Orientation, StateFlags, TextDirection};
pub use crate::style::change::{ChangeMask, Invalidation, StyleChange};
pub use crate::style::computed::ComputedStyle;
pub use crate::tree::node::StyleNode;
pub use crate::tree::screen::Screen;
pub use crate::widgets::{Image, MarkPosition, ProgressBar, Scale};
