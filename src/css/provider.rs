//! Style providers: named, prioritized rule sources
//!
//! A provider owns the rules parsed from one source text plus the palette
//! its `@define-color` lines bound. Reloading replaces the provider's
//! content wholesale; the screen bumps its serial when the provider list
//! changes, which invalidates every node.

use crate::css::diagnostics::{Diagnostic, DiagnosticSink};
use crate::css::parser::{parse_stylesheet, Rule};
use crate::css::value::Color;
use crate::error::{Error, Result};
use crate::intern::Symbol;
use rustc_hash::FxHashMap;
use std::cell::{Ref, RefCell};
use std::fmt::Write as _;
use std::path::Path;
use std::rc::Rc;

/// Hardcoded engine defaults. Lowest priority.
pub const PRIORITY_FALLBACK: u16 = 1;
/// The active theme.
pub const PRIORITY_THEME: u16 = 200;
/// Per-user settings layered over the theme.
pub const PRIORITY_SETTINGS: u16 = 400;
/// Application-supplied rules.
pub const PRIORITY_APPLICATION: u16 = 600;
/// User overrides; beats everything.
pub const PRIORITY_USER: u16 = 800;

pub struct StyleProvider {
  rules: RefCell<Vec<Rule>>,
  palette: RefCell<FxHashMap<Symbol, Color>>,
  sink: DiagnosticSink,
}

impl StyleProvider {
  pub fn new() -> Rc<StyleProvider> {
    Rc::new(StyleProvider {
      rules: RefCell::new(Vec::new()),
      palette: RefCell::new(FxHashMap::default()),
      sink: DiagnosticSink::new(),
    })
  }

  /// Replaces the provider's content with the result of parsing `text`.
  /// Parse problems go to the diagnostic sink; the previously collected
  /// diagnostics are dropped first.
  pub fn load_from_text(&self, text: &str) {
    self.sink.clear();
    let output = parse_stylesheet(text, &self.sink);
    *self.rules.borrow_mut() = output.rules;
    *self.palette.borrow_mut() = output.palette;
  }

  pub fn load_from_path(&self, path: &Path) -> Result<()> {
    let text = std::fs::read_to_string(path).map_err(|source| Error::Resource {
      path: path.display().to_string(),
      source,
    })?;
    self.load_from_text(&text);
    Ok(())
  }

  pub fn rules(&self) -> Ref<'_, Vec<Rule>> {
    self.rules.borrow()
  }

  /// Resolves a palette color bound by `@define-color`.
  pub fn lookup_color(&self, name: Symbol) -> Option<Color> {
    self.palette.borrow().get(&name).copied()
  }

  pub fn connect_diagnostic(&self, observer: impl Fn(&Diagnostic) + 'static) {
    self.sink.connect(observer);
  }

  pub fn diagnostics(&self) -> Vec<Diagnostic> {
    self.sink.collected()
  }

  /// Serializes the provider's content back to rule-source text. Feeding
  /// the result to [`StyleProvider::load_from_text`] reproduces the same
  /// rules.
  pub fn to_css(&self) -> String {
    let mut out = String::new();
    let palette = self.palette.borrow();
    let mut names: Vec<Symbol> = palette.keys().copied().collect();
    names.sort();
    for name in names {
      let _ = writeln!(out, "@define-color {} {};", name, palette[&name]);
    }
    if !palette.is_empty() && !self.rules.borrow().is_empty() {
      out.push('\n');
    }
    for rule in self.rules.borrow().iter() {
      let _ = write!(out, "{}", rule);
    }
    out
  }
}
