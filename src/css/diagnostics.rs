//! Parse diagnostics with source ranges
//!
//! Every problem the rule parser can report carries a typed kind and the
//! `[start_line:start_col, end_line:end_col]` range of the offending text,
//! so an inspector can highlight it inline. Diagnostics are advisory: the
//! parser recovers and keeps going, and the cascade treats the affected
//! declaration as absent.

use std::cell::RefCell;
use std::fmt;

/// Half-open range into the rule source text. Lines and columns are
/// 1-based, matching what `cssparser` reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceRange {
  pub start_line: u32,
  pub start_col: u32,
  pub end_line: u32,
  pub end_col: u32,
}

impl SourceRange {
  pub fn new(start_line: u32, start_col: u32, end_line: u32, end_col: u32) -> Self {
    Self {
      start_line,
      start_col,
      end_line,
      end_col,
    }
  }
}

impl fmt::Display for SourceRange {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{}:{}-{}:{}",
      self.start_line, self.start_col, self.end_line, self.end_col
    )
  }
}

/// Closed set of diagnostic kinds the parser can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
  /// Malformed rule or declaration text.
  Syntax,
  /// A property name outside the engine's closed property set.
  UnknownProperty,
  /// A recognized property with a value outside its allowed range.
  ValueRange,
  /// A recognized but deprecated construct; non-fatal, the modern
  /// equivalent is substituted.
  Deprecated,
  /// A `@name` color reference that no `@define-color` resolves.
  UnresolvedColorReference,
}

impl DiagnosticKind {
  /// Deprecations are warnings; everything else is an error.
  pub fn is_warning(self) -> bool {
    matches!(self, DiagnosticKind::Deprecated)
  }
}

impl fmt::Display for DiagnosticKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      DiagnosticKind::Syntax => "syntax",
      DiagnosticKind::UnknownProperty => "unknown-property",
      DiagnosticKind::ValueRange => "value-range",
      DiagnosticKind::Deprecated => "deprecated",
      DiagnosticKind::UnresolvedColorReference => "unresolved-color-reference",
    };
    f.write_str(s)
  }
}

/// One parse problem: kind, human-readable message, source range.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
  pub kind: DiagnosticKind,
  pub message: String,
  pub range: SourceRange,
}

impl Diagnostic {
  pub fn new(kind: DiagnosticKind, message: impl Into<String>, range: SourceRange) -> Self {
    Self {
      kind,
      message: message.into(),
      range,
    }
  }
}

impl fmt::Display for Diagnostic {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} at {}: {}", self.kind, self.range, self.message)
  }
}

/// Observer list plus retained log of diagnostics for one provider.
///
/// Observers are invoked synchronously as each diagnostic is emitted; the
/// retained list lets late-attaching consumers (an inspector pane) replay
/// what parsing produced.
#[derive(Default)]
pub struct DiagnosticSink {
  observers: RefCell<Vec<Box<dyn Fn(&Diagnostic)>>>,
  collected: RefCell<Vec<Diagnostic>>,
}

impl DiagnosticSink {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn connect(&self, observer: impl Fn(&Diagnostic) + 'static) {
    self.observers.borrow_mut().push(Box::new(observer));
  }

  pub fn emit(&self, diagnostic: Diagnostic) {
    for observer in self.observers.borrow().iter() {
      observer(&diagnostic);
    }
    self.collected.borrow_mut().push(diagnostic);
  }

  pub fn take(&self) -> Vec<Diagnostic> {
    std::mem::take(&mut self.collected.borrow_mut())
  }

  pub fn collected(&self) -> Vec<Diagnostic> {
    self.collected.borrow().clone()
  }

  pub fn clear(&self) {
    self.collected.borrow_mut().clear();
  }
}

impl fmt::Debug for DiagnosticSink {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("DiagnosticSink")
      .field("collected", &self.collected.borrow().len())
      .field("observers", &self.observers.borrow().len())
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::cell::Cell;
  use std::rc::Rc;

  #[test]
  fn observers_see_every_emission() {
    let sink = DiagnosticSink::new();
    let seen = Rc::new(Cell::new(0));
    let seen2 = seen.clone();
    sink.connect(move |_| seen2.set(seen2.get() + 1));
    sink.emit(Diagnostic::new(
      DiagnosticKind::Syntax,
      "unexpected ';'",
      SourceRange::new(1, 2, 1, 3),
    ));
    sink.emit(Diagnostic::new(
      DiagnosticKind::UnknownProperty,
      "no such property",
      SourceRange::new(2, 1, 2, 8),
    ));
    assert_eq!(seen.get(), 2);
    assert_eq!(sink.collected().len(), 2);
  }

  #[test]
  fn deprecated_is_a_warning() {
    assert!(DiagnosticKind::Deprecated.is_warning());
    assert!(!DiagnosticKind::Syntax.is_warning());
  }
}
