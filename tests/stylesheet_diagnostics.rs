//! Parse recovery: bad input produces diagnostics, not lost stylesheets.

use std::cell::RefCell;
use std::rc::Rc;
use stylebox::{
  Color, Diagnostic, DiagnosticKind, PropertyId, Screen, StateFlags, StyleNode, StyleProvider,
  PRIORITY_APPLICATION,
};

fn provider(text: &str) -> Rc<StyleProvider> {
  let p = StyleProvider::new();
  p.load_from_text(text);
  p
}

#[test]
fn bad_declarations_are_reported_and_the_rest_survive() {
  let p = provider("button { color: red;; invalid }");
  let diagnostics = p.diagnostics();
  assert_eq!(diagnostics.len(), 2);

  assert_eq!(diagnostics[0].kind, DiagnosticKind::Syntax);
  assert_eq!(diagnostics[0].range.start_line, 1);
  assert_eq!(diagnostics[0].range.start_col, 21);

  assert_eq!(diagnostics[1].kind, DiagnosticKind::UnknownProperty);
  assert_eq!(diagnostics[1].range.start_col, 23);

  // The valid declaration is still applied.
  let screen = Screen::new();
  screen.add_provider(p, PRIORITY_APPLICATION);
  let node = StyleNode::new("button", &screen);
  assert_eq!(node.style().color(PropertyId::Color), Color::from_rgba8(255, 0, 0, 255));
}

#[test]
fn observers_hear_diagnostics_as_they_are_emitted() {
  let p = StyleProvider::new();
  let heard: Rc<RefCell<Vec<Diagnostic>>> = Rc::new(RefCell::new(Vec::new()));
  let sink = heard.clone();
  p.connect_diagnostic(move |d| sink.borrow_mut().push(d.clone()));

  p.load_from_text("button { colr: red; }");
  let heard = heard.borrow();
  assert_eq!(heard.len(), 1);
  assert_eq!(heard[0].kind, DiagnosticKind::UnknownProperty);
  assert!(heard[0].message.contains("colr"));
}

#[test]
fn defined_colors_resolve_and_can_chain() {
  let p = provider(
    "@define-color accent #3584e4;\n@define-color accent_hover @accent;\nbutton { background-color: @accent_hover; }",
  );
  assert!(p.diagnostics().is_empty());

  let screen = Screen::new();
  screen.add_provider(p, PRIORITY_APPLICATION);
  let node = StyleNode::new("button", &screen);
  assert_eq!(
    node.style().color(PropertyId::BackgroundColor),
    Color::from_rgba8(0x35, 0x84, 0xe4, 255)
  );
}

#[test]
fn unresolved_color_reference_drops_only_that_declaration() {
  let p = provider("button { background-color: @missing; color: lime; }");
  let diagnostics = p.diagnostics();
  assert_eq!(diagnostics.len(), 1);
  assert_eq!(diagnostics[0].kind, DiagnosticKind::UnresolvedColorReference);

  let screen = Screen::new();
  screen.add_provider(p, PRIORITY_APPLICATION);
  let node = StyleNode::new("button", &screen);
  assert!(node.style().color(PropertyId::BackgroundColor).is_transparent());
  assert_eq!(node.style().color(PropertyId::Color), Color::rgb(0.0, 1.0, 0.0));
}

#[test]
fn deprecated_pseudo_classes_warn_but_still_match() {
  let p = provider("button:prelight { color: red; }");
  let diagnostics = p.diagnostics();
  assert_eq!(diagnostics.len(), 1);
  assert_eq!(diagnostics[0].kind, DiagnosticKind::Deprecated);
  assert!(diagnostics[0].kind.is_warning());

  let screen = Screen::new();
  screen.add_provider(p, PRIORITY_APPLICATION);
  let node = StyleNode::new("button", &screen);
  node.add_state(StateFlags::HOVER);
  assert_eq!(node.style().color(PropertyId::Color), Color::from_rgba8(255, 0, 0, 255));
}

#[test]
fn negative_widths_are_range_errors() {
  let p = provider("button { min-width: -4px; }");
  let diagnostics = p.diagnostics();
  assert_eq!(diagnostics.len(), 1);
  assert_eq!(diagnostics[0].kind, DiagnosticKind::ValueRange);
}

#[test]
fn unknown_at_rules_are_skipped_with_a_diagnostic() {
  let p = provider("@keyframes spin { from {} }\nbutton { color: red; }");
  let diagnostics = p.diagnostics();
  assert_eq!(diagnostics.len(), 1);
  assert_eq!(diagnostics[0].kind, DiagnosticKind::Syntax);
  assert_eq!(p.rules().len(), 1);
}

#[test]
fn serialization_round_trips_through_the_parser() {
  let p = provider(
    "@define-color accent #ff0080;\nbutton.flat:hover, #ok { margin: 1px 2px; background-color: @accent; box-shadow: 1px 2px 3px 4px red; }",
  );
  assert!(p.diagnostics().is_empty());
  let css = p.to_css();

  let q = provider(&css);
  assert!(q.diagnostics().is_empty());
  assert_eq!(q.to_css(), css);
}

#[test]
fn reload_replaces_rules_and_clears_diagnostics() {
  let p = provider("button { bogus: 1px; }");
  assert_eq!(p.diagnostics().len(), 1);
  p.load_from_text("button { color: red; }");
  assert!(p.diagnostics().is_empty());
  assert_eq!(p.rules().len(), 1);
}
