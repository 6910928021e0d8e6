//! Selector parsing, specificity and matching
//!
//! A selector is a chain of compound selectors joined by combinators. The
//! matcher walks right to left over any tree that implements
//! [`SelectorTarget`], so matching is decoupled from the node
//! representation. Specificity is the usual (ids, classes + pseudo-classes,
//! names) tuple compared lexicographically.

use crate::css::diagnostics::DiagnosticKind;
use crate::css::properties::ValueParseError;
use crate::intern::{intern, Symbol};
use crate::state::StateFlags;
use cssparser::{Parser, Token};
use smallvec::SmallVec;
use std::fmt;

/// Tree interface the matcher walks. Implementations hand out cheap
/// clonable handles (the node tree uses `Rc` internally).
pub trait SelectorTarget: Sized + Clone {
  fn node_name(&self) -> Option<Symbol>;
  fn node_id(&self) -> Option<Symbol>;
  fn has_style_class(&self, class: Symbol) -> bool;
  fn state(&self) -> StateFlags;
  fn styled_parent(&self) -> Option<Self>;
  /// Previous sibling, skipping invisible nodes. Sibling combinators only
  /// see siblings that participate in layout.
  fn previous_visible_sibling(&self) -> Option<Self>;
}

/// How a compound selector relates to the one on its right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
  Descendant,
  Child,
  /// `~`: any preceding visible sibling.
  Sibling,
  /// `+`: the immediately preceding visible sibling.
  Adjacent,
}

impl fmt::Display for Combinator {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Combinator::Descendant => " ",
      Combinator::Child => " > ",
      Combinator::Sibling => " ~ ",
      Combinator::Adjacent => " + ",
    })
  }
}

/// One compound selector: optional name, optional id, classes, required
/// state flags. An empty compound is the universal selector `*`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SimpleSelector {
  pub name: Option<Symbol>,
  pub id: Option<Symbol>,
  pub classes: SmallVec<[Symbol; 2]>,
  pub states: StateFlags,
}

impl SimpleSelector {
  pub fn matches<T: SelectorTarget>(&self, node: &T) -> bool {
    if let Some(name) = self.name {
      if node.node_name() != Some(name) {
        return false;
      }
    }
    if let Some(id) = self.id {
      if node.node_id() != Some(id) {
        return false;
      }
    }
    if !node.state().contains(self.states) {
      return false;
    }
    self.classes.iter().all(|&c| node.has_style_class(c))
  }

  fn is_empty(&self) -> bool {
    self.name.is_none() && self.id.is_none() && self.classes.is_empty() && self.states.is_empty()
  }
}

impl fmt::Display for SimpleSelector {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.name {
      Some(name) => write!(f, "{}", name)?,
      None => {
        if self.is_empty() {
          f.write_str("*")?;
        }
      }
    }
    if let Some(id) = self.id {
      write!(f, "#{}", id)?;
    }
    for class in &self.classes {
      write!(f, ".{}", class)?;
    }
    for flag in self.states.iter() {
      if let Some(pseudo) = flag.pseudo_name() {
        write!(f, ":{}", pseudo)?;
      }
    }
    Ok(())
  }
}

/// A full selector: the rightmost compound (the subject) plus the chain of
/// (combinator, compound) pairs to its left, stored rightmost first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
  pub subject: SimpleSelector,
  pub ancestors: Vec<(Combinator, SimpleSelector)>,
}

/// (ids, classes + state pseudo-classes, names), ordered lexicographically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Specificity {
  pub ids: u16,
  pub classes: u16,
  pub names: u16,
}

impl Selector {
  pub fn specificity(&self) -> Specificity {
    let mut s = Specificity::default();
    let mut add = |simple: &SimpleSelector| {
      s.ids += simple.id.is_some() as u16;
      s.classes += simple.classes.len() as u16;
      s.classes += simple.states.iter().count() as u16;
      s.names += simple.name.is_some() as u16;
    };
    add(&self.subject);
    for (_, simple) in &self.ancestors {
      add(simple);
    }
    s
  }

  pub fn matches<T: SelectorTarget>(&self, node: &T) -> bool {
    self.subject.matches(node) && match_ancestors(&self.ancestors, node)
  }
}

fn match_ancestors<T: SelectorTarget>(parts: &[(Combinator, SimpleSelector)], node: &T) -> bool {
  let Some(((combinator, simple), rest)) = parts.split_first() else {
    return true;
  };
  match combinator {
    Combinator::Child => node
      .styled_parent()
      .is_some_and(|p| simple.matches(&p) && match_ancestors(rest, &p)),
    Combinator::Descendant => {
      let mut current = node.styled_parent();
      while let Some(p) = current {
        if simple.matches(&p) && match_ancestors(rest, &p) {
          return true;
        }
        current = p.styled_parent();
      }
      false
    }
    Combinator::Adjacent => node
      .previous_visible_sibling()
      .is_some_and(|s| simple.matches(&s) && match_ancestors(rest, &s)),
    Combinator::Sibling => {
      let mut current = node.previous_visible_sibling();
      while let Some(s) = current {
        if simple.matches(&s) && match_ancestors(rest, &s) {
          return true;
        }
        current = s.previous_visible_sibling();
      }
      false
    }
  }
}

impl fmt::Display for Selector {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (combinator, simple) in self.ancestors.iter().rev() {
      write!(f, "{}{}", simple, combinator)?;
    }
    write!(f, "{}", self.subject)
  }
}

fn syntax(message: impl Into<String>) -> ValueParseError {
  ValueParseError {
    kind: DiagnosticKind::Syntax,
    message: message.into(),
  }
}

/// Maps a pseudo-class ident to state flags. Deprecated aliases resolve to
/// their modern flag and report through `notes`.
fn pseudo_state(name: &str, notes: &mut Vec<(DiagnosticKind, String)>) -> Option<StateFlags> {
  let deprecated = |notes: &mut Vec<(DiagnosticKind, String)>, old: &str, new: &str| {
    notes.push((
      DiagnosticKind::Deprecated,
      format!("pseudo-class ':{}' is deprecated, use ':{}'", old, new),
    ));
  };
  Some(match name {
    "active" => StateFlags::ACTIVE,
    "hover" => StateFlags::HOVER,
    "prelight" => {
      deprecated(notes, "prelight", "hover");
      StateFlags::HOVER
    }
    "selected" => StateFlags::SELECTED,
    "disabled" => StateFlags::DISABLED,
    "insensitive" => {
      deprecated(notes, "insensitive", "disabled");
      StateFlags::DISABLED
    }
    "indeterminate" => StateFlags::INDETERMINATE,
    "inconsistent" => {
      deprecated(notes, "inconsistent", "indeterminate");
      StateFlags::INDETERMINATE
    }
    "focus" => StateFlags::FOCUSED,
    "focused" => {
      deprecated(notes, "focused", "focus");
      StateFlags::FOCUSED
    }
    "backdrop" => StateFlags::BACKDROP,
    "link" => StateFlags::LINK,
    "visited" => StateFlags::VISITED,
    "checked" => StateFlags::CHECKED,
    _ => return None,
  })
}

/// Parses one selector, stopping before a comma or anything else it does
/// not recognize (the rule parser handles the `{` that follows).
pub fn parse_selector(
  input: &mut Parser<'_, '_>,
  notes: &mut Vec<(DiagnosticKind, String)>,
) -> Result<Selector, ValueParseError> {
  let mut chain: Vec<(SimpleSelector, Combinator)> = Vec::new();
  let mut current = SimpleSelector::default();
  let mut in_compound = false;
  let mut pending: Option<Combinator> = None;

  // Flushes the finished compound when a new one starts after a combinator.
  macro_rules! begin_part {
    () => {
      if let Some(combinator) = pending.take() {
        chain.push((std::mem::take(&mut current), combinator));
        in_compound = false;
      }
      in_compound = true;
    };
  }

  loop {
    let state = input.state();
    let token = match input.next_including_whitespace() {
      Ok(t) => t.clone(),
      Err(_) => break,
    };
    match token {
      Token::WhiteSpace(_) => {
        if in_compound && pending.is_none() {
          pending = Some(Combinator::Descendant);
        }
      }
      Token::Delim('>') => {
        if !in_compound && pending != Some(Combinator::Descendant) {
          return Err(syntax("combinator without a left-hand selector"));
        }
        pending = Some(Combinator::Child);
      }
      Token::Delim('+') => {
        if !in_compound && pending != Some(Combinator::Descendant) {
          return Err(syntax("combinator without a left-hand selector"));
        }
        pending = Some(Combinator::Adjacent);
      }
      Token::Delim('~') => {
        if !in_compound && pending != Some(Combinator::Descendant) {
          return Err(syntax("combinator without a left-hand selector"));
        }
        pending = Some(Combinator::Sibling);
      }
      Token::Delim('*') => {
        begin_part!();
      }
      Token::Ident(name) => {
        begin_part!();
        if current.name.is_some() {
          return Err(syntax("two element names in one compound selector"));
        }
        current.name = Some(intern(&name));
      }
      Token::IDHash(id) => {
        begin_part!();
        current.id = Some(intern(&id));
      }
      Token::Delim('.') => {
        begin_part!();
        match input.next_including_whitespace() {
          Ok(Token::Ident(class)) => {
            let class = class.clone();
            current.classes.push(intern(&class));
          }
          _ => return Err(syntax("expected a class name after '.'")),
        }
      }
      Token::Colon => {
        begin_part!();
        let pseudo_token = input.next_including_whitespace().cloned();
        let flags = match pseudo_token {
          Ok(Token::Ident(pseudo)) => pseudo_state(&pseudo, notes)
            .ok_or_else(|| syntax(format!("unknown pseudo-class ':{}'", pseudo)))?,
          Ok(Token::Function(func)) if func.eq_ignore_ascii_case("dir") => {
            input
              .parse_nested_block(|args| -> Result<StateFlags, cssparser::ParseError<'_, ()>> {
                let ident = args.expect_ident()?.clone();
                match ident.as_ref() {
                  "ltr" => Ok(StateFlags::DIR_LTR),
                  "rtl" => Ok(StateFlags::DIR_RTL),
                  _ => Err(args.new_error_for_next_token()),
                }
              })
              .map_err(|_| syntax("expected dir(ltr) or dir(rtl)"))?
          }
          _ => return Err(syntax("expected a pseudo-class name after ':'")),
        };
        current.states |= flags;
      }
      _ => {
        input.reset(&state);
        break;
      }
    }
  }

  if !in_compound {
    return Err(syntax("empty selector"));
  }
  if pending.is_some() {
    return Err(syntax("dangling combinator at end of selector"));
  }

  // Reassemble right to left: each chained compound pairs with the
  // combinator that sat to its right.
  let subject = current;
  let ancestors = chain
    .into_iter()
    .rev()
    .map(|(simple, combinator)| (combinator, simple))
    .collect();
  Ok(Selector { subject, ancestors })
}

/// A comma-separated selector list.
pub fn parse_selector_list(
  input: &mut Parser<'_, '_>,
  notes: &mut Vec<(DiagnosticKind, String)>,
) -> Result<Vec<Selector>, ValueParseError> {
  let mut selectors = vec![parse_selector(input, notes)?];
  loop {
    if input.try_parse(|p| p.expect_comma()).is_err() {
      break;
    }
    selectors.push(parse_selector(input, notes)?);
  }
  if !input.is_exhausted() {
    return Err(syntax("unexpected token in selector"));
  }
  Ok(selectors)
}

#[cfg(test)]
mod tests {
  use super::*;
  use cssparser::ParserInput;
  use std::cell::RefCell;
  use std::rc::Rc;

  fn parse(text: &str) -> Selector {
    let mut notes = Vec::new();
    let mut input = ParserInput::new(text);
    let mut parser = Parser::new(&mut input);
    parse_selector(&mut parser, &mut notes).unwrap()
  }

  #[derive(Clone)]
  struct FakeNode(Rc<FakeInner>);

  struct FakeInner {
    name: Option<Symbol>,
    id: Option<Symbol>,
    classes: RefCell<Vec<Symbol>>,
    state: StateFlags,
    parent: Option<FakeNode>,
    prev: RefCell<Option<FakeNode>>,
  }

  impl FakeNode {
    fn new(name: &str, parent: Option<&FakeNode>) -> FakeNode {
      FakeNode(Rc::new(FakeInner {
        name: Some(intern(name)),
        id: None,
        classes: RefCell::new(Vec::new()),
        state: StateFlags::empty(),
        parent: parent.cloned(),
        prev: RefCell::new(None),
      }))
    }

    fn with_class(self, class: &str) -> FakeNode {
      self.0.classes.borrow_mut().push(intern(class));
      self
    }
  }

  impl SelectorTarget for FakeNode {
    fn node_name(&self) -> Option<Symbol> {
      self.0.name
    }
    fn node_id(&self) -> Option<Symbol> {
      self.0.id
    }
    fn has_style_class(&self, class: Symbol) -> bool {
      self.0.classes.borrow().contains(&class)
    }
    fn state(&self) -> StateFlags {
      self.0.state
    }
    fn styled_parent(&self) -> Option<FakeNode> {
      self.0.parent.clone()
    }
    fn previous_visible_sibling(&self) -> Option<FakeNode> {
      self.0.prev.borrow().clone()
    }
  }

  #[test]
  fn specificity_counts_ids_classes_names() {
    assert_eq!(
      parse("progressbar trough.empty:hover").specificity(),
      Specificity {
        ids: 0,
        classes: 2,
        names: 2
      }
    );
    assert_eq!(
      parse("#status").specificity(),
      Specificity {
        ids: 1,
        classes: 0,
        names: 0
      }
    );
  }

  #[test]
  fn specificity_orders_lexicographically() {
    assert!(parse("#a").specificity() > parse("a.b.c.d:hover").specificity());
    assert!(parse(".a").specificity() > parse("a b c").specificity());
  }

  #[test]
  fn descendant_and_child_match() {
    let root = FakeNode::new("window", None);
    let bar = FakeNode::new("progressbar", Some(&root));
    let trough = FakeNode::new("trough", Some(&bar));

    assert!(parse("progressbar > trough").matches(&trough));
    assert!(parse("window trough").matches(&trough));
    assert!(!parse("window > trough").matches(&trough));
    assert!(!parse("progressbar > trough").matches(&bar));
  }

  #[test]
  fn sibling_combinators_use_previous_visible() {
    let root = FakeNode::new("box", None);
    let a = FakeNode::new("label", Some(&root));
    let b = FakeNode::new("image", Some(&root));
    let c = FakeNode::new("button", Some(&root));
    *b.0.prev.borrow_mut() = Some(a.clone());
    *c.0.prev.borrow_mut() = Some(b.clone());

    assert!(parse("image + button").matches(&c));
    assert!(!parse("label + button").matches(&c));
    assert!(parse("label ~ button").matches(&c));
  }

  #[test]
  fn class_and_state_must_all_match() {
    let root = FakeNode::new("scale", None);
    let mark = FakeNode::new("mark", Some(&root)).with_class("top");
    assert!(parse("mark.top").matches(&mark));
    assert!(!parse("mark.bottom").matches(&mark));
    assert!(!parse("mark.top:hover").matches(&mark));
  }

  #[test]
  fn prelight_is_a_deprecated_alias_of_hover() {
    let mut notes = Vec::new();
    let mut input = ParserInput::new("button:prelight");
    let mut parser = Parser::new(&mut input);
    let selector = parse_selector(&mut parser, &mut notes).unwrap();
    assert_eq!(selector.subject.states, StateFlags::HOVER);
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].0, DiagnosticKind::Deprecated);
  }

  #[test]
  fn serialization_round_trips() {
    for text in [
      "progressbar > trough.empty:hover",
      "window label ~ image",
      "#status.left",
      "*",
      "scale:dir(rtl) mark",
    ] {
      let selector = parse(text);
      assert_eq!(parse(&selector.to_string()), selector);
    }
  }

  #[test]
  fn dangling_combinator_is_an_error() {
    let mut notes = Vec::new();
    let mut input = ParserInput::new("a >");
    let mut parser = Parser::new(&mut input);
    assert!(parse_selector(&mut parser, &mut notes).is_err());
  }
}
