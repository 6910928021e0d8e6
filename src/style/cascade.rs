//! The cascade: from matched rules to a computed-style snapshot
//!
//! Declarations are gathered from every provider whose rules match the
//! node, ordered by (provider priority, selector specificity, source
//! order), and applied in ascending order so the strongest declaration
//! writes last. Unset properties inherit from the parent snapshot when the
//! property inherits, otherwise take their initial value.
//!
//! The cascade is a pure function of (node configuration, provider list,
//! parent snapshot). It never mutates the tree.

use crate::css::parser::Declaration;
use crate::css::properties::{PropertyId, Value, ALL_PROPERTIES, PROPERTY_COUNT};
use crate::css::provider::StyleProvider;
use crate::css::selector::{SelectorTarget, Specificity};
use crate::css::value::Length;
use crate::style::computed::{ComputedStyle, DEFAULT_FONT_SIZE};
use std::rc::Rc;

/// One declaration matched for a node, tagged with its cascade key.
#[derive(Debug, Clone)]
pub struct MatchedDeclaration {
  pub priority: u16,
  pub specificity: Specificity,
  /// Source order: rule index across the provider list.
  pub order: u32,
  pub declaration: Declaration,
}

/// Every declaration whose rule matches `node`, in non-decreasing
/// (priority, specificity, source order). Applying them front to back with
/// later writes winning is exactly the cascade.
pub fn declarations_for_node<T: SelectorTarget>(
  node: &T,
  providers: &[(u16, Rc<StyleProvider>)],
) -> Vec<MatchedDeclaration> {
  struct Candidate {
    priority: u16,
    specificity: Specificity,
    order: u32,
    provider: usize,
    rule: usize,
  }

  let rule_guards: Vec<_> = providers.iter().map(|(_, p)| p.rules()).collect();
  let mut candidates: Vec<Candidate> = Vec::new();
  let mut order = 0u32;
  for (i, (priority, _)) in providers.iter().enumerate() {
    for (j, rule) in rule_guards[i].iter().enumerate() {
      // A rule applies with the specificity of its best matching selector.
      let best = rule
        .selectors
        .iter()
        .filter(|s| s.matches(node))
        .map(|s| s.specificity())
        .max();
      if let Some(specificity) = best {
        candidates.push(Candidate {
          priority: *priority,
          specificity,
          order,
          provider: i,
          rule: j,
        });
      }
      order += 1;
    }
  }
  candidates.sort_by_key(|c| (c.priority, c.specificity, c.order));

  let mut matched = Vec::new();
  for candidate in candidates {
    for declaration in &rule_guards[candidate.provider][candidate.rule].declarations {
      matched.push(MatchedDeclaration {
        priority: candidate.priority,
        specificity: candidate.specificity,
        order: candidate.order,
        declaration: declaration.clone(),
      });
    }
  }
  matched
}

/// Computes the snapshot for `node`. `providers` must be in ascending
/// priority order with insertion order preserved among equals, which is
/// what the screen maintains.
pub fn compute_style<T: SelectorTarget>(
  node: &T,
  providers: &[(u16, Rc<StyleProvider>)],
  parent: Option<&ComputedStyle>,
) -> ComputedStyle {
  let mut values: [Option<Value>; PROPERTY_COUNT] = std::array::from_fn(|_| None);
  for matched in declarations_for_node(node, providers) {
    values[matched.declaration.property.index()] = Some(matched.declaration.value);
  }

  // Font size resolves first: em and percent are relative to the parent's
  // resolved size, and other font-relative lengths in this snapshot reduce
  // against the result.
  let parent_font = parent.map_or(DEFAULT_FONT_SIZE, |p| p.font_size());
  let font_size = match &values[PropertyId::FontSize.index()] {
    Some(Value::Length(l)) => l.reduce(parent_font, parent_font),
    _ => parent_font,
  };
  values[PropertyId::FontSize.index()] = Some(Value::Length(Length::px(font_size)));

  let resolved = std::array::from_fn(|i| {
    let property = ALL_PROPERTIES[i];
    match values[i].take() {
      Some(value) => value,
      None if property.inherited() => match parent {
        Some(parent) => parent.get(property).clone(),
        None => property.initial_value(),
      },
      None => property.initial_value(),
    }
  });
  ComputedStyle::from_parts(resolved, font_size)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::css::provider::{PRIORITY_APPLICATION, PRIORITY_USER};
  use crate::css::value::Color;
  use crate::intern::{intern, Symbol};
  use crate::state::StateFlags;
  use crate::style::change::ChangeMask;
  use std::cell::RefCell;

  #[derive(Clone)]
  struct Probe {
    name: Symbol,
    classes: RefCell<Vec<Symbol>>,
    state: StateFlags,
  }

  impl Probe {
    fn new(name: &str) -> Probe {
      Probe {
        name: intern(name),
        classes: RefCell::new(Vec::new()),
        state: StateFlags::empty(),
      }
    }
  }

  impl SelectorTarget for Probe {
    fn node_name(&self) -> Option<Symbol> {
      Some(self.name)
    }
    fn node_id(&self) -> Option<Symbol> {
      None
    }
    fn has_style_class(&self, class: Symbol) -> bool {
      self.classes.borrow().contains(&class)
    }
    fn state(&self) -> StateFlags {
      self.state
    }
    fn styled_parent(&self) -> Option<Probe> {
      None
    }
    fn previous_visible_sibling(&self) -> Option<Probe> {
      None
    }
  }

  fn provider(text: &str) -> Rc<StyleProvider> {
    let p = StyleProvider::new();
    p.load_from_text(text);
    p
  }

  #[test]
  fn higher_priority_provider_wins_over_higher_specificity() {
    let app = provider("label.big.loud#x { color: red; }");
    let user = provider("label { color: blue; }");
    let providers = vec![(PRIORITY_APPLICATION, app), (PRIORITY_USER, user)];
    let node = Probe::new("label");
    node.classes.borrow_mut().push(intern("big"));
    node.classes.borrow_mut().push(intern("loud"));
    let style = compute_style(&node, &providers, None);
    assert_eq!(style.color(PropertyId::Color), Color::rgb(0.0, 0.0, 1.0));
  }

  #[test]
  fn within_a_priority_specificity_then_order_decide() {
    let p = provider("label { color: red; }\nlabel.warn { color: blue; }\nlabel { color: white; }");
    let providers = vec![(PRIORITY_APPLICATION, p)];
    let node = Probe::new("label");
    node.classes.borrow_mut().push(intern("warn"));
    // .warn beats both bare rules despite the later source position.
    let style = compute_style(&node, &providers, None);
    assert_eq!(style.color(PropertyId::Color), Color::rgb(0.0, 0.0, 1.0));

    let plain = Probe::new("label");
    let style = compute_style(&plain, &providers, None);
    assert_eq!(style.color(PropertyId::Color), Color::WHITE);
  }

  #[test]
  fn later_provider_wins_at_equal_priority_and_specificity() {
    let a = provider("label { color: red; }");
    let b = provider("label { color: blue; }");
    let providers = vec![(PRIORITY_APPLICATION, a), (PRIORITY_APPLICATION, b)];
    let style = compute_style(&Probe::new("label"), &providers, None);
    assert_eq!(style.color(PropertyId::Color), Color::rgb(0.0, 0.0, 1.0));
  }

  #[test]
  fn unset_inherited_properties_copy_from_parent() {
    let p = provider("box { color: lime; padding-left: 7px; }");
    let providers = vec![(PRIORITY_APPLICATION, p)];
    let parent_style = compute_style(&Probe::new("box"), &providers, None);
    let child_style = compute_style(&Probe::new("label"), &providers, Some(&parent_style));
    // color inherits, padding does not.
    assert_eq!(child_style.color(PropertyId::Color), Color::rgb(0.0, 1.0, 0.0));
    assert_eq!(child_style.pixels(PropertyId::PaddingLeft), 0);
  }

  #[test]
  fn font_size_resolves_relative_to_parent() {
    let p = provider("box { font-size: 20px; }\nlabel { font-size: 0.5em; }");
    let providers = vec![(PRIORITY_APPLICATION, p)];
    let parent_style = compute_style(&Probe::new("box"), &providers, None);
    assert_eq!(parent_style.font_size(), 20.0);
    let child_style = compute_style(&Probe::new("label"), &providers, Some(&parent_style));
    assert_eq!(child_style.font_size(), 10.0);
  }

  #[test]
  fn state_gated_rule_only_changes_redraw_categories() {
    let p = provider("label:hover { color: green; }");
    let providers = vec![(PRIORITY_APPLICATION, p)];
    let mut node = Probe::new("label");
    let plain = compute_style(&node, &providers, None);
    assert_eq!(plain.color(PropertyId::Color), Color::BLACK);

    node.state = StateFlags::HOVER;
    let hovered = compute_style(&node, &providers, None);
    assert_eq!(hovered.color(PropertyId::Color), Color::from_rgba8(0, 128, 0, 255));
    let mask = plain.changes(&hovered);
    assert!(mask.contains(ChangeMask::REDRAW));
    assert!(!mask.contains(ChangeMask::SIZE));
  }

  #[test]
  fn cascade_is_a_pure_function_of_configuration() {
    let p = provider("label.a.b { color: red; }");
    let providers = vec![(PRIORITY_APPLICATION, p)];
    let node = Probe::new("label");
    node.classes.borrow_mut().push(intern("a"));
    node.classes.borrow_mut().push(intern("b"));
    let other = Probe::new("label");
    // Same classes reached in a different order.
    other.classes.borrow_mut().push(intern("b"));
    other.classes.borrow_mut().push(intern("a"));
    assert_eq!(
      compute_style(&node, &providers, None),
      compute_style(&other, &providers, None)
    );
  }
}
