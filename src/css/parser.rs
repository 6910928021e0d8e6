//! Rule source parsing
//!
//! Recursive descent over `cssparser` tokens. Parsing never aborts: a
//! malformed declaration is skipped to the next `;`, a malformed rule to the
//! end of its block, and each problem is reported to the diagnostic sink
//! with the source range of the offending text. Valid declarations around a
//! bad one are retained.
//!
//! `@define-color name <color>;` binds a palette entry; later declarations
//! (and later defines) may reference it as `@name`.

use crate::css::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink, SourceRange};
use crate::css::properties::{parse_color, parse_length, parse_value, PropertyId, Value, ValueParseError};
use crate::css::selector::{parse_selector_list, Selector};
use crate::css::value::{Color, Length};
use crate::intern::{intern, Symbol};
use cssparser::{Delimiter, Parser, ParserInput, SourceLocation, Token};
use rustc_hash::FxHashMap;
use std::fmt;

/// One parsed `property: value`.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
  pub property: PropertyId,
  pub value: Value,
}

/// A selector list plus its declaration block.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
  pub selectors: Vec<Selector>,
  pub declarations: Vec<Declaration>,
}

impl fmt::Display for Rule {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, selector) in self.selectors.iter().enumerate() {
      if i > 0 {
        f.write_str(", ")?;
      }
      write!(f, "{}", selector)?;
    }
    f.write_str(" {\n")?;
    for declaration in &self.declarations {
      writeln!(f, "  {}: {};", declaration.property, declaration.value)?;
    }
    f.write_str("}\n")
  }
}

/// Everything one source text parses to.
#[derive(Debug, Default)]
pub struct ParseOutput {
  pub rules: Vec<Rule>,
  pub palette: FxHashMap<Symbol, Color>,
}

fn range_between(start: SourceLocation, end: SourceLocation) -> SourceRange {
  // cssparser lines are 0-based, columns 1-based.
  SourceRange::new(start.line + 1, start.column, end.line + 1, end.column)
}

/// Parses a complete rule source. Problems go to `sink`; the return value
/// holds whatever parsed cleanly.
pub fn parse_stylesheet(text: &str, sink: &DiagnosticSink) -> ParseOutput {
  let mut input = ParserInput::new(text);
  let mut parser = Parser::new(&mut input);
  let mut output = ParseOutput::default();

  loop {
    parser.skip_whitespace();
    let state = parser.state();
    let token = match parser.next() {
      Ok(t) => t.clone(),
      Err(_) => break,
    };
    match token {
      Token::AtKeyword(name) if name.eq_ignore_ascii_case("define-color") => {
        parse_define_color(&mut parser, &mut output.palette, sink);
      }
      Token::AtKeyword(name) => {
        let start = state.source_location();
        skip_at_rule(&mut parser);
        sink.emit(Diagnostic::new(
          DiagnosticKind::Syntax,
          format!("unsupported at-rule '@{}'", name),
          range_between(start, parser.current_source_location()),
        ));
      }
      _ => {
        parser.reset(&state);
        parse_qualified_rule(&mut parser, &mut output, sink);
      }
    }
  }
  output
}

fn skip_at_rule(parser: &mut Parser<'_, '_>) {
  // An at-rule ends at a semicolon or with a curly-bracket block.
  let _ = parser.parse_until_before(Delimiter::Semicolon | Delimiter::CurlyBracketBlock, |p| {
    while p.next().is_ok() {}
    Ok::<(), cssparser::ParseError<'_, ()>>(())
  });
  let is_block = matches!(parser.next(), Ok(Token::CurlyBracketBlock));
  if is_block {
    let _ = parser.parse_nested_block(|p| {
      while p.next().is_ok() {}
      Ok::<(), cssparser::ParseError<'_, ()>>(())
    });
  }
}

fn parse_define_color(
  parser: &mut Parser<'_, '_>,
  palette: &mut FxHashMap<Symbol, Color>,
  sink: &DiagnosticSink,
) {
  let start = parser.current_source_location();
  let result = parser.parse_until_after(Delimiter::Semicolon, |p| {
    let name = p
      .expect_ident()
      .map(|i| i.to_string())
      .map_err(|_| p.new_custom_error::<_, ValueParseError>(ValueParseError {
        kind: DiagnosticKind::Syntax,
        message: "expected a color name after @define-color".into(),
      }))?;
    let color = parse_color(p, palette).map_err(|e| p.new_custom_error(e))?;
    Ok((name, color))
  });
  match result {
    Ok((name, color)) => {
      palette.insert(intern(&name), color);
    }
    Err(e) => {
      let (kind, message) = describe_error(e);
      sink.emit(Diagnostic::new(
        kind,
        message,
        range_between(start, parser.current_source_location()),
      ));
    }
  }
}

fn describe_error(e: cssparser::ParseError<'_, ValueParseError>) -> (DiagnosticKind, String) {
  match e.kind {
    cssparser::ParseErrorKind::Custom(err) => (err.kind, err.message),
    cssparser::ParseErrorKind::Basic(basic) => (DiagnosticKind::Syntax, format!("{:?}", basic)),
  }
}

fn parse_qualified_rule(parser: &mut Parser<'_, '_>, output: &mut ParseOutput, sink: &DiagnosticSink) {
  let prelude_start = parser.current_source_location();
  let mut notes: Vec<(DiagnosticKind, String)> = Vec::new();
  let selectors = parser.parse_until_before(Delimiter::CurlyBracketBlock, |p| {
    parse_selector_list(p, &mut notes).map_err(|e| p.new_custom_error::<_, ValueParseError>(e))
  });
  let prelude_end = parser.current_source_location();
  for (kind, message) in notes {
    sink.emit(Diagnostic::new(kind, message, range_between(prelude_start, prelude_end)));
  }

  if parser.expect_curly_bracket_block().is_err() {
    sink.emit(Diagnostic::new(
      DiagnosticKind::Syntax,
      "expected '{' after selector",
      range_between(prelude_start, parser.current_source_location()),
    ));
    return;
  }

  let declarations = parser
    .parse_nested_block(|p| {
      Ok::<_, cssparser::ParseError<'_, ()>>(parse_declarations(p, &output.palette, sink))
    })
    .unwrap_or_default();

  match selectors {
    Ok(selectors) => output.rules.push(Rule {
      selectors,
      declarations,
    }),
    Err(e) => {
      let (kind, message) = describe_error(e);
      sink.emit(Diagnostic::new(
        kind,
        message,
        range_between(prelude_start, prelude_end),
      ));
    }
  }
}

/// Shorthands expand to their four longhands in top, right, bottom, left
/// order before storage, so the cascade only ever sees longhands.
fn shorthand_longhands(name: &str) -> Option<[PropertyId; 4]> {
  Some(match name {
    "margin" => [
      PropertyId::MarginTop,
      PropertyId::MarginRight,
      PropertyId::MarginBottom,
      PropertyId::MarginLeft,
    ],
    "padding" => [
      PropertyId::PaddingTop,
      PropertyId::PaddingRight,
      PropertyId::PaddingBottom,
      PropertyId::PaddingLeft,
    ],
    "border-width" => [
      PropertyId::BorderTopWidth,
      PropertyId::BorderRightWidth,
      PropertyId::BorderBottomWidth,
      PropertyId::BorderLeftWidth,
    ],
    _ => return None,
  })
}

fn parse_declarations(
  parser: &mut Parser<'_, '_>,
  palette: &FxHashMap<Symbol, Color>,
  sink: &DiagnosticSink,
) -> Vec<Declaration> {
  let mut declarations = Vec::new();
  loop {
    // A semicolon here means an empty declaration: the terminator of the
    // previous one was already consumed.
    loop {
      parser.skip_whitespace();
      let at = parser.current_source_location();
      if parser.try_parse(|p| p.expect_semicolon()).is_err() {
        break;
      }
      sink.emit(Diagnostic::new(
        DiagnosticKind::Syntax,
        "empty declaration",
        range_between(at, parser.current_source_location()),
      ));
    }
    if parser.is_exhausted() {
      break;
    }
    parser.skip_whitespace();
    let start = parser.current_source_location();
    let result = parser.parse_until_after(Delimiter::Semicolon, |p| {
      parse_one_declaration(p, palette).map_err(|e| p.new_custom_error::<_, ValueParseError>(e))
    });
    match result {
      Ok(mut parsed) => declarations.append(&mut parsed),
      Err(e) => {
        let (kind, message) = describe_error(e);
        sink.emit(Diagnostic::new(
          kind,
          message,
          range_between(start, parser.current_source_location()),
        ));
      }
    }
  }
  declarations
}

fn parse_one_declaration(
  parser: &mut Parser<'_, '_>,
  palette: &FxHashMap<Symbol, Color>,
) -> Result<Vec<Declaration>, ValueParseError> {
  let name = parser
    .expect_ident()
    .map(|i| i.to_string())
    .map_err(|_| ValueParseError {
      kind: DiagnosticKind::Syntax,
      message: "expected a property name".into(),
    })?;
  // Unknown names are reported as such even when the ':' is missing too.
  let shorthand = shorthand_longhands(&name);
  let property = PropertyId::from_css_name(&name);
  if shorthand.is_none() && property.is_none() {
    return Err(ValueParseError {
      kind: DiagnosticKind::UnknownProperty,
      message: format!("unknown property '{}'", name),
    });
  }
  parser.expect_colon().map_err(|_| ValueParseError {
    kind: DiagnosticKind::Syntax,
    message: format!("expected ':' after '{}'", name),
  })?;

  if let Some(longhands) = shorthand {
    return parse_shorthand(parser, &name, longhands);
  }

  let property = property.expect("checked above");
  let value = parse_value(property, parser, palette)?;
  Ok(vec![Declaration { property, value }])
}

fn parse_shorthand(
  parser: &mut Parser<'_, '_>,
  name: &str,
  longhands: [PropertyId; 4],
) -> Result<Vec<Declaration>, ValueParseError> {
  let mut lengths: Vec<Length> = Vec::with_capacity(4);
  while !parser.is_exhausted() && lengths.len() < 4 {
    lengths.push(parse_length(parser)?);
  }
  if lengths.is_empty() || !parser.is_exhausted() {
    return Err(ValueParseError {
      kind: DiagnosticKind::Syntax,
      message: format!("'{}' takes one to four lengths", name),
    });
  }

  // 1 value: all sides. 2: vertical, horizontal. 3: top, horizontal,
  // bottom. 4: top, right, bottom, left.
  let [top, right, bottom, left] = match lengths.as_slice() {
    [a] => [*a, *a, *a, *a],
    [v, h] => [*v, *h, *v, *h],
    [t, h, b] => [*t, *h, *b, *h],
    [t, r, b, l] => [*t, *r, *b, *l],
    _ => unreachable!(),
  };

  let sides = [top, right, bottom, left];
  let mut declarations = Vec::with_capacity(4);
  for (property, length) in longhands.into_iter().zip(sides) {
    if length.value < 0.0 && name != "margin" {
      return Err(ValueParseError {
        kind: DiagnosticKind::ValueRange,
        message: format!("negative value not allowed for {}", property),
      });
    }
    declarations.push(Declaration {
      property,
      value: Value::Length(length),
    });
  }
  Ok(declarations)
}
