//! The closed property set and per-property value parsing
//!
//! Every property the engine understands is listed in [`PropertyId`],
//! together with its initial value, whether it inherits, and which
//! invalidation categories a change to it touches. Anything outside this
//! set is an `unknown-property` diagnostic and is treated by the cascade as
//! absent.

use crate::css::diagnostics::DiagnosticKind;
use crate::css::value::{Color, Length, Shadow, ShadowList};
use crate::intern::Symbol;
use crate::style::change::ChangeMask;
use cssparser::{Parser, Token};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::fmt;

/// Identifier of a supported property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum PropertyId {
  MarginTop,
  MarginRight,
  MarginBottom,
  MarginLeft,
  BorderTopWidth,
  BorderRightWidth,
  BorderBottomWidth,
  BorderLeftWidth,
  PaddingTop,
  PaddingRight,
  PaddingBottom,
  PaddingLeft,
  MinWidth,
  MinHeight,
  Color,
  BackgroundColor,
  BorderColor,
  OutlineColor,
  OutlineWidth,
  OutlineOffset,
  BoxShadow,
  TextShadow,
  FontSize,
  FontFamily,
}

/// Number of properties; sizes the computed-style snapshot.
pub const PROPERTY_COUNT: usize = 24;

/// All property ids in declaration order of the enum.
pub const ALL_PROPERTIES: [PropertyId; PROPERTY_COUNT] = [
  PropertyId::MarginTop,
  PropertyId::MarginRight,
  PropertyId::MarginBottom,
  PropertyId::MarginLeft,
  PropertyId::BorderTopWidth,
  PropertyId::BorderRightWidth,
  PropertyId::BorderBottomWidth,
  PropertyId::BorderLeftWidth,
  PropertyId::PaddingTop,
  PropertyId::PaddingRight,
  PropertyId::PaddingBottom,
  PropertyId::PaddingLeft,
  PropertyId::MinWidth,
  PropertyId::MinHeight,
  PropertyId::Color,
  PropertyId::BackgroundColor,
  PropertyId::BorderColor,
  PropertyId::OutlineColor,
  PropertyId::OutlineWidth,
  PropertyId::OutlineOffset,
  PropertyId::BoxShadow,
  PropertyId::TextShadow,
  PropertyId::FontSize,
  PropertyId::FontFamily,
];

impl PropertyId {
  pub fn index(self) -> usize {
    self as usize
  }

  pub fn css_name(self) -> &'static str {
    match self {
      PropertyId::MarginTop => "margin-top",
      PropertyId::MarginRight => "margin-right",
      PropertyId::MarginBottom => "margin-bottom",
      PropertyId::MarginLeft => "margin-left",
      PropertyId::BorderTopWidth => "border-top-width",
      PropertyId::BorderRightWidth => "border-right-width",
      PropertyId::BorderBottomWidth => "border-bottom-width",
      PropertyId::BorderLeftWidth => "border-left-width",
      PropertyId::PaddingTop => "padding-top",
      PropertyId::PaddingRight => "padding-right",
      PropertyId::PaddingBottom => "padding-bottom",
      PropertyId::PaddingLeft => "padding-left",
      PropertyId::MinWidth => "min-width",
      PropertyId::MinHeight => "min-height",
      PropertyId::Color => "color",
      PropertyId::BackgroundColor => "background-color",
      PropertyId::BorderColor => "border-color",
      PropertyId::OutlineColor => "outline-color",
      PropertyId::OutlineWidth => "outline-width",
      PropertyId::OutlineOffset => "outline-offset",
      PropertyId::BoxShadow => "box-shadow",
      PropertyId::TextShadow => "text-shadow",
      PropertyId::FontSize => "font-size",
      PropertyId::FontFamily => "font-family",
    }
  }

  pub fn from_css_name(name: &str) -> Option<PropertyId> {
    ALL_PROPERTIES.iter().copied().find(|p| p.css_name() == name)
  }

  /// Whether the property inherits from the parent node when unset.
  pub fn inherited(self) -> bool {
    matches!(
      self,
      PropertyId::Color | PropertyId::TextShadow | PropertyId::FontSize | PropertyId::FontFamily
    )
  }

  /// The invalidation categories touched when this property changes.
  /// Categories are additive; geometry properties also require a redraw.
  pub fn affects(self) -> ChangeMask {
    match self {
      PropertyId::MarginTop
      | PropertyId::MarginRight
      | PropertyId::MarginBottom
      | PropertyId::MarginLeft
      | PropertyId::BorderTopWidth
      | PropertyId::BorderRightWidth
      | PropertyId::BorderBottomWidth
      | PropertyId::BorderLeftWidth
      | PropertyId::PaddingTop
      | PropertyId::PaddingRight
      | PropertyId::PaddingBottom
      | PropertyId::PaddingLeft
      | PropertyId::MinWidth
      | PropertyId::MinHeight => ChangeMask::SIZE | ChangeMask::REDRAW,
      PropertyId::Color => ChangeMask::REDRAW | ChangeMask::TEXT_ATTRS,
      PropertyId::BackgroundColor | PropertyId::BorderColor | PropertyId::OutlineColor => ChangeMask::REDRAW,
      PropertyId::OutlineWidth | PropertyId::OutlineOffset => ChangeMask::CLIP | ChangeMask::REDRAW,
      PropertyId::BoxShadow => ChangeMask::CLIP | ChangeMask::REDRAW,
      PropertyId::TextShadow => ChangeMask::REDRAW | ChangeMask::TEXT_ATTRS,
      PropertyId::FontSize => ChangeMask::SIZE | ChangeMask::FONT,
      PropertyId::FontFamily => ChangeMask::SIZE | ChangeMask::FONT,
    }
  }

  /// The value a property takes when no declaration sets it. Missing
  /// properties fall back here, never to "unset".
  pub fn initial_value(self) -> Value {
    match self {
      PropertyId::MarginTop
      | PropertyId::MarginRight
      | PropertyId::MarginBottom
      | PropertyId::MarginLeft
      | PropertyId::BorderTopWidth
      | PropertyId::BorderRightWidth
      | PropertyId::BorderBottomWidth
      | PropertyId::BorderLeftWidth
      | PropertyId::PaddingTop
      | PropertyId::PaddingRight
      | PropertyId::PaddingBottom
      | PropertyId::PaddingLeft
      | PropertyId::MinWidth
      | PropertyId::MinHeight
      | PropertyId::OutlineWidth
      | PropertyId::OutlineOffset => Value::Length(Length::ZERO),
      PropertyId::Color => Value::Color(Color::BLACK),
      PropertyId::BackgroundColor | PropertyId::OutlineColor => Value::Color(Color::TRANSPARENT),
      PropertyId::BorderColor => Value::Color(Color::BLACK),
      PropertyId::BoxShadow | PropertyId::TextShadow => Value::Shadows(ShadowList::none()),
      PropertyId::FontSize => Value::Length(Length::px(14.0)),
      PropertyId::FontFamily => Value::FontFamily(smallvec::smallvec!["sans-serif".to_owned()]),
    }
  }

  /// Whether negative lengths are allowed. Margins may be negative;
  /// widths, paddings and minimum sizes may not.
  fn allows_negative(self) -> bool {
    matches!(
      self,
      PropertyId::MarginTop
        | PropertyId::MarginRight
        | PropertyId::MarginBottom
        | PropertyId::MarginLeft
        | PropertyId::OutlineOffset
    )
  }
}

impl fmt::Display for PropertyId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.css_name())
  }
}

/// A parsed property value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
  Length(Length),
  Color(Color),
  Shadows(ShadowList),
  FontFamily(SmallVec<[String; 1]>),
}

impl fmt::Display for Value {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Value::Length(l) => write!(f, "{}", l),
      Value::Color(c) => write!(f, "{}", c),
      Value::Shadows(s) => write!(f, "{}", s),
      Value::FontFamily(families) => {
        for (i, family) in families.iter().enumerate() {
          if i > 0 {
            f.write_str(", ")?;
          }
          if family.contains(' ') {
            write!(f, "\"{}\"", family)?;
          } else {
            f.write_str(family)?;
          }
        }
        Ok(())
      }
    }
  }
}

/// Failure while parsing a declaration value. The caller attaches the
/// source range and forwards to the diagnostic sink.
#[derive(Debug, Clone)]
pub struct ValueParseError {
  pub kind: DiagnosticKind,
  pub message: String,
}

impl ValueParseError {
  fn syntax(message: impl Into<String>) -> Self {
    Self {
      kind: DiagnosticKind::Syntax,
      message: message.into(),
    }
  }

  fn range(message: impl Into<String>) -> Self {
    Self {
      kind: DiagnosticKind::ValueRange,
      message: message.into(),
    }
  }
}

/// Parses the value of `property` from the token stream. `palette` holds
/// the provider's `@define-color` bindings for `@name` references.
pub fn parse_value<'i>(
  property: PropertyId,
  input: &mut Parser<'i, '_>,
  palette: &FxHashMap<Symbol, Color>,
) -> Result<Value, ValueParseError> {
  let value = match property {
    PropertyId::Color
    | PropertyId::BackgroundColor
    | PropertyId::BorderColor
    | PropertyId::OutlineColor => Value::Color(parse_color(input, palette)?),
    PropertyId::BoxShadow | PropertyId::TextShadow => Value::Shadows(parse_shadows(input, palette)?),
    PropertyId::FontFamily => Value::FontFamily(parse_font_family(input)?),
    _ => {
      let length = parse_length(input)?;
      if length.value < 0.0 && !property.allows_negative() {
        return Err(ValueParseError::range(format!(
          "negative value not allowed for {}",
          property.css_name()
        )));
      }
      Value::Length(length)
    }
  };
  skip_trailing_whitespace(input);
  if !input.is_exhausted() {
    return Err(ValueParseError::syntax("trailing junk after value"));
  }
  Ok(value)
}

fn skip_trailing_whitespace(input: &mut Parser<'_, '_>) {
  let _ = input.try_parse(|p| -> Result<(), cssparser::ParseError<'_, ()>> {
    loop {
      let state = p.state();
      match p.next_including_whitespace() {
        Ok(Token::WhiteSpace(_)) => continue,
        _ => {
          p.reset(&state);
          return Ok(());
        }
      }
    }
  });
}

/// One length token: number (treated as px), dimension in px/em, or
/// percentage.
pub fn parse_length(input: &mut Parser<'_, '_>) -> Result<Length, ValueParseError> {
  let token = input
    .next()
    .map_err(|_| ValueParseError::syntax("expected a length"))?
    .clone();
  match token {
    Token::Number { value, .. } => Ok(Length::px(value as f64)),
    Token::Percentage { unit_value, .. } => Ok(Length::percent(unit_value as f64 * 100.0)),
    Token::Dimension { value, ref unit, .. } => match unit.as_ref() {
      "px" => Ok(Length::px(value as f64)),
      "em" => Ok(Length::em(value as f64)),
      other => Err(ValueParseError::syntax(format!("unsupported unit '{}'", other))),
    },
    other => Err(ValueParseError::syntax(format!(
      "expected a length, found {:?}",
      other
    ))),
  }
}

fn clamp_channel(v: f32) -> f32 {
  v.clamp(0.0, 1.0)
}

/// A color: named, #hex (3/4/6/8 digits), rgb()/rgba(), or a `@name`
/// palette reference.
pub fn parse_color(
  input: &mut Parser<'_, '_>,
  palette: &FxHashMap<Symbol, Color>,
) -> Result<Color, ValueParseError> {
  let token = input
    .next()
    .map_err(|_| ValueParseError::syntax("expected a color"))?
    .clone();
  match token {
    Token::Ident(ref name) => {
      named_color(name).ok_or_else(|| ValueParseError::syntax(format!("unknown color name '{}'", name)))
    }
    Token::Hash(ref digits) | Token::IDHash(ref digits) => {
      hex_color(digits).ok_or_else(|| ValueParseError::syntax(format!("invalid hex color '#{}'", digits)))
    }
    Token::AtKeyword(ref name) => {
      let sym = crate::intern::try_intern(name).and_then(|s| palette.get(&s).copied());
      sym.ok_or_else(|| ValueParseError {
        kind: DiagnosticKind::UnresolvedColorReference,
        message: format!("no @define-color for '@{}'", name),
      })
    }
    Token::Function(ref name) if name.eq_ignore_ascii_case("rgb") || name.eq_ignore_ascii_case("rgba") => input
      .parse_nested_block(|args| {
        let r = expect_number(args)?;
        args.expect_comma().map_err(|_| nested_syntax("expected ','"))?;
        let g = expect_number(args)?;
        args.expect_comma().map_err(|_| nested_syntax("expected ','"))?;
        let b = expect_number(args)?;
        let a = if args.try_parse(|p| p.expect_comma()).is_ok() {
          expect_number(args)?
        } else {
          1.0
        };
        Ok(Color::rgba(
          clamp_channel(r / 255.0),
          clamp_channel(g / 255.0),
          clamp_channel(b / 255.0),
          clamp_channel(a),
        ))
      })
      .map_err(|e: cssparser::ParseError<'_, ValueParseError>| unwrap_nested(e)),
    other => Err(ValueParseError::syntax(format!("expected a color, found {:?}", other))),
  }
}

fn nested_syntax(message: &str) -> cssparser::ParseError<'static, ValueParseError> {
  cssparser::ParseError {
    kind: cssparser::ParseErrorKind::Custom(ValueParseError::syntax(message)),
    location: cssparser::SourceLocation { line: 0, column: 0 },
  }
}

fn unwrap_nested(e: cssparser::ParseError<'_, ValueParseError>) -> ValueParseError {
  match e.kind {
    cssparser::ParseErrorKind::Custom(err) => err,
    _ => ValueParseError::syntax("malformed color function"),
  }
}

fn expect_number<'i>(
  input: &mut Parser<'i, '_>,
) -> Result<f32, cssparser::ParseError<'i, ValueParseError>> {
  match input.next() {
    Ok(&Token::Number { value, .. }) => Ok(value),
    _ => Err(nested_syntax("expected a number")),
  }
}

fn hex_digit(b: u8) -> Option<u8> {
  match b {
    b'0'..=b'9' => Some(b - b'0'),
    b'a'..=b'f' => Some(b - b'a' + 10),
    b'A'..=b'F' => Some(b - b'A' + 10),
    _ => None,
  }
}

fn hex_color(digits: &str) -> Option<Color> {
  let b = digits.as_bytes();
  let parse2 = |hi: u8, lo: u8| Some(hex_digit(hi)? << 4 | hex_digit(lo)?);
  match b.len() {
    3 => Some(Color::from_rgba8(
      parse2(b[0], b[0])?,
      parse2(b[1], b[1])?,
      parse2(b[2], b[2])?,
      255,
    )),
    4 => Some(Color::from_rgba8(
      parse2(b[0], b[0])?,
      parse2(b[1], b[1])?,
      parse2(b[2], b[2])?,
      parse2(b[3], b[3])?,
    )),
    6 => Some(Color::from_rgba8(
      parse2(b[0], b[1])?,
      parse2(b[2], b[3])?,
      parse2(b[4], b[5])?,
      255,
    )),
    8 => Some(Color::from_rgba8(
      parse2(b[0], b[1])?,
      parse2(b[2], b[3])?,
      parse2(b[4], b[5])?,
      parse2(b[6], b[7])?,
    )),
    _ => None,
  }
}

fn named_color(name: &str) -> Option<Color> {
  let c = match name {
    "transparent" => Color::TRANSPARENT,
    "black" => Color::BLACK,
    "white" => Color::WHITE,
    "red" => Color::rgb(1.0, 0.0, 0.0),
    "green" => Color::from_rgba8(0, 128, 0, 255),
    "lime" => Color::rgb(0.0, 1.0, 0.0),
    "blue" => Color::rgb(0.0, 0.0, 1.0),
    "yellow" => Color::rgb(1.0, 1.0, 0.0),
    "cyan" | "aqua" => Color::rgb(0.0, 1.0, 1.0),
    "magenta" | "fuchsia" => Color::rgb(1.0, 0.0, 1.0),
    "gray" | "grey" => Color::from_rgba8(128, 128, 128, 255),
    "silver" => Color::from_rgba8(192, 192, 192, 255),
    "maroon" => Color::from_rgba8(128, 0, 0, 255),
    "olive" => Color::from_rgba8(128, 128, 0, 255),
    "navy" => Color::from_rgba8(0, 0, 128, 255),
    "purple" => Color::from_rgba8(128, 0, 128, 255),
    "teal" => Color::from_rgba8(0, 128, 128, 255),
    "orange" => Color::from_rgba8(255, 165, 0, 255),
    _ => return None,
  };
  Some(c)
}

/// `none` or a comma-separated shadow list. Each shadow is
/// `[inset] <h> <v> [<blur> [<spread>]] [<color>]` in any of the two
/// orders the original grammar accepts (lengths first or color first is
/// not supported; lengths must precede the color).
fn parse_shadows(
  input: &mut Parser<'_, '_>,
  palette: &FxHashMap<Symbol, Color>,
) -> Result<ShadowList, ValueParseError> {
  if input.try_parse(|p| p.expect_ident_matching("none")).is_ok() {
    return Ok(ShadowList::none());
  }

  let mut shadows = SmallVec::new();
  loop {
    shadows.push(parse_one_shadow(input, palette)?);
    if input.try_parse(|p| p.expect_comma()).is_err() {
      break;
    }
  }
  Ok(ShadowList { shadows })
}

fn parse_one_shadow(
  input: &mut Parser<'_, '_>,
  palette: &FxHashMap<Symbol, Color>,
) -> Result<Shadow, ValueParseError> {
  let inset = input.try_parse(|p| p.expect_ident_matching("inset")).is_ok();

  let hoffset = parse_length(input)?;
  let voffset = parse_length(input)?;
  let blur = input.try_parse(parse_length_ok).unwrap_or(Length::ZERO);
  let spread = input.try_parse(parse_length_ok).unwrap_or(Length::ZERO);
  if blur.value < 0.0 {
    return Err(ValueParseError::range("shadow blur must not be negative"));
  }

  let color = match try_parse_color(input, palette) {
    Some(result) => result?,
    None => Color::BLACK,
  };

  Ok(Shadow {
    hoffset,
    voffset,
    blur,
    spread,
    color,
    inset,
  })
}

fn parse_length_ok<'i>(input: &mut Parser<'i, '_>) -> Result<Length, cssparser::ParseError<'i, ()>> {
  let state = input.state();
  match parse_length(input) {
    Ok(l) => Ok(l),
    Err(_) => {
      input.reset(&state);
      Err(input.new_error_for_next_token())
    }
  }
}

/// Tries to parse a color without consuming tokens on a miss. Returns
/// `None` when no color-shaped token is next, `Some(Err)` when one is but
/// it is malformed or unresolved.
fn try_parse_color(
  input: &mut Parser<'_, '_>,
  palette: &FxHashMap<Symbol, Color>,
) -> Option<Result<Color, ValueParseError>> {
  let state = input.state();
  let looks_like_color = matches!(
    input.next(),
    Ok(Token::Ident(_)) | Ok(Token::Hash(_)) | Ok(Token::IDHash(_)) | Ok(Token::AtKeyword(_)) | Ok(Token::Function(_))
  );
  input.reset(&state);
  if !looks_like_color {
    return None;
  }
  Some(parse_color(input, palette))
}

fn parse_font_family(input: &mut Parser<'_, '_>) -> Result<SmallVec<[String; 1]>, ValueParseError> {
  let mut families = SmallVec::new();
  loop {
    let token = input
      .next()
      .map_err(|_| ValueParseError::syntax("expected a font family"))?
      .clone();
    let family = match token {
      Token::Ident(name) => {
        // Unquoted families may span several idents ("DejaVu Sans").
        let mut family = name.to_string();
        while let Ok(more) = input.try_parse(|p| p.expect_ident().map(|i| i.to_string())) {
          family.push(' ');
          family.push_str(&more);
        }
        family
      }
      Token::QuotedString(s) => s.to_string(),
      other => {
        return Err(ValueParseError::syntax(format!(
          "expected a font family, found {:?}",
          other
        )))
      }
    };
    families.push(family);
    if input.try_parse(|p| p.expect_comma()).is_err() {
      break;
    }
  }
  Ok(families)
}

#[cfg(test)]
mod tests {
  use super::*;
  use cssparser::ParserInput;

  fn parse(property: PropertyId, text: &str) -> Result<Value, ValueParseError> {
    let mut input = ParserInput::new(text);
    let mut parser = Parser::new(&mut input);
    parse_value(property, &mut parser, &FxHashMap::default())
  }

  #[test]
  fn lengths_parse_in_px_em_percent() {
    assert_eq!(parse(PropertyId::MarginTop, "4px").unwrap(), Value::Length(Length::px(4.0)));
    assert_eq!(parse(PropertyId::MarginTop, "4").unwrap(), Value::Length(Length::px(4.0)));
    assert_eq!(
      parse(PropertyId::MarginTop, "1.5em").unwrap(),
      Value::Length(Length::em(1.5))
    );
    assert_eq!(
      parse(PropertyId::MinWidth, "50%").unwrap(),
      Value::Length(Length::percent(50.0))
    );
  }

  #[test]
  fn negative_padding_is_a_value_range_error() {
    let err = parse(PropertyId::PaddingLeft, "-3px").unwrap_err();
    assert_eq!(err.kind, DiagnosticKind::ValueRange);
  }

  #[test]
  fn negative_margin_is_allowed() {
    assert!(parse(PropertyId::MarginLeft, "-3px").is_ok());
  }

  #[test]
  fn colors_parse_named_hex_rgb() {
    assert_eq!(parse(PropertyId::Color, "red").unwrap(), Value::Color(Color::rgb(1.0, 0.0, 0.0)));
    assert_eq!(
      parse(PropertyId::Color, "#ff0000").unwrap(),
      Value::Color(Color::from_rgba8(255, 0, 0, 255))
    );
    assert_eq!(
      parse(PropertyId::Color, "rgb(0, 0, 255)").unwrap(),
      Value::Color(Color::from_rgba8(0, 0, 255, 255))
    );
    assert_eq!(
      parse(PropertyId::Color, "rgba(0, 0, 255, 0.5)").unwrap(),
      Value::Color(Color::rgba(0.0, 0.0, 1.0, 0.5))
    );
  }

  #[test]
  fn unresolved_color_reference_is_typed() {
    let err = parse(PropertyId::Color, "@accent").unwrap_err();
    assert_eq!(err.kind, DiagnosticKind::UnresolvedColorReference);
  }

  #[test]
  fn shadow_list_parses_offsets_and_inset() {
    let v = parse(PropertyId::BoxShadow, "5px 5px, inset -3px 0 2px 1px black").unwrap();
    let Value::Shadows(list) = v else { panic!("not a shadow list") };
    assert_eq!(list.shadows.len(), 2);
    assert!(!list.shadows[0].inset);
    assert_eq!(list.shadows[0].hoffset, Length::px(5.0));
    assert!(list.shadows[1].inset);
    assert_eq!(list.shadows[1].spread, Length::px(1.0));
  }

  #[test]
  fn shadow_none_is_empty() {
    let v = parse(PropertyId::BoxShadow, "none").unwrap();
    assert_eq!(v, Value::Shadows(ShadowList::none()));
  }

  #[test]
  fn font_family_handles_quoted_and_multi_ident() {
    let v = parse(PropertyId::FontFamily, "\"DejaVu Sans\", monospace").unwrap();
    let Value::FontFamily(families) = v else { panic!("not a family list") };
    assert_eq!(families.as_slice(), ["DejaVu Sans", "monospace"]);
  }

  #[test]
  fn every_property_round_trips_through_css_name() {
    for p in ALL_PROPERTIES {
      assert_eq!(PropertyId::from_css_name(p.css_name()), Some(p));
    }
  }

  #[test]
  fn initial_values_cover_every_property() {
    for p in ALL_PROPERTIES {
      // Must not panic, and the value must serialize.
      let _ = p.initial_value().to_string();
    }
  }
}
