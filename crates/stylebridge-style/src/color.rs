//! CSS color parsing for property comparison.
//!
//! Colors are normalized to RGBA with channels in `[0, 255]` and alpha in
//! `[0, 1]`. Channels are not rounded, so `rgba(12.75,0,0,0.5)` keeps its
//! fractional red channel.

use cssparser::{ParseError as CssParseError, Parser, ParserInput, Token};

/// A parsed CSS color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CssColor {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl CssColor {
    /// Fully transparent black, the value of the `transparent` keyword.
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Create a color.
    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f64, g as f64, b as f64, 1.0)
    }

    /// Parse a CSS color value.
    ///
    /// Supports hex notation (3, 4, 6 and 8 digits), `rgb()`/`rgba()` with
    /// comma or space separated arguments, and basic named colors. Returns
    /// `None` for anything else, including trailing garbage.
    ///
    /// # Example
    ///
    /// ```
    /// use stylebridge_style::CssColor;
    ///
    /// let red = CssColor::parse("#F00").unwrap();
    /// assert_eq!(CssColor::parse("rgb(255, 0, 0)"), Some(red));
    /// assert_eq!(CssColor::parse("red"), Some(red));
    /// assert!(CssColor::parse("not-a-color").is_none());
    /// ```
    pub fn parse(value: &str) -> Option<Self> {
        let mut input = ParserInput::new(value.trim());
        let mut parser = Parser::new(&mut input);
        let color = parse_color(&mut parser).ok()?;
        parser.skip_whitespace();
        parser.is_exhausted().then_some(color)
    }
}

fn parse_color<'i>(parser: &mut Parser<'i, '_>) -> Result<CssColor, CssParseError<'i, ()>> {
    parser.skip_whitespace();
    let token = parser.next()?.clone();

    match token {
        Token::Hash(hash) | Token::IDHash(hash) => {
            from_hex(&hash).ok_or_else(|| parser.new_custom_error(()))
        }
        Token::Ident(name) => named(&name.to_ascii_lowercase()).ok_or_else(|| parser.new_custom_error(())),
        Token::Function(name) if name.eq_ignore_ascii_case("rgb") || name.eq_ignore_ascii_case("rgba") => {
            parser.parse_nested_block(|p| parse_rgb_arguments(p))
        }
        _ => Err(parser.new_custom_error(())),
    }
}

/// Arguments of `rgb()`/`rgba()`: legacy comma syntax or the space syntax
/// with an optional `/ alpha`.
fn parse_rgb_arguments<'i>(parser: &mut Parser<'i, '_>) -> Result<CssColor, CssParseError<'i, ()>> {
    let r = parse_channel(parser)?;
    let comma = parser.try_parse(|p| p.expect_comma()).is_ok();
    let g = parse_channel(parser)?;
    if comma {
        parser.expect_comma()?;
    }
    let b = parse_channel(parser)?;

    let has_alpha = if comma {
        parser.try_parse(|p| p.expect_comma()).is_ok()
    } else {
        parser.try_parse(|p| p.expect_delim('/')).is_ok()
    };
    let a = if has_alpha { parse_alpha(parser)? } else { 1.0 };

    parser.skip_whitespace();
    if !parser.is_exhausted() {
        return Err(parser.new_custom_error(()));
    }
    Ok(CssColor::new(r, g, b, a))
}

fn parse_channel<'i>(parser: &mut Parser<'i, '_>) -> Result<f64, CssParseError<'i, ()>> {
    parser.skip_whitespace();
    match parser.next()? {
        Token::Number { value, .. } => Ok(f64::from(*value)),
        Token::Percentage { unit_value, .. } => Ok(f64::from(*unit_value) * 255.0),
        _ => Err(parser.new_custom_error(())),
    }
}

fn parse_alpha<'i>(parser: &mut Parser<'i, '_>) -> Result<f64, CssParseError<'i, ()>> {
    parser.skip_whitespace();
    match parser.next()? {
        Token::Number { value, .. } => Ok(f64::from(value.clamp(0.0, 1.0))),
        Token::Percentage { unit_value, .. } => Ok(f64::from(unit_value.clamp(0.0, 1.0))),
        _ => Err(parser.new_custom_error(())),
    }
}

fn from_hex(hex: &str) -> Option<CssColor> {
    let digits: Vec<u8> = hex
        .chars()
        .map(|c| c.to_digit(16).map(|d| d as u8))
        .collect::<Option<_>>()?;

    let channels: Vec<u8> = match digits.len() {
        3 | 4 => digits.iter().map(|d| d * 17).collect(),
        6 | 8 => digits.chunks(2).map(|pair| pair[0] * 16 + pair[1]).collect(),
        _ => return None,
    };

    let alpha = channels.get(3).map_or(1.0, |&a| f64::from(a) / 255.0);
    Some(CssColor::new(
        f64::from(channels[0]),
        f64::from(channels[1]),
        f64::from(channels[2]),
        alpha,
    ))
}

fn named(name: &str) -> Option<CssColor> {
    let color = match name {
        "transparent" => CssColor::TRANSPARENT,
        "black" => CssColor::opaque(0, 0, 0),
        "white" => CssColor::opaque(255, 255, 255),
        "red" => CssColor::opaque(255, 0, 0),
        "green" => CssColor::opaque(0, 128, 0),
        "lime" => CssColor::opaque(0, 255, 0),
        "blue" => CssColor::opaque(0, 0, 255),
        "yellow" => CssColor::opaque(255, 255, 0),
        "cyan" | "aqua" => CssColor::opaque(0, 255, 255),
        "magenta" | "fuchsia" => CssColor::opaque(255, 0, 255),
        "gray" | "grey" => CssColor::opaque(128, 128, 128),
        "silver" => CssColor::opaque(192, 192, 192),
        "maroon" => CssColor::opaque(128, 0, 0),
        "olive" => CssColor::opaque(128, 128, 0),
        "purple" => CssColor::opaque(128, 0, 128),
        "teal" => CssColor::opaque(0, 128, 128),
        "navy" => CssColor::opaque(0, 0, 128),
        "orange" => CssColor::opaque(255, 165, 0),
        _ => return None,
    };
    Some(color)
}
