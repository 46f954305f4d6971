//! Shorthand property expansion.
//!
//! Both sides of a comparison are expanded to longhands before they are
//! diffed, so that `margin: 0 4px` in a stylesheet compares correctly with
//! `margin-left: 4px` coming from a design, and the reverse.
//!
//! | Shorthand                        | Longhands                                            |
//! |----------------------------------|------------------------------------------------------|
//! | `margin`, `padding`              | `-top`, `-right`, `-bottom`, `-left` (1 to 4 values) |
//! | `border-width/-style/-color`     | the four `border-<side>-<part>` longhands            |
//! | `border-radius`                  | the four corner radii (1 to 4 values)                |
//! | `border`, `border-<side>`        | width, style and color of the affected sides         |
//! | `font`                           | style, variant, weight, size, line height, family    |
//! | `background`                     | `background-color`, single color values only         |
//! | `gap`                            | `row-gap`, `column-gap`                              |
//!
//! Values that do not fit a shorthand's grammar pass through unexpanded.

use cssparser::{ParseError as CssParseError, Parser, ParserInput, Token};

use crate::color::CssColor;

const SIDES: [&str; 4] = ["top", "right", "bottom", "left"];
const CORNERS: [&str; 4] = ["top-left", "top-right", "bottom-right", "bottom-left"];
const BORDER_PARTS: [&str; 3] = ["width", "style", "color"];

const BORDER_STYLES: &[&str] = &[
    "none", "hidden", "dotted", "dashed", "solid", "double", "groove", "ridge", "inset", "outset",
];
const BORDER_WIDTHS: &[&str] = &["thin", "medium", "thick"];
const FONT_STYLES: &[&str] = &["italic", "oblique"];
const FONT_VARIANTS: &[&str] = &["small-caps"];
const FONT_WEIGHTS: &[&str] = &["bold", "bolder", "lighter"];
const FONT_SIZES: &[&str] = &[
    "xx-small", "x-small", "small", "medium", "large", "x-large", "xx-large", "smaller", "larger",
];

/// One whitespace separated component of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Component<'a> {
    text: &'a str,
    /// Byte offset of the component in the value.
    start: usize,
}

/// Expand a declaration into longhand declarations.
///
/// Properties without an expansion rule, or values the rule cannot
/// interpret, come back as the single input declaration.
///
/// # Example
///
/// ```
/// use stylebridge_style::expand_shorthand;
///
/// let longhands = expand_shorthand("padding", "4px 8px");
/// assert_eq!(longhands, vec![
///     ("padding-top".to_string(), "4px".to_string()),
///     ("padding-right".to_string(), "8px".to_string()),
///     ("padding-bottom".to_string(), "4px".to_string()),
///     ("padding-left".to_string(), "8px".to_string()),
/// ]);
/// ```
pub fn expand_shorthand(name: &str, value: &str) -> Vec<(String, String)> {
    let value = value.trim();
    let expanded = match name {
        "margin" | "padding" => boxed(value, |side| format!("{name}-{side}"), &SIDES),
        "border-width" | "border-style" | "border-color" => {
            let part = &name["border-".len()..];
            boxed(value, |side| format!("border-{side}-{part}"), &SIDES)
        }
        "border-radius" if !value.contains('/') => {
            boxed(value, |corner| format!("border-{corner}-radius"), &CORNERS)
        }
        "border" => border(value, &SIDES),
        "border-top" | "border-right" | "border-bottom" | "border-left" => {
            border(value, &[&name["border-".len()..]])
        }
        "font" => font(value),
        "background" => CssColor::parse(value).map(|_| vec![("background-color".to_string(), value.to_string())]),
        "gap" => gap(value),
        _ => None,
    };
    expanded.unwrap_or_else(|| vec![(name.to_string(), value.to_string())])
}

/// Check whether a property has an expansion rule.
pub fn is_shorthand(name: &str) -> bool {
    matches!(
        name,
        "margin"
            | "padding"
            | "border-width"
            | "border-style"
            | "border-color"
            | "border-radius"
            | "border"
            | "border-top"
            | "border-right"
            | "border-bottom"
            | "border-left"
            | "font"
            | "background"
            | "gap"
    )
}

/// 1 to 4 values distributed clockwise from the top (or top-left).
fn boxed<F>(value: &str, longhand: F, targets: &[&str; 4]) -> Option<Vec<(String, String)>>
where
    F: Fn(&str) -> String,
{
    let parts: Vec<&str> = components(value).iter().map(|c| c.text).collect();
    let [top, right, bottom, left] = match parts.as_slice() {
        [a] => [*a, *a, *a, *a],
        [a, b] => [*a, *b, *a, *b],
        [a, b, c] => [*a, *b, *c, *b],
        [a, b, c, d] => [*a, *b, *c, *d],
        _ => return None,
    };
    Some(
        targets
            .iter()
            .zip([top, right, bottom, left])
            .map(|(target, value)| (longhand(*target), value.to_string()))
            .collect(),
    )
}

/// `border` or a single side: any order of width, style and color, each
/// optional, with CSS initial values for omitted parts.
fn border(value: &str, sides: &[&str]) -> Option<Vec<(String, String)>> {
    let mut width = None;
    let mut style = None;
    let mut color = None;

    for component in components(value) {
        let text = component.text;
        let lower = text.to_ascii_lowercase();
        if style.is_none() && BORDER_STYLES.contains(&lower.as_str()) {
            style = Some(text);
        } else if width.is_none() && (BORDER_WIDTHS.contains(&lower.as_str()) || is_length(text)) {
            width = Some(text);
        } else if color.is_none() && (CssColor::parse(text).is_some() || lower == "currentcolor") {
            color = Some(text);
        } else {
            return None;
        }
    }

    let parts = [
        width.unwrap_or("medium"),
        style.unwrap_or("none"),
        color.unwrap_or("currentcolor"),
    ];
    Some(
        sides
            .iter()
            .flat_map(|side| {
                BORDER_PARTS
                    .iter()
                    .zip(parts)
                    .map(move |(part, value)| (format!("border-{side}-{part}"), value.to_string()))
            })
            .collect(),
    )
}

/// `font: [style] [variant] [weight] size[/line-height] family`.
fn font(value: &str) -> Option<Vec<(String, String)>> {
    let parts = components(value);
    let mut style = "normal";
    let mut variant = "normal";
    let mut weight = "normal";
    let mut index = 0;

    // Keywords before the size, in any order.
    while let Some(component) = parts.get(index) {
        let text = component.text;
        let lower = text.to_ascii_lowercase();
        if FONT_STYLES.contains(&lower.as_str()) {
            style = text;
        } else if FONT_VARIANTS.contains(&lower.as_str()) {
            variant = text;
        } else if FONT_WEIGHTS.contains(&lower.as_str()) || is_numeric_weight(text) {
            weight = text;
        } else if lower != "normal" {
            break;
        }
        index += 1;
    }

    let size = parts.get(index)?;
    if !is_length(size.text) && !FONT_SIZES.contains(&size.text.to_ascii_lowercase().as_str()) {
        return None;
    }
    index += 1;

    let mut line_height = "normal";
    if parts.get(index).is_some_and(|c| c.text == "/") {
        line_height = parts.get(index + 1)?.text;
        index += 2;
    }

    let family = value[parts.get(index)?.start..].trim();

    Some(vec![
        ("font-style".to_string(), style.to_string()),
        ("font-variant".to_string(), variant.to_string()),
        ("font-weight".to_string(), weight.to_string()),
        ("font-size".to_string(), size.text.to_string()),
        ("line-height".to_string(), line_height.to_string()),
        ("font-family".to_string(), family.to_string()),
    ])
}

fn gap(value: &str) -> Option<Vec<(String, String)>> {
    let parts = components(value);
    let (row, column) = match parts.as_slice() {
        [both] => (both.text, both.text),
        [row, column] => (row.text, column.text),
        _ => return None,
    };
    Some(vec![
        ("row-gap".to_string(), row.to_string()),
        ("column-gap".to_string(), column.to_string()),
    ])
}

fn is_length(text: &str) -> bool {
    let mut input = ParserInput::new(text);
    let mut parser = Parser::new(&mut input);
    let length = match parser.next() {
        Ok(Token::Dimension { .. } | Token::Percentage { .. }) => true,
        Ok(Token::Number { value, .. }) => *value == 0.0,
        _ => false,
    };
    length && parser.is_exhausted()
}

fn is_numeric_weight(text: &str) -> bool {
    text.parse::<u16>().is_ok_and(|weight| (1..=1000).contains(&weight))
}

/// Split a value into whitespace separated components.
///
/// Function calls, quoted strings and bracketed groups stay whole, so
/// `rgba(0, 0, 0, 0.5)` is one component. A `/` or `,` delimiter is a
/// component of its own.
fn components(value: &str) -> Vec<Component<'_>> {
    let mut input = ParserInput::new(value);
    let mut parser = Parser::new(&mut input);
    let mut parts = Vec::new();

    loop {
        parser.skip_whitespace();
        let start = parser.position();
        let Ok(token) = parser.next_including_whitespace() else {
            break;
        };
        let opens_block = matches!(
            token,
            Token::Function(_) | Token::ParenthesisBlock | Token::SquareBracketBlock | Token::CurlyBracketBlock
        );
        if opens_block {
            skip_nested(&mut parser);
        }
        let text = parser.slice_from(start);
        parts.push(Component {
            text,
            start: start.byte_index(),
        });
    }
    parts
}

/// Consume the contents of the block the last token opened.
pub(crate) fn skip_nested(parser: &mut Parser<'_, '_>) {
    let _ = parser.parse_nested_block(|nested| {
        while nested.next_including_whitespace_and_comments().is_ok() {}
        Ok::<_, CssParseError<'_, ()>>(())
    });
}

/// Expand every declaration of a map, later declarations winning.
pub(crate) fn expand_all<'a>(
    declarations: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> Vec<(String, String, &'a str)> {
    let mut expanded: Vec<(String, String, &'a str)> = Vec::new();
    for (name, value) in declarations {
        for (longhand, longhand_value) in expand_shorthand(name, value) {
            match expanded.iter_mut().find(|(existing, _, _)| *existing == longhand) {
                Some(entry) => {
                    entry.1 = longhand_value;
                    entry.2 = name;
                }
                None => expanded.push((longhand, longhand_value, name)),
            }
        }
    }
    expanded
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expanded(name: &str, value: &str) -> Vec<(String, String)> {
        expand_shorthand(name, value)
    }

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items.iter().map(|(n, v)| (n.to_string(), v.to_string())).collect()
    }

    #[test]
    fn box_values() {
        assert_eq!(
            expanded("margin", "1px 2px 3px"),
            pairs(&[
                ("margin-top", "1px"),
                ("margin-right", "2px"),
                ("margin-bottom", "3px"),
                ("margin-left", "2px"),
            ])
        );
        assert_eq!(
            expanded("border-color", "#FFF rgba(0, 0, 0, 0.5)"),
            pairs(&[
                ("border-top-color", "#FFF"),
                ("border-right-color", "rgba(0, 0, 0, 0.5)"),
                ("border-bottom-color", "#FFF"),
                ("border-left-color", "rgba(0, 0, 0, 0.5)"),
            ])
        );
        assert_eq!(expanded("padding", "1px 2px 3px 4px 5px"), pairs(&[("padding", "1px 2px 3px 4px 5px")]));
    }

    #[test]
    fn corner_radii() {
        assert_eq!(
            expanded("border-radius", "4px"),
            pairs(&[
                ("border-top-left-radius", "4px"),
                ("border-top-right-radius", "4px"),
                ("border-bottom-right-radius", "4px"),
                ("border-bottom-left-radius", "4px"),
            ])
        );
        assert_eq!(expanded("border-radius", "4px / 2px"), pairs(&[("border-radius", "4px / 2px")]));
    }

    #[test]
    fn border_shorthands() {
        let all = expanded("border", "solid 1px #000");
        assert_eq!(all.len(), 12);
        assert!(all.contains(&("border-left-width".to_string(), "1px".to_string())));
        assert!(all.contains(&("border-top-style".to_string(), "solid".to_string())));
        assert!(all.contains(&("border-bottom-color".to_string(), "#000".to_string())));

        assert_eq!(
            expanded("border-top", "2px dashed"),
            pairs(&[
                ("border-top-width", "2px"),
                ("border-top-style", "dashed"),
                ("border-top-color", "currentcolor"),
            ])
        );
        assert_eq!(expanded("border", "1px fancy"), pairs(&[("border", "1px fancy")]));
    }

    #[test]
    fn font_shorthand() {
        assert_eq!(
            expanded("font", "italic 700 14px/20px \"Inter\", sans-serif"),
            pairs(&[
                ("font-style", "italic"),
                ("font-variant", "normal"),
                ("font-weight", "700"),
                ("font-size", "14px"),
                ("line-height", "20px"),
                ("font-family", "\"Inter\", sans-serif"),
            ])
        );
        assert_eq!(expanded("font", "12px Arial")[3], ("font-size".to_string(), "12px".to_string()));
        assert_eq!(expanded("font", "caption"), pairs(&[("font", "caption")]));
    }

    #[test]
    fn background_and_gap() {
        assert_eq!(expanded("background", "#FFFFFF"), pairs(&[("background-color", "#FFFFFF")]));
        assert_eq!(
            expanded("background", "url(a.png) no-repeat"),
            pairs(&[("background", "url(a.png) no-repeat")])
        );
        assert_eq!(expanded("gap", "8px"), pairs(&[("row-gap", "8px"), ("column-gap", "8px")]));
        assert_eq!(expanded("color", "red"), pairs(&[("color", "red")]));
    }

    #[test]
    fn later_declarations_win() {
        let expanded = expand_all([("margin", "0"), ("margin-left", "4px")]);
        let left = expanded.iter().find(|(name, _, _)| name == "margin-left").unwrap();
        assert_eq!(left.1, "4px");
        assert_eq!(left.2, "margin-left");
        let top = expanded.iter().find(|(name, _, _)| name == "margin-top").unwrap();
        assert_eq!(top.2, "margin");
    }
}
