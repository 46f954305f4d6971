//! Style extraction from a single design node.
//!
//! The rules run in a fixed order and later rules may overwrite a property an
//! earlier rule set:
//!
//! | Attribute      | CSS properties                                              |
//! |----------------|-------------------------------------------------------------|
//! | text style     | `font-family`, `font-size`, `font-weight`, `line-height`    |
//! | fills          | `color` (text) or `background-color`, last solid fill wins  |
//! | strokes        | `border-style`, `border-color` from the first solid stroke  |
//! | stroke weight  | `border-width`, only when strokes exist                     |
//! | corner radius  | `border-radius`                                             |
//! | effects        | `box-shadow`, last shadow wins                              |

use stylebridge_core::CssPropertyMap;

use crate::color::{css_color, format_number, px};
use crate::node::{DesignNode, EffectKind, NodeType, TypeStyle, Visual};

/// Derive the CSS property map of a node from its own attributes.
///
/// Never fails: missing or unknown attributes contribute nothing.
pub fn extract_style(node: &DesignNode) -> CssPropertyMap {
    let mut style = CssPropertyMap::new();

    if let Some(text_style) = node.kind.text_style() {
        typography(text_style, &mut style);
    }

    if let Some(visual) = node.kind.visual() {
        fills(visual, node.node_type() == NodeType::Text, &mut style);
        strokes(visual, &mut style);
        if let Some(radius) = visual.corner_radius {
            style.insert("border-radius", px(radius));
        }
        effects(visual, &mut style);
    }

    style
}

fn typography(text_style: &TypeStyle, style: &mut CssPropertyMap) {
    if let Some(family) = &text_style.font_family {
        style.insert("font-family", format!("\"{family}\""));
    }
    if let Some(size) = text_style.font_size {
        style.insert("font-size", px(size));
    }
    if let Some(weight) = text_style.font_weight {
        style.insert("font-weight", format_number(weight));
    }
    if let Some(line_height) = text_style.line_height_px {
        style.insert("line-height", px(line_height));
    }
}

fn fills(visual: &Visual, is_text: bool, style: &mut CssPropertyMap) {
    let property = if is_text { "color" } else { "background-color" };
    for paint in &visual.fills {
        if let Some(color) = paint.solid_color() {
            style.insert(property, css_color(color, paint.opacity));
        }
    }
}

fn strokes(visual: &Visual, style: &mut CssPropertyMap) {
    if let Some((paint, color)) = visual
        .strokes
        .iter()
        .find_map(|paint| paint.solid_color().map(|color| (paint, color)))
    {
        style.insert("border-style", "solid");
        style.insert("border-color", css_color(color, paint.opacity));
    }

    if !visual.strokes.is_empty()
        && let Some(weight) = visual.stroke_weight
    {
        style.insert("border-width", px(weight));
    }
}

fn effects(visual: &Visual, style: &mut CssPropertyMap) {
    for effect in visual.effects.iter().filter(|e| e.visible) {
        let inset = match effect.kind {
            EffectKind::DropShadow => "",
            EffectKind::InnerShadow => "inset ",
            _ => continue,
        };
        let Some(color) = &effect.color else {
            continue;
        };
        style.insert(
            "box-shadow",
            format!(
                "{inset}{} {} {} {}",
                px(effect.offset.x),
                px(effect.offset.y),
                px(effect.radius),
                css_color(color, 1.0)
            ),
        );
    }
}
