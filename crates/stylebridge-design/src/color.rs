//! Design color to CSS color literal conversion.
//!
//! Opaque colors become uppercase `#RRGGBB` with whole bytes
//! (`floor(channel * 255)`). Translucent colors become
//! `rgba(r,g,b,a)` where the channels keep two decimals of precision in
//! `[0, 255]`. The asymmetry is deliberate: existing stylesheets written
//! against this output rely on it.

use crate::node::Rgba;

/// Convert a design color and an opacity multiplier to a CSS color literal.
///
/// # Example
///
/// ```
/// use stylebridge_design::{css_color, Rgba};
///
/// assert_eq!(css_color(&Rgba::rgb(1.0, 0.0, 0.5), 1.0), "#FF007F");
/// assert_eq!(css_color(&Rgba::rgb(0.05, 0.0, 1.0), 0.5), "rgba(12.75,0,255,0.5)");
/// ```
pub fn css_color(color: &Rgba, opacity: f64) -> String {
    let alpha = round2(color.a * opacity);

    if alpha < 1.0 {
        format!(
            "rgba({},{},{},{})",
            format_number(round2(color.r * 255.0)),
            format_number(round2(color.g * 255.0)),
            format_number(round2(color.b * 255.0)),
            format_number(alpha),
        )
    } else {
        format!(
            "#{:02X}{:02X}{:02X}",
            to_byte(color.r),
            to_byte(color.g),
            to_byte(color.b)
        )
    }
}

/// Format a number in its shortest form (`12`, `12.5`, never `12.0`).
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        // Avoid "-0".
        return "0".to_string();
    }
    format!("{value}")
}

/// Format a pixel length.
pub fn px(value: f64) -> String {
    format!("{}px", format_number(value))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn to_byte(channel: f64) -> u8 {
    (channel * 255.0).floor().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opaque_colors_are_hex() {
        assert_eq!(css_color(&Rgba::rgb(1.0, 1.0, 1.0), 1.0), "#FFFFFF");
        assert_eq!(css_color(&Rgba::rgb(0.0, 0.0, 0.0), 1.0), "#000000");
        // floor, not round: 0.5 * 255 = 127.5 -> 7F
        assert_eq!(css_color(&Rgba::rgb(0.5, 0.5, 0.5), 1.0), "#7F7F7F");
    }

    #[test]
    fn opacity_combines_with_alpha() {
        let color = Rgba::new(1.0, 0.0, 0.0, 0.5);
        assert_eq!(css_color(&color, 0.5), "rgba(255,0,0,0.25)");
    }

    #[test]
    fn rgba_keeps_two_decimals() {
        let color = Rgba::new(0.123456, 0.5, 0.0, 0.333);
        assert_eq!(css_color(&color, 1.0), "rgba(31.48,127.5,0,0.33)");
    }

    #[test]
    fn alpha_rounding_to_one_is_opaque() {
        let color = Rgba::new(0.2, 0.4, 1.0, 0.996);
        assert_eq!(css_color(&color, 1.0), "#3366FF");
    }

    #[test]
    fn number_formatting() {
        assert_eq!(format_number(12.0), "12");
        assert_eq!(format_number(12.5), "12.5");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(px(16.0), "16px");
    }
}
