//! Selector directives embedded in component descriptions.
//!
//! Designers tag a component with the stylesheet selector it maps to by
//! writing it between angle brackets anywhere in the description:
//!
//! ```text
//! Primary call-to-action. <.button>
//! ```

/// Extract the selector directive of a component description.
///
/// Takes the first token after `<`, ending at whitespace or `>`. Returns
/// `None` when the description has no bracketed directive.
///
/// # Example
///
/// ```
/// use stylebridge_design::selector_directive;
///
/// assert_eq!(selector_directive("Main CTA <.button>"), Some(".button"));
/// assert_eq!(selector_directive("<.card .title>"), Some(".card"));
/// assert_eq!(selector_directive("no directive"), None);
/// ```
pub fn selector_directive(description: &str) -> Option<&str> {
    let start = description.find('<')? + 1;
    let rest = &description[start..];
    // Brackets must close for the text to count as a directive.
    rest.find('>')?;

    let end = rest
        .find(|c: char| c.is_whitespace() || c == '>')
        .unwrap_or(rest.len());
    let token = &rest[..end];
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directive_tokens() {
        assert_eq!(selector_directive("<.button>"), Some(".button"));
        assert_eq!(selector_directive("Icon button <.icon-button:hover> for toolbars"), Some(".icon-button:hover"));
        assert_eq!(selector_directive("<#submit extra>"), Some("#submit"));
    }

    #[test]
    fn missing_or_empty_directive() {
        assert_eq!(selector_directive(""), None);
        assert_eq!(selector_directive("<>"), None);
        assert_eq!(selector_directive("< .button>"), None);
        assert_eq!(selector_directive("unterminated <.button"), None);
    }
}
