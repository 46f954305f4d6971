//! Stylesheet parsing into a scope tree.
//!
//! The parser works in three passes over the text:
//!
//! 1. LESS line comments (`// ...`) and block comments are masked with
//!    spaces. Byte offsets stay valid, so every later position maps back to
//!    the original text.
//! 2. A bracket-balance scan (`{}`, `()`, `[]`) rejects text that cannot
//!    form a tree at all.
//! 3. `cssparser` tokenizes the masked text and the walker splits each
//!    block into items ending at `;` or `{`. Items become variable bindings,
//!    declarations or nested scopes.
//!
//! Declarations are resolved at the moment they are read: a variable bound
//! later in the text is not visible to an earlier declaration.
//!
//! # Error Recovery
//!
//! Only unbalanced brackets fail the parse. Anything else the walker does not
//! understand (at-rules, mixin calls, malformed declarations) is skipped and
//! logged.

use cssparser::{ParseError as CssParseError, Parser, ParserInput, SourcePosition, Token};
use stylebridge_core::logging::{PerfSpan, targets};
use stylebridge_core::{Pending, TaskQueue};

use crate::scope::{SELECTOR_RANGE_KEY, ScopeKey, ScopeTree};
use crate::shorthand::skip_nested;
use crate::source::{LineIndex, SourceRange};
use crate::{Error, Result};

/// Selector of the synthetic base scope.
pub const DEFAULT_BASE_SELECTOR: &str = "body";

/// Selectors whose blocks add to the base scope instead of nesting.
pub const DEFAULT_GLOBAL_SELECTORS: &[&str] = &["body", "html", "*", ":root"];

/// Parser of LESS-like stylesheets.
///
/// # Example
///
/// ```
/// use stylebridge_style::StylesheetParser;
///
/// let tree = StylesheetParser::new()
///     .parse("@gap: 8px;\n.card {\n  padding: @gap;\n  &:hover { color: red; }\n}\n")
///     .unwrap();
///
/// let card = tree.get_scope("body .card").unwrap();
/// assert_eq!(tree.get(card).unwrap().properties().get("padding"), Some("8px"));
/// assert_eq!(tree.all_selectors(), vec!["body", "body .card", "body .card:hover"]);
/// ```
#[derive(Debug, Clone)]
pub struct StylesheetParser {
    base_selector: String,
    global_selectors: Vec<String>,
}

impl Default for StylesheetParser {
    fn default() -> Self {
        Self {
            base_selector: DEFAULT_BASE_SELECTOR.to_string(),
            global_selectors: DEFAULT_GLOBAL_SELECTORS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl StylesheetParser {
    /// Create a parser with the default base and global selectors.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the selector of the base scope.
    pub fn with_base_selector(mut self, selector: impl Into<String>) -> Self {
        self.base_selector = selector.into();
        self
    }

    /// Replace the set of global selectors.
    pub fn with_global_selectors<I, S>(mut self, selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.global_selectors = selectors.into_iter().map(Into::into).collect();
        self
    }

    /// Selector of the base scope.
    pub fn base_selector(&self) -> &str {
        &self.base_selector
    }

    /// Check whether a raw selector augments the base scope.
    pub fn is_global(&self, selector: &str) -> bool {
        let selector = selector.trim();
        selector == self.base_selector || self.global_selectors.iter().any(|g| g == selector)
    }

    /// Parse stylesheet text into a scope tree.
    pub fn parse(&self, text: &str) -> Result<ScopeTree> {
        let _span = PerfSpan::new("parse_stylesheet");

        let masked = mask_comments(text);
        let index = LineIndex::new(text);
        check_braces(&masked, &index)?;

        let mut tree = ScopeTree::new(self.base_selector.as_str());
        let base = tree.base();
        let mut walker = Walker {
            parser: self,
            text: &masked,
            index: &index,
            tree: &mut tree,
        };

        let mut input = ParserInput::new(&masked);
        let mut css = Parser::new(&mut input);
        walker.block(&mut css, base);

        tracing::debug!(
            target: targets::STYLE,
            scopes = tree.len(),
            lines = index.line_count(),
            "parsed stylesheet"
        );
        Ok(tree)
    }

    /// Queue a parse on the host's task queue.
    ///
    /// The returned handle settles when the host drains the queue. A
    /// rejected parse rejects the handle with the parse error's message.
    pub fn parse_deferred(&self, text: impl Into<String>, queue: &mut TaskQueue) -> Pending<ScopeTree> {
        let (settler, pending) = Pending::channel();
        let parser = self.clone();
        let text = text.into();

        queue.post(move || match parser.parse(&text) {
            Ok(tree) => settler.resolve(tree),
            Err(error) => {
                tracing::warn!(target: targets::STYLE, %error, "stylesheet rejected");
                settler.reject(error.into());
            }
        });
        pending
    }
}

/// Parse a stylesheet with the default parser configuration.
pub fn parse_stylesheet(text: &str) -> Result<ScopeTree> {
    StylesheetParser::default().parse(text)
}

/// How a block item ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Terminator {
    Semicolon,
    Block,
    End,
}

struct Walker<'a> {
    parser: &'a StylesheetParser,
    text: &'a str,
    index: &'a LineIndex,
    tree: &'a mut ScopeTree,
}

impl Walker<'_> {
    fn block(&mut self, css: &mut Parser<'_, '_>, scope: ScopeKey) {
        loop {
            css.skip_whitespace();
            let start = css.position();
            let (terminator, end) = read_item(css);

            if end != start {
                let range = (start.byte_index(), end.byte_index());
                match terminator {
                    Terminator::Block => self.rule(css, scope, range),
                    Terminator::Semicolon | Terminator::End => self.statement(scope, range),
                }
            } else if terminator == Terminator::Block {
                tracing::warn!(
                    target: targets::STYLE,
                    at = %self.index.position(start.byte_index()),
                    "skipping block without selector"
                );
            }

            if terminator == Terminator::End {
                break;
            }
        }
    }

    /// A selector followed by a block.
    fn rule(&mut self, css: &mut Parser<'_, '_>, scope: ScopeKey, (start, end): (usize, usize)) {
        let text = self.text;
        let selector = &text[start..end];
        if selector.starts_with('@') {
            // The unread block is skipped by the next token read.
            tracing::debug!(target: targets::STYLE, rule = selector, "skipping at-rule block");
            return;
        }

        let range = selector_range(self.text, self.index, start);
        let target = if self.parser.is_global(selector) {
            let base = self.tree.base();
            let has_range = self.tree.get(base).is_some_and(|s| s.selector_range().is_some());
            if !has_range {
                self.tree.set_range(base, SELECTOR_RANGE_KEY, range);
            }
            base
        } else {
            let Some(child) = self.tree.add_scope(scope, selector) else {
                return;
            };
            self.tree.set_range(child, SELECTOR_RANGE_KEY, range);
            child
        };

        let _ = css.parse_nested_block(|nested| {
            self.block(nested, target);
            Ok::<_, CssParseError<'_, ()>>(())
        });
    }

    /// An item ended by `;` or by the end of its block.
    fn statement(&mut self, scope: ScopeKey, (start, end): (usize, usize)) {
        let text = self.text;
        let item = &text[start..end];
        let range = self.index.range(start, end);

        if let Some(rest) = item.strip_prefix('@') {
            if let Some((name, value)) = rest.split_once(':')
                && is_identifier(name.trim())
            {
                self.tree.bind_variable(scope, name.trim(), value.trim(), Some(range));
            } else {
                tracing::debug!(target: targets::STYLE, statement = item, "skipping at-rule");
            }
            return;
        }

        if let Some((name, value)) = item.split_once(':') {
            let (name, value) = (name.trim(), value.trim());
            if is_identifier(name) && !value.is_empty() {
                self.tree.declare(scope, name, value, Some(range));
                return;
            }
        }

        if item.starts_with('.') || item.starts_with('#') {
            tracing::debug!(target: targets::STYLE, statement = item, "skipping mixin call");
        } else {
            tracing::warn!(
                target: targets::STYLE,
                statement = item,
                at = %range.start,
                "skipping malformed declaration"
            );
        }
    }
}

/// Read tokens up to `;`, `{` or the end of the block.
///
/// Returns the terminator and the position just past the last
/// non-whitespace token.
fn read_item(css: &mut Parser<'_, '_>) -> (Terminator, SourcePosition) {
    let mut end = css.position();
    loop {
        let opens_block = match css.next_including_whitespace() {
            Err(_) => return (Terminator::End, end),
            Ok(Token::Semicolon) => return (Terminator::Semicolon, end),
            Ok(Token::CurlyBracketBlock) => return (Terminator::Block, end),
            Ok(Token::WhiteSpace(_)) => continue,
            Ok(token) => matches!(
                token,
                Token::Function(_) | Token::ParenthesisBlock | Token::SquareBracketBlock
            ),
        };
        if opens_block {
            skip_nested(css);
        }
        end = css.position();
    }
}

/// Range of a selector: from its start to one past the last non-whitespace
/// character before the opening brace, scanning line by line.
fn selector_range(text: &str, index: &LineIndex, start: usize) -> SourceRange {
    let mut end = start;
    let mut line = index.position(start).line as usize;
    let mut from = start;

    while from < text.len() {
        let line_end = index.line_start(line + 1).unwrap_or(text.len());
        for (offset, ch) in text[from..line_end].char_indices() {
            if ch == '{' {
                return index.range(start, end);
            }
            if !ch.is_whitespace() {
                end = from + offset + ch.len_utf8();
            }
        }
        line += 1;
        from = line_end;
    }
    index.range(start, end)
}

/// Replace comments with spaces, keeping every byte offset.
///
/// `//` directly after `:` is kept (it is a URL scheme, not a comment), as
/// is anything inside a quoted string.
pub fn mask_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut quote: Option<char> = None;
    let mut prev: Option<char> = None;

    fn blank(out: &mut String, ch: char) {
        if ch == '\n' {
            out.push('\n');
        } else {
            out.extend(std::iter::repeat_n(' ', ch.len_utf8()));
        }
    }

    while let Some(ch) = chars.next() {
        if let Some(q) = quote {
            out.push(ch);
            if ch == '\\' {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            } else if ch == q || ch == '\n' {
                quote = None;
            }
            prev = Some(ch);
            continue;
        }

        match (ch, chars.peek().copied()) {
            ('"' | '\'', _) => {
                quote = Some(ch);
                out.push(ch);
            }
            ('/', Some('/')) if prev != Some(':') => {
                blank(&mut out, ch);
                while let Some(&next) = chars.peek() {
                    if next == '\n' {
                        break;
                    }
                    blank(&mut out, next);
                    chars.next();
                }
            }
            ('/', Some('*')) => {
                blank(&mut out, ch);
                if let Some(star) = chars.next() {
                    blank(&mut out, star);
                }
                // The opening `*` must not close the comment, as in `/*/`.
                let mut last = ' ';
                for next in chars.by_ref() {
                    blank(&mut out, next);
                    if last == '*' && next == '/' {
                        break;
                    }
                    last = next;
                }
            }
            _ => out.push(ch),
        }
        prev = Some(ch);
    }
    out
}

/// Reject text whose braces, parentheses or square brackets do not pair up.
///
/// The tokenizer skips nested blocks up to their matching closer, so an
/// unclosed `(` would otherwise swallow everything after it.
fn check_braces(masked: &str, index: &LineIndex) -> Result<()> {
    let mut open: Vec<(char, usize)> = Vec::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (offset, ch) in masked.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        if ch == '\\' {
            escaped = true;
            continue;
        }
        if let Some(q) = quote {
            if ch == q || ch == '\n' {
                quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' => quote = Some(ch),
            '{' | '(' | '[' => open.push((ch, offset)),
            '}' | ')' | ']' => {
                let opener = match ch {
                    '}' => '{',
                    ')' => '(',
                    _ => '[',
                };
                if open.last().is_some_and(|&(found, _)| found == opener) {
                    open.pop();
                } else if let Some(&(found, at)) = open.last()
                    && open.iter().any(|&(outer, _)| outer == opener)
                {
                    return Err(unclosed(found, index, at));
                } else {
                    return Err(parse_error(&format!("unexpected `{ch}`"), index, offset));
                }
            }
            _ => {}
        }
    }

    match open.last() {
        Some(&(found, at)) => Err(unclosed(found, index, at)),
        None => Ok(()),
    }
}

fn unclosed(opener: char, index: &LineIndex, offset: usize) -> Error {
    if opener == '{' {
        parse_error("unclosed block", index, offset)
    } else {
        parse_error(&format!("unclosed `{opener}`"), index, offset)
    }
}

fn parse_error(message: &str, index: &LineIndex, offset: usize) -> Error {
    let position = index.position(offset);
    Error::parse(message, position.line + 1, position.column + 1)
}

/// Property and variable names: letters, digits, `-` and `_`.
fn is_identifier(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '_')
}
