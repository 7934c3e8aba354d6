//! Placeholder templates.
//!
//! A template compiles once into a flat list of [`Token`]s which is both what
//! gets interpreted at render time and what the cache persists. Supported
//! placeholders:
//!
//! - `${name}` substitutes the field verbatim.
//! - `<%= name %>` substitutes verbatim, `<%- name %>` HTML-escaped.
//! - `\${` is a literal `${`, so generated JavaScript can keep its own
//!   template literals.

pub mod cache;
mod context;

pub use context::RenderContext;

use crate::error::{RenderError, TemplateSyntaxError};
use serde::{Deserialize, Serialize};

/// One piece of a compiled template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Token {
    Text {
        value: String,
    },
    Field {
        name: String,
        escape: bool,
        line: usize,
        column: usize,
    },
}

/// A compiled template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    tokens: Vec<Token>,
}

/// Placeholder openers in the order they are looked for.
enum Opener {
    EscapedDollar,
    Dollar,
    Erb,
}

impl Template {
    /// Compiles template source into tokens.
    ///
    /// # Errors
    ///
    /// Returns `TemplateSyntaxError` for unterminated placeholders, invalid
    /// identifiers, and `<% %>` code blocks.
    pub fn compile(source: &str) -> Result<Self, TemplateSyntaxError> {
        let mut tokens: Vec<Token> = Vec::new();
        let mut text: String = String::new();
        let mut offset: usize = 0;

        while let Some((start, opener)) = next_opener(source, offset) {
            text.push_str(&source[offset..start]);
            match opener {
                Opener::EscapedDollar => {
                    text.push_str("${");
                    offset = start + 3;
                }
                Opener::Dollar => {
                    let body_start: usize = start + 2;
                    let Some(len) = source[body_start..].find('}') else {
                        return Err(syntax_error(source, start, "unterminated `${` placeholder"));
                    };
                    let name: &str = parse_identifier(source, start, &source[body_start..body_start + len])?;
                    flush_text(&mut tokens, &mut text);
                    tokens.push(field_token(source, start, name, false));
                    offset = body_start + len + 1;
                }
                Opener::Erb => {
                    let escape: bool = match source[start + 2..].chars().next() {
                        Some('=') => false,
                        Some('-') => true,
                        _ => {
                            return Err(syntax_error(
                                source,
                                start,
                                "code blocks are not supported; use `<%=` or `<%-`",
                            ));
                        }
                    };
                    let body_start: usize = start + 3;
                    let Some(len) = source[body_start..].find("%>") else {
                        return Err(syntax_error(source, start, "unterminated `<%` placeholder"));
                    };
                    let name: &str = parse_identifier(source, start, &source[body_start..body_start + len])?;
                    flush_text(&mut tokens, &mut text);
                    tokens.push(field_token(source, start, name, escape));
                    offset = body_start + len + 2;
                }
            }
        }
        text.push_str(&source[offset..]);
        flush_text(&mut tokens, &mut text);

        Ok(Self { tokens })
    }

    /// Rebuilds a template from tokens read back from a cache artifact.
    #[must_use]
    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Field names referenced by the template, in order of appearance.
    #[cfg(test)]
    pub(crate) fn fields(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().filter_map(|token| match token {
            Token::Field { name, .. } => Some(name.as_str()),
            Token::Text { .. } => None,
        })
    }

    /// Substitutes every placeholder from `context`.
    ///
    /// # Errors
    ///
    /// Returns `RenderError` for the first placeholder whose field the context
    /// does not define.
    pub fn render(&self, context: &RenderContext) -> Result<String, RenderError> {
        let mut output: String = String::new();
        for token in &self.tokens {
            match token {
                Token::Text { value } => output.push_str(value),
                Token::Field {
                    name,
                    escape,
                    line,
                    column,
                } => {
                    let value = context.get(name).ok_or_else(|| RenderError {
                        field: name.clone(),
                        line: *line,
                        column: *column,
                    })?;
                    if *escape {
                        push_html_escaped(&mut output, &value);
                    } else {
                        output.push_str(&value);
                    }
                }
            }
        }
        Ok(output)
    }
}

fn next_opener(source: &str, from: usize) -> Option<(usize, Opener)> {
    let rest: &str = &source[from..];
    let dollar: Option<usize> = rest.find("${");
    let erb: Option<usize> = rest.find("<%");
    let (index, opener) = match (dollar, erb) {
        (Some(d), Some(e)) if e < d => (e, Opener::Erb),
        (Some(d), _) => (d, Opener::Dollar),
        (None, Some(e)) => (e, Opener::Erb),
        (None, None) => return None,
    };
    if matches!(opener, Opener::Dollar) && rest[..index].ends_with('\\') {
        return Some((from + index - 1, Opener::EscapedDollar));
    }
    Some((from + index, opener))
}

fn flush_text(tokens: &mut Vec<Token>, text: &mut String) {
    if !text.is_empty() {
        tokens.push(Token::Text {
            value: std::mem::take(text),
        });
    }
}

fn field_token(source: &str, offset: usize, name: &str, escape: bool) -> Token {
    let (line, column) = position(source, offset);
    Token::Field {
        name: name.to_string(),
        escape,
        line,
        column,
    }
}

fn parse_identifier<'a>(
    source: &str,
    offset: usize,
    body: &'a str,
) -> Result<&'a str, TemplateSyntaxError> {
    let name: &str = body.trim();
    if is_identifier(name) {
        Ok(name)
    } else {
        Err(syntax_error(
            source,
            offset,
            &format!("`{name}` is not a valid identifier"),
        ))
    }
}

/// `[A-Za-z_$][A-Za-z0-9_$]*`
#[must_use]
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// 1-based line and column (in chars) of a byte offset.
fn position(source: &str, offset: usize) -> (usize, usize) {
    let before: &str = &source[..offset];
    let line: usize = before.matches('\n').count() + 1;
    let line_start: usize = before.rfind('\n').map_or(0, |i| i + 1);
    let column: usize = before[line_start..].chars().count() + 1;
    (line, column)
}

fn syntax_error(source: &str, offset: usize, message: &str) -> TemplateSyntaxError {
    let (line, column) = position(source, offset);
    TemplateSyntaxError {
        line,
        column,
        message: message.to_string(),
    }
}

fn push_html_escaped(output: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' => output.push_str("&quot;"),
            '\'' => output.push_str("&#x27;"),
            '`' => output.push_str("&#x60;"),
            other => output.push(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> RenderContext {
        RenderContext::new("widget", r#"{"type":"object"}"#, r#"{"a":"<b>"}"#)
    }

    #[test]
    fn dollar_placeholders_substitute_fields() {
        let template = Template::compile("const ${slug} = ${ exampleModel };").unwrap();
        let actual: String = template.render(&context()).unwrap();
        assert_eq!(actual, r#"const widget = {"a":"<b>"};"#);
    }

    #[test]
    fn erb_placeholders_substitute_and_escape() {
        let template = Template::compile("<%= schema %>|<%- exampleModel %>").unwrap();
        let actual: String = template.render(&context()).unwrap();
        assert_eq!(
            actual,
            r#"{"type":"object"}|{&quot;a&quot;:&quot;&lt;b&gt;&quot;}"#
        );
    }

    #[test]
    fn escaped_dollar_is_literal() {
        let template = Template::compile(r"`/api/\${id}` ${slug}").unwrap();
        assert_eq!(template.render(&context()).unwrap(), "`/api/${id}` widget");
        assert_eq!(template.fields().collect::<Vec<_>>(), vec!["slug"]);
    }

    #[test]
    fn plain_text_compiles_to_one_token() {
        let template = Template::compile("no placeholders here $ { <").unwrap();
        assert_eq!(
            template.tokens(),
            &[Token::Text {
                value: "no placeholders here $ { <".to_string()
            }]
        );
    }

    #[test]
    fn empty_source_compiles_to_no_tokens() {
        let template = Template::compile("").unwrap();
        assert!(template.tokens().is_empty());
        assert_eq!(template.render(&context()).unwrap(), "");
    }

    #[test]
    fn unterminated_dollar_reports_position() {
        let err = Template::compile("line one\n  ${slug").unwrap_err();
        assert_eq!((err.line, err.column), (2, 3));
        assert!(err.message.contains("unterminated"));
    }

    #[test]
    fn invalid_identifier_is_rejected() {
        let err = Template::compile("${slug.length}").unwrap_err();
        assert!(err.message.contains("`slug.length`"));
        let err = Template::compile("${}").unwrap_err();
        assert!(err.message.contains("not a valid identifier"));
    }

    #[test]
    fn erb_code_blocks_are_rejected() {
        let err = Template::compile("<% if (x) { %>").unwrap_err();
        assert!(err.message.contains("code blocks"));
        let err = Template::compile("<%= slug").unwrap_err();
        assert!(err.message.contains("unterminated"));
    }

    #[test]
    fn unknown_field_is_a_render_error() {
        let template = Template::compile("ok\n${slug} ${model}").unwrap();
        let err = template.render(&context()).unwrap_err();
        assert_eq!(err.field, "model");
        assert_eq!((err.line, err.column), (2, 9));
    }

    #[test]
    fn columns_count_chars_not_bytes() {
        let err = Template::compile("héllo ${").unwrap_err();
        assert_eq!((err.line, err.column), (1, 7));
    }

    #[test]
    fn identifier_rules() {
        assert!(is_identifier("slug"));
        assert!(is_identifier("_private"));
        assert!(is_identifier("$el"));
        assert!(is_identifier("exampleModel2"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("2fast"));
        assert!(!is_identifier("with-dash"));
        assert!(!is_identifier("naïve"));
    }
}
