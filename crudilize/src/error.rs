use std::error;
use std::fmt;
use std::io;

/// Error type for every stage of the crudilize pipeline.
#[derive(Debug)]
pub enum CrudilizeError {
    /// Missing or invalid command-line arguments.
    Argument(String),

    /// I/O failure on a file, stdin or stdout. `target` names what was being accessed.
    Io { target: String, error: io::Error },

    /// The input text is not valid JSON.
    Parse(serde_json::Error),

    /// The input is JSON but not a valid draft-04 JSON Schema.
    Schema(SchemaValidationError),

    /// The template source could not be compiled.
    TemplateSyntax(TemplateSyntaxError),

    /// The compiled template referenced something the render context lacks.
    Render(RenderError),

    /// A cached template artifact exists but cannot be decoded.
    CorruptCache { path: String, reason: String },

    /// No example value could be produced for the schema.
    Fabrication(FabricationError),
}

impl CrudilizeError {
    /// Wraps an I/O error together with the file or stream it concerns.
    #[must_use]
    pub fn io(target: impl fmt::Display, error: io::Error) -> Self {
        Self::Io {
            target: target.to_string(),
            error,
        }
    }
}

impl error::Error for CrudilizeError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Io { error, .. } => Some(error),
            Self::Parse(error) => Some(error),
            Self::Schema(error) => Some(error),
            Self::TemplateSyntax(error) => Some(error),
            Self::Render(error) => Some(error),
            Self::Fabrication(error) => Some(error),
            Self::Argument(_) | Self::CorruptCache { .. } => None,
        }
    }
}

impl fmt::Display for CrudilizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Argument(message) => write!(f, "invalid arguments: {message}"),
            Self::Io { target, error } => write!(f, "{target}: {error}"),
            Self::Parse(error) => write!(f, "input is not valid JSON: {error}"),
            Self::Schema(error) => fmt::Display::fmt(error, f),
            Self::TemplateSyntax(error) => fmt::Display::fmt(error, f),
            Self::Render(error) => fmt::Display::fmt(error, f),
            Self::CorruptCache { path, reason } => write!(
                f,
                "cached template {path} is unreadable ({reason}); delete it or pass --rebuild-cache"
            ),
            Self::Fabrication(error) => fmt::Display::fmt(error, f),
        }
    }
}

impl From<serde_json::Error> for CrudilizeError {
    fn from(json_error: serde_json::Error) -> Self {
        Self::Parse(json_error)
    }
}

impl From<SchemaValidationError> for CrudilizeError {
    fn from(schema_error: SchemaValidationError) -> Self {
        Self::Schema(schema_error)
    }
}

impl From<TemplateSyntaxError> for CrudilizeError {
    fn from(syntax_error: TemplateSyntaxError) -> Self {
        Self::TemplateSyntax(syntax_error)
    }
}

impl From<RenderError> for CrudilizeError {
    fn from(render_error: RenderError) -> Self {
        Self::Render(render_error)
    }
}

impl From<FabricationError> for CrudilizeError {
    fn from(fabrication_error: FabricationError) -> Self {
        Self::Fabrication(fabrication_error)
    }
}

/// A single meta-schema violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    /// JSON Pointer into the checked document. Empty for the root.
    pub instance_path: String,
    /// JSON Pointer into the schema that rejected the value.
    pub schema_path: String,
    pub message: String,
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let at: &str = if self.instance_path.is_empty() {
            "(root)"
        } else {
            &self.instance_path
        };
        write!(f, "{at}: {} (schema {})", self.message, self.schema_path)
    }
}

/// All violations found while checking a document against a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaValidationError {
    pub violations: Vec<SchemaViolation>,
}

impl SchemaValidationError {
    /// Instance paths of every violation, in report order.
    #[must_use]
    pub fn paths(&self) -> Vec<&str> {
        self.violations
            .iter()
            .map(|v| v.instance_path.as_str())
            .collect()
    }
}

impl error::Error for SchemaValidationError {}

impl fmt::Display for SchemaValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid schema: {} violation(s) of the draft-04 meta-schema",
            self.violations.len()
        )?;
        for violation in &self.violations {
            write!(f, "\n  {violation}")?;
        }
        Ok(())
    }
}

/// Template source that cannot be compiled. Positions are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSyntaxError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl error::Error for TemplateSyntaxError {}

impl fmt::Display for TemplateSyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "template syntax error at {}:{}: {}",
            self.line, self.column, self.message
        )
    }
}

/// A placeholder names a field the render context does not provide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderError {
    pub field: String,
    pub line: usize,
    pub column: usize,
}

impl error::Error for RenderError {}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "template references undefined field `{}` at {}:{}; available: {}",
            self.field,
            self.line,
            self.column,
            crate::template::RenderContext::FIELDS.join(", ")
        )
    }
}

/// The fabricator could not satisfy the schema at `path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FabricationError {
    /// JSON Pointer of the offending (sub)schema.
    pub path: String,
    pub message: String,
}

impl FabricationError {
    #[must_use]
    pub fn new(path: &str, message: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            message: message.into(),
        }
    }
}

impl error::Error for FabricationError {}

impl fmt::Display for FabricationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let at: &str = if self.path.is_empty() { "#" } else { &self.path };
        write!(f, "cannot fabricate an example for {at}: {}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_names_target() {
        let err = CrudilizeError::io(
            "schema.json",
            io::Error::new(io::ErrorKind::NotFound, "No such file"),
        );
        assert_eq!(err.to_string(), "schema.json: No such file");
    }

    #[test]
    fn schema_error_lists_every_violation() {
        let err = SchemaValidationError {
            violations: vec![
                SchemaViolation {
                    instance_path: String::new(),
                    schema_path: "/type".to_string(),
                    message: "5 is not of type \"object\"".to_string(),
                },
                SchemaViolation {
                    instance_path: "/required".to_string(),
                    schema_path: "/properties/required/minItems".to_string(),
                    message: "[] has less than 1 item".to_string(),
                },
            ],
        };
        let text: String = err.to_string();
        assert!(text.starts_with("invalid schema: 2 violation(s)"));
        assert!(text.contains("(root): 5 is not of type"));
        assert!(text.contains("/required: [] has less than 1 item"));
        assert_eq!(err.paths(), vec!["", "/required"]);
    }

    #[test]
    fn fabrication_error_uses_hash_for_root() {
        let err = FabricationError::new("", "minimum exceeds maximum");
        assert_eq!(
            err.to_string(),
            "cannot fabricate an example for #: minimum exceeds maximum"
        );
    }

    #[test]
    fn render_error_display() {
        let err = RenderError {
            field: "model".to_string(),
            line: 3,
            column: 7,
        };
        assert_eq!(
            err.to_string(),
            "template references undefined field `model` at 3:7; available: slug, schema, \
             exampleModel, slugPascal, slugCamel, slugSnake, slugKebab"
        );
    }
}
