//! Schema validation against the JSON Schema draft-04 meta-schema.
//!
//! Parsing and meta-schema checks are fatal. The lint walk that follows only
//! collects constraints the fabricator will not be able to honour, without
//! failing the run.

use crate::error::{CrudilizeError, SchemaValidationError, SchemaViolation};
use crate::json_pointer;
use serde_json::Value;

const DRAFT_04_META_SCHEMA: &str = include_str!("../schemas/draft-04.json");

/// Keywords whose value is a map of name -> subschema.
const SCHEMA_MAP_KEYWORDS: &[&str] = &["properties", "patternProperties", "definitions"];

/// Keywords whose value is a list of subschemas.
const SCHEMA_LIST_KEYWORDS: &[&str] = &["allOf", "anyOf", "oneOf"];

/// Keywords whose value is a single subschema (or, for some, a boolean).
const SCHEMA_KEYWORDS: &[&str] = &["additionalItems", "additionalProperties", "not"];

/// (lower bound, upper bound, exclusive flag for the lower, exclusive flag for the upper)
const BOUND_PAIRS: &[(&str, &str, Option<&str>, Option<&str>)] = &[
    (
        "minimum",
        "maximum",
        Some("exclusiveMinimum"),
        Some("exclusiveMaximum"),
    ),
    ("minLength", "maxLength", None, None),
    ("minItems", "maxItems", None, None),
    ("minProperties", "maxProperties", None, None),
];

/// A parsed schema together with the exact text it was read from.
///
/// The text is kept because templates interpolate the schema as written,
/// not a re-serialization of it.
#[derive(Debug, Clone)]
pub struct SchemaDocument {
    pub text: String,
    pub value: Value,
}

/// Something in a valid schema the fabricator cannot satisfy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintFinding {
    pub path: String,
    pub message: String,
}

/// Parses `text` and validates it against the draft-04 meta-schema.
///
/// # Errors
///
/// Returns `CrudilizeError::Parse` if `text` is not JSON, and
/// `CrudilizeError::Schema` listing every violation if it is JSON but not a
/// draft-04 schema.
pub fn validate(text: String) -> Result<SchemaDocument, CrudilizeError> {
    let value: Value = serde_json::from_str(&text)?;
    let meta_schema: Value = serde_json::from_str(DRAFT_04_META_SCHEMA).map_err(|e| {
        SchemaValidationError::single(format!("embedded meta-schema is unreadable: {e}"))
    })?;
    check_instance(&meta_schema, &value)?;
    Ok(SchemaDocument { text, value })
}

/// Compiles `schema` with draft-04 semantics.
///
/// # Errors
///
/// A schema that cannot be compiled is reported as a single violation at the
/// root.
pub fn compile(schema: &Value) -> Result<jsonschema::Validator, SchemaValidationError> {
    jsonschema::options()
        .with_draft(jsonschema::Draft::Draft4)
        .build(schema)
        .map_err(|e| SchemaValidationError::single(format!("schema could not be compiled: {e}")))
}

/// Checks `instance` against `schema` using draft-04 semantics.
///
/// # Errors
///
/// Returns every violation found, or the compile failure of `schema`.
pub fn check_instance(schema: &Value, instance: &Value) -> Result<(), SchemaValidationError> {
    check_compiled(&compile(schema)?, instance)
}

/// Checks `instance` against an already compiled schema.
///
/// # Errors
///
/// Returns every violation found.
pub fn check_compiled(
    validator: &jsonschema::Validator,
    instance: &Value,
) -> Result<(), SchemaValidationError> {
    let violations: Vec<SchemaViolation> = validator
        .iter_errors(instance)
        .map(|err| SchemaViolation {
            instance_path: err.instance_path.to_string(),
            schema_path: err.schema_path.to_string(),
            message: err.to_string(),
        })
        .collect();

    if violations.is_empty() {
        Ok(())
    } else {
        Err(SchemaValidationError { violations })
    }
}

impl SchemaValidationError {
    fn single(message: String) -> Self {
        Self {
            violations: vec![SchemaViolation {
                instance_path: String::new(),
                schema_path: String::new(),
                message,
            }],
        }
    }
}

/// Walks a meta-schema-valid schema and collects unsatisfiable constraints.
#[must_use]
pub fn lint(schema: &Value) -> Vec<LintFinding> {
    let mut findings: Vec<LintFinding> = Vec::new();
    collect_lint_findings(schema, "", &mut findings);
    findings
}

fn push_finding(findings: &mut Vec<LintFinding>, path: &str, message: String) {
    findings.push(LintFinding {
        path: path.to_string(),
        message,
    });
}

fn collect_lint_findings(value: &Value, path: &str, findings: &mut Vec<LintFinding>) {
    let Some(obj) = value.as_object() else {
        return;
    };

    for &(low_key, high_key, low_exclusive, high_exclusive) in BOUND_PAIRS {
        let (Some(low), Some(high)) = (
            obj.get(low_key).and_then(Value::as_f64),
            obj.get(high_key).and_then(Value::as_f64),
        ) else {
            continue;
        };
        let exclusive: bool = [low_exclusive, high_exclusive]
            .into_iter()
            .flatten()
            .any(|flag| obj.get(flag).and_then(Value::as_bool) == Some(true));
        if low > high || (exclusive && low >= high) {
            push_finding(
                findings,
                path,
                format!("`{low_key}` ({low}) leaves no room below `{high_key}` ({high})"),
            );
        }
    }

    if obj.get("additionalProperties") == Some(&Value::Bool(false))
        && let Some(required) = obj.get("required").and_then(Value::as_array)
    {
        let properties = obj.get("properties").and_then(Value::as_object);
        for name in required.iter().filter_map(Value::as_str) {
            if !properties.is_some_and(|p| p.contains_key(name)) {
                push_finding(
                    findings,
                    &json_pointer::format(path, "required"),
                    format!(
                        "required property `{name}` is not declared and additionalProperties is false"
                    ),
                );
            }
        }
    }

    for &keyword in SCHEMA_MAP_KEYWORDS {
        if let Some(map) = obj.get(keyword).and_then(Value::as_object) {
            let keyword_path: String = json_pointer::format(path, keyword);
            for (name, subschema) in map {
                collect_lint_findings(
                    subschema,
                    &json_pointer::format(&keyword_path, name),
                    findings,
                );
            }
        }
    }

    for &keyword in SCHEMA_LIST_KEYWORDS {
        if let Some(list) = obj.get(keyword).and_then(Value::as_array) {
            let keyword_path: String = json_pointer::format(path, keyword);
            for (index, subschema) in list.iter().enumerate() {
                collect_lint_findings(
                    subschema,
                    &json_pointer::format(&keyword_path, &index.to_string()),
                    findings,
                );
            }
        }
    }

    for &keyword in SCHEMA_KEYWORDS {
        if let Some(subschema) = obj.get(keyword) {
            collect_lint_findings(subschema, &json_pointer::format(path, keyword), findings);
        }
    }

    match obj.get("items") {
        Some(Value::Array(tuple)) => {
            let items_path: String = json_pointer::format(path, "items");
            for (index, subschema) in tuple.iter().enumerate() {
                collect_lint_findings(
                    subschema,
                    &json_pointer::format(&items_path, &index.to_string()),
                    findings,
                );
            }
        }
        Some(items) => collect_lint_findings(items, &json_pointer::format(path, "items"), findings),
        None => {}
    }
}
