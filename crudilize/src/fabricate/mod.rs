//! Example data fabrication.
//!
//! Walks a draft-04 schema and builds a value that satisfies it: every
//! required property, a random subset of optional ones, enum members, and
//! representative random values for strings and numbers. Same-document
//! `$ref`s are followed; `allOf` members are merged before generation and one
//! `anyOf`/`oneOf` branch is picked at random. Candidates matching a `not`
//! schema, or several `oneOf` branches, are redrawn, and the finished example
//! is checked against the whole schema before it is returned.

mod numbers;
mod pattern;
mod strings;

use crate::error::{FabricationError, SchemaViolation};
use crate::json_pointer;
use crate::validate;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde_json::{Map, Value, json};

/// Consecutive `$ref` hops tolerated before a reference loop is assumed.
const MAX_REF_HOPS: usize = 32;

/// Attempts at producing a distinct item for `uniqueItems` arrays.
const UNIQUE_ATTEMPTS: usize = 10;

/// Largest string length, array length or property count materialised.
const SIZE_LIMIT: usize = 10_000;

/// Whole examples drawn before giving up on one that satisfies the schema.
const CONFORMANCE_ATTEMPTS: usize = 16;

/// Candidates drawn for a `not` or `oneOf` before the best effort is kept.
const BRANCH_ATTEMPTS: usize = 32;

const ALL_TYPES: &[&str] = &["object", "array", "string", "integer", "number", "boolean", "null"];

/// Keywords that do not constrain instances.
const ANNOTATIONS: &[&str] = &["id", "$schema", "title", "description", "default", "definitions"];

/// Settings that control fabrication.
#[derive(Debug, Clone)]
pub struct FabricateSettings {
    /// Seed for a reproducible example. `None` draws from OS entropy.
    pub seed: Option<u64>,

    /// Nesting depth after which only required properties and minimum array
    /// lengths are produced.
    pub max_depth: usize,

    /// Chance of including each optional property.
    pub optional_probability: f64,

    /// Items added beyond `minItems` when `maxItems` is absent.
    pub extra_items: usize,
}

impl Default for FabricateSettings {
    fn default() -> Self {
        Self {
            seed: None,
            max_depth: 8,
            optional_probability: 0.5,
            extra_items: 3,
        }
    }
}

/// Produces a value satisfying `schema`.
///
/// # Errors
///
/// Returns `FabricationError` when the schema is unsatisfiable (inverted
/// bounds, an empty type intersection, unmatched patterns), refers outside
/// the document, or no drawn example passes validation.
pub fn fabricate(schema: &Value, settings: &FabricateSettings) -> Result<Value, FabricationError> {
    let rng: StdRng = match settings.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut fabricator = Fabricator {
        root: schema,
        settings,
        rng,
    };

    let mut example: Value = fabricator.generate(schema, "", 0)?;
    let validator = validate::compile(schema)
        .map_err(|e| FabricationError::new("", describe_violations(&e.violations)))?;
    let mut attempt: usize = 1;
    loop {
        let Err(error) = validate::check_compiled(&validator, &example) else {
            return Ok(example);
        };
        let mismatch: String = describe_violations(&error.violations);
        if attempt == CONFORMANCE_ATTEMPTS {
            return Err(FabricationError::new(
                "",
                format!("no conforming example after {attempt} attempts; last: {mismatch}"),
            ));
        }
        tracing::debug!(attempt, "example does not satisfy the schema: {mismatch}");
        attempt += 1;
        example = fabricator.generate(schema, "", 0)?;
    }
}

fn describe_violations(violations: &[SchemaViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<String>>()
        .join("; ")
}

struct Fabricator<'a> {
    root: &'a Value,
    settings: &'a FabricateSettings,
    rng: StdRng,
}

impl<'a> Fabricator<'a> {
    fn generate(&mut self, schema: &Value, path: &str, depth: usize) -> Result<Value, FabricationError> {
        // Recursion through required properties ignores `max_depth`; stop it eventually.
        if depth > self.settings.max_depth.saturating_mul(4).max(32) {
            return Err(FabricationError::new(path, "schema recursion is too deep"));
        }

        let Some(obj) = schema.as_object() else {
            return Err(FabricationError::new(path, "schema is not an object"));
        };
        let (obj, path) = self.resolve_refs(obj, path)?;
        let path: &str = &path;

        if let Some(members) = obj.get("allOf").and_then(Value::as_array) {
            let mut merged: Map<String, Value> = obj.clone();
            merged.remove("allOf");
            let all_of_path: String = json_pointer::format(path, "allOf");
            for (index, member) in members.iter().enumerate() {
                let member_path: String = json_pointer::format(&all_of_path, &index.to_string());
                let member_obj = member
                    .as_object()
                    .ok_or_else(|| FabricationError::new(&member_path, "schema is not an object"))?;
                let (member_obj, _) = self.resolve_refs(member_obj, &member_path)?;
                merge_into(&mut merged, member_obj);
            }
            return self.generate(&Value::Object(merged), path, depth + 1);
        }

        if let Some(branches) = obj.get("anyOf").and_then(Value::as_array) {
            return self.branch(obj, "anyOf", branches, path, depth);
        }
        if let Some(branches) = obj.get("oneOf").and_then(Value::as_array) {
            return self.one_of(obj, branches, path, depth);
        }

        if let Some(negated) = obj.get("not") {
            return self.excluding(obj, negated, path, depth);
        }

        if let Some(members) = obj.get("enum").and_then(Value::as_array) {
            let declared: Option<Vec<&str>> = obj.get("type").map(type_names);
            let allowed: Vec<&Value> = members
                .iter()
                .filter(|member| {
                    declared
                        .as_ref()
                        .is_none_or(|names| names.iter().any(|name| has_type(member, name)))
                })
                .collect();
            if allowed.is_empty() && !members.is_empty() {
                return Err(FabricationError::new(path, "no enum member has the declared type"));
            }
            return allowed
                .choose(&mut self.rng)
                .map(|member| (*member).clone())
                .ok_or_else(|| FabricationError::new(path, "enum has no members"));
        }

        match self.choose_type(obj, path)? {
            "object" => self.object(obj, path, depth),
            "array" => self.array(obj, path, depth),
            "string" => strings::fabricate_string(&mut self.rng, obj, path),
            "integer" => numbers::fabricate_integer(&mut self.rng, obj, path),
            "number" => numbers::fabricate_number(&mut self.rng, obj, path),
            "boolean" => Ok(Value::Bool(self.rng.gen_bool(0.5))),
            "null" => Ok(Value::Null),
            other => Err(FabricationError::new(path, format!("unknown type `{other}`"))),
        }
    }

    /// Generates from one randomly picked branch merged into the rest of `obj`.
    fn branch(
        &mut self,
        obj: &Map<String, Value>,
        keyword: &str,
        branches: &[Value],
        path: &str,
        depth: usize,
    ) -> Result<Value, FabricationError> {
        let index: usize = self.rng.gen_range(0..branches.len().max(1));
        let branch_path: String =
            json_pointer::format(&json_pointer::format(path, keyword), &index.to_string());
        let mut merged: Map<String, Value> = obj.clone();
        merged.remove(keyword);
        if let Some(branch) = branches.get(index).and_then(Value::as_object) {
            let (branch, _) = self.resolve_refs(branch, &branch_path)?;
            merge_into(&mut merged, branch);
        }
        self.generate(&Value::Object(merged), path, depth + 1)
    }

    /// A `oneOf` example must match exactly one branch. Candidates matching
    /// several are redrawn; the last one is kept for the final check.
    fn one_of(
        &mut self,
        obj: &Map<String, Value>,
        branches: &[Value],
        path: &str,
        depth: usize,
    ) -> Result<Value, FabricationError> {
        let validators: Option<Vec<jsonschema::Validator>> = branches
            .iter()
            .map(|branch| branch.as_object().and_then(|branch| self.compile_detached(branch)))
            .collect();
        let mut candidate: Value = self.branch(obj, "oneOf", branches, path, depth)?;
        let Some(validators) = validators else {
            return Ok(candidate);
        };
        for _ in 1..BRANCH_ATTEMPTS {
            let matching: usize = validators.iter().filter(|v| v.is_valid(&candidate)).count();
            if matching == 1 {
                break;
            }
            tracing::debug!(path = %path, matching, "oneOf example matches {matching} branches; redrawing");
            candidate = self.branch(obj, "oneOf", branches, path, depth)?;
        }
        Ok(candidate)
    }

    /// Generates from `obj` without its `not`, narrowed by the complement of
    /// simple negated schemas, and redraws candidates the negated schema accepts.
    fn excluding(
        &mut self,
        obj: &Map<String, Value>,
        negated: &Value,
        path: &str,
        depth: usize,
    ) -> Result<Value, FabricationError> {
        let not_path: String = json_pointer::format(path, "not");
        let negated = negated
            .as_object()
            .ok_or_else(|| FabricationError::new(&not_path, "schema is not an object"))?;
        let (negated, _) = self.resolve_refs(negated, &not_path)?;

        let mut narrowed: Map<String, Value> = obj.clone();
        narrowed.remove("not");
        if let Some(complement) = complement(negated) {
            merge_into(&mut narrowed, &complement);
        }
        let narrowed = Value::Object(narrowed);

        let Some(validator) = self.compile_detached(negated) else {
            return self.generate(&narrowed, path, depth + 1);
        };
        for _ in 0..BRANCH_ATTEMPTS {
            let candidate: Value = self.generate(&narrowed, path, depth + 1)?;
            if !validator.is_valid(&candidate) {
                return Ok(candidate);
            }
        }
        Err(FabricationError::new(
            &not_path,
            "every candidate matched the negated schema",
        ))
    }

    /// Compiles a subschema on its own. The root `definitions` come along so
    /// `$ref`s into them still resolve.
    fn compile_detached(&self, schema: &Map<String, Value>) -> Option<jsonschema::Validator> {
        let mut detached: Map<String, Value> = schema.clone();
        if let Some(definitions) = self.root.get("definitions") {
            detached
                .entry("definitions")
                .or_insert_with(|| definitions.clone());
        }
        validate::compile(&Value::Object(detached)).ok()
    }

    /// Follows `$ref` chains. Per draft-04, keywords next to `$ref` are ignored.
    fn resolve_refs<'s>(
        &self,
        mut obj: &'s Map<String, Value>,
        path: &str,
    ) -> Result<(&'s Map<String, Value>, String), FabricationError>
    where
        'a: 's,
    {
        let mut path: String = path.to_string();
        for _ in 0..MAX_REF_HOPS {
            let Some(reference) = obj.get("$ref").and_then(Value::as_str) else {
                return Ok((obj, path));
            };
            let pointer: String = json_pointer::from_fragment(reference).ok_or_else(|| {
                FabricationError::new(
                    &path,
                    format!("`{reference}` is not a same-document reference"),
                )
            })?;
            obj = json_pointer::resolve(self.root, &pointer)
                .and_then(Value::as_object)
                .ok_or_else(|| {
                    FabricationError::new(&path, format!("`{reference}` does not resolve to a schema"))
                })?;
            path = pointer;
        }
        Err(FabricationError::new(&path, "`$ref` chain does not terminate"))
    }

    fn choose_type(
        &mut self,
        obj: &Map<String, Value>,
        path: &str,
    ) -> Result<&'static str, FabricationError> {
        let declared: Vec<&str> = match obj.get("type") {
            Some(Value::String(name)) => vec![name.as_str()],
            Some(Value::Array(names)) => names.iter().filter_map(Value::as_str).collect(),
            _ => return Ok(infer_type(obj)),
        };
        let non_null: Vec<&str> = declared.iter().copied().filter(|t| *t != "null").collect();
        let candidates: &[&str] = if non_null.is_empty() { &declared } else { &non_null };
        let chosen: &str = candidates
            .choose(&mut self.rng)
            .copied()
            .ok_or_else(|| FabricationError::new(path, "no type left to satisfy"))?;
        static_type_name(chosen)
            .ok_or_else(|| FabricationError::new(path, format!("unknown type `{chosen}`")))
    }

    fn object(
        &mut self,
        obj: &Map<String, Value>,
        path: &str,
        depth: usize,
    ) -> Result<Value, FabricationError> {
        let empty: Map<String, Value> = Map::new();
        let properties: &Map<String, Value> =
            obj.get("properties").and_then(Value::as_object).unwrap_or(&empty);
        let required: Vec<&str> = obj
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        let min_properties: usize = read_usize(obj, "minProperties").unwrap_or(0);
        let max_properties: Option<usize> = read_usize(obj, "maxProperties");
        let shallow: bool = depth < self.settings.max_depth;

        if let Some(max) = max_properties
            && required.len() > max
        {
            return Err(FabricationError::new(
                path,
                format!("{} required properties exceed maxProperties {max}", required.len()),
            ));
        }

        if min_properties > SIZE_LIMIT {
            return Err(FabricationError::new(
                path,
                format!("minProperties {min_properties} is above the supported {SIZE_LIMIT}"),
            ));
        }

        let mut out: Map<String, Value> = Map::new();
        for name in &required {
            let value: Value = self.property_value(obj, name, path, depth)?;
            out.insert((*name).to_string(), value);
        }

        if shallow {
            let properties_path: String = json_pointer::format(path, "properties");
            for (name, subschema) in properties {
                if out.contains_key(name) || max_properties.is_some_and(|max| out.len() >= max) {
                    continue;
                }
                if self.rng.gen_bool(self.settings.optional_probability) {
                    let value: Value = self.generate(
                        subschema,
                        &json_pointer::format(&properties_path, name),
                        depth + 1,
                    )?;
                    out.insert(name.clone(), value);
                }
            }
        }

        self.add_dependencies(obj, &mut out, path, depth)?;

        let mut extra_index: usize = 0;
        while out.len() < min_properties {
            extra_index += 1;
            if extra_index > min_properties.saturating_mul(4) + UNIQUE_ATTEMPTS {
                return Err(FabricationError::new(
                    path,
                    format!("cannot reach minProperties {min_properties}"),
                ));
            }
            let (name, value) = self.extra_property(obj, properties, &out, path, depth, extra_index)?;
            out.insert(name, value);
        }

        if let Some(max) = max_properties {
            let optional: Vec<String> = out
                .keys()
                .filter(|key| !required.contains(&key.as_str()))
                .cloned()
                .collect();
            for key in optional.iter().rev() {
                if out.len() <= max {
                    break;
                }
                out.remove(key);
            }
        }

        Ok(Value::Object(out))
    }

    /// Value for a named property: its declared schema, a matching
    /// `patternProperties` schema, the `additionalProperties` schema, or an
    /// unconstrained value.
    fn property_value(
        &mut self,
        obj: &Map<String, Value>,
        name: &str,
        path: &str,
        depth: usize,
    ) -> Result<Value, FabricationError> {
        if let Some(subschema) = obj.get("properties").and_then(|p| p.get(name)) {
            let properties_path: String = json_pointer::format(path, "properties");
            return self.generate(subschema, &json_pointer::format(&properties_path, name), depth + 1);
        }
        if let Some(patterns) = obj.get("patternProperties").and_then(Value::as_object) {
            let patterns_path: String = json_pointer::format(path, "patternProperties");
            for (pattern, subschema) in patterns {
                let pattern_path: String = json_pointer::format(&patterns_path, pattern);
                if pattern::is_match(pattern, name, &pattern_path)? {
                    return self.generate(subschema, &pattern_path, depth + 1);
                }
            }
        }
        match obj.get("additionalProperties") {
            Some(additional @ Value::Object(_)) => self.generate(
                additional,
                &json_pointer::format(path, "additionalProperties"),
                depth + 1,
            ),
            _ => self.generate(&json!({}), path, depth + 1),
        }
    }

    /// One more property to approach `minProperties`: an unused declared
    /// property first, then an additional or pattern-named one.
    fn extra_property(
        &mut self,
        obj: &Map<String, Value>,
        properties: &Map<String, Value>,
        out: &Map<String, Value>,
        path: &str,
        depth: usize,
        index: usize,
    ) -> Result<(String, Value), FabricationError> {
        if let Some(name) = properties.keys().find(|name| !out.contains_key(*name)) {
            let value: Value = self.property_value(obj, name, path, depth)?;
            return Ok((name.clone(), value));
        }
        if obj.get("additionalProperties") != Some(&Value::Bool(false)) {
            let name: String = format!("extra{index}");
            let value: Value = self.property_value(obj, &name, path, depth)?;
            return Ok((name, value));
        }
        if let Some((pattern, subschema)) = obj
            .get("patternProperties")
            .and_then(Value::as_object)
            .and_then(|patterns| patterns.iter().next())
        {
            let pattern_path: String =
                json_pointer::format(&json_pointer::format(path, "patternProperties"), pattern);
            let name: String =
                pattern::fabricate_matching(&mut self.rng, pattern, 1, None, &pattern_path)?;
            let value: Value = self.generate(subschema, &pattern_path, depth + 1)?;
            return Ok((name, value));
        }
        Err(FabricationError::new(
            path,
            "minProperties needs more properties than the schema allows",
        ))
    }

    /// Adds properties that present properties depend on (array form of
    /// `dependencies`). Schema-form dependencies are not applied.
    fn add_dependencies(
        &mut self,
        obj: &Map<String, Value>,
        out: &mut Map<String, Value>,
        path: &str,
        depth: usize,
    ) -> Result<(), FabricationError> {
        let Some(dependencies) = obj.get("dependencies").and_then(Value::as_object) else {
            return Ok(());
        };
        loop {
            let missing: Option<String> = dependencies
                .iter()
                .filter(|(key, _)| out.contains_key(*key))
                .filter_map(|(_, needed)| needed.as_array())
                .flatten()
                .filter_map(Value::as_str)
                .find(|name| !out.contains_key(*name))
                .map(str::to_string);
            let Some(name) = missing else {
                return Ok(());
            };
            let value: Value = self.property_value(obj, &name, path, depth)?;
            out.insert(name, value);
        }
    }

    fn array(
        &mut self,
        obj: &Map<String, Value>,
        path: &str,
        depth: usize,
    ) -> Result<Value, FabricationError> {
        let min_items: usize = read_usize(obj, "minItems").unwrap_or(0);
        let max_items: Option<usize> = read_usize(obj, "maxItems");
        if let Some(max) = max_items
            && min_items > max
        {
            return Err(FabricationError::new(
                path,
                format!("minItems {min_items} exceeds maxItems {max}"),
            ));
        }
        if min_items > SIZE_LIMIT {
            return Err(FabricationError::new(
                path,
                format!("minItems {min_items} is above the supported {SIZE_LIMIT}"),
            ));
        }
        let unique: bool = obj.get("uniqueItems").and_then(Value::as_bool) == Some(true);
        let tuple: Option<&Vec<Value>> = obj.get("items").and_then(Value::as_array);
        let closed_tuple: bool =
            tuple.is_some() && obj.get("additionalItems") == Some(&Value::Bool(false));

        let upper: usize = max_items
            .unwrap_or(usize::MAX)
            .min(min_items.saturating_add(self.settings.extra_items));
        let mut count: usize = if depth < self.settings.max_depth {
            self.rng.gen_range(min_items.max(1).min(upper)..=upper)
        } else {
            min_items
        };
        if let Some(tuple) = tuple {
            if closed_tuple {
                if tuple.len() < min_items {
                    return Err(FabricationError::new(
                        path,
                        format!("minItems {min_items} exceeds the {} tuple items allowed", tuple.len()),
                    ));
                }
                count = count.min(tuple.len());
            } else if depth < self.settings.max_depth {
                count = count.max(tuple.len()).min(max_items.unwrap_or(usize::MAX));
            }
        }

        let mut items: Vec<Value> = Vec::with_capacity(count);
        for index in 0..count {
            let (item_schema, item_path) = item_schema(obj, index, path);
            let mut item: Value = self.generate(&item_schema, &item_path, depth + 1)?;
            if unique {
                let mut attempts: usize = 1;
                while items.contains(&item) && attempts < UNIQUE_ATTEMPTS {
                    item = self.generate(&item_schema, &item_path, depth + 1)?;
                    attempts += 1;
                }
                if items.contains(&item) {
                    continue;
                }
            }
            items.push(item);
        }

        if items.len() < min_items {
            return Err(FabricationError::new(
                path,
                format!("could not produce {min_items} distinct items"),
            ));
        }
        Ok(Value::Array(items))
    }
}

/// Schema (and its path) for the array element at `index`.
fn item_schema(obj: &Map<String, Value>, index: usize, path: &str) -> (Value, String) {
    match obj.get("items") {
        Some(Value::Array(tuple)) => {
            if let Some(schema) = tuple.get(index) {
                let items_path: String = json_pointer::format(path, "items");
                return (schema.clone(), json_pointer::format(&items_path, &index.to_string()));
            }
            match obj.get("additionalItems") {
                Some(additional @ Value::Object(_)) => (
                    additional.clone(),
                    json_pointer::format(path, "additionalItems"),
                ),
                _ => (json!({}), json_pointer::format(path, "additionalItems")),
            }
        }
        Some(schema @ Value::Object(_)) => (schema.clone(), json_pointer::format(path, "items")),
        _ => (json!({}), json_pointer::format(path, "items")),
    }
}

fn read_usize(obj: &Map<String, Value>, key: &str) -> Option<usize> {
    obj.get(key)
        .and_then(Value::as_u64)
        .map(|n| usize::try_from(n).unwrap_or(usize::MAX))
}

fn static_type_name(name: &str) -> Option<&'static str> {
    ALL_TYPES.iter().copied().find(|known| *known == name)
}

/// Whether `value` is an instance of the draft-04 primitive type `name`.
fn has_type(value: &Value, name: &str) -> bool {
    match name {
        "object" => value.is_object(),
        "array" => value.is_array(),
        "string" => value.is_string(),
        "integer" => value.is_i64() || value.is_u64(),
        "number" => value.is_number(),
        "boolean" => value.is_boolean(),
        "null" => value.is_null(),
        _ => false,
    }
}

/// Constraints implied by failing `negated`, for the negated schemas simple
/// enough to invert: a lone `type`, `minimum` or `maximum`.
fn complement(negated: &Map<String, Value>) -> Option<Map<String, Value>> {
    let mut keys: Vec<&str> = negated
        .keys()
        .map(String::as_str)
        .filter(|key| !ANNOTATIONS.contains(key))
        .collect();
    keys.sort_unstable();
    let exclusive = |key: &str| negated.get(key).and_then(Value::as_bool).unwrap_or(false);

    let mut out: Map<String, Value> = Map::new();
    match keys.as_slice() {
        ["type"] => {
            let excluded: Vec<&str> = type_names(negated.get("type")?);
            let kept: Vec<Value> = ALL_TYPES
                .iter()
                .filter(|name| !excluded.contains(name))
                .filter(|name| !(**name == "integer" && excluded.contains(&"number")))
                .map(|name| Value::String((*name).to_string()))
                .collect();
            out.insert("type".to_string(), Value::Array(kept));
        }
        ["minimum"] | ["exclusiveMinimum", "minimum"] => {
            out.insert("maximum".to_string(), negated.get("minimum")?.clone());
            out.insert(
                "exclusiveMaximum".to_string(),
                Value::Bool(!exclusive("exclusiveMinimum")),
            );
        }
        ["maximum"] | ["exclusiveMaximum", "maximum"] => {
            out.insert("minimum".to_string(), negated.get("maximum")?.clone());
            out.insert(
                "exclusiveMinimum".to_string(),
                Value::Bool(!exclusive("exclusiveMaximum")),
            );
        }
        _ => return None,
    }
    Some(out)
}

/// Type for a schema without `type`, guessed from the keywords present.
fn infer_type(obj: &Map<String, Value>) -> &'static str {
    let has_any = |keys: &[&str]| keys.iter().any(|key| obj.contains_key(*key));
    if has_any(&[
        "properties",
        "required",
        "additionalProperties",
        "patternProperties",
        "minProperties",
        "maxProperties",
        "dependencies",
    ]) {
        "object"
    } else if has_any(&["items", "additionalItems", "minItems", "maxItems", "uniqueItems"]) {
        "array"
    } else if has_any(&["minimum", "maximum", "multipleOf"]) {
        "number"
    } else {
        "string"
    }
}

/// Merges `source` into `target` the way `allOf` intersects constraints.
fn merge_into(target: &mut Map<String, Value>, source: &Map<String, Value>) {
    for (key, value) in source {
        if !target.contains_key(key) {
            target.insert(key.clone(), value.clone());
            continue;
        }
        let Some(existing) = target.get_mut(key) else {
            continue;
        };
        match key.as_str() {
            "properties" | "patternProperties" | "definitions" => {
                if let (Value::Object(existing), Some(incoming)) = (existing, value.as_object()) {
                    for (name, subschema) in incoming {
                        let combined: Value = match existing.get(name) {
                            Some(previous) => json!({ "allOf": [previous, subschema] }),
                            None => subschema.clone(),
                        };
                        existing.insert(name.clone(), combined);
                    }
                }
            }
            "required" => {
                if let (Value::Array(existing), Some(incoming)) = (existing, value.as_array()) {
                    for name in incoming {
                        if !existing.contains(name) {
                            existing.push(name.clone());
                        }
                    }
                }
            }
            "minimum" | "minLength" | "minItems" | "minProperties" => {
                if value.as_f64() > existing.as_f64() {
                    *existing = value.clone();
                }
            }
            "maximum" | "maxLength" | "maxItems" | "maxProperties" => {
                if let (Some(incoming), Some(current)) = (value.as_f64(), existing.as_f64())
                    && incoming < current
                {
                    *existing = value.clone();
                }
            }
            "exclusiveMinimum" | "exclusiveMaximum" | "uniqueItems" => {
                if value.as_bool() == Some(true) {
                    *existing = Value::Bool(true);
                }
            }
            "enum" => {
                if let (Value::Array(existing), Some(incoming)) = (existing, value.as_array()) {
                    existing.retain(|member| incoming.contains(member));
                }
            }
            "type" => {
                let combined: Vec<Value> = intersect_types(existing, value);
                *existing = Value::Array(combined);
            }
            _ => {}
        }
    }
}

fn type_names(value: &Value) -> Vec<&str> {
    match value {
        Value::String(name) => vec![name.as_str()],
        Value::Array(names) => names.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

/// `integer` survives an intersection with `number`.
fn intersect_types(left: &Value, right: &Value) -> Vec<Value> {
    let left: Vec<&str> = type_names(left);
    let right: Vec<&str> = type_names(right);
    let mut combined: Vec<Value> = Vec::new();
    for name in &left {
        let kept: bool = right.contains(name) || (*name == "integer" && right.contains(&"number"));
        if kept {
            combined.push(Value::String((*name).to_string()));
        }
    }
    if left.contains(&"number") && right.contains(&"integer") && !left.contains(&"integer") {
        combined.push(Value::String("integer".to_string()));
    }
    combined
}
