//! JSON Pointer implementation (RFC 6901).
//!
//! Used to report where in a schema a problem sits and to follow
//! same-document `$ref` fragments such as `#/definitions/address`.
//! Segments are `/`-separated, with `~` escaped as `~0` and `/` escaped as `~1`.

use serde_json::Value;

/// Appends a segment to a JSON Pointer path, applying RFC 6901 escaping.
///
/// Escaping rules: `~` -> `~0`, `/` -> `~1`
pub fn push_segment(path: &mut String, segment: &str) {
    path.push('/');
    for c in segment.chars() {
        match c {
            '~' => path.push_str("~0"),
            '/' => path.push_str("~1"),
            other => path.push(other),
        }
    }
}

/// Returns a new JSON Pointer path by appending a segment to the given path.
#[must_use]
pub fn format(path: &str, segment: &str) -> String {
    let mut result: String = path.to_string();
    push_segment(&mut result, segment);
    result
}

/// Reverses RFC 6901 escaping of a single segment. `~1` must be decoded before `~0`.
#[must_use]
pub fn unescape_segment(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

/// Decodes `%XX` escapes as they appear in URI fragments. Returns `None` on
/// malformed escapes or non-UTF-8 output.
fn percent_decode(fragment: &str) -> Option<String> {
    let bytes: &[u8] = fragment.as_bytes();
    let mut decoded: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut i: usize = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex: &str = fragment.get(i + 1..i + 3)?;
            decoded.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            decoded.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(decoded).ok()
}

/// Converts a same-document reference (`#`, `#/definitions/foo`) into a plain
/// JSON Pointer (`""`, `/definitions/foo`). Returns `None` for anything that
/// points outside the current document.
#[must_use]
pub fn from_fragment(reference: &str) -> Option<String> {
    let fragment: &str = reference.strip_prefix('#')?;
    let pointer: String = percent_decode(fragment)?;
    if pointer.is_empty() || pointer.starts_with('/') {
        Some(pointer)
    } else {
        None
    }
}

/// Looks up the value a JSON Pointer designates inside `root`.
#[must_use]
pub fn resolve<'a>(root: &'a Value, pointer: &str) -> Option<&'a Value> {
    if pointer.is_empty() {
        return Some(root);
    }
    let rest: &str = pointer.strip_prefix('/')?;
    let mut current: &Value = root;
    for raw in rest.split('/') {
        let segment: String = unescape_segment(raw);
        current = match current {
            Value::Object(map) => map.get(&segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn simple_segment() {
        let mut path = String::new();
        push_segment(&mut path, "foo");
        assert_eq!(path, "/foo");
    }

    #[test]
    fn segment_with_slash_and_tilde() {
        let mut path = String::new();
        push_segment(&mut path, "a/b");
        push_segment(&mut path, "~1");
        assert_eq!(path, "/a~1b/~01");
    }

    #[test]
    fn multiple_segments() {
        let mut path = String::new();
        push_segment(&mut path, "properties");
        push_segment(&mut path, "foo");
        push_segment(&mut path, "items");
        assert_eq!(path, "/properties/foo/items");
    }

    #[test]
    fn format_with_base() {
        assert_eq!(format("/properties", "foo-bar"), "/properties/foo-bar");
    }

    #[test]
    fn root_path_empty_segment_produces_slash() {
        assert_eq!(format("", ""), "/");
    }

    #[test]
    fn unescape_reverses_push_segment() {
        assert_eq!(unescape_segment("~01"), "~1");
        assert_eq!(unescape_segment("a~1b"), "a/b");
    }

    #[test]
    fn fragment_to_pointer() {
        assert_eq!(from_fragment("#").as_deref(), Some(""));
        assert_eq!(
            from_fragment("#/definitions/address").as_deref(),
            Some("/definitions/address")
        );
        assert_eq!(
            from_fragment("#/definitions/street%20name").as_deref(),
            Some("/definitions/street name")
        );
    }

    #[test]
    fn fragment_rejects_external_refs() {
        assert_eq!(from_fragment("other.json#/definitions/a"), None);
        assert_eq!(from_fragment("http://json-schema.org/draft-04/schema#"), None);
        assert_eq!(from_fragment("#anchor"), None);
        assert_eq!(from_fragment("#/bad%zz"), None);
    }

    #[test]
    fn resolve_walks_objects_and_arrays() {
        let doc = json!({
            "definitions": { "a/b": { "type": "string" } },
            "items": [ { "type": "integer" } ]
        });
        assert_eq!(
            resolve(&doc, "/definitions/a~1b"),
            Some(&json!({ "type": "string" }))
        );
        assert_eq!(resolve(&doc, "/items/0/type"), Some(&json!("integer")));
        assert_eq!(resolve(&doc, ""), Some(&doc));
        assert_eq!(resolve(&doc, "/items/7"), None);
        assert_eq!(resolve(&doc, "definitions"), None);
    }
}
