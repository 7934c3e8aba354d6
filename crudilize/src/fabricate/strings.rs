//! Strings: `pattern`, then `format`, then lorem-ipsum text sized to
//! `minLength`/`maxLength`.

use super::{SIZE_LIMIT, pattern};
use crate::error::FabricationError;
use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde_json::{Map, Value};

const WORDS: &[&str] = &[
    "lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing", "elit", "sed", "do",
    "eiusmod", "tempor", "incididunt", "ut", "labore", "et", "dolore", "magna", "aliqua", "enim",
    "minim", "veniam", "quis", "nostrud", "exercitation", "ullamco", "laboris", "nisi", "aliquip",
    "commodo", "consequat",
];

const TLDS: &[&str] = &["com", "org", "net", "io"];

/// Extra characters allowed above `minLength`.
const OPEN_LENGTH: usize = 24;

pub(super) fn fabricate_string(
    rng: &mut StdRng,
    schema: &Map<String, Value>,
    path: &str,
) -> Result<Value, FabricationError> {
    let min_length: usize = read_length(schema, "minLength").unwrap_or(0);
    let max_length: Option<usize> = read_length(schema, "maxLength");
    if let Some(max) = max_length
        && min_length > max
    {
        return Err(FabricationError::new(
            path,
            format!("minLength {min_length} exceeds maxLength {max}"),
        ));
    }
    if min_length > SIZE_LIMIT {
        return Err(FabricationError::new(
            path,
            format!("minLength {min_length} is above the supported {SIZE_LIMIT}"),
        ));
    }

    if let Some(regex) = schema.get("pattern").and_then(Value::as_str) {
        let text: String = pattern::fabricate_matching(rng, regex, min_length, max_length, path)?;
        return Ok(Value::String(text));
    }

    if let Some(text) = schema
        .get("format")
        .and_then(Value::as_str)
        .and_then(|format| formatted(rng, format))
    {
        let length: usize = text.chars().count();
        if length >= min_length && max_length.is_none_or(|max| length <= max) {
            return Ok(Value::String(text));
        }
        tracing::debug!(path = %path, "formatted example does not fit the length bounds; using plain text");
    }

    Ok(Value::String(lorem(rng, min_length, max_length)))
}

fn read_length(schema: &Map<String, Value>, key: &str) -> Option<usize> {
    schema
        .get(key)
        .and_then(Value::as_u64)
        .map(|n| usize::try_from(n).unwrap_or(usize::MAX))
}

fn word(rng: &mut StdRng) -> &'static str {
    WORDS.choose(rng).copied().unwrap_or("lorem")
}

/// Example value for a well-known `format`, or `None` for unknown formats.
fn formatted(rng: &mut StdRng, format: &str) -> Option<String> {
    let text: String = match format {
        "date-time" => format!(
            "{}T{:02}:{:02}:{:02}Z",
            date(rng),
            rng.gen_range(0..24),
            rng.gen_range(0..60),
            rng.gen_range(0..60)
        ),
        "date" => date(rng),
        "email" => format!("{}.{}@example.{}", word(rng), word(rng), TLDS.choose(rng)?),
        "hostname" => format!("{}.example.{}", word(rng), TLDS.choose(rng)?),
        "ipv4" => format!(
            "{}.{}.{}.{}",
            rng.gen_range(1..=223),
            rng.gen_range(0..=255),
            rng.gen_range(0..=255),
            rng.gen_range(1..=254)
        ),
        "ipv6" => (0..8)
            .map(|_| format!("{:x}", rng.gen_range(0..=0xffff_u32)))
            .collect::<Vec<String>>()
            .join(":"),
        "uri" => format!("https://example.{}/{}/{}", TLDS.choose(rng)?, word(rng), word(rng)),
        "uuid" => {
            let mut bytes: [u8; 16] = [0; 16];
            rng.fill(&mut bytes);
            uuid::Builder::from_random_bytes(bytes).into_uuid().to_string()
        }
        _ => return None,
    };
    Some(text)
}

fn date(rng: &mut StdRng) -> String {
    format!(
        "{}-{:02}-{:02}",
        rng.gen_range(2000..=2030),
        rng.gen_range(1..=12),
        rng.gen_range(1..=28)
    )
}

/// Space-separated words cut to a random length inside the bounds.
fn lorem(rng: &mut StdRng, min_length: usize, max_length: Option<usize>) -> String {
    let upper: usize = max_length
        .unwrap_or(usize::MAX)
        .min(min_length.saturating_add(OPEN_LENGTH));
    let target: usize = rng.gen_range(min_length.max(1).min(upper)..=upper);

    let mut text: String = String::with_capacity(target + 16);
    while text.len() < target {
        if !text.is_empty() {
            text.push(' ');
        }
        text.push_str(word(rng));
    }
    text.truncate(target);
    if text.ends_with(' ') {
        text.pop();
        text.push('s');
    }
    text
}
