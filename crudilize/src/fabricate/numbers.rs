//! Integers and numbers within `minimum`/`maximum` (draft-04 boolean
//! exclusivity) and `multipleOf`.

use crate::error::FabricationError;
use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde_json::{Map, Number, Value};

/// Width of the range used when only one bound (or none) is given.
const OPEN_RANGE: f64 = 1000.0;

/// Attempts at landing strictly inside an exclusive float range.
const EXCLUSIVE_ATTEMPTS: usize = 16;

/// 2^63: integer bounds are clamped to the i64 range.
const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;

/// 2^53: the largest magnitude below which every integer is an exact f64.
const EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

struct Bounds {
    low: f64,
    high: f64,
    low_exclusive: bool,
    high_exclusive: bool,
}

fn read_bounds(schema: &Map<String, Value>) -> Bounds {
    let minimum: Option<f64> = schema.get("minimum").and_then(Value::as_f64);
    let maximum: Option<f64> = schema.get("maximum").and_then(Value::as_f64);
    let flag = |key: &str| schema.get(key).and_then(Value::as_bool) == Some(true);
    let (low, high) = match (minimum, maximum) {
        (Some(low), Some(high)) => (low, high),
        (Some(low), None) => (low, low + OPEN_RANGE),
        (None, Some(high)) => (high - OPEN_RANGE, high),
        (None, None) => (1.0, OPEN_RANGE),
    };
    Bounds {
        low,
        high,
        low_exclusive: minimum.is_some() && flag("exclusiveMinimum"),
        high_exclusive: maximum.is_some() && flag("exclusiveMaximum"),
    }
}

fn multiple_of(schema: &Map<String, Value>) -> Option<f64> {
    schema
        .get("multipleOf")
        .and_then(Value::as_f64)
        .filter(|m| *m > 0.0)
}

/// Smallest and largest integers inside the bounds, as floats.
fn integer_range(bounds: &Bounds) -> (f64, f64) {
    let low: f64 = if bounds.low_exclusive {
        bounds.low.floor() + 1.0
    } else {
        bounds.low.ceil()
    };
    let high: f64 = if bounds.high_exclusive {
        bounds.high.ceil() - 1.0
    } else {
        bounds.high.floor()
    };
    (low, high)
}

fn empty_range(path: &str, bounds: &Bounds, kind: &str) -> FabricationError {
    FabricationError::new(
        path,
        format!(
            "no {kind} between minimum {} and maximum {}",
            bounds.low, bounds.high
        ),
    )
}

#[expect(clippy::cast_possible_truncation)]
fn to_i64(value: f64) -> i64 {
    // `as` saturates at the i64 range.
    value as i64
}

#[expect(clippy::cast_precision_loss)]
fn to_f64(value: i64) -> f64 {
    value as f64
}

/// Narrows `[low, high]` to at most `radius` either side of its midpoint.
fn window(low: f64, high: f64, radius: f64) -> (f64, f64) {
    let middle: f64 = f64::midpoint(low, high);
    ((middle - radius).max(low), (middle + radius).min(high))
}

/// Step counts `k` with `k * step` inside `[low, high]`, if they are exact integers.
fn step_range(low: f64, high: f64, step: f64, path: &str) -> Result<(i64, i64), FabricationError> {
    let (low, high) = window(low, high, OPEN_RANGE * step);
    let first: f64 = (low / step).ceil();
    let last: f64 = (high / step).floor();
    if first.abs() > EXACT_INTEGER || last.abs() > EXACT_INTEGER {
        return Err(FabricationError::new(
            path,
            format!("multipleOf {step} is too fine for bounds around {low}"),
        ));
    }
    if first > last {
        return Err(FabricationError::new(
            path,
            format!("no multiple of {step} between {low} and {high}"),
        ));
    }
    Ok((to_i64(first), to_i64(last)))
}

pub(super) fn fabricate_integer(
    rng: &mut StdRng,
    schema: &Map<String, Value>,
    path: &str,
) -> Result<Value, FabricationError> {
    let bounds: Bounds = read_bounds(schema);
    let (low, high) = integer_range(&bounds);
    if low > high {
        return Err(empty_range(path, &bounds, "integer"));
    }
    let (low, high) = (low.max(-I64_LIMIT), high.min(I64_LIMIT));
    if low > high {
        return Err(FabricationError::new(
            path,
            format!(
                "no 64-bit integer between minimum {} and maximum {}",
                bounds.low, bounds.high
            ),
        ));
    }

    let value: i64 = match multiple_of(schema) {
        None => rng.gen_range(to_i64(low)..=to_i64(high)),
        Some(step) if step.fract() == 0.0 => {
            let (first, last) = step_range(low, high, step, path)?;
            rng.gen_range(first..=last).saturating_mul(to_i64(step))
        }
        Some(step) => {
            // Fractional step: search for an integer that is also a multiple.
            let (low, high) = window(low, high, OPEN_RANGE);
            let start: i64 = rng.gen_range(to_i64(low)..=to_i64(high));
            (start..=to_i64(high))
                .chain(to_i64(low)..start)
                .take(10_000)
                .find(|candidate| (to_f64(*candidate) / step).fract() == 0.0)
                .ok_or_else(|| {
                    FabricationError::new(
                        path,
                        format!("no integer multiple of {step} between {low} and {high}"),
                    )
                })?
        }
    };

    if !(low..=high).contains(&to_f64(value)) {
        return Err(empty_range(path, &bounds, "representable integer"));
    }
    Ok(Value::from(value))
}

pub(super) fn fabricate_number(
    rng: &mut StdRng,
    schema: &Map<String, Value>,
    path: &str,
) -> Result<Value, FabricationError> {
    let bounds: Bounds = read_bounds(schema);
    let inside = |value: f64| {
        (if bounds.low_exclusive {
            value > bounds.low
        } else {
            value >= bounds.low
        }) && (if bounds.high_exclusive {
            value < bounds.high
        } else {
            value <= bounds.high
        })
    };
    if bounds.low > bounds.high
        || (bounds.low == bounds.high && (bounds.low_exclusive || bounds.high_exclusive))
    {
        return Err(empty_range(path, &bounds, "number"));
    }

    let value: f64 = if let Some(step) = multiple_of(schema) {
        let (first, last) = step_range(bounds.low, bounds.high, step, path)?;
        let candidates = (first..=last).map(|k| to_f64(k) * step).filter(|x| inside(*x));
        let in_range: Vec<f64> = candidates.collect();
        *in_range.choose(rng).ok_or_else(|| {
            FabricationError::new(path, format!("no multiple of {step} inside the bounds"))
        })?
    } else {
        // A range wider than f64 can represent is sampled near its middle.
        let (low, high) = if (bounds.high - bounds.low).is_finite() {
            (bounds.low, bounds.high)
        } else {
            window(bounds.low, bounds.high, OPEN_RANGE)
        };
        let mut value: f64 = rng.gen_range(low..=high);
        for _ in 0..EXCLUSIVE_ATTEMPTS {
            if inside(value) {
                break;
            }
            value = rng.gen_range(low..=high);
        }
        if !inside(value) {
            value = f64::midpoint(bounds.low, bounds.high);
        }
        // Two decimals read better in an example, as long as it stays in range.
        let rounded: f64 = (value * 100.0).round() / 100.0;
        if inside(rounded) { rounded } else { value }
    };

    Number::from_f64(value)
        .map(Value::Number)
        .ok_or_else(|| FabricationError::new(path, "bounds produce a non-finite number"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn integer_respects_inclusive_bounds() {
        let schema = map(json!({ "minimum": -3, "maximum": 3 }));
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..200 {
            let n: i64 = fabricate_integer(&mut rng, &schema, "").unwrap().as_i64().unwrap();
            assert!((-3..=3).contains(&n));
        }
    }

    #[test]
    fn integer_respects_exclusive_bounds() {
        let schema = map(json!({
            "minimum": 1, "exclusiveMinimum": true,
            "maximum": 3, "exclusiveMaximum": true
        }));
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..50 {
            assert_eq!(fabricate_integer(&mut rng, &schema, "").unwrap(), json!(2));
        }
    }

    #[test]
    fn integer_with_fractional_bounds() {
        let schema = map(json!({ "minimum": 0.5, "maximum": 1.5 }));
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(fabricate_integer(&mut rng, &schema, "").unwrap(), json!(1));
    }

    #[test]
    fn integer_multiple_of() {
        let schema = map(json!({ "minimum": 1, "maximum": 100, "multipleOf": 7 }));
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..100 {
            let n: i64 = fabricate_integer(&mut rng, &schema, "").unwrap().as_i64().unwrap();
            assert_eq!(n % 7, 0);
            assert!((7..=98).contains(&n));
        }
    }

    #[test]
    fn integer_fractional_multiple_of() {
        let schema = map(json!({ "minimum": 0, "maximum": 10, "multipleOf": 2.5 }));
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..50 {
            let n: i64 = fabricate_integer(&mut rng, &schema, "").unwrap().as_i64().unwrap();
            assert!([0, 5, 10].contains(&n), "{n}");
        }
    }

    #[test]
    fn integer_empty_range_is_an_error() {
        let schema = map(json!({ "minimum": 2, "maximum": 2, "exclusiveMaximum": true }));
        let mut rng = StdRng::seed_from_u64(0);
        let err = fabricate_integer(&mut rng, &schema, "/properties/n").unwrap_err();
        assert_eq!(err.path, "/properties/n");
        assert!(err.message.contains("no integer"));
    }

    #[test]
    fn integer_unbounded_defaults() {
        let mut rng = StdRng::seed_from_u64(0);
        let only_min = map(json!({ "minimum": 5000 }));
        let n: i64 = fabricate_integer(&mut rng, &only_min, "").unwrap().as_i64().unwrap();
        assert!((5000..=6000).contains(&n));
        let only_max = map(json!({ "maximum": -5000 }));
        let n: i64 = fabricate_integer(&mut rng, &only_max, "").unwrap().as_i64().unwrap();
        assert!((-6000..=-5000).contains(&n));
    }

    #[test]
    fn number_respects_exclusive_bounds() {
        let schema = map(json!({
            "minimum": 0, "exclusiveMinimum": true,
            "maximum": 0.01, "exclusiveMaximum": true
        }));
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..100 {
            let x: f64 = fabricate_number(&mut rng, &schema, "").unwrap().as_f64().unwrap();
            assert!(x > 0.0 && x < 0.01, "{x}");
        }
    }

    #[test]
    fn number_multiple_of_binary_exact_step() {
        let schema = map(json!({ "minimum": 1, "maximum": 3, "multipleOf": 0.25 }));
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..100 {
            let x: f64 = fabricate_number(&mut rng, &schema, "").unwrap().as_f64().unwrap();
            assert_eq!((x / 0.25).fract(), 0.0);
            assert!((1.0..=3.0).contains(&x));
        }
    }

    #[test]
    fn number_degenerate_exclusive_range_is_an_error() {
        let schema = map(json!({ "minimum": 1, "maximum": 1, "exclusiveMinimum": true }));
        let mut rng = StdRng::seed_from_u64(0);
        assert!(fabricate_number(&mut rng, &schema, "").is_err());
    }

    #[test]
    fn number_single_point_range() {
        let schema = map(json!({ "minimum": 4.5, "maximum": 4.5 }));
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(fabricate_number(&mut rng, &schema, "").unwrap(), json!(4.5));
    }

    #[test]
    fn number_range_wider_than_f64_is_sampled_near_the_middle() {
        let schema = map(json!({ "minimum": -1e308, "maximum": 1e308 }));
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            let x: f64 = fabricate_number(&mut rng, &schema, "").unwrap().as_f64().unwrap();
            assert!((-1000.0..=1000.0).contains(&x), "{x}");
        }
    }

    #[test]
    fn number_multiple_of_in_a_huge_range() {
        let schema = map(json!({ "minimum": -1e308, "maximum": 1e308, "multipleOf": 0.5 }));
        let mut rng = StdRng::seed_from_u64(2);
        let x: f64 = fabricate_number(&mut rng, &schema, "").unwrap().as_f64().unwrap();
        assert_eq!((x / 0.5).fract(), 0.0);
    }

    #[test]
    fn integer_beyond_i64_is_an_error() {
        let mut rng = StdRng::seed_from_u64(0);
        for schema in [json!({ "minimum": 1e20 }), json!({ "maximum": -1e20 })] {
            let err = fabricate_integer(&mut rng, &map(schema), "/n").unwrap_err();
            assert!(err.message.contains("64-bit"), "{err}");
        }
    }

    #[test]
    fn integer_full_i64_range() {
        let schema = map(json!({ "minimum": -1e300, "maximum": 1e300 }));
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..20 {
            assert!(fabricate_integer(&mut rng, &schema, "").unwrap().is_i64());
        }
    }

    #[test]
    fn integer_multiple_of_near_i64_max() {
        let schema = map(json!({ "minimum": 9.2e18, "multipleOf": 1000 }));
        let mut rng = StdRng::seed_from_u64(0);
        let err = fabricate_integer(&mut rng, &schema, "").unwrap_err();
        assert!(err.message.contains("too fine"), "{err}");
    }
}
