//! Path lookups into loosely-shaped provider JSON.

use serde_json::Value;

/// Follow object keys from `value`. Empty paths return `value` itself.
pub fn value_at<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, key| current.get(*key))
}

/// Finite number at `path`. Numeric strings are accepted.
pub fn number_at(value: &Value, path: &[&str]) -> Option<f64> {
    let number = match value_at(value, path)? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}

pub fn string_at<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
    value_at(value, path)?.as_str()
}

/// First array found among `paths`, tried in order.
pub fn first_array<'a>(value: &'a Value, paths: &[&[&str]]) -> Option<&'a Vec<Value>> {
    paths
        .iter()
        .find_map(|path| value_at(value, path).and_then(Value::as_array))
}

/// A latitude/longitude accessor pair rooted at a shared prefix.
#[derive(Debug, Clone, Copy)]
pub struct CoordinatePath {
    pub lat: &'static [&'static str],
    pub lng: &'static [&'static str],
}

impl CoordinatePath {
    pub const fn new(lat: &'static [&'static str], lng: &'static [&'static str]) -> Self {
        Self { lat, lng }
    }

    fn resolve(&self, value: &Value) -> Option<(f64, f64)> {
        Some((number_at(value, self.lat)?, number_at(value, self.lng)?))
    }
}

/// Try each coordinate path in order; the first yielding two finite numbers wins.
pub fn first_coordinate(value: &Value, paths: &[CoordinatePath]) -> Option<(f64, f64)> {
    paths.iter().find_map(|path| path.resolve(value))
}
