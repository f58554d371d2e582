use serde_json::{Map, Number, Value};

/// Relative tolerance used when deciding whether a float field was modified.
pub const FLOAT_EPSILON: f32 = 1e-5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Float(f32),
    Bool(bool),
}

impl FieldValue {
    pub fn as_float(self) -> Option<f32> {
        match self {
            FieldValue::Float(value) => Some(value),
            FieldValue::Bool(_) => None,
        }
    }

    pub fn as_bool(self) -> Option<bool> {
        match self {
            FieldValue::Bool(value) => Some(value),
            FieldValue::Float(_) => None,
        }
    }

    /// Floats compare approximately, everything else exactly.
    pub fn approx_eq(self, other: FieldValue) -> bool {
        match (self, other) {
            (FieldValue::Float(a), FieldValue::Float(b)) => floats_match(a, b),
            (FieldValue::Bool(a), FieldValue::Bool(b)) => a == b,
            _ => false,
        }
    }

    pub fn to_json(self) -> Value {
        match self {
            FieldValue::Float(value) => {
                Number::from_f64(f64::from(value)).map(Value::Number).unwrap_or(Value::Null)
            }
            FieldValue::Bool(value) => Value::Bool(value),
        }
    }
}

pub fn floats_match(a: f32, b: f32) -> bool {
    approx::relative_eq!(a, b, epsilon = FLOAT_EPSILON, max_relative = FLOAT_EPSILON)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Float,
    Bool,
}

/// Parses a JSON value as the expected field type. Numeric strings and
/// `"true"`/`"false"` are accepted since hand-edited presets use them.
pub fn parse_field(value: &Value, ty: FieldType) -> Option<FieldValue> {
    match ty {
        FieldType::Float => {
            let parsed = match value {
                Value::Number(number) => number.as_f64().map(|v| v as f32),
                Value::String(text) => text.trim().parse::<f32>().ok(),
                _ => None,
            };
            parsed.filter(|v| v.is_finite()).map(FieldValue::Float)
        }
        FieldType::Bool => match value {
            Value::Bool(flag) => Some(FieldValue::Bool(*flag)),
            Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
                "true" => Some(FieldValue::Bool(true)),
                "false" => Some(FieldValue::Bool(false)),
                _ => None,
            },
            _ => None,
        },
    }
}

/// Range a slider is displayed with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldRange {
    Float { min: f32, max: f32 },
    Toggle,
}

/// Describes one editable field for controls.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub range: FieldRange,
    pub default: FieldValue,
}

impl FieldSpec {
    /// A float field whose slider spans `[0, 4 × initial]`.
    pub fn scaled(key: &'static str, label: &'static str, initial: f32) -> Self {
        let max = initial * 4.0;
        let max = if max > 0.0 { max } else { 1.0 };
        Self { key, label, range: FieldRange::Float { min: 0.0, max }, default: FieldValue::Float(initial) }
    }

    /// A local-space offset field, bounded to `[-0.25, 0.25]`.
    pub fn offset(key: &'static str, label: &'static str, initial: f32) -> Self {
        Self {
            key,
            label,
            range: FieldRange::Float { min: -0.25, max: 0.25 },
            default: FieldValue::Float(initial),
        }
    }

    pub fn toggle(key: &'static str, label: &'static str, initial: bool) -> Self {
        Self { key, label, range: FieldRange::Toggle, default: FieldValue::Bool(initial) }
    }
}

/// Keyed access to a variant's editable state.
pub trait FieldSet {
    fn keys(&self) -> &'static [&'static str];

    fn field_type(&self, key: &str) -> Option<FieldType>;

    fn get(&self, key: &str) -> Option<FieldValue>;

    /// Returns false when the key is unknown or the value has the wrong type.
    fn set(&mut self, key: &str, value: FieldValue) -> bool;
}

pub fn deviates(initial: &dyn FieldSet, live: &dyn FieldSet) -> bool {
    live.keys().iter().any(|key| match (initial.get(key), live.get(key)) {
        (Some(a), Some(b)) => !a.approx_eq(b),
        _ => false,
    })
}

pub fn write_fields(fields: &dyn FieldSet) -> Map<String, Value> {
    let mut object = Map::new();
    for key in fields.keys() {
        if let Some(value) = fields.get(key) {
            object.insert((*key).to_string(), value.to_json());
        }
    }
    object
}

/// Applies the keys present in `object`. Returns the keys that could not be
/// parsed as their field type; unknown keys are ignored.
pub fn read_fields(fields: &mut dyn FieldSet, object: &Map<String, Value>) -> Vec<&'static str> {
    let mut mismatched = Vec::new();
    for key in fields.keys() {
        let Some(raw) = object.get(*key) else {
            continue;
        };
        let Some(ty) = fields.field_type(key) else {
            continue;
        };
        match parse_field(raw, ty) {
            Some(value) => {
                fields.set(key, value);
            }
            None => mismatched.push(*key),
        }
    }
    mismatched
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn floats_within_epsilon_are_equal() {
        assert!(FieldValue::Float(0.1).approx_eq(FieldValue::Float(0.100_000_1)));
        assert!(!FieldValue::Float(0.1).approx_eq(FieldValue::Float(0.11)));
        assert!(!FieldValue::Float(1.0).approx_eq(FieldValue::Bool(true)));
    }

    #[test]
    fn parse_accepts_numeric_strings_and_rejects_garbage() {
        assert_eq!(parse_field(&json!("0.5"), FieldType::Float), Some(FieldValue::Float(0.5)));
        assert_eq!(parse_field(&json!(2), FieldType::Float), Some(FieldValue::Float(2.0)));
        assert_eq!(parse_field(&json!("wide"), FieldType::Float), None);
        assert_eq!(parse_field(&json!(true), FieldType::Float), None);
        assert_eq!(parse_field(&json!("FALSE"), FieldType::Bool), Some(FieldValue::Bool(false)));
        assert_eq!(parse_field(&json!(1), FieldType::Bool), None);
    }

    #[test]
    fn scaled_range_falls_back_for_zero_initial() {
        let spec = FieldSpec::scaled("radius", "Radius", 0.0);
        assert_eq!(spec.range, FieldRange::Float { min: 0.0, max: 1.0 });
        let spec = FieldSpec::scaled("radius", "Radius", 0.5);
        assert_eq!(spec.range, FieldRange::Float { min: 0.0, max: 2.0 });
    }
}
