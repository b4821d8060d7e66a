//! # Output Rendering
//!
//! Turns engine values and stored specifications into JSON for printing.

use crate::catalog;
use objfactory_core::{ArrayValue, BuildSpecification, Parameter, SpecKind, Value};
use serde_json::{Number, json};

/// JSON form of a constructed value.
///
/// Objects from the demo catalog are serialized field by field; any other
/// object falls back to its class name and debug form.
pub fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Byte(b) => json!(b),
        Value::Short(s) => json!(s),
        Value::Int(i) => json!(i),
        Value::Long(l) => json!(l),
        Value::Float(x) => float(f64::from(*x)),
        Value::Double(x) => float(*x),
        Value::Char(c) => json!(c.to_string()),
        Value::Boolean(b) => json!(b),
        Value::String(s) => json!(s),
        Value::Array(array) => array_to_json(array),
        Value::Object(instance) => match catalog::describe(instance) {
            Some(fields) => json!({ "class": instance.class().name(), "fields": fields }),
            None => json!({ "class": instance.class().name(), "debug": format!("{instance:?}") }),
        },
    }
}

/// Non-finite floats have no JSON number form.
fn float(x: f64) -> serde_json::Value {
    Number::from_f64(x)
        .map(serde_json::Value::Number)
        .unwrap_or_else(|| json!(x.to_string()))
}

fn array_to_json(array: &ArrayValue) -> serde_json::Value {
    if array.rank() <= 1 {
        return array.values().iter().map(value_to_json).collect();
    }
    let rows = array.shape().first().copied().unwrap_or(0);
    (0..rows)
        .filter_map(|i| array.row(i))
        .map(|row| array_to_json(&row))
        .collect()
}

/// Plain-text form: strings print bare, everything else as compact JSON.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => value_to_json(other).to_string(),
    }
}

// =============================================================================
// SPECIFICATIONS
// =============================================================================

/// JSON form of a stored specification, references already inlined.
pub fn spec_to_json(spec: &BuildSpecification) -> serde_json::Value {
    let mut out = serde_json::Map::new();
    out.insert("kind".into(), json!(spec.kind()));
    out.insert("type".into(), json!(spec.type_name()));
    if let Some(id) = spec.identifier() {
        out.insert("identifier".into(), json!(id));
    }
    if let Some(location) = spec.code_location() {
        out.insert("location".into(), json!(location));
    }
    match spec.kind() {
        SpecKind::Simple => {
            out.insert("value".into(), json!(spec.value()));
        }
        SpecKind::Array => {
            out.insert("dimension".into(), json!(spec.dimension()));
            out.insert("params".into(), params_to_json(spec.parameters()));
        }
        SpecKind::Complex => {
            out.insert("params".into(), params_to_json(spec.parameters()));
        }
        SpecKind::Null => {}
    }
    serde_json::Value::Object(out)
}

fn params_to_json(params: &[Parameter]) -> serde_json::Value {
    params
        .iter()
        .map(|p| match p {
            Parameter::Spec(spec) => spec_to_json(spec),
            Parameter::Value(value) => value_to_json(value),
            Parameter::Nested(row) => params_to_json(row),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use objfactory_core::{Primitive, TypeDescriptor};

    #[test]
    fn scalars_render_as_json_scalars() {
        assert_eq!(value_to_json(&Value::Int(7)), json!(7));
        assert_eq!(value_to_json(&Value::Char('x')), json!("x"));
        assert_eq!(value_to_json(&Value::Null), serde_json::Value::Null);
        assert_eq!(value_to_json(&Value::Double(f64::NAN)), json!("NaN"));
    }

    #[test]
    fn grids_render_as_nested_lists() {
        let mut array = ArrayValue::new(TypeDescriptor::from(Primitive::Int), vec![2, 2]);
        for (i, v) in [1, 2, 3, 4].into_iter().enumerate() {
            array
                .set(&[i / 2, i % 2], Value::Int(v))
                .expect("set");
        }
        assert_eq!(value_to_json(&Value::Array(array)), json!([[1, 2], [3, 4]]));
    }

    #[test]
    fn strings_print_bare_as_text() {
        assert_eq!(value_to_text(&Value::from("hello")), "hello");
        assert_eq!(value_to_text(&Value::Boolean(true)), "true");
    }

    #[test]
    fn specifications_render_their_tree() {
        let spec = BuildSpecification::complex(
            "people.Person",
            vec![
                BuildSpecification::simple("string", "Ada").into(),
                BuildSpecification::null("int").into(),
            ],
        )
        .with_identifier("ada");

        let rendered = spec_to_json(&spec);
        assert_eq!(rendered["kind"], json!("complex"));
        assert_eq!(rendered["identifier"], json!("ada"));
        assert_eq!(rendered["params"][0]["value"], json!("Ada"));
        assert_eq!(rendered["params"][1]["kind"], json!("null"));
    }
}
