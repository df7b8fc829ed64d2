//! Schema tree → ordered JSON-Schema maps.
//!
//! Every node renders `type` first, then `description` when present, then its
//! variant keys. Object nodes close with `required` and
//! `additionalProperties: false`. Maps are `serde_json::Map` built with
//! `preserve_order`, so iteration and serialization follow insertion order.
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::schema::{ObjectSchema, Schema};

pub fn render(node: &Schema) -> Map<String, Value> {
    let mut out = header(node.type_name(), node.description());
    match node {
        Schema::String { .. }
        | Schema::Integer { .. }
        | Schema::Number { .. }
        | Schema::Boolean { .. } => {}
        Schema::Enum { values, .. } => {
            out.insert(
                "enum".into(),
                Value::Array(values.iter().cloned().map(Value::from).collect()),
            );
        }
        Schema::Array { items, .. } => {
            out.insert("items".into(), Value::Object(render(items)));
        }
        Schema::Object(obj) => object_body(&mut out, obj),
    }
    out
}

pub fn render_object(obj: &ObjectSchema) -> Map<String, Value> {
    let mut out = header("object", obj.description());
    object_body(&mut out, obj);
    out
}

/// Render each property schema, keeping key order.
pub fn render_properties(
    properties: &IndexMap<String, Schema>,
) -> IndexMap<String, Map<String, Value>> {
    properties
        .iter()
        .map(|(name, schema)| (name.clone(), render(schema)))
        .collect()
}

pub fn render_value(node: &Schema) -> Value {
    Value::Object(render(node))
}

fn header(type_name: &str, description: Option<&str>) -> Map<String, Value> {
    let mut out = Map::new();
    out.insert("type".into(), Value::from(type_name));
    if let Some(description) = description {
        out.insert("description".into(), Value::from(description));
    }
    out
}

fn object_body(out: &mut Map<String, Value>, obj: &ObjectSchema) {
    let properties = render_properties(obj.properties())
        .into_iter()
        .map(|(name, map)| (name, Value::Object(map)))
        .collect::<Map<_, _>>();
    out.insert("properties".into(), Value::Object(properties));
    out.insert(
        "required".into(),
        Value::Array(obj.required().iter().cloned().map(Value::from).collect()),
    );
    out.insert("additionalProperties".into(), Value::Bool(obj.additional_properties()));
}

impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        render(self).serialize(serializer)
    }
}

impl Serialize for ObjectSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        render_object(self).serialize(serializer)
    }
}

// ------------------------------- Tests ------------------------------------ //
