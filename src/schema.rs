//! In-memory schema model produced by derivation and consumed by rendering.
use indexmap::IndexMap;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// One node of a derived schema tree. The variant set is closed; rendering
/// matches on it exhaustively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Schema {
    String { description: Option<String> },
    Integer { description: Option<String> },
    Number { description: Option<String> },
    Boolean { description: Option<String> },
    /// String-valued enumeration; `values` keeps declaration order.
    Enum {
        description: Option<String>,
        values: Vec<String>,
    },
    /// Homogeneous array; every element is described by `items`.
    Array {
        description: Option<String>,
        items: Box<Schema>,
    },
    Object(ObjectSchema),
}

/// A closed object schema.
///
/// Fields are private so the `required ⊆ properties` invariant holds for every
/// value: `required` always mirrors the property keys in insertion order and
/// `additionalProperties` is always `false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSchema {
    description: Option<String>,
    properties: IndexMap<String, Schema>,
    required: Vec<String>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl Schema {
    pub fn string(description: Option<String>) -> Self {
        Schema::String { description }
    }

    pub fn integer(description: Option<String>) -> Self {
        Schema::Integer { description }
    }

    pub fn number(description: Option<String>) -> Self {
        Schema::Number { description }
    }

    pub fn boolean(description: Option<String>) -> Self {
        Schema::Boolean { description }
    }

    pub fn enumeration<I, S>(values: I, description: Option<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Schema::Enum {
            description,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn array(items: Schema, description: Option<String>) -> Self {
        Schema::Array {
            description,
            items: Box::new(items),
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Schema::String { description }
            | Schema::Integer { description }
            | Schema::Number { description }
            | Schema::Boolean { description }
            | Schema::Enum { description, .. }
            | Schema::Array { description, .. } => description.as_deref(),
            Schema::Object(obj) => obj.description(),
        }
    }

    /// The JSON-Schema `type` keyword this node renders with.
    pub fn type_name(&self) -> &'static str {
        match self {
            Schema::String { .. } | Schema::Enum { .. } => "string",
            Schema::Integer { .. } => "integer",
            Schema::Number { .. } => "number",
            Schema::Boolean { .. } => "boolean",
            Schema::Array { .. } => "array",
            Schema::Object(_) => "object",
        }
    }

    pub fn as_object(&self) -> Option<&ObjectSchema> {
        match self {
            Schema::Object(obj) => Some(obj),
            _ => None,
        }
    }
}

impl From<ObjectSchema> for Schema {
    fn from(obj: ObjectSchema) -> Self {
        Schema::Object(obj)
    }
}

impl ObjectSchema {
    /// Build an object schema; every property becomes required, in order.
    pub fn new(description: Option<String>, properties: IndexMap<String, Schema>) -> Self {
        let required = properties.keys().cloned().collect();
        Self {
            description,
            properties,
            required,
        }
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn properties(&self) -> &IndexMap<String, Schema> {
        &self.properties
    }

    pub fn required(&self) -> &[String] {
        &self.required
    }

    /// Always `false`: only closed objects are modelled.
    pub fn additional_properties(&self) -> bool {
        false
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_requires_every_property_in_insertion_order() {
        let mut props = IndexMap::new();
        props.insert("zeta".to_string(), Schema::string(None));
        props.insert("alpha".to_string(), Schema::integer(None));
        props.insert("mid".to_string(), Schema::boolean(None));
        let obj = ObjectSchema::new(Some("thing".into()), props);

        assert_eq!(obj.required(), ["zeta", "alpha", "mid"]);
        assert_eq!(obj.properties().keys().collect::<Vec<_>>(), ["zeta", "alpha", "mid"]);
        assert!(!obj.additional_properties());
        assert_eq!(obj.description(), Some("thing"));
    }

    #[test]
    fn enum_reports_string_type() {
        let e = Schema::enumeration(["A", "B"], None);
        assert_eq!(e.type_name(), "string");
        assert_eq!(e.description(), None);
    }

    #[test]
    fn empty_object_has_empty_required() {
        let obj = ObjectSchema::new(None, IndexMap::new());
        assert!(obj.is_empty());
        assert!(obj.required().is_empty());
    }

    #[test]
    fn description_reaches_through_every_variant() {
        let d = || Some("d".to_string());
        let nodes = [
            Schema::string(d()),
            Schema::integer(d()),
            Schema::number(d()),
            Schema::boolean(d()),
            Schema::enumeration(["x"], d()),
            Schema::array(Schema::string(None), d()),
            ObjectSchema::new(d(), IndexMap::new()).into(),
        ];
        for node in &nodes {
            assert_eq!(node.description(), Some("d"), "{node:?}");
        }
    }
}
