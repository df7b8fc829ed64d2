//! Tool/function-call specifications for language model requests.
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::derive::{object_schema_for, Deriver};
use crate::descriptor::{Reflect, TypeRef};
use crate::error::DeriveError;
use crate::render::render_object;
use crate::schema::ObjectSchema;

/// A named tool whose parameters are a closed object schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSpecification {
    pub name: String,
    pub description: Option<String>,
    pub parameters: ObjectSchema,
}

impl ToolSpecification {
    pub fn new(
        name: impl Into<String>,
        description: Option<String>,
        parameters: ObjectSchema,
    ) -> Self {
        Self {
            name: name.into(),
            description,
            parameters,
        }
    }

    /// Parameters derived from the members of a native type.
    pub fn from_type<T: Reflect + ?Sized + 'static>(
        name: impl Into<String>,
        description: Option<String>,
    ) -> Result<Self, DeriveError> {
        Ok(Self::new(name, description, object_schema_for::<T>()?))
    }

    /// Parameters derived from a catalog (or native) type reference.
    pub fn derive(
        deriver: &Deriver<'_>,
        name: impl Into<String>,
        description: Option<String>,
        parameters: &TypeRef,
    ) -> Result<Self, DeriveError> {
        let parameters = deriver.derive_object_schema(parameters, None)?;
        Ok(Self::new(name, description, parameters))
    }

    /// `{name, description?, parameters}` with parameters rendered as an
    /// object schema.
    pub fn render(&self) -> Map<String, Value> {
        let mut out = Map::new();
        out.insert("name".into(), Value::from(self.name.as_str()));
        if let Some(description) = &self.description {
            out.insert("description".into(), Value::from(description.as_str()));
        }
        out.insert("parameters".into(), Value::Object(render_object(&self.parameters)));
        out
    }
}

impl Serialize for ToolSpecification {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.render().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::descriptor::{Member, TypeDescriptor};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    struct GetWeather;
    impl Reflect for GetWeather {
        fn descriptor() -> TypeDescriptor {
            TypeDescriptor::structured("GetWeather")
                .member(Member::of::<String>("city").describe(["City", "name"]))
                .member(Member::of::<Vec<String>>("fields"))
        }
    }

    #[test]
    fn renders_tool_payload() {
        let tool = ToolSpecification::from_type::<GetWeather>(
            "get_weather",
            Some("Current weather".into()),
        )
        .unwrap();
        let expected = json!({
            "name": "get_weather",
            "description": "Current weather",
            "parameters": {
                "type": "object",
                "properties": {
                    "city": {"type": "string", "description": "City name"},
                    "fields": {"type": "array", "items": {"type": "string"}}
                },
                "required": ["city", "fields"],
                "additionalProperties": false
            }
        });
        assert_eq!(
            serde_json::to_string(&tool).unwrap(),
            serde_json::to_string(&expected).unwrap()
        );
    }

    #[test]
    fn description_is_optional() {
        let mut catalog = Catalog::with_builtins();
        catalog.insert(TypeDescriptor::structured("Empty"));
        let deriver = Deriver::new(&catalog);
        let tool =
            ToolSpecification::derive(&deriver, "noop", None, &TypeRef::named("Empty")).unwrap();
        let map = tool.render();
        assert_eq!(map.keys().map(String::as_str).collect::<Vec<_>>(), ["name", "parameters"]);
        assert!(tool.parameters.is_empty());
    }
}
