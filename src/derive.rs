//! Recursive derivation of a [`Schema`] tree from type descriptors.
//!
//! Dispatch is on the resolved [`Shape`], in fixed order: scalars, enums,
//! fixed arrays, collections, then everything else as a closed object whose
//! properties are the type's domain members in declaration order.
//!
//! Two guards replace stack exhaustion on pathological inputs: a structured
//! type that (transitively) contains itself fails with
//! [`DeriveError::RecursiveType`], and nesting past
//! [`DeriveOptions::max_depth`] fails with [`DeriveError::DepthExceeded`].
use std::borrow::Cow;

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::catalog::{EmptyCatalog, TypeCatalog};
use crate::descriptor::{Reflect, Shape, TypeDescriptor, TypeKey, TypeRef};
use crate::error::DeriveError;
use crate::schema::{ObjectSchema, Schema};

// ------------------------------- Policy ---------------------------------- //

/// Deep enough for any hand-written parameter type.
pub const DEFAULT_MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeriveOptions {
    /// Maximum number of nested schema nodes from the root.
    pub max_depth: usize,
    /// Reject structured types that contain themselves.
    pub detect_cycles: bool,
}

impl Default for DeriveOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            detect_cycles: true,
        }
    }
}

// ------------------------------- Engine ---------------------------------- //

pub struct Deriver<'c> {
    catalog: &'c dyn TypeCatalog,
    options: DeriveOptions,
}

/// Per-call recursion state.
#[derive(Default)]
struct Walk {
    /// Structured types currently being expanded, outermost first. Names are
    /// only kept for the error chain.
    open: Vec<(TypeKey, String)>,
    depth: usize,
}

impl<'c> Deriver<'c> {
    pub fn new(catalog: &'c dyn TypeCatalog) -> Self {
        Self {
            catalog,
            options: DeriveOptions::default(),
        }
    }

    pub fn with_options(mut self, options: DeriveOptions) -> Self {
        self.options = options;
        self
    }

    /// Derive the schema of `ty`.
    ///
    /// `generic` supplies the element type when `ty` is a collection; when it
    /// is empty the reference's own arguments are used. `description` takes
    /// precedence over anything the type itself declares.
    pub fn derive_schema(
        &self,
        ty: &TypeRef,
        generic: &[TypeRef],
        description: Option<&str>,
    ) -> Result<Schema, DeriveError> {
        debug!(root = %ty.name(), "deriving schema");
        self.schema_of(ty, generic, description, &mut Walk::default())
    }

    /// Derive a closed object schema from the members of `ty`. Types without
    /// members produce an object with no properties.
    pub fn derive_object_schema(
        &self,
        ty: &TypeRef,
        description: Option<&str>,
    ) -> Result<ObjectSchema, DeriveError> {
        debug!(root = %ty.name(), "deriving object schema");
        let descriptor = ty.resolve(self.catalog)?;
        let mut walk = Walk {
            depth: 1,
            ..Walk::default()
        };
        self.object_of(&descriptor, ty.key(), description, &mut walk)
    }

    fn schema_of(
        &self,
        ty: &TypeRef,
        generic: &[TypeRef],
        description: Option<&str>,
        walk: &mut Walk,
    ) -> Result<Schema, DeriveError> {
        let descriptor = ty.resolve(self.catalog)?;
        let generic: Cow<'_, [TypeRef]> = if generic.is_empty() {
            Cow::Owned(ty.args())
        } else {
            Cow::Borrowed(generic)
        };

        walk.depth += 1;
        if walk.depth > self.options.max_depth {
            return Err(DeriveError::DepthExceeded {
                type_name: descriptor.name.clone(),
                limit: self.options.max_depth,
            });
        }
        let result = self.schema_from(&descriptor, ty.key(), &generic, description, walk);
        walk.depth -= 1;
        result
    }

    fn schema_from(
        &self,
        descriptor: &TypeDescriptor,
        key: TypeKey,
        generic: &[TypeRef],
        description: Option<&str>,
        walk: &mut Walk,
    ) -> Result<Schema, DeriveError> {
        let explicit = description.map(str::to_owned);
        trace!(type_name = %descriptor.name, depth = walk.depth, "dispatch");
        let schema = match &descriptor.shape {
            Shape::String => Schema::string(explicit),
            Shape::Integer => Schema::integer(explicit),
            Shape::Number => Schema::number(explicit),
            Shape::Boolean => Schema::boolean(explicit),
            Shape::Enum { constants } => Schema::enumeration(
                constants.iter().cloned(),
                explicit.or_else(|| descriptor.description_text()),
            ),
            Shape::Array { component } => {
                let items = self.schema_of(component, &[], None, walk)?;
                Schema::array(items, explicit)
            }
            Shape::Collection => {
                let element = single_type_argument(generic).ok_or_else(|| {
                    DeriveError::UnresolvedElementType {
                        type_name: descriptor.name.clone(),
                        arity: generic.len(),
                    }
                })?;
                let items = self.schema_of(element, &[], None, walk)?;
                Schema::array(items, explicit)
            }
            Shape::Structured { .. } => {
                Schema::Object(self.object_of(descriptor, key, description, walk)?)
            }
        };
        Ok(schema)
    }

    fn object_of(
        &self,
        descriptor: &TypeDescriptor,
        key: TypeKey,
        description: Option<&str>,
        walk: &mut Walk,
    ) -> Result<ObjectSchema, DeriveError> {
        if self.options.detect_cycles {
            if let Some(pos) = walk.open.iter().position(|(open, _)| *open == key) {
                let mut chain: Vec<String> =
                    walk.open[pos..].iter().map(|(_, name)| name.clone()).collect();
                chain.push(descriptor.name.clone());
                return Err(DeriveError::RecursiveType { chain });
            }
        }
        walk.open.push((key, descriptor.name.clone()));
        let properties = self.properties_of(descriptor, walk);
        walk.open.pop();

        let description = description
            .map(str::to_owned)
            .or_else(|| descriptor.description_text());
        Ok(ObjectSchema::new(description, properties?))
    }

    fn properties_of(
        &self,
        descriptor: &TypeDescriptor,
        walk: &mut Walk,
    ) -> Result<IndexMap<String, Schema>, DeriveError> {
        let mut properties = IndexMap::new();
        for member in descriptor.members() {
            if !member.is_domain_field() {
                trace!(type_name = %descriptor.name, member = %member.name, "skipping member");
                continue;
            }
            let member_description = member.description_text();
            let schema = self.schema_of(
                &member.ty,
                &member.type_args,
                member_description.as_deref(),
                walk,
            )?;
            properties.insert(member.name.clone(), schema);
        }
        Ok(properties)
    }
}

// ------------------------------ Entry points ------------------------------ //

/// [`Deriver::derive_schema`] with default options.
pub fn derive_schema(
    catalog: &dyn TypeCatalog,
    ty: &TypeRef,
    generic: &[TypeRef],
    description: Option<&str>,
) -> Result<Schema, DeriveError> {
    Deriver::new(catalog).derive_schema(ty, generic, description)
}

/// [`Deriver::derive_object_schema`] with default options.
pub fn derive_object_schema(
    catalog: &dyn TypeCatalog,
    ty: &TypeRef,
    description: Option<&str>,
) -> Result<ObjectSchema, DeriveError> {
    Deriver::new(catalog).derive_object_schema(ty, description)
}

/// Schema of a native type.
pub fn schema_for<T: Reflect + ?Sized + 'static>() -> Result<Schema, DeriveError> {
    derive_schema(&EmptyCatalog, &TypeRef::of::<T>(), &[], None)
}

/// Object schema of a native type, e.g. tool parameters.
pub fn object_schema_for<T: Reflect + ?Sized + 'static>() -> Result<ObjectSchema, DeriveError> {
    derive_object_schema(&EmptyCatalog, &TypeRef::of::<T>(), None)
}

fn single_type_argument(args: &[TypeRef]) -> Option<&TypeRef> {
    match args {
        [only] => Some(only),
        _ => None,
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::descriptor::Member;
    use pretty_assertions::assert_eq;

    struct Address;
    impl Reflect for Address {
        fn descriptor() -> TypeDescriptor {
            TypeDescriptor::structured("Address")
                .describe(["Postal", "address"])
                .member(Member::of::<String>("street"))
                .member(Member::of::<u32>("zip"))
        }
    }

    #[derive(strum::VariantNames)]
    #[allow(dead_code)]
    enum Priority {
        Low,
        Medium,
        High,
    }
    impl Reflect for Priority {
        fn descriptor() -> TypeDescriptor {
            TypeDescriptor::from_variants::<Priority>("Priority").describe(["How urgent"])
        }
    }

    struct Ticket;
    impl Reflect for Ticket {
        fn descriptor() -> TypeDescriptor {
            TypeDescriptor::structured("Ticket")
                .member(Member::of::<String>("title").describe(["Short", "summary"]))
                .member(Member::of::<Priority>("priority"))
                .member(Member::of::<Vec<String>>("labels"))
                .member(Member::of::<[f64; 2]>("location"))
                .member(Member::of::<Address>("address").describe(["Where to send it"]))
                .member(Member::of::<bool>("open"))
                .member(Member::of::<usize>("INSTANCES").mark_static())
                .member(Member::of::<Address>("this$0"))
        }
    }

    struct Node;
    impl Reflect for Node {
        fn descriptor() -> TypeDescriptor {
            TypeDescriptor::structured("Node")
                .member(Member::of::<i64>("value"))
                .member(Member::of::<Vec<Node>>("children"))
        }
    }

    #[test]
    fn scalars_have_no_description_by_default() {
        assert_eq!(schema_for::<String>().unwrap(), Schema::string(None));
        assert_eq!(schema_for::<i32>().unwrap(), Schema::integer(None));
        assert_eq!(schema_for::<f64>().unwrap(), Schema::number(None));
        assert_eq!(schema_for::<bool>().unwrap(), Schema::boolean(None));
    }

    #[test]
    fn structured_type_becomes_closed_object_in_member_order() {
        let schema = object_schema_for::<Ticket>().unwrap();
        assert_eq!(
            schema.required(),
            ["title", "priority", "labels", "location", "address", "open"]
        );
        assert_eq!(schema.description(), None);

        let props = schema.properties();
        assert_eq!(props["title"], Schema::string(Some("Short summary".into())));
        assert_eq!(
            props["priority"],
            Schema::enumeration(["Low", "Medium", "High"], Some("How urgent".into()))
        );
        assert_eq!(props["labels"], Schema::array(Schema::string(None), None));
        assert_eq!(props["location"], Schema::array(Schema::number(None), None));
        assert_eq!(props["open"], Schema::boolean(None));

        let address = props["address"].as_object().unwrap();
        assert_eq!(address.description(), Some("Where to send it"));
        assert_eq!(address.required(), ["street", "zip"]);
    }

    #[test]
    fn explicit_description_wins() {
        let catalog = EmptyCatalog;
        let deriver = Deriver::new(&catalog);
        let enum_schema = deriver
            .derive_schema(&TypeRef::of::<Priority>(), &[], Some("override"))
            .unwrap();
        assert_eq!(enum_schema.description(), Some("override"));

        let object = deriver
            .derive_object_schema(&TypeRef::of::<Address>(), Some("override"))
            .unwrap();
        assert_eq!(object.description(), Some("override"));

        let object = deriver.derive_object_schema(&TypeRef::of::<Address>(), None).unwrap();
        assert_eq!(object.description(), Some("Postal address"));
    }

    #[test]
    fn root_collection_uses_its_own_arguments() {
        let schema = schema_for::<Vec<Vec<u8>>>().unwrap();
        assert_eq!(
            schema,
            Schema::array(Schema::array(Schema::integer(None), None), None)
        );
    }

    #[test]
    fn explicit_generic_overrides_reference_arguments() {
        let mut catalog = Catalog::with_builtins();
        catalog.register::<Address>();
        let schema = derive_schema(
            &catalog,
            &TypeRef::named("List"),
            &[TypeRef::named("Address")],
            Some("stops"),
        )
        .unwrap();
        match schema {
            Schema::Array { description, items } => {
                assert_eq!(description.as_deref(), Some("stops"));
                assert_eq!(items.type_name(), "object");
            }
            other => panic!("expected array, got {other:?}"),
        }
    }

    #[test]
    fn collection_without_single_argument_fails_fast() {
        let catalog = Catalog::with_builtins();
        let err = derive_schema(&catalog, &TypeRef::named("List"), &[], None).unwrap_err();
        match err {
            DeriveError::UnresolvedElementType { type_name, arity } => {
                assert_eq!((type_name.as_str(), arity), ("List", 0));
            }
            other => panic!("expected unresolved element type, got {other}"),
        }

        let two = [TypeRef::named("int"), TypeRef::named("String")];
        let err = derive_schema(&catalog, &TypeRef::named("Set"), &two, None).unwrap_err();
        assert!(matches!(err, DeriveError::UnresolvedElementType { arity: 2, .. }));
    }

    #[test]
    fn unknown_catalog_type_is_reported() {
        let err = derive_schema(&Catalog::new(), &TypeRef::named("Ghost"), &[], None).unwrap_err();
        assert!(matches!(err, DeriveError::UnknownType(ref name) if name == "Ghost"));
    }

    #[test]
    fn self_containing_type_is_rejected() {
        let err = schema_for::<Node>().unwrap_err();
        match err {
            DeriveError::RecursiveType { chain } => assert_eq!(chain, ["Node", "Node"]),
            other => panic!("expected recursion error, got {other}"),
        }
    }

    #[test]
    fn depth_limit_applies_without_cycle_detection() {
        let catalog = EmptyCatalog;
        let options = DeriveOptions {
            max_depth: 10,
            detect_cycles: false,
        };
        let err = Deriver::new(&catalog)
            .with_options(options)
            .derive_schema(&TypeRef::of::<Node>(), &[], None)
            .unwrap_err();
        assert!(matches!(err, DeriveError::DepthExceeded { limit: 10, .. }), "{err}");
    }

    #[test]
    fn depth_limit_counts_nesting() {
        let catalog = EmptyCatalog;
        let shallow = DeriveOptions {
            max_depth: 2,
            ..DeriveOptions::default()
        };
        let deriver = Deriver::new(&catalog).with_options(shallow);
        // array -> integer
        assert!(deriver.derive_schema(&TypeRef::of::<Vec<u8>>(), &[], None).is_ok());
        // array -> array -> integer
        assert!(deriver.derive_schema(&TypeRef::of::<Vec<Vec<u8>>>(), &[], None).is_err());
    }

    #[test]
    fn sibling_reuse_is_not_recursion() {
        struct Route;
        impl Reflect for Route {
            fn descriptor() -> TypeDescriptor {
                TypeDescriptor::structured("Route")
                    .member(Member::of::<Address>("from"))
                    .member(Member::of::<Address>("to"))
            }
        }
        let schema = object_schema_for::<Route>().unwrap();
        assert_eq!(schema.properties()["from"], schema.properties()["to"]);
    }

    mod inventory {
        use super::*;

        pub struct Item;
        impl Reflect for Item {
            fn descriptor() -> TypeDescriptor {
                TypeDescriptor::structured("Item").member(Member::of::<u32>("on_hand"))
            }
        }
    }

    mod order {
        use super::*;

        pub struct Item;
        impl Reflect for Item {
            fn descriptor() -> TypeDescriptor {
                TypeDescriptor::structured("Item")
                    .member(Member::of::<u32>("qty"))
                    .member(Member::of::<inventory::Item>("stock"))
            }
        }
    }

    #[test]
    fn same_named_nested_types_are_not_recursion() {
        let schema = object_schema_for::<order::Item>().unwrap();
        assert_eq!(schema.required(), ["qty", "stock"]);
        let stock = schema.properties()["stock"].as_object().unwrap();
        assert_eq!(stock.required(), ["on_hand"]);
        assert_eq!(stock.properties()["on_hand"], Schema::integer(None));
    }

    #[test]
    fn catalog_types_derive_like_native_ones() {
        let mut catalog = Catalog::with_builtins();
        catalog
            .load_str(
                r#"{ "types": [
                    { "name": "Person", "kind": "structured", "description": ["A", "person"],
                      "members": [
                        { "name": "name", "type": "String", "description": "Full name" },
                        { "name": "age", "type": "int" },
                        { "name": "nicknames", "type": "Set", "type_args": ["String"] },
                        { "name": "grid", "type": "List", "type_args": [{ "name": "List", "args": ["double"] }] },
                        { "name": "role", "type": "Role" },
                        { "name": "__$hits$__", "type": "int" },
                        { "name": "cache", "type": "String", "synthetic": true }
                      ] },
                    { "name": "Role", "kind": "enum", "constants": ["ADMIN", "USER"], "description": "Access level" }
                ] }"#,
                "inline",
            )
            .unwrap();

        let person = derive_object_schema(&catalog, &TypeRef::named("Person"), None).unwrap();
        assert_eq!(person.description(), Some("A person"));
        assert_eq!(person.required(), ["name", "age", "nicknames", "grid", "role"]);

        let props = person.properties();
        assert_eq!(props["name"], Schema::string(Some("Full name".into())));
        assert_eq!(props["age"], Schema::integer(None));
        assert_eq!(props["nicknames"], Schema::array(Schema::string(None), None));
        assert_eq!(
            props["grid"],
            Schema::array(Schema::array(Schema::number(None), None), None)
        );
        assert_eq!(
            props["role"],
            Schema::enumeration(["ADMIN", "USER"], Some("Access level".into()))
        );
    }

    #[test]
    fn object_schema_of_memberless_type_is_empty() {
        let object = object_schema_for::<String>().unwrap();
        assert!(object.is_empty());
        assert_eq!(object.description(), None);
    }
}
