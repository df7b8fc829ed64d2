//! Descriptors for native Rust types.
use std::collections::{BTreeSet, HashSet, LinkedList, VecDeque};
use std::rc::Rc;
use std::sync::Arc;

use super::{TypeDescriptor, TypeRef};

/// Compile-time structural descriptor for a Rust type.
///
/// Primitives and std collections are covered here. Domain structs and enums
/// implement it by hand:
///
/// ```
/// use type_schema::{Member, Reflect, TypeDescriptor};
///
/// struct WeatherQuery {
///     city: String,
///     days: u8,
/// }
///
/// impl Reflect for WeatherQuery {
///     fn descriptor() -> TypeDescriptor {
///         TypeDescriptor::structured("WeatherQuery")
///             .describe(["Forecast request"])
///             .member(Member::of::<String>("city").describe(["City name"]))
///             .member(Member::of::<u8>("days"))
///     }
/// }
///
/// let schema = type_schema::schema_for::<WeatherQuery>().unwrap();
/// assert_eq!(schema.type_name(), "object");
/// ```
pub trait Reflect {
    fn descriptor() -> TypeDescriptor;

    /// Generic arguments, for collection types.
    fn type_args() -> Vec<TypeRef> {
        Vec::new()
    }
}

macro_rules! reflect_scalar {
    ($ctor:ident: $($ty:ty),+ $(,)?) => {
        $(
            impl Reflect for $ty {
                fn descriptor() -> TypeDescriptor {
                    TypeDescriptor::$ctor(stringify!($ty))
                }
            }
        )+
    };
}

reflect_scalar!(string: String, str, char);
reflect_scalar!(integer: i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
reflect_scalar!(number: f32, f64);
reflect_scalar!(boolean: bool);

impl<T: Reflect + 'static> Reflect for [T] {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::collection("Slice")
    }
    fn type_args() -> Vec<TypeRef> {
        vec![TypeRef::of::<T>()]
    }
}

impl<T: Reflect + 'static> Reflect for Vec<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::collection("Vec")
    }
    fn type_args() -> Vec<TypeRef> {
        vec![TypeRef::of::<T>()]
    }
}

impl<T: Reflect + 'static> Reflect for VecDeque<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::collection("VecDeque")
    }
    fn type_args() -> Vec<TypeRef> {
        vec![TypeRef::of::<T>()]
    }
}

impl<T: Reflect + 'static> Reflect for LinkedList<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::collection("LinkedList")
    }
    fn type_args() -> Vec<TypeRef> {
        vec![TypeRef::of::<T>()]
    }
}

impl<T: Reflect + 'static, S> Reflect for HashSet<T, S> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::collection("HashSet")
    }
    fn type_args() -> Vec<TypeRef> {
        vec![TypeRef::of::<T>()]
    }
}

impl<T: Reflect + 'static> Reflect for BTreeSet<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::collection("BTreeSet")
    }
    fn type_args() -> Vec<TypeRef> {
        vec![TypeRef::of::<T>()]
    }
}

impl<T: Reflect + 'static, const N: usize> Reflect for [T; N] {
    fn descriptor() -> TypeDescriptor {
        let component = TypeRef::of::<T>();
        TypeDescriptor::array(format!("[{}; {N}]", component.name()), component)
    }
}

// Wrappers and references take the shape of what they point at.

macro_rules! reflect_transparent {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl<T: Reflect + ?Sized> Reflect for $ty {
                fn descriptor() -> TypeDescriptor {
                    T::descriptor()
                }
                fn type_args() -> Vec<TypeRef> {
                    T::type_args()
                }
            }
        )+
    };
}

reflect_transparent!(Box<T>, Rc<T>, Arc<T>, &T);

/// `Option<T>` describes the same shape as `T`; nullability is not modelled.
impl<T: Reflect> Reflect for Option<T> {
    fn descriptor() -> TypeDescriptor {
        T::descriptor()
    }
    fn type_args() -> Vec<TypeRef> {
        T::type_args()
    }
}
