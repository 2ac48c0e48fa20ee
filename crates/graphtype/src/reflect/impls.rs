//! [`Reflect`] implementations for primitives, optionals and collections.

use std::collections::{BTreeSet, VecDeque};
use std::sync::Arc;

use async_graphql::{Number, Value};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;

use super::{BoxedValue, Instance, Reflect, TypeDescriptor, TypeKind};
use crate::types::ScalarKind;

macro_rules! reflect_scalar {
    ($($ty:ty => $kind:ident, |$v:ident| $to_value:expr;)+) => {
        $(
            impl Reflect for $ty {
                fn descriptor() -> TypeDescriptor {
                    TypeDescriptor::scalar::<Self>(stringify!($ty), ScalarKind::$kind)
                }

                fn to_boxed(&self) -> BoxedValue {
                    let $v = self;
                    BoxedValue::Scalar($to_value)
                }
            }
        )+
    };
}

fn float_value(value: f64) -> Value {
    Number::from_f64(value).map_or(Value::Null, Value::Number)
}

reflect_scalar! {
    String => Text, |v| Value::String(v.clone());
    bool => Boolean, |v| Value::Boolean(*v);
    i8 => SByte, |v| Value::from(*v);
    i16 => Short, |v| Value::from(*v);
    i32 => Int, |v| Value::from(*v);
    i64 => Long, |v| Value::from(*v);
    u8 => Byte, |v| Value::from(*v);
    u16 => UShort, |v| Value::from(*v);
    u32 => UInt, |v| Value::from(*v);
    u64 => ULong, |v| Value::from(*v);
    i128 => BigInt, |v| Value::String(v.to_string());
    u128 => BigInt, |v| Value::String(v.to_string());
    f32 => Float, |v| float_value(f64::from(*v));
    f64 => Float, |v| float_value(*v);
    rust_decimal::Decimal => Decimal, |v| Value::String(v.to_string());
    uuid::Uuid => Uuid, |v| Value::String(v.to_string());
    url::Url => Uri, |v| Value::String(v.to_string());
    time::Date => Date, |v| Value::String(v.to_string());
    time::Time => Time, |v| Value::String(
        v.format(format_description!("[hour]:[minute]:[second]"))
            .unwrap_or_else(|_| v.to_string()),
    );
    time::PrimitiveDateTime => DateTime, |v| Value::String(
        v.format(format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"))
            .unwrap_or_else(|_| v.to_string()),
    );
    time::OffsetDateTime => DateTimeOffset, |v| Value::String(
        v.format(&Rfc3339).unwrap_or_else(|_| v.to_string()),
    );
    time::Duration => Milliseconds, |v| {
        let millis = v.whole_milliseconds();
        i64::try_from(millis).map_or_else(|_| Value::String(millis.to_string()), Value::from)
    };
}

impl<T: Reflect> Reflect for Option<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::optional::<Self>(T::descriptor)
    }

    fn to_boxed(&self) -> BoxedValue {
        match self {
            Some(value) => value.to_boxed(),
            None => BoxedValue::Null,
        }
    }
}

macro_rules! reflect_collection {
    ($($ty:ident),+) => {
        $(
            impl<T: Reflect> Reflect for $ty<T> {
                fn descriptor() -> TypeDescriptor {
                    TypeDescriptor::collection::<Self>(T::descriptor)
                }

                fn to_boxed(&self) -> BoxedValue {
                    BoxedValue::list(self.iter())
                }
            }
        )+
    };
}

reflect_collection!(Vec, VecDeque, BTreeSet);

// Smart pointers are transparent: they describe and box as their pointee.
impl<T: Reflect> Reflect for Box<T> {
    fn descriptor() -> TypeDescriptor {
        T::descriptor()
    }

    fn to_boxed(&self) -> BoxedValue {
        self.as_ref().to_boxed()
    }
}

// A shared composite is boxed by bumping the refcount instead of cloning.
impl<T: Reflect> Reflect for Arc<T> {
    fn descriptor() -> TypeDescriptor {
        T::descriptor()
    }

    fn to_boxed(&self) -> BoxedValue {
        match T::descriptor().kind() {
            TypeKind::Composite(_) => BoxedValue::Object(Instance::from_arc(Arc::clone(self))),
            _ => self.as_ref().to_boxed(),
        }
    }
}
