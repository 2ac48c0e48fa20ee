//! Object field resolver.

use async_graphql::dynamic::{FieldFuture, ResolverContext};
use tracing::warn;

use crate::reflect::{BoxedValue, Instance};
use crate::schema::FieldAccessor;

/// Resolver for fields read from the parent instance.
pub struct FieldResolver;

impl FieldResolver {
    /// Creates a resolver that applies `accessor` to the parent [`Instance`].
    ///
    /// A parent that is not an `Instance`, or an instance of another type,
    /// is reported as a field error rather than resolved to `null`. So is a
    /// missing value on a non-null field or list element, which is what a
    /// non-finite float boxes to.
    pub fn resolve(
        accessor: FieldAccessor,
        nullable: bool,
        element_nullable: bool,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |ctx| {
            let accessor = accessor.clone();
            FieldFuture::new(async move {
                let parent = ctx.parent_value.downcast_ref::<Instance>().ok_or_else(|| {
                    async_graphql::Error::new(format!(
                        "Field {}.{} resolved without a parent instance",
                        accessor.type_name(),
                        accessor.field_name()
                    ))
                })?;

                let value = accessor.read_instance(parent).map_err(|e| {
                    warn!(error = %e, "Accessor rejected parent instance");
                    e.into_graphql()
                })?;

                let missing = (!nullable && value.is_null())
                    || (!element_nullable
                        && matches!(&value, BoxedValue::List(items) if items.iter().any(BoxedValue::is_null)));
                if missing {
                    warn!(
                        type_name = accessor.type_name(),
                        field = accessor.field_name(),
                        "Non-null field produced no value"
                    );
                    return Err(async_graphql::Error::new(format!(
                        "Field {}.{} is non-null but produced no representable value",
                        accessor.type_name(),
                        accessor.field_name()
                    )));
                }
                Ok(value.into_field_value())
            })
        }
    }
}
