//! Root query field resolver.

use std::sync::Arc;

use async_graphql::dynamic::{FieldFuture, FieldValue, ResolverContext};
use tracing::{debug, warn};

use super::{DataSource, QueryArguments};

/// Shape a root field returns its instances in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootShape {
    /// Every fetched instance, as a list.
    List,
    /// The first fetched instance. An empty result is `null` when the field
    /// is nullable and an error otherwise.
    Single { nullable: bool },
}

/// Resolver for root query fields.
pub struct RootResolver;

impl RootResolver {
    /// Creates a resolver that fetches from `source` and shapes the result.
    pub fn resolve(
        field_name: String,
        source: Arc<dyn DataSource>,
        shape: RootShape,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |ctx| {
            let field_name = field_name.clone();
            let source = source.clone();
            FieldFuture::new(async move {
                let args = QueryArguments::from_index_map(ctx.args.as_index_map());
                debug!(field = %field_name, arguments = args.len(), "Resolving root field");

                let instances = source.fetch(&args).await.map_err(|e| {
                    warn!(field = %field_name, error = %e, "Data source failed");
                    e.into_graphql()
                })?;

                match shape {
                    RootShape::List => Ok(Some(FieldValue::list(
                        instances.into_iter().map(FieldValue::owned_any),
                    ))),
                    RootShape::Single { nullable } => match instances.into_iter().next() {
                        Some(instance) => Ok(Some(FieldValue::owned_any(instance))),
                        None if nullable => Ok(None),
                        None => Err(async_graphql::Error::new(format!(
                            "Root field {field_name} found no instance"
                        ))),
                    },
                }
            })
        }
    }
}
