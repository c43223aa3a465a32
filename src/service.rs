//! Compile-time method tables for exposable services.
//!
//! Where a reflective framework would look a method up by name on a live
//! object, a [`Service`] declares its exposable methods once: each entry
//! pairs a [`MethodDescriptor`] with a typed async method function. The name
//! is only used as the lookup key at registration time; every method body is
//! compile-time bound.

use crate::bind::Arguments;
use crate::signature::MethodDescriptor;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Boxed future returned by a method function.
pub type MethodFuture = Pin<Box<dyn Future<Output = Value> + Send>>;

/// A method body: takes the per-request service instance and the bound
/// arguments, returns the response value.
pub type MethodFn<S> = Arc<dyn Fn(Arc<S>, Arguments) -> MethodFuture + Send + Sync>;

/// Trait for service types whose methods can be wired to routes.
///
/// # Example
/// ```
/// use simplewire::service::{MethodTable, Service};
/// use simplewire::signature::{MethodDescriptor, ReturnTy};
/// use serde_json::json;
/// use std::sync::Arc;
///
/// #[derive(Default)]
/// struct SimpleService {
///     service_name: String,
/// }
///
/// impl Service for SimpleService {
///     fn methods() -> MethodTable<Self> {
///         MethodTable::new().method(
///             MethodDescriptor::new("get_name").receiver().returns(ReturnTy::Str),
///             |service: Arc<SimpleService>, _args| async move { json!(service.service_name) },
///         )
///     }
/// }
/// ```
pub trait Service: Send + Sync + Sized + 'static {
    /// Declarative table of this service's exposable methods.
    fn methods() -> MethodTable<Self>;
}

/// One exposable method: its descriptor plus its body.
pub struct MethodEntry<S> {
    descriptor: MethodDescriptor,
    call: MethodFn<S>,
}

impl<S> MethodEntry<S> {
    pub fn descriptor(&self) -> &MethodDescriptor {
        &self.descriptor
    }

    pub fn method_fn(&self) -> MethodFn<S> {
        Arc::clone(&self.call)
    }
}

/// Ordered collection of a service's exposable methods.
pub struct MethodTable<S> {
    entries: Vec<MethodEntry<S>>,
}

impl<S> MethodTable<S> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add a method. `body` receives the per-request service instance and the
    /// bound arguments (the injected-service argument already popped).
    pub fn method<F, Fut>(mut self, descriptor: MethodDescriptor, body: F) -> Self
    where
        F: Fn(Arc<S>, Arguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Value> + Send + 'static,
    {
        self.entries.push(MethodEntry {
            descriptor,
            call: Arc::new(move |service, args| Box::pin(body(service, args))),
        });
        self
    }

    pub fn get(&self, name: &str) -> Option<&MethodEntry<S>> {
        self.entries.iter().find(|e| e.descriptor.name() == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S> Default for MethodTable<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::ReturnTy;
    use serde_json::json;

    #[derive(Default)]
    struct EchoService;

    impl Service for EchoService {
        fn methods() -> MethodTable<Self> {
            MethodTable::new()
                .method(
                    MethodDescriptor::new("ping").receiver().returns(ReturnTy::Str),
                    |_service, _args| async { json!("pong") },
                )
                .method(
                    MethodDescriptor::new("pong").receiver().returns(ReturnTy::Str),
                    |_service, _args| async { json!("ping") },
                )
        }
    }

    #[tokio::test]
    async fn test_lookup_and_invoke() {
        let table = EchoService::methods();
        assert_eq!(table.len(), 2);
        let entry = table.get("ping").unwrap();
        let call = entry.method_fn();
        let value = call(Arc::new(EchoService), Arguments::new()).await;
        assert_eq!(value, json!("pong"));
    }

    #[test]
    fn test_unknown_name_is_none() {
        assert!(EchoService::methods().get("missing").is_none());
    }
}
