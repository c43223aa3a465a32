use crate::error::{Result, SimplewireError};
use dashmap::DashMap;
use std::any::{Any, TypeId};
use std::sync::Arc;

/// Type alias for a provider function that constructs a service instance.
/// The produced value is an `Arc<T>` erased to `Arc<dyn Any>`.
type ProviderFn = Arc<dyn Fn() -> Arc<dyn Any + Send + Sync> + Send + Sync>;

/// Thread-safe dependency injection container.
///
/// Unlike a singleton registry, the container stores *providers*: every
/// [`resolve`](Container::resolve) call invokes the registered provider and
/// yields a fresh instance. This is what the forwarding handlers rely on to
/// get a per-request service instance.
pub struct Container {
    providers: DashMap<TypeId, ProviderEntry>,
}

impl Clone for Container {
    fn clone(&self) -> Self {
        Self {
            providers: self.providers.clone(),
        }
    }
}

#[derive(Clone)]
struct ProviderEntry {
    provider: ProviderFn,
}

impl Container {
    pub fn new() -> Self {
        Self {
            providers: DashMap::new(),
        }
    }

    /// Register a zero-argument-constructible service type.
    pub fn register<T: Default + 'static + Send + Sync>(&mut self) -> &mut Self {
        self.register_with(T::default)
    }

    /// Register a service type with an explicit factory.
    pub fn register_with<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: 'static + Send + Sync,
        F: Fn() -> T + 'static + Send + Sync,
    {
        let type_id = TypeId::of::<T>();
        let entry = ProviderEntry {
            provider: Arc::new(move || Arc::new(factory())),
        };
        self.providers.insert(type_id, entry);
        self
    }

    /// Construct an instance of `T` by invoking its registered provider.
    pub fn resolve<T: 'static + Send + Sync>(&self) -> Result<Arc<T>> {
        let requested_type_id = TypeId::of::<T>();
        let entry = self.providers.get(&requested_type_id).ok_or_else(|| {
            SimplewireError::DependencyNotFound {
                type_name: std::any::type_name::<T>().to_string(),
            }
        })?;
        (entry.provider)()
            .downcast::<T>()
            .map_err(|_| SimplewireError::DowncastFailed {
                type_name: std::any::type_name::<T>().to_string(),
            })
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.providers.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}
