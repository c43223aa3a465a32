use crate::di::Container;

/// Builder for constructing a dependency injection container.
///
/// Use this to register service providers before building the final
/// container handed to the application state.
///
/// # Example
/// ```
/// use simplewire::ContainerBuilder;
///
/// #[derive(Default)]
/// struct UserService;
///
/// let container = ContainerBuilder::new()
///     .register::<UserService>()
///     .build();
/// assert!(container.contains::<UserService>());
/// ```
pub struct ContainerBuilder {
    container: Container,
}

impl ContainerBuilder {
    pub fn new() -> Self {
        Self {
            container: Container::new(),
        }
    }

    /// Register a zero-argument-constructible service type.
    pub fn register<T: Default + 'static + Send + Sync>(mut self) -> Self {
        self.container.register::<T>();
        self
    }

    /// Register a service type with an explicit factory.
    pub fn register_with<T, F>(mut self, factory: F) -> Self
    where
        T: 'static + Send + Sync,
        F: Fn() -> T + 'static + Send + Sync,
    {
        self.container.register_with(factory);
        self
    }

    pub fn build(self) -> Container {
        self.container
    }
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
