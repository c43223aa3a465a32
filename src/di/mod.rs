mod builder;
mod container;
mod extractor;

pub use builder::ContainerBuilder;
pub use container::Container;
pub use extractor::{HasContainer, Inject};
