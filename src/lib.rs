//! # Simplewire
//!
//! Auto-generate axum routes from declarative service method descriptors.
//!
//! Simplewire wires a plain service type's methods to an axum [`Router`](axum::Router)
//! with FastAPI-style parameter binding: describe a method's parameters once,
//! and [`register`] mounts a forwarding handler that binds path, query and
//! body inputs against that description, resolves a fresh service instance
//! from the DI container, and delegates to the method body.
//!
//! ## How a route is built
//!
//! 1. The service declares its methods in a [`MethodTable`]: one
//!    [`MethodDescriptor`] (parameter names, type tags, defaults, return
//!    type) plus one typed async body per method.
//! 2. [`register`] synthesizes the route signature: the receiver parameter is
//!    dropped, sequence-typed parameters gain an empty-collection default so
//!    repeated query keys bind to a list, and a trailing injected-service
//!    parameter is appended.
//! 3. A forwarding handler closing over that signature is mounted under the
//!    requested verb and path. Per request it binds arguments (422 on
//!    mismatch, without invoking the method), resolves the service through
//!    the container's provider, pops the service argument and calls the
//!    method body, returning its value as JSON.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use simplewire::{Container, ContainerBuilder, HasContainer, register};
//! use simplewire::service::{MethodTable, Service};
//! use simplewire::signature::{MethodDescriptor, ReturnTy};
//! use axum::Router;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! // 1. Define your service
//! struct SimpleService {
//!     service_name: String,
//! }
//!
//! impl Default for SimpleService {
//!     fn default() -> Self {
//!         Self { service_name: "Simple Service".to_string() }
//!     }
//! }
//!
//! // 2. Declare its exposable methods
//! impl Service for SimpleService {
//!     fn methods() -> MethodTable<Self> {
//!         MethodTable::new().method(
//!             MethodDescriptor::new("get_name").receiver().returns(ReturnTy::Str),
//!             |service: Arc<SimpleService>, _args| async move { json!(service.service_name) },
//!         )
//!     }
//! }
//!
//! // 3. Provide the container through the router state
//! #[derive(Clone)]
//! struct AppState {
//!     container: Arc<Container>,
//! }
//!
//! impl HasContainer for AppState {
//!     fn get_container(&self) -> &Container {
//!         &self.container
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let container = ContainerBuilder::new().register::<SimpleService>().build();
//!     let state = AppState { container: Arc::new(container) };
//!
//!     let simple = register::<SimpleService, AppState>(
//!         Router::new(),
//!         "get",
//!         "/get_name",
//!         "get_name",
//!     )
//!     .expect("route registration failed");
//!
//!     let app: Router = Router::new().nest("/simple", simple).with_state(state);
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```

pub mod bind;
pub mod di;
pub mod error;
pub mod register;
pub mod service;
pub mod signature;

// Re-export core types
pub use bind::{ArgValue, Arguments, BindError, BindingPlan};
pub use di::{Container, ContainerBuilder, HasContainer, Inject};
pub use error::{Result, SimplewireError};
pub use register::register;
pub use service::{MethodTable, Service};
pub use signature::{MethodDescriptor, ParamSpec, ParamTy, ReturnTy, Scalar, synthesize};

// Re-export commonly used types from dependencies
pub use async_trait::async_trait;
pub use axum;

/// Prelude module for convenient imports
///
/// ```
/// use simplewire::prelude::*;
/// ```
pub mod prelude {
    pub use crate::bind::{ArgValue, Arguments, BindError, BindingPlan};
    pub use crate::di::{Container, ContainerBuilder, HasContainer, Inject};
    pub use crate::error::{Result, SimplewireError};
    pub use crate::register::register;
    pub use crate::service::{MethodFn, MethodTable, Service};
    pub use crate::signature::{
        Field, MethodDescriptor, ParamDefault, ParamSpec, ParamTy, ReturnTy, Scalar,
        SynthesizedSignature, synthesize,
    };
    pub use async_trait::async_trait;
    pub use axum::{
        Json, Router,
        extract::{Path, Query, State},
        http::StatusCode,
        response::{IntoResponse, Response},
    };
    pub use std::sync::Arc;
}
