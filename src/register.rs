//! Route registration: wire one service method to one router entry.

use crate::bind::BindingPlan;
use crate::di::HasContainer;
use crate::error::{Result, SimplewireError};
use crate::service::Service;
use crate::signature::synthesize;
use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, RawPathParams, State},
    response::IntoResponse,
    routing,
};
use std::sync::Arc;

/// Register a forwarding route for `method_name` of service `S`.
///
/// Runs once at startup: looks the method up in [`S::methods`](Service::methods),
/// synthesizes its signature, computes the binding plan for `url`, and mounts
/// a forwarding handler under the given HTTP verb. The handler binds each
/// request against the synthesized signature, resolves a fresh `S` from the
/// state's container, pops the service argument and delegates to the method
/// body, returning its value as JSON.
///
/// Every error this function returns is a setup-time failure; the caller
/// should abort startup rather than serve a broken route.
///
/// # Example
/// ```ignore
/// let router = register::<SimpleService, AppState>(router, "get", "/get_name", "get_name")?;
/// ```
pub fn register<S, T>(
    router: Router<T>,
    http_method: &str,
    url: &str,
    method_name: &str,
) -> Result<Router<T>>
where
    S: Service,
    T: HasContainer + Clone + Send + Sync + 'static,
{
    let table = S::methods();
    let entry = table
        .get(method_name)
        .ok_or_else(|| SimplewireError::UnknownMethod {
            service: short_type_name::<S>().to_string(),
            method: method_name.to_string(),
        })?;

    let signature = Arc::new(synthesize(entry.descriptor())?);
    let plan = Arc::new(BindingPlan::new(&signature, url));
    let call = entry.method_fn();
    let return_ty = signature.return_ty().clone();

    let handler = {
        let signature = Arc::clone(&signature);
        move |State(state): State<T>,
              raw_path: RawPathParams,
              Query(query): Query<Vec<(String, String)>>,
              body: Bytes| {
            let signature = Arc::clone(&signature);
            let plan = Arc::clone(&plan);
            let call = Arc::clone(&call);
            async move {
                let path: Vec<(String, String)> = raw_path
                    .iter()
                    .map(|(name, value)| (name.to_string(), value.to_string()))
                    .collect();
                let arguments = match plan.bind(&signature, &path, &query, &body) {
                    Ok(arguments) => arguments,
                    Err(err) => return err.into_response(),
                };
                // Fresh instance per request, via the container's provider.
                let service = match state.get_container().resolve::<S>() {
                    Ok(service) => service,
                    Err(err) => return err.into_response(),
                };
                Json(call(service, arguments).await).into_response()
            }
        }
    };

    let verb = http_method.to_ascii_lowercase();
    let route = match verb.as_str() {
        "get" => routing::get(handler),
        "post" => routing::post(handler),
        "put" => routing::put(handler),
        "delete" => routing::delete(handler),
        "patch" => routing::patch(handler),
        _ => {
            return Err(SimplewireError::UnsupportedVerb {
                verb: http_method.to_string(),
            });
        }
    };

    tracing::debug!(
        verb = %verb,
        url,
        service = short_type_name::<S>(),
        method = method_name,
        operation = %snake_to_pascal(method_name),
        returns = %return_ty,
        "registered route"
    );

    Ok(router.route(url, route))
}

/// Convert snake case to pascal case, for operation display names.
pub fn snake_to_pascal(snake_case: &str) -> String {
    snake_case
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

fn short_type_name<S>() -> &'static str {
    let full = std::any::type_name::<S>();
    full.rsplit("::").next().unwrap_or(full)
}
