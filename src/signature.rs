//! Declarative method signatures and the synthesis step that turns them into
//! route-ready parameter lists.
//!
//! A [`MethodDescriptor`] is the statically-typed stand-in for runtime
//! callable introspection: the service author declares each parameter's name,
//! type tag and default once, and [`synthesize`] derives the signature the
//! forwarding handler binds requests against.

use crate::error::{Result, SimplewireError};

/// Conventional receiver parameter name, dropped during synthesis.
pub const RECEIVER_PARAM: &str = "self";

/// Reserved name of the appended injected-service parameter.
pub const SERVICE_PARAM: &str = "service";

/// Scalar parameter types bindable from a single path/query value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scalar {
    Str,
    Int,
    Float,
    Bool,
}

/// A declared field of an [`ParamTy::Object`] body parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub ty: Scalar,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: Scalar) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Declared type of a method parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamTy {
    Scalar(Scalar),
    /// A sequence of repeated values, bound from repeated query keys.
    List(Scalar),
    /// A structured value bound from the JSON request body.
    Object(Vec<Field>),
    /// The owning service type. Used by the receiver and by the appended
    /// service parameter; never bound from request data.
    Owner,
}

impl ParamTy {
    pub fn is_sequence(&self) -> bool {
        matches!(self, ParamTy::List(_))
    }
}

/// Default behavior of a parameter when the request omits it.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamDefault {
    Required,
    Value(serde_json::Value),
    /// Empty-collection default: zero or more repeated query keys bind to a
    /// (possibly empty) list.
    EmptyList,
    /// Resolved through the DI container rather than from request data.
    Injected,
}

/// One parameter of a method signature.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: String,
    pub ty: ParamTy,
    pub default: ParamDefault,
}

impl ParamSpec {
    pub fn required(name: impl Into<String>, ty: ParamTy) -> Self {
        Self {
            name: name.into(),
            ty,
            default: ParamDefault::Required,
        }
    }

    pub fn with_default(name: impl Into<String>, ty: ParamTy, default: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            ty,
            default: ParamDefault::Value(default),
        }
    }
}

/// Declared return type, recorded on the registration for response-shape
/// declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum ReturnTy {
    Str,
    Int,
    Float,
    Bool,
    List(Scalar),
    Object,
}

impl std::fmt::Display for ReturnTy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ReturnTy::Str => "str",
            ReturnTy::Int => "int",
            ReturnTy::Float => "float",
            ReturnTy::Bool => "bool",
            ReturnTy::List(Scalar::Str) => "list[str]",
            ReturnTy::List(Scalar::Int) => "list[int]",
            ReturnTy::List(Scalar::Float) => "list[float]",
            ReturnTy::List(Scalar::Bool) => "list[bool]",
            ReturnTy::Object => "object",
        };
        f.write_str(name)
    }
}

/// Declarative description of an exposable service method.
///
/// Built once per method in [`Service::methods`](crate::service::Service::methods);
/// immutable afterwards.
///
/// # Example
/// ```
/// use simplewire::signature::{MethodDescriptor, ParamSpec, ParamTy, ReturnTy, Scalar};
///
/// let descriptor = MethodDescriptor::new("get_dict")
///     .receiver()
///     .param(ParamSpec::required("key", ParamTy::Scalar(Scalar::Str)))
///     .param(ParamSpec::required("value", ParamTy::Scalar(Scalar::Int)))
///     .returns(ReturnTy::Object);
/// assert_eq!(descriptor.name(), "get_dict");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDescriptor {
    name: String,
    params: Vec<ParamSpec>,
    returns: ReturnTy,
    opaque: bool,
}

impl MethodDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            returns: ReturnTy::Object,
            opaque: false,
        }
    }

    /// Describe a method whose parameter list is not inspectable, e.g. a raw
    /// passthrough. Synthesis fails on such descriptors.
    pub fn opaque(name: impl Into<String>) -> Self {
        Self {
            opaque: true,
            ..Self::new(name)
        }
    }

    /// Declare the receiver parameter. Dropped during synthesis.
    pub fn receiver(mut self) -> Self {
        self.params.insert(
            0,
            ParamSpec {
                name: RECEIVER_PARAM.to_string(),
                ty: ParamTy::Owner,
                default: ParamDefault::Required,
            },
        );
        self
    }

    pub fn param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }

    pub fn returns(mut self, returns: ReturnTy) -> Self {
        self.returns = returns;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    pub fn return_ty(&self) -> &ReturnTy {
        &self.returns
    }
}

/// The parameter list a forwarding handler is registered with.
///
/// Derived from a [`MethodDescriptor`] by [`synthesize`]; owned by the
/// handler closure and read-only for the lifetime of the route.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesizedSignature {
    method: String,
    params: Vec<ParamSpec>,
    returns: ReturnTy,
}

impl SynthesizedSignature {
    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// The parameters bound from request data, i.e. everything except the
    /// trailing injected-service parameter.
    pub fn request_params(&self) -> &[ParamSpec] {
        &self.params[..self.params.len() - 1]
    }

    pub fn return_ty(&self) -> &ReturnTy {
        &self.returns
    }
}

/// Derive the route-ready signature for a method.
///
/// Drops the receiver parameter, rewrites sequence-typed parameters to the
/// empty-collection repeated-query default, appends the injected-service
/// parameter, and carries the return type through unchanged. Pure; performs
/// no validation beyond rejecting opaque descriptors.
pub fn synthesize(descriptor: &MethodDescriptor) -> Result<SynthesizedSignature> {
    if descriptor.opaque {
        return Err(SimplewireError::Introspection {
            method: descriptor.name.clone(),
        });
    }

    let mut params: Vec<ParamSpec> = Vec::with_capacity(descriptor.params.len() + 1);
    for param in &descriptor.params {
        if param.name == RECEIVER_PARAM {
            continue;
        }
        let mut param = param.clone();
        if param.ty.is_sequence() {
            param.default = ParamDefault::EmptyList;
        }
        params.push(param);
    }

    params.push(ParamSpec {
        name: SERVICE_PARAM.to_string(),
        ty: ParamTy::Owner,
        default: ParamDefault::Injected,
    });

    Ok(SynthesizedSignature {
        method: descriptor.name.clone(),
        params,
        returns: descriptor.returns.clone(),
    })
}
