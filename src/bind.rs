//! Request binding for synthesized signatures.
//!
//! A [`BindingPlan`] is computed once at registration time: it assigns every
//! request-bound parameter a source (path placeholder, query string, or JSON
//! body). At request time [`BindingPlan::bind`] turns raw request data into
//! ordered [`Arguments`] or a [`BindError`] that renders as a 422 response,
//! in which case the service method is never invoked.

use crate::signature::{Field, ParamDefault, ParamSpec, ParamTy, Scalar, SynthesizedSignature};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

/// A bound argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    List(Vec<ArgValue>),
    Json(Value),
}

impl ArgValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ArgValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            ArgValue::Float(f) => Some(*f),
            ArgValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ArgValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ArgValue]> {
        match self {
            ArgValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Convert to a JSON value, e.g. for echoing the argument back.
    pub fn to_json(&self) -> Value {
        match self {
            ArgValue::Str(s) => json!(s),
            ArgValue::Int(i) => json!(i),
            ArgValue::Float(f) => json!(f),
            ArgValue::Bool(b) => json!(b),
            ArgValue::List(items) => Value::Array(items.iter().map(ArgValue::to_json).collect()),
            ArgValue::Json(v) => v.clone(),
        }
    }
}

/// The bound arguments handed to a method body.
///
/// Entries keep the synthesized signature's declaration order, minus the
/// injected-service parameter, which is resolved separately and popped before
/// the method body runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    entries: Vec<(String, ArgValue)>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: ArgValue) {
        self.entries.push((name.into(), value));
    }

    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ArgValue::as_str)
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(ArgValue::as_int)
    }

    pub fn float(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(ArgValue::as_float)
    }

    pub fn boolean(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(ArgValue::as_bool)
    }

    pub fn json(&self, name: &str) -> Option<&Value> {
        match self.get(name) {
            Some(ArgValue::Json(v)) => Some(v),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArgValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One failed binding, located FastAPI-style: `["query", "param_name"]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BindIssue {
    pub loc: Vec<String>,
    pub msg: String,
}

impl BindIssue {
    fn new(loc: &[&str], msg: impl Into<String>) -> Self {
        Self {
            loc: loc.iter().map(|s| s.to_string()).collect(),
            msg: msg.into(),
        }
    }
}

/// Request data did not bind against the synthesized signature.
#[derive(Debug, Error)]
#[error("request validation failed")]
pub struct BindError {
    issues: Vec<BindIssue>,
}

impl BindError {
    pub fn issues(&self) -> &[BindIssue] {
        &self.issues
    }
}

impl IntoResponse for BindError {
    fn into_response(self) -> Response {
        let status = StatusCode::UNPROCESSABLE_ENTITY;
        let body = Json(json!({
            "statusCode": status.as_u16(),
            "message": self.to_string(),
            "errors": self.issues,
        }));
        (status, body).into_response()
    }
}

/// Where a parameter's value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamSource {
    Path,
    Query,
    Body,
}

/// Per-parameter binding sources for one registered route.
///
/// Parallel to [`SynthesizedSignature::request_params`]; computed once and
/// captured by the forwarding handler.
#[derive(Debug, Clone)]
pub struct BindingPlan {
    sources: Vec<ParamSource>,
}

impl BindingPlan {
    /// Assign sources: `Object` parameters bind from the body, parameters
    /// whose name appears as a `{placeholder}` in the URL bind from the path,
    /// everything else from the query string.
    pub fn new(signature: &SynthesizedSignature, url: &str) -> Self {
        let placeholders = path_placeholders(url);
        let sources = signature
            .request_params()
            .iter()
            .map(|param| match &param.ty {
                ParamTy::Object(_) => ParamSource::Body,
                _ if placeholders.iter().any(|p| p == &param.name) => ParamSource::Path,
                _ => ParamSource::Query,
            })
            .collect();
        Self { sources }
    }

    pub fn source_of(&self, index: usize) -> Option<ParamSource> {
        self.sources.get(index).copied()
    }

    /// Bind raw request data, in signature order. Collects every issue so a
    /// response can report all invalid inputs at once.
    pub fn bind(
        &self,
        signature: &SynthesizedSignature,
        path: &[(String, String)],
        query: &[(String, String)],
        body: &[u8],
    ) -> Result<Arguments, BindError> {
        let mut arguments = Arguments::new();
        let mut issues = Vec::new();

        for (param, source) in signature.request_params().iter().zip(&self.sources) {
            match source {
                ParamSource::Path => match self.bind_path(param, path) {
                    Ok(value) => arguments.push(&param.name, value),
                    Err(issue) => issues.push(issue),
                },
                ParamSource::Query => match self.bind_query(param, query) {
                    Ok(value) => arguments.push(&param.name, value),
                    Err(issue) => issues.push(issue),
                },
                ParamSource::Body => match self.bind_body(param, body) {
                    Ok(value) => arguments.push(&param.name, value),
                    Err(issue) => issues.push(issue),
                },
            }
        }

        if issues.is_empty() {
            Ok(arguments)
        } else {
            Err(BindError { issues })
        }
    }

    fn bind_path(&self, param: &ParamSpec, path: &[(String, String)]) -> Result<ArgValue, BindIssue> {
        let raw = path
            .iter()
            .find(|(name, _)| name == &param.name)
            .map(|(_, value)| value.as_str());
        let Some(raw) = raw else {
            return Err(BindIssue::new(&["path", &param.name], "field required"));
        };
        match &param.ty {
            ParamTy::Scalar(scalar) => parse_scalar(raw, *scalar)
                .map_err(|msg| BindIssue::new(&["path", &param.name], msg)),
            _ => Err(BindIssue::new(
                &["path", &param.name],
                "path parameters must be scalar",
            )),
        }
    }

    fn bind_query(
        &self,
        param: &ParamSpec,
        query: &[(String, String)],
    ) -> Result<ArgValue, BindIssue> {
        let values = query
            .iter()
            .filter(|(name, _)| name == &param.name)
            .map(|(_, value)| value.as_str());

        match &param.ty {
            ParamTy::List(scalar) => {
                // Repeated keys bind in the order given; no keys at all means
                // the empty-collection default.
                let mut items = Vec::new();
                for raw in values {
                    let item = parse_scalar(raw, *scalar)
                        .map_err(|msg| BindIssue::new(&["query", &param.name], msg))?;
                    items.push(item);
                }
                if items.is_empty() && param.default == ParamDefault::Required {
                    return Err(BindIssue::new(&["query", &param.name], "field required"));
                }
                Ok(ArgValue::List(items))
            }
            // Multidict semantics: the last occurrence of a repeated key wins
            // for scalar params.
            ParamTy::Scalar(scalar) => match values.last() {
                Some(raw) => parse_scalar(raw, *scalar)
                    .map_err(|msg| BindIssue::new(&["query", &param.name], msg)),
                None => match &param.default {
                    ParamDefault::Value(value) => Ok(default_to_arg(value)),
                    _ => Err(BindIssue::new(&["query", &param.name], "field required")),
                },
            },
            _ => Err(BindIssue::new(
                &["query", &param.name],
                "unsupported query parameter type",
            )),
        }
    }

    fn bind_body(&self, param: &ParamSpec, body: &[u8]) -> Result<ArgValue, BindIssue> {
        let ParamTy::Object(fields) = &param.ty else {
            return Err(BindIssue::new(
                &["body", &param.name],
                "unsupported body parameter type",
            ));
        };
        if body.is_empty() {
            return match &param.default {
                ParamDefault::Value(value) => Ok(ArgValue::Json(value.clone())),
                _ => Err(BindIssue::new(&["body", &param.name], "field required")),
            };
        }
        let value: Value = serde_json::from_slice(body)
            .map_err(|_| BindIssue::new(&["body", &param.name], "invalid JSON body"))?;
        let Some(object) = value.as_object() else {
            return Err(BindIssue::new(
                &["body", &param.name],
                "JSON object expected",
            ));
        };
        for field in fields {
            if let Some(msg) = check_field(object, field) {
                return Err(BindIssue::new(&["body", &param.name, &field.name], msg));
            }
        }
        Ok(ArgValue::Json(value))
    }
}

fn path_placeholders(url: &str) -> Vec<String> {
    let mut placeholders = Vec::new();
    let mut rest = url;
    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        match after.find('}') {
            Some(end) => {
                placeholders.push(after[..end].to_string());
                rest = &after[end + 1..];
            }
            None => break,
        }
    }
    placeholders
}

fn parse_scalar(raw: &str, scalar: Scalar) -> Result<ArgValue, &'static str> {
    match scalar {
        Scalar::Str => Ok(ArgValue::Str(raw.to_string())),
        Scalar::Int => raw
            .parse::<i64>()
            .map(ArgValue::Int)
            .map_err(|_| "value is not a valid integer"),
        Scalar::Float => raw
            .parse::<f64>()
            .map(ArgValue::Float)
            .map_err(|_| "value is not a valid number"),
        Scalar::Bool => match raw.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(ArgValue::Bool(true)),
            "false" | "0" | "no" | "off" => Ok(ArgValue::Bool(false)),
            _ => Err("value is not a valid boolean"),
        },
    }
}

/// Check one declared field of a body object. Numeric strings coerce to int
/// and float, mirroring the tolerant binding the scenarios expect.
fn check_field(object: &serde_json::Map<String, Value>, field: &Field) -> Option<&'static str> {
    let Some(value) = object.get(&field.name) else {
        return Some("field required");
    };
    match field.ty {
        Scalar::Str => match value {
            Value::String(_) | Value::Number(_) => None,
            _ => Some("str type expected"),
        },
        Scalar::Int => match value {
            Value::Number(n) if n.as_i64().is_some() => None,
            Value::String(s) if s.parse::<i64>().is_ok() => None,
            _ => Some("value is not a valid integer"),
        },
        Scalar::Float => match value {
            Value::Number(_) => None,
            Value::String(s) if s.parse::<f64>().is_ok() => None,
            _ => Some("value is not a valid number"),
        },
        Scalar::Bool => match value {
            Value::Bool(_) => None,
            Value::String(s) => match parse_scalar(s, Scalar::Bool) {
                Ok(_) => None,
                Err(msg) => Some(msg),
            },
            _ => Some("value is not a valid boolean"),
        },
    }
}

fn default_to_arg(value: &Value) -> ArgValue {
    match value {
        Value::String(s) => ArgValue::Str(s.clone()),
        Value::Bool(b) => ArgValue::Bool(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => ArgValue::Int(i),
            None => ArgValue::Float(n.as_f64().unwrap_or(0.0)),
        },
        Value::Array(items) => ArgValue::List(items.iter().map(default_to_arg).collect()),
        other => ArgValue::Json(other.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::{MethodDescriptor, ReturnTy, synthesize};
    use serde_json::json;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn signature_of(descriptor: MethodDescriptor) -> SynthesizedSignature {
        synthesize(&descriptor).unwrap()
    }

    #[test]
    fn test_plan_sources() {
        let signature = signature_of(
            MethodDescriptor::new("service")
                .receiver()
                .param(ParamSpec::required("id", ParamTy::Scalar(Scalar::Int)))
                .param(ParamSpec::required("q", ParamTy::Scalar(Scalar::Str)))
                .param(ParamSpec::required(
                    "payload",
                    ParamTy::Object(vec![Field::new("name", Scalar::Str)]),
                ))
                .returns(ReturnTy::Object),
        );
        let plan = BindingPlan::new(&signature, "/things/{id}");
        assert_eq!(plan.source_of(0), Some(ParamSource::Path));
        assert_eq!(plan.source_of(1), Some(ParamSource::Query));
        assert_eq!(plan.source_of(2), Some(ParamSource::Body));
    }

    #[test]
    fn test_query_scalars_bind_in_signature_order() {
        let signature = signature_of(
            MethodDescriptor::new("service")
                .receiver()
                .param(ParamSpec::required("a", ParamTy::Scalar(Scalar::Str)))
                .param(ParamSpec::required("b", ParamTy::Scalar(Scalar::Int)))
                .returns(ReturnTy::Str),
        );
        let plan = BindingPlan::new(&signature, "/x");
        let args = plan
            .bind(&signature, &[], &pairs(&[("b", "7"), ("a", "hi")]), &[])
            .unwrap();
        let names: Vec<&str> = args.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(args.str("a"), Some("hi"));
        assert_eq!(args.int("b"), Some(7));
    }

    #[test]
    fn test_repeated_scalar_key_last_wins() {
        let signature = signature_of(
            MethodDescriptor::new("service")
                .receiver()
                .param(ParamSpec::required("n", ParamTy::Scalar(Scalar::Int)))
                .returns(ReturnTy::Int),
        );
        let plan = BindingPlan::new(&signature, "/x");
        let args = plan
            .bind(&signature, &[], &pairs(&[("n", "1"), ("n", "2")]), &[])
            .unwrap();
        assert_eq!(args.int("n"), Some(2));
    }

    #[test]
    fn test_missing_required_query_param() {
        let signature = signature_of(
            MethodDescriptor::new("service")
                .receiver()
                .param(ParamSpec::required("n", ParamTy::Scalar(Scalar::Int)))
                .returns(ReturnTy::Int),
        );
        let plan = BindingPlan::new(&signature, "/x");
        let err = plan.bind(&signature, &[], &[], &[]).unwrap_err();
        assert_eq!(err.issues()[0].loc, vec!["query", "n"]);
        assert_eq!(err.issues()[0].msg, "field required");
    }

    #[test]
    fn test_invalid_int_reports_issue() {
        let signature = signature_of(
            MethodDescriptor::new("service")
                .receiver()
                .param(ParamSpec::required("n", ParamTy::Scalar(Scalar::Int)))
                .returns(ReturnTy::Int),
        );
        let plan = BindingPlan::new(&signature, "/x");
        let err = plan
            .bind(&signature, &[], &pairs(&[("n", "abc")]), &[])
            .unwrap_err();
        assert_eq!(err.issues()[0].msg, "value is not a valid integer");
    }

    #[test]
    fn test_repeated_keys_bind_to_list_in_order() {
        let signature = signature_of(
            MethodDescriptor::new("service")
                .receiver()
                .param(ParamSpec::required("items", ParamTy::List(Scalar::Int)))
                .returns(ReturnTy::List(Scalar::Int)),
        );
        let plan = BindingPlan::new(&signature, "/x");
        let args = plan
            .bind(
                &signature,
                &[],
                &pairs(&[("items", "1"), ("items", "2"), ("items", "3")]),
                &[],
            )
            .unwrap();
        assert_eq!(
            args.get("items"),
            Some(&ArgValue::List(vec![
                ArgValue::Int(1),
                ArgValue::Int(2),
                ArgValue::Int(3)
            ]))
        );
    }

    #[test]
    fn test_absent_list_param_binds_empty() {
        let signature = signature_of(
            MethodDescriptor::new("service")
                .receiver()
                .param(ParamSpec::required("items", ParamTy::List(Scalar::Int)))
                .returns(ReturnTy::List(Scalar::Int)),
        );
        let plan = BindingPlan::new(&signature, "/x");
        let args = plan.bind(&signature, &[], &[], &[]).unwrap();
        assert_eq!(args.get("items"), Some(&ArgValue::List(Vec::new())));
    }

    #[test]
    fn test_default_applies_when_omitted() {
        let signature = signature_of(
            MethodDescriptor::new("service")
                .receiver()
                .param(ParamSpec::with_default(
                    "flag",
                    ParamTy::Scalar(Scalar::Bool),
                    json!(true),
                ))
                .returns(ReturnTy::Str),
        );
        let plan = BindingPlan::new(&signature, "/x");

        let args = plan.bind(&signature, &[], &[], &[]).unwrap();
        assert_eq!(args.boolean("flag"), Some(true));

        let args = plan
            .bind(&signature, &[], &pairs(&[("flag", "false")]), &[])
            .unwrap();
        assert_eq!(args.boolean("flag"), Some(false));
    }

    #[test]
    fn test_path_param_type_mismatch() {
        let signature = signature_of(
            MethodDescriptor::new("service")
                .receiver()
                .param(ParamSpec::required("path_param", ParamTy::Scalar(Scalar::Int)))
                .returns(ReturnTy::Int),
        );
        let plan = BindingPlan::new(&signature, "/{path_param}");
        let err = plan
            .bind(&signature, &pairs(&[("path_param", "test")]), &[], &[])
            .unwrap_err();
        assert_eq!(err.issues()[0].loc, vec!["path", "path_param"]);
    }

    #[test]
    fn test_body_object_field_validation() {
        let signature = signature_of(
            MethodDescriptor::new("service")
                .receiver()
                .param(ParamSpec::required(
                    "payload",
                    ParamTy::Object(vec![
                        Field::new("query_str_param", Scalar::Str),
                        Field::new("query_int_param", Scalar::Int),
                    ]),
                ))
                .returns(ReturnTy::Int),
        );
        let plan = BindingPlan::new(&signature, "/x");

        let body = serde_json::to_vec(&json!({
            "query_str_param": "123",
            "query_int_param": 1,
        }))
        .unwrap();
        assert!(plan.bind(&signature, &[], &[], &body).is_ok());

        let body = serde_json::to_vec(&json!({
            "query_str_param": "test",
            "query_int_param": "asdf",
        }))
        .unwrap();
        let err = plan.bind(&signature, &[], &[], &body).unwrap_err();
        assert_eq!(
            err.issues()[0].loc,
            vec!["body", "payload", "query_int_param"]
        );
    }

    #[test]
    fn test_all_issues_collected() {
        let signature = signature_of(
            MethodDescriptor::new("service")
                .receiver()
                .param(ParamSpec::required("a", ParamTy::Scalar(Scalar::Int)))
                .param(ParamSpec::required("b", ParamTy::Scalar(Scalar::Int)))
                .returns(ReturnTy::Int),
        );
        let plan = BindingPlan::new(&signature, "/x");
        let err = plan
            .bind(&signature, &[], &pairs(&[("a", "oops")]), &[])
            .unwrap_err();
        assert_eq!(err.issues().len(), 2);
    }

    #[test]
    fn test_bool_spellings() {
        for (raw, expected) in [("TRUE", true), ("1", true), ("off", false), ("No", false)] {
            assert_eq!(
                parse_scalar(raw, Scalar::Bool).unwrap(),
                ArgValue::Bool(expected)
            );
        }
        assert!(parse_scalar("maybe", Scalar::Bool).is_err());
    }
}
