//! Endpoint declarations.
//!
//! Feature modules declare typed [`QueryEndpoint`]s and [`MutationEndpoint`]s
//! as constants. At startup each declaration is erased into an
//! [`EndpointDefinition`] and collected into the [`EndpointRegistry`]; every
//! invocation resolves its endpoint through the registry by name, so an
//! overriding declaration takes effect everywhere.

mod registry;

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::cache::{Tag, TagType};
use crate::transport::{ApiError, ApiRequest};

pub use registry::{EndpointRegistry, RegistryBuilder};

/// Type-erased endpoint arguments.
pub type Args = dyn Any + Send + Sync;
/// Type-erased decoded response payload.
pub type Payload = dyn Any + Send + Sync;

type BuildRequest = dyn Fn(&Args) -> Result<ApiRequest, ApiError> + Send + Sync;
type Decode = dyn Fn(Value) -> Result<Box<Payload>, ApiError> + Send + Sync;
type ResolveTags = dyn Fn(&Args, Option<&Payload>) -> Vec<Tag> + Send + Sync;

/// Tags an endpoint provides (queries) or invalidates (mutations).
pub enum TagSpec<A, T> {
    None,
    /// Fixed, type-only tags.
    Types(&'static [TagType]),
    /// Tags computed from the arguments and, when available, the result.
    Compute(fn(&A, Option<&T>) -> Vec<Tag>),
}

impl<A, T> Clone for TagSpec<A, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A, T> Copy for TagSpec<A, T> {}

impl<A, T> TagSpec<A, T> {
    pub fn resolve(&self, args: &A, result: Option<&T>) -> Vec<Tag> {
        match self {
            TagSpec::None => Vec::new(),
            TagSpec::Types(types) => types.iter().copied().map(Tag::ByType).collect(),
            TagSpec::Compute(compute) => compute(args, result),
        }
    }
}

/// A read endpoint whose results are cached and tagged.
pub struct QueryEndpoint<A, T> {
    name: &'static str,
    request: fn(&A) -> Result<ApiRequest, ApiError>,
    provides: TagSpec<A, T>,
    _types: PhantomData<fn(&A) -> T>,
}

impl<A, T> QueryEndpoint<A, T> {
    pub const fn new(
        name: &'static str,
        request: fn(&A) -> Result<ApiRequest, ApiError>,
        provides: TagSpec<A, T>,
    ) -> Self {
        Self {
            name,
            request,
            provides,
            _types: PhantomData,
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub fn request(&self, args: &A) -> Result<ApiRequest, ApiError> {
        (self.request)(args)
    }

    pub fn provided_tags(&self, args: &A, result: Option<&T>) -> Vec<Tag> {
        self.provides.resolve(args, result)
    }
}

impl<A, T> QueryEndpoint<A, T>
where
    A: Send + Sync + 'static,
    T: DeserializeOwned + Send + Sync + 'static,
{
    pub fn definition(&self) -> EndpointDefinition {
        let name = self.name;
        let request = self.request;
        let provides = self.provides;
        EndpointDefinition::Query(Arc::new(QueryDefinition {
            name,
            request: Box::new(move |args| request(downcast_args::<A>(name, args)?)),
            decode: Box::new(decode_boxed::<T>),
            provides: Box::new(move |args, payload| match args.downcast_ref::<A>() {
                Some(args) => provides.resolve(args, payload.and_then(|p| p.downcast_ref::<T>())),
                None => Vec::new(),
            }),
        }))
    }
}

/// A write endpoint; success invalidates its tags.
pub struct MutationEndpoint<A, T> {
    name: &'static str,
    request: fn(&A) -> Result<ApiRequest, ApiError>,
    invalidates: TagSpec<A, T>,
    _types: PhantomData<fn(&A) -> T>,
}

impl<A, T> MutationEndpoint<A, T> {
    pub const fn new(
        name: &'static str,
        request: fn(&A) -> Result<ApiRequest, ApiError>,
        invalidates: TagSpec<A, T>,
    ) -> Self {
        Self {
            name,
            request,
            invalidates,
            _types: PhantomData,
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub fn request(&self, args: &A) -> Result<ApiRequest, ApiError> {
        (self.request)(args)
    }

    pub fn invalidated_tags(&self, args: &A, result: &T) -> Vec<Tag> {
        self.invalidates.resolve(args, Some(result))
    }
}

impl<A, T> MutationEndpoint<A, T>
where
    A: Send + Sync + 'static,
    T: DeserializeOwned + Send + Sync + 'static,
{
    pub fn definition(&self) -> EndpointDefinition {
        let name = self.name;
        let request = self.request;
        let invalidates = self.invalidates;
        EndpointDefinition::Mutation(Arc::new(MutationDefinition {
            name,
            request: Box::new(move |args| request(downcast_args::<A>(name, args)?)),
            decode: Box::new(decode_boxed::<T>),
            invalidates: Box::new(move |args, payload| match args.downcast_ref::<A>() {
                Some(args) => {
                    invalidates.resolve(args, payload.and_then(|p| p.downcast_ref::<T>()))
                }
                None => Vec::new(),
            }),
        }))
    }
}

/// Erased query declaration held by the registry.
pub struct QueryDefinition {
    name: &'static str,
    request: Box<BuildRequest>,
    decode: Box<Decode>,
    provides: Box<ResolveTags>,
}

impl QueryDefinition {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn build_request(&self, args: &Args) -> Result<ApiRequest, ApiError> {
        (self.request)(args)
    }

    pub(crate) fn decode(&self, value: Value) -> Result<Box<Payload>, ApiError> {
        (self.decode)(value)
    }

    pub(crate) fn provided_tags(&self, args: &Args, payload: Option<&Payload>) -> Vec<Tag> {
        (self.provides)(args, payload)
    }
}

/// Erased mutation declaration held by the registry.
pub struct MutationDefinition {
    name: &'static str,
    request: Box<BuildRequest>,
    decode: Box<Decode>,
    invalidates: Box<ResolveTags>,
}

impl MutationDefinition {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn build_request(&self, args: &Args) -> Result<ApiRequest, ApiError> {
        (self.request)(args)
    }

    pub(crate) fn decode(&self, value: Value) -> Result<Box<Payload>, ApiError> {
        (self.decode)(value)
    }

    pub(crate) fn invalidated_tags(&self, args: &Args, payload: &Payload) -> Vec<Tag> {
        (self.invalidates)(args, Some(payload))
    }
}

#[derive(Clone)]
pub enum EndpointDefinition {
    Query(Arc<QueryDefinition>),
    Mutation(Arc<MutationDefinition>),
}

impl EndpointDefinition {
    pub fn name(&self) -> &'static str {
        match self {
            EndpointDefinition::Query(def) => def.name,
            EndpointDefinition::Mutation(def) => def.name,
        }
    }

    pub fn kind(&self) -> EndpointKind {
        match self {
            EndpointDefinition::Query(_) => EndpointKind::Query,
            EndpointDefinition::Mutation(_) => EndpointKind::Mutation,
        }
    }
}

impl fmt::Debug for EndpointDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointDefinition")
            .field("name", &self.name())
            .field("kind", &self.kind())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointKind {
    Query,
    Mutation,
}

impl fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndpointKind::Query => f.write_str("query"),
            EndpointKind::Mutation => f.write_str("mutation"),
        }
    }
}

/// Decode a response body, unwrapping the `{ "data": ... }` envelope when present.
pub fn decode_payload<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    let inner = match value {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    };
    serde_json::from_value(inner).map_err(|e| ApiError::Parse(e.to_string()))
}

fn decode_boxed<T>(value: Value) -> Result<Box<Payload>, ApiError>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    decode_payload::<T>(value).map(|payload| Box::new(payload) as Box<Payload>)
}

fn downcast_args<'a, A: 'static>(name: &str, args: &'a Args) -> Result<&'a A, ApiError> {
    args.downcast_ref::<A>()
        .ok_or_else(|| ApiError::request(format!("arguments do not match endpoint `{name}`")))
}

#[cfg(test)]
mod tests {
    use deptportal_api_types::NoArgs;
    use serde_json::json;

    use super::*;

    fn list_request(_: &NoArgs) -> Result<ApiRequest, ApiError> {
        Ok(ApiRequest::get("content/notices"))
    }

    fn item_tags(args: &String, _: Option<&Vec<String>>) -> Vec<Tag> {
        vec![Tag::id(TagType::Notice, args.clone())]
    }

    fn item_request(id: &String) -> Result<ApiRequest, ApiError> {
        Ok(ApiRequest::get(format!("content/notices/{id}")))
    }

    const LIST: QueryEndpoint<NoArgs, Vec<String>> =
        QueryEndpoint::new("list", list_request, TagSpec::Types(&[TagType::Notice]));
    const ITEM: QueryEndpoint<String, Vec<String>> =
        QueryEndpoint::new("item", item_request, TagSpec::Compute(item_tags));

    #[test]
    fn decode_unwraps_envelope() {
        let value: Vec<u8> = decode_payload(json!({"data": [1, 2]})).expect("decode");
        assert_eq!(value, vec![1, 2]);
    }

    #[test]
    fn decode_accepts_bare_bodies() {
        let value: Vec<u8> = decode_payload(json!([3])).expect("decode");
        assert_eq!(value, vec![3]);
        let err = decode_payload::<Vec<u8>>(json!({"data": "nope"})).expect_err("mismatch");
        assert!(matches!(err, ApiError::Parse(_)));
    }

    #[test]
    fn static_and_computed_tags() {
        assert_eq!(
            LIST.provided_tags(&NoArgs::default(), None),
            vec![Tag::of(TagType::Notice)]
        );
        assert_eq!(
            ITEM.provided_tags(&"n1".to_string(), None),
            vec![Tag::id(TagType::Notice, "n1")]
        );
    }

    #[test]
    fn erased_definition_round_trips_arguments() {
        let EndpointDefinition::Query(def) = ITEM.definition() else {
            panic!("query expected");
        };
        let args: Box<Args> = Box::new("n9".to_string());
        let request = def.build_request(args.as_ref()).expect("request");
        assert_eq!(request.path, "content/notices/n9");

        let wrong: Box<Args> = Box::new(7u32);
        let err = def.build_request(wrong.as_ref()).expect_err("wrong args");
        assert!(matches!(err, ApiError::Request(_)));

        let payload = def.decode(json!({"data": ["a"]})).expect("decode");
        assert_eq!(
            payload.downcast_ref::<Vec<String>>(),
            Some(&vec!["a".to_string()])
        );
    }
}
