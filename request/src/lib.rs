/*
 * Copyright 2024 Oxide Computer Company
 */

/*!
 * Base RPC-style request.  An RPC request is identified by a product code,
 * an API version, and an action name, and carries a flat mapping of named
 * string parameters that a client layer turns into a query string.
 *
 * Request descriptors for individual API actions wrap an [`RpcRequest`] and
 * are generated with the [`rpc_request!`] macro.
 */

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

mod encode;
mod macros;

pub use encode::percent_encode;

pub const DEFAULT_ENDPOINT_TYPE: &str = "openAPI";

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Head,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum FormatType {
    Json,
    Xml,
    Raw,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ProtocolType {
    Http,
    Https,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, strum::Display, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Style {
    Rpc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Scalar,
    /**
     * An array parameter is written as a family of indexed entries under the
     * wire base name, e.g., "instanceIds.1", "instanceIds.2".
     */
    Array { base: &'static str },
}

/**
 * Static description of one parameter declared by a generated request
 * descriptor.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
}

impl ParamSpec {
    pub const fn scalar(name: &'static str) -> ParamSpec {
        ParamSpec { name, kind: ParamKind::Scalar }
    }

    pub const fn array(name: &'static str, base: &'static str) -> ParamSpec {
        ParamSpec { name, kind: ParamKind::Array { base } }
    }
}

/**
 * Produce the key for the entry at position "index" (1-based) of an indexed
 * array parameter.
 */
pub fn indexed_key(base: &str, index: usize) -> String {
    format!("{}.{}", base, index)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RpcRequest {
    product: Cow<'static, str>,
    version: Cow<'static, str>,
    action_name: Cow<'static, str>,
    location_service_code: Option<String>,
    location_endpoint_type: String,
    method: Method,
    accept_format: Option<FormatType>,
    protocol_type: Option<ProtocolType>,
    query_params: BTreeMap<String, String>,
}

impl RpcRequest {
    pub fn new<P, V, A>(product: P, version: V, action_name: A) -> RpcRequest
    where
        P: Into<Cow<'static, str>>,
        V: Into<Cow<'static, str>>,
        A: Into<Cow<'static, str>>,
    {
        RpcRequest {
            product: product.into(),
            version: version.into(),
            action_name: action_name.into(),
            location_service_code: None,
            location_endpoint_type: DEFAULT_ENDPOINT_TYPE.to_string(),
            method: Method::default(),
            accept_format: None,
            protocol_type: None,
            query_params: BTreeMap::new(),
        }
    }

    /**
     * Create a request that also names the service code and endpoint type
     * a client should use when locating the regional endpoint for the
     * product.
     */
    pub fn with_location<P, V, A, S, E>(
        product: P,
        version: V,
        action_name: A,
        location_service_code: S,
        location_endpoint_type: E,
    ) -> RpcRequest
    where
        P: Into<Cow<'static, str>>,
        V: Into<Cow<'static, str>>,
        A: Into<Cow<'static, str>>,
        S: Into<String>,
        E: Into<String>,
    {
        let mut r = RpcRequest::new(product, version, action_name);
        r.location_service_code = Some(location_service_code.into());
        r.location_endpoint_type = location_endpoint_type.into();
        r
    }

    pub fn product(&self) -> &str {
        &self.product
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn action_name(&self) -> &str {
        &self.action_name
    }

    pub fn style(&self) -> Style {
        Style::Rpc
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn set_method(&mut self, method: Method) -> &mut Self {
        self.method = method;
        self
    }

    pub fn accept_format(&self) -> Option<FormatType> {
        self.accept_format
    }

    pub fn set_accept_format(&mut self, format: FormatType) -> &mut Self {
        self.accept_format = Some(format);
        self
    }

    pub fn protocol_type(&self) -> Option<ProtocolType> {
        self.protocol_type
    }

    pub fn set_protocol_type(&mut self, protocol: ProtocolType) -> &mut Self {
        self.protocol_type = Some(protocol);
        self
    }

    pub fn location_service_code(&self) -> Option<&str> {
        self.location_service_code.as_deref()
    }

    pub fn set_location_service_code<S: Into<String>>(
        &mut self,
        code: S,
    ) -> &mut Self {
        self.location_service_code = Some(code.into());
        self
    }

    pub fn location_endpoint_type(&self) -> &str {
        &self.location_endpoint_type
    }

    pub fn set_location_endpoint_type<S: Into<String>>(
        &mut self,
        endpoint_type: S,
    ) -> &mut Self {
        self.location_endpoint_type = endpoint_type.into();
        self
    }

    /**
     * Store a parameter value.  A later write to the same name replaces the
     * earlier value; entries are never removed.
     */
    pub fn add_query_param<K, V>(&mut self, name: K, value: V) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.query_params.insert(name.into(), value.into());
        self
    }

    pub fn get_query_params(&self) -> &BTreeMap<String, String> {
        &self.query_params
    }

    pub fn query_params(&self) -> &BTreeMap<String, String> {
        &self.query_params
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(String::as_str)
    }

    /**
     * Store each element of "values" under "base.N", where N is the 1-based
     * position of the element in the input sequence.  Any entries left by an
     * earlier, longer sequence are not removed.
     */
    pub fn add_indexed_query_params<I, S>(
        &mut self,
        base: &str,
        values: I,
    ) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for (i, v) in values.into_iter().enumerate() {
            self.query_params.insert(indexed_key(base, i + 1), v.into());
        }
        self
    }

    /**
     * Read back the contiguous run of indexed entries for "base", starting at
     * "base.1" and stopping at the first missing index.
     */
    pub fn indexed_query_params(&self, base: &str) -> Vec<&str> {
        (1..)
            .map_while(|i| self.query_param(&indexed_key(base, i)))
            .collect()
    }

    pub fn to_query_string(&self) -> String {
        encode::query_string(&self.query_params)
    }

    pub fn into_query_params(self) -> BTreeMap<String, String> {
        self.query_params
    }
}

/**
 * Implemented by every request descriptor.  The provided methods reach
 * through to the underlying [`RpcRequest`] so that generic code can work
 * with any descriptor.
 */
pub trait Request {
    fn rpc(&self) -> &RpcRequest;
    fn rpc_mut(&mut self) -> &mut RpcRequest;
    fn into_rpc(self) -> RpcRequest;

    fn product(&self) -> &str {
        self.rpc().product()
    }

    fn version(&self) -> &str {
        self.rpc().version()
    }

    fn action_name(&self) -> &str {
        self.rpc().action_name()
    }

    fn query_params(&self) -> &BTreeMap<String, String> {
        self.rpc().query_params()
    }

    fn to_query_string(&self) -> String {
        self.rpc().to_query_string()
    }
}

impl Request for RpcRequest {
    fn rpc(&self) -> &RpcRequest {
        self
    }

    fn rpc_mut(&mut self) -> &mut RpcRequest {
        self
    }

    fn into_rpc(self) -> RpcRequest {
        self
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::str::FromStr;

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn new_request() {
        let r = RpcRequest::new("axt", "2017-07-21", "CreateTask");

        assert_eq!(r.product(), "axt");
        assert_eq!(r.version(), "2017-07-21");
        assert_eq!(r.action_name(), "CreateTask");
        assert_eq!(r.style(), Style::Rpc);
        assert_eq!(r.method(), Method::Get);
        assert_eq!(r.accept_format(), None);
        assert_eq!(r.protocol_type(), None);
        assert_eq!(r.location_service_code(), None);
        assert_eq!(r.location_endpoint_type(), "openAPI");
        assert!(r.query_params().is_empty());
        assert_eq!(r.to_query_string(), "");
    }

    #[test]
    fn owned_identity() {
        let action = String::from("CreateManageTask");
        let r = RpcRequest::with_location(
            String::from("axt"),
            "2017-07-21",
            action,
            "axt",
            "innerAPI",
        );

        assert_eq!(r.action_name(), "CreateManageTask");
        assert_eq!(r.location_service_code(), Some("axt"));
        assert_eq!(r.location_endpoint_type(), "innerAPI");
    }

    #[test]
    fn last_write_wins() {
        let mut r = RpcRequest::new("axt", "2017-07-21", "CreateTask");
        r.add_query_param("commandId", "c-1");
        r.add_query_param("commandId", "c-2");

        assert_eq!(r.query_param("commandId"), Some("c-2"));
        assert_eq!(r.query_params(), &params(&[("commandId", "c-2")]));
        assert_eq!(r.get_query_params(), r.query_params());
    }

    #[test]
    fn missing_param() {
        let r = RpcRequest::new("axt", "2017-07-21", "CreateTask");
        assert_eq!(r.query_param("commandId"), None);
        assert!(r.indexed_query_params("instanceIds").is_empty());
    }

    #[test]
    fn indexed_params() {
        let mut r = RpcRequest::new("axt", "2017-07-21", "CreateTask");
        r.add_indexed_query_params("instanceIds", ["i-001", "i-002", "i-003"]);

        assert_eq!(
            r.query_params(),
            &params(&[
                ("instanceIds.1", "i-001"),
                ("instanceIds.2", "i-002"),
                ("instanceIds.3", "i-003"),
            ])
        );
        assert_eq!(
            r.indexed_query_params("instanceIds"),
            vec!["i-001", "i-002", "i-003"]
        );
        assert_eq!(r.query_param("instanceIds"), None);
    }

    #[test]
    fn indexed_params_empty() {
        let mut r = RpcRequest::new("axt", "2017-07-21", "CreateTask");
        r.add_indexed_query_params("instanceIds", Vec::<String>::new());
        assert!(r.query_params().is_empty());
    }

    #[test]
    fn indexed_params_shorter_rewrite() {
        let mut r = RpcRequest::new("axt", "2017-07-21", "CreateTask");
        r.add_indexed_query_params("instanceIds", ["a", "b", "c"]);
        r.add_indexed_query_params("instanceIds", ["x"]);

        /*
         * Nothing is ever removed, so the tail of the first write remains.
         */
        assert_eq!(r.indexed_query_params("instanceIds"), vec!["x", "b", "c"]);
    }

    #[test]
    fn indexed_read_stops_at_gap() {
        let mut r = RpcRequest::new("axt", "2017-07-21", "CreateTask");
        r.add_query_param("instanceIds.1", "a");
        r.add_query_param("instanceIds.3", "c");

        assert_eq!(r.indexed_query_params("instanceIds"), vec!["a"]);
    }

    #[test]
    fn indexed_order() {
        let mut fwd = RpcRequest::new("axt", "2017-07-21", "CreateTask");
        fwd.add_indexed_query_params("instanceIds", ["i-001", "i-002"]);
        let mut rev = RpcRequest::new("axt", "2017-07-21", "CreateTask");
        rev.add_indexed_query_params("instanceIds", ["i-002", "i-001"]);

        assert_eq!(fwd.query_param("instanceIds.1"), Some("i-001"));
        assert_eq!(rev.query_param("instanceIds.1"), Some("i-002"));
        assert_ne!(fwd, rev);
    }

    #[test]
    fn wire_format() {
        let mut r = RpcRequest::new("axt", "2017-07-21", "CreateTask");
        r.add_indexed_query_params("instanceIds", ["a", "b"]);
        assert_eq!(r.to_query_string(), "instanceIds.1=a&instanceIds.2=b");

        r.add_query_param("cronTab", "0 * * * *");
        assert_eq!(
            r.to_query_string(),
            "cronTab=0%20%2A%20%2A%20%2A%20%2A&\
            instanceIds.1=a&instanceIds.2=b"
        );
    }

    #[test]
    fn metadata() {
        let mut r = RpcRequest::new("axt", "2017-07-21", "CreateTask");
        r.set_method(Method::Post)
            .set_accept_format(FormatType::Json)
            .set_protocol_type(ProtocolType::Https)
            .set_location_service_code("axt")
            .set_location_endpoint_type("innerAPI");

        assert_eq!(r.method(), Method::Post);
        assert_eq!(r.accept_format(), Some(FormatType::Json));
        assert_eq!(r.protocol_type(), Some(ProtocolType::Https));
        assert_eq!(r.location_service_code(), Some("axt"));
        assert_eq!(r.location_endpoint_type(), "innerAPI");

        /*
         * Metadata is not part of the parameter mapping:
         */
        assert!(r.query_params().is_empty());
    }

    #[test]
    fn enum_strings() -> anyhow::Result<()> {
        assert_eq!(Method::Post.to_string(), "POST");
        assert_eq!(Method::from_str("delete")?, Method::Delete);
        assert_eq!(FormatType::Json.to_string(), "JSON");
        assert_eq!(FormatType::from_str("xml")?, FormatType::Xml);
        assert_eq!(ProtocolType::Https.to_string(), "https");
        assert_eq!(ProtocolType::from_str("HTTP")?, ProtocolType::Http);
        assert!(Method::from_str("FETCH").is_err());
        Ok(())
    }

    #[test]
    fn serialize() -> anyhow::Result<()> {
        let mut r = RpcRequest::new("axt", "2017-07-21", "CreateTask");
        r.set_accept_format(FormatType::Json);
        r.add_query_param("commandId", "c-1");

        let v = serde_json::to_value(&r)?;
        assert_eq!(v["product"], "axt");
        assert_eq!(v["action_name"], "CreateTask");
        assert_eq!(v["method"], "GET");
        assert_eq!(v["accept_format"], "JSON");
        assert_eq!(v["protocol_type"], serde_json::Value::Null);
        assert_eq!(v["query_params"]["commandId"], "c-1");
        Ok(())
    }

    #[test]
    fn request_trait() {
        let mut r = RpcRequest::new("axt", "2017-07-21", "CreateTask");
        Request::rpc_mut(&mut r).add_query_param("commandId", "c-1");

        assert_eq!(Request::action_name(&r), "CreateTask");
        assert_eq!(Request::to_query_string(&r), "commandId=c-1");
        assert_eq!(r.clone().into_rpc(), r);
    }
}
