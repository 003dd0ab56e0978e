/*
 * Copyright 2024 Oxide Computer Company
 */

use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;

use axt_request::{Method, Request, RpcRequest};
use serde::Deserialize;
use slog::{debug, o, Logger};
use thiserror::Error;

const BUILTIN: &str = include_str!("../catalog.toml");

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("unknown operation {0:?}")]
    UnknownOperation(String),
    #[error("operation {action:?} has no parameter {name:?}")]
    UnknownParameter { action: String, name: String },
    #[error("parameter {name:?} of operation {action:?} is an array")]
    NotScalar { action: String, name: String },
    #[error("parameter {name:?} of operation {action:?} is not an array")]
    NotArray { action: String, name: String },
    #[error("invalid catalog: {0}")]
    Invalid(String),
    #[error(transparent)]
    Parse(#[from] toml::de::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/*
 * On-disk form of the catalog.  These are checked and converted into the
 * public types below, so that a loaded Catalog is always well-formed.
 */
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
struct CatalogFile {
    product: String,
    version: String,
    location_service_code: Option<String>,
    #[serde(default, rename = "operation")]
    operations: Vec<OperationFile>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
struct OperationFile {
    action: String,
    method: Option<Method>,
    #[serde(default, rename = "parameter")]
    parameters: Vec<ParameterFile>,
}

#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum KindFile {
    #[default]
    Scalar,
    Array,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
struct ParameterFile {
    name: String,
    #[serde(default)]
    kind: KindFile,
    base: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterKind {
    Scalar,
    Array { base: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub kind: ParameterKind,
}

impl Parameter {
    pub fn is_array(&self) -> bool {
        matches!(self.kind, ParameterKind::Array { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub product: String,
    pub version: String,
    pub action: String,
    pub location_service_code: Option<String>,
    pub method: Option<Method>,
    pub parameters: Vec<Parameter>,
}

impl Operation {
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    fn require(&self, name: &str) -> Result<&Parameter, CatalogError> {
        self.parameter(name).ok_or_else(|| CatalogError::UnknownParameter {
            action: self.action.to_string(),
            name: name.to_string(),
        })
    }

    pub fn new_request(&self) -> DynamicRequest<'_> {
        let mut rpc = if let Some(code) = self.location_service_code.as_deref()
        {
            RpcRequest::with_location(
                self.product.clone(),
                self.version.clone(),
                self.action.clone(),
                code,
                axt_request::DEFAULT_ENDPOINT_TYPE,
            )
        } else {
            RpcRequest::new(
                self.product.clone(),
                self.version.clone(),
                self.action.clone(),
            )
        };
        if let Some(method) = self.method {
            rpc.set_method(method);
        }

        DynamicRequest { operation: self, rpc }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    product: String,
    version: String,
    operations: Vec<Operation>,
}

impl Catalog {
    /**
     * The catalog of "axt" operations shipped with this crate.
     */
    pub fn builtin() -> Result<Catalog, CatalogError> {
        BUILTIN.parse()
    }

    pub fn from_path<P: AsRef<Path>>(
        log: &Logger,
        path: P,
    ) -> Result<Catalog, CatalogError> {
        let path = path.as_ref();
        let log = log.new(o!("catalog" => path.display().to_string()));

        let text = std::fs::read_to_string(path)?;
        let c: Catalog = text.parse()?;

        debug!(log, "loaded catalog";
            "product" => &c.product,
            "version" => &c.version,
            "operations" => c.operations.len());

        Ok(c)
    }

    pub fn product(&self) -> &str {
        &self.product
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn operation(&self, action: &str) -> Result<&Operation, CatalogError> {
        self.operations
            .iter()
            .find(|o| o.action == action)
            .ok_or_else(|| CatalogError::UnknownOperation(action.to_string()))
    }
}

impl FromStr for Catalog {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Catalog, CatalogError> {
        let cf: CatalogFile = toml::from_str(s)?;

        if cf.product.trim().is_empty() {
            return Err(CatalogError::Invalid("empty product code".into()));
        }
        if cf.version.trim().is_empty() {
            return Err(CatalogError::Invalid("empty API version".into()));
        }

        let mut actions = HashSet::new();
        let mut operations = Vec::with_capacity(cf.operations.len());
        for of in cf.operations {
            if of.action.trim().is_empty() {
                return Err(CatalogError::Invalid("empty action name".into()));
            }
            if !actions.insert(of.action.clone()) {
                return Err(CatalogError::Invalid(format!(
                    "action {:?} appears more than once",
                    of.action
                )));
            }

            let mut names = HashSet::new();
            let mut parameters = Vec::with_capacity(of.parameters.len());
            for pf in of.parameters {
                if pf.name.is_empty() {
                    return Err(CatalogError::Invalid(format!(
                        "action {:?} has a parameter with no name",
                        of.action
                    )));
                }
                if !names.insert(pf.name.clone()) {
                    return Err(CatalogError::Invalid(format!(
                        "action {:?} declares parameter {:?} more than once",
                        of.action, pf.name
                    )));
                }

                let kind = match (pf.kind, pf.base) {
                    (KindFile::Scalar, None) => ParameterKind::Scalar,
                    (KindFile::Array, Some(base)) if !base.is_empty() => {
                        ParameterKind::Array { base }
                    }
                    (KindFile::Scalar, Some(_)) => {
                        return Err(CatalogError::Invalid(format!(
                            "scalar parameter {:?} of action {:?} has a base",
                            pf.name, of.action
                        )));
                    }
                    (KindFile::Array, _) => {
                        return Err(CatalogError::Invalid(format!(
                            "array parameter {:?} of action {:?} needs a base",
                            pf.name, of.action
                        )));
                    }
                };

                parameters.push(Parameter { name: pf.name, kind });
            }

            operations.push(Operation {
                product: cf.product.clone(),
                version: cf.version.clone(),
                action: of.action,
                location_service_code: cf.location_service_code.clone(),
                method: of.method,
                parameters,
            });
        }

        Ok(Catalog { product: cf.product, version: cf.version, operations })
    }
}

/**
 * A request for a catalog operation, with parameters named at run time
 * rather than through generated accessors.  Only the lookup of a parameter
 * name can fail; once found, setting and getting values behaves exactly as
 * it does for the generated request types.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicRequest<'a> {
    operation: &'a Operation,
    rpc: RpcRequest,
}

impl DynamicRequest<'_> {
    pub fn operation(&self) -> &Operation {
        self.operation
    }

    pub fn set<S: Into<String>>(
        &mut self,
        name: &str,
        value: S,
    ) -> Result<&mut Self, CatalogError> {
        let p = self.operation.require(name)?;
        if p.is_array() {
            return Err(CatalogError::NotScalar {
                action: self.operation.action.to_string(),
                name: name.to_string(),
            });
        }

        self.rpc.add_query_param(name, value);
        Ok(self)
    }

    pub fn set_array<I, S>(
        &mut self,
        name: &str,
        values: I,
    ) -> Result<&mut Self, CatalogError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let base = self.array_base(name)?.to_string();
        self.rpc.add_indexed_query_params(&base, values);
        Ok(self)
    }

    /**
     * Read the value stored under the literal parameter name.  For array
     * parameters this is not where the array setter writes; see
     * get_array().
     */
    pub fn get(&self, name: &str) -> Result<Option<&str>, CatalogError> {
        self.operation.require(name)?;
        Ok(self.rpc.query_param(name))
    }

    pub fn get_array(&self, name: &str) -> Result<Vec<&str>, CatalogError> {
        let base = self.array_base(name)?;
        Ok(self.rpc.indexed_query_params(base))
    }

    fn array_base(&self, name: &str) -> Result<&str, CatalogError> {
        match &self.operation.require(name)?.kind {
            ParameterKind::Array { base } => Ok(base.as_str()),
            ParameterKind::Scalar => Err(CatalogError::NotArray {
                action: self.operation.action.to_string(),
                name: name.to_string(),
            }),
        }
    }
}

impl Request for DynamicRequest<'_> {
    fn rpc(&self) -> &RpcRequest {
        &self.rpc
    }

    fn rpc_mut(&mut self) -> &mut RpcRequest {
        &mut self.rpc
    }

    fn into_rpc(self) -> RpcRequest {
        self.rpc
    }
}
