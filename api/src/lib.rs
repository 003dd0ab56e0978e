/*
 * Copyright 2024 Oxide Computer Company
 */

pub mod catalog;
pub mod v20170721;

pub use axt_request::{Request, RpcRequest};
pub use catalog::{Catalog, CatalogError, DynamicRequest};
