/*
 * Copyright 2024 Oxide Computer Company
 */

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use axt_api::catalog::{Catalog, ParameterKind};
use axt_api::Request;
use axt_common::make_log;
use hiercmd::prelude::*;
use slog::{debug, o, Logger};

mod config;

#[derive(Default)]
struct Stuff {
    log: Option<Logger>,
    catalog: Option<Catalog>,
    profile: Option<config::Profile>,
}

impl Stuff {
    fn log(&self) -> Result<&Logger> {
        self.log.as_ref().ok_or_else(|| anyhow!("logger not configured"))
    }

    fn catalog(&self) -> Result<&Catalog> {
        self.catalog.as_ref().ok_or_else(|| anyhow!("catalog not loaded"))
    }

    fn profile(&self) -> Result<&config::Profile> {
        self.profile.as_ref().ok_or_else(|| anyhow!("profile not loaded"))
    }
}

/**
 * Split a list of "NAME=VALUE" arguments into pairs, keeping the order in
 * which they were provided.
 */
fn name_values(opt: &str, vals: &[String]) -> Result<Vec<(String, String)>> {
    vals.iter()
        .map(|val| {
            val.split_once('=')
                .ok_or_else(|| {
                    anyhow!("--{opt} requires NAME=VALUE, not {val:?}")
                })
                .map(|(k, v)| (k.to_string(), v.to_string()))
        })
        .collect()
}

/**
 * Group array elements by parameter name.  Elements for each name stay in
 * the order they appeared on the command line, which determines the index
 * each one is assigned.
 */
fn group_elements(
    pairs: Vec<(String, String)>,
) -> BTreeMap<String, Vec<String>> {
    let mut out: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (k, v) in pairs {
        out.entry(k).or_default().push(v);
    }
    out
}

async fn do_list(mut l: Level<Stuff>) -> Result<()> {
    l.add_column("action", 24, true);
    l.add_column("product", 8, true);
    l.add_column("version", 10, true);
    l.add_column("params", 6, true);

    let a = no_args!(l);
    let mut t = a.table();

    for op in l.context().catalog()?.operations() {
        let mut r = Row::default();
        r.add_str("action", &op.action);
        r.add_str("product", &op.product);
        r.add_str("version", &op.version);
        r.add_str("params", &op.parameters.len().to_string());
        t.add_row(r);
    }

    print!("{}", t.output()?);
    Ok(())
}

async fn do_show(mut l: Level<Stuff>) -> Result<()> {
    l.usage_args(Some("ACTION"));

    l.add_column("name", 24, true);
    l.add_column("kind", 6, true);
    l.add_column("wire", 32, true);

    let a = args!(l);

    if a.args().len() != 1 {
        bad_args!(l, "specify an action");
    }

    let op = l.context().catalog()?.operation(&a.args()[0])?;

    let mut t = a.table();

    for p in op.parameters.iter() {
        let mut r = Row::default();
        r.add_str("name", &p.name);
        match &p.kind {
            ParameterKind::Scalar => {
                r.add_str("kind", "scalar");
                r.add_str("wire", &p.name);
            }
            ParameterKind::Array { base } => {
                r.add_str("kind", "array");
                r.add_str("wire", &format!("{base}.1, {base}.2, ..."));
            }
        }
        t.add_row(r);
    }

    print!("{}", t.output()?);
    Ok(())
}

async fn do_build(mut l: Level<Stuff>) -> Result<()> {
    l.usage_args(Some("ACTION"));

    l.optmulti("s", "set", "set a scalar parameter", "NAME=VALUE");
    l.optmulti(
        "a",
        "append",
        "append an element to an array parameter",
        "NAME=VALUE",
    );
    l.optflag("j", "json", "print the whole request as JSON");

    let a = args!(l);

    if a.args().len() != 1 {
        bad_args!(l, "specify an action");
    }

    let scalars = name_values("set", &a.opts().opt_strs("set"))?;
    let arrays =
        group_elements(name_values("append", &a.opts().opt_strs("append"))?);

    let c = l.context();
    let op = c.catalog()?.operation(&a.args()[0])?;
    let log = c.log()?.new(o!("action" => op.action.to_string()));

    let mut req = op.new_request();
    c.profile()?.apply_to(req.rpc_mut());

    for (name, value) in scalars {
        debug!(log, "set scalar"; "name" => &name, "value" => &value);
        req.set(&name, value)?;
    }
    for (name, values) in arrays {
        debug!(log, "set array"; "name" => &name, "count" => values.len());
        req.set_array(&name, values)?;
    }

    if a.opts().opt_present("json") {
        println!("{}", serde_json::to_string_pretty(req.rpc())?);
    } else {
        println!("{}", req.to_query_string());
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut l = Level::new("axt", Stuff::default());
    l.optopt("p", "profile", "configuration profile", "PROFILE");
    l.optopt("c", "catalog", "operation catalog file", "FILE");

    l.cmda("list", "ls", "list operations", cmd!(do_list))?;
    l.cmd("show", "show the parameters of an operation", cmd!(do_show))?;
    l.cmd(
        "build",
        "build a request and print its parameters",
        cmd!(do_build),
    )?;

    let a = args!(l);

    let log = make_log("axt");

    let profile = config::load(a.opts().opt_str("p").as_deref())?;

    let catalog_path = a
        .opts()
        .opt_str("c")
        .map(PathBuf::from)
        .or_else(|| profile.catalog.clone());
    let catalog = if let Some(path) = catalog_path {
        Catalog::from_path(&log, &path)
            .with_context(|| anyhow!("loading catalog {:?}", path))?
    } else {
        Catalog::builtin()?
    };

    debug!(log, "ready";
        "profile" => profile.name.as_deref().unwrap_or("-"),
        "operations" => catalog.operations().len());

    l.context_mut().log = Some(log);
    l.context_mut().catalog = Some(catalog);
    l.context_mut().profile = Some(profile);

    sel!(l).run().await
}
