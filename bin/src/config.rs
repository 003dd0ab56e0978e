/*
 * Copyright 2024 Oxide Computer Company
 */

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use axt_common::{env, read_toml};
use axt_request::{FormatType, Method, ProtocolType, RpcRequest};
use serde::Deserialize;

#[derive(Deserialize, Clone, Default)]
pub struct Config {
    pub default_profile: Option<String>,
    #[serde(default)]
    pub profile: HashMap<String, Profile>,
}

#[derive(Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Profile {
    #[serde(skip)]
    pub name: Option<String>,
    pub method: Option<Method>,
    pub accept_format: Option<FormatType>,
    pub protocol: Option<ProtocolType>,
    pub catalog: Option<PathBuf>,
}

/**
 * Values that may be overridden from the environment.  These are collected
 * up front so that the override logic does not itself touch the process
 * environment.
 */
#[derive(Default)]
struct Overrides {
    method: Option<String>,
    accept_format: Option<String>,
    protocol: Option<String>,
    catalog: Option<String>,
}

impl Overrides {
    fn from_env() -> Overrides {
        Overrides {
            method: env("AXT_METHOD"),
            accept_format: env("AXT_ACCEPT_FORMAT"),
            protocol: env("AXT_PROTOCOL"),
            catalog: env("AXT_CATALOG"),
        }
    }
}

fn parse<T>(name: &str, val: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    T::from_str(val).map_err(|e| anyhow!("invalid {name} {val:?}: {e}"))
}

impl Profile {
    fn apply_overrides(&mut self, o: &Overrides) -> Result<()> {
        if let Some(v) = o.method.as_deref() {
            self.method = Some(parse("AXT_METHOD", v)?);
        }
        if let Some(v) = o.accept_format.as_deref() {
            self.accept_format = Some(parse("AXT_ACCEPT_FORMAT", v)?);
        }
        if let Some(v) = o.protocol.as_deref() {
            self.protocol = Some(parse("AXT_PROTOCOL", v)?);
        }
        if let Some(v) = o.catalog.as_deref() {
            self.catalog = Some(PathBuf::from(v));
        }
        Ok(())
    }

    /**
     * Apply the request metadata from this profile to a request.  Anything
     * the profile does not specify is left as the request has it.
     */
    pub fn apply_to(&self, rpc: &mut RpcRequest) {
        if let Some(method) = self.method {
            rpc.set_method(method);
        }
        if let Some(format) = self.accept_format {
            rpc.set_accept_format(format);
        }
        if let Some(protocol) = self.protocol {
            rpc.set_protocol_type(protocol);
        }
    }
}

fn select(
    c: &Config,
    arg_profile: Option<&str>,
    env_profile: Option<&str>,
    path: &Path,
) -> Result<Profile> {
    let (profile_name, src) = if let Some(profile) = arg_profile {
        (profile, "-p argument")
    } else if let Some(profile) = env_profile {
        (profile, "AXT_PROFILE environment variable")
    } else if let Some(profile) = c.default_profile.as_deref() {
        (profile, "\"default_profile\" in config.toml")
    } else {
        ("default", "fallback default")
    };

    if let Some(profile) = c.profile.get(profile_name) {
        let mut profile = profile.clone();
        profile.name = Some(profile_name.to_string());
        Ok(profile)
    } else if arg_profile.is_none()
        && env_profile.is_none()
        && c.default_profile.is_none()
    {
        /*
         * No profile was asked for, and there is no "default" profile in the
         * file.  No settings are required, so carry on without any.
         */
        Ok(Profile::default())
    } else {
        bail!(
            "profile \"{}\" (from {}) not found in configuration file {:?}",
            profile_name,
            src,
            path
        );
    }
}

pub fn load(profile_name: Option<&str>) -> Result<Profile> {
    /*
     * Locate our configuration file.  Unlike a client that must talk to a
     * server, we can work without one, so a missing file is treated as an
     * empty configuration.
     */
    let mut path = dirs_next::config_dir()
        .ok_or_else(|| anyhow!("could not find config directory"))?;
    path.push("axt");
    path.push("config.toml");

    let c: Config = if path.exists() {
        read_toml(&path).with_context(|| anyhow!("reading file {:?}", path))?
    } else {
        Config::default()
    };

    let mut profile =
        select(&c, profile_name, env("AXT_PROFILE").as_deref(), &path)?;
    profile.apply_overrides(&Overrides::from_env())?;

    Ok(profile)
}
