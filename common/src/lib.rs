/*
 * Copyright 2024 Oxide Computer Company
 */

use std::io::{IsTerminal, Read};
use std::path::Path;
use std::sync::Mutex;

use anyhow::Result;
use serde::Deserialize;
use slog::{o, Drain, Logger};

pub fn read_toml<P: AsRef<Path>, T>(n: P) -> Result<T>
where
    for<'de> T: Deserialize<'de>,
{
    let mut f = std::fs::File::open(n.as_ref())?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    Ok(toml::from_str(&buf)?)
}

/**
 * Look up an environment variable, treating a value that is not valid UTF-8
 * the same as one that is not set at all.
 */
pub fn env(n: &str) -> Option<String> {
    std::env::var(n).ok()
}

fn debug_requested(val: Option<&str>) -> bool {
    matches!(
        val.map(|v| v.to_ascii_lowercase()).as_deref(),
        Some("yes") | Some("1") | Some("true")
    )
}

pub fn make_log(name: &'static str) -> Logger {
    let filter_level = if debug_requested(env("AXT_DEBUG").as_deref()) {
        slog::Level::Debug
    } else {
        slog::Level::Info
    };

    if std::io::stderr().is_terminal() {
        /*
         * Use a terminal-formatted logger for interactive processes.
         */
        let dec = slog_term::TermDecorator::new().stderr().build();
        let dr = Mutex::new(
            slog_term::FullFormat::new(dec).use_original_order().build(),
        )
        .filter_level(filter_level)
        .fuse();
        Logger::root(dr, o!("name" => name))
    } else {
        /*
         * Otherwise, emit bunyan-formatted records.  Log records go to stderr
         * so that they are never mixed in with request output on stdout.
         */
        let dr = Mutex::new(
            slog_bunyan::with_name(name, std::io::stderr())
                .set_flush(true)
                .build(),
        )
        .filter_level(filter_level)
        .fuse();
        Logger::root(dr, o!())
    }
}
