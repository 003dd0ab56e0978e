/*
 * Copyright 2024 Oxide Computer Company
 */

use std::collections::BTreeMap;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/*
 * RFC 3986 unreserved characters are passed through unchanged; everything
 * else, including space, is percent-encoded.  Note that this differs from
 * HTML form encoding, which would turn a space into "+".
 */
const RPC_ENCODE_SET: &AsciiSet =
    &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

pub fn percent_encode(s: &str) -> String {
    utf8_percent_encode(s, RPC_ENCODE_SET).to_string()
}

/**
 * Render a parameter mapping as an RPC-style query string, e.g.,
 * "commandId=c-1&instanceIds.1=i-001".  Parameters appear in the iteration
 * order of the mapping.
 */
pub fn query_string(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}
