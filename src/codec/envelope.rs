/*
* Copyright (C) 2025 Pedro Henrique / phkaiser13
*
* File: src/codec/envelope.rs
*
* The common structural envelope shared by every notification payload this
* operator understands. (source, detail-type, version) uniquely selects a
* sub-parser; the `detail` blob is left as raw JSON for the sub-parser to
* interpret under its own schema.
*
* SPDX-License-Identifier: Apache-2.0
*/

use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
pub struct Envelope {
    pub source: String,
    #[serde(rename = "detail-type")]
    pub detail_type: String,
    pub id: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(default)]
    pub time: Option<DateTime<Utc>>,
    pub version: String,
    #[serde(default)]
    pub account: String,
    #[serde(default = "serde_json::Value::default")]
    pub detail: serde_json::Value,
}

impl Envelope {
    /// True when this envelope exactly matches a sub-parser's declared
    /// (source, detail-type, version) triple (§4.1 step 2).
    pub fn matches(&self, source: &str, detail_type: &str, version: &str) -> bool {
        self.source == source && self.detail_type == detail_type && self.version == version
    }
}
