/*
* Copyright (C) 2025 Pedro Henrique / phkaiser13
*
* File: src/error.rs
*
* The error taxonomy consumed by the reconciler and its collaborators. One
* enum covers every failure mode enumerated in the design doc's error
* handling section, following the one-`Error`-enum-per-controller convention
* used throughout this operator's other controllers.
*
* SPDX-License-Identifier: Apache-2.0
*/

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("terminator config fetch failed: {0}")]
    ConfigFetch(#[source] kube::Error),

    #[error("kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    #[error("missing namespace on terminator object")]
    MissingNamespace,

    #[error("queue receive failed: {0}")]
    QueueReceive(String),

    #[error("queue delete failed: {0}")]
    QueueDelete(String),

    #[error("instance resolve failed for {instance_id}: {reason}")]
    Resolve { instance_id: String, reason: String },

    #[error("node fetch failed: {0}")]
    NodeFetch(String),

    #[error("cordon failed for node {node}: {reason}")]
    Cordon { node: String, reason: String },

    #[error("drain failed for node {node}: {reason}")]
    Drain { node: String, reason: String },

    #[error("drain for node {node} exceeded its configured timeout")]
    DrainTimedOut { node: String },

    #[error("autoscaling lifecycle hook completion failed: {0}")]
    Ack(String),

    #[error("{0} message(s) in this tick failed; see logs for detail")]
    Batch(usize),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// The two-way outcome an ack closure reports to the reconciler (§4.7).
/// `try_again = true` retains the message; `false` allows deletion even when
/// `error` is `Some` (the status-400 "already completed" branch).
#[derive(Debug)]
pub struct AckOutcome {
    pub try_again: bool,
    pub error: Option<Error>,
}

impl AckOutcome {
    pub fn done() -> Self {
        Self {
            try_again: false,
            error: None,
        }
    }

    pub fn stale(error: Error) -> Self {
        Self {
            try_again: false,
            error: Some(error),
        }
    }

    pub fn retry(error: Error) -> Self {
        Self {
            try_again: true,
            error: Some(error),
        }
    }
}
