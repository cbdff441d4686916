/*
* Copyright (C) 2025 Pedro Henrique / phkaiser13
*
* File: src/metrics.rs
*
* Custom Prometheus metrics this operator exposes. Using `lazy_static`, we
* ensure the metrics are created only once and are available globally and
* safely across all concurrent reconciliation loops and web server threads.
*
* SPDX-License-Identifier: Apache-2.0
*/

use lazy_static::lazy_static;
use prometheus::{
    opts, register_histogram, register_int_counter, register_int_counter_vec, Histogram,
    IntCounter, IntCounterVec, Registry,
};

lazy_static! {
    /// Total number of queue messages received across all terminators.
    pub static ref MESSAGES_RECEIVED_TOTAL: IntCounter = register_int_counter!(opts!(
        "node_terminator_messages_received_total",
        "Total number of queue messages received."
    ))
    .unwrap();

    /// Total number of queue messages deleted after successful handling.
    pub static ref MESSAGES_DELETED_TOTAL: IntCounter = register_int_counter!(opts!(
        "node_terminator_messages_deleted_total",
        "Total number of queue messages deleted after processing."
    ))
    .unwrap();

    /// Total number of queue messages left in place for a later retry.
    pub static ref MESSAGES_RETAINED_TOTAL: IntCounter = register_int_counter!(opts!(
        "node_terminator_messages_retained_total",
        "Total number of queue messages retained for retry."
    ))
    .unwrap();

    /// Total number of node actions taken, labeled by action and outcome.
    pub static ref ACTIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "node_terminator_actions_total",
        "Total number of cordon/drain actions taken, by action and outcome.",
        &["action", "outcome"]
    )
    .unwrap();

    /// Latency of a single drain operation, in seconds.
    pub static ref DRAIN_LATENCY_SECONDS: Histogram = register_histogram!(
        "node_terminator_drain_latency_seconds",
        "Latency of a single node drain operation.",
        vec![1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0]
    )
    .unwrap();
}

/// Creates a new Prometheus registry and registers all custom metrics.
///
/// Intended to be called once at operator startup.
pub fn create_and_register_metrics() -> Result<Registry, prometheus::Error> {
    let r = Registry::new();
    r.register(Box::new(MESSAGES_RECEIVED_TOTAL.clone()))?;
    r.register(Box::new(MESSAGES_DELETED_TOTAL.clone()))?;
    r.register(Box::new(MESSAGES_RETAINED_TOTAL.clone()))?;
    r.register(Box::new(ACTIONS_TOTAL.clone()))?;
    r.register(Box::new(DRAIN_LATENCY_SECONDS.clone()))?;
    Ok(r)
}
