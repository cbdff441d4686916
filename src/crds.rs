/*
* Copyright (C) 2025 Pedro Henrique / phkaiser13
*
* File: src/crds.rs
*
* This file defines the Rust data structures that correspond to the
* `NodeTerminator` Custom Resource Definition. By using the
* `kube::CustomResource` derive macro, we create a strongly-typed
* representation of our custom API, enabling safe and idiomatic interaction
* with the Kubernetes API server.
*
* Architecture:
* - `NodeTerminatorSpec` is the authoritative, operator-declared configuration:
*   a queue binding, drain knobs, a node label selector, a per-event-kind
*   action policy, and an optional outbound webhook. It is read-only from the
*   reconciler's perspective.
* - `NodeTerminatorStatus` is the operator's own scratch space: a handful of
*   rolling counters and conditions updated at the end of each tick via
*   `patch_status`, never read back as input.
* - `schemars` is leveraged to automatically generate an OpenAPI v3 schema
*   from the Rust types, which is embedded into the CRD manifest for
*   server-side validation.
*
* SPDX-License-Identifier: Apache-2.0
*/

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn default_max_number_of_messages() -> i32 {
    10
}

fn default_visibility_timeout_seconds() -> i32 {
    20
}

fn default_wait_time_seconds() -> i32 {
    20
}

fn default_attribute_names() -> Vec<String> {
    vec!["All".to_string()]
}

fn default_message_attribute_names() -> Vec<String> {
    vec!["SentTimestamp".to_string()]
}

pub fn default_requeue_after_seconds() -> u64 {
    10
}

/// Binds the reconciler to a single SQS queue and its receive parameters.
#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueueBinding {
    pub queue_url: String,
    #[serde(default = "default_max_number_of_messages")]
    pub max_number_of_messages: i32,
    #[serde(default = "default_visibility_timeout_seconds")]
    pub visibility_timeout_seconds: i32,
    #[serde(default = "default_wait_time_seconds")]
    pub wait_time_seconds: i32,
    #[serde(default = "default_attribute_names")]
    pub attribute_names: Vec<String>,
    #[serde(default = "default_message_attribute_names")]
    pub message_attribute_names: Vec<String>,
}

/// Drain knobs consumed verbatim by the node actuator (§4.4).
#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DrainPolicy {
    #[serde(default)]
    pub force: bool,
    #[serde(default)]
    pub grace_period_seconds: i64,
    #[serde(default)]
    pub ignore_daemon_sets: bool,
    #[serde(default)]
    pub delete_empty_dir_data: bool,
    #[serde(default = "default_drain_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_drain_timeout_seconds() -> u64 {
    120
}

/// An optional outbound webhook, invoked once per (event, instance, node).
#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WebhookSpec {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

/// One of the closed set of notification kinds this operator understands.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum EventKind {
    AutoScalingTermination,
    RebalanceRecommendation,
    ScheduledChange,
    SpotInterruption,
    StateChange,
}

impl EventKind {
    pub fn as_label(&self) -> &'static str {
        match self {
            EventKind::AutoScalingTermination => "AutoScalingTermination",
            EventKind::RebalanceRecommendation => "RebalanceRecommendation",
            EventKind::ScheduledChange => "ScheduledChange",
            EventKind::SpotInterruption => "SpotInterruption",
            EventKind::StateChange => "StateChange",
        }
    }
}

/// The action the actuator is permitted to take for a given event kind.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq, JsonSchema, Default)]
#[serde(rename_all = "PascalCase")]
pub enum Action {
    #[default]
    NoAction,
    Cordon,
    CordonAndDrain,
}

/// Maps each recognized event kind to the action the operator is allowed to
/// take for it. Kinds absent from the map resolve to `NoAction` (§4.2).
#[derive(Deserialize, Serialize, Clone, Debug, Default, JsonSchema)]
#[serde(transparent)]
pub struct ActionPolicy(pub BTreeMap<EventKind, Action>);

impl ActionPolicy {
    pub fn resolve(&self, kind: EventKind) -> Action {
        self.0.get(&kind).copied().unwrap_or(Action::NoAction)
    }
}

#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, JsonSchema)]
#[kube(
    group = "termination.k8s.io",
    version = "v1alpha1",
    kind = "NodeTerminator",
    namespaced,
    status = "NodeTerminatorStatus",
    printcolumn = r#"{"name":"Queue", "type":"string", "jsonPath":".spec.queue.queueUrl"}"#,
    printcolumn = r#"{"name":"LastReconcile", "type":"date", "jsonPath":".status.lastReconcileTime"}"#,
    printcolumn = r#"{"name":"Age", "type":"date", "jsonPath":".metadata.creationTimestamp"}"#,
    shortname = "nterm"
)]
#[serde(rename_all = "camelCase")]
pub struct NodeTerminatorSpec {
    pub queue: QueueBinding,
    pub drain: DrainPolicy,
    #[serde(default)]
    pub node_selector: BTreeMap<String, String>,
    #[serde(default)]
    pub action_policy: ActionPolicy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook: Option<WebhookSpec>,
    #[serde(default = "default_requeue_after_seconds")]
    pub requeue_after_seconds: u64,
}

/// A single, human-readable status condition. Same shape as the teacher's
/// `StatusCondition` used across its other controllers.
#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusCondition {
    #[serde(rename = "type")]
    pub type_: String,
    pub message: String,
}

impl StatusCondition {
    pub fn new(type_: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            type_: type_.into(),
            message: message.into(),
        }
    }
}

/// Observed, write-only state updated at the end of every tick.
#[derive(Deserialize, Serialize, Clone, Debug, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NodeTerminatorStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reconcile_time: Option<String>,
    #[serde(default)]
    pub messages_received: u64,
    #[serde(default)]
    pub messages_deleted: u64,
    #[serde(default)]
    pub messages_retained: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<StatusCondition>,
}
