/*
* Copyright (C) 2025 Pedro Henrique / phkaiser13
*
* File: src/actuator.rs
*
* Cordons and drains a single node (§4.4). Cordon is a single merge patch on
* `spec.unschedulable`; drain lists the node's pods via a field selector,
* filters out DaemonSet members when asked to, and evicts the rest
* concurrently, all bounded by the policy's overall timeout.
*
* SPDX-License-Identifier: Apache-2.0
*/

use crate::crds::DrainPolicy;
use crate::error::Error;
use async_trait::async_trait;
use futures::future::join_all;
use k8s_openapi::api::core::v1::{Node, Pod};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::DeleteOptions;
use kube::api::{DeleteParams, EvictParams, ListParams, Patch, PatchParams};
use kube::{Api, Client};
use serde_json::json;
use std::time::Duration;
use tracing::{info, instrument, warn};

#[async_trait]
pub trait NodeActuator: Send + Sync {
    async fn cordon(&self, node: &str) -> Result<(), Error>;
    async fn drain(&self, node: &str, policy: &DrainPolicy) -> Result<(), Error>;
}

pub struct KubeNodeActuator {
    client: Client,
}

impl KubeNodeActuator {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn drain_once(&self, node: &str, policy: &DrainPolicy) -> Result<(), Error> {
        let pods: Api<Pod> = Api::all(self.client.clone());
        let params = ListParams::default().fields(&format!("spec.nodeName={node}"));
        let list = pods.list(&params).await.map_err(|err| Error::Drain {
            node: node.to_string(),
            reason: err.to_string(),
        })?;

        let mut evict_params = EvictParams::default();
        if !policy.force {
            evict_params.delete_options = Some(DeleteOptions {
                grace_period_seconds: Some(policy.grace_period_seconds),
                ..Default::default()
            });
        }

        let client = self.client.clone();
        let force = policy.force;
        let grace_period_seconds = policy.grace_period_seconds;
        let evictions = list.items.into_iter().filter_map(|pod| {
            let name = pod.metadata.name.clone()?;
            let namespace = pod.metadata.namespace.clone().unwrap_or_default();

            if policy.ignore_daemon_sets && is_daemon_set_member(&pod) {
                info!(node, pod = %name, "skipping daemonset-owned pod");
                return None;
            }

            if !policy.delete_empty_dir_data && has_empty_dir_volume(&pod) {
                warn!(
                    node,
                    pod = %name,
                    "skipping pod with emptyDir volume; delete_empty_dir_data is not set"
                );
                return None;
            }

            let client = client.clone();
            let evict_params = evict_params.clone();
            Some(async move {
                let api: Api<Pod> = Api::namespaced(client, &namespace);
                match api.evict_with(&name, &evict_params).await {
                    Ok(_) => Ok(()),
                    Err(err) if force && is_pdb_blocked(&err) => {
                        warn!(
                            node,
                            pod = %name,
                            "eviction blocked by pod disruption budget; force is set, falling back to delete"
                        );
                        let delete_params = DeleteParams {
                            grace_period_seconds: Some(grace_period_seconds.max(0) as u32),
                            ..Default::default()
                        };
                        api.delete(&name, &delete_params)
                            .await
                            .map(|_| ())
                            .map_err(|err| (name, err.to_string()))
                    }
                    Err(err) => Err((name, err.to_string())),
                }
            })
        });

        let results = join_all(evictions).await;
        let failures: Vec<String> = results
            .into_iter()
            .filter_map(|r| r.err())
            .map(|(pod, reason)| format!("{pod}: {reason}"))
            .collect();

        if failures.is_empty() {
            Ok(())
        } else {
            Err(Error::Drain {
                node: node.to_string(),
                reason: failures.join("; "),
            })
        }
    }
}

fn is_daemon_set_member(pod: &Pod) -> bool {
    pod.metadata
        .owner_references
        .as_ref()
        .map(|refs| refs.iter().any(|r| r.kind == "DaemonSet"))
        .unwrap_or(false)
}

/// True when an eviction failed because it would violate a pod disruption
/// budget, rather than for some other reason. The API server reports this
/// as a 429 with reason `TooManyRequests`.
fn is_pdb_blocked(err: &kube::Error) -> bool {
    match err {
        kube::Error::Api(resp) => resp.code == 429 || resp.reason == "TooManyRequests",
        _ => false,
    }
}

fn has_empty_dir_volume(pod: &Pod) -> bool {
    pod.spec
        .as_ref()
        .and_then(|s| s.volumes.as_ref())
        .map(|volumes| volumes.iter().any(|v| v.empty_dir.is_some()))
        .unwrap_or(false)
}

#[async_trait]
impl NodeActuator for KubeNodeActuator {
    #[instrument(skip(self))]
    async fn cordon(&self, node: &str) -> Result<(), Error> {
        let nodes: Api<Node> = Api::all(self.client.clone());
        let patch = Patch::Merge(json!({ "spec": { "unschedulable": true } }));
        nodes
            .patch(node, &PatchParams::default(), &patch)
            .await
            .map_err(|err| Error::Cordon {
                node: node.to_string(),
                reason: err.to_string(),
            })?;
        info!(node, "cordoned node");
        Ok(())
    }

    #[instrument(skip(self, policy))]
    async fn drain(&self, node: &str, policy: &DrainPolicy) -> Result<(), Error> {
        let result = tokio::time::timeout(
            Duration::from_secs(policy.timeout_seconds),
            self.drain_once(node, policy),
        )
        .await;

        match result {
            Ok(inner) => inner,
            Err(_) => Err(Error::DrainTimedOut {
                node: node.to_string(),
            }),
        }
    }
}
