/*
* Copyright (C) 2025 Pedro Henrique / phkaiser13
*
* File: src/nodestore.rs
*
* Fetches a single cluster `Node` by name, honoring the terminator's label
* selector (§6 "Node store: Get(name, matchLabels) -> node | nil | error").
* A node that exists but doesn't carry every selector label is treated the
* same as a missing node — informational, not an error (§4.8 M4.b).
*
* SPDX-License-Identifier: Apache-2.0
*/

use crate::error::Error;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Node;
use kube::{Api, Client};
use std::collections::BTreeMap;

#[async_trait]
pub trait NodeStore: Send + Sync {
    async fn get(
        &self,
        name: &str,
        match_labels: &BTreeMap<String, String>,
    ) -> Result<Option<Node>, Error>;
}

pub struct KubeNodeStore {
    client: Client,
}

impl KubeNodeStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn matches_selector(node: &Node, match_labels: &BTreeMap<String, String>) -> bool {
    if match_labels.is_empty() {
        return true;
    }
    let labels = node
        .metadata
        .labels
        .as_ref()
        .cloned()
        .unwrap_or_default();
    match_labels
        .iter()
        .all(|(k, v)| labels.get(k).map(|actual| actual == v).unwrap_or(false))
}

#[async_trait]
impl NodeStore for KubeNodeStore {
    async fn get(
        &self,
        name: &str,
        match_labels: &BTreeMap<String, String>,
    ) -> Result<Option<Node>, Error> {
        let nodes: Api<Node> = Api::all(self.client.clone());

        match nodes.get_opt(name).await {
            Ok(Some(node)) if matches_selector(&node, match_labels) => Ok(Some(node)),
            Ok(Some(_)) => Ok(None),
            Ok(None) => Ok(None),
            Err(err) => Err(Error::NodeFetch(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
    use std::collections::BTreeMap as Map;

    fn node_with_labels(labels: &[(&str, &str)]) -> Node {
        let mut map = Map::new();
        for (k, v) in labels {
            map.insert(k.to_string(), v.to_string());
        }
        Node {
            metadata: ObjectMeta {
                labels: Some(map),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn empty_selector_matches_any_node() {
        let node = node_with_labels(&[]);
        assert!(matches_selector(&node, &BTreeMap::new()));
    }

    #[test]
    fn matching_labels_satisfy_selector() {
        let node = node_with_labels(&[("zone", "us-east-1a"), ("role", "worker")]);
        let mut selector = BTreeMap::new();
        selector.insert("zone".to_string(), "us-east-1a".to_string());
        assert!(matches_selector(&node, &selector));
    }

    #[test]
    fn missing_label_fails_selector() {
        let node = node_with_labels(&[("role", "worker")]);
        let mut selector = BTreeMap::new();
        selector.insert("zone".to_string(), "us-east-1a".to_string());
        assert!(!matches_selector(&node, &selector));
    }
}
