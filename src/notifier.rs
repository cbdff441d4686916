/*
* Copyright (C) 2025 Pedro Henrique / phkaiser13
*
* File: src/notifier.rs
*
* Outbound webhook delivery (§4.6). Fire-and-log: a failed delivery is
* recorded as a warning and never blocks or retries message processing,
* mirroring the notify action in this operator's other controllers.
*
* SPDX-License-Identifier: Apache-2.0
*/

use crate::crds::WebhookSpec;
use async_trait::async_trait;
use serde_json::json;
use tracing::{instrument, warn};

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, webhook: &WebhookSpec, event_kind: &str, instance_id: &str, node: &str);
}

pub struct ReqwestNotifier;

impl ReqwestNotifier {
    pub fn new() -> Self {
        Self
    }

    fn build_client(webhook: &WebhookSpec) -> reqwest::Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder();
        if let Some(proxy_url) = &webhook.proxy_url {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        }
        builder.build()
    }

    fn render_body(webhook: &WebhookSpec, event_kind: &str, instance_id: &str, node: &str) -> String {
        match &webhook.template {
            Some(template) => template
                .replace("{event_kind}", event_kind)
                .replace("{instance_id}", instance_id)
                .replace("{node}", node),
            None => json!({
                "eventKind": event_kind,
                "instanceId": instance_id,
                "node": node,
            })
            .to_string(),
        }
    }
}

impl Default for ReqwestNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for ReqwestNotifier {
    #[instrument(skip(self, webhook), fields(url = %webhook.url))]
    async fn notify(&self, webhook: &WebhookSpec, event_kind: &str, instance_id: &str, node: &str) {
        let client = match Self::build_client(webhook) {
            Ok(client) => client,
            Err(err) => {
                warn!(error = %err, "failed to build webhook client; skipping notification");
                return;
            }
        };

        let body = Self::render_body(webhook, event_kind, instance_id, node);
        let mut request = client.post(&webhook.url).body(body);
        for (key, value) in &webhook.headers {
            request = request.header(key, value);
        }

        match request.send().await {
            Ok(response) if !response.status().is_success() => {
                warn!(status = %response.status(), "webhook notification returned non-success status");
            }
            Err(err) => {
                warn!(error = %err, "webhook notification failed");
            }
            Ok(_) => {}
        }
    }
}
