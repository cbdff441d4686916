/*
* Copyright (C) 2025 Pedro Henrique / phkaiser13
*
* File: src/ack.rs
*
* Per-event acknowledgement side effects (§4.7). Only the ASG-terminate
* event kinds carry one; every other kind gets the trivial handler that
* always reports "done" with no error.
*
* Architecture:
* - `AckHandler` is the capability attached to a parsed `Event`. A clean
*   design injects the autoscaling client into the parser at construction
*   and captures it in the event value (spec §9's design note) — that's
*   exactly what `AsgAckHandler` does.
* - `done` never returns a bare `Result`: the three-way branch in §4.7 (full
*   success / stale-hook 400 / any-other-failure) doesn't collapse cleanly
*   into ok-or-err, so it returns an explicit `AckOutcome` instead.
*
* SPDX-License-Identifier: Apache-2.0
*/

use crate::error::{AckOutcome, Error};
use async_trait::async_trait;
use aws_sdk_autoscaling::error::SdkError;
use aws_sdk_autoscaling::operation::complete_lifecycle_action::CompleteLifecycleActionError;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

#[async_trait]
pub trait AckHandler: fmt::Debug + Send + Sync {
    async fn done(&self) -> AckOutcome;
}

/// The no-op ack used by every event kind other than ASG-terminate.
#[derive(Debug, Default)]
pub struct NoopAck;

#[async_trait]
impl AckHandler for NoopAck {
    async fn done(&self) -> AckOutcome {
        AckOutcome::done()
    }
}

/// Completes an EC2 Auto Scaling lifecycle hook, per the table in §4.1.
#[derive(Debug)]
pub struct AsgAckHandler {
    client: Arc<aws_sdk_autoscaling::Client>,
    auto_scaling_group_name: String,
    lifecycle_hook_name: String,
    lifecycle_action_token: String,
    instance_id: String,
}

impl AsgAckHandler {
    pub fn new(
        client: Arc<aws_sdk_autoscaling::Client>,
        auto_scaling_group_name: String,
        lifecycle_hook_name: String,
        lifecycle_action_token: String,
        instance_id: String,
    ) -> Self {
        Self {
            client,
            auto_scaling_group_name,
            lifecycle_hook_name,
            lifecycle_action_token,
            instance_id,
        }
    }
}

#[async_trait]
impl AckHandler for AsgAckHandler {
    async fn done(&self) -> AckOutcome {
        let result = self
            .client
            .complete_lifecycle_action()
            .auto_scaling_group_name(&self.auto_scaling_group_name)
            .lifecycle_hook_name(&self.lifecycle_hook_name)
            .lifecycle_action_token(&self.lifecycle_action_token)
            .instance_id(&self.instance_id)
            .lifecycle_action_result("CONTINUE")
            .send()
            .await;

        match result {
            Ok(_) => {
                info!(
                    instance_id = %self.instance_id,
                    group = %self.auto_scaling_group_name,
                    "completed lifecycle hook"
                );
                AckOutcome::done()
            }
            Err(err) if is_status_400(&err) => {
                // The hook is already gone (expired or completed elsewhere).
                // Per §4.7 this is treated as success for delete purposes.
                warn!(
                    instance_id = %self.instance_id,
                    error = %err,
                    "lifecycle hook already completed or expired; treating as done"
                );
                AckOutcome::stale(Error::Ack(err.to_string()))
            }
            Err(err) => {
                warn!(
                    instance_id = %self.instance_id,
                    error = %err,
                    "lifecycle hook completion failed; message will be retried"
                );
                AckOutcome::retry(Error::Ack(err.to_string()))
            }
        }
    }
}

fn is_status_400(err: &SdkError<CompleteLifecycleActionError>) -> bool {
    match err {
        SdkError::ServiceError(service_err) => service_err.raw().status().as_u16() == 400,
        _ => false,
    }
}
