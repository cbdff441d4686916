/*
* Copyright (C) 2025 Pedro Henrique / phkaiser13
*
* File: src/codec/asg.rs
*
* The two ASG-terminate schema versions (§4.1 table, rows "ASG-terminate
* v1"/"ASG-terminate v2"). Both versions share the same detail-type and
* acceptance filter and differ only in the envelope `version` field, so one
* sub-parser serves both, parameterized by the version string it's asked to
* match.
*
* SPDX-License-Identifier: Apache-2.0
*/

use super::envelope::Envelope;
use super::{Event, ParsedKind};
use crate::ack::AsgAckHandler;
use crate::crds::EventKind;
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

const SOURCE: &str = "aws.autoscaling";
const DETAIL_TYPE: &str = "EC2 Instance-terminate Lifecycle Action";
const LIFECYCLE_TRANSITION: &str = "autoscaling:EC2_INSTANCE_TERMINATING";

#[derive(Deserialize, Debug)]
struct AsgDetail {
    #[serde(rename = "LifecycleTransition")]
    lifecycle_transition: String,
    #[serde(rename = "AutoScalingGroupName")]
    auto_scaling_group_name: String,
    #[serde(rename = "EC2InstanceId")]
    ec2_instance_id: String,
    #[serde(rename = "LifecycleHookName")]
    lifecycle_hook_name: String,
    #[serde(rename = "LifecycleActionToken")]
    lifecycle_action_token: String,
}

fn try_parse_version(
    envelope: &Envelope,
    version: &str,
    autoscaling_client: &Arc<aws_sdk_autoscaling::Client>,
) -> Option<Event> {
    if !envelope.matches(SOURCE, DETAIL_TYPE, version) {
        return None;
    }

    let detail: AsgDetail = match serde_json::from_value(envelope.detail.clone()) {
        Ok(d) => d,
        Err(err) => {
            warn!(error = %err, version, "malformed ASG terminate detail; rejecting");
            return None;
        }
    };

    if detail.lifecycle_transition != LIFECYCLE_TRANSITION {
        warn!(
            transition = %detail.lifecycle_transition,
            "ASG lifecycle transition did not match EC2_INSTANCE_TERMINATING, rejecting"
        );
        return None;
    }

    let ack = AsgAckHandler::new(
        autoscaling_client.clone(),
        detail.auto_scaling_group_name,
        detail.lifecycle_hook_name,
        detail.lifecycle_action_token,
        detail.ec2_instance_id.clone(),
    );

    Some(Event {
        kind: ParsedKind::Known(EventKind::AutoScalingTermination),
        envelope: Some(envelope.clone()),
        affected_instances: vec![detail.ec2_instance_id],
        ack: Arc::new(ack),
    })
}

pub fn try_parse_v1(
    envelope: &Envelope,
    autoscaling_client: &Arc<aws_sdk_autoscaling::Client>,
) -> Option<Event> {
    try_parse_version(envelope, "1", autoscaling_client)
}

pub fn try_parse_v2(
    envelope: &Envelope,
    autoscaling_client: &Arc<aws_sdk_autoscaling::Client>,
) -> Option<Event> {
    try_parse_version(envelope, "2", autoscaling_client)
}
