/*
* Copyright (C) 2025 Pedro Henrique / phkaiser13
*
* File: src/codec/state_change.rs
*
* EC2 Instance State-change Notification (§4.1 table, "StateChange v1").
* Accepted only when the reported state is one the operator treats as
* terminal-ish: stopping, stopped, shutting-down, terminated
* (case-insensitive).
*
* SPDX-License-Identifier: Apache-2.0
*/

use super::envelope::Envelope;
use super::{Event, ParsedKind};
use crate::ack::NoopAck;
use crate::crds::EventKind;
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

const SOURCE: &str = "aws.ec2";
const DETAIL_TYPE: &str = "EC2 Instance State-change Notification";
const VERSION: &str = "1";

const ACCEPTED_STATES: &[&str] = &["stopping", "stopped", "shutting-down", "terminated"];

#[derive(Deserialize, Debug)]
struct StateChangeDetail {
    #[serde(rename = "instance-id")]
    instance_id: String,
    state: String,
}

pub fn try_parse(envelope: &Envelope) -> Option<Event> {
    if !envelope.matches(SOURCE, DETAIL_TYPE, VERSION) {
        return None;
    }

    let detail: StateChangeDetail = match serde_json::from_value(envelope.detail.clone()) {
        Ok(d) => d,
        Err(err) => {
            warn!(error = %err, "malformed state-change detail; rejecting");
            return None;
        }
    };

    let state_lower = detail.state.to_lowercase();
    if !ACCEPTED_STATES.contains(&state_lower.as_str()) {
        warn!(state = %detail.state, "state-change notification state not in accepted set; rejecting");
        return None;
    }

    Some(Event {
        kind: ParsedKind::Known(EventKind::StateChange),
        envelope: Some(envelope.clone()),
        affected_instances: vec![detail.instance_id],
        ack: Arc::new(NoopAck),
    })
}
