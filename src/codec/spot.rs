/*
* Copyright (C) 2025 Pedro Henrique / phkaiser13
*
* File: src/codec/spot.rs
*
* EC2 Spot Instance Interruption Warning (§4.1 table, "Spot v1"). No
* acceptance filter beyond the (source, detail-type, version) match.
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
const DETAIL_TYPE: &str = "EC2 Spot Instance Interruption Warning";
const VERSION: &str = "1";

#[derive(Deserialize, Debug)]
struct SpotDetail {
    #[serde(rename = "instance-id")]
    instance_id: String,
}

pub fn try_parse(envelope: &Envelope) -> Option<Event> {
    if !envelope.matches(SOURCE, DETAIL_TYPE, VERSION) {
        return None;
    }

    let detail: SpotDetail = match serde_json::from_value(envelope.detail.clone()) {
        Ok(d) => d,
        Err(err) => {
            warn!(error = %err, "malformed spot interruption detail; rejecting");
            return None;
        }
    };

    Some(Event {
        kind: ParsedKind::Known(EventKind::SpotInterruption),
        envelope: Some(envelope.clone()),
        affected_instances: vec![detail.instance_id],
        ack: Arc::new(NoopAck),
    })
}
