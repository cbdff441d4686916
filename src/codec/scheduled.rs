/*
* Copyright (C) 2025 Pedro Henrique / phkaiser13
*
* File: src/codec/scheduled.rs
*
* AWS Health Event / scheduled-change notification (§4.1 table, "Scheduled
* v1"). No acceptance filter beyond the (source, detail-type, version)
* match. Unlike the EC2-sourced kinds, the affected instances live in a
* list of entities rather than a single top-level field.
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

const SOURCE: &str = "aws.health";
const DETAIL_TYPE: &str = "AWS Health Event";
const VERSION: &str = "1";

#[derive(Deserialize, Debug)]
struct AffectedEntity {
    #[serde(rename = "entityValue")]
    entity_value: String,
}

#[derive(Deserialize, Debug)]
struct ScheduledDetail {
    #[serde(rename = "affectedEntities")]
    affected_entities: Vec<AffectedEntity>,
}

pub fn try_parse(envelope: &Envelope) -> Option<Event> {
    if !envelope.matches(SOURCE, DETAIL_TYPE, VERSION) {
        return None;
    }

    let detail: ScheduledDetail = match serde_json::from_value(envelope.detail.clone()) {
        Ok(d) => d,
        Err(err) => {
            warn!(error = %err, "malformed AWS Health event detail; rejecting");
            return None;
        }
    };

    let affected_instances: Vec<String> = detail
        .affected_entities
        .into_iter()
        .map(|e| e.entity_value)
        .collect();

    if affected_instances.is_empty() {
        warn!("AWS Health event carried no affected entities; rejecting");
        return None;
    }

    Some(Event {
        kind: ParsedKind::Known(EventKind::ScheduledChange),
        envelope: Some(envelope.clone()),
        affected_instances,
        ack: Arc::new(NoopAck),
    })
}
