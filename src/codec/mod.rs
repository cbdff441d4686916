/*
* Copyright (C) 2025 Pedro Henrique / phkaiser13
*
* File: src/codec/mod.rs
*
* Decodes a raw SQS message body into an `Event` (§4.1). The envelope is
* decoded once, then handed to each sub-parser in declaration order; the
* first one that accepts it wins. Sub-parsers are intentionally blind to
* each other — adding a new event kind means adding one more entry to
* `SUB_PARSERS`-equivalent dispatch below, nothing else.
*
* Fallback ladder, in order:
*   1. empty/whitespace-only payload -> no-op, no envelope
*   2. envelope fails to decode      -> no-op, no envelope, logged as error
*   3. no sub-parser accepts it      -> no-op carrying the decoded envelope
*
* SPDX-License-Identifier: Apache-2.0
*/

pub mod asg;
pub mod envelope;
pub mod rebalance;
pub mod scheduled;
pub mod spot;
pub mod state_change;

use crate::ack::{AckHandler, NoopAck};
use crate::crds::EventKind;
use envelope::Envelope;
use std::sync::Arc;
use tracing::{error, instrument};

/// Whether a decoded event matched one of the closed set of kinds the
/// operator knows how to act on, or fell through every sub-parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedKind {
    Known(EventKind),
    Unrecognized,
}

/// The result of decoding one queue message.
#[derive(Debug, Clone)]
pub struct Event {
    pub kind: ParsedKind,
    pub envelope: Option<Envelope>,
    pub affected_instances: Vec<String>,
    pub ack: Arc<dyn AckHandler>,
}

impl Event {
    fn noop(envelope: Option<Envelope>) -> Self {
        Self {
            kind: ParsedKind::Unrecognized,
            envelope,
            affected_instances: Vec::new(),
            ack: Arc::new(NoopAck),
        }
    }
}

/// A source of parsed events. Lets the reconciler depend on an abstract
/// collaborator rather than the concrete `Codec`, so tests can substitute a
/// fake that hands back pre-built `Event`s with fake ack handlers attached.
pub trait EventParser: Send + Sync {
    fn parse(&self, payload: &str) -> Event;
}

/// Decodes raw SQS message bodies into `Event`s. Holds the autoscaling
/// client so the ASG-terminate sub-parser can build an ack handler that
/// completes the lifecycle hook directly from the parsed event.
#[derive(Clone)]
pub struct Codec {
    autoscaling_client: Arc<aws_sdk_autoscaling::Client>,
}

impl EventParser for Codec {
    fn parse(&self, payload: &str) -> Event {
        Codec::parse(self, payload)
    }
}

impl Codec {
    pub fn new(autoscaling_client: Arc<aws_sdk_autoscaling::Client>) -> Self {
        Self { autoscaling_client }
    }

    #[instrument(skip(self, payload), fields(payload_len = payload.len()))]
    pub fn parse(&self, payload: &str) -> Event {
        if payload.trim().is_empty() {
            return Event::noop(None);
        }

        let envelope: Envelope = match serde_json::from_str(payload) {
            Ok(e) => e,
            Err(err) => {
                error!(error = %err, "failed to decode message envelope; treating as no-op");
                return Event::noop(None);
            }
        };

        if let Some(event) = asg::try_parse_v1(&envelope, &self.autoscaling_client) {
            return event;
        }
        if let Some(event) = asg::try_parse_v2(&envelope, &self.autoscaling_client) {
            return event;
        }
        if let Some(event) = rebalance::try_parse(&envelope) {
            return event;
        }
        if let Some(event) = spot::try_parse(&envelope) {
            return event;
        }
        if let Some(event) = state_change::try_parse(&envelope) {
            return event;
        }
        if let Some(event) = scheduled::try_parse(&envelope) {
            return event;
        }

        Event::noop(Some(envelope))
    }
}
