/*
* Copyright (C) 2025 Pedro Henrique / phkaiser13
*
* File: src/controllers/terminator_controller.rs
*
* The reconciler: one invocation handles one tick of one `NodeTerminator`
* (§4.8). The six top-level steps and the per-message protocol M1-M7 are
* laid out as a single linear `async fn` with no early return on a
* per-message failure, so a bad message never blocks the rest of the batch.
*
* SPDX-License-Identifier: Apache-2.0
*/

use crate::ack::AckHandler;
use crate::action;
use crate::actuator::{KubeNodeActuator, NodeActuator};
use crate::codec::{Codec, Event, EventParser, ParsedKind};
use crate::crds::{Action, NodeTerminator, NodeTerminatorSpec, NodeTerminatorStatus, StatusCondition};
use crate::error::Error;
use crate::metrics;
use crate::nodestore::{KubeNodeStore, NodeStore};
use crate::notifier::{Notifier, ReqwestNotifier};
use crate::queue::{Queue, SqsQueue};
use crate::resolver::{Ec2InstanceResolver, InstanceResolver};

use chrono::Utc;
use kube::api::{Patch, PatchParams};
use kube::{Api, Client, ResourceExt};
use kube_runtime::controller::Action as ReconcileAction;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{error, field, instrument, warn};

/// Shared state handed to every reconcile invocation (teacher convention:
/// `dr_controller::Context`, `autoheal_controller::Context`).
pub struct Context {
    pub client: Client,
    pub ec2_client: aws_sdk_ec2::Client,
    pub sqs_client: aws_sdk_sqs::Client,
    pub autoscaling_client: Arc<aws_sdk_autoscaling::Client>,
    pub semaphore: Arc<Semaphore>,
}

fn event_kind_label(kind: &ParsedKind) -> &'static str {
    match kind {
        ParsedKind::Known(k) => k.as_label(),
        ParsedKind::Unrecognized => "Unrecognized",
    }
}

/// Tallies accumulated over one tick, folded into the status patch at the
/// end regardless of whether the tick ultimately succeeds.
#[derive(Default)]
struct TickTally {
    received: u64,
    deleted: u64,
    retained: u64,
    errors: Vec<Error>,
}

#[instrument(skip(obj, ctx), fields(terminator = %obj.name_any(), namespace = field::Empty))]
pub async fn reconcile(
    obj: Arc<NodeTerminator>,
    ctx: Arc<Context>,
) -> Result<ReconcileAction, Error> {
    let _permit = ctx
        .semaphore
        .clone()
        .acquire_owned()
        .await
        .expect("semaphore is never closed");

    let namespace = obj.namespace().ok_or(Error::MissingNamespace)?;
    tracing::Span::current().record("namespace", field::display(&namespace));

    let spec = &obj.spec;

    let queue = SqsQueue::new(ctx.sqs_client.clone());
    let resolver = Ec2InstanceResolver::new(ctx.ec2_client.clone());
    let node_store = KubeNodeStore::new(ctx.client.clone());
    let actuator = KubeNodeActuator::new(ctx.client.clone());
    let codec = Codec::new(ctx.autoscaling_client.clone());
    let notifier = spec.webhook.is_some().then(ReqwestNotifier::new);

    let messages = queue
        .receive(&spec.queue)
        .await
        .map_err(|err| {
            error!(error = %err, "queue receive failed");
            err
        })?;

    let mut tally = TickTally {
        received: messages.len() as u64,
        ..Default::default()
    };

    for message in messages {
        let body = message.body.clone().unwrap_or_default();
        let Some(receipt_handle) = message.receipt_handle.clone() else {
            warn!("message carried no receipt handle; skipping");
            continue;
        };

        handle_message(
            &body,
            &receipt_handle,
            spec,
            &codec,
            &resolver,
            &node_store,
            &actuator,
            notifier.as_ref(),
            &queue,
            &mut tally,
        )
        .await;
    }

    metrics::MESSAGES_RECEIVED_TOTAL.inc_by(tally.received);
    metrics::MESSAGES_DELETED_TOTAL.inc_by(tally.deleted);
    metrics::MESSAGES_RETAINED_TOTAL.inc_by(tally.retained);

    update_status(&obj, &namespace, &ctx.client, &tally).await;

    if !tally.errors.is_empty() {
        for err in &tally.errors {
            error!(error = %err, "message in this tick failed");
        }
        return Err(Error::Batch(tally.errors.len()));
    }

    Ok(ReconcileAction::requeue(Duration::from_secs(
        spec.requeue_after_seconds,
    )))
}

#[allow(clippy::too_many_arguments)]
async fn handle_message(
    body: &str,
    receipt_handle: &str,
    spec: &NodeTerminatorSpec,
    codec: &dyn EventParser,
    resolver: &dyn InstanceResolver,
    node_store: &dyn NodeStore,
    actuator: &dyn NodeActuator,
    notifier: Option<&ReqwestNotifier>,
    queue: &dyn Queue,
    tally: &mut TickTally,
) {
    let event: Event = codec.parse(body);
    let action = action::resolve(&event.kind, &spec.action_policy);
    let kind_label = event_kind_label(&event.kind);

    let mut all_instances_handled = true;

    if action != Action::NoAction {
        for instance_id in &event.affected_instances {
            let node_name = match resolver.resolve(instance_id).await {
                Ok(name) => name,
                Err(err) => {
                    warn!(instance_id, error = %err, "instance resolution failed");
                    tally.errors.push(err);
                    all_instances_handled = false;
                    continue;
                }
            };

            match node_store.get(&node_name, &spec.node_selector).await {
                Ok(Some(_)) => {}
                Ok(None) => {
                    warn!(instance_id, node = %node_name, "node not found in cluster; skipping");
                    all_instances_handled = false;
                    continue;
                }
                Err(err) => {
                    warn!(instance_id, node = %node_name, error = %err, "node fetch failed");
                    tally.errors.push(err);
                    all_instances_handled = false;
                    continue;
                }
            }

            if let (Some(notifier), Some(webhook)) = (notifier, &spec.webhook) {
                notifier.notify(webhook, kind_label, instance_id, &node_name).await;
            }

            if let Err(err) = actuator.cordon(&node_name).await {
                metrics::ACTIONS_TOTAL.with_label_values(&["cordon", "failure"]).inc();
                tally.errors.push(err);
                all_instances_handled = false;
                continue;
            }
            metrics::ACTIONS_TOTAL.with_label_values(&["cordon", "success"]).inc();

            if action == Action::CordonAndDrain {
                let started = std::time::Instant::now();
                let result = actuator.drain(&node_name, &spec.drain).await;
                metrics::DRAIN_LATENCY_SECONDS.observe(started.elapsed().as_secs_f64());
                if let Err(err) = result {
                    metrics::ACTIONS_TOTAL.with_label_values(&["drain", "failure"]).inc();
                    tally.errors.push(err);
                    all_instances_handled = false;
                    continue;
                }
                metrics::ACTIONS_TOTAL.with_label_values(&["drain", "success"]).inc();
            }
        }
    }

    let outcome = event.ack.done().await;
    let try_again = outcome.try_again;
    if let Some(err) = outcome.error {
        tally.errors.push(err);
    }

    if try_again || !all_instances_handled {
        tally.retained += 1;
        return;
    }

    match queue.delete(&spec.queue.queue_url, receipt_handle).await {
        Ok(()) => tally.deleted += 1,
        Err(err) => tally.errors.push(err),
    }
}

async fn update_status(obj: &NodeTerminator, namespace: &str, client: &Client, tally: &TickTally) {
    let api: Api<NodeTerminator> = Api::namespaced(client.clone(), namespace);
    let name = obj.name_any();

    let mut conditions = vec![StatusCondition::new(
        "Reconciled",
        format!(
            "received={} deleted={} retained={} errors={}",
            tally.received,
            tally.deleted,
            tally.retained,
            tally.errors.len()
        ),
    )];
    if !tally.errors.is_empty() {
        conditions.push(StatusCondition::new(
            "Degraded",
            format!("{} message(s) failed in the last tick", tally.errors.len()),
        ));
    }

    let status = NodeTerminatorStatus {
        last_reconcile_time: Some(Utc::now().to_rfc3339()),
        messages_received: tally.received,
        messages_deleted: tally.deleted,
        messages_retained: tally.retained,
        conditions,
    };

    let patch = Patch::Merge(json!({ "status": status }));
    if let Err(err) = api
        .patch_status(&name, &PatchParams::default(), &patch)
        .await
    {
        warn!(error = %err, terminator = %name, "failed to patch status");
    }
}

pub fn error_policy(_obj: Arc<NodeTerminator>, err: &Error, _ctx: Arc<Context>) -> ReconcileAction {
    error!(error = %err, "reconcile failed");
    ReconcileAction::requeue(Duration::from_secs(30))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ack::AckHandler;
    use crate::crds::{ActionPolicy, DrainPolicy, EventKind, QueueBinding};
    use crate::error::AckOutcome;
    use async_trait::async_trait;
    use aws_sdk_sqs::types::Message;
    use k8s_openapi::api::core::v1::Node;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FakeParser {
        events: Mutex<Vec<Event>>,
    }

    impl FakeParser {
        fn one(event: Event) -> Self {
            Self {
                events: Mutex::new(vec![event]),
            }
        }
    }

    impl EventParser for FakeParser {
        fn parse(&self, _payload: &str) -> Event {
            self.events.lock().unwrap().remove(0)
        }
    }

    struct FakeAck {
        try_again: bool,
        failed: bool,
    }

    #[async_trait]
    impl AckHandler for FakeAck {
        async fn done(&self) -> AckOutcome {
            if self.failed {
                if self.try_again {
                    AckOutcome::retry(Error::Ack("synthetic failure".into()))
                } else {
                    AckOutcome::stale(Error::Ack("synthetic 400".into()))
                }
            } else {
                AckOutcome::done()
            }
        }
    }

    struct FakeResolver {
        nodes: BTreeMap<String, String>,
        fail_for: Vec<String>,
    }

    #[async_trait]
    impl InstanceResolver for FakeResolver {
        async fn resolve(&self, instance_id: &str) -> Result<String, Error> {
            if self.fail_for.contains(&instance_id.to_string()) {
                return Err(Error::Resolve {
                    instance_id: instance_id.to_string(),
                    reason: "synthetic failure".to_string(),
                });
            }
            self.nodes
                .get(instance_id)
                .cloned()
                .ok_or_else(|| Error::Resolve {
                    instance_id: instance_id.to_string(),
                    reason: "no reservation found for instance".to_string(),
                })
        }
    }

    struct FakeNodeStore {
        present: Vec<String>,
    }

    #[async_trait]
    impl NodeStore for FakeNodeStore {
        async fn get(
            &self,
            name: &str,
            _match_labels: &BTreeMap<String, String>,
        ) -> Result<Option<Node>, Error> {
            if self.present.contains(&name.to_string()) {
                Ok(Some(Node::default()))
            } else {
                Ok(None)
            }
        }
    }

    #[derive(Default)]
    struct FakeActuator {
        cordoned: Mutex<Vec<String>>,
        drained: Mutex<Vec<String>>,
        fail_drain_for: Vec<String>,
        call_log: Mutex<Vec<(&'static str, String)>>,
    }

    #[async_trait]
    impl NodeActuator for FakeActuator {
        async fn cordon(&self, node: &str) -> Result<(), Error> {
            self.cordoned.lock().unwrap().push(node.to_string());
            self.call_log.lock().unwrap().push(("cordon", node.to_string()));
            Ok(())
        }

        async fn drain(&self, node: &str, _policy: &DrainPolicy) -> Result<(), Error> {
            self.call_log.lock().unwrap().push(("drain", node.to_string()));
            if self.fail_drain_for.contains(&node.to_string()) {
                return Err(Error::Drain {
                    node: node.to_string(),
                    reason: "synthetic failure".to_string(),
                });
            }
            self.drained.lock().unwrap().push(node.to_string());
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeQueue {
        deleted: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Queue for FakeQueue {
        async fn receive(&self, _binding: &QueueBinding) -> Result<Vec<Message>, Error> {
            Ok(vec![])
        }

        async fn delete(&self, _queue_url: &str, receipt_handle: &str) -> Result<(), Error> {
            self.deleted.lock().unwrap().push(receipt_handle.to_string());
            Ok(())
        }
    }

    fn test_spec() -> NodeTerminatorSpec {
        let mut policy = ActionPolicy::default();
        policy.0.insert(EventKind::SpotInterruption, Action::CordonAndDrain);
        policy.0.insert(EventKind::AutoScalingTermination, Action::CordonAndDrain);
        policy.0.insert(EventKind::ScheduledChange, Action::CordonAndDrain);

        NodeTerminatorSpec {
            queue: QueueBinding {
                queue_url: "https://sqs.example/queue".to_string(),
                max_number_of_messages: 10,
                visibility_timeout_seconds: 20,
                wait_time_seconds: 20,
                attribute_names: vec!["All".to_string()],
                message_attribute_names: vec!["SentTimestamp".to_string()],
            },
            drain: DrainPolicy {
                force: false,
                grace_period_seconds: 30,
                ignore_daemon_sets: true,
                delete_empty_dir_data: false,
                timeout_seconds: 120,
            },
            node_selector: BTreeMap::new(),
            action_policy: policy,
            webhook: None,
            requeue_after_seconds: 10,
        }
    }

    fn spot_event(instance_id: &str) -> Event {
        Event {
            kind: ParsedKind::Known(EventKind::SpotInterruption),
            envelope: None,
            affected_instances: vec![instance_id.to_string()],
            ack: Arc::new(crate::ack::NoopAck),
        }
    }

    #[tokio::test]
    async fn spot_interruption_cordons_and_drains_then_deletes() {
        let spec = test_spec();
        let parser = FakeParser::one(spot_event("instanceId-1"));
        let resolver = FakeResolver {
            nodes: BTreeMap::from([("instanceId-1".to_string(), "node-1".to_string())]),
            fail_for: vec![],
        };
        let node_store = FakeNodeStore {
            present: vec!["node-1".to_string()],
        };
        let actuator = FakeActuator::default();
        let queue = FakeQueue::default();
        let mut tally = TickTally::default();

        handle_message(
            "{}",
            "receipt-1",
            &spec,
            &parser,
            &resolver,
            &node_store,
            &actuator,
            None,
            &queue,
            &mut tally,
        )
        .await;

        assert_eq!(*actuator.cordoned.lock().unwrap(), vec!["node-1"]);
        assert_eq!(*actuator.drained.lock().unwrap(), vec!["node-1"]);
        assert_eq!(*queue.deleted.lock().unwrap(), vec!["receipt-1"]);
        assert_eq!(tally.deleted, 1);
        assert_eq!(tally.retained, 0);
        assert!(tally.errors.is_empty());
    }

    #[tokio::test]
    async fn asg_terminate_cordon_succeeds_drain_fails_retains_message() {
        let spec = test_spec();
        let event = Event {
            kind: ParsedKind::Known(EventKind::AutoScalingTermination),
            envelope: None,
            affected_instances: vec!["instanceId-1".to_string()],
            ack: Arc::new(crate::ack::NoopAck),
        };
        let parser = FakeParser::one(event);
        let resolver = FakeResolver {
            nodes: BTreeMap::from([("instanceId-1".to_string(), "node-1".to_string())]),
            fail_for: vec![],
        };
        let node_store = FakeNodeStore {
            present: vec!["node-1".to_string()],
        };
        let actuator = FakeActuator {
            fail_drain_for: vec!["node-1".to_string()],
            ..Default::default()
        };
        let queue = FakeQueue::default();
        let mut tally = TickTally::default();

        handle_message(
            "{}", "receipt-1", &spec, &parser, &resolver, &node_store, &actuator, None, &queue,
            &mut tally,
        )
        .await;

        assert_eq!(*actuator.cordoned.lock().unwrap(), vec!["node-1"]);
        assert!(actuator.drained.lock().unwrap().is_empty());
        assert!(queue.deleted.lock().unwrap().is_empty());
        assert_eq!(tally.retained, 1);
        assert_eq!(tally.errors.len(), 1);
    }

    #[tokio::test]
    async fn scheduled_change_with_two_entities_cordons_and_drains_both() {
        let spec = test_spec();
        let event = Event {
            kind: ParsedKind::Known(EventKind::ScheduledChange),
            envelope: None,
            affected_instances: vec!["instanceId-4".to_string(), "instanceId-5".to_string()],
            ack: Arc::new(crate::ack::NoopAck),
        };
        let parser = FakeParser::one(event);
        let resolver = FakeResolver {
            nodes: BTreeMap::from([
                ("instanceId-4".to_string(), "node-4".to_string()),
                ("instanceId-5".to_string(), "node-5".to_string()),
            ]),
            fail_for: vec![],
        };
        let node_store = FakeNodeStore {
            present: vec!["node-4".to_string(), "node-5".to_string()],
        };
        let actuator = FakeActuator::default();
        let queue = FakeQueue::default();
        let mut tally = TickTally::default();

        handle_message(
            "{}", "receipt-1", &spec, &parser, &resolver, &node_store, &actuator, None, &queue,
            &mut tally,
        )
        .await;

        let mut cordoned = actuator.cordoned.lock().unwrap().clone();
        cordoned.sort();
        assert_eq!(cordoned, vec!["node-4", "node-5"]);
        assert_eq!(*queue.deleted.lock().unwrap(), vec!["receipt-1"]);
        assert_eq!(tally.deleted, 1);
    }

    #[tokio::test]
    async fn unrecognized_payload_is_deleted_without_action() {
        let spec = test_spec();
        let event = Event {
            kind: ParsedKind::Unrecognized,
            envelope: None,
            affected_instances: vec![],
            ack: Arc::new(crate::ack::NoopAck),
        };
        let parser = FakeParser::one(event);
        let resolver = FakeResolver {
            nodes: BTreeMap::new(),
            fail_for: vec![],
        };
        let node_store = FakeNodeStore { present: vec![] };
        let actuator = FakeActuator::default();
        let queue = FakeQueue::default();
        let mut tally = TickTally::default();

        handle_message(
            "{}", "receipt-1", &spec, &parser, &resolver, &node_store, &actuator, None, &queue,
            &mut tally,
        )
        .await;

        assert!(actuator.cordoned.lock().unwrap().is_empty());
        assert_eq!(*queue.deleted.lock().unwrap(), vec!["receipt-1"]);
        assert!(tally.errors.is_empty());
    }

    #[tokio::test]
    async fn asg_ack_non_400_failure_retains_message_after_successful_drain() {
        let spec = test_spec();
        let event = Event {
            kind: ParsedKind::Known(EventKind::AutoScalingTermination),
            envelope: None,
            affected_instances: vec!["instanceId-1".to_string()],
            ack: Arc::new(FakeAck {
                try_again: true,
                failed: true,
            }),
        };
        let parser = FakeParser::one(event);
        let resolver = FakeResolver {
            nodes: BTreeMap::from([("instanceId-1".to_string(), "node-1".to_string())]),
            fail_for: vec![],
        };
        let node_store = FakeNodeStore {
            present: vec!["node-1".to_string()],
        };
        let actuator = FakeActuator::default();
        let queue = FakeQueue::default();
        let mut tally = TickTally::default();

        handle_message(
            "{}", "receipt-1", &spec, &parser, &resolver, &node_store, &actuator, None, &queue,
            &mut tally,
        )
        .await;

        assert_eq!(*actuator.cordoned.lock().unwrap(), vec!["node-1"]);
        assert_eq!(*actuator.drained.lock().unwrap(), vec!["node-1"]);
        assert!(queue.deleted.lock().unwrap().is_empty());
        assert_eq!(tally.retained, 1);
        assert_eq!(tally.errors.len(), 1);
    }

    #[tokio::test]
    async fn asg_ack_stale_400_deletes_message_after_successful_drain() {
        let spec = test_spec();
        let event = Event {
            kind: ParsedKind::Known(EventKind::AutoScalingTermination),
            envelope: None,
            affected_instances: vec!["instanceId-1".to_string()],
            ack: Arc::new(FakeAck {
                try_again: false,
                failed: true,
            }),
        };
        let parser = FakeParser::one(event);
        let resolver = FakeResolver {
            nodes: BTreeMap::from([("instanceId-1".to_string(), "node-1".to_string())]),
            fail_for: vec![],
        };
        let node_store = FakeNodeStore {
            present: vec!["node-1".to_string()],
        };
        let actuator = FakeActuator::default();
        let queue = FakeQueue::default();
        let mut tally = TickTally::default();

        handle_message(
            "{}", "receipt-1", &spec, &parser, &resolver, &node_store, &actuator, None, &queue,
            &mut tally,
        )
        .await;

        assert_eq!(*queue.deleted.lock().unwrap(), vec!["receipt-1"]);
        assert_eq!(tally.deleted, 1);
        assert_eq!(tally.errors.len(), 1);
    }

    #[tokio::test]
    async fn instance_resolution_failure_retains_message_and_accumulates_error() {
        let spec = test_spec();
        let event = spot_event("instanceId-1");
        let parser = FakeParser::one(event);
        let resolver = FakeResolver {
            nodes: BTreeMap::new(),
            fail_for: vec!["instanceId-1".to_string()],
        };
        let node_store = FakeNodeStore { present: vec![] };
        let actuator = FakeActuator::default();
        let queue = FakeQueue::default();
        let mut tally = TickTally::default();

        handle_message(
            "{}", "receipt-1", &spec, &parser, &resolver, &node_store, &actuator, None, &queue,
            &mut tally,
        )
        .await;

        assert!(actuator.cordoned.lock().unwrap().is_empty());
        assert!(queue.deleted.lock().unwrap().is_empty());
        assert_eq!(tally.retained, 1);
        assert_eq!(tally.errors.len(), 1);
    }

    #[tokio::test]
    async fn node_not_found_is_informational_not_an_error() {
        let spec = test_spec();
        let event = spot_event("instanceId-1");
        let parser = FakeParser::one(event);
        let resolver = FakeResolver {
            nodes: BTreeMap::from([("instanceId-1".to_string(), "node-1".to_string())]),
            fail_for: vec![],
        };
        let node_store = FakeNodeStore { present: vec![] };
        let actuator = FakeActuator::default();
        let queue = FakeQueue::default();
        let mut tally = TickTally::default();

        handle_message(
            "{}", "receipt-1", &spec, &parser, &resolver, &node_store, &actuator, None, &queue,
            &mut tally,
        )
        .await;

        assert!(actuator.cordoned.lock().unwrap().is_empty());
        assert!(queue.deleted.lock().unwrap().is_empty());
        assert_eq!(tally.retained, 1);
        assert!(tally.errors.is_empty());
    }

    // P4: replaying the same no-op message N times yields N deletes and 0
    // cordon/drain calls.
    #[tokio::test]
    async fn idempotence_replaying_noop_message_never_actuates() {
        let spec = test_spec();
        let actuator = FakeActuator::default();
        let queue = FakeQueue::default();
        let resolver = FakeResolver {
            nodes: BTreeMap::new(),
            fail_for: vec![],
        };
        let node_store = FakeNodeStore { present: vec![] };
        let attempts = AtomicUsize::new(0);

        for _ in 0..3 {
            let idx = attempts.fetch_add(1, Ordering::SeqCst);
            let event = Event {
                kind: ParsedKind::Unrecognized,
                envelope: None,
                affected_instances: vec![],
                ack: Arc::new(crate::ack::NoopAck),
            };
            let parser = FakeParser::one(event);
            let mut tally = TickTally::default();
            handle_message(
                "{}",
                &format!("receipt-{idx}"),
                &spec,
                &parser,
                &resolver,
                &node_store,
                &actuator,
                None,
                &queue,
                &mut tally,
            )
            .await;
            assert_eq!(tally.deleted, 1);
        }

        assert!(actuator.cordoned.lock().unwrap().is_empty());
        assert!(actuator.drained.lock().unwrap().is_empty());
        assert_eq!(queue.deleted.lock().unwrap().len(), 3);
    }

    // P2: drain is never invoked for a node before cordon was invoked for it.
    #[tokio::test]
    async fn cordon_always_precedes_drain_for_the_same_node() {
        let spec = test_spec();
        let parser = FakeParser::one(spot_event("instanceId-1"));
        let resolver = FakeResolver {
            nodes: BTreeMap::from([("instanceId-1".to_string(), "node-1".to_string())]),
            fail_for: vec![],
        };
        let node_store = FakeNodeStore {
            present: vec!["node-1".to_string()],
        };
        let actuator = FakeActuator::default();
        let queue = FakeQueue::default();
        let mut tally = TickTally::default();

        handle_message(
            "{}", "receipt-1", &spec, &parser, &resolver, &node_store, &actuator, None, &queue,
            &mut tally,
        )
        .await;

        let log = actuator.call_log.lock().unwrap();
        let cordon_idx = log.iter().position(|(op, _)| *op == "cordon").unwrap();
        let drain_idx = log.iter().position(|(op, _)| *op == "drain").unwrap();
        assert!(cordon_idx < drain_idx);
    }
}
