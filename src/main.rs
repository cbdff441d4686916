/* Copyright (C) 2025 Pedro Henrique / phkaiser13
* Archive: src/main.rs
*
* Entry point for the node-terminator operator. It is responsible for
* setting up and running the controller manager, which hosts the
* reconciliation loop for the `NodeTerminator` custom resource.
*
* Architecture:
* The program follows the standard `kube-rs` operator structure.
* 1.  **Initialization**: it begins by initializing a Kubernetes client,
*     the AWS SDK clients the reconciler needs, and `tracing` for
*     structured logging.
* 2.  **Controller**: a single `Controller` over `Api<NodeTerminator>` is
*     instantiated to manage the watch and reconcile loop.
* 3.  **Shared Context**: a `Context` carrying the Kubernetes client, the
*     AWS SDK clients, and a concurrency-bounding semaphore is handed to
*     every reconcile invocation.
* 4.  **Concurrent Execution**: the metrics server and the controller are
*     run concurrently via `tokio::join!`.
*
* SPDX-License-Identifier: Apache-2.0 */

use futures::stream::StreamExt;
use kube::Client;
use kube_runtime::Controller;
use opentelemetry::global;
use opentelemetry_jaeger::Uninstall;
use prometheus::{Encoder, Registry, TextEncoder};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};
use warp::Filter;

mod ack;
mod action;
mod actuator;
mod codec;
mod controllers;
mod crds;
mod error;
mod metrics;
mod nodestore;
mod notifier;
mod queue;
mod resolver;

use controllers::terminator_controller::{self, Context};
use crds::NodeTerminator;

/// Initializes the OpenTelemetry pipeline for Jaeger.
fn init_telemetry() -> Result<Uninstall, Box<dyn std::error::Error>> {
    let tracer = opentelemetry_jaeger::new_agent_pipeline()
        .with_service_name("node-terminator-operator")
        .install_batch(opentelemetry::runtime::Tokio)?;

    let telemetry = tracing_opentelemetry::layer().with_tracer(tracer);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().json();

    tracing_subscriber::registry()
        .with(filter)
        .with(telemetry)
        .with(fmt_layer)
        .try_init()?;

    Ok(global::shutdown_tracer_provider)
}

/// Renders the metrics into the Prometheus text format.
async fn metrics_handler(registry: Arc<Registry>) -> Result<impl warp::Reply, warp::Rejection> {
    let encoder = TextEncoder::new();
    let mut buffer = vec![];
    encoder
        .encode(&registry.gather(), &mut buffer)
        .expect("failed to encode metrics");

    let response = String::from_utf8(buffer.clone()).expect("metrics output is not valid utf-8");
    Ok(warp::reply::with_header(
        response,
        "Content-Type",
        encoder.format_type(),
    ))
}

/// Runs the HTTP server to expose the /metrics endpoint.
async fn run_metrics_server(registry: Arc<Registry>) {
    let metrics_route = warp::path("metrics")
        .and(warp::get())
        .and(warp::any().map(move || Arc::clone(&registry)))
        .and_then(metrics_handler);

    info!("starting metrics server on 0.0.0.0:9090");
    warp::serve(metrics_route).run(([0, 0, 0, 0], 9090)).await;
}

fn max_concurrent_reconciles() -> usize {
    std::env::var("MAX_CONCURRENT_RECONCILES")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(10)
}

/// The main entry point of the operator.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let shutdown_tracer = init_telemetry()?;
    info!("telemetry initialized");

    let client = Client::try_default().await?;
    let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .load()
        .await;

    let context = Arc::new(Context {
        client: client.clone(),
        ec2_client: aws_sdk_ec2::Client::new(&aws_config),
        sqs_client: aws_sdk_sqs::Client::new(&aws_config),
        autoscaling_client: Arc::new(aws_sdk_autoscaling::Client::new(&aws_config)),
        semaphore: Arc::new(Semaphore::new(max_concurrent_reconciles())),
    });

    let registry = Arc::new(metrics::create_and_register_metrics()?);
    info!("custom metrics registered");

    let terminators = kube::Api::<NodeTerminator>::all(client.clone());

    info!("node-terminator-operator starting");

    tokio::join!(
        run_metrics_server(registry.clone()),
        Controller::new(terminators, Default::default())
            .run(
                terminator_controller::reconcile,
                terminator_controller::error_policy,
                context.clone(),
            )
            .for_each(|res| async move {
                match res {
                    Ok(o) => info!("reconciled NodeTerminator: {:?}", o),
                    Err(e) => error!("NodeTerminator reconcile error: {}", e),
                }
            }),
    );

    info!("node-terminator-operator shutting down");
    global::shutdown_tracer_provider();

    Ok(())
}
