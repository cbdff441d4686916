/*
* Copyright (C) 2025 Pedro Henrique / phkaiser13
*
* File: src/queue.rs
*
* Thin wrapper over the SQS receive/delete calls (§4.5), parameterized
* entirely by the `QueueBinding` the terminator spec carries. Delete is
* treated as idempotent: a receipt handle that's already gone is not an
* error from the reconciler's point of view, since the message has already
* achieved the only state the operator cares about.
*
* SPDX-License-Identifier: Apache-2.0
*/

use crate::crds::QueueBinding;
use crate::error::Error;
use async_trait::async_trait;
use aws_sdk_sqs::types::Message;
use tracing::{instrument, warn};

#[async_trait]
pub trait Queue: Send + Sync {
    async fn receive(&self, binding: &QueueBinding) -> Result<Vec<Message>, Error>;
    async fn delete(&self, queue_url: &str, receipt_handle: &str) -> Result<(), Error>;
}

pub struct SqsQueue {
    client: aws_sdk_sqs::Client,
}

impl SqsQueue {
    pub fn new(client: aws_sdk_sqs::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Queue for SqsQueue {
    #[instrument(skip(self, binding), fields(queue_url = %binding.queue_url))]
    async fn receive(&self, binding: &QueueBinding) -> Result<Vec<Message>, Error> {
        let attribute_names = binding
            .attribute_names
            .iter()
            .map(|name| aws_sdk_sqs::types::QueueAttributeName::from(name.as_str()))
            .collect();

        let response = self
            .client
            .receive_message()
            .queue_url(&binding.queue_url)
            .max_number_of_messages(binding.max_number_of_messages)
            .visibility_timeout(binding.visibility_timeout_seconds)
            .wait_time_seconds(binding.wait_time_seconds)
            .set_attribute_names(Some(attribute_names))
            .set_message_attribute_names(Some(binding.message_attribute_names.clone()))
            .send()
            .await
            .map_err(|err| Error::QueueReceive(err.to_string()))?;

        Ok(response.messages.unwrap_or_default())
    }

    #[instrument(skip(self))]
    async fn delete(&self, queue_url: &str, receipt_handle: &str) -> Result<(), Error> {
        let result = self
            .client
            .delete_message()
            .queue_url(queue_url)
            .receipt_handle(receipt_handle)
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) => {
                if is_already_gone(&err) {
                    warn!(
                        error = %err,
                        "receipt handle already invalid or message gone; treating delete as done"
                    );
                    Ok(())
                } else {
                    Err(Error::QueueDelete(err.to_string()))
                }
            }
        }
    }
}

fn is_already_gone<E: std::fmt::Display>(err: &E) -> bool {
    let message = err.to_string();
    message.contains("ReceiptHandleIsInvalid") || message.contains("NotFound")
}
