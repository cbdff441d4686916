/*
* Copyright (C) 2025 Pedro Henrique / phkaiser13
*
* File: src/resolver.rs
*
* Resolves an EC2 instance ID to the node name that identifies it inside
* the cluster (§4.3). AWS clusters name nodes after the instance's private
* DNS name by default, so the resolver's only job is to ask EC2 for that
* name; whether a matching `Node` object actually exists in the cluster is
* a separate question answered by the node store in `src/nodestore.rs`.
*
* SPDX-License-Identifier: Apache-2.0
*/

use crate::error::Error;
use async_trait::async_trait;

#[async_trait]
pub trait InstanceResolver: Send + Sync {
    /// Resolves a single EC2 instance ID to the node name backing it.
    async fn resolve(&self, instance_id: &str) -> Result<String, Error>;
}

pub struct Ec2InstanceResolver {
    client: aws_sdk_ec2::Client,
}

impl Ec2InstanceResolver {
    pub fn new(client: aws_sdk_ec2::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl InstanceResolver for Ec2InstanceResolver {
    async fn resolve(&self, instance_id: &str) -> Result<String, Error> {
        let response = self
            .client
            .describe_instances()
            .instance_ids(instance_id)
            .send()
            .await
            .map_err(|err| Error::Resolve {
                instance_id: instance_id.to_string(),
                reason: err.to_string(),
            })?;

        let reservation = response
            .reservations
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| Error::Resolve {
                instance_id: instance_id.to_string(),
                reason: "no reservation found for instance".to_string(),
            })?;

        let instance = reservation
            .instances
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| Error::Resolve {
                instance_id: instance_id.to_string(),
                reason: "no instance within reservation".to_string(),
            })?;

        let private_dns_name = instance.private_dns_name.unwrap_or_default();
        if private_dns_name.is_empty() {
            return Err(Error::Resolve {
                instance_id: instance_id.to_string(),
                reason: "instance has no private DNS name".to_string(),
            });
        }

        Ok(private_dns_name)
    }
}
