// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::model::{AttributeValue, PutRequest, WriteRequest};
use log::{debug, warn};
use serde_json::{Number, Value};

use crate::errors::{Error, Result};
use crate::playbooks::PlaybookCatalogEntry;
use crate::sources::{CatalogSource, Item, RecordSink};

/// BatchWriteItem accepts at most this many requests per call.
pub const BATCH_WRITE_LIMIT: usize = 25;
const MAX_UNPROCESSED_ROUNDS: usize = 5;

pub type AttributeMap = HashMap<String, AttributeValue>;

pub struct DynamoDbStore {
    client: aws_sdk_dynamodb::Client,
}

impl DynamoDbStore {
    pub fn new(client: aws_sdk_dynamodb::Client) -> Self {
        DynamoDbStore { client }
    }

    async fn scan_all(&self, table: &str) -> Result<Vec<AttributeMap>> {
        let mut items = Vec::new();
        let mut start_key: Option<AttributeMap> = None;
        loop {
            let output = self
                .client
                .scan()
                .table_name(table)
                .set_exclusive_start_key(start_key)
                .send()
                .await
                .map_err(|e| Error::storage(table, e))?;
            items.extend(output.items().unwrap_or_default().iter().cloned());
            start_key = output.last_evaluated_key().cloned();
            if start_key.is_none() {
                break;
            }
            debug!("Continuing scan of {} after {} items", table, items.len());
        }
        Ok(items)
    }

    async fn write_batch(&self, table: &str, mut requests: Vec<WriteRequest>) -> Result<()> {
        for _ in 0..MAX_UNPROCESSED_ROUNDS {
            let output = self
                .client
                .batch_write_item()
                .request_items(table, requests)
                .send()
                .await
                .map_err(|e| Error::storage(table, e))?;
            requests = output
                .unprocessed_items()
                .and_then(|unprocessed| unprocessed.get(table))
                .cloned()
                .unwrap_or_default();
            if requests.is_empty() {
                return Ok(());
            }
            warn!("{} items unprocessed for table {}, resubmitting", requests.len(), table);
        }
        Err(Error::storage(
            table,
            format!("{} items remained unprocessed", requests.len()),
        ))
    }
}

#[async_trait]
impl RecordSink for DynamoDbStore {
    async fn put_items(&self, table: &str, items: Vec<Item>) -> Result<()> {
        let total = items.len();
        let mut requests: Vec<WriteRequest> = items
            .into_iter()
            .map(|item| {
                WriteRequest::builder()
                    .put_request(PutRequest::builder().set_item(Some(to_attributes(item))).build())
                    .build()
            })
            .collect();
        while !requests.is_empty() {
            let rest = requests.split_off(requests.len().min(BATCH_WRITE_LIMIT));
            self.write_batch(table, requests).await?;
            requests = rest;
        }
        debug!("Wrote {} items to {}", total, table);
        Ok(())
    }
}

#[async_trait]
impl CatalogSource for DynamoDbStore {
    async fn playbook_entries(&self, table: &str) -> Result<Vec<PlaybookCatalogEntry>> {
        self.scan_all(table)
            .await?
            .iter()
            .map(|attributes| PlaybookCatalogEntry::from_item(&from_attributes(attributes)))
            .collect()
    }
}

pub fn to_attributes(item: Item) -> AttributeMap {
    item.into_iter()
        .map(|(name, value)| (name, to_attribute(value)))
        .collect()
}

pub fn to_attribute(value: Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s),
        Value::Array(values) => AttributeValue::L(values.into_iter().map(to_attribute).collect()),
        Value::Object(map) => AttributeValue::M(to_attributes(map)),
    }
}

pub fn from_attributes(attributes: &AttributeMap) -> Item {
    attributes
        .iter()
        .map(|(name, value)| (name.clone(), from_attribute(value)))
        .collect()
}

pub fn from_attribute(value: &AttributeValue) -> Value {
    match value {
        AttributeValue::S(s) => Value::String(s.clone()),
        AttributeValue::N(n) => number(n),
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::L(values) => Value::Array(values.iter().map(from_attribute).collect()),
        AttributeValue::M(map) => Value::Object(from_attributes(map)),
        AttributeValue::Ss(values) => {
            Value::Array(values.iter().map(|s| Value::String(s.clone())).collect())
        }
        AttributeValue::Ns(values) => Value::Array(values.iter().map(|n| number(n)).collect()),
        _ => Value::Null,
    }
}

fn number(n: &str) -> Value {
    match n.parse::<Number>() {
        Ok(number) => Value::Number(number),
        Err(_) => Value::String(n.to_string()),
    }
}
