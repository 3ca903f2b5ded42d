// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::compliance::{DetailPage, ScorePage};
use crate::errors::{Error, Result};
use crate::playbooks::PlaybookCatalogEntry;
use crate::well_architected::AnswerPage;

/// A record as handed to storage: attribute name to value.
pub type Item = serde_json::Map<String, Value>;

pub fn to_item<T: Serialize>(record: &T) -> Result<Item> {
    match serde_json::to_value(record)? {
        Value::Object(map) => Ok(map),
        other => Err(Error::JsonError(serde::ser::Error::custom(format!(
            "expected a record to serialize as an object, found {}",
            other
        )))),
    }
}

pub fn to_items<T: Serialize>(records: &[T]) -> Result<Vec<Item>> {
    records.iter().map(to_item).collect()
}

/// Conformance pack compliance, one page per call. A `next_token` on the
/// returned page means more pages follow.
#[async_trait]
pub trait ComplianceSource {
    async fn compliance_scores(&self, next_token: Option<String>) -> Result<ScorePage>;
    async fn compliance_details(
        &self,
        conformance_pack_name: &str,
        next_token: Option<String>,
    ) -> Result<DetailPage>;
}

#[async_trait]
pub trait WorkloadSource {
    async fn workload_name(&self, workload_id: &str) -> Result<Option<String>>;
    async fn lens_name(&self, lens_alias: &str) -> Result<Option<String>>;
    async fn answers(
        &self,
        workload_id: &str,
        lens_alias: &str,
        next_token: Option<String>,
    ) -> Result<AnswerPage>;
}

/// The stored playbook catalog, fully read.
#[async_trait]
pub trait CatalogSource {
    async fn playbook_entries(&self, table: &str) -> Result<Vec<PlaybookCatalogEntry>>;
}

#[async_trait]
pub trait RecordSink {
    async fn put_items(&self, table: &str, items: Vec<Item>) -> Result<()>;
}
