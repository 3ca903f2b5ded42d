// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::errors::{Error, Result};
use crate::playbooks::PlaybookCatalogEntry;
use crate::sources::{CatalogSource, Item, RecordSink};

///
/// Tables kept in memory. Items are appended in write order, so repeated
/// writes of the same key are visible as separate items.
///
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<String, Vec<Item>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(self, table: &str, items: Vec<Item>) -> Self {
        self.tables
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(table.to_string())
            .or_default()
            .extend(items);
        self
    }

    pub fn items(&self, table: &str) -> Vec<Item> {
        self.tables
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(table)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl RecordSink for MemoryStore {
    async fn put_items(&self, table: &str, items: Vec<Item>) -> Result<()> {
        let mut tables = self
            .tables
            .lock()
            .map_err(|e| Error::storage(table, e))?;
        tables.entry(table.to_string()).or_default().extend(items);
        Ok(())
    }
}

#[async_trait]
impl CatalogSource for MemoryStore {
    async fn playbook_entries(&self, table: &str) -> Result<Vec<PlaybookCatalogEntry>> {
        self.items(table)
            .iter()
            .map(PlaybookCatalogEntry::from_item)
            .collect()
    }
}
