// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashSet;

use log::debug;
use serde::Serialize;

use crate::compliance::EvaluationResult;
use crate::errors::Result;
use crate::playbooks::{PlaybookCatalog, PlaybookCatalogEntry};

/// Rules deployed through a conformance pack carry a pack specific suffix after this marker.
pub const CONFORMANCE_PACK_MARKER: &str = "-CONFORMANCE-PACK-";

///
/// Recovers the base identity of a rule so that it can be joined against the
/// playbook catalog regardless of which conformance pack deployed it.
///
/// The name is uppercased, everything from the first [`CONFORMANCE_PACK_MARKER`]
/// onwards is dropped, and all hyphens are removed.
///
/// ```
/// use compliance_dashboard::remediation::normalize_prefix;
///
/// assert_eq!("RESTRICTEDSSH", normalize_prefix("restricted-ssh-conformance-pack-ab12cd"));
/// assert_eq!("MYRULENAME", normalize_prefix("my-rule-name"));
/// ```
///
pub fn normalize_prefix(rule_name: &str) -> String {
    let upper = rule_name.to_uppercase();
    let base = match upper.find(CONFORMANCE_PACK_MARKER) {
        Some(idx) => &upper[..idx],
        None => upper.as_str(),
    };
    base.replace('-', "")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemediationWorkItem {
    #[serde(rename = "ConfigRuleNamePlaybookIdResourceId")]
    pub key: String,
    #[serde(rename = "ConfigRuleName")]
    pub config_rule_name: String,
    #[serde(rename = "ConfigRuleNamePrefix")]
    pub config_rule_name_prefix: String,
    #[serde(rename = "PlaybookId")]
    pub playbook_id: String,
    #[serde(rename = "ResourceType")]
    pub resource_type: String,
    #[serde(rename = "ResourceId")]
    pub resource_id: String,
    #[serde(rename = "LOEHours")]
    pub loe_hours: String,
    #[serde(rename = "LOESprints")]
    pub loe_sprints: String,
    #[serde(rename = "SkillLevel")]
    pub skill_level: String,
    #[serde(rename = "Rank")]
    pub rank: String,
}

// Kept undelimited so keys line up with records already stored by earlier runs
fn work_item_key(prefix: &str, playbook_id: &str, resource_id: &str) -> String {
    let mut key = String::with_capacity(prefix.len() + playbook_id.len() + resource_id.len());
    key.push_str(prefix);
    key.push_str(playbook_id);
    key.push_str(resource_id);
    key
}

///
/// The state of one processing session: every work item key emitted so far and
/// the work items themselves. A session must be owned by a single caller and
/// fed pages in order; keys are only unique within the session that saw them.
///
#[derive(Debug, Default)]
pub struct RemediationSession {
    seen_keys: HashSet<String>,
    work_items: Vec<RemediationWorkItem>,
}

impl RemediationSession {
    pub fn new() -> Self {
        Self::default()
    }

    ///
    /// Matches one page of evaluation results against the catalog and appends
    /// a work item for every (prefix, playbook, resource) not already seen in
    /// this session. Returns how many work items the page added.
    ///
    /// Only `NON_COMPLIANT` results are considered; results of any other or
    /// no compliance type are skipped. A non-compliant result without a rule
    /// name, resource type or resource id fails the page with
    /// [`crate::errors::Error::MalformedResult`]; work items matched earlier
    /// on the same page stay in the session.
    ///
    pub fn match_playbooks(
        &mut self,
        results: &[EvaluationResult],
        catalog: &PlaybookCatalog,
    ) -> Result<usize> {
        let before = self.work_items.len();
        for result in results {
            if !result.is_non_compliant() {
                continue;
            }
            let qualifier = result.qualifier()?;
            let prefix = normalize_prefix(qualifier.config_rule_name);
            let playbooks = match catalog.get(&prefix) {
                Some(playbooks) if !playbooks.is_empty() => playbooks,
                _ => continue,
            };
            debug!("Prefix {} matched {} playbook(s)", prefix, playbooks.len());

            for playbook in playbooks {
                let key = work_item_key(&prefix, &playbook.playbook_id, qualifier.resource_id);
                if self.seen_keys.contains(&key) {
                    debug!("Work item {} already emitted", key);
                    continue;
                }
                self.seen_keys.insert(key.clone());
                self.work_items.push(work_item(
                    key,
                    &prefix,
                    qualifier.config_rule_name,
                    qualifier.resource_type,
                    qualifier.resource_id,
                    playbook,
                ));
            }
        }
        Ok(self.work_items.len() - before)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.seen_keys.contains(key)
    }

    pub fn work_items(&self) -> &[RemediationWorkItem] {
        &self.work_items
    }

    pub fn len(&self) -> usize {
        self.work_items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.work_items.is_empty()
    }

    pub fn into_work_items(self) -> Vec<RemediationWorkItem> {
        self.work_items
    }
}

fn work_item(
    key: String,
    prefix: &str,
    config_rule_name: &str,
    resource_type: &str,
    resource_id: &str,
    playbook: &PlaybookCatalogEntry,
) -> RemediationWorkItem {
    RemediationWorkItem {
        key,
        config_rule_name: config_rule_name.to_string(),
        config_rule_name_prefix: prefix.to_string(),
        playbook_id: playbook.playbook_id.clone(),
        resource_type: resource_type.to_string(),
        resource_id: resource_id.to_string(),
        loe_hours: playbook.loe_hours.clone(),
        loe_sprints: playbook.loe_sprints.clone(),
        skill_level: playbook.skill_level.clone(),
        rank: playbook.rank.clone(),
    }
}

#[cfg(test)]
#[path = "remediation_tests.rs"]
mod remediation_tests;
