// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use calamine::{open_workbook_auto, DataType, Reader};
use indexmap::IndexMap;
use lazy_static::lazy_static;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{Error, Result};
use crate::remediation::normalize_prefix;
use crate::sources::Item;

pub const DEFAULT_LOE_HOURS: &str = "1";
pub const DEFAULT_LOE_SPRINTS: &str = "1";
pub const DEFAULT_SKILL_LEVEL: &str = "1";
pub const DEFAULT_RANK: &str = "1";

lazy_static! {
    // Rules whose mapping sheet id differs from the name AWS Config deploys them under
    static ref INCONSISTENT_NAMES: HashMap<&'static str, &'static str> = {
        let mut names = HashMap::with_capacity(5);
        names.insert("ec2-instance-managed-by-systems-manager", "ec2-instance-managed-by-ssm");
        names.insert("ec2-instances-in-vpc", "instances-in-vpc");
        names.insert("restricted-common-ports", "restricted-incoming-traffic");
        names.insert("restricted-ssh", "incoming-ssh-disabled");
        names.insert("iam-password-policy", "iam-password-policy-check");
        names
    };
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybookCatalogEntry {
    #[serde(rename = "ConfigRuleName")]
    pub rule_name: String,
    #[serde(rename = "PlaybookId")]
    pub playbook_id: String,
    #[serde(rename = "LOEHours")]
    pub loe_hours: String,
    #[serde(rename = "LOESprints")]
    pub loe_sprints: String,
    #[serde(rename = "SkillLevel")]
    pub skill_level: String,
    #[serde(rename = "Rank")]
    pub rank: String,
}

impl PlaybookCatalogEntry {
    ///
    /// Reads an entry from a stored item. Older loads wrote defaulted effort
    /// fields as numbers, so numeric attributes are accepted and rendered as
    /// strings.
    ///
    pub fn from_item(item: &Item) -> Result<Self> {
        Ok(PlaybookCatalogEntry {
            rule_name: string_attribute(item, "ConfigRuleName")?,
            playbook_id: string_attribute(item, "PlaybookId")?,
            loe_hours: string_attribute(item, "LOEHours")?,
            loe_sprints: string_attribute(item, "LOESprints")?,
            skill_level: string_attribute(item, "SkillLevel")?,
            rank: string_attribute(item, "Rank")?,
        })
    }
}

fn string_attribute(item: &Item, name: &str) -> Result<String> {
    match item.get(name) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(Error::MalformedCatalogEntry(name.to_string())),
    }
}

///
/// Playbooks grouped by normalized rule prefix, in the order they were loaded.
/// Every key is the output of [`normalize_prefix`] so lookups with a prefix
/// derived from an evaluation result always line up.
///
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybookCatalog {
    playbooks: IndexMap<String, Vec<PlaybookCatalogEntry>>,
}

impl PlaybookCatalog {
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = PlaybookCatalogEntry>,
    {
        let mut seen = HashSet::new();
        let mut playbooks: IndexMap<String, Vec<PlaybookCatalogEntry>> = IndexMap::new();
        for entry in entries {
            if !seen.insert((entry.rule_name.clone(), entry.playbook_id.clone())) {
                debug!(
                    "Dropping duplicate playbook {} for rule {}",
                    entry.playbook_id, entry.rule_name
                );
                continue;
            }
            playbooks
                .entry(normalize_prefix(&entry.rule_name))
                .or_default()
                .push(entry);
        }
        PlaybookCatalog { playbooks }
    }

    pub fn get(&self, prefix: &str) -> Option<&[PlaybookCatalogEntry]> {
        self.playbooks.get(prefix).map(Vec::as_slice)
    }

    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.playbooks.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.playbooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.playbooks.is_empty()
    }
}

///
/// One row of the rule to playbook mapping sheet. Only the rule id and the
/// playbook id are required; blank cells are treated as absent.
///
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PlaybookMappingRow {
    #[serde(rename = "AWS Config", default)]
    pub config_rule_id: Option<String>,
    #[serde(rename = "Playbook ID", default)]
    pub playbook_id: Option<String>,
    #[serde(rename = "LOEHours", default)]
    pub loe_hours: Option<String>,
    #[serde(rename = "LOESprints", default)]
    pub loe_sprints: Option<String>,
    #[serde(rename = "SkillLevel", default)]
    pub skill_level: Option<String>,
    #[serde(rename = "Rank", default)]
    pub rank: Option<String>,
}

pub fn normalize_mapping_name(id: &str) -> String {
    let name = INCONSISTENT_NAMES.get(id).copied().unwrap_or(id);
    name.to_uppercase().replace(['-', '_'], "")
}

fn cell(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn cell_or(value: &Option<String>, default: &str) -> String {
    cell(value).unwrap_or(default).to_string()
}

pub fn mapping_entries<I>(rows: I) -> Vec<PlaybookCatalogEntry>
where
    I: IntoIterator<Item = PlaybookMappingRow>,
{
    let mut keys = HashSet::new();
    let mut entries = Vec::new();
    for row in rows {
        let (rule_id, playbook_id) = match (cell(&row.config_rule_id), cell(&row.playbook_id)) {
            (Some(rule_id), Some(playbook_id)) => (rule_id, playbook_id),
            _ => continue,
        };
        info!("Config Rule Id: {}, Playbook Id: {}", rule_id, playbook_id);
        let rule_name = normalize_mapping_name(rule_id);
        if !keys.insert(format!("{}_{}", rule_name, playbook_id)) {
            continue;
        }
        entries.push(PlaybookCatalogEntry {
            rule_name,
            playbook_id: playbook_id.to_string(),
            loe_hours: cell_or(&row.loe_hours, DEFAULT_LOE_HOURS),
            loe_sprints: cell_or(&row.loe_sprints, DEFAULT_LOE_SPRINTS),
            skill_level: cell_or(&row.skill_level, DEFAULT_SKILL_LEVEL),
            rank: cell_or(&row.rank, DEFAULT_RANK),
        });
    }
    entries
}

///
/// Reads the mapping from a file. A `.csv` file is read as a CSV export of the
/// sheet; anything else is opened as a workbook.
///
pub fn read_mapping_file(path: &Path) -> Result<Vec<PlaybookMappingRow>> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("csv"));
    if is_csv {
        read_mapping_rows(BufReader::new(File::open(path)?))
    } else {
        read_mapping_workbook(path)
    }
}

///
/// Reads the first sheet of the mapping workbook. The first row holds the
/// column names; blank cells and unnamed columns are left out of the row.
///
pub fn read_mapping_workbook(path: &Path) -> Result<Vec<PlaybookMappingRow>> {
    let mut workbook = open_workbook_auto(path)?;
    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range?,
        None => return Ok(Vec::new()),
    };
    let mut rows = range.rows();
    let headers: Vec<Option<String>> = match rows.next() {
        Some(header) => header.iter().map(cell_text).collect(),
        None => return Ok(Vec::new()),
    };

    let mut mapping = Vec::new();
    for row in rows {
        let mut record = Item::new();
        for (header, value) in headers.iter().zip(row) {
            if let (Some(header), Some(text)) = (header, cell_text(value)) {
                record.insert(header.clone(), Value::String(text));
            }
        }
        mapping.push(serde_json::from_value(Value::Object(record))?);
    }
    debug!("Read {} rows from {}", mapping.len(), path.display());
    Ok(mapping)
}

// Whole numbers typed into the sheet come back as floats
fn cell_text(cell: &DataType) -> Option<String> {
    match cell {
        DataType::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        DataType::Int(i) => Some(i.to_string()),
        DataType::Float(f) if f.fract() == 0.0 => Some(format!("{}", *f as i64)),
        DataType::Float(f) => Some(f.to_string()),
        DataType::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Reads the CSV export of the mapping sheet, header row first.
pub fn read_mapping_rows<R: Read>(reader: R) -> Result<Vec<PlaybookMappingRow>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut rows = Vec::new();
    for row in csv_reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

#[cfg(test)]
#[path = "playbooks_tests.rs"]
mod playbooks_tests;
