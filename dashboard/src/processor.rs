// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use log::{debug, info};
use serde::Serialize;

use crate::compliance::{process_details, process_scores, ConformancePackScore, ScorePage};
use crate::config::{ConformancePackTables, WellArchitectedTables};
use crate::errors::Result;
use crate::playbooks::{mapping_entries, PlaybookCatalog, PlaybookCatalogEntry, PlaybookMappingRow};
use crate::remediation::RemediationSession;
use crate::sources::{
    to_item, to_items, CatalogSource, ComplianceSource, RecordSink, WorkloadSource,
};
use crate::well_architected::{collect_risks, UpdateAnswerRequest, WorkloadContext};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingSummary {
    pub conformance_packs: usize,
    pub details: usize,
    pub remediations: usize,
}

pub struct ConformancePackProcessor<'a, C, P, S> {
    compliance: &'a C,
    catalog_source: &'a P,
    sink: &'a S,
    tables: &'a ConformancePackTables,
}

impl<'a, C, P, S> ConformancePackProcessor<'a, C, P, S>
where
    C: ComplianceSource + Sync,
    P: CatalogSource + Sync,
    S: RecordSink + Sync,
{
    pub fn new(
        compliance: &'a C,
        catalog_source: &'a P,
        sink: &'a S,
        tables: &'a ConformancePackTables,
    ) -> Self {
        ConformancePackProcessor {
            compliance,
            catalog_source,
            sink,
            tables,
        }
    }

    ///
    /// Runs one session: the catalog is loaded once, every score page and
    /// every detail page of every pack is visited in order, and a single
    /// [`RemediationSession`] is threaded through all of them. Detail records
    /// are written after each score page; work items and scores once the last
    /// page has been processed.
    ///
    pub async fn run(&self) -> Result<ProcessingSummary> {
        info!(
            "Summary Table Name: {}, Detail Table Name: {}, Playbook Table Name: {}, Remediation Table Name: {}",
            self.tables.summary, self.tables.detail, self.tables.playbook, self.tables.remediation
        );
        let catalog = PlaybookCatalog::from_entries(
            self.catalog_source
                .playbook_entries(&self.tables.playbook)
                .await?,
        );
        info!("Loaded playbooks for {} rule prefixes", catalog.len());

        let mut session = RemediationSession::new();
        let mut scores: Vec<ConformancePackScore> = Vec::new();
        let mut summary = ProcessingSummary::default();
        let mut next_token = None;
        loop {
            let page = self.compliance.compliance_scores(next_token).await?;
            summary.details += self.process_details(&page, &catalog, &mut session).await?;
            scores.extend(process_scores(&page));
            next_token = page.next_token;
            if next_token.is_none() {
                break;
            }
            debug!("nextToken: {:?}", next_token);
        }

        summary.conformance_packs = scores.len();
        summary.remediations = session.len();
        self.write(&self.tables.remediation, session.work_items()).await?;
        self.write(&self.tables.summary, &scores).await?;
        info!(
            "Processed {} conformance packs, {} evaluation results, {} remediations",
            summary.conformance_packs, summary.details, summary.remediations
        );
        Ok(summary)
    }

    async fn process_details(
        &self,
        scores: &ScorePage,
        catalog: &PlaybookCatalog,
        session: &mut RemediationSession,
    ) -> Result<usize> {
        let mut details = Vec::new();
        for score in &scores.scores {
            let mut next_token = None;
            loop {
                let page = self
                    .compliance
                    .compliance_details(&score.conformance_pack_name, next_token)
                    .await?;
                details.extend(process_details(&page)?);
                let added = session.match_playbooks(&page.results, catalog)?;
                debug!(
                    "Conformance pack {}: {} results, {} new remediations",
                    page.conformance_pack_name,
                    page.results.len(),
                    added
                );
                next_token = page.next_token;
                if next_token.is_none() {
                    break;
                }
                debug!("nextToken: {:?}", next_token);
            }
        }
        let count = details.len();
        self.write(&self.tables.detail, &details).await?;
        Ok(count)
    }

    async fn write<T: Serialize>(&self, table: &str, records: &[T]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        self.sink.put_items(table, to_items(records)?).await
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskSummary {
    pub answer_pages: usize,
    pub risks: usize,
    pub workload_name_resolved: bool,
    pub lens_name_resolved: bool,
}

pub struct WellArchitectedProcessor<'a, W, S> {
    workloads: &'a W,
    sink: &'a S,
    tables: &'a WellArchitectedTables,
}

impl<'a, W, S> WellArchitectedProcessor<'a, W, S>
where
    W: WorkloadSource + Sync,
    S: RecordSink + Sync,
{
    pub fn new(workloads: &'a W, sink: &'a S, tables: &'a WellArchitectedTables) -> Self {
        WellArchitectedProcessor {
            workloads,
            sink,
            tables,
        }
    }

    pub async fn run(&self, request: &UpdateAnswerRequest) -> Result<RiskSummary> {
        let context = WorkloadContext::fetch(self.workloads, request).await;
        let mut summary = RiskSummary {
            workload_name_resolved: context.workload_name.is_some(),
            lens_name_resolved: context.lens_name.is_some(),
            ..RiskSummary::default()
        };
        let (answer, risks) = collect_risks(self.workloads, request, context).await?;
        summary.answer_pages = answer.answer_summaries.len();
        summary.risks = risks.len();

        self.sink
            .put_items(&self.tables.answers, vec![to_item(&answer)?])
            .await?;
        if !risks.is_empty() {
            self.sink.put_items(&self.tables.risks, to_items(&risks)?).await?;
        }
        info!(
            "Stored {} risks for workload {} lens {}",
            summary.risks, request.workload_id, request.lens_alias
        );
        Ok(summary)
    }
}

///
/// Turns the rows of the rule to playbook mapping sheet into catalog entries
/// and writes them to `table`. Returns the entries written.
///
pub async fn load_playbook_mapping<S>(
    rows: Vec<PlaybookMappingRow>,
    sink: &S,
    table: &str,
) -> Result<Vec<PlaybookCatalogEntry>>
where
    S: RecordSink + Sync,
{
    let entries = mapping_entries(rows);
    if !entries.is_empty() {
        sink.put_items(table, to_items(&entries)?).await?;
    }
    info!("Loaded {} playbook mappings into {}", entries.len(), table);
    Ok(entries)
}

#[cfg(test)]
#[path = "processor_tests.rs"]
mod processor_tests;
