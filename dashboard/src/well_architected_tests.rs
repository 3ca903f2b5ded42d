use super::*;
use crate::errors::Error;
use async_trait::async_trait;
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::collections::HashMap;

fn event(value: serde_json::Value) -> CloudTrailEvent {
    serde_json::from_value(value).unwrap()
}

fn request() -> UpdateAnswerRequest {
    UpdateAnswerRequest {
        workload_id: "wl-1".to_string(),
        lens_alias: "wellarchitected".to_string(),
        question_id: "securely-operate".to_string(),
    }
}

fn summary(question_id: &str, risk: Option<&str>) -> AnswerSummary {
    AnswerSummary {
        question_id: question_id.to_string(),
        pillar_id: Some("security".to_string()),
        question_title: format!("Title of {}", question_id),
        risk: risk.map(String::from),
        selected_choices: vec![],
    }
}

struct PagedWorkloads {
    workload_name: Result<Option<String>>,
    lens_name: Result<Option<String>>,
    pages: HashMap<Option<String>, AnswerPage>,
}

fn lookup(value: &Result<Option<String>>) -> Result<Option<String>> {
    match value {
        Ok(name) => Ok(name.clone()),
        Err(e) => Err(Error::WorkloadApi(e.to_string())),
    }
}

#[async_trait]
impl WorkloadSource for PagedWorkloads {
    async fn workload_name(&self, _workload_id: &str) -> Result<Option<String>> {
        lookup(&self.workload_name)
    }

    async fn lens_name(&self, _lens_alias: &str) -> Result<Option<String>> {
        lookup(&self.lens_name)
    }

    async fn answers(
        &self,
        _workload_id: &str,
        _lens_alias: &str,
        next_token: Option<String>,
    ) -> Result<AnswerPage> {
        self.pages
            .get(&next_token)
            .cloned()
            .ok_or_else(|| Error::WorkloadApi(format!("no page for {:?}", next_token)))
    }
}

#[test]
fn test_update_answer_request_from_event() {
    let parsed = UpdateAnswerRequest::from_event(&event(serde_json::json!({
        "detail-type": "AWS API Call via CloudTrail",
        "source": "aws.wellarchitected",
        "detail": {
            "eventName": "UpdateAnswer",
            "requestParameters": {
                "WorkloadId": "wl-1",
                "LensAlias": "arn%3Aaws%3Awellarchitected%3Aus-east-1%3A123456789012%3Alens%2Fabc",
                "QuestionId": "securely-operate",
                "SelectedChoices": ["sec_securely_operate_multi_accounts"]
            }
        }
    })));

    assert_eq!(
        Some(UpdateAnswerRequest {
            workload_id: "wl-1".to_string(),
            lens_alias: "arn:aws:wellarchitected:us-east-1:123456789012:lens/abc".to_string(),
            question_id: "securely-operate".to_string(),
        }),
        parsed
    );
}

#[rstest]
#[case(serde_json::json!({"detail": {"eventName": "CreateWorkload", "requestParameters": {"WorkloadId": "wl-1", "LensAlias": "wellarchitected", "QuestionId": "q"}}}))]
#[case(serde_json::json!({"detail": {"eventName": "UpdateAnswer", "requestParameters": {"WorkloadId": "wl-1", "LensAlias": "wellarchitected"}}}))]
#[case(serde_json::json!({"detail": {"eventName": "UpdateAnswer", "requestParameters": {"WorkloadId": "", "LensAlias": "wellarchitected", "QuestionId": "q"}}}))]
#[case(serde_json::json!({"detail": {"eventName": "UpdateAnswer", "requestParameters": null}}))]
#[case(serde_json::json!({"detail": {"eventName": "UpdateAnswer"}}))]
#[case(serde_json::json!({"source": "aws.wellarchitected"}))]
fn test_events_without_answer_update_are_ignored(#[case] value: serde_json::Value) {
    assert_eq!(None, UpdateAnswerRequest::from_event(&event(value)));
}

#[test]
fn test_risk_collector_builds_records_per_page() {
    let request = request();
    let context = WorkloadContext {
        workload_name: Some("payments".to_string()),
        lens_name: None,
    };
    let mut collector = RiskCollector::new(&request, context);
    collector.add_page(&AnswerPage {
        answer_summaries: vec![summary("q1", Some("HIGH")), summary("q2", Some("NONE"))],
        next_token: Some("t1".to_string()),
    });
    collector.add_page(&AnswerPage {
        answer_summaries: vec![summary("q3", None)],
        next_token: None,
    });

    let (answer, risks) = collector.finish();
    assert_eq!(2, answer.answer_summaries.len());
    assert_eq!(vec!["q1", "q2", "q3"], risks.iter().map(|r| r.question_id.as_str()).collect::<Vec<_>>());
    assert_eq!(
        RiskRecord {
            workload_id_lens_alias: "wl-1wellarchitected".to_string(),
            question_id: "q1".to_string(),
            workload_id: "wl-1".to_string(),
            workload_name: Some("payments".to_string()),
            lens_alias: "wellarchitected".to_string(),
            lens_name: None,
            question_title: "Title of q1".to_string(),
            risk: Some("HIGH".to_string()),
        },
        risks[0]
    );

    let stored = serde_json::to_value(&risks[2]).unwrap();
    assert_eq!(
        serde_json::json!({
            "WorkloadIdLensAlias": "wl-1wellarchitected",
            "QuestionId": "q3",
            "WorkloadId": "wl-1",
            "WorkloadName": "payments",
            "LensAlias": "wellarchitected",
            "QuestionTitle": "Title of q3"
        }),
        stored
    );
}

struct CapturingLogger;

lazy_static::lazy_static! {
    static ref CAPTURED: std::sync::Mutex<Vec<(log::Level, String)>> = std::sync::Mutex::new(Vec::new());
}

static LOGGER: CapturingLogger = CapturingLogger;

impl log::Log for CapturingLogger {
    fn enabled(&self, _metadata: &log::Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &log::Record<'_>) {
        CAPTURED
            .lock()
            .unwrap()
            .push((record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}

#[tokio::test]
async fn test_failed_lookups_are_logged_as_warnings() {
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(log::LevelFilter::Trace);
    let source = PagedWorkloads {
        workload_name: Err(Error::WorkloadApi("ThrottlingException".to_string())),
        lens_name: Err(Error::WorkloadApi("ThrottlingException".to_string())),
        pages: HashMap::new(),
    };
    WorkloadContext::fetch(&source, &request()).await;

    let lookups: Vec<log::Level> = CAPTURED
        .lock()
        .unwrap()
        .iter()
        .filter(|(_, message)| message.starts_with("Could not look up"))
        .map(|(level, _)| *level)
        .collect();
    assert!(lookups.len() >= 2);
    assert!(lookups.iter().all(|level| *level == log::Level::Warn));
}

#[tokio::test]
async fn test_failed_lookups_degrade_to_absent_names() {
    let source = PagedWorkloads {
        workload_name: Err(Error::WorkloadApi("AccessDeniedException".to_string())),
        lens_name: Ok(Some("AWS Well-Architected Framework".to_string())),
        pages: HashMap::new(),
    };
    let context = WorkloadContext::fetch(&source, &request()).await;
    assert_eq!(
        WorkloadContext {
            workload_name: None,
            lens_name: Some("AWS Well-Architected Framework".to_string()),
        },
        context
    );
}

#[tokio::test]
async fn test_collect_risks_follows_next_token() -> Result<()> {
    let mut pages = HashMap::new();
    pages.insert(
        None,
        AnswerPage {
            answer_summaries: vec![summary("q1", Some("HIGH"))],
            next_token: Some("page-2".to_string()),
        },
    );
    pages.insert(
        Some("page-2".to_string()),
        AnswerPage {
            answer_summaries: vec![summary("q2", Some("MEDIUM")), summary("q3", Some("NONE"))],
            next_token: None,
        },
    );
    let source = PagedWorkloads {
        workload_name: Ok(Some("payments".to_string())),
        lens_name: Ok(Some("AWS Well-Architected Framework".to_string())),
        pages,
    };

    let request = request();
    let context = WorkloadContext::fetch(&source, &request).await;
    let (answer, risks) = collect_risks(&source, &request, context).await?;
    assert_eq!(2, answer.answer_summaries.len());
    assert_eq!(1, answer.answer_summaries[0].len());
    assert_eq!(3, risks.len());
    assert!(risks
        .iter()
        .all(|r| r.lens_name.as_deref() == Some("AWS Well-Architected Framework")));
    Ok(())
}

#[tokio::test]
async fn test_collect_risks_propagates_answer_failures() {
    let source = PagedWorkloads {
        workload_name: Ok(None),
        lens_name: Ok(None),
        pages: HashMap::new(),
    };
    let request = request();
    let result = collect_risks(&source, &request, WorkloadContext::default()).await;
    assert!(matches!(result, Err(Error::WorkloadApi(_))));
}
