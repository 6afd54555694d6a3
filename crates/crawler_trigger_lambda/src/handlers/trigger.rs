use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::adapters::crawler::CrawlerStarter;

pub const CRAWLER_ENV_VAR: &str = "CRAWLER";
pub const RESPONSE_MESSAGE: &str = "Hello from Lambda!";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiGatewayResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

/// What actually happened to the crawler start request. Never reflected in the
/// [`ApiGatewayResponse`]; callers that care must inspect it here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlerStartOutcome {
    Started,
    StartFailed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerReport {
    pub outcome: CrawlerStartOutcome,
    pub response: ApiGatewayResponse,
}

impl TriggerReport {
    pub fn crawler_started(&self) -> bool {
        self.outcome == CrawlerStartOutcome::Started
    }
}

/// Fires one crawler start and reports success to the caller regardless of the
/// result. A failed start is written to stdout and otherwise dropped.
pub fn handle_trigger_event(
    request_id: &str,
    crawler_name: Option<&str>,
    starter: &dyn CrawlerStarter,
) -> TriggerReport {
    log_trigger_info(
        "invocation_received",
        json!({
            "request_id": request_id,
        }),
    );

    log_trigger_info(
        "crawler_start_requested",
        json!({
            "request_id": request_id,
            "crawler": crawler_name,
        }),
    );

    let outcome = match starter.start_crawler(crawler_name) {
        Ok(()) => CrawlerStartOutcome::Started,
        Err(message) => {
            log_trigger_error(
                "crawler_start_failed",
                json!({
                    "request_id": request_id,
                    "crawler": crawler_name,
                    "message": message.clone(),
                }),
            );
            CrawlerStartOutcome::StartFailed { message }
        }
    };

    TriggerReport {
        outcome,
        response: fixed_success_response(),
    }
}

pub fn fixed_success_response() -> ApiGatewayResponse {
    ApiGatewayResponse {
        status_code: 200,
        body: serde_json::Value::from(RESPONSE_MESSAGE).to_string(),
    }
}

fn log_trigger_info(event: &str, details: serde_json::Value) {
    eprintln!(
        "{}",
        json!({
            "component": "crawler_trigger",
            "event": event,
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "details": details,
        })
    );
}

// Swallowed failures are only visible in the function's stdout log stream.
fn log_trigger_error(event: &str, details: serde_json::Value) {
    println!(
        "{}",
        json!({
            "component": "crawler_trigger",
            "level": "error",
            "event": event,
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "details": details,
        })
    );
}
