//! Console output formatter for backend results

use colored::Colorize;
use ragdash_application::{Completion, HealthView};
use ragdash_domain::{
    ComponentHealth, ContextDocument, HealthDetails, HealthStatus, SessionState, StreamSession,
};
use serde_json::json;

/// Longest content preview shown by `context list`.
const PREVIEW_CHARS: usize = 72;

/// Formats backend results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the stored context documents
    pub fn format_contexts(docs: &[ContextDocument]) -> String {
        if docs.is_empty() {
            return format!("{}\n", "No context documents.".dimmed());
        }

        let mut output = Self::section_header(&format!("Context documents ({})", docs.len()));
        for doc in docs {
            output.push_str(&format!(
                "\n{} {}\n{}\n",
                doc.title.yellow().bold(),
                format!("[{}]", doc.id).dimmed(),
                Self::indent(&Self::preview(&doc.content), "  ")
            ));
        }
        output
    }

    pub fn format_contexts_json(docs: &[ContextDocument]) -> String {
        serde_json::to_string_pretty(&json!({ "contexts": docs }))
            .unwrap_or_else(|_| "{}".to_string())
    }

    /// Format the latest health view
    pub fn format_health(view: &HealthView) -> String {
        match view {
            HealthView::Loading => format!("{}\n", "Loading health status...".dimmed()),
            HealthView::Failed(message) => format!(
                "{} {}\n",
                "Failed to fetch health status:".red().bold(),
                message
            ),
            HealthView::Ready(report) => {
                let mut output = Self::section_header("Backend health");
                let overall = if report.all_healthy() {
                    "all services connected".green().bold()
                } else {
                    "degraded".red().bold()
                };
                output.push_str(&format!("{:<14} {}\n", "Overall:", overall));
                output.push_str(&Self::component("Database", &report.database));
                output.push_str(&Self::component("Elasticsearch", &report.elasticsearch));
                output
            }
        }
    }

    pub fn format_health_json(view: &HealthView) -> String {
        let value = match view {
            HealthView::Loading => json!({ "state": "loading" }),
            HealthView::Ready(report) => json!({ "state": "ready", "report": report }),
            HealthView::Failed(message) => json!({ "state": "failed", "error": message }),
        };
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format a non-streamed response
    pub fn format_completion(completion: &Completion) -> String {
        let mut output = format!("{}\n", completion.generated_text);
        if !completion.context_used.is_empty() {
            output.push_str(&format!(
                "\n{} {} document(s)\n",
                "Context used:".cyan().bold(),
                completion.context_used.len()
            ));
        }
        output
    }

    pub fn format_completion_json(completion: &Completion) -> String {
        serde_json::to_string_pretty(completion).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format a finished session as JSON
    pub fn format_session_json(session: &StreamSession) -> String {
        serde_json::to_string_pretty(session).unwrap_or_else(|_| "{}".to_string())
    }

    /// One-line status for a session that did not complete, if any
    pub fn session_status(session: &StreamSession) -> Option<String> {
        match session.state() {
            SessionState::Failed(failure) => Some(format!(
                "{} {} ({})",
                "Error:".red().bold(),
                failure,
                failure.kind.as_str()
            )),
            SessionState::Cancelled => Some(format!("{}", "Cancelled.".yellow())),
            _ => None,
        }
    }

    fn component(name: &str, health: &ComponentHealth) -> String {
        let status = match &health.status {
            HealthStatus::Connected => health.status.as_str().green().bold(),
            HealthStatus::Initializing => health.status.as_str().yellow().bold(),
            HealthStatus::Error => health.status.as_str().red().bold(),
            _ => health.status.as_str().dimmed(),
        };

        let mut output = format!("\n{:<14} {}\n", format!("{}:", name).cyan(), status);
        match &health.details {
            Some(HealthDetails::Message(message)) => {
                output.push_str(&format!("  {}\n", message));
            }
            Some(HealthDetails::Cluster(cluster)) => {
                output.push_str(&format!("  Cluster name:          {}\n", cluster.cluster_name));
                output.push_str(&format!("  Cluster status:        {}\n", cluster.status));
                output.push_str(&format!(
                    "  Number of nodes:       {}\n",
                    cluster.number_of_nodes
                ));
                output.push_str(&format!(
                    "  Active primary shards: {}\n",
                    cluster.active_primary_shards
                ));
            }
            None => {}
        }
        output
    }

    fn preview(content: &str) -> String {
        let line = content.lines().next().unwrap_or("");
        let mut preview: String = line.chars().take(PREVIEW_CHARS).collect();
        if preview.len() < content.len() {
            preview.push_str("...");
        }
        preview
    }

    fn section_header(title: &str) -> String {
        format!("{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragdash_domain::{
        ClusterHealth, ContextDraft, HealthReport, RequestId, SessionFailure,
    };

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_format_contexts_lists_titles_and_ids() {
        plain();
        let docs = vec![
            ContextDocument::new("a1", ContextDraft::new("Runbook", "Restart the worker.")),
            ContextDocument::new("b2", ContextDraft::new("Notes", "line one\nline two")),
        ];
        let output = ConsoleFormatter::format_contexts(&docs);
        assert!(output.contains("Context documents (2)"));
        assert!(output.contains("Runbook [a1]"));
        assert!(output.contains("  Restart the worker."));
        assert!(output.contains("  line one..."));
    }

    #[test]
    fn test_format_contexts_empty() {
        plain();
        assert!(ConsoleFormatter::format_contexts(&[]).contains("No context documents."));
    }

    #[test]
    fn test_format_contexts_json_shape() {
        let docs = vec![ContextDocument::new("a1", ContextDraft::new("T", "C"))];
        let value: serde_json::Value =
            serde_json::from_str(&ConsoleFormatter::format_contexts_json(&docs)).unwrap();
        assert_eq!(value["contexts"][0]["id"], "a1");
    }

    #[test]
    fn test_format_health_report() {
        plain();
        let view = HealthView::Ready(HealthReport {
            database: ComponentHealth {
                status: HealthStatus::Connected,
                details: Some(HealthDetails::Message("Database connection successful".into())),
            },
            elasticsearch: ComponentHealth {
                status: HealthStatus::Connected,
                details: Some(HealthDetails::Cluster(ClusterHealth {
                    cluster_name: "docker-cluster".to_string(),
                    status: "green".to_string(),
                    number_of_nodes: 1,
                    active_primary_shards: 4,
                })),
            },
        });
        let output = ConsoleFormatter::format_health(&view);
        assert!(output.contains("Overall:       all services connected"));
        assert!(output.contains("Database:"));
        assert!(output.contains("Database connection successful"));
        assert!(output.contains("Cluster name:          docker-cluster"));
        assert!(output.contains("Active primary shards: 4"));
    }

    #[test]
    fn test_format_health_degraded() {
        plain();
        let view = HealthView::Ready(HealthReport {
            database: ComponentHealth {
                status: HealthStatus::Error,
                details: Some(HealthDetails::Message("connection refused".into())),
            },
            elasticsearch: ComponentHealth {
                status: HealthStatus::Connected,
                details: None,
            },
        });
        let output = ConsoleFormatter::format_health(&view);
        assert!(output.contains("Overall:       degraded"));
        assert!(output.contains("connection refused"));
    }

    #[test]
    fn test_format_health_failure() {
        plain();
        let output = ConsoleFormatter::format_health(&HealthView::Failed("refused".into()));
        assert!(output.contains("Failed to fetch health status: refused"));

        let value: serde_json::Value = serde_json::from_str(
            &ConsoleFormatter::format_health_json(&HealthView::Failed("refused".into())),
        )
        .unwrap();
        assert_eq!(value["state"], "failed");
    }

    #[test]
    fn test_session_status_only_for_unfinished_sessions() {
        plain();
        let mut session = StreamSession::new(RequestId::new(1));
        session.append("partial");
        session.complete();
        assert!(ConsoleFormatter::session_status(&session).is_none());

        let mut failed = StreamSession::new(RequestId::new(2));
        failed.fail(SessionFailure::http_status(500, "boom"));
        let status = ConsoleFormatter::session_status(&failed).unwrap();
        assert!(status.contains("HTTP 500: boom"));

        let mut cancelled = StreamSession::new(RequestId::new(3));
        cancelled.cancel();
        assert_eq!(
            ConsoleFormatter::session_status(&cancelled).as_deref(),
            Some("Cancelled.")
        );
    }

    #[test]
    fn test_format_completion_mentions_context() {
        plain();
        let completion = Completion {
            generated_text: "Answer".to_string(),
            context_used: vec![json!({"title": "Doc"})],
        };
        let output = ConsoleFormatter::format_completion(&completion);
        assert!(output.starts_with("Answer\n"));
        assert!(output.contains("Context used: 1 document(s)"));
    }
}
