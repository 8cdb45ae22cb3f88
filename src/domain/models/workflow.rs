#[cfg(test)]
#[path = "workflow_test.rs"]
mod tests;

use chrono::TimeZone;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Run status as stored by the backend. The client drives every transition and
/// the backend refuses the ones `can_transition_to` rejects.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "lowercase")]
pub enum WorkflowStatus {
    Pending,
    Running,
    Success,
    Failed(String),
}

impl WorkflowStatus {
    pub fn is_active(&self) -> bool {
        return matches!(self, WorkflowStatus::Pending | WorkflowStatus::Running);
    }

    pub fn is_terminal(&self) -> bool {
        return !self.is_active();
    }

    /// pending -> running | failed (cancelled), running -> success | failed.
    pub fn can_transition_to(&self, next: &WorkflowStatus) -> bool {
        match (self, next) {
            (WorkflowStatus::Pending, WorkflowStatus::Running) => return true,
            (WorkflowStatus::Pending, WorkflowStatus::Failed(_)) => return true,
            (WorkflowStatus::Running, WorkflowStatus::Success) => return true,
            (WorkflowStatus::Running, WorkflowStatus::Failed(_)) => return true,
            _ => return false,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WorkflowStatus::Pending => return "pending",
            WorkflowStatus::Running => return "running",
            WorkflowStatus::Success => return "success",
            WorkflowStatus::Failed(_) => return "failed",
        }
    }
}

impl std::fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let WorkflowStatus::Failed(message) = self {
            return write!(f, "failed: {message}");
        }

        return write!(f, "{}", self.label());
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRun {
    pub id: String,
    pub provider: String,
    pub workflow_type: String,
    /// Serialized JSON of the submitted parameters.
    pub inputs: String,
    pub status: WorkflowStatus,
    pub output_blob_id: Option<String>,
    pub duration_nanos: Option<u64>,
    /// Nanoseconds since the Unix epoch.
    pub created_at: u64,
}

impl WorkflowRun {
    pub fn inputs_map(&self) -> serde_json::Map<String, serde_json::Value> {
        if let Ok(serde_json::Value::Object(map)) = serde_json::from_str(&self.inputs) {
            return map;
        }

        return serde_json::Map::new();
    }

    pub fn prompt(&self) -> Option<String> {
        return self
            .inputs_map()
            .get("prompt")
            .and_then(|val| return val.as_str())
            .map(|val| return val.to_string());
    }

    pub fn duration_secs(&self) -> Option<f64> {
        return self
            .duration_nanos
            .map(|nanos| return nanos as f64 / 1_000_000_000.0);
    }

    pub fn created_at_rfc3339(&self) -> String {
        let secs = (self.created_at / 1_000_000_000) as i64;
        let nanos = (self.created_at % 1_000_000_000) as u32;
        return Utc
            .timestamp_opt(secs, nanos)
            .single()
            .map(|time| return time.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
            .unwrap_or_default();
    }
}
