use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::contract::{CallbackTarget, RequestType};

pub const LOG_STREAM_REASON_PREFIX: &str = "See the details in CloudWatch Log Stream: ";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeStatus {
    Success,
    Failed,
}

impl OutcomeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
        }
    }
}

/// The resolved result of one lifecycle event, before it is addressed to a
/// particular stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disposition {
    pub status: OutcomeStatus,
    pub message: String,
}

impl Disposition {
    fn success(message: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Success,
            message: message.into(),
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Failed,
            message: message.into(),
        }
    }

    pub fn completed(request_type: RequestType) -> Self {
        match request_type {
            RequestType::Create => Self::success("Resource creation successful!"),
            RequestType::Update => Self::success("Resource update successful!"),
            RequestType::Delete => Self::success("Resource deletion successful!"),
        }
    }

    pub fn already_exists() -> Self {
        Self::failed("Parameter already exists!")
    }

    pub fn already_deleted() -> Self {
        Self::success("Resource doesn't exist, no deletion necessary!")
    }

    /// `kind` names the originating error category, e.g. an SSM error code.
    pub fn store_failure(request_type: RequestType, kind: &str) -> Self {
        let action = match request_type {
            RequestType::Create => "creation",
            RequestType::Update => "update",
            RequestType::Delete => "deletion",
        };
        Self::failed(format!(
            "Exception occurred - {kind} - Resource {action} failed!"
        ))
    }

    pub fn unexpected_request_type() -> Self {
        Self::failed("Unexpected event received from CloudFormation")
    }

    pub fn processing_failure(kind: &str) -> Self {
        Self::failed(format!("Exception during processing - {kind}"))
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }
}

/// Invocation-wide values that shape every callback body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportContext<'a> {
    pub log_stream_name: &'a str,
    pub default_physical_resource_id: &'a str,
    pub no_echo: bool,
}

/// Body of the HTTP PUT sent to the pre-signed `ResponseURL`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct CallbackBody {
    pub status: OutcomeStatus,
    pub reason: String,
    pub physical_resource_id: String,
    pub stack_id: String,
    pub request_id: String,
    pub logical_resource_id: String,
    pub no_echo: bool,
    pub data: Value,
}

impl CallbackBody {
    pub fn new(
        disposition: &Disposition,
        target: &CallbackTarget,
        context: &ReportContext<'_>,
    ) -> Self {
        let log_pointer = format!("{LOG_STREAM_REASON_PREFIX}{}", context.log_stream_name);
        let reason = if disposition.is_success() {
            log_pointer
        } else {
            format!("{} {log_pointer}", disposition.message)
        };

        Self {
            status: disposition.status,
            reason,
            physical_resource_id: target
                .physical_resource_id
                .clone()
                .unwrap_or_else(|| context.default_physical_resource_id.to_string()),
            stack_id: target.stack_id.clone(),
            request_id: target.request_id.clone(),
            logical_resource_id: target.logical_resource_id.clone(),
            no_echo: context.no_echo,
            data: json!({ "Message": disposition.message }),
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}
