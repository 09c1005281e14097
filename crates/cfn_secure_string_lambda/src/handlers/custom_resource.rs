use std::panic::{catch_unwind, AssertUnwindSafe};

use cfn_secure_string_core::contract::{
    decode_callback_target, decode_lifecycle_event, DecodeError, RequestType,
    SecureStringProperties,
};
use cfn_secure_string_core::outcome::{CallbackBody, Disposition, OutcomeStatus, ReportContext};
use cfn_secure_string_core::redaction::{redact_event, value_fingerprint};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::adapters::callback::CallbackTransport;
use crate::adapters::parameter_store::{ParameterStore, PutSecureStringRequest, StoreError};
use crate::config::HandlerConfig;

/// Returned to the Lambda runtime once a callback has been attempted.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct InvocationSummary {
    pub status: OutcomeStatus,
    pub callback_delivered: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerError {
    pub message: String,
}

impl std::fmt::Display for HandlerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HandlerError {}

/// Processes one custom-resource event and reports its outcome.
///
/// Once the event yields a `ResponseURL`, exactly one callback is attempted no
/// matter how validation, the parameter store, or the tagging call behave,
/// panics included. An error is returned only when there is no callback
/// target to report to.
pub fn handle_custom_resource_event(
    event: &Value,
    log_stream_name: &str,
    config: &HandlerConfig,
    store: &impl ParameterStore,
    transport: &impl CallbackTransport,
) -> Result<InvocationSummary, HandlerError> {
    info!(event = %redact_event(event), "custom resource request received");

    let target = decode_callback_target(event).map_err(|error| {
        error!(error = %error, "custom resource event has no usable callback target");
        HandlerError {
            message: format!("cannot report custom resource outcome: {error}"),
        }
    })?;

    let disposition = catch_unwind(AssertUnwindSafe(|| resolve_disposition(event, store)))
        .unwrap_or_else(|_| {
            error!("panic while processing custom resource event");
            Disposition::processing_failure("panic")
        });

    let context = ReportContext {
        log_stream_name,
        default_physical_resource_id: &config.physical_resource_id,
        no_echo: config.no_echo,
    };
    let body = CallbackBody::new(&disposition, &target, &context);
    let callback_delivered = send_outcome(&target.response_url, &body, transport);

    Ok(InvocationSummary {
        status: disposition.status,
        callback_delivered,
    })
}

fn resolve_disposition(event: &Value, store: &impl ParameterStore) -> Disposition {
    let lifecycle = match decode_lifecycle_event(event) {
        Ok(value) => value,
        Err(DecodeError::UnrecognizedRequestType(raw)) => {
            error!(request_type = %raw, "unexpected event received from CloudFormation");
            return Disposition::unexpected_request_type();
        }
        Err(DecodeError::Invalid(error)) => {
            error!(error = %error, "custom resource event failed validation");
            return Disposition::processing_failure("ValidationError");
        }
    };

    let properties = &lifecycle.properties;
    debug!(
        request_type = lifecycle.request_type.as_str(),
        parameter_name = %properties.name,
        value_sha256 = %value_fingerprint(&properties.value),
        kms_key_id = properties.kms_key_id.as_deref().unwrap_or("default"),
        tag_count = properties.tags.len(),
        "decoded secure string properties"
    );

    match lifecycle.request_type {
        RequestType::Create => create_parameter(properties, store),
        RequestType::Update => update_parameter(properties, store),
        RequestType::Delete => delete_parameter(properties, store),
    }
}

fn create_parameter(
    properties: &SecureStringProperties,
    store: &impl ParameterStore,
) -> Disposition {
    info!(parameter_name = %properties.name, "creating secure string parameter");

    match store.put_secure_string(&PutSecureStringRequest::for_create(properties)) {
        Ok(()) => Disposition::completed(RequestType::Create),
        Err(StoreError::AlreadyExists) => {
            error!(parameter_name = %properties.name, "parameter already exists");
            Disposition::already_exists()
        }
        Err(error) => {
            error!(parameter_name = %properties.name, error = %error, "parameter creation failed");
            Disposition::store_failure(RequestType::Create, error.kind())
        }
    }
}

fn update_parameter(
    properties: &SecureStringProperties,
    store: &impl ParameterStore,
) -> Disposition {
    info!(parameter_name = %properties.name, "updating secure string parameter");

    let result = store
        .put_secure_string(&PutSecureStringRequest::for_update(properties))
        .and_then(|()| store.add_tags(&properties.name, &properties.tags));

    match result {
        Ok(()) => Disposition::completed(RequestType::Update),
        Err(error) => {
            error!(parameter_name = %properties.name, error = %error, "parameter update failed");
            Disposition::store_failure(RequestType::Update, error.kind())
        }
    }
}

fn delete_parameter(
    properties: &SecureStringProperties,
    store: &impl ParameterStore,
) -> Disposition {
    info!(parameter_name = %properties.name, "deleting secure string parameter");

    match store.delete_parameter(&properties.name) {
        Ok(()) => Disposition::completed(RequestType::Delete),
        Err(StoreError::NotFound) => {
            warn!(parameter_name = %properties.name, "parameter not found, nothing to delete");
            Disposition::already_deleted()
        }
        Err(error) => {
            error!(parameter_name = %properties.name, error = %error, "parameter deletion failed");
            Disposition::store_failure(RequestType::Delete, error.kind())
        }
    }
}

fn send_outcome(url: &str, body: &CallbackBody, transport: &impl CallbackTransport) -> bool {
    let bytes = match body.to_bytes() {
        Ok(value) => value,
        Err(error) => {
            error!(error = %error, "failed to serialize custom resource response");
            return false;
        }
    };

    info!(
        response_url = %url,
        response_body = %String::from_utf8_lossy(&bytes),
        "sending custom resource response"
    );

    match catch_unwind(AssertUnwindSafe(|| transport.put_callback(url, &bytes))) {
        Ok(Ok(status_code)) if (200..300).contains(&status_code) => {
            info!(status_code, "custom resource response delivered");
            true
        }
        Ok(Ok(status_code)) => {
            error!(status_code, "custom resource response rejected");
            false
        }
        Ok(Err(error)) => {
            error!(error = %error, "custom resource response delivery failed");
            false
        }
        Err(_) => {
            error!("panic while delivering custom resource response");
            false
        }
    }
}
