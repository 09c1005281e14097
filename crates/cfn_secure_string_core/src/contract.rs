use serde::Deserialize;
use serde_json::Value;

pub const DEFAULT_PHYSICAL_RESOURCE_ID: &str = "CustomResourcePhysicalID";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestType {
    Create,
    Update,
    Delete,
}

impl RequestType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Create" => Some(Self::Create),
            "Update" => Some(Self::Update),
            "Delete" => Some(Self::Delete),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Delete => "Delete",
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Tag {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Value")]
    pub value: String,
}

/// Where the outcome of an invocation is reported, plus the identifiers
/// CloudFormation expects to be echoed back verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackTarget {
    pub response_url: String,
    pub stack_id: String,
    pub request_id: String,
    pub logical_resource_id: String,
    pub physical_resource_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecureStringProperties {
    pub name: String,
    pub value: String,
    pub description: String,
    pub kms_key_id: Option<String>,
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleEvent {
    pub request_type: RequestType,
    pub target: CallbackTarget,
    pub properties: SecureStringProperties,
}

const CALLBACK_FIELDS: [&str; 5] = [
    "ResponseURL",
    "StackId",
    "RequestId",
    "LogicalResourceId",
    "PhysicalResourceId",
];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawResourceProperties {
    name: Option<String>,
    value: Option<String>,
    description: Option<String>,
    kms_key_id: Option<String>,
    tags: Option<Vec<Tag>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Reasons a lifecycle event cannot be dispatched to the parameter store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    Invalid(ValidationError),
    UnrecognizedRequestType(String),
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(error) => write!(f, "invalid custom resource event: {error}"),
            Self::UnrecognizedRequestType(raw) => {
                write!(f, "unrecognized RequestType '{raw}'")
            }
        }
    }
}

impl std::error::Error for DecodeError {}

impl From<ValidationError> for DecodeError {
    fn from(error: ValidationError) -> Self {
        Self::Invalid(error)
    }
}

/// Extracts the callback coordinates from an event.
///
/// Only `ResponseURL` is mandatory here: without it nothing can be reported.
/// Correlation identifiers that are missing or not strings are echoed back as
/// empty strings so that a malformed event still produces a FAILED callback.
pub fn decode_callback_target(event: &Value) -> Result<CallbackTarget, ValidationError> {
    let response_url = string_field(event, "ResponseURL")
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ValidationError::new("ResponseURL is required"))?;

    Ok(CallbackTarget {
        response_url: response_url.to_string(),
        stack_id: string_field(event, "StackId").unwrap_or_default().to_string(),
        request_id: string_field(event, "RequestId").unwrap_or_default().to_string(),
        logical_resource_id: string_field(event, "LogicalResourceId")
            .unwrap_or_default()
            .to_string(),
        physical_resource_id: string_field(event, "PhysicalResourceId")
            .filter(|value| !value.is_empty())
            .map(str::to_string),
    })
}

fn string_field<'a>(event: &'a Value, key: &str) -> Option<&'a str> {
    event.get(key).and_then(Value::as_str)
}

pub fn decode_resource_properties(
    properties: &Value,
) -> Result<SecureStringProperties, ValidationError> {
    if !properties.is_object() {
        return Err(ValidationError::new(
            "ResourceProperties must be a JSON object",
        ));
    }

    let raw = RawResourceProperties::deserialize(properties)
        .map_err(|error| ValidationError::new(format!("malformed ResourceProperties: {error}")))?;

    let name = raw
        .name
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| ValidationError::new("ResourceProperties.Name is required"))?;
    let value = raw
        .value
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ValidationError::new("ResourceProperties.Value is required"))?;

    Ok(SecureStringProperties {
        name,
        value,
        description: raw.description.unwrap_or_default(),
        kms_key_id: raw
            .kms_key_id
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty()),
        tags: raw.tags.unwrap_or_default(),
    })
}

/// Strictly decodes a full lifecycle event. Properties are validated before
/// the request type, so a malformed event is always reported as a
/// processing failure rather than an unexpected request.
pub fn decode_lifecycle_event(event: &Value) -> Result<LifecycleEvent, DecodeError> {
    if !event.is_object() {
        return Err(ValidationError::new("custom resource event must be a JSON object").into());
    }
    for key in CALLBACK_FIELDS {
        match event.get(key) {
            None | Some(Value::Null) | Some(Value::String(_)) => {}
            Some(other) => {
                return Err(ValidationError::new(format!(
                    "malformed callback fields: {key} must be a string, got {other}"
                ))
                .into());
            }
        }
    }
    let target = decode_callback_target(event)?;

    let properties = event
        .get("ResourceProperties")
        .ok_or_else(|| ValidationError::new("ResourceProperties is required"))?;
    let properties = decode_resource_properties(properties)?;

    let raw_request_type = event
        .get("RequestType")
        .and_then(Value::as_str)
        .ok_or_else(|| ValidationError::new("RequestType must be a string"))?;
    let request_type = RequestType::parse(raw_request_type)
        .ok_or_else(|| DecodeError::UnrecognizedRequestType(raw_request_type.to_string()))?;

    Ok(LifecycleEvent {
        request_type,
        target,
        properties,
    })
}
