use cfn_secure_string_core::contract::{SecureStringProperties, Tag};

/// A single SecureString write. `overwrite` distinguishes a strict create from
/// an update of an existing parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutSecureStringRequest {
    pub name: String,
    pub value: String,
    pub description: String,
    pub kms_key_id: Option<String>,
    pub tags: Vec<Tag>,
    pub overwrite: bool,
}

impl PutSecureStringRequest {
    pub fn for_create(properties: &SecureStringProperties) -> Self {
        Self {
            name: properties.name.clone(),
            value: properties.value.clone(),
            description: properties.description.clone(),
            kms_key_id: properties.kms_key_id.clone(),
            tags: properties.tags.clone(),
            overwrite: false,
        }
    }

    /// Parameter Store refuses tags on an overwriting put, so updates carry
    /// none and are followed by a separate retag.
    pub fn for_update(properties: &SecureStringProperties) -> Self {
        Self {
            tags: Vec::new(),
            overwrite: true,
            ..Self::for_create(properties)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    AlreadyExists,
    NotFound,
    Failed { kind: String, message: String },
}

impl StoreError {
    pub fn failed(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            kind: kind.into(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> &str {
        match self {
            Self::AlreadyExists => "ParameterAlreadyExists",
            Self::NotFound => "ParameterNotFound",
            Self::Failed { kind, .. } => kind,
        }
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyExists => f.write_str("parameter already exists"),
            Self::NotFound => f.write_str("parameter not found"),
            Self::Failed { kind, message } => write!(f, "{kind}: {message}"),
        }
    }
}

impl std::error::Error for StoreError {}

pub trait ParameterStore {
    fn put_secure_string(&self, request: &PutSecureStringRequest) -> Result<(), StoreError>;

    fn delete_parameter(&self, name: &str) -> Result<(), StoreError>;

    fn add_tags(&self, name: &str, tags: &[Tag]) -> Result<(), StoreError>;
}
