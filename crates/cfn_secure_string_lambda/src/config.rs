use cfn_secure_string_core::contract::DEFAULT_PHYSICAL_RESOURCE_ID;

pub const PHYSICAL_RESOURCE_ID_ENV: &str = "SECURE_STRING_PHYSICAL_RESOURCE_ID";
pub const NO_ECHO_ENV: &str = "SECURE_STRING_NO_ECHO";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerConfig {
    pub physical_resource_id: String,
    pub no_echo: bool,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            physical_resource_id: DEFAULT_PHYSICAL_RESOURCE_ID.to_string(),
            no_echo: true,
        }
    }
}

impl HandlerConfig {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let defaults = Self::default();

        let physical_resource_id = lookup(PHYSICAL_RESOURCE_ID_ENV)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or(defaults.physical_resource_id);

        let no_echo = match lookup(NO_ECHO_ENV) {
            None => defaults.no_echo,
            Some(raw) => parse_flag(&raw)
                .ok_or_else(|| format!("{NO_ECHO_ENV} must be 'true' or 'false', got '{raw}'"))?,
        };

        Ok(Self {
            physical_resource_id,
            no_echo,
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}
