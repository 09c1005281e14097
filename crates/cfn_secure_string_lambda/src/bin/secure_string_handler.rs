use std::future::Future;

use aws_sdk_ssm::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_ssm::types::{ParameterTier, ParameterType, ResourceTypeForTagging};
use cfn_secure_string_core::contract::Tag;
use cfn_secure_string_lambda::adapters::callback::CallbackTransport;
use cfn_secure_string_lambda::adapters::parameter_store::{
    ParameterStore, PutSecureStringRequest, StoreError,
};
use cfn_secure_string_lambda::config::HandlerConfig;
use cfn_secure_string_lambda::handlers::custom_resource::handle_custom_resource_event;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use serde_json::Value;

struct SsmParameterStore {
    ssm_client: aws_sdk_ssm::Client,
}

impl ParameterStore for SsmParameterStore {
    fn put_secure_string(&self, request: &PutSecureStringRequest) -> Result<(), StoreError> {
        let tags = to_ssm_tags(&request.tags)?;
        let request = request.clone();
        let client = self.ssm_client.clone();

        block_on(async move {
            client
                .put_parameter()
                .name(request.name)
                .value(request.value)
                .description(request.description)
                .r#type(ParameterType::SecureString)
                .set_key_id(request.kms_key_id)
                .tier(ParameterTier::Standard)
                .overwrite(request.overwrite)
                .set_tags(tags)
                .send()
                .await
                .map(|_| ())
                .map_err(|error| {
                    let already_exists = error
                        .as_service_error()
                        .is_some_and(|service| service.is_parameter_already_exists());
                    if already_exists {
                        StoreError::AlreadyExists
                    } else {
                        store_failure(&error)
                    }
                })
        })
    }

    fn delete_parameter(&self, name: &str) -> Result<(), StoreError> {
        let parameter_name = name.to_string();
        let client = self.ssm_client.clone();

        block_on(async move {
            client
                .delete_parameter()
                .name(parameter_name)
                .send()
                .await
                .map(|_| ())
                .map_err(|error| {
                    let not_found = error
                        .as_service_error()
                        .is_some_and(|service| service.is_parameter_not_found());
                    if not_found {
                        StoreError::NotFound
                    } else {
                        store_failure(&error)
                    }
                })
        })
    }

    fn add_tags(&self, name: &str, tags: &[Tag]) -> Result<(), StoreError> {
        // AddTagsToResource rejects an empty tag list.
        let Some(tags) = to_ssm_tags(tags)? else {
            return Ok(());
        };
        let parameter_name = name.to_string();
        let client = self.ssm_client.clone();

        block_on(async move {
            client
                .add_tags_to_resource()
                .resource_type(ResourceTypeForTagging::Parameter)
                .resource_id(parameter_name)
                .set_tags(Some(tags))
                .send()
                .await
                .map(|_| ())
                .map_err(|error| store_failure(&error))
        })
    }
}

struct HttpCallbackTransport {
    http_client: reqwest::Client,
}

impl CallbackTransport for HttpCallbackTransport {
    fn put_callback(&self, url: &str, body: &[u8]) -> Result<u16, String> {
        let target_url = url.to_string();
        let body_bytes = body.to_vec();
        let client = self.http_client.clone();

        block_on(async move {
            client
                .put(target_url)
                .header(CONTENT_TYPE, "")
                .header(CONTENT_LENGTH, body_bytes.len())
                .body(body_bytes)
                .send()
                .await
                .map(|response| response.status().as_u16())
                .map_err(|error| format!("failed to send custom resource response: {error}"))
        })
    }
}

fn block_on<F: Future>(future: F) -> F::Output {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

fn to_ssm_tags(tags: &[Tag]) -> Result<Option<Vec<aws_sdk_ssm::types::Tag>>, StoreError> {
    if tags.is_empty() {
        return Ok(None);
    }

    tags.iter()
        .map(|tag| {
            aws_sdk_ssm::types::Tag::builder()
                .key(tag.key.clone())
                .value(tag.value.clone())
                .build()
                .map_err(|error| StoreError::failed("InvalidTag", error.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

fn store_failure<E, R>(error: &SdkError<E, R>) -> StoreError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    StoreError::failed(sdk_error_kind(error), DisplayErrorContext(error).to_string())
}

fn sdk_error_kind<E: ProvideErrorMetadata, R>(error: &SdkError<E, R>) -> String {
    let kind = match error {
        SdkError::ServiceError(context) => context.err().code().unwrap_or("ServiceError"),
        SdkError::TimeoutError(_) => "TimeoutError",
        SdkError::DispatchFailure(_) => "DispatchFailure",
        SdkError::ResponseError(_) => "ResponseError",
        SdkError::ConstructionFailure(_) => "ConstructionFailure",
        _ => "SdkError",
    };
    kind.to_string()
}

struct RuntimeDependencies {
    config: HandlerConfig,
    store: SsmParameterStore,
    transport: HttpCallbackTransport,
}

async fn handle_request(
    event: LambdaEvent<Value>,
    deps: &RuntimeDependencies,
) -> Result<Value, Error> {
    let log_stream_name = event.context.env_config.log_stream.clone();
    let summary = handle_custom_resource_event(
        &event.payload,
        &log_stream_name,
        &deps.config,
        &deps.store,
        &deps.transport,
    )
    .map_err(|error| Error::from(error.message))?;

    serde_json::to_value(summary)
        .map_err(|error| Error::from(format!("failed to serialize invocation summary: {error}")))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::tracing::init_default_subscriber();

    let config = HandlerConfig::from_env().map_err(Error::from)?;
    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let http_client = reqwest::Client::builder()
        .build()
        .map_err(|error| Error::from(format!("failed to build callback http client: {error}")))?;
    let deps = RuntimeDependencies {
        config,
        store: SsmParameterStore {
            ssm_client: aws_sdk_ssm::Client::new(&aws_config),
        },
        transport: HttpCallbackTransport { http_client },
    };
    let deps = &deps;

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        handle_request(event, deps).await
    }))
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(key: &str, value: &str) -> Tag {
        Tag {
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn empty_tags_are_omitted() {
        let converted = to_ssm_tags(&[]).expect("conversion should succeed");
        assert!(converted.is_none());
    }

    #[test]
    fn tags_keep_their_order() {
        let converted = to_ssm_tags(&[tag("team", "platform"), tag("env", "prod")])
            .expect("conversion should succeed")
            .expect("tags should be present");

        let pairs: Vec<(&str, &str)> = converted
            .iter()
            .map(|tag| (tag.key(), tag.value()))
            .collect();
        assert_eq!(pairs, vec![("team", "platform"), ("env", "prod")]);
    }
}
