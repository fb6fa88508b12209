/// SSM parameter store service
use crate::error::ScanflowError;
use async_trait::async_trait;
use std::collections::HashMap;

#[async_trait]
pub trait ParameterStore: Send + Sync {
    /// Fetches a parameter value, `None` when the parameter does not exist.
    async fn get_parameter(&self, name: &str) -> Result<Option<String>, ScanflowError>;
}

pub struct SsmParameterStore {
    client: aws_sdk_ssm::Client,
}

impl SsmParameterStore {
    pub fn new(client: aws_sdk_ssm::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ParameterStore for SsmParameterStore {
    async fn get_parameter(&self, name: &str) -> Result<Option<String>, ScanflowError> {
        match self.client.get_parameter().name(name).send().await {
            Ok(output) => {
                let value = output
                    .parameter()
                    .and_then(|parameter| parameter.value())
                    .map(str::to_string);

                tracing::debug!(parameter = name, found = value.is_some(), "Fetched SSM parameter");
                Ok(value)
            }
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_parameter_not_found() {
                    Ok(None)
                } else {
                    Err(ScanflowError::ParameterStore(format!(
                        "SSM get_parameter failed for {}: {}",
                        name, service_err
                    )))
                }
            }
        }
    }
}

// Mock for testing
pub struct MockParameterStore {
    parameters: HashMap<String, String>,
    failure: Option<String>,
    lookups: tokio::sync::Mutex<Vec<String>>,
}

impl MockParameterStore {
    pub fn empty() -> Self {
        Self {
            parameters: HashMap::new(),
            failure: None,
            lookups: tokio::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn with_parameter(name: &str, value: &str) -> Self {
        let mut store = Self::empty();
        store
            .parameters
            .insert(name.to_string(), value.to_string());
        store
    }

    /// A store whose every lookup fails with the given detail.
    pub fn failing(detail: &str) -> Self {
        Self {
            parameters: HashMap::new(),
            failure: Some(detail.to_string()),
            lookups: tokio::sync::Mutex::new(Vec::new()),
        }
    }

    pub async fn lookups(&self) -> Vec<String> {
        self.lookups.lock().await.clone()
    }
}

#[async_trait]
impl ParameterStore for MockParameterStore {
    async fn get_parameter(&self, name: &str) -> Result<Option<String>, ScanflowError> {
        self.lookups.lock().await.push(name.to_string());

        if let Some(detail) = &self.failure {
            return Err(ScanflowError::ParameterStore(detail.clone()));
        }

        Ok(self.parameters.get(name).cloned())
    }
}
