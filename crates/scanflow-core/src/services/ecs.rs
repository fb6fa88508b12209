/// ECS task definition service
use crate::error::ScanflowError;
use async_trait::async_trait;
use std::collections::HashMap;

/// The slice of a task definition the triggers consume.
#[derive(Debug, Clone, Default)]
pub struct TaskDefinition {
    pub container_definitions: Vec<ContainerDefinition>,
}

#[derive(Debug, Clone)]
pub struct ContainerDefinition {
    pub name: String,
    pub image: String,
    pub repository_credentials: Option<RepositoryCredentials>,
}

#[derive(Debug, Clone)]
pub struct RepositoryCredentials {
    pub credentials_parameter: String,
}

impl TaskDefinition {
    /// Secret id declared for the container whose image and name both
    /// match, when that container carries repository credentials.
    pub fn credentials_parameter_for(&self, image: &str, name: &str) -> Option<&str> {
        self.container_definitions
            .iter()
            .find(|container| container.image == image && container.name == name)
            .and_then(|container| container.repository_credentials.as_ref())
            .map(|credentials| credentials.credentials_parameter.as_str())
    }
}

#[async_trait]
pub trait TaskDefinitionSource: Send + Sync {
    /// Fetches the task definition registered under the given ARN.
    async fn describe_task_definition(&self, arn: &str) -> Result<TaskDefinition, ScanflowError>;
}

pub struct EcsTaskDefinitionSource {
    client: aws_sdk_ecs::Client,
}

impl EcsTaskDefinitionSource {
    pub fn new(client: aws_sdk_ecs::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TaskDefinitionSource for EcsTaskDefinitionSource {
    async fn describe_task_definition(&self, arn: &str) -> Result<TaskDefinition, ScanflowError> {
        let response = self
            .client
            .describe_task_definition()
            .task_definition(arn)
            .send()
            .await
            .map_err(|e| {
                ScanflowError::TaskDefinition(format!(
                    "ECS describe_task_definition failed for {}: {}",
                    arn, e
                ))
            })?;

        let container_definitions = response
            .task_definition()
            .map(|task_definition| task_definition.container_definitions())
            .unwrap_or_default()
            .iter()
            .map(|container| ContainerDefinition {
                name: container.name().unwrap_or_default().to_string(),
                image: container.image().unwrap_or_default().to_string(),
                repository_credentials: container.repository_credentials().map(|credentials| {
                    RepositoryCredentials {
                        credentials_parameter: credentials.credentials_parameter().to_string(),
                    }
                }),
            })
            .collect();

        Ok(TaskDefinition {
            container_definitions,
        })
    }
}

// Mock for testing
pub struct MockTaskDefinitionSource {
    definitions: HashMap<String, TaskDefinition>,
    described: tokio::sync::Mutex<Vec<String>>,
}

impl MockTaskDefinitionSource {
    pub fn new() -> Self {
        Self {
            definitions: HashMap::new(),
            described: tokio::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn with_definition(mut self, arn: &str, definition: TaskDefinition) -> Self {
        self.definitions.insert(arn.to_string(), definition);
        self
    }

    /// ARNs described so far, one entry per call.
    pub async fn described_arns(&self) -> Vec<String> {
        self.described.lock().await.clone()
    }
}

impl Default for MockTaskDefinitionSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskDefinitionSource for MockTaskDefinitionSource {
    async fn describe_task_definition(&self, arn: &str) -> Result<TaskDefinition, ScanflowError> {
        self.described.lock().await.push(arn.to_string());

        self.definitions.get(arn).cloned().ok_or_else(|| {
            ScanflowError::TaskDefinition(format!("Unknown task definition: {}", arn))
        })
    }
}
