/// CodeBuild build trigger service
use crate::error::ScanflowError;
use async_trait::async_trait;
use aws_sdk_codebuild::types::{EnvironmentVariable, EnvironmentVariableType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildParameterKind {
    Plaintext,
    SecretsManager,
}

/// One environment variable handed to the build job. Secret-backed
/// parameters reference a Secrets Manager entry and a field inside it
/// instead of carrying the value inline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildParameter {
    pub name: String,
    pub value: String,
    pub kind: BuildParameterKind,
}

impl BuildParameter {
    pub fn plaintext(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            kind: BuildParameterKind::Plaintext,
        }
    }

    pub fn secrets_manager(name: &str, secret_id: &str, field: &str) -> Self {
        Self {
            name: name.to_string(),
            value: format!("{}:{}", secret_id, field),
            kind: BuildParameterKind::SecretsManager,
        }
    }
}

#[async_trait]
pub trait BuildService: Send + Sync {
    /// Starts one build of the given project. The job outcome is the build
    /// service's concern and is not inspected here.
    async fn start_build(
        &self,
        project_name: &str,
        environment: &[BuildParameter],
    ) -> Result<(), ScanflowError>;
}

pub struct CodeBuildService {
    client: aws_sdk_codebuild::Client,
}

impl CodeBuildService {
    pub fn new(client: aws_sdk_codebuild::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BuildService for CodeBuildService {
    async fn start_build(
        &self,
        project_name: &str,
        environment: &[BuildParameter],
    ) -> Result<(), ScanflowError> {
        let variables = environment
            .iter()
            .map(|parameter| {
                EnvironmentVariable::builder()
                    .name(&parameter.name)
                    .value(&parameter.value)
                    .r#type(match parameter.kind {
                        BuildParameterKind::Plaintext => EnvironmentVariableType::Plaintext,
                        BuildParameterKind::SecretsManager => {
                            EnvironmentVariableType::SecretsManager
                        }
                    })
                    .build()
                    .map_err(|e| {
                        ScanflowError::Build(format!(
                            "Failed to build environment variable {}: {}",
                            parameter.name, e
                        ))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let response = self
            .client
            .start_build()
            .project_name(project_name)
            .set_environment_variables_override(Some(variables))
            .send()
            .await
            .map_err(|e| {
                ScanflowError::Build(format!(
                    "CodeBuild start_build failed for project {}: {}",
                    project_name, e
                ))
            })?;

        tracing::info!(
            project = project_name,
            build_id = response.build_value().and_then(|build| build.id()),
            "Started build"
        );
        Ok(())
    }
}

// Mock for testing
pub struct MockBuildService {
    failure: Option<String>,
    builds: tokio::sync::Mutex<Vec<(String, Vec<BuildParameter>)>>,
}

impl MockBuildService {
    pub fn new() -> Self {
        Self {
            failure: None,
            builds: tokio::sync::Mutex::new(Vec::new()),
        }
    }

    /// A service whose every build start fails with the given detail.
    pub fn failing(detail: &str) -> Self {
        Self {
            failure: Some(detail.to_string()),
            builds: tokio::sync::Mutex::new(Vec::new()),
        }
    }

    pub async fn started_builds(&self) -> Vec<(String, Vec<BuildParameter>)> {
        self.builds.lock().await.clone()
    }
}

impl Default for MockBuildService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BuildService for MockBuildService {
    async fn start_build(
        &self,
        project_name: &str,
        environment: &[BuildParameter],
    ) -> Result<(), ScanflowError> {
        self.builds
            .lock()
            .await
            .push((project_name.to_string(), environment.to_vec()));

        match &self.failure {
            Some(detail) => Err(ScanflowError::Build(detail.clone())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plaintext_parameter() {
        let parameter = BuildParameter::plaintext("REGION", "eu-west-1");
        assert_eq!(parameter.name, "REGION");
        assert_eq!(parameter.value, "eu-west-1");
        assert_eq!(parameter.kind, BuildParameterKind::Plaintext);
    }

    #[test]
    fn test_secrets_manager_parameter_points_at_a_secret_field() {
        let parameter =
            BuildParameter::secrets_manager("DOCKER_USER", "arn:secret:x", "username");
        assert_eq!(parameter.value, "arn:secret:x:username");
        assert_eq!(parameter.kind, BuildParameterKind::SecretsManager);
    }

    #[tokio::test]
    async fn test_mock_build_service_records_calls() {
        let service = MockBuildService::new();
        let environment = vec![BuildParameter::plaintext("REPOSITORY", "alpine")];

        service.start_build("scan-project", &environment).await.unwrap();

        let builds = service.started_builds().await;
        assert_eq!(builds.len(), 1);
        assert_eq!(builds[0].0, "scan-project");
        assert_eq!(builds[0].1, environment);
    }
}
