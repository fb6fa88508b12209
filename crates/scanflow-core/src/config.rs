/// Configuration resolution for the scanning triggers
///
/// Every setting is a fixed pair of names: an environment variable and a
/// parameter-store entry. A `ConfigResolver` queries an ordered list of
/// sources and returns the first value found; a setting absent from every
/// source is a configuration error.
use crate::error::ScanflowError;
use crate::services::ssm::ParameterStore;
use async_trait::async_trait;
use std::sync::Arc;

/// A named setting with its lookup keys in each configuration source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Setting {
    pub env_var: &'static str,
    pub parameter: &'static str,
}

/// API token for the Sysdig Secure backend
pub const SECURE_API_TOKEN: Setting = Setting {
    env_var: "SECURE_API_TOKEN",
    parameter: "SysdigSecureAPIToken",
};

/// Endpoint URL of the Sysdig Secure backend
pub const SECURE_URL: Setting = Setting {
    env_var: "SECURE_URL",
    parameter: "SysdigSecureEndpoint",
};

/// Access key id of the IAM user the backend uses to pull from ECR
pub const SCAN_AWS_ACCESS_KEY_ID: Setting = Setting {
    env_var: "SCAN_AWS_ACCESS_KEY_ID",
    parameter: "ScanningUserAccessKeyId",
};

/// Secret access key of the IAM user the backend uses to pull from ECR
pub const SCAN_AWS_SECRET_ACCESS_KEY: Setting = Setting {
    env_var: "SCAN_AWS_SECRET_ACCESS_KEY",
    parameter: "ScanningUserSecretAccessKey",
};

/// Name of the CodeBuild project that runs the inline scan
pub const CODE_BUILD_PROJECT_NAME: Setting = Setting {
    env_var: "CODE_BUILD_PROJECT_NAME",
    parameter: "CodeBuildProjectName",
};

#[async_trait]
pub trait ConfigSource: Send + Sync {
    /// Looks up a setting in this source, `None` when the source has no value.
    async fn lookup(&self, setting: &Setting) -> Result<Option<String>, ScanflowError>;
}

/// Process environment source
pub struct EnvSource;

#[async_trait]
impl ConfigSource for EnvSource {
    async fn lookup(&self, setting: &Setting) -> Result<Option<String>, ScanflowError> {
        match std::env::var(setting.env_var) {
            Ok(value) => Ok(Some(value)),
            Err(std::env::VarError::NotPresent) => Ok(None),
            Err(std::env::VarError::NotUnicode(_)) => Err(ScanflowError::Config(format!(
                "Environment variable {} is not valid unicode",
                setting.env_var
            ))),
        }
    }
}

/// Remote parameter store source
pub struct ParameterStoreSource {
    store: Arc<dyn ParameterStore>,
}

impl ParameterStoreSource {
    pub fn new(store: Arc<dyn ParameterStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ConfigSource for ParameterStoreSource {
    async fn lookup(&self, setting: &Setting) -> Result<Option<String>, ScanflowError> {
        self.store.get_parameter(setting.parameter).await
    }
}

/// Ordered configuration sources; the first source holding a value wins.
pub struct ConfigResolver {
    sources: Vec<Box<dyn ConfigSource>>,
}

impl ConfigResolver {
    pub fn new(sources: Vec<Box<dyn ConfigSource>>) -> Self {
        Self { sources }
    }

    /// Production order: process environment, then the parameter store.
    pub fn env_then_store(store: Arc<dyn ParameterStore>) -> Self {
        Self::new(vec![
            Box::new(EnvSource),
            Box::new(ParameterStoreSource::new(store)),
        ])
    }

    /// Resolves a setting, erring when every source comes up empty.
    pub async fn resolve(&self, setting: &Setting) -> Result<String, ScanflowError> {
        for source in &self.sources {
            if let Some(value) = source.lookup(setting).await? {
                return Ok(value);
            }
        }

        Err(ScanflowError::Config(format!(
            "No value found for {} (parameter {})",
            setting.env_var, setting.parameter
        )))
    }
}
