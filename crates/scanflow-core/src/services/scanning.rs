/// Sysdig Secure scanning backend service
///
/// The backend answers every request on two channels: the call either
/// completes with a verdict (`ScanningResponse`) or fails in transport,
/// which is an error. Handlers decide what a rejection means; notably a
/// registry rejection whose detail says the registry already exists is
/// treated as success by the push trigger.
use crate::error::ScanflowError;
use async_trait::async_trait;
use serde_json::json;

/// Verdict of a single scanning backend request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanningResponse {
    pub ok: bool,
    pub detail: String,
}

impl ScanningResponse {
    pub fn accepted() -> Self {
        Self {
            ok: true,
            detail: String::new(),
        }
    }

    pub fn rejected(detail: &str) -> Self {
        Self {
            ok: false,
            detail: detail.to_string(),
        }
    }
}

/// Access key pair the backend uses to pull images from ECR.
#[derive(Debug, Clone)]
pub struct RegistryCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

/// Sysdig Secure API token, redacted in any debug or display output.
#[derive(Clone)]
pub struct SecureApiToken(pub String);

impl std::fmt::Debug for SecureApiToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[redacted]")
    }
}

impl std::fmt::Display for SecureApiToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[redacted]")
    }
}

#[async_trait]
pub trait ScanningService: Send + Sync {
    /// Registers a registry so the backend can pull images from it.
    async fn add_registry(
        &self,
        registry: &str,
        credentials: &RegistryCredentials,
        registry_type: &str,
    ) -> Result<ScanningResponse, ScanflowError>;

    /// Submits an image for analysis.
    async fn add_image(
        &self,
        image: &str,
        autosubscribe: bool,
    ) -> Result<ScanningResponse, ScanflowError>;
}

pub struct SysdigSecureClient {
    base_url: String,
    token: SecureApiToken,
    http: reqwest::Client,
}

impl SysdigSecureClient {
    pub fn new(base_url: String, token: SecureApiToken) -> Self {
        Self {
            base_url,
            token,
            http: reqwest::Client::new(),
        }
    }

    async fn post(
        &self,
        path: &str,
        query: &[(&str, String)],
        body: serde_json::Value,
    ) -> Result<ScanningResponse, ScanflowError> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token.0)
            .query(query)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                ScanflowError::Scanning(format!("Request to {} failed: {}", path, e))
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            ScanflowError::Scanning(format!("Reading response from {} failed: {}", path, e))
        })?;

        if status.is_success() {
            Ok(ScanningResponse {
                ok: true,
                detail: text,
            })
        } else {
            tracing::debug!(%status, path, "Scanning backend rejected the request");
            Ok(ScanningResponse {
                ok: false,
                detail: error_detail(&text),
            })
        }
    }
}

/// The backend wraps error details in a `message` field; fall back to the
/// raw body when the payload is not shaped that way.
fn error_detail(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("message")
                .and_then(|message| message.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}

#[async_trait]
impl ScanningService for SysdigSecureClient {
    async fn add_registry(
        &self,
        registry: &str,
        credentials: &RegistryCredentials,
        registry_type: &str,
    ) -> Result<ScanningResponse, ScanflowError> {
        self.post(
            "api/scanning/v1/anchore/registries",
            &[],
            json!({
                "registry": registry,
                "registry_user": credentials.access_key_id,
                "registry_pass": credentials.secret_access_key,
                "registry_type": registry_type,
                "registry_verify": false,
            }),
        )
        .await
    }

    async fn add_image(
        &self,
        image: &str,
        autosubscribe: bool,
    ) -> Result<ScanningResponse, ScanflowError> {
        self.post(
            "api/scanning/v1/anchore/images",
            &[("autosubscribe", autosubscribe.to_string())],
            json!({ "tag": image }),
        )
        .await
    }
}

/// A registry registration observed by the mock backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRegistry {
    pub registry: String,
    pub access_key_id: String,
    pub registry_type: String,
}

// Mock for testing
pub struct MockScanningService {
    registry_response: ScanningResponse,
    image_response: ScanningResponse,
    registries: tokio::sync::Mutex<Vec<RecordedRegistry>>,
    images: tokio::sync::Mutex<Vec<(String, bool)>>,
}

impl MockScanningService {
    pub fn accept_all() -> Self {
        Self {
            registry_response: ScanningResponse::accepted(),
            image_response: ScanningResponse::accepted(),
            registries: tokio::sync::Mutex::new(Vec::new()),
            images: tokio::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn rejecting_registries(detail: &str) -> Self {
        Self {
            registry_response: ScanningResponse::rejected(detail),
            ..Self::accept_all()
        }
    }

    pub fn rejecting_images(detail: &str) -> Self {
        Self {
            image_response: ScanningResponse::rejected(detail),
            ..Self::accept_all()
        }
    }

    pub async fn recorded_registries(&self) -> Vec<RecordedRegistry> {
        self.registries.lock().await.clone()
    }

    pub async fn recorded_images(&self) -> Vec<(String, bool)> {
        self.images.lock().await.clone()
    }
}

#[async_trait]
impl ScanningService for MockScanningService {
    async fn add_registry(
        &self,
        registry: &str,
        credentials: &RegistryCredentials,
        registry_type: &str,
    ) -> Result<ScanningResponse, ScanflowError> {
        self.registries.lock().await.push(RecordedRegistry {
            registry: registry.to_string(),
            access_key_id: credentials.access_key_id.clone(),
            registry_type: registry_type.to_string(),
        });
        Ok(self.registry_response.clone())
    }

    async fn add_image(
        &self,
        image: &str,
        autosubscribe: bool,
    ) -> Result<ScanningResponse, ScanflowError> {
        self.images
            .lock()
            .await
            .push((image.to_string(), autosubscribe));
        Ok(self.image_response.clone())
    }
}
