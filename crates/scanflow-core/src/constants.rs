/// Application constants
///
/// This module contains the fixed names shared by the scanning triggers.
// ============================================================================
// Scanning Backend Constants
// ============================================================================
/// Registry type reported to the scanning backend for ECR registries
pub const ECR_REGISTRY_TYPE: &str = "awsecr";

/// Detail string the backend returns when a registry was already registered
pub const REGISTRY_ALREADY_EXISTS: &str = "registry already exists in DB";

// ============================================================================
// Build Environment Variables
// ============================================================================

/// AWS account id of the event, passed to the inline scan job
pub const BUILD_VAR_ACCOUNT: &str = "ACCOUNT";

/// AWS region of the event, passed to the inline scan job
pub const BUILD_VAR_REGION: &str = "REGION";

/// Image reference to scan, passed to the inline scan job
pub const BUILD_VAR_REPOSITORY: &str = "REPOSITORY";

/// Registry username, injected from Secrets Manager when available
pub const BUILD_VAR_DOCKER_USER: &str = "DOCKER_USER";

/// Registry password, injected from Secrets Manager when available
pub const BUILD_VAR_DOCKER_PASS: &str = "DOCKER_PASS";

// ============================================================================
// Secret Fields
// ============================================================================

/// JSON field holding the registry username inside a credentials secret
pub const SECRET_FIELD_USERNAME: &str = "username";

/// JSON field holding the registry password inside a credentials secret
pub const SECRET_FIELD_PASSWORD: &str = "password";
