/// Scanflow Inline - Lambdas launching inline scan jobs on CodeBuild
///
/// Two deployable functions live here: the basic trigger, which starts one
/// build per container image of an ECS task state change, and the
/// credentialed trigger, which additionally resolves per-container registry
/// credentials from the task definition and injects them into the build as
/// Secrets Manager references.
pub mod handlers;
