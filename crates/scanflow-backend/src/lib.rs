/// Scanflow Backend - Lambdas submitting images to the Sysdig Secure backend
///
/// Two deployable functions live here: the ECR push trigger, which
/// registers the pushing account's registry and submits the pushed image,
/// and the ECS task-state trigger, which submits every container image of
/// a task state change.
pub mod handlers;
