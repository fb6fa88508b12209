/// External service capabilities consumed by the triggers
pub mod codebuild;
pub mod ecs;
pub mod scanning;
pub mod ssm;

// Re-export service traits
pub use codebuild::BuildService;
pub use ecs::TaskDefinitionSource;
pub use scanning::ScanningService;
pub use ssm::ParameterStore;
