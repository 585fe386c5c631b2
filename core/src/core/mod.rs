pub mod collaborator;
pub mod control;
pub mod operation;

// Re-export key types for easier access from other api-pack modules (and lib.rs)
pub use collaborator::{Checker, Persister, Provider, RouteChecker, Serializer, Validator};
pub use control::{Role, RunReport, SkipReason, Stage, StageOutcome};
pub use operation::{Method, Operation, OperationContext, Payload, ResourceType};
