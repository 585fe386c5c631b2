// api_pack/src/lib.rs

//! api-pack: an ASYNC pluggable request-processing pipeline for CRUD-style APIs.
//!
//! api-pack fixes the *order* of the steps needed to answer a resource request
//! and leaves every step's *implementation* to collaborators plugged in at
//! configuration time:
//!  - `check_route`: route-level authorization (`RouteChecker`).
//!  - `read`: load existing data (`Provider`), failing soft.
//!  - `deserialize`: merge the request body (`Serializer`, `Provider::get_instance`).
//!  - `check`: business rules on the loaded data (`Checker`).
//!  - `validate`: input shape (`Validator`).
//!  - `write`: persist or remove (`Persister`).
//!  - `serialize`: produce the outbound representation (`Serializer`).
//!
//! Each stage looks at the operation's HTTP method, resource type and current
//! data to decide whether it applies. `ApiPack` skips stages whose collaborator
//! is missing; `StrictApiPack` reports them as `ApiPackError::MissingCollaborator`.

pub mod config;
pub mod core;
pub mod error;
pub mod pipeline;
pub mod registry;

// --- Re-exports for the Public API ---

pub use crate::core::collaborator::{Checker, Persister, Provider, RouteChecker, Serializer, Validator};
pub use crate::core::control::{Role, RunReport, SkipReason, Stage, StageOutcome};
pub use crate::core::operation::{Method, Operation, OperationContext, Payload, ResourceType};

pub use crate::pipeline::{ApiPack, StrictApiPack, StrictParts};

pub use crate::config::{ApiPackConfig, PipelineMode};
pub use crate::error::{ApiPackError, ApiPackResult};

pub use crate::registry::{Collaborators, Selected};

/*
    Typical request lifecycle:
    1. At startup, build one `ApiPack` and register collaborators:
       `pack.route_checker(..).provider(..).serializer(..).validator(..).persister(..)`.
    2. Share it (e.g. `Arc<ApiPack>`) with request handlers.
    3. Per request, build an `Operation` from the HTTP verb and resource shape,
       plus any attributes (ids, filters) the collaborators need.
    4. Call `pack.process(&mut op, &payload).await` (or the stages one by one).
    5. Build the response from `op.data`, `op.errors(..)` or the returned error.
*/
