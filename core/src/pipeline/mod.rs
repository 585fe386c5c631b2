// api_pack/src/pipeline/mod.rs

//! Defines the permissive `ApiPack`, its strict companion `StrictApiPack`, and
//! the stage logic they share.

pub mod definition;
pub mod execution;
pub(crate) mod stages;
pub mod strict;

pub use definition::ApiPack;
pub use strict::{StrictApiPack, StrictParts};
