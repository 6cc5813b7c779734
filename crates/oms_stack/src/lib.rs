//! Deployment template synthesis for the agentic OMS data platform.
//!
//! This crate owns the resource graph (bucket, orders table, event stream,
//! Glue role, catalog database, Glue job) and its rendering to a
//! CloudFormation cloud assembly. It intentionally excludes AWS SDK
//! concerns; applying the template is left to the provisioning engine.

pub mod assembly;
pub mod assets;
pub mod context;
pub mod error;
pub mod grants;
pub mod handlers;
pub mod logging;
pub mod naming;
pub mod resources;
pub mod stack;
pub mod template;

pub use context::{DeploymentContext, StackProps};
pub use error::{Result, SynthError};
pub use resources::StackGraph;
pub use stack::synthesize;
