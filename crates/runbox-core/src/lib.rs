//! runbox-core - Sandboxed code execution and test-case evaluation
//!
//! This crate provides functionality for:
//! - Staging untrusted source code into ephemeral per-run workspaces
//! - Running it in an isolated, resource-limited Docker container
//! - Evaluating the output against stored test cases with hidden-case masking

pub mod config;
pub mod error;
pub mod executor;
pub mod models;
pub mod sandbox;
pub mod workspace;

pub use config::ExecutorConfig;
pub use error::ExecError;
pub use executor::{CodeExecutor, TestCaseStore};
pub use models::{
    ExecutionRequest, ExecutionResult, ExecutionResults, Language, TestCase, TestResult,
};
pub use sandbox::{DockerLauncher, ImageCache, LaunchOutput, LaunchSpec, SandboxLauncher};
pub use workspace::RunWorkspace;
