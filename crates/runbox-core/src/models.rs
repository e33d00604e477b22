//! Core data model for execution requests, test cases, and results

use serde::{Deserialize, Serialize};

/// Language runtimes the sandbox can execute. Only Go is supported; the
/// enum keeps that closed instead of validating strings at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Go,
}

impl Language {
    /// Fixed file name the submitted source is staged under.
    pub fn source_file_name(&self) -> &'static str {
        match self {
            Language::Go => "main.go",
        }
    }

    /// Default sandbox image for this runtime.
    pub fn default_image(&self) -> &'static str {
        match self {
            Language::Go => "golang:1.22-alpine",
        }
    }

    /// Shell command run inside the container. The module graph is kept
    /// read-only so the sandboxed build cannot fetch dependencies.
    pub fn run_command(&self, has_input: bool) -> String {
        match self {
            Language::Go => {
                if has_input {
                    format!(
                        "cat {INPUT_FILE_NAME} | GOFLAGS=-mod=readonly go run {}",
                        self.source_file_name()
                    )
                } else {
                    format!("GOFLAGS=-mod=readonly go run {}", self.source_file_name())
                }
            }
        }
    }
}

/// File name the optional stdin payload is staged under.
pub const INPUT_FILE_NAME: &str = "input.txt";

/// A single execution request as received from the request layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRequest {
    pub source_code: String,
    pub language: Language,
    #[serde(default)]
    pub input: Option<String>,
}

/// Raw output of one completed sandbox run. Never partially populated:
/// either the process completed and both streams are captured, or the
/// call failed with an error before any result existed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: String,
    /// Whether the sandboxed process exited with a success status. A
    /// program may write warnings to stderr and still succeed.
    pub exit_ok: bool,
}

/// A stored test case. Owned by the test-case collaborator; read-only here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    pub id: i64,
    pub problem_id: i64,
    pub input: String,
    pub expected_output: String,
    pub is_hidden: bool,
}

/// Outcome of one test case. For hidden cases `input` and `expected_output`
/// are cleared before the result leaves this subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub test_case_id: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub input: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub expected_output: String,
    pub actual_output: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
    pub passed: bool,
}

/// Aggregate of one evaluation run. `success` is true iff every test
/// result passed; `test_results` preserves the input test-case order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResults {
    pub success: bool,
    pub test_results: Vec<TestResult>,
}
