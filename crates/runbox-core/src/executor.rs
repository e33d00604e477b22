//! Code executor - sandbox orchestration and test-case evaluation
//!
//! One `CodeExecutor` serves many concurrent callers. Each call stages a
//! private workspace, runs exactly one container through the launcher, and
//! evaluates the captured output. Infrastructure faults abort the call;
//! failing user programs are reported as data.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::ExecutorConfig;
use crate::error::ExecError;
use crate::models::{ExecutionResult, ExecutionResults, Language, TestCase, TestResult};
use crate::sandbox::{LaunchSpec, SandboxLauncher};
use crate::workspace::RunWorkspace;

/// Data-access collaborator resolving a problem's stored test cases.
#[async_trait]
pub trait TestCaseStore: Send + Sync {
    async fn test_cases_by_problem(&self, problem_id: i64) -> Result<Vec<TestCase>>;
}

/// Executes untrusted code in the sandbox and evaluates test cases.
pub struct CodeExecutor {
    config: ExecutorConfig,
    launcher: Arc<dyn SandboxLauncher>,
    store: Option<Arc<dyn TestCaseStore>>,
}

impl CodeExecutor {
    pub fn new(config: ExecutorConfig, launcher: Arc<dyn SandboxLauncher>) -> Self {
        for dir in [config.build_cache_dir(), config.mod_cache_dir()] {
            if let Err(e) = std::fs::create_dir_all(&dir) {
                warn!("failed to create cache dir {}: {}", dir.display(), e);
            }
        }
        Self {
            config,
            launcher,
            store: None,
        }
    }

    /// Attach the test-case collaborator needed by `execute_for_problem`.
    pub fn with_store(mut self, store: Arc<dyn TestCaseStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Run `source_code` once with no stdin and return the raw result.
    pub async fn execute(
        &self,
        source_code: &str,
        language: Language,
    ) -> Result<ExecutionResult, ExecError> {
        let start = Instant::now();
        info!("received execution request");
        let result = self.run_sandboxed(source_code, language, None).await;
        info!("request processed in {:?}", start.elapsed());
        result
    }

    /// Run `source_code` once with `input` piped to its stdin.
    pub async fn execute_with_stdin(
        &self,
        source_code: &str,
        language: Language,
        input: &str,
    ) -> Result<ExecutionResult, ExecError> {
        let start = Instant::now();
        info!("received execution request with stdin");
        let result = self.run_sandboxed(source_code, language, Some(input)).await;
        info!("request processed in {:?}", start.elapsed());
        result
    }

    /// Run `source_code` once per test case, in input order, and aggregate
    /// pass/fail results. A test failure continues to the next case; an
    /// infrastructure error aborts the whole evaluation.
    pub async fn execute_with_test_cases(
        &self,
        source_code: &str,
        language: Language,
        test_cases: &[TestCase],
    ) -> Result<ExecutionResults, ExecError> {
        let start = Instant::now();
        info!("received execution request with {} test cases", test_cases.len());

        let mut test_results = Vec::with_capacity(test_cases.len());
        let mut success = true;

        for test_case in test_cases {
            debug!(test_case_id = test_case.id, "running test case");

            let result = self
                .run_sandboxed(source_code, language, Some(&test_case.input))
                .await?;

            let actual_output = result.stdout.trim().to_string();
            let passed = actual_output == test_case.expected_output.trim();
            if !passed {
                success = false;
            }

            let mut test_result = TestResult {
                test_case_id: test_case.id,
                input: test_case.input.clone(),
                expected_output: test_case.expected_output.clone(),
                actual_output,
                error: result.stderr,
                passed,
            };

            // Hidden cases must not leak their data to the caller.
            if test_case.is_hidden {
                test_result.input = String::new();
                test_result.expected_output = String::new();
            }

            test_results.push(test_result);
        }

        info!("request processed in {:?}", start.elapsed());
        Ok(ExecutionResults {
            success,
            test_results,
        })
    }

    /// Resolve a problem's test cases through the store and evaluate
    /// against them. Zero stored cases is an error, not an empty success.
    pub async fn execute_for_problem(
        &self,
        source_code: &str,
        language: Language,
        problem_id: i64,
    ) -> Result<ExecutionResults, ExecError> {
        info!(problem_id, "executing code for problem");

        let store = self.store.as_ref().ok_or_else(|| ExecError::Store {
            problem_id,
            source: anyhow::anyhow!("no test case store configured"),
        })?;

        let test_cases = store
            .test_cases_by_problem(problem_id)
            .await
            .map_err(|source| ExecError::Store { problem_id, source })?;

        if test_cases.is_empty() {
            return Err(ExecError::NoTestCases { problem_id });
        }

        self.execute_with_test_cases(source_code, language, &test_cases)
            .await
    }

    /// Stage, launch, and capture one sandbox run. The workspace is
    /// released on every exit path; the container is killed on timeout and
    /// when the caller drops the future mid-run.
    async fn run_sandboxed(
        &self,
        source_code: &str,
        language: Language,
        input: Option<&str>,
    ) -> Result<ExecutionResult, ExecError> {
        let workspace =
            RunWorkspace::stage(&self.config.base_dir, language, source_code, input).await?;

        let container_name = format!("runbox-{}", Uuid::new_v4());
        let spec = LaunchSpec {
            container_name: container_name.clone(),
            image: self.config.image.clone(),
            workspace_dir: self.config.host_path(workspace.path()),
            build_cache_dir: self.config.host_path(&self.config.build_cache_dir()),
            mod_cache_dir: self.config.host_path(&self.config.mod_cache_dir()),
            command: language.run_command(workspace.has_input()),
            memory_mb: self.config.memory_mb,
            cpus: self.config.cpus,
        };

        let mut kill_guard = KillGuard::arm(Arc::clone(&self.launcher), container_name.clone());

        let start = Instant::now();
        let launched = tokio::time::timeout(self.config.timeout(), self.launcher.launch(&spec)).await;
        let elapsed = start.elapsed();

        match launched {
            Err(_) => {
                warn!(
                    run_id = workspace.run_id(),
                    "deadline exceeded after {:?}, killing container", elapsed
                );
                self.launcher.kill(&container_name).await;
                kill_guard.disarm();
                Err(ExecError::Timeout(self.config.timeout()))
            }
            Ok(Err(e)) => {
                kill_guard.disarm();
                warn!(run_id = workspace.run_id(), "sandbox launch failed: {}", e);
                Ok(ExecutionResult {
                    stdout: String::new(),
                    stderr: e.to_string(),
                    exit_ok: false,
                })
            }
            Ok(Ok(output)) => {
                kill_guard.disarm();
                debug!(
                    run_id = workspace.run_id(),
                    exit_ok = output.exit_ok,
                    "sandbox run finished in {:?}",
                    elapsed
                );
                let stderr = if !output.exit_ok && output.stderr.is_empty() {
                    "sandbox process exited with a failure status".to_string()
                } else {
                    output.stderr
                };
                Ok(ExecutionResult {
                    stdout: output.stdout,
                    stderr,
                    exit_ok: output.exit_ok,
                })
            }
        }
    }
}

/// Kills the named container if the owning call is cancelled before it
/// completes, so dropped futures do not orphan running sandboxes.
struct KillGuard {
    launcher: Arc<dyn SandboxLauncher>,
    name: Option<String>,
}

impl KillGuard {
    fn arm(launcher: Arc<dyn SandboxLauncher>, name: String) -> Self {
        Self {
            launcher,
            name: Some(name),
        }
    }

    fn disarm(&mut self) {
        self.name = None;
    }
}

impl Drop for KillGuard {
    fn drop(&mut self) {
        if let Some(name) = self.name.take() {
            let launcher = Arc::clone(&self.launcher);
            tokio::spawn(async move {
                launcher.kill(&name).await;
            });
        }
    }
}
