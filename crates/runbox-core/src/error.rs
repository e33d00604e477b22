//! Error taxonomy for the executor
//!
//! Infrastructure faults are errors; a failing user program is not. A
//! program that exits non-zero or writes to stderr is reported as a normal
//! `ExecutionResult`, so callers can tell "the sandbox broke" apart from
//! "the submitted code is wrong".

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecError {
    /// Workspace staging failed before any sandbox work started.
    #[error("failed to stage workspace at {path}: {source}")]
    Staging {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The sandbox run exceeded its wall-clock limit. Distinct from a
    /// failing program; never accompanied by a partial result.
    #[error("execution timed out after {0:?}")]
    Timeout(Duration),

    /// `execute_for_problem` found no test cases for the problem.
    #[error("no test cases found for problem {problem_id}")]
    NoTestCases { problem_id: i64 },

    /// The test-case collaborator failed to resolve the problem's cases.
    #[error("failed to get test cases for problem {problem_id}: {source}")]
    Store {
        problem_id: i64,
        #[source]
        source: anyhow::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message() {
        let err = ExecError::Timeout(Duration::from_secs(15));
        assert_eq!(err.to_string(), "execution timed out after 15s");
    }

    #[test]
    fn test_no_test_cases_message() {
        let err = ExecError::NoTestCases { problem_id: 42 };
        assert_eq!(err.to_string(), "no test cases found for problem 42");
    }

    #[test]
    fn test_staging_carries_path() {
        let err = ExecError::Staging {
            path: PathBuf::from("/tmp/runbox/runbox-x"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("/tmp/runbox/runbox-x"));
    }
}
