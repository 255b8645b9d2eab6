// src/exec/command.rs

use crate::types::TestScope;

/// One request to run the test command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestInvocation {
    pub scope: TestScope,
    pub coverage: bool,
    /// Value for `-run`, restricting which tests execute.
    pub run_filter: Option<String>,
}

impl TestInvocation {
    pub fn new(scope: TestScope, coverage: bool) -> Self {
        Self {
            scope,
            coverage,
            run_filter: None,
        }
    }

    pub fn with_run_filter(mut self, filter: Option<String>) -> Self {
        self.run_filter = filter;
        self
    }

    /// Arguments in the order the test command expects:
    /// `test -v [-cover] [-run=<filter>] <selectors...>`.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec!["test".to_string(), "-v".to_string()];
        if self.coverage {
            args.push("-cover".to_string());
        }
        if let Some(filter) = &self.run_filter {
            args.push(format!("-run={filter}"));
        }
        args.extend(self.scope.selectors());
        args
    }
}
