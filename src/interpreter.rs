use anyhow::Result;
use std::fmt::Write as _;
use tracing::debug;

use crate::ast::Project;
use crate::backend::Backend;

mod error;
mod runtime;

pub use error::{RuntimeError, RuntimeResult};
use runtime::{ExecResult, InterpreterRuntime};

/// Values carried out of a function frame or the program by `return`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReturnValue {
    pub values: Vec<i64>,
    pub error_code: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterpreterOptions {
    pub max_call_depth: usize,
}

impl Default for InterpreterOptions {
    fn default() -> Self {
        Self { max_call_depth: 256 }
    }
}

/// Final state of one interpreted run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Execution {
    variables: Vec<(String, i64)>,
    returned: Option<Vec<i64>>,
    error_code: Option<i64>,
}

impl Execution {
    /// Root-scope variables, sorted by name.
    pub fn variables(&self) -> &[(String, i64)] {
        &self.variables
    }

    pub fn get(&self, name: &str) -> Option<i64> {
        self.variables
            .iter()
            .find(|(candidate, _)| candidate == name)
            .map(|(_, value)| *value)
    }

    /// Values of a top-level `return`, if the program stopped on one.
    pub fn returned(&self) -> Option<&[i64]> {
        self.returned.as_deref()
    }

    pub fn error_code(&self) -> Option<i64> {
        self.error_code
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for (name, value) in &self.variables {
            let _ = writeln!(out, "{name} = {value}");
        }
        if let Some(values) = &self.returned {
            let values = values
                .iter()
                .map(i64::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            let _ = writeln!(out, "return {values}");
        }
        if let Some(code) = self.error_code {
            let _ = writeln!(out, "error code {code}");
        }
        out.truncate(out.trim_end().len());
        out
    }
}

/// AST-walking backend that executes a project directly.
#[derive(Debug, Default)]
pub struct Interpreter {
    options: InterpreterOptions,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: InterpreterOptions) -> Self {
        Self { options }
    }

    /// Runs the top-level statements in the root scope. Imports have no
    /// runtime meaning and are skipped.
    pub fn evaluate(&self, project: &Project) -> RuntimeResult<Execution> {
        let mut runtime = InterpreterRuntime::new(self.options.max_call_depth);
        let returned = match runtime.exec_block(&project.body)? {
            ExecResult::Continue => None,
            ExecResult::Return(value) => Some(value.values),
        };
        let execution = Execution {
            variables: runtime.symbols.root_vars(),
            returned,
            error_code: runtime.error_code,
        };
        debug!(
            variables = execution.variables.len(),
            error_code = ?execution.error_code,
            "interpreter finished"
        );
        Ok(execution)
    }
}

impl Backend for Interpreter {
    fn name(&self) -> &'static str {
        "interpreter"
    }

    fn run(&self, project: &Project) -> Result<String> {
        Ok(self.evaluate(project)?.render())
    }
}
