use anyhow::{anyhow, Result};

use crate::ast::Project;
use crate::emitter::{Dialect, Emitter};
use crate::interpreter::Interpreter;

/// Common interface implemented by each back-end.
///
/// Every back-end walks the same immutable `Project` with its own symbol
/// table, so several of them may run over one tree.
pub trait Backend {
    fn name(&self) -> &'static str;
    fn run(&self, project: &Project) -> Result<String>;
}

pub fn backends() -> Vec<Box<dyn Backend>> {
    vec![
        Box::new(Interpreter::new()),
        Box::new(Emitter::new(Dialect::C)),
        Box::new(Emitter::new(Dialect::Go)),
    ]
}

pub fn backend(name: &str) -> Result<Box<dyn Backend>> {
    backends()
        .into_iter()
        .find(|backend| backend.name() == name)
        .ok_or_else(|| anyhow!("unknown backend '{name}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_names_are_unique() {
        let names = backends()
            .iter()
            .map(|backend| backend.name())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["interpreter", "c", "go"]);
    }

    #[test]
    fn lookup_by_name() {
        assert_eq!(backend("go").expect("go backend").name(), "go");
        assert!(backend("jvm").is_err());
    }

    #[test]
    fn every_backend_accepts_the_same_tree() {
        let project = crate::parser::parse("var a = 1 + 2\n").expect("parse failed");
        for backend in backends() {
            let output = backend.run(&project).expect("run failed");
            assert!(output.contains('a'), "{}: {output}", backend.name());
        }
    }
}
