use std::path::Path;

use myc::ast::Project;
use myc::parser;
use test_support::load_cases;

/// Bench-enabled cases from the program suite, as (label, source).
pub fn workloads() -> Vec<(String, String)> {
    let cases = load_cases(Path::new("tests/programs")).expect("load cases");
    cases
        .into_iter()
        .filter(|case| case.spec.bench.enabled)
        .map(|case| {
            let source = case.source().expect("read program");
            (case.name, source)
        })
        .collect()
}

/// A long straight-line program built by repeating every workload inside
/// its own block, so declarations never collide.
pub fn scaled_source(repeat: usize) -> String {
    let mut source = String::new();
    for (_, body) in workloads() {
        for _ in 0..repeat {
            source.push_str("{\n");
            source.push_str(&body);
            source.push_str("}\n");
        }
    }
    source
}

pub fn load_project(source: &str) -> Project {
    parser::parse(source).unwrap_or_else(|err| panic!("parse: {err}"))
}
