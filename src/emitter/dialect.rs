//! Surface syntax that differs between the generated languages.

use crate::ast::UnaryOperator;
use crate::parser::parse_number_literal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    C,
    Go,
}

impl Dialect {
    pub fn name(self) -> &'static str {
        match self {
            Self::C => "c",
            Self::Go => "go",
        }
    }

    pub(super) fn import(self, path: &str) -> String {
        match self {
            Self::C => format!("#include \"{path}\""),
            Self::Go => format!("import \"{path}\""),
        }
    }

    /// C has no `0o`/`0b` prefixes or digit separators, so those literals
    /// are rewritten to decimal.
    pub(super) fn number(self, literal: &str, value: i64) -> String {
        let lower = literal.to_ascii_lowercase();
        let foreign = lower.starts_with("0o") || lower.starts_with("0b") || literal.contains('_');
        if self == Self::C && foreign {
            return value.to_string();
        }
        literal.to_string()
    }

    pub(super) fn unary(self, op: UnaryOperator) -> &'static str {
        match (self, op) {
            (Self::Go, UnaryOperator::BitNot) => "^",
            _ => op.symbol(),
        }
    }

    pub(super) fn cast(self, value: &str, ty: &str) -> String {
        match self {
            Self::C => format!("(({ty}){value})"),
            Self::Go => format!("{ty}({value})"),
        }
    }

    pub(super) fn declaration(self, name: &str) -> String {
        match self {
            Self::C => format!("int {name}"),
            Self::Go => format!("var {name} int"),
        }
    }

    pub(super) fn function_header(
        self,
        name: &str,
        params: &[String],
        returns: &[String],
    ) -> String {
        match self {
            Self::C => {
                let params = if params.is_empty() {
                    "void".to_string()
                } else {
                    typed_list(params, |param| format!("int {param}"))
                };
                format!("int {name}({params}) {{")
            }
            Self::Go => {
                let params = typed_list(params, |param| format!("{param} int"));
                if returns.is_empty() {
                    format!("func {name}({params}) {{")
                } else {
                    let returns = typed_list(returns, |ret| format!("{ret} int"));
                    format!("func {name}({params}) ({returns}) {{")
                }
            }
        }
    }

    /// Declared return values become plain locals in C; Go names them in
    /// the signature.
    pub(super) fn return_locals(self, returns: &[String]) -> Vec<String> {
        match self {
            Self::C => returns.iter().map(|ret| format!("int {ret} = 0;")).collect(),
            Self::Go => Vec::new(),
        }
    }

    /// Go assigns every result of a call in one statement. C has no tuple
    /// assignment.
    pub(super) fn destructure(
        self,
        targets: &[String],
        call: &str,
        is_declaration: bool,
    ) -> Option<String> {
        let targets = targets.join(", ");
        match self {
            Self::C => None,
            Self::Go if is_declaration => Some(format!("var {targets} int = {call};")),
            Self::Go => Some(format!("{targets} = {call};")),
        }
    }

    pub(super) fn return_statement(self, values: &[String], error_code: Option<&str>) -> String {
        let mut line = match (self, values) {
            (_, []) => "return;".to_string(),
            (_, [value]) => format!("return {value};"),
            (Self::C, values) => format!("return ({});", values.join(", ")),
            (Self::Go, values) => format!("return {};", values.join(", ")),
        };
        if let Some(code) = error_code {
            let code = parse_number_literal(code)
                .map(|value| value.to_string())
                .unwrap_or_else(|| code.to_string());
            match self {
                Self::C => line.push_str(&format!(" /* error: {code} */")),
                Self::Go => line.push_str(&format!(" // error: {code}")),
            }
        }
        line
    }
}

fn typed_list(names: &[String], render: impl Fn(&str) -> String) -> String {
    names
        .iter()
        .map(|name| render(name))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn c_rewrites_foreign_literals() {
        assert_eq!(Dialect::C.number("0x1F", 31), "0x1F");
        assert_eq!(Dialect::C.number("0o17", 15), "15");
        assert_eq!(Dialect::C.number("0b101", 5), "5");
        assert_eq!(Dialect::C.number("1_000", 1000), "1000");
        assert_eq!(Dialect::Go.number("0o17", 15), "0o17");
    }

    #[test]
    fn function_headers() {
        let params = vec!["a".to_string(), "b".to_string()];
        let returns = vec!["q".to_string()];
        assert_eq!(
            Dialect::C.function_header("f", &params, &returns),
            "int f(int a, int b) {"
        );
        assert_eq!(Dialect::C.function_header("g", &[], &[]), "int g(void) {");
        assert_eq!(
            Dialect::Go.function_header("f", &params, &returns),
            "func f(a int, b int) (q int) {"
        );
        assert_eq!(Dialect::Go.function_header("g", &[], &[]), "func g() {");
    }

    #[test]
    fn returns_carry_error_code_as_comment() {
        let values = vec!["a".to_string(), "b".to_string()];
        assert_eq!(
            Dialect::C.return_statement(&values, Some("2")),
            "return (a, b); /* error: 2 */"
        );
        assert_eq!(
            Dialect::Go.return_statement(&values, Some("0x10")),
            "return a, b; // error: 16"
        );
        assert_eq!(Dialect::Go.return_statement(&values[..1], None), "return a;");
    }

    #[test]
    fn go_destructures_calls() {
        let targets = vec!["q".to_string(), "r".to_string()];
        assert_eq!(
            Dialect::Go.destructure(&targets, "divmod(17, 5)", true),
            Some("var q, r int = divmod(17, 5);".to_string())
        );
        assert_eq!(
            Dialect::Go.destructure(&targets, "f()", false),
            Some("q, r = f();".to_string())
        );
        assert_eq!(Dialect::C.destructure(&targets, "f()", true), None);
    }

    #[test]
    fn casts_and_bit_not() {
        assert_eq!(Dialect::C.cast("x", "long"), "((long)x)");
        assert_eq!(Dialect::Go.cast("x", "int64"), "int64(x)");
        assert_eq!(Dialect::Go.unary(UnaryOperator::BitNot), "^");
        assert_eq!(Dialect::C.unary(UnaryOperator::BitNot), "~");
    }
}
