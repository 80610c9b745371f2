use anyhow::Result;
use tracing::debug;

use crate::ast::{
    AssignOperator, BinaryOperator, Expression, LogicOperator, Project, Statement, Variable,
};
use crate::backend::Backend;
use crate::symbols::{SymbolError, SymbolKind, SymbolTable};

mod dialect;
mod error;

pub use dialect::Dialect;
pub use error::{EmitError, EmitResult};

/// Source-to-source backend. Renders a project as C or Go text after checking
/// that every plain variable is declared before use.
#[derive(Debug, Clone, Copy)]
pub struct Emitter {
    dialect: Dialect,
}

impl Emitter {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn render(&self, project: &Project) -> EmitResult<String> {
        let mut run = EmitterRun {
            dialect: self.dialect,
            symbols: SymbolTable::new(),
            output: String::new(),
        };
        for import in &project.imports {
            let line = self.dialect.import(&import.path);
            run.push_line(0, &line);
        }
        run.emit_block(&project.body, 0)?;
        debug!(
            dialect = self.dialect.name(),
            bytes = run.output.len(),
            "emitter finished"
        );
        Ok(run.output)
    }
}

impl Backend for Emitter {
    fn name(&self) -> &'static str {
        self.dialect.name()
    }

    fn run(&self, project: &Project) -> Result<String> {
        Ok(self.render(project)?)
    }
}

/// State for one render pass.
struct EmitterRun {
    dialect: Dialect,
    symbols: SymbolTable,
    output: String,
}

impl EmitterRun {
    fn emit_block(&mut self, body: &[Statement], indent: usize) -> EmitResult<()> {
        for statement in body {
            self.emit_statement(statement, indent)?;
        }
        Ok(())
    }

    fn emit_statement(&mut self, statement: &Statement, indent: usize) -> EmitResult<()> {
        match statement {
            Statement::Assign {
                targets,
                op,
                values,
                is_declaration,
            } => self.emit_assign(targets, *op, values, *is_declaration, indent)?,
            Statement::Branch {
                condition,
                then_branch,
                else_branch,
            } => {
                let condition = self.condition(condition)?;
                self.push_line(indent, &format!("if ({condition}) {{"));
                self.emit_arm(then_branch, indent + 1)?;
                if let Some(else_branch) = else_branch {
                    self.push_line(indent, "} else {");
                    self.emit_arm(else_branch, indent + 1)?;
                }
                self.push_line(indent, "}");
            }
            Statement::Function {
                name,
                params,
                returns,
                body,
            } => {
                self.symbols.declare_function(&name.name, returns.len())?;
                let previous = self.symbols.enter_scope();
                let result = self.emit_function(name, params, returns, body, indent);
                self.symbols.exit_scope(previous);
                result?;
            }
            Statement::Return { values, error_code } => {
                let values = values
                    .iter()
                    .map(|value| self.expression(value))
                    .collect::<EmitResult<Vec<_>>>()?;
                let line = self.dialect.return_statement(&values, error_code.as_deref());
                self.push_line(indent, &line);
            }
            Statement::Block(body) => {
                self.push_line(indent, "{");
                self.emit_scoped(body, indent + 1)?;
                self.push_line(indent, "}");
            }
            Statement::Expr(expr) => {
                let expr = self.expression(expr)?;
                self.push_line(indent, &format!("{expr};"));
            }
            Statement::Empty => {}
        }
        Ok(())
    }

    /// Branch arms open their own scope; a braced arm contributes its body
    /// without an extra pair of braces.
    fn emit_arm(&mut self, arm: &Statement, indent: usize) -> EmitResult<()> {
        match arm {
            Statement::Block(body) => self.emit_scoped(body, indent),
            other => self.emit_scoped(std::slice::from_ref(other), indent),
        }
    }

    fn emit_scoped(&mut self, body: &[Statement], indent: usize) -> EmitResult<()> {
        let previous = self.symbols.enter_scope();
        let result = self.emit_block(body, indent);
        self.symbols.exit_scope(previous);
        result
    }

    fn emit_function(
        &mut self,
        name: &Variable,
        params: &[Variable],
        returns: &[Variable],
        body: &[Statement],
        indent: usize,
    ) -> EmitResult<()> {
        for variable in params.iter().chain(returns) {
            self.symbols.declare(&variable.name, 0)?;
        }
        let params = names(params);
        let returns = names(returns);
        let header = self.dialect.function_header(&name.name, &params, &returns);
        self.push_line(indent, &header);
        for local in self.dialect.return_locals(&returns) {
            self.push_line(indent + 1, &local);
        }
        self.emit_block(body, indent + 1)?;
        // Falling off the end hands back the declared results.
        if !returns.is_empty() && !matches!(body.last(), Some(Statement::Return { .. })) {
            let line = self.dialect.return_statement(&returns, None);
            self.push_line(indent + 1, &line);
        }
        self.push_line(indent, "}");
        Ok(())
    }

    fn emit_assign(
        &mut self,
        targets: &[Variable],
        op: AssignOperator,
        values: &[Expression],
        is_declaration: bool,
        indent: usize,
    ) -> EmitResult<()> {
        // Values are checked before any target is declared.
        let rendered = values
            .iter()
            .map(|value| self.expression(value))
            .collect::<EmitResult<Vec<_>>>()?;
        if let [Expression::Call { callee, .. }] = values {
            let spreads = targets.len() > 1
                && op == AssignOperator::Assign
                && self.result_count(callee) == Some(targets.len());
            if spreads {
                return self.emit_destructure(targets, &rendered[0], is_declaration, indent);
            }
        }
        let values = rendered;
        let broadcast = values.len() == 1 && targets.len() > 1;

        for (index, target) in targets.iter().enumerate() {
            let value = match values.get(index) {
                Some(value) => Some(value.clone()),
                None if broadcast && op == AssignOperator::Assign => Some(targets[0].name.clone()),
                None if broadcast => Some(values[0].clone()),
                None => None,
            };

            let lhs = if is_declaration {
                self.symbols.declare(&target.name, 0)?;
                self.dialect.declaration(&target.name)
            } else {
                self.check_variable(target)?;
                target.name.clone()
            };

            let line = match value {
                Some(value) => format!("{lhs} {} {value};", op.symbol()),
                None => format!("{lhs};"),
            };
            self.push_line(indent, &line);
        }
        Ok(())
    }

    /// A call whose result count matches the targets fills all of them.
    fn emit_destructure(
        &mut self,
        targets: &[Variable],
        call: &str,
        is_declaration: bool,
        indent: usize,
    ) -> EmitResult<()> {
        for target in targets {
            if is_declaration {
                self.symbols.declare(&target.name, 0)?;
            } else {
                self.check_variable(target)?;
            }
        }
        let targets = names(targets);
        if let Some(line) = self.dialect.destructure(&targets, call, is_declaration) {
            self.push_line(indent, &line);
            return Ok(());
        }
        // Without tuple assignment the call fills the first target and the
        // rest stay bare.
        for (index, target) in targets.iter().enumerate() {
            let lhs = if is_declaration {
                self.dialect.declaration(target)
            } else {
                target.clone()
            };
            let line = if index == 0 {
                format!("{lhs} = {call};")
            } else {
                format!("{lhs};")
            };
            self.push_line(indent, &line);
        }
        Ok(())
    }

    fn result_count(&self, callee: &Variable) -> Option<usize> {
        self.symbols
            .get(&callee.name)
            .filter(|symbol| symbol.kind == SymbolKind::Function)
            .map(|symbol| symbol.value as usize)
    }

    /// Renders a condition without the outer parentheses the `if` supplies.
    fn condition(&mut self, expr: &Expression) -> EmitResult<String> {
        let rendered = self.expression(expr)?;
        let wrapped = matches!(
            expr,
            Expression::Binary { op, .. } if *op != BinaryOperator::Cast
        ) || matches!(expr, Expression::Logic { left: Some(_), .. });
        if wrapped {
            return Ok(rendered[1..rendered.len() - 1].to_string());
        }
        Ok(rendered)
    }

    fn expression(&mut self, expr: &Expression) -> EmitResult<String> {
        match expr {
            Expression::Number { literal, value } => Ok(self.dialect.number(literal, *value)),
            Expression::String(text) => Ok(format!("\"{text}\"")),
            Expression::Variable(variable) => {
                self.check_variable(variable)?;
                Ok(variable.name.clone())
            }
            Expression::Unary { op, operand } => {
                let operand = self.expression(operand)?;
                Ok(format!("{}{operand}", self.dialect.unary(*op)))
            }
            // The right side of a cast names a type.
            Expression::Binary {
                left,
                op: BinaryOperator::Cast,
                right,
            } => {
                let value = self.expression(left)?;
                let ty = match right.as_ref() {
                    Expression::Variable(variable) => variable.name.clone(),
                    other => self.expression(other)?,
                };
                Ok(self.dialect.cast(&value, &ty))
            }
            Expression::Binary { left, op, right } => {
                let left = self.expression(left)?;
                let right = self.expression(right)?;
                Ok(format!("({left} {} {right})", op.symbol()))
            }
            Expression::Logic {
                op: LogicOperator::Not,
                right,
                ..
            } => {
                let operand = self.expression(right)?;
                Ok(format!("!{operand}"))
            }
            Expression::Logic { op, left, right } => {
                let right = self.expression(right)?;
                match left {
                    Some(left) => {
                        let left = self.expression(left)?;
                        Ok(format!("({left} {} {right})", op.symbol()))
                    }
                    None => Ok(format!("{}{right}", op.symbol())),
                }
            }
            Expression::Call { callee, args } => {
                self.check_variable(callee)?;
                let args = args
                    .iter()
                    .map(|arg| self.expression(arg))
                    .collect::<EmitResult<Vec<_>>>()?;
                Ok(format!("{}({})", callee.name, args.join(", ")))
            }
        }
    }

    /// Dotted names refer to things outside the program and are not checked.
    fn check_variable(&self, variable: &Variable) -> EmitResult<()> {
        if variable.is_dotted() || self.symbols.get(&variable.name).is_some() {
            return Ok(());
        }
        Err(SymbolError::UndefinedReference {
            name: variable.name.clone(),
        }
        .into())
    }

    fn push_line(&mut self, indent: usize, line: &str) {
        for _ in 0..indent {
            self.output.push_str("    ");
        }
        self.output.push_str(line);
        self.output.push('\n');
    }
}

fn names(variables: &[Variable]) -> Vec<String> {
    variables
        .iter()
        .map(|variable| variable.name.clone())
        .collect()
}
