use tracing::trace;

use crate::ast::{
    AssignOperator, BinaryOperator, Expression, LogicOperator, Statement, UnaryOperator, Variable,
};
use crate::parser::parse_number_literal;
use crate::symbols::{ScopeId, SymbolError, SymbolKind, SymbolTable};

use super::error::{RuntimeError, RuntimeResult};
use super::ReturnValue;

/// Control-flow marker for statement execution.
pub(super) enum ExecResult {
    Continue,
    Return(ReturnValue),
}

/// A function definition the program has executed, with the scope it was
/// defined in.
#[derive(Clone, Copy)]
struct FunctionEntry<'p> {
    params: &'p [Variable],
    returns: &'p [Variable],
    body: &'p [Statement],
    scope: ScopeId,
}

/// Runtime executor for interpreted statements and expressions.
pub(super) struct InterpreterRuntime<'p> {
    pub(super) symbols: SymbolTable,
    pub(super) error_code: Option<i64>,
    functions: Vec<FunctionEntry<'p>>,
    depth: usize,
    max_call_depth: usize,
}

impl<'p> InterpreterRuntime<'p> {
    pub(super) fn new(max_call_depth: usize) -> Self {
        Self {
            symbols: SymbolTable::new(),
            error_code: None,
            functions: Vec::new(),
            depth: 0,
            max_call_depth,
        }
    }

    pub(super) fn exec_block(&mut self, body: &'p [Statement]) -> RuntimeResult<ExecResult> {
        for statement in body {
            if let ExecResult::Return(value) = self.exec_statement(statement)? {
                return Ok(ExecResult::Return(value));
            }
        }
        Ok(ExecResult::Continue)
    }

    fn exec_statement(&mut self, statement: &'p Statement) -> RuntimeResult<ExecResult> {
        trace!("exec: {statement:?}");
        match statement {
            Statement::Assign {
                targets,
                op,
                values,
                is_declaration,
            } => {
                self.exec_assign(targets, *op, values, *is_declaration)?;
                Ok(ExecResult::Continue)
            }
            Statement::Branch {
                condition,
                then_branch,
                else_branch,
            } => {
                let arm = if self.eval(condition)? != 0 {
                    Some(&**then_branch)
                } else {
                    else_branch.as_deref()
                };
                match arm {
                    Some(arm) => self.exec_scoped(arm),
                    None => Ok(ExecResult::Continue),
                }
            }
            Statement::Function {
                name,
                params,
                returns,
                body,
            } => {
                self.symbols
                    .declare_function(&name.name, self.functions.len())?;
                self.functions.push(FunctionEntry {
                    params,
                    returns,
                    body,
                    scope: self.symbols.current(),
                });
                Ok(ExecResult::Continue)
            }
            Statement::Return { values, error_code } => {
                let values = self.eval_values(values)?;
                let error_code = match error_code {
                    Some(literal) => Some(parse_number_literal(literal).ok_or_else(|| {
                        RuntimeError::NotNumeric {
                            what: format!("error code '{literal}'"),
                        }
                    })?),
                    None => None,
                };
                if error_code.is_some() {
                    self.error_code = error_code;
                }
                Ok(ExecResult::Return(ReturnValue { values, error_code }))
            }
            Statement::Block(_) => self.exec_scoped(statement),
            Statement::Expr(Expression::Call { callee, args }) => {
                self.call(callee, args)?;
                Ok(ExecResult::Continue)
            }
            Statement::Expr(expr) => {
                self.eval(expr)?;
                Ok(ExecResult::Continue)
            }
            Statement::Empty => Ok(ExecResult::Continue),
        }
    }

    /// Runs a block or branch arm inside a fresh child scope.
    fn exec_scoped(&mut self, statement: &'p Statement) -> RuntimeResult<ExecResult> {
        let previous = self.symbols.enter_scope();
        let registered = self.functions.len();
        let result = match statement {
            Statement::Block(body) => self.exec_block(body),
            other => self.exec_statement(other),
        };
        // Functions defined in the scope die with it.
        self.functions.truncate(registered);
        self.symbols.exit_scope(previous);
        result
    }

    fn exec_assign(
        &mut self,
        targets: &[Variable],
        op: AssignOperator,
        values: &'p [Expression],
        is_declaration: bool,
    ) -> RuntimeResult<()> {
        if is_declaration && op != AssignOperator::Assign {
            return Err(RuntimeError::UnsupportedOperator {
                operator: op.symbol(),
            });
        }

        // Every value is computed before any target changes.
        let values = match values {
            [Expression::Call { callee, args }] => self.spread_call(callee, args, targets.len())?,
            _ => self.eval_each(values)?,
        };
        if values.len() != 1 && values.len() != targets.len() {
            return Err(RuntimeError::ShapeMismatch {
                targets: targets.len(),
                values: values.len(),
            });
        }

        for (index, target) in targets.iter().enumerate() {
            let value = if values.len() == 1 {
                values[0]
            } else {
                values[index]
            };
            if is_declaration {
                self.symbols.declare(&target.name, value)?;
                continue;
            }
            match op.arithmetic() {
                None => self.symbols.set(&target.name, value)?,
                Some(arithmetic) => {
                    let current = self.symbols.lookup_var(&target.name)?;
                    let combined = apply_binary(arithmetic, current, value)?;
                    self.symbols.set(&target.name, combined)?;
                }
            }
        }
        Ok(())
    }

    /// A lone call in a `return` passes all of its results through; any other
    /// list yields one value per expression.
    fn eval_values(&mut self, values: &'p [Expression]) -> RuntimeResult<Vec<i64>> {
        if let [Expression::Call { callee, args }] = values {
            return Ok(self.call(callee, args)?.values);
        }
        self.eval_each(values)
    }

    fn eval_each(&mut self, values: &'p [Expression]) -> RuntimeResult<Vec<i64>> {
        values.iter().map(|value| self.eval(value)).collect()
    }

    /// The results of a lone call on the right of an assignment spread over
    /// the targets only when the counts agree; otherwise the call stands for
    /// its first result.
    fn spread_call(
        &mut self,
        callee: &Variable,
        args: &'p [Expression],
        targets: usize,
    ) -> RuntimeResult<Vec<i64>> {
        let results = self.call(callee, args)?.values;
        if results.len() == targets {
            return Ok(results);
        }
        match results.first() {
            Some(first) => Ok(vec![*first]),
            None => Err(RuntimeError::NoValue {
                name: callee.name.clone(),
            }),
        }
    }

    fn eval(&mut self, expr: &'p Expression) -> RuntimeResult<i64> {
        match expr {
            Expression::Number { value, .. } => Ok(*value),
            Expression::String(text) => Err(RuntimeError::NotNumeric {
                what: format!("string \"{text}\""),
            }),
            Expression::Variable(variable) => Ok(self.symbols.lookup_var(&variable.name)?),
            Expression::Unary { op, operand } => {
                let value = self.eval(operand)?;
                apply_unary(*op, value)
            }
            // The target type of a cast is a name, not a value.
            Expression::Binary {
                left,
                op: BinaryOperator::Cast,
                ..
            } => self.eval(left),
            Expression::Binary { left, op, right } => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                apply_binary(*op, left, right)
            }
            Expression::Logic { op, left, right } => self.eval_logic(*op, left.as_deref(), right),
            Expression::Call { callee, args } => {
                let result = self.call(callee, args)?;
                result
                    .values
                    .first()
                    .copied()
                    .ok_or_else(|| RuntimeError::NoValue {
                        name: callee.name.clone(),
                    })
            }
        }
    }

    fn eval_logic(
        &mut self,
        op: LogicOperator,
        left: Option<&'p Expression>,
        right: &'p Expression,
    ) -> RuntimeResult<i64> {
        if op == LogicOperator::Not {
            return Ok(truth(self.eval(right)? == 0));
        }
        let left = left.ok_or(RuntimeError::MissingOperand {
            operator: op.symbol(),
        })?;
        let left = self.eval(left)?;
        match op {
            LogicOperator::And => {
                if left == 0 {
                    return Ok(0);
                }
                Ok(truth(self.eval(right)? != 0))
            }
            LogicOperator::Or => {
                if left != 0 {
                    return Ok(1);
                }
                Ok(truth(self.eval(right)? != 0))
            }
            LogicOperator::Not => Ok(truth(self.eval(right)? == 0)),
            LogicOperator::Equal => Ok(truth(left == self.eval(right)?)),
            LogicOperator::NotEqual => Ok(truth(left != self.eval(right)?)),
            LogicOperator::Less => Ok(truth(left < self.eval(right)?)),
            LogicOperator::LessEqual => Ok(truth(left <= self.eval(right)?)),
            LogicOperator::Greater => Ok(truth(left > self.eval(right)?)),
            LogicOperator::GreaterEqual => Ok(truth(left >= self.eval(right)?)),
        }
    }

    fn call(&mut self, callee: &Variable, args: &'p [Expression]) -> RuntimeResult<ReturnValue> {
        let symbol = self
            .symbols
            .get(&callee.name)
            .ok_or_else(|| SymbolError::UndefinedReference {
                name: callee.name.clone(),
            })?;
        if symbol.kind != SymbolKind::Function {
            return Err(SymbolError::KindMismatch {
                name: callee.name.clone(),
                expected: SymbolKind::Function.name(),
                found: symbol.kind.name(),
            }
            .into());
        }
        let entry = self.functions[symbol.value as usize];

        if args.len() != entry.params.len() {
            return Err(RuntimeError::ArityMismatch {
                name: callee.name.clone(),
                expected: entry.params.len(),
                found: args.len(),
            });
        }
        if self.depth >= self.max_call_depth {
            return Err(RuntimeError::CallDepthExceeded {
                limit: self.max_call_depth,
            });
        }

        // Arguments are evaluated in the caller's scope.
        let args = args
            .iter()
            .map(|arg| self.eval(arg))
            .collect::<RuntimeResult<Vec<_>>>()?;

        let previous = self.symbols.enter_scope_under(entry.scope);
        let registered = self.functions.len();
        self.depth += 1;
        let result = self.run_frame(&entry, &args);
        self.depth -= 1;
        self.functions.truncate(registered);
        self.symbols.exit_scope(previous);
        result
    }

    fn run_frame(
        &mut self,
        entry: &FunctionEntry<'p>,
        args: &[i64],
    ) -> RuntimeResult<ReturnValue> {
        for (param, value) in entry.params.iter().zip(args) {
            self.symbols.declare(&param.name, *value)?;
        }
        for declared in entry.returns {
            self.symbols.declare(&declared.name, 0)?;
        }

        match self.exec_block(entry.body)? {
            ExecResult::Return(value) => Ok(value),
            ExecResult::Continue => {
                let values = entry
                    .returns
                    .iter()
                    .map(|declared| self.symbols.lookup_var(&declared.name))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(ReturnValue {
                    values,
                    error_code: None,
                })
            }
        }
    }
}

fn truth(condition: bool) -> i64 {
    i64::from(condition)
}

fn apply_unary(op: UnaryOperator, value: i64) -> RuntimeResult<i64> {
    match op {
        UnaryOperator::Negate => value.checked_neg().ok_or(RuntimeError::Overflow {
            operator: op.symbol(),
        }),
        UnaryOperator::Plus => Ok(value),
        UnaryOperator::Not => Ok(truth(value == 0)),
        UnaryOperator::BitNot => Ok(!value),
        UnaryOperator::Deref | UnaryOperator::AddressOf => {
            Err(RuntimeError::UnsupportedOperator {
                operator: op.symbol(),
            })
        }
    }
}

fn apply_binary(op: BinaryOperator, left: i64, right: i64) -> RuntimeResult<i64> {
    let overflow = RuntimeError::Overflow {
        operator: op.symbol(),
    };
    match op {
        BinaryOperator::Add => left.checked_add(right).ok_or(overflow),
        BinaryOperator::Sub => left.checked_sub(right).ok_or(overflow),
        BinaryOperator::Mul => left.checked_mul(right).ok_or(overflow),
        BinaryOperator::Div => {
            if right == 0 {
                return Err(RuntimeError::DivisionByZero);
            }
            left.checked_div(right).ok_or(overflow)
        }
        BinaryOperator::BitAnd => Ok(left & right),
        BinaryOperator::BitOr => Ok(left | right),
        BinaryOperator::BitXor => Ok(left ^ right),
        BinaryOperator::Cast => Ok(left),
    }
}
