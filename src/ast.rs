//! Shared syntax tree used by every back-end.
//!
//! The parser builds these nodes once; the interpreter and the emitters walk
//! them read-only, each with its own symbol table.

use std::fmt;

/// A possibly dotted name such as `a` or `fmt.out`.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct Variable {
    pub name: String,
}

impl Variable {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn is_dotted(&self) -> bool {
        self.name.contains('.')
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum UnaryOperator {
    Negate,    // -
    Plus,      // +
    Deref,     // *
    AddressOf, // &
    Not,       // !
    BitNot,    // ~
}

impl UnaryOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Negate => "-",
            Self::Plus => "+",
            Self::Deref => "*",
            Self::AddressOf => "&",
            Self::Not => "!",
            Self::BitNot => "~",
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    BitAnd,
    BitOr,
    BitXor,
    Cast,
}

impl BinaryOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::BitXor => "^",
            Self::Cast => "as",
        }
    }
}

/// Operators whose result is a truth value (1 or 0).
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum LogicOperator {
    And,
    Or,
    Not,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

impl LogicOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::And => "&&",
            Self::Or => "||",
            Self::Not => "!",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::LessEqual => "<=",
            Self::Greater => ">",
            Self::GreaterEqual => ">=",
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum AssignOperator {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
}

impl AssignOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Assign => "=",
            Self::AddAssign => "+=",
            Self::SubAssign => "-=",
            Self::MulAssign => "*=",
            Self::DivAssign => "/=",
        }
    }

    /// The arithmetic a compound assignment applies, `None` for plain `=`.
    pub fn arithmetic(self) -> Option<BinaryOperator> {
        match self {
            Self::Assign => None,
            Self::AddAssign => Some(BinaryOperator::Add),
            Self::SubAssign => Some(BinaryOperator::Sub),
            Self::MulAssign => Some(BinaryOperator::Mul),
            Self::DivAssign => Some(BinaryOperator::Div),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Expression {
    /// `literal` is the source lexeme, `value` its integer meaning.
    Number {
        literal: String,
        value: i64,
    },
    String(String),
    Variable(Variable),
    Unary {
        op: UnaryOperator,
        operand: Box<Expression>,
    },
    Binary {
        left: Box<Expression>,
        op: BinaryOperator,
        right: Box<Expression>,
    },
    /// `left` is `None` only for `not`.
    Logic {
        op: LogicOperator,
        left: Option<Box<Expression>>,
        right: Box<Expression>,
    },
    Call {
        callee: Variable,
        args: Vec<Expression>,
    },
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Statement {
    /// A single value is broadcast to every target; otherwise targets and
    /// values pair up by index.
    Assign {
        targets: Vec<Variable>,
        op: AssignOperator,
        values: Vec<Expression>,
        is_declaration: bool,
    },
    Branch {
        condition: Expression,
        then_branch: Box<Statement>,
        else_branch: Option<Box<Statement>>,
    },
    Function {
        name: Variable,
        params: Vec<Variable>,
        returns: Vec<Variable>,
        body: Vec<Statement>,
    },
    Return {
        values: Vec<Expression>,
        error_code: Option<String>,
    },
    Block(Vec<Statement>),
    Expr(Expression),
    Empty,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Import {
    pub path: String,
}

#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct Project {
    pub imports: Vec<Import>,
    pub body: Vec<Statement>,
}
