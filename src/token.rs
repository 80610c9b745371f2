use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Structural
    Eof,
    Newline,

    // Literals
    Number,
    String,
    Identifier,

    // Keywords
    Var,
    If,
    Then,
    Else,
    And,
    Or,
    Not,
    Func,
    Return,
    As,
    Import,

    // Operators
    Plus,        // +
    Minus,       // -
    Star,        // *
    Slash,       // /
    Assign,      // =
    PlusAssign,  // +=
    MinusAssign, // -=
    StarAssign,  // *=
    SlashAssign, // /=
    EqualEqual,  // ==
    BangEqual,   // !=
    Less,        // <
    LessEqual,   // <=
    Greater,     // >
    GreaterEqual, // >=
    AmpAmp,      // &&
    PipePipe,    // ||
    Bang,        // !
    Amp,         // &
    Pipe,        // |
    Caret,       // ^
    Tilde,       // ~

    // Delimiters
    LParen, // (
    RParen, // )
    LBrace, // {
    RBrace, // }
    Comma,  // ,
    Dot,    // .
    Colon,  // :
}

impl TokenKind {
    /// Reserved words, checked after an identifier has been scanned.
    pub fn keyword(ident: &str) -> Option<Self> {
        match ident {
            "var" => Some(Self::Var),
            "if" => Some(Self::If),
            "then" => Some(Self::Then),
            "else" => Some(Self::Else),
            "and" => Some(Self::And),
            "or" => Some(Self::Or),
            "not" => Some(Self::Not),
            "func" => Some(Self::Func),
            "return" => Some(Self::Return),
            "as" => Some(Self::As),
            "import" => Some(Self::Import),
            _ => None,
        }
    }

    pub fn is_assign_op(self) -> bool {
        matches!(
            self,
            Self::Assign
                | Self::PlusAssign
                | Self::MinusAssign
                | Self::StarAssign
                | Self::SlashAssign
        )
    }

    pub fn describe(self) -> &'static str {
        match self {
            Self::Eof => "end of input",
            Self::Newline => "line break",
            Self::Number => "number",
            Self::String => "string",
            Self::Identifier => "identifier",
            Self::Var => "'var'",
            Self::If => "'if'",
            Self::Then => "'then'",
            Self::Else => "'else'",
            Self::And => "'and'",
            Self::Or => "'or'",
            Self::Not => "'not'",
            Self::Func => "'func'",
            Self::Return => "'return'",
            Self::As => "'as'",
            Self::Import => "'import'",
            Self::Plus => "'+'",
            Self::Minus => "'-'",
            Self::Star => "'*'",
            Self::Slash => "'/'",
            Self::Assign => "'='",
            Self::PlusAssign => "'+='",
            Self::MinusAssign => "'-='",
            Self::StarAssign => "'*='",
            Self::SlashAssign => "'/='",
            Self::EqualEqual => "'=='",
            Self::BangEqual => "'!='",
            Self::Less => "'<'",
            Self::LessEqual => "'<='",
            Self::Greater => "'>'",
            Self::GreaterEqual => "'>='",
            Self::AmpAmp => "'&&'",
            Self::PipePipe => "'||'",
            Self::Bang => "'!'",
            Self::Amp => "'&'",
            Self::Pipe => "'|'",
            Self::Caret => "'^'",
            Self::Tilde => "'~'",
            Self::LParen => "'('",
            Self::RParen => "')'",
            Self::LBrace => "'{'",
            Self::RBrace => "'}'",
            Self::Comma => "','",
            Self::Dot => "'.'",
            Self::Colon => "':'",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Label carried by the synthesized end-of-input token.
pub const EOF_TEXT: &str = "EOF";
/// Label carried by the synthesized line-break token.
pub const NEWLINE_TEXT: &str = "ENTER";

#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub span: Span,
}

impl<'a> Token<'a> {
    pub fn new(kind: TokenKind, text: &'a str, span: Span) -> Self {
        Self { kind, text, span }
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn span(&self) -> Span {
        self.span
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}:{} {} {:?})",
            self.span.line, self.span.column, self.kind, self.text
        )
    }
}
