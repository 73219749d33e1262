//! Tokenizer with Python's indentation rules.
//!
//! Produces `Newline`/`Indent`/`Dedent` tokens the way CPython's tokenizer
//! does: blank and comment-only lines are invisible, newlines inside
//! brackets are implicit line joins, and a backslash before a newline is an
//! explicit one.

use super::ast::BinaryOp;
use super::error::{SyntaxError, SyntaxResult};

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Name(String),
    Int(String),
    Float(String),
    Str(String),
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Semi,
    Dot,
    Assign,
    AugAssign(BinaryOp),
    Plus,
    Minus,
    Star,
    DoubleStar,
    Slash,
    DoubleSlash,
    Percent,
    Pipe,
    Caret,
    Amp,
    Tilde,
    LShift,
    RShift,
    EqEq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
    Newline,
    Indent,
    Dedent,
    Eof,
}

impl TokenKind {
    /// Short description for error messages.
    pub fn describe(&self) -> String {
        match self {
            Self::Name(n) => format!("'{n}'"),
            Self::Int(n) | Self::Float(n) => format!("number {n}"),
            Self::Str(_) => "string literal".to_string(),
            Self::Newline => "end of line".to_string(),
            Self::Indent => "indent".to_string(),
            Self::Dedent => "dedent".to_string(),
            Self::Eof => "end of input".to_string(),
            other => format!("'{}'", other.punct()),
        }
    }

    fn punct(&self) -> &'static str {
        match self {
            Self::LParen => "(",
            Self::RParen => ")",
            Self::LBracket => "[",
            Self::RBracket => "]",
            Self::LBrace => "{",
            Self::RBrace => "}",
            Self::Comma => ",",
            Self::Colon => ":",
            Self::Semi => ";",
            Self::Dot => ".",
            Self::Assign => "=",
            Self::AugAssign(_) => "augmented assignment",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::DoubleStar => "**",
            Self::Slash => "/",
            Self::DoubleSlash => "//",
            Self::Percent => "%",
            Self::Pipe => "|",
            Self::Caret => "^",
            Self::Amp => "&",
            Self::Tilde => "~",
            Self::LShift => "<<",
            Self::RShift => ">>",
            Self::EqEq => "==",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtE => "<=",
            Self::Gt => ">",
            Self::GtE => ">=",
            _ => "?",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
}

/// Tokenize a Python fragment.
pub fn tokenize(source: &str) -> SyntaxResult<Vec<Token>> {
    let mut lexer = Lexer::new(source);
    lexer.run()?;
    Ok(lexer.tokens)
}

const STRING_PREFIXES: &[&str] = &["r", "u", "b", "f", "rb", "br", "fr", "rf"];

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    tokens: Vec<Token>,
    indents: Vec<usize>,
    brackets: Vec<(char, usize)>,
    at_line_start: bool,
}

impl Lexer {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            tokens: Vec::new(),
            indents: vec![0],
            brackets: Vec::new(),
            at_line_start: true,
        }
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn push(&mut self, kind: TokenKind) {
        self.tokens.push(Token {
            kind,
            line: self.line,
        });
    }

    fn push_newline(&mut self) {
        match self.tokens.last() {
            None => {}
            Some(t) if t.kind == TokenKind::Newline => {}
            Some(_) => self.push(TokenKind::Newline),
        }
    }

    fn run(&mut self) -> SyntaxResult<()> {
        while self.pos < self.chars.len() {
            if self.at_line_start && self.brackets.is_empty() {
                self.at_line_start = false;
                self.indentation()?;
                continue;
            }

            let c = self.chars[self.pos];
            match c {
                '\n' => {
                    self.pos += 1;
                    if self.brackets.is_empty() {
                        self.push_newline();
                        self.at_line_start = true;
                    }
                    self.line += 1;
                }
                ' ' | '\t' | '\r' | '\x0c' => self.pos += 1,
                '#' => {
                    while self.pos < self.chars.len() && self.chars[self.pos] != '\n' {
                        self.pos += 1;
                    }
                }
                '\\' => {
                    let next = self.peek_at(1);
                    let after = self.peek_at(2);
                    if next == Some('\n') {
                        self.pos += 2;
                        self.line += 1;
                    } else if next == Some('\r') && after == Some('\n') {
                        self.pos += 3;
                        self.line += 1;
                    } else {
                        return Err(SyntaxError::new(
                            self.line,
                            "unexpected character after line continuation character",
                        ));
                    }
                }
                '"' | '\'' => self.string()?,
                '.' if self.peek_at(1).is_some_and(|n| n.is_ascii_digit()) => self.number()?,
                c if c.is_ascii_digit() => self.number()?,
                c if is_ident_start(c) => self.name()?,
                _ => self.operator()?,
            }
        }

        if let Some((open, line)) = self.brackets.last() {
            return Err(SyntaxError::new(*line, format!("'{open}' was never closed")));
        }
        self.push_newline();
        while self.indents.len() > 1 {
            self.indents.pop();
            self.push(TokenKind::Dedent);
        }
        self.push(TokenKind::Eof);
        Ok(())
    }

    /// Measure leading whitespace and emit indent/dedent tokens.
    fn indentation(&mut self) -> SyntaxResult<()> {
        let mut column = 0usize;
        while let Some(c) = self.peek_at(0) {
            match c {
                ' ' => column += 1,
                '\t' => column = (column / 8 + 1) * 8,
                '\x0c' => column = 0,
                _ => break,
            }
            self.pos += 1;
        }

        // Blank and comment-only lines do not affect indentation.
        match self.peek_at(0) {
            None | Some('\n') | Some('#') => return Ok(()),
            Some('\r') if self.peek_at(1) == Some('\n') => return Ok(()),
            _ => {}
        }

        let current = self.indents.last().copied().unwrap_or(0);
        if column > current {
            self.indents.push(column);
            self.push(TokenKind::Indent);
        } else if column < current {
            while self.indents.last().is_some_and(|&top| top > column) {
                self.indents.pop();
                self.push(TokenKind::Dedent);
            }
            if self.indents.last().copied().unwrap_or(0) != column {
                return Err(SyntaxError::new(
                    self.line,
                    "unindent does not match any outer indentation level",
                ));
            }
        }
        Ok(())
    }

    fn string(&mut self) -> SyntaxResult<()> {
        let quote = self.chars[self.pos];
        let start_line = self.line;
        let triple = self.peek_at(1) == Some(quote) && self.peek_at(2) == Some(quote);
        self.pos += if triple { 3 } else { 1 };

        let mut value = String::new();
        loop {
            let Some(c) = self.peek_at(0) else {
                let message = if triple {
                    "unterminated triple-quoted string literal"
                } else {
                    "unterminated string literal"
                };
                return Err(SyntaxError::new(start_line, message));
            };
            match c {
                '\\' => {
                    value.push(c);
                    if let Some(escaped) = self.peek_at(1) {
                        if escaped == '\n' {
                            self.line += 1;
                        }
                        value.push(escaped);
                        self.pos += 2;
                    } else {
                        self.pos += 1;
                    }
                }
                '\n' if !triple => {
                    return Err(SyntaxError::new(start_line, "unterminated string literal"));
                }
                '\n' => {
                    self.line += 1;
                    value.push(c);
                    self.pos += 1;
                }
                c if c == quote => {
                    if !triple {
                        self.pos += 1;
                        break;
                    }
                    if self.peek_at(1) == Some(quote) && self.peek_at(2) == Some(quote) {
                        self.pos += 3;
                        break;
                    }
                    value.push(c);
                    self.pos += 1;
                }
                _ => {
                    value.push(c);
                    self.pos += 1;
                }
            }
        }

        self.tokens.push(Token {
            kind: TokenKind::Str(value),
            line: start_line,
        });
        Ok(())
    }

    fn number(&mut self) -> SyntaxResult<()> {
        let start = self.pos;

        let radix = match (self.peek_at(0), self.peek_at(1)) {
            (Some('0'), Some('x' | 'X')) => Some(16),
            (Some('0'), Some('o' | 'O')) => Some(8),
            (Some('0'), Some('b' | 'B')) => Some(2),
            _ => None,
        };

        if let Some(radix) = radix {
            self.pos += 2;
            let digits_start = self.pos;
            while self
                .peek_at(0)
                .is_some_and(|c| c == '_' || c.is_digit(radix))
            {
                self.pos += 1;
            }
            if self.pos == digits_start || self.peek_at(0).is_some_and(is_ident_continue) {
                return Err(SyntaxError::new(self.line, "invalid number literal"));
            }
            let text: String = self.chars[start..self.pos].iter().collect();
            self.push(TokenKind::Int(text));
            return Ok(());
        }

        let mut is_float = false;
        self.digits();
        if self.peek_at(0) == Some('.') {
            is_float = true;
            self.pos += 1;
            self.digits();
        }
        if matches!(self.peek_at(0), Some('e' | 'E')) {
            let sign = usize::from(matches!(self.peek_at(1), Some('+' | '-')));
            if self.peek_at(1 + sign).is_some_and(|c| c.is_ascii_digit()) {
                is_float = true;
                self.pos += 1 + sign;
                self.digits();
            }
        }
        if matches!(self.peek_at(0), Some('j' | 'J')) {
            is_float = true;
            self.pos += 1;
        }
        if self.peek_at(0).is_some_and(is_ident_continue) {
            return Err(SyntaxError::new(self.line, "invalid decimal literal"));
        }

        let text: String = self.chars[start..self.pos].iter().collect();
        if text.ends_with('_') || text.contains("__") || text.contains("_.") {
            return Err(SyntaxError::new(self.line, "invalid decimal literal"));
        }
        if !is_float && text.starts_with('0') && text.chars().any(|c| c.is_ascii_digit() && c != '0')
        {
            return Err(SyntaxError::new(
                self.line,
                "leading zeros in decimal integer literals are not permitted",
            ));
        }

        if is_float {
            self.push(TokenKind::Float(text));
        } else {
            self.push(TokenKind::Int(text));
        }
        Ok(())
    }

    fn digits(&mut self) {
        while self
            .peek_at(0)
            .is_some_and(|c| c.is_ascii_digit() || c == '_')
        {
            self.pos += 1;
        }
    }

    fn name(&mut self) -> SyntaxResult<()> {
        let start = self.pos;
        while self.peek_at(0).is_some_and(is_ident_continue) {
            self.pos += 1;
        }
        let text: String = self.chars[start..self.pos].iter().collect();

        if matches!(self.peek_at(0), Some('"' | '\''))
            && STRING_PREFIXES.contains(&text.to_ascii_lowercase().as_str())
        {
            return self.string();
        }

        self.push(TokenKind::Name(text));
        Ok(())
    }

    fn operator(&mut self) -> SyntaxResult<()> {
        let c = self.chars[self.pos];
        let next = self.peek_at(1);
        let third = self.peek_at(2);

        let three = match (c, next, third) {
            ('*', Some('*'), Some('=')) => Some(TokenKind::AugAssign(BinaryOp::Pow)),
            ('/', Some('/'), Some('=')) => Some(TokenKind::AugAssign(BinaryOp::FloorDiv)),
            ('<', Some('<'), Some('=')) => Some(TokenKind::AugAssign(BinaryOp::LShift)),
            ('>', Some('>'), Some('=')) => Some(TokenKind::AugAssign(BinaryOp::RShift)),
            _ => None,
        };
        if let Some(kind) = three {
            self.push(kind);
            self.pos += 3;
            return Ok(());
        }

        let two = match (c, next) {
            ('*', Some('*')) => Some(TokenKind::DoubleStar),
            ('/', Some('/')) => Some(TokenKind::DoubleSlash),
            ('=', Some('=')) => Some(TokenKind::EqEq),
            ('!', Some('=')) => Some(TokenKind::NotEq),
            ('<', Some('=')) => Some(TokenKind::LtE),
            ('>', Some('=')) => Some(TokenKind::GtE),
            ('<', Some('<')) => Some(TokenKind::LShift),
            ('>', Some('>')) => Some(TokenKind::RShift),
            ('+', Some('=')) => Some(TokenKind::AugAssign(BinaryOp::Add)),
            ('-', Some('=')) => Some(TokenKind::AugAssign(BinaryOp::Sub)),
            ('*', Some('=')) => Some(TokenKind::AugAssign(BinaryOp::Mul)),
            ('/', Some('=')) => Some(TokenKind::AugAssign(BinaryOp::Div)),
            ('%', Some('=')) => Some(TokenKind::AugAssign(BinaryOp::Mod)),
            ('&', Some('=')) => Some(TokenKind::AugAssign(BinaryOp::BitAnd)),
            ('|', Some('=')) => Some(TokenKind::AugAssign(BinaryOp::BitOr)),
            ('^', Some('=')) => Some(TokenKind::AugAssign(BinaryOp::BitXor)),
            ('-', Some('>')) | (':', Some('=')) => {
                return Err(SyntaxError::new(
                    self.line,
                    format!("unsupported operator '{c}{}'", next.unwrap_or(' ')),
                ));
            }
            _ => None,
        };
        if let Some(kind) = two {
            self.push(kind);
            self.pos += 2;
            return Ok(());
        }

        let kind = match c {
            '(' | '[' | '{' => {
                self.brackets.push((c, self.line));
                match c {
                    '(' => TokenKind::LParen,
                    '[' => TokenKind::LBracket,
                    _ => TokenKind::LBrace,
                }
            }
            ')' | ']' | '}' => {
                let expected = match c {
                    ')' => '(',
                    ']' => '[',
                    _ => '{',
                };
                match self.brackets.pop() {
                    None => {
                        return Err(SyntaxError::new(self.line, format!("unmatched '{c}'")));
                    }
                    Some((open, _)) if open != expected => {
                        return Err(SyntaxError::new(
                            self.line,
                            format!(
                                "closing parenthesis '{c}' does not match opening parenthesis '{open}'"
                            ),
                        ));
                    }
                    Some(_) => {}
                }
                match c {
                    ')' => TokenKind::RParen,
                    ']' => TokenKind::RBracket,
                    _ => TokenKind::RBrace,
                }
            }
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            ';' => TokenKind::Semi,
            '.' => TokenKind::Dot,
            '=' => TokenKind::Assign,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '|' => TokenKind::Pipe,
            '^' => TokenKind::Caret,
            '&' => TokenKind::Amp,
            '~' => TokenKind::Tilde,
            '<' => TokenKind::Lt,
            '>' => TokenKind::Gt,
            '!' => return Err(SyntaxError::new(self.line, "invalid syntax")),
            other => {
                return Err(SyntaxError::new(
                    self.line,
                    format!("invalid character '{other}'"),
                ));
            }
        };
        self.push(kind);
        self.pos += 1;
        Ok(())
    }
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}
