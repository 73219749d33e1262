//! Recursive-descent parser over the token stream.
//!
//! Precedence follows the Python grammar from conditional expressions down
//! to atoms. Statements outside the subset (`def`, `import`, `return`, ...)
//! are rejected rather than skipped.

use super::ast::{BinaryOp, BoolOp, CmpOp, Expr, Stmt, UnaryOp};
use super::error::{SyntaxError, SyntaxResult};
use super::lexer::{Token, TokenKind, tokenize};

const KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if",
    "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try",
    "while", "with", "yield",
];

const UNSUPPORTED_STATEMENTS: &[&str] = &[
    "import", "from", "def", "class", "return", "del", "global", "nonlocal", "raise", "try",
    "with", "assert", "async", "await", "yield", "lambda", "except", "finally",
];

/// Deepest nesting of brackets, unary operators, and blocks the parser
/// accepts. CPython's own parser stops at a similar depth.
const MAX_NESTING: usize = 100;

/// Parse a whole fragment into statements.
pub fn parse_module(source: &str) -> SyntaxResult<Vec<Stmt>> {
    let tokens = tokenize(source)?;
    Parser {
        tokens,
        pos: 0,
        depth: 0,
    }
    .module()
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Current recursion depth through nesting constructs.
    depth: usize,
}

impl Parser {
    // ── Token cursor ────────────────────────────────────────────────────

    fn peek(&self) -> &TokenKind {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> &TokenKind {
        self.tokens
            .get(self.pos + offset)
            .or_else(|| self.tokens.last())
            .map(|t| &t.kind)
            .unwrap_or(&TokenKind::Eof)
    }

    fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or(1, |t| t.line)
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.peek() == kind
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), TokenKind::Name(n) if n == keyword)
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.at_keyword(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn error(&self, message: impl Into<String>) -> SyntaxError {
        SyntaxError::new(self.line(), message)
    }

    fn unexpected(&self, expected: &str) -> SyntaxError {
        self.error(format!(
            "invalid syntax: expected {expected}, found {}",
            self.peek().describe()
        ))
    }

    fn expect(&mut self, kind: &TokenKind, expected: &str) -> SyntaxResult<()> {
        if self.eat(kind) {
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    /// Run `f` one nesting level deeper, failing once [`MAX_NESTING`] is
    /// reached so deep input cannot exhaust the stack.
    fn nested<T>(
        &mut self,
        what: &str,
        f: impl FnOnce(&mut Self) -> SyntaxResult<T>,
    ) -> SyntaxResult<T> {
        if self.depth >= MAX_NESTING {
            return Err(self.error(format!("too many nested {what}")));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn starts_expression(&self) -> bool {
        match self.peek() {
            TokenKind::Name(n) => {
                !KEYWORDS.contains(&n.as_str()) || matches!(n.as_str(), "True" | "False" | "None" | "not")
            }
            TokenKind::Int(_)
            | TokenKind::Float(_)
            | TokenKind::Str(_)
            | TokenKind::LParen
            | TokenKind::LBracket
            | TokenKind::LBrace
            | TokenKind::Minus
            | TokenKind::Plus
            | TokenKind::Tilde
            | TokenKind::Star => true,
            _ => false,
        }
    }

    // ── Statements ──────────────────────────────────────────────────────

    fn module(&mut self) -> SyntaxResult<Vec<Stmt>> {
        let mut body = Vec::new();
        loop {
            match self.peek() {
                TokenKind::Eof => break,
                TokenKind::Newline => self.advance(),
                TokenKind::Indent => return Err(self.error("unexpected indent")),
                TokenKind::Dedent => return Err(self.error("unexpected dedent")),
                _ => body.extend(self.statement()?),
            }
        }
        Ok(body)
    }

    fn statement(&mut self) -> SyntaxResult<Vec<Stmt>> {
        if self.at_keyword("if") {
            return Ok(vec![self.if_statement()?]);
        }
        if self.at_keyword("while") {
            return Ok(vec![self.while_statement()?]);
        }
        if self.at_keyword("for") {
            return Ok(vec![self.for_statement()?]);
        }
        self.simple_statements()
    }

    fn if_statement(&mut self) -> SyntaxResult<Stmt> {
        // Consumes either `if` or `elif`.
        self.advance();
        let test = self.expression()?;
        let body = self.block()?;
        let orelse = if self.at_keyword("elif") {
            vec![self.nested("blocks", Self::if_statement)?]
        } else if self.eat_keyword("else") {
            self.block()?
        } else {
            Vec::new()
        };
        Ok(Stmt::If { test, body, orelse })
    }

    fn while_statement(&mut self) -> SyntaxResult<Stmt> {
        self.advance();
        let test = self.expression()?;
        let body = self.block()?;
        let orelse = if self.eat_keyword("else") {
            self.block()?
        } else {
            Vec::new()
        };
        Ok(Stmt::While { test, body, orelse })
    }

    fn for_statement(&mut self) -> SyntaxResult<Stmt> {
        self.advance();
        let target = self.target_list()?;
        if !target.is_assignable() {
            return Err(self.error(format!("cannot assign to {}", target.describe())));
        }
        if !self.eat_keyword("in") {
            return Err(self.unexpected("'in'"));
        }
        let iter = self.star_expressions()?;
        let body = self.block()?;
        let orelse = if self.eat_keyword("else") {
            self.block()?
        } else {
            Vec::new()
        };
        Ok(Stmt::For {
            target,
            iter,
            body,
            orelse,
        })
    }

    fn target_list(&mut self) -> SyntaxResult<Expr> {
        let first = self.bitwise_or()?;
        if !self.check(&TokenKind::Comma) {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.eat(&TokenKind::Comma) {
            if self.at_keyword("in") {
                break;
            }
            items.push(self.bitwise_or()?);
        }
        Ok(Expr::Tuple(items))
    }

    /// `:` followed by an indented suite or simple statements on the same line.
    fn block(&mut self) -> SyntaxResult<Vec<Stmt>> {
        self.expect(&TokenKind::Colon, "':'")?;
        if !self.eat(&TokenKind::Newline) {
            return self.simple_statements();
        }
        if !self.eat(&TokenKind::Indent) {
            return Err(self.error("expected an indented block"));
        }
        self.nested("blocks", Self::suite)
    }

    /// Statements of an indented block, through its `Dedent`.
    fn suite(&mut self) -> SyntaxResult<Vec<Stmt>> {
        let mut body = Vec::new();
        loop {
            match self.peek() {
                TokenKind::Dedent => {
                    self.advance();
                    break;
                }
                TokenKind::Eof => break,
                TokenKind::Newline => self.advance(),
                TokenKind::Indent => return Err(self.error("unexpected indent")),
                _ => body.extend(self.statement()?),
            }
        }
        Ok(body)
    }

    fn simple_statements(&mut self) -> SyntaxResult<Vec<Stmt>> {
        let mut statements = vec![self.small_statement()?];
        while self.eat(&TokenKind::Semi) {
            if matches!(self.peek(), TokenKind::Newline | TokenKind::Eof) {
                break;
            }
            statements.push(self.small_statement()?);
        }
        match self.peek() {
            TokenKind::Newline => {
                self.advance();
                Ok(statements)
            }
            TokenKind::Eof => Ok(statements),
            _ => Err(self.unexpected("end of line")),
        }
    }

    fn small_statement(&mut self) -> SyntaxResult<Stmt> {
        if let TokenKind::Name(name) = self.peek().clone() {
            match name.as_str() {
                "pass" => {
                    self.advance();
                    return Ok(Stmt::Pass);
                }
                "break" => {
                    self.advance();
                    return Ok(Stmt::Break);
                }
                "continue" => {
                    self.advance();
                    return Ok(Stmt::Continue);
                }
                kw if UNSUPPORTED_STATEMENTS.contains(&kw) => {
                    return Err(self.error(format!("unsupported statement '{kw}'")));
                }
                _ => {}
            }
        }

        let first = self.star_expressions()?;

        if let TokenKind::AugAssign(op) = self.peek().clone() {
            if !matches!(
                first,
                Expr::Name(_) | Expr::Attribute { .. } | Expr::Subscript { .. }
            ) {
                return Err(self.error(format!(
                    "'{}' is an illegal expression for augmented assignment",
                    first.describe()
                )));
            }
            self.advance();
            let value = self.star_expressions()?;
            return Ok(Stmt::AugAssign {
                target: first,
                op,
                value,
            });
        }

        if self.eat(&TokenKind::Assign) {
            let mut targets = vec![first];
            let mut value = self.star_expressions()?;
            while self.eat(&TokenKind::Assign) {
                targets.push(value);
                value = self.star_expressions()?;
            }
            if let Some(bad) = targets.iter().find(|t| !t.is_assignable()) {
                return Err(self.error(format!("cannot assign to {}", bad.describe())));
            }
            return Ok(Stmt::Assign { targets, value });
        }

        Ok(Stmt::Expr(first))
    }

    // ── Expressions ─────────────────────────────────────────────────────

    /// Comma-separated expressions; more than one becomes a bare tuple.
    fn star_expressions(&mut self) -> SyntaxResult<Expr> {
        let first = self.star_expression()?;
        if !self.check(&TokenKind::Comma) {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.eat(&TokenKind::Comma) {
            if !self.starts_expression() {
                break;
            }
            items.push(self.star_expression()?);
        }
        Ok(Expr::Tuple(items))
    }

    fn star_expression(&mut self) -> SyntaxResult<Expr> {
        if self.eat(&TokenKind::Star) {
            return Ok(Expr::Starred(Box::new(self.bitwise_or()?)));
        }
        self.expression()
    }

    fn expression(&mut self) -> SyntaxResult<Expr> {
        let body = self.disjunction()?;
        if !self.eat_keyword("if") {
            return Ok(body);
        }
        let test = self.disjunction()?;
        if !self.eat_keyword("else") {
            return Err(self.error("expected 'else' after 'if' expression"));
        }
        let orelse = self.nested("conditional expressions", Self::expression)?;
        Ok(Expr::IfExp {
            test: Box::new(test),
            body: Box::new(body),
            orelse: Box::new(orelse),
        })
    }

    fn disjunction(&mut self) -> SyntaxResult<Expr> {
        let first = self.conjunction()?;
        if !self.at_keyword("or") {
            return Ok(first);
        }
        let mut values = vec![first];
        while self.eat_keyword("or") {
            values.push(self.conjunction()?);
        }
        Ok(Expr::BoolOp {
            op: BoolOp::Or,
            values,
        })
    }

    fn conjunction(&mut self) -> SyntaxResult<Expr> {
        let first = self.inversion()?;
        if !self.at_keyword("and") {
            return Ok(first);
        }
        let mut values = vec![first];
        while self.eat_keyword("and") {
            values.push(self.inversion()?);
        }
        Ok(Expr::BoolOp {
            op: BoolOp::And,
            values,
        })
    }

    fn inversion(&mut self) -> SyntaxResult<Expr> {
        if self.eat_keyword("not") {
            let operand = self.nested("unary operators", Self::inversion)?;
            return Ok(Expr::UnaryOp {
                op: UnaryOp::Not,
                operand: Box::new(operand),
            });
        }
        self.comparison()
    }

    fn comparison_operator(&mut self) -> Option<CmpOp> {
        let (op, width) = match self.peek() {
            TokenKind::EqEq => (CmpOp::Eq, 1),
            TokenKind::NotEq => (CmpOp::NotEq, 1),
            TokenKind::Lt => (CmpOp::Lt, 1),
            TokenKind::LtE => (CmpOp::LtE, 1),
            TokenKind::Gt => (CmpOp::Gt, 1),
            TokenKind::GtE => (CmpOp::GtE, 1),
            TokenKind::Name(n) if n == "in" => (CmpOp::In, 1),
            TokenKind::Name(n) if n == "not" => {
                if matches!(self.peek_at(1), TokenKind::Name(m) if m == "in") {
                    (CmpOp::NotIn, 2)
                } else {
                    return None;
                }
            }
            TokenKind::Name(n) if n == "is" => {
                if matches!(self.peek_at(1), TokenKind::Name(m) if m == "not") {
                    (CmpOp::IsNot, 2)
                } else {
                    (CmpOp::Is, 1)
                }
            }
            _ => return None,
        };
        for _ in 0..width {
            self.advance();
        }
        Some(op)
    }

    fn comparison(&mut self) -> SyntaxResult<Expr> {
        let left = self.bitwise_or()?;
        let mut comparisons = Vec::new();
        while let Some(op) = self.comparison_operator() {
            comparisons.push((op, self.bitwise_or()?));
        }
        if comparisons.is_empty() {
            Ok(left)
        } else {
            Ok(Expr::Compare {
                left: Box::new(left),
                comparisons,
            })
        }
    }

    fn binary_level(
        &mut self,
        operators: &[(TokenKind, BinaryOp)],
        next: fn(&mut Self) -> SyntaxResult<Expr>,
    ) -> SyntaxResult<Expr> {
        let mut left = next(self)?;
        'outer: loop {
            for (kind, op) in operators {
                if self.eat(kind) {
                    let right = next(self)?;
                    left = Expr::BinOp {
                        left: Box::new(left),
                        op: *op,
                        right: Box::new(right),
                    };
                    continue 'outer;
                }
            }
            return Ok(left);
        }
    }

    fn bitwise_or(&mut self) -> SyntaxResult<Expr> {
        self.binary_level(&[(TokenKind::Pipe, BinaryOp::BitOr)], Self::bitwise_xor)
    }

    fn bitwise_xor(&mut self) -> SyntaxResult<Expr> {
        self.binary_level(&[(TokenKind::Caret, BinaryOp::BitXor)], Self::bitwise_and)
    }

    fn bitwise_and(&mut self) -> SyntaxResult<Expr> {
        self.binary_level(&[(TokenKind::Amp, BinaryOp::BitAnd)], Self::shift)
    }

    fn shift(&mut self) -> SyntaxResult<Expr> {
        self.binary_level(
            &[
                (TokenKind::LShift, BinaryOp::LShift),
                (TokenKind::RShift, BinaryOp::RShift),
            ],
            Self::sum,
        )
    }

    fn sum(&mut self) -> SyntaxResult<Expr> {
        self.binary_level(
            &[
                (TokenKind::Plus, BinaryOp::Add),
                (TokenKind::Minus, BinaryOp::Sub),
            ],
            Self::term,
        )
    }

    fn term(&mut self) -> SyntaxResult<Expr> {
        self.binary_level(
            &[
                (TokenKind::Star, BinaryOp::Mul),
                (TokenKind::Slash, BinaryOp::Div),
                (TokenKind::DoubleSlash, BinaryOp::FloorDiv),
                (TokenKind::Percent, BinaryOp::Mod),
            ],
            Self::factor,
        )
    }

    fn factor(&mut self) -> SyntaxResult<Expr> {
        let op = match self.peek() {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Plus => UnaryOp::Pos,
            TokenKind::Tilde => UnaryOp::Invert,
            _ => return self.power(),
        };
        self.advance();
        let operand = self.nested("unary operators", Self::factor)?;
        Ok(Expr::UnaryOp {
            op,
            operand: Box::new(operand),
        })
    }

    fn power(&mut self) -> SyntaxResult<Expr> {
        let base = self.primary()?;
        if !self.eat(&TokenKind::DoubleStar) {
            return Ok(base);
        }
        // Right-associative, binds tighter than unary minus on the left only.
        let exponent = self.nested("operators", Self::factor)?;
        Ok(Expr::BinOp {
            left: Box::new(base),
            op: BinaryOp::Pow,
            right: Box::new(exponent),
        })
    }

    fn primary(&mut self) -> SyntaxResult<Expr> {
        let mut expr = self.atom()?;
        loop {
            match self.peek() {
                TokenKind::LParen => {
                    self.advance();
                    expr = self.nested("parentheses", |p| p.call(expr))?;
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.nested("parentheses", Self::slices)?;
                    self.expect(&TokenKind::RBracket, "']'")?;
                    expr = Expr::Subscript {
                        value: Box::new(expr),
                        index: Box::new(index),
                    };
                }
                TokenKind::Dot => {
                    self.advance();
                    let TokenKind::Name(attr) = self.peek().clone() else {
                        return Err(self.unexpected("attribute name"));
                    };
                    if KEYWORDS.contains(&attr.as_str()) {
                        return Err(self.unexpected("attribute name"));
                    }
                    self.advance();
                    expr = Expr::Attribute {
                        value: Box::new(expr),
                        attr,
                    };
                }
                _ => return Ok(expr),
            }
        }
    }

    fn call(&mut self, func: Expr) -> SyntaxResult<Expr> {
        let mut args = Vec::new();
        let mut keywords = Vec::new();
        while !self.check(&TokenKind::RParen) {
            let keyword = match (self.peek(), self.peek_at(1)) {
                (TokenKind::Name(n), TokenKind::Assign) if !KEYWORDS.contains(&n.as_str()) => {
                    Some(n.clone())
                }
                _ => None,
            };
            if let Some(name) = keyword {
                self.advance();
                self.advance();
                keywords.push((name, self.expression()?));
            } else {
                if !keywords.is_empty() {
                    return Err(self.error("positional argument follows keyword argument"));
                }
                let arg = self.star_expression()?;
                if self.at_keyword("for") {
                    return Err(self.error("generator expressions are not supported"));
                }
                args.push(arg);
            }
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen, "')'")?;
        Ok(Expr::Call {
            func: Box::new(func),
            args,
            keywords,
        })
    }

    fn slices(&mut self) -> SyntaxResult<Expr> {
        let first = self.slice_item()?;
        if !self.check(&TokenKind::Comma) {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.eat(&TokenKind::Comma) {
            if self.check(&TokenKind::RBracket) {
                break;
            }
            items.push(self.slice_item()?);
        }
        Ok(Expr::Tuple(items))
    }

    fn slice_item(&mut self) -> SyntaxResult<Expr> {
        let lower = if self.check(&TokenKind::Colon) {
            None
        } else {
            Some(self.expression()?)
        };
        if !self.eat(&TokenKind::Colon) {
            return lower.ok_or_else(|| self.unexpected("subscript"));
        }
        let upper = if self.starts_expression() {
            Some(Box::new(self.expression()?))
        } else {
            None
        };
        let step = if self.eat(&TokenKind::Colon) && self.starts_expression() {
            Some(Box::new(self.expression()?))
        } else {
            None
        };
        Ok(Expr::Slice {
            lower: lower.map(Box::new),
            upper,
            step,
        })
    }

    fn atom(&mut self) -> SyntaxResult<Expr> {
        let expr = match self.peek().clone() {
            TokenKind::Name(name) => {
                let expr = match name.as_str() {
                    "True" => Expr::Bool(true),
                    "False" => Expr::Bool(false),
                    "None" => Expr::NoneLit,
                    kw if KEYWORDS.contains(&kw) => {
                        return Err(self.error(format!("invalid syntax: unexpected keyword '{kw}'")));
                    }
                    _ => Expr::Name(name),
                };
                self.advance();
                expr
            }
            TokenKind::Int(text) => {
                self.advance();
                Expr::Int(text)
            }
            TokenKind::Float(text) => {
                self.advance();
                Expr::Float(text)
            }
            TokenKind::Str(first) => {
                self.advance();
                let mut value = first;
                while let TokenKind::Str(next) = self.peek() {
                    value.push_str(next);
                    self.advance();
                }
                Expr::Str(value)
            }
            TokenKind::LParen => {
                self.advance();
                self.nested("parentheses", Self::parenthesized)?
            }
            TokenKind::LBracket => {
                self.advance();
                let items = self.nested("parentheses", |p| {
                    p.sequence(&TokenKind::RBracket, "']'")
                })?;
                Expr::List(items)
            }
            TokenKind::LBrace => {
                self.advance();
                self.nested("parentheses", Self::brace_display)?
            }
            _ => return Err(self.unexpected("an expression")),
        };
        Ok(expr)
    }

    fn parenthesized(&mut self) -> SyntaxResult<Expr> {
        if self.eat(&TokenKind::RParen) {
            return Ok(Expr::Tuple(Vec::new()));
        }
        let first = self.star_expression()?;
        if self.at_keyword("for") {
            return Err(self.error("generator expressions are not supported"));
        }
        if self.eat(&TokenKind::RParen) {
            return Ok(first);
        }
        if !self.eat(&TokenKind::Comma) {
            return Err(self.unexpected("')'"));
        }
        let mut items = vec![first];
        items.extend(self.sequence(&TokenKind::RParen, "')'")?);
        Ok(Expr::Tuple(items))
    }

    /// Comma-separated items up to and including `close`.
    fn sequence(&mut self, close: &TokenKind, expected: &str) -> SyntaxResult<Vec<Expr>> {
        let mut items = Vec::new();
        while !self.check(close) {
            items.push(self.star_expression()?);
            if self.at_keyword("for") {
                return Err(self.error("comprehensions are not supported"));
            }
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(close, expected)?;
        Ok(items)
    }

    fn brace_display(&mut self) -> SyntaxResult<Expr> {
        if self.eat(&TokenKind::RBrace) {
            return Ok(Expr::Dict(Vec::new()));
        }
        let first = self.expression()?;
        if !self.eat(&TokenKind::Colon) {
            let mut items = vec![first];
            if self.eat(&TokenKind::Comma) {
                items.extend(self.sequence(&TokenKind::RBrace, "'}'")?);
            } else {
                self.expect(&TokenKind::RBrace, "'}'")?;
            }
            return Ok(Expr::Set(items));
        }

        let mut pairs = vec![(first, self.expression()?)];
        while self.eat(&TokenKind::Comma) {
            if self.check(&TokenKind::RBrace) {
                break;
            }
            let key = self.expression()?;
            self.expect(&TokenKind::Colon, "':'")?;
            pairs.push((key, self.expression()?));
        }
        self.expect(&TokenKind::RBrace, "'}'")?;
        Ok(Expr::Dict(pairs))
    }
}
