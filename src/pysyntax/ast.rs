//! Syntax tree for the Python subset the checker understands.
//!
//! The tree is deliberately shallow: it exists so the lint pass can see
//! which names are bound and read, which loops are unbounded, and which
//! divisions have a literal divisor. Nothing is evaluated.

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Assign {
        targets: Vec<Expr>,
        value: Expr,
    },
    AugAssign {
        target: Expr,
        op: BinaryOp,
        value: Expr,
    },
    Expr(Expr),
    If {
        test: Expr,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
    },
    While {
        test: Expr,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
    },
    For {
        target: Expr,
        iter: Expr,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
    },
    Pass,
    Break,
    Continue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Name(String),
    /// Integer literal, kept as written (underscores and radix prefixes included).
    Int(String),
    Float(String),
    Str(String),
    Bool(bool),
    NoneLit,
    List(Vec<Expr>),
    Tuple(Vec<Expr>),
    Set(Vec<Expr>),
    Dict(Vec<(Expr, Expr)>),
    BinOp {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    UnaryOp {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    BoolOp {
        op: BoolOp,
        values: Vec<Expr>,
    },
    Compare {
        left: Box<Expr>,
        comparisons: Vec<(CmpOp, Expr)>,
    },
    IfExp {
        test: Box<Expr>,
        body: Box<Expr>,
        orelse: Box<Expr>,
    },
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
        keywords: Vec<(String, Expr)>,
    },
    Attribute {
        value: Box<Expr>,
        attr: String,
    },
    Subscript {
        value: Box<Expr>,
        index: Box<Expr>,
    },
    Slice {
        lower: Option<Box<Expr>>,
        upper: Option<Box<Expr>>,
        step: Option<Box<Expr>>,
    },
    Starred(Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
    BitOr,
    BitXor,
    BitAnd,
    LShift,
    RShift,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::FloorDiv => "//",
            Self::Mod => "%",
            Self::Pow => "**",
            Self::BitOr => "|",
            Self::BitXor => "^",
            Self::BitAnd => "&",
            Self::LShift => "<<",
            Self::RShift => ">>",
        }
    }

    /// Whether the right operand is a divisor.
    pub fn is_division(self) -> bool {
        matches!(self, Self::Div | Self::FloorDiv | Self::Mod)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
    Pos,
    Invert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
    In,
    NotIn,
    Is,
    IsNot,
}

impl Expr {
    /// Whether the expression may appear on the left of `=`.
    pub fn is_assignable(&self) -> bool {
        match self {
            Self::Name(_) | Self::Attribute { .. } | Self::Subscript { .. } => true,
            Self::Starred(inner) => inner.is_assignable(),
            Self::Tuple(items) | Self::List(items) => {
                !items.is_empty() && items.iter().all(Expr::is_assignable)
            }
            _ => false,
        }
    }

    /// Whether this is a numeric literal whose value is zero.
    pub fn is_zero_literal(&self) -> bool {
        match self {
            Self::Int(text) | Self::Float(text) => {
                let digits: String = text.chars().filter(|c| *c != '_').collect();
                digits.parse::<f64>().is_ok_and(|v| v == 0.0)
            }
            _ => false,
        }
    }

    /// Human description used in "cannot assign to …" errors.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Int(_) | Self::Float(_) | Self::Str(_) | Self::Bool(_) | Self::NoneLit => {
                "literal"
            }
            Self::Call { .. } => "function call",
            Self::BinOp { .. } | Self::UnaryOp { .. } => "expression",
            Self::BoolOp { .. } => "expression",
            Self::Compare { .. } => "comparison",
            Self::IfExp { .. } => "conditional expression",
            Self::Dict(_) => "dict literal",
            Self::Set(_) => "set display",
            _ => "expression",
        }
    }
}
