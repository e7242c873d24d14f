//! ExtendScript payloads as a small typed tree.
//!
//! Templates never interpolate text into script source. Caller-supplied values
//! enter as literal expressions and are escaped by the single emitter in
//! [`emit`]; identifiers are `&'static str` so only crate code can name them.

use std::fmt;

pub mod emit;

/// Text returned by every template that needs an active document when none is open.
pub const NO_DOCUMENT: &str = "No document open";

/// Measurement unit appended to length literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Pt,
    Mm,
    Cm,
    In,
    Pica,
    Px,
}

impl Unit {
    pub fn suffix(self) -> &'static str {
        match self {
            Unit::Pt => "pt",
            Unit::Mm => "mm",
            Unit::Cm => "cm",
            Unit::In => "in",
            Unit::Pica => "p",
            Unit::Px => "px",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    And,
    Or,
}

impl BinOp {
    pub(crate) fn token(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Eq => "===",
            BinOp::Ne => "!==",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::And => "&&",
            BinOp::Or => "||",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Str(String),
    Int(i64),
    Num(f64),
    Bool(bool),
    /// A length baked into an InDesign measurement string, e.g. `"72pt"`.
    Measure(f64, Unit),
    Var(&'static str),
    Member(Box<Expr>, &'static str),
    Index(Box<Expr>, Box<Expr>),
    Call(Box<Expr>, Vec<Expr>),
    New(&'static str, Vec<Expr>),
    Array(Vec<Expr>),
    Object(Vec<(&'static str, Expr)>),
    Binary(Box<Expr>, BinOp, Box<Expr>),
    Not(Box<Expr>),
}

pub fn var(name: &'static str) -> Expr {
    Expr::Var(name)
}

pub fn str(text: impl Into<String>) -> Expr {
    Expr::Str(text.into())
}

pub fn int(value: i64) -> Expr {
    Expr::Int(value)
}

/// `app`
pub fn app() -> Expr {
    var("app")
}

/// `Enum.VALUE`, e.g. `SaveOptions.NO`.
pub fn constant(scope: &'static str, value: &'static str) -> Expr {
    var(scope).dot(value)
}

/// Concatenate string pieces with `+`.
pub fn concat(parts: impl IntoIterator<Item = Expr>) -> Expr {
    let mut iter = parts.into_iter();
    let first = iter.next().unwrap_or_else(|| str(""));
    iter.fold(first, |acc, next| acc.bin(BinOp::Add, next))
}

impl Expr {
    pub fn dot(self, field: &'static str) -> Expr {
        Expr::Member(Box::new(self), field)
    }

    pub fn at(self, index: Expr) -> Expr {
        Expr::Index(Box::new(self), Box::new(index))
    }

    pub fn call(self, method: &'static str, args: Vec<Expr>) -> Expr {
        Expr::Call(Box::new(self.dot(method)), args)
    }

    pub fn bin(self, op: BinOp, rhs: Expr) -> Expr {
        Expr::Binary(Box::new(self), op, Box::new(rhs))
    }

    pub fn equals(self, rhs: Expr) -> Expr {
        self.bin(BinOp::Eq, rhs)
    }

    pub fn negate(self) -> Expr {
        Expr::Not(Box::new(self))
    }

    /// `collection.itemByName(name)`
    pub fn by_name(self, name: Expr) -> Expr {
        self.call("itemByName", vec![name])
    }

    /// `collection.length`
    pub fn len(self) -> Expr {
        self.dot("length")
    }

    /// `value.isValid`, used on `itemByName` lookups.
    pub fn is_valid(self) -> Expr {
        self.dot("isValid")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Let(&'static str, Expr),
    Assign(Expr, Expr),
    Expr(Expr),
    If {
        cond: Expr,
        then: Vec<Stmt>,
        otherwise: Vec<Stmt>,
    },
    /// `for (var <var> = <from>; <var> < <until>; <var>++) { ... }`
    For {
        var: &'static str,
        from: Expr,
        until: Expr,
        body: Vec<Stmt>,
    },
    /// Caller-authored script text, emitted verbatim. Only the pass-through tool builds this.
    Raw(String),
}

pub fn let_(name: &'static str, value: Expr) -> Stmt {
    Stmt::Let(name, value)
}

pub fn set(target: Expr, value: Expr) -> Stmt {
    Stmt::Assign(target, value)
}

pub fn exec(expr: Expr) -> Stmt {
    Stmt::Expr(expr)
}

/// Final expression statement; its value becomes the script's result.
pub fn result(expr: Expr) -> Stmt {
    Stmt::Expr(expr)
}

pub fn if_else(cond: Expr, then: Vec<Stmt>, otherwise: Vec<Stmt>) -> Stmt {
    Stmt::If {
        cond,
        then,
        otherwise,
    }
}

pub fn for_each(var: &'static str, until: Expr, body: Vec<Stmt>) -> Stmt {
    Stmt::For {
        var,
        from: int(0),
        until,
        body,
    }
}

/// Statement list that makes up one payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Script {
    stmts: Vec<Stmt>,
}

impl Script {
    pub fn statements(&self) -> &[Stmt] {
        &self.stmts
    }

    /// Wrap `body` so it only runs with an active document bound to `doc`;
    /// otherwise the script evaluates to [`NO_DOCUMENT`].
    pub fn with_document(body: Vec<Stmt>) -> Self {
        let mut guarded = vec![let_("doc", app().dot("activeDocument"))];
        guarded.extend(body);
        Self {
            stmts: vec![if_else(
                app().dot("documents").len().equals(int(0)),
                vec![result(str(NO_DOCUMENT))],
                guarded,
            )],
        }
    }

    pub fn from_statements(stmts: Vec<Stmt>) -> Self {
        Self { stmts }
    }

    pub fn render(&self) -> ScriptPayload {
        ScriptPayload(emit::emit(self))
    }
}

/// Rendered ExtendScript source for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptPayload(String);

impl ScriptPayload {
    /// Wrap already-rendered source text.
    pub fn from_source(source: impl Into<String>) -> Self {
        Self(source.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ScriptPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
