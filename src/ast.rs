// Structured program representation for generated functions. No source text here;
// `emit` owns rendering. `Expr: Display` is the one exception: generated names are
// derived from an expression's display form, so it has to be stable and local.

use std::fmt;
use serde::Serialize;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Type {
    Param(String),                           // generic parameter, e.g. `N`
    Named { name: String, args: Vec<Type> }, // runtime generic, e.g. `Tree<N>`
    Array(Box<Type>),
    Tuple(Vec<Type>),
    Callable {
        params: Vec<Type>,
        ret: Option<Box<Type>>,              // None → predicate
    },
    Int,
    Bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinOp {
    Add,
    Sub,
    Gt,
    And,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Expr {
    Ref(String),
    Int(i64),
    Bool(bool),
    Default,                                 // target-language default value
    Binary { op: BinOp, lhs: Box<Expr>, rhs: Box<Expr> },
    Call { func: String, args: Vec<Expr> },
    Method { recv: Box<Expr>, name: String, args: Vec<Expr> },
    Member { recv: Box<Expr>, name: String },
    Index { recv: Box<Expr>, index: Box<Expr> },
    Ternary { cond: Box<Expr>, then: Box<Expr>, otherwise: Box<Expr> },
    Tuple(Vec<Expr>),
    TupleItem { tuple: Box<Expr>, index: usize }, // zero-based
    NewArray { elem: Type, len: Box<Expr> },
    New(Type),
    Lambda { param: String, body: Box<Expr> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Loop {
    pub var: String,
    pub start: Expr,
    pub stop: Expr,                          // exclusive
    pub stride: i64,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Stmt {
    Declare { name: String, value: Expr },
    Assign { target: Expr, value: Expr },
    Expr(Expr),
    For(Loop),
    ParallelFor(Loop),
    If { guard: Expr, then: Vec<Stmt>, otherwise: Option<Vec<Stmt>> },
    Return(Expr),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Param {
    pub ty: Type,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Constraint {
    pub param: String,
    pub bound: String,
}

/// One generated function: built once per arity, never edited afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionDecl {
    pub name: String,
    pub modifiers: Vec<String>,
    pub ret: Type,
    pub params: Vec<Param>,
    pub generics: Vec<String>,
    pub constraints: Vec<Constraint>,
    pub body: Vec<Stmt>,
}

// ————————————————————————————————————————————————————————————————————————————
// CONSTRUCTORS
// ————————————————————————————————————————————————————————————————————————————

impl Type {
    pub fn param(name: impl Into<String>) -> Self {
        Type::Param(name.into())
    }
    pub fn named(name: impl Into<String>, args: Vec<Type>) -> Self {
        Type::Named { name: name.into(), args }
    }
    pub fn array(elem: Type) -> Self {
        Type::Array(Box::new(elem))
    }
    /// Single elements stay bare; only two or more become a tuple.
    pub fn tuple_or_single(mut elems: Vec<Type>) -> Self {
        if elems.len() == 1 { elems.remove(0) } else { Type::Tuple(elems) }
    }
}

impl Expr {
    pub fn reference(name: impl Into<String>) -> Self {
        Expr::Ref(name.into())
    }
    pub fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) }
    }
    pub fn call(func: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Call { func: func.into(), args }
    }
    pub fn method(recv: Expr, name: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Method { recv: Box::new(recv), name: name.into(), args }
    }
    pub fn member(recv: Expr, name: impl Into<String>) -> Self {
        Expr::Member { recv: Box::new(recv), name: name.into() }
    }
    pub fn index(recv: Expr, index: Expr) -> Self {
        Expr::Index { recv: Box::new(recv), index: Box::new(index) }
    }
    pub fn ternary(cond: Expr, then: Expr, otherwise: Expr) -> Self {
        Expr::Ternary { cond: Box::new(cond), then: Box::new(then), otherwise: Box::new(otherwise) }
    }
    pub fn new_array(elem: Type, len: Expr) -> Self {
        Expr::NewArray { elem, len: Box::new(len) }
    }
    pub fn lambda(param: impl Into<String>, body: Expr) -> Self {
        Expr::Lambda { param: param.into(), body: Box::new(body) }
    }
    /// Mirror of `Type::tuple_or_single`.
    pub fn tuple_or_single(mut elems: Vec<Expr>) -> Self {
        if elems.len() == 1 { elems.remove(0) } else { Expr::Tuple(elems) }
    }
    /// Component `index` of a value with `arity` components.
    /// A single-component value is its own component 0.
    pub fn component(value: Expr, index: usize, arity: usize) -> Self {
        if arity == 1 { value } else { Expr::TupleItem { tuple: Box::new(value), index } }
    }

    /// Name of a plain variable reference, `None` for anything else.
    pub fn as_ref_name(&self) -> Option<&str> {
        match self {
            Expr::Ref(name) => Some(name),
            _ => None,
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::Ternary { .. } | Expr::Lambda { .. } => 0,
            Expr::Binary { op, .. } => op.precedence(),
            _ => 9,
        }
    }
}

impl BinOp {
    fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Gt => ">",
            BinOp::And => "&&",
        }
    }
    fn precedence(self) -> u8 {
        match self {
            BinOp::And => 1,
            BinOp::Gt => 2,
            BinOp::Add | BinOp::Sub => 3,
        }
    }
}

impl Stmt {
    pub fn declare(name: impl Into<String>, value: Expr) -> Self {
        Stmt::Declare { name: name.into(), value }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// DISPLAY
// ————————————————————————————————————————————————————————————————————————————

fn comma_separated<T: fmt::Display>(f: &mut fmt::Formatter<'_>, xs: &[T]) -> fmt::Result {
    for (i, x) in xs.iter().enumerate() {
        if i > 0 { f.write_str(", ")?; }
        write!(f, "{x}")?;
    }
    Ok(())
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Param(name) => f.write_str(name),
            Type::Named { name, args } => {
                f.write_str(name)?;
                if !args.is_empty() {
                    f.write_str("<")?;
                    comma_separated(f, args)?;
                    f.write_str(">")?;
                }
                Ok(())
            }
            Type::Array(elem) => write!(f, "{elem}[]"),
            Type::Tuple(elems) => {
                f.write_str("(")?;
                comma_separated(f, elems)?;
                f.write_str(")")
            }
            Type::Callable { params, ret } => {
                f.write_str("Func<")?;
                comma_separated(f, params)?;
                if !params.is_empty() { f.write_str(", ")?; }
                match ret {
                    Some(ret) => write!(f, "{ret}>"),
                    None => f.write_str("bool>"),
                }
            }
            Type::Int => f.write_str("int"),
            Type::Bool => f.write_str("bool"),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Ref(name) => f.write_str(name),
            Expr::Int(v) => write!(f, "{v}"),
            Expr::Bool(v) => write!(f, "{v}"),
            Expr::Default => f.write_str("default"),
            Expr::Binary { op, lhs, rhs } => {
                let prec = op.precedence();
                // left-associative: only the right operand needs parens at equal precedence
                if lhs.precedence() < prec { write!(f, "({lhs})")?; } else { write!(f, "{lhs}")?; }
                write!(f, " {} ", op.symbol())?;
                if rhs.precedence() <= prec { write!(f, "({rhs})") } else { write!(f, "{rhs}") }
            }
            Expr::Call { func, args } => {
                write!(f, "{func}(")?;
                comma_separated(f, args)?;
                f.write_str(")")
            }
            Expr::Method { recv, name, args } => {
                write!(f, "{recv}.{name}(")?;
                comma_separated(f, args)?;
                f.write_str(")")
            }
            Expr::Member { recv, name } => write!(f, "{recv}.{name}"),
            Expr::Index { recv, index } => write!(f, "{recv}[{index}]"),
            Expr::Ternary { cond, then, otherwise } => write!(f, "{cond} ? {then} : {otherwise}"),
            Expr::Tuple(elems) => {
                f.write_str("(")?;
                comma_separated(f, elems)?;
                f.write_str(")")
            }
            Expr::TupleItem { tuple, index } => write!(f, "{tuple}.Item{}", index + 1),
            Expr::NewArray { elem, len } => write!(f, "new {elem}[{len}]"),
            Expr::New(ty) => write!(f, "new {ty}()"),
            Expr::Lambda { param, body } => write!(f, "{param} => {body}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conjunction_renders_left_associated_without_parens() {
        let count = |n: &str| Expr::binary(
            BinOp::Gt,
            Expr::member(Expr::reference(n), "Count"),
            Expr::Int(0),
        );
        let e = Expr::binary(
            BinOp::And,
            Expr::binary(BinOp::And, count("a"), count("b")),
            count("c"),
        );
        assert_eq!(e.to_string(), "a.Count > 0 && b.Count > 0 && c.Count > 0");
    }

    #[test]
    fn right_nested_same_precedence_gets_parens() {
        let e = Expr::binary(
            BinOp::Sub,
            Expr::reference("n"),
            Expr::binary(BinOp::Sub, Expr::reference("a"), Expr::Int(1)),
        );
        assert_eq!(e.to_string(), "n - (a - 1)");
    }

    #[test]
    fn single_component_is_the_value_itself() {
        let v = Expr::reference("value");
        assert_eq!(Expr::component(v.clone(), 0, 1), v);
        assert_eq!(Expr::component(v, 1, 2).to_string(), "value.Item2");
    }

    #[test]
    fn callable_types_render_predicate_as_bool() {
        let t = Type::Callable {
            params: vec![Type::param("N"), Type::named("List", vec![Type::param("P")])],
            ret: None,
        };
        assert_eq!(t.to_string(), "Func<N, List<P>, bool>");
        let t = Type::Callable { params: vec![], ret: Some(Box::new(Type::param("A"))) };
        assert_eq!(t.to_string(), "Func<A>");
    }
}
