use crate::ast::{BinOp, Expr, Stmt, Type};
use crate::conventions::Conventions;
use super::count_of;

/// Where a computed value goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dest {
    /// `var name = ...;`
    Declare(String),
    /// `target = ...;`, e.g. a slot of the per-branch array
    Assign(Expr),
}

/// `t1.Count > 0 && t2.Count > 0 && ...`, folded to the left. No tokens → `true`.
pub fn all_counts_nonzero(conv: &Conventions, tokens: &[Expr]) -> Expr {
    tokens
        .iter()
        .map(|t| Expr::binary(BinOp::Gt, count_of(conv, t), Expr::Int(0)))
        .reduce(|acc, check| Expr::binary(BinOp::And, acc, check))
        .unwrap_or(Expr::Bool(true))
}

/// `dest = validator(args) ? action(args) : fallback;`
///
/// The fallback is a tuple of empty arrays when grafting (one per output type)
/// and the target's default value otherwise.
pub fn compute_expression(
    dest: Dest,
    args: &[Expr],
    validator: &Expr,
    action: &Expr,
    output_params: &[Type],
    graft: bool,
) -> Stmt {
    let fallback = if graft {
        Expr::tuple_or_single(
            output_params
                .iter()
                .map(|t| Expr::new_array(t.clone(), Expr::Int(0)))
                .collect(),
        )
    } else {
        Expr::Default
    };
    let value = Expr::ternary(
        invoke(validator, args),
        invoke(action, args),
        fallback,
    );
    match dest {
        Dest::Declare(name) => Stmt::declare(name, value),
        Dest::Assign(target) => Stmt::Assign { target, value },
    }
}

fn invoke(callee: &Expr, args: &[Expr]) -> Expr {
    Expr::call(callee.to_string(), args.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refs(names: &[&str]) -> Vec<Expr> {
        names.iter().map(|n| Expr::reference(*n)).collect()
    }

    #[test]
    fn empty_guard_is_true() {
        assert_eq!(all_counts_nonzero(&Conventions::default(), &[]), Expr::Bool(true));
    }

    #[test]
    fn single_guard_is_one_check() {
        let e = all_counts_nonzero(&Conventions::default(), &refs(&["b"]));
        assert_eq!(
            e,
            Expr::binary(BinOp::Gt, Expr::member(Expr::reference("b"), "Count"), Expr::Int(0))
        );
    }

    #[test]
    fn guard_folds_left() {
        let conv = Conventions::default();
        let e = all_counts_nonzero(&conv, &refs(&["a", "b", "c"]));
        match &e {
            Expr::Binary { op: BinOp::And, lhs, rhs } => {
                assert!(matches!(**lhs, Expr::Binary { op: BinOp::And, .. }));
                assert_eq!(**rhs, all_counts_nonzero(&conv, &refs(&["c"])));
            }
            other => panic!("expected conjunction, got {other:?}"),
        }
        assert_eq!(e.to_string(), "a.Count > 0 && b.Count > 0 && c.Count > 0");
    }

    #[test]
    fn graft_fallback_is_empty_arrays() {
        let s = compute_expression(
            Dest::Declare("value".into()),
            &refs(&["zip_nx", "branchredux_o"]),
            &Expr::reference("validator"),
            &Expr::reference("action"),
            &[Type::param("A"), Type::param("B")],
            true,
        );
        let Stmt::Declare { name, value } = s else { panic!("expected declaration") };
        assert_eq!(name, "value");
        assert_eq!(
            value.to_string(),
            "validator(zip_nx, branchredux_o) ? action(zip_nx, branchredux_o) : (new A[0], new B[0])"
        );
    }

    #[test]
    fn flatten_fallback_is_default_and_assigns() {
        let target = Expr::index(Expr::reference("values"), Expr::reference("j"));
        let s = compute_expression(
            Dest::Assign(target.clone()),
            &refs(&["zip_nx"]),
            &Expr::reference("validator"),
            &Expr::reference("action"),
            &[Type::param("A")],
            false,
        );
        let Stmt::Assign { target: t, value } = s else { panic!("expected assignment") };
        assert_eq!(t, target);
        assert_eq!(value.to_string(), "validator(zip_nx) ? action(zip_nx) : default");
    }

    #[test]
    fn single_output_graft_fallback_is_bare_array() {
        let s = compute_expression(
            Dest::Declare("value".into()),
            &[],
            &Expr::reference("validator"),
            &Expr::reference("action"),
            &[Type::param("A")],
            true,
        );
        let Stmt::Declare { value, .. } = s else { panic!("expected declaration") };
        assert_eq!(value.to_string(), "validator() ? action() : new A[0]");
    }
}
