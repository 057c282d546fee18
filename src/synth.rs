//! Statement and expression synthesizers.
//!
//! Every function here is pure: the same tokens in give the same statements out.
//! Shared building blocks (counts, clamped indexing) live in this file; the
//! declaration family is in `decl`, the guard/compute expressions in `expr`.
pub mod decl;
pub mod expr;

use crate::ast::{BinOp, Expr, Type};
use crate::conventions::Conventions;

pub use decl::{
    append_range_selects, append_ranges, call_max_count, declare_branch_items,
    declare_result_structures, declare_zip_branches, ensure_paths, Declared, Measure, ResultSlot,
};
pub use expr::{all_counts_nonzero, compute_expression, Dest};

// ------------------------------- Helpers --------------------------------- //

pub(crate) fn count_of(conv: &Conventions, seq: &Expr) -> Expr {
    Expr::member(seq.clone(), conv.count_member.as_str())
}

pub(crate) fn branches_of(conv: &Conventions, tree: &Expr) -> Expr {
    Expr::member(tree.clone(), conv.branches_member.as_str())
}

/// `seq[min(idx, seq.count - 1)]`: past the end, keep reusing the last element.
pub(crate) fn clamped_index(conv: &Conventions, seq: Expr, idx: &str) -> Expr {
    let last = Expr::binary(BinOp::Sub, count_of(conv, &seq), Expr::Int(1));
    let at = Expr::call(conv.min_fn.as_str(), vec![Expr::reference(idx), last]);
    Expr::index(seq, at)
}

/// `Tree<T>` → `T`. Anything that is not a one-argument generic is returned as is.
pub(crate) fn element_of(ty: &Type) -> Type {
    match ty {
        Type::Named { args, .. } if args.len() == 1 => args[0].clone(),
        other => other.clone(),
    }
}
