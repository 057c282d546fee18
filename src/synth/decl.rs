use crate::ast::{Expr, Stmt, Type};
use crate::conventions::Conventions;
use crate::error::{GenError, Result};
use crate::layout::Token;
use super::{branches_of, clamped_index, count_of, element_of};

/// A declaration together with the token it introduces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declared {
    pub decl: Stmt,
    pub token: Token,
}

/// One output tree: its declaration, its token, and the element type it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultSlot {
    pub decl: Stmt,
    pub token: Token,
    pub elem: Type,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    /// number of branches in a tree
    Branches,
    /// number of items in one branch
    Items,
}

/// `var result<i> = new Tree<E>();` for each output element type, 1-based.
pub fn declare_result_structures(conv: &Conventions, elems: &[Type]) -> Vec<ResultSlot> {
    elems
        .iter()
        .enumerate()
        .map(|(i, elem)| {
            let name = format!("result{}", i + 1);
            let ty = Type::named(conv.tree_type.as_str(), vec![elem.clone()]);
            ResultSlot {
                decl: Stmt::declare(name.clone(), Expr::New(ty.clone())),
                token: Token::new(ty, name),
                elem: elem.clone(),
            }
        })
        .collect()
}

/// `var <name> = max(count(t) for t in tokens);`
///
/// An empty token list declares `1`: a missing dimension broadcasts as a
/// single iteration instead of emitting a zero-argument max.
pub fn call_max_count(conv: &Conventions, name: &str, tokens: &[Expr], measure: Measure) -> Stmt {
    if tokens.is_empty() {
        return Stmt::declare(name, Expr::Int(1));
    }
    let counts = tokens
        .iter()
        .map(|t| match measure {
            Measure::Branches => count_of(conv, &branches_of(conv, t)),
            Measure::Items => count_of(conv, t),
        })
        .collect();
    Stmt::declare(name, Expr::call(conv.max_fn.as_str(), counts))
}

/// `var branch<t> = t.Branches[min(i, t.Branches.Count - 1)];` per tree token.
pub fn declare_zip_branches(conv: &Conventions, tokens: &[Token], index: &str) -> Vec<Declared> {
    tokens
        .iter()
        .map(|t| {
            let name = format!("branch{}", t.expr);
            let value = clamped_index(conv, branches_of(conv, &t.expr), index);
            let ty = Type::named(conv.list_type.as_str(), vec![element_of(&t.ty)]);
            Declared {
                decl: Stmt::declare(name.clone(), value),
                token: Token::new(ty, name),
            }
        })
        .collect()
}

/// `var <zip>x = branch[min(j, branch.Count - 1)];` for each zip token and its branch.
///
/// Zip tokens must be plain references; their name is the stem of the item variable.
pub fn declare_branch_items(
    conv: &Conventions,
    zip_tokens: &[Token],
    branch_tokens: &[Token],
    index: &str,
) -> Result<Vec<Declared>> {
    zip_tokens
        .iter()
        .zip(branch_tokens)
        .map(|(zip, branch)| {
            let stem = zip.expr.as_ref_name().ok_or_else(|| GenError::NotAReference {
                token: zip.expr.to_string(),
            })?;
            let name = format!("{stem}x");
            Ok(Declared {
                decl: Stmt::declare(name.clone(), clamped_index(conv, branch.expr.clone(), index)),
                token: Token::new(element_of(&branch.ty), name),
            })
        })
        .collect()
}

/// `result<i>.EnsurePath(path);` for every result.
pub fn ensure_paths(conv: &Conventions, path: &Expr, results: &[Token]) -> Vec<Stmt> {
    results
        .iter()
        .map(|r| Stmt::Expr(Expr::method(r.expr.clone(), conv.ensure_path.as_str(), vec![path.clone()])))
        .collect()
}

/// `result<i>.AppendRange(src.Item<i>, path);`: one per-item tuple, split by component.
pub fn append_ranges(conv: &Conventions, src: &Expr, path: &Expr, results: &[Token]) -> Vec<Stmt> {
    let n = results.len();
    results
        .iter()
        .enumerate()
        .map(|(i, r)| append_range(conv, r, Expr::component(src.clone(), i, n), path))
        .collect()
}

/// `result<i>.AppendRange(src.Select(v => v.Item<i>), path);`: a whole array of
/// per-item tuples, projected per component. A single result appends `src` as is.
pub fn append_range_selects(conv: &Conventions, src: &Expr, path: &Expr, results: &[Token]) -> Vec<Stmt> {
    let n = results.len();
    results
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let items = if n == 1 {
                src.clone()
            } else {
                let project = Expr::lambda("v", Expr::component(Expr::reference("v"), i, n));
                Expr::method(src.clone(), conv.select.as_str(), vec![project])
            };
            append_range(conv, r, items, path)
        })
        .collect()
}

fn append_range(conv: &Conventions, result: &Token, items: Expr, path: &Expr) -> Stmt {
    Stmt::Expr(Expr::method(
        result.expr.clone(),
        conv.append_range.as_str(),
        vec![items, path.clone()],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conv() -> Conventions {
        Conventions::default()
    }

    fn tree_token(name: &str, letter: &str) -> Token {
        Token::new(Type::named("Tree", vec![Type::param(letter)]), name)
    }

    fn rendered(stmts: &[Stmt]) -> Vec<String> {
        stmts
            .iter()
            .map(|s| match s {
                Stmt::Declare { name, value } => format!("{name} = {value}"),
                Stmt::Expr(e) => e.to_string(),
                other => format!("{other:?}"),
            })
            .collect()
    }

    #[test]
    fn result_slots_stay_in_lockstep() {
        let elems = [Type::param("A"), Type::param("B"), Type::param("C")];
        let slots = declare_result_structures(&conv(), &elems);
        assert_eq!(slots.len(), 3);
        for (i, slot) in slots.iter().enumerate() {
            assert_eq!(slot.elem, elems[i]);
            assert_eq!(slot.token.expr.to_string(), format!("result{}", i + 1));
            assert_eq!(
                slot.decl,
                Stmt::declare(format!("result{}", i + 1), Expr::New(slot.token.ty.clone()))
            );
        }
        assert_eq!(slots[1].token.ty.to_string(), "Tree<B>");
    }

    #[test]
    fn max_count_over_branches_and_items() {
        let trees = [Expr::reference("zip_n"), Expr::reference("redux_o")];
        let s = call_max_count(&conv(), "maxBranch", &trees, Measure::Branches);
        assert_eq!(
            rendered(&[s]),
            ["maxBranch = Counts.Max(zip_n.Branches.Count, redux_o.Branches.Count)"]
        );
        let s = call_max_count(&conv(), "maxItem", &trees[..1], Measure::Items);
        assert_eq!(rendered(&[s]), ["maxItem = Counts.Max(zip_n.Count)"]);
    }

    #[test]
    fn max_count_over_nothing_is_one() {
        let s = call_max_count(&conv(), "maxItem", &[], Measure::Items);
        assert_eq!(s, Stmt::declare("maxItem", Expr::Int(1)));
    }

    #[test]
    fn zip_branches_clamp_by_branch_count() {
        let decls = declare_zip_branches(&conv(), &[tree_token("zip_n", "N")], "i");
        assert_eq!(decls.len(), 1);
        assert_eq!(
            rendered(&[decls[0].decl.clone()]),
            ["branchzip_n = zip_n.Branches[Math.Min(i, zip_n.Branches.Count - 1)]"]
        );
        assert_eq!(decls[0].token.ty.to_string(), "List<N>");
    }

    #[test]
    fn branch_items_clamp_by_item_count() {
        let zips = [tree_token("zip_n", "N"), tree_token("zip_o", "O")];
        let branches = declare_zip_branches(&conv(), &zips, "i");
        let branch_tokens: Vec<Token> = branches.into_iter().map(|d| d.token).collect();
        let items = declare_branch_items(&conv(), &zips, &branch_tokens, "j").unwrap();
        let decls: Vec<Stmt> = items.iter().map(|d| d.decl.clone()).collect();
        assert_eq!(
            rendered(&decls),
            [
                "zip_nx = branchzip_n[Math.Min(j, branchzip_n.Count - 1)]",
                "zip_ox = branchzip_o[Math.Min(j, branchzip_o.Count - 1)]",
            ]
        );
        assert_eq!(items[1].token.ty, Type::param("O"));
    }

    #[test]
    fn branch_items_of_nothing_is_empty() {
        assert!(declare_branch_items(&conv(), &[], &[], "j").unwrap().is_empty());
    }

    #[test]
    fn branch_items_reject_non_reference_tokens() {
        let bad = Token {
            ty: Type::named("Tree", vec![Type::param("N")]),
            expr: Expr::member(Expr::reference("self"), "zip_n"),
        };
        let branch = tree_token("branchzip_n", "N");
        let err = declare_branch_items(&conv(), &[bad], &[branch], "j").unwrap_err();
        assert_eq!(err, GenError::NotAReference { token: "self.zip_n".into() });
    }

    #[test]
    fn ensure_paths_touch_every_result() {
        let results = [tree_token("result1", "A"), tree_token("result2", "B")];
        let stmts = ensure_paths(&conv(), &Expr::reference("subpath"), &results);
        assert_eq!(
            rendered(&stmts),
            ["result1.EnsurePath(subpath)", "result2.EnsurePath(subpath)"]
        );
    }

    #[test]
    fn append_ranges_split_tuple_components() {
        let results = [tree_token("result1", "A"), tree_token("result2", "B")];
        let stmts = append_ranges(&conv(), &Expr::reference("value"), &Expr::reference("subpath"), &results);
        assert_eq!(
            rendered(&stmts),
            [
                "result1.AppendRange(value.Item1, subpath)",
                "result2.AppendRange(value.Item2, subpath)",
            ]
        );
    }

    #[test]
    fn append_range_selects_project_each_component() {
        let results = [tree_token("result1", "A"), tree_token("result2", "B")];
        let stmts = append_range_selects(&conv(), &Expr::reference("values"), &Expr::reference("path"), &results);
        assert_eq!(
            rendered(&stmts),
            [
                "result1.AppendRange(values.Select(v => v.Item1), path)",
                "result2.AppendRange(values.Select(v => v.Item2), path)",
            ]
        );
    }

    #[test]
    fn single_result_appends_without_projection() {
        let results = [tree_token("result1", "A")];
        let src = Expr::reference("values");
        let path = Expr::reference("path");
        assert_eq!(
            rendered(&append_range_selects(&conv(), &src, &path, &results)),
            ["result1.AppendRange(values, path)"]
        );
        assert_eq!(
            rendered(&append_ranges(&conv(), &Expr::reference("value"), &path, &results)),
            ["result1.AppendRange(value, path)"]
        );
    }
}
