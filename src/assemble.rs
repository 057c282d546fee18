//! Function assembler: one arity in, one complete function record out.
//!
//! Body layout, in order:
//! 1. result tree declarations
//! 2. `maxBranch` over every input tree
//! 3. sequential path pass: ensure `path ++ [j]` exists in every result
//! 4. parallel compute pass over branches, guarded on non-empty slices,
//!    then either per-item grafting or a per-branch array appended in bulk
//! 5. return of all result trees
use tracing::{debug, instrument};

use crate::arity::Arity;
use crate::ast::{Constraint, Expr, FunctionDecl, Loop, Param, Stmt, Type};
use crate::conventions::Conventions;
use crate::error::Result;
use crate::layout::{ArgumentLayout, Token};
use crate::synth::{
    all_counts_nonzero, append_range_selects, append_ranges, call_max_count, compute_expression,
    declare_branch_items, declare_result_structures, declare_zip_branches, ensure_paths, Declared,
    Dest, Measure,
};

// generated locals
const BRANCH: &str = "i";
const ITEM: &str = "j";
const MAX_BRANCH: &str = "maxBranch";
const MAX_ITEM: &str = "maxItem";
const PATH: &str = "path";
const SUBPATH: &str = "subpath";
const VALUE: &str = "value";
const VALUES: &str = "values";

#[derive(Debug, Clone, Default)]
pub struct Generator {
    conventions: Conventions,
}

/// Everything one generation call derives before building loops.
struct Frame<'a> {
    arity: &'a Arity,
    layout: ArgumentLayout,
    results: Vec<Token>,
    trees: Vec<Expr>,
}

impl Generator {
    pub fn new(conventions: Conventions) -> Self {
        Self { conventions }
    }

    pub fn conventions(&self) -> &Conventions {
        &self.conventions
    }

    #[instrument(level = "debug", skip(self), fields(name = %arity.function_name()))]
    pub fn generate(&self, arity: &Arity) -> Result<FunctionDecl> {
        arity.check()?;
        let conv = &self.conventions;

        let layout = ArgumentLayout::build(arity, conv);
        let slots = declare_result_structures(conv, &layout.output_params);
        let trees = layout.tree_tokens().iter().map(|t| t.expr.clone()).collect();
        let frame = Frame {
            arity,
            results: slots.iter().map(|s| s.token.clone()).collect(),
            layout,
            trees,
        };

        let mut body: Vec<Stmt> = slots.iter().map(|s| s.decl.clone()).collect();
        body.push(call_max_count(conv, MAX_BRANCH, &frame.trees, Measure::Branches));
        body.push(Stmt::For(self.path_pass(&frame)));
        body.push(Stmt::ParallelFor(self.compute_pass(&frame)?));
        body.push(Stmt::Return(Expr::tuple_or_single(
            frame.results.iter().map(|r| r.expr.clone()).collect(),
        )));

        let generics = frame.layout.generics();
        let constraints = generics
            .iter()
            .map(|g| Constraint { param: g.clone(), bound: conv.capability.clone() })
            .collect();
        let params = frame
            .layout
            .arguments()
            .into_iter()
            .map(|t| Param { ty: t.ty.clone(), name: t.expr.to_string() })
            .collect();

        let function = FunctionDecl {
            name: arity.function_name(),
            modifiers: conv.modifiers.clone(),
            ret: Type::tuple_or_single(frame.results.iter().map(|r| r.ty.clone()).collect()),
            params,
            generics,
            constraints,
            body,
        };
        debug!(params = function.params.len(), statements = function.body.len(), "function assembled");
        Ok(function)
    }

    /// Sequential pass. Creates every `path ++ [j]` in every result so output
    /// trees keep the full skeleton, including branches the compute pass skips.
    fn path_pass(&self, frame: &Frame<'_>) -> Loop {
        let conv = &self.conventions;
        let zip_branches = declare_zip_branches(conv, &frame.layout.zip_tokens, BRANCH);

        let mut body = vec![self.declare_path(frame)];
        body.extend(zip_branches.iter().map(|d| d.decl.clone()));
        body.push(call_max_count(conv, MAX_ITEM, &exprs(&zip_branches), Measure::Items));

        let subpath = Expr::reference(SUBPATH);
        let mut item_body = vec![self.declare_subpath()];
        item_body.extend(ensure_paths(conv, &subpath, &frame.results));
        body.push(Stmt::For(counted(ITEM, MAX_ITEM, item_body)));

        counted(BRANCH, MAX_BRANCH, body)
    }

    /// Parallel pass over branches. Distinct `i` never share a path, distinct
    /// `j` write disjoint sub-paths (graft) or disjoint array slots (flatten).
    fn compute_pass(&self, frame: &Frame<'_>) -> Result<Loop> {
        let conv = &self.conventions;
        let zip_branches = declare_zip_branches(conv, &frame.layout.zip_tokens, BRANCH);
        let redux_branches = declare_zip_branches(conv, &frame.layout.redux_tokens, BRANCH);
        let all_branches: Vec<Expr> = exprs(&zip_branches)
            .into_iter()
            .chain(exprs(&redux_branches))
            .collect();

        let mut guarded = vec![call_max_count(conv, MAX_ITEM, &exprs(&zip_branches), Measure::Items)];
        if frame.arity.graft {
            guarded.push(Stmt::ParallelFor(self.graft_items(frame, &zip_branches, &redux_branches)?));
        } else {
            let values = Expr::reference(VALUES);
            guarded.push(Stmt::declare(
                VALUES,
                Expr::new_array(frame.layout.action_result(), Expr::reference(MAX_ITEM)),
            ));
            guarded.push(Stmt::ParallelFor(self.flatten_items(frame, &zip_branches, &redux_branches)?));
            guarded.extend(append_range_selects(conv, &values, &Expr::reference(PATH), &frame.results));
        }

        let mut body = vec![self.declare_path(frame)];
        body.extend(zip_branches.iter().map(|d| d.decl.clone()));
        body.extend(redux_branches.iter().map(|d| d.decl.clone()));
        body.push(Stmt::If {
            guard: all_counts_nonzero(conv, &all_branches),
            then: guarded,
            otherwise: None,
        });
        Ok(counted(BRANCH, MAX_BRANCH, body))
    }

    /// One sub-branch per item: compute, then append each component at `path ++ [j]`.
    fn graft_items(&self, frame: &Frame<'_>, zip: &[Declared], redux: &[Declared]) -> Result<Loop> {
        let conv = &self.conventions;
        let (mut body, args) = self.item_arguments(frame, zip, redux)?;
        body.push(self.declare_subpath());
        body.push(self.compute(frame, Dest::Declare(VALUE.into()), &args));
        body.extend(append_ranges(
            conv,
            &Expr::reference(VALUE),
            &Expr::reference(SUBPATH),
            &frame.results,
        ));
        Ok(counted(ITEM, MAX_ITEM, body))
    }

    /// Fills `values[j]`; the bulk append happens after the loop.
    fn flatten_items(&self, frame: &Frame<'_>, zip: &[Declared], redux: &[Declared]) -> Result<Loop> {
        let (mut body, args) = self.item_arguments(frame, zip, redux)?;
        let slot = Expr::index(Expr::reference(VALUES), Expr::reference(ITEM));
        body.push(self.compute(frame, Dest::Assign(slot), &args));
        Ok(counted(ITEM, MAX_ITEM, body))
    }

    /// Per-item zip declarations plus the action arguments: zip items, then whole reduce branches.
    fn item_arguments(
        &self,
        frame: &Frame<'_>,
        zip: &[Declared],
        redux: &[Declared],
    ) -> Result<(Vec<Stmt>, Vec<Expr>)> {
        let branch_tokens: Vec<Token> = zip.iter().map(|d| d.token.clone()).collect();
        let items = declare_branch_items(&self.conventions, &frame.layout.zip_tokens, &branch_tokens, ITEM)?;
        let decls = items.iter().map(|d| d.decl.clone()).collect();
        let args = exprs(&items).into_iter().chain(exprs(redux)).collect();
        Ok((decls, args))
    }

    fn compute(&self, frame: &Frame<'_>, dest: Dest, args: &[Expr]) -> Stmt {
        compute_expression(
            dest,
            args,
            &frame.layout.validator.expr,
            &frame.layout.action.expr,
            &frame.layout.output_params,
            frame.arity.graft,
        )
    }

    /// `var path = GetPath(i, trees...);`
    fn declare_path(&self, frame: &Frame<'_>) -> Stmt {
        let mut args = vec![Expr::reference(BRANCH)];
        args.extend(frame.trees.iter().cloned());
        Stmt::declare(PATH, Expr::call(self.conventions.path_fn.as_str(), args))
    }

    /// `var subpath = path.AppendElement(j);`
    fn declare_subpath(&self) -> Stmt {
        Stmt::declare(
            SUBPATH,
            Expr::method(
                Expr::reference(PATH),
                self.conventions.path_append.as_str(),
                vec![Expr::reference(ITEM)],
            ),
        )
    }
}

/// Entry point with default conventions.
pub fn generate(arity: &Arity) -> Result<FunctionDecl> {
    Generator::default().generate(arity)
}

fn counted(var: &str, stop: &str, body: Vec<Stmt>) -> Loop {
    Loop {
        var: var.to_string(),
        start: Expr::Int(0),
        stop: Expr::reference(stop),
        stride: 1,
        body,
    }
}

fn exprs(decls: &[Declared]) -> Vec<Expr> {
    decls.iter().map(|d| d.token.expr.clone()).collect()
}
