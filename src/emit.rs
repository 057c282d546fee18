//! Text emitter: renders `FunctionDecl`s as C-family source.
//!
//! Output is byte-deterministic for a given input and conventions: four-space
//! indentation, `\n` line endings, one `where` line per generic parameter.
use crate::ast::{FunctionDecl, Loop, Stmt};
use crate::conventions::Conventions;

const INDENT: &str = "    ";
const HEADER: &str = "// <auto-generated> branchgen: broadcast traversal overloads. Do not edit. </auto-generated>";

pub struct Emitter<'c> {
    conv: &'c Conventions,
    out: String,
    depth: usize,
}

impl<'c> Emitter<'c> {
    pub fn new(conv: &'c Conventions) -> Self {
        Self { conv, out: String::new(), depth: 0 }
    }

    pub fn into_string(self) -> String {
        self.out
    }

    /// Whole file: header, usings, optional namespace, wrapper class, functions.
    pub fn emit_file(&mut self, functions: &[FunctionDecl]) {
        let conv = self.conv;
        self.line(HEADER);
        for u in &conv.usings {
            self.line(format!("using {u};"));
        }
        self.blank();

        if let Some(ns) = &conv.namespace {
            self.line(format!("namespace {ns}"));
            self.open();
        }
        self.line(format!("public static partial class {}", conv.class_name));
        self.open();
        for (i, f) in functions.iter().enumerate() {
            if i > 0 { self.blank(); }
            self.emit(f);
        }
        self.close("}");
        if conv.namespace.is_some() {
            self.close("}");
        }
    }

    /// One function declaration at the current depth.
    pub fn emit(&mut self, f: &FunctionDecl) {
        let params = f
            .params
            .iter()
            .map(|p| format!("{} {}", p.ty, p.name))
            .collect::<Vec<_>>()
            .join(", ");
        let generics = if f.generics.is_empty() {
            String::new()
        } else {
            format!("<{}>", f.generics.join(", "))
        };
        let mut head = f.modifiers.join(" ");
        if !head.is_empty() { head.push(' '); }
        self.line(format!("{head}{} {}{generics}({params})", f.ret, f.name));

        self.depth += 1;
        for c in &f.constraints {
            self.line(format!("where {} : {}", c.param, c.bound));
        }
        self.depth -= 1;

        self.open();
        self.block(&f.body);
        self.close("}");
    }

    fn block(&mut self, stmts: &[Stmt]) {
        for s in stmts {
            self.stmt(s);
        }
    }

    fn stmt(&mut self, s: &Stmt) {
        match s {
            Stmt::Declare { name, value } => self.line(format!("var {name} = {value};")),
            Stmt::Assign { target, value } => self.line(format!("{target} = {value};")),
            Stmt::Expr(e) => self.line(format!("{e};")),
            Stmt::Return(e) => self.line(format!("return {e};")),
            Stmt::For(l) => {
                let step = if l.stride == 1 {
                    format!("{}++", l.var)
                } else {
                    format!("{} += {}", l.var, l.stride)
                };
                self.line(format!("for (var {v} = {}; {v} < {}; {step})", l.start, l.stop, v = l.var));
                self.open();
                self.block(&l.body);
                self.close("}");
            }
            Stmt::ParallelFor(l) => self.parallel(l),
            Stmt::If { guard, then, otherwise } => {
                self.line(format!("if ({guard})"));
                self.open();
                self.block(then);
                self.close("}");
                if let Some(otherwise) = otherwise {
                    self.line("else");
                    self.open();
                    self.block(otherwise);
                    self.close("}");
                }
            }
        }
    }

    /// `Parallel.For(start, stop, i => { ... });`. The helper has no stride, so a
    /// strided loop skips off-stride indices inside the body.
    fn parallel(&mut self, l: &Loop) {
        self.line(format!("{}({}, {}, {} =>", self.conv.parallel_for, l.start, l.stop, l.var));
        self.open();
        if l.stride != 1 {
            self.line(format!("if (({} - {}) % {} != 0) return;", l.var, l.start, l.stride));
        }
        self.block(&l.body);
        self.close("});");
    }

    fn open(&mut self) {
        self.line("{");
        self.depth += 1;
    }

    fn close(&mut self, closer: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.line(closer);
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    fn line(&mut self, text: impl AsRef<str>) {
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
        self.out.push_str(text.as_ref());
        self.out.push('\n');
    }
}

pub fn render_function(conv: &Conventions, f: &FunctionDecl) -> String {
    let mut em = Emitter::new(conv);
    em.emit(f);
    em.into_string()
}

pub fn render_file(conv: &Conventions, functions: &[FunctionDecl]) -> String {
    let mut em = Emitter::new(conv);
    em.emit_file(functions);
    em.into_string()
}
