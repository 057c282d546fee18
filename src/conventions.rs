//! Names the generated code uses to talk to its runtime.
//!
//! Everything the generator writes that is not a generated local (the tree
//! container, its members, the helper functions, the capability tag) comes from
//! here, so the same generator can target a differently-named runtime.
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use crate::error::ConfigError;

static QUALIFIED_IDENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*$").unwrap()
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Conventions {
    /// generic tree container, e.g. `Tree<T>`
    pub tree_type: String,
    /// bare collection handed to the action for reduce inputs
    pub list_type: String,
    /// bound applied to every generic parameter
    pub capability: String,
    pub branches_member: String,
    pub count_member: String,
    pub ensure_path: String,
    pub append_range: String,
    /// `GetPath(i, trees...)`
    pub path_fn: String,
    /// `path.AppendElement(j)`
    pub path_append: String,
    pub max_fn: String,
    pub min_fn: String,
    pub parallel_for: String,
    /// per-element projection, `values.Select(v => v.Item1)`
    pub select: String,
    pub modifiers: Vec<String>,
    pub class_name: String,
    pub namespace: Option<String>,
    pub usings: Vec<String>,
}

impl Default for Conventions {
    fn default() -> Self {
        Self {
            tree_type: "Tree".into(),
            list_type: "List".into(),
            capability: "ITreeItem".into(),
            branches_member: "Branches".into(),
            count_member: "Count".into(),
            ensure_path: "EnsurePath".into(),
            append_range: "AppendRange".into(),
            path_fn: "TreePath.Of".into(),
            path_append: "AppendElement".into(),
            max_fn: "Counts.Max".into(),
            min_fn: "Math.Min".into(),
            parallel_for: "Parallel.For".into(),
            select: "Select".into(),
            modifiers: vec!["public".into(), "static".into()],
            class_name: "TreeBroadcast".into(),
            namespace: None,
            usings: vec![
                "System".into(),
                "System.Linq".into(),
                "System.Threading.Tasks".into(),
            ],
        }
    }
}

impl Conventions {
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let conventions: Self = crate::path_de::from_file_with_path(path)?;
        conventions.validate()?;
        Ok(conventions)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields: [(&'static str, &str); 14] = [
            ("tree_type", &self.tree_type),
            ("list_type", &self.list_type),
            ("capability", &self.capability),
            ("branches_member", &self.branches_member),
            ("count_member", &self.count_member),
            ("ensure_path", &self.ensure_path),
            ("append_range", &self.append_range),
            ("path_fn", &self.path_fn),
            ("path_append", &self.path_append),
            ("max_fn", &self.max_fn),
            ("min_fn", &self.min_fn),
            ("parallel_for", &self.parallel_for),
            ("select", &self.select),
            ("class_name", &self.class_name),
        ];
        for (field, value) in fields {
            check_ident(field, value)?;
        }
        if let Some(ns) = &self.namespace {
            check_ident("namespace", ns)?;
        }
        for m in &self.modifiers {
            check_ident("modifiers", m)?;
        }
        for u in &self.usings {
            check_ident("usings", u)?;
        }
        Ok(())
    }
}

fn check_ident(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if QUALIFIED_IDENT.is_match(value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidIdentifier { field, value: value.to_string() })
    }
}
