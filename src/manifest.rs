//! JSON generation manifests.
//!
//! ```json
//! {
//!   "conventions": { "tree_type": "DataTree" },
//!   "grids": [{ "zip": [0, 1, 2], "redux": [0, 1], "out": [1, 2] }],
//!   "requests": [{ "zip": 3, "redux": 0, "out": 1, "graft": true }]
//! }
//! ```
use std::path::Path;
use serde::Deserialize;
use crate::arity::{Arity, Grid};
use crate::conventions::Conventions;
use crate::error::ConfigError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Manifest {
    pub conventions: Option<Conventions>,
    pub grids: Vec<Grid>,
    pub requests: Vec<Arity>,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let manifest: Self = crate::path_de::from_file_with_path(path)?;
        if let Some(conv) = &manifest.conventions {
            conv.validate()?;
        }
        Ok(manifest)
    }

    pub fn from_json(origin: &str, src: &str) -> Result<Self, ConfigError> {
        let manifest: Self = crate::path_de::from_str_with_path(origin, src)?;
        if let Some(conv) = &manifest.conventions {
            conv.validate()?;
        }
        Ok(manifest)
    }

    /// Grid expansions first, then explicit requests. Duplicates are kept; the driver de-duplicates.
    pub fn arities(&self) -> crate::error::Result<Vec<Arity>> {
        let mut out = Vec::new();
        for grid in &self.grids {
            out.extend(grid.expand()?);
        }
        for request in &self.requests {
            request.check()?;
            out.push(*request);
        }
        Ok(out)
    }
}
