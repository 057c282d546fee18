use serde::{Deserialize, Serialize};
use crate::error::{GenError, Result};
use crate::naming::append_non_zero;

/// One generation request: how many trees are zipped, how many are reduced,
/// how many trees come out, and whether results are grafted per item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Arity {
    pub zip: usize,
    pub redux: usize,
    pub out: usize,
    #[serde(default)]
    pub graft: bool,
}

impl Arity {
    pub fn new(zip: usize, redux: usize, out: usize, graft: bool) -> Result<Self> {
        let arity = Self { zip, redux, out, graft };
        arity.check()?;
        Ok(arity)
    }

    /// Arity values can also arrive through serde, so the range check is separate.
    pub fn check(&self) -> Result<()> {
        if self.out == 0 {
            return Err(GenError::ZeroOutputs);
        }
        Ok(())
    }

    /// Overload name: `Zip`/`Red` only when present, `Graft` when grafting,
    /// then `x` and the output count. `(2, 1, 2, graft)` → `ZipRedGraftx2`.
    pub fn function_name(&self) -> String {
        let mut name = String::new();
        if self.zip > 0 { name.push_str("Zip"); }
        if self.redux > 0 { name.push_str("Red"); }
        if self.graft { name.push_str("Graft"); }
        format!("{name}x{}", self.out)
    }

    /// Fully qualified label, unique per arity: `Zip2Red1GraftOut2`.
    pub fn label(&self) -> String {
        format!(
            "{}{}{}{}",
            append_non_zero("Zip", self.zip),
            append_non_zero("Red", self.redux),
            if self.graft { "Graft" } else { "" },
            append_non_zero("Out", self.out),
        )
    }
}

/// Cartesian request grid. Expansion order is zip, redux, out, graft (outermost first).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    pub zip: Vec<usize>,
    pub redux: Vec<usize>,
    pub out: Vec<usize>,
    #[serde(default = "both_modes")]
    pub graft: Vec<bool>,
}

fn both_modes() -> Vec<bool> {
    vec![false, true]
}

impl Grid {
    pub fn up_to(max_zip: usize, max_redux: usize, min_out: usize, max_out: usize, graft: Vec<bool>) -> Self {
        Self {
            zip: (0..=max_zip).collect(),
            redux: (0..=max_redux).collect(),
            out: (min_out..=max_out).collect(),
            graft,
        }
    }

    pub fn expand(&self) -> Result<Vec<Arity>> {
        let mut out = Vec::new();
        for &zip in &self.zip {
            for &redux in &self.redux {
                for &o in &self.out {
                    for &graft in &self.graft {
                        out.push(Arity::new(zip, redux, o, graft)?);
                    }
                }
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_names_follow_labels() {
        assert_eq!(Arity::new(1, 0, 1, false).unwrap().function_name(), "Zipx1");
        assert_eq!(Arity::new(0, 1, 1, false).unwrap().function_name(), "Redx1");
        assert_eq!(Arity::new(2, 1, 2, true).unwrap().function_name(), "ZipRedGraftx2");
        assert_eq!(Arity::new(0, 0, 3, false).unwrap().function_name(), "x3");
    }

    #[test]
    fn labels_keep_counts() {
        assert_eq!(Arity::new(2, 1, 2, true).unwrap().label(), "Zip2Red1GraftOut2");
        assert_eq!(Arity::new(0, 3, 1, false).unwrap().label(), "Red3Out1");
    }

    #[test]
    fn zero_outputs_rejected() {
        assert_eq!(Arity::new(1, 1, 0, false), Err(GenError::ZeroOutputs));
    }

    #[test]
    fn grid_expands_in_order() {
        let grid = Grid::up_to(1, 0, 1, 2, vec![false, true]);
        let xs = grid.expand().unwrap();
        assert_eq!(xs.len(), 2 * 1 * 2 * 2);
        assert_eq!(xs[0], Arity { zip: 0, redux: 0, out: 1, graft: false });
        assert_eq!(xs[1], Arity { zip: 0, redux: 0, out: 1, graft: true });
        assert_eq!(xs[7], Arity { zip: 1, redux: 0, out: 2, graft: true });
    }

    #[test]
    fn grid_with_zero_out_fails() {
        let grid = Grid { zip: vec![1], redux: vec![0], out: vec![0], graft: vec![false] };
        assert!(grid.expand().is_err());
    }
}
