//! Cycle numbering patterns determined by a central vertex number and two
//! interleaved sequences.
//!
//! With central number `c`, left sequence `l_n` and right sequence `r_n` the
//! cycle `v_0, v_1, ..., v_{n-1}, v_0` is numbered
//! `..., l_2, l_1, c, r_1, r_2, ...` with `v_0` as the central vertex.

use std::collections::HashSet;
use std::fmt;

use crate::error::{LinError, Result};
use crate::formula::{Bindings, LinearFormula};
use crate::sequence::NTermRecursionSequence;

/// Which of the two sequences flanking the central vertex is meant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CentralVertexNumbering {
    center: LinearFormula,
    left_seq: NTermRecursionSequence,
    right_seq: NTermRecursionSequence,
    ntuple_index: String,
}

impl CentralVertexNumbering {
    /// Builds a pattern from a central number and the two sequences. Both
    /// sequences end up on the left sequence's tuple index; the right one is
    /// renamed onto it, which fails if it already uses that variable
    /// globally. The central number must not use the tuple index either.
    pub fn new(
        center: LinearFormula,
        left_seq: NTermRecursionSequence,
        mut right_seq: NTermRecursionSequence,
    ) -> Result<Self> {
        let ntuple_index = left_seq.ntuple_index().to_string();

        if right_seq.ntuple_index() != ntuple_index {
            right_seq.set_ntuple_index(&ntuple_index).map_err(|_| {
                LinError::Unsupported(
                    "the right sequence uses the left sequence's ntuple index variable"
                        .to_string(),
                )
            })?;
        }
        if center.get_variables(false).contains(&ntuple_index) {
            return Err(LinError::Unsupported(
                "the central number uses the ntuple index variable".to_string(),
            ));
        }

        Ok(CentralVertexNumbering {
            center,
            left_seq,
            right_seq,
            ntuple_index,
        })
    }

    pub fn center(&self) -> &LinearFormula {
        &self.center
    }

    pub fn left_seq(&self) -> &NTermRecursionSequence {
        &self.left_seq
    }

    pub fn right_seq(&self) -> &NTermRecursionSequence {
        &self.right_seq
    }

    pub fn ntuple_index(&self) -> &str {
        &self.ntuple_index
    }

    pub fn zip(&self) -> Self {
        let mut out = self.clone();
        out.zip_in_place();
        out
    }

    pub fn zip_in_place(&mut self) {
        self.center.zip_in_place();
        self.left_seq.zip_in_place();
        self.right_seq.zip_in_place();
    }

    /// Substitutes into every formula determining the pattern. Unless
    /// `only_sequences`, no replacement may use the tuple index, since that
    /// would leak a per-tuple variable into the center or the lengths.
    pub fn substitute(
        &self,
        bindings: &Bindings,
        only_sequences: bool,
        recursive: bool,
    ) -> Result<Self> {
        let mut out = self.clone();
        out.substitute_in_place(bindings, only_sequences, recursive)?;
        Ok(out)
    }

    pub fn substitute_in_place(
        &mut self,
        bindings: &Bindings,
        only_sequences: bool,
        recursive: bool,
    ) -> Result<()> {
        if !only_sequences {
            for replacement in bindings.values() {
                if replacement.get_variables(false).contains(&self.ntuple_index) {
                    return Err(LinError::Unsupported(format!(
                        "a replacement formula uses the ntuple index variable \
                         `{}`; substitute into the sequences only",
                        self.ntuple_index
                    )));
                }
            }
            if recursive {
                self.center.substitute_recursive_in_place(bindings)?;
            } else {
                self.center.substitute_in_place(bindings);
            }
        }

        self.left_seq
            .substitute_in_place(bindings, only_sequences, recursive)?;
        self.right_seq
            .substitute_in_place(bindings, only_sequences, recursive)
    }

    /// Swaps the left and right sequences.
    pub fn reverse(&self) -> Self {
        let mut out = self.clone();
        out.reverse_in_place();
        out
    }

    pub fn reverse_in_place(&mut self) {
        std::mem::swap(&mut self.left_seq, &mut self.right_seq);
    }

    pub fn set_lengths(
        &mut self,
        left: Option<LinearFormula>,
        right: Option<LinearFormula>,
    ) -> Result<()> {
        self.left_seq.set_length(left)?;
        self.right_seq.set_length(right)
    }

    /// Renames the shared tuple index through both sequences.
    pub fn set_ntuple_index(&mut self, variable: &str) -> Result<()> {
        if self.center.get_variables(false).contains(variable) {
            return Err(LinError::Unsupported(format!(
                "the variable `{variable}` is already used by the central number"
            )));
        }
        self.left_seq.set_ntuple_index(variable)?;
        self.right_seq.set_ntuple_index(variable)?;
        self.ntuple_index = variable.to_string();
        Ok(())
    }

    /// The number at signed offset `index` from the central vertex: the
    /// center itself at 0, the right sequence for positive offsets, the left
    /// sequence for negative ones.
    pub fn evaluate(&self, index: i64) -> LinearFormula {
        if index == 0 {
            self.center.zip()
        } else if index > 0 {
            self.right_seq.evaluate((index - 1) as usize)
        } else {
            self.left_seq.evaluate((-index - 1) as usize)
        }
    }

    pub fn get_variables(&self, omit_zeros: bool, global_only: bool) -> HashSet<String> {
        let mut result = self.center.get_variables(omit_zeros);
        result.extend(self.left_seq.get_variables(omit_zeros, global_only));
        result.extend(self.right_seq.get_variables(omit_zeros, global_only));
        result
    }

    /// Weight of the `index`-th edge within one tuple of the chosen side's
    /// sequence.
    pub fn get_edge(&self, side: Side, index: usize) -> Result<LinearFormula> {
        self.sequence(side).get_edge(index)
    }

    /// Weight of the edge joining the central vertex to the first element of
    /// the chosen side's sequence.
    pub fn get_center_edge(&self, side: Side) -> LinearFormula {
        self.center.clone() + self.sequence(side).evaluate(0)
    }

    fn sequence(&self, side: Side) -> &NTermRecursionSequence {
        match side {
            Side::Left => &self.left_seq,
            Side::Right => &self.right_seq,
        }
    }
}

impl fmt::Display for CentralVertexNumbering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let length = |seq: &NTermRecursionSequence| match seq.length() {
            Some(length) => length.to_string(),
            None => "inf".to_string(),
        };
        write!(
            f,
            "CVN({}<-|{}|<-{}|{}|{}->|{}|->{})",
            length(&self.left_seq),
            self.left_seq.formulas_str(true),
            self.ntuple_index,
            self.center,
            self.ntuple_index,
            self.right_seq.formulas_str(false),
            length(&self.right_seq),
        )
    }
}
