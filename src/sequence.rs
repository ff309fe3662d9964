//! N-term recursion sequences: n formulas interleaved over a tuple index.
//!
//! A 3-term sequence with formulas `f1(i), f2(i), f3(i)` enumerates as
//! `f1(0), f2(0), f3(0), f1(1), f2(1), f3(1), ...` — the tuple index `i`
//! names the tuple the element belongs to, every other variable is global.

use std::collections::HashSet;
use std::fmt;

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::ToPrimitive;

use crate::error::{LinError, Result};
use crate::formula::{Bindings, LinearFormula, Valuation};
use crate::relation::{LinearRelation, Relation};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NTermRecursionSequence {
    formulas: Vec<LinearFormula>,
    ntuple_index: String,
    length: Option<LinearFormula>,
}

impl NTermRecursionSequence {
    /// A sequence driven by `formulas`, with the default tuple index `i` and
    /// no length constraint.
    pub fn new(formulas: Vec<LinearFormula>) -> Self {
        NTermRecursionSequence {
            formulas,
            ntuple_index: "i".to_string(),
            length: None,
        }
    }

    /// Parses every formula from a string.
    pub fn from_strs(formulas: &[&str]) -> Result<Self> {
        let formulas = formulas
            .iter()
            .map(|text| text.parse())
            .collect::<Result<Vec<_>>>()?;
        Ok(NTermRecursionSequence::new(formulas))
    }

    /// Declares the tuple-index variable the formulas are written in.
    pub fn with_ntuple_index(mut self, variable: &str) -> Result<Self> {
        if let Some(length) = &self.length {
            if length.get_variables(false).contains(variable) {
                return Err(LinError::Unsupported(format!(
                    "the length `{length}` uses the ntuple index variable"
                )));
            }
        }
        self.ntuple_index = variable.to_string();
        Ok(self)
    }

    pub fn with_length(mut self, length: LinearFormula) -> Result<Self> {
        self.set_length(Some(length))?;
        Ok(self)
    }

    pub fn n(&self) -> usize {
        self.formulas.len()
    }

    pub fn formulas(&self) -> &[LinearFormula] {
        &self.formulas
    }

    pub fn ntuple_index(&self) -> &str {
        &self.ntuple_index
    }

    pub fn length(&self) -> Option<&LinearFormula> {
        self.length.as_ref()
    }

    /// Sets the symbolic length; `None` removes the constraint. The length
    /// must not use the tuple-index variable.
    pub fn set_length(&mut self, length: Option<LinearFormula>) -> Result<()> {
        if let Some(length) = &length {
            if length.get_variables(false).contains(&self.ntuple_index) {
                return Err(LinError::Unsupported(format!(
                    "the length `{length}` uses the ntuple index variable"
                )));
            }
        }
        self.length = length;
        Ok(())
    }

    /// Renames the tuple index, rewriting every formula to the new variable.
    /// The new variable must not already be used globally.
    pub fn set_ntuple_index(&mut self, variable: &str) -> Result<()> {
        if self.get_variables(false, true).contains(variable) {
            return Err(LinError::Unsupported(format!(
                "the variable `{variable}` is already used by the sequence"
            )));
        }

        let bindings = Bindings::from([(
            self.ntuple_index.clone(),
            LinearFormula::from_pairs([(1, variable)]),
        )]);
        for formula in &mut self.formulas {
            formula.substitute_in_place(&bindings);
        }
        self.ntuple_index = variable.to_string();
        Ok(())
    }

    pub fn zip(&self) -> Self {
        let mut out = self.clone();
        out.zip_in_place();
        out
    }

    pub fn zip_in_place(&mut self) {
        for formula in &mut self.formulas {
            formula.zip_in_place();
        }
        if let Some(length) = &mut self.length {
            length.zip_in_place();
        }
    }

    /// Substitutes into the formulas and, unless `formulas_only`, into the
    /// length as well; in that case no replacement may use the tuple index.
    pub fn substitute(
        &self,
        bindings: &Bindings,
        formulas_only: bool,
        recursive: bool,
    ) -> Result<Self> {
        let mut out = self.clone();
        out.substitute_in_place(bindings, formulas_only, recursive)?;
        Ok(out)
    }

    pub fn substitute_in_place(
        &mut self,
        bindings: &Bindings,
        formulas_only: bool,
        recursive: bool,
    ) -> Result<()> {
        if !formulas_only {
            for replacement in bindings.values() {
                if replacement.get_variables(false).contains(&self.ntuple_index) {
                    return Err(LinError::Unsupported(format!(
                        "a replacement formula uses the ntuple index variable \
                         `{}`; substitute into the formulas only",
                        self.ntuple_index
                    )));
                }
            }
            if let Some(length) = &mut self.length {
                if recursive {
                    length.substitute_recursive_in_place(bindings)?;
                } else {
                    length.substitute_in_place(bindings);
                }
            }
        }

        for formula in &mut self.formulas {
            if recursive {
                formula.substitute_recursive_in_place(bindings)?;
            } else {
                formula.substitute_in_place(bindings);
            }
        }
        Ok(())
    }

    /// The `index`-th element: formula `index % n` with the tuple index
    /// bound to `index / n`, simplified.
    pub fn evaluate(&self, index: usize) -> LinearFormula {
        let n = self.formulas.len();
        let bindings = Bindings::from([(
            self.ntuple_index.clone(),
            LinearFormula::constant((index / n) as i64),
        )]);
        self.formulas[index % n].substitute(&bindings).zip()
    }

    /// The formulas joined by `", "`, optionally from the last to the first.
    pub fn formulas_str(&self, reversed: bool) -> String {
        let mut rendered: Vec<String> = self.formulas.iter().map(|f| f.to_string()).collect();
        if reversed {
            rendered.reverse();
        }
        rendered.join(", ")
    }

    /// Variables used by the formulas and the length. `global_only` drops
    /// the tuple index.
    pub fn get_variables(&self, omit_zeros: bool, global_only: bool) -> HashSet<String> {
        let mut result = HashSet::new();
        if let Some(length) = &self.length {
            result.extend(length.get_variables(omit_zeros));
        }
        for formula in &self.formulas {
            result.extend(formula.get_variables(omit_zeros));
        }
        if global_only {
            result.remove(&self.ntuple_index);
        }
        result
    }

    /// The inequality bounding the tuple index of the `no_formula`-th
    /// formula by the sequence length, given that the sequence's last
    /// element comes from its `no_last_formula`-th formula.
    pub fn get_ntuple_index_inequality(
        &self,
        no_formula: usize,
        no_last_formula: usize,
    ) -> Result<LinearRelation> {
        let n = self.formulas.len();
        if no_formula >= n || no_last_formula >= n {
            return Err(LinError::Unsupported(
                "the formula numbers must be in [0, n)".to_string(),
            ));
        }
        let Some(length) = &self.length else {
            return Err(LinError::Unsupported(
                "the sequence has no length constraint".to_string(),
            ));
        };

        // the element n*i + no_formula + 1 (1-based) must fit before the end
        let left = LinearFormula::from_pairs([
            (BigInt::from(n as i64), self.ntuple_index.clone()),
            (BigInt::from(no_formula as i64 + 1), String::new()),
        ]);
        let right = if no_last_formula >= no_formula {
            length.clone() - (no_last_formula as i64) + (no_formula as i64)
        } else {
            length.clone() - (n as i64) - (no_last_formula as i64) + (no_formula as i64)
        };

        Ok(LinearRelation::with_relation(left, right, Relation::Le).zip())
    }

    /// The value of `length % n`, when the length determines it.
    pub fn get_length_mod_n(&self) -> Result<BigInt> {
        let Some(length) = &self.length else {
            return Err(LinError::Unsupported(
                "the sequence has no length constraint".to_string(),
            ));
        };
        let n = self.formulas.len() as i64;
        let residue = length.zip() % n;
        residue.evaluate(&Valuation::new()).map_err(|_| {
            LinError::Unsupported(format!("the value of ({length}) % {n} is ambiguous"))
        })
    }

    /// The largest tuple index admissible for the `no_formula`-th formula,
    /// when the length pins it down numerically.
    pub fn get_ntuple_index_bound(&self, no_formula: usize) -> Result<LinearFormula> {
        let n = self.formulas.len() as i64;
        let residue = self.get_length_mod_n()?.to_i64().unwrap_or(0);
        let no_last_formula = ((residue + n - 1) % n) as usize;

        let inequality = self.get_ntuple_index_inequality(no_formula, no_last_formula)?;
        let limit = inequality.right.evaluate(&Valuation::new()).map_err(|_| {
            LinError::Unsupported("the sequence length is not a number".to_string())
        })?;

        let bound = (limit - (no_formula as i64) - 1i64).div_floor(&BigInt::from(n));
        Ok(LinearFormula::constant(bound))
    }

    /// Weight of the edge between the `index`-th element of a tuple and its
    /// successor; the last edge wraps around into the next tuple.
    pub fn get_edge(&self, index: usize) -> Result<LinearFormula> {
        let n = self.formulas.len();
        if index >= n {
            return Err(LinError::Unsupported(format!(
                "edge index {index} is out of range for a {n}-term sequence"
            )));
        }

        if index + 1 < n {
            Ok(self.formulas[index].clone() + &self.formulas[index + 1])
        } else {
            let shifted = Bindings::from([(
                self.ntuple_index.clone(),
                LinearFormula::from_pairs([
                    (BigInt::from(1), self.ntuple_index.clone()),
                    (BigInt::from(1), String::new()),
                ]),
            )]);
            let next = self.formulas[0].substitute(&shifted);
            Ok(self.formulas[index].clone() + next)
        }
    }
}

impl fmt::Display for NTermRecursionSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let length = match &self.length {
            Some(length) => length.to_string(),
            None => "inf".to_string(),
        };
        write!(
            f,
            "{}-TRSeq({}->|{}|->{})",
            self.formulas.len(),
            self.ntuple_index,
            self.formulas_str(false),
            length
        )
    }
}
