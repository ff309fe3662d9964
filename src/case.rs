//! Proof-case bookkeeping on top of the numbering patterns.

use std::fmt;

use crate::error::{LinError, Result};
use crate::formula::{Bindings, LinearFormula};
use crate::numbering::CentralVertexNumbering;

/// A named set of assumptions of the form `variable = formula`, e.g. the
/// case `n = 2k` of a proof split on the parity of `n`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Case {
    variables: Vec<(String, LinearFormula)>,
}

impl Case {
    pub fn new() -> Self {
        Case::default()
    }

    /// Records `variable = formula`, replacing any earlier assumption about
    /// the same variable.
    pub fn assume(&mut self, variable: &str, formula: LinearFormula) {
        if let Some(entry) = self.variables.iter_mut().find(|(v, _)| v == variable) {
            entry.1 = formula;
        } else {
            self.variables.push((variable.to_string(), formula));
        }
    }

    pub fn get(&self, variable: &str) -> Option<&LinearFormula> {
        self.variables
            .iter()
            .find(|(v, _)| v == variable)
            .map(|(_, formula)| formula)
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// The assumptions as a substitution map.
    pub fn bindings(&self) -> Bindings {
        self.variables
            .iter()
            .map(|(variable, formula)| (variable.clone(), formula.clone()))
            .collect()
    }
}

impl fmt::Display for Case {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let assumptions: Vec<String> = self
            .variables
            .iter()
            .map(|(variable, formula)| format!("{variable} = {formula}"))
            .collect();
        write!(f, "Case({})", assumptions.join(", "))
    }
}

/// A proof case for numbering a cycle: a [`Case`] binding the cycle order
/// `n`, plus an upper and a lower numbering pattern that together must cover
/// the whole cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CycleCase {
    case: Case,
    upper_pattern: CentralVertexNumbering,
    lower_pattern: CentralVertexNumbering,
}

impl CycleCase {
    /// Builds the case after checking its arithmetic: the four sequence
    /// lengths plus the two central vertices, with the case's assumptions
    /// substituted in, must account for exactly `n` vertices.
    pub fn new(
        case: Case,
        upper_pattern: CentralVertexNumbering,
        lower_pattern: CentralVertexNumbering,
    ) -> Result<Self> {
        let Some(order) = case.get("n") else {
            return Err(LinError::Unsupported(
                "the case does not bind the cycle order `n`".to_string(),
            ));
        };

        let mut total = LinearFormula::new();
        let lengths = [
            upper_pattern.left_seq().length(),
            upper_pattern.right_seq().length(),
            lower_pattern.left_seq().length(),
            lower_pattern.right_seq().length(),
        ];
        for length in lengths {
            let Some(length) = length else {
                return Err(LinError::Unsupported(
                    "every sequence of the patterns needs a finite length".to_string(),
                ));
            };
            total += length;
        }
        total += 2;

        let bindings = case.bindings();
        total.substitute_in_place(&bindings);
        total.zip_in_place();

        let mut order = order.clone();
        order.substitute_recursive_in_place(&bindings)?;
        order.zip_in_place();

        if !total.equivalent(&order) {
            return Err(LinError::Unsupported(
                "the lengths of the sequences do not sum up to n".to_string(),
            ));
        }

        Ok(CycleCase {
            case,
            upper_pattern,
            lower_pattern,
        })
    }

    pub fn case(&self) -> &Case {
        &self.case
    }

    pub fn upper_pattern(&self) -> &CentralVertexNumbering {
        &self.upper_pattern
    }

    pub fn lower_pattern(&self) -> &CentralVertexNumbering {
        &self.lower_pattern
    }

    /// Pushes the case's assumptions into both patterns, resolving chained
    /// assumptions to their final values.
    pub fn substitute_assumptions(&mut self) -> Result<()> {
        let bindings = self.case.bindings();
        self.upper_pattern
            .substitute_in_place(&bindings, false, true)?;
        self.lower_pattern
            .substitute_in_place(&bindings, false, true)
    }
}

impl fmt::Display for CycleCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Cycle{}\nupper pattern: {}\nlower pattern: {}",
            self.case, self.upper_pattern, self.lower_pattern
        )
    }
}
