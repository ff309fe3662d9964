//! Linear formula representation and exact symbolic arithmetic.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Rem, RemAssign, Sub, SubAssign};
use std::str::FromStr;

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

use crate::error::{LinError, Result};
use crate::parser::parse_formula;

/// Variable -> replacement formula map accepted by the substitution methods.
pub type Bindings = HashMap<String, LinearFormula>;

/// Variable -> value map accepted by [`LinearFormula::evaluate`].
pub type Valuation = HashMap<String, BigInt>;

/// One `coefficient * variable` segment of a formula. An empty variable name
/// marks the constant term.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Term {
    pub coefficient: BigInt,
    pub variable: String,
}

/// A sum of integer-multiplied variables plus a constant, kept as an ordered
/// term list. The list is not implicitly normalized: the same variable may
/// occur in several terms until [`LinearFormula::zip`] merges them.
#[derive(Clone, Debug, Default)]
pub struct LinearFormula {
    terms: Vec<Term>,
}

impl LinearFormula {
    /// The empty formula, rendered as `0`.
    pub fn new() -> Self {
        LinearFormula { terms: Vec::new() }
    }

    /// A formula holding a single constant term.
    pub fn constant(value: impl Into<BigInt>) -> Self {
        LinearFormula {
            terms: vec![Term {
                coefficient: value.into(),
                variable: String::new(),
            }],
        }
    }

    /// Builds a formula from `(coefficient, variable)` pairs in order.
    pub fn from_pairs<C, V, I>(pairs: I) -> Self
    where
        C: Into<BigInt>,
        V: Into<String>,
        I: IntoIterator<Item = (C, V)>,
    {
        LinearFormula {
            terms: pairs
                .into_iter()
                .map(|(coefficient, variable)| Term {
                    coefficient: coefficient.into(),
                    variable: variable.into(),
                })
                .collect(),
        }
    }

    /// Zips two equal-length sequences into terms pairwise.
    pub fn from_sequences(coefficients: &[i64], variables: &[&str]) -> Result<Self> {
        if coefficients.len() != variables.len() {
            return Err(LinError::MismatchedSequences);
        }
        Ok(LinearFormula::from_pairs(
            coefficients.iter().copied().zip(variables.iter().copied()),
        ))
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Iterates over the `(coefficient, variable)` segments in order.
    pub fn segments(&self) -> impl Iterator<Item = (&BigInt, &str)> {
        self.terms
            .iter()
            .map(|term| (&term.coefficient, term.variable.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    fn is_zero_repr(&self) -> bool {
        match self.terms.as_slice() {
            [] => true,
            [term] => term.coefficient.is_zero(),
            _ => false,
        }
    }

    /// Returns the `index`-th segment; a negative index counts from the end.
    pub fn get_segment(&self, index: isize) -> Result<(BigInt, String)> {
        let len = self.terms.len();
        let resolved = if index < 0 {
            index + len as isize
        } else {
            index
        };
        if resolved < 0 || resolved as usize >= len {
            return Err(LinError::IndexOutOfRange { index, len });
        }
        let term = &self.terms[resolved as usize];
        Ok((term.coefficient.clone(), term.variable.clone()))
    }

    pub fn add_segment(&self, coefficient: impl Into<BigInt>, variable: &str) -> Self {
        let mut out = self.clone();
        out.add_segment_in_place(coefficient, variable);
        out
    }

    pub fn add_segment_in_place(&mut self, coefficient: impl Into<BigInt>, variable: &str) {
        self.terms.push(Term {
            coefficient: coefficient.into(),
            variable: variable.to_string(),
        });
    }

    pub fn insert_segment(
        &self,
        coefficient: impl Into<BigInt>,
        variable: &str,
        index: usize,
    ) -> Self {
        let mut out = self.clone();
        out.insert_segment_in_place(coefficient, variable, index);
        out
    }

    /// Inserts a segment at `index`, clamped to the term count.
    pub fn insert_segment_in_place(
        &mut self,
        coefficient: impl Into<BigInt>,
        variable: &str,
        index: usize,
    ) {
        let index = index.min(self.terms.len());
        self.terms.insert(
            index,
            Term {
                coefficient: coefficient.into(),
                variable: variable.to_string(),
            },
        );
    }

    pub fn remove_segment(&self, index: usize) -> Result<Self> {
        let mut out = self.clone();
        out.remove_segment_in_place(index)?;
        Ok(out)
    }

    pub fn remove_segment_in_place(&mut self, index: usize) -> Result<()> {
        if index >= self.terms.len() {
            return Err(LinError::IndexOutOfRange {
                index: index as isize,
                len: self.terms.len(),
            });
        }
        self.terms.remove(index);
        Ok(())
    }

    /// Looks up the merged coefficient of `variable` (the empty name selects
    /// the constant term). The formula itself is left untouched.
    pub fn coefficient(&self, variable: &str) -> Result<BigInt> {
        let zipped = self.zip();
        zipped
            .terms
            .iter()
            .find(|term| term.variable == variable)
            .map(|term| term.coefficient.clone())
            .ok_or_else(|| LinError::UnknownVariable(variable.to_string()))
    }

    /// Canonical form: one term per distinct variable, in first-appearance
    /// order, zero sums dropped. Idempotent.
    pub fn zip(&self) -> Self {
        let mut out = self.clone();
        out.zip_in_place();
        out
    }

    pub fn zip_in_place(&mut self) {
        let mut seen: Vec<String> = Vec::new();
        for term in &self.terms {
            if !seen.contains(&term.variable) {
                seen.push(term.variable.clone());
            }
        }

        for variable in seen {
            let Some(first) = self.terms.iter().position(|t| t.variable == variable) else {
                continue;
            };
            let mut coefficient = self.terms.remove(first).coefficient;
            while let Some(next) = self.terms.iter().position(|t| t.variable == variable) {
                coefficient += self.terms.remove(next).coefficient;
            }
            if !coefficient.is_zero() {
                self.terms.insert(
                    first,
                    Term {
                        coefficient,
                        variable,
                    },
                );
            }
        }
    }

    /// Reduces the formula to its simplest representative modulo `n`.
    pub fn modulo(&self, n: impl Into<BigInt>) -> Self {
        let mut out = self.clone();
        out.modulo_in_place(n);
        out
    }

    pub fn modulo_in_place(&mut self, n: impl Into<BigInt>) {
        let n = n.into();
        self.zip_in_place();
        for term in &mut self.terms {
            term.coefficient = term.coefficient.mod_floor(&n);
        }
        self.zip_in_place();
    }

    /// Floor division of every coefficient. Zips first so a variable split
    /// across several terms cannot round more than once.
    pub fn floor_div(&self, n: impl Into<BigInt>) -> Self {
        let mut out = self.clone();
        out.floor_div_in_place(n);
        out
    }

    pub fn floor_div_in_place(&mut self, n: impl Into<BigInt>) {
        let n = n.into();
        self.zip_in_place();
        for term in &mut self.terms {
            term.coefficient = term.coefficient.div_floor(&n);
        }
    }

    /// Replaces every occurrence of each bound variable with its replacement
    /// formula, scaled by the occurrence's coefficient and spliced in at the
    /// occurrence's position. All bindings apply simultaneously.
    pub fn substitute(&self, bindings: &Bindings) -> Self {
        let mut out = self.clone();
        out.substitute_in_place(bindings);
        out
    }

    pub fn substitute_in_place(&mut self, bindings: &Bindings) {
        // Rename the targeted variables to private sentinels before touching
        // anything, so a replacement that reuses a targeted variable (or a
        // pair of bindings that swap two variables) cannot feed on its own
        // output.
        let sentinels: Vec<(&String, String)> = bindings
            .keys()
            .enumerate()
            .map(|(k, variable)| (variable, format!("\u{0}{k}")))
            .collect();

        for term in &mut self.terms {
            if let Some((_, sentinel)) = sentinels.iter().find(|(v, _)| **v == term.variable) {
                term.variable = sentinel.clone();
            }
        }

        for (variable, sentinel) in &sentinels {
            self.substitute_one(sentinel, &bindings[*variable]);
        }
    }

    /// Re-substitutes until no bound variable remains, so chains like
    /// `a -> b -> c` resolve to their final value. A cyclic binding set is
    /// reported as [`LinError::SubstitutionCycle`].
    pub fn substitute_recursive(&self, bindings: &Bindings) -> Result<Self> {
        let mut out = self.clone();
        out.substitute_recursive_in_place(bindings)?;
        Ok(out)
    }

    pub fn substitute_recursive_in_place(&mut self, bindings: &Bindings) -> Result<()> {
        const SENTINEL: &str = "\u{0}";

        // An acyclic binding set always drains within bindings.len() passes.
        for _ in 0..=bindings.len() {
            if !self
                .terms
                .iter()
                .any(|term| bindings.contains_key(&term.variable))
            {
                return Ok(());
            }
            for (variable, replacement) in bindings {
                for term in &mut self.terms {
                    if term.variable == *variable {
                        term.variable = SENTINEL.to_string();
                    }
                }
                self.substitute_one(SENTINEL, replacement);
            }
        }
        Err(LinError::SubstitutionCycle)
    }

    // `replacement` must not use `variable`; the callers guarantee that by
    // routing every substitution through a sentinel name.
    fn substitute_one(&mut self, variable: &str, replacement: &LinearFormula) {
        while let Some(i) = self.terms.iter().position(|t| t.variable == variable) {
            let multiplier = self.terms.remove(i).coefficient;
            for (j, term) in replacement.terms.iter().enumerate() {
                self.terms.insert(
                    i + j,
                    Term {
                        coefficient: &multiplier * &term.coefficient,
                        variable: term.variable.clone(),
                    },
                );
            }
        }
    }

    /// Exact integer value of the formula under `values`. Every variable the
    /// formula uses must be present; the constant term needs no entry.
    pub fn evaluate(&self, values: &Valuation) -> Result<BigInt> {
        let mut result = BigInt::zero();
        for term in &self.terms {
            if term.variable.is_empty() {
                result += &term.coefficient;
            } else {
                let value = values
                    .get(&term.variable)
                    .ok_or_else(|| LinError::MissingValue(term.variable.clone()))?;
                result += &term.coefficient * value;
            }
        }
        Ok(result)
    }

    /// The set of variable names used by the formula. With `omit_zeros` the
    /// formula is simplified first, hiding variables whose merged coefficient
    /// is zero.
    pub fn get_variables(&self, omit_zeros: bool) -> HashSet<String> {
        let source = if omit_zeros { self.zip() } else { self.clone() };
        source
            .terms
            .into_iter()
            .filter(|term| !term.variable.is_empty())
            .map(|term| term.variable)
            .collect()
    }

    /// Semantic equality: both sides simplify to the same variable set
    /// (constant included) with matching coefficients. Contrast with `==`,
    /// which compares term sequences literally.
    pub fn equivalent(&self, other: &LinearFormula) -> bool {
        let mine = self.zip();
        let theirs = other.zip();

        let to_map = |formula: &LinearFormula| -> HashMap<String, BigInt> {
            formula
                .terms
                .iter()
                .map(|term| (term.variable.clone(), term.coefficient.clone()))
                .collect()
        };

        to_map(&mine) == to_map(&theirs)
    }

    /// Splits `self` into `(multiplier, remainder)` with
    /// `multiplier * divisor + remainder` equivalent to `self`, by greedily
    /// stepping the divisor in or out while its leading variable keeps the
    /// same sign as the running multiplier.
    pub fn separate(&self, divisor: &LinearFormula) -> (BigInt, LinearFormula) {
        let zipped_divisor = divisor.zip();
        let mut remainder = self.zip();

        let divisor_vars = zipped_divisor.get_variables(false);
        if divisor_vars.is_empty() {
            remainder -= divisor;
            return (BigInt::one(), remainder);
        }

        let leading = zipped_divisor
            .terms
            .iter()
            .find(|term| !term.variable.is_empty())
            .map(|term| term.variable.clone())
            .unwrap_or_default();

        let mut multiplier = BigInt::zero();
        loop {
            if !divisor_vars.is_subset(&remainder.get_variables(false)) {
                break;
            }
            let Ok(coefficient) = remainder.coefficient(&leading) else {
                break;
            };
            if coefficient.is_positive() && !multiplier.is_negative() {
                remainder -= &zipped_divisor;
                multiplier += 1;
            } else if coefficient.is_negative() && !multiplier.is_positive() {
                remainder += &zipped_divisor;
                multiplier -= 1;
            } else {
                break;
            }
            remainder.zip_in_place();
        }

        (multiplier, remainder)
    }
}

impl fmt::Display for LinearFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let one = BigInt::one();
        let minus_one = -BigInt::one();
        let mut text = String::new();

        for (i, term) in self.terms.iter().enumerate() {
            if !term.coefficient.is_negative() {
                if i != 0 {
                    // a leading '+' is omitted
                    text.push_str(" + ");
                }
                if term.coefficient != one || term.variable.is_empty() {
                    text.push_str(&term.coefficient.to_string());
                }
            } else {
                if i != 0 {
                    text.push_str(" - ");
                } else {
                    // a leading '-' carries no surrounding spaces
                    text.push('-');
                }
                if term.coefficient != minus_one || term.variable.is_empty() {
                    text.push_str(&(-&term.coefficient).to_string());
                }
            }
            text.push_str(&term.variable);
        }

        if text.is_empty() {
            text.push('0');
        }
        f.write_str(&text)
    }
}

// Representation equality with the zero quirk: the empty term list and a
// single zero-coefficient term both stand for zero and compare equal.
impl PartialEq for LinearFormula {
    fn eq(&self, other: &Self) -> bool {
        if self.is_zero_repr() || other.is_zero_repr() {
            return self.is_zero_repr() && other.is_zero_repr();
        }
        self.terms == other.terms
    }
}

impl Eq for LinearFormula {}

impl FromStr for LinearFormula {
    type Err = LinError;

    fn from_str(s: &str) -> Result<Self> {
        parse_formula(s)
    }
}

impl From<i32> for LinearFormula {
    fn from(value: i32) -> Self {
        LinearFormula::constant(value)
    }
}

impl From<i64> for LinearFormula {
    fn from(value: i64) -> Self {
        LinearFormula::constant(value)
    }
}

impl From<BigInt> for LinearFormula {
    fn from(value: BigInt) -> Self {
        LinearFormula::constant(value)
    }
}

impl From<&LinearFormula> for LinearFormula {
    fn from(value: &LinearFormula) -> Self {
        value.clone()
    }
}

impl Neg for LinearFormula {
    type Output = LinearFormula;

    fn neg(mut self) -> LinearFormula {
        for term in &mut self.terms {
            term.coefficient = -&term.coefficient;
        }
        self
    }
}

impl Neg for &LinearFormula {
    type Output = LinearFormula;

    fn neg(self) -> LinearFormula {
        -self.clone()
    }
}

impl<T: Into<LinearFormula>> AddAssign<T> for LinearFormula {
    fn add_assign(&mut self, rhs: T) {
        let other = rhs.into();
        for term in other.terms {
            self.terms.push(term);
        }
    }
}

impl<T: Into<LinearFormula>> SubAssign<T> for LinearFormula {
    fn sub_assign(&mut self, rhs: T) {
        *self += -rhs.into();
    }
}

impl<T: Into<BigInt>> MulAssign<T> for LinearFormula {
    fn mul_assign(&mut self, rhs: T) {
        let factor = rhs.into();
        for term in &mut self.terms {
            term.coefficient = &term.coefficient * &factor;
        }
    }
}

// Truncating division, like Rust's integer `/`; a zero divisor panics.
impl<T: Into<BigInt>> DivAssign<T> for LinearFormula {
    fn div_assign(&mut self, rhs: T) {
        let divisor = rhs.into();
        for term in &mut self.terms {
            term.coefficient = &term.coefficient / &divisor;
        }
    }
}

impl<T: Into<BigInt>> RemAssign<T> for LinearFormula {
    fn rem_assign(&mut self, rhs: T) {
        self.modulo_in_place(rhs);
    }
}

impl<T: Into<LinearFormula>> Add<T> for LinearFormula {
    type Output = LinearFormula;

    fn add(mut self, rhs: T) -> LinearFormula {
        self += rhs;
        self
    }
}

impl<T: Into<LinearFormula>> Sub<T> for LinearFormula {
    type Output = LinearFormula;

    fn sub(mut self, rhs: T) -> LinearFormula {
        self -= rhs;
        self
    }
}

impl<T: Into<BigInt>> Mul<T> for LinearFormula {
    type Output = LinearFormula;

    fn mul(mut self, rhs: T) -> LinearFormula {
        self *= rhs;
        self
    }
}

impl<T: Into<BigInt>> Div<T> for LinearFormula {
    type Output = LinearFormula;

    fn div(mut self, rhs: T) -> LinearFormula {
        self /= rhs;
        self
    }
}

impl<T: Into<BigInt>> Rem<T> for LinearFormula {
    type Output = LinearFormula;

    fn rem(mut self, rhs: T) -> LinearFormula {
        self %= rhs;
        self
    }
}
