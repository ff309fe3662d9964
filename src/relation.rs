//! Relations between two linear formulas and the solving algebra on them.

use std::collections::HashSet;
use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

use crate::error::{LinError, Result};
use crate::formula::{Bindings, LinearFormula, Valuation};
use crate::parser::parse_relation;

/// Comparison operator joining the two sides of a [`LinearRelation`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Relation {
    Eq,
    Le,
    Ge,
    Lt,
    Gt,
}

impl Relation {
    /// The operator obtained by swapping the two sides: `<=` and `>=` trade
    /// places, as do `<` and `>`, while `==` is its own reverse.
    pub fn reversed(self) -> Relation {
        match self {
            Relation::Eq => Relation::Eq,
            Relation::Le => Relation::Ge,
            Relation::Ge => Relation::Le,
            Relation::Lt => Relation::Gt,
            Relation::Gt => Relation::Lt,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Relation::Eq => "==",
            Relation::Le => "<=",
            Relation::Ge => ">=",
            Relation::Lt => "<",
            Relation::Gt => ">",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical status of a relation after solving: definitely holds, definitely
/// fails, or still depends on free variables.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    True,
    False,
    Unknown,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Status::True => "true",
            Status::False => "false",
            Status::Unknown => "unknown",
        })
    }
}

/// Two formulas joined by a comparison operator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinearRelation {
    pub left: LinearFormula,
    pub right: LinearFormula,
    pub relation: Relation,
}

impl LinearRelation {
    /// An equality between `left` and `right`.
    pub fn new(left: impl Into<LinearFormula>, right: impl Into<LinearFormula>) -> Self {
        LinearRelation::with_relation(left, right, Relation::Eq)
    }

    pub fn with_relation(
        left: impl Into<LinearFormula>,
        right: impl Into<LinearFormula>,
        relation: Relation,
    ) -> Self {
        LinearRelation {
            left: left.into(),
            right: right.into(),
            relation,
        }
    }

    pub fn zip(&self) -> Self {
        let mut out = self.clone();
        out.zip_in_place();
        out
    }

    pub fn zip_in_place(&mut self) {
        self.left.zip_in_place();
        self.right.zip_in_place();
    }

    pub fn substitute(&self, bindings: &Bindings) -> Self {
        let mut out = self.clone();
        out.substitute_in_place(bindings);
        out
    }

    pub fn substitute_in_place(&mut self, bindings: &Bindings) {
        self.left.substitute_in_place(bindings);
        self.right.substitute_in_place(bindings);
    }

    pub fn substitute_recursive(&self, bindings: &Bindings) -> Result<Self> {
        let mut out = self.clone();
        out.substitute_recursive_in_place(bindings)?;
        Ok(out)
    }

    pub fn substitute_recursive_in_place(&mut self, bindings: &Bindings) -> Result<()> {
        self.left.substitute_recursive_in_place(bindings)?;
        self.right.substitute_recursive_in_place(bindings)
    }

    /// Reduces both sides modulo `n`. Only defined for equalities: modulo
    /// does not preserve an ordering.
    pub fn modulo(&self, n: impl Into<BigInt>) -> Result<Self> {
        let mut out = self.clone();
        out.modulo_in_place(n)?;
        Ok(out)
    }

    pub fn modulo_in_place(&mut self, n: impl Into<BigInt>) -> Result<()> {
        if self.relation != Relation::Eq {
            return Err(LinError::Unsupported(
                "the modulo operation does not preserve inequality relations".to_string(),
            ));
        }
        let n = n.into();
        self.left.modulo_in_place(n.clone());
        self.right.modulo_in_place(n);
        Ok(())
    }

    /// Swaps the sides and reverses the operator.
    pub fn reverse(&self) -> Self {
        let mut out = self.clone();
        out.reverse_in_place();
        out
    }

    pub fn reverse_in_place(&mut self) {
        std::mem::swap(&mut self.left, &mut self.right);
        self.relation = self.relation.reversed();
    }

    /// Normalizes to `L <relation> 0` with the left side simplified and
    /// divided through by the GCD of its coefficients.
    pub fn solve(&self) -> Self {
        let mut out = self.clone();
        out.solve_in_place();
        out
    }

    pub fn solve_in_place(&mut self) {
        let right = self.right.clone();
        *self -= right;
        self.zip_in_place();

        let mut gcd = BigInt::zero();
        for (coefficient, _) in self.left.segments() {
            gcd = gcd.gcd(coefficient);
        }
        // an empty or all-zero left side has no meaningful GCD
        if gcd.is_zero() {
            gcd = BigInt::one();
        }

        *self /= gcd;
    }

    /// Isolates `variable` on the right-hand side with coefficient one,
    /// fully simplified. Fails if the variable does not survive solving.
    pub fn expose(&self, variable: &str) -> Result<Self> {
        let mut out = self.clone();
        out.expose_in_place(variable)?;
        Ok(out)
    }

    pub fn expose_in_place(&mut self, variable: &str) -> Result<()> {
        self.solve_in_place();
        self.reverse_in_place();

        let multiplier = self
            .right
            .coefficient(variable)
            .map_err(|_| LinError::UnknownVariable(variable.to_string()))?;

        *self -= LinearFormula::from_pairs([(multiplier.clone(), variable)]);
        if multiplier.is_positive() {
            *self *= -1;
        }
        self.zip_in_place();
        Ok(())
    }

    /// Evaluates both sides under `values`, keeping the operator.
    pub fn evaluate(&self, values: &Valuation) -> Result<Self> {
        Ok(LinearRelation::with_relation(
            LinearFormula::constant(self.left.evaluate(values)?),
            LinearFormula::constant(self.right.evaluate(values)?),
            self.relation,
        ))
    }

    pub fn get_variables(&self, omit_zeros: bool) -> HashSet<String> {
        let mut result = self.left.get_variables(omit_zeros);
        result.extend(self.right.get_variables(omit_zeros));
        result
    }

    /// Logical status of the solved relation: `Unknown` while free variables
    /// remain, otherwise the truth of `constant <relation> 0`.
    pub fn status(&self) -> Status {
        let solved = self.solve();
        if !solved.get_variables(false).is_empty() {
            return Status::Unknown;
        }

        let value = solved
            .left
            .coefficient("")
            .unwrap_or_else(|_| BigInt::zero());
        let holds = match solved.relation {
            Relation::Eq => value.is_zero(),
            Relation::Le => !value.is_positive(),
            Relation::Ge => !value.is_negative(),
            Relation::Lt => value.is_negative(),
            Relation::Gt => value.is_positive(),
        };

        if holds {
            Status::True
        } else {
            Status::False
        }
    }

    /// Semantic equality of two relations: their operators agree (directly
    /// or after reversing one side) and their solved left sides match.
    pub fn equivalent(&self, other: &LinearRelation) -> bool {
        if other.relation != self.relation && other.relation != self.relation.reversed() {
            return false;
        }

        let mine = self.solve();
        let mut theirs = other.solve();

        if self.relation == Relation::Eq {
            // L == 0 and -L == 0 state the same thing; solve() cannot merge
            // them because it only divides by the positive GCD
            mine.left.equivalent(&theirs.left) || mine.left.equivalent(&-&theirs.left)
        } else {
            if theirs.relation != mine.relation {
                theirs *= -1;
            }
            mine.left.equivalent(&theirs.left)
        }
    }

    /// Adds another relation side by side. Both operators must match.
    pub fn add_relation(&self, other: &LinearRelation) -> Result<Self> {
        if other.relation != self.relation {
            return Err(LinError::Unsupported(
                "cannot add relations of different types".to_string(),
            ));
        }
        let mut out = self.clone();
        out.left += &other.left;
        out.right += &other.right;
        Ok(out)
    }

    /// Subtracts another relation. Both operators must match; inequalities
    /// subtract crosswise (`left - other.right`), which is the order-sound
    /// form.
    pub fn sub_relation(&self, other: &LinearRelation) -> Result<Self> {
        if other.relation != self.relation {
            return Err(LinError::Unsupported(
                "cannot subtract relations of different types".to_string(),
            ));
        }
        let mut out = self.clone();
        if self.relation == Relation::Eq {
            out.left -= &other.left;
            out.right -= &other.right;
        } else {
            out.left -= &other.right;
            out.right -= &other.left;
        }
        Ok(out)
    }
}

impl fmt::Display for LinearRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.relation, self.right)
    }
}

impl FromStr for LinearRelation {
    type Err = LinError;

    fn from_str(s: &str) -> Result<Self> {
        parse_relation(s)
    }
}

impl Neg for LinearRelation {
    type Output = LinearRelation;

    fn neg(self) -> LinearRelation {
        LinearRelation::with_relation(-self.left, -self.right, self.relation.reversed())
    }
}

impl<T: Into<LinearFormula>> AddAssign<T> for LinearRelation {
    fn add_assign(&mut self, rhs: T) {
        let other = rhs.into();
        self.left += &other;
        self.right += other;
    }
}

impl<T: Into<LinearFormula>> SubAssign<T> for LinearRelation {
    fn sub_assign(&mut self, rhs: T) {
        let other = rhs.into();
        self.left -= &other;
        self.right -= other;
    }
}

impl<T: Into<BigInt>> MulAssign<T> for LinearRelation {
    fn mul_assign(&mut self, rhs: T) {
        let factor = rhs.into();
        assert!(!factor.is_zero(), "cannot scale a relation by zero");
        self.left *= factor.clone();
        self.right *= factor.clone();
        if factor.is_negative() {
            self.relation = self.relation.reversed();
        }
    }
}

impl<T: Into<BigInt>> DivAssign<T> for LinearRelation {
    fn div_assign(&mut self, rhs: T) {
        let divisor = rhs.into();
        assert!(!divisor.is_zero(), "cannot divide a relation by zero");
        self.left /= divisor.clone();
        self.right /= divisor.clone();
        if divisor.is_negative() {
            self.relation = self.relation.reversed();
        }
    }
}

impl<T: Into<LinearFormula>> Add<T> for LinearRelation {
    type Output = LinearRelation;

    fn add(mut self, rhs: T) -> LinearRelation {
        self += rhs;
        self
    }
}

impl<T: Into<LinearFormula>> Sub<T> for LinearRelation {
    type Output = LinearRelation;

    fn sub(mut self, rhs: T) -> LinearRelation {
        self -= rhs;
        self
    }
}

impl<T: Into<BigInt>> Mul<T> for LinearRelation {
    type Output = LinearRelation;

    fn mul(mut self, rhs: T) -> LinearRelation {
        self *= rhs;
        self
    }
}

impl<T: Into<BigInt>> Div<T> for LinearRelation {
    type Output = LinearRelation;

    fn div(mut self, rhs: T) -> LinearRelation {
        self /= rhs;
        self
    }
}
