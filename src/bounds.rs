//! Sign-aware bound propagation built on the substitution primitive.

use num_traits::Signed;

use crate::error::{LinError, Result};
use crate::formula::{Bindings, LinearFormula};

#[derive(Clone, Copy, PartialEq)]
enum BoundKind {
    Lower,
    Upper,
}

impl LinearFormula {
    /// Computes `(lower, upper)` bound formulas for `self` from per-variable
    /// bound maps. A variable's lower bound tightens the formula's lower
    /// bound only where the variable's coefficient is non-negative; with a
    /// negative coefficient the roles of the two maps swap.
    ///
    /// With `recursive`, bounds are re-applied until none of the bound
    /// variables remain. With `order`, one variable is processed at a time
    /// in the given sequence, re-reading the coefficient sign at each step.
    /// Combining `order` with `recursive` is an error.
    pub fn get_bounds(
        &self,
        lower_bounds: &Bindings,
        upper_bounds: &Bindings,
        order: Option<&[&str]>,
        recursive: bool,
    ) -> Result<(LinearFormula, LinearFormula)> {
        match order {
            Some(_) if recursive => Err(LinError::Unsupported(
                "bounds cannot be applied both recursively and in a fixed order".to_string(),
            )),
            Some(order) => Ok(self.bounds_ordered(lower_bounds, upper_bounds, order)),
            None => self.bounds_unordered(lower_bounds, upper_bounds, recursive),
        }
    }

    fn bounds_unordered(
        &self,
        lower_bounds: &Bindings,
        upper_bounds: &Bindings,
        recursive: bool,
    ) -> Result<(LinearFormula, LinearFormula)> {
        // read the coefficient signs off the simplified form
        let zipped = self.zip();

        let mut lower_kwargs = Bindings::new();
        let mut upper_kwargs = Bindings::new();
        select_bounds(&zipped, &mut lower_kwargs, lower_bounds, BoundKind::Lower, BoundKind::Lower);
        select_bounds(&zipped, &mut lower_kwargs, upper_bounds, BoundKind::Lower, BoundKind::Upper);
        select_bounds(&zipped, &mut upper_kwargs, lower_bounds, BoundKind::Upper, BoundKind::Lower);
        select_bounds(&zipped, &mut upper_kwargs, upper_bounds, BoundKind::Upper, BoundKind::Upper);

        let mut lower_bound = self.substitute(&lower_kwargs).zip();
        let mut upper_bound = self.substitute(&upper_kwargs).zip();

        if recursive {
            let limit = lower_bounds.len() + upper_bounds.len() + 1;
            refine(&mut lower_bound, BoundKind::Lower, lower_bounds, upper_bounds, limit)?;
            refine(&mut upper_bound, BoundKind::Upper, lower_bounds, upper_bounds, limit)?;
        }

        Ok((lower_bound, upper_bound))
    }

    fn bounds_ordered(
        &self,
        lower_bounds: &Bindings,
        upper_bounds: &Bindings,
        order: &[&str],
    ) -> (LinearFormula, LinearFormula) {
        let mut upper_bound = self.zip();
        let mut lower_bound = upper_bound.clone();

        for variable in order {
            let lower = lower_bounds.get(*variable);
            let upper = upper_bounds.get(*variable);
            apply_variable_bound(&mut lower_bound, variable, BoundKind::Lower, lower, upper);
            apply_variable_bound(&mut upper_bound, variable, BoundKind::Upper, lower, upper);
        }

        (lower_bound, upper_bound)
    }
}

/// Picks which of `bounds` apply to `formula` when deriving a bound of kind
/// `result_kind` from per-variable bounds of kind `arg_kind`: same kinds pair
/// on a non-negative coefficient, opposite kinds on a non-positive one.
fn select_bounds(
    formula: &LinearFormula,
    kwargs: &mut Bindings,
    bounds: &Bindings,
    result_kind: BoundKind,
    arg_kind: BoundKind,
) {
    for (variable, bound) in bounds {
        let Ok(multiplier) = formula.coefficient(variable) else {
            continue;
        };
        let matching = result_kind == arg_kind;
        if (!multiplier.is_negative() && matching) || (!multiplier.is_positive() && !matching) {
            kwargs.insert(variable.clone(), bound.clone());
        }
    }
}

/// Keeps substituting applicable bounds into `bound` until none of the bound
/// variables remain. Cyclic bound maps never drain and are reported as a
/// substitution cycle.
fn refine(
    bound: &mut LinearFormula,
    kind: BoundKind,
    lower_bounds: &Bindings,
    upper_bounds: &Bindings,
    limit: usize,
) -> Result<()> {
    for _ in 0..=limit {
        bound.zip_in_place();

        let mut kwargs = Bindings::new();
        select_bounds(bound, &mut kwargs, lower_bounds, kind, BoundKind::Lower);
        select_bounds(bound, &mut kwargs, upper_bounds, kind, BoundKind::Upper);
        if kwargs.is_empty() {
            return Ok(());
        }

        bound.substitute_in_place(&kwargs);
    }
    Err(LinError::SubstitutionCycle)
}

fn apply_variable_bound(
    target: &mut LinearFormula,
    variable: &str,
    kind: BoundKind,
    lower: Option<&LinearFormula>,
    upper: Option<&LinearFormula>,
) {
    let Ok(multiplier) = target.coefficient(variable) else {
        return;
    };

    let chosen = if multiplier.is_positive() {
        match kind {
            BoundKind::Lower => lower,
            BoundKind::Upper => upper,
        }
    } else {
        match kind {
            BoundKind::Lower => upper,
            BoundKind::Upper => lower,
        }
    };

    if let Some(bound) = chosen {
        let bindings = Bindings::from([(variable.to_string(), bound.clone())]);
        target.substitute_in_place(&bindings);
        target.zip_in_place();
    }
}
