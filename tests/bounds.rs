use lincas::{Bindings, LinError, LinearFormula};

fn lf(input: &str) -> LinearFormula {
    input.parse().expect("parse formula")
}

fn binds(pairs: &[(&str, &str)]) -> Bindings {
    pairs
        .iter()
        .map(|(variable, formula)| (variable.to_string(), lf(formula)))
        .collect()
}

#[test]
fn bounds_follow_the_coefficient_signs() {
    // positive coefficients take their own kind of bound
    let formula = lf("a + b");
    let lower = binds(&[("a", "1"), ("b", "2")]);
    let upper = binds(&[("a", "5"), ("b", "k")]);
    let (low, high) = formula.get_bounds(&lower, &upper, None, false).unwrap();
    assert_eq!(low, lf("3"));
    assert_eq!(high, lf("5 + k"));

    // a negative coefficient swaps which map applies
    let formula = lf("a - b");
    let lower = binds(&[("a", "1"), ("b", "2")]);
    let upper = binds(&[("a", "5"), ("b", "4")]);
    let (low, high) = formula.get_bounds(&lower, &upper, None, false).unwrap();
    assert_eq!(low, lf("-3"));
    assert_eq!(high, lf("3"));
}

#[test]
fn bounds_ignore_missing_and_cancelled_variables() {
    // no bound for `a` leaves it symbolic on both sides
    let formula = lf("a + b");
    let lower = binds(&[("b", "0")]);
    let upper = binds(&[("b", "k")]);
    let (low, high) = formula.get_bounds(&lower, &upper, None, false).unwrap();
    assert_eq!(low, lf("a"));
    assert_eq!(high, lf("a + k"));

    // a cancelled variable does not pick up a bound at all
    let formula = lf("a + 0b");
    let lower = binds(&[("b", "1")]);
    let upper = binds(&[("b", "9")]);
    let (low, high) = formula.get_bounds(&lower, &upper, None, false).unwrap();
    assert_eq!(low, lf("a"));
    assert_eq!(high, lf("a"));
}

#[test]
fn recursive_bounds_chase_introduced_variables() {
    let formula = lf("a");
    let lower = binds(&[("a", "b + 1"), ("b", "2")]);
    let upper = binds(&[("a", "c"), ("c", "10")]);

    let (low, high) = formula.get_bounds(&lower, &upper, None, false).unwrap();
    assert_eq!(low, lf("b + 1"));
    assert_eq!(high, lf("c"));

    let (low, high) = formula.get_bounds(&lower, &upper, None, true).unwrap();
    assert_eq!(low, lf("3"));
    assert_eq!(high, lf("10"));
}

#[test]
fn recursive_bounds_reject_cyclic_bound_maps() {
    let formula = lf("a");
    let lower = binds(&[("a", "b"), ("b", "a")]);
    let upper = Bindings::new();

    assert!(matches!(
        formula.get_bounds(&lower, &upper, None, true),
        Err(LinError::SubstitutionCycle)
    ));
}

#[test]
fn ordered_bounds_reevaluate_signs_at_each_step() {
    // substituting a's upper bound introduces b negatively, so b must take
    // its own lower bound to keep the result an upper bound
    let formula = lf("a");
    let lower = binds(&[("b", "0")]);
    let upper = binds(&[("a", "k - b"), ("b", "5")]);

    let (_, high) = formula
        .get_bounds(&lower, &upper, Some(&["a", "b"]), false)
        .unwrap();
    assert_eq!(high, lf("k"));

    // with a bound map for b only on the upper side, the lower side of the
    // formula picks b's upper bound where b appears negatively
    let formula = lf("a");
    let lower = binds(&[("a", "-b")]);
    let upper = binds(&[("a", "b - 1"), ("b", "10")]);

    let (low, high) = formula
        .get_bounds(&lower, &upper, Some(&["a", "b"]), false)
        .unwrap();
    assert_eq!(low, lf("-10"));
    assert_eq!(high, lf("9"));
}

#[test]
fn ordered_bounds_skip_variables_without_entries() {
    let formula = lf("a + c");
    let lower = binds(&[("a", "0")]);
    let upper = binds(&[("a", "1")]);

    let (low, high) = formula
        .get_bounds(&lower, &upper, Some(&["a", "z"]), false)
        .unwrap();
    assert_eq!(low, lf("c"));
    assert_eq!(high, lf("1 + c"));
}

#[test]
fn order_and_recursion_are_mutually_exclusive() {
    let formula = lf("a");
    let bounds = binds(&[("a", "1")]);

    assert!(matches!(
        formula.get_bounds(&bounds, &bounds, Some(&["a"]), true),
        Err(LinError::Unsupported(_))
    ));
}
