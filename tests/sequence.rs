use std::collections::HashSet;

use num_bigint::BigInt;

use lincas::{Bindings, LinearFormula, LinearRelation, NTermRecursionSequence};

fn lf(input: &str) -> LinearFormula {
    input.parse().expect("parse formula")
}

fn rel(input: &str) -> LinearRelation {
    input.parse().expect("parse relation")
}

fn seq(formulas: &[&str]) -> NTermRecursionSequence {
    NTermRecursionSequence::from_strs(formulas).expect("parse sequence")
}

fn binds(pairs: &[(&str, &str)]) -> Bindings {
    pairs
        .iter()
        .map(|(variable, formula)| (variable.to_string(), lf(formula)))
        .collect()
}

#[test]
fn construction_defaults() {
    let sequence = seq(&["a + b", "3i + 4", "4i"]);
    assert_eq!(sequence.n(), 3);
    assert_eq!(sequence.ntuple_index(), "i");
    assert_eq!(sequence.length(), None);
    assert_eq!(sequence.formulas()[1], lf("3i + 4"));

    let sequence = seq(&["i"])
        .with_ntuple_index("xxx")
        .unwrap()
        .with_length(lf("4k"))
        .unwrap();
    assert_eq!(sequence.ntuple_index(), "xxx");
    assert_eq!(sequence.length(), Some(&lf("4k")));
}

#[test]
fn display_shows_index_formulas_and_length() {
    assert_eq!(
        seq(&["a + b", "3i + 4", "4i"]).to_string(),
        "3-TRSeq(i->|a + b, 3i + 4, 4i|->inf)"
    );
    assert_eq!(seq(&["i"]).to_string(), "1-TRSeq(i->|i|->inf)");

    let sequence = seq(&["1", "a"])
        .with_ntuple_index("j")
        .unwrap()
        .with_length(lf("5l"))
        .unwrap();
    assert_eq!(sequence.to_string(), "2-TRSeq(j->|1, a|->5l)");
}

#[test]
fn equality_covers_formulas_index_and_length() {
    let make = |index: &str, length: &str| {
        seq(&["a + b", "3i + 4", "4i"])
            .with_ntuple_index(index)
            .unwrap()
            .with_length(lf(length))
            .unwrap()
    };

    assert_eq!(make("i", "5l"), make("i", "5l"));
    assert_ne!(make("i", "5l"), make("j", "5l"));
    assert_ne!(make("i", "4k"), make("i", "5k"));
    assert_ne!(seq(&["a + b"]), seq(&["b + a"]));
    assert_ne!(seq(&["2i", "2i", "2i"]), seq(&["2i", "2i"]));
}

#[test]
fn zip_simplifies_formulas_and_length() {
    let sequence = seq(&["a + b + a", "3i + 4i", "4i"])
        .with_length(lf("3k + k"))
        .unwrap()
        .zip();
    assert_eq!(sequence.formulas()[0], lf("2a + b"));
    assert_eq!(sequence.formulas()[1], lf("7i"));
    assert_eq!(sequence.length(), Some(&lf("4k")));
}

#[test]
fn substitute_covers_length_unless_formulas_only() {
    let sequence = seq(&["a + b", "3i + 4", "4i"]).with_length(lf("3a")).unwrap();
    let bindings = binds(&[("a", "x + 2")]);

    let substituted = sequence.substitute(&bindings, false, false).unwrap();
    assert_eq!(substituted.formulas()[0], lf("x + 2 + b"));
    assert_eq!(substituted.length(), Some(&lf("3x + 6")));

    let substituted = sequence.substitute(&bindings, true, false).unwrap();
    assert_eq!(substituted.formulas()[0], lf("x + 2 + b"));
    assert_eq!(substituted.length(), Some(&lf("3a")));
}

#[test]
fn substitute_protects_the_tuple_index() {
    let sequence = seq(&["a + i", "b - i"]).with_length(lf("a + b")).unwrap();

    // a replacement using the tuple index would leak it into the length
    assert!(sequence.substitute(&binds(&[("a", "3i")]), false, false).is_err());

    let substituted = sequence.substitute(&binds(&[("a", "3i")]), true, false).unwrap();
    assert_eq!(substituted.formulas()[0], lf("3i + i"));
    assert_eq!(substituted.length(), Some(&lf("a + b")));
}

#[test]
fn substitute_recursive_resolves_chains_per_formula() {
    let cases: Vec<(&[&str], Vec<(&str, &str)>, &[&str])> = vec![
        (&["a", "b", "c"], vec![("a", "b"), ("b", "c")], &["c", "c", "c"]),
        (&["a+b", "b+a"], vec![("a", "b"), ("b", "c")], &["2c", "2c"]),
        (&["a+b", "b+a+c"], vec![("a", "b"), ("b", "c")], &["2c", "3c"]),
        (&["a", "a+2", "b"], vec![("c", "d"), ("b", "c"), ("a", "b")], &["d", "d+2", "d"]),
    ];

    for (formulas, bindings, expected) in cases {
        let substituted = seq(formulas).substitute(&binds(&bindings), false, true).unwrap();
        let expected = seq(expected);
        for (actual, wanted) in substituted.formulas().iter().zip(expected.formulas()) {
            assert_eq!(actual.zip(), wanted.zip());
        }
    }
}

#[test]
fn set_length_validates_the_tuple_index() {
    let mut sequence = seq(&["i", "2i", "3i"]).with_length(lf("5k")).unwrap();

    sequence.set_length(Some(lf("8l + 2"))).unwrap();
    assert_eq!(sequence.length(), Some(&lf("8l + 2")));

    sequence.set_length(Some(lf("45"))).unwrap();
    assert_eq!(sequence.length(), Some(&lf("45")));

    assert!(sequence.set_length(Some(lf("3i + k"))).is_err());

    sequence.set_length(None).unwrap();
    assert_eq!(sequence.length(), None);
}

#[test]
fn set_ntuple_index_renames_through_the_formulas() {
    let mut sequence = seq(&["i", "2i", "3i"]).with_length(lf("5k")).unwrap();
    sequence.set_ntuple_index("j").unwrap();

    let expected = seq(&["j", "2j", "3j"])
        .with_ntuple_index("j")
        .unwrap()
        .with_length(lf("5k"))
        .unwrap();
    assert_eq!(sequence, expected);

    // `k` is taken by the length
    assert!(sequence.set_ntuple_index("k").is_err());
}

#[test]
fn formulas_str_renders_in_both_directions() {
    let sequence = seq(&["a + b", "3i + 4", "4i"]);
    assert_eq!(sequence.formulas_str(false), "a + b, 3i + 4, 4i");
    assert_eq!(sequence.formulas_str(true), "4i, 3i + 4, a + b");

    assert_eq!(seq(&["i"]).formulas_str(true), "i");
}

#[test]
fn evaluate_interleaves_the_formulas() {
    let cases: Vec<(&[&str], &str, usize, &str)> = vec![
        (&["a + b", "3i + 4", "4i"], "i", 4, "7"),
        (&["a + b", "3i + 4", "4i"], "i", 0, "a + b"),
        (&["a + b", "3i + 4", "4i"], "i", 1, "4"),
        (&["a + b", "3i + 4", "4i"], "i", 2, "0"),
        (&["i", "i"], "i", 0, "0"),
        (&["i", "i"], "i", 1, "0"),
        (&["i", "i"], "i", 2, "1"),
        (&["i"], "i", 4, "4"),
        (&["1", "a"], "i", 4, "1"),
        (&["a", "b"], "i", 4, "a"),
        (&["a + i", "b - i"], "i", 4, "a + 2"),
        (&["a + i", "b - i"], "i", 6, "a + 3"),
        (&["a + i", "b - i"], "i", 5, "b - 2"),
        (&["a + j", "b - j"], "j", 4, "a + 2"),
        (&["j", "j"], "j", 2, "1"),
        // a foreign variable is global and never receives the index value
        (&["i", "i"], "j", 2, "i"),
    ];

    for (formulas, index, position, expected) in cases {
        let sequence = seq(formulas).with_ntuple_index(index).unwrap();
        assert_eq!(
            sequence.evaluate(position),
            lf(expected).zip(),
            "element {position} of {formulas:?} over {index}"
        );
    }
}

#[test]
fn get_variables_distinguishes_global_and_zero() {
    let sequence = seq(&["a + b", "3i + 4", "4i"]).with_length(lf("4k")).unwrap();
    let all: HashSet<String> = ["a", "b", "i", "k"].iter().map(|s| s.to_string()).collect();
    assert_eq!(sequence.get_variables(false, false), all);

    let global: HashSet<String> = ["a", "b", "k"].iter().map(|s| s.to_string()).collect();
    assert_eq!(sequence.get_variables(false, true), global);

    let sequence = seq(&["a + 0i", "0b"]).with_length(lf("0a")).unwrap();
    let nonzero: HashSet<String> = ["a"].iter().map(|s| s.to_string()).collect();
    assert_eq!(sequence.get_variables(true, false), nonzero);
}

#[test]
fn tuple_index_inequalities_depend_on_the_last_formula() {
    let expected: [[&str; 3]; 3] = [
        ["3i+1 <= l", "3i+1 <= l-1", "3i+1 <= l-2"],
        ["3i+2 <= l-2", "3i+2 <= l", "3i+2 <= l-1"],
        ["3i+3 <= l-1", "3i+3 <= l-2", "3i+3 <= l"],
    ];

    let sequence = seq(&["1", "1", "1"]).with_length(lf("l")).unwrap();
    for no_formula in 0..3 {
        for no_last_formula in 0..3 {
            let actual = sequence
                .get_ntuple_index_inequality(no_formula, no_last_formula)
                .unwrap();
            let wanted = rel(expected[no_formula][no_last_formula]);
            assert!(
                wanted.equivalent(&actual),
                "inequality for formula {no_formula} ending at {no_last_formula}: got {actual}"
            );
        }
    }

    assert!(sequence.get_ntuple_index_inequality(3, 0).is_err());
    assert!(seq(&["1"]).get_ntuple_index_inequality(0, 0).is_err());
}

#[test]
fn tuple_index_inequalities_with_numeric_lengths() {
    let cases: Vec<(usize, i64, Vec<&str>)> = vec![
        (3, 3, vec!["i <= 0", "i <= 0", "i <= 0"]),
        (3, 4, vec!["i <= 1", "i <= 0", "i <= 0"]),
        (3, 5, vec!["i <= 1", "i <= 1", "i <= 0"]),
        (3, 6, vec!["i <= 1", "i <= 1", "i <= 1"]),
        (3, 7, vec!["i <= 2", "i <= 1", "i <= 1"]),
        (4, 6, vec!["i <= 1", "i <= 1", "i <= 0", "i <= 0"]),
        (5, 12, vec!["i <= 2", "i <= 2", "i <= 1", "i <= 1", "i <= 1"]),
    ];

    for (n, length, expected) in cases {
        let formulas = vec!["1"; n];
        let sequence = seq(&formulas).with_length(LinearFormula::from(length)).unwrap();
        let no_last_formula = ((length - 1) % n as i64) as usize;

        for (no_formula, wanted) in expected.iter().enumerate() {
            let actual = sequence
                .get_ntuple_index_inequality(no_formula, no_last_formula)
                .unwrap();
            assert!(
                rel(wanted).equivalent(&actual),
                "n = {n}, length = {length}, formula {no_formula}: got {actual}"
            );
        }
    }
}

#[test]
fn length_mod_n_when_determined() {
    let cases = vec![(3, "3", 0), (3, "6k + 2", 2), (5, "5k + 3", 3)];
    for (n, length, expected) in cases {
        let formulas = vec!["1"; n];
        let sequence = seq(&formulas).with_length(lf(length)).unwrap();
        assert_eq!(sequence.get_length_mod_n().unwrap(), BigInt::from(expected));
    }

    let ambiguous = vec![(3, "2l"), (3, "7k + 2"), (5, "4k + 3")];
    for (n, length) in ambiguous {
        let formulas = vec!["1"; n];
        let sequence = seq(&formulas).with_length(lf(length)).unwrap();
        assert!(sequence.get_length_mod_n().is_err());
    }

    assert!(seq(&["1"]).get_length_mod_n().is_err());
}

#[test]
fn tuple_index_bounds_from_numeric_lengths() {
    let cases: Vec<(usize, i64, Vec<i64>)> = vec![
        (3, 3, vec![0, 0, 0]),
        (3, 4, vec![1, 0, 0]),
        (3, 5, vec![1, 1, 0]),
        (3, 6, vec![1, 1, 1]),
        (3, 7, vec![2, 1, 1]),
        (4, 4, vec![0, 0, 0, 0]),
        (4, 6, vec![1, 1, 0, 0]),
        (4, 9, vec![2, 1, 1, 1]),
        (5, 12, vec![2, 2, 1, 1, 1]),
    ];

    for (n, length, expected) in cases {
        let formulas = vec!["1"; n];
        let sequence = seq(&formulas).with_length(LinearFormula::from(length)).unwrap();
        for (no_formula, bound) in expected.iter().enumerate() {
            assert_eq!(
                sequence.get_ntuple_index_bound(no_formula).unwrap(),
                LinearFormula::from(*bound),
                "bound for formula {no_formula} with n = {n}, length = {length}"
            );
        }
    }

    let symbolic = seq(&["1", "1", "1"]).with_length(lf("6k + 2")).unwrap();
    assert!(symbolic.get_ntuple_index_bound(0).is_err());
}

#[test]
fn edges_wrap_into_the_next_tuple() {
    let cases: Vec<(&[&str], &[&str])> = vec![
        (&["1", "1", "1"], &["2", "2", "2"]),
        (&["i", "i+1", "i+2"], &["2i+1", "2i+3", "2i+3"]),
        (&["i-1", "i-2"], &["2i-3", "2i-2"]),
    ];

    for (formulas, expected) in cases {
        let sequence = seq(formulas);
        for (index, wanted) in expected.iter().enumerate() {
            assert_eq!(
                sequence.get_edge(index).unwrap().zip(),
                lf(wanted).zip(),
                "edge {index} of {formulas:?}"
            );
        }
        // the receiver is untouched
        assert_eq!(sequence, seq(formulas));
    }

    assert!(seq(&["1", "1"]).get_edge(2).is_err());
}
