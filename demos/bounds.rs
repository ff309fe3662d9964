use lincas::{Bindings, LinearFormula, Result};

fn bindings(pairs: &[(&str, &str)]) -> Bindings {
    pairs
        .iter()
        .map(|(variable, formula)| (variable.to_string(), formula.parse().unwrap()))
        .collect()
}

fn main() -> Result<()> {
    let formula: LinearFormula = "2a - 3b + c".parse()?;
    let lower = bindings(&[("a", "1"), ("b", "0"), ("c", "b")]);
    let upper = bindings(&[("a", "k"), ("b", "k"), ("c", "2k")]);

    let (low, high) = formula.get_bounds(&lower, &upper, None, false)?;
    println!("{low} <= {formula} <= {high}");
    Ok(())
}
