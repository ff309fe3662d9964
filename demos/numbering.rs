use lincas::{CentralVertexNumbering, NTermRecursionSequence, Result, Side};

fn main() -> Result<()> {
    let left = NTermRecursionSequence::from_strs(&["2i + 1", "4i + 2"])?;
    let right = NTermRecursionSequence::from_strs(&["3i + 2", "6i + 4"])?;
    let pattern = CentralVertexNumbering::new("4k".parse()?, left, right)?;

    println!("pattern: {pattern}");
    for offset in -3..=3 {
        println!("v[{offset}] = {}", pattern.evaluate(offset));
    }
    println!("first right edge: {}", pattern.get_edge(Side::Right, 0)?.zip());
    Ok(())
}
