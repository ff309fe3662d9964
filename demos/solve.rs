use lincas::{LinearRelation, Result};

fn main() -> Result<()> {
    let relation: LinearRelation = "2a + 3b - 4 == 4c - 2d + b".parse()?;

    println!("relation: {relation}");
    println!("solved:   {}", relation.solve());
    println!("mod 2:    {}", relation.modulo(2)?.zip());
    println!("status:   {}", relation.status());
    println!("b alone:  {}", relation.expose("b")?);
    Ok(())
}
