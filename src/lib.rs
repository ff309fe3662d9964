//! Symbolic algebra primitives for linear integer formulas, relations between
//! them, and the cycle vertex-numbering patterns built on top of the algebra.

mod bounds;
pub mod case;
pub mod error;
pub mod formula;
pub mod numbering;
pub mod parser;
pub mod relation;
pub mod sequence;

pub use case::{Case, CycleCase};
pub use error::{LinError, Result};
pub use formula::{Bindings, LinearFormula, Term, Valuation};
pub use numbering::{CentralVertexNumbering, Side};
pub use parser::{parse_formula, parse_relation};
pub use relation::{LinearRelation, Relation, Status};
pub use sequence::NTermRecursionSequence;
