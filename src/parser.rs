//! Character-driven scanners turning text into formulas and relations.

use num_bigint::BigInt;

use crate::error::{LinError, Result};
use crate::formula::LinearFormula;
use crate::relation::{LinearRelation, Relation};

/// Parses a formula written as a sequence of signed terms, e.g.
/// `"a + 3b - 4c"`. The grammar per term is `[+|-] [digits] [identifier]`;
/// a missing sign means `+`, missing digits mean a coefficient of `1`, and a
/// term without an identifier is a constant.
pub fn parse_formula(input: &str) -> Result<LinearFormula> {
    let mut scanner = Scanner::new();
    for c in input.chars() {
        scanner.process(c);
    }
    // a trailing space flushes the final in-progress term
    scanner.process(' ');
    Ok(scanner.finish())
}

/// Parses a relation of two formulas joined by one of `==, <=, >=, <, >, =`
/// (a bare `=` reads as `==`). Exactly one operator must split the text into
/// two sides.
pub fn parse_relation(input: &str) -> Result<LinearRelation> {
    const OPERATORS: [(&str, Relation); 6] = [
        ("==", Relation::Eq),
        ("<=", Relation::Le),
        (">=", Relation::Ge),
        ("<", Relation::Lt),
        (">", Relation::Gt),
        ("=", Relation::Eq),
    ];

    for (symbol, relation) in OPERATORS {
        let sides: Vec<&str> = input.split(symbol).collect();
        if sides.len() == 2 {
            let left = parse_formula(sides[0])?;
            let right = parse_formula(sides[1])?;
            return Ok(LinearRelation::with_relation(left, right, relation));
        }
    }

    Err(LinError::Parse(format!(
        "`{input}` cannot be read as a relation"
    )))
}

#[derive(Clone, Copy, PartialEq)]
enum Phase {
    Operation,
    Multiplier,
    Variable,
}

#[derive(Clone, Copy, PartialEq)]
enum CharKind {
    Space,
    Operator,
    Digit,
    Other,
}

fn kind_of(c: char) -> CharKind {
    if c.is_ascii_digit() {
        CharKind::Digit
    } else if c == ' ' {
        CharKind::Space
    } else if c == '+' || c == '-' {
        CharKind::Operator
    } else {
        CharKind::Other
    }
}

/// Three-phase automaton cycling `Operation -> Multiplier -> Variable` once
/// per term. Each phase consumes the characters it recognizes and hands the
/// first foreign character over to the next phase.
struct Scanner {
    terms: LinearFormula,
    phase: Phase,
    negative: bool,
    multiplier: Option<BigInt>,
    variable: Option<String>,
}

impl Scanner {
    fn new() -> Self {
        Scanner {
            terms: LinearFormula::new(),
            phase: Phase::Operation,
            negative: false,
            multiplier: None,
            variable: None,
        }
    }

    fn reset(&mut self) {
        self.phase = Phase::Operation;
        self.negative = false;
        self.multiplier = None;
        self.variable = None;
    }

    fn process(&mut self, c: char) {
        match self.phase {
            Phase::Operation => self.process_operation(c),
            Phase::Multiplier => self.process_multiplier(c),
            Phase::Variable => self.process_variable(c),
        }
    }

    fn process_operation(&mut self, c: char) {
        match kind_of(c) {
            // a space between terms carries no information, and skipping it
            // here keeps the automaton from cycling after a variable name
            CharKind::Space => {}
            // a later sign overwrites an earlier one, so "+ -b" reads as "-b"
            CharKind::Operator => self.negative = c == '-',
            _ => {
                self.phase = Phase::Multiplier;
                self.process_multiplier(c);
            }
        }
    }

    fn process_multiplier(&mut self, c: char) {
        if let Some(digit) = c.to_digit(10) {
            let digit = BigInt::from(digit);
            self.multiplier = Some(match self.multiplier.take() {
                None => digit,
                Some(value) => value * 10 + digit,
            });
        } else {
            let mut multiplier = self.multiplier.take().unwrap_or_else(|| BigInt::from(1));
            if self.negative {
                multiplier = -multiplier;
            }
            self.multiplier = Some(multiplier);
            self.phase = Phase::Variable;
            self.process_variable(c);
        }
    }

    fn process_variable(&mut self, c: char) {
        match kind_of(c) {
            // every identifier passes through the multiplier phase first, so
            // its leading character can never be a digit; later digits are
            // part of the name
            CharKind::Other | CharKind::Digit => {
                self.variable.get_or_insert_with(String::new).push(c);
            }
            CharKind::Space | CharKind::Operator => {
                let multiplier = self.multiplier.take().unwrap_or_else(|| BigInt::from(1));
                let variable = self.variable.take().unwrap_or_default();
                self.terms.add_segment_in_place(multiplier, &variable);
                self.reset();
                self.process_operation(c);
            }
        }
    }

    fn finish(self) -> LinearFormula {
        self.terms
    }
}
