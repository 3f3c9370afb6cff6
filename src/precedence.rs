use std::collections::HashMap;

#[derive(Debug, PartialEq, Clone, thiserror::Error)]
pub enum PrecedenceError {
    #[error("expected OP=PRECEDENCE, got {0:?}")]
    Malformed(String),
    #[error("operator must be a single character, got {0:?}")]
    InvalidOperator(String),
    #[error("invalid precedence {0:?}")]
    InvalidPrecedence(String),
}

/// Binding strength of every binary operator the parser accepts.
///
/// Higher binds tighter. A character that is missing, or mapped to 0, does
/// not continue a binary expression.
#[derive(Debug, PartialEq, Clone)]
pub struct PrecedenceTable {
    operators: HashMap<char, u32>,
}

impl PrecedenceTable {
    /// a table with no operators at all
    pub fn empty() -> Self {
        Self {
            operators: HashMap::new(),
        }
    }

    /// the baseline operators every session starts with
    pub fn seeded() -> Self {
        let mut table = Self::empty();
        table.set('<', 10);
        table.set('+', 20);
        table.set('-', 30);
        table.set('*', 40);
        table
    }

    pub fn set(&mut self, operator: char, precedence: u32) {
        self.operators.insert(operator, precedence);
    }

    pub fn get(&self, operator: char) -> Option<u32> {
        self.operators
            .get(&operator)
            .copied()
            .filter(|&precedence| precedence > 0)
    }

    pub fn remove(&mut self, operator: char) -> Option<u32> {
        self.operators.remove(&operator)
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, u32)> + '_ {
        self.operators.iter().map(|(&op, &prec)| (op, prec))
    }

    /// apply an override written as `OP=PRECEDENCE`, e.g. `/=40`
    pub fn apply_override(&mut self, entry: &str) -> Result<(), PrecedenceError> {
        let (operator, precedence) = parse_override(entry)?;
        self.set(operator, precedence);
        Ok(())
    }
}

impl Default for PrecedenceTable {
    fn default() -> Self {
        Self::seeded()
    }
}

/// split `OP=PRECEDENCE` into its operator and precedence
pub fn parse_override(entry: &str) -> Result<(char, u32), PrecedenceError> {
    // the operator may itself be '=', so split on the last one
    let split = entry
        .rfind('=')
        .ok_or_else(|| PrecedenceError::Malformed(entry.to_string()))?;
    let (op, prec) = (&entry[..split], &entry[split + 1..]);

    let mut chars = op.chars();
    let operator = match (chars.next(), chars.next()) {
        (Some(c), None) => c,
        _ => return Err(PrecedenceError::InvalidOperator(op.to_string())),
    };
    let precedence = prec
        .trim()
        .parse()
        .map_err(|_| PrecedenceError::InvalidPrecedence(prec.to_string()))?;

    Ok((operator, precedence))
}
