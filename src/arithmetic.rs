//! Arithmetic module
//!
//! Operand parsing and the seven stateless operations behind `/api/<op>`.

use thiserror::Error;

/// Operand could not be turned into a finite `f64`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperandError {
    #[error("operand '{0}' is missing")]
    Missing(&'static str),
    #[error("operand '{name}' is not a finite decimal number: '{text}'")]
    Invalid { name: &'static str, text: String },
}

/// Operands parsed fine but the operation is undefined for them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ArithmeticError {
    #[error("Division by zero is not allowed.")]
    DivisionByZero,
    #[error("Modulo by zero is not allowed.")]
    ModuloByZero,
    #[error("Square root of a negative number is not allowed.")]
    NegativeSquareRoot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
    Exponent,
    Sqrt,
    Modulo,
}

impl Operation {
    pub const ALL: [Self; 7] = [
        Self::Add,
        Self::Subtract,
        Self::Multiply,
        Self::Divide,
        Self::Exponent,
        Self::Sqrt,
        Self::Modulo,
    ];

    /// Look up an operation by its path segment
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Subtract => "subtract",
            Self::Multiply => "multiply",
            Self::Divide => "divide",
            Self::Exponent => "exponent",
            Self::Sqrt => "sqrt",
            Self::Modulo => "modulo",
        }
    }

    /// Query parameter names this operation reads
    pub const fn operand_names(self) -> &'static [&'static str] {
        match self {
            Self::Sqrt => &["num"],
            _ => &["num1", "num2"],
        }
    }

    /// Run the operation on already-parsed operands.
    ///
    /// Non-finite results (overflow, fractional power of a negative base)
    /// are returned as-is.
    pub fn apply(self, a: f64, b: f64) -> Result<f64, ArithmeticError> {
        match self {
            Self::Add => Ok(a + b),
            Self::Subtract => Ok(a - b),
            Self::Multiply => Ok(a * b),
            Self::Divide if b == 0.0 => Err(ArithmeticError::DivisionByZero),
            Self::Divide => Ok(a / b),
            Self::Exponent => Ok(a.powf(b)),
            Self::Sqrt if a < 0.0 => Err(ArithmeticError::NegativeSquareRoot),
            Self::Sqrt => Ok(a.sqrt()),
            Self::Modulo if b == 0.0 => Err(ArithmeticError::ModuloByZero),
            // `%` keeps the sign of the dividend
            Self::Modulo => Ok(a % b),
        }
    }
}

/// Parse one operand.
///
/// The whole text must be a Rust `f64` literal and the value must be finite:
/// empty, padded, `12abc`, `NaN` and `inf` are all rejected.
pub fn parse_operand(name: &'static str, text: Option<&str>) -> Result<f64, OperandError> {
    let text = text.ok_or(OperandError::Missing(name))?;
    text.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| OperandError::Invalid {
            name,
            text: text.to_string(),
        })
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error(transparent)]
    Operand(#[from] OperandError),
    #[error(transparent)]
    Arithmetic(#[from] ArithmeticError),
}

/// Parse the operands `lookup` yields, then apply.
///
/// Operand errors win over domain errors; unary operations see `b == 0.0`.
pub fn evaluate<'a>(
    op: Operation,
    lookup: impl Fn(&str) -> Option<&'a str>,
) -> Result<f64, EvalError> {
    let mut values = [0.0; 2];
    for (slot, &name) in values.iter_mut().zip(op.operand_names()) {
        *slot = parse_operand(name, lookup(name))?;
    }
    Ok(op.apply(values[0], values[1])?)
}
