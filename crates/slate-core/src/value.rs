//! Cell values and the evaluation error taxonomy

use std::fmt;

/// A scalar cell value
///
/// `Empty` is the evaluator-level "blank" produced by referencing a cell
/// that holds nothing; literal cells never store it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellValue {
    /// Blank (empty cell)
    Empty,
    /// Numeric value (all numbers stored as f64)
    Number(f64),
    /// String value
    Text(String),
    /// Boolean value (TRUE/FALSE)
    Boolean(bool),
}

impl CellValue {
    /// Check if the value is blank
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Numeric coercion: blank -> 0, boolean -> 1/0, numeric string -> its
    /// parsed number. Non-numeric strings are `None` (an error in arithmetic
    /// contexts, never silently 0).
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Empty => Some(0.0),
            CellValue::Number(n) => Some(*n),
            CellValue::Boolean(true) => Some(1.0),
            CellValue::Boolean(false) => Some(0.0),
            CellValue::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Boolean coercion: blank -> false, number -> `!= 0`, the strings
    /// "TRUE"/"FALSE" (any case) -> their value. Anything else is `None`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Empty => Some(false),
            CellValue::Boolean(b) => Some(*b),
            CellValue::Number(n) => Some(*n != 0.0),
            CellValue::Text(s) => match s.to_uppercase().as_str() {
                "TRUE" => Some(true),
                "FALSE" => Some(false),
                _ => None,
            },
        }
    }

    /// Type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            CellValue::Empty => "blank",
            CellValue::Number(_) => "number",
            CellValue::Text(_) => "string",
            CellValue::Boolean(_) => "boolean",
        }
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Empty
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Number(n) => {
                // Integral values print without a trailing fraction
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Boolean(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

/// Error codes surfaced on cells and evaluation results
///
/// Every cell-level failure is one of these four; none is process-fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorCode {
    /// Circular dependency detected
    Cycle,
    /// Out-of-bounds or otherwise invalid reference
    Ref,
    /// Malformed formula, unknown function, or uncoercible operand
    Parse,
    /// Division by zero or empty-domain aggregate
    Div0,
}

impl ErrorCode {
    /// Wire representation of the code
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Cycle => "CYCLE",
            ErrorCode::Ref => "REF",
            ErrorCode::Parse => "PARSE",
            ErrorCode::Div0 => "DIV0",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A cell-level error: code plus human-readable message
///
/// Contagious through evaluation: referencing an erroring cell propagates
/// the error unchanged rather than re-deriving it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[error("{code}: {message}")]
pub struct CellError {
    pub code: ErrorCode,
    pub message: String,
}

impl CellError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn cycle(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Cycle, message)
    }

    pub fn reference(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Ref, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Parse, message)
    }

    pub fn div0(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Div0, message)
    }
}

/// Outcome of evaluating one cell: a value or exactly one error, never both
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EvalResult {
    /// Evaluated value; `None` when the evaluation errored
    pub value: Option<CellValue>,
    /// Evaluation error, if any
    pub error: Option<CellError>,
}

impl EvalResult {
    /// Successful result
    pub fn value(value: CellValue) -> Self {
        Self {
            value: Some(value),
            error: None,
        }
    }

    /// Failed result
    pub fn error(error: CellError) -> Self {
        Self {
            value: None,
            error: Some(error),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

impl From<Result<CellValue, CellError>> for EvalResult {
    fn from(result: Result<CellValue, CellError>) -> Self {
        match result {
            Ok(value) => EvalResult::value(value),
            Err(error) => EvalResult::error(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(CellValue::Empty.as_number(), Some(0.0));
        assert_eq!(CellValue::Number(2.5).as_number(), Some(2.5));
        assert_eq!(CellValue::Boolean(true).as_number(), Some(1.0));
        assert_eq!(CellValue::Boolean(false).as_number(), Some(0.0));
        assert_eq!(CellValue::from("42").as_number(), Some(42.0));
        assert_eq!(CellValue::from(" 3.5 ").as_number(), Some(3.5));
        assert_eq!(CellValue::from("abc").as_number(), None);
    }

    #[test]
    fn test_boolean_coercion() {
        assert_eq!(CellValue::Empty.as_bool(), Some(false));
        assert_eq!(CellValue::Number(0.0).as_bool(), Some(false));
        assert_eq!(CellValue::Number(-1.5).as_bool(), Some(true));
        assert_eq!(CellValue::from("true").as_bool(), Some(true));
        assert_eq!(CellValue::from("FALSE").as_bool(), Some(false));
        assert_eq!(CellValue::from("yes").as_bool(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(CellValue::Number(42.0).to_string(), "42");
        assert_eq!(CellValue::Number(3.14).to_string(), "3.14");
        assert_eq!(CellValue::Boolean(true).to_string(), "TRUE");
        assert_eq!(CellValue::Empty.to_string(), "");
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(ErrorCode::Cycle.as_str(), "CYCLE");
        assert_eq!(ErrorCode::Div0.as_str(), "DIV0");
        let err = CellError::div0("division by zero");
        assert_eq!(err.to_string(), "DIV0: division by zero");
    }

    #[test]
    fn test_eval_result_exclusivity() {
        let ok = EvalResult::value(CellValue::Number(1.0));
        assert!(ok.value.is_some() && ok.error.is_none());

        let err = EvalResult::error(CellError::parse("bad"));
        assert!(err.value.is_none() && err.error.is_some());
    }
}
