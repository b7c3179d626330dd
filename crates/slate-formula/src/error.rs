//! Formula error types

use slate_core::CellError;
use thiserror::Error;

/// Result type for lexing and parsing
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors produced while turning formula text into an AST
///
/// All variants are PARSE-class: they convert into a [`CellError`] with code
/// `PARSE` when stored on a cell.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    /// General parse failure
    #[error("Parse error: {0}")]
    Parse(String),

    /// Token that does not fit the grammar at this position
    #[error("Unexpected token: {0}")]
    UnexpectedToken(String),

    /// Character the lexer does not recognize
    #[error("Unexpected character '{0}' at position {1}")]
    UnexpectedChar(char, usize),

    /// Input ended mid-expression
    #[error("Unexpected end of formula")]
    UnexpectedEof,
}

impl From<FormulaError> for CellError {
    fn from(err: FormulaError) -> Self {
        CellError::parse(err.to_string())
    }
}
