//! # slate
//!
//! A spreadsheet formula engine: formula parsing, dependency tracking,
//! cycle detection, and ordered recalculation.
//!
//! ## Features
//!
//! - A1-style address algebra with absolute/relative markers
//! - Recursive descent formula parser with spreadsheet precedence rules
//! - Dependency graph with cycle pre-checks and topological ordering
//! - AST evaluator with a typed error taxonomy (CYCLE, REF, PARSE, DIV0)
//! - Built-in functions: SUM, AVG, MIN, MAX, COUNT, IF
//! - Explain traces for debugging a cell's evaluation
//!
//! ## Example
//!
//! ```rust
//! use slate::prelude::*;
//!
//! let mut sheet = Sheet::new("s1", "Budget", 100, 26).unwrap();
//! let mut engine = Engine::new();
//!
//! let a1 = CellAddress::parse("A1").unwrap();
//! let a2 = CellAddress::parse("A2").unwrap();
//! let a3 = CellAddress::parse("A3").unwrap();
//!
//! engine
//!     .apply_edit(&mut sheet, a1, CellEdit::Literal(CellValue::Number(10.0)))
//!     .unwrap();
//! engine
//!     .apply_edit(&mut sheet, a2, CellEdit::Literal(CellValue::Number(20.0)))
//!     .unwrap();
//! engine
//!     .apply_edit(&mut sheet, a3, CellEdit::Formula("=SUM(A1:A2)".to_string()))
//!     .unwrap();
//!
//! match sheet.get_cell(a3) {
//!     Some(Cell::Formula { cached: Some(result), .. }) => {
//!         assert_eq!(result.value, Some(CellValue::Number(30.0)));
//!     }
//!     _ => unreachable!(),
//! }
//! ```

pub mod engine;
pub mod prelude;
pub mod store;

// Re-export engine types
pub use engine::{CellEdit, Engine};
pub use store::SheetStore;

// Re-export core types
pub use slate_core::{
    CellAddress, CellError, CellRange, CellValue, Direction, Error, ErrorCode, EvalResult, Result,
    MAX_COLS, MAX_ROWS,
};

// Re-export formula types
pub use slate_formula::{
    evaluate_cell, parse, Cell, CellEvaluation, DependencyGraph, EvaluationOrder, ExplainTrace,
    FormulaAst, FormulaError, Sheet,
};
