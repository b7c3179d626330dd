//! # slate-formula
//!
//! Formula parser and evaluator for slate.
//!
//! This crate provides:
//! - Formula parsing (text → AST)
//! - Formula evaluation (AST → value, with explain traces)
//! - Built-in functions: SUM, AVG, MIN, MAX, COUNT, IF
//! - Dependency tracking with cycle detection and topological ordering
//! - Sheet and cell storage the evaluator runs against
//!
//! ## Example
//!
//! ```rust
//! use slate_core::{CellAddress, CellValue};
//! use slate_formula::{evaluate_cell, parse, Cell, Sheet};
//!
//! let mut sheet = Sheet::new("s1", "Demo", 100, 26).unwrap();
//! sheet
//!     .set_cell(
//!         CellAddress::parse("A1").unwrap(),
//!         Cell::Literal(CellValue::Number(2.0)),
//!     )
//!     .unwrap();
//! sheet
//!     .set_cell(
//!         CellAddress::parse("B1").unwrap(),
//!         Cell::Formula {
//!             src: "A1*21".to_string(),
//!             ast: parse("A1*21").unwrap(),
//!             cached: None,
//!         },
//!     )
//!     .unwrap();
//!
//! let result = evaluate_cell(&sheet, CellAddress::parse("B1").unwrap(), false);
//! assert_eq!(result.result.unwrap(), CellValue::Number(42.0));
//! ```

pub mod ast;
pub mod dependency;
pub mod error;
pub mod evaluator;
mod functions;
pub mod lexer;
pub mod parser;
pub mod sheet;

pub use ast::{BinaryOperator, FormulaAst, StaticRefs, UnaryOperator};
pub use dependency::{DependencyGraph, EvaluationOrder};
pub use error::{FormulaError, FormulaResult};
pub use evaluator::{evaluate_cell, CellEvaluation, ExplainTrace};
pub use parser::parse;
pub use sheet::{Cell, Sheet};
