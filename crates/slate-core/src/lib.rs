//! # slate-core
//!
//! Core data structures for the slate spreadsheet formula engine.
//!
//! This crate provides the fundamental vocabulary shared by the parser,
//! evaluator, and orchestrator:
//! - [`CellAddress`] and [`CellRange`] - A1-style addressing and ranges
//! - [`CellValue`] - scalar cell values (numbers, strings, booleans, blank)
//! - [`ErrorCode`], [`CellError`], [`EvalResult`] - the cell-level error
//!   taxonomy (CYCLE, REF, PARSE, DIV0)
//!
//! ## Example
//!
//! ```rust
//! use slate_core::{CellAddress, CellRange};
//!
//! let addr = CellAddress::parse("$B$2").unwrap();
//! assert_eq!(addr.to_a1_string(), "$B$2");
//!
//! // Ranges enumerate column-major
//! let cells: Vec<String> = CellRange::parse("A1:B2")
//!     .unwrap()
//!     .cells()
//!     .map(|a| a.to_string())
//!     .collect();
//! assert_eq!(cells, vec!["A1", "A2", "B1", "B2"]);
//! ```

pub mod address;
pub mod error;
pub mod value;

// Re-exports for convenience
pub use address::{CellAddress, CellRange, Direction};
pub use error::{Error, Result};
pub use value::{CellError, CellValue, ErrorCode, EvalResult};

/// Maximum number of rows in a sheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a sheet (Excel limit)
pub const MAX_COLS: u16 = 16_384;
