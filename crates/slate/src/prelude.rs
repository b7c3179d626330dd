//! Prelude module - common imports for slate users
//!
//! ```rust
//! use slate::prelude::*;
//! ```

pub use crate::{
    // Cell types
    Cell,
    CellAddress,
    // Edit types
    CellEdit,
    CellError,
    CellRange,
    CellValue,
    // Main types
    Engine,
    // Error types
    Error,
    ErrorCode,
    EvalResult,
    ExplainTrace,
    FormulaAst,
    Result,
    Sheet,
    SheetStore,
};
