//! Sheet and cell types
//!
//! A sheet is a sparse grid: only cells that have ever been written occupy
//! storage. Reading an unwritten in-bounds address yields a blank.

use ahash::AHashMap;
use chrono::{DateTime, Utc};
use slate_core::{CellAddress, CellError, CellValue, Error, EvalResult, Result, MAX_COLS, MAX_ROWS};

use crate::ast::FormulaAst;

/// Content of a single cell
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Cell {
    /// A plain value entered directly
    Literal(CellValue),
    /// A parsed formula and its most recent evaluation
    Formula {
        /// Source text as entered, without the leading `=`
        src: String,
        ast: FormulaAst,
        /// Result of the last recalculation, `None` until evaluated
        cached: Option<EvalResult>,
    },
    /// A stored error, e.g. a formula that failed to parse
    Error(CellError),
}

impl Cell {
    /// True if the cell holds a formula
    pub fn is_formula(&self) -> bool {
        matches!(self, Cell::Formula { .. })
    }
}

/// A single sheet of cells
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sheet {
    id: String,
    name: String,
    rows: u32,
    cols: u16,
    cells: AHashMap<CellAddress, Cell>,
    updated_at: DateTime<Utc>,
}

impl Sheet {
    /// Create a new empty sheet
    ///
    /// The name must be non-empty and the dimensions must be at least 1x1
    /// and within the grid limits.
    pub fn new<I: Into<String>, S: Into<String>>(id: I, name: S, rows: u32, cols: u16) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::InvalidSheetName(name));
        }
        if rows == 0 || cols == 0 || rows > MAX_ROWS || cols > MAX_COLS {
            return Err(Error::InvalidDimensions(rows, cols));
        }

        Ok(Self {
            id: id.into(),
            name,
            rows,
            cols,
            cells: AHashMap::new(),
            updated_at: Utc::now(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    /// Time of the last cell mutation
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Whether an address falls inside this sheet's grid
    pub fn is_in_bounds(&self, addr: CellAddress) -> bool {
        addr.is_in_bounds(self.rows, self.cols)
    }

    /// Get a cell, `None` if never written
    pub fn get_cell(&self, addr: CellAddress) -> Option<&Cell> {
        self.cells.get(&addr)
    }

    /// Write a cell
    pub fn set_cell(&mut self, addr: CellAddress, cell: Cell) -> Result<()> {
        self.check_bounds(addr)?;
        self.cells.insert(addr, cell);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Remove a cell, returning its previous content
    pub fn clear_cell(&mut self, addr: CellAddress) -> Result<Option<Cell>> {
        self.check_bounds(addr)?;
        let prev = self.cells.remove(&addr);
        self.updated_at = Utc::now();
        Ok(prev)
    }

    /// Number of occupied cells
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Iterate over all occupied cells, in storage order
    pub fn cells(&self) -> impl Iterator<Item = (&CellAddress, &Cell)> {
        self.cells.iter()
    }

    /// Iterate over the addresses of all formula cells
    pub fn formula_cells(&self) -> impl Iterator<Item = CellAddress> + '_ {
        self.cells
            .iter()
            .filter(|(_, cell)| cell.is_formula())
            .map(|(addr, _)| *addr)
    }

    /// Update the cached result on a formula cell
    ///
    /// Has no effect if the address holds anything other than a formula.
    pub fn set_cached_result(&mut self, addr: CellAddress, result: EvalResult) {
        if let Some(Cell::Formula { cached, .. }) = self.cells.get_mut(&addr) {
            *cached = Some(result);
            self.updated_at = Utc::now();
        }
    }

    fn check_bounds(&self, addr: CellAddress) -> Result<()> {
        if addr.row >= self.rows {
            return Err(Error::RowOutOfBounds(addr.row, self.rows));
        }
        if addr.col >= self.cols {
            return Err(Error::ColumnOutOfBounds(addr.col as u32, self.cols));
        }
        Ok(())
    }
}
