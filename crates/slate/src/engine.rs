//! Recalculation engine
//!
//! Applies cell edits to a sheet, keeps the dependency graph in step with
//! each formula write, and recomputes the affected transitive-dependent
//! closure in topological order.
//!
//! # Example
//!
//! ```rust
//! use slate::prelude::*;
//!
//! let mut sheet = Sheet::new("s1", "Demo", 100, 26).unwrap();
//! let mut engine = Engine::new();
//!
//! let a1 = CellAddress::parse("A1").unwrap();
//! let b1 = CellAddress::parse("B1").unwrap();
//! engine
//!     .apply_edit(&mut sheet, a1, CellEdit::Literal(CellValue::Number(10.0)))
//!     .unwrap();
//! engine
//!     .apply_edit(&mut sheet, b1, CellEdit::Formula("=A1*2".to_string()))
//!     .unwrap();
//!
//! let results = engine.evaluate_sheet(&mut sheet);
//! assert_eq!(results[&b1].value, Some(CellValue::Number(20.0)));
//! ```

use std::collections::BTreeMap;

use slate_core::{CellAddress, CellError, CellValue, EvalResult, Result};
use slate_formula::evaluator::evaluate_cell;
use slate_formula::{parse, Cell, DependencyGraph, Sheet};
use tracing::{debug, warn};

/// One edit to a single cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellEdit {
    /// Remove the cell's content
    Clear,
    /// Write a plain value
    Literal(CellValue),
    /// Write a formula; a leading `=` is accepted and stripped
    Formula(String),
}

/// The recalculation engine for one sheet
///
/// Owns the dependency graph derived from the sheet's formulas. The graph is
/// kept acyclic: a formula write that would close a cycle is stored as a
/// CYCLE error cell and contributes no edges.
#[derive(Debug, Default)]
pub struct Engine {
    graph: DependencyGraph,
}

impl Engine {
    /// Create an engine with an empty dependency graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine whose graph is derived from the sheet's existing
    /// formula cells
    pub fn from_sheet(sheet: &Sheet) -> Self {
        let mut engine = Self::new();
        engine.rebuild_graph(sheet);
        engine
    }

    /// Read access to the dependency graph
    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// Apply one edit and recalculate everything it affects
    ///
    /// A formula that fails to parse is stored as a PARSE error cell rather
    /// than failing the call; only structural problems (out-of-bounds
    /// address) are `Err`.
    pub fn apply_edit(
        &mut self,
        sheet: &mut Sheet,
        addr: CellAddress,
        edit: CellEdit,
    ) -> Result<()> {
        self.apply_one(sheet, addr, edit)?;
        self.recalculate(sheet, &[addr]);
        Ok(())
    }

    /// Apply a batch of edits, then recalculate once over the union of
    /// affected cells
    ///
    /// One bad formula does not abort its siblings; it is stored as an
    /// error cell like in [`Engine::apply_edit`].
    pub fn apply_edits(
        &mut self,
        sheet: &mut Sheet,
        edits: Vec<(CellAddress, CellEdit)>,
    ) -> Result<()> {
        let mut changed = Vec::with_capacity(edits.len());

        for (addr, edit) in edits {
            self.apply_one(sheet, addr, edit)?;
            changed.push(addr);
        }

        self.recalculate(sheet, &changed);
        Ok(())
    }

    fn apply_one(&mut self, sheet: &mut Sheet, addr: CellAddress, edit: CellEdit) -> Result<()> {
        // Whatever the cell becomes, its old reads are gone
        self.graph.remove_dependencies(addr);

        match edit {
            CellEdit::Clear => {
                sheet.clear_cell(addr)?;
            }
            CellEdit::Literal(value) => {
                sheet.set_cell(addr, Cell::Literal(value))?;
            }
            CellEdit::Formula(text) => {
                self.apply_formula_edit(sheet, addr, &text)?;
            }
        }
        Ok(())
    }

    fn apply_formula_edit(
        &mut self,
        sheet: &mut Sheet,
        addr: CellAddress,
        text: &str,
    ) -> Result<()> {
        let src = text.trim().strip_prefix('=').unwrap_or(text.trim());

        let ast = match parse(src) {
            Ok(ast) => ast,
            Err(err) => {
                warn!(cell = %addr, error = %err, "formula failed to parse");
                sheet.set_cell(addr, Cell::Error(CellError::from(err)))?;
                return Ok(());
            }
        };

        // Every prospective edge is checked against the current graph, so
        // the graph itself never holds a cycle.
        let reads = ast.references().expanded();
        for &read in &reads {
            if self.graph.would_create_cycle(addr, read) {
                warn!(cell = %addr, reads = %read, "formula write would create a cycle");
                sheet.set_cell(
                    addr,
                    Cell::Error(CellError::cycle(format!(
                        "Circular reference involving {}",
                        addr
                    ))),
                )?;
                return Ok(());
            }
        }

        for read in reads {
            self.graph.add_dependency(addr, read);
        }

        sheet.set_cell(
            addr,
            Cell::Formula {
                src: src.to_string(),
                ast,
                cached: None,
            },
        )?;
        Ok(())
    }

    /// Recompute the changed cells and everything that transitively reads
    /// them, refreshing each formula cell's cached result
    pub fn recalculate(&self, sheet: &mut Sheet, changed: &[CellAddress]) {
        let mut affected: Vec<CellAddress> = changed.to_vec();
        affected.extend(self.graph.transitive_dependents(changed));

        let order = self.graph.evaluation_order(&affected);
        debug!(
            cells = order.sorted.len(),
            cyclic = order.cyclic.len(),
            "recalculating"
        );

        for addr in order.sorted {
            self.refresh_cell(sheet, addr);
        }

        // The graph is kept acyclic, but a sheet loaded with cyclic
        // formulas already in place still resolves here.
        for addr in order.cyclic {
            sheet.set_cached_result(
                addr,
                EvalResult::error(CellError::cycle(format!(
                    "Circular reference involving {}",
                    addr
                ))),
            );
        }
    }

    /// Evaluate every formula cell in dependency order
    ///
    /// The engine's graph is rebuilt from the sheet's ASTs first, so this
    /// is safe to call on a sheet whose formulas were written directly
    /// rather than through [`Engine::apply_edit`]. Cells on a cycle report
    /// CYCLE without being evaluated.
    pub fn evaluate_sheet(&mut self, sheet: &mut Sheet) -> BTreeMap<CellAddress, EvalResult> {
        self.rebuild_graph(sheet);

        let formulas: Vec<CellAddress> = sheet.formula_cells().collect();
        let order = self.graph.evaluation_order(&formulas);

        let mut results = BTreeMap::new();
        for addr in order.sorted {
            if let Some(result) = self.refresh_cell(sheet, addr) {
                results.insert(addr, result);
            }
        }
        for addr in order.cyclic {
            let result = EvalResult::error(CellError::cycle(format!(
                "Circular reference involving {}",
                addr
            )));
            sheet.set_cached_result(addr, result.clone());
            results.insert(addr, result);
        }

        results
    }

    /// Evaluate one formula cell fresh and refresh its cached result
    fn refresh_cell(&self, sheet: &mut Sheet, addr: CellAddress) -> Option<EvalResult> {
        if !matches!(sheet.get_cell(addr), Some(cell) if cell.is_formula()) {
            return None;
        }

        let result: EvalResult = evaluate_cell(sheet, addr, false).result.into();
        sheet.set_cached_result(addr, result.clone());
        Some(result)
    }

    /// Derive the dependency graph from the sheet's current formula ASTs
    fn rebuild_graph(&mut self, sheet: &Sheet) {
        self.graph = DependencyGraph::new();
        for (addr, cell) in sheet.cells() {
            if let Cell::Formula { ast, .. } = cell {
                for read in ast.references().expanded() {
                    self.graph.add_dependency(*addr, read);
                }
            }
        }
    }
}
