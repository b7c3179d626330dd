//! Formula Abstract Syntax Tree types

use slate_core::{CellAddress, CellRange};

/// Formula expression AST
///
/// Immutable once parsed; owned exclusively by the cell that holds it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FormulaAst {
    /// Numeric literal
    Number(f64),
    /// String literal
    Text(String),
    /// Boolean literal
    Boolean(bool),
    /// Single cell reference (absolute markers carried on the address)
    CellRef(CellAddress),
    /// Rectangular range reference
    Range(CellRange),
    /// Function call
    Function {
        name: String,
        args: Vec<FormulaAst>,
    },
    /// Binary operation
    BinaryOp {
        op: BinaryOperator,
        left: Box<FormulaAst>,
        right: Box<FormulaAst>,
    },
    /// Unary operation
    UnaryOp {
        op: UnaryOperator,
        operand: Box<FormulaAst>,
    },
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BinaryOperator {
    // Arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,

    // Comparison
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
}

impl BinaryOperator {
    /// Source-text symbol for the operator
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Power => "^",
            BinaryOperator::Equal => "=",
            BinaryOperator::NotEqual => "<>",
            BinaryOperator::LessThan => "<",
            BinaryOperator::LessEqual => "<=",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::GreaterEqual => ">=",
        }
    }

    /// Whether this is a comparison (as opposed to arithmetic) operator
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOperator::Equal
                | BinaryOperator::NotEqual
                | BinaryOperator::LessThan
                | BinaryOperator::LessEqual
                | BinaryOperator::GreaterThan
                | BinaryOperator::GreaterEqual
        )
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnaryOperator {
    Negate,
}

/// Cell and range references statically collected from an AST
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaticRefs {
    pub cells: Vec<CellAddress>,
    pub ranges: Vec<CellRange>,
}

impl StaticRefs {
    /// Every address the formula reads, with ranges expanded to their
    /// member cells (column-major). May contain duplicates.
    pub fn expanded(&self) -> Vec<CellAddress> {
        let mut addrs = self.cells.clone();
        for range in &self.ranges {
            addrs.extend(range.cells());
        }
        addrs
    }
}

impl FormulaAst {
    /// Statically collect every `CellRef` and `Range` node in the tree
    ///
    /// This is what the dependency graph is rebuilt from on a formula write,
    /// and what the explain trace reports per cell.
    pub fn references(&self) -> StaticRefs {
        let mut refs = StaticRefs::default();
        self.collect_references(&mut refs);
        refs
    }

    fn collect_references(&self, refs: &mut StaticRefs) {
        match self {
            FormulaAst::CellRef(addr) => refs.cells.push(*addr),
            FormulaAst::Range(range) => refs.ranges.push(*range),
            FormulaAst::BinaryOp { left, right, .. } => {
                left.collect_references(refs);
                right.collect_references(refs);
            }
            FormulaAst::UnaryOp { operand, .. } => operand.collect_references(refs),
            FormulaAst::Function { args, .. } => {
                for arg in args {
                    arg.collect_references(refs);
                }
            }
            FormulaAst::Number(_) | FormulaAst::Text(_) | FormulaAst::Boolean(_) => {}
        }
    }
}
