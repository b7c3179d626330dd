//! Formula evaluator
//!
//! Walks an AST against a sheet snapshot and produces a value or exactly one
//! error. Cycle detection uses an explicit visited-path set carried by the
//! evaluation context, never the call stack; a memo map ensures each formula
//! cell is computed at most once per pass even when referenced repeatedly.

use ahash::{AHashMap, AHashSet};
use slate_core::{CellAddress, CellError, CellRange, CellValue};

use crate::ast::{BinaryOperator, FormulaAst, UnaryOperator};
use crate::functions;
use crate::sheet::{Cell, Sheet};

/// One entry in an explain trace: a cell visited during evaluation
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExplainTrace {
    pub cell: CellAddress,
    /// Formula source text, `None` for literal or blank cells
    pub formula: Option<String>,
    /// Single-cell references read by this cell's formula
    pub dependencies: Vec<CellAddress>,
    /// Range references read by this cell's formula
    pub ranges: Vec<CellRange>,
    /// Value the cell resolved to, `None` when it errored
    pub value: Option<CellValue>,
}

/// Outcome of evaluating one cell, with an optional explain trace
#[derive(Debug, Clone, PartialEq)]
pub struct CellEvaluation {
    pub result: Result<CellValue, CellError>,
    /// Populated only when a trace was requested; entries appear in
    /// completion order, so a cell's dependencies precede it
    pub trace: Option<Vec<ExplainTrace>>,
}

/// Evaluate one cell fresh against the given sheet
///
/// No state survives between calls: the visited path, memo map, and trace
/// all live for this pass only.
pub fn evaluate_cell(sheet: &Sheet, addr: CellAddress, with_trace: bool) -> CellEvaluation {
    let mut ctx = EvalContext::new(sheet, addr, with_trace);
    let result = ctx.eval_ref(addr);
    CellEvaluation {
        result,
        trace: ctx.trace,
    }
}

/// Per-pass evaluation state
pub(crate) struct EvalContext<'a> {
    sheet: &'a Sheet,
    /// Cell the whole pass was started for; cycle errors are attributed here
    origin: CellAddress,
    /// Formula cells on the current reference path
    visited: AHashSet<CellAddress>,
    /// Completed formula results for this pass
    memo: AHashMap<CellAddress, Result<CellValue, CellError>>,
    trace: Option<Vec<ExplainTrace>>,
}

impl<'a> EvalContext<'a> {
    fn new(sheet: &'a Sheet, origin: CellAddress, with_trace: bool) -> Self {
        Self {
            sheet,
            origin,
            visited: AHashSet::new(),
            memo: AHashMap::new(),
            trace: with_trace.then(Vec::new),
        }
    }

    /// Resolve a cell reference to a value
    pub(crate) fn eval_ref(&mut self, addr: CellAddress) -> Result<CellValue, CellError> {
        if !self.sheet.is_in_bounds(addr) {
            return Err(CellError::reference(format!(
                "Reference out of bounds: {}",
                addr
            )));
        }

        if let Some(result) = self.memo.get(&addr) {
            return result.clone();
        }

        // A formula already on the current path means the reference chain
        // loops back on itself.
        if self.visited.contains(&addr) {
            return Err(CellError::cycle(format!(
                "Circular reference involving {}",
                self.origin
            )));
        }

        match self.sheet.get_cell(addr) {
            None => {
                self.push_trace(addr, None, None, Some(CellValue::Empty));
                Ok(CellValue::Empty)
            }
            Some(Cell::Literal(value)) => {
                self.push_trace(addr, None, None, Some(value.clone()));
                Ok(value.clone())
            }
            Some(Cell::Error(error)) => {
                // Stored errors are contagious, not recomputed
                let error = error.clone();
                self.push_trace(addr, None, None, None);
                Err(error)
            }
            Some(Cell::Formula { src, ast, .. }) => {
                let src = src.clone();
                let ast = ast.clone();

                self.visited.insert(addr);
                let result = self.eval(&ast);
                self.visited.remove(&addr);

                self.push_trace(
                    addr,
                    Some(src),
                    Some(&ast),
                    result.as_ref().ok().cloned(),
                );
                self.memo.insert(addr, result.clone());
                result
            }
        }
    }

    /// Evaluate an expression to a scalar value
    pub(crate) fn eval(&mut self, ast: &FormulaAst) -> Result<CellValue, CellError> {
        match ast {
            FormulaAst::Number(n) => Ok(CellValue::Number(*n)),
            FormulaAst::Text(s) => Ok(CellValue::Text(s.clone())),
            FormulaAst::Boolean(b) => Ok(CellValue::Boolean(*b)),

            FormulaAst::CellRef(addr) => self.eval_ref(*addr),

            // Ranges flatten inside function arguments only
            FormulaAst::Range(range) => Err(CellError::parse(format!(
                "Range {} cannot be used as a scalar value",
                range
            ))),

            FormulaAst::UnaryOp { op, operand } => {
                let value = self.eval(operand)?;
                match op {
                    UnaryOperator::Negate => Ok(CellValue::Number(-coerce_number(&value)?)),
                }
            }

            FormulaAst::BinaryOp { op, left, right } => self.eval_binary(*op, left, right),

            FormulaAst::Function { name, args } => functions::call(self, name, args),
        }
    }

    fn eval_binary(
        &mut self,
        op: BinaryOperator,
        left: &FormulaAst,
        right: &FormulaAst,
    ) -> Result<CellValue, CellError> {
        let lhs = self.eval(left)?;
        let rhs = self.eval(right)?;

        if op.is_comparison() {
            return compare(op, lhs, rhs);
        }

        let a = coerce_number(&lhs)?;
        let b = coerce_number(&rhs)?;

        let result = match op {
            BinaryOperator::Add => a + b,
            BinaryOperator::Subtract => a - b,
            BinaryOperator::Multiply => a * b,
            BinaryOperator::Divide => {
                if b == 0.0 {
                    return Err(CellError::div0("Division by zero"));
                }
                a / b
            }
            BinaryOperator::Power => a.powf(b),
            _ => unreachable!("comparison handled above"),
        };

        Ok(CellValue::Number(result))
    }

    fn push_trace(
        &mut self,
        cell: CellAddress,
        formula: Option<String>,
        ast: Option<&FormulaAst>,
        value: Option<CellValue>,
    ) {
        if let Some(trace) = &mut self.trace {
            let refs = ast.map(FormulaAst::references).unwrap_or_default();
            trace.push(ExplainTrace {
                cell,
                formula,
                dependencies: refs.cells,
                ranges: refs.ranges,
                value,
            });
        }
    }
}

/// Coerce a value to a number
///
/// Blanks are 0, booleans 1/0, numeric strings parse. A non-numeric string
/// in an arithmetic context is an error, never silently 0.
pub(crate) fn coerce_number(value: &CellValue) -> Result<f64, CellError> {
    value.as_number().ok_or_else(|| {
        CellError::parse(format!("Cannot use '{}' as a number", value))
    })
}

/// Coerce a value to a boolean condition
pub(crate) fn coerce_bool(value: &CellValue) -> Result<bool, CellError> {
    value.as_bool().ok_or_else(|| {
        CellError::parse(format!("Cannot use '{}' as a condition", value))
    })
}

/// Compare two values
///
/// Numbers compare numerically, strings byte-lexically, booleans as 0/1.
/// A blank takes on the other side's blank meaning first. Mismatched types
/// are never equal; ordering them is an error.
fn compare(
    op: BinaryOperator,
    lhs: CellValue,
    rhs: CellValue,
) -> Result<CellValue, CellError> {
    use std::cmp::Ordering;

    let lhs = normalize_blank(lhs, &rhs);
    let rhs = normalize_blank(rhs, &lhs);

    let ordering = match (&lhs, &rhs) {
        // NaN yields no ordering here and falls through to the
        // mismatched-type rules below
        (CellValue::Number(a), CellValue::Number(b)) => a.partial_cmp(b),
        (CellValue::Text(a), CellValue::Text(b)) => Some(a.cmp(b)),
        (CellValue::Boolean(a), CellValue::Boolean(b)) => {
            Some((*a as u8).cmp(&(*b as u8)))
        }
        (CellValue::Empty, CellValue::Empty) => Some(Ordering::Equal),
        _ => None,
    };

    let result = match ordering {
        Some(ordering) => match op {
            BinaryOperator::Equal => ordering == Ordering::Equal,
            BinaryOperator::NotEqual => ordering != Ordering::Equal,
            BinaryOperator::LessThan => ordering == Ordering::Less,
            BinaryOperator::LessEqual => ordering != Ordering::Greater,
            BinaryOperator::GreaterThan => ordering == Ordering::Greater,
            BinaryOperator::GreaterEqual => ordering != Ordering::Less,
            _ => unreachable!("arithmetic operator in comparison"),
        },
        // Mismatched types: never equal, not orderable
        None => match op {
            BinaryOperator::Equal => false,
            BinaryOperator::NotEqual => true,
            _ => {
                return Err(CellError::parse(format!(
                    "Cannot compare {} and {}",
                    lhs.type_name(),
                    rhs.type_name()
                )))
            }
        },
    };

    Ok(CellValue::Boolean(result))
}

/// Give a blank the type of the value it is compared against
fn normalize_blank(value: CellValue, other: &CellValue) -> CellValue {
    if value != CellValue::Empty {
        return value;
    }
    match other {
        CellValue::Number(_) => CellValue::Number(0.0),
        CellValue::Text(_) => CellValue::Text(String::new()),
        CellValue::Boolean(_) => CellValue::Boolean(false),
        _ => CellValue::Empty,
    }
}
