//! Built-in formula functions
//!
//! A fixed table: SUM, AVG, MIN, MAX, COUNT, IF. Dispatch receives the
//! unevaluated argument expressions so IF can skip its untaken branch;
//! the aggregates flatten their arguments (expanding ranges column-major)
//! before operating on the resulting values.

use slate_core::{CellError, CellValue};

use crate::ast::FormulaAst;
use crate::evaluator::{coerce_bool, EvalContext};

/// Dispatch a function call by name
pub(crate) fn call(
    ctx: &mut EvalContext<'_>,
    name: &str,
    args: &[FormulaAst],
) -> Result<CellValue, CellError> {
    match name {
        "IF" => fn_if(ctx, args),
        "SUM" => fn_sum(&flatten_args(ctx, args)?),
        "AVG" => fn_avg(&flatten_args(ctx, args)?),
        "MIN" => fn_min(&flatten_args(ctx, args)?),
        "MAX" => fn_max(&flatten_args(ctx, args)?),
        "COUNT" => fn_count(&flatten_args(ctx, args)?),
        _ => Err(CellError::parse(format!("Unknown function: {}", name))),
    }
}

/// Evaluate every argument, expanding ranges into their member cells
fn flatten_args(
    ctx: &mut EvalContext<'_>,
    args: &[FormulaAst],
) -> Result<Vec<CellValue>, CellError> {
    let mut values = Vec::new();
    for arg in args {
        match arg {
            FormulaAst::Range(range) => {
                for addr in range.cells() {
                    values.push(ctx.eval_ref(addr)?);
                }
            }
            other => values.push(ctx.eval(other)?),
        }
    }
    Ok(values)
}

/// `IF(cond, then, else)`: exactly one branch is evaluated
fn fn_if(ctx: &mut EvalContext<'_>, args: &[FormulaAst]) -> Result<CellValue, CellError> {
    if args.len() != 3 {
        return Err(CellError::parse(format!(
            "IF expects 3 arguments, got {}",
            args.len()
        )));
    }

    let cond = ctx.eval(&args[0])?;
    if coerce_bool(&cond)? {
        ctx.eval(&args[1])
    } else {
        ctx.eval(&args[2])
    }
}

fn numeric_values(values: &[CellValue]) -> impl Iterator<Item = f64> + '_ {
    values.iter().filter_map(|value| match value {
        CellValue::Number(n) => Some(*n),
        _ => None,
    })
}

/// Sum of the numeric values; non-numeric values are skipped, not errors
fn fn_sum(values: &[CellValue]) -> Result<CellValue, CellError> {
    Ok(CellValue::Number(numeric_values(values).sum()))
}

/// Arithmetic mean of the numeric values
fn fn_avg(values: &[CellValue]) -> Result<CellValue, CellError> {
    let nums: Vec<f64> = numeric_values(values).collect();
    if nums.is_empty() {
        return Err(CellError::div0("AVG over no numeric values"));
    }
    Ok(CellValue::Number(
        nums.iter().sum::<f64>() / nums.len() as f64,
    ))
}

fn fn_min(values: &[CellValue]) -> Result<CellValue, CellError> {
    numeric_values(values)
        .fold(None, |min: Option<f64>, n| {
            Some(min.map_or(n, |m| m.min(n)))
        })
        .map(CellValue::Number)
        .ok_or_else(|| CellError::div0("MIN over no numeric values"))
}

fn fn_max(values: &[CellValue]) -> Result<CellValue, CellError> {
    numeric_values(values)
        .fold(None, |max: Option<f64>, n| {
            Some(max.map_or(n, |m| m.max(n)))
        })
        .map(CellValue::Number)
        .ok_or_else(|| CellError::div0("MAX over no numeric values"))
}

/// Count of non-blank values of any type
fn fn_count(values: &[CellValue]) -> Result<CellValue, CellError> {
    let count = values
        .iter()
        .filter(|value| !matches!(value, CellValue::Empty))
        .count();
    Ok(CellValue::Number(count as f64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::evaluate_cell;
    use crate::parse;
    use crate::sheet::{Cell, Sheet};
    use pretty_assertions::assert_eq;
    use slate_core::{CellAddress, ErrorCode};

    fn addr(s: &str) -> CellAddress {
        CellAddress::parse(s).unwrap()
    }

    fn sheet() -> Sheet {
        Sheet::new("s1", "Test", 100, 26).unwrap()
    }

    fn set_literal(sheet: &mut Sheet, a: &str, value: impl Into<CellValue>) {
        sheet
            .set_cell(addr(a), Cell::Literal(value.into()))
            .unwrap();
    }

    fn set_formula(sheet: &mut Sheet, a: &str, src: &str) {
        sheet
            .set_cell(
                addr(a),
                Cell::Formula {
                    src: src.to_string(),
                    ast: parse(src).unwrap(),
                    cached: None,
                },
            )
            .unwrap();
    }

    fn eval(sheet: &Sheet, a: &str) -> Result<CellValue, CellError> {
        evaluate_cell(sheet, addr(a), false).result
    }

    #[test]
    fn test_sum_of_scalars() {
        let mut s = sheet();
        set_formula(&mut s, "A1", "SUM(1,2,3)");
        assert_eq!(eval(&s, "A1").unwrap(), CellValue::Number(6.0));
    }

    #[test]
    fn test_sum_over_range_skips_non_numeric() {
        let mut s = sheet();
        set_literal(&mut s, "A1", 1.0);
        set_literal(&mut s, "A2", "text");
        set_literal(&mut s, "A3", 2.0);
        // A4 is blank
        set_formula(&mut s, "B1", "SUM(A1:A4)");
        assert_eq!(eval(&s, "B1").unwrap(), CellValue::Number(3.0));
    }

    #[test]
    fn test_sum_of_nothing_is_zero() {
        let mut s = sheet();
        set_formula(&mut s, "B1", "SUM(A1:A3)");
        assert_eq!(eval(&s, "B1").unwrap(), CellValue::Number(0.0));
    }

    #[test]
    fn test_avg() {
        let mut s = sheet();
        set_formula(&mut s, "A1", "AVG(10,20,30)");
        assert_eq!(eval(&s, "A1").unwrap(), CellValue::Number(20.0));
    }

    #[test]
    fn test_avg_of_empty_domain_is_div0() {
        let mut s = sheet();
        set_formula(&mut s, "B1", "AVG(A1:A3)");
        assert_eq!(eval(&s, "B1").unwrap_err().code, ErrorCode::Div0);
    }

    #[test]
    fn test_min_max() {
        let mut s = sheet();
        set_formula(&mut s, "A1", "MIN(5,3,7)");
        set_formula(&mut s, "A2", "MAX(5,3,7)");
        assert_eq!(eval(&s, "A1").unwrap(), CellValue::Number(3.0));
        assert_eq!(eval(&s, "A2").unwrap(), CellValue::Number(7.0));
    }

    #[test]
    fn test_min_of_empty_domain_is_div0() {
        let mut s = sheet();
        set_formula(&mut s, "B1", "MIN(A1:A3)");
        assert_eq!(eval(&s, "B1").unwrap_err().code, ErrorCode::Div0);
        set_formula(&mut s, "B2", "MAX(A1:A3)");
        assert_eq!(eval(&s, "B2").unwrap_err().code, ErrorCode::Div0);
    }

    #[test]
    fn test_count_non_blank_of_any_type() {
        let mut s = sheet();
        set_literal(&mut s, "A1", 1.0);
        set_literal(&mut s, "A2", "text");
        set_literal(&mut s, "A3", true);
        // A4 is blank
        set_formula(&mut s, "B1", "COUNT(A1:A4)");
        assert_eq!(eval(&s, "B1").unwrap(), CellValue::Number(3.0));

        set_formula(&mut s, "B2", "COUNT(1,2,\"text\",3)");
        assert_eq!(eval(&s, "B2").unwrap(), CellValue::Number(4.0));
    }

    #[test]
    fn test_if_picks_branch() {
        let mut s = sheet();
        set_formula(&mut s, "A1", "IF(1>0,\"yes\",\"no\")");
        assert_eq!(eval(&s, "A1").unwrap(), CellValue::Text("yes".into()));
    }

    #[test]
    fn test_if_untaken_branch_never_evaluated() {
        let mut s = sheet();
        set_formula(&mut s, "A1", "IF(TRUE,1,1/0)");
        assert_eq!(eval(&s, "A1").unwrap(), CellValue::Number(1.0));
    }

    #[test]
    fn test_if_wrong_arity() {
        let mut s = sheet();
        set_formula(&mut s, "A1", "IF(TRUE,1)");
        assert_eq!(eval(&s, "A1").unwrap_err().code, ErrorCode::Parse);
    }

    #[test]
    fn test_if_non_boolean_condition() {
        let mut s = sheet();
        set_formula(&mut s, "A1", "IF(\"maybe\",1,2)");
        assert_eq!(eval(&s, "A1").unwrap_err().code, ErrorCode::Parse);
    }

    #[test]
    fn test_unknown_function() {
        let mut s = sheet();
        set_formula(&mut s, "A1", "UNKNOWN()");
        let err = eval(&s, "A1").unwrap_err();
        assert_eq!(err.code, ErrorCode::Parse);
        assert_eq!(err.message, "Unknown function: UNKNOWN");
    }

    #[test]
    fn test_error_in_range_propagates() {
        let mut s = sheet();
        set_literal(&mut s, "A1", 1.0);
        set_formula(&mut s, "A2", "1/0");
        set_formula(&mut s, "B1", "SUM(A1:A2)");
        assert_eq!(eval(&s, "B1").unwrap_err().code, ErrorCode::Div0);
    }

    #[test]
    fn test_nested_aggregates() {
        let mut s = sheet();
        set_literal(&mut s, "A1", 1.0);
        set_literal(&mut s, "A2", 2.0);
        set_formula(&mut s, "B1", "SUM(A1:A2,MAX(3,4))");
        assert_eq!(eval(&s, "B1").unwrap(), CellValue::Number(7.0));
    }
}
