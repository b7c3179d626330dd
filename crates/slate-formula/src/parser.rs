//! Formula parser
//!
//! A recursive descent parser over the token stream with proper operator
//! precedence. Lowest to highest:
//!
//! 1. Comparison: `=`, `<>`, `<`, `<=`, `>`, `>=`
//! 2. Addition/Subtraction: `+`, `-`
//! 3. Multiplication/Division: `*`, `/`
//! 4. Exponentiation: `^` (right associative)
//! 5. Unary minus
//! 6. Primary: literals, references, ranges, function calls, parentheses

use crate::ast::{BinaryOperator, FormulaAst, UnaryOperator};
use crate::error::{FormulaError, FormulaResult};
use crate::lexer::{Lexer, Token};

/// Parse a formula string into an AST
///
/// A leading `=` is accepted and ignored, so both `=A1+1` and `A1+1` parse
/// to the same tree.
///
/// # Example
/// ```rust
/// use slate_formula::parse;
///
/// let ast = parse("=1+2").unwrap();
/// let ast = parse("SUM(A1:A10)").unwrap();
/// let ast = parse("IF(A1>0,\"Yes\",\"No\")").unwrap();
/// ```
pub fn parse(formula: &str) -> FormulaResult<FormulaAst> {
    let formula = formula.trim();
    let formula = formula.strip_prefix('=').unwrap_or(formula);

    if formula.is_empty() {
        return Err(FormulaError::Parse("Empty formula".into()));
    }

    let mut parser = Parser::new(formula)?;
    let ast = parser.parse_expression()?;

    // Make sure we consumed all input
    if parser.current_token() != &Token::Eof {
        return Err(FormulaError::UnexpectedToken(format!(
            "{:?}",
            parser.current_token()
        )));
    }

    Ok(ast)
}

struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> FormulaResult<Self> {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token()?;
        Ok(Self { lexer, current })
    }

    fn current_token(&self) -> &Token {
        &self.current
    }

    fn consume(&mut self) -> FormulaResult<Token> {
        let token = std::mem::replace(&mut self.current, self.lexer.next_token()?);
        Ok(token)
    }

    fn expect(&mut self, expected: &Token) -> FormulaResult<()> {
        if &self.current == expected {
            self.consume()?;
            Ok(())
        } else {
            Err(FormulaError::Parse(format!(
                "Expected {:?}, got {:?}",
                expected, self.current
            )))
        }
    }

    fn parse_expression(&mut self) -> FormulaResult<FormulaAst> {
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> FormulaResult<FormulaAst> {
        let mut left = self.parse_additive()?;

        loop {
            let op = match self.current_token() {
                Token::Equal => BinaryOperator::Equal,
                Token::NotEqual => BinaryOperator::NotEqual,
                Token::LessThan => BinaryOperator::LessThan,
                Token::LessEqual => BinaryOperator::LessEqual,
                Token::GreaterThan => BinaryOperator::GreaterThan,
                Token::GreaterEqual => BinaryOperator::GreaterEqual,
                _ => break,
            };

            self.consume()?;
            let right = self.parse_additive()?;
            left = FormulaAst::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_additive(&mut self) -> FormulaResult<FormulaAst> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match self.current_token() {
                Token::Plus => BinaryOperator::Add,
                Token::Minus => BinaryOperator::Subtract,
                _ => break,
            };

            self.consume()?;
            let right = self.parse_multiplicative()?;
            left = FormulaAst::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> FormulaResult<FormulaAst> {
        let mut left = self.parse_exponent()?;

        loop {
            let op = match self.current_token() {
                Token::Star => BinaryOperator::Multiply,
                Token::Slash => BinaryOperator::Divide,
                _ => break,
            };

            self.consume()?;
            let right = self.parse_exponent()?;
            left = FormulaAst::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_exponent(&mut self) -> FormulaResult<FormulaAst> {
        let left = self.parse_unary()?;

        if matches!(self.current_token(), Token::Caret) {
            self.consume()?;
            let right = self.parse_exponent()?; // Right associative
            return Ok(FormulaAst::BinaryOp {
                op: BinaryOperator::Power,
                left: Box::new(left),
                right: Box::new(right),
            });
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> FormulaResult<FormulaAst> {
        if matches!(self.current_token(), Token::Minus) {
            self.consume()?;
            let operand = self.parse_unary()?;
            return Ok(FormulaAst::UnaryOp {
                op: UnaryOperator::Negate,
                operand: Box::new(operand),
            });
        }

        // Prefix plus (no-op)
        if matches!(self.current_token(), Token::Plus) {
            self.consume()?;
            return self.parse_unary();
        }

        self.parse_range()
    }

    fn parse_range(&mut self) -> FormulaResult<FormulaAst> {
        let left = self.parse_primary()?;

        if matches!(self.current_token(), Token::Colon) {
            self.consume()?;
            let right = self.parse_primary()?;

            // Both endpoints must be plain cell references
            if let (FormulaAst::CellRef(start), FormulaAst::CellRef(end)) = (&left, &right) {
                return Ok(FormulaAst::Range(start.to(*end)));
            }

            return Err(FormulaError::Parse(
                "Range endpoints must be cell references".into(),
            ));
        }

        Ok(left)
    }

    fn parse_primary(&mut self) -> FormulaResult<FormulaAst> {
        match self.consume()? {
            Token::Number(n) => Ok(FormulaAst::Number(n)),
            Token::Text(s) => Ok(FormulaAst::Text(s)),
            Token::Boolean(b) => Ok(FormulaAst::Boolean(b)),
            Token::CellRef(addr) => Ok(FormulaAst::CellRef(addr)),

            Token::LeftParen => {
                let expr = self.parse_expression()?;
                self.expect(&Token::RightParen)?;
                Ok(expr)
            }

            Token::FuncName(name) => self.parse_function_call(name),

            Token::Eof => Err(FormulaError::UnexpectedEof),
            other => Err(FormulaError::UnexpectedToken(format!("{:?}", other))),
        }
    }

    fn parse_function_call(&mut self, name: String) -> FormulaResult<FormulaAst> {
        self.expect(&Token::LeftParen)?;

        let mut args = Vec::new();

        if !matches!(self.current_token(), Token::RightParen) {
            args.push(self.parse_expression()?);

            while matches!(self.current_token(), Token::Comma) {
                self.consume()?;
                args.push(self.parse_expression()?);
            }
        }

        self.expect(&Token::RightParen)?;

        Ok(FormulaAst::Function { name, args })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use slate_core::CellAddress;

    fn num(n: f64) -> FormulaAst {
        FormulaAst::Number(n)
    }

    fn bin(op: BinaryOperator, left: FormulaAst, right: FormulaAst) -> FormulaAst {
        FormulaAst::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse("=42").unwrap(), num(42.0));
        assert_eq!(parse("3.14").unwrap(), num(3.14));
        assert_eq!(parse("=1e10").unwrap(), num(1e10));
    }

    #[test]
    fn test_parse_string_and_boolean() {
        assert_eq!(
            parse("=\"hello\"").unwrap(),
            FormulaAst::Text("hello".to_string())
        );
        assert_eq!(parse("=TRUE").unwrap(), FormulaAst::Boolean(true));
        assert_eq!(parse("=false").unwrap(), FormulaAst::Boolean(false));
    }

    #[test]
    fn test_leading_equals_optional() {
        assert_eq!(parse("=1+2").unwrap(), parse("1+2").unwrap());
    }

    #[test]
    fn test_precedence_mul_over_add() {
        // 1+2*3 = 1+(2*3)
        let ast = parse("=1+2*3").unwrap();
        assert_eq!(
            ast,
            bin(
                BinaryOperator::Add,
                num(1.0),
                bin(BinaryOperator::Multiply, num(2.0), num(3.0))
            )
        );
    }

    #[test]
    fn test_left_associative_subtraction() {
        // 1-2-3 = (1-2)-3
        let ast = parse("=1-2-3").unwrap();
        assert_eq!(
            ast,
            bin(
                BinaryOperator::Subtract,
                bin(BinaryOperator::Subtract, num(1.0), num(2.0)),
                num(3.0)
            )
        );
    }

    #[test]
    fn test_power_right_associative() {
        // 2^3^2 = 2^(3^2)
        let ast = parse("=2^3^2").unwrap();
        assert_eq!(
            ast,
            bin(
                BinaryOperator::Power,
                num(2.0),
                bin(BinaryOperator::Power, num(3.0), num(2.0))
            )
        );
    }

    #[test]
    fn test_unary_minus_binds_before_power() {
        // -2^2 = (-2)^2
        let ast = parse("=-2^2").unwrap();
        assert_eq!(
            ast,
            bin(
                BinaryOperator::Power,
                FormulaAst::UnaryOp {
                    op: UnaryOperator::Negate,
                    operand: Box::new(num(2.0)),
                },
                num(2.0)
            )
        );
    }

    #[test]
    fn test_comparison_lowest_precedence() {
        // A1+1>5 = (A1+1)>5
        let ast = parse("=A1+1>5").unwrap();
        match ast {
            FormulaAst::BinaryOp { op, .. } => assert_eq!(op, BinaryOperator::GreaterThan),
            other => panic!("expected comparison at root, got {:?}", other),
        }
    }

    #[test]
    fn test_parentheses_override_precedence() {
        let ast = parse("=(1+2)*3").unwrap();
        assert_eq!(
            ast,
            bin(
                BinaryOperator::Multiply,
                bin(BinaryOperator::Add, num(1.0), num(2.0)),
                num(3.0)
            )
        );
    }

    #[test]
    fn test_parse_cell_ref() {
        let ast = parse("=A1").unwrap();
        assert_eq!(
            ast,
            FormulaAst::CellRef(CellAddress::parse("A1").unwrap())
        );
    }

    #[test]
    fn test_parse_range() {
        let ast = parse("=A1:B2").unwrap();
        match ast {
            FormulaAst::Range(range) => assert_eq!(range.to_string(), "A1:B2"),
            other => panic!("expected range, got {:?}", other),
        }
    }

    #[test]
    fn test_range_normalized() {
        let ast = parse("=B2:A1").unwrap();
        match ast {
            FormulaAst::Range(range) => assert_eq!(range.to_string(), "A1:B2"),
            other => panic!("expected range, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_function_call() {
        let ast = parse("=SUM(A1:A3,B1)").unwrap();
        match ast {
            FormulaAst::Function { name, args } => {
                assert_eq!(name, "SUM");
                assert_eq!(args.len(), 2);
            }
            other => panic!("expected function, got {:?}", other),
        }
    }

    #[test]
    fn test_function_name_case_insensitive() {
        let ast = parse("=sum(A1)").unwrap();
        match ast {
            FormulaAst::Function { name, .. } => assert_eq!(name, "SUM"),
            other => panic!("expected function, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_argument_list() {
        let ast = parse("=COUNT()").unwrap();
        match ast {
            FormulaAst::Function { name, args } => {
                assert_eq!(name, "COUNT");
                assert!(args.is_empty());
            }
            other => panic!("expected function, got {:?}", other),
        }
    }

    #[test]
    fn test_nested_function_calls() {
        let ast = parse("=IF(A1>0,SUM(B1:B3),MIN(C1,C2))").unwrap();
        match ast {
            FormulaAst::Function { name, args } => {
                assert_eq!(name, "IF");
                assert_eq!(args.len(), 3);
            }
            other => panic!("expected function, got {:?}", other),
        }
    }

    #[test]
    fn test_trailing_garbage_rejected() {
        assert!(parse("=1+2)").is_err());
        assert!(parse("=A1 B2").is_err());
    }

    #[test]
    fn test_unbalanced_parens() {
        assert!(parse("=(1+2").is_err());
        assert!(parse("=SUM(A1").is_err());
    }

    #[test]
    fn test_empty_formula() {
        assert!(parse("").is_err());
        assert!(parse("=").is_err());
    }

    #[test]
    fn test_dangling_operator() {
        assert!(parse("=1+").is_err());
        assert!(parse("=*2").is_err());
    }

    #[test]
    fn test_lowercase_reference_rejected() {
        assert!(parse("=a1+1").is_err());
    }

    #[test]
    fn test_bad_range_endpoint() {
        assert!(parse("=A1:5").is_err());
        assert!(parse("=SUM(A1:)").is_err());
    }
}
