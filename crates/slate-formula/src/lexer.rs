//! Formula tokenizer
//!
//! Scans formula source text into a token stream for the parser. Tokens are
//! produced lazily so a syntax error late in the input does not prevent the
//! parser from building the prefix it already consumed.

use crate::error::{FormulaError, FormulaResult};
use slate_core::CellAddress;

/// Token types
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    Number(f64),
    Text(String),
    Boolean(bool),

    // References and names
    CellRef(CellAddress),
    FuncName(String),

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
    Colon,
    Comma,

    // Delimiters
    LeftParen,
    RightParen,

    // End of input
    Eof,
}

/// Streaming tokenizer over formula source text
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Scan the next token, skipping leading whitespace
    pub fn next_token(&mut self) -> FormulaResult<Token> {
        self.skip_whitespace();

        if self.is_at_end() {
            return Ok(Token::Eof);
        }

        let c = match self.peek_char() {
            Some(c) => c,
            None => return Ok(Token::Eof),
        };

        // Single-character tokens
        match c {
            '+' => {
                self.advance();
                return Ok(Token::Plus);
            }
            '-' => {
                self.advance();
                return Ok(Token::Minus);
            }
            '*' => {
                self.advance();
                return Ok(Token::Star);
            }
            '/' => {
                self.advance();
                return Ok(Token::Slash);
            }
            '^' => {
                self.advance();
                return Ok(Token::Caret);
            }
            ':' => {
                self.advance();
                return Ok(Token::Colon);
            }
            ',' => {
                self.advance();
                return Ok(Token::Comma);
            }
            '(' => {
                self.advance();
                return Ok(Token::LeftParen);
            }
            ')' => {
                self.advance();
                return Ok(Token::RightParen);
            }
            '=' => {
                self.advance();
                return Ok(Token::Equal);
            }
            _ => {}
        }

        // Two-character comparison operators
        if c == '<' {
            self.advance();
            if self.peek_char() == Some('=') {
                self.advance();
                return Ok(Token::LessEqual);
            } else if self.peek_char() == Some('>') {
                self.advance();
                return Ok(Token::NotEqual);
            }
            return Ok(Token::LessThan);
        }

        if c == '>' {
            self.advance();
            if self.peek_char() == Some('=') {
                self.advance();
                return Ok(Token::GreaterEqual);
            }
            return Ok(Token::GreaterThan);
        }

        // String literal
        if c == '"' {
            return self.scan_string();
        }

        // Number
        if c.is_ascii_digit()
            || (c == '.' && self.peek_char_at(1).map_or(false, |c| c.is_ascii_digit()))
        {
            return self.scan_number();
        }

        // Cell reference, boolean, or function name
        if c.is_ascii_alphabetic() || c == '$' || c == '_' {
            return self.scan_identifier_or_ref();
        }

        Err(FormulaError::UnexpectedChar(c, self.pos))
    }

    fn scan_string(&mut self) -> FormulaResult<Token> {
        self.advance(); // Skip opening quote

        let mut s = String::new();
        loop {
            match self.peek_char() {
                Some('"') => {
                    // Doubled quote is an escaped literal quote
                    if self.peek_char_at(1) == Some('"') {
                        s.push('"');
                        self.advance();
                        self.advance();
                    } else {
                        self.advance();
                        return Ok(Token::Text(s));
                    }
                }
                Some(c) => {
                    s.push(c);
                    self.advance();
                }
                None => return Err(FormulaError::Parse("Unterminated string literal".into())),
            }
        }
    }

    fn scan_number(&mut self) -> FormulaResult<Token> {
        let start = self.pos;

        while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
            self.advance();
        }

        if self.peek_char() == Some('.') {
            self.advance();
            while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        if self.peek_char().map_or(false, |c| c == 'e' || c == 'E') {
            self.advance();
            if self.peek_char().map_or(false, |c| c == '+' || c == '-') {
                self.advance();
            }
            while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        let num_str = &self.input[start..self.pos];
        let num: f64 = num_str
            .parse()
            .map_err(|_| FormulaError::Parse(format!("Invalid number '{}'", num_str)))?;
        Ok(Token::Number(num))
    }

    fn scan_identifier_or_ref(&mut self) -> FormulaResult<Token> {
        let start = self.pos;

        while self.peek_char().map_or(false, |c| {
            c.is_ascii_alphanumeric() || c == '_' || c == '$'
        }) {
            self.advance();
        }

        let text = &self.input[start..self.pos];

        // Boolean literals, unless followed by '(' (then a function named TRUE)
        let upper = text.to_uppercase();
        if upper == "TRUE" && self.peek_char() != Some('(') {
            return Ok(Token::Boolean(true));
        }
        if upper == "FALSE" && self.peek_char() != Some('(') {
            return Ok(Token::Boolean(false));
        }

        // Function names are always followed by an argument list
        if self.peek_char() == Some('(') {
            return Ok(Token::FuncName(upper));
        }

        // Anything else must be a valid A1 reference. References are
        // case-sensitive: `a1` is not a reference and fails here.
        match CellAddress::parse(text) {
            Ok(addr) => Ok(Token::CellRef(addr)),
            Err(_) => Err(FormulaError::Parse(format!(
                "Unrecognized identifier '{}'",
                text
            ))),
        }
    }

    // === Helpers ===

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_char_at(&self, offset: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(offset)
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().map_or(false, |c| c.is_whitespace()) {
            self.advance();
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.input.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tokenize(input: &str) -> FormulaResult<Vec<Token>> {
        let mut lexer = Lexer::new(input);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token()?;
            if token == Token::Eof {
                return Ok(tokens);
            }
            tokens.push(token);
        }
    }

    #[test]
    fn test_numbers() {
        assert_eq!(tokenize("42").unwrap(), vec![Token::Number(42.0)]);
        assert_eq!(tokenize("3.14").unwrap(), vec![Token::Number(3.14)]);
        assert_eq!(tokenize(".5").unwrap(), vec![Token::Number(0.5)]);
        assert_eq!(tokenize("1e3").unwrap(), vec![Token::Number(1000.0)]);
        assert_eq!(tokenize("2.5E-2").unwrap(), vec![Token::Number(0.025)]);
    }

    #[test]
    fn test_strings() {
        assert_eq!(
            tokenize("\"hello\"").unwrap(),
            vec![Token::Text("hello".to_string())]
        );
        assert_eq!(
            tokenize("\"say \"\"hi\"\"\"").unwrap(),
            vec![Token::Text("say \"hi\"".to_string())]
        );
    }

    #[test]
    fn test_unterminated_string() {
        assert!(tokenize("\"oops").is_err());
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            tokenize("+ - * / ^").unwrap(),
            vec![
                Token::Plus,
                Token::Minus,
                Token::Star,
                Token::Slash,
                Token::Caret
            ]
        );
        assert_eq!(
            tokenize("= <> < <= > >=").unwrap(),
            vec![
                Token::Equal,
                Token::NotEqual,
                Token::LessThan,
                Token::LessEqual,
                Token::GreaterThan,
                Token::GreaterEqual
            ]
        );
    }

    #[test]
    fn test_cell_references() {
        let tokens = tokenize("A1").unwrap();
        assert_eq!(tokens.len(), 1);
        match &tokens[0] {
            Token::CellRef(addr) => assert_eq!(addr.to_string(), "A1"),
            other => panic!("expected cell ref, got {:?}", other),
        }

        let tokens = tokenize("$B$2").unwrap();
        match &tokens[0] {
            Token::CellRef(addr) => {
                assert!(addr.row_absolute);
                assert!(addr.col_absolute);
            }
            other => panic!("expected cell ref, got {:?}", other),
        }
    }

    #[test]
    fn test_lowercase_ref_rejected() {
        assert!(tokenize("a1").is_err());
    }

    #[test]
    fn test_booleans_and_functions() {
        assert_eq!(tokenize("TRUE").unwrap(), vec![Token::Boolean(true)]);
        assert_eq!(tokenize("false").unwrap(), vec![Token::Boolean(false)]);

        let tokens = tokenize("sum(A1)").unwrap();
        assert_eq!(tokens[0], Token::FuncName("SUM".to_string()));
    }

    #[test]
    fn test_range_tokens() {
        let tokens = tokenize("A1:B2").unwrap();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[1], Token::Colon);
    }

    #[test]
    fn test_unexpected_char() {
        let err = tokenize("1 @ 2").unwrap_err();
        assert!(matches!(err, FormulaError::UnexpectedChar('@', _)));
    }

    #[test]
    fn test_whitespace_skipped() {
        assert_eq!(
            tokenize("  1  +  2  ").unwrap(),
            vec![Token::Number(1.0), Token::Plus, Token::Number(2.0)]
        );
    }
}
