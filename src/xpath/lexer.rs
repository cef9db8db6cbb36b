//! XPath lexer.
//!
//! Tokenizes XPath expressions. The accepted alphabet is the XPath 1.0
//! subset this engine evaluates: no namespace prefixes and no variable
//! references, since serialized accessibility documents contain neither.

/// XPath token types
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Operators
    Slash,       // /
    DoubleSlash, // //
    Dot,         // .
    DoubleDot,   // ..
    At,          // @
    Pipe,        // |
    Plus,        // +
    Minus,       // -
    Star,        // *
    Eq,          // =
    NotEq,       // !=
    Lt,          // <
    LtEq,        // <=
    Gt,          // >
    GtEq,        // >=
    And,         // and
    Or,          // or
    Mod,         // mod
    Div,         // div

    // Brackets
    LeftParen,    // (
    RightParen,   // )
    LeftBracket,  // [
    RightBracket, // ]

    // Literals
    Number(f64),
    String(String),

    // Names
    Name(String),     // NCName
    NodeType(String), // node(), text(), comment()

    // Axis
    Axis(String), // child::, descendant::, etc.

    // Special
    DoubleColon, // ::
    Comma,       // ,

    // Anything the grammar has no use for; the parser rejects it with
    // a syntax error instead of the lexer guessing.
    Unknown(char),

    // End of input
    Eof,
}

/// XPath lexer
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer
    pub fn new(input: &'a str) -> Self {
        Lexer { input, pos: 0 }
    }

    /// Get the remaining input
    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    /// Peek at current character
    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    /// Peek at character at offset
    fn peek_at(&self, offset: usize) -> Option<char> {
        self.remaining().chars().nth(offset)
    }

    /// Advance by n bytes
    fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.input.len());
    }

    /// Skip whitespace
    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.advance(c.len_utf8());
            } else {
                break;
            }
        }
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Result<Token, String> {
        self.skip_whitespace();

        let c = match self.peek() {
            Some(c) => c,
            None => return Ok(Token::Eof),
        };

        let token = match c {
            '/' => {
                self.advance(1);
                if self.peek() == Some('/') {
                    self.advance(1);
                    Token::DoubleSlash
                } else {
                    Token::Slash
                }
            }
            '.' => {
                self.advance(1);
                if self.peek() == Some('.') {
                    self.advance(1);
                    Token::DoubleDot
                } else if self.peek().map(|c| c.is_ascii_digit()).unwrap_or(false) {
                    // Number starting with .
                    self.pos -= 1;
                    self.read_number()
                } else {
                    Token::Dot
                }
            }
            '@' => {
                self.advance(1);
                Token::At
            }
            '|' => {
                self.advance(1);
                Token::Pipe
            }
            '+' => {
                self.advance(1);
                Token::Plus
            }
            '-' => {
                self.advance(1);
                Token::Minus
            }
            '*' => {
                self.advance(1);
                Token::Star
            }
            '=' => {
                self.advance(1);
                Token::Eq
            }
            '!' => {
                self.advance(1);
                if self.peek() == Some('=') {
                    self.advance(1);
                    Token::NotEq
                } else {
                    Token::Unknown('!')
                }
            }
            '<' => {
                self.advance(1);
                if self.peek() == Some('=') {
                    self.advance(1);
                    Token::LtEq
                } else {
                    Token::Lt
                }
            }
            '>' => {
                self.advance(1);
                if self.peek() == Some('=') {
                    self.advance(1);
                    Token::GtEq
                } else {
                    Token::Gt
                }
            }
            '(' => {
                self.advance(1);
                Token::LeftParen
            }
            ')' => {
                self.advance(1);
                Token::RightParen
            }
            '[' => {
                self.advance(1);
                Token::LeftBracket
            }
            ']' => {
                self.advance(1);
                Token::RightBracket
            }
            ',' => {
                self.advance(1);
                Token::Comma
            }
            ':' => {
                self.advance(1);
                if self.peek() == Some(':') {
                    self.advance(1);
                    Token::DoubleColon
                } else {
                    Token::Unknown(':')
                }
            }
            '"' | '\'' => self.read_string()?,
            '0'..='9' => self.read_number(),
            _ if is_name_start_char(c) => self.read_name_or_keyword(),
            _ => {
                self.advance(c.len_utf8());
                Token::Unknown(c)
            }
        };

        Ok(token)
    }

    /// Read a number literal
    fn read_number(&mut self) -> Token {
        let start = self.pos;

        // Integer part
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.advance(1);
            } else {
                break;
            }
        }

        // Decimal part
        if self.peek() == Some('.') && self.peek_at(1).map(|c| c.is_ascii_digit()).unwrap_or(false)
        {
            self.advance(1); // Skip '.'
            while let Some(c) = self.peek() {
                if c.is_ascii_digit() {
                    self.advance(1);
                } else {
                    break;
                }
            }
        }

        let num_str = &self.input[start..self.pos];
        let value = num_str.parse().unwrap_or(f64::NAN);
        Token::Number(value)
    }

    /// Read a string literal. An unterminated literal is a syntax error.
    fn read_string(&mut self) -> Result<Token, String> {
        let quote = match self.peek() {
            Some(q) => q,
            None => return Err("expected string literal".to_string()),
        };
        self.advance(1); // Skip opening quote

        let start = self.pos;
        let mut closed = false;

        while let Some(c) = self.peek() {
            if c == quote {
                closed = true;
                break;
            }
            self.advance(c.len_utf8());
        }

        if !closed {
            return Err("unterminated string literal".to_string());
        }

        let value = self.input[start..self.pos].to_string();
        self.advance(1); // Skip closing quote

        Ok(Token::String(value))
    }

    /// Read a name or keyword
    fn read_name_or_keyword(&mut self) -> Token {
        let start = self.pos;

        while let Some(c) = self.peek() {
            if is_name_char(c) {
                self.advance(c.len_utf8());
            } else {
                break;
            }
        }

        let name = &self.input[start..self.pos];

        match name {
            "and" => Token::And,
            "or" => Token::Or,
            "mod" => Token::Mod,
            "div" => Token::Div,
            _ => {
                // Followed by :: means this name is an axis specifier
                self.skip_whitespace();
                if self.remaining().starts_with("::") {
                    Token::Axis(name.to_string())
                } else if self.peek() == Some('(') {
                    match name {
                        "node" | "text" | "comment" => Token::NodeType(name.to_string()),
                        _ => Token::Name(name.to_string()),
                    }
                } else {
                    Token::Name(name.to_string())
                }
            }
        }
    }
}

fn is_name_start_char(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-' || c == '.'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(input);
        let mut out = Vec::new();
        loop {
            let token = lexer.next_token().unwrap();
            if token == Token::Eof {
                break;
            }
            out.push(token);
        }
        out
    }

    #[test]
    fn test_simple_path() {
        let mut lexer = Lexer::new("/Window/Button");
        assert_eq!(lexer.next_token().unwrap(), Token::Slash);
        assert_eq!(lexer.next_token().unwrap(), Token::Name("Window".to_string()));
        assert_eq!(lexer.next_token().unwrap(), Token::Slash);
        assert_eq!(lexer.next_token().unwrap(), Token::Name("Button".to_string()));
        assert_eq!(lexer.next_token().unwrap(), Token::Eof);
    }

    #[test]
    fn test_descendant() {
        assert_eq!(
            tokens("//Cell"),
            vec![Token::DoubleSlash, Token::Name("Cell".to_string())]
        );
    }

    #[test]
    fn test_predicate() {
        assert_eq!(
            tokens("Button[@name='OK']"),
            vec![
                Token::Name("Button".to_string()),
                Token::LeftBracket,
                Token::At,
                Token::Name("name".to_string()),
                Token::Eq,
                Token::String("OK".to_string()),
                Token::RightBracket,
            ]
        );
    }

    #[test]
    fn test_axis() {
        let mut lexer = Lexer::new("child::Button");
        assert_eq!(lexer.next_token().unwrap(), Token::Axis("child".to_string()));
        assert_eq!(lexer.next_token().unwrap(), Token::DoubleColon);
        assert_eq!(lexer.next_token().unwrap(), Token::Name("Button".to_string()));
    }

    #[test]
    fn test_number() {
        let toks = tokens("position() = 1");
        assert!(matches!(toks.last(), Some(Token::Number(n)) if *n == 1.0));
    }

    #[test]
    fn test_unterminated_string_is_error() {
        let mut lexer = Lexer::new("'dangling");
        assert!(lexer.next_token().is_err());
    }

    #[test]
    fn test_unknown_character_surfaces_as_token() {
        assert_eq!(tokens("#"), vec![Token::Unknown('#')]);
    }
}
