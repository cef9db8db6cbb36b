//! XPath parser.
//!
//! Recursive descent parser producing the expression AST. Any syntax the
//! lexer or grammar rejects surfaces as a caller-input error at the API
//! boundary, so error messages name the offending token.

use super::lexer::{Lexer, Token};

/// XPath expression AST node
#[derive(Debug, Clone)]
pub enum Expr {
    /// Root path (/)
    Root,
    /// Current context (.)
    Context,
    /// Parent (..)
    Parent,
    /// Union of two expressions (|)
    Union(Box<Expr>, Box<Expr>),
    /// Path expression (expr/step)
    Path(Box<Expr>, Box<Step>),
    /// Filter expression with predicate
    Filter(Box<Expr>, Box<Expr>),
    /// Function call
    Function(String, Vec<Expr>),
    /// Binary operation
    Binary(Box<Expr>, BinaryOp, Box<Expr>),
    /// Unary negation
    Negate(Box<Expr>),
    /// Literal number
    Number(f64),
    /// Literal string
    String(String),
    /// Location step
    Step(Box<Step>),
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

/// Location step in a path
#[derive(Debug, Clone)]
pub struct Step {
    pub axis: Axis,
    pub node_test: NodeTest,
    pub predicates: Vec<Expr>,
}

/// Supported XPath axes. The namespace axis is rejected at parse time:
/// serialized accessibility documents carry no namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Child,
    Descendant,
    DescendantOrSelf,
    Parent,
    Ancestor,
    AncestorOrSelf,
    FollowingSibling,
    PrecedingSibling,
    Following,
    Preceding,
    Self_,
    Attribute,
}

impl Axis {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "child" => Some(Axis::Child),
            "descendant" => Some(Axis::Descendant),
            "descendant-or-self" => Some(Axis::DescendantOrSelf),
            "parent" => Some(Axis::Parent),
            "ancestor" => Some(Axis::Ancestor),
            "ancestor-or-self" => Some(Axis::AncestorOrSelf),
            "following-sibling" => Some(Axis::FollowingSibling),
            "preceding-sibling" => Some(Axis::PrecedingSibling),
            "following" => Some(Axis::Following),
            "preceding" => Some(Axis::Preceding),
            "self" => Some(Axis::Self_),
            "attribute" => Some(Axis::Attribute),
            _ => None,
        }
    }
}

/// Node test in a location step
#[derive(Debug, Clone)]
pub enum NodeTest {
    /// Matches any element (*)
    Any,
    /// Matches elements with the given tag name
    Name(String),
    /// node() - matches any node
    Node,
    /// text() - accepted for XPath compatibility; never matches, the
    /// serialized document has no text nodes
    Text,
    /// comment() - accepted for XPath compatibility; never matches
    Comment,
}

/// XPath parser
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    peeked: Option<Token>,
}

impl<'a> Parser<'a> {
    /// Create a new parser
    pub fn new(input: &'a str) -> Result<Self, String> {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token()?;
        Ok(Parser {
            lexer,
            current,
            peeked: None,
        })
    }

    /// Parse a complete XPath expression; trailing input is an error.
    pub fn parse(&mut self) -> Result<Expr, String> {
        let expr = self.parse_expr()?;
        if self.current != Token::Eof {
            return Err(format!("unexpected trailing token: {:?}", self.current));
        }
        Ok(expr)
    }

    /// Advance to next token
    fn advance(&mut self) -> Result<(), String> {
        self.current = match self.peeked.take() {
            Some(t) => t,
            None => self.lexer.next_token()?,
        };
        Ok(())
    }

    /// Peek at next token
    fn peek(&mut self) -> Result<&Token, String> {
        if self.peeked.is_none() {
            self.peeked = Some(self.lexer.next_token()?);
        }
        Ok(self.peeked.as_ref().expect("peeked token just filled"))
    }

    fn expect(&mut self, token: Token, what: &str) -> Result<(), String> {
        if self.current != token {
            return Err(format!("expected {}, got {:?}", what, self.current));
        }
        self.advance()
    }

    /// Parse expression (top level)
    fn parse_expr(&mut self) -> Result<Expr, String> {
        self.parse_or_expr()
    }

    /// Parse or expression
    fn parse_or_expr(&mut self) -> Result<Expr, String> {
        let mut left = self.parse_and_expr()?;

        while self.current == Token::Or {
            self.advance()?;
            let right = self.parse_and_expr()?;
            left = Expr::Binary(Box::new(left), BinaryOp::Or, Box::new(right));
        }

        Ok(left)
    }

    /// Parse and expression
    fn parse_and_expr(&mut self) -> Result<Expr, String> {
        let mut left = self.parse_equality_expr()?;

        while self.current == Token::And {
            self.advance()?;
            let right = self.parse_equality_expr()?;
            left = Expr::Binary(Box::new(left), BinaryOp::And, Box::new(right));
        }

        Ok(left)
    }

    /// Parse equality expression
    fn parse_equality_expr(&mut self) -> Result<Expr, String> {
        let mut left = self.parse_relational_expr()?;

        loop {
            let op = match &self.current {
                Token::Eq => BinaryOp::Eq,
                Token::NotEq => BinaryOp::NotEq,
                _ => break,
            };
            self.advance()?;
            let right = self.parse_relational_expr()?;
            left = Expr::Binary(Box::new(left), op, Box::new(right));
        }

        Ok(left)
    }

    /// Parse relational expression
    fn parse_relational_expr(&mut self) -> Result<Expr, String> {
        let mut left = self.parse_additive_expr()?;

        loop {
            let op = match &self.current {
                Token::Lt => BinaryOp::Lt,
                Token::LtEq => BinaryOp::LtEq,
                Token::Gt => BinaryOp::Gt,
                Token::GtEq => BinaryOp::GtEq,
                _ => break,
            };
            self.advance()?;
            let right = self.parse_additive_expr()?;
            left = Expr::Binary(Box::new(left), op, Box::new(right));
        }

        Ok(left)
    }

    /// Parse additive expression
    fn parse_additive_expr(&mut self) -> Result<Expr, String> {
        let mut left = self.parse_multiplicative_expr()?;

        loop {
            let op = match &self.current {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance()?;
            let right = self.parse_multiplicative_expr()?;
            left = Expr::Binary(Box::new(left), op, Box::new(right));
        }

        Ok(left)
    }

    /// Parse multiplicative expression
    fn parse_multiplicative_expr(&mut self) -> Result<Expr, String> {
        let mut left = self.parse_unary_expr()?;

        loop {
            let op = match &self.current {
                Token::Star => BinaryOp::Mul,
                Token::Div => BinaryOp::Div,
                Token::Mod => BinaryOp::Mod,
                _ => break,
            };
            self.advance()?;
            let right = self.parse_unary_expr()?;
            left = Expr::Binary(Box::new(left), op, Box::new(right));
        }

        Ok(left)
    }

    /// Parse unary expression
    fn parse_unary_expr(&mut self) -> Result<Expr, String> {
        if self.current == Token::Minus {
            self.advance()?;
            let expr = self.parse_unary_expr()?;
            Ok(Expr::Negate(Box::new(expr)))
        } else {
            self.parse_union_expr()
        }
    }

    /// Parse union expression
    fn parse_union_expr(&mut self) -> Result<Expr, String> {
        let mut left = self.parse_path_expr()?;

        while self.current == Token::Pipe {
            self.advance()?;
            let right = self.parse_path_expr()?;
            left = Expr::Union(Box::new(left), Box::new(right));
        }

        Ok(left)
    }

    /// Parse path expression
    fn parse_path_expr(&mut self) -> Result<Expr, String> {
        let mut expr = match &self.current {
            Token::Slash => {
                self.advance()?;
                if matches!(
                    self.current,
                    Token::Eof
                        | Token::RightBracket
                        | Token::RightParen
                        | Token::Pipe
                        | Token::Comma
                ) {
                    // Just /
                    return Ok(Expr::Root);
                }
                let step = self.parse_step()?;
                Expr::Path(Box::new(Expr::Root), Box::new(step))
            }
            Token::DoubleSlash => {
                self.advance()?;
                // //step is shorthand for /descendant-or-self::node()/step
                let step = self.parse_step()?;
                Expr::Path(
                    Box::new(Expr::Path(
                        Box::new(Expr::Root),
                        Box::new(descendant_or_self_step()),
                    )),
                    Box::new(step),
                )
            }
            _ => return self.parse_filter_expr(),
        };

        // Path continuation (e.g. /Window/Cell//Button)
        loop {
            match &self.current {
                Token::Slash => {
                    self.advance()?;
                    let step = self.parse_step()?;
                    expr = Expr::Path(Box::new(expr), Box::new(step));
                }
                Token::DoubleSlash => {
                    self.advance()?;
                    let step = self.parse_step()?;
                    expr = Expr::Path(
                        Box::new(Expr::Path(
                            Box::new(expr),
                            Box::new(descendant_or_self_step()),
                        )),
                        Box::new(step),
                    );
                }
                Token::LeftBracket => {
                    self.advance()?;
                    let pred = self.parse_expr()?;
                    self.expect(Token::RightBracket, "]")?;
                    expr = Expr::Filter(Box::new(expr), Box::new(pred));
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    /// Parse filter expression
    fn parse_filter_expr(&mut self) -> Result<Expr, String> {
        let mut expr = self.parse_primary_expr()?;

        loop {
            match &self.current {
                Token::LeftBracket => {
                    self.advance()?;
                    let pred = self.parse_expr()?;
                    self.expect(Token::RightBracket, "]")?;
                    expr = Expr::Filter(Box::new(expr), Box::new(pred));
                }
                Token::Slash => {
                    self.advance()?;
                    let step = self.parse_step()?;
                    expr = Expr::Path(Box::new(expr), Box::new(step));
                }
                Token::DoubleSlash => {
                    self.advance()?;
                    let step = self.parse_step()?;
                    expr = Expr::Path(
                        Box::new(Expr::Path(
                            Box::new(expr),
                            Box::new(descendant_or_self_step()),
                        )),
                        Box::new(step),
                    );
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    /// Parse primary expression
    fn parse_primary_expr(&mut self) -> Result<Expr, String> {
        match &self.current {
            Token::Number(n) => {
                let n = *n;
                self.advance()?;
                Ok(Expr::Number(n))
            }
            Token::String(s) => {
                let s = s.clone();
                self.advance()?;
                Ok(Expr::String(s))
            }
            Token::LeftParen => {
                self.advance()?;
                let expr = self.parse_expr()?;
                self.expect(Token::RightParen, ")")?;
                Ok(expr)
            }
            Token::Name(name) => {
                let name = name.clone();
                if *self.peek()? == Token::LeftParen {
                    // Function call
                    self.advance()?;
                    self.advance()?; // Skip (
                    let args = self.parse_function_args()?;
                    Ok(Expr::Function(name, args))
                } else {
                    let step = self.parse_step()?;
                    Ok(Expr::Step(Box::new(step)))
                }
            }
            Token::NodeType(_) | Token::Star | Token::At | Token::Axis(_) => {
                let step = self.parse_step()?;
                Ok(Expr::Step(Box::new(step)))
            }
            Token::Dot => {
                self.advance()?;
                Ok(Expr::Context)
            }
            Token::DoubleDot => {
                self.advance()?;
                Ok(Expr::Parent)
            }
            _ => Err(format!("unexpected token: {:?}", self.current)),
        }
    }

    /// Parse a location step (child axis unless specified)
    fn parse_step(&mut self) -> Result<Step, String> {
        let mut axis = Axis::Child;

        // Abbreviated steps: .. is parent::node(), . is self::node()
        if self.current == Token::DoubleDot {
            self.advance()?;
            return Ok(Step {
                axis: Axis::Parent,
                node_test: NodeTest::Node,
                predicates: Vec::new(),
            });
        }
        if self.current == Token::Dot {
            self.advance()?;
            return Ok(Step {
                axis: Axis::Self_,
                node_test: NodeTest::Node,
                predicates: Vec::new(),
            });
        }

        // @ abbreviation for the attribute axis
        if self.current == Token::At {
            axis = Axis::Attribute;
            self.advance()?;
        }

        // Explicit axis specification
        if let Token::Axis(axis_name) = &self.current {
            axis = Axis::from_str(axis_name)
                .ok_or_else(|| format!("unknown axis: {}", axis_name))?;
            self.advance()?;
            self.expect(Token::DoubleColon, ":: after axis")?;
        }

        let node_test = match &self.current {
            Token::Star => {
                self.advance()?;
                NodeTest::Any
            }
            Token::Name(name) => {
                let name = name.clone();
                self.advance()?;
                NodeTest::Name(name)
            }
            Token::NodeType(name) => {
                let name = name.clone();
                self.advance()?;
                self.expect(Token::LeftParen, "( after node type")?;
                self.expect(Token::RightParen, ")")?;

                match name.as_str() {
                    "node" => NodeTest::Node,
                    "text" => NodeTest::Text,
                    "comment" => NodeTest::Comment,
                    _ => return Err(format!("unknown node type: {}", name)),
                }
            }
            _ => return Err(format!("expected node test, got {:?}", self.current)),
        };

        // Predicates
        let mut predicates = Vec::new();
        while self.current == Token::LeftBracket {
            self.advance()?;
            predicates.push(self.parse_expr()?);
            self.expect(Token::RightBracket, "]")?;
        }

        Ok(Step {
            axis,
            node_test,
            predicates,
        })
    }

    /// Parse function arguments
    fn parse_function_args(&mut self) -> Result<Vec<Expr>, String> {
        let mut args = Vec::new();

        if self.current != Token::RightParen {
            args.push(self.parse_expr()?);

            while self.current == Token::Comma {
                self.advance()?;
                args.push(self.parse_expr()?);
            }
        }

        self.expect(Token::RightParen, ")")?;
        Ok(args)
    }
}

fn descendant_or_self_step() -> Step {
    Step {
        axis: Axis::DescendantOrSelf,
        node_test: NodeTest::Node,
        predicates: Vec::new(),
    }
}

/// Parse an XPath expression string
pub fn parse(input: &str) -> Result<Expr, String> {
    Parser::new(input)?.parse()
}
