//! Calculator tool: evaluates mathematical expressions.
//!
//! Supports arithmetic (`+ - * / %`), powers (`^` or `**`), postfix `!`,
//! parentheses, the constants `pi` and `E`, and the usual trigonometric,
//! hyperbolic, logarithmic and rounding functions. The text is parsed into an
//! expression tree by a recursive-descent parser, evaluated in `f64`, and
//! rendered with 15 significant digits.

use async_trait::async_trait;
use atomchat_core::error::{ExpressionError, ToolError};
use atomchat_core::tool::{Tool, ToolResult};
use tracing::debug;

/// Significant digits used when rendering a result.
const SIGNIFICANT_DIGITS: i32 = 15;

/// Deepest nesting of parentheses, calls, signs and powers the parser accepts.
const MAX_DEPTH: usize = 100;

pub struct CalculatorTool;

#[async_trait]
impl Tool for CalculatorTool {
    fn name(&self) -> &str {
        "calculator"
    }

    fn description(&self) -> &str {
        "Tool for performing calculations. Supports basic arithmetic operations like addition, \
         subtraction, multiplication, and division, but also more complex operations like \
         exponentiation and trigonometric functions. Use this tool to evaluate mathematical \
         expressions."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "expression": {
                    "type": "string",
                    "description": "Mathematical expression to evaluate. For example, '2 + 2'."
                }
            },
            "required": ["expression"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let expr = arguments["expression"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'expression' argument".into()))?;

        let result = evaluate(expr)?;
        debug!(expression = %expr, result = %result, "Evaluated expression");

        Ok(ToolResult {
            call_id: String::new(),
            success: true,
            output: result.clone(),
            data: Some(serde_json::json!({ "result": result })),
        })
    }
}

/// Evaluate a mathematical expression and render the value as text.
pub fn evaluate(expression: &str) -> Result<String, ExpressionError> {
    let tree = parse(expression)?;
    let value = tree.eval()?;
    Ok(format_value(value))
}

/// Parse an expression into a tree without evaluating it.
pub fn parse(expression: &str) -> Result<Expr, ExpressionError> {
    let tokens = tokenize(expression)?;
    let mut parser = Parser::new(&tokens, expression.chars().count());
    let tree = parser.parse_expr()?;
    if let Some(tok) = parser.peek() {
        return Err(parse_error(
            tok.position,
            format!("unexpected {}", tok.kind.describe()),
        ));
    }
    Ok(tree)
}

/// Render a value with 15 significant digits.
///
/// Fixed notation is used while the decimal exponent lies in `(-5, 15)`,
/// scientific notation outside it. Zero renders as `0`.
pub fn format_value(value: f64) -> String {
    if value == 0.0 {
        return "0".into();
    }

    let precision = (SIGNIFICANT_DIGITS - 1) as usize;
    let scientific = format!("{:.*e}", precision, value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let exponent: i32 = match exponent.parse() {
        Ok(e) => e,
        Err(_) => return scientific,
    };

    if exponent > -5 && exponent < SIGNIFICANT_DIGITS {
        let decimals = (SIGNIFICANT_DIGITS - 1 - exponent) as usize;
        format!("{:.*}", decimals, value)
    } else {
        format!("{mantissa}e{exponent:+}")
    }
}

fn parse_error(position: usize, message: impl Into<String>) -> ExpressionError {
    ExpressionError::Parse {
        position,
        message: message.into(),
    }
}

fn eval_error(message: impl Into<String>) -> ExpressionError {
    ExpressionError::Evaluation(message.into())
}

/// Reject values that left the real line or overflowed.
fn real(value: f64, what: &str) -> Result<f64, ExpressionError> {
    if value.is_nan() {
        Err(eval_error(format!("{what} is not a real number")))
    } else if value.is_infinite() {
        Err(eval_error(format!("{what} is infinite")))
    } else {
        Ok(value)
    }
}

// ── Expression tree ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Symbol(String),
    Neg(Box<Expr>),
    Factorial(Box<Expr>),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call {
        function: Function,
        args: Vec<Expr>,
    },
}

impl Expr {
    /// Numerically evaluate the tree.
    pub fn eval(&self) -> Result<f64, ExpressionError> {
        match self {
            Expr::Number(n) => real(*n, "number"),
            Expr::Symbol(name) => match name.as_str() {
                "pi" => Ok(std::f64::consts::PI),
                "E" => Ok(std::f64::consts::E),
                other => Err(eval_error(format!("undefined symbol '{other}'"))),
            },
            Expr::Neg(inner) => Ok(-inner.eval()?),
            Expr::Factorial(inner) => factorial(inner.eval()?),
            Expr::Binary { op, lhs, rhs } => {
                let (a, b) = (lhs.eval()?, rhs.eval()?);
                let value = match op {
                    BinaryOp::Add => a + b,
                    BinaryOp::Sub => a - b,
                    BinaryOp::Mul => a * b,
                    BinaryOp::Div => {
                        if b == 0.0 {
                            return Err(eval_error("division by zero"));
                        }
                        a / b
                    }
                    BinaryOp::Mod => {
                        if b == 0.0 {
                            return Err(eval_error("modulo by zero"));
                        }
                        // Result takes the sign of the divisor.
                        let r = a % b;
                        if r != 0.0 && (r < 0.0) != (b < 0.0) { r + b } else { r }
                    }
                    BinaryOp::Pow => {
                        if a == 0.0 && b < 0.0 {
                            return Err(eval_error("division by zero"));
                        }
                        a.powf(b)
                    }
                };
                real(value, "result")
            }
            Expr::Call { function, args } => {
                let arity = function.arity();
                if !arity.accepts(args.len()) {
                    return Err(eval_error(format!(
                        "function takes {}, got {}",
                        arity.describe(),
                        args.len()
                    )));
                }
                let values = args.iter().map(Expr::eval).collect::<Result<Vec<_>, _>>()?;
                function.apply(&values)
            }
        }
    }
}

fn factorial(n: f64) -> Result<f64, ExpressionError> {
    if n < 0.0 || n.fract() != 0.0 {
        return Err(eval_error(format!(
            "factorial is only defined for non-negative integers, got {}",
            format_value(n)
        )));
    }
    let mut acc = 1.0_f64;
    let mut k = 2.0;
    while k <= n {
        acc *= k;
        if acc.is_infinite() {
            return Err(eval_error("factorial overflowed"));
        }
        k += 1.0;
    }
    Ok(acc)
}

// ── Functions ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
enum Arity {
    Exact(usize),
    Between(usize, usize),
    AtLeast(usize),
}

impl Arity {
    fn accepts(self, n: usize) -> bool {
        match self {
            Arity::Exact(k) => n == k,
            Arity::Between(lo, hi) => (lo..=hi).contains(&n),
            Arity::AtLeast(lo) => n >= lo,
        }
    }

    fn describe(self) -> String {
        match self {
            Arity::Exact(1) => "1 argument".into(),
            Arity::Exact(k) => format!("{k} arguments"),
            Arity::Between(lo, hi) => format!("{lo} to {hi} arguments"),
            Arity::AtLeast(lo) => format!("at least {lo} argument(s)"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Sin,
    Cos,
    Tan,
    Cot,
    Sec,
    Csc,
    Asin,
    Acos,
    Atan,
    Atan2,
    Sinh,
    Cosh,
    Tanh,
    Asinh,
    Acosh,
    Atanh,
    Exp,
    Log,
    Ln,
    Sqrt,
    Cbrt,
    Abs,
    Floor,
    Ceiling,
    Min,
    Max,
}

impl Function {
    fn lookup(name: &str) -> Option<Self> {
        let f = match name {
            "sin" => Self::Sin,
            "cos" => Self::Cos,
            "tan" => Self::Tan,
            "cot" => Self::Cot,
            "sec" => Self::Sec,
            "csc" => Self::Csc,
            "asin" => Self::Asin,
            "acos" => Self::Acos,
            "atan" => Self::Atan,
            "atan2" => Self::Atan2,
            "sinh" => Self::Sinh,
            "cosh" => Self::Cosh,
            "tanh" => Self::Tanh,
            "asinh" => Self::Asinh,
            "acosh" => Self::Acosh,
            "atanh" => Self::Atanh,
            "exp" => Self::Exp,
            "log" => Self::Log,
            "ln" => Self::Ln,
            "sqrt" => Self::Sqrt,
            "cbrt" => Self::Cbrt,
            "abs" | "Abs" => Self::Abs,
            "floor" => Self::Floor,
            "ceiling" | "ceil" => Self::Ceiling,
            "min" | "Min" => Self::Min,
            "max" | "Max" => Self::Max,
            _ => return None,
        };
        Some(f)
    }

    fn arity(self) -> Arity {
        match self {
            Self::Atan2 => Arity::Exact(2),
            Self::Log => Arity::Between(1, 2),
            Self::Min | Self::Max => Arity::AtLeast(1),
            _ => Arity::Exact(1),
        }
    }

    fn apply(self, args: &[f64]) -> Result<f64, ExpressionError> {
        let arg = |i: usize| {
            args.get(i)
                .copied()
                .ok_or_else(|| eval_error(format!("missing argument {}", i + 1)))
        };
        let x = arg(0)?;
        let reciprocal = |d: f64| {
            if d == 0.0 {
                Err(eval_error("division by zero"))
            } else {
                Ok(1.0 / d)
            }
        };
        let value = match self {
            Self::Sin => x.sin(),
            Self::Cos => x.cos(),
            Self::Tan => x.tan(),
            Self::Cot => reciprocal(x.tan())?,
            Self::Sec => reciprocal(x.cos())?,
            Self::Csc => reciprocal(x.sin())?,
            Self::Asin => x.asin(),
            Self::Acos => x.acos(),
            Self::Atan => x.atan(),
            Self::Atan2 => x.atan2(arg(1)?),
            Self::Sinh => x.sinh(),
            Self::Cosh => x.cosh(),
            Self::Tanh => x.tanh(),
            Self::Asinh => x.asinh(),
            Self::Acosh => x.acosh(),
            Self::Atanh => x.atanh(),
            Self::Exp => x.exp(),
            Self::Log if args.len() == 2 => {
                let base = arg(1)?.ln();
                if base == 0.0 {
                    return Err(eval_error("logarithm base must not be 1"));
                }
                real(x.ln(), "log")? / real(base, "log base")?
            }
            Self::Log | Self::Ln => x.ln(),
            Self::Sqrt => x.sqrt(),
            Self::Cbrt => x.cbrt(),
            Self::Abs => x.abs(),
            Self::Floor => x.floor(),
            Self::Ceiling => x.ceil(),
            Self::Min => args.iter().copied().fold(f64::INFINITY, f64::min),
            Self::Max => args.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        };
        real(value, "result")
    }
}

// ── Tokenizer ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    Bang,
    Comma,
    LParen,
    RParen,
}

impl TokenKind {
    fn describe(&self) -> String {
        match self {
            TokenKind::Number(n) => format!("number {n}"),
            TokenKind::Ident(name) => format!("identifier '{name}'"),
            TokenKind::Plus => "'+'".into(),
            TokenKind::Minus => "'-'".into(),
            TokenKind::Star => "'*'".into(),
            TokenKind::Slash => "'/'".into(),
            TokenKind::Percent => "'%'".into(),
            TokenKind::Caret => "'^'".into(),
            TokenKind::Bang => "'!'".into(),
            TokenKind::Comma => "','".into(),
            TokenKind::LParen => "'('".into(),
            TokenKind::RParen => "')'".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Token {
    kind: TokenKind,
    position: usize,
}

fn tokenize(input: &str) -> Result<Vec<Token>, ExpressionError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let start = i;
        let kind = match chars[i] {
            c if c.is_whitespace() => {
                i += 1;
                continue;
            }
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' if chars.get(i + 1) == Some(&'*') => {
                i += 1;
                TokenKind::Caret
            }
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '^' => TokenKind::Caret,
            '!' => TokenKind::Bang,
            ',' => TokenKind::Comma,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            c if c.is_ascii_digit() || c == '.' => {
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                // Exponent suffix: 1e3, 2.5E-4
                if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
                    let mut j = i + 1;
                    if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
                        j += 1;
                    }
                    if j < chars.len() && chars[j].is_ascii_digit() {
                        i = j;
                        while i < chars.len() && chars[i].is_ascii_digit() {
                            i += 1;
                        }
                    }
                }
                let text: String = chars[start..i].iter().collect();
                let num: f64 = text
                    .parse()
                    .map_err(|_| parse_error(start, format!("invalid number '{text}'")))?;
                tokens.push(Token {
                    kind: TokenKind::Number(num),
                    position: start,
                });
                continue;
            }
            c if c.is_alphabetic() || c == '_' => {
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                tokens.push(Token {
                    kind: TokenKind::Ident(chars[start..i].iter().collect()),
                    position: start,
                });
                continue;
            }
            c => return Err(parse_error(start, format!("unexpected character '{c}'"))),
        };
        tokens.push(Token {
            kind,
            position: start,
        });
        i += 1;
    }

    Ok(tokens)
}

// ── Parser ────────────────────────────────────────────────────────────────

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    end: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token], end: usize) -> Self {
        Self {
            tokens,
            pos: 0,
            end,
            depth: 0,
        }
    }

    /// Run `parse` one nesting level deeper.
    fn nested<T>(
        &mut self,
        position: usize,
        parse: impl FnOnce(&mut Self) -> Result<T, ExpressionError>,
    ) -> Result<T, ExpressionError> {
        if self.depth >= MAX_DEPTH {
            return Err(parse_error(
                position,
                format!("expression nested deeper than {MAX_DEPTH} levels"),
            ));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn position(&self) -> usize {
        self.peek().map_or(self.end, |t| t.position)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<&TokenKind> {
        self.peek().map(|t| &t.kind)
    }

    fn consume(&mut self) -> Option<&Token> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, kind: TokenKind) -> Result<(), ExpressionError> {
        let end = self.end;
        match self.consume() {
            Some(tok) if tok.kind == kind => Ok(()),
            Some(tok) => Err(parse_error(
                tok.position,
                format!("expected {}, found {}", kind.describe(), tok.kind.describe()),
            )),
            None => Err(parse_error(
                end,
                format!("expected {}, found end of expression", kind.describe()),
            )),
        }
    }

    // expr = term (('+' | '-') term)*
    fn parse_expr(&mut self) -> Result<Expr, ExpressionError> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::Plus) => BinaryOp::Add,
                Some(TokenKind::Minus) => BinaryOp::Sub,
                _ => break,
            };
            self.consume();
            let right = self.parse_term()?;
            left = Expr::Binary {
                op,
                lhs: Box::new(left),
                rhs: Box::new(right),
            };
        }
        Ok(left)
    }

    // term = unary (('*' | '/' | '%') unary)*
    fn parse_term(&mut self) -> Result<Expr, ExpressionError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::Star) => BinaryOp::Mul,
                Some(TokenKind::Slash) => BinaryOp::Div,
                Some(TokenKind::Percent) => BinaryOp::Mod,
                _ => break,
            };
            self.consume();
            let right = self.parse_unary()?;
            left = Expr::Binary {
                op,
                lhs: Box::new(left),
                rhs: Box::new(right),
            };
        }
        Ok(left)
    }

    // unary = ('-' | '+') unary | power
    fn parse_unary(&mut self) -> Result<Expr, ExpressionError> {
        let position = self.position();
        match self.peek_kind() {
            Some(TokenKind::Minus) => {
                self.consume();
                let operand = self.nested(position, Self::parse_unary)?;
                Ok(Expr::Neg(Box::new(operand)))
            }
            Some(TokenKind::Plus) => {
                self.consume();
                self.nested(position, Self::parse_unary)
            }
            _ => self.parse_power(),
        }
    }

    // power = postfix ('^' unary)?
    fn parse_power(&mut self) -> Result<Expr, ExpressionError> {
        let base = self.parse_postfix()?;
        if let Some(TokenKind::Caret) = self.peek_kind() {
            let position = self.position();
            self.consume();
            let exponent = self.nested(position, Self::parse_unary)?;
            return Ok(Expr::Binary {
                op: BinaryOp::Pow,
                lhs: Box::new(base),
                rhs: Box::new(exponent),
            });
        }
        Ok(base)
    }

    // postfix = primary '!'*
    fn parse_postfix(&mut self) -> Result<Expr, ExpressionError> {
        let mut value = self.parse_primary()?;
        while let Some(TokenKind::Bang) = self.peek_kind() {
            self.consume();
            value = Expr::Factorial(Box::new(value));
        }
        Ok(value)
    }

    // primary = NUMBER | IDENT | IDENT '(' args ')' | '(' expr ')'
    fn parse_primary(&mut self) -> Result<Expr, ExpressionError> {
        let end = self.end;
        let Some(tok) = self.consume().cloned() else {
            return Err(parse_error(end, "unexpected end of expression"));
        };
        match tok.kind {
            TokenKind::Number(n) => Ok(Expr::Number(n)),
            TokenKind::Ident(name) => {
                if let Some(TokenKind::LParen) = self.peek_kind() {
                    self.consume();
                    self.parse_call(name, tok.position)
                } else {
                    Ok(Expr::Symbol(name))
                }
            }
            TokenKind::LParen => {
                let value = self.nested(tok.position, Self::parse_expr)?;
                self.expect(TokenKind::RParen)?;
                Ok(value)
            }
            other => Err(parse_error(
                tok.position,
                format!("unexpected {}", other.describe()),
            )),
        }
    }

    fn parse_call(&mut self, name: String, position: usize) -> Result<Expr, ExpressionError> {
        let mut args = Vec::new();
        if let Some(TokenKind::RParen) = self.peek_kind() {
            self.consume();
        } else {
            loop {
                args.push(self.nested(position, Self::parse_expr)?);
                match self.peek_kind() {
                    Some(TokenKind::Comma) => {
                        self.consume();
                    }
                    _ => {
                        self.expect(TokenKind::RParen)?;
                        break;
                    }
                }
            }
        }

        let Some(function) = Function::lookup(&name) else {
            return Err(eval_error(format!("undefined function '{name}'")));
        };
        let arity = function.arity();
        if !arity.accepts(args.len()) {
            return Err(parse_error(
                position,
                format!(
                    "{name}() takes {}, got {}",
                    arity.describe(),
                    args.len()
                ),
            ));
        }
        Ok(Expr::Call { function, args })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn value(expr: &str) -> f64 {
        evaluate(expr).unwrap().parse().unwrap()
    }

    #[test]
    fn simple_addition() {
        assert_eq!(evaluate("2 + 2").unwrap(), "4.00000000000000");
    }

    #[test]
    fn operator_precedence() {
        assert_eq!(value("2 + 3 * 4"), 14.0);
    }

    #[test]
    fn parentheses() {
        assert_eq!(value("((1 + 2) * (3 + 4))"), 21.0);
    }

    #[test]
    fn division() {
        assert_eq!(evaluate("10 / 4").unwrap(), "2.50000000000000");
    }

    #[test]
    fn power_is_right_associative() {
        assert_eq!(evaluate("2^3^2").unwrap(), "512.000000000000");
        assert_eq!(value("2**10"), 1024.0);
    }

    #[test]
    fn negation_binds_looser_than_power() {
        assert_eq!(value("-2^2"), -4.0);
        assert_eq!(value("2^-1"), 0.5);
    }

    #[test]
    fn trig_expression() {
        let v = value("sin(0.5)*3^2");
        assert!((v - 0.5_f64.sin() * 9.0).abs() < 1e-12);
    }

    #[test]
    fn constants() {
        assert_eq!(evaluate("pi").unwrap(), "3.14159265358979");
        assert!((value("log(E)") - 1.0).abs() < 1e-12);
    }

    #[test]
    fn two_argument_log() {
        assert!((value("log(8, 2)") - 3.0).abs() < 1e-12);
    }

    #[test]
    fn modulo_follows_divisor_sign() {
        assert_eq!(value("7 % 3"), 1.0);
        assert_eq!(value("-7 % 3"), 2.0);
    }

    #[test]
    fn factorial() {
        assert_eq!(evaluate("5!").unwrap(), "120.000000000000");
        assert!(matches!(evaluate("2.5!"), Err(ExpressionError::Evaluation(_))));
    }

    #[test]
    fn variadic_min_max() {
        assert_eq!(value("max(1, 7, 3)"), 7.0);
        assert_eq!(value("Min(4, -2)"), -2.0);
    }

    #[test]
    fn scientific_input_and_output() {
        assert_eq!(evaluate("1e20").unwrap(), "1.00000000000000e+20");
        assert_eq!(evaluate("0.000001").unwrap(), "1.00000000000000e-6");
        assert_eq!(evaluate("0.001").unwrap(), "0.00100000000000000");
    }

    #[test]
    fn zero_renders_plainly() {
        assert_eq!(evaluate("2 - 2").unwrap(), "0");
    }

    #[test]
    fn division_by_zero() {
        assert!(matches!(evaluate("1/0"), Err(ExpressionError::Evaluation(_))));
        assert!(matches!(evaluate("5 % 0"), Err(ExpressionError::Evaluation(_))));
        assert!(matches!(evaluate("0^-1"), Err(ExpressionError::Evaluation(_))));
    }

    #[test]
    fn non_real_results() {
        assert!(matches!(evaluate("sqrt(-1)"), Err(ExpressionError::Evaluation(_))));
        assert!(matches!(evaluate("log(0)"), Err(ExpressionError::Evaluation(_))));
        assert!(matches!(evaluate("asin(2)"), Err(ExpressionError::Evaluation(_))));
    }

    #[test]
    fn unknown_names_fail_evaluation() {
        assert!(matches!(evaluate("x + 1"), Err(ExpressionError::Evaluation(_))));
        assert!(matches!(evaluate("foo(2)"), Err(ExpressionError::Evaluation(_))));
    }

    #[test]
    fn invalid_expression() {
        assert!(matches!(evaluate("2 +"), Err(ExpressionError::Parse { .. })));
        assert!(matches!(evaluate(""), Err(ExpressionError::Parse { .. })));
        assert!(matches!(evaluate("(1 + 2"), Err(ExpressionError::Parse { .. })));
        assert!(matches!(evaluate("2 $ 3"), Err(ExpressionError::Parse { position: 2, .. })));
    }

    #[test]
    fn wrong_arity_is_a_parse_error() {
        assert!(matches!(evaluate("sin(1, 2)"), Err(ExpressionError::Parse { .. })));
        assert!(matches!(evaluate("atan2(1)"), Err(ExpressionError::Parse { .. })));
    }

    #[test]
    fn trailing_tokens_rejected() {
        let err = evaluate("2 3").unwrap_err();
        assert_eq!(
            err,
            ExpressionError::Parse {
                position: 2,
                message: "unexpected number 3".into()
            }
        );
    }

    #[test]
    fn rounding_carries_into_next_digit() {
        assert_eq!(format_value(9.999999999999998), "10.0000000000000");
    }

    #[test]
    fn parse_builds_tree() {
        let tree = parse("1 + 2").unwrap();
        assert!(matches!(tree, Expr::Binary { op: BinaryOp::Add, .. }));
    }

    #[tokio::test]
    async fn tool_execute() {
        let tool = CalculatorTool;
        let result = tool
            .execute(serde_json::json!({"expression": "2 + 3"}))
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.output, "5.00000000000000");
        assert_eq!(result.data.unwrap()["result"], "5.00000000000000");
    }

    #[tokio::test]
    async fn tool_surfaces_evaluation_errors() {
        let tool = CalculatorTool;
        let err = tool
            .execute(serde_json::json!({"expression": "1/0"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Expression(ExpressionError::Evaluation(_))));
    }

    #[tokio::test]
    async fn tool_missing_expression() {
        let tool = CalculatorTool;
        let result = tool.execute(serde_json::json!({})).await;
        assert!(matches!(result, Err(ToolError::InvalidArguments(_))));
    }

    #[test]
    fn tool_definition() {
        let tool = CalculatorTool;
        let def = tool.to_definition();
        assert_eq!(def.name, "calculator");
        assert_eq!(def.parameters["required"][0], "expression");
    }

    #[test]
    fn overflowing_literal_is_evaluation_error() {
        for expr in ["1e400", "-1e400", "2 * 1e309"] {
            assert!(
                matches!(evaluate(expr), Err(ExpressionError::Evaluation(_))),
                "{expr} should not evaluate"
            );
        }
        assert_eq!(evaluate("1e300").unwrap(), "1.00000000000000e+300");
    }

    #[test]
    fn deep_nesting_is_parse_error() {
        let depth = 2000;
        let parens = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
        let signs = format!("{}1", "-".repeat(depth));
        let powers = format!("{}1", "1^".repeat(depth));
        let calls = format!("{}1{}", "abs(".repeat(depth), ")".repeat(depth));

        for expr in [parens, signs, powers, calls] {
            assert!(matches!(evaluate(&expr), Err(ExpressionError::Parse { .. })));
        }
    }

    #[test]
    fn moderate_nesting_still_evaluates() {
        let parens = format!("{}7{}", "(".repeat(50), ")".repeat(50));
        assert_eq!(evaluate(&parens).unwrap(), "7.00000000000000");
        assert_eq!(evaluate("--2").unwrap(), "2.00000000000000");
    }

    #[test]
    fn hand_built_call_with_wrong_arity_is_rejected() {
        let tree = Expr::Call {
            function: Function::Atan2,
            args: vec![],
        };
        assert!(matches!(tree.eval(), Err(ExpressionError::Evaluation(_))));

        let tree = Expr::Call {
            function: Function::Log,
            args: vec![Expr::Number(1.0), Expr::Number(2.0), Expr::Number(3.0)],
        };
        assert!(matches!(tree.eval(), Err(ExpressionError::Evaluation(_))));
    }

    #[test]
    fn hand_built_infinite_number_is_rejected() {
        assert!(matches!(
            Expr::Number(f64::INFINITY).eval(),
            Err(ExpressionError::Evaluation(_))
        ));
    }
}
