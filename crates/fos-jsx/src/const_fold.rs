//! Constant Folding
//!
//! Evaluates the JavaScript inside an expression container when its value
//! is known at compile time (`{"a" + 1}`, `{-2}`, `{true ? "x" : "y"}`), so
//! the partial builder can inline it like a literal. Anything that reads a
//! binding, calls a function or builds an object is [`ConstValue::Dynamic`].

use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};

/// Constant value
#[derive(Debug, Clone, PartialEq)]
pub enum ConstValue {
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(Box<str>),
    /// Not a constant
    Dynamic,
}

impl ConstValue {
    pub fn is_dynamic(&self) -> bool {
        matches!(self, ConstValue::Dynamic)
    }

    /// Check if definitely truthy
    pub fn is_truthy(&self) -> Option<bool> {
        match self {
            ConstValue::Undefined | ConstValue::Null => Some(false),
            ConstValue::Boolean(b) => Some(*b),
            ConstValue::Number(n) => Some(*n != 0.0 && !n.is_nan()),
            ConstValue::String(s) => Some(!s.is_empty()),
            ConstValue::Dynamic => None,
        }
    }

    /// `ToNumber`
    fn to_number(&self) -> Option<f64> {
        match self {
            ConstValue::Undefined => Some(f64::NAN),
            ConstValue::Null => Some(0.0),
            ConstValue::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            ConstValue::Number(n) => Some(*n),
            ConstValue::String(s) => {
                let s = s.trim();
                if s.is_empty() {
                    Some(0.0)
                } else {
                    Some(s.parse::<f64>().unwrap_or(f64::NAN))
                }
            }
            ConstValue::Dynamic => None,
        }
    }

    /// `ToString`, as template text would show it
    pub fn to_js_string(&self) -> Option<String> {
        match self {
            ConstValue::Undefined => Some("undefined".to_string()),
            ConstValue::Null => Some("null".to_string()),
            ConstValue::Boolean(b) => Some(b.to_string()),
            ConstValue::Number(n) => Some(number_to_string(*n)),
            ConstValue::String(s) => Some(s.to_string()),
            ConstValue::Dynamic => None,
        }
    }

    /// Try to fold binary operation
    pub fn fold_binary(&self, op: BinaryOp, other: &ConstValue) -> ConstValue {
        use BinaryOp::*;
        use ConstValue::*;

        if self.is_dynamic() || other.is_dynamic() {
            return Dynamic;
        }
        match op {
            And => match self.is_truthy() {
                Some(true) => other.clone(),
                _ => self.clone(),
            },
            Or => match self.is_truthy() {
                Some(false) => other.clone(),
                _ => self.clone(),
            },
            Nullish => match self {
                Undefined | Null => other.clone(),
                _ => self.clone(),
            },
            Add => match (self, other) {
                (String(_), _) | (_, String(_)) => match (self.to_js_string(), other.to_js_string()) {
                    (Some(a), Some(b)) => String(format!("{}{}", a, b).into()),
                    _ => Dynamic,
                },
                _ => self.numeric(other, |a, b| a + b),
            },
            Sub => self.numeric(other, |a, b| a - b),
            Mul => self.numeric(other, |a, b| a * b),
            Div => self.numeric(other, |a, b| a / b),
            Mod => self.numeric(other, |a, b| a % b),
            Pow => self.numeric(other, f64::powf),
            Lt | Le | Gt | Ge => {
                let ordering = match (self, other) {
                    (String(a), String(b)) => Some(a.cmp(b)),
                    _ => match (self.to_number(), other.to_number()) {
                        (Some(a), Some(b)) => a.partial_cmp(&b),
                        _ => return Dynamic,
                    },
                };
                let Some(ordering) = ordering else {
                    // NaN compares false every way
                    return Boolean(false);
                };
                Boolean(match op {
                    Lt => ordering.is_lt(),
                    Le => ordering.is_le(),
                    Gt => ordering.is_gt(),
                    _ => ordering.is_ge(),
                })
            }
            StrictEq => Boolean(self.strict_equals(other)),
            StrictNe => Boolean(!self.strict_equals(other)),
            Eq => self.loose_equals(other).map_or(Dynamic, Boolean),
            Ne => self.loose_equals(other).map_or(Dynamic, |eq| Boolean(!eq)),
            BitAnd | BitOr | BitXor => match (self.to_number(), other.to_number()) {
                (Some(a), Some(b)) => {
                    let (a, b) = (to_int32(a), to_int32(b));
                    Number(match op {
                        BitAnd => a & b,
                        BitOr => a | b,
                        _ => a ^ b,
                    } as f64)
                }
                _ => Dynamic,
            },
        }
    }

    fn numeric(&self, other: &ConstValue, f: impl FnOnce(f64, f64) -> f64) -> ConstValue {
        match (self.to_number(), other.to_number()) {
            (Some(a), Some(b)) => ConstValue::Number(f(a, b)),
            _ => ConstValue::Dynamic,
        }
    }

    fn strict_equals(&self, other: &ConstValue) -> bool {
        match (self, other) {
            (ConstValue::Number(a), ConstValue::Number(b)) => a == b,
            _ => self == other,
        }
    }

    fn loose_equals(&self, other: &ConstValue) -> Option<bool> {
        use ConstValue::*;
        Some(match (self, other) {
            (Undefined | Null, Undefined | Null) => true,
            (Undefined | Null, _) | (_, Undefined | Null) => false,
            (String(a), String(b)) => a == b,
            _ => self.to_number()? == other.to_number()?,
        })
    }

    /// Try to fold unary operation
    pub fn fold_unary(&self, op: UnaryOp) -> ConstValue {
        use ConstValue::*;
        use UnaryOp::*;

        if self.is_dynamic() {
            return Dynamic;
        }
        match op {
            Neg => self.to_number().map_or(Dynamic, |n| Number(-n)),
            Plus => self.to_number().map_or(Dynamic, Number),
            Not => self.is_truthy().map_or(Dynamic, |t| Boolean(!t)),
            BitNot => self.to_number().map_or(Dynamic, |n| Number(!to_int32(n) as f64)),
            Void => Undefined,
            Typeof => String(
                match self {
                    Undefined => "undefined",
                    Null => "object",
                    Boolean(_) => "boolean",
                    Number(_) => "number",
                    String(_) => "string",
                    Dynamic => return Dynamic,
                }
                .into(),
            ),
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    StrictEq,
    StrictNe,
    And,
    Or,
    Nullish,
    BitAnd,
    BitOr,
    BitXor,
}

impl BinaryOp {
    /// Operator and binding power for a token
    fn from_token(kind: &TokenKind) -> Option<(BinaryOp, u8)> {
        Some(match kind {
            TokenKind::PipePipe => (BinaryOp::Or, 1),
            TokenKind::QuestionQuestion => (BinaryOp::Nullish, 1),
            TokenKind::AmpersandAmpersand => (BinaryOp::And, 2),
            TokenKind::Pipe => (BinaryOp::BitOr, 3),
            TokenKind::Caret => (BinaryOp::BitXor, 4),
            TokenKind::Ampersand => (BinaryOp::BitAnd, 5),
            TokenKind::EqEq => (BinaryOp::Eq, 6),
            TokenKind::NotEq => (BinaryOp::Ne, 6),
            TokenKind::EqEqEq => (BinaryOp::StrictEq, 6),
            TokenKind::NotEqEq => (BinaryOp::StrictNe, 6),
            TokenKind::LessThan => (BinaryOp::Lt, 7),
            TokenKind::LessThanEq => (BinaryOp::Le, 7),
            TokenKind::GreaterThan => (BinaryOp::Gt, 7),
            TokenKind::GreaterThanEq => (BinaryOp::Ge, 7),
            TokenKind::Plus => (BinaryOp::Add, 9),
            TokenKind::Minus => (BinaryOp::Sub, 9),
            TokenKind::Star => (BinaryOp::Mul, 10),
            TokenKind::Slash => (BinaryOp::Div, 10),
            TokenKind::Percent => (BinaryOp::Mod, 10),
            TokenKind::StarStar => (BinaryOp::Pow, 11),
            _ => return None,
        })
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
    BitNot,
    Typeof,
    Void,
}

/// Fold the source of an expression. Returns [`ConstValue::Dynamic`] unless
/// the whole expression is a compile-time constant.
pub fn fold_expression(source: &str) -> ConstValue {
    let tokens = Lexer::new(source).tokenize();
    let mut folder = Folder { tokens, pos: 0 };
    let value = folder.expression();
    match value {
        Some(value) if folder.at_end() => value,
        _ => ConstValue::Dynamic,
    }
}

/// Precedence-climbing evaluator over the token stream. `None` means the
/// expression is outside the foldable subset.
struct Folder {
    tokens: Vec<Token>,
    pos: usize,
}

impl Folder {
    fn peek(&self) -> &TokenKind {
        self.tokens
            .get(self.pos)
            .map(|t| &t.kind)
            .unwrap_or(&TokenKind::Eof)
    }

    fn bump(&mut self) -> TokenKind {
        let kind = self.peek().clone();
        self.pos += 1;
        kind
    }

    fn at_end(&self) -> bool {
        *self.peek() == TokenKind::Eof
    }

    fn expression(&mut self) -> Option<ConstValue> {
        let test = self.binary(0)?;
        if *self.peek() != TokenKind::Question {
            return Some(test);
        }
        self.bump();
        let consequent = self.expression()?;
        if self.bump() != TokenKind::Colon {
            return None;
        }
        let alternate = self.expression()?;
        match test.is_truthy()? {
            true => Some(consequent),
            false => Some(alternate),
        }
    }

    fn binary(&mut self, min_power: u8) -> Option<ConstValue> {
        let mut left = self.unary()?;
        while let Some((op, power)) = BinaryOp::from_token(self.peek()) {
            if power < min_power {
                break;
            }
            self.bump();
            // `**` is right associative
            let next = if op == BinaryOp::Pow { power } else { power + 1 };
            let right = self.binary(next)?;
            left = left.fold_binary(op, &right);
            if left.is_dynamic() {
                return None;
            }
        }
        Some(left)
    }

    fn unary(&mut self) -> Option<ConstValue> {
        let op = match self.peek() {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::Tilde => UnaryOp::BitNot,
            TokenKind::Typeof => UnaryOp::Typeof,
            TokenKind::Void => UnaryOp::Void,
            _ => return self.primary(),
        };
        self.bump();
        let value = self.unary()?.fold_unary(op);
        (!value.is_dynamic()).then_some(value)
    }

    fn primary(&mut self) -> Option<ConstValue> {
        match self.bump() {
            TokenKind::Number(n) => Some(ConstValue::Number(n)),
            TokenKind::String(s) | TokenKind::Template(s) => Some(ConstValue::String(s)),
            TokenKind::Boolean(b) => Some(ConstValue::Boolean(b)),
            TokenKind::Null => Some(ConstValue::Null),
            TokenKind::Undefined => Some(ConstValue::Undefined),
            TokenKind::LParen => {
                let value = self.expression()?;
                (self.bump() == TokenKind::RParen).then_some(value)
            }
            _ => None,
        }
    }
}

/// `Number.prototype.toString` for the common cases
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else {
        format!("{}", n)
    }
}

fn to_int32(n: f64) -> i32 {
    if !n.is_finite() {
        return 0;
    }
    (n.trunc() as i64 & 0xffff_ffff) as u32 as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fold(source: &str) -> ConstValue {
        fold_expression(source)
    }

    #[test]
    fn test_literals() {
        assert_eq!(fold("42"), ConstValue::Number(42.0));
        assert_eq!(fold("'a'"), ConstValue::String("a".into()));
        assert_eq!(fold("`t`"), ConstValue::String("t".into()));
        assert_eq!(fold("null"), ConstValue::Null);
        assert_eq!(fold("(true)"), ConstValue::Boolean(true));
    }

    #[test]
    fn test_arithmetic_and_concat() {
        assert_eq!(fold("1 + 2 * 3"), ConstValue::Number(7.0));
        assert_eq!(fold("(1 + 2) * 3"), ConstValue::Number(9.0));
        assert_eq!(fold("'a' + 1 + 2"), ConstValue::String("a12".into()));
        assert_eq!(fold("1 + 2 + 'a'"), ConstValue::String("3a".into()));
        assert_eq!(fold("2 ** 3 ** 2"), ConstValue::Number(512.0));
        assert_eq!(fold("-'3'"), ConstValue::Number(-3.0));
    }

    #[test]
    fn test_logic_and_conditional() {
        assert_eq!(fold("!0"), ConstValue::Boolean(true));
        assert_eq!(fold("0 || 'x'"), ConstValue::String("x".into()));
        assert_eq!(fold("null ?? 5"), ConstValue::Number(5.0));
        assert_eq!(fold("1 < 2 ? 'a' : 'b'"), ConstValue::String("a".into()));
        assert_eq!(fold("null == undefined"), ConstValue::Boolean(true));
        assert_eq!(fold("'1' === 1"), ConstValue::Boolean(false));
        assert_eq!(fold("typeof null"), ConstValue::String("object".into()));
        assert_eq!(fold("void 0"), ConstValue::Undefined);
    }

    #[test]
    fn test_dynamic() {
        assert!(fold("x").is_dynamic());
        assert!(fold("1 + x").is_dynamic());
        assert!(fold("f()").is_dynamic());
        assert!(fold("`a${b}`").is_dynamic());
        assert!(fold("1 2").is_dynamic());
        assert!(fold("").is_dynamic());
    }

    #[test]
    fn test_number_to_string() {
        assert_eq!(number_to_string(1.0), "1");
        assert_eq!(number_to_string(-0.0), "0");
        assert_eq!(number_to_string(0.5), "0.5");
        assert_eq!(number_to_string(f64::NAN), "NaN");
    }
}
