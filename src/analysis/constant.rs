//! Compile-time constant evaluation.
//!
//! [`evaluate`] folds integral constant expressions with overflow detection.
//! Overflow is an expected outcome, reported as [`ConstantError::Overflow`]
//! rather than wrapping silently. [`constant_value`] is the general folder
//! used for booleans and strings.

use crate::model::{SemanticModel, Type};
use crate::tree::{BinaryOp, ConstValue, Literal, Node, NodeData, PrimitiveKind, UnaryOp};
use std::fmt;
use thiserror::Error;

/// An integral value after binary numeric promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Number {
    Int(i32),
    Long(i64),
}

impl Number {
    pub fn as_i64(self) -> i64 {
        match self {
            Number::Int(v) => v as i64,
            Number::Long(v) => v,
        }
    }

    pub fn is_long(self) -> bool {
        matches!(self, Number::Long(_))
    }

    fn from_const(value: &ConstValue) -> Option<Number> {
        match value {
            ConstValue::Int(v) => Some(Number::Int(*v)),
            ConstValue::Long(v) => Some(Number::Long(*v)),
            ConstValue::Char(c) => Some(Number::Int(*c as i32)),
            _ => None,
        }
    }

    pub fn to_const(self) -> ConstValue {
        match self {
            Number::Int(v) => ConstValue::Int(v),
            Number::Long(v) => ConstValue::Long(v),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(v) => write!(f, "{v}"),
            Number::Long(v) => write!(f, "{v}L"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConstantError {
    #[error("compile-time constant expression overflows")]
    Overflow,
    #[error("division by zero in constant expression")]
    DivisionByZero,
}

/// `Ok(None)` means "not an integral constant".
pub type ConstantResult = Result<Option<Number>, ConstantError>;

/// Evaluate an integral constant expression.
///
/// `+ - *` are checked. `/` and `%` follow Java (`MIN / -1` wraps) but a
/// zero divisor is an error. Shifts mask the distance and keep the width of
/// the left operand. Unary minus wraps, as in Java. Both arms of a ternary
/// are evaluated, so an overflow in either one is reported.
pub fn evaluate(node: Node<'_>, model: &SemanticModel) -> ConstantResult {
    match node.data() {
        NodeData::Parenthesized { .. } => evaluate(node.skip_parens(), model),
        NodeData::Literal(Literal::Value(v)) => Ok(Number::from_const(v)),
        NodeData::Literal(Literal::Null) => Ok(None),
        NodeData::Identifier { .. } | NodeData::MemberSelect { .. } => Ok(node
            .symbol()
            .and_then(|s| model.symbol(s).constant.as_ref())
            .and_then(Number::from_const)),
        NodeData::Unary { op, operand } => {
            let Some(value) = evaluate(node.tree().node(*operand), model)? else {
                return Ok(None);
            };
            Ok(unary(*op, value))
        }
        NodeData::Binary { op, lhs, rhs } => {
            let tree = node.tree();
            let lhs = evaluate(tree.node(*lhs), model)?;
            let rhs = evaluate(tree.node(*rhs), model)?;
            match (lhs, rhs) {
                (Some(l), Some(r)) => binary(*op, l, r),
                _ => Ok(None),
            }
        }
        NodeData::TypeCast { target, expr } => {
            let tree = node.tree();
            let Some(value) = evaluate(tree.node(*expr), model)? else {
                return Ok(None);
            };
            match tree.node(*target).data() {
                NodeData::PrimitiveType(kind) => Ok(cast(*kind, value)),
                _ => Ok(None),
            }
        }
        NodeData::Conditional {
            cond,
            then_expr,
            else_expr,
        } => {
            let tree = node.tree();
            let if_true = evaluate(tree.node(*then_expr), model)?;
            let if_false = evaluate(tree.node(*else_expr), model)?;
            match constant_value(tree.node(*cond), model).and_then(|c| c.as_bool()) {
                Some(true) => Ok(if_true),
                Some(false) => Ok(if_false),
                None => Ok(None),
            }
        }
        _ => Ok(None),
    }
}

fn unary(op: UnaryOp, value: Number) -> Option<Number> {
    Some(match (op, value) {
        (UnaryOp::Plus, v) => v,
        (UnaryOp::Minus, Number::Int(v)) => Number::Int(v.wrapping_neg()),
        (UnaryOp::Minus, Number::Long(v)) => Number::Long(v.wrapping_neg()),
        (UnaryOp::BitNot, Number::Int(v)) => Number::Int(!v),
        (UnaryOp::BitNot, Number::Long(v)) => Number::Long(!v),
        _ => return None,
    })
}

fn binary(op: BinaryOp, lhs: Number, rhs: Number) -> ConstantResult {
    if op.is_shift() {
        let distance = rhs.as_i64();
        return Ok(Some(match lhs {
            Number::Int(l) => {
                let d = (distance & 0x1f) as u32;
                Number::Int(match op {
                    BinaryOp::Shl => l.wrapping_shl(d),
                    BinaryOp::Shr => l >> d,
                    _ => ((l as u32) >> d) as i32,
                })
            }
            Number::Long(l) => {
                let d = (distance & 0x3f) as u32;
                Number::Long(match op {
                    BinaryOp::Shl => l.wrapping_shl(d),
                    BinaryOp::Shr => l >> d,
                    _ => ((l as u64) >> d) as i64,
                })
            }
        }));
    }

    if lhs.is_long() || rhs.is_long() {
        long_op(op, lhs.as_i64(), rhs.as_i64()).map(|v| v.map(Number::Long))
    } else {
        let (Number::Int(l), Number::Int(r)) = (lhs, rhs) else {
            return Ok(None);
        };
        int_op(op, l, r).map(|v| v.map(Number::Int))
    }
}

macro_rules! integral_op {
    ($name:ident, $t:ty) => {
        fn $name(op: BinaryOp, l: $t, r: $t) -> Result<Option<$t>, ConstantError> {
            let value = match op {
                BinaryOp::Add => l.checked_add(r).ok_or(ConstantError::Overflow)?,
                BinaryOp::Sub => l.checked_sub(r).ok_or(ConstantError::Overflow)?,
                BinaryOp::Mul => l.checked_mul(r).ok_or(ConstantError::Overflow)?,
                BinaryOp::Div if r == 0 => return Err(ConstantError::DivisionByZero),
                BinaryOp::Div => l.wrapping_div(r),
                BinaryOp::Rem if r == 0 => return Err(ConstantError::DivisionByZero),
                BinaryOp::Rem => l.wrapping_rem(r),
                BinaryOp::BitAnd => l & r,
                BinaryOp::BitOr => l | r,
                BinaryOp::BitXor => l ^ r,
                _ => return Ok(None),
            };
            Ok(Some(value))
        }
    };
}

integral_op!(int_op, i32);
integral_op!(long_op, i64);

/// Narrowing or widening primitive conversion of an integral value.
fn cast(kind: PrimitiveKind, value: Number) -> Option<Number> {
    let v = value.as_i64();
    Some(match kind {
        PrimitiveKind::Byte => Number::Int(v as i8 as i32),
        PrimitiveKind::Short => Number::Int(v as i16 as i32),
        PrimitiveKind::Char => Number::Int(v as u16 as i32),
        PrimitiveKind::Int => Number::Int(v as i32),
        PrimitiveKind::Long => Number::Long(v),
        _ => return None,
    })
}

/// Fold any constant expression: integral arithmetic (overflow yields
/// `None`), booleans, string concatenation and integral comparisons.
///
/// Literals and constant symbols keep their own kind, so a `char` stays a
/// `char` when it is later concatenated onto a string.
pub fn constant_value(node: Node<'_>, model: &SemanticModel) -> Option<ConstValue> {
    let node = node.skip_parens();
    let tree = node.tree();
    match node.data() {
        NodeData::Literal(Literal::Value(v)) => return Some(v.clone()),
        NodeData::Identifier { .. } | NodeData::MemberSelect { .. } => {
            return node.symbol().and_then(|s| model.symbol(s).constant.clone());
        }
        _ => {}
    }
    if let Ok(Some(n)) = evaluate(node, model) {
        return Some(match node.ty() {
            Some(Type::Primitive(PrimitiveKind::Char)) => ConstValue::Char(n.as_i64() as u16),
            _ => n.to_const(),
        });
    }
    match node.data() {
        NodeData::Unary {
            op: UnaryOp::Not,
            operand,
        } => constant_value(tree.node(*operand), model)?
            .as_bool()
            .map(|b| ConstValue::Bool(!b)),
        NodeData::Conditional {
            cond,
            then_expr,
            else_expr,
        } => {
            let pick = if constant_value(tree.node(*cond), model)?.as_bool()? {
                then_expr
            } else {
                else_expr
            };
            constant_value(tree.node(*pick), model)
        }
        NodeData::Binary { op, lhs, rhs } => {
            let l = constant_value(tree.node(*lhs), model)?;
            let r = constant_value(tree.node(*rhs), model)?;
            fold_binary(*op, &l, &r)
        }
        _ => None,
    }
}

fn fold_binary(op: BinaryOp, l: &ConstValue, r: &ConstValue) -> Option<ConstValue> {
    if let (Some(a), Some(b)) = (l.as_bool(), r.as_bool()) {
        return Some(ConstValue::Bool(match op {
            BinaryOp::And | BinaryOp::BitAnd => a && b,
            BinaryOp::Or | BinaryOp::BitOr => a || b,
            BinaryOp::BitXor | BinaryOp::Ne => a != b,
            BinaryOp::Eq => a == b,
            _ => return None,
        }));
    }
    if op == BinaryOp::Add && (l.as_str().is_some() || r.as_str().is_some()) {
        return Some(ConstValue::Str(format!("{}{}", concat_text(l), concat_text(r))));
    }
    let (a, b) = (Number::from_const(l)?.as_i64(), Number::from_const(r)?.as_i64());
    Some(ConstValue::Bool(match op {
        BinaryOp::Lt => a < b,
        BinaryOp::Gt => a > b,
        BinaryOp::Le => a <= b,
        BinaryOp::Ge => a >= b,
        BinaryOp::Eq => a == b,
        BinaryOp::Ne => a != b,
        _ => return None,
    }))
}

/// Text a constant contributes to a string concatenation.
fn concat_text(value: &ConstValue) -> String {
    match value {
        ConstValue::Str(s) => s.clone(),
        ConstValue::Char(c) => char::from_u32(*c as u32).map(String::from).unwrap_or_default(),
        ConstValue::Int(v) => v.to_string(),
        ConstValue::Long(v) => v.to_string(),
        ConstValue::Bool(b) => b.to_string(),
        ConstValue::Float(bits) => f32::from_bits(*bits).to_string(),
        ConstValue::Double(bits) => f64::from_bits(*bits).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{Span, TreeBuilder, TypedTree};

    fn binop(op: BinaryOp, l: ConstValue, r: ConstValue) -> TypedTree {
        let mut b = TreeBuilder::new("l op r");
        let l = b.literal(l, Span::new(0, 1));
        let r = b.literal(r, Span::new(5, 6));
        let root = b.binary(op, l, r, Span::new(0, 6));
        b.finish(root)
    }

    fn eval(op: BinaryOp, l: ConstValue, r: ConstValue) -> ConstantResult {
        let tree = binop(op, l, r);
        evaluate(tree.root(), &SemanticModel::new())
    }

    #[test]
    fn int_overflow_is_detected() {
        use ConstValue::{Int, Long};
        assert_eq!(
            eval(BinaryOp::Add, Int(i32::MAX), Int(1)),
            Err(ConstantError::Overflow)
        );
        assert_eq!(
            eval(BinaryOp::Add, Int(i32::MAX), Long(0)),
            Ok(Some(Number::Long(i32::MAX as i64)))
        );
        assert_eq!(
            eval(BinaryOp::Add, Int(i32::MAX), Long(1)),
            Ok(Some(Number::Long(i32::MAX as i64 + 1)))
        );
        assert_eq!(
            eval(BinaryOp::Mul, Long(i64::MAX), Int(2)),
            Err(ConstantError::Overflow)
        );
        assert_eq!(
            eval(BinaryOp::Sub, Int(i32::MIN), Int(1)),
            Err(ConstantError::Overflow)
        );
    }

    #[test]
    fn matrix_agrees_with_native_arithmetic() {
        use ConstValue::{Int, Long};
        let cases: &[(BinaryOp, i32, i32, i32)] = &[
            (BinaryOp::Add, 40, 2, 42),
            (BinaryOp::Sub, -7, 8, -15),
            (BinaryOp::Mul, 6, 7, 42),
            (BinaryOp::Div, -7, 2, -3),
            (BinaryOp::Rem, -7, 2, -1),
            (BinaryOp::Shl, 1, 33, 2),
            (BinaryOp::Shr, -8, 1, -4),
            (BinaryOp::UShr, -1, 28, 15),
            (BinaryOp::BitAnd, 12, 10, 8),
            (BinaryOp::BitOr, 12, 10, 14),
            (BinaryOp::BitXor, 12, 10, 6),
        ];
        for &(op, l, r, want) in cases {
            assert_eq!(eval(op, Int(l), Int(r)), Ok(Some(Number::Int(want))), "{op:?}");
        }
        assert_eq!(
            eval(BinaryOp::Shl, Long(1), Int(33)),
            Ok(Some(Number::Long(1 << 33)))
        );
        // int shifted by a long distance stays int
        assert_eq!(
            eval(BinaryOp::Shl, Int(1), Long(33)),
            Ok(Some(Number::Int(2)))
        );
        assert_eq!(
            eval(BinaryOp::Div, Int(i32::MIN), Int(-1)),
            Ok(Some(Number::Int(i32::MIN)))
        );
        assert_eq!(
            eval(BinaryOp::Div, Int(1), Int(0)),
            Err(ConstantError::DivisionByZero)
        );
    }

    #[test]
    fn non_integral_operands_are_not_constants() {
        assert_eq!(
            eval(
                BinaryOp::Add,
                ConstValue::Str("a".into()),
                ConstValue::Int(1)
            ),
            Ok(None)
        );
        let tree = binop(
            BinaryOp::Add,
            ConstValue::Str("a".into()),
            ConstValue::Int(1),
        );
        assert_eq!(
            constant_value(tree.root(), &SemanticModel::new()),
            Some(ConstValue::Str("a1".into()))
        );
    }

    #[test]
    fn casts_truncate() {
        let mut b = TreeBuilder::new("(byte) 200");
        let ty = b.push(NodeData::PrimitiveType(PrimitiveKind::Byte), Span::new(1, 5));
        let v = b.int(200, Span::new(7, 10));
        let cast = b.push(NodeData::TypeCast { target: ty, expr: v }, Span::new(0, 10));
        let tree = b.finish(cast);
        assert_eq!(
            evaluate(tree.root(), &SemanticModel::new()),
            Ok(Some(Number::Int(-56)))
        );
    }

    #[test]
    fn chars_concatenate_as_characters() {
        let model = SemanticModel::new();
        let tree = binop(BinaryOp::Add, ConstValue::Str("hi".into()), ConstValue::Char(65));
        assert_eq!(
            constant_value(tree.root(), &model),
            Some(ConstValue::Str("hiA".into()))
        );

        // char + int promotes to int.
        let tree = binop(BinaryOp::Add, ConstValue::Char(65), ConstValue::Int(1));
        assert_eq!(constant_value(tree.root(), &model), Some(ConstValue::Int(66)));
    }
}
