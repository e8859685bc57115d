//! Constant expression folding
//!
//! Named constants and array bounds are evaluated by a small interpreter
//! over the AST. Literals, previously declared named constants and pure
//! operators are allowed; variable reads, array accesses and calls are not.
//! Arithmetic uses signed wrapping semantics.

use crate::ast::{self, BinaryOp, UnaryOp};
use crate::util::Span;

use super::{Codegen, CodegenError, Result};

/// A folded compile-time value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ConstValue {
    Int(i64),
    Bool(bool),
}

impl Codegen<'_> {
    pub(super) fn fold_constant(&self, expression: &ast::Expression) -> Result<ConstValue> {
        let span = expression.span;
        match &expression.kind {
            ast::ExpressionKind::Constant(ast::Constant::Int(value)) => Ok(ConstValue::Int(*value)),
            ast::ExpressionKind::Constant(ast::Constant::Bool(value)) => {
                Ok(ConstValue::Bool(*value))
            }

            ast::ExpressionKind::Variable(name) => {
                if let Some(value) = self.constants.get(name) {
                    return Ok(*value);
                }

                if self.scope.find(name).is_some() {
                    Err(CodegenError::VariableAsConstant {
                        name: name.clone(),
                        span,
                    })
                } else {
                    Err(CodegenError::Undeclared {
                        name: name.clone(),
                        span,
                    })
                }
            }

            ast::ExpressionKind::ArrayAccess(_) => Err(CodegenError::ConstantContext {
                construct: "array access",
                span,
            }),
            ast::ExpressionKind::Call(_) => Err(CodegenError::ConstantContext {
                construct: "subprogram call",
                span,
            }),

            ast::ExpressionKind::Unary(unary) => {
                let value = self.fold_constant(&unary.operand)?;
                match (unary.op, value) {
                    (UnaryOp::Plus, value) => Ok(value),
                    (UnaryOp::Minus, ConstValue::Int(value)) => {
                        Ok(ConstValue::Int(value.wrapping_neg()))
                    }
                    (UnaryOp::Not, ConstValue::Int(value)) => Ok(ConstValue::Int(!value)),
                    (UnaryOp::Not, ConstValue::Bool(value)) => Ok(ConstValue::Bool(!value)),
                    (UnaryOp::Minus, ConstValue::Bool(_)) => Err(CodegenError::ConstOperands {
                        op: unary.op.to_string(),
                        span,
                    }),
                }
            }

            ast::ExpressionKind::Binary(binary) => {
                let left = self.fold_constant(&binary.left)?;
                let right = self.fold_constant(&binary.right)?;
                fold_binary(binary.op, left, right, span)
            }
        }
    }
}

fn fold_binary(op: BinaryOp, left: ConstValue, right: ConstValue, span: Span) -> Result<ConstValue> {
    use ConstValue::{Bool, Int};

    match (op, left, right) {
        (BinaryOp::Plus, Int(a), Int(b)) => Ok(Int(a.wrapping_add(b))),
        (BinaryOp::Minus, Int(a), Int(b)) => Ok(Int(a.wrapping_sub(b))),
        (BinaryOp::Times, Int(a), Int(b)) => Ok(Int(a.wrapping_mul(b))),

        (BinaryOp::Division | BinaryOp::IntegerDivision, Int(_), Int(0)) => {
            Err(CodegenError::ConstDivisionByZero { span })
        }
        (BinaryOp::Modulo, Int(_), Int(0)) => Err(CodegenError::ConstDivisionByZero { span }),
        (BinaryOp::Division | BinaryOp::IntegerDivision, Int(a), Int(b)) => {
            Ok(Int(a.wrapping_div(b)))
        }
        (BinaryOp::Modulo, Int(a), Int(b)) => Ok(Int(a.wrapping_rem(b))),

        (BinaryOp::Eq, Int(a), Int(b)) => Ok(Bool(a == b)),
        (BinaryOp::NotEq, Int(a), Int(b)) => Ok(Bool(a != b)),
        (BinaryOp::LessEq, Int(a), Int(b)) => Ok(Bool(a <= b)),
        (BinaryOp::Less, Int(a), Int(b)) => Ok(Bool(a < b)),
        (BinaryOp::GreaterEq, Int(a), Int(b)) => Ok(Bool(a >= b)),
        (BinaryOp::Greater, Int(a), Int(b)) => Ok(Bool(a > b)),

        (BinaryOp::Eq, Bool(a), Bool(b)) => Ok(Bool(a == b)),
        (BinaryOp::NotEq, Bool(a), Bool(b)) => Ok(Bool(a != b)),

        (BinaryOp::And, Int(a), Int(b)) => Ok(Int(a & b)),
        (BinaryOp::Or, Int(a), Int(b)) => Ok(Int(a | b)),
        (BinaryOp::Xor, Int(a), Int(b)) => Ok(Int(a ^ b)),
        (BinaryOp::And, Bool(a), Bool(b)) => Ok(Bool(a && b)),
        (BinaryOp::Or, Bool(a), Bool(b)) => Ok(Bool(a || b)),
        (BinaryOp::Xor, Bool(a), Bool(b)) => Ok(Bool(a ^ b)),

        _ => Err(CodegenError::ConstOperands {
            op: op.to_string(),
            span,
        }),
    }
}
