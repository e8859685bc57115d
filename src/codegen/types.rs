//! Type lowering
//!
//! `integer` becomes `i32`, `boolean` becomes `i1`. An n-dimensional array
//! turns into nested LLVM array types with one dimension of size
//! `high - low + 1` each; the ordered low bounds are kept next to the type
//! so that later index arithmetic can shift every access.

use inkwell::types::{ArrayType, BasicTypeEnum, IntType};
use inkwell::values::PointerValue;

use crate::ast;
use crate::util::Span;

use super::consts::ConstValue;
use super::{Binding, Codegen, CodegenError, Result};

/// A lowered source type
pub(super) enum LoweredType<'ctx> {
    Simple(IntType<'ctx>),
    Array {
        ty: ArrayType<'ctx>,
        element: IntType<'ctx>,
        lows: Vec<i64>,
    },
}

impl<'ctx> LoweredType<'ctx> {
    pub fn basic(&self) -> BasicTypeEnum<'ctx> {
        match self {
            LoweredType::Simple(ty) => (*ty).into(),
            LoweredType::Array { ty, .. } => (*ty).into(),
        }
    }

    pub fn into_binding(self, ptr: PointerValue<'ctx>) -> Binding<'ctx> {
        match self {
            LoweredType::Simple(ty) => Binding::Scalar { ptr, ty },
            LoweredType::Array { ty, element, lows } => Binding::Array {
                ptr,
                ty,
                element,
                lows,
            },
        }
    }
}

/// Parameters and return values are restricted to simple types
pub(super) fn expect_simple(typ: &ast::Type, span: Span) -> Result<ast::SimpleType> {
    match typ {
        ast::Type::Simple(simple) => Ok(*simple),
        ast::Type::Array(_) => Err(CodegenError::NotSimpleType { span }),
    }
}

impl<'ctx> Codegen<'ctx> {
    pub(super) fn simple_type(&self, simple: ast::SimpleType) -> IntType<'ctx> {
        match simple {
            ast::SimpleType::Integer => self.context.i32_type(),
            ast::SimpleType::Boolean => self.context.bool_type(),
        }
    }

    /// Lower a source type; array bounds are constant-folded here
    pub(super) fn compile_type(&self, typ: &ast::Type) -> Result<LoweredType<'ctx>> {
        match typ {
            ast::Type::Simple(simple) => Ok(LoweredType::Simple(self.simple_type(*simple))),
            ast::Type::Array(array) => {
                let element = self.compile_type(&array.element)?;

                let low = self.fold_integer(&array.low)?;
                let high = self.fold_integer(&array.high)?;
                let span = array.low.span.to(array.high.span);
                if low > high {
                    return Err(CodegenError::BoundOrder { low, high, span });
                }
                let size = u32::try_from(high - low + 1)
                    .map_err(|_| CodegenError::ArrayTooLarge { span })?;

                match element {
                    LoweredType::Simple(ty) => Ok(LoweredType::Array {
                        ty: ty.array_type(size),
                        element: ty,
                        lows: vec![low],
                    }),
                    LoweredType::Array {
                        ty,
                        element,
                        mut lows,
                    } => {
                        lows.insert(0, low);
                        Ok(LoweredType::Array {
                            ty: ty.array_type(size),
                            element,
                            lows,
                        })
                    }
                }
            }
        }
    }

    fn fold_integer(&self, expression: &ast::Expression) -> Result<i64> {
        match self.fold_constant(expression)? {
            ConstValue::Int(value) => Ok(value),
            ConstValue::Bool(_) => Err(CodegenError::ExpectedIntegerConstant {
                span: expression.span,
            }),
        }
    }
}
