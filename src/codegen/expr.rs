//! Expression lowering
//!
//! Expressions compile down to `i32`/`i1` values. Variable reads load from
//! the resolved slot, array accesses shift every index by its dimension's
//! low bound before the address computation, and calls follow the pointer-
//! parameter set of the runtime interface.

use inkwell::types::IntType;
use inkwell::values::{BasicMetadataValueEnum, IntValue, PointerValue};
use inkwell::IntPredicate;

use crate::ast::{self, BinaryOp, UnaryOp};
use crate::util::Span;

use super::{Binding, BodyCodegen, CodegenError, Result, POINTER_PARAM_FUNS};

impl<'ctx> BodyCodegen<'_, 'ctx> {
    pub(super) fn compile_expression(
        &mut self,
        expression: &ast::Expression,
    ) -> Result<IntValue<'ctx>> {
        let span = expression.span;
        match &expression.kind {
            ast::ExpressionKind::Variable(name) => match self.resolve(name, span)? {
                Binding::Scalar { ptr, ty: _ } => {
                    Ok(self.cg.builder.build_load(ptr, name)?.into_int_value())
                }
                Binding::Array { .. } => Err(CodegenError::ArrayAsValue {
                    name: name.clone(),
                    span,
                }),
            },

            ast::ExpressionKind::Constant(constant) => Ok(self.compile_constant(*constant)),

            ast::ExpressionKind::Unary(unary) => {
                let value = self.compile_expression(&unary.operand)?;
                match unary.op {
                    UnaryOp::Plus => Ok(value),
                    UnaryOp::Minus => Ok(self.cg.builder.build_int_neg(value, "neg")?),
                    UnaryOp::Not => Ok(self.cg.builder.build_not(value, "not")?),
                }
            }

            ast::ExpressionKind::Binary(binary) => self.compile_binary(binary, span),

            ast::ExpressionKind::ArrayAccess(access) => {
                let (_element, ptr) = self.array_element(&access.array, &access.indices, span)?;
                Ok(self
                    .cg
                    .builder
                    .build_load(ptr, &access.array)?
                    .into_int_value())
            }

            ast::ExpressionKind::Call(call) => self
                .compile_call(call, span)?
                .ok_or_else(|| CodegenError::ProcedureAsValue {
                    name: call.name.clone(),
                    span,
                }),
        }
    }

    pub(super) fn compile_constant(&self, constant: ast::Constant) -> IntValue<'ctx> {
        match constant {
            ast::Constant::Int(value) => self.cg.context.i32_type().const_int(value as u64, true),
            ast::Constant::Bool(value) => self.cg.context.bool_type().const_int(value as u64, false),
        }
    }

    fn compile_binary(
        &mut self,
        binary: &ast::BinaryOperator,
        span: Span,
    ) -> Result<IntValue<'ctx>> {
        let lhs = self.compile_expression(&binary.left)?;
        let rhs = self.compile_expression(&binary.right)?;
        if lhs.get_type() != rhs.get_type() {
            return Err(CodegenError::OperandTypeMismatch {
                op: binary.op.to_string(),
                span,
            });
        }

        let builder = &self.cg.builder;
        let value = match binary.op {
            BinaryOp::Eq => builder.build_int_compare(IntPredicate::EQ, lhs, rhs, "eq")?,
            BinaryOp::NotEq => builder.build_int_compare(IntPredicate::NE, lhs, rhs, "neq")?,
            BinaryOp::LessEq => builder.build_int_compare(IntPredicate::SLE, lhs, rhs, "le")?,
            BinaryOp::Less => builder.build_int_compare(IntPredicate::SLT, lhs, rhs, "lt")?,
            BinaryOp::GreaterEq => builder.build_int_compare(IntPredicate::SGE, lhs, rhs, "ge")?,
            BinaryOp::Greater => builder.build_int_compare(IntPredicate::SGT, lhs, rhs, "gt")?,

            BinaryOp::Plus => builder.build_int_add(lhs, rhs, "add")?,
            BinaryOp::Minus => builder.build_int_sub(lhs, rhs, "sub")?,
            BinaryOp::Times => builder.build_int_mul(lhs, rhs, "mul")?,

            // `/` and `div` both lower to signed division
            BinaryOp::Division | BinaryOp::IntegerDivision => {
                builder.build_int_signed_div(lhs, rhs, "div")?
            }
            BinaryOp::Modulo => builder.build_int_signed_rem(lhs, rhs, "rem")?,

            // bitwise, uniform over integers and 1-bit booleans
            BinaryOp::And => builder.build_and(lhs, rhs, "and")?,
            BinaryOp::Or => builder.build_or(lhs, rhs, "or")?,
            BinaryOp::Xor => builder.build_xor(lhs, rhs, "xor")?,
        };
        Ok(value)
    }

    /// Evaluate a branch condition; it has to be a boolean
    pub(super) fn compile_condition(
        &mut self,
        expression: &ast::Expression,
    ) -> Result<IntValue<'ctx>> {
        let value = self.compile_expression(expression)?;
        if value.get_type().get_bit_width() != 1 {
            return Err(CodegenError::ConditionNotBoolean {
                span: expression.span,
            });
        }
        Ok(value)
    }

    pub(super) fn resolve(&self, name: &str, span: Span) -> Result<Binding<'ctx>> {
        self.cg
            .scope
            .find(name)
            .cloned()
            .ok_or_else(|| CodegenError::Undeclared {
                name: name.to_string(),
                span,
            })
    }

    /// Element type and address of `name[indices...]`. Every index is
    /// shifted down by its dimension's low bound before the in-bounds GEP.
    pub(super) fn array_element(
        &mut self,
        name: &str,
        indices: &[ast::Expression],
        span: Span,
    ) -> Result<(IntType<'ctx>, PointerValue<'ctx>)> {
        let binding = self.resolve(name, span)?;
        let Binding::Array {
            ptr,
            ty: _,
            element,
            lows,
        } = binding
        else {
            return Err(CodegenError::NotAnArray {
                name: name.to_string(),
                span,
            });
        };

        if indices.len() != lows.len() {
            return Err(CodegenError::WrongDimensionality {
                name: name.to_string(),
                expected: lows.len(),
                actual: indices.len(),
                span,
            });
        }

        let i32_type = self.cg.context.i32_type();
        let mut gep_indices = vec![i32_type.const_zero()];
        for (index, low) in indices.iter().zip(&lows) {
            let value = self.compile_expression(index)?;
            if value.get_type().get_bit_width() != 32 {
                return Err(CodegenError::NonIntegerIndex { span: index.span });
            }

            let low_value = i32_type.const_int(*low as u64, true);
            gep_indices.push(self.cg.builder.build_int_sub(value, low_value, "idx")?);
        }

        let element_ptr = unsafe {
            self.cg
                .builder
                .build_in_bounds_gep(ptr, &gep_indices, "elem")?
        };
        Ok((element, element_ptr))
    }

    /// Compile a call; the result is `None` for procedures. Callees in the
    /// pointer-parameter set get the addresses of their arguments instead of
    /// values, so those arguments must be plain variables.
    pub(super) fn compile_call(
        &mut self,
        call: &ast::SubprogramCall,
        span: Span,
    ) -> Result<Option<IntValue<'ctx>>> {
        let Some(function) = self.cg.module.get_function(&call.name) else {
            return Err(CodegenError::Undeclared {
                name: call.name.clone(),
                span,
            });
        };

        let expected = function.count_params() as usize;
        if call.arguments.len() != expected {
            return Err(CodegenError::WrongArgumentCount {
                name: call.name.clone(),
                expected,
                actual: call.arguments.len(),
                span,
            });
        }

        let mut arguments: Vec<BasicMetadataValueEnum> = Vec::with_capacity(call.arguments.len());
        if POINTER_PARAM_FUNS.contains(&call.name.as_str()) {
            for argument in &call.arguments {
                arguments.push(self.variable_address(argument)?.into());
            }
        } else {
            let parameter_types = function.get_type().get_param_types();
            for (argument, parameter) in call.arguments.iter().zip(parameter_types) {
                let value = self.compile_expression(argument)?;
                if parameter != value.get_type().into() {
                    return Err(CodegenError::ArgumentTypeMismatch {
                        span: argument.span,
                    });
                }
                arguments.push(value.into());
            }
        }

        let result = self.cg.builder.build_call(function, &arguments, "")?;
        Ok(result
            .try_as_basic_value()
            .left()
            .map(|value| value.into_int_value()))
    }

    fn variable_address(&mut self, expression: &ast::Expression) -> Result<PointerValue<'ctx>> {
        let ast::ExpressionKind::Variable(name) = &expression.kind else {
            return Err(CodegenError::AddressOfNonVariable {
                span: expression.span,
            });
        };

        match self.resolve(name, expression.span)? {
            Binding::Scalar { ptr, .. } => Ok(ptr),
            Binding::Array { .. } => Err(CodegenError::AddressOfNonVariable {
                span: expression.span,
            }),
        }
    }
}
