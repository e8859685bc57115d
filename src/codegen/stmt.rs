//! Statement lowering
//!
//! Control flow becomes basic blocks: `if` branches into `trueBranch`/
//! `falseBranch`/`afterIf`, loops into `loopCond`/`loopBody`/`afterLoop`.
//! A `for` loop is rewritten into an equivalent `while` by synthesizing the
//! comparison and the increment out of the original loop header, then
//! reusing the shared loop lowering.

use inkwell::basic_block::BasicBlock;

use crate::ast::{self, BinaryOp, Direction, StatementKind};
use crate::util::Span;

use super::{Binding, BodyCodegen, CodegenError, Result};

impl<'ctx> BodyCodegen<'_, 'ctx> {
    pub(super) fn compile_block(&mut self, block: &ast::Block) -> Result<()> {
        for statement in &block.statements {
            self.compile_statement(statement)?;
        }
        Ok(())
    }

    fn compile_statement(&mut self, statement: &ast::Statement) -> Result<()> {
        let span = statement.span;
        match &statement.kind {
            StatementKind::Call(call) => {
                // the result, if any, is thrown away
                self.compile_call(call, span)?;
                Ok(())
            }

            StatementKind::Assignment(assign) => self.compile_assignment(assign, span),

            StatementKind::ArrayAssignment(assign) => {
                let (element, ptr) = self.array_element(&assign.array, &assign.indices, span)?;
                let value = self.compile_expression(&assign.value)?;
                if value.get_type() != element {
                    return Err(CodegenError::StoreTypeMismatch {
                        span: assign.value.span,
                    });
                }
                self.cg.builder.build_store(ptr, value)?;
                Ok(())
            }

            StatementKind::Exit => {
                self.cg
                    .builder
                    .build_unconditional_branch(self.return_block)?;
                let unreachable = self.append_block("afterExit");
                self.cg.builder.position_at_end(unreachable);
                Ok(())
            }

            StatementKind::Break => {
                let Some(after_loop) = self.loop_exit else {
                    return Err(CodegenError::BreakOutsideLoop { span });
                };
                self.cg.builder.build_unconditional_branch(after_loop)?;
                let unreachable = self.append_block("afterBreak");
                self.cg.builder.position_at_end(unreachable);
                Ok(())
            }

            StatementKind::Empty => Ok(()),

            StatementKind::Block(block) => self.compile_block(block),

            StatementKind::If(if_) => self.compile_if(if_),

            StatementKind::While(while_) => {
                self.compile_loop(&while_.condition, &while_.body, None)
            }

            StatementKind::For(for_) => self.compile_for(for_, span),
        }
    }

    fn compile_assignment(&mut self, assign: &ast::Assignment, span: Span) -> Result<()> {
        let value = self.compile_expression(&assign.value)?;
        match self.resolve(&assign.target, span)? {
            Binding::Scalar { ptr, ty } => {
                if value.get_type() != ty {
                    return Err(CodegenError::StoreTypeMismatch {
                        span: assign.value.span,
                    });
                }
                self.cg.builder.build_store(ptr, value)?;
                Ok(())
            }
            Binding::Array { .. } => Err(CodegenError::AssignToArray {
                name: assign.target.clone(),
                span,
            }),
        }
    }

    fn compile_if(&mut self, if_: &ast::If) -> Result<()> {
        let then_block = self.append_block("trueBranch");
        let else_block = self.append_block("falseBranch");
        let after_block = self.append_block("afterIf");

        let condition = self.compile_condition(&if_.condition)?;
        self.cg
            .builder
            .build_conditional_branch(condition, then_block, else_block)?;

        self.cg.builder.position_at_end(then_block);
        self.compile_statement(&if_.then_branch)?;
        self.branch_if_open(after_block)?;

        self.cg.builder.position_at_end(else_block);
        if let Some(else_branch) = &if_.else_branch {
            self.compile_statement(else_branch)?;
        }
        self.branch_if_open(after_block)?;

        self.cg.builder.position_at_end(after_block);
        Ok(())
    }

    /// Shared lowering of `while` loops and desugared `for` loops
    fn compile_loop(
        &mut self,
        condition: &ast::Expression,
        body: &ast::Statement,
        increment: Option<&ast::Statement>,
    ) -> Result<()> {
        let condition_block = self.append_block("loopCond");
        let body_block = self.append_block("loopBody");
        let after_block = self.append_block("afterLoop");

        self.cg
            .builder
            .build_unconditional_branch(condition_block)?;

        self.cg.builder.position_at_end(condition_block);
        let condition_value = self.compile_condition(condition)?;
        self.cg
            .builder
            .build_conditional_branch(condition_value, body_block, after_block)?;

        // saved so nested loops restore the outer break target
        let previous_exit = self.loop_exit.replace(after_block);

        self.cg.builder.position_at_end(body_block);
        self.compile_statement(body)?;
        if let Some(increment) = increment {
            self.compile_statement(increment)?;
        }
        self.branch_if_open(condition_block)?;

        self.loop_exit = previous_exit;
        self.cg.builder.position_at_end(after_block);
        Ok(())
    }

    /// `for i := init to target do body` is rewritten into
    /// `i := init; while i <= target do begin body; i := i + 1 end`,
    /// with `>=` and `- 1` for `downto`
    fn compile_for(&mut self, for_: &ast::For, span: Span) -> Result<()> {
        match self.resolve(&for_.variable, for_.variable_span)? {
            Binding::Scalar { ty, .. } if ty.get_bit_width() == 32 => {}
            _ => {
                return Err(CodegenError::ForLoopVariable {
                    name: for_.variable.clone(),
                    span: for_.variable_span,
                })
            }
        }

        let init = ast::Assignment {
            target: for_.variable.clone(),
            value: for_.init.clone(),
        };
        self.compile_assignment(&init, span)?;

        let (comparison, step) = match for_.direction {
            Direction::To => (BinaryOp::LessEq, BinaryOp::Plus),
            Direction::Downto => (BinaryOp::GreaterEq, BinaryOp::Minus),
        };

        let loop_variable = ast::Expression {
            kind: ast::ExpressionKind::Variable(for_.variable.clone()),
            span: for_.variable_span,
        };

        let condition = ast::Expression {
            kind: ast::ExpressionKind::Binary(Box::new(ast::BinaryOperator {
                op: comparison,
                left: loop_variable.clone(),
                right: for_.target.clone(),
            })),
            span: for_.variable_span.to(for_.target.span),
        };

        let one = ast::Expression {
            kind: ast::ExpressionKind::Constant(ast::Constant::Int(1)),
            span: for_.variable_span,
        };
        let increment = ast::Statement {
            kind: StatementKind::Assignment(ast::Assignment {
                target: for_.variable.clone(),
                value: ast::Expression {
                    kind: ast::ExpressionKind::Binary(Box::new(ast::BinaryOperator {
                        op: step,
                        left: loop_variable,
                        right: one,
                    })),
                    span: for_.variable_span,
                },
            }),
            span: for_.variable_span,
        };

        self.compile_loop(&condition, &for_.body, Some(&increment))
    }

    fn branch_if_open(&mut self, target: BasicBlock<'ctx>) -> Result<()> {
        if self.cg.block_is_open() {
            self.cg.builder.build_unconditional_branch(target)?;
        }
        Ok(())
    }

    /// A fresh block placed right before the return block, so `return`
    /// stays last in the function
    fn append_block(&mut self, name: &str) -> BasicBlock<'ctx> {
        self.cg.context.prepend_basic_block(self.return_block, name)
    }
}
