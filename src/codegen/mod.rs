//! IR generation
//!
//! Lowers a parsed [ast::Program] into an LLVM module. The main interface is
//! [compile], which registers the runtime interface, emits every global in
//! source order and finally builds the `main` function out of the program
//! block.
//!
//! Subprogram bodies are lowered into basic-block control flow: every body
//! gets an `entry` and a `return` block, locals and parameters live in stack
//! slots, `for` loops are desugared into `while` loops and `break`/`exit`
//! are plain branches to the active continuation blocks.

mod consts;
mod expr;
mod stmt;
mod types;

use std::collections::HashMap;

use miette::Diagnostic;
use thiserror::Error;

use inkwell::basic_block::BasicBlock;
use inkwell::builder::Builder;
use inkwell::context::Context;
use inkwell::module::Module;
use inkwell::types::{ArrayType, BasicMetadataTypeEnum, BasicTypeEnum, IntType};
use inkwell::values::{BasicValueEnum, FunctionValue, PointerValue};
use inkwell::AddressSpace;

use crate::ast;
use crate::util::{Scope, Span};

use consts::ConstValue;
use types::expect_simple;

/// Runtime functions that receive the address of their argument
const POINTER_PARAM_FUNS: [&str; 2] = ["readln", "dec"];

/// Names that cannot be redefined by user code
const RESERVED_NAMES: [&str; 1] = ["main"];

#[derive(Debug, Error, Diagnostic)]
pub enum CodegenError {
    #[error("Use of undeclared name `{name}`")]
    Undeclared {
        name: String,

        #[label("unknown name")]
        span: Span,
    },

    #[error("Use of variable `{name}` as a constant")]
    VariableAsConstant {
        name: String,

        #[label("not a constant")]
        span: Span,
    },

    #[error("Redefinition of `{name}`")]
    Redefinition {
        name: String,

        #[label("already defined")]
        span: Span,
    },

    #[error("The name `{name}` is reserved")]
    ReservedName {
        name: String,

        #[label("reserved name")]
        span: Span,
    },

    #[error("Definition of `{name}` does not match its forward declaration")]
    ForwardMismatch {
        name: String,

        #[label("this definition")]
        span: Span,
    },

    #[error("`{name}` is not an array")]
    NotAnArray {
        name: String,

        #[label("indexed here")]
        span: Span,
    },

    #[error("`{name}` is a {expected}-dimensional array, used as a {actual}-dimensional one")]
    WrongDimensionality {
        name: String,
        expected: usize,
        actual: usize,

        #[label("here")]
        span: Span,
    },

    #[error("Array `{name}` cannot be used as a plain value")]
    ArrayAsValue {
        name: String,

        #[label("here")]
        span: Span,
    },

    #[error("Cannot assign to array `{name}` without an index")]
    AssignToArray {
        name: String,

        #[label("here")]
        span: Span,
    },

    #[error("A {construct} cannot appear in a constant expression")]
    ConstantContext {
        construct: &'static str,

        #[label("not constant")]
        span: Span,
    },

    #[error("Invalid operand types for `{op}` in a constant expression")]
    ConstOperands {
        op: String,

        #[label("here")]
        span: Span,
    },

    #[error("Division by zero in a constant expression")]
    ConstDivisionByZero {
        #[label("here")]
        span: Span,
    },

    #[error("Expected an integer constant expression")]
    ExpectedIntegerConstant {
        #[label("here")]
        span: Span,
    },

    #[error("Array low bound {low} is greater than high bound {high}")]
    BoundOrder {
        low: i64,
        high: i64,

        #[label("these bounds")]
        span: Span,
    },

    #[error("Array dimension is too large")]
    ArrayTooLarge {
        #[label("here")]
        span: Span,
    },

    #[error("`break` used outside of a loop")]
    BreakOutsideLoop {
        #[label("here")]
        span: Span,
    },

    #[error("Subprogram parameters and return values must be simple types")]
    NotSimpleType {
        #[label("in this declaration")]
        span: Span,
    },

    #[error("An address is required here, but the argument is not a variable")]
    AddressOfNonVariable {
        #[label("not a variable")]
        span: Span,
    },

    #[error("Operand types of `{op}` do not match")]
    OperandTypeMismatch {
        op: String,

        #[label("here")]
        span: Span,
    },

    #[error("The condition is not a boolean expression")]
    ConditionNotBoolean {
        #[label("this condition")]
        span: Span,
    },

    #[error("Assigned value has a different type than the target")]
    StoreTypeMismatch {
        #[label("this value")]
        span: Span,
    },

    #[error("Argument type does not match the parameter")]
    ArgumentTypeMismatch {
        #[label("this argument")]
        span: Span,
    },

    #[error("Array index is not an integer")]
    NonIntegerIndex {
        #[label("this index")]
        span: Span,
    },

    #[error("`{name}` is not an assignable integer variable")]
    ForLoopVariable {
        name: String,

        #[label("loop variable")]
        span: Span,
    },

    #[error("Procedure `{name}` does not return a value")]
    ProcedureAsValue {
        name: String,

        #[label("used as a value")]
        span: Span,
    },

    #[error("`{name}` expects {expected} arguments but got {actual}")]
    WrongArgumentCount {
        name: String,
        expected: usize,
        actual: usize,

        #[label("this call")]
        span: Span,
    },

    #[error("The LLVM builder failed")]
    Builder(#[from] inkwell::builder::BuilderError),
}

type Result<T> = std::result::Result<T, CodegenError>;

/// Compile a program into an LLVM module
pub fn compile<'ctx>(context: &'ctx Context, program: &ast::Program) -> Result<Module<'ctx>> {
    let mut codegen = Codegen::new(context, &program.name);
    codegen.declare_runtime();

    for global in &program.globals {
        codegen.compile_global(global)?;
    }

    codegen.compile_subprogram(
        "main",
        Span::marker(0),
        &[],
        &[],
        Some(ast::SimpleType::Integer),
        &program.main,
    )?;

    Ok(codegen.module)
}

/// An addressable slot a name resolves to
#[derive(Debug, Clone)]
enum Binding<'ctx> {
    Scalar {
        ptr: PointerValue<'ctx>,
        ty: IntType<'ctx>,
    },
    Array {
        ptr: PointerValue<'ctx>,
        ty: ArrayType<'ctx>,
        element: IntType<'ctx>,
        /// Low bound per dimension, outermost first
        lows: Vec<i64>,
    },
}

/// A declared subprogram signature
struct Prototype {
    parameters: Vec<ast::SimpleType>,
    return_type: Option<ast::SimpleType>,
    defined: bool,
}

struct Codegen<'ctx> {
    context: &'ctx Context,
    builder: Builder<'ctx>,
    module: Module<'ctx>,
    /// Layer 0 holds globals; a layer is pushed per subprogram body
    scope: Scope<Binding<'ctx>>,
    /// Folded values of named constants, for constant contexts
    constants: HashMap<String, ConstValue>,
    prototypes: HashMap<String, Prototype>,
}

impl<'ctx> Codegen<'ctx> {
    fn new(context: &'ctx Context, module_name: &str) -> Self {
        Self {
            context,
            builder: context.create_builder(),
            module: context.create_module(module_name),
            scope: Scope::new(),
            constants: HashMap::new(),
            prototypes: HashMap::new(),
        }
    }

    /// Declare the externally linked runtime interface. `readln` and `dec`
    /// take their argument by address.
    fn declare_runtime(&mut self) {
        let i32_type = self.context.i32_type();
        let ptr_type = i32_type.ptr_type(AddressSpace::default());

        for name in ["write", "writeln"] {
            self.module
                .add_function(name, i32_type.fn_type(&[i32_type.into()], false), None);
            self.prototypes.insert(
                name.to_string(),
                Prototype {
                    parameters: vec![ast::SimpleType::Integer],
                    return_type: Some(ast::SimpleType::Integer),
                    defined: true,
                },
            );
        }

        self.module
            .add_function("readln", i32_type.fn_type(&[ptr_type.into()], false), None);
        self.prototypes.insert(
            String::from("readln"),
            Prototype {
                parameters: vec![ast::SimpleType::Integer],
                return_type: Some(ast::SimpleType::Integer),
                defined: true,
            },
        );

        let void_type = self.context.void_type();
        self.module
            .add_function("dec", void_type.fn_type(&[ptr_type.into()], false), None);
        self.prototypes.insert(
            String::from("dec"),
            Prototype {
                parameters: vec![ast::SimpleType::Integer],
                return_type: None,
                defined: true,
            },
        );
    }

    fn compile_global(&mut self, global: &ast::Global) -> Result<()> {
        match global {
            ast::Global::Constant(constant) => self.compile_named_constant(constant),
            ast::Global::Variable(variable) => self.compile_global_variable(variable),
            ast::Global::ProcedureDecl(decl) => {
                self.declare_subprogram(&decl.name, decl.name_span, &decl.parameters, None)
            }
            ast::Global::FunctionDecl(decl) => self.declare_subprogram(
                &decl.name,
                decl.name_span,
                &decl.parameters,
                Some(&decl.return_type),
            ),
            ast::Global::Procedure(procedure) => {
                self.ensure_definable(&procedure.name, procedure.name_span)?;
                self.compile_subprogram(
                    &procedure.name,
                    procedure.name_span,
                    &procedure.parameters,
                    &procedure.variables,
                    None,
                    &procedure.body,
                )
            }
            ast::Global::Function(function) => {
                self.ensure_definable(&function.name, function.name_span)?;
                let return_type = expect_simple(&function.return_type, function.name_span)?;
                self.compile_subprogram(
                    &function.name,
                    function.name_span,
                    &function.parameters,
                    &function.variables,
                    Some(return_type),
                    &function.body,
                )
            }
        }
    }

    /// Fold a named constant and emit it as a read-only global
    fn compile_named_constant(&mut self, constant: &ast::NamedConstant) -> Result<()> {
        self.check_fresh(&constant.name, constant.name_span)?;

        let value = self.fold_constant(&constant.value)?;
        let (ty, initializer): (IntType<'ctx>, BasicValueEnum<'ctx>) = match value {
            ConstValue::Int(int) => {
                let ty = self.context.i32_type();
                (ty, ty.const_int(int as u64, true).into())
            }
            ConstValue::Bool(boolean) => {
                let ty = self.context.bool_type();
                (ty, ty.const_int(boolean as u64, false).into())
            }
        };

        let global = self.module.add_global(ty, None, &constant.name);
        global.set_initializer(&initializer);
        global.set_constant(true);

        self.add_binding(
            constant.name.clone(),
            Binding::Scalar {
                ptr: global.as_pointer_value(),
                ty,
            },
            constant.name_span,
        )?;
        self.constants.insert(constant.name.clone(), value);
        Ok(())
    }

    /// Emit a zero-initialised mutable global
    fn compile_global_variable(&mut self, variable: &ast::Variable) -> Result<()> {
        self.check_fresh(&variable.name, variable.name_span)?;

        let lowered = self.compile_type(&variable.typ)?;
        let global = self
            .module
            .add_global(lowered.basic(), None, &variable.name);

        let zero: BasicValueEnum<'ctx> = match lowered.basic() {
            BasicTypeEnum::IntType(ty) => ty.const_zero().into(),
            BasicTypeEnum::ArrayType(ty) => ty.const_zero().into(),
            other => unreachable!("lowered source type {other:?}"),
        };
        global.set_initializer(&zero);
        global.set_constant(false);

        let binding = lowered.into_binding(global.as_pointer_value());
        self.add_binding(variable.name.clone(), binding, variable.name_span)
    }

    /// Emit a subprogram prototype for a `forward` declaration
    fn declare_subprogram(
        &mut self,
        name: &str,
        name_span: Span,
        parameters: &[ast::Variable],
        return_type: Option<&ast::Type>,
    ) -> Result<()> {
        self.check_fresh(name, name_span)?;

        let parameter_types = self.parameter_types(parameters)?;
        let return_type = return_type
            .map(|typ| expect_simple(typ, name_span))
            .transpose()?;

        self.emit_prototype(name, parameters, &parameter_types, return_type);
        self.prototypes.insert(
            name.to_string(),
            Prototype {
                parameters: parameter_types,
                return_type,
                defined: false,
            },
        );
        Ok(())
    }

    /// Emit a subprogram definition. An existing forward prototype is
    /// completed; its signature has to match.
    fn compile_subprogram(
        &mut self,
        name: &str,
        name_span: Span,
        parameters: &[ast::Variable],
        variables: &[ast::Variable],
        return_type: Option<ast::SimpleType>,
        body: &ast::Block,
    ) -> Result<()> {
        let parameter_types = self.parameter_types(parameters)?;

        let function = match self.prototypes.get(name) {
            Some(prototype) => {
                if prototype.defined {
                    return Err(CodegenError::Redefinition {
                        name: name.to_string(),
                        span: name_span,
                    });
                }
                if prototype.parameters != parameter_types || prototype.return_type != return_type {
                    return Err(CodegenError::ForwardMismatch {
                        name: name.to_string(),
                        span: name_span,
                    });
                }
                self.module
                    .get_function(name)
                    .expect("forward prototype was emitted")
            }
            None => self.emit_prototype(name, parameters, &parameter_types, return_type),
        };
        self.prototypes.insert(
            name.to_string(),
            Prototype {
                parameters: parameter_types.clone(),
                return_type,
                defined: true,
            },
        );

        let entry = self.context.append_basic_block(function, "entry");
        let return_block = self.context.append_basic_block(function, "return");
        self.builder.position_at_end(entry);
        self.scope.push();

        // Parameters are spilled into stack slots so they are addressable
        // and assignable like any other variable
        for ((parameter, ty), value) in parameters
            .iter()
            .zip(&parameter_types)
            .zip(function.get_param_iter())
        {
            let ty = self.simple_type(*ty);
            let slot = self
                .builder
                .build_alloca(ty, &format!("{}_arg", parameter.name))?;
            self.builder.build_store(slot, value)?;
            self.add_binding(
                parameter.name.clone(),
                Binding::Scalar { ptr: slot, ty },
                parameter.name_span,
            )?;
        }

        for variable in variables {
            let lowered = self.compile_type(&variable.typ)?;
            let slot = self
                .builder
                .build_alloca(lowered.basic(), &format!("{}_var", variable.name))?;
            self.add_binding(
                variable.name.clone(),
                lowered.into_binding(slot),
                variable.name_span,
            )?;
        }

        // Functions hold their return value in a slot named after the
        // function itself; it starts out as zero
        let return_slot = match return_type {
            Some(simple) => {
                let ty = self.simple_type(simple);
                let slot = self.builder.build_alloca(ty, "return_addr")?;
                self.builder.build_store(slot, ty.const_zero())?;
                self.add_binding(
                    name.to_string(),
                    Binding::Scalar { ptr: slot, ty },
                    name_span,
                )?;
                Some((slot, ty))
            }
            None => None,
        };

        let mut body_codegen = BodyCodegen {
            cg: self,
            return_block,
            loop_exit: None,
        };
        body_codegen.compile_block(body)?;

        if self.block_is_open() {
            self.builder.build_unconditional_branch(return_block)?;
        }

        self.builder.position_at_end(return_block);
        match return_slot {
            Some((slot, _ty)) => {
                let value = self.builder.build_load(slot, "return_value")?;
                self.builder.build_return(Some(&value))?;
            }
            None => {
                self.builder.build_return(None)?;
            }
        }

        self.scope.pop();
        assert!(function.verify(true));
        Ok(())
    }

    fn emit_prototype(
        &self,
        name: &str,
        parameters: &[ast::Variable],
        parameter_types: &[ast::SimpleType],
        return_type: Option<ast::SimpleType>,
    ) -> FunctionValue<'ctx> {
        let metadata: Vec<BasicMetadataTypeEnum> = parameter_types
            .iter()
            .map(|&simple| self.simple_type(simple).into())
            .collect();

        let fn_type = match return_type {
            Some(simple) => self.simple_type(simple).fn_type(&metadata, false),
            None => self.context.void_type().fn_type(&metadata, false),
        };

        let function = self.module.add_function(name, fn_type, None);
        for (value, parameter) in function.get_param_iter().zip(parameters) {
            value.into_int_value().set_name(&parameter.name);
        }

        function
    }

    fn parameter_types(&self, parameters: &[ast::Variable]) -> Result<Vec<ast::SimpleType>> {
        parameters
            .iter()
            .map(|parameter| expect_simple(&parameter.typ, parameter.name_span))
            .collect()
    }

    fn add_binding(&mut self, name: String, binding: Binding<'ctx>, span: Span) -> Result<()> {
        self.scope
            .add(name.clone(), binding)
            .map_err(|_| CodegenError::Redefinition { name, span })
    }

    /// A name that is about to be declared must be unused everywhere
    fn check_fresh(&self, name: &str, span: Span) -> Result<()> {
        if RESERVED_NAMES.contains(&name) {
            return Err(CodegenError::ReservedName {
                name: name.to_string(),
                span,
            });
        }
        if self.scope.find(name).is_some() || self.prototypes.contains_key(name) {
            return Err(CodegenError::Redefinition {
                name: name.to_string(),
                span,
            });
        }
        Ok(())
    }

    /// Like [Self::check_fresh], but forward-declared subprograms may still
    /// be completed by a definition
    fn ensure_definable(&self, name: &str, span: Span) -> Result<()> {
        if RESERVED_NAMES.contains(&name) {
            return Err(CodegenError::ReservedName {
                name: name.to_string(),
                span,
            });
        }
        if self.scope.find(name).is_some() {
            return Err(CodegenError::Redefinition {
                name: name.to_string(),
                span,
            });
        }
        Ok(())
    }

    fn block_is_open(&self) -> bool {
        self.builder
            .get_insert_block()
            .is_some_and(|block| block.get_terminator().is_none())
    }
}

/// Per-body lowering state: the return block of the enclosing subprogram
/// and the innermost loop continuation for `break`
struct BodyCodegen<'a, 'ctx> {
    cg: &'a mut Codegen<'ctx>,
    return_block: BasicBlock<'ctx>,
    loop_exit: Option<BasicBlock<'ctx>>,
}
