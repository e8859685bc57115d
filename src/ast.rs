//! Abstract syntax tree
//!
//! The data model produced by the parser and consumed by the IR generator.
//! Nodes are plain values; subtrees are held in [Box]es and the whole tree is
//! [Clone] because lowering synthesizes new fragments out of existing ones
//! (the `for`-to-`while` rewrite).

use std::borrow::Cow;
use std::{fmt, io};

use ptree::{print_tree, Style, TreeItem};

use crate::util::Span;

pub type Identifier = String;

/// The two primitive types of the language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimpleType {
    Integer,
    Boolean,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Simple(SimpleType),
    Array(Box<ArrayType>),
}

/// An array type; bounds are arbitrary expressions folded at IR-gen time.
/// Multi-dimensional arrays nest through `element`.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayType {
    pub low: Expression,
    pub high: Expression,
    pub element: Type,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constant {
    Int(i64),
    Bool(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionKind {
    Variable(Identifier),
    Constant(Constant),
    ArrayAccess(Box<ArrayAccess>),
    Call(Box<SubprogramCall>),
    Unary(Box<UnaryOperator>),
    Binary(Box<BinaryOperator>),
}

/// `array[index, index, ...]`, one index per dimension
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayAccess {
    pub array: Identifier,
    pub indices: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubprogramCall {
    pub name: Identifier,
    pub arguments: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryOperator {
    pub op: UnaryOp,
    pub operand: Expression,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Minus,
    Not,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryOperator {
    pub op: BinaryOp,
    pub left: Expression,
    pub right: Expression,
}

/// Binary operators. `/` and `div` are kept apart in the tree even though
/// both lower to signed integer division.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Eq,
    NotEq,
    LessEq,
    Less,
    GreaterEq,
    Greater,
    Plus,
    Minus,
    Times,
    Division,
    IntegerDivision,
    Modulo,
    And,
    Or,
    Xor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub kind: StatementKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatementKind {
    Call(SubprogramCall),
    Assignment(Assignment),
    ArrayAssignment(ArrayAssignment),
    Exit,
    Break,
    Empty,
    Block(Block),
    If(Box<If>),
    While(Box<While>),
    For(Box<For>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub target: Identifier,
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayAssignment {
    pub array: Identifier,
    pub indices: Vec<Expression>,
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct If {
    pub condition: Expression,
    pub then_branch: Statement,
    pub else_branch: Option<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct While {
    pub condition: Expression,
    pub body: Statement,
}

/// `for variable := init direction target do body`
#[derive(Debug, Clone, PartialEq)]
pub struct For {
    pub variable: Identifier,
    pub variable_span: Span,
    pub init: Expression,
    pub direction: Direction,
    pub target: Expression,
    pub body: Statement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    To,
    Downto,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: Identifier,
    pub name_span: Span,
    pub typ: Type,
}

/// `const name = expression;`
#[derive(Debug, Clone, PartialEq)]
pub struct NamedConstant {
    pub name: Identifier,
    pub name_span: Span,
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcedureDecl {
    pub name: Identifier,
    pub name_span: Span,
    pub parameters: Vec<Variable>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: Identifier,
    pub name_span: Span,
    pub parameters: Vec<Variable>,
    pub return_type: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Procedure {
    pub name: Identifier,
    pub name_span: Span,
    pub parameters: Vec<Variable>,
    pub variables: Vec<Variable>,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: Identifier,
    pub name_span: Span,
    pub parameters: Vec<Variable>,
    pub return_type: Type,
    pub variables: Vec<Variable>,
    pub body: Block,
}

/// A top-level declaration or definition, in source order
#[derive(Debug, Clone, PartialEq)]
pub enum Global {
    Constant(NamedConstant),
    Variable(Variable),
    ProcedureDecl(ProcedureDecl),
    FunctionDecl(FunctionDecl),
    Procedure(Procedure),
    Function(Function),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub name: Identifier,
    pub globals: Vec<Global>,
    pub main: Block,
}

impl fmt::Display for SimpleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimpleType::Integer => write!(f, "integer"),
            SimpleType::Boolean => write!(f, "boolean"),
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Plus => write!(f, "+"),
            UnaryOp::Minus => write!(f, "-"),
            UnaryOp::Not => write!(f, "not"),
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinaryOp::Eq => write!(f, "="),
            BinaryOp::NotEq => write!(f, "<>"),
            BinaryOp::LessEq => write!(f, "<="),
            BinaryOp::Less => write!(f, "<"),
            BinaryOp::GreaterEq => write!(f, ">="),
            BinaryOp::Greater => write!(f, ">"),
            BinaryOp::Plus => write!(f, "+"),
            BinaryOp::Minus => write!(f, "-"),
            BinaryOp::Times => write!(f, "*"),
            BinaryOp::Division => write!(f, "/"),
            BinaryOp::IntegerDivision => write!(f, "div"),
            BinaryOp::Modulo => write!(f, "mod"),
            BinaryOp::And => write!(f, "and"),
            BinaryOp::Or => write!(f, "or"),
            BinaryOp::Xor => write!(f, "xor"),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::To => write!(f, "to"),
            Direction::Downto => write!(f, "downto"),
        }
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Int(value) => write!(f, "{value}"),
            Constant::Bool(value) => write!(f, "{value}"),
        }
    }
}

/// A rendered tree node for the AST dump
#[derive(Debug, Clone)]
pub struct DisplayNode {
    label: String,
    children: Vec<DisplayNode>,
}

impl DisplayNode {
    fn new(label: impl Into<String>, children: Vec<DisplayNode>) -> Self {
        Self {
            label: label.into(),
            children,
        }
    }

    fn leaf(label: impl Into<String>) -> Self {
        Self::new(label, Vec::new())
    }
}

impl TreeItem for DisplayNode {
    type Child = DisplayNode;

    fn write_self<W: io::Write>(&self, f: &mut W, style: &Style) -> io::Result<()> {
        write!(f, "{}", style.paint(&self.label))
    }

    fn children(&self) -> Cow<[Self::Child]> {
        Cow::from(self.children.clone())
    }
}

impl Program {
    /// Print the whole program as a tree on stdout
    pub fn pretty_print(&self) -> io::Result<()> {
        print_tree(&self.tree())
    }

    fn tree(&self) -> DisplayNode {
        let mut children: Vec<_> = self.globals.iter().map(Global::tree).collect();
        children.push(DisplayNode::new("MAIN", vec![self.main.tree()]));
        DisplayNode::new(format!("program {}", self.name), children)
    }
}

impl Global {
    fn tree(&self) -> DisplayNode {
        match self {
            Global::Constant(constant) => DisplayNode::new(
                format!("const {}", constant.name),
                vec![constant.value.tree()],
            ),
            Global::Variable(variable) => variable.tree(),
            Global::ProcedureDecl(decl) => DisplayNode::new(
                format!("procedure {} (forward)", decl.name),
                decl.parameters.iter().map(Variable::parameter_tree).collect(),
            ),
            Global::FunctionDecl(decl) => {
                let mut children: Vec<_> =
                    decl.parameters.iter().map(Variable::parameter_tree).collect();
                children.push(DisplayNode::new("returns", vec![decl.return_type.tree()]));
                DisplayNode::new(format!("function {} (forward)", decl.name), children)
            }
            Global::Procedure(procedure) => {
                let mut children: Vec<_> = procedure
                    .parameters
                    .iter()
                    .map(Variable::parameter_tree)
                    .collect();
                children.extend(procedure.variables.iter().map(Variable::tree));
                children.push(procedure.body.tree());
                DisplayNode::new(format!("procedure {}", procedure.name), children)
            }
            Global::Function(function) => {
                let mut children: Vec<_> = function
                    .parameters
                    .iter()
                    .map(Variable::parameter_tree)
                    .collect();
                children.push(DisplayNode::new(
                    "returns",
                    vec![function.return_type.tree()],
                ));
                children.extend(function.variables.iter().map(Variable::tree));
                children.push(function.body.tree());
                DisplayNode::new(format!("function {}", function.name), children)
            }
        }
    }
}

impl Variable {
    fn tree(&self) -> DisplayNode {
        DisplayNode::new(format!("var {}", self.name), vec![self.typ.tree()])
    }

    fn parameter_tree(&self) -> DisplayNode {
        DisplayNode::new(format!("param {}", self.name), vec![self.typ.tree()])
    }
}

impl Type {
    fn tree(&self) -> DisplayNode {
        match self {
            Type::Simple(simple) => DisplayNode::leaf(simple.to_string()),
            Type::Array(array) => DisplayNode::new(
                "array",
                vec![array.low.tree(), array.high.tree(), array.element.tree()],
            ),
        }
    }
}

impl Block {
    fn tree(&self) -> DisplayNode {
        DisplayNode::new("BLOCK", self.statements.iter().map(Statement::tree).collect())
    }
}

impl Statement {
    fn tree(&self) -> DisplayNode {
        match &self.kind {
            StatementKind::Call(call) => call.tree(),
            StatementKind::Assignment(assign) => DisplayNode::new(
                format!("ASSIGN {}", assign.target),
                vec![assign.value.tree()],
            ),
            StatementKind::ArrayAssignment(assign) => {
                let mut children: Vec<_> = assign.indices.iter().map(Expression::tree).collect();
                children.push(assign.value.tree());
                DisplayNode::new(format!("ASSIGN {}[]", assign.array), children)
            }
            StatementKind::Exit => DisplayNode::leaf("EXIT"),
            StatementKind::Break => DisplayNode::leaf("BREAK"),
            StatementKind::Empty => DisplayNode::leaf("EMPTY"),
            StatementKind::Block(block) => block.tree(),
            StatementKind::If(if_) => {
                let mut children = vec![if_.condition.tree(), if_.then_branch.tree()];
                if let Some(else_branch) = &if_.else_branch {
                    children.push(else_branch.tree());
                }
                DisplayNode::new("IF", children)
            }
            StatementKind::While(while_) => {
                DisplayNode::new("WHILE", vec![while_.condition.tree(), while_.body.tree()])
            }
            StatementKind::For(for_) => DisplayNode::new(
                format!("FOR {} {}", for_.direction, for_.variable),
                vec![for_.init.tree(), for_.target.tree(), for_.body.tree()],
            ),
        }
    }
}

impl SubprogramCall {
    fn tree(&self) -> DisplayNode {
        DisplayNode::new(
            format!("CALL {}", self.name),
            self.arguments.iter().map(Expression::tree).collect(),
        )
    }
}

impl Expression {
    fn tree(&self) -> DisplayNode {
        match &self.kind {
            ExpressionKind::Variable(name) => DisplayNode::leaf(name.clone()),
            ExpressionKind::Constant(constant) => DisplayNode::leaf(constant.to_string()),
            ExpressionKind::ArrayAccess(access) => DisplayNode::new(
                format!("INDEX {}", access.array),
                access.indices.iter().map(Expression::tree).collect(),
            ),
            ExpressionKind::Call(call) => call.tree(),
            ExpressionKind::Unary(unary) => {
                DisplayNode::new(unary.op.to_string(), vec![unary.operand.tree()])
            }
            ExpressionKind::Binary(binary) => DisplayNode::new(
                binary.op.to_string(),
                vec![binary.left.tree(), binary.right.tree()],
            ),
        }
    }
}
