//! Type annotation pass.
//!
//! Walks the parsed program and fills every expression's `info` slot with
//! its value type, disambiguating `+` and `-` into integer or pointer
//! forms and folding `sizeof` into an integer literal. The pass consumes
//! `Program<()>` and produces the `Program<Type>` the code generator runs
//! on.

mod types;

pub use types::*;

use std::{error::Error, fmt::Display};

use crate::diagnostics::Diagnostic;
use crate::lexer::Span;
use crate::parser::{BinaryOp, Expression, Function, Program, Statement, Var, VarId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeCheckError(Diagnostic);

pub type TypeCheckResult<T> = Result<T, TypeCheckError>;

impl TypeCheckError {
    fn at(span: Span, message: impl ToString) -> Self {
        Self(Diagnostic::new(span.offset, message))
    }

    pub fn diagnostic(&self) -> &Diagnostic {
        &self.0
    }
}

impl Display for TypeCheckError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl Error for TypeCheckError {}

pub struct TypeChecker {
    globals: Vec<Var>,
    /// Local table of the function currently being checked.
    locals: Vec<Var>,
}

impl TypeChecker {
    pub fn check(program: Program<()>) -> TypeCheckResult<Program<Type>> {
        let Program { globals, functions } = program;

        let mut checker = TypeChecker {
            globals,
            locals: vec![],
        };
        let functions = functions
            .into_iter()
            .map(|function| checker.check_function(function))
            .collect::<TypeCheckResult<_>>()?;

        Ok(Program {
            globals: checker.globals,
            functions,
        })
    }

    fn check_function(&mut self, function: Function<()>) -> TypeCheckResult<Function<Type>> {
        let Function {
            name,
            return_type,
            params,
            locals,
            body,
            stack_size,
            span,
        } = function;

        self.locals = locals;
        let body = body
            .into_iter()
            .map(|statement| self.check_statement(statement))
            .collect::<TypeCheckResult<_>>()?;

        Ok(Function {
            name,
            return_type,
            params,
            locals: std::mem::take(&mut self.locals),
            body,
            stack_size,
            span,
        })
    }

    fn var_type(&self, id: VarId) -> Type {
        match id {
            VarId::Local(index) => self.locals[index].ty.clone(),
            VarId::Global(index) => self.globals[index].ty.clone(),
        }
    }

    fn check_statement(&mut self, statement: Statement<()>) -> TypeCheckResult<Statement<Type>> {
        match statement {
            Statement::Return { value, span } => Ok(Statement::Return {
                value: self.check_expression(value)?,
                span,
            }),
            Statement::If {
                condition,
                then_branch,
                else_branch,
                span,
            } => Ok(Statement::If {
                condition: self.check_expression(condition)?,
                then_branch: Box::new(self.check_statement(*then_branch)?),
                else_branch: else_branch
                    .map(|statement| self.check_statement(*statement).map(Box::new))
                    .transpose()?,
                span,
            }),
            Statement::While {
                condition,
                body,
                span,
            } => Ok(Statement::While {
                condition: self.check_expression(condition)?,
                body: Box::new(self.check_statement(*body)?),
                span,
            }),
            Statement::For {
                init,
                condition,
                increment,
                body,
                span,
            } => Ok(Statement::For {
                init: init.map(|init| self.check_expression(init)).transpose()?,
                condition: condition
                    .map(|condition| self.check_expression(condition))
                    .transpose()?,
                increment: increment
                    .map(|increment| self.check_expression(increment))
                    .transpose()?,
                body: Box::new(self.check_statement(*body)?),
                span,
            }),
            Statement::Block { statements, span } => Ok(Statement::Block {
                statements: statements
                    .into_iter()
                    .map(|statement| self.check_statement(statement))
                    .collect::<TypeCheckResult<_>>()?,
                span,
            }),
            Statement::Expression { expression, span } => Ok(Statement::Expression {
                expression: self.check_expression(expression)?,
                span,
            }),
            Statement::Empty { span } => Ok(Statement::Empty { span }),
        }
    }

    fn check_expression(&mut self, expression: Expression<()>) -> TypeCheckResult<Expression<Type>> {
        match expression {
            Expression::Num { value, span, .. } => Ok(Expression::Num {
                value,
                span,
                info: Type::Int,
            }),
            Expression::Variable { id, name, span, .. } => Ok(Expression::Variable {
                id,
                name,
                span,
                info: self.var_type(id),
            }),
            Expression::Address { operand, span, .. } => {
                let operand = self.check_expression(*operand)?;
                let info = Type::pointer_to(operand.info().clone());
                Ok(Expression::Address {
                    operand: Box::new(operand),
                    span,
                    info,
                })
            }
            Expression::Dereference { operand, span, .. } => {
                let operand = self.check_expression(*operand)?;
                let Some(base) = operand.info().base() else {
                    return Err(TypeCheckError::at(span, "invalid pointer dereference"));
                };
                let info = base.clone();
                Ok(Expression::Dereference {
                    operand: Box::new(operand),
                    span,
                    info,
                })
            }
            Expression::Assignment {
                target,
                value,
                span,
                ..
            } => {
                let target = self.check_expression(*target)?;
                let value = self.check_expression(*value)?;
                let info = target.info().clone();
                Ok(Expression::Assignment {
                    target: Box::new(target),
                    value: Box::new(value),
                    span,
                    info,
                })
            }
            Expression::Binary {
                op,
                lhs,
                rhs,
                span,
                ..
            } => {
                let lhs = self.check_expression(*lhs)?;
                let rhs = self.check_expression(*rhs)?;
                self.check_binary(op, lhs, rhs, span)
            }
            Expression::Sizeof { operand, span, .. } => {
                // The operand is type-checked but never evaluated; the whole
                // node becomes an integer literal.
                let operand = self.check_expression(*operand)?;
                Ok(Expression::Num {
                    value: operand.info().size() as i64,
                    span,
                    info: Type::Int,
                })
            }
            Expression::Call {
                callee,
                arguments,
                span,
                ..
            } => Ok(Expression::Call {
                callee,
                arguments: arguments
                    .into_iter()
                    .map(|argument| self.check_expression(argument))
                    .collect::<TypeCheckResult<_>>()?,
                span,
                info: Type::Int,
            }),
            Expression::StatementExpression {
                body, tail, span, ..
            } => {
                let body = body
                    .into_iter()
                    .map(|statement| self.check_statement(statement))
                    .collect::<TypeCheckResult<_>>()?;
                let tail = self.check_expression(*tail)?;
                let info = tail.info().clone();
                Ok(Expression::StatementExpression {
                    body,
                    tail: Box::new(tail),
                    span,
                    info,
                })
            }
        }
    }

    /// Disambiguate `+` and `-` between integer and pointer arithmetic; the
    /// other operators yield `int`.
    fn check_binary(
        &mut self,
        op: BinaryOp,
        lhs: Expression<Type>,
        rhs: Expression<Type>,
        span: Span,
    ) -> TypeCheckResult<Expression<Type>> {
        let (op, lhs, rhs, info) = match op {
            BinaryOp::Add => {
                if lhs.info().is_integer() && rhs.info().is_integer() {
                    (BinaryOp::Add, lhs, rhs, Type::Int)
                } else if lhs.info().base().is_some() && rhs.info().is_integer() {
                    let info = lhs.info().clone();
                    (BinaryOp::PtrAdd, lhs, rhs, info)
                } else if lhs.info().is_integer() && rhs.info().base().is_some() {
                    // The integer operand always ends up on the right.
                    let info = rhs.info().clone();
                    (BinaryOp::PtrAdd, rhs, lhs, info)
                } else {
                    return Err(TypeCheckError::at(span, "invalid operands"));
                }
            }
            BinaryOp::Sub => {
                if lhs.info().is_integer() && rhs.info().is_integer() {
                    (BinaryOp::Sub, lhs, rhs, Type::Int)
                } else if lhs.info().base().is_some() && rhs.info().is_integer() {
                    let info = lhs.info().clone();
                    (BinaryOp::PtrSub, lhs, rhs, info)
                } else if lhs.info().base().is_some() && rhs.info().base().is_some() {
                    (BinaryOp::PtrDiff, lhs, rhs, Type::Int)
                } else {
                    return Err(TypeCheckError::at(span, "invalid operands"));
                }
            }
            BinaryOp::Mul
            | BinaryOp::Div
            | BinaryOp::Eq
            | BinaryOp::Ne
            | BinaryOp::Lt
            | BinaryOp::Le => (op, lhs, rhs, Type::Int),
            BinaryOp::PtrAdd | BinaryOp::PtrSub | BinaryOp::PtrDiff => {
                unreachable!("pointer operators are introduced by the type pass")
            }
        };

        Ok(Expression::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
            span,
            info,
        })
    }
}
