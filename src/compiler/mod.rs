//! Code generator.
//!
//! Lowers the typed AST to x86-64 assembly with a stack-machine model:
//! every expression pushes exactly one 64-bit value onto the runtime
//! stack, and every statement leaves the stack height unchanged. The
//! output is a flat instruction list rendered into GNU-assembler text,
//! `.data` first, then `.text`.

use std::{error::Error, fmt::Display};

use log::info;

use Instruction::*;
use Operand::*;
use Reg::*;

use crate::asm::{Instruction, Operand, Reg, ARG_REGS};
use crate::diagnostics::Diagnostic;
use crate::lexer::Span;
use crate::parser::{BinaryOp, Expression, GlobalInit, Program, Statement, Var, VarId};
use crate::typechecker::Type;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodegenError(Diagnostic);

pub type CodegenResult<T> = Result<T, CodegenError>;

impl CodegenError {
    fn at(span: Span, message: impl ToString) -> Self {
        Self(Diagnostic::new(span.offset, message))
    }

    pub fn diagnostic(&self) -> &Diagnostic {
        &self.0
    }
}

impl Display for CodegenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl Error for CodegenError {}

pub struct Compiler<'a> {
    program: &'a Program<Type>,
    /// Local table of the function currently being emitted.
    locals: &'a [Var],
    instructions: Vec<Instruction>,
    label_count: usize,
    current_function: String,
}

impl<'a> Compiler<'a> {
    pub fn new(program: &'a Program<Type>) -> Self {
        Self {
            program,
            locals: &[],
            instructions: vec![],
            label_count: 0,
            current_function: String::new(),
        }
    }

    pub fn compile(mut self) -> CodegenResult<String> {
        info!("Generating code...");

        self.push(IntelSyntax);
        self.emit_data();
        self.emit_text()?;

        Ok(self
            .instructions
            .iter()
            .map(|instruction| format!("{instruction}\n"))
            .collect())
    }

    fn push(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    fn next_label(&mut self) -> usize {
        let seq = self.label_count;
        self.label_count += 1;
        seq
    }

    fn resolve(&self, id: VarId) -> &'a Var {
        match id {
            VarId::Local(index) => &self.locals[index],
            VarId::Global(index) => &self.program.globals[index],
        }
    }

    fn emit_data(&mut self) {
        let program = self.program;
        self.push(SectionData);

        for var in &program.globals {
            self.push(Label(var.name.clone()));
            match &var.init {
                Some(GlobalInit::Bytes(bytes)) => {
                    for &byte in bytes {
                        self.push(Byte(byte));
                    }
                }
                Some(GlobalInit::Int(value)) if *value != 0 => self.push(Long(*value)),
                Some(GlobalInit::Array(values)) => {
                    for &value in values {
                        self.push(Quad(value));
                    }
                }
                _ => self.push(Zero(var.ty.size())),
            }
        }
    }

    fn emit_text(&mut self) -> CodegenResult<()> {
        let program = self.program;
        self.push(SectionText);

        for function in &program.functions {
            self.push(Global(function.name.clone()));
            self.push(Label(function.name.clone()));
            self.current_function = function.name.clone();
            self.locals = &function.locals;

            // Prologue
            self.push(Push(Register(Rbp)));
            self.push(Mov(Register(Rbp), Register(Rsp)));
            self.push(Sub(Register(Rsp), Immediate(function.stack_size as i64)));

            for (index, &param) in function.params.iter().enumerate() {
                self.load_arg(&function.locals[param], index, function.span)?;
            }

            for statement in &function.body {
                self.gen_statement(statement)?;
            }

            // Epilogue
            self.push(Label(format!(".L.return.{}", function.name)));
            self.push(Mov(Register(Rsp), Register(Rbp)));
            self.push(Pop(Rbp));
            self.push(Ret);
        }
        Ok(())
    }

    /// Copy an incoming register argument into its frame slot.
    fn load_arg(&mut self, var: &Var, index: usize, span: Span) -> CodegenResult<()> {
        let Some(&reg) = ARG_REGS.get(index) else {
            return Err(CodegenError::at(
                span,
                "more than 6 parameters are not supported",
            ));
        };

        let address = format!("rbp-{}", var.offset);
        match var.ty.size() {
            1 => self.push(Mov(Memory(address), Register(reg.byte()))),
            8 => self.push(Mov(Memory(address), Register(reg))),
            _ => {
                return Err(CodegenError::at(
                    span,
                    format!("parameter '{}' has unsupported size", var.name),
                ));
            }
        }
        Ok(())
    }

    fn gen_statement(&mut self, statement: &Statement<Type>) -> CodegenResult<()> {
        match statement {
            Statement::Return { value, .. } => {
                self.gen_expression(value)?;
                self.push(Pop(Rax));
                self.push(Jmp(format!(".L.return.{}", self.current_function)));
            }
            Statement::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                let seq = self.next_label();
                self.gen_expression(condition)?;
                self.push(Pop(Rax));
                self.push(Cmp(Register(Rax), Immediate(0)));

                match else_branch {
                    Some(else_branch) => {
                        self.push(Je(format!(".Lelse{seq:03}")));
                        self.gen_statement(then_branch)?;
                        self.push(Jmp(format!(".Lend{seq:03}")));
                        self.push(Label(format!(".Lelse{seq:03}")));
                        self.gen_statement(else_branch)?;
                        self.push(Label(format!(".Lend{seq:03}")));
                    }
                    None => {
                        self.push(Je(format!(".Lend{seq:03}")));
                        self.gen_statement(then_branch)?;
                        self.push(Label(format!(".Lend{seq:03}")));
                    }
                }
            }
            Statement::While {
                condition, body, ..
            } => {
                let seq = self.next_label();
                self.push(Label(format!(".Lbegin{seq:03}")));
                self.gen_expression(condition)?;
                self.push(Pop(Rax));
                self.push(Cmp(Register(Rax), Immediate(0)));
                self.push(Je(format!(".Lend{seq:03}")));
                self.gen_statement(body)?;
                self.push(Jmp(format!(".Lbegin{seq:03}")));
                self.push(Label(format!(".Lend{seq:03}")));
            }
            Statement::For {
                init,
                condition,
                increment,
                body,
                ..
            } => {
                let seq = self.next_label();
                if let Some(init) = init {
                    self.gen_expression(init)?;
                    self.push(Add(Register(Rsp), Immediate(8)));
                }
                self.push(Label(format!(".Lbegin{seq:03}")));
                if let Some(condition) = condition {
                    self.gen_expression(condition)?;
                    self.push(Pop(Rax));
                    self.push(Cmp(Register(Rax), Immediate(0)));
                    self.push(Je(format!(".Lend{seq:03}")));
                }
                self.gen_statement(body)?;
                if let Some(increment) = increment {
                    self.gen_expression(increment)?;
                    self.push(Add(Register(Rsp), Immediate(8)));
                }
                self.push(Jmp(format!(".Lbegin{seq:03}")));
                self.push(Label(format!(".Lend{seq:03}")));
            }
            Statement::Block { statements, .. } => {
                for statement in statements {
                    self.gen_statement(statement)?;
                }
            }
            Statement::Expression { expression, .. } => {
                self.gen_expression(expression)?;
                // discard the pushed value
                self.push(Add(Register(Rsp), Immediate(8)));
            }
            Statement::Empty { .. } => {}
        }
        Ok(())
    }

    fn gen_expression(&mut self, expression: &Expression<Type>) -> CodegenResult<()> {
        match expression {
            Expression::Num { value, .. } => self.push(Push(Immediate(*value))),
            Expression::Variable { info, .. } => {
                self.gen_addr(expression)?;
                // array-typed references decay to their address
                if !info.is_array() {
                    self.load(info);
                }
            }
            Expression::Address { operand, .. } => self.gen_addr(operand)?,
            Expression::Dereference { operand, info, .. } => {
                self.gen_expression(operand)?;
                if !info.is_array() {
                    self.load(info);
                }
            }
            Expression::Assignment {
                target,
                value,
                info,
                ..
            } => {
                self.gen_lvalue(target)?;
                self.gen_expression(value)?;
                self.store(info);
            }
            Expression::StatementExpression { body, tail, .. } => {
                for statement in body {
                    self.gen_statement(statement)?;
                }
                self.gen_expression(tail)?;
            }
            Expression::Call {
                callee,
                arguments,
                span,
                ..
            } => self.gen_call(callee, arguments, *span)?,
            Expression::Binary {
                op, lhs, rhs, info, ..
            } => {
                self.gen_expression(lhs)?;
                self.gen_expression(rhs)?;
                self.push(Pop(Rdi));
                self.push(Pop(Rax));

                match op {
                    BinaryOp::Add => self.push(Add(Register(Rax), Register(Rdi))),
                    BinaryOp::PtrAdd => {
                        self.push(Imul(Register(Rdi), Immediate(base_size(info) as i64)));
                        self.push(Add(Register(Rax), Register(Rdi)));
                    }
                    BinaryOp::Sub => self.push(Sub(Register(Rax), Register(Rdi))),
                    BinaryOp::PtrSub => {
                        self.push(Imul(Register(Rdi), Immediate(base_size(info) as i64)));
                        self.push(Sub(Register(Rax), Register(Rdi)));
                    }
                    BinaryOp::PtrDiff => {
                        self.push(Sub(Register(Rax), Register(Rdi)));
                        self.push(Cqo);
                        self.push(Mov(
                            Register(Rdi),
                            Immediate(base_size(lhs.info()) as i64),
                        ));
                        self.push(Idiv(Rdi));
                    }
                    BinaryOp::Mul => self.push(Imul(Register(Rax), Register(Rdi))),
                    BinaryOp::Div => {
                        self.push(Cqo);
                        self.push(Idiv(Rdi));
                    }
                    BinaryOp::Eq => self.gen_comparison(Sete(Al)),
                    BinaryOp::Ne => self.gen_comparison(Setne(Al)),
                    BinaryOp::Lt => self.gen_comparison(Setl(Al)),
                    BinaryOp::Le => self.gen_comparison(Setle(Al)),
                }
                self.push(Push(Register(Rax)));
            }
            Expression::Sizeof { .. } => unreachable!("sizeof is folded by the type pass"),
        }
        Ok(())
    }

    fn gen_comparison(&mut self, set: Instruction) {
        self.push(Cmp(Register(Rax), Register(Rdi)));
        self.push(set);
        self.push(Movzb(Register(Rax), Register(Al)));
    }

    fn gen_call(
        &mut self,
        callee: &str,
        arguments: &[Expression<Type>],
        span: Span,
    ) -> CodegenResult<()> {
        if arguments.len() > ARG_REGS.len() {
            return Err(CodegenError::at(
                span,
                "more than 6 arguments are not supported",
            ));
        }

        for argument in arguments {
            self.gen_expression(argument)?;
        }
        for index in (0..arguments.len()).rev() {
            self.push(Pop(ARG_REGS[index]));
        }

        // The ABI requires rsp to be 16-byte aligned at the call; test the
        // alignment at runtime and insert 8 bytes of padding if needed.
        let seq = self.next_label();
        self.push(Mov(Register(Rax), Register(Rsp)));
        self.push(And(Register(Rax), Immediate(15)));
        self.push(Jnz(format!(".L.call.{seq}")));
        self.push(Mov(Register(Rax), Immediate(0)));
        self.push(Call(callee.to_string()));
        self.push(Jmp(format!(".L.end.{seq}")));
        self.push(Label(format!(".L.call.{seq}")));
        self.push(Sub(Register(Rsp), Immediate(8)));
        self.push(Mov(Register(Rax), Immediate(0)));
        self.push(Call(callee.to_string()));
        self.push(Add(Register(Rsp), Immediate(8)));
        self.push(Label(format!(".L.end.{seq}")));
        self.push(Push(Register(Rax)));
        Ok(())
    }

    /// Push the address of an lvalue expression onto the stack.
    fn gen_addr(&mut self, expression: &Expression<Type>) -> CodegenResult<()> {
        match expression {
            Expression::Variable { id, .. } => {
                let var = self.resolve(*id);
                if var.is_local {
                    let address = format!("rbp-{}", var.offset);
                    self.push(Lea(Register(Rax), Memory(address)));
                    self.push(Push(Register(Rax)));
                } else {
                    let name = var.name.clone();
                    self.push(Push(SymbolAddress(name)));
                }
                Ok(())
            }
            Expression::Dereference { operand, .. } => self.gen_expression(operand),
            _ => Err(CodegenError::at(expression.span(), "not an lvalue")),
        }
    }

    /// Like [`Compiler::gen_addr`], but rejects arrays: they decay to
    /// addresses yet cannot be assigned.
    fn gen_lvalue(&mut self, expression: &Expression<Type>) -> CodegenResult<()> {
        if expression.info().is_array() {
            return Err(CodegenError::at(expression.span(), "not an lvalue"));
        }
        self.gen_addr(expression)
    }

    /// Replace the address on the stack top with the value it points to.
    fn load(&mut self, ty: &Type) {
        self.push(Pop(Rax));
        if ty.size() == 1 {
            self.push(Movsx(Register(Rax), ByteMemory("rax".to_string())));
        } else {
            self.push(Mov(Register(Rax), Memory("rax".to_string())));
        }
        self.push(Push(Register(Rax)));
    }

    /// Store value (stack top) through address (below it), leaving the
    /// value on the stack so chained assignments compose.
    fn store(&mut self, ty: &Type) {
        self.push(Pop(Rdi));
        self.push(Pop(Rax));
        if ty.size() == 1 {
            self.push(Mov(Memory("rax".to_string()), Register(Dil)));
        } else {
            self.push(Mov(Memory("rax".to_string()), Register(Rdi)));
        }
        self.push(Push(Register(Rdi)));
    }
}

fn base_size(ty: &Type) -> usize {
    let Some(base) = ty.base() else {
        unreachable!("pointer arithmetic on non-pointer type '{ty}'");
    };
    base.size()
}
