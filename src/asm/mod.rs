//! Textual x86-64 assembly model.
//!
//! Instructions and directives are values; rendering them through
//! [`Display`] yields one line of GNU-assembler text in Intel syntax
//! (`.intel_syntax noprefix`). Instructions are indented by two spaces,
//! labels and section markers follow the layout of the emitted file.

mod reg;

use std::fmt::Display;

pub use self::reg::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Register(Reg),
    Immediate(i64),
    /// Unqualified memory reference, rendered as `[address]`.
    Memory(String),
    /// Byte-sized memory reference, rendered as `BYTE PTR [address]`.
    ByteMemory(String),
    /// Link-time address of a symbol, rendered as `offset name`.
    SymbolAddress(String),
}

impl Display for Operand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operand::Register(reg) => reg.fmt(f),
            Operand::Immediate(value) => value.fmt(f),
            Operand::Memory(address) => f.write_fmt(format_args!("[{address}]")),
            Operand::ByteMemory(address) => f.write_fmt(format_args!("BYTE PTR [{address}]")),
            Operand::SymbolAddress(name) => f.write_fmt(format_args!("offset {name}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    IntelSyntax,
    SectionData,
    SectionText,
    Global(String),
    Label(String),
    Byte(u8),
    Long(i64),
    Quad(i64),
    Zero(usize),
    Push(Operand),
    Pop(Reg),
    Mov(Operand, Operand),
    Movsx(Operand, Operand),
    Movzb(Operand, Operand),
    Lea(Operand, Operand),
    Add(Operand, Operand),
    Sub(Operand, Operand),
    Imul(Operand, Operand),
    Cqo,
    Idiv(Reg),
    And(Operand, Operand),
    Cmp(Operand, Operand),
    Sete(Reg),
    Setne(Reg),
    Setl(Reg),
    Setle(Reg),
    Je(String),
    Jnz(String),
    Jmp(String),
    Call(String),
    Ret,
}

impl Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let line = match self {
            Instruction::IntelSyntax => ".intel_syntax noprefix".to_string(),
            Instruction::SectionData => "  .data".to_string(),
            Instruction::SectionText => "  .text".to_string(),
            Instruction::Global(name) => format!(".global {name}"),
            Instruction::Label(name) => format!("{name}:"),
            Instruction::Byte(value) => format!("  .byte 0x{value:x}"),
            Instruction::Long(value) => format!("  .long {value}"),
            Instruction::Quad(value) => format!("  .quad {value}"),
            Instruction::Zero(size) => format!("  .zero {size}"),
            Instruction::Push(source) => format!("  push {source}"),
            Instruction::Pop(target) => format!("  pop {target}"),
            Instruction::Mov(target, source) => format!("  mov {target}, {source}"),
            Instruction::Movsx(target, source) => format!("  movsx {target}, {source}"),
            Instruction::Movzb(target, source) => format!("  movzb {target}, {source}"),
            Instruction::Lea(target, source) => format!("  lea {target}, {source}"),
            Instruction::Add(target, source) => format!("  add {target}, {source}"),
            Instruction::Sub(target, source) => format!("  sub {target}, {source}"),
            Instruction::Imul(target, source) => format!("  imul {target}, {source}"),
            Instruction::Cqo => "  cqo".to_string(),
            Instruction::Idiv(source) => format!("  idiv {source}"),
            Instruction::And(target, source) => format!("  and {target}, {source}"),
            Instruction::Cmp(target, source) => format!("  cmp {target}, {source}"),
            Instruction::Sete(target) => format!("  sete {target}"),
            Instruction::Setne(target) => format!("  setne {target}"),
            Instruction::Setl(target) => format!("  setl {target}"),
            Instruction::Setle(target) => format!("  setle {target}"),
            Instruction::Je(target) => format!("  je {target}"),
            Instruction::Jnz(target) => format!("  jnz {target}"),
            Instruction::Jmp(target) => format!("  jmp {target}"),
            Instruction::Call(name) => format!("  call {name}"),
            Instruction::Ret => "  ret".to_string(),
        };
        f.write_str(&line)
    }
}
