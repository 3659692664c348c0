//! # dcc
//!
//! This binary is the compiler driver. It reads one C-subset source file,
//! runs the pipeline (lexer, parser, type pass, code generator) and prints
//! x86-64 assembly on standard output. Diagnostics go to standard error;
//! any error terminates the process with status 1.

mod cli;

use cli::*;

use std::{fs, process::exit};

use log::info;

use dcc::{
    compiler::Compiler,
    diagnostics::{Diagnostic, SourceFile},
    lexer::{format_token_stream, Lexer},
    parser::Parser,
    typechecker::TypeChecker,
};

fn main() {
    let args = Cli::init();

    simple_logger::init_with_level(args.verbosity.into()).unwrap();

    let contents = match fs::read_to_string(&args.file) {
        Ok(contents) => contents,
        Err(error) => {
            eprintln!("cannot open {}: {}", args.file.display(), error);
            exit(1);
        }
    };

    let source = SourceFile::new(args.file.display().to_string(), contents);

    info!("Tokenizing '{}'...", source.name);
    let tokens = match Lexer::new(&source.contents).lex() {
        Ok(tokens) => tokens,
        Err(error) => fail(&source, error.diagnostic()),
    };

    if args.dump_tokens {
        info!("Token stream:\n{}", format_token_stream(&tokens));
    }

    info!("Parsing...");
    let mut program = match Parser::new(tokens).parse() {
        Ok(program) => program,
        Err(error) => fail(&source, error.diagnostic()),
    };

    if args.dump_ast {
        info!("Parsed program:\n{program:#?}");
    }

    program.assign_frame_offsets();

    let program = match TypeChecker::check(program) {
        Ok(program) => program,
        Err(error) => fail(&source, error.diagnostic()),
    };

    let assembly = match Compiler::new(&program).compile() {
        Ok(assembly) => assembly,
        Err(error) => fail(&source, error.diagnostic()),
    };

    print!("{assembly}");
}

fn fail(source: &SourceFile, diagnostic: &Diagnostic) -> ! {
    eprintln!("{}", source.render(diagnostic));
    exit(1);
}
