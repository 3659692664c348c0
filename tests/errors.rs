use std::error::Error;

use test_utils::compile_failure;

#[test]
fn reject_undefined_variable() -> Result<(), Box<dyn Error>> {
    let stderr = compile_failure("int main() { return x; }")?;

    assert!(stderr.contains("undefined variable 'x'"));
    assert!(stderr.contains("^"));
    assert!(stderr.contains(":1: "));

    Ok(())
}

#[test]
fn reject_dereference_of_non_pointer() -> Result<(), Box<dyn Error>> {
    let stderr = compile_failure("int main() { return *5; }")?;

    assert!(stderr.contains("invalid pointer dereference"));

    Ok(())
}

#[test]
fn reject_unterminated_string_literal() -> Result<(), Box<dyn Error>> {
    let stderr = compile_failure("int main() { char *s; s = \"abc; return 0; }")?;

    assert!(stderr.contains("unclosed string literal"));

    Ok(())
}

#[test]
fn reject_unterminated_block_comment() -> Result<(), Box<dyn Error>> {
    let stderr = compile_failure("int main() { return 0; } /* trailing")?;

    assert!(stderr.contains("unterminated block comment"));

    Ok(())
}

#[test]
fn reject_array_as_lvalue() -> Result<(), Box<dyn Error>> {
    let stderr = compile_failure("int main() { int a[3]; a = 0; return 0; }")?;

    assert!(stderr.contains("not an lvalue"));

    Ok(())
}

#[test]
fn reject_missing_semicolon() -> Result<(), Box<dyn Error>> {
    let stderr = compile_failure("int main() { return 1 }")?;

    assert!(stderr.contains("expected \";\""));

    Ok(())
}

#[test]
fn reject_invalid_token() -> Result<(), Box<dyn Error>> {
    let stderr = compile_failure("int main() { return \x01; }")?;

    assert!(stderr.contains("invalid token"));

    Ok(())
}

#[test]
fn reject_pointer_plus_pointer() -> Result<(), Box<dyn Error>> {
    let stderr = compile_failure("int main() { int *p; int *q; return p + q; }")?;

    assert!(stderr.contains("invalid operands"));

    Ok(())
}

#[test]
fn reject_statement_expression_with_void_tail() -> Result<(), Box<dyn Error>> {
    let stderr = compile_failure("int main() { return ({ while (0) 1; }); }")?;

    assert!(stderr.contains("statement expression returning void is not supported"));

    Ok(())
}

#[test]
fn diagnostic_points_at_offending_line() -> Result<(), Box<dyn Error>> {
    let stderr = compile_failure("int main() {\n  return y;\n}\n")?;

    assert!(stderr.contains(":2: "));
    assert!(stderr.contains("  return y;"));

    Ok(())
}

#[test]
fn reject_missing_file() -> Result<(), Box<dyn Error>> {
    let output = std::process::Command::new("./target/debug/dcc")
        .arg("no-such-file.c")
        .output()?;

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cannot open no-such-file.c"));

    Ok(())
}
