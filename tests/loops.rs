use std::error::Error;

use test_utils::compile_success;

#[test]
fn compile_for_loop() -> Result<(), Box<dyn Error>> {
    let assembly =
        compile_success("int main() { int i; int s; s=0; for (i=0;i<10;i=i+1) s=s+i; return s; }")?;

    assert!(assembly.contains(".Lbegin000:\n"));
    assert!(assembly.contains("  je .Lend000\n"));
    assert!(assembly.contains("  jmp .Lbegin000\n"));
    assert!(assembly.contains(".Lend000:\n"));
    // the loop condition
    assert!(assembly.contains("  cmp rax, rdi\n  setl al\n  movzb rax, al\n"));

    Ok(())
}

#[test]
fn compile_for_loop_without_clauses() -> Result<(), Box<dyn Error>> {
    let assembly = compile_success("int main() { for (;;) return 1; return 0; }")?;

    // no condition is emitted, the loop falls straight into its body
    assert!(assembly.contains(".Lbegin000:\n  push 1\n  pop rax\n  jmp .L.return.main\n"));

    Ok(())
}

#[test]
fn compile_while_loop() -> Result<(), Box<dyn Error>> {
    let assembly =
        compile_success("int main() { int i; i=0; while (i<5) i=i+1; return i; }")?;

    assert!(assembly.contains(".Lbegin000:\n"));
    assert!(assembly.contains("  je .Lend000\n"));
    assert!(assembly.contains("  jmp .Lbegin000\n.Lend000:\n"));

    Ok(())
}

#[test]
fn compile_if_without_else() -> Result<(), Box<dyn Error>> {
    let assembly = compile_success("int main() { if (1) return 2; return 3; }")?;

    assert!(assembly.contains("  cmp rax, 0\n  je .Lend000\n"));
    assert!(!assembly.contains(".Lelse000"));

    Ok(())
}

#[test]
fn compile_if_else_chain() -> Result<(), Box<dyn Error>> {
    let assembly = compile_success(
        "int main() { if (0) return 1; else if (1) return 2; else return 3; }",
    )?;

    // outer if seeds 0, nested if seeds 1
    assert!(assembly.contains("  je .Lelse000\n"));
    assert!(assembly.contains(".Lelse000:\n"));
    assert!(assembly.contains("  je .Lelse001\n"));
    assert!(assembly.contains(".Lend001:\n.Lend000:\n"));

    Ok(())
}

#[test]
fn compile_nested_loops_use_distinct_labels() -> Result<(), Box<dyn Error>> {
    let assembly = compile_success(
        "int main() { int i; int j; for (i=0;i<3;i=i+1) { j=0; while (j<i) j=j+1; } return j; }",
    )?;

    assert!(assembly.contains(".Lbegin000:\n"));
    assert!(assembly.contains(".Lbegin001:\n"));
    assert!(assembly.contains(".Lend001:\n"));
    assert!(assembly.contains(".Lend000:\n"));

    Ok(())
}
