use std::error::Error;

use test_utils::compile_success;

#[test]
fn compile_array_indexing() -> Result<(), Box<dyn Error>> {
    let assembly = compile_success(
        "int main() { int a[3]; a[0]=1; a[1]=2; a[2]=4; return a[0]+a[1]+a[2]; }",
    )?;

    // a[3] occupies 24 bytes at the bottom of the frame
    assert!(assembly.contains("  sub rsp, 24\n"));
    assert!(assembly.contains("  lea rax, [rbp-24]\n"));
    // indexing scales by the element size
    assert!(assembly.contains("  imul rdi, 8\n  add rax, rdi\n"));

    Ok(())
}

#[test]
fn compile_array_reference_decays_to_address() -> Result<(), Box<dyn Error>> {
    let assembly = compile_success("int main() { int a[2]; int *p; p = a; return *p; }")?;

    // `p = a` stores the array's address, never a loaded value
    assert!(assembly.contains(
        "  lea rax, [rbp-16]\n  push rax\n  pop rdi\n  pop rax\n  mov [rax], rdi\n"
    ));

    Ok(())
}

#[test]
fn compile_char_array() -> Result<(), Box<dyn Error>> {
    let assembly =
        compile_success("int main() { char b[4]; b[3] = 1; return b[3]; }")?;

    assert!(assembly.contains("  imul rdi, 1\n"));
    assert!(assembly.contains("  mov [rax], dil\n"));
    assert!(assembly.contains("  movsx rax, BYTE PTR [rax]\n"));

    Ok(())
}
