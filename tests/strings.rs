use std::error::Error;

use test_utils::compile_success;

#[test]
fn compile_string_literal() -> Result<(), Box<dyn Error>> {
    let assembly =
        compile_success("int main() { char *s; s = \"hi\"; return s[0]; }")?;

    // the literal backs an anonymous global, NUL included
    assert!(assembly.contains(".L.data.0:\n  .byte 0x68\n  .byte 0x69\n  .byte 0x0\n"));
    assert!(assembly.contains("  push offset .L.data.0\n"));

    Ok(())
}

#[test]
fn compile_string_escapes() -> Result<(), Box<dyn Error>> {
    let assembly =
        compile_success("int main() { char *s; s = \"\\n\\e\\q\"; return 0; }")?;

    // \n and \e decode, unknown \q collapses to q
    assert!(assembly.contains(".L.data.0:\n  .byte 0xa\n  .byte 0x1b\n  .byte 0x71\n  .byte 0x0\n"));

    Ok(())
}

#[test]
fn compile_multiple_string_literals_get_distinct_labels() -> Result<(), Box<dyn Error>> {
    let assembly = compile_success(
        "int main() { char *a; char *b; a = \"x\"; b = \"y\"; return 0; }",
    )?;

    assert!(assembly.contains(".L.data.0:\n"));
    assert!(assembly.contains(".L.data.1:\n"));

    Ok(())
}

#[test]
fn compile_string_passed_to_call() -> Result<(), Box<dyn Error>> {
    let assembly = compile_success("int main() { return puts(\"ok\"); }")?;

    assert!(assembly.contains("  push offset .L.data.0\n"));
    assert!(assembly.contains("  pop rdi\n"));
    assert!(assembly.contains("  call puts\n"));

    Ok(())
}
