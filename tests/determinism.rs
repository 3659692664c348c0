use std::error::Error;

use test_utils::compile_success;

const SOURCE: &str = "
int fib(int n) {
  if (n <= 1) return n;
  return fib(n-1) + fib(n-2);
}

int main() {
  int i;
  int s;
  s = 0;
  for (i = 0; i < 10; i = i + 1)
    s = s + fib(i);
  return s;
}
";

#[test]
fn repeated_runs_emit_identical_assembly() -> Result<(), Box<dyn Error>> {
    let first = compile_success(SOURCE)?;
    let second = compile_success(SOURCE)?;

    assert_eq!(first, second);

    Ok(())
}

#[test]
fn emitted_labels_are_unique() -> Result<(), Box<dyn Error>> {
    let assembly = compile_success(SOURCE)?;

    let mut labels: Vec<&str> = assembly
        .lines()
        .filter(|line| line.ends_with(':'))
        .collect();
    let before = labels.len();
    labels.sort_unstable();
    labels.dedup();

    assert_eq!(before, labels.len());

    Ok(())
}
