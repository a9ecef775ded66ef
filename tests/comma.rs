use std::error::Error;

use test_utils::{check_run, Expected, StderrExpectation};

const SRC: &str = "int a = 1; int b = 2; print a, b, a + b;";

const EXPECTED: Expected = Expected {
    stdout: "Enter linear C code:\n\n\
             \n======= OUT =======\n\n\
             int a = 1;\n\
             int b = 2;\n\
             --print-- Value: (int) 3\n\
             \n===== SUCCESS =====\n",
    stderr: StderrExpectation::Empty,
    status: 0,
};

#[test]
fn comma_expression_prints_its_last_member() -> Result<(), Box<dyn Error>> {
    check_run(env!("CARGO_BIN_EXE_linc"), SRC, EXPECTED)
}
