use std::error::Error;

use test_utils::{check_run, Expected, StderrExpectation};

const SRC: &str = "int a = 2 + 3 * 4;\nprint a;\n";

const EXPECTED: Expected = Expected {
    stdout: "Enter linear C code:\n\n\
             \n======= OUT =======\n\n\
             int a = 2 + 3 * 4;\n\
             --print-- Value: (int) 14\n\
             \n===== SUCCESS =====\n",
    stderr: StderrExpectation::Empty,
    status: 0,
};

#[test]
fn interpret_arithmetic_expression() -> Result<(), Box<dyn Error>> {
    check_run(env!("CARGO_BIN_EXE_linc"), SRC, EXPECTED)
}
