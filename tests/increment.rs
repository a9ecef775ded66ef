use std::error::Error;

use test_utils::{check_run, Expected, StderrExpectation};

const SRC: &str = "int i = 0;\nint j = i++;\nprint i;\nprint j;\n";

const EXPECTED: Expected = Expected {
    stdout: "Enter linear C code:\n\n\
             \n======= OUT =======\n\n\
             int i = 0;\n\
             int j = i++;\n\
             --print-- Value: (int) 1\n\
             --print-- Value: (int) 0\n\
             \n===== SUCCESS =====\n",
    stderr: StderrExpectation::Empty,
    status: 0,
};

#[test]
fn postfix_increment_yields_the_previous_value() -> Result<(), Box<dyn Error>> {
    check_run(env!("CARGO_BIN_EXE_linc"), SRC, EXPECTED)
}
