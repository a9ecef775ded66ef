use std::error::Error;

use test_utils::{check_run, Expected, StderrExpectation};

const SRC: &str = "int* p;\nprint *p;\n";

const EXPECTED: Expected = Expected {
    stdout: "Enter linear C code:\n\n\
             \n======= OUT =======\n\n\
             int* p;\n\
             --print-- Value: (void) \n\
             Error occurred in the line 2:\n\
             print *p;\n",
    stderr: StderrExpectation::Contains("Cannot access to address"),
    status: 0,
};

#[test]
fn dereferencing_an_uninitialized_pointer_halts_with_the_line() -> Result<(), Box<dyn Error>> {
    check_run(env!("CARGO_BIN_EXE_linc"), SRC, EXPECTED)
}
