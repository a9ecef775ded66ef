use std::error::Error;

use test_utils::{check_run, Expected, StderrExpectation};

const DUPLICATE_SRC: &str = "int a = 1;\nint a = 2;\n";

const DUPLICATE_EXPECTED: Expected = Expected {
    stdout: "Enter linear C code:\n\n\
             \n======= OUT =======\n\n\
             int a = 1;\n\
             Error occurred in the line 2:\n\
             int a = 2;\n",
    stderr: StderrExpectation::Contains("Cannot register variable"),
    status: 0,
};

const PARSE_ERROR_SRC: &str = "int a = ;";

const PARSE_ERROR_EXPECTED: Expected = Expected {
    stdout: "Enter linear C code:\n\n\
             \n====== ERROR ======\n\
             Ends with parsing error\n",
    stderr: StderrExpectation::Contains("Parser error"),
    status: 1,
};

#[test]
fn duplicate_declaration_halts_with_the_line() -> Result<(), Box<dyn Error>> {
    check_run(env!("CARGO_BIN_EXE_linc"), DUPLICATE_SRC, DUPLICATE_EXPECTED)
}

#[test]
fn parse_errors_exit_with_status_one() -> Result<(), Box<dyn Error>> {
    check_run(
        env!("CARGO_BIN_EXE_linc"),
        PARSE_ERROR_SRC,
        PARSE_ERROR_EXPECTED,
    )
}
