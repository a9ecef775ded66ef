use std::error::Error;

use test_utils::{check_run, Expected, StderrExpectation};

// The first allocation of a run lands at the bottom of the arena, so
// pointer values print deterministically.
const SRC: &str =
    "int arr[] = {1, 2, 3};\nint* p = arr;\nprint p;\nprint p + 2;\nprint 1.5;\nprint (char) 65;";

const EXPECTED: Expected = Expected {
    stdout: "Enter linear C code:\n\n\
             \n======= OUT =======\n\n\
             int arr[] = {1, 2, 3};\n\
             int* p = arr;\n\
             --print-- Value: (int*) 1000\n\
             --print-- Value: (int*) 1008\n\
             --print-- Value: (double) 1.500000\n\
             --print-- Value: (char) A\n\
             \n===== SUCCESS =====\n",
    stderr: StderrExpectation::Empty,
    status: 0,
};

#[test]
fn print_formats_pointers_floats_and_chars() -> Result<(), Box<dyn Error>> {
    check_run(env!("CARGO_BIN_EXE_linc"), SRC, EXPECTED)
}
