use std::error::Error;

use test_utils::{check_run, Expected, StderrExpectation};

const SRC: &str = "unsigned int u = 4294967295; short s = -5; print u; print s; \
                   long long x = 1, y = 2, z = 3; print x + y + z;";

const EXPECTED: Expected = Expected {
    stdout: "Enter linear C code:\n\n\
             \n======= OUT =======\n\n\
             unsigned int u = 4294967295;\n\
             short s = -5;\n\
             --print-- Value: (uint) 4294967295\n\
             --print-- Value: (short) -5\n\
             long long x = 1, y = 2, z = 3;\n\
             --print-- Value: (longlong) 6\n\
             \n===== SUCCESS =====\n",
    stderr: StderrExpectation::Empty,
    status: 0,
};

#[test]
fn declarations_cover_the_primitive_types() -> Result<(), Box<dyn Error>> {
    check_run(env!("CARGO_BIN_EXE_linc"), SRC, EXPECTED)
}
