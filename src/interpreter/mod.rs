//! The interpreter driver: splits the input into `;`-terminated statements,
//! parses them into a [`Program`], and interprets the statements in order
//! against a [`Context`], echoing every statement that modified an lvalue.

pub mod context;
mod eval;
mod memory;

pub use context::Context;
pub use eval::{evaluate, lvalue_of};
pub use memory::{AllocError, Memory, MemoryRegion, ARENA_BASE};

use std::{
    error::Error,
    fmt::Display,
    io::{self, Write},
};

use crate::{
    lexer::Lexer,
    parser::{
        self,
        ast::{Declaration, Expression, FieldKind, Statement},
        ParseError, ParseState,
    },
    value::{Payload, Type, Value},
};

/// Longest accepted source text of a single statement.
pub const MAX_STATEMENT_LENGTH: usize = 1024;

/// A statement paired with its source text for the echo output.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProgramLine {
    pub statement: Statement,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Program {
    pub lines: Vec<ProgramLine>,
}

/// Split the input on `;` and parse every non-blank chunk into a statement.
/// The statement keeps its source text, stripped of leading whitespace.
pub fn parse_program(input: &str) -> Result<Program, ParseError> {
    let mut lines = vec![];

    for chunk in input.split(';') {
        if chunk.len() > MAX_STATEMENT_LENGTH {
            return Err(ParseError::new(format!(
                "statement exceeds {MAX_STATEMENT_LENGTH} characters"
            )));
        }

        let source = chunk.trim_start();
        if source.is_empty() {
            continue;
        }

        let tokens = Lexer::new(source).lex()?;
        let statement = parser::parse_statement(&mut ParseState::new(tokens))?;
        lines.push(ProgramLine {
            statement,
            source: source.to_string(),
        });
    }

    Ok(Program { lines })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// All statements were interpreted.
    Completed,
    /// A statement raised the evaluation error flag; the failing line has
    /// been reported and the rest of the program was skipped.
    EvaluationError,
}

#[derive(Debug)]
pub enum RunError {
    Allocation(AllocError),
    Io(io::Error),
}

impl Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunError::Allocation(error) => write!(f, "{error}"),
            RunError::Io(error) => write!(f, "{error}"),
        }
    }
}

impl Error for RunError {}

impl From<AllocError> for RunError {
    fn from(error: AllocError) -> Self {
        RunError::Allocation(error)
    }
}

impl From<io::Error> for RunError {
    fn from(error: io::Error) -> Self {
        RunError::Io(error)
    }
}

pub struct Interpreter {
    program: Program,
    context: Context,
}

impl Interpreter {
    pub fn new(program: Program) -> Interpreter {
        Interpreter {
            program,
            context: Context::new(),
        }
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Interpret the program statement by statement. Statements that
    /// modified any lvalue are echoed; an evaluation error reports the
    /// failing line with its 1-based index and stops the run.
    pub fn run(&mut self, out: &mut dyn Write) -> Result<RunOutcome, RunError> {
        for (index, line) in self.program.lines.iter().enumerate() {
            self.context.clear_evaluation_error();
            let mut changes = false;

            interpret_statement(&mut self.context, &mut changes, &line.statement, out)?;

            if self.context.has_evaluation_error() {
                writeln!(out, "Error occurred in the line {}:", index + 1)?;
                writeln!(out, "{};", line.source)?;
                return Ok(RunOutcome::EvaluationError);
            }
            if changes {
                writeln!(out, "{};", line.source)?;
            }
        }

        Ok(RunOutcome::Completed)
    }
}

fn interpret_statement(
    ctx: &mut Context,
    changes: &mut bool,
    statement: &Statement,
    out: &mut dyn Write,
) -> Result<(), RunError> {
    match statement {
        Statement::Declaration(declaration) => interpret_declaration(ctx, changes, declaration),
        Statement::Expression(statement) => {
            evaluate(ctx, changes, &statement.expression);
            Ok(())
        }
        Statement::Print(statement) => {
            let value = evaluate(ctx, changes, &statement.expression);
            print_value(out, &value)?;
            Ok(())
        }
    }
}

fn interpret_declaration(
    ctx: &mut Context,
    changes: &mut bool,
    declaration: &Declaration,
) -> Result<(), RunError> {
    for field in &declaration.fields {
        let declared = field.field_type(declaration.primitive);
        if declared == Type::VOID {
            ctx.report(format!(
                "Cannot create variable `{}` with void type",
                field.name
            ));
            return Ok(());
        }

        let value = match &field.kind {
            FieldKind::Scalar { initializer } => {
                match scalar_field_value(ctx, changes, declared, initializer.as_ref()) {
                    Some(value) => value,
                    None => return Ok(()),
                }
            }
            FieldKind::Array { size, initializers } => {
                match array_field_value(ctx, changes, declared, *size, initializers)? {
                    Some(value) => value,
                    None => return Ok(()),
                }
            }
        };

        match ctx.declare(&field.name, &value) {
            Ok(true) => {}
            Ok(false) => {
                ctx.report(format!("Cannot register variable `{}`", field.name));
                return Ok(());
            }
            Err(error) => return Err(error.into()),
        }
    }

    *changes = true;
    Ok(())
}

/// The initial value of a scalar field: the evaluated initializer converted
/// to the declared type, or an all-zero cell. `None` means an evaluation
/// error was reported.
fn scalar_field_value(
    ctx: &mut Context,
    changes: &mut bool,
    declared: Type,
    initializer: Option<&Expression>,
) -> Option<Value> {
    let Some(expression) = initializer else {
        return Some(Value::zeroed(declared));
    };

    let value = evaluate(ctx, changes, expression);
    if value.ty == declared {
        return Some(value);
    }

    let converted = value.cast_to(declared);
    if converted.is_probably_error() {
        ctx.report("Cannot assign value to variable");
        return None;
    }
    Some(converted)
}

/// Allocate and fill an array field's data buffer; the variable's value is
/// a pointer to the buffer. `None` means an evaluation error was reported.
fn array_field_value(
    ctx: &mut Context,
    changes: &mut bool,
    element: Type,
    size: usize,
    initializers: &[Expression],
) -> Result<Option<Value>, RunError> {
    let pointer = element.reference();
    let factor = pointer.element_factor();
    if factor == 0 {
        ctx.report("Cannot get size of array type");
        return Ok(None);
    }

    let length = if size == 0 { initializers.len() } else { size };
    let bytes = length.checked_mul(factor).ok_or(AllocError)?;
    let buffer = ctx.memory.alloc(bytes)?;

    for (index, initializer) in initializers.iter().enumerate() {
        if index >= length {
            ctx.report("Too many expressions in array");
            return Ok(None);
        }

        let value = evaluate(ctx, changes, initializer);
        let value = if value.ty == element {
            value
        } else {
            let converted = value.cast_to(element);
            if converted.is_probably_error() {
                ctx.report("Cannot cast evaluated value to array type");
                return Ok(None);
            }
            converted
        };

        let address = buffer + index * factor;
        let stored = if element.is_pointer() {
            match value.payload {
                Payload::Address(a) => ctx.memory.store_address(address, a),
                _ => None,
            }
        } else {
            ctx.memory.store_primitive(address, &value.payload)
        };
        if stored.is_none() {
            ctx.internal_error("array element store failed");
            return Ok(None);
        }
    }

    Ok(Some(Value::pointer(pointer, buffer)))
}

/// Emit the human-readable value line of a `print` statement: the type name
/// with its pointer stars, then the payload. Pointers print as lowercase
/// hex, chars as their raw byte, floating point values with six decimals.
fn print_value(out: &mut dyn Write, value: &Value) -> io::Result<()> {
    write!(out, "--print-- Value: ({}) ", value.ty)?;

    if value.ty.is_pointer() {
        let address = value.payload.as_address().unwrap_or(0);
        return writeln!(out, "{address:x}");
    }

    match value.payload {
        Payload::Void => writeln!(out),
        Payload::Char(v) => {
            out.write_all(&[v as u8])?;
            writeln!(out)
        }
        Payload::UChar(v) => writeln!(out, "{v}"),
        Payload::Short(v) => writeln!(out, "{v}"),
        Payload::UShort(v) => writeln!(out, "{v}"),
        Payload::Int(v) => writeln!(out, "{v}"),
        Payload::UInt(v) => writeln!(out, "{v}"),
        Payload::Long(v) => writeln!(out, "{v}"),
        Payload::ULong(v) => writeln!(out, "{v}"),
        Payload::LongLong(v) => writeln!(out, "{v}"),
        Payload::ULongLong(v) => writeln!(out, "{v}"),
        Payload::Float(v) => writeln!(out, "{v:.6}"),
        Payload::Double(v) => writeln!(out, "{v:.6}"),
        Payload::Address(v) => writeln!(out, "{v:x}"),
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn run_source(source: &str) -> (String, RunOutcome) {
        let program = parse_program(source).expect("program should parse");
        let mut interpreter = Interpreter::new(program);
        let mut out = Vec::new();
        let outcome = interpreter.run(&mut out).expect("run should not fail hard");
        (
            String::from_utf8(out).expect("interpreter output is text"),
            outcome,
        )
    }

    fn printed_values(output: &str) -> Vec<&str> {
        output
            .lines()
            .filter_map(|line| line.strip_prefix("--print-- Value: "))
            .collect()
    }

    #[test]
    fn test_arithmetic_with_priorities() {
        let (output, outcome) = run_source("int a = 2 + 3 * 4; print a;");

        assert_eq!(RunOutcome::Completed, outcome);
        assert_eq!(vec!["(int) 14"], printed_values(&output));
        assert!(output.contains("int a = 2 + 3 * 4;\n"));
    }

    #[test]
    fn test_compound_assignments_echo_and_apply() {
        let (output, outcome) = run_source("int x = 5; x += 3; x *= 2; print x;");

        assert_eq!(RunOutcome::Completed, outcome);
        assert_eq!(vec!["(int) 16"], printed_values(&output));
        assert!(output.contains("x += 3;\n"));
        assert!(output.contains("x *= 2;\n"));
    }

    #[test]
    fn test_arrays_and_pointer_stores() {
        let (output, outcome) = run_source(
            "int arr[] = {10, 20, 30}; int* p = arr; print p[2]; p[1] = 99; print arr[1];",
        );

        assert_eq!(RunOutcome::Completed, outcome);
        assert_eq!(vec!["(int) 30", "(int) 99"], printed_values(&output));
        assert!(output.contains("p[1] = 99;\n"));
    }

    #[test]
    fn test_comma_returns_the_last_value() {
        let (output, outcome) = run_source("int a = 1; int b = 2; print a, b, a + b;");

        assert_eq!(RunOutcome::Completed, outcome);
        assert_eq!(vec!["(int) 3"], printed_values(&output));
    }

    #[test]
    fn test_postfix_increment_returns_previous_value() {
        let (output, outcome) = run_source("int i = 0; int j = i++; print i; print j;");

        assert_eq!(RunOutcome::Completed, outcome);
        assert_eq!(vec!["(int) 1", "(int) 0"], printed_values(&output));
        assert!(output.contains("int j = i++;\n"));
    }

    #[test]
    fn test_prefix_increment_returns_new_value() {
        let (output, _) = run_source("int i = 0; int j = ++i; print j;");

        assert_eq!(vec!["(int) 1"], printed_values(&output));
    }

    #[test]
    fn test_dereferencing_a_null_pointer_halts_the_run() {
        let (output, outcome) = run_source("int* p; print *p; int unreached = 1;");

        assert_eq!(RunOutcome::EvaluationError, outcome);
        assert_eq!(vec!["(void) "], printed_values(&output));
        assert!(output.contains("Error occurred in the line 2:\nprint *p;\n"));
        assert!(!output.contains("unreached"));
    }

    #[test]
    fn test_duplicate_declaration_is_an_error() {
        let (output, outcome) = run_source("int a; int a;");

        assert_eq!(RunOutcome::EvaluationError, outcome);
        assert!(output.contains("Error occurred in the line 2:\nint a;\n"));
    }

    #[test]
    fn test_unknown_variable_is_an_error() {
        let (_, outcome) = run_source("print missing;");

        assert_eq!(RunOutcome::EvaluationError, outcome);
    }

    #[test]
    fn test_pointer_arithmetic_scales_by_element_size() {
        let (output, _) = run_source(
            "int arr[] = {1, 2, 3}; int* p = arr; \
             print *(p + 2); \
             long long d = (long long)(p + 2) - (long long)p; print d;",
        );

        assert_eq!(vec!["(int) 3", "(longlong) 8"], printed_values(&output));
    }

    #[test]
    fn test_pointer_difference_is_a_byte_distance() {
        let (output, _) = run_source("int arr[] = {1, 2, 3}; int* p = arr; print p + 2 - p;");

        assert_eq!(vec!["(int*) 8"], printed_values(&output));
    }

    #[test]
    fn test_double_pointer_roundtrip() {
        let (output, _) =
            run_source("int x = 7; int* p = &x; int** q = &p; print **q; *p = 9; print x;");

        assert_eq!(vec!["(int) 7", "(int) 9"], printed_values(&output));
    }

    #[test]
    fn test_assignment_returns_the_stored_truncated_value() {
        let (output, _) = run_source("char c; int v = (c = 257); print v;");

        assert_eq!(vec!["(int) 1"], printed_values(&output));
    }

    #[test]
    fn test_pointer_increment_scales() {
        let (output, _) = run_source(
            "int arr[] = {5, 6, 7}; int* p = arr; p++; print *p; --p; print *p;",
        );

        assert_eq!(vec!["(int) 6", "(int) 5"], printed_values(&output));
    }

    #[test]
    fn test_casts_narrow_and_reinterpret() {
        let (output, _) = run_source("print (char) 321; print (unsigned int) -1;");

        assert_eq!(
            vec!["(char) A", "(uint) 4294967295"],
            printed_values(&output)
        );
    }

    #[test]
    fn test_integer_and_float_division() {
        let (output, _) = run_source("print 7 / 2; print 7.0 / 2; print 7 % 4;");

        assert_eq!(
            vec!["(longlong) 3", "(double) 3.500000", "(longlong) 3"],
            printed_values(&output)
        );
    }

    #[test]
    fn test_division_by_zero_is_an_error() {
        let (_, outcome) = run_source("print 1 / 0;");

        assert_eq!(RunOutcome::EvaluationError, outcome);
    }

    #[test]
    fn test_bitwise_and_shift_operators() {
        let (output, _) = run_source("print ~0; print 6 & 3; print 6 ^ 3; print 1 << 10;");

        assert_eq!(
            vec![
                "(longlong) -1",
                "(longlong) 2",
                "(longlong) 5",
                "(longlong) 1024"
            ],
            printed_values(&output)
        );
    }

    #[test]
    fn test_logical_operators_and_negation() {
        let (output, _) = run_source("print 2 && 3; print 0 || 0; print !5; print !!5;");

        assert_eq!(
            vec!["(int) 1", "(int) 0", "(int) 0", "(int) 1"],
            printed_values(&output)
        );
    }

    #[test]
    fn test_logical_operators_do_not_short_circuit() {
        // Both sides are evaluated, the right-hand one first, so the final
        // value of x comes from the left-hand store.
        let (output, _) = run_source("int x = 0; int y = (x = 5) || (x = 7); print x; print y;");

        assert_eq!(vec!["(int) 5", "(int) 1"], printed_values(&output));
    }

    #[test]
    fn test_unsigned_arithmetic_wraps() {
        let (output, _) =
            run_source("unsigned int a = 2147483648, b = 2; print a * b; unsigned int u = 4294967295; u += 1; print u;");

        assert_eq!(vec!["(uint) 0", "(uint) 0"], printed_values(&output));
    }

    #[test]
    fn test_common_type_follows_the_wider_operand() {
        let (output, _) = run_source("int i = 3; double d = 0.5; print i + d;");

        assert_eq!(vec!["(double) 3.500000"], printed_values(&output));
    }

    #[test]
    fn test_hex_literals() {
        let (output, _) = run_source("print 0x10 + 0xf;");

        assert_eq!(vec!["(longlong) 31"], printed_values(&output));
    }

    #[test]
    fn test_uninitialized_scalars_read_as_zero() {
        let (output, _) = run_source("int x; print x;");

        assert_eq!(vec!["(int) 0"], printed_values(&output));
    }

    #[test]
    fn test_print_without_store_is_not_echoed() {
        let (output, _) = run_source("int a = 1; print a;");

        assert!(output.lines().all(|line| line != "print a;"));
    }

    #[test]
    fn test_assigning_equal_value_is_not_echoed() {
        let (output, outcome) = run_source("int a = 1; a = 1;");

        assert_eq!(RunOutcome::Completed, outcome);
        assert!(output.lines().all(|line| line != "a = 1;"));
    }

    #[test]
    fn test_pointer_comparison() {
        let (output, _) = run_source(
            "int arr[] = {1, 2}; int* p = arr; int* q = arr; print p == q; print p < q + 1;",
        );

        assert_eq!(vec!["(int) 1", "(int) 1"], printed_values(&output));
    }

    #[test]
    fn test_address_of_and_subscript_lvalues() {
        let (output, _) = run_source(
            "int arr[] = {1, 2, 3}; int* p = &arr[1]; print *p; &arr[0]; arr[0] = 4; print arr[0];",
        );

        assert_eq!(vec!["(int) 2", "(int) 4"], printed_values(&output));
    }

    #[test]
    fn test_assigning_to_a_literal_is_an_error() {
        let (_, outcome) = run_source("1 = 2;");

        assert_eq!(RunOutcome::EvaluationError, outcome);
    }

    #[test]
    fn test_void_declaration_is_an_error() {
        let (_, outcome) = run_source("void x;");

        assert_eq!(RunOutcome::EvaluationError, outcome);
    }

    #[test]
    fn test_too_many_array_initializers_is_an_error() {
        let (_, outcome) = run_source("int a[2] = {1, 2, 3};");

        assert_eq!(RunOutcome::EvaluationError, outcome);
    }

    #[test]
    fn test_out_of_bounds_subscript_is_an_error() {
        let (_, outcome) = run_source("int arr[] = {1, 2, 3}; print arr[3];");

        assert_eq!(RunOutcome::EvaluationError, outcome);
    }

    #[test]
    fn test_mixed_pointer_value_comparison_is_an_error() {
        let (_, outcome) = run_source("int arr[2]; int* p = arr; print p == 1;");

        assert_eq!(RunOutcome::EvaluationError, outcome);
    }

    #[test]
    fn test_float_array_initializers_land_in_their_slots() {
        let (output, _) = run_source(
            "float f[] = {1.5, 2.5}; double d[] = {3.5}; print f[1]; print d[0];",
        );

        assert_eq!(
            vec!["(float) 2.500000", "(double) 3.500000"],
            printed_values(&output)
        );
    }

    #[test]
    fn test_array_of_pointers() {
        let (output, _) = run_source(
            "int x = 1, y = 2; int* ptrs[] = {&x, &y}; print *ptrs[1];",
        );

        assert_eq!(vec!["(int) 2"], printed_values(&output));
    }

    #[test]
    fn test_declared_size_array_defaults_to_zeroes() {
        let (output, _) = run_source("int a[3]; int* p = a; print p[0] + p[2];");

        assert_eq!(vec!["(int) 0"], printed_values(&output));
    }

    #[test]
    fn test_fixed_size_array_with_initializers() {
        let (output, _) = run_source("int a[4] = {9, 8}; print a[1];");

        assert_eq!(vec!["(int) 8"], printed_values(&output));
    }

    proptest! {
        #[test]
        fn double_logical_negation_matches_truthiness(value: i32) {
            let (output, _) = run_source(&format!("int x = {value}; print !!x;"));
            let expected = format!("(int) {}", i32::from(value != 0));
            prop_assert_eq!(vec![expected.as_str()], printed_values(&output));
        }

        #[test]
        fn double_bitwise_complement_is_identity(value: i32) {
            let (output, _) = run_source(&format!("int x = {value}; print ~(~x);"));
            let expected = format!("(int) {value}");
            prop_assert_eq!(vec![expected.as_str()], printed_values(&output));
        }

        #[test]
        fn compound_assignment_matches_the_expanded_form(a: i32, b in -1000i32..1000) {
            let (compound, _) = run_source(&format!("int x = {a}; x += {b}; print x;"));
            let (expanded, _) = run_source(&format!("int x = {a}; x = x + {b}; print x;"));
            prop_assert_eq!(printed_values(&compound), printed_values(&expanded));
        }
    }
}
