use std::fmt::Display;

use log::error;

use crate::value::{Type, Value};

use super::memory::{AllocError, Memory};

/// A declared variable. Its payload cell lives in the context's memory
/// arena, so the address stays stable for the whole run and doubles as the
/// variable's lvalue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub ty: Type,
    pub address: usize,
}

/// The execution context: variable bindings, the memory arena with its
/// registered regions, and the per-statement evaluation error flag.
#[derive(Debug, Default)]
pub struct Context {
    pub memory: Memory,
    variables: Vec<Variable>,
    evaluation_error: bool,
}

impl Context {
    pub fn new() -> Context {
        Context::default()
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|variable| variable.name == name)
    }

    /// Register a new variable initialized to `value`. Returns `Ok(false)`
    /// when the name is already taken; nothing is allocated in that case.
    pub fn declare(&mut self, name: &str, value: &Value) -> Result<bool, AllocError> {
        if self.variable(name).is_some() {
            return Ok(false);
        }

        let address = self.memory.alloc(value.ty.cell_size())?;
        if self.memory.store_primitive(address, &value.payload).is_none() {
            self.internal_error("freshly allocated cell rejected its value");
        }
        self.variables.push(Variable {
            name: name.to_string(),
            ty: value.ty,
            address,
        });

        Ok(true)
    }

    pub fn clear_evaluation_error(&mut self) {
        self.evaluation_error = false;
    }

    pub fn has_evaluation_error(&self) -> bool {
        self.evaluation_error
    }

    /// Report a dynamic violation: raises the sticky per-statement flag and
    /// emits the diagnostic on stderr.
    pub fn report(&mut self, message: impl Display) {
        self.evaluation_error = true;
        error!("Evaluation error: {message}");
    }

    /// Diagnostic for branches that should be unreachable. Behaves like an
    /// evaluation error so the driver still halts.
    pub fn internal_error(&mut self, message: impl Display) {
        self.evaluation_error = true;
        error!("{message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Payload, PrimitiveType};

    #[test]
    fn test_declare_and_look_up() {
        let mut ctx = Context::new();

        assert!(ctx.declare("answer", &Value::int(42)).unwrap());

        let variable = ctx.variable("answer").expect("variable should exist");
        assert_eq!(Type::value(PrimitiveType::Int), variable.ty);
        assert_eq!(
            Some(Payload::Int(42)),
            ctx.memory.load_primitive(PrimitiveType::Int, variable.address)
        );
    }

    #[test]
    fn test_duplicate_declaration_is_rejected() {
        let mut ctx = Context::new();

        assert!(ctx.declare("x", &Value::int(1)).unwrap());
        assert!(!ctx.declare("x", &Value::int(2)).unwrap());
    }

    #[test]
    fn test_report_raises_sticky_flag() {
        let mut ctx = Context::new();

        assert!(!ctx.has_evaluation_error());
        ctx.report("something went wrong");
        assert!(ctx.has_evaluation_error());
        ctx.clear_evaluation_error();
        assert!(!ctx.has_evaluation_error());
    }
}
