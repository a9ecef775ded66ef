//! Tree-walking expression evaluation against a [`Context`].
//!
//! Every entry point takes a `changes` flag that is raised whenever the
//! evaluation performs an observable store; the driver uses it to decide
//! whether a statement's source line is echoed. Failed evaluations report
//! through the context and yield the void sentinel, which silently poisons
//! the surrounding expression.

use crate::{
    parser::ast::{
        AssignmentExpression, AssignmentOperator, BinaryExpression, BinaryOperator, CastExpression,
        Expression, UnaryExpression, UnaryOperator, Variable,
    },
    value::{Payload, PrimitiveType, Type, Value, ADDRESS_SIZE},
};

use super::context::Context;

pub fn evaluate(ctx: &mut Context, changes: &mut bool, expression: &Expression) -> Value {
    match expression {
        Expression::Value(value) => *value,
        Expression::Variable(variable) => evaluate_variable(ctx, variable),
        Expression::Unary(unary) => evaluate_unary(ctx, changes, unary),
        Expression::Binary(binary) => evaluate_binary(ctx, changes, binary),
        Expression::Assignment(assignment) => evaluate_assignment(ctx, changes, assignment),
        Expression::Cast(cast) => evaluate_cast(ctx, changes, cast),
        Expression::Comma(comma) => {
            let mut result = Value::void();
            for expression in &comma.expressions {
                result = evaluate(ctx, changes, expression);
            }
            result
        }
    }
}

fn evaluate_variable(ctx: &mut Context, variable: &Variable) -> Value {
    let Some((ty, address)) = ctx
        .variable(&variable.name)
        .map(|variable| (variable.ty, variable.address))
    else {
        ctx.report(format!("Cannot find variable `{}`", variable.name));
        return Value::void();
    };

    if ty.is_pointer() {
        match ctx.memory.load_address(address) {
            Some(target) => Value::pointer(ty, target),
            None => {
                ctx.internal_error("variable cell vanished from the arena");
                Value::void()
            }
        }
    } else {
        match ctx.memory.load_primitive(ty.primitive, address) {
            Some(payload) => Value { ty, payload },
            None => {
                ctx.internal_error("variable cell vanished from the arena");
                Value::void()
            }
        }
    }
}

/// Compute the lvalue of an expression: a pointer-typed value whose address
/// is the storage of the expression. Defined for variables, dereferences
/// and subscripts; everything else is reported as not an lvalue.
pub fn lvalue_of(ctx: &mut Context, changes: &mut bool, expression: &Expression) -> Value {
    match expression {
        Expression::Variable(variable) => lvalue_of_variable(ctx, variable),
        Expression::Unary(unary) if unary.op == UnaryOperator::Dereference => {
            let value = evaluate(ctx, changes, &unary.inner);
            if !value.ty.is_pointer() {
                ctx.report("Cannot dereference non-pointer value");
                return Value::void();
            }
            value
        }
        Expression::Binary(binary) if binary.op == BinaryOperator::Subscript => {
            lvalue_of_subscript(ctx, changes, binary)
        }
        _ => {
            ctx.report("Expression is not an lvalue");
            Value::void()
        }
    }
}

fn lvalue_of_variable(ctx: &mut Context, variable: &Variable) -> Value {
    let Some((ty, address)) = ctx
        .variable(&variable.name)
        .map(|variable| (variable.ty, variable.address))
    else {
        ctx.report(format!("Cannot find variable `{}`", variable.name));
        return Value::void();
    };

    if ty == Type::VOID {
        ctx.report("Cannot get lvalue of void variable");
        return Value::void();
    }

    Value::pointer(ty.reference(), address)
}

/// The lvalue of `base[index]`: still a pointer to the element type, with
/// the index scaled by the element factor.
fn lvalue_of_subscript(ctx: &mut Context, changes: &mut bool, binary: &BinaryExpression) -> Value {
    let base = evaluate(ctx, changes, &binary.left);
    let index = evaluate(ctx, changes, &binary.right);

    if index.ty.is_pointer() {
        ctx.report("Cannot index with pointer");
        return Value::void();
    }
    if index.ty.primitive.is_float() {
        ctx.report("Cannot index with float value");
        return Value::void();
    }
    if !base.ty.is_pointer() {
        ctx.report("Cannot index non-pointer value");
        return Value::void();
    }

    let Some(offset) = index.payload.as_address() else {
        ctx.report("Cannot index with void");
        return Value::void();
    };
    let factor = base.ty.element_factor();
    if factor == 0 {
        ctx.report("Cannot get size of void type");
        return Value::void();
    }
    let Some(address) = base.payload.as_address() else {
        ctx.internal_error("pointer without address payload");
        return Value::void();
    };

    Value::pointer(base.ty, address.wrapping_add(offset.wrapping_mul(factor)))
}

fn evaluate_unary(ctx: &mut Context, changes: &mut bool, unary: &UnaryExpression) -> Value {
    match unary.op {
        UnaryOperator::Increment => evaluate_crement(ctx, changes, &unary.inner, 1, false),
        UnaryOperator::Decrement => evaluate_crement(ctx, changes, &unary.inner, -1, false),
        UnaryOperator::PostfixIncrement => evaluate_crement(ctx, changes, &unary.inner, 1, true),
        UnaryOperator::PostfixDecrement => evaluate_crement(ctx, changes, &unary.inner, -1, true),
        UnaryOperator::Plus => evaluate(ctx, changes, &unary.inner),
        UnaryOperator::Minus => evaluate_negation(ctx, changes, &unary.inner),
        UnaryOperator::LogicalNot => {
            let value = logical_value(ctx, changes, &unary.inner);
            match value.payload {
                Payload::Int(v) => Value::int(if v == 0 { 1 } else { 0 }),
                _ => {
                    ctx.report("Cannot do !void");
                    Value::void()
                }
            }
        }
        UnaryOperator::BitwiseNot => evaluate_bitwise_not(ctx, changes, &unary.inner),
        UnaryOperator::AddressOf => lvalue_of(ctx, changes, &unary.inner),
        UnaryOperator::Dereference => evaluate_dereference(ctx, changes, &unary.inner),
    }
}

/// Shared implementation of the four increment/decrement forms: resolve the
/// lvalue, move the cell by `delta` (scaled for pointer cells) and return
/// the pre- or post-value.
fn evaluate_crement(
    ctx: &mut Context,
    changes: &mut bool,
    inner: &Expression,
    delta: i64,
    postfix: bool,
) -> Value {
    let lvalue = lvalue_of(ctx, changes, inner);
    if lvalue.is_probably_error() {
        return Value::void();
    }

    let pointee = lvalue.ty.pointee();
    let Some(address) = lvalue.payload.as_address() else {
        ctx.internal_error("lvalue without address payload");
        return Value::void();
    };

    let cell_size = pointee.cell_size();
    if cell_size == 0 {
        ctx.report("Cannot get size of void type");
        return Value::void();
    }
    if !ctx.memory.can_access(address, cell_size) {
        ctx.report("Cannot access to address");
        return Value::void();
    }

    if pointee.is_pointer() {
        let factor = pointee.element_factor();
        if factor == 0 {
            ctx.report("Cannot get size of void type");
            return Value::void();
        }
        let Some(old) = ctx.memory.load_address(address) else {
            ctx.internal_error("unreadable pointer cell");
            return Value::void();
        };
        let new = old.wrapping_add_signed(delta.wrapping_mul(factor as i64) as isize);
        ctx.memory.store_address(address, new);
        *changes = true;
        return Value::pointer(pointee, if postfix { old } else { new });
    }

    if pointee.primitive.is_float() {
        ctx.report("Cannot increment or decrement float value");
        return Value::void();
    }

    let Some(old) = ctx.memory.load_primitive(pointee.primitive, address) else {
        ctx.internal_error("unreadable scalar cell");
        return Value::void();
    };
    let Some(new) = old.step(delta) else {
        ctx.internal_error("cell payload does not support stepping");
        return Value::void();
    };
    ctx.memory.store_primitive(address, &new);
    *changes = true;

    Value {
        ty: pointee,
        payload: if postfix { old } else { new },
    }
}

fn evaluate_negation(ctx: &mut Context, changes: &mut bool, inner: &Expression) -> Value {
    let value = evaluate(ctx, changes, inner);

    if value.ty.is_pointer() {
        ctx.report("Cannot calculate -pointer");
        return Value::void();
    }
    if value.ty.primitive == PrimitiveType::Void {
        ctx.report("Cannot calculate -void");
        return Value::void();
    }

    match value.payload.negate() {
        Some(payload) => Value {
            ty: value.ty,
            payload,
        },
        None => {
            ctx.internal_error("payload kind does not support negation");
            Value::void()
        }
    }
}

/// The `int`-typed 0/1 truth value of an expression, or the void sentinel
/// for `void`-based operands.
fn logical_value(ctx: &mut Context, changes: &mut bool, expression: &Expression) -> Value {
    let value = evaluate(ctx, changes, expression);
    match value.is_truthy() {
        Some(truth) => Value::int(truth as i32),
        None => Value::void(),
    }
}

fn evaluate_bitwise_not(ctx: &mut Context, changes: &mut bool, inner: &Expression) -> Value {
    let value = evaluate(ctx, changes, inner);

    if value.ty.is_pointer() {
        ctx.report("Cannot do ~pointer");
        return Value::void();
    }
    if value.ty.primitive == PrimitiveType::Void {
        ctx.report("Cannot do ~void");
        return Value::void();
    }
    if value.ty.primitive.is_float() {
        ctx.report("Cannot do ~float");
        return Value::void();
    }

    let Some(bits) = value.payload.as_u64() else {
        ctx.internal_error("integer payload without bits");
        return Value::void();
    };
    match Payload::convert(value.ty.primitive, &Payload::ULongLong(!bits)) {
        Some(payload) => Value {
            ty: value.ty,
            payload,
        },
        None => {
            ctx.internal_error("complement does not fit its own type");
            Value::void()
        }
    }
}

fn evaluate_dereference(ctx: &mut Context, changes: &mut bool, inner: &Expression) -> Value {
    let value = evaluate(ctx, changes, inner);

    if !value.ty.is_pointer() {
        ctx.report("Cannot do *(non-pointer value)");
        return Value::void();
    }
    let Some(address) = value.payload.as_address() else {
        ctx.internal_error("pointer without address payload");
        return Value::void();
    };

    load_pointee(ctx, value.ty, address)
}

/// Bounds-checked load of the cell a pointer of type `pointer` refers to.
fn load_pointee(ctx: &mut Context, pointer: Type, address: usize) -> Value {
    if pointer.indirection > 1 {
        if !ctx.memory.can_access(address, ADDRESS_SIZE) {
            ctx.report("Cannot access to address");
            return Value::void();
        }
        match ctx.memory.load_address(address) {
            Some(target) => Value::pointer(pointer.pointee(), target),
            None => {
                ctx.internal_error("checked pointer cell is unreadable");
                Value::void()
            }
        }
    } else {
        let size = pointer.primitive.size();
        if size == 0 {
            ctx.report("Cannot get size of void type");
            return Value::void();
        }
        if !ctx.memory.can_access(address, size) {
            ctx.report("Cannot access to address");
            return Value::void();
        }
        match ctx.memory.load_primitive(pointer.primitive, address) {
            Some(payload) => Value {
                ty: Type::value(pointer.primitive),
                payload,
            },
            None => {
                ctx.internal_error("checked scalar cell is unreadable");
                Value::void()
            }
        }
    }
}

fn evaluate_binary(ctx: &mut Context, changes: &mut bool, binary: &BinaryExpression) -> Value {
    match binary.op {
        BinaryOperator::Add => evaluate_add(ctx, changes, binary),
        BinaryOperator::Subtract => evaluate_sub(ctx, changes, binary),
        BinaryOperator::Multiply | BinaryOperator::Divide | BinaryOperator::Modulo => {
            evaluate_multiplicative(ctx, changes, binary)
        }
        BinaryOperator::Equal
        | BinaryOperator::NotEqual
        | BinaryOperator::GreaterThan
        | BinaryOperator::LessThan
        | BinaryOperator::GreaterOrEqual
        | BinaryOperator::LessOrEqual => evaluate_comparison(ctx, changes, binary),
        BinaryOperator::LogicalAnd | BinaryOperator::LogicalOr => {
            evaluate_logical(ctx, changes, binary)
        }
        BinaryOperator::BitwiseAnd | BinaryOperator::BitwiseOr | BinaryOperator::BitwiseXor => {
            evaluate_bitwise(ctx, changes, binary)
        }
        BinaryOperator::ShiftLeft | BinaryOperator::ShiftRight => {
            evaluate_shift(ctx, changes, binary)
        }
        BinaryOperator::Subscript => evaluate_subscript(ctx, changes, binary),
    }
}

/// Evaluate both operands of a binary operator, right-hand side first.
fn operands(ctx: &mut Context, changes: &mut bool, binary: &BinaryExpression) -> (Value, Value) {
    let right = evaluate(ctx, changes, &binary.right);
    let left = evaluate(ctx, changes, &binary.left);
    (left, right)
}

fn evaluate_add(ctx: &mut Context, changes: &mut bool, binary: &BinaryExpression) -> Value {
    let (left, right) = operands(ctx, changes, binary);

    if left.ty.is_pointer() {
        if right.ty.is_pointer() {
            ctx.report("Cannot add pointer to pointer");
            return Value::void();
        }
        return pointer_offset(ctx, &left, &right, 1);
    }
    if right.ty.is_pointer() {
        return pointer_offset(ctx, &right, &left, 1);
    }

    arithmetic(ctx, &left, &right, BinaryOperator::Add)
}

fn evaluate_sub(ctx: &mut Context, changes: &mut bool, binary: &BinaryExpression) -> Value {
    let (left, right) = operands(ctx, changes, binary);

    if left.ty.is_pointer() {
        if right.ty.is_pointer() {
            if left.ty != right.ty {
                ctx.report("Cannot subtract pointers of different types");
                return Value::void();
            }
            let (Some(a), Some(b)) = (left.payload.as_address(), right.payload.as_address())
            else {
                ctx.internal_error("pointer without address payload");
                return Value::void();
            };
            // the difference keeps the pointer type and holds the raw
            // byte distance, not an element count
            return Value::pointer(left.ty, a.wrapping_sub(b));
        }
        return pointer_offset(ctx, &left, &right, -1);
    }
    if right.ty.is_pointer() {
        ctx.report("Cannot evaluate `value - pointer`");
        return Value::void();
    }

    arithmetic(ctx, &left, &right, BinaryOperator::Subtract)
}

/// `pointer +/- n`: scale the integer operand by the element factor of the
/// pointer type and move the address.
fn pointer_offset(ctx: &mut Context, pointer: &Value, offset: &Value, sign: i64) -> Value {
    if offset.ty.primitive == PrimitiveType::Void {
        // a failed subexpression; the error is already flagged
        return Value::void();
    }
    if offset.ty.primitive.is_float() {
        ctx.report("Cannot offset pointer by float value");
        return Value::void();
    }

    let factor = pointer.ty.element_factor();
    if factor == 0 {
        ctx.report("Cannot get size of void type");
        return Value::void();
    }
    let (Some(address), Some(steps)) = (pointer.payload.as_address(), offset.payload.as_address())
    else {
        ctx.internal_error("pointer without address payload");
        return Value::void();
    };

    let delta = steps.wrapping_mul(factor);
    let moved = if sign >= 0 {
        address.wrapping_add(delta)
    } else {
        address.wrapping_sub(delta)
    };

    Value::pointer(pointer.ty, moved)
}

fn evaluate_multiplicative(
    ctx: &mut Context,
    changes: &mut bool,
    binary: &BinaryExpression,
) -> Value {
    let (left, right) = operands(ctx, changes, binary);

    if left.ty.is_pointer() || right.ty.is_pointer() {
        ctx.report(match binary.op {
            BinaryOperator::Multiply => "Cannot do multiplication with pointer",
            BinaryOperator::Divide => "Cannot do division with pointer",
            _ => "Cannot evaluate modulo with pointer",
        });
        return Value::void();
    }
    if binary.op == BinaryOperator::Modulo
        && (left.ty.primitive.is_float() || right.ty.primitive.is_float())
    {
        ctx.report("Cannot evaluate modulo with float");
        return Value::void();
    }

    arithmetic(ctx, &left, &right, binary.op)
}

/// Plain scalar arithmetic: convert both operands to their common type and
/// apply the operator in that type, wrapping on integer overflow.
fn arithmetic(ctx: &mut Context, left: &Value, right: &Value, op: BinaryOperator) -> Value {
    let Some((common, l, r)) = common_payloads(ctx, left, right) else {
        return Value::void();
    };

    if matches!(op, BinaryOperator::Divide | BinaryOperator::Modulo)
        && !common.is_float()
        && r.as_u64() == Some(0)
    {
        ctx.report("Division by zero");
        return Value::void();
    }

    let result = match op {
        BinaryOperator::Add => l.wrapping_add(&r),
        BinaryOperator::Subtract => l.wrapping_sub(&r),
        BinaryOperator::Multiply => l.wrapping_mul(&r),
        BinaryOperator::Divide => l.divide(&r),
        BinaryOperator::Modulo => l.remainder(&r),
        _ => None,
    };

    match result {
        Some(payload) => Value {
            ty: Type::value(common),
            payload,
        },
        None => {
            ctx.internal_error("arithmetic on mismatched payloads");
            Value::void()
        }
    }
}

/// Convert both scalar operands to their common type. Reports when both
/// sides are void; silently propagates the sentinel when a failed
/// subexpression poisons one side.
fn common_payloads(
    ctx: &mut Context,
    left: &Value,
    right: &Value,
) -> Option<(PrimitiveType, Payload, Payload)> {
    let common = left.ty.primitive.common_type(right.ty.primitive);
    if common == PrimitiveType::Void {
        ctx.report("Cannot do arithmetic operation with void");
        return None;
    }

    let common_ty = Type::value(common);
    let l = left.cast_to(common_ty);
    let r = right.cast_to(common_ty);
    if l.is_probably_error() || r.is_probably_error() {
        return None;
    }

    Some((common, l.payload, r.payload))
}

fn ordered<T: PartialOrd>(op: BinaryOperator, a: T, b: T) -> bool {
    match op {
        BinaryOperator::Equal => a == b,
        BinaryOperator::NotEqual => a != b,
        BinaryOperator::GreaterThan => a > b,
        BinaryOperator::LessThan => a < b,
        BinaryOperator::GreaterOrEqual => a >= b,
        BinaryOperator::LessOrEqual => a <= b,
        _ => false,
    }
}

fn compare_payloads(op: BinaryOperator, left: &Payload, right: &Payload) -> Option<bool> {
    Some(match (left, right) {
        (Payload::Char(a), Payload::Char(b)) => ordered(op, a, b),
        (Payload::UChar(a), Payload::UChar(b)) => ordered(op, a, b),
        (Payload::Short(a), Payload::Short(b)) => ordered(op, a, b),
        (Payload::UShort(a), Payload::UShort(b)) => ordered(op, a, b),
        (Payload::Int(a), Payload::Int(b)) => ordered(op, a, b),
        (Payload::UInt(a), Payload::UInt(b)) => ordered(op, a, b),
        (Payload::Long(a), Payload::Long(b)) => ordered(op, a, b),
        (Payload::ULong(a), Payload::ULong(b)) => ordered(op, a, b),
        (Payload::LongLong(a), Payload::LongLong(b)) => ordered(op, a, b),
        (Payload::ULongLong(a), Payload::ULongLong(b)) => ordered(op, a, b),
        (Payload::Float(a), Payload::Float(b)) => ordered(op, a, b),
        (Payload::Double(a), Payload::Double(b)) => ordered(op, a, b),
        _ => return None,
    })
}

fn evaluate_comparison(ctx: &mut Context, changes: &mut bool, binary: &BinaryExpression) -> Value {
    let (left, right) = operands(ctx, changes, binary);

    if left.ty.is_pointer() && right.ty.is_pointer() {
        if left.ty != right.ty {
            ctx.report("Cannot compare different pointers");
            return Value::void();
        }
        let (Some(a), Some(b)) = (left.payload.as_address(), right.payload.as_address()) else {
            ctx.internal_error("pointer without address payload");
            return Value::void();
        };
        return Value::int(ordered(binary.op, a, b) as i32);
    }
    if left.ty.is_pointer() != right.ty.is_pointer() {
        ctx.report("Cannot compare pointer and value");
        return Value::void();
    }

    let Some((_, l, r)) = common_payloads(ctx, &left, &right) else {
        return Value::void();
    };
    match compare_payloads(binary.op, &l, &r) {
        Some(truth) => Value::int(truth as i32),
        None => {
            ctx.internal_error("comparison on mismatched payloads");
            Value::void()
        }
    }
}

/// `&&` and `||`. Neither short-circuits: both sides are always evaluated,
/// the right-hand one first.
fn evaluate_logical(ctx: &mut Context, changes: &mut bool, binary: &BinaryExpression) -> Value {
    let name = if binary.op == BinaryOperator::LogicalAnd {
        "&&"
    } else {
        "||"
    };

    let right = logical_value(ctx, changes, &binary.right);
    if right.is_probably_error() {
        ctx.report(format!("Cannot do {name} with void"));
        return Value::void();
    }
    let left = logical_value(ctx, changes, &binary.left);
    if left.is_probably_error() {
        ctx.report(format!("Cannot do {name} with void"));
        return Value::void();
    }

    let (Payload::Int(l), Payload::Int(r)) = (left.payload, right.payload) else {
        ctx.internal_error("logical value is not an int");
        return Value::void();
    };
    let truth = if binary.op == BinaryOperator::LogicalAnd {
        l != 0 && r != 0
    } else {
        l != 0 || r != 0
    };

    Value::int(truth as i32)
}

/// `&`, `|`, `^`: operate on the 64-bit payloads and tag the result with
/// the common type.
fn evaluate_bitwise(ctx: &mut Context, changes: &mut bool, binary: &BinaryExpression) -> Value {
    let (left, right) = operands(ctx, changes, binary);

    if left.ty.is_pointer() || right.ty.is_pointer() {
        ctx.report("Cannot do bitwise operation with pointer");
        return Value::void();
    }
    if left.ty.primitive.is_float() || right.ty.primitive.is_float() {
        ctx.report("Cannot do bitwise operation with float");
        return Value::void();
    }

    let Some((common, l, r)) = common_payloads(ctx, &left, &right) else {
        return Value::void();
    };
    let (Some(a), Some(b)) = (l.as_u64(), r.as_u64()) else {
        ctx.internal_error("integer payload without bits");
        return Value::void();
    };

    let bits = match binary.op {
        BinaryOperator::BitwiseAnd => a & b,
        BinaryOperator::BitwiseOr => a | b,
        _ => a ^ b,
    };
    match Payload::convert(common, &Payload::ULongLong(bits)) {
        Some(payload) => Value {
            ty: Type::value(common),
            payload,
        },
        None => {
            ctx.internal_error("bitwise result does not fit the common type");
            Value::void()
        }
    }
}

/// `<<` and `>>`: convert to the common type and shift in that type; the
/// shift amount is taken modulo the bit width.
fn evaluate_shift(ctx: &mut Context, changes: &mut bool, binary: &BinaryExpression) -> Value {
    let (left, right) = operands(ctx, changes, binary);

    if left.ty.is_pointer() || right.ty.is_pointer() {
        ctx.report("Cannot shift pointer");
        return Value::void();
    }
    if left.ty.primitive.is_float() || right.ty.primitive.is_float() {
        ctx.report("Cannot shift float value");
        return Value::void();
    }

    let Some((_, l, r)) = common_payloads(ctx, &left, &right) else {
        return Value::void();
    };
    let Some(amount) = r.as_u64() else {
        ctx.internal_error("integer payload without bits");
        return Value::void();
    };

    let result = if binary.op == BinaryOperator::ShiftLeft {
        l.shift_left(amount as u32)
    } else {
        l.shift_right(amount as u32)
    };
    match result {
        Some(payload) => Value {
            ty: Type::value(left.ty.primitive.common_type(right.ty.primitive)),
            payload,
        },
        None => {
            ctx.internal_error("shift on a non-integer payload");
            Value::void()
        }
    }
}

/// `base[index]` as an rvalue: a scaled, bounds-checked load.
fn evaluate_subscript(ctx: &mut Context, changes: &mut bool, binary: &BinaryExpression) -> Value {
    let base = evaluate(ctx, changes, &binary.left);
    if !base.ty.is_pointer() {
        ctx.report("Cannot index non-pointer type");
        return Value::void();
    }

    let index = evaluate(ctx, changes, &binary.right);
    if index.ty.is_pointer() {
        ctx.report("Cannot index with pointer");
        return Value::void();
    }
    if index.ty.primitive == PrimitiveType::Void {
        ctx.report("Cannot index with void");
        return Value::void();
    }
    if index.ty.primitive.is_float() {
        ctx.report("Cannot index with float");
        return Value::void();
    }

    let (Some(address), Some(offset)) = (base.payload.as_address(), index.payload.as_address())
    else {
        ctx.internal_error("pointer without address payload");
        return Value::void();
    };
    let factor = base.ty.element_factor();

    load_pointee(ctx, base.ty, address.wrapping_add(offset.wrapping_mul(factor)))
}

fn evaluate_cast(ctx: &mut Context, changes: &mut bool, cast: &CastExpression) -> Value {
    let value = evaluate(ctx, changes, &cast.inner);
    let converted = value.cast_to(cast.target);
    if converted.is_probably_error() {
        ctx.report("Cannot cast types");
    }
    converted
}

fn evaluate_assignment(
    ctx: &mut Context,
    changes: &mut bool,
    assignment: &AssignmentExpression,
) -> Value {
    match assignment.op.binary_operator() {
        None => evaluate_plain_assignment(ctx, changes, assignment),
        Some(op) => evaluate_compound_assignment(ctx, changes, op, assignment),
    }
}

/// `target = value`: evaluate the right-hand side, resolve the target
/// lvalue, convert the value to the target's pointee type and store it.
/// Returns the stored (possibly truncated) value.
fn evaluate_plain_assignment(
    ctx: &mut Context,
    changes: &mut bool,
    assignment: &AssignmentExpression,
) -> Value {
    let value = evaluate(ctx, changes, &assignment.value);
    if value.is_probably_error() {
        return value;
    }

    let target = lvalue_of(ctx, changes, &assignment.target);
    if target.is_probably_error() {
        return target;
    }

    store_through(ctx, changes, &target, &value)
}

/// Store `value` through the pointer-typed lvalue `target`. The store is
/// bounds-checked and raises `changes` when the cell contents actually
/// differ afterwards.
fn store_through(ctx: &mut Context, changes: &mut bool, target: &Value, value: &Value) -> Value {
    let pointee = target.ty.pointee();
    let converted = value.cast_to(pointee);
    if converted.is_probably_error() {
        ctx.report("Cannot cast assigned value");
        return Value::void();
    }

    let Some(address) = target.payload.as_address() else {
        ctx.internal_error("lvalue without address payload");
        return Value::void();
    };

    let cell_size = pointee.cell_size();
    if cell_size == 0 {
        ctx.report("Cannot get size of void type");
        return Value::void();
    }
    if !ctx.memory.can_access(address, cell_size) {
        ctx.report("Cannot access to address");
        return Value::void();
    }

    let stored = if pointee.is_pointer() {
        match converted.payload {
            Payload::Address(a) => ctx.memory.store_address(address, a),
            _ => None,
        }
    } else {
        ctx.memory.store_primitive(address, &converted.payload)
    };

    match stored {
        Some(changed) => {
            if changed {
                *changes = true;
            }
            converted
        }
        None => {
            ctx.internal_error("store into a checked cell failed");
            Value::void()
        }
    }
}

/// `target op= value` desugars to `target = (*lvalue(target)) op value`;
/// the target lvalue is computed exactly once.
fn evaluate_compound_assignment(
    ctx: &mut Context,
    changes: &mut bool,
    op: BinaryOperator,
    assignment: &AssignmentExpression,
) -> Value {
    let target = lvalue_of(ctx, changes, &assignment.target);
    if target.is_probably_error() {
        return Value::void();
    }

    let current = Expression::Unary(UnaryExpression::new(
        UnaryOperator::Dereference,
        Expression::Value(target),
    ));
    let desugared = AssignmentExpression::new(
        AssignmentOperator::Assign,
        current.clone(),
        Expression::Binary(BinaryExpression::new(
            op,
            current,
            assignment.value.as_ref().clone(),
        )),
    );

    evaluate_plain_assignment(ctx, changes, &desugared)
}
