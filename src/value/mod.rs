//! Runtime values of the interpreted machine model.
//!
//! A [`Value`] pairs a [`Type`] with exactly one concrete payload. For
//! pointer types the payload is always an address-sized integer; for plain
//! values the payload variant matches the primitive tag. The value
//! `(void) 0` doubles as the sentinel for "evaluation produced no result".

mod primitive;

pub use primitive::*;

/// One concrete interpretation of a value's bits.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Payload {
    Void,
    Char(i8),
    UChar(u8),
    Short(i16),
    UShort(u16),
    Int(i32),
    UInt(u32),
    Long(i64),
    ULong(u64),
    LongLong(i64),
    ULongLong(u64),
    Float(f32),
    Double(f64),
    Address(usize),
}

/// Applies an operation pairwise to two payloads of the same kind:
/// `$int` names the wrapping method used for the integer kinds, `$float`
/// is the plain operator used for the floating point kinds.
macro_rules! arithmetic {
    ($left:expr, $right:expr, $int:ident, $float:tt) => {
        match ($left, $right) {
            (Payload::Char(a), Payload::Char(b)) => Some(Payload::Char(a.$int(*b))),
            (Payload::UChar(a), Payload::UChar(b)) => Some(Payload::UChar(a.$int(*b))),
            (Payload::Short(a), Payload::Short(b)) => Some(Payload::Short(a.$int(*b))),
            (Payload::UShort(a), Payload::UShort(b)) => Some(Payload::UShort(a.$int(*b))),
            (Payload::Int(a), Payload::Int(b)) => Some(Payload::Int(a.$int(*b))),
            (Payload::UInt(a), Payload::UInt(b)) => Some(Payload::UInt(a.$int(*b))),
            (Payload::Long(a), Payload::Long(b)) => Some(Payload::Long(a.$int(*b))),
            (Payload::ULong(a), Payload::ULong(b)) => Some(Payload::ULong(a.$int(*b))),
            (Payload::LongLong(a), Payload::LongLong(b)) => Some(Payload::LongLong(a.$int(*b))),
            (Payload::ULongLong(a), Payload::ULongLong(b)) => Some(Payload::ULongLong(a.$int(*b))),
            (Payload::Float(a), Payload::Float(b)) => Some(Payload::Float(a $float *b)),
            (Payload::Double(a), Payload::Double(b)) => Some(Payload::Double(a $float *b)),
            _ => None,
        }
    };
}

/// Applies a wrapping shift to the integer kinds; everything else has no
/// shift and yields `None`.
macro_rules! shift {
    ($payload:expr, $amount:expr, $method:ident) => {
        match $payload {
            Payload::Char(a) => Some(Payload::Char(a.$method($amount))),
            Payload::UChar(a) => Some(Payload::UChar(a.$method($amount))),
            Payload::Short(a) => Some(Payload::Short(a.$method($amount))),
            Payload::UShort(a) => Some(Payload::UShort(a.$method($amount))),
            Payload::Int(a) => Some(Payload::Int(a.$method($amount))),
            Payload::UInt(a) => Some(Payload::UInt(a.$method($amount))),
            Payload::Long(a) => Some(Payload::Long(a.$method($amount))),
            Payload::ULong(a) => Some(Payload::ULong(a.$method($amount))),
            Payload::LongLong(a) => Some(Payload::LongLong(a.$method($amount))),
            Payload::ULongLong(a) => Some(Payload::ULongLong(a.$method($amount))),
            _ => None,
        }
    };
}

impl Payload {
    /// The all-zero payload of a primitive kind.
    pub fn zero(primitive: PrimitiveType) -> Payload {
        match primitive {
            PrimitiveType::Void => Payload::Void,
            PrimitiveType::Char => Payload::Char(0),
            PrimitiveType::UChar => Payload::UChar(0),
            PrimitiveType::Short => Payload::Short(0),
            PrimitiveType::UShort => Payload::UShort(0),
            PrimitiveType::Int => Payload::Int(0),
            PrimitiveType::UInt => Payload::UInt(0),
            PrimitiveType::Long => Payload::Long(0),
            PrimitiveType::ULong => Payload::ULong(0),
            PrimitiveType::LongLong => Payload::LongLong(0),
            PrimitiveType::ULongLong => Payload::ULongLong(0),
            PrimitiveType::Float => Payload::Float(0.0),
            PrimitiveType::Double => Payload::Double(0.0),
        }
    }

    /// Reads the payload as a signed 64-bit integer, truncating like a C
    /// cast. `Void` carries nothing.
    pub fn as_i64(&self) -> Option<i64> {
        Some(match self {
            Payload::Void => return None,
            Payload::Char(v) => *v as i64,
            Payload::UChar(v) => *v as i64,
            Payload::Short(v) => *v as i64,
            Payload::UShort(v) => *v as i64,
            Payload::Int(v) => *v as i64,
            Payload::UInt(v) => *v as i64,
            Payload::Long(v) => *v,
            Payload::ULong(v) => *v as i64,
            Payload::LongLong(v) => *v,
            Payload::ULongLong(v) => *v as i64,
            Payload::Float(v) => *v as i64,
            Payload::Double(v) => *v as i64,
            Payload::Address(v) => *v as i64,
        })
    }

    /// Reads the payload as an unsigned 64-bit integer; signed sources are
    /// sign-extended first, as a C cast would.
    pub fn as_u64(&self) -> Option<u64> {
        Some(match self {
            Payload::Void => return None,
            Payload::Char(v) => *v as i64 as u64,
            Payload::UChar(v) => *v as u64,
            Payload::Short(v) => *v as i64 as u64,
            Payload::UShort(v) => *v as u64,
            Payload::Int(v) => *v as i64 as u64,
            Payload::UInt(v) => *v as u64,
            Payload::Long(v) => *v as u64,
            Payload::ULong(v) => *v,
            Payload::LongLong(v) => *v as u64,
            Payload::ULongLong(v) => *v,
            Payload::Float(v) => *v as u64,
            Payload::Double(v) => *v as u64,
            Payload::Address(v) => *v as u64,
        })
    }

    pub fn as_f64(&self) -> Option<f64> {
        Some(match self {
            Payload::Void => return None,
            Payload::Char(v) => *v as f64,
            Payload::UChar(v) => *v as f64,
            Payload::Short(v) => *v as f64,
            Payload::UShort(v) => *v as f64,
            Payload::Int(v) => *v as f64,
            Payload::UInt(v) => *v as f64,
            Payload::Long(v) => *v as f64,
            Payload::ULong(v) => *v as f64,
            Payload::LongLong(v) => *v as f64,
            Payload::ULongLong(v) => *v as f64,
            Payload::Float(v) => *v as f64,
            Payload::Double(v) => *v,
            Payload::Address(v) => *v as f64,
        })
    }

    pub fn as_address(&self) -> Option<usize> {
        self.as_u64().map(|v| v as usize)
    }

    /// Converts `source` into a payload of the requested primitive kind with
    /// C cast semantics. `Void` has no representation.
    pub fn convert(primitive: PrimitiveType, source: &Payload) -> Option<Payload> {
        Some(match primitive {
            PrimitiveType::Void => return None,
            PrimitiveType::Char => Payload::Char(source.as_i64()? as i8),
            PrimitiveType::UChar => Payload::UChar(source.as_u64()? as u8),
            PrimitiveType::Short => Payload::Short(source.as_i64()? as i16),
            PrimitiveType::UShort => Payload::UShort(source.as_u64()? as u16),
            PrimitiveType::Int => Payload::Int(source.as_i64()? as i32),
            PrimitiveType::UInt => Payload::UInt(source.as_u64()? as u32),
            PrimitiveType::Long => Payload::Long(source.as_i64()?),
            PrimitiveType::ULong => Payload::ULong(source.as_u64()?),
            PrimitiveType::LongLong => Payload::LongLong(source.as_i64()?),
            PrimitiveType::ULongLong => Payload::ULongLong(source.as_u64()?),
            PrimitiveType::Float => Payload::Float(source.as_f64()? as f32),
            PrimitiveType::Double => Payload::Double(source.as_f64()?),
        })
    }

    /// Wrapping addition of two payloads of the same kind.
    pub fn wrapping_add(&self, other: &Payload) -> Option<Payload> {
        arithmetic!(self, other, wrapping_add, +)
    }

    /// Wrapping subtraction of two payloads of the same kind.
    pub fn wrapping_sub(&self, other: &Payload) -> Option<Payload> {
        arithmetic!(self, other, wrapping_sub, -)
    }

    /// Wrapping multiplication of two payloads of the same kind.
    pub fn wrapping_mul(&self, other: &Payload) -> Option<Payload> {
        arithmetic!(self, other, wrapping_mul, *)
    }

    /// Division of two payloads of the same kind. The caller must rule out
    /// integer division by zero beforehand.
    pub fn divide(&self, other: &Payload) -> Option<Payload> {
        arithmetic!(self, other, wrapping_div, /)
    }

    /// Remainder of two payloads of the same kind. The caller must rule out
    /// floating point operands and division by zero beforehand.
    pub fn remainder(&self, other: &Payload) -> Option<Payload> {
        arithmetic!(self, other, wrapping_rem, %)
    }

    pub fn shift_left(&self, amount: u32) -> Option<Payload> {
        shift!(self, amount, wrapping_shl)
    }

    pub fn shift_right(&self, amount: u32) -> Option<Payload> {
        shift!(self, amount, wrapping_shr)
    }

    /// In-kind negation, wrapping for the integer kinds.
    pub fn negate(&self) -> Option<Payload> {
        Some(match self {
            Payload::Char(v) => Payload::Char(v.wrapping_neg()),
            Payload::UChar(v) => Payload::UChar(v.wrapping_neg()),
            Payload::Short(v) => Payload::Short(v.wrapping_neg()),
            Payload::UShort(v) => Payload::UShort(v.wrapping_neg()),
            Payload::Int(v) => Payload::Int(v.wrapping_neg()),
            Payload::UInt(v) => Payload::UInt(v.wrapping_neg()),
            Payload::Long(v) => Payload::Long(v.wrapping_neg()),
            Payload::ULong(v) => Payload::ULong(v.wrapping_neg()),
            Payload::LongLong(v) => Payload::LongLong(v.wrapping_neg()),
            Payload::ULongLong(v) => Payload::ULongLong(v.wrapping_neg()),
            Payload::Float(v) => Payload::Float(-v),
            Payload::Double(v) => Payload::Double(-v),
            Payload::Void | Payload::Address(_) => return None,
        })
    }

    /// Moves an integer payload by `delta` steps, wrapping in kind. Used by
    /// the increment and decrement operators.
    pub fn step(&self, delta: i64) -> Option<Payload> {
        let step = Payload::convert(self.kind()?, &Payload::LongLong(delta))?;
        self.wrapping_add(&step)
    }

    fn kind(&self) -> Option<PrimitiveType> {
        Some(match self {
            Payload::Void | Payload::Address(_) => return None,
            Payload::Char(_) => PrimitiveType::Char,
            Payload::UChar(_) => PrimitiveType::UChar,
            Payload::Short(_) => PrimitiveType::Short,
            Payload::UShort(_) => PrimitiveType::UShort,
            Payload::Int(_) => PrimitiveType::Int,
            Payload::UInt(_) => PrimitiveType::UInt,
            Payload::Long(_) => PrimitiveType::Long,
            Payload::ULong(_) => PrimitiveType::ULong,
            Payload::LongLong(_) => PrimitiveType::LongLong,
            Payload::ULongLong(_) => PrimitiveType::ULongLong,
            Payload::Float(_) => PrimitiveType::Float,
            Payload::Double(_) => PrimitiveType::Double,
        })
    }
}

/// A typed runtime value.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Value {
    pub ty: Type,
    pub payload: Payload,
}

impl Value {
    /// The "no value" sentinel returned by failed evaluations.
    pub fn void() -> Value {
        Value {
            ty: Type::VOID,
            payload: Payload::Void,
        }
    }

    pub fn int(value: i32) -> Value {
        Value {
            ty: Type::value(PrimitiveType::Int),
            payload: Payload::Int(value),
        }
    }

    pub fn long_long(value: i64) -> Value {
        Value {
            ty: Type::value(PrimitiveType::LongLong),
            payload: Payload::LongLong(value),
        }
    }

    pub fn double(value: f64) -> Value {
        Value {
            ty: Type::value(PrimitiveType::Double),
            payload: Payload::Double(value),
        }
    }

    pub fn pointer(ty: Type, address: usize) -> Value {
        debug_assert!(ty.is_pointer());
        Value {
            ty,
            payload: Payload::Address(address),
        }
    }

    /// The value of a freshly declared variable: all-zero payload of the
    /// declared type.
    pub fn zeroed(ty: Type) -> Value {
        if ty.is_pointer() {
            Value {
                ty,
                payload: Payload::Address(0),
            }
        } else {
            Value {
                ty,
                payload: Payload::zero(ty.primitive),
            }
        }
    }

    /// Whether this is the void sentinel, i.e. an evaluation most likely
    /// went wrong somewhere below.
    pub fn is_probably_error(&self) -> bool {
        self.ty == Type::VOID
    }

    /// Numeric truth of the value; `void`-based values have none.
    pub fn is_truthy(&self) -> Option<bool> {
        if self.ty.primitive == PrimitiveType::Void {
            return None;
        }
        match self.payload {
            Payload::Float(v) => Some(v != 0.0),
            Payload::Double(v) => Some(v != 0.0),
            Payload::Address(v) => Some(v != 0),
            payload => payload.as_u64().map(|v| v != 0),
        }
    }

    /// Converts this value to `target`.
    ///
    /// Pointer targets reinterpret the address bits (rejecting `void` and
    /// floating point sources); value targets convert the payload into the
    /// target representation. Failure yields the void sentinel.
    pub fn cast_to(&self, target: Type) -> Value {
        if target.is_pointer() {
            if self.ty.is_pointer() {
                return Value {
                    ty: target,
                    payload: self.payload,
                };
            }
            if self.ty.primitive == PrimitiveType::Void || self.ty.primitive.is_float() {
                return Value::void();
            }
            let Some(address) = self.payload.as_address() else {
                return Value::void();
            };
            return Value::pointer(target, address);
        }

        match Payload::convert(target.primitive, &self.payload) {
            Some(payload) => Value {
                ty: target,
                payload,
            },
            None => Value::void(),
        }
    }
}
