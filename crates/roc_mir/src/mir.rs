//! MIR value types.
//!
//! Every value in a function body is one entry in a flat, linear
//! instruction list (`MIRBlock::instructions`); operands reference earlier
//! entries by [`MIRValueId`] rather than by nested ownership, so a block is
//! a straight-line sequence even though the values it computes form a DAG.
//! This mirrors a linear-IR design rather than a tree of owned nodes —
//! closer to how the backend consumes it.
//!
//! One MIR variant exists per (operator, operand-type) pair. This reads as
//! more boilerplate than a single generic `BinOp { op, ty, lhs, rhs }` node
//! would, but it means a lowering or transformation pass can match
//! exhaustively on exactly the operations that exist for a given type
//! without an extra runtime type tag to check.

use roc_base::Symbol;
use roc_sema::LocalId;
use roc_types::TypeDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MIRValueId(pub u32);

/// What lowering knew about a call's resolved target, carried on the call
/// node itself so the conversion-insertion pass (`crate::passes::conversions`)
/// can compare argument types against declared parameter types without
/// re-deriving call resolution from the signature table.
#[derive(Debug, Clone)]
pub struct CallSignature {
    /// The inferred type of each argument expression, in argument order —
    /// what sema recorded before any wrap/cast conversion is inserted.
    pub arg_types: Vec<TypeDescriptor>,
    /// The target's declared parameter types, in order.
    pub param_types: Vec<TypeDescriptor>,
    pub return_type: TypeDescriptor,
    /// `true` for a variadic target (today only `ccall`'s non-literal
    /// arguments): conversion insertion leaves these arguments as-is.
    pub var_args: bool,
}

/// Where an allocation (today: only array construction) lives. Set by the
/// heap-promotion pass, never by lowering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationSpace {
    StackAllocation,
    HeapAllocation,
}

#[derive(Debug, Clone)]
pub enum MIRValue {
    ConstantInt32(i32),
    ConstantInt64(i64),
    ConstantFloat64(f64),
    True,
    False,
    RawString(Symbol),

    LocalVariableAccess(LocalId),
    LocalVariableSet(LocalId, MIRValueId),

    FunctionCall {
        name: Symbol,
        args: Vec<MIRValueId>,
        signature: CallSignature,
    },
    FunctionInstanceCall {
        receiver: MIRValueId,
        receiver_type: TypeDescriptor,
        name: Symbol,
        args: Vec<MIRValueId>,
        signature: CallSignature,
    },
    CCall {
        name_arg: MIRValueId,
        args: Vec<MIRValueId>,
        return_type: TypeDescriptor,
    },

    Int32Add(MIRValueId, MIRValueId),
    Int32Sub(MIRValueId, MIRValueId),
    Int32Mul(MIRValueId, MIRValueId),
    Int32Div(MIRValueId, MIRValueId),
    Int32Mod(MIRValueId, MIRValueId),
    Int32Eq(MIRValueId, MIRValueId),
    Int32NotEq(MIRValueId, MIRValueId),
    Int32Gt(MIRValueId, MIRValueId),
    Int32Lt(MIRValueId, MIRValueId),
    Int32Le(MIRValueId, MIRValueId),
    Int32Ge(MIRValueId, MIRValueId),
    Int32Pow(MIRValueId, MIRValueId),

    Int64Add(MIRValueId, MIRValueId),
    Int64Sub(MIRValueId, MIRValueId),
    Int64Mul(MIRValueId, MIRValueId),
    Int64Div(MIRValueId, MIRValueId),
    Int64Mod(MIRValueId, MIRValueId),
    Int64Pow(MIRValueId, MIRValueId),
    Int64Eq(MIRValueId, MIRValueId),
    Int64NotEq(MIRValueId, MIRValueId),
    Int64Gt(MIRValueId, MIRValueId),
    Int64Lt(MIRValueId, MIRValueId),
    Int64Le(MIRValueId, MIRValueId),
    Int64Ge(MIRValueId, MIRValueId),

    Float64Add(MIRValueId, MIRValueId),
    Float64Sub(MIRValueId, MIRValueId),
    Float64Mul(MIRValueId, MIRValueId),
    Float64Div(MIRValueId, MIRValueId),
    Float64Pow(MIRValueId, MIRValueId),
    Float64Eq(MIRValueId, MIRValueId),
    Float64NotEq(MIRValueId, MIRValueId),
    Float64Gt(MIRValueId, MIRValueId),
    Float64Lt(MIRValueId, MIRValueId),
    Float64Le(MIRValueId, MIRValueId),
    Float64Ge(MIRValueId, MIRValueId),

    And(MIRValueId, MIRValueId),
    Or(MIRValueId, MIRValueId),
    Not(MIRValueId),
    Neg(MIRValueId),

    /// Boxes a primitive so it can be passed or stored where a
    /// non-primitive (usually `Any`) is expected.
    ToWrapper(MIRValueId),
    /// Produces a raw pointer view of a value for the ABI boundary.
    ToPtr(MIRValueId),
    /// Reinterprets a value as a different, size-compatible type.
    CastTo(MIRValueId, TypeDescriptor),
    /// Unwraps a boxed `String` back to its `RawString` bytes.
    StringToRaw(MIRValueId),
    /// `lhs + rhs` where both operands are strings: yields the left
    /// operand's own string type.
    StringConcat(MIRValueId, MIRValueId),

    ArrayLit {
        elements: Vec<MIRValueId>,
        element_type: TypeDescriptor,
        space: AllocationSpace,
    },
    ArraySet {
        array: MIRValueId,
        index: MIRValueId,
        value: MIRValueId,
    },
    ArrayGet {
        array: MIRValueId,
        index: MIRValueId,
    },
    ArrayLen(MIRValueId),

    /// Branches to `then_label` if `cond` holds, `else_label` otherwise.
    /// Label numbers are assigned by the label-resolution pass; lowering
    /// emits placeholder `0`s.
    If {
        cond: MIRValueId,
        then_label: u32,
        else_label: u32,
    },
    /// Unconditional branch to a join block. The "join block targeted by an
    /// unconditional branch" referred to elsewhere as `jumpOver`.
    JumpOver {
        target_label: u32,
    },
    Label(u32),

    ReturnValue(MIRValueId),
    ReturnVoid,
}

#[derive(Debug, Clone)]
pub struct MIRBlock {
    pub label: u32,
    pub instructions: Vec<(MIRValueId, MIRValue)>,
}

impl MIRBlock {
    pub fn value(&self, id: MIRValueId) -> Option<&MIRValue> {
        self.instructions
            .iter()
            .find(|(vid, _)| *vid == id)
            .map(|(_, v)| v)
    }
}

#[derive(Debug, Clone)]
pub struct MIRFunction {
    pub name: Symbol,
    pub param_types: Vec<TypeDescriptor>,
    pub return_type: TypeDescriptor,
    pub local_count: usize,
    pub blocks: Vec<MIRBlock>,
}

#[derive(Debug, Clone, Default)]
pub struct MIRModule {
    pub functions: Vec<MIRFunction>,
}
