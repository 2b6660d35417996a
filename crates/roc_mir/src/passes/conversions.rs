//! Implicit-conversion insertion (§4.6.a).
//!
//! Walks every call site's argument list and compares each argument's
//! inferred type (recorded on the call node's [`crate::mir::CallSignature`]
//! at lowering time) against the target's declared parameter type:
//! a primitive passed into a non-primitive slot gets boxed with
//! [`MIRValue::ToWrapper`]; any other mismatch gets [`MIRValue::CastTo`].
//! Equal types get no conversion at all. Instance calls additionally wrap a
//! primitive receiver, since every method dispatches through a boxed
//! object's vtable. Variadic targets (`ccall`'s trailing arguments) are
//! left untouched: variadic slots receive arguments as-is.

use crate::mir::{CallSignature, MIRBlock, MIRModule, MIRValue, MIRValueId};

pub fn insert_conversions(module: &mut MIRModule) {
    for func in &mut module.functions {
        for block in &mut func.blocks {
            insert_conversions_in_block(block);
        }
    }
}

fn insert_conversions_in_block(block: &mut MIRBlock) {
    let mut next_id = block
        .instructions
        .iter()
        .map(|(id, _)| id.0)
        .max()
        .map(|m| m + 1)
        .unwrap_or(0);
    let mut output = Vec::with_capacity(block.instructions.len());

    for (id, value) in std::mem::take(&mut block.instructions) {
        match value {
            MIRValue::FunctionCall {
                name,
                args,
                signature,
            } => {
                let args = convert_args(&mut output, &mut next_id, args, &signature);
                output.push((
                    id,
                    MIRValue::FunctionCall {
                        name,
                        args,
                        signature,
                    },
                ));
            }
            MIRValue::FunctionInstanceCall {
                receiver,
                receiver_type,
                name,
                args,
                signature,
            } => {
                let receiver = if receiver_type.is_primitive() {
                    push_conversion(&mut output, &mut next_id, MIRValue::ToWrapper(receiver))
                } else {
                    receiver
                };
                let args = convert_args(&mut output, &mut next_id, args, &signature);
                output.push((
                    id,
                    MIRValue::FunctionInstanceCall {
                        receiver,
                        receiver_type,
                        name,
                        args,
                        signature,
                    },
                ));
            }
            other => output.push((id, other)),
        }
    }

    block.instructions = output;
}

fn push_conversion(
    output: &mut Vec<(MIRValueId, MIRValue)>,
    next_id: &mut u32,
    value: MIRValue,
) -> MIRValueId {
    let id = MIRValueId(*next_id);
    *next_id += 1;
    output.push((id, value));
    id
}

fn convert_args(
    output: &mut Vec<(MIRValueId, MIRValue)>,
    next_id: &mut u32,
    args: Vec<MIRValueId>,
    signature: &CallSignature,
) -> Vec<MIRValueId> {
    if signature.var_args {
        return args;
    }
    args.into_iter()
        .enumerate()
        .map(|(i, arg_id)| {
            let (Some(arg_ty), Some(param_ty)) =
                (signature.arg_types.get(i), signature.param_types.get(i))
            else {
                return arg_id;
            };
            if arg_ty.type_id() == param_ty.type_id() {
                return arg_id;
            }
            if arg_ty.needs_wrapper_for(param_ty) {
                push_conversion(output, next_id, MIRValue::ToWrapper(arg_id))
            } else {
                push_conversion(output, next_id, MIRValue::CastTo(arg_id, param_ty.clone()))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mir::{MIRFunction};
    use roc_base::Interner;
    use roc_types::TypeDescriptor;

    fn function_with(instructions: Vec<(MIRValueId, MIRValue)>, interner: &mut Interner) -> MIRFunction {
        MIRFunction {
            name: interner.intern("f"),
            param_types: Vec::new(),
            return_type: TypeDescriptor::Unit,
            local_count: 0,
            blocks: vec![MIRBlock {
                label: 0,
                instructions,
            }],
        }
    }

    #[test]
    fn primitive_argument_into_any_slot_gets_wrapped() {
        let mut interner = Interner::new();
        let name = interner.intern("println");
        let instructions = vec![
            (MIRValueId(0), MIRValue::ConstantInt32(1)),
            (
                MIRValueId(1),
                MIRValue::FunctionCall {
                    name,
                    args: vec![MIRValueId(0)],
                    signature: CallSignature {
                        arg_types: vec![TypeDescriptor::Int32],
                        param_types: vec![TypeDescriptor::Any],
                        return_type: TypeDescriptor::Unit,
                        var_args: false,
                    },
                },
            ),
        ];
        let mut module = MIRModule {
            functions: vec![function_with(instructions, &mut interner)],
        };
        insert_conversions(&mut module);

        let instrs = &module.functions[0].blocks[0].instructions;
        assert!(instrs.iter().any(|(_, v)| matches!(v, MIRValue::ToWrapper(_))));
        let (_, call) = instrs.last().unwrap();
        match call {
            MIRValue::FunctionCall { args, .. } => assert_ne!(args[0], MIRValueId(0)),
            _ => unreachable!(),
        }
    }

    #[test]
    fn matching_types_get_no_conversion() {
        let mut interner = Interner::new();
        let name = interner.intern("id");
        let instructions = vec![
            (MIRValueId(0), MIRValue::ConstantInt32(1)),
            (
                MIRValueId(1),
                MIRValue::FunctionCall {
                    name,
                    args: vec![MIRValueId(0)],
                    signature: CallSignature {
                        arg_types: vec![TypeDescriptor::Int32],
                        param_types: vec![TypeDescriptor::Int32],
                        return_type: TypeDescriptor::Int32,
                        var_args: false,
                    },
                },
            ),
        ];
        let mut module = MIRModule {
            functions: vec![function_with(instructions, &mut interner)],
        };
        insert_conversions(&mut module);

        let instrs = &module.functions[0].blocks[0].instructions;
        assert_eq!(instrs.len(), 2);
    }

    #[test]
    fn variadic_targets_are_left_untouched() {
        let mut interner = Interner::new();
        let name = interner.intern("ccall");
        let instructions = vec![
            (MIRValueId(0), MIRValue::ConstantInt32(1)),
            (
                MIRValueId(1),
                MIRValue::FunctionCall {
                    name,
                    args: vec![MIRValueId(0)],
                    signature: CallSignature {
                        arg_types: vec![TypeDescriptor::Int32],
                        param_types: vec![TypeDescriptor::Any],
                        return_type: TypeDescriptor::Any,
                        var_args: true,
                    },
                },
            ),
        ];
        let mut module = MIRModule {
            functions: vec![function_with(instructions, &mut interner)],
        };
        insert_conversions(&mut module);

        assert_eq!(module.functions[0].blocks[0].instructions.len(), 2);
    }
}
