//! MIR transformation passes (§4.6): implicit-conversion insertion, label
//! resolution, and heap promotion — run in that fixed order over a
//! [`crate::mir::MIRModule`] once lowering has produced it.
//!
//! Each pass only reads values an earlier stage produced — conversions
//! runs first because labels and heap promotion don't care about argument
//! wrapping, labels runs before heap promotion purely by convention (the
//! two don't interact). A structural violation surfacing here (e.g. a
//! dangling label reference) is a lowering bug, not a user error, so these
//! passes assert rather than return a `Result`.

pub mod conversions;
pub mod heap;
pub mod labels;

use crate::mir::MIRModule;

/// Runs every MIR pass over `module` in the fixed order the pipeline
/// overview table lists: conversions, then labels, then heap promotion.
pub fn run_passes(module: &mut MIRModule) {
    log::debug!(
        "running MIR passes over {} function(s)",
        module.functions.len()
    );
    conversions::insert_conversions(module);
    labels::assign_labels(module);
    heap::promote_escaping_arrays(module);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mir::{AllocationSpace, CallSignature, MIRBlock, MIRFunction, MIRValue, MIRValueId};
    use roc_base::{Interner, Symbol};
    use roc_types::TypeDescriptor;

    fn empty_function(name: &str, interner: &mut Interner) -> MIRFunction {
        MIRFunction {
            name: interner.intern(name),
            param_types: Vec::new(),
            return_type: TypeDescriptor::Unit,
            local_count: 0,
            blocks: vec![MIRBlock {
                label: 0,
                instructions: Vec::new(),
            }],
        }
    }

    #[test]
    fn run_passes_is_a_no_op_on_an_empty_module() {
        let mut interner = Interner::new();
        let mut module = MIRModule {
            functions: vec![empty_function("main", &mut interner)],
        };
        run_passes(&mut module);
        assert!(module.functions[0].blocks[0].instructions.is_empty());
    }

    #[test]
    fn conversions_then_labels_then_heap_all_apply_together() {
        let mut interner = Interner::new();
        let println = interner.intern("println");
        let mut func = empty_function("run", &mut interner);
        let block = &mut func.blocks[0];
        let arg = block.instructions.len() as u32;
        block
            .instructions
            .push((MIRValueId(0), MIRValue::ConstantInt32(7)));
        block.instructions.push((
            MIRValueId(1),
            MIRValue::FunctionCall {
                name: println,
                args: vec![MIRValueId(0)],
                signature: CallSignature {
                    arg_types: vec![TypeDescriptor::Int32],
                    param_types: vec![TypeDescriptor::Any],
                    return_type: TypeDescriptor::Unit,
                    var_args: false,
                },
            },
        ));
        block.instructions.push((
            MIRValueId(2),
            MIRValue::ArrayLit {
                elements: vec![],
                element_type: TypeDescriptor::Int32,
                space: AllocationSpace::StackAllocation,
            },
        ));
        block
            .instructions
            .push((MIRValueId(3), MIRValue::ReturnValue(MIRValueId(2))));
        let _ = arg;

        let mut module = MIRModule {
            functions: vec![func],
        };
        run_passes(&mut module);

        let instructions = &module.functions[0].blocks[0].instructions;
        assert!(instructions
            .iter()
            .any(|(_, v)| matches!(v, MIRValue::ToWrapper(_))));
        let (_, array_value) = instructions
            .iter()
            .find(|(_, v)| matches!(v, MIRValue::ArrayLit { .. }))
            .unwrap();
        match array_value {
            MIRValue::ArrayLit { space, .. } => assert_eq!(*space, AllocationSpace::HeapAllocation),
            _ => unreachable!(),
        }
    }
}
