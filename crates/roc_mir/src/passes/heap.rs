//! Heap promotion of escaping array literals (§4.6.c).
//!
//! An array literal built and returned from a function would dangle if it
//! stayed on the stack frame that's about to be torn down, so any
//! `ArrayLit` whose value id flows directly into a `ReturnValue` is
//! repointed at `AllocationSpace::HeapAllocation`. Everything else keeps
//! lowering's default, stack allocation — array literals used only inside
//! the body that builds them never need to outlive it.

use std::collections::HashSet;

use crate::mir::{AllocationSpace, MIRModule, MIRValue, MIRValueId};

pub fn promote_escaping_arrays(module: &mut MIRModule) {
    for func in &mut module.functions {
        for block in &mut func.blocks {
            let escaping: HashSet<MIRValueId> = block
                .instructions
                .iter()
                .filter_map(|(_, value)| match value {
                    MIRValue::ReturnValue(id) => Some(*id),
                    _ => None,
                })
                .collect();

            for (id, value) in &mut block.instructions {
                if let MIRValue::ArrayLit { space, .. } = value {
                    if escaping.contains(id) {
                        *space = AllocationSpace::HeapAllocation;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mir::{MIRBlock, MIRFunction, MIRValueId};
    use roc_base::Interner;
    use roc_types::TypeDescriptor;

    fn array_function(
        interner: &mut Interner,
        returned: bool,
    ) -> MIRFunction {
        let mut instructions = vec![(
            MIRValueId(0),
            MIRValue::ArrayLit {
                elements: vec![],
                element_type: TypeDescriptor::Int32,
                space: AllocationSpace::StackAllocation,
            },
        )];
        if returned {
            instructions.push((MIRValueId(1), MIRValue::ReturnValue(MIRValueId(0))));
        } else {
            instructions.push((MIRValueId(1), MIRValue::ReturnVoid));
        }
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
    fn returned_array_literal_is_heap_allocated() {
        let mut interner = Interner::new();
        let mut module = MIRModule {
            functions: vec![array_function(&mut interner, true)],
        };
        promote_escaping_arrays(&mut module);

        match &module.functions[0].blocks[0].instructions[0].1 {
            MIRValue::ArrayLit { space, .. } => assert_eq!(*space, AllocationSpace::HeapAllocation),
            _ => unreachable!(),
        }
    }

    #[test]
    fn unreturned_array_literal_stays_on_the_stack() {
        let mut interner = Interner::new();
        let mut module = MIRModule {
            functions: vec![array_function(&mut interner, false)],
        };
        promote_escaping_arrays(&mut module);

        match &module.functions[0].blocks[0].instructions[0].1 {
            MIRValue::ArrayLit { space, .. } => {
                assert_eq!(*space, AllocationSpace::StackAllocation)
            }
            _ => unreachable!(),
        }
    }
}
