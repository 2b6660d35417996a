//! Label resolution (§4.6.b).
//!
//! Lowering emits every `If`/`JumpOver` target and every `Label` marker as
//! a placeholder number scoped to the statement that created it, so two
//! unrelated `if` statements in the same function body can both mint label
//! `0`. This pass renumbers them, per function body, into a dense sequence
//! starting at `0` in first-appearance order — invariant #5: "Label IDs
//! across any one function body are unique and dense starting at 0."

use std::collections::HashMap;

use crate::mir::{MIRModule, MIRValue};

pub fn assign_labels(module: &mut MIRModule) {
    for func in &mut module.functions {
        let mut remap: HashMap<u32, u32> = HashMap::new();
        let mut next = 0u32;

        for block in &func.blocks {
            for (_, value) in &block.instructions {
                if let MIRValue::Label(id) = value {
                    remap.entry(*id).or_insert_with(|| {
                        let new_id = next;
                        next += 1;
                        new_id
                    });
                }
            }
        }

        let resolve = |remap: &HashMap<u32, u32>, old: u32| -> u32 {
            *remap.get(&old).unwrap_or(&old)
        };

        for block in &mut func.blocks {
            for (_, value) in &mut block.instructions {
                match value {
                    MIRValue::Label(id) => *id = resolve(&remap, *id),
                    MIRValue::If {
                        then_label,
                        else_label,
                        ..
                    } => {
                        *then_label = resolve(&remap, *then_label);
                        *else_label = resolve(&remap, *else_label);
                    }
                    MIRValue::JumpOver { target_label } => {
                        *target_label = resolve(&remap, *target_label);
                    }
                    _ => {}
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

    #[test]
    fn labels_are_renumbered_densely_from_zero() {
        let mut interner = Interner::new();
        let func = MIRFunction {
            name: interner.intern("f"),
            param_types: Vec::new(),
            return_type: TypeDescriptor::Unit,
            local_count: 0,
            blocks: vec![MIRBlock {
                label: 0,
                instructions: vec![
                    (
                        MIRValueId(0),
                        MIRValue::If {
                            cond: MIRValueId(0),
                            then_label: 7,
                            else_label: 7,
                        },
                    ),
                    (MIRValueId(1), MIRValue::Label(7)),
                    (
                        MIRValueId(2),
                        MIRValue::JumpOver { target_label: 9 },
                    ),
                    (MIRValueId(3), MIRValue::Label(9)),
                ],
            }],
        };
        let mut module = MIRModule {
            functions: vec![func],
        };
        assign_labels(&mut module);

        let instrs = &module.functions[0].blocks[0].instructions;
        match &instrs[0].1 {
            MIRValue::If {
                then_label,
                else_label,
                ..
            } => {
                assert_eq!(*then_label, 0);
                assert_eq!(*else_label, 0);
            }
            _ => unreachable!(),
        }
        assert!(matches!(instrs[1].1, MIRValue::Label(0)));
        assert!(matches!(
            instrs[2].1,
            MIRValue::JumpOver { target_label: 1 }
        ));
        assert!(matches!(instrs[3].1, MIRValue::Label(1)));
    }

    #[test]
    fn distinct_if_statements_do_not_collide() {
        let mut interner = Interner::new();
        let func = MIRFunction {
            name: interner.intern("f"),
            param_types: Vec::new(),
            return_type: TypeDescriptor::Unit,
            local_count: 0,
            blocks: vec![MIRBlock {
                label: 0,
                instructions: vec![
                    (
                        MIRValueId(0),
                        MIRValue::If {
                            cond: MIRValueId(0),
                            then_label: 0,
                            else_label: 0,
                        },
                    ),
                    (MIRValueId(1), MIRValue::Label(0)),
                    (
                        MIRValueId(2),
                        MIRValue::If {
                            cond: MIRValueId(0),
                            then_label: 0,
                            else_label: 0,
                        },
                    ),
                    (MIRValueId(3), MIRValue::Label(0)),
                ],
            }],
        };
        let mut module = MIRModule {
            functions: vec![func],
        };
        assign_labels(&mut module);

        let instrs = &module.functions[0].blocks[0].instructions;
        let first_label = match &instrs[0].1 {
            MIRValue::If { then_label, .. } => *then_label,
            _ => unreachable!(),
        };
        let second_label = match &instrs[2].1 {
            MIRValue::If { then_label, .. } => *then_label,
            _ => unreachable!(),
        };
        assert_ne!(first_label, second_label);
    }
}
