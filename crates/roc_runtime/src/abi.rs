//! Binary layout boxed values take on at runtime, and the vtable registry
//! that drives dynamic dispatch over them (§4.7 of the runtime-object ABI
//! contract).
//!
//! Every boxed value shares a 24-byte header: a vtable pointer, a type-ID,
//! and a refcount, each 8 bytes. Concrete types append their own payload:
//! `RawString` a data pointer and a length, `Int32` its 4-byte value,
//! arrays a length plus their elements. None of this is ever materialized
//! as actual bytes here — the backend is what lays memory out this way —
//! but the sizes and reserved IDs below are the contract a code generator
//! targeting this compiler has to honor.

/// Size in bytes of the header every boxed value carries, regardless of
/// its own payload: `(vtable-ptr: 8, type-id: 8, refcount: 8)`.
pub const OBJECT_HEADER_SIZE: u32 = 24;

/// Stable identifiers for the small, fixed method set every vtable may
/// carry an entry for. A type need not implement all of them; dispatch
/// falls back to the type's declared base mapping otherwise (today: no
/// inheritance, so an unimplemented method-ID is a lookup miss).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodId {
    ToString,
    TypeId,
    HashCode,
    Equals,
}

impl MethodId {
    pub const fn raw(self) -> u32 {
        match self {
            MethodId::ToString => 0,
            MethodId::TypeId => 1,
            MethodId::HashCode => 2,
            MethodId::Equals => 3,
        }
    }
}

/// One vtable slot. `fn_ptr` is an opaque handle here — in a generated
/// artifact it would be the address a relocation resolves to at link
/// time. For the reference interpreter it indexes into an in-process
/// dispatch table instead (see [`crate::reference_interp`]).
#[derive(Debug, Clone, Copy)]
pub struct FunctionEntry {
    pub owner_type_id: u32,
    pub fn_ptr: usize,
    pub method_id: MethodId,
}

/// An unordered mapping from method-ID to the entry implementing it for
/// one type.
#[derive(Debug, Clone, Default)]
pub struct VTable {
    entries: Vec<FunctionEntry>,
}

impl VTable {
    pub fn new() -> Self {
        VTable::default()
    }

    pub fn insert(&mut self, entry: FunctionEntry) {
        if let Some(existing) = self
            .entries
            .iter_mut()
            .find(|e| e.method_id == entry.method_id)
        {
            *existing = entry;
        } else {
            self.entries.push(entry);
        }
    }

    pub fn lookup(&self, method_id: MethodId) -> Option<FunctionEntry> {
        self.entries
            .iter()
            .copied()
            .find(|e| e.method_id == method_id)
    }
}

/// Process-wide `type-id -> vtable` mapping. Every built-in type registers
/// its vtable on first call via a generated initializer, and `main` calls
/// each initializer before user code runs; invariant #6 requires this to
/// happen exactly once per type-ID per process.
///
/// Registration is deliberately silent on a repeat key: the ABI is
/// single-threaded and this mirrors what a static initializer running
/// twice would do — overwrite, not panic. Design note §9 observes that a
/// compile-time-known per-type table would make this process-global
/// registry unnecessary; this struct is the in-memory stand-in the
/// reference interpreter and tests use instead of that static table.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    vtables: std::collections::HashMap<u32, VTable>,
    registered_once: std::collections::HashSet<u32>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        TypeRegistry::default()
    }

    /// Registers `vtable` for `type_id`. A second call for the same
    /// `type_id` overwrites the previous entry and is logged, not
    /// rejected — see the invariant note above.
    pub fn register(&mut self, type_id: u32, vtable: VTable) {
        if !self.registered_once.insert(type_id) {
            log::debug!("type-id {type_id} re-registered; overwriting previous vtable");
        }
        self.vtables.insert(type_id, vtable);
    }

    pub fn vtable(&self, type_id: u32) -> Option<&VTable> {
        self.vtables.get(&type_id)
    }

    pub fn dispatch(&self, type_id: u32, method_id: MethodId) -> Option<FunctionEntry> {
        self.vtable(type_id).and_then(|v| v.lookup(method_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_misses_an_unregistered_method() {
        let vtable = VTable::new();
        assert!(vtable.lookup(MethodId::ToString).is_none());
    }

    #[test]
    fn insert_then_lookup_round_trips() {
        let mut vtable = VTable::new();
        vtable.insert(FunctionEntry {
            owner_type_id: 4,
            fn_ptr: 0x1000,
            method_id: MethodId::ToString,
        });
        let entry = vtable.lookup(MethodId::ToString).expect("registered");
        assert_eq!(entry.fn_ptr, 0x1000);
    }

    #[test]
    fn second_insert_for_same_method_overwrites() {
        let mut vtable = VTable::new();
        vtable.insert(FunctionEntry {
            owner_type_id: 4,
            fn_ptr: 1,
            method_id: MethodId::ToString,
        });
        vtable.insert(FunctionEntry {
            owner_type_id: 4,
            fn_ptr: 2,
            method_id: MethodId::ToString,
        });
        assert_eq!(vtable.lookup(MethodId::ToString).unwrap().fn_ptr, 2);
    }

    #[test]
    fn registry_dispatch_finds_a_registered_type() {
        let mut registry = TypeRegistry::new();
        let mut vtable = VTable::new();
        vtable.insert(FunctionEntry {
            owner_type_id: 4,
            fn_ptr: 42,
            method_id: MethodId::ToString,
        });
        registry.register(4, vtable);
        assert_eq!(
            registry.dispatch(4, MethodId::ToString).unwrap().fn_ptr,
            42
        );
    }

    #[test]
    fn re_registering_a_type_id_overwrites_silently() {
        let mut registry = TypeRegistry::new();
        registry.register(4, VTable::new());
        let mut replacement = VTable::new();
        replacement.insert(FunctionEntry {
            owner_type_id: 4,
            fn_ptr: 7,
            method_id: MethodId::TypeId,
        });
        registry.register(4, replacement);
        assert_eq!(registry.dispatch(4, MethodId::TypeId).unwrap().fn_ptr, 7);
    }

    #[test]
    fn dispatch_misses_an_unregistered_type_id() {
        let registry = TypeRegistry::new();
        assert!(registry.dispatch(999, MethodId::ToString).is_none());
    }
}
