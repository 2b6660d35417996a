//! The named helper symbols a generated artifact resolves against a
//! host-provided symbol table at load time (§6 "Generated artifact").
//!
//! These names are the contract between the backend and the runtime, not
//! Rust items the backend calls directly — a real code generator emits
//! `call` instructions referencing them by string, and the host's dynamic
//! loader binds them. [`LinkingSurface`] exists so `roc-compile` can assert
//! a backend only ever references names the runtime actually exposes.

/// Boxed `println`: dispatches through the argument's vtable `toString`
/// entry, then writes the result plus a trailing newline.
pub const MY_PRINTLN: &str = "myPrintln";
/// Produces a fresh vtable for a type-ID, populated with its declared
/// method entries.
pub const MY_VTABLE_FACTORY: &str = "myVTableFactory";
/// Registers a vtable for a type-ID in the process-wide registry.
pub const ADD_VTABLE_MAPPING: &str = "addVTableMapping";
/// Formats an `Int32` payload as a decimal string.
pub const MY_INT32_TO_STRING: &str = "myInt32ToString";
/// Runs the built-in `Int32` type's vtable initializer.
pub const MY_INIT_INT32: &str = "myInitInt32";
/// Runs the built-in `RawString` type's vtable initializer.
pub const MY_INIT_RAW_STRING: &str = "myInitRawString";

/// Every helper name the runtime promises to resolve. A backend that
/// references a name outside this set is referencing something the
/// runtime does not provide.
pub const SURFACE: &[&str] = &[
    MY_PRINTLN,
    MY_VTABLE_FACTORY,
    ADD_VTABLE_MAPPING,
    MY_INT32_TO_STRING,
    MY_INIT_INT32,
    MY_INIT_RAW_STRING,
];

/// Checks a symbol name the backend wants to emit a call to against the
/// fixed linking surface.
pub fn is_linking_surface_symbol(name: &str) -> bool {
    SURFACE.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_helper_names_are_recognized() {
        assert!(is_linking_surface_symbol(MY_PRINTLN));
        assert!(is_linking_surface_symbol(ADD_VTABLE_MAPPING));
    }

    #[test]
    fn arbitrary_names_are_rejected() {
        assert!(!is_linking_surface_symbol("myMadeUpHelper"));
    }
}
