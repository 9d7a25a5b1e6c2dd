//! Export rules for service, method and parameter type names.
//!
//! A name is exported when it starts with an uppercase letter. Parameter types
//! may also be built-in: primitives and unnamed composites (tuples, arrays,
//! slices, references).

/// Primitive type names as printed by `std::any::type_name`.
const PRIMITIVES: &[&str] = &[
    "bool", "char", "str", "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16", "u32",
    "u64", "u128", "usize", "f32", "f64", "()",
];

/// Check if `name` starts with an uppercase letter.
pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

/// Check if `name` is an exported identifier (no path separators, no dots).
pub fn is_exported_identifier(name: &str) -> bool {
    is_exported(name) && name.chars().all(|c| c.is_alphanumeric() || c == '_')
}

/// Check if a full type name is exported or built-in.
pub fn is_exported_or_builtin(type_name: &str) -> bool {
    if type_name.starts_with(['(', '[', '&', '*']) {
        return true;
    }
    let short = short_type_name(type_name);
    PRIMITIVES.contains(&short) || is_exported(short)
}

/// Last path segment of a type name, generics stripped.
///
/// `alloc::vec::Vec<my::Thing>` becomes `Vec`.
pub fn short_type_name(type_name: &str) -> &str {
    let base = type_name.split('<').next().unwrap_or(type_name);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::type_name;
    use std::collections::HashMap;

    #[allow(non_camel_case_types, dead_code)]
    struct hidden;

    #[allow(dead_code)]
    struct Visible;

    #[test]
    fn test_is_exported() {
        assert!(is_exported("Arith"));
        assert!(is_exported("Émile"));
        assert!(!is_exported("arith"));
        assert!(!is_exported("_Arith"));
        assert!(!is_exported(""));
    }

    #[test]
    fn test_is_exported_identifier() {
        assert!(is_exported_identifier("Arith_V2"));
        assert!(!is_exported_identifier("Arith.Add"));
        assert!(!is_exported_identifier("Arith<T>"));
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name("alloc::vec::Vec<my::Thing>"), "Vec");
        assert_eq!(short_type_name("i32"), "i32");
        assert_eq!(short_type_name(type_name::<Visible>()), "Visible");
    }

    #[test]
    fn test_builtin_types() {
        assert!(is_exported_or_builtin(type_name::<i32>()));
        assert!(is_exported_or_builtin(type_name::<()>()));
        assert!(is_exported_or_builtin(type_name::<(i32, String)>()));
        assert!(is_exported_or_builtin(type_name::<[u8; 4]>()));
        assert!(is_exported_or_builtin(type_name::<String>()));
        assert!(is_exported_or_builtin(type_name::<Vec<u8>>()));
        assert!(is_exported_or_builtin(type_name::<HashMap<String, i64>>()));
    }

    #[test]
    fn test_user_types() {
        assert!(is_exported_or_builtin(type_name::<Visible>()));
        assert!(!is_exported_or_builtin(type_name::<hidden>()));
    }
}
