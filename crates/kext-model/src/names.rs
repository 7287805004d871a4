//! Binary name to Kotlin source name translation.

use kext_classfile::BaseType;

pub const STAR: &str = "*";
pub const UNIT: &str = "Unit";
pub const ANY: &str = "Any";
pub const STRING: &str = "String";
pub const PAIR: &str = "Pair";
pub const KOTLIN_ARRAY: &str = "kotlin.Array";
pub const KOTLIN_CLASS: &str = "kotlin.reflect.KClass";
pub const JAVA_CLASS: &str = "java.lang.Class";
pub const MAP: &str = "kotlin.collections.Map";
pub const ITERABLE: &str = "kotlin.collections.Iterable";
pub const COLLECTION: &str = "kotlin.collections.Collection";
pub const LIST: &str = "kotlin.collections.List";
pub const SET: &str = "kotlin.collections.Set";

/// `(binary name, source name, declared type parameter count)`.
const MAPPED_TYPES: &[(&str, &str, usize)] = &[
    // Built-ins
    ("java.lang.Object", ANY, 0),
    ("java.lang.String", STRING, 0),
    ("java.lang.CharSequence", "kotlin.CharSequence", 0),
    ("java.lang.Number", "kotlin.Number", 0),
    ("java.lang.Throwable", "kotlin.Throwable", 0),
    ("java.lang.Cloneable", "kotlin.Cloneable", 0),
    ("java.lang.Comparable", "kotlin.Comparable", 1),
    ("java.lang.Enum", "kotlin.Enum", 1),
    ("java.lang.annotation.Annotation", "kotlin.Annotation", 0),
    ("java.lang.Deprecated", "kotlin.Deprecated", 0),
    ("java.lang.Class", JAVA_CLASS, 1),
    // Boxed primitives
    ("java.lang.Boolean", "Boolean", 0),
    ("java.lang.Byte", "Byte", 0),
    ("java.lang.Character", "Char", 0),
    ("java.lang.Short", "Short", 0),
    ("java.lang.Integer", "Int", 0),
    ("java.lang.Long", "Long", 0),
    ("java.lang.Float", "Float", 0),
    ("java.lang.Double", "Double", 0),
    // Primitives
    ("boolean", "Boolean", 0),
    ("byte", "Byte", 0),
    ("char", "Char", 0),
    ("short", "Short", 0),
    ("int", "Int", 0),
    ("long", "Long", 0),
    ("float", "Float", 0),
    ("double", "Double", 0),
    // Collections
    ("java.lang.Iterable", ITERABLE, 1),
    ("java.util.Iterator", "kotlin.collections.Iterator", 1),
    ("java.util.ListIterator", "kotlin.collections.ListIterator", 1),
    ("java.util.Collection", COLLECTION, 1),
    ("java.util.List", LIST, 1),
    ("java.util.Set", SET, 1),
    ("java.util.Map", MAP, 2),
    ("java.util.Map$Entry", "kotlin.collections.Map.Entry", 2),
];

/// Translates a binary name (`java.util.Map$Entry`, `int`, `void`, `?`) to
/// the name used in generated source.
pub fn source_name_of_binary_name(binary_name: &str) -> String {
    match binary_name {
        "void" => UNIT.to_string(),
        "?" => STAR.to_string(),
        _ => MAPPED_TYPES
            .iter()
            .find(|(binary, _, _)| *binary == binary_name)
            .map(|(_, source, _)| source.to_string())
            .unwrap_or_else(|| binary_name.replace('$', ".")),
    }
}

/// Type parameter count of names the classpath never provides (Kotlin
/// built-ins and mapped platform types). `None` means "ask the type graph".
pub fn builtin_arity(source_name: &str) -> Option<usize> {
    if let Some((_, _, arity)) = MAPPED_TYPES.iter().find(|(_, source, _)| *source == source_name) {
        return Some(*arity);
    }
    match source_name {
        UNIT | STAR | PAIR => Some(if source_name == PAIR { 2 } else { 0 }),
        KOTLIN_ARRAY | KOTLIN_CLASS => Some(1),
        _ if primitive_array_element(source_name).is_some() => Some(0),
        _ => None,
    }
}

pub fn primitive_name(base: BaseType) -> &'static str {
    match base {
        BaseType::Boolean => "Boolean",
        BaseType::Byte => "Byte",
        BaseType::Char => "Char",
        BaseType::Short => "Short",
        BaseType::Int => "Int",
        BaseType::Long => "Long",
        BaseType::Float => "Float",
        BaseType::Double => "Double",
    }
}

/// `int[]` is `kotlin.IntArray`, not `kotlin.Array<Int>`.
pub fn primitive_array_name(base: BaseType) -> &'static str {
    match base {
        BaseType::Boolean => "kotlin.BooleanArray",
        BaseType::Byte => "kotlin.ByteArray",
        BaseType::Char => "kotlin.CharArray",
        BaseType::Short => "kotlin.ShortArray",
        BaseType::Int => "kotlin.IntArray",
        BaseType::Long => "kotlin.LongArray",
        BaseType::Float => "kotlin.FloatArray",
        BaseType::Double => "kotlin.DoubleArray",
    }
}

/// Element type of a primitive array name (`kotlin.IntArray` -> `Int`).
pub fn primitive_array_element(source_name: &str) -> Option<&'static str> {
    source_name
        .strip_prefix("kotlin.")
        .and_then(|rest| rest.strip_suffix("Array"))
        .and_then(|element| {
            ["Boolean", "Byte", "Char", "Short", "Int", "Long", "Float", "Double"]
                .into_iter()
                .find(|primitive| *primitive == element)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translates_mapped_and_nested_names() {
        assert_eq!(source_name_of_binary_name("java.lang.Object"), "Any");
        assert_eq!(source_name_of_binary_name("java.lang.Integer"), "Int");
        assert_eq!(source_name_of_binary_name("long"), "Long");
        assert_eq!(source_name_of_binary_name("void"), "Unit");
        assert_eq!(source_name_of_binary_name("?"), "*");
        assert_eq!(
            source_name_of_binary_name("java.util.Map$Entry"),
            "kotlin.collections.Map.Entry"
        );
        assert_eq!(
            source_name_of_binary_name("org.gradle.api.Outer$Inner"),
            "org.gradle.api.Outer.Inner"
        );
    }

    #[test]
    fn builtin_arities() {
        assert_eq!(builtin_arity(MAP), Some(2));
        assert_eq!(builtin_arity(JAVA_CLASS), Some(1));
        assert_eq!(builtin_arity("kotlin.IntArray"), Some(0));
        assert_eq!(builtin_arity(UNIT), Some(0));
        assert_eq!(builtin_arity("org.gradle.api.Project"), None);
    }

    #[test]
    fn primitive_array_elements() {
        assert_eq!(primitive_array_element("kotlin.IntArray"), Some("Int"));
        assert_eq!(primitive_array_element(KOTLIN_ARRAY), None);
        assert_eq!(primitive_array_element("kotlin.StringArray"), None);
    }
}
