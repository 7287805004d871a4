//! Parameter-level rewrites.

use kext_model::names::{self, primitive_array_element};
use kext_model::{Parameter, TypeUsage, Variance};

use crate::declaration::WrapperParameter;

/// Trailing callback type kept last so trailing-lambda syntax still works.
pub const ACTION: &str = "org.gradle.api.Action";

fn identifier(parameter: &Parameter) -> (String, String) {
    let name = parameter
        .name
        .clone()
        .unwrap_or_else(|| format!("p{}", parameter.index));
    let ident = format!("`{name}`");
    (name, ident)
}

/// Element type a Java varargs array is declared with.
fn vararg_element(usage: &TypeUsage) -> Option<TypeUsage> {
    if let Some(element) = usage.array_element() {
        return Some(element.clone());
    }
    primitive_array_element(&usage.source_name).map(TypeUsage::class)
}

/// The parameter as-is. Java varargs stay `vararg` when `allow_vararg`,
/// otherwise they are declared as arrays; both are spread at the call.
pub fn plain(parameter: &Parameter, allow_vararg: bool) -> WrapperParameter {
    let (name, ident) = identifier(parameter);
    if parameter.is_varargs {
        if let Some(element) = vararg_element(&parameter.usage).filter(|_| allow_vararg) {
            return WrapperParameter {
                index: parameter.index,
                name,
                usage: element,
                is_vararg: true,
                invocation: format!("*{ident}"),
            };
        }
        return WrapperParameter {
            index: parameter.index,
            name,
            usage: parameter.usage.clone(),
            is_vararg: false,
            invocation: format!("*{ident}"),
        };
    }
    WrapperParameter {
        index: parameter.index,
        name,
        usage: parameter.usage.clone(),
        is_vararg: false,
        invocation: ident,
    }
}

/// `Map<String, *>` or `Map<String, Any>` as the first parameter becomes
/// `vararg name: Pair<String, V>`, passed on as `mapOf(*name)`. Raw maps and
/// maps with a concrete value type do not qualify.
pub fn named_arguments(parameters: &[Parameter]) -> Option<Vec<WrapperParameter>> {
    let (first, rest) = parameters.split_first()?;
    let map = &first.usage;
    if !map.is_named(names::MAP) || map.type_arguments.len() != 2 {
        return None;
    }
    let (key, value) = (&map.type_arguments[0], &map.type_arguments[1]);
    if !key.is_named(names::STRING) || !(value.is_star() || value.is_named(names::ANY)) {
        return None;
    }

    let pair = TypeUsage::class(names::PAIR).with_arguments(vec![
        TypeUsage::class(names::STRING),
        value.clone().with_variance(Variance::Invariant),
    ]);
    let (name, ident) = identifier(first);
    let pairs = WrapperParameter {
        index: first.index,
        name,
        usage: pair,
        is_vararg: true,
        invocation: format!("mapOf(*{ident})"),
    };

    let mut declared: Vec<WrapperParameter> = rest.iter().map(|p| plain(p, false)).collect();
    let position = match declared.last() {
        Some(last) if last.usage.is_named(ACTION) => declared.len() - 1,
        _ => declared.len(),
    };
    declared.insert(position, pairs);
    Some(declared)
}

/// `.` or `?.` depending on whether the receiver may be null.
fn call(nullable: bool) -> &'static str {
    if nullable {
        "?."
    } else {
        "."
    }
}

/// Maps the elements of `ident` to `java.lang.Class`, then applies `finish`.
fn map_to_java(ident: &str, container_nullable: bool, element: &TypeUsage, finish: &str) -> String {
    let on_container = call(container_nullable);
    let mut out = format!("{ident}{on_container}map {{ it{}java }}", call(element.is_nullable));
    if !finish.is_empty() {
        out.push_str(on_container);
        out.push_str(finish);
    }
    out
}

fn kclass(class: &TypeUsage) -> TypeUsage {
    TypeUsage {
        source_name: names::KOTLIN_CLASS.to_string(),
        ..class.clone()
    }
}

/// `Class<X>` parameters, directly or as the element of an array or a
/// read-only collection, become `KClass<X>`. `None` if the parameter does not
/// qualify.
pub fn class_token(parameter: &Parameter) -> Option<WrapperParameter> {
    let usage = &parameter.usage;
    let (name, ident) = identifier(parameter);

    if usage.is_named(names::JAVA_CLASS) {
        return Some(WrapperParameter {
            index: parameter.index,
            name,
            usage: kclass(usage),
            is_vararg: false,
            invocation: format!("{ident}{}java", call(usage.is_nullable)),
        });
    }

    if let Some(element) = usage.array_element().filter(|e| e.is_named(names::JAVA_CLASS)) {
        return Some(if parameter.is_varargs {
            WrapperParameter {
                index: parameter.index,
                name,
                usage: kclass(element),
                is_vararg: true,
                invocation: format!("*{}", map_to_java(&ident, false, element, "toTypedArray()")),
            }
        } else {
            let converted = map_to_java(&ident, usage.is_nullable, element, "toTypedArray()");
            let mut array = usage.clone();
            array.type_arguments = vec![kclass(element)];
            WrapperParameter {
                index: parameter.index,
                name,
                usage: array,
                is_vararg: false,
                invocation: converted,
            }
        });
    }

    let is_collection = [names::ITERABLE, names::COLLECTION, names::LIST, names::SET]
        .iter()
        .any(|collection| usage.is_named(collection));
    if is_collection && usage.type_arguments.len() == 1 && usage.type_arguments[0].is_named(names::JAVA_CLASS) {
        let mut collection = usage.clone();
        collection.type_arguments = vec![kclass(&usage.type_arguments[0])];
        let finish = if usage.is_named(names::SET) { "toSet()" } else { "" };
        return Some(WrapperParameter {
            index: parameter.index,
            name,
            usage: collection,
            is_vararg: false,
            invocation: map_to_java(&ident, usage.is_nullable, &usage.type_arguments[0], finish),
        });
    }

    None
}

/// Every qualifying parameter rewritten, the rest kept as-is. `None` if no
/// parameter qualifies.
pub fn class_tokens(parameters: &[Parameter]) -> Option<Vec<WrapperParameter>> {
    let mut rewritten = false;
    let declared = parameters
        .iter()
        .map(|p| match class_token(p) {
            Some(token) => {
                rewritten = true;
                token
            }
            None => plain(p, true),
        })
        .collect();
    rewritten.then_some(declared)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn param(index: usize, name: &str, usage: TypeUsage) -> Parameter {
        Parameter {
            index,
            name: Some(name.to_string()),
            is_varargs: false,
            usage,
        }
    }

    fn map_of(value: TypeUsage) -> TypeUsage {
        TypeUsage::class(names::MAP).with_arguments(vec![TypeUsage::class(names::STRING), value])
    }

    fn class_of(arg: TypeUsage) -> TypeUsage {
        TypeUsage::class(names::JAVA_CLASS).with_arguments(vec![arg])
    }

    #[test]
    fn named_arguments_move_before_trailing_action() {
        let params = vec![
            param(0, "args", map_of(TypeUsage::star())),
            param(1, "name", TypeUsage::class(names::STRING)),
            param(2, "action", TypeUsage::class(ACTION).with_arguments(vec![TypeUsage::type_variable("T")])),
        ];
        let declared = named_arguments(&params).unwrap();
        let order: Vec<&str> = declared.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(order, vec!["name", "args", "action"]);
        assert!(declared[1].is_vararg);
        assert_eq!(declared[1].invocation, "mapOf(*`args`)");
    }

    #[test]
    fn named_arguments_require_unconstrained_values() {
        let concrete = vec![param(0, "m", map_of(TypeUsage::class(names::STRING)))];
        assert_eq!(named_arguments(&concrete), None);

        let raw = vec![param(0, "m", TypeUsage::class(names::MAP).with_arity(2))];
        assert_eq!(named_arguments(&raw), None);

        let not_first = vec![
            param(0, "s", TypeUsage::class(names::STRING)),
            param(1, "m", map_of(TypeUsage::class(names::ANY))),
        ];
        assert_eq!(named_arguments(&not_first), None);
    }

    #[test]
    fn java_varargs_become_arrays_next_to_pairs() {
        let mut rest = param(1, "values", TypeUsage::class("kotlin.IntArray"));
        rest.is_varargs = true;
        let params = vec![param(0, "args", map_of(TypeUsage::class(names::ANY))), rest];
        let declared = named_arguments(&params).unwrap();
        assert!(!declared[0].is_vararg);
        assert_eq!(declared[0].usage.source_name, "kotlin.IntArray");
        assert_eq!(declared[0].invocation, "*`values`");
        assert!(declared[1].is_vararg);
    }

    #[test]
    fn class_tokens_cover_arrays_and_collections() {
        let t = TypeUsage::type_variable("T");
        let mut varargs = param(
            2,
            "more",
            TypeUsage::class(names::KOTLIN_ARRAY).with_arguments(vec![class_of(TypeUsage::star())]),
        );
        varargs.is_varargs = true;
        let params = vec![
            param(0, "type", class_of(t.clone())),
            param(1, "types", TypeUsage::class(names::SET).with_arguments(vec![class_of(t)])),
            varargs,
        ];
        let declared = class_tokens(&params).unwrap();

        assert_eq!(declared[0].usage.source_name, names::KOTLIN_CLASS);
        assert_eq!(declared[0].invocation, "`type`.java");
        assert_eq!(declared[1].usage.type_arguments[0].source_name, names::KOTLIN_CLASS);
        assert_eq!(declared[1].invocation, "`types`.map { it.java }.toSet()");
        assert!(declared[2].is_vararg);
        assert_eq!(declared[2].usage.source_name, names::KOTLIN_CLASS);
        assert_eq!(declared[2].invocation, "*`more`.map { it.java }.toTypedArray()");
    }

    #[test]
    fn nullable_class_tokens_use_safe_calls() {
        let t = TypeUsage::type_variable("T");
        let params = vec![
            param(0, "type", class_of(t.clone()).nullable(true)),
            param(
                1,
                "types",
                TypeUsage::class(names::SET).with_arguments(vec![class_of(t.clone())]).nullable(true),
            ),
            param(
                2,
                "list",
                TypeUsage::class(names::LIST).with_arguments(vec![class_of(t.clone()).nullable(true)]),
            ),
            param(
                3,
                "array",
                TypeUsage::class(names::KOTLIN_ARRAY).with_arguments(vec![class_of(t)]).nullable(true),
            ),
        ];
        let declared = class_tokens(&params).unwrap();

        assert!(declared[0].usage.is_nullable);
        assert_eq!(declared[0].invocation, "`type`?.java");
        assert_eq!(declared[1].invocation, "`types`?.map { it.java }?.toSet()");
        assert_eq!(declared[2].invocation, "`list`.map { it?.java }");
        assert_eq!(declared[3].invocation, "`array`?.map { it.java }?.toTypedArray()");
    }

    #[test]
    fn class_tokens_skip_functions_without_class_parameters() {
        let params = vec![param(0, "name", TypeUsage::class(names::STRING))];
        assert_eq!(class_tokens(&params), None);
    }

    #[test]
    fn missing_names_use_positional_placeholders() {
        let parameter = Parameter {
            index: 3,
            name: None,
            is_varargs: false,
            usage: TypeUsage::class(names::STRING),
        };
        let wrapped = plain(&parameter, true);
        assert_eq!(wrapped.name, "p3");
        assert_eq!(wrapped.invocation, "`p3`");
    }
}
