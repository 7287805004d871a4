//! Kotlin source rendering.

use std::fmt::Write as _;

use kext_model::{TypeUsage, UsageKind, Variance};

use crate::declaration::WrapperDeclaration;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Header {
    pub package: String,
    pub jvm_name: String,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            package: "org.gradle.kotlin.dsl".to_string(),
            jvm_name: "GradleApiKotlinDslExtensions".to_string(),
        }
    }
}

const SUPPRESSIONS: &[&str] = &[
    "unused",
    "nothing_to_inline",
    "useless_cast",
    "unchecked_cast",
    "extension_shadowed_by_member",
    "redundant_projection",
    "RemoveRedundantBackticks",
    "ObjectPropertyName",
    "deprecation",
];

pub fn render_header(header: &Header) -> String {
    let mut out = String::from("@file:Suppress(\n");
    for (i, suppression) in SUPPRESSIONS.iter().enumerate() {
        let separator = if i + 1 < SUPPRESSIONS.len() { "," } else { "" };
        let _ = writeln!(out, "    \"{suppression}\"{separator}");
    }
    out.push_str(")\n");
    let _ = writeln!(out, "@file:JvmName(\"{}\")", header.jvm_name);
    out.push('\n');
    let _ = writeln!(out, "package {}", header.package);
    out
}

pub fn render_usage(usage: &TypeUsage) -> String {
    let mut out = String::new();
    write_usage(&mut out, usage);
    out
}

fn write_usage(out: &mut String, usage: &TypeUsage) {
    if usage.kind == UsageKind::Star {
        out.push('*');
        return;
    }
    out.push_str(&usage.source_name);
    if !usage.type_arguments.is_empty() {
        out.push('<');
        for (i, arg) in usage.type_arguments.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            write_argument(out, arg);
        }
        out.push('>');
    } else if usage.needs_star_projection() {
        out.push('<');
        out.push_str(&vec!["*"; usage.declared_arity].join(", "));
        out.push('>');
    }
    if usage.is_nullable {
        out.push('?');
    }
}

fn write_argument(out: &mut String, arg: &TypeUsage) {
    if !arg.is_star() {
        match arg.variance {
            Variance::Invariant => {}
            Variance::Covariant => out.push_str("out "),
            Variance::Contravariant => out.push_str("in "),
        }
    }
    write_usage(out, arg);
}

/// `<T : Bound, U>` plus the `where` clause for parameters with several
/// bounds.
fn type_parameter_list(type_parameters: &[TypeUsage]) -> (String, String) {
    if type_parameters.is_empty() {
        return (String::new(), String::new());
    }
    let mut constraints = Vec::new();
    let list: Vec<String> = type_parameters
        .iter()
        .map(|tp| match tp.bounds.as_slice() {
            [] => tp.source_name.clone(),
            [bound] => format!("{} : {}", tp.source_name, render_usage(bound)),
            bounds => {
                constraints.extend(
                    bounds
                        .iter()
                        .map(|bound| format!("{} : {}", tp.source_name, render_usage(bound))),
                );
                tp.source_name.clone()
            }
        })
        .collect();
    let where_clause = if constraints.is_empty() {
        String::new()
    } else {
        format!(" where {}", constraints.join(", "))
    };
    (format!("<{}> ", list.join(", ")), where_clause)
}

pub fn render_declaration(declaration: &WrapperDeclaration, incubating_annotation: Option<&str>) -> String {
    let mut out = String::new();
    let qualified = format!("{}.{}", declaration.target, declaration.name);
    out.push_str("/**\n");
    let _ = writeln!(out, " * {}", declaration.description());
    out.push_str(" *\n");
    let _ = writeln!(out, " * @see {qualified}");
    out.push_str(" */\n");
    if declaration.is_deprecated {
        out.push_str("@Deprecated(\"Deprecated API\")\n");
    }
    if declaration.is_incubating {
        if let Some(annotation) = incubating_annotation {
            let _ = writeln!(out, "@{annotation}");
        }
    }

    let (type_parameters, where_clause) = type_parameter_list(&declaration.type_parameters);
    let receiver = if declaration.target_type_parameters.is_empty() {
        declaration.target.clone()
    } else {
        let names: Vec<&str> = declaration
            .target_type_parameters
            .iter()
            .map(|tp| tp.source_name.as_str())
            .collect();
        format!("{}<{}>", declaration.target, names.join(", "))
    };
    let parameters: Vec<String> = declaration
        .parameters
        .iter()
        .map(|p| {
            let vararg = if p.is_vararg { "vararg " } else { "" };
            format!("{vararg}`{}`: {}", p.name, render_usage(&p.usage))
        })
        .collect();

    let _ = writeln!(
        out,
        "inline fun {type_parameters}{receiver}.`{}`({}): {}{where_clause} =",
        declaration.name,
        parameters.join(", "),
        render_usage(&declaration.return_type),
    );
    let _ = write!(
        out,
        "    `{}`({})",
        declaration.name,
        declaration.invocation_arguments().join(", ")
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use kext_model::names;
    use pretty_assertions::assert_eq;

    #[test]
    fn renders_variance_stars_and_nullability() {
        let usage = TypeUsage::class(names::MAP).with_arguments(vec![
            TypeUsage::class(names::STRING).with_variance(Variance::Covariant),
            TypeUsage::class(names::LIST)
                .with_arguments(vec![TypeUsage::star()])
                .with_variance(Variance::Contravariant),
        ]);
        assert_eq!(
            render_usage(&usage.nullable(true)),
            "kotlin.collections.Map<out String, in kotlin.collections.List<*>>?"
        );
    }

    #[test]
    fn raw_generic_usages_get_star_projections() {
        let raw = TypeUsage::class("org.acme.Container").with_arity(2);
        assert_eq!(render_usage(&raw), "org.acme.Container<*, *>");
        assert_eq!(render_usage(&TypeUsage::class("org.acme.Plain")), "org.acme.Plain");
    }

    #[test]
    fn multi_bound_type_parameters_use_where() {
        let mut t = TypeUsage::type_variable("T");
        t.bounds = vec![
            TypeUsage::class("java.lang.Runnable"),
            TypeUsage::class("java.io.Serializable"),
        ];
        let mut u = TypeUsage::type_variable("U");
        u.bounds = vec![TypeUsage::class(names::ANY)];
        let (list, where_clause) = type_parameter_list(&[t, u]);
        assert_eq!(list, "<T, U : Any> ");
        assert_eq!(where_clause, " where T : java.lang.Runnable, T : java.io.Serializable");
    }

    #[test]
    fn header_lists_suppressions_then_package() {
        let header = render_header(&Header {
            package: "org.acme.kotlin".to_string(),
            jvm_name: "AcmeExtensions".to_string(),
        });
        assert!(header.starts_with("@file:Suppress(\n    \"unused\",\n"));
        assert!(header.contains("    \"deprecation\"\n)\n@file:JvmName(\"AcmeExtensions\")\n\npackage org.acme.kotlin\n"));
    }
}
