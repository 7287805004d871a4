use std::collections::HashSet;

use kext_model::{FunctionNode, ModelError, TypeGraph, TypeNode, TypeUsage};

use crate::declaration::{Rewrite, WrapperDeclaration, WrapperParameter};
use crate::filter::TypeFilter;
use crate::rewrite;

/// Names never wrapped: constructors, static initializers and the scope
/// function every Kotlin receiver already has.
pub const RESERVED_FUNCTION_NAMES: &[&str] = &["<init>", "<clinit>", "apply"];

/// Functions taking this callback type are left to the raw binding.
pub const LEGACY_CALLBACK: &str = "groovy.lang.Closure";

/// Reified type token; functions taking it are emitted first.
pub const TYPE_TOKEN: &str = "org.gradle.api.reflect.TypeOf";

/// Turns the types of a [`TypeGraph`] into deduplicated wrapper
/// declarations.
pub struct ExtensionSynthesizer<'a> {
    graph: &'a TypeGraph,
    filter: &'a TypeFilter,
}

impl<'a> ExtensionSynthesizer<'a> {
    pub fn new(graph: &'a TypeGraph, filter: &'a TypeFilter) -> Self {
        Self { graph, filter }
    }

    /// Declarations for every accepted type, in classpath order. Types that
    /// fail to load are logged and skipped; a closed graph is fatal.
    pub fn synthesize(&self) -> Result<Vec<WrapperDeclaration>, ModelError> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        let mut skipped = 0usize;

        for node in self.graph.all_types()? {
            let node = match node {
                Ok(node) => node,
                Err(ModelError::Closed) => return Err(ModelError::Closed),
                Err(err) => {
                    tracing::warn!(target = "kext.codegen", error = %err, "skipping unreadable type");
                    skipped += 1;
                    continue;
                }
            };
            if !self.filter.accepts(node.name()) {
                continue;
            }

            let declarations = match declarations_for(&node) {
                Ok(declarations) => declarations,
                Err(ModelError::Closed) => return Err(ModelError::Closed),
                Err(err) => {
                    tracing::warn!(
                        target = "kext.codegen",
                        name = node.name(),
                        error = %err,
                        "skipping type"
                    );
                    skipped += 1;
                    continue;
                }
            };

            for declaration in declarations {
                if seen.insert(declaration.key()) {
                    out.push(declaration);
                } else {
                    tracing::trace!(
                        target = "kext.codegen",
                        target_type = %declaration.target,
                        name = %declaration.name,
                        "dropping duplicate declaration"
                    );
                }
            }
        }

        tracing::debug!(
            target = "kext.codegen",
            declarations = out.len(),
            skipped,
            "synthesized extension declarations"
        );
        Ok(out)
    }
}

/// Wrappers for one type, before deduplication.
pub fn declarations_for(node: &TypeNode) -> Result<Vec<WrapperDeclaration>, ModelError> {
    if !node.is_public()? {
        return Ok(Vec::new());
    }

    let mut candidates = Vec::new();
    for function in node.functions()? {
        if is_candidate(function)? {
            candidates.push(function);
        }
    }
    // Stable: declaration order is kept within both groups.
    let mut keyed = Vec::with_capacity(candidates.len());
    for function in candidates {
        keyed.push((!takes_type_token(function)?, function));
    }
    keyed.sort_by_key(|(rest, _)| *rest);

    let mut out = Vec::new();
    for (_, function) in keyed {
        let parameters = function.parameters()?;
        if let Some(declared) = rewrite::named_arguments(parameters) {
            out.push(declaration(node, function, Rewrite::NamedArguments, declared)?);
        }
        if let Some(declared) = rewrite::class_tokens(parameters) {
            out.push(declaration(node, function, Rewrite::ClassToken, declared)?);
        }
    }
    Ok(out)
}

fn is_candidate(function: &FunctionNode) -> Result<bool, ModelError> {
    if !function.is_public()? || function.is_static()? {
        return Ok(false);
    }
    if RESERVED_FUNCTION_NAMES.contains(&function.name()) {
        return Ok(false);
    }
    Ok(!function
        .parameters()?
        .iter()
        .any(|p| p.usage.is_named(LEGACY_CALLBACK)))
}

fn takes_type_token(function: &FunctionNode) -> Result<bool, ModelError> {
    Ok(function
        .parameters()?
        .iter()
        .any(|p| p.usage.is_named(TYPE_TOKEN)))
}

fn declaration(
    owner: &TypeNode,
    function: &FunctionNode,
    rewrite: Rewrite,
    parameters: Vec<WrapperParameter>,
) -> Result<WrapperDeclaration, ModelError> {
    let own = function.type_parameters()?;
    let shadowed = |tp: &TypeUsage| own.iter().any(|o| o.source_name == tp.source_name);
    let receiver = owner.type_parameters()?;
    // A method type parameter shadows a receiver one of the same name; the
    // receiver is star-projected at that position.
    let type_parameters = own
        .iter()
        .chain(receiver.iter().filter(|tp| !shadowed(*tp)))
        .cloned()
        .collect();
    let target_type_parameters = receiver
        .iter()
        .map(|tp| if shadowed(tp) { TypeUsage::star() } else { tp.clone() })
        .collect();

    Ok(WrapperDeclaration {
        rewrite,
        target: owner.name().to_string(),
        name: function.name().to_string(),
        is_deprecated: function.is_deprecated()?,
        is_incubating: function.is_incubating()?,
        type_parameters,
        target_type_parameters,
        parameters,
        return_type: function.return_type()?.clone(),
    })
}
