//! Kotlin extension wrapper generation.
//!
//! Reads every public type from a classpath and emits `inline` extension
//! functions adapting two Java idioms:
//!
//! - a leading `Map<String, *>` parameter becomes `vararg Pair<String, *>`;
//! - `java.lang.Class` parameters (also inside arrays and read-only
//!   collections) become `kotlin.reflect.KClass`.
//!
//! Functions that need neither rewrite are not wrapped.

mod declaration;
mod emit;
mod filter;
mod rewrite;
mod synth;

use std::path::PathBuf;

use kext_classpath::{ByteSource, Classpath, ClasspathEntry, ClasspathError};
use kext_config::GeneratorConfig;
use kext_model::{
    GraphOptions, Markers, ModelError, NoParameterNames, ParameterNameIndex, ParameterNames,
    TypeGraph,
};
use thiserror::Error;

pub use crate::declaration::{DeclarationKey, Rewrite, WrapperDeclaration, WrapperParameter};
pub use crate::emit::{render_declaration, render_header, render_usage, Header};
pub use crate::filter::TypeFilter;
pub use crate::rewrite::ACTION;
pub use crate::synth::{
    declarations_for, ExtensionSynthesizer, LEGACY_CALLBACK, RESERVED_FUNCTION_NAMES, TYPE_TOKEN,
};

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Classpath(#[from] ClasspathError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("invalid type pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },
    #[error("failed to read parameter name index {}: {source}", path.display())]
    ParameterNames {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Clone, Debug, Default)]
pub struct Options {
    pub includes: Vec<String>,
    pub excludes: Vec<String>,
    pub header: Header,
    pub markers: Markers,
    pub parameter_names: Option<ParameterNameIndex>,
}

impl Options {
    /// Options for `config`; reads the parameter-name index if one is set.
    pub fn from_config(config: &GeneratorConfig) -> Result<Self, GenerateError> {
        let parameter_names = match &config.parameter_names {
            Some(path) => Some(ParameterNameIndex::load(path).map_err(|source| {
                GenerateError::ParameterNames {
                    path: path.clone(),
                    source,
                }
            })?),
            None => None,
        };

        let defaults = Markers::default();
        let markers = Markers {
            nullable: config.markers.nullable.clone().unwrap_or(defaults.nullable),
            deprecated: config.markers.deprecated.clone().unwrap_or(defaults.deprecated),
            incubating: config.markers.incubating.clone().unwrap_or(defaults.incubating),
        };

        Ok(Self {
            includes: config.includes.clone(),
            excludes: config.excludes.clone(),
            header: Header {
                package: config.header.package.clone(),
                jvm_name: config.header.jvm_name.clone(),
            },
            markers,
            parameter_names,
        })
    }
}

/// Opens the configured classpath and generates the extensions file.
pub fn generate(config: &GeneratorConfig) -> Result<String, GenerateError> {
    let options = Options::from_config(config)?;
    let entries: Vec<ClasspathEntry> = config
        .classpath
        .iter()
        .map(ClasspathEntry::from_path)
        .collect();
    let classpath = Classpath::open(&entries)?;
    generate_from_source(Box::new(classpath), &options)
}

/// Generates the extensions file for every type `source` provides. The source
/// is closed before returning, whether generation succeeded or not.
pub fn generate_from_source(
    source: Box<dyn ByteSource>,
    options: &Options,
) -> Result<String, GenerateError> {
    let filter = TypeFilter::new(&options.includes, &options.excludes)?;
    let parameter_names: Box<dyn ParameterNames> = match &options.parameter_names {
        Some(index) => Box::new(index.clone()),
        None => Box::new(NoParameterNames),
    };
    let graph = TypeGraph::new(
        source,
        GraphOptions {
            markers: options.markers.clone(),
            parameter_names,
        },
    );

    let synthesized = ExtensionSynthesizer::new(&graph, &filter).synthesize();
    let closed = graph.close();
    let declarations = synthesized?;
    closed?;

    tracing::info!(
        target = "kext.codegen",
        declarations = declarations.len(),
        "generated kotlin extensions"
    );
    Ok(render(&declarations, options))
}

/// Header followed by one block per declaration, separated by blank lines.
pub fn render(declarations: &[WrapperDeclaration], options: &Options) -> String {
    let incubating = options.markers.incubating.first().map(String::as_str);
    let mut out = render_header(&options.header);
    for declaration in declarations {
        out.push('\n');
        out.push_str(&render_declaration(declaration, incubating));
        out.push('\n');
    }
    out
}
