//! Conversion from parsed descriptors and signatures to [`TypeUsage`]s.

use std::rc::Rc;

use kext_classfile::{FieldType, ReturnType, TypeArgument, TypeParameter, TypeSignature};

use crate::graph::GraphInner;
use crate::names::{self, builtin_arity, primitive_array_name, primitive_name, source_name_of_binary_name};
use crate::usage::{TypeUsage, Variance};
use crate::ModelError;

pub(crate) struct Assembler<'g> {
    graph: &'g Rc<GraphInner>,
}

impl<'g> Assembler<'g> {
    pub(crate) fn new(graph: &'g Rc<GraphInner>) -> Self {
        Self { graph }
    }

    pub(crate) fn type_parameters(
        &self,
        type_parameters: &[TypeParameter],
    ) -> Result<Vec<TypeUsage>, ModelError> {
        type_parameters
            .iter()
            .map(|tp| {
                let bounds = tp
                    .bounds()
                    .map(|bound| self.signature(bound))
                    .collect::<Result<Vec<_>, _>>()?;
                let mut usage = TypeUsage::type_variable(&tp.name);
                usage.bounds = bounds;
                Ok(usage)
            })
            .collect()
    }

    pub(crate) fn signature(&self, sig: &TypeSignature) -> Result<TypeUsage, ModelError> {
        match sig {
            TypeSignature::Base(base) => Ok(TypeUsage::class(primitive_name(*base))),
            TypeSignature::Array(element) => match element.as_ref() {
                TypeSignature::Base(base) => Ok(TypeUsage::class(primitive_array_name(*base))),
                element => Ok(array_of(self.signature(element)?)),
            },
            TypeSignature::TypeVariable(name) => Ok(TypeUsage::type_variable(name)),
            TypeSignature::Class(class) => {
                // Arguments of enclosing segments (`Outer<K>.Inner<V>`) are
                // not carried over.
                let arguments = class
                    .type_arguments()
                    .iter()
                    .map(|arg| self.argument(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                self.class(&internal_to_binary(&class.internal_name()), arguments)
            }
        }
    }

    fn argument(&self, arg: &TypeArgument) -> Result<TypeUsage, ModelError> {
        Ok(match arg {
            TypeArgument::Any => TypeUsage::star(),
            TypeArgument::Exact(sig) => self.signature(sig)?,
            TypeArgument::Extends(sig) => self.signature(sig)?.with_variance(Variance::Covariant),
            TypeArgument::Super(sig) => self.signature(sig)?.with_variance(Variance::Contravariant),
        })
    }

    pub(crate) fn field_type(&self, ty: &FieldType) -> Result<TypeUsage, ModelError> {
        match ty {
            FieldType::Base(base) => Ok(TypeUsage::class(primitive_name(*base))),
            FieldType::Object(internal) => self.class(&internal_to_binary(internal), Vec::new()),
            FieldType::Array(element) => match element.as_ref() {
                FieldType::Base(base) => Ok(TypeUsage::class(primitive_array_name(*base))),
                element => Ok(array_of(self.field_type(element)?)),
            },
        }
    }

    pub(crate) fn return_type(&self, ty: &ReturnType) -> Result<TypeUsage, ModelError> {
        match ty {
            ReturnType::Void => Ok(TypeUsage::class(names::UNIT)),
            ReturnType::Type(ty) => self.field_type(ty),
        }
    }

    fn class(&self, binary_name: &str, arguments: Vec<TypeUsage>) -> Result<TypeUsage, ModelError> {
        let source_name = source_name_of_binary_name(binary_name);
        let arity = self.arity_of(&source_name)?;
        Ok(TypeUsage::class(source_name)
            .with_arity(arity)
            .with_arguments(arguments))
    }

    /// Declared type parameter count of a referenced type. Only the class
    /// signature of the referenced type is parsed, never its members.
    fn arity_of(&self, source_name: &str) -> Result<usize, ModelError> {
        if let Some(arity) = builtin_arity(source_name) {
            return Ok(arity);
        }
        let node = match self.graph.lookup(source_name) {
            Ok(Some(node)) => node,
            Ok(None) => return Ok(0),
            Err(ModelError::Closed) => return Err(ModelError::Closed),
            Err(err) => {
                tracing::warn!(target = "kext.model", name = source_name, error = %err, "cannot read referenced type");
                return Ok(0);
            }
        };
        match node.type_parameter_count() {
            Ok(arity) => Ok(arity),
            Err(ModelError::Closed) => Err(ModelError::Closed),
            Err(err) => {
                tracing::warn!(target = "kext.model", name = source_name, error = %err, "cannot read referenced type");
                Ok(0)
            }
        }
    }
}

fn array_of(element: TypeUsage) -> TypeUsage {
    TypeUsage::class(names::KOTLIN_ARRAY)
        .with_arity(1)
        .with_arguments(vec![element])
}

fn internal_to_binary(internal: &str) -> String {
    internal.replace('/', ".")
}

/// Erased Java spelling of a signature type, as used in parameter-name keys.
pub(crate) fn erased_signature_name(sig: &TypeSignature) -> String {
    match sig {
        TypeSignature::Base(base) => base.java_name().to_string(),
        TypeSignature::Array(element) => format!("{}[]", erased_signature_name(element)),
        TypeSignature::Class(class) => internal_to_binary(&class.internal_name()),
        TypeSignature::TypeVariable(name) => name.clone(),
    }
}
