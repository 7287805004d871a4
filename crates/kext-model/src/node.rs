use std::fmt;
use std::rc::{Rc, Weak};

use kext_classfile::{
    parse_class_signature, parse_method_descriptor, parse_method_signature, ClassFile, ClassMember,
    ClassSignature, MethodDescriptor, MethodSignature, ACC_BRIDGE, ACC_PUBLIC, ACC_STATIC,
    ACC_SYNTHETIC, ACC_VARARGS,
};
use once_cell::unsync::OnceCell;

use crate::assemble::{erased_signature_name, Assembler};
use crate::graph::GraphInner;
use crate::markers::{Annotated, Marker};
use crate::param_names::parameter_names_key;
use crate::usage::TypeUsage;
use crate::ModelError;

fn upgrade(graph: &Weak<GraphInner>) -> Result<Rc<GraphInner>, ModelError> {
    let graph = graph.upgrade().ok_or(ModelError::Closed)?;
    graph.ensure_open()?;
    Ok(graph)
}

/// A type provided by the byte source. Parsed on first access.
pub struct TypeNode {
    name: String,
    bytes: Vec<u8>,
    class: OnceCell<ClassFile>,
    signature: OnceCell<Option<ClassSignature>>,
    type_parameters: OnceCell<Vec<TypeUsage>>,
    functions: OnceCell<Vec<FunctionNode>>,
    graph: Weak<GraphInner>,
}

impl TypeNode {
    pub(crate) fn new(name: String, bytes: Vec<u8>, graph: Weak<GraphInner>) -> Self {
        Self {
            name,
            bytes,
            class: OnceCell::new(),
            signature: OnceCell::new(),
            type_parameters: OnceCell::new(),
            functions: OnceCell::new(),
            graph,
        }
    }

    /// Source-facing name (`a.Outer.Inner`).
    pub fn name(&self) -> &str {
        &self.name
    }

    fn class(&self) -> Result<&ClassFile, ModelError> {
        upgrade(&self.graph)?;
        self.class.get_or_try_init(|| {
            ClassFile::parse(&self.bytes).map_err(|err| {
                tracing::warn!(target = "kext.model", name = %self.name, error = %err, "malformed class file");
                ModelError::class_file(&self.name, err)
            })
        })
    }

    /// Binary name (`a.Outer$Inner`).
    pub fn binary_name(&self) -> Result<String, ModelError> {
        Ok(self.class()?.this_class.replace('/', "."))
    }

    pub fn is_public(&self) -> Result<bool, ModelError> {
        Ok(self.class()?.effective_access_flags() & ACC_PUBLIC != 0)
    }

    pub fn is_deprecated(&self) -> Result<bool, ModelError> {
        self.has_marker(Marker::Deprecated)
    }

    pub fn is_incubating(&self) -> Result<bool, ModelError> {
        self.has_marker(Marker::Incubating)
    }

    fn has_marker(&self, marker: Marker) -> Result<bool, ModelError> {
        let graph = upgrade(&self.graph)?;
        Ok(self.class()?.has_marker(&graph.markers, marker))
    }

    fn class_signature(&self) -> Result<Option<&ClassSignature>, ModelError> {
        upgrade(&self.graph)?;
        self.signature
            .get_or_try_init(|| {
                let Some(raw) = self.class()?.signature.as_deref() else {
                    return Ok(None);
                };
                match parse_class_signature(raw) {
                    Ok(sig) => Ok(Some(sig)),
                    Err(err) => {
                        tracing::warn!(target = "kext.model", name = %self.name, error = %err, "ignoring malformed class signature");
                        Ok(None)
                    }
                }
            })
            .map(Option::as_ref)
    }

    /// Number of declared type parameters. Cheaper than
    /// [`TypeNode::type_parameters`]: bounds are not resolved.
    pub fn type_parameter_count(&self) -> Result<usize, ModelError> {
        Ok(self
            .class_signature()?
            .map_or(0, |sig| sig.type_parameters.len()))
    }

    /// Declared type parameters in order, bounds included.
    pub fn type_parameters(&self) -> Result<&[TypeUsage], ModelError> {
        let graph = upgrade(&self.graph)?;
        self.type_parameters
            .get_or_try_init(|| {
                match self.class_signature()? {
                    Some(sig) => Assembler::new(&graph).type_parameters(&sig.type_parameters),
                    None => Ok(Vec::new()),
                }
            })
            .map(Vec::as_slice)
    }

    /// Declared methods in declaration order, without synthetic and bridge
    /// methods or static initializers.
    pub fn functions(&self) -> Result<&[FunctionNode], ModelError> {
        upgrade(&self.graph)?;
        self.functions
            .get_or_try_init(|| {
                let owner_deprecated = self.is_deprecated()?;
                let owner_incubating = self.is_incubating()?;
                let functions = self
                    .class()?
                    .methods
                    .iter()
                    .filter(|m| m.access_flags & (ACC_SYNTHETIC | ACC_BRIDGE) == 0)
                    .filter(|m| m.name != "<clinit>")
                    .map(|m| FunctionNode {
                        owner: self.name.clone(),
                        member: m.clone(),
                        owner_deprecated,
                        owner_incubating,
                        descriptor: OnceCell::new(),
                        signature: OnceCell::new(),
                        type_parameters: OnceCell::new(),
                        parameters: OnceCell::new(),
                        return_type: OnceCell::new(),
                        graph: self.graph.clone(),
                    })
                    .collect();
                Ok(functions)
            })
            .map(Vec::as_slice)
    }
}

impl fmt::Debug for TypeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeNode").field("name", &self.name).finish_non_exhaustive()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Parameter {
    pub index: usize,
    /// Declared name, if the class file or the parameter-name index has one.
    pub name: Option<String>,
    /// The trailing parameter of a varargs method.
    pub is_varargs: bool,
    pub usage: TypeUsage,
}

/// A declared method. Identity is `(owner, name, descriptor)`.
pub struct FunctionNode {
    owner: String,
    member: ClassMember,
    owner_deprecated: bool,
    owner_incubating: bool,
    descriptor: OnceCell<MethodDescriptor>,
    signature: OnceCell<Option<MethodSignature>>,
    type_parameters: OnceCell<Vec<TypeUsage>>,
    parameters: OnceCell<Vec<Parameter>>,
    return_type: OnceCell<TypeUsage>,
    graph: Weak<GraphInner>,
}

impl FunctionNode {
    pub fn name(&self) -> &str {
        &self.member.name
    }

    /// Source name of the declaring type.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn descriptor(&self) -> &str {
        &self.member.descriptor
    }

    fn flags(&self) -> Result<u16, ModelError> {
        upgrade(&self.graph)?;
        Ok(self.member.access_flags)
    }

    pub fn is_public(&self) -> Result<bool, ModelError> {
        Ok(self.flags()? & ACC_PUBLIC != 0)
    }

    pub fn is_static(&self) -> Result<bool, ModelError> {
        Ok(self.flags()? & ACC_STATIC != 0)
    }

    pub fn is_varargs(&self) -> Result<bool, ModelError> {
        Ok(self.flags()? & ACC_VARARGS != 0)
    }

    /// Deprecated itself or declared on a deprecated type.
    pub fn is_deprecated(&self) -> Result<bool, ModelError> {
        let graph = upgrade(&self.graph)?;
        Ok(self.owner_deprecated || self.member.has_marker(&graph.markers, Marker::Deprecated))
    }

    /// Incubating itself or declared on an incubating type.
    pub fn is_incubating(&self) -> Result<bool, ModelError> {
        let graph = upgrade(&self.graph)?;
        Ok(self.owner_incubating || self.member.has_marker(&graph.markers, Marker::Incubating))
    }

    fn method_descriptor(&self) -> Result<&MethodDescriptor, ModelError> {
        upgrade(&self.graph)?;
        self.descriptor.get_or_try_init(|| {
            parse_method_descriptor(&self.member.descriptor)
                .map_err(|err| ModelError::class_file(&self.owner, err))
        })
    }

    fn method_signature(&self) -> Result<Option<&MethodSignature>, ModelError> {
        upgrade(&self.graph)?;
        self.signature
            .get_or_try_init(|| {
                let Some(raw) = self.member.signature.as_deref() else {
                    return Ok(None);
                };
                match parse_method_signature(raw) {
                    Ok(sig) => Ok(Some(sig)),
                    Err(err) => {
                        tracing::warn!(
                            target = "kext.model",
                            owner = %self.owner,
                            name = %self.member.name,
                            error = %err,
                            "ignoring malformed method signature"
                        );
                        Ok(None)
                    }
                }
            })
            .map(Option::as_ref)
    }

    /// Generic parameter types, when the signature agrees with the descriptor
    /// on the parameter count.
    fn generic_parameters(&self) -> Result<Option<&[kext_classfile::TypeSignature]>, ModelError> {
        let count = self.method_descriptor()?.params.len();
        Ok(self
            .method_signature()?
            .map(|sig| sig.parameters.as_slice())
            .filter(|params| params.len() == count))
    }

    pub fn type_parameters(&self) -> Result<&[TypeUsage], ModelError> {
        let graph = upgrade(&self.graph)?;
        self.type_parameters
            .get_or_try_init(|| {
                match self.method_signature()? {
                    Some(sig) => Assembler::new(&graph).type_parameters(&sig.type_parameters),
                    None => Ok(Vec::new()),
                }
            })
            .map(Vec::as_slice)
    }

    pub fn parameters(&self) -> Result<&[Parameter], ModelError> {
        let graph = upgrade(&self.graph)?;
        self.parameters
            .get_or_try_init(|| {
                let assembler = Assembler::new(&graph);
                let descriptor = self.method_descriptor()?;
                let generic = self.generic_parameters()?;

                let usages = match generic {
                    Some(params) => params
                        .iter()
                        .map(|sig| assembler.signature(sig))
                        .collect::<Result<Vec<_>, _>>()?,
                    None => descriptor
                        .params
                        .iter()
                        .map(|ty| assembler.field_type(ty))
                        .collect::<Result<Vec<_>, _>>()?,
                };

                let mut index_names: Option<Option<Vec<String>>> = None;
                let varargs = self.member.access_flags & ACC_VARARGS != 0;
                let count = usages.len();

                let mut parameters = Vec::with_capacity(count);
                for (index, usage) in usages.into_iter().enumerate() {
                    let declared = self
                        .member
                        .parameter_names
                        .get(index)
                        .cloned()
                        .flatten()
                        .filter(|name| !name.is_empty());
                    let name = match declared {
                        Some(name) => Some(name),
                        None => index_names
                            .get_or_insert_with(|| {
                                let types: Vec<String> = match generic {
                                    Some(params) => params.iter().map(erased_signature_name).collect(),
                                    None => descriptor.params.iter().map(|ty| ty.binary_name()).collect(),
                                };
                                lookup_parameter_names(&graph, &self.owner, &self.member.name, &types)
                            })
                            .as_ref()
                            .and_then(|names| names.get(index).cloned()),
                    }
                    .filter(|name| !name.is_empty());

                    let is_nullable = self
                        .member
                        .parameter_annotations
                        .get(index)
                        .is_some_and(|slot| slot.as_slice().has_marker(&graph.markers, Marker::Nullable));

                    parameters.push(Parameter {
                        index,
                        name,
                        is_varargs: varargs && index + 1 == count,
                        usage: usage.nullable(is_nullable),
                    });
                }
                Ok(parameters)
            })
            .map(Vec::as_slice)
    }

    pub fn return_type(&self) -> Result<&TypeUsage, ModelError> {
        let graph = upgrade(&self.graph)?;
        self.return_type.get_or_try_init(|| {
            let assembler = Assembler::new(&graph);
            let usage = match self.method_signature()? {
                Some(MethodSignature {
                    return_type: Some(ret),
                    ..
                }) => assembler.signature(ret)?,
                Some(MethodSignature {
                    return_type: None, ..
                }) => assembler.return_type(&kext_classfile::ReturnType::Void)?,
                None => assembler.return_type(&self.method_descriptor()?.return_type)?,
            };
            let is_nullable = self.member.has_marker(&graph.markers, Marker::Nullable);
            Ok(usage.nullable(is_nullable))
        })
    }
}

impl fmt::Debug for FunctionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionNode")
            .field("owner", &self.owner)
            .field("name", &self.member.name)
            .field("descriptor", &self.member.descriptor)
            .finish_non_exhaustive()
    }
}

/// Index keys spell nested owners either with `$` or with `.`.
fn lookup_parameter_names(
    graph: &GraphInner,
    owner: &str,
    method: &str,
    types: &[String],
) -> Option<Vec<String>> {
    let key = parameter_names_key(owner, method, types);
    if let Some(names) = graph.parameter_names.parameter_names(&key) {
        return Some(names);
    }
    if types.iter().any(|ty| ty.contains('$')) {
        let dotted: Vec<String> = types.iter().map(|ty| ty.replace('$', ".")).collect();
        return graph
            .parameter_names
            .parameter_names(&parameter_names_key(owner, method, &dotted));
    }
    None
}
