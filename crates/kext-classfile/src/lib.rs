//! Header-level class file reading: constant pool, members, annotations,
//! descriptors and the generic signature grammar.
//!
//! Method bodies are never decoded.

#![forbid(unsafe_code)]

mod annotation;
mod classfile;
mod constant_pool;
mod descriptor;
mod error;
mod reader;
mod signature;

pub use crate::annotation::{descriptor_to_internal_name, Annotation};
pub use crate::classfile::{
    ClassFile, ClassMember, InnerClassInfo, ACC_ABSTRACT, ACC_BRIDGE, ACC_INTERFACE, ACC_PUBLIC,
    ACC_STATIC, ACC_SYNTHETIC, ACC_VARARGS,
};
pub use crate::descriptor::{parse_field_descriptor, parse_method_descriptor};
pub use crate::descriptor::{BaseType, FieldType, MethodDescriptor, ReturnType};
pub use crate::error::{Error, Result};
pub use crate::signature::{
    parse_class_signature, parse_field_signature, parse_method_signature, ClassSignature,
    ClassTypeSignature, FieldTypeSignature, MethodSignature, SimpleClassTypeSignature,
    TypeArgument, TypeParameter, TypeSignature,
};
