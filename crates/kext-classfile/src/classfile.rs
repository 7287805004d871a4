use crate::annotation::Annotation;
use crate::constant_pool::ConstantPool;
use crate::error::{Error, Result};
use crate::reader::Reader;

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_STATIC: u16 = 0x0008;
pub const ACC_BRIDGE: u16 = 0x0040;
pub const ACC_VARARGS: u16 = 0x0080;
pub const ACC_INTERFACE: u16 = 0x0200;
pub const ACC_ABSTRACT: u16 = 0x0400;
pub const ACC_SYNTHETIC: u16 = 0x1000;

/// The header-level view of a class file: everything but method bodies.
///
/// `Code`, `LineNumberTable`, `LocalVariableTable`, `StackMapTable` and the
/// other body attributes are skipped without being decoded.
#[derive(Debug, Clone)]
pub struct ClassFile {
    pub minor_version: u16,
    pub major_version: u16,
    pub access_flags: u16,
    pub this_class: String,
    pub super_class: Option<String>,
    pub interfaces: Vec<String>,
    pub fields: Vec<ClassMember>,
    pub methods: Vec<ClassMember>,
    pub signature: Option<String>,
    pub runtime_visible_annotations: Vec<Annotation>,
    pub runtime_invisible_annotations: Vec<Annotation>,
    pub inner_classes: Vec<InnerClassInfo>,
}

#[derive(Debug, Clone)]
pub struct ClassMember {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: String,
    pub signature: Option<String>,
    pub runtime_visible_annotations: Vec<Annotation>,
    pub runtime_invisible_annotations: Vec<Annotation>,
    /// Per-parameter annotations (visible and invisible merged), indexed by
    /// parameter slot. May be shorter than the descriptor's parameter list.
    pub parameter_annotations: Vec<Vec<Annotation>>,
    /// Names from the `MethodParameters` attribute, when compiled with `-parameters`.
    pub parameter_names: Vec<Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InnerClassInfo {
    pub inner_class: String,
    pub outer_class: Option<String>,
    pub inner_name: Option<String>,
    pub access_flags: u16,
}

impl ClassFile {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(bytes);
        let magic = reader.read_u4()?;
        if magic != 0xCAFEBABE {
            return Err(Error::InvalidMagic(magic));
        }

        let minor_version = reader.read_u2()?;
        let major_version = reader.read_u2()?;
        let cp = ConstantPool::parse(&mut reader)?;

        let access_flags = reader.read_u2()?;
        let this_class = cp.get_class_name(reader.read_u2()?)?;
        let super_class_idx = reader.read_u2()?;
        let super_class = if super_class_idx == 0 {
            None
        } else {
            Some(cp.get_class_name(super_class_idx)?)
        };

        let interfaces_count = reader.read_u2()? as usize;
        let mut interfaces = Vec::with_capacity(interfaces_count);
        for _ in 0..interfaces_count {
            interfaces.push(cp.get_class_name(reader.read_u2()?)?);
        }

        let fields_count = reader.read_u2()? as usize;
        let mut fields = Vec::with_capacity(fields_count);
        for _ in 0..fields_count {
            fields.push(parse_member(&mut reader, &cp)?);
        }

        let methods_count = reader.read_u2()? as usize;
        let mut methods = Vec::with_capacity(methods_count);
        for _ in 0..methods_count {
            methods.push(parse_member(&mut reader, &cp)?);
        }

        let class_attrs = parse_attributes(&mut reader, &cp, AttributeTarget::Class)?;

        reader.ensure_empty()?;

        Ok(Self {
            minor_version,
            major_version,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            signature: class_attrs.signature,
            runtime_visible_annotations: class_attrs.runtime_visible_annotations,
            runtime_invisible_annotations: class_attrs.runtime_invisible_annotations,
            inner_classes: class_attrs.inner_classes,
        })
    }

    /// Source-level access flags: for member classes the `InnerClasses` entry
    /// describing this class wins over the (widened) class header flags.
    pub fn effective_access_flags(&self) -> u16 {
        self.inner_classes
            .iter()
            .find(|inner| inner.inner_class == self.this_class)
            .map(|inner| inner.access_flags)
            .unwrap_or(self.access_flags)
    }
}

fn parse_member(reader: &mut Reader<'_>, cp: &ConstantPool) -> Result<ClassMember> {
    let access_flags = reader.read_u2()?;
    let name = cp.get_utf8(reader.read_u2()?)?.to_string();
    let descriptor = cp.get_utf8(reader.read_u2()?)?.to_string();

    let attrs = parse_attributes(reader, cp, AttributeTarget::Member)?;
    Ok(ClassMember {
        access_flags,
        name,
        descriptor,
        signature: attrs.signature,
        runtime_visible_annotations: attrs.runtime_visible_annotations,
        runtime_invisible_annotations: attrs.runtime_invisible_annotations,
        parameter_annotations: attrs.parameter_annotations,
        parameter_names: attrs.parameter_names,
    })
}

#[derive(Default)]
struct ParsedAttributes {
    signature: Option<String>,
    runtime_visible_annotations: Vec<Annotation>,
    runtime_invisible_annotations: Vec<Annotation>,
    parameter_annotations: Vec<Vec<Annotation>>,
    parameter_names: Vec<Option<String>>,
    inner_classes: Vec<InnerClassInfo>,
}

enum AttributeTarget {
    Class,
    Member,
}

fn parse_attributes(
    reader: &mut Reader<'_>,
    cp: &ConstantPool,
    target: AttributeTarget,
) -> Result<ParsedAttributes> {
    let attributes_count = reader.read_u2()? as usize;
    let mut parsed = ParsedAttributes::default();
    for _ in 0..attributes_count {
        let name_index = reader.read_u2()?;
        let length = reader.read_u4()? as usize;
        let info = reader.read_bytes(length)?;
        let name = cp.get_utf8(name_index)?;

        let mut sub = Reader::new(info);
        match (name, &target) {
            ("Signature", _) => {
                let sig_index = sub.read_u2()?;
                parsed.signature = Some(cp.get_utf8(sig_index)?.to_string());
                sub.ensure_empty()?;
            }
            ("RuntimeVisibleAnnotations", _) => {
                parsed
                    .runtime_visible_annotations
                    .extend(Annotation::parse_list(&mut sub, cp)?);
                sub.ensure_empty()?;
            }
            ("RuntimeInvisibleAnnotations", _) => {
                parsed
                    .runtime_invisible_annotations
                    .extend(Annotation::parse_list(&mut sub, cp)?);
                sub.ensure_empty()?;
            }
            (
                "RuntimeVisibleParameterAnnotations" | "RuntimeInvisibleParameterAnnotations",
                AttributeTarget::Member,
            ) => {
                let num_parameters = sub.read_u1()? as usize;
                if parsed.parameter_annotations.len() < num_parameters {
                    parsed.parameter_annotations.resize(num_parameters, Vec::new());
                }
                for slot in 0..num_parameters {
                    let anns = Annotation::parse_list(&mut sub, cp)?;
                    parsed.parameter_annotations[slot].extend(anns);
                }
                sub.ensure_empty()?;
            }
            ("MethodParameters", AttributeTarget::Member) => {
                let count = sub.read_u1()? as usize;
                let mut names = Vec::with_capacity(count);
                for _ in 0..count {
                    let name_index = sub.read_u2()?;
                    let _access_flags = sub.read_u2()?;
                    names.push(if name_index == 0 {
                        None
                    } else {
                        Some(cp.get_utf8(name_index)?.to_string())
                    });
                }
                parsed.parameter_names = names;
                sub.ensure_empty()?;
            }
            ("InnerClasses", AttributeTarget::Class) => {
                let num = sub.read_u2()? as usize;
                let mut inners = Vec::with_capacity(num);
                for _ in 0..num {
                    let inner_class_info_index = sub.read_u2()?;
                    let outer_class_info_index = sub.read_u2()?;
                    let inner_name_index = sub.read_u2()?;
                    let inner_access_flags = sub.read_u2()?;

                    inners.push(InnerClassInfo {
                        inner_class: cp.get_class_name(inner_class_info_index)?,
                        outer_class: match outer_class_info_index {
                            0 => None,
                            idx => Some(cp.get_class_name(idx)?),
                        },
                        inner_name: match inner_name_index {
                            0 => None,
                            idx => Some(cp.get_utf8(idx)?.to_string()),
                        },
                        access_flags: inner_access_flags,
                    });
                }
                parsed.inner_classes.extend(inners);
                sub.ensure_empty()?;
            }
            // Code, debug tables, stack maps, ...
            _ => {}
        }
    }

    Ok(parsed)
}
