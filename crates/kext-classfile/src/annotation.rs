use crate::constant_pool::ConstantPool;
use crate::error::{Error, Result};
use crate::reader::Reader;

/// An annotation occurrence, reduced to the annotation type.
///
/// Element values are validated and skipped: the generator only asks whether
/// a marker annotation is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Field descriptor of the annotation type, e.g. `Ljavax/annotation/Nullable;`.
    pub type_descriptor: String,
}

impl Annotation {
    pub(crate) fn parse(reader: &mut Reader<'_>, cp: &ConstantPool) -> Result<Self> {
        let type_index = reader.read_u2()?;
        let type_descriptor = cp.get_utf8(type_index)?.to_string();

        let num_element_value_pairs = reader.read_u2()?;
        for _ in 0..num_element_value_pairs {
            let _element_name_index = reader.read_u2()?;
            skip_element_value(reader, cp)?;
        }

        Ok(Self { type_descriptor })
    }

    /// Binary name of the annotation type (`javax.annotation.Nullable`).
    pub fn type_name(&self) -> Option<String> {
        descriptor_to_internal_name(&self.type_descriptor).map(|name| name.replace('/', "."))
    }

    pub(crate) fn parse_list(reader: &mut Reader<'_>, cp: &ConstantPool) -> Result<Vec<Self>> {
        let num = reader.read_u2()? as usize;
        let mut anns = Vec::with_capacity(num);
        for _ in 0..num {
            anns.push(Annotation::parse(reader, cp)?);
        }
        Ok(anns)
    }
}

fn skip_element_value(reader: &mut Reader<'_>, cp: &ConstantPool) -> Result<()> {
    let tag = reader.read_u1()? as char;
    match tag {
        'B' | 'C' | 'D' | 'F' | 'I' | 'J' | 'S' | 'Z' | 's' | 'c' => {
            cp.get(reader.read_u2()?)?;
        }
        'e' => {
            cp.get_utf8(reader.read_u2()?)?;
            cp.get_utf8(reader.read_u2()?)?;
        }
        '@' => {
            Annotation::parse(reader, cp)?;
        }
        '[' => {
            let num_values = reader.read_u2()?;
            for _ in 0..num_values {
                skip_element_value(reader, cp)?;
            }
        }
        _ => return Err(Error::MalformedAttribute("RuntimeVisibleAnnotations")),
    }
    Ok(())
}

pub fn descriptor_to_internal_name(desc: &str) -> Option<&str> {
    desc.strip_prefix('L').and_then(|rest| rest.strip_suffix(';'))
}
