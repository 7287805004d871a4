use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
}

impl BaseType {
    pub fn from_descriptor_char(c: u8) -> Option<Self> {
        Some(match c {
            b'B' => BaseType::Byte,
            b'C' => BaseType::Char,
            b'D' => BaseType::Double,
            b'F' => BaseType::Float,
            b'I' => BaseType::Int,
            b'J' => BaseType::Long,
            b'S' => BaseType::Short,
            b'Z' => BaseType::Boolean,
            _ => return None,
        })
    }

    /// Java keyword for the primitive (`int`, `boolean`, ...).
    pub fn java_name(self) -> &'static str {
        match self {
            BaseType::Byte => "byte",
            BaseType::Char => "char",
            BaseType::Double => "double",
            BaseType::Float => "float",
            BaseType::Int => "int",
            BaseType::Long => "long",
            BaseType::Short => "short",
            BaseType::Boolean => "boolean",
        }
    }
}

/// A plain (erased) field type from a descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Base(BaseType),
    /// Internal name, e.g. `java/util/Map$Entry`.
    Object(String),
    Array(Box<FieldType>),
}

impl FieldType {
    /// Java-style binary name: `int`, `java.util.Map$Entry`, `java.lang.String[]`.
    pub fn binary_name(&self) -> String {
        match self {
            FieldType::Base(base) => base.java_name().to_string(),
            FieldType::Object(internal) => internal.replace('/', "."),
            FieldType::Array(component) => format!("{}[]", component.binary_name()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnType {
    Void,
    Type(FieldType),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub params: Vec<FieldType>,
    pub return_type: ReturnType,
}

pub fn parse_field_descriptor(desc: &str) -> Result<FieldType> {
    match parse_field_type(desc)? {
        (ty, "") => Ok(ty),
        _ => Err(Error::InvalidDescriptor(desc.to_string())),
    }
}

pub fn parse_method_descriptor(desc: &str) -> Result<MethodDescriptor> {
    let invalid = || Error::InvalidDescriptor(desc.to_string());

    let mut rest = desc.strip_prefix('(').ok_or_else(invalid)?;
    let mut params = Vec::new();
    loop {
        if let Some(after) = rest.strip_prefix(')') {
            rest = after;
            break;
        }
        if rest.is_empty() {
            return Err(invalid());
        }
        let (param, after) = parse_field_type(rest).map_err(|_| invalid())?;
        params.push(param);
        rest = after;
    }

    let return_type = if rest == "V" {
        ReturnType::Void
    } else {
        match parse_field_type(rest).map_err(|_| invalid())? {
            (ty, "") => ReturnType::Type(ty),
            _ => return Err(invalid()),
        }
    };

    Ok(MethodDescriptor {
        params,
        return_type,
    })
}

fn parse_field_type(input: &str) -> Result<(FieldType, &str)> {
    let invalid = || Error::InvalidDescriptor(input.to_string());
    let first = *input.as_bytes().first().ok_or_else(invalid)?;

    if let Some(base) = BaseType::from_descriptor_char(first) {
        return Ok((FieldType::Base(base), &input[1..]));
    }
    match first {
        b'L' => {
            let end = input.find(';').ok_or_else(invalid)?;
            if end == 1 {
                return Err(invalid());
            }
            Ok((FieldType::Object(input[1..end].to_string()), &input[end + 1..]))
        }
        b'[' => {
            let (component, rest) = parse_field_type(&input[1..])?;
            Ok((FieldType::Array(Box::new(component)), rest))
        }
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_field_descriptor_primitives_and_arrays() {
        assert_eq!(parse_field_descriptor("Z").unwrap(), FieldType::Base(BaseType::Boolean));
        let ty = parse_field_descriptor("[[Ljava/util/Map$Entry;").unwrap();
        assert_eq!(ty.binary_name(), "java.util.Map$Entry[][]");
    }

    #[test]
    fn parse_method_descriptor_with_mixed_params() {
        let desc = parse_method_descriptor("(J[ILjava/lang/Class;)V").unwrap();
        let names: Vec<_> = desc.params.iter().map(FieldType::binary_name).collect();
        assert_eq!(names, vec!["long", "int[]", "java.lang.Class"]);
        assert_eq!(desc.return_type, ReturnType::Void);
    }

    #[test]
    fn rejects_truncated_descriptors() {
        assert!(parse_method_descriptor("(I").is_err());
        assert!(parse_method_descriptor("(I)").is_err());
        assert!(parse_method_descriptor("(Ljava/lang/String)V").is_err());
        assert!(parse_field_descriptor("IJ").is_err());
    }
}
