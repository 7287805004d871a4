//! Generic signature grammar (JVMS §4.7.9.1).
//!
//! A hand-written recursive-descent parser. Every production is a method on
//! [`Parser`] that returns an owned tree; nested type arguments are parsed by
//! recursing into [`Parser::type_argument`], so there is no "pending type
//! argument" state to carry between calls.

use crate::descriptor::BaseType;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeSignature {
    Base(BaseType),
    Array(Box<TypeSignature>),
    Class(ClassTypeSignature),
    TypeVariable(String),
}

/// Field signatures share the reference-type grammar.
pub type FieldTypeSignature = TypeSignature;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassTypeSignature {
    /// Package in internal form (`java/util`), empty for the default package.
    pub package: String,
    /// Outer-to-inner segments; `Map.Entry<K, V>` has two.
    pub segments: Vec<SimpleClassTypeSignature>,
}

impl ClassTypeSignature {
    /// Internal name with `$` between nested segments: `java/util/Map$Entry`.
    pub fn internal_name(&self) -> String {
        let mut out = String::new();
        if !self.package.is_empty() {
            out.push_str(&self.package);
            out.push('/');
        }
        for (i, seg) in self.segments.iter().enumerate() {
            if i > 0 {
                out.push('$');
            }
            out.push_str(&seg.name);
        }
        out
    }

    /// Type arguments of the innermost segment.
    pub fn type_arguments(&self) -> &[TypeArgument] {
        self.segments
            .last()
            .map(|seg| seg.type_arguments.as_slice())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SimpleClassTypeSignature {
    pub name: String,
    pub type_arguments: Vec<TypeArgument>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeArgument {
    /// `*`
    Any,
    Exact(TypeSignature),
    /// `+T`, i.e. `? extends T`
    Extends(TypeSignature),
    /// `-T`, i.e. `? super T`
    Super(TypeSignature),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeParameter {
    pub name: String,
    pub class_bound: Option<TypeSignature>,
    pub interface_bounds: Vec<TypeSignature>,
}

impl TypeParameter {
    /// Declared bounds in source order (class bound first when present).
    pub fn bounds(&self) -> impl Iterator<Item = &TypeSignature> {
        self.class_bound.iter().chain(self.interface_bounds.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSignature {
    pub type_parameters: Vec<TypeParameter>,
    pub super_class: ClassTypeSignature,
    pub interfaces: Vec<ClassTypeSignature>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    pub type_parameters: Vec<TypeParameter>,
    pub parameters: Vec<TypeSignature>,
    /// `None` for `V`.
    pub return_type: Option<TypeSignature>,
    pub throws: Vec<TypeSignature>,
}

pub fn parse_class_signature(sig: &str) -> Result<ClassSignature> {
    let mut p = Parser::new(sig);
    let type_parameters = p.type_parameters()?;
    let super_class = p.class_type()?;
    let mut interfaces = Vec::new();
    while !p.at_end() {
        interfaces.push(p.class_type()?);
    }
    Ok(ClassSignature {
        type_parameters,
        super_class,
        interfaces,
    })
}

pub fn parse_method_signature(sig: &str) -> Result<MethodSignature> {
    let mut p = Parser::new(sig);
    let type_parameters = p.type_parameters()?;

    p.expect(b'(')?;
    let mut parameters = Vec::new();
    while !p.eat(b')') {
        parameters.push(p.java_type()?);
    }

    let return_type = if p.eat(b'V') {
        None
    } else {
        Some(p.java_type()?)
    };

    let mut throws = Vec::new();
    while p.eat(b'^') {
        throws.push(p.reference_type()?);
    }
    p.finish()?;

    Ok(MethodSignature {
        type_parameters,
        parameters,
        return_type,
        throws,
    })
}

pub fn parse_field_signature(sig: &str) -> Result<FieldTypeSignature> {
    let mut p = Parser::new(sig);
    let ty = p.reference_type()?;
    p.finish()?;
    Ok(ty)
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn error(&self) -> Error {
        Error::InvalidSignature {
            signature: self.input.to_string(),
            offset: self.pos,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn eat(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, b: u8) -> Result<()> {
        if self.eat(b) {
            Ok(())
        } else {
            Err(self.error())
        }
    }

    fn finish(&self) -> Result<()> {
        if self.at_end() {
            Ok(())
        } else {
            Err(self.error())
        }
    }

    /// Reads up to (not including) the first byte in `stop`.
    fn identifier(&mut self, stop: &[u8]) -> Result<&'a str> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if stop.contains(&b) {
                break;
            }
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.error());
        }
        Ok(&self.input[start..self.pos])
    }

    fn type_parameters(&mut self) -> Result<Vec<TypeParameter>> {
        let mut out = Vec::new();
        if !self.eat(b'<') {
            return Ok(out);
        }
        loop {
            out.push(self.type_parameter()?);
            if self.eat(b'>') {
                break;
            }
        }
        Ok(out)
    }

    fn type_parameter(&mut self) -> Result<TypeParameter> {
        let name = self.identifier(b":>")?.to_string();

        self.expect(b':')?;
        // An empty class bound (`T::Ljava/lang/Comparable;`) means interface-only bounds.
        let class_bound = match self.peek() {
            Some(b'L' | b'T' | b'[') => Some(self.reference_type()?),
            _ => None,
        };

        let mut interface_bounds = Vec::new();
        while self.eat(b':') {
            interface_bounds.push(self.reference_type()?);
        }

        Ok(TypeParameter {
            name,
            class_bound,
            interface_bounds,
        })
    }

    /// JavaTypeSignature: a reference type or a primitive.
    fn java_type(&mut self) -> Result<TypeSignature> {
        if let Some(base) = self.peek().and_then(BaseType::from_descriptor_char) {
            self.pos += 1;
            return Ok(TypeSignature::Base(base));
        }
        self.reference_type()
    }

    fn reference_type(&mut self) -> Result<TypeSignature> {
        match self.peek() {
            Some(b'L') => Ok(TypeSignature::Class(self.class_type()?)),
            Some(b'T') => {
                self.pos += 1;
                let name = self.identifier(b";")?.to_string();
                self.expect(b';')?;
                Ok(TypeSignature::TypeVariable(name))
            }
            Some(b'[') => {
                self.pos += 1;
                Ok(TypeSignature::Array(Box::new(self.java_type()?)))
            }
            _ => Err(self.error()),
        }
    }

    fn class_type(&mut self) -> Result<ClassTypeSignature> {
        self.expect(b'L')?;

        // `java/util/Map` up to the first segment terminator; the package is
        // everything before the last `/`.
        let qualified = self.identifier(b"<.;")?;
        let (package, first) = match qualified.rsplit_once('/') {
            Some((package, name)) => (package.to_string(), name),
            None => (String::new(), qualified),
        };
        if first.is_empty() {
            return Err(self.error());
        }

        let mut segments = vec![SimpleClassTypeSignature {
            name: first.to_string(),
            type_arguments: self.type_arguments()?,
        }];
        while self.eat(b'.') {
            let name = self.identifier(b"<.;")?.to_string();
            segments.push(SimpleClassTypeSignature {
                name,
                type_arguments: self.type_arguments()?,
            });
        }
        self.expect(b';')?;

        Ok(ClassTypeSignature { package, segments })
    }

    fn type_arguments(&mut self) -> Result<Vec<TypeArgument>> {
        let mut out = Vec::new();
        if !self.eat(b'<') {
            return Ok(out);
        }
        loop {
            out.push(self.type_argument()?);
            if self.eat(b'>') {
                break;
            }
        }
        Ok(out)
    }

    fn type_argument(&mut self) -> Result<TypeArgument> {
        if self.eat(b'*') {
            Ok(TypeArgument::Any)
        } else if self.eat(b'+') {
            Ok(TypeArgument::Extends(self.reference_type()?))
        } else if self.eat(b'-') {
            Ok(TypeArgument::Super(self.reference_type()?))
        } else {
            Ok(TypeArgument::Exact(self.reference_type()?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(internal: &str, args: Vec<TypeArgument>) -> TypeSignature {
        let (package, name) = internal.rsplit_once('/').unwrap();
        TypeSignature::Class(ClassTypeSignature {
            package: package.to_string(),
            segments: vec![SimpleClassTypeSignature {
                name: name.to_string(),
                type_arguments: args,
            }],
        })
    }

    #[test]
    fn class_signature_with_self_referential_bound() {
        let sig = parse_class_signature(
            "<T:Ljava/lang/Object;:Ljava/lang/Comparable<TT;>;>Ljava/lang/Object;",
        )
        .unwrap();
        assert_eq!(sig.type_parameters.len(), 1);
        let t = &sig.type_parameters[0];
        assert_eq!(t.name, "T");
        assert_eq!(t.bounds().count(), 2);
        assert_eq!(
            t.interface_bounds[0],
            class(
                "java/lang/Comparable",
                vec![TypeArgument::Exact(TypeSignature::TypeVariable("T".into()))]
            )
        );
        assert_eq!(sig.super_class.internal_name(), "java/lang/Object");
    }

    #[test]
    fn interface_only_bound_has_no_class_bound() {
        let sig = parse_class_signature("<T::Ljava/io/Serializable;>Ljava/lang/Object;").unwrap();
        let t = &sig.type_parameters[0];
        assert_eq!(t.class_bound, None);
        assert_eq!(t.interface_bounds.len(), 1);
    }

    #[test]
    fn method_signature_with_wildcards_and_arrays() {
        let sig = parse_method_signature(
            "<T:Ljava/lang/Object;>(Ljava/util/Map<Ljava/lang/String;*>;[Ljava/lang/Class<+TT;>;I)TT;^Ljava/io/IOException;",
        )
        .unwrap();
        assert_eq!(sig.type_parameters[0].name, "T");
        assert_eq!(sig.parameters.len(), 3);
        assert_eq!(
            sig.parameters[0],
            class(
                "java/util/Map",
                vec![
                    TypeArgument::Exact(class("java/lang/String", vec![])),
                    TypeArgument::Any,
                ]
            )
        );
        assert_eq!(
            sig.parameters[1],
            TypeSignature::Array(Box::new(class(
                "java/lang/Class",
                vec![TypeArgument::Extends(TypeSignature::TypeVariable("T".into()))]
            )))
        );
        assert_eq!(sig.parameters[2], TypeSignature::Base(BaseType::Int));
        assert_eq!(sig.return_type, Some(TypeSignature::TypeVariable("T".into())));
        assert_eq!(sig.throws.len(), 1);
    }

    #[test]
    fn void_method_signature() {
        let sig = parse_method_signature("(Ljava/util/List<-Ljava/lang/Number;>;)V").unwrap();
        assert_eq!(sig.return_type, None);
        assert!(sig.type_parameters.is_empty());
    }

    #[test]
    fn inner_class_segments_carry_their_own_arguments() {
        let sig = parse_field_signature("Lcom/example/Outer<TK;>.Inner<Ljava/lang/String;>;").unwrap();
        let TypeSignature::Class(cls) = sig else {
            panic!("expected class type");
        };
        assert_eq!(cls.internal_name(), "com/example/Outer$Inner");
        assert_eq!(cls.segments[0].type_arguments.len(), 1);
        assert_eq!(
            cls.type_arguments(),
            &[TypeArgument::Exact(class("java/lang/String", vec![]))]
        );
    }

    #[test]
    fn nested_generic_bound_inside_wildcard() {
        let sig =
            parse_field_signature("Ljava/util/List<+Ljava/util/Map<Ljava/lang/String;*>;>;").unwrap();
        let TypeSignature::Class(list) = sig else {
            panic!("expected class type");
        };
        let TypeArgument::Extends(TypeSignature::Class(map)) = &list.type_arguments()[0] else {
            panic!("expected bounded wildcard");
        };
        assert_eq!(map.internal_name(), "java/util/Map");
        assert_eq!(map.type_arguments()[1], TypeArgument::Any);
    }

    #[test]
    fn default_package_class() {
        let sig = parse_field_signature("LTopLevel;").unwrap();
        let TypeSignature::Class(cls) = sig else {
            panic!("expected class type");
        };
        assert_eq!(cls.package, "");
        assert_eq!(cls.internal_name(), "TopLevel");
    }

    #[test]
    fn malformed_signatures_report_offset() {
        for bad in ["Ljava/util/List<", "(I", "<T>Ljava/lang/Object;", "Ljava/lang/Object", "Q"] {
            let err = parse_method_signature(bad)
                .err()
                .or_else(|| parse_field_signature(bad).err());
            assert!(
                matches!(err, Some(Error::InvalidSignature { .. })),
                "expected failure for {bad}"
            );
        }
        assert!(parse_field_signature("Ljava/util/List<").is_err());
        assert!(parse_class_signature("<T>Ljava/lang/Object;").is_err());
    }
}
