use std::collections::HashMap;

use crate::{ACC_ABSTRACT, ACC_INTERFACE, ACC_PUBLIC};

const MAJOR_JAVA_8: u16 = 52;

/// Writes a syntactically valid class file with just enough structure for
/// header-level readers: constant pool, methods, `Signature`, annotations,
/// parameter annotations, `MethodParameters` and `InnerClasses`.
#[derive(Clone, Debug)]
pub struct ClassBuilder {
    internal_name: String,
    super_name: Option<String>,
    interfaces: Vec<String>,
    access_flags: u16,
    signature: Option<String>,
    annotations: Vec<String>,
    invisible_annotations: Vec<String>,
    inner_access_flags: Option<u16>,
    methods: Vec<MethodBuilder>,
}

#[derive(Clone, Debug)]
pub struct MethodBuilder {
    name: String,
    descriptor: String,
    access_flags: u16,
    signature: Option<String>,
    annotations: Vec<String>,
    invisible_annotations: Vec<String>,
    parameter_annotations: Vec<(usize, String)>,
    parameter_names: Option<Vec<String>>,
    with_code: bool,
}

impl ClassBuilder {
    /// A public class extending `java/lang/Object`.
    pub fn new(internal_name: &str) -> Self {
        Self {
            internal_name: internal_name.to_string(),
            super_name: Some("java/lang/Object".to_string()),
            interfaces: Vec::new(),
            access_flags: ACC_PUBLIC,
            signature: None,
            annotations: Vec::new(),
            invisible_annotations: Vec::new(),
            inner_access_flags: None,
            methods: Vec::new(),
        }
    }

    pub fn interface(internal_name: &str) -> Self {
        Self::new(internal_name).access(ACC_PUBLIC | ACC_INTERFACE | ACC_ABSTRACT)
    }

    pub fn access(mut self, flags: u16) -> Self {
        self.access_flags = flags;
        self
    }

    pub fn super_class(mut self, internal_name: &str) -> Self {
        self.super_name = Some(internal_name.to_string());
        self
    }

    pub fn implements(mut self, internal_name: &str) -> Self {
        self.interfaces.push(internal_name.to_string());
        self
    }

    pub fn signature(mut self, signature: &str) -> Self {
        self.signature = Some(signature.to_string());
        self
    }

    pub fn annotation(mut self, descriptor: &str) -> Self {
        self.annotations.push(descriptor.to_string());
        self
    }

    pub fn invisible_annotation(mut self, descriptor: &str) -> Self {
        self.invisible_annotations.push(descriptor.to_string());
        self
    }

    /// Records an `InnerClasses` entry for this class itself with `flags`.
    pub fn inner_access(mut self, flags: u16) -> Self {
        self.inner_access_flags = Some(flags);
        self
    }

    pub fn method(mut self, method: MethodBuilder) -> Self {
        self.methods.push(method);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut pool = Pool::default();
        let mut body = Vec::new();

        push_u16(&mut body, self.access_flags);
        let this_index = pool.class(&self.internal_name);
        push_u16(&mut body, this_index);
        let super_index = self.super_name.as_deref().map_or(0, |name| pool.class(name));
        push_u16(&mut body, super_index);
        push_u16(&mut body, self.interfaces.len() as u16);
        for interface in &self.interfaces {
            let idx = pool.class(interface);
            push_u16(&mut body, idx);
        }

        // fields
        push_u16(&mut body, 0);

        push_u16(&mut body, self.methods.len() as u16);
        for method in &self.methods {
            method.write(&mut pool, &mut body);
        }

        let mut attributes = Vec::new();
        if let Some(sig) = &self.signature {
            attributes.push(signature_attribute(&mut pool, sig));
        }
        if !self.annotations.is_empty() {
            attributes.push(annotations_attribute(
                &mut pool,
                "RuntimeVisibleAnnotations",
                &self.annotations,
            ));
        }
        if !self.invisible_annotations.is_empty() {
            attributes.push(annotations_attribute(
                &mut pool,
                "RuntimeInvisibleAnnotations",
                &self.invisible_annotations,
            ));
        }
        if let Some(flags) = self.inner_access_flags {
            let name = pool.utf8("InnerClasses");
            let mut info = Vec::new();
            push_u16(&mut info, 1);
            push_u16(&mut info, this_index);
            push_u16(&mut info, 0);
            let simple = self
                .internal_name
                .rsplit(['/', '$'])
                .next()
                .unwrap_or(&self.internal_name)
                .to_string();
            let simple_index = pool.utf8(&simple);
            push_u16(&mut info, simple_index);
            push_u16(&mut info, flags);
            attributes.push((name, info));
        }
        write_attributes(&mut body, &attributes);

        let mut bytes = Vec::new();
        push_u32(&mut bytes, 0xCAFEBABE);
        push_u16(&mut bytes, 0);
        push_u16(&mut bytes, MAJOR_JAVA_8);
        push_u16(&mut bytes, pool.next_index);
        bytes.extend_from_slice(&pool.bytes);
        bytes.extend_from_slice(&body);
        bytes
    }
}

impl MethodBuilder {
    /// A public instance method.
    pub fn new(name: &str, descriptor: &str) -> Self {
        Self {
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            access_flags: ACC_PUBLIC,
            signature: None,
            annotations: Vec::new(),
            invisible_annotations: Vec::new(),
            parameter_annotations: Vec::new(),
            parameter_names: None,
            with_code: false,
        }
    }

    pub fn access(mut self, flags: u16) -> Self {
        self.access_flags = flags;
        self
    }

    pub fn signature(mut self, signature: &str) -> Self {
        self.signature = Some(signature.to_string());
        self
    }

    pub fn annotation(mut self, descriptor: &str) -> Self {
        self.annotations.push(descriptor.to_string());
        self
    }

    pub fn invisible_annotation(mut self, descriptor: &str) -> Self {
        self.invisible_annotations.push(descriptor.to_string());
        self
    }

    pub fn parameter_annotation(mut self, slot: usize, descriptor: &str) -> Self {
        self.parameter_annotations.push((slot, descriptor.to_string()));
        self
    }

    /// Emits a `MethodParameters` attribute.
    pub fn parameter_names(mut self, names: &[&str]) -> Self {
        self.parameter_names = Some(names.iter().map(|n| n.to_string()).collect());
        self
    }

    /// Emits an opaque `Code` attribute, which readers are expected to skip.
    pub fn with_code(mut self) -> Self {
        self.with_code = true;
        self
    }

    fn write(&self, pool: &mut Pool, out: &mut Vec<u8>) {
        push_u16(out, self.access_flags);
        let name = pool.utf8(&self.name);
        push_u16(out, name);
        let descriptor = pool.utf8(&self.descriptor);
        push_u16(out, descriptor);

        let mut attributes = Vec::new();
        if self.with_code {
            let name = pool.utf8("Code");
            // max_stack, max_locals, code_length=1 (`return`), no handlers, no attributes
            let info = vec![0, 1, 0, 1, 0, 0, 0, 1, 0xB1, 0, 0, 0, 0];
            attributes.push((name, info));
        }
        if let Some(sig) = &self.signature {
            attributes.push(signature_attribute(pool, sig));
        }
        if !self.annotations.is_empty() {
            attributes.push(annotations_attribute(
                pool,
                "RuntimeVisibleAnnotations",
                &self.annotations,
            ));
        }
        if !self.invisible_annotations.is_empty() {
            attributes.push(annotations_attribute(
                pool,
                "RuntimeInvisibleAnnotations",
                &self.invisible_annotations,
            ));
        }
        if !self.parameter_annotations.is_empty() {
            let slots = self
                .parameter_annotations
                .iter()
                .map(|(slot, _)| slot + 1)
                .max()
                .unwrap_or(0);
            let name = pool.utf8("RuntimeVisibleParameterAnnotations");
            let mut info = vec![slots as u8];
            for slot in 0..slots {
                let anns: Vec<&String> = self
                    .parameter_annotations
                    .iter()
                    .filter(|(s, _)| *s == slot)
                    .map(|(_, d)| d)
                    .collect();
                push_u16(&mut info, anns.len() as u16);
                for ann in anns {
                    write_annotation(pool, &mut info, ann);
                }
            }
            attributes.push((name, info));
        }
        if let Some(names) = &self.parameter_names {
            let name = pool.utf8("MethodParameters");
            let mut info = vec![names.len() as u8];
            for param in names {
                let idx = pool.utf8(param);
                push_u16(&mut info, idx);
                push_u16(&mut info, 0);
            }
            attributes.push((name, info));
        }
        write_attributes(out, &attributes);
    }
}

#[derive(Debug)]
struct Pool {
    bytes: Vec<u8>,
    next_index: u16,
    utf8: HashMap<String, u16>,
    classes: HashMap<String, u16>,
}

impl Default for Pool {
    fn default() -> Self {
        Self {
            bytes: Vec::new(),
            next_index: 1,
            utf8: HashMap::new(),
            classes: HashMap::new(),
        }
    }
}

impl Pool {
    fn utf8(&mut self, s: &str) -> u16 {
        if let Some(idx) = self.utf8.get(s) {
            return *idx;
        }
        self.bytes.push(1);
        push_u16(&mut self.bytes, s.len() as u16);
        self.bytes.extend_from_slice(s.as_bytes());
        let idx = self.next_index;
        self.next_index += 1;
        self.utf8.insert(s.to_string(), idx);
        idx
    }

    fn class(&mut self, internal_name: &str) -> u16 {
        if let Some(idx) = self.classes.get(internal_name) {
            return *idx;
        }
        let name_index = self.utf8(internal_name);
        self.bytes.push(7);
        push_u16(&mut self.bytes, name_index);
        let idx = self.next_index;
        self.next_index += 1;
        self.classes.insert(internal_name.to_string(), idx);
        idx
    }
}

fn signature_attribute(pool: &mut Pool, signature: &str) -> (u16, Vec<u8>) {
    let name = pool.utf8("Signature");
    let mut info = Vec::new();
    let sig = pool.utf8(signature);
    push_u16(&mut info, sig);
    (name, info)
}

fn annotations_attribute(pool: &mut Pool, attribute: &str, descriptors: &[String]) -> (u16, Vec<u8>) {
    let name = pool.utf8(attribute);
    let mut info = Vec::new();
    push_u16(&mut info, descriptors.len() as u16);
    for descriptor in descriptors {
        write_annotation(pool, &mut info, descriptor);
    }
    (name, info)
}

fn write_annotation(pool: &mut Pool, out: &mut Vec<u8>, descriptor: &str) {
    let type_index = pool.utf8(descriptor);
    push_u16(out, type_index);
    // num_element_value_pairs
    push_u16(out, 0);
}

fn write_attributes(out: &mut Vec<u8>, attributes: &[(u16, Vec<u8>)]) {
    push_u16(out, attributes.len() as u16);
    for (name, info) in attributes {
        push_u16(out, *name);
        push_u32(out, info.len() as u32);
        out.extend_from_slice(info);
    }
}

fn push_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_be_bytes());
}

fn push_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_be_bytes());
}
