use kext_classfile::{descriptor_to_internal_name, Annotation, ClassFile, ClassMember};

/// Binary names of the annotations the generator reacts to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Markers {
    pub nullable: Vec<String>,
    pub deprecated: Vec<String>,
    pub incubating: Vec<String>,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            nullable: vec![
                "javax.annotation.Nullable".to_string(),
                "javax.annotation.CheckForNull".to_string(),
                "org.jetbrains.annotations.Nullable".to_string(),
            ],
            deprecated: vec!["java.lang.Deprecated".to_string()],
            incubating: vec!["org.gradle.api.Incubating".to_string()],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Marker {
    Nullable,
    Deprecated,
    Incubating,
}

impl Markers {
    pub fn names(&self, marker: Marker) -> &[String] {
        match marker {
            Marker::Nullable => &self.nullable,
            Marker::Deprecated => &self.deprecated,
            Marker::Incubating => &self.incubating,
        }
    }
}

/// Something that carries annotations.
pub trait Annotated {
    fn annotations(&self) -> Box<dyn Iterator<Item = &Annotation> + '_>;

    fn has_annotation(&self, binary_name: &str) -> bool {
        self.annotations().any(|annotation| {
            descriptor_to_internal_name(&annotation.type_descriptor)
                .is_some_and(|internal| same_binary_name(internal, binary_name))
        })
    }

    fn has_marker(&self, markers: &Markers, marker: Marker) -> bool {
        markers
            .names(marker)
            .iter()
            .any(|name| self.has_annotation(name))
    }
}

impl Annotated for ClassFile {
    fn annotations(&self) -> Box<dyn Iterator<Item = &Annotation> + '_> {
        Box::new(
            self.runtime_visible_annotations
                .iter()
                .chain(&self.runtime_invisible_annotations),
        )
    }
}

impl Annotated for ClassMember {
    fn annotations(&self) -> Box<dyn Iterator<Item = &Annotation> + '_> {
        Box::new(
            self.runtime_visible_annotations
                .iter()
                .chain(&self.runtime_invisible_annotations),
        )
    }
}

/// A single parameter slot.
impl Annotated for [Annotation] {
    fn annotations(&self) -> Box<dyn Iterator<Item = &Annotation> + '_> {
        Box::new(self.iter())
    }
}

fn same_binary_name(internal: &str, binary: &str) -> bool {
    internal.len() == binary.len()
        && internal
            .bytes()
            .zip(binary.bytes())
            .all(|(i, b)| i == b || (i == b'/' && b == b'.'))
}
