use kext_classpath::ClasspathError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("type graph is closed")]
    Closed,
    #[error("failed to read bytes of {name}: {source}")]
    Source {
        name: String,
        #[source]
        source: ClasspathError,
    },
    #[error("malformed class file for {name}: {source}")]
    ClassFile {
        name: String,
        #[source]
        source: kext_classfile::Error,
    },
}

impl ModelError {
    pub(crate) fn source(name: &str, err: ClasspathError) -> Self {
        match err {
            ClasspathError::Closed => ModelError::Closed,
            source => ModelError::Source {
                name: name.to_string(),
                source,
            },
        }
    }

    pub(crate) fn class_file(name: &str, source: kext_classfile::Error) -> Self {
        ModelError::ClassFile {
            name: name.to_string(),
            source,
        }
    }
}
