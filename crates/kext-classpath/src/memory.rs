use std::collections::HashMap;

use crate::{ByteSource, ClasspathError};

/// A [`ByteSource`] over bytes that are already in memory.
#[derive(Debug, Default)]
pub struct InMemorySource {
    classes: HashMap<String, Vec<u8>>,
    names: Vec<String>,
    closed: bool,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a type under its source-facing name. Like a classpath, the first
    /// registration of a name wins.
    pub fn insert(&mut self, source_name: impl Into<String>, bytes: Vec<u8>) -> &mut Self {
        let name = source_name.into();
        if !self.classes.contains_key(&name) {
            self.names.push(name.clone());
            self.classes.insert(name, bytes);
        }
        self
    }

    pub fn with(mut self, source_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(source_name, bytes);
        self
    }
}

impl ByteSource for InMemorySource {
    fn class_bytes(&self, source_name: &str) -> Result<Option<Vec<u8>>, ClasspathError> {
        if self.closed {
            return Err(ClasspathError::Closed);
        }
        Ok(self.classes.get(source_name).cloned())
    }

    fn class_names(&self) -> Result<Vec<String>, ClasspathError> {
        if self.closed {
            return Err(ClasspathError::Closed);
        }
        Ok(self.names.clone())
    }

    fn close(&mut self) -> Result<(), ClasspathError> {
        if self.closed {
            return Err(ClasspathError::Closed);
        }
        self.closed = true;
        self.classes.clear();
        self.names.clear();
        Ok(())
    }
}
