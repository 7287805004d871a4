//! Class byte suppliers.
//!
//! A [`ByteSource`] answers "give me the bytes of type `a.b.C.D`" and can
//! enumerate every type it holds. [`Classpath`] is the directory/JAR backed
//! implementation; [`InMemorySource`] serves tests and embedders that already
//! have the bytes.

mod classpath;
mod memory;

use std::path::{Path, PathBuf};

use thiserror::Error;

pub use classpath::Classpath;
pub use memory::InMemorySource;

#[derive(Debug, Error)]
pub enum ClasspathError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("classpath entry {} does not exist", .0.display())]
    MissingEntry(PathBuf),
    #[error("class byte source is closed")]
    Closed,
}

/// Supplier of class file bytes, keyed by source-facing name.
///
/// Source-facing names are binary names with nested-class separators
/// rewritten: `java/util/Map$Entry.class` is served as `java.util.Map.Entry`.
pub trait ByteSource {
    /// Bytes for `source_name`, or `None` if no entry provides it.
    fn class_bytes(&self, source_name: &str) -> Result<Option<Vec<u8>>, ClasspathError>;

    /// Every type name in the source, in classpath order, each name once.
    ///
    /// When several entries provide the same name the first one wins, both
    /// here and in [`ByteSource::class_bytes`].
    fn class_names(&self) -> Result<Vec<String>, ClasspathError>;

    /// Releases underlying handles. Every later call fails with
    /// [`ClasspathError::Closed`].
    fn close(&mut self) -> Result<(), ClasspathError>;

    /// `(name, bytes)` pairs for every type, lazily read in classpath order.
    fn all_class_bytes(
        &self,
    ) -> Result<Box<dyn Iterator<Item = Result<(String, Vec<u8>), ClasspathError>> + '_>, ClasspathError>
    {
        let names = self.class_names()?;
        Ok(Box::new(names.into_iter().filter_map(move |name| {
            match self.class_bytes(&name) {
                Ok(Some(bytes)) => Some(Ok((name, bytes))),
                Ok(None) => None,
                Err(err) => Some(Err(err)),
            }
        })))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ClasspathEntry {
    ClassDir(PathBuf),
    Jar(PathBuf),
}

impl ClasspathEntry {
    /// Classifies `path`: existing directories are class directories,
    /// everything else is treated as an archive.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if path.is_dir() {
            ClasspathEntry::ClassDir(path)
        } else {
            ClasspathEntry::Jar(path)
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            ClasspathEntry::ClassDir(p) | ClasspathEntry::Jar(p) => p,
        }
    }
}

/// Maps a class file path inside an entry (`com/example/Outer$Inner.class`)
/// to its source-facing name (`com.example.Outer.Inner`).
///
/// Returns `None` for entries that never describe a usable type:
/// `module-info`, `package-info`, anonymous and local classes, and anything
/// under `META-INF/`.
pub fn source_name_of_class_path(path: &str) -> Option<String> {
    let internal = path.strip_prefix('/').unwrap_or(path).strip_suffix(".class")?;
    if internal.starts_with("META-INF/") {
        return None;
    }

    let simple = internal.rsplit('/').next().unwrap_or(internal);
    if simple == "module-info" || simple == "package-info" {
        return None;
    }
    // `Outer$1`, `Outer$1Local`
    if simple
        .split('$')
        .skip(1)
        .any(|seg| seg.is_empty() || seg.starts_with(|c: char| c.is_ascii_digit()))
    {
        return None;
    }

    Some(internal.replace(['/', '$'], "."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_names_from_class_paths() {
        assert_eq!(
            source_name_of_class_path("java/util/Map$Entry.class").as_deref(),
            Some("java.util.Map.Entry")
        );
        assert_eq!(
            source_name_of_class_path("/Top.class").as_deref(),
            Some("Top")
        );
        assert_eq!(source_name_of_class_path("com/example/Foo$1.class"), None);
        assert_eq!(source_name_of_class_path("com/example/Foo$2Local.class"), None);
        assert_eq!(source_name_of_class_path("com/example/package-info.class"), None);
        assert_eq!(source_name_of_class_path("module-info.class"), None);
        assert_eq!(
            source_name_of_class_path("META-INF/versions/9/com/example/Foo.class"),
            None
        );
        assert_eq!(source_name_of_class_path("com/example/Foo.java"), None);
    }
}
