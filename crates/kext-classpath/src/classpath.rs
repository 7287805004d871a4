use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::OsStr;
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use zip::ZipArchive;

use crate::{source_name_of_class_path, ByteSource, ClasspathEntry, ClasspathError};

/// Upper bound on the buffer reserved from a zip header's declared size.
const MAX_PREALLOCATION: u64 = 1 << 20;

/// Directory/JAR backed [`ByteSource`].
///
/// JARs are opened once, when the classpath is built, and stay open until
/// [`ByteSource::close`] (or drop). Only entry names are read up front; class
/// bytes are read on demand.
#[derive(Debug)]
pub struct Classpath {
    entries: Vec<OpenEntry>,
    locations: HashMap<String, Location>,
    names: Vec<String>,
    closed: bool,
}

#[derive(Debug)]
enum OpenEntry {
    ClassDir(PathBuf),
    Jar {
        path: PathBuf,
        archive: RefCell<ZipArchive<File>>,
    },
}

#[derive(Clone, Debug)]
struct Location {
    entry: usize,
    /// Path relative to the class directory, or the zip entry name.
    path: String,
}

impl Classpath {
    pub fn open(entries: &[ClasspathEntry]) -> Result<Self, ClasspathError> {
        let mut open_entries = Vec::with_capacity(entries.len());
        let mut locations: HashMap<String, Location> = HashMap::new();
        let mut names = Vec::new();

        for (entry_idx, entry) in entries.iter().enumerate() {
            let (open, class_paths) = match entry {
                ClasspathEntry::ClassDir(dir) => {
                    if !dir.is_dir() {
                        return Err(ClasspathError::MissingEntry(dir.clone()));
                    }
                    (OpenEntry::ClassDir(dir.clone()), list_class_dir(dir))
                }
                ClasspathEntry::Jar(path) => {
                    if !path.is_file() {
                        return Err(ClasspathError::MissingEntry(path.clone()));
                    }
                    let mut archive = ZipArchive::new(File::open(path)?)?;
                    let class_paths = list_jar(&mut archive)?;
                    (
                        OpenEntry::Jar {
                            path: path.clone(),
                            archive: RefCell::new(archive),
                        },
                        class_paths,
                    )
                }
            };

            let mut added = 0usize;
            for class_path in class_paths {
                let Some(name) = source_name_of_class_path(&class_path) else {
                    continue;
                };
                if locations.contains_key(&name) {
                    tracing::trace!(
                        target = "kext.classpath",
                        name = %name,
                        entry = %entry.path().display(),
                        "shadowed by an earlier classpath entry"
                    );
                    continue;
                }
                locations.insert(
                    name.clone(),
                    Location {
                        entry: entry_idx,
                        path: class_path,
                    },
                );
                names.push(name);
                added += 1;
            }

            tracing::debug!(
                target = "kext.classpath",
                entry = %entry.path().display(),
                classes = added,
                "indexed classpath entry"
            );
            open_entries.push(open);
        }

        Ok(Self {
            entries: open_entries,
            locations,
            names,
            closed: false,
        })
    }

    fn ensure_open(&self) -> Result<(), ClasspathError> {
        if self.closed {
            Err(ClasspathError::Closed)
        } else {
            Ok(())
        }
    }
}

impl ByteSource for Classpath {
    fn class_bytes(&self, source_name: &str) -> Result<Option<Vec<u8>>, ClasspathError> {
        self.ensure_open()?;
        let Some(location) = self.locations.get(source_name) else {
            return Ok(None);
        };

        match &self.entries[location.entry] {
            OpenEntry::ClassDir(dir) => Ok(Some(std::fs::read(dir.join(&location.path))?)),
            OpenEntry::Jar { path, archive } => {
                let mut archive = archive.borrow_mut();
                let res = match archive.by_name(&location.path) {
                    Ok(mut file) => {
                        let mut bytes = Vec::with_capacity(file.size().min(MAX_PREALLOCATION) as usize);
                        file.read_to_end(&mut bytes)?;
                        Ok(Some(bytes))
                    }
                    Err(zip::result::ZipError::FileNotFound) => {
                        tracing::debug!(
                            target = "kext.classpath",
                            jar = %path.display(),
                            entry = %location.path,
                            "indexed jar entry disappeared"
                        );
                        Ok(None)
                    }
                    Err(err) => Err(err.into()),
                };
                res
            }
        }
    }

    fn class_names(&self) -> Result<Vec<String>, ClasspathError> {
        self.ensure_open()?;
        Ok(self.names.clone())
    }

    fn close(&mut self) -> Result<(), ClasspathError> {
        self.ensure_open()?;
        self.closed = true;
        // Dropping the archives closes their file handles.
        self.entries.clear();
        self.locations.clear();
        self.names.clear();
        tracing::debug!(target = "kext.classpath", "closed classpath");
        Ok(())
    }
}

fn list_class_dir(dir: &std::path::Path) -> Vec<String> {
    let mut out: Vec<String> = walkdir::WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.path().extension() == Some(OsStr::new("class")))
        .filter_map(|entry| {
            let rel = entry.path().strip_prefix(dir).ok()?;
            let parts: Vec<_> = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            Some(parts.join("/"))
        })
        .collect();
    // Directory iteration order is platform dependent.
    out.sort();
    out
}

fn list_jar(archive: &mut ZipArchive<File>) -> Result<Vec<String>, ClasspathError> {
    let mut out = Vec::new();
    for i in 0..archive.len() {
        let file = archive.by_index(i)?;
        if !file.is_file() {
            continue;
        }
        let name = file.name();
        if name.ends_with(".class") {
            out.push(name.to_owned());
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_entries_are_reported() {
        let err = Classpath::open(&[ClasspathEntry::Jar(PathBuf::from("/nonexistent/dep.jar"))])
            .unwrap_err();
        assert!(matches!(err, ClasspathError::MissingEntry(_)));
    }
}
