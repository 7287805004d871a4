use std::io::Write;
use std::path::Path;

/// Writes `(internal_name, bytes)` pairs as `<dir>/<internal_name>.class`.
pub fn write_class_dir(dir: &Path, classes: &[(&str, Vec<u8>)]) {
    for (internal_name, bytes) in classes {
        let path = dir.join(format!("{internal_name}.class"));
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create class dir");
        }
        std::fs::write(&path, bytes).expect("write class file");
    }
}

/// Writes a JAR whose entries are `(entry_name, bytes)` in the given order.
pub fn write_jar(path: &Path, entries: &[(&str, Vec<u8>)]) {
    let file = std::fs::File::create(path).expect("create jar");
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::FileOptions::default();
    for (name, bytes) in entries {
        zip.start_file(*name, options).expect("start jar entry");
        zip.write_all(bytes).expect("write jar entry");
    }
    zip.finish().expect("finish jar");
}
