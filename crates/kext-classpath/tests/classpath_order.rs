use kext_classpath::{ByteSource, Classpath, ClasspathEntry, ClasspathError};
use kext_test_utils::{write_class_dir, write_jar, ClassBuilder};
use tempfile::TempDir;

#[test]
fn first_entry_wins_on_duplicate_classes() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("classes");
    let jar = tmp.path().join("dep.jar");

    let from_dir = ClassBuilder::new("com/example/Dupe").build();
    let from_jar = ClassBuilder::new("com/example/Dupe")
        .implements("java/lang/Runnable")
        .build();
    write_class_dir(&dir, &[("com/example/Dupe", from_dir.clone())]);
    write_jar(
        &jar,
        &[
            ("com/example/Dupe.class", from_jar.clone()),
            ("com/example/Other$Nested.class", ClassBuilder::new("com/example/Other$Nested").build()),
            ("com/example/Other$1.class", ClassBuilder::new("com/example/Other$1").build()),
            ("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0\n".to_vec()),
        ],
    );

    let cp = Classpath::open(&[ClasspathEntry::ClassDir(dir.clone()), ClasspathEntry::Jar(jar.clone())])
        .unwrap();
    assert_eq!(
        cp.class_names().unwrap(),
        vec!["com.example.Dupe".to_string(), "com.example.Other.Nested".to_string()]
    );
    assert_eq!(cp.class_bytes("com.example.Dupe").unwrap(), Some(from_dir));
    assert!(cp.class_bytes("com.example.Other$Nested").unwrap().is_none());

    let cp = Classpath::open(&[ClasspathEntry::Jar(jar), ClasspathEntry::ClassDir(dir)]).unwrap();
    assert_eq!(cp.class_bytes("com.example.Dupe").unwrap(), Some(from_jar));
}

#[test]
fn enumeration_reads_bytes_lazily_in_order() {
    let tmp = TempDir::new().unwrap();
    let jar = tmp.path().join("dep.jar");
    write_jar(
        &jar,
        &[
            ("b/B.class", ClassBuilder::new("b/B").build()),
            ("a/A.class", ClassBuilder::new("a/A").build()),
        ],
    );

    let cp = Classpath::open(&[ClasspathEntry::from_path(&jar)]).unwrap();
    let names: Vec<String> = cp
        .all_class_bytes()
        .unwrap()
        .map(|item| item.unwrap().0)
        .collect();
    assert_eq!(names, vec!["b.B".to_string(), "a.A".to_string()]);
}

#[test]
fn closed_classpath_rejects_every_operation() {
    let tmp = TempDir::new().unwrap();
    let jar = tmp.path().join("dep.jar");
    write_jar(&jar, &[("a/A.class", ClassBuilder::new("a/A").build())]);

    let mut cp = Classpath::open(&[ClasspathEntry::Jar(jar)]).unwrap();
    cp.close().unwrap();

    assert!(matches!(cp.class_bytes("a.A"), Err(ClasspathError::Closed)));
    assert!(matches!(cp.class_names(), Err(ClasspathError::Closed)));
    assert!(matches!(cp.all_class_bytes().err(), Some(ClasspathError::Closed)));
    assert!(matches!(cp.close(), Err(ClasspathError::Closed)));
}

#[test]
fn declared_entry_sizes_are_not_trusted() {
    let tmp = TempDir::new().unwrap();
    let jar = tmp.path().join("dep.jar");
    let class = ClassBuilder::new("a/A").build();
    write_jar(&jar, &[("a/A.class", class.clone())]);

    // Central directory header: uncompressed size at offset 24.
    let mut bytes = std::fs::read(&jar).unwrap();
    let header = bytes
        .windows(4)
        .position(|w| w == b"PK\x01\x02")
        .unwrap();
    bytes[header + 24..header + 28].copy_from_slice(&0xFFFF_FFF0u32.to_le_bytes());
    std::fs::write(&jar, &bytes).unwrap();

    let cp = Classpath::open(&[ClasspathEntry::from_path(&jar)]).unwrap();
    assert_eq!(cp.class_bytes("a.A").unwrap(), Some(class));
}
