use kext_classfile::{parse_method_signature, ClassFile, Error, ACC_PUBLIC, ACC_VARARGS};
use kext_test_utils::{ClassBuilder, MethodBuilder, DEPRECATED, NULLABLE};
use pretty_assertions::assert_eq;

#[test]
fn reads_method_headers_and_skips_bodies() {
    let bytes = ClassBuilder::new("com/example/Widget")
        .signature("<T:Ljava/lang/Number;>Ljava/lang/Object;")
        .annotation(DEPRECATED)
        .method(
            MethodBuilder::new("configure", "(Ljava/util/Map;[Ljava/lang/String;)Ljava/lang/Object;")
                .access(ACC_PUBLIC | ACC_VARARGS)
                .signature("(Ljava/util/Map<Ljava/lang/String;*>;[Ljava/lang/String;)TT;")
                .annotation(NULLABLE)
                .parameter_annotation(1, NULLABLE)
                .parameter_names(&["options", "tags"])
                .with_code(),
        )
        .build();

    let class = ClassFile::parse(&bytes).unwrap();
    assert_eq!(class.this_class, "com/example/Widget");
    assert_eq!(class.super_class.as_deref(), Some("java/lang/Object"));
    assert_eq!(
        class.signature.as_deref(),
        Some("<T:Ljava/lang/Number;>Ljava/lang/Object;")
    );
    assert_eq!(
        class.runtime_visible_annotations[0].type_name().as_deref(),
        Some("java.lang.Deprecated")
    );

    let method = &class.methods[0];
    assert_eq!(method.name, "configure");
    assert_eq!(method.access_flags & ACC_VARARGS, ACC_VARARGS);
    assert_eq!(
        method.parameter_names,
        vec![Some("options".to_string()), Some("tags".to_string())]
    );
    assert_eq!(method.parameter_annotations.len(), 2);
    assert!(method.parameter_annotations[0].is_empty());
    assert_eq!(method.parameter_annotations[1][0].type_descriptor, NULLABLE);

    let sig = parse_method_signature(method.signature.as_deref().unwrap()).unwrap();
    assert_eq!(sig.parameters.len(), 2);
}

#[test]
fn member_class_access_comes_from_inner_classes() {
    // A protected nested class is widened to public in the class header.
    let bytes = ClassBuilder::new("com/example/Outer$Nested")
        .inner_access(0x0004)
        .build();
    let class = ClassFile::parse(&bytes).unwrap();
    assert_eq!(class.access_flags & ACC_PUBLIC, ACC_PUBLIC);
    assert_eq!(class.effective_access_flags() & ACC_PUBLIC, 0);
}

#[test]
fn rejects_bad_magic_and_truncation() {
    assert!(matches!(
        ClassFile::parse(&[0, 0, 0, 0]),
        Err(Error::InvalidMagic(0))
    ));

    let bytes = ClassBuilder::new("com/example/Cut").build();
    assert!(matches!(
        ClassFile::parse(&bytes[..bytes.len() - 1]),
        Err(Error::UnexpectedEof)
    ));
}
