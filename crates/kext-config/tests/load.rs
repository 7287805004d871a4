use std::path::PathBuf;

use kext_config::{ConfigError, GeneratorConfig, HeaderConfig, LoggingConfig, MarkersConfig};
use pretty_assertions::assert_eq;

#[test]
fn empty_config_uses_defaults() {
    let config = GeneratorConfig::from_toml_str("").unwrap();
    assert_eq!(config, GeneratorConfig::default());
    assert_eq!(config.header.package, "org.gradle.kotlin.dsl");
    assert_eq!(config.header.jvm_name, "GradleApiKotlinDslExtensions");
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.markers.nullable, None);
}

#[test]
fn parses_every_section() {
    let config = GeneratorConfig::from_toml_str(
        r#"
classpath = ["classes", "/opt/libs/api.jar"]
includes = ["org/acme/**"]
excludes = ["**/internal/**"]
parameter_names = "names.properties"

[header]
package = "org.acme.kotlin"
jvm_name = "AcmeExtensions"

[markers]
nullable = ["com.acme.Maybe"]

[logging]
level = "kext.codegen=trace"
json = true
"#,
    )
    .unwrap();

    assert_eq!(
        config,
        GeneratorConfig {
            classpath: vec![PathBuf::from("classes"), PathBuf::from("/opt/libs/api.jar")],
            includes: vec!["org/acme/**".to_owned()],
            excludes: vec!["**/internal/**".to_owned()],
            parameter_names: Some(PathBuf::from("names.properties")),
            header: HeaderConfig {
                package: "org.acme.kotlin".to_owned(),
                jvm_name: "AcmeExtensions".to_owned(),
            },
            markers: MarkersConfig {
                nullable: Some(vec!["com.acme.Maybe".to_owned()]),
                ..MarkersConfig::default()
            },
            logging: LoggingConfig {
                level: "kext.codegen=trace".to_owned(),
                json: true,
                file: None,
            },
        }
    );
}

#[test]
fn unknown_keys_are_rejected() {
    let err = GeneratorConfig::from_toml_str("clas_path = []").unwrap_err();
    assert!(matches!(err, ConfigError::Toml(_)));
}

#[test]
fn relative_paths_resolve_against_the_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kext.toml");
    std::fs::write(
        &path,
        "classpath = [\"classes\", \"/abs/api.jar\"]\nparameter_names = \"names.properties\"\n",
    )
    .unwrap();

    let config = GeneratorConfig::load_from_path(&path).unwrap();
    assert_eq!(
        config.classpath,
        vec![dir.path().join("classes"), PathBuf::from("/abs/api.jar")]
    );
    assert_eq!(config.parameter_names, Some(dir.path().join("names.properties")));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = GeneratorConfig::load_from_path(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}
