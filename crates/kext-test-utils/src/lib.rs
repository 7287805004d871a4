//! Utilities shared by kext tests.
//!
//! Tests build class files in memory with [`ClassBuilder`] instead of
//! checking in compiled fixtures, and lay them out on disk with the helpers
//! in [`fixtures`](crate::fixtures).

mod class_builder;
mod fixtures;

pub use class_builder::{ClassBuilder, MethodBuilder};
pub use fixtures::{write_class_dir, write_jar};

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_PRIVATE: u16 = 0x0002;
pub const ACC_PROTECTED: u16 = 0x0004;
pub const ACC_STATIC: u16 = 0x0008;
pub const ACC_BRIDGE: u16 = 0x0040;
pub const ACC_VARARGS: u16 = 0x0080;
pub const ACC_INTERFACE: u16 = 0x0200;
pub const ACC_ABSTRACT: u16 = 0x0400;
pub const ACC_SYNTHETIC: u16 = 0x1000;

pub const DEPRECATED: &str = "Ljava/lang/Deprecated;";
pub const NULLABLE: &str = "Ljavax/annotation/Nullable;";
pub const INCUBATING: &str = "Lorg/gradle/api/Incubating;";
