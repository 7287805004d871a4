use std::hash::{Hash, Hasher};

use crate::names;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Variance {
    #[default]
    Invariant,
    /// `? extends T`, rendered `out T`.
    Covariant,
    /// `? super T`, rendered `in T`.
    Contravariant,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UsageKind {
    /// A class, interface or built-in reference (arrays included).
    Class,
    TypeVariable,
    /// Unbounded wildcard.
    Star,
}

/// An occurrence of a type: a parameter type, a return type, a type argument,
/// a bound or a declared type parameter.
///
/// Equality and hashing look at the rendered shape only: name, nullability,
/// variance, arguments, bounds and raw-ness.
#[derive(Clone, Debug)]
pub struct TypeUsage {
    pub source_name: String,
    pub kind: UsageKind,
    pub is_nullable: bool,
    pub variance: Variance,
    pub type_arguments: Vec<TypeUsage>,
    pub bounds: Vec<TypeUsage>,
    /// Type parameters declared by the referenced type (0 for variables,
    /// stars and non-generic types).
    pub declared_arity: usize,
}

impl TypeUsage {
    pub fn class(source_name: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            kind: UsageKind::Class,
            is_nullable: false,
            variance: Variance::Invariant,
            type_arguments: Vec::new(),
            bounds: Vec::new(),
            declared_arity: 0,
        }
    }

    pub fn type_variable(name: impl Into<String>) -> Self {
        Self {
            kind: UsageKind::TypeVariable,
            ..Self::class(name)
        }
    }

    pub fn star() -> Self {
        Self {
            kind: UsageKind::Star,
            ..Self::class(names::STAR)
        }
    }

    pub fn with_arguments(mut self, type_arguments: Vec<TypeUsage>) -> Self {
        self.declared_arity = self.declared_arity.max(type_arguments.len());
        self.type_arguments = type_arguments;
        self
    }

    pub fn with_arity(mut self, declared_arity: usize) -> Self {
        self.declared_arity = declared_arity;
        self
    }

    pub fn with_variance(mut self, variance: Variance) -> Self {
        self.variance = variance;
        self
    }

    pub fn nullable(mut self, is_nullable: bool) -> Self {
        self.is_nullable = is_nullable;
        self
    }

    /// No type arguments and nothing declared that could take any.
    pub fn is_raw(&self) -> bool {
        self.type_arguments.is_empty() && self.declared_arity == 0
    }

    /// A generic type used without arguments (`List` instead of `List<X>`).
    /// Rendered with one `*` per declared type parameter.
    pub fn needs_star_projection(&self) -> bool {
        self.kind == UsageKind::Class && self.type_arguments.is_empty() && self.declared_arity > 0
    }

    pub fn is_star(&self) -> bool {
        self.kind == UsageKind::Star
    }

    pub fn is_named(&self, source_name: &str) -> bool {
        self.kind == UsageKind::Class && self.source_name == source_name
    }

    /// Element type of `kotlin.Array<E>`.
    pub fn array_element(&self) -> Option<&TypeUsage> {
        if self.is_named(names::KOTLIN_ARRAY) {
            self.type_arguments.first()
        } else {
            None
        }
    }
}

impl PartialEq for TypeUsage {
    fn eq(&self, other: &Self) -> bool {
        self.source_name == other.source_name
            && self.is_nullable == other.is_nullable
            && self.variance == other.variance
            && self.type_arguments == other.type_arguments
            && self.bounds == other.bounds
            && self.is_raw() == other.is_raw()
    }
}

impl Eq for TypeUsage {}

impl Hash for TypeUsage {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source_name.hash(state);
        self.is_nullable.hash(state);
        self.variance.hash(state);
        self.type_arguments.hash(state);
        self.bounds.hash(state);
        self.is_raw().hash(state);
    }
}
