use kext_model::TypeUsage;

/// Which idiom a wrapper adapts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Rewrite {
    /// Leading `Map<String, *>` turned into `vararg Pair<String, *>`.
    NamedArguments,
    /// `java.lang.Class` parameters turned into `kotlin.reflect.KClass`.
    ClassToken,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WrapperParameter {
    /// Position in the wrapped method; invocation order follows it.
    pub index: usize,
    pub name: String,
    /// Declared type. For `vararg` parameters this is the element type.
    pub usage: TypeUsage,
    pub is_vararg: bool,
    /// Argument expression passed to the wrapped method.
    pub invocation: String,
}

/// A synthesized extension function, ready to render.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WrapperDeclaration {
    pub rewrite: Rewrite,
    /// Source name of the receiver type.
    pub target: String,
    pub name: String,
    pub is_deprecated: bool,
    pub is_incubating: bool,
    /// The function's own type parameters, then the receiver's.
    pub type_parameters: Vec<TypeUsage>,
    /// Receiver type arguments, `*` where a function type parameter shadows
    /// the receiver's.
    pub target_type_parameters: Vec<TypeUsage>,
    /// Declaration order.
    pub parameters: Vec<WrapperParameter>,
    pub return_type: TypeUsage,
}

/// Identity used to collapse duplicate wrappers. The rewrite and the
/// description are not part of it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DeclarationKey {
    target: String,
    name: String,
    parameters: Vec<(bool, TypeUsage)>,
}

impl WrapperDeclaration {
    pub fn key(&self) -> DeclarationKey {
        DeclarationKey {
            target: self.target.clone(),
            name: self.name.clone(),
            parameters: self
                .parameters
                .iter()
                .map(|p| (p.is_vararg, p.usage.clone()))
                .collect(),
        }
    }

    pub fn description(&self) -> String {
        let taking = match self.rewrite {
            Rewrite::ClassToken => "taking [kotlin.reflect.KClass] ",
            Rewrite::NamedArguments => "taking vararg [Pair] ",
        };
        format!(
            "Kotlin extension function {taking}for [{}.{}].",
            self.target, self.name
        )
    }

    /// Argument expressions in the wrapped method's parameter order.
    pub fn invocation_arguments(&self) -> Vec<&str> {
        let mut by_index: Vec<&WrapperParameter> = self.parameters.iter().collect();
        by_index.sort_by_key(|p| p.index);
        by_index.into_iter().map(|p| p.invocation.as_str()).collect()
    }
}
