use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::GenerateError;

/// Include/exclude globs over slash-separated type names
/// (`org/gradle/api/**`). No includes means every type is included.
#[derive(Clone, Debug)]
pub struct TypeFilter {
    includes: Option<GlobSet>,
    excludes: GlobSet,
}

impl TypeFilter {
    pub fn new(includes: &[String], excludes: &[String]) -> Result<Self, GenerateError> {
        let includes = if includes.is_empty() {
            None
        } else {
            Some(build(includes)?)
        };
        Ok(Self {
            includes,
            excludes: build(excludes)?,
        })
    }

    /// Matches against the slash form of a source name (`a.b.C` -> `a/b/C`).
    pub fn accepts(&self, source_name: &str) -> bool {
        let path = source_name.replace('.', "/");
        let included = self
            .includes
            .as_ref()
            .map_or(true, |includes| includes.is_match(&path));
        included && !self.excludes.is_match(&path)
    }
}

fn build(patterns: &[String]) -> Result<GlobSet, GenerateError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|source| GenerateError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| GenerateError::InvalidPattern {
        pattern: patterns.join(", "),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns(p: &[&str]) -> Vec<String> {
        p.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn single_star_stays_within_a_package() {
        let filter = TypeFilter::new(&patterns(&["org/gradle/api/*"]), &[]).unwrap();
        assert!(filter.accepts("org.gradle.api.Project"));
        assert!(!filter.accepts("org.gradle.api.tasks.Copy"));
    }

    #[test]
    fn excludes_win_over_includes() {
        let filter = TypeFilter::new(
            &patterns(&["org/gradle/**"]),
            &patterns(&["org/gradle/internal/**"]),
        )
        .unwrap();
        assert!(filter.accepts("org.gradle.api.Project"));
        assert!(!filter.accepts("org.gradle.internal.Factory"));
        assert!(!filter.accepts("com.acme.Other"));
    }

    #[test]
    fn empty_includes_accept_everything() {
        let filter = TypeFilter::new(&[], &patterns(&["**/internal/**"])).unwrap();
        assert!(filter.accepts("com.acme.Other"));
        assert!(!filter.accepts("com.acme.internal.Hidden"));
    }

    #[test]
    fn invalid_patterns_are_reported() {
        let err = TypeFilter::new(&patterns(&["org/[gradle"]), &[]).unwrap_err();
        assert!(matches!(err, GenerateError::InvalidPattern { ref pattern, .. } if pattern == "org/[gradle"));
    }
}
