use std::path::PathBuf;

use indexmap::IndexMap;
use smallvec::SmallVec;
use ts::file_system::resolve_from;

pub type Candidates = SmallVec<[PathBuf; 4]>;

#[derive(Debug, Clone, PartialEq, Eq)]
struct AliasPattern {
    pattern: String,
    /// Text before `*`, or the whole pattern when it has no wildcard.
    prefix: String,
    /// Text after `*`; `None` for exact patterns.
    suffix: Option<String>,
    targets: Vec<String>,
}

impl AliasPattern {
    fn new(pattern: &str, targets: &[String]) -> Self {
        let (prefix, suffix) = match pattern.split_once('*') {
            Some((prefix, suffix)) => (prefix.to_string(), Some(suffix.to_string())),
            None => (pattern.to_string(), None),
        };
        AliasPattern {
            pattern: pattern.to_string(),
            prefix,
            suffix,
            targets: targets.to_vec(),
        }
    }

    /// The text captured by `*`, or `""` for an exact match.
    fn capture<'s>(&self, specifier: &'s str) -> Option<&'s str> {
        match &self.suffix {
            None => (specifier == self.pattern).then_some(""),
            Some(suffix) => {
                if specifier.len() < self.prefix.len() + suffix.len() {
                    return None;
                }
                specifier
                    .strip_prefix(self.prefix.as_str())
                    .and_then(|rest| rest.strip_suffix(suffix.as_str()))
            }
        }
    }
}

/// The `compilerOptions.paths` table, ordered for matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasTable {
    base: PathBuf,
    patterns: Vec<AliasPattern>,
}

impl AliasTable {
    /// `base` is the directory targets are relative to: `baseUrl` when set,
    /// otherwise the directory of the config that declared `paths`.
    pub fn new(paths: &IndexMap<String, Vec<String>>, base: impl Into<PathBuf>) -> Self {
        let mut patterns: Vec<AliasPattern> = paths
            .iter()
            .map(|(pattern, targets)| AliasPattern::new(pattern, targets))
            .collect();
        // Stable: equal prefixes keep declaration order.
        patterns.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));
        AliasTable {
            base: base.into(),
            patterns,
        }
    }

    pub fn empty(base: impl Into<PathBuf>) -> Self {
        AliasTable {
            base: base.into(),
            patterns: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn base(&self) -> &std::path::Path {
        &self.base
    }

    /// Absolute paths to try for `specifier`, most specific pattern first.
    pub fn candidates(&self, specifier: &str) -> Candidates {
        let mut candidates = Candidates::new();
        for pattern in &self.patterns {
            let Some(captured) = pattern.capture(specifier) else {
                continue;
            };
            for target in &pattern.targets {
                let substituted = target.replacen('*', captured, 1);
                let candidate = resolve_from(&self.base, substituted);
                if !candidates.contains(&candidate) {
                    candidates.push(candidate);
                }
            }
        }
        candidates
    }
}
