use crate::error::Result;
use regex::Regex;
use semver::Version;
use std::sync::OnceLock;

/// Parsed semantic version of a tag
pub type SemanticVersion = Version;

fn lenient_version_regex() -> &'static Regex {
    static LENIENT: OnceLock<Regex> = OnceLock::new();
    LENIENT.get_or_init(|| {
        Regex::new(r"^(\d+)(?:\.(\d+))?(?:\.(\d+))?(?:-([^+]+))?(?:\+(.+))?$")
            .expect("static version regex is valid")
    })
}

/// Compiled tag prefix pattern (e.g. "[vV]", "release-")
///
/// The prefix is optional: with prefix `v` both "v1.2.3" and "1.2.3" parse.
#[derive(Debug, Clone)]
pub struct TagPrefix {
    pattern: String,
    regex: Regex,
}

impl TagPrefix {
    /// Compile a prefix pattern
    ///
    /// # Returns
    /// * `Err` - If the pattern is not a valid regular expression
    pub fn new(pattern: impl Into<String>) -> Result<Self> {
        let pattern = pattern.into();
        let regex = Regex::new(&format!("^(?:{})?(?P<version>.*)$", pattern))?;
        Ok(TagPrefix { pattern, regex })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Parse a tag name as a semantic version
    ///
    /// Returns `None` when the remainder after the prefix is not a version.
    /// Strict semver is tried first; `1` and `1.2` are accepted with the
    /// missing components set to 0.
    pub fn parse(&self, tag_name: &str) -> Option<SemanticVersion> {
        let rest = self.regex.captures(tag_name)?.name("version")?.as_str();
        if rest.is_empty() {
            return None;
        }

        if let Ok(version) = Version::parse(rest) {
            return Some(version);
        }

        let captures = lenient_version_regex().captures(rest)?;
        let part = |i: usize| captures.get(i).map(|m| m.as_str());

        let mut normalized = format!(
            "{}.{}.{}",
            part(1)?.parse::<u64>().ok()?,
            part(2).unwrap_or("0").parse::<u64>().ok()?,
            part(3).unwrap_or("0").parse::<u64>().ok()?
        );
        if let Some(pre) = part(4) {
            normalized.push('-');
            normalized.push_str(pre);
        }
        if let Some(build) = part(5) {
            normalized.push('+');
            normalized.push_str(build);
        }

        Version::parse(&normalized).ok()
    }
}

impl Default for TagPrefix {
    fn default() -> Self {
        TagPrefix::new("[vV]").expect("default tag prefix is valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_prefix() {
        let prefix = TagPrefix::new("v").unwrap();
        assert_eq!(prefix.parse("v1.2.3"), Some(Version::new(1, 2, 3)));
    }

    #[test]
    fn test_prefix_is_optional() {
        let prefix = TagPrefix::new("v").unwrap();
        let version = prefix.parse("1.2.3-beta.1").unwrap();
        assert_eq!(version.to_string(), "1.2.3-beta.1");
    }

    #[test]
    fn test_non_versions_are_skipped() {
        let prefix = TagPrefix::new("v").unwrap();
        assert_eq!(prefix.parse("not-a-version"), None);
        assert_eq!(prefix.parse("release-1.2.3"), None);
        assert_eq!(prefix.parse("v"), None);
    }

    #[test]
    fn test_release_prefix() {
        let prefix = TagPrefix::new("release-").unwrap();
        assert_eq!(prefix.parse("release-1.2.3"), Some(Version::new(1, 2, 3)));
        assert_eq!(prefix.parse("not-a-version"), None);
    }

    #[test]
    fn test_lenient_short_forms() {
        let prefix = TagPrefix::default();
        assert_eq!(prefix.parse("v2"), Some(Version::new(2, 0, 0)));
        assert_eq!(prefix.parse("V1.4"), Some(Version::new(1, 4, 0)));
        assert_eq!(prefix.parse("v1.4-rc.1").unwrap().to_string(), "1.4.0-rc.1");
    }

    #[test]
    fn test_build_metadata_kept() {
        let prefix = TagPrefix::default();
        let version = prefix.parse("v1.0.0+build.7").unwrap();
        assert_eq!(version.build.as_str(), "build.7");
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(TagPrefix::new("(unclosed").is_err());
    }
}
