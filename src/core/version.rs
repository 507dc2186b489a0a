use std::fmt;
use std::str::FromStr;

use anyhow::{Context, bail};

/// Release version, ordered by major, minor, then patch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    /// Parse "0.4.1", also accepting a leading "v" and whitespace
    pub fn parse(s: &str) -> anyhow::Result<Self> {
        s.parse()
    }

    /// Version of this crate; 0.0.0 if the package version is not numeric
    pub fn current() -> Self {
        Self::parse(env!("CARGO_PKG_VERSION")).unwrap_or_default()
    }

    pub fn is_newer_than(&self, other: &Version) -> bool {
        self > other
    }
}

impl FromStr for Version {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let trimmed = s.trim().trim_start_matches('v');
        let mut numbers = trimmed.split('.').map(|part| {
            part.parse::<u32>()
                .with_context(|| format!("Invalid version component '{}' in '{}'", part, s))
        });

        let (Some(major), Some(minor), Some(patch), None) =
            (numbers.next(), numbers.next(), numbers.next(), numbers.next())
        else {
            bail!("Expected MAJOR.MINOR.PATCH, got '{}'", s);
        };

        Ok(Self {
            major: major?,
            minor: minor?,
            patch: patch?,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
