//! Build configurations a run can be asked for.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::errors::{Error, Result};

/// One of the fixed build configurations understood by the shared rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Target {
    Debug,
    Release,
    /// Optimized build that keeps debug information.
    #[default]
    OptimizedDebug,
}

impl Target {
    /// Identifier passed to the external step and used in artifact paths.
    pub fn as_str(&self) -> &'static str {
        match self {
            Target::Debug => "debug",
            Target::Release => "release",
            Target::OptimizedDebug => "optdebug",
        }
    }

    /// Parse the value of `TARGETS=`, a comma separated list.
    ///
    /// Every entry is validated before anything runs.
    pub fn parse_list(value: &str) -> Result<Vec<Target>> {
        value
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::parse)
            .collect()
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Target {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl FromStr for Target {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "debug" => Ok(Target::Debug),
            "release" => Ok(Target::Release),
            "optdebug" | "optimized-debug" => Ok(Target::OptimizedDebug),
            _ => Err(Error::config(format!("unknown target type \"{}\"", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_targets() {
        assert_eq!("debug".parse::<Target>().unwrap(), Target::Debug);
        assert_eq!(
            "optimized-debug".parse::<Target>().unwrap(),
            Target::OptimizedDebug
        );
        assert_eq!(Target::OptimizedDebug.to_string(), "optdebug");
        assert_eq!(Target::default(), Target::OptimizedDebug);
    }

    #[test]
    fn test_parse_list_keeps_order() {
        let targets = Target::parse_list("release,debug,optdebug").unwrap();
        assert_eq!(
            targets,
            vec![Target::Release, Target::Debug, Target::OptimizedDebug]
        );
    }

    #[test]
    fn test_unknown_target_is_config_error() {
        let err = Target::parse_list("debug,fast").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
        assert_eq!(err.to_string(), "unknown target type \"fast\"");
    }
}
