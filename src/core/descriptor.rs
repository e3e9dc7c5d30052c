//! Project descriptor parsing.
//!
//! A descriptor is the makefile-style `mdMake` file in every project
//! directory. Only a handful of `FIELD := value ...` assignments matter to
//! the orchestrator:
//!
//! ```text
//! # comments start with '#'
//! NAME := libcore.a
//! OUT_DIR := build
//! OUTPUT_LINK := ../publish
//! DEPENDENCIES := ../util \
//!                 ../../third_party/zlib
//! -include ../mdMake.common
//! ```
//!
//! A value whose last token ends in `\` continues on the next line.

use std::path::PathBuf;

use regex::Regex;

use crate::core::path::{with_trailing_separator, ProjectPath};
use crate::errors::{Error, Result};

pub const NAME: &str = "NAME";
pub const OUT_DIR: &str = "OUT_DIR";
pub const DEPENDENCIES: &str = "DEPENDENCIES";
pub const OUTPUT_LINK: &str = "OUTPUT_LINK";

const ASSIGNMENT: &str = ":=";
const CONTINUATION: char = '\\';

/// Raw descriptor fields of one project, exactly as declared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectDescriptor {
    /// Artifact file name; empty for aggregator projects
    pub name: String,
    /// Output directory relative to the project, `/`-terminated or empty
    pub out_dir: String,
    /// Publish directory relative to the project
    pub output_link: Option<String>,
    /// Dependency directories relative to the project
    pub dependencies: Vec<String>,
}

/// Locates and opens descriptors.
#[derive(Debug, Clone)]
pub struct DescriptorReader {
    file_name: String,
    build_rules: Regex,
}

impl DescriptorReader {
    /// `file_name` is the descriptor inside each project directory;
    /// `build_rules` the shared include that makes a root buildable.
    pub fn new(file_name: impl Into<String>, build_rules: &str) -> Result<Self> {
        let pattern = format!(r"-include.*{}", regex::escape(build_rules));
        let build_rules = Regex::new(&pattern).map_err(|e| {
            Error::config(format!("invalid build rules name `{}`: {}", build_rules, e))
        })?;

        Ok(DescriptorReader {
            file_name: file_name.into(),
            build_rules,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Location of the descriptor for `dir`.
    pub fn descriptor_path(&self, dir: &ProjectPath) -> PathBuf {
        PathBuf::from(format!("{}{}", dir, self.file_name))
    }

    /// Read the descriptor of `dir`. A missing file is fatal.
    pub fn open(&self, dir: &ProjectPath) -> Result<Descriptor> {
        let path = self.descriptor_path(dir);
        if !path.is_file() {
            return Err(Error::DescriptorNotFound { path });
        }

        let contents = std::fs::read_to_string(&path)
            .map_err(|source| Error::DescriptorRead { path, source })?;

        Ok(Descriptor {
            contents,
            build_rules: self.build_rules.clone(),
        })
    }

    /// First value of `field`, if any.
    pub fn scalar(&self, dir: &ProjectPath, field: &str) -> Result<Option<String>> {
        Ok(self.open(dir)?.scalar(field))
    }

    /// All values of `field`; `None` when absent or empty.
    pub fn list(
        &self,
        dir: &ProjectPath,
        field: &str,
        as_directory: bool,
    ) -> Result<Option<Vec<String>>> {
        Ok(self.open(dir)?.list(field, as_directory))
    }

    /// Read every field the orchestrator cares about in one pass over the file.
    pub fn read_project(&self, dir: &ProjectPath) -> Result<ProjectDescriptor> {
        Ok(self.open(dir)?.project())
    }

    /// Whether the project at `dir` pulls in the shared build rules.
    pub fn includes_build_rules(&self, dir: &ProjectPath) -> Result<bool> {
        Ok(self.open(dir)?.includes_build_rules())
    }
}

/// Contents of one descriptor file.
#[derive(Debug, Clone)]
pub struct Descriptor {
    contents: String,
    build_rules: Regex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Idle,
    ContinuingList,
}

impl Descriptor {
    /// The orchestrator's view of this descriptor.
    pub fn project(&self) -> ProjectDescriptor {
        ProjectDescriptor {
            name: self.scalar(NAME).unwrap_or_default(),
            out_dir: self.directory(OUT_DIR).unwrap_or_default(),
            output_link: self.directory(OUTPUT_LINK),
            dependencies: self.list(DEPENDENCIES, true).unwrap_or_default(),
        }
    }

    pub fn scalar(&self, field: &str) -> Option<String> {
        self.list(field, false)
            .and_then(|values| values.into_iter().next())
    }

    /// First value of `field`, read as a directory.
    pub fn directory(&self, field: &str) -> Option<String> {
        self.list(field, true)
            .and_then(|values| values.into_iter().next())
    }

    pub fn list(&self, field: &str, as_directory: bool) -> Option<Vec<String>> {
        let mut values = Vec::new();
        let mut state = ScanState::Idle;

        for line in self.code_lines() {
            let tokens = match (assigned_value(line, field), state) {
                (Some(value), _) => value,
                (None, ScanState::ContinuingList) => line,
                (None, ScanState::Idle) => continue,
            };

            let mut last_continues = None;
            for token in tokens.split_whitespace() {
                let (value, continues) = match token.strip_suffix(CONTINUATION) {
                    Some(stripped) => (stripped.trim(), true),
                    None => (token, false),
                };
                last_continues = Some(continues);

                if value.is_empty() {
                    continue;
                }
                if as_directory {
                    values.push(with_trailing_separator(value));
                } else {
                    values.push(value.to_string());
                }
            }

            // a blank line leaves the state untouched
            if let Some(continues) = last_continues {
                state = if continues {
                    ScanState::ContinuingList
                } else {
                    ScanState::Idle
                };
            }
        }

        if values.is_empty() {
            None
        } else {
            Some(values)
        }
    }

    pub fn includes_build_rules(&self) -> bool {
        self.code_lines().any(|line| self.build_rules.is_match(line))
    }

    fn code_lines(&self) -> impl Iterator<Item = &str> {
        self.contents
            .lines()
            .filter(|line| !line.trim_start().starts_with('#'))
    }
}

/// The text after `:=` when `line` assigns `field`.
fn assigned_value<'a>(line: &'a str, field: &str) -> Option<&'a str> {
    let rest = line.trim_start().strip_prefix(field)?;
    if rest.starts_with(|c: char| c.is_alphanumeric() || c == '_') {
        return None;
    }

    line.split_once(ASSIGNMENT).map(|(_, value)| value)
}
