//! CLI definitions using clap.

use std::path::{Path, PathBuf};

use clap::Parser;

/// mdmake - build a tree of makefile projects, dependencies first
#[derive(Parser)]
#[command(name = "mdmake")]
#[command(author, version, about, long_about = None)]
#[command(after_help = KEYWORDS_HELP)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// External build program (overrides `step.program`)
    #[arg(long, value_name = "PROGRAM")]
    pub make: Option<String>,

    /// [ROOT] [TARGETS=...] [clean|cleandeps|cleanall|rebuild|extrainfo] [ARGS...]
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "ARGS")]
    pub args: Vec<String>,
}

const KEYWORDS_HELP: &str = "\
Keywords:
  TARGETS=<a,b,...>  Targets to process in order (debug, release, optdebug)
  clean              Clean the root project
  cleandeps          Clean every dependency, not the root
  cleanall           cleandeps, then clean
  rebuild            cleanall, then build everything
  extrainfo          Print the dependency graph and every command run

ROOT is taken from the first argument when it names an existing directory.
Any other argument is handed to every external step unchanged.";

pub const TARGETS_PREFIX: &str = "TARGETS=";

/// Positional arguments sorted into what they mean.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Invocation {
    pub root: Option<PathBuf>,
    /// Raw value of `TARGETS=`
    pub targets: Option<String>,
    pub clean: bool,
    pub clean_deps: bool,
    pub clean_all: bool,
    pub rebuild: bool,
    pub extra_info: bool,
    pub passthrough: Vec<String>,
}

impl Invocation {
    pub fn parse(args: &[String]) -> Self {
        let mut invocation = Invocation::default();
        let mut rest = args;

        if let Some((first, tail)) = args.split_first() {
            if Path::new(first).is_dir() {
                invocation.root = Some(PathBuf::from(first));
                rest = tail;
            }
        }

        for arg in rest {
            if let Some(value) = arg.strip_prefix(TARGETS_PREFIX) {
                invocation.targets = Some(value.to_string());
                continue;
            }

            match arg.as_str() {
                "clean" => invocation.clean = true,
                "cleandeps" => invocation.clean_deps = true,
                "cleanall" => invocation.clean_all = true,
                "rebuild" => invocation.rebuild = true,
                "extrainfo" => invocation.extra_info = true,
                _ => invocation.passthrough.push(arg.clone()),
            }
        }

        invocation
    }
}
