//! The one thing mdmake does: build or clean a project tree.

use anyhow::{Context, Result};

use crate::cli::{Cli, Invocation};
use mdmake::builder::MakeStep;
use mdmake::core::{DescriptorReader, ProjectPath, Target};
use mdmake::ops::{Mode, RunOptions, TargetRunner};
use mdmake::util::config::{global_config_path, load_config, project_config_path};
use mdmake::util::shell::{ColorChoice, Shell, Status, Verbosity};
use mdmake::Error;

pub fn execute(cli: Cli, shell: &Shell) -> Result<()> {
    let invocation = Invocation::parse(&cli.args);

    // targets are checked before anything touches the filesystem
    let requested = match invocation.targets {
        Some(ref value) => {
            let targets = Target::parse_list(value)?;
            if targets.is_empty() {
                return Err(Error::config("TARGETS= does not name any target").into());
            }
            Some(targets)
        }
        None => None,
    };

    let mode = Mode::from_flags(
        invocation.clean,
        invocation.clean_deps,
        invocation.clean_all,
        invocation.rebuild,
    )?;

    let root_dir = invocation
        .root
        .clone()
        .unwrap_or_else(|| std::path::PathBuf::from("."));
    let root_dir = root_dir
        .canonicalize()
        .with_context(|| format!("failed to resolve project root: {}", root_dir.display()))?;

    let config = load_config(
        global_config_path().as_deref(),
        &project_config_path(&root_dir),
    );

    let targets = match requested {
        Some(targets) => targets,
        None => {
            let target = match config.build.default_target {
                Some(ref name) => name.parse::<Target>()?,
                None => Target::default(),
            };
            shell.warn(format!("no TARGETS= given, using `{}`", target));
            vec![target]
        }
    };

    let program = cli.make.as_deref().unwrap_or(config.program());
    let mut passthrough = config.build.extra_args.clone();
    passthrough.extend(invocation.passthrough);

    let mut step = MakeStep::new(program, config.descriptor())
        .with_passthrough(passthrough)
        .resolve_program()?;
    let reader = DescriptorReader::new(config.descriptor(), config.build_rules())?;

    let options = RunOptions {
        root: ProjectPath::new(root_dir.to_string_lossy()),
        targets,
        mode,
        extra_info: invocation.extra_info,
    };
    tracing::debug!("running {:?} for {:?} in {}", options.mode, options.targets, options.root);

    let summary = TargetRunner::new(&reader, &mut step, shell).run(&options)?;

    let noun = if summary.invocations() == 1 { "step" } else { "steps" };
    shell.status(
        Status::Finished,
        format!("{} {} for {}", summary.invocations(), noun, describe_targets(&options.targets)),
    );

    Ok(())
}

/// The shell for a run, before arguments are sorted.
pub fn shell_for(cli: &Cli) -> Shell {
    let extra_info = cli.args.iter().any(|arg| arg == "extrainfo");
    let verbosity = if cli.verbose || extra_info {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    };
    let color = if cli.no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };

    Shell::new(verbosity, color)
}

fn describe_targets(targets: &[Target]) -> String {
    targets
        .iter()
        .map(Target::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
