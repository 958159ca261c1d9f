//! sbgen command-line interface.
//!
//! Generates a SLURM array-job script for the application command given
//! after `--`, expanding bracketed range expressions into one array task
//! per value combination. The script goes to stdout unless `-o` is given.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sbgen::{Generation, ScriptOptions, Value};

/// Generate a SLURM array-job script from a command line with embedded
/// range expressions.
#[derive(Parser)]
#[command(name = "sbgen", version, about)]
#[command(after_help = "\
range examples:
  [1-5]     -> 1, 2, 3, 4, 5
  [1-5:+2]  -> 1, 3, 5
  [5-1]     -> 5, 4, 3, 2, 1
  [2-8:*2]  -> 2, 4, 8
  [8-2:/2]  -> 8, 4, 2
  [0.1-0.3] -> 0.1, 0.2, 0.3
  [foo,bar] -> foo, bar
  [id]      -> the task's own array index

range groups:
  [0=1-3] defines group 0 with values 1, 2, 3; a later [0=] reuses it,
  so both argument positions vary in lockstep.

full examples:
  30 runs of ./app with x = 1..10, y = 3..5, z = 1, four at a time:
    sbgen -e OMP_NUM_THREADS=4 -l 4 -- ./app --x [1-10] -y [3-5] -z 1

  5 runs of ./app with x = y = 1, 2, 4, 8, 16 and z = the task index:
    sbgen -- ./app --x [0=1-16:*2] --y [0=] -z [id]")]
struct Cli {
    /// Extra sbatch directives, e.g. -s time=02:00:00 -s constraint=GPU
    #[arg(short = 's', long = "slurm", value_name = "ARGUMENT=VALUE")]
    slurm: Vec<String>,

    /// Environment assignments prefixed to the launched command
    #[arg(short = 'e', long = "environment", value_name = "VARIABLE=VALUE")]
    environment: Vec<String>,

    /// Maximum number of array tasks to run in parallel
    #[arg(short = 'l', long = "limit", value_name = "N")]
    limit: Option<i64>,

    /// Write the generated script to FILE instead of stdout
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    output: Option<PathBuf>,

    /// Basename for SLURM output files; full name is BASENAME_ID.out
    #[arg(short = 'u', long = "slurm-output", value_name = "BASENAME")]
    slurm_output: Option<String>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// The application and its arguments, after `--`
    #[arg(last = true, required = true, value_name = "COMMAND")]
    command: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let argstr = cli.command.join(" ");
    let opts = ScriptOptions {
        slurm: cli.slurm,
        env: cli.environment,
        parallel_limit: cli.limit,
        output_base: cli.slurm_output,
    };

    let generation = sbgen::generate(&argstr, &opts)
        .with_context(|| format!("failed to generate script for '{argstr}'"))?;

    report(&generation, &opts);

    match &cli.output {
        Some(path) => fs::write(path, &generation.script)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => print!("{}", generation.script),
    }

    Ok(())
}

/// Verbose summary of what the generated script will run.
fn report(generation: &Generation, opts: &ScriptOptions) {
    info!("total number of jobs to run: {}", generation.total_jobs);
    if !generation.dimensions.is_empty() {
        info!("translated ranges:");
        for dim in &generation.dimensions {
            info!("  {:20} -> {}", dim.raw, preview(&dim.values));
        }
    }
    if !opts.slurm.is_empty() {
        let directives: Vec<String> = opts.slurm.iter().map(|o| format!("--{o}")).collect();
        info!("additional options passed to slurm: {}", directives.join(" "));
    }
    if !opts.env.is_empty() {
        info!("additional environment variables set: {}", opts.env.join(" "));
    }
}

/// Long value sequences are elided to their first and last five entries.
fn preview(values: &[Value]) -> String {
    let rendered: Vec<String> = values.iter().map(ToString::to_string).collect();
    if rendered.len() > 10 {
        format!(
            "{}, ..., {}",
            rendered[..5].join(", "),
            rendered[rendered.len() - 5..].join(", ")
        )
    } else {
        rendered.join(", ")
    }
}
