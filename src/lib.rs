//! Translate a command line with embedded range expressions into a SLURM
//! array-job script that runs the command once per value combination.
//!
//! A range expression is a bracketed substring denoting the values one
//! argument should take across jobs:
//!
//! ```text
//! [1-5]     -> 1, 2, 3, 4, 5
//! [5-1]     -> 5, 4, 3, 2, 1
//! [1-5:+2]  -> 1, 3, 5
//! [2-8:*2]  -> 2, 4, 8
//! [8-2:/2]  -> 8, 4, 2
//! [0.1-0.3] -> 0.1, 0.2, 0.3
//! [foo,bar] -> foo, bar
//! [id]      -> the task's own array index, bound at run time
//! ```
//!
//! Named groups let several argument positions share one varying value in
//! lockstep: `[0=1-3]` defines group `0`, a later `[0=]` references it.
//!
//! The generated script declares one shell array per dimension, decomposes
//! `${SLURM_ARRAY_TASK_ID}` into per-dimension indices (first-defined
//! dimension varying fastest) and launches the substituted command via
//! `srun`, skipping tasks whose output file already exists without an
//! error marker.

pub mod ast;
pub mod error;
pub mod expand;
pub mod extract;
pub mod parser;
pub mod plan;
pub mod script;

pub use ast::{Dimension, Value};
pub use error::{Error, Result};
pub use expand::{MAX_RANGE_VALUES, expand};
pub use extract::{Extraction, extract};
pub use plan::EnumerationPlan;
pub use script::{ScriptOptions, render};

/// Everything one invocation produces: the script text plus the data the
/// CLI reports when running verbosely.
#[derive(Debug, Clone)]
pub struct Generation {
    /// The complete sbatch script
    pub script: String,
    /// Product of all dimension sizes
    pub total_jobs: u64,
    /// Expanded dimensions, in definition order
    pub dimensions: Vec<Dimension>,
}

/// Run the full pipeline: extract range expressions, expand each spec,
/// plan the enumeration and render the script.
///
/// Pure and deterministic in `argstr` and `opts`; no I/O happens here.
pub fn generate(argstr: &str, opts: &ScriptOptions) -> Result<Generation> {
    let extraction = extract(argstr)?;
    let dimensions: Vec<Dimension> = extraction
        .specs
        .iter()
        .map(|spec| expand(spec))
        .collect::<Result<_>>()?;
    let plan = EnumerationPlan::new(dimensions.iter().map(|d| d.values.len()))?;
    let script = render(argstr, &extraction.substituted, &dimensions, &plan, opts)?;
    Ok(Generation {
        script,
        total_jobs: plan.total(),
        dimensions,
    })
}
