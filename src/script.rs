use std::hash::Hasher;

use rustc_hash::FxHasher;

use crate::ast::{Dimension, TASK_ID_VAR};
use crate::error::{Error, Result};
use crate::plan::EnumerationPlan;

/// Pass-through options consumed by the script emitter.
#[derive(Debug, Clone, Default)]
pub struct ScriptOptions {
    /// Extra `#SBATCH --…` directives, one per entry (e.g. `time=02:00:00`)
    pub slurm: Vec<String>,
    /// `VARIABLE=VALUE` assignments prefixed to the launched command
    pub env: Vec<String>,
    /// Maximum number of array tasks running concurrently
    pub parallel_limit: Option<i64>,
    /// Basename for SLURM output files; defaults to a digest of the
    /// substituted command for reproducible naming
    pub output_base: Option<String>,
}

/// Render the sbatch script text.
///
/// The whole script is built in memory, so a failed generation never
/// leaves partial output behind.
pub fn render(
    original: &str,
    substituted: &str,
    dimensions: &[Dimension],
    plan: &EnumerationPlan,
    opts: &ScriptOptions,
) -> Result<String> {
    if let Some(limit) = opts.parallel_limit {
        if limit <= 0 {
            return Err(Error::InvalidParallelismLimit(limit));
        }
    }

    let base = match &opts.output_base {
        Some(base) => base.clone(),
        None => digest(substituted),
    };
    let total = plan.total();

    let mut script = String::new();

    // header
    script.push_str("#!/bin/bash -l\n");
    for opt in &opts.slurm {
        script.push_str(&format!("#SBATCH --{opt}\n"));
    }
    match opts.parallel_limit {
        Some(limit) => script.push_str(&format!("#SBATCH --array=0-{}%{limit}\n", total - 1)),
        None => script.push_str(&format!("#SBATCH --array=0-{}\n", total - 1)),
    }
    script.push_str(&format!("#SBATCH --output={base}_%a.out\n\n"));

    script.push_str("# sbatch script generated by sbgen using arguments:\n");
    script.push_str(&format!("# {original}\n\n"));

    // one array literal per dimension, values in definition order
    for (i, dim) in dimensions.iter().enumerate() {
        let values: Vec<String> = dim.values.iter().map(ToString::to_string).collect();
        script.push_str(&format!("varray{i}=({})\n", values.join(" ")));
    }
    script.push('\n');

    // mixed-radix decomposition of the task index, first dimension is the
    // fastest-varying digit
    script.push_str(&format!("r={TASK_ID_VAR}\n"));
    for (i, dim) in dimensions.iter().enumerate() {
        let len = dim.values.len();
        script.push_str(&format!("d=$(($r/{len}))\n"));
        script.push_str(&format!("i{i}=$(($r - $d*{len}))\n"));
        script.push_str("r=$d\n");
        script.push_str(&format!("v{i}=${{varray{i}[${{i{i}}}]}}\n\n"));
    }

    // relaunch only tasks whose output is missing, empty, or marked failed
    script.push_str(&format!(
        "if [ ! -s \"{base}_{TASK_ID_VAR}.out\" ] || \
         [ -n \"$(grep -l 'srun: error' \"{base}_{TASK_ID_VAR}.out\")\" ]\n"
    ));
    script.push_str("then\n");
    let env_prefix = if opts.env.is_empty() {
        String::new()
    } else {
        format!("{} ", opts.env.join(" "))
    };
    script.push_str(&format!("    {env_prefix}srun {substituted}\n"));
    script.push_str("fi\n");

    Ok(script)
}

/// Deterministic hex digest of the substituted argument string, used as
/// the output-file basename when none is given.
fn digest(substituted: &str) -> String {
    let mut hasher = FxHasher::default();
    hasher.write(substituted.as_bytes());
    format!("{:016x}", hasher.finish())
}

#[cfg(test)]
mod tests {
    use crate::ast::Value;

    use super::*;

    fn dim(raw: &str, values: Vec<Value>) -> Dimension {
        Dimension {
            raw: raw.to_string(),
            values,
            truncated: false,
        }
    }

    fn sample_dimensions() -> Vec<Dimension> {
        vec![
            dim("1-3", vec![Value::Int(1), Value::Int(2), Value::Int(3)]),
            dim(
                "foo,bar",
                vec![Value::Word("foo".into()), Value::Word("bar".into())],
            ),
        ]
    }

    fn sample_plan(dimensions: &[Dimension]) -> EnumerationPlan {
        EnumerationPlan::new(dimensions.iter().map(|d| d.values.len())).unwrap()
    }

    #[test]
    fn test_sections_appear_in_order() {
        let dimensions = sample_dimensions();
        let plan = sample_plan(&dimensions);
        let opts = ScriptOptions {
            slurm: vec!["time=02:00:00".into()],
            output_base: Some("run".into()),
            ..Default::default()
        };
        let script = render("./app [1-3] [foo,bar]", "./app ${v0} ${v1}", &dimensions, &plan, &opts)
            .unwrap();

        let landmarks = [
            "#!/bin/bash -l\n",
            "#SBATCH --time=02:00:00\n",
            "#SBATCH --array=0-5\n",
            "#SBATCH --output=run_%a.out\n",
            "# ./app [1-3] [foo,bar]\n",
            "varray0=(1 2 3)\n",
            "varray1=(foo bar)\n",
            "r=${SLURM_ARRAY_TASK_ID}\n",
            "d=$(($r/3))\n",
            "i0=$(($r - $d*3))\n",
            "v0=${varray0[${i0}]}\n",
            "i1=$(($r - $d*2))\n",
            "if [ ! -s \"run_${SLURM_ARRAY_TASK_ID}.out\" ]",
            "    srun ./app ${v0} ${v1}\n",
            "fi\n",
        ];
        let mut offset = 0;
        for landmark in landmarks {
            let at = script[offset..]
                .find(landmark)
                .unwrap_or_else(|| panic!("missing or out of order: {landmark:?}"));
            offset += at + landmark.len();
        }
    }

    #[test]
    fn test_parallel_limit_throttles_the_array() {
        let dimensions = sample_dimensions();
        let plan = sample_plan(&dimensions);
        let opts = ScriptOptions {
            parallel_limit: Some(4),
            ..Default::default()
        };
        let script = render("./app", "./app", &dimensions, &plan, &opts).unwrap();
        assert!(script.contains("#SBATCH --array=0-5%4\n"));
    }

    #[test]
    fn test_non_positive_limit_is_rejected() {
        let dimensions = sample_dimensions();
        let plan = sample_plan(&dimensions);
        for limit in [0, -3] {
            let opts = ScriptOptions {
                parallel_limit: Some(limit),
                ..Default::default()
            };
            let err = render("./app", "./app", &dimensions, &plan, &opts).unwrap_err();
            assert!(matches!(err, Error::InvalidParallelismLimit(l) if l == limit));
        }
    }

    #[test]
    fn test_env_assignments_prefix_the_invocation() {
        let dimensions = sample_dimensions();
        let plan = sample_plan(&dimensions);
        let opts = ScriptOptions {
            env: vec!["OMP_NUM_THREADS=4".into(), "OMP_PROC_BIND=spread".into()],
            ..Default::default()
        };
        let script = render("./app ${v0}", "./app ${v0}", &dimensions, &plan, &opts).unwrap();
        assert!(script.contains("    OMP_NUM_THREADS=4 OMP_PROC_BIND=spread srun ./app ${v0}\n"));
    }

    #[test]
    fn test_default_basename_is_a_stable_digest() {
        let dimensions = sample_dimensions();
        let plan = sample_plan(&dimensions);
        let opts = ScriptOptions::default();
        let a = render("./app [1-3] [foo,bar]", "./app ${v0} ${v1}", &dimensions, &plan, &opts)
            .unwrap();
        let b = render("./app [1-3] [foo,bar]", "./app ${v0} ${v1}", &dimensions, &plan, &opts)
            .unwrap();
        assert_eq!(a, b);

        let base = digest("./app ${v0} ${v1}");
        assert_eq!(base.len(), 16);
        assert!(base.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(a.contains(&format!("#SBATCH --output={base}_%a.out\n")));
    }

    #[test]
    fn test_no_dimensions_still_renders_one_task() {
        let plan = EnumerationPlan::new([]).unwrap();
        let opts = ScriptOptions::default();
        let script = render("./app", "./app", &[], &plan, &opts).unwrap();
        assert!(script.contains("#SBATCH --array=0-0\n"));
        assert!(script.contains("    srun ./app\n"));
    }
}
