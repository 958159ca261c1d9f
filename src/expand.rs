use tracing::warn;

use crate::ast::{Dimension, NumRange, RangeBody, Scalar, StepOp, Value};
use crate::error::{Error, Result};
use crate::parser::RangeParser;

/// Safety cap on the number of values a single numeric range may produce.
/// A non-converging step (e.g. `*1` or `+0`) truncates here with a warning
/// instead of looping forever.
pub const MAX_RANGE_VALUES: usize = 10_000;

/// Expand one range spec into its ordered sequence of concrete values.
///
/// The body is handed over exactly as written between the brackets; no
/// whitespace trimming happens here.
pub fn expand(raw: &str) -> Result<Dimension> {
    let (values, truncated) = match RangeParser::parse_body(raw)? {
        RangeBody::TaskId => (vec![Value::TaskId], false),
        RangeBody::List(items) => (items.into_iter().map(Value::Word).collect(), false),
        RangeBody::Numeric(nr) => expand_numeric(raw, &nr)?,
    };
    if truncated {
        warn!("range '{raw}' cut at {MAX_RANGE_VALUES} values");
    }
    Ok(Dimension {
        raw: raw.to_string(),
        values,
        truncated,
    })
}

fn expand_numeric(raw: &str, nr: &NumRange) -> Result<(Vec<Value>, bool)> {
    if nr.op == StepOp::Div && nr.step.as_f64() == 0.0 {
        return Err(Error::InvalidRange(raw.to_string()));
    }

    let mut values = Vec::new();
    let truncated = match (nr.first, nr.last, nr.step) {
        (Scalar::Int(first), Scalar::Int(last), Scalar::Int(step)) => {
            walk_int(first, last, nr.op, step, &mut values)
        }
        _ => {
            let first = nr.first.as_f64();
            let last = nr.last.as_f64();
            walk_float(
                first,
                first.min(last),
                first.max(last),
                nr.op,
                nr.step.as_f64(),
                nr.scale,
                &mut values,
            )
        }
    };
    Ok((values, truncated))
}

/// Walk an all-integral range in integer arithmetic. Inexact division
/// hands the walk over to floats; arithmetic overflow ends it (the next
/// value would be far outside the interval anyway).
fn walk_int(first: i64, last: i64, op: StepOp, step: i64, values: &mut Vec<Value>) -> bool {
    let (lo, hi) = (first.min(last), first.max(last));
    let mut x = first;
    while lo <= x && x <= hi && values.len() < MAX_RANGE_VALUES {
        values.push(Value::Int(x));
        let next = match op {
            StepOp::Add => x.checked_add(step),
            StepOp::Sub => x.checked_sub(step),
            StepOp::Mul => x.checked_mul(step),
            StepOp::Div => {
                if x % step == 0 {
                    Some(x / step)
                } else {
                    return walk_float(
                        x as f64 / step as f64,
                        lo as f64,
                        hi as f64,
                        op,
                        step as f64,
                        0,
                        values,
                    );
                }
            }
        };
        match next {
            Some(n) => x = n,
            None => return false,
        }
    }
    values.len() == MAX_RANGE_VALUES
}

fn walk_float(
    start: f64,
    lo: f64,
    hi: f64,
    op: StepOp,
    step: f64,
    scale: u32,
    values: &mut Vec<Value>,
) -> bool {
    // interval membership tolerates float drift near the endpoints
    let eps = 1e-9 * lo.abs().max(hi.abs()).max(1.0);
    let mut x = start;
    while x >= lo - eps && x <= hi + eps && values.len() < MAX_RANGE_VALUES {
        values.push(Value::Float(x));
        x = match op {
            StepOp::Add => x + step,
            StepOp::Sub => x - step,
            StepOp::Mul => x * step,
            StepOp::Div => x / step,
        };
        if matches!(op, StepOp::Add | StepOp::Sub) && scale > 0 {
            x = round_to_scale(x, scale);
        }
    }
    values.len() == MAX_RANGE_VALUES
}

/// Round to the decimal scale of the input literals, so an additive walk
/// over e.g. 0.1-0.3 lands on 0.2 and 0.3 instead of drifting past them.
fn round_to_scale(x: f64, scale: u32) -> f64 {
    let p = 10f64.powi(scale as i32);
    (x * p).round() / p
}
