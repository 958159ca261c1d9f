use std::fmt;

/// Shell variable holding the per-task array index at run time.
pub const TASK_ID_VAR: &str = "${SLURM_ARRAY_TASK_ID}";

/// One scanned piece of the raw argument string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Text outside of any range expression, kept verbatim
    Literal(&'a str),
    /// A bracketed range expression: optional group id plus body.
    /// An empty body is a back-reference to a previously defined group.
    Range {
        group: Option<&'a str>,
        body: &'a str,
    },
}

/// A numeric literal from a range body. Integers stay integers so that
/// purely integral ranges expand to integer values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Int(i64),
    Float(f64),
}

impl Scalar {
    pub fn as_f64(self) -> f64 {
        match self {
            Scalar::Int(v) => v as f64,
            Scalar::Float(v) => v,
        }
    }
}

/// Step operator of a numeric range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// Parsed numeric range: FIRST-LAST[:[OP]STEP]
#[derive(Debug, Clone, PartialEq)]
pub struct NumRange {
    pub first: Scalar,
    pub last: Scalar,
    pub op: StepOp,
    pub step: Scalar,
    /// Max number of decimal digits across the three literals; additive
    /// float walks round to this scale to cancel accumulated drift.
    pub scale: u32,
}

/// The interpretation a range body parsed to
#[derive(Debug, Clone, PartialEq)]
pub enum RangeBody {
    /// The literal token `id`: the scheduler's own task index, late-bound
    TaskId,
    Numeric(NumRange),
    List(Vec<String>),
}

/// One concrete expanded value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    /// Opaque list item, emitted verbatim
    Word(String),
    /// Rendered as the scheduler's task-index variable
    TaskId,
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Word(s) => f.write_str(s),
            Value::TaskId => f.write_str(TASK_ID_VAR),
        }
    }
}

/// One axis of variation: a range spec together with its expanded values,
/// positioned by first-definition order.
#[derive(Debug, Clone, PartialEq)]
pub struct Dimension {
    /// The raw range spec text as written between the brackets
    pub raw: String,
    /// Expanded values, in order; order drives positional indexing
    pub values: Vec<Value>,
    /// Whether expansion hit the safety cap
    pub truncated: bool,
}
