use pest::Parser;
use pest_derive::Parser;

use crate::ast::{NumRange, RangeBody, Scalar, Segment, StepOp};
use crate::error::{Error, Result};

#[derive(Parser)]
#[grammar = "src/range.pest"]
pub struct RangeParser;

impl RangeParser {
    /// Scan a raw argument string into literal text and range expressions.
    ///
    /// Range expressions have the shape `[group=body]` with both parts
    /// optional; anything else (including unmatched brackets) comes back
    /// as literal segments, verbatim.
    pub fn parse_command(input: &str) -> Result<Vec<Segment<'_>>> {
        let mut pairs = Self::parse(Rule::command, input)
            .map_err(|e| Error::InvalidRange(e.to_string()))?;
        let command = pairs
            .next()
            .ok_or_else(|| Error::InvalidRange(input.to_string()))?;

        let mut segments = Vec::new();
        for pair in command.into_inner() {
            match pair.as_rule() {
                Rule::literal => segments.push(Segment::Literal(pair.as_str())),
                Rule::range_expr => {
                    let mut group = None;
                    let mut body = "";
                    for inner in pair.into_inner() {
                        match inner.as_rule() {
                            Rule::group_id => group = Some(inner.as_str()),
                            Rule::body => body = inner.as_str(),
                            _ => {}
                        }
                    }
                    segments.push(Segment::Range { group, body });
                }
                Rule::EOI => {}
                _ => {}
            }
        }
        Ok(segments)
    }

    /// Parse one range body into its interpretation.
    ///
    /// A body containing a comma is list-only; otherwise the id marker and
    /// the numeric range grammar are tried, both anchored to the full body.
    /// Anything left over is a hard error rather than a one-item list.
    pub fn parse_body(raw: &str) -> Result<RangeBody> {
        if raw.contains(',') {
            let items: Vec<String> = raw
                .split(',')
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect();
            if items.is_empty() {
                return Err(Error::InvalidRange(raw.to_string()));
            }
            return Ok(RangeBody::List(items));
        }

        let mut pairs = Self::parse(Rule::scalar_spec, raw)
            .map_err(|_| Error::InvalidRange(raw.to_string()))?;
        let spec = pairs
            .next()
            .ok_or_else(|| Error::InvalidRange(raw.to_string()))?;
        let inner = spec
            .into_inner()
            .next()
            .ok_or_else(|| Error::InvalidRange(raw.to_string()))?;

        match inner.as_rule() {
            Rule::id_marker => Ok(RangeBody::TaskId),
            Rule::num_range => Self::parse_num_range(inner),
            _ => Err(Error::InvalidRange(raw.to_string())),
        }
    }

    fn parse_num_range(pair: pest::iterators::Pair<'_, Rule>) -> Result<RangeBody> {
        let raw = pair.as_str().to_string();
        let mut numbers = Vec::new();
        let mut op = None;
        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::number => numbers.push(inner.as_str()),
                Rule::step_clause => {
                    for part in inner.into_inner() {
                        match part.as_rule() {
                            Rule::step_op => op = Some(Self::parse_step_op(part.as_str())),
                            Rule::number => numbers.push(part.as_str()),
                            _ => {}
                        }
                    }
                }
                _ => {}
            }
        }

        let (first, first_scale) = Self::parse_number(numbers.first().copied(), &raw)?;
        let (last, last_scale) = Self::parse_number(numbers.get(1).copied(), &raw)?;
        let mut scale = first_scale.max(last_scale);

        let (op, step) = match numbers.get(2).copied() {
            Some(text) => {
                let (step, step_scale) = Self::parse_number(Some(text), &raw)?;
                scale = scale.max(step_scale);
                (op.unwrap_or(StepOp::Add), step)
            }
            // No step clause: walk from FIRST toward LAST. The default
            // step is one unit in the last decimal place of the
            // endpoints, so 0.1-0.3 yields 0.1, 0.2, 0.3.
            None => {
                let op = if first.as_f64() <= last.as_f64() {
                    StepOp::Add
                } else {
                    StepOp::Sub
                };
                let step = if scale == 0 {
                    Scalar::Int(1)
                } else {
                    Scalar::Float(10f64.powi(-(scale as i32)))
                };
                (op, step)
            }
        };

        Ok(RangeBody::Numeric(NumRange {
            first,
            last,
            op,
            step,
            scale,
        }))
    }

    fn parse_step_op(text: &str) -> StepOp {
        match text {
            "-" => StepOp::Sub,
            "*" => StepOp::Mul,
            "/" => StepOp::Div,
            _ => StepOp::Add,
        }
    }

    /// Parse a number literal, keeping integer type when there is no
    /// decimal point. Returns the value and its decimal-digit count.
    fn parse_number(text: Option<&str>, raw: &str) -> Result<(Scalar, u32)> {
        let text = text.ok_or_else(|| Error::InvalidRange(raw.to_string()))?;
        if let Some((_, frac)) = text.split_once('.') {
            let value = text
                .parse::<f64>()
                .map_err(|_| Error::InvalidRange(raw.to_string()))?;
            return Ok((Scalar::Float(value), frac.len() as u32));
        }
        match text.parse::<i64>() {
            Ok(value) => Ok((Scalar::Int(value), 0)),
            // digits that overflow i64 still fit a float approximation
            Err(_) => {
                let value = text
                    .parse::<f64>()
                    .map_err(|_| Error::InvalidRange(raw.to_string()))?;
                Ok((Scalar::Float(value), 0))
            }
        }
    }
}
