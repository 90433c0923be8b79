//! Composite format strings (`"Added by {0}"`)
//!
//! Grammar, per the host's formatting rules:
//! - `{{` and `}}` are literal braces
//! - `{index[,alignment][:formatString]}` is a placeholder; positive alignment
//!   right-aligns, negative left-aligns, the format string is ignored for text
//! - any other `{` or `}` is an error

use nom::branch::alt;
use nom::bytes::complete::{is_not, tag};
use nom::character::complete::{char, digit1};
use nom::combinator::{map, map_res, opt, recognize};
use nom::multi::many0;
use nom::sequence::{pair, preceded};
use nom::{IResult, Parser};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("unexpected brace or malformed placeholder at byte {0}")]
    Malformed(usize),
    #[error("placeholder {{{index}}} but only {available} argument(s)")]
    IndexOutOfRange { index: usize, available: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Placeholder { index: usize, alignment: i32 },
}

/// A parsed format string, ready to be applied many times
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeFormat {
    segments: Vec<Segment>,
}

impl CompositeFormat {
    pub fn parse(input: &str) -> Result<Self, FormatError> {
        let (rest, pieces) = many0(segment)
            .parse(input)
            .map_err(|_| FormatError::Malformed(0))?;
        if !rest.is_empty() {
            return Err(FormatError::Malformed(input.len() - rest.len()));
        }

        // merge adjacent literals so rendering is one push per run of text
        let mut segments: Vec<Segment> = Vec::with_capacity(pieces.len());
        for piece in pieces {
            if let Segment::Literal(text) = &piece {
                if let Some(Segment::Literal(prev)) = segments.last_mut() {
                    prev.push_str(text);
                    continue;
                }
            }
            segments.push(piece);
        }
        Ok(Self { segments })
    }

    /// The bare `{0}` format
    pub fn single_placeholder() -> Self {
        Self {
            segments: vec![Segment::Placeholder {
                index: 0,
                alignment: 0,
            }],
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Highest placeholder index plus one; 0 when there are no placeholders
    pub fn arity(&self) -> usize {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Placeholder { index, .. } => Some(index + 1),
                Segment::Literal(_) => None,
            })
            .max()
            .unwrap_or(0)
    }

    pub fn has_placeholder(&self) -> bool {
        self.arity() > 0
    }

    pub fn format(&self, args: &[&str]) -> Result<String, FormatError> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder { index, alignment } => {
                    let arg = args.get(*index).ok_or(FormatError::IndexOutOfRange {
                        index: *index,
                        available: args.len(),
                    })?;
                    push_aligned(&mut out, arg, *alignment);
                }
            }
        }
        Ok(out)
    }
}

fn push_aligned(out: &mut String, arg: &str, alignment: i32) {
    let width = alignment.unsigned_abs() as usize;
    let pad = width.saturating_sub(arg.chars().count());
    if alignment > 0 {
        out.extend(std::iter::repeat(' ').take(pad));
        out.push_str(arg);
    } else {
        out.push_str(arg);
        out.extend(std::iter::repeat(' ').take(pad));
    }
}

fn segment(input: &str) -> IResult<&str, Segment> {
    alt((
        map(tag("{{"), |_| Segment::Literal("{".to_string())),
        map(tag("}}"), |_| Segment::Literal("}".to_string())),
        map(is_not("{}"), |text: &str| Segment::Literal(text.to_string())),
        placeholder,
    ))
    .parse(input)
}

fn placeholder(input: &str) -> IResult<&str, Segment> {
    map(
        (
            char('{'),
            map_res(digit1, str::parse::<usize>),
            opt(preceded(
                char(','),
                map_res(recognize(pair(opt(char('-')), digit1)), str::parse::<i32>),
            )),
            opt(preceded(char(':'), is_not("{}"))),
            char('}'),
        ),
        |(_, index, alignment, _, _)| Segment::Placeholder {
            index,
            alignment: alignment.unwrap_or(0),
        },
    )
    .parse(input)
}
