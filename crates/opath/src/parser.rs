//! A `nom`-based parser for the object path expression language.

use crate::ast::{FilterExpr, FilterOp, Segment};
use crate::error::PathError;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{is_not, tag, tag_no_case, take_while},
    character::complete::{char, i64 as nom_i64, multispace0, one_of, satisfy},
    combinator::{eof, map, opt, peek, recognize, verify},
    multi::{many0, separated_list1},
    sequence::{delimited, pair, preceded, terminated},
};
use verdict_value::Value;

// --- Main Public Parser ---

pub fn parse_path(input: &str) -> Result<Vec<Segment>, PathError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(PathError::Empty);
    }
    match path(trimmed) {
        Ok(("", segments)) => Ok(segments),
        Ok((rem, _)) => Err(PathError::Parse(
            input.to_string(),
            format!("Parser did not consume all input. Remainder: '{}'", rem),
        )),
        Err(e) => Err(PathError::Parse(input.to_string(), e.to_string())),
    }
}

/// Returns true when the string is a plain member name with no path syntax,
/// resolvable by a direct top-level property lookup.
pub fn is_bare_name(input: &str) -> bool {
    let mut chars = input.chars();
    match chars.next() {
        Some(c) if c.is_alphanumeric() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}

// --- Combinators & Helpers ---

fn ws<'a, F, O, E>(inner: F) -> impl Parser<&'a str, Output = O, Error = E>
where
    F: Parser<&'a str, Output = O, Error = E>,
    E: nom::error::ParseError<&'a str>,
{
    delimited(multispace0, inner, multispace0)
}

fn path(input: &str) -> IResult<&str, Vec<Segment>> {
    let (input, root) = opt(root_ref).parse(input)?;
    let (input, first) = opt(member_name).parse(input)?;
    let (input, rest) = many0(segment).parse(input)?;

    let mut segments = Vec::new();
    segments.extend(root);
    if let Some(name) = first {
        segments.push(Segment::Member {
            name,
            case_override: false,
        });
    }
    segments.extend(rest);
    Ok((input, segments))
}

/// `$` or `@` at the start of a path both rebind to the root object. A `$`
/// directly followed by a member character is part of a member name
/// (e.g. `$schema`), not a root reference.
fn root_ref(input: &str) -> IResult<&str, Segment> {
    alt((
        map(
            terminated(
                char('$'),
                peek(alt((map(one_of(".["), |_| ()), map(eof, |_| ())))),
            ),
            |_| Segment::Root,
        ),
        map(char('@'), |_| Segment::Root),
    ))
    .parse(input)
}

fn member_name(input: &str) -> IResult<&str, String> {
    map(
        recognize(pair(
            satisfy(|c: char| c.is_alphanumeric() || c == '_' || c == '$'),
            take_while(|c: char| c.is_alphanumeric() || c == '_' || c == '-'),
        )),
        |s: &str| s.to_string(),
    )
    .parse(input)
}

fn segment(input: &str) -> IResult<&str, Segment> {
    alt((descendant, dot_wild, dot_member, plus_member, bracket)).parse(input)
}

fn descendant(input: &str) -> IResult<&str, Segment> {
    map(preceded(tag(".."), member_name), Segment::Descendant).parse(input)
}

fn dot_wild(input: &str) -> IResult<&str, Segment> {
    map(tag(".*"), |_| Segment::Wildcard).parse(input)
}

fn dot_member(input: &str) -> IResult<&str, Segment> {
    map(preceded(char('.'), member_name), |name| Segment::Member {
        name,
        case_override: false,
    })
    .parse(input)
}

/// `+name` flips the resolver-wide case-sensitivity flag for one member.
fn plus_member(input: &str) -> IResult<&str, Segment> {
    map(preceded(char('+'), member_name), |name| Segment::Member {
        name,
        case_override: true,
    })
    .parse(input)
}

// --- Bracket Selectors ---

fn bracket(input: &str) -> IResult<&str, Segment> {
    delimited(char('['), ws(bracket_body), char(']')).parse(input)
}

fn bracket_body(input: &str) -> IResult<&str, Segment> {
    alt((
        filter,
        slice,
        union_member,
        union_index,
        map(char('*'), |_| Segment::Wildcard),
        map(nom_i64, Segment::Index),
        map(quoted, |name| Segment::Member {
            name,
            case_override: false,
        }),
    ))
    .parse(input)
}

fn quoted(input: &str) -> IResult<&str, String> {
    map(
        alt((
            delimited(char('\''), is_not("'"), char('\'')),
            delimited(char('"'), is_not("\""), char('"')),
        )),
        |s: &str| s.to_string(),
    )
    .parse(input)
}

fn slice(input: &str) -> IResult<&str, Segment> {
    let (input, start) = opt(nom_i64).parse(input)?;
    let (input, _) = ws(char(':')).parse(input)?;
    let (input, stop) = opt(nom_i64).parse(input)?;
    let (input, step) = opt(preceded(ws(char(':')), opt(nom_i64))).parse(input)?;
    Ok((
        input,
        Segment::Slice {
            start,
            stop,
            step: step.flatten(),
        },
    ))
}

fn union_index(input: &str) -> IResult<&str, Segment> {
    map(
        verify(
            separated_list1(ws(char(',')), nom_i64),
            |items: &Vec<i64>| items.len() > 1,
        ),
        Segment::UnionIndex,
    )
    .parse(input)
}

fn union_member(input: &str) -> IResult<&str, Segment> {
    map(
        verify(
            separated_list1(ws(char(',')), quoted),
            |items: &Vec<String>| items.len() > 1,
        ),
        Segment::UnionMember,
    )
    .parse(input)
}

// --- Filter Predicates ---

fn filter(input: &str) -> IResult<&str, Segment> {
    map(
        preceded(
            char('?'),
            alt((
                delimited(char('('), ws(filter_or), char(')')),
                ws(filter_or),
            )),
        ),
        Segment::Filter,
    )
    .parse(input)
}

fn filter_or(input: &str) -> IResult<&str, FilterExpr> {
    map(
        separated_list1(ws(tag("||")), filter_and),
        |mut branches| {
            if branches.len() == 1 {
                branches.pop().unwrap()
            } else {
                FilterExpr::Or(branches)
            }
        },
    )
    .parse(input)
}

fn filter_and(input: &str) -> IResult<&str, FilterExpr> {
    map(
        separated_list1(ws(tag("&&")), filter_unary),
        |mut branches| {
            if branches.len() == 1 {
                branches.pop().unwrap()
            } else {
                FilterExpr::And(branches)
            }
        },
    )
    .parse(input)
}

fn filter_unary(input: &str) -> IResult<&str, FilterExpr> {
    alt((
        map(preceded(ws(char('!')), filter_unary), |e| {
            FilterExpr::Not(Box::new(e))
        }),
        delimited(ws(char('(')), filter_or, ws(char(')'))),
        comparison,
    ))
    .parse(input)
}

fn comparison(input: &str) -> IResult<&str, FilterExpr> {
    let (input, path) = operand(input)?;
    let (input, rest) = opt(pair(ws(filter_op), literal)).parse(input)?;
    Ok((
        input,
        match rest {
            Some((op, value)) => FilterExpr::Compare { path, op, value },
            None => FilterExpr::Exists(path),
        },
    ))
}

/// A filter operand: `@.a.b`, `$.a`, or a bare member path, with bracket
/// selectors allowed on the tail.
fn operand(input: &str) -> IResult<&str, Vec<Segment>> {
    let (input, head) = alt((
        map(char('@'), |_| Segment::Current),
        map(char('$'), |_| Segment::Root),
        map(member_name, |name| Segment::Member {
            name,
            case_override: false,
        }),
    ))
    .parse(input)?;
    let (input, rest) = many0(alt((descendant, dot_member, bracket))).parse(input)?;

    let mut segments = vec![head];
    segments.extend(rest);
    Ok((input, segments))
}

fn filter_op(input: &str) -> IResult<&str, FilterOp> {
    alt((
        map(tag("=="), |_| FilterOp::Equal),
        map(tag("!="), |_| FilterOp::NotEqual),
        map(tag("<="), |_| FilterOp::LessOrEqual),
        map(tag(">="), |_| FilterOp::GreaterOrEqual),
        map(tag("~="), |_| FilterOp::Match),
        map(char('<'), |_| FilterOp::Less),
        map(char('>'), |_| FilterOp::Greater),
    ))
    .parse(input)
}

fn literal(input: &str) -> IResult<&str, Value> {
    ws(alt((
        map(quoted, Value::String),
        map(nom_i64, Value::Int),
        map(tag_no_case("true"), |_| Value::Bool(true)),
        map(tag_no_case("false"), |_| Value::Bool(false)),
        map(tag_no_case("null"), |_| Value::Null),
    )))
    .parse(input)
}
