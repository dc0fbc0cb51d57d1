//! The evaluation engine that walks a compiled segment AST against a
//! target node.
//!
//! Resolution is all-or-nothing: any unresolved intermediate segment
//! collapses the whole walk to "not found", never a partial result. Only
//! slice segments are exempt — an out-of-range slice yields an empty
//! collection rather than a miss.

use crate::ast::{FilterExpr, FilterOp, Segment};
use regex::RegexBuilder;
use verdict_value::TargetNode;

/// Recursion limit for descendant (`..name`) search.
const MAX_RECURSE_DEPTH: usize = 100;

struct ResolveContext<'a> {
    root: TargetNode<'a>,
    case_sensitive: bool,
}

/// Walk `segments` from `root`. Returns `None` when the path does not
/// resolve within the object.
pub(crate) fn resolve<'a>(
    segments: &[Segment],
    root: &TargetNode<'a>,
    case_sensitive: bool,
) -> Option<Vec<TargetNode<'a>>> {
    let ctx = ResolveContext {
        root: root.clone(),
        case_sensitive,
    };
    walk(&ctx, segments, 0, root.clone())
}

fn walk<'a>(
    ctx: &ResolveContext<'a>,
    segments: &[Segment],
    idx: usize,
    input: TargetNode<'a>,
) -> Option<Vec<TargetNode<'a>>> {
    let Some(segment) = segments.get(idx) else {
        return Some(vec![input]);
    };
    match segment {
        Segment::Root => walk(ctx, segments, idx + 1, ctx.root.clone()),
        Segment::Current => walk(ctx, segments, idx + 1, input),
        Segment::Member {
            name,
            case_override,
        } => {
            // The override flips the resolver-wide flag for this member.
            let case_sensitive = ctx.case_sensitive != *case_override;
            let value = input.member(name, case_sensitive)?;
            walk(ctx, segments, idx + 1, value)
        }
        Segment::Index(index) => walk(ctx, segments, idx + 1, input.index(*index)?),
        Segment::Wildcard => {
            let mut out = Vec::new();
            let mut matched = false;
            for item in input.values() {
                if let Some(items) = walk(ctx, segments, idx + 1, item) {
                    matched = true;
                    out.extend(items);
                }
            }
            matched.then_some(out)
        }
        Segment::Slice { start, stop, step } => {
            let step = step.unwrap_or(1);
            if step == 0 {
                return Some(Vec::new());
            }
            let mut out = Vec::new();
            let mut current = start.unwrap_or(if step > 0 { 0 } else { -1 });
            loop {
                if let Some(stop) = stop {
                    let within = if step > 0 { current < *stop } else { current > *stop };
                    if !within {
                        break;
                    }
                }
                let Some(item) = input.index(current) else {
                    break;
                };
                current += step;
                if let Some(items) = walk(ctx, segments, idx + 1, item) {
                    out.extend(items);
                }
            }
            Some(out)
        }
        Segment::Filter(filter) => {
            let mut out = Vec::new();
            let mut matched = false;
            for item in input.values() {
                if !eval_filter(ctx, filter, &item) {
                    continue;
                }
                if let Some(items) = walk(ctx, segments, idx + 1, item) {
                    matched = true;
                    out.extend(items);
                }
            }
            matched.then_some(out)
        }
        Segment::Descendant(name) => {
            let mut found = Vec::new();
            collect_descendants(ctx, &input, name, 0, &mut found);
            let mut out = Vec::new();
            let mut matched = false;
            for item in found {
                if let Some(items) = walk(ctx, segments, idx + 1, item) {
                    matched = true;
                    out.extend(items);
                }
            }
            matched.then_some(out)
        }
        Segment::UnionIndex(indices) => {
            let mut out = Vec::new();
            let mut matched = false;
            for index in indices {
                let Some(item) = input.index(*index) else {
                    continue;
                };
                if let Some(items) = walk(ctx, segments, idx + 1, item) {
                    matched = true;
                    out.extend(items);
                }
            }
            matched.then_some(out)
        }
        Segment::UnionMember(names) => {
            let mut out = Vec::new();
            let mut matched = false;
            for name in names {
                let Some(item) = input.member(name, ctx.case_sensitive) else {
                    continue;
                };
                if let Some(items) = walk(ctx, segments, idx + 1, item) {
                    matched = true;
                    out.extend(items);
                }
            }
            matched.then_some(out)
        }
    }
}

/// Depth-first search for `name` below `node`. Recursion into a subtree
/// stops once the name matched in that subtree, so each branch contributes
/// its first match only.
fn collect_descendants<'a>(
    ctx: &ResolveContext<'a>,
    node: &TargetNode<'a>,
    name: &str,
    depth: usize,
    out: &mut Vec<TargetNode<'a>>,
) {
    if depth > MAX_RECURSE_DEPTH {
        log::warn!(
            "descendant search for '{}' exceeded max depth {}",
            name,
            MAX_RECURSE_DEPTH
        );
        return;
    }
    for item in node.values() {
        if let Some(value) = item.member(name, ctx.case_sensitive) {
            out.push(value);
        } else {
            collect_descendants(ctx, &item, name, depth + 1, out);
        }
    }
}

fn eval_filter<'a>(ctx: &ResolveContext<'a>, filter: &FilterExpr, item: &TargetNode<'a>) -> bool {
    match filter {
        FilterExpr::Or(branches) => branches.iter().any(|b| eval_filter(ctx, b, item)),
        FilterExpr::And(branches) => branches.iter().all(|b| eval_filter(ctx, b, item)),
        FilterExpr::Not(inner) => !eval_filter(ctx, inner, item),
        FilterExpr::Exists(path) => walk(ctx, path, 0, item.clone())
            .is_some_and(|items| items.first().is_some_and(|v| v.is_truthy())),
        FilterExpr::Compare { path, op, value } => {
            let Some(items) = walk(ctx, path, 0, item.clone()) else {
                return false;
            };
            let Some(left) = items.first().and_then(|v| v.scalar()) else {
                return false;
            };
            let Some(right) = value.scalar() else {
                return false;
            };
            match op {
                // Soft-typed: scalars of different primitive types are
                // never equal, by design.
                FilterOp::Equal => left.eq_typed(&right, ctx.case_sensitive),
                FilterOp::NotEqual => !left.eq_typed(&right, ctx.case_sensitive),
                FilterOp::Less => {
                    matches!(left.compare_numeric(&right), Some(std::cmp::Ordering::Less))
                }
                FilterOp::LessOrEqual => matches!(
                    left.compare_numeric(&right),
                    Some(std::cmp::Ordering::Less | std::cmp::Ordering::Equal)
                ),
                FilterOp::Greater => matches!(
                    left.compare_numeric(&right),
                    Some(std::cmp::Ordering::Greater)
                ),
                FilterOp::GreaterOrEqual => matches!(
                    left.compare_numeric(&right),
                    Some(std::cmp::Ordering::Greater | std::cmp::Ordering::Equal)
                ),
                FilterOp::Match => match (left.as_str(), right.as_str()) {
                    (Some(actual), Some(pattern)) => RegexBuilder::new(pattern)
                        .case_insensitive(!ctx.case_sensitive)
                        .build()
                        .map(|re| re.is_match(actual))
                        .unwrap_or(false),
                    _ => false,
                },
            }
        }
    }
}
