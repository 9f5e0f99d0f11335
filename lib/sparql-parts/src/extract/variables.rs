use rustc_hash::FxHashSet;
use sparql_parts_model::{FilterNode, OperandKind, TriplePattern};

/// Collects every distinct variable in first-occurrence order: projection
/// first (it precedes the body textually), then triple slots, then filter
/// operands.
pub(crate) fn collect_variables(
    result_variables: &[String],
    triples: &[TriplePattern],
    filters: &[FilterNode],
) -> Vec<String> {
    let mut seen = FxHashSet::default();
    let mut variables = Vec::new();
    for name in result_variables {
        push_unique(&mut seen, &mut variables, name);
    }
    for pattern in triples {
        for name in pattern.variables() {
            push_unique(&mut seen, &mut variables, name);
        }
    }
    for filter in filters {
        filter_variables(filter, &mut seen, &mut variables);
    }
    variables
}

fn filter_variables(node: &FilterNode, seen: &mut FxHashSet<String>, out: &mut Vec<String>) {
    match node {
        FilterNode::Relational { left, right, .. } => {
            for operand in [left, right] {
                if operand.kind == OperandKind::Variable {
                    push_unique(seen, out, &operand.value);
                }
            }
        }
        FilterNode::Boolean { children, .. } => {
            for child in children {
                filter_variables(child, seen, out);
            }
        }
    }
}

fn push_unique(seen: &mut FxHashSet<String>, out: &mut Vec<String>, name: &str) {
    if seen.insert(name.to_owned()) {
        out.push(name.to_owned());
    }
}
