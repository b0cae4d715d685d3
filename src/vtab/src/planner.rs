//! Compile-time choice of which constraints to push to the remote index.
//!
//! Planning never touches the network. An identifier equality, when usable,
//! wins over everything else and gets the lowest cost. No constraint is ever
//! marked as omitted: values accumulate across filter calls, so the host has
//! to re-check every row.

use crate::constraint::{Constraint, ConstraintOp};
use crate::plan::{Plan, SearchArg, ID_LOOKUP_COST, REMOTE_FILTER_COST};
use crate::schema::{refs, relations, symbols};
use crate::table::TableKind;
use index::records::RefKind;

/// Plans an access to a table of `kind`.
///
/// # Arguments
///
/// * `kind` - Kind of the table being planned.
/// * `constraints` - Constraints offered by the host, in host order.
pub fn best_plan(kind: TableKind, constraints: &[Constraint]) -> Plan {
    let plan = match kind {
        TableKind::Symbols => plan_symbols(constraints),
        TableKind::Refs => plan_refs(constraints),
        TableKind::Relations(_) => plan_relations(constraints),
    };
    debug!("Planned {} over {} constraints: {}", kind, constraints.len(), plan);
    plan
}

/// Index of the first usable constraint on `column` with operator `op`.
fn find(constraints: &[Constraint], column: usize, op: ConstraintOp) -> Option<usize> {
    constraints.iter().position(|c| c.is(column, op))
}

fn plan_symbols(constraints: &[Constraint]) -> Plan {
    let mut plan = Plan::full_scan(constraints.len());
    if let Some(i) = find(constraints, symbols::ID, ConstraintOp::Eq) {
        plan.push_arg(i, SearchArg::Id);
        plan.estimated_cost = ID_LOOKUP_COST;
        return plan;
    }

    let candidates = [
        (symbols::NAME, ConstraintOp::Eq, SearchArg::Name),
        (symbols::NAME, ConstraintOp::Like, SearchArg::NameLike),
        (symbols::SCOPE, ConstraintOp::Eq, SearchArg::Scope),
        (symbols::SCOPE, ConstraintOp::Like, SearchArg::ScopeLike),
    ];
    for (column, op, arg) in candidates.iter() {
        if let Some(i) = find(constraints, *column, *op) {
            plan.push_arg(i, *arg);
        }
    }
    // At most one proximity hint, from either location.
    let path = find(constraints, symbols::DEF_PATH, ConstraintOp::Like)
        .or_else(|| find(constraints, symbols::DECL_PATH, ConstraintOp::Like));
    if let Some(i) = path {
        plan.push_arg(i, SearchArg::PathLike);
    }

    if !plan.is_full_scan() {
        plan.estimated_cost = REMOTE_FILTER_COST;
    }
    plan
}

fn plan_refs(constraints: &[Constraint]) -> Plan {
    let mut plan = Plan::full_scan(constraints.len());
    let id = find(constraints, refs::SYMBOL_ID, ConstraintOp::Eq);
    if let Some(i) = id {
        plan.push_arg(i, SearchArg::Id);
    }
    for (offset, kind) in RefKind::ALL.iter().enumerate() {
        if let Some(i) = find(constraints, refs::FIRST_KIND + offset, ConstraintOp::Eq) {
            plan.push_arg(i, SearchArg::RefFlag(*kind));
        }
    }
    // References can only be fetched per symbol.
    if id.is_some() {
        plan.estimated_cost = ID_LOOKUP_COST;
    }
    plan
}

fn plan_relations(constraints: &[Constraint]) -> Plan {
    let mut plan = Plan::full_scan(constraints.len());
    if let Some(i) = find(constraints, relations::SUBJECT, ConstraintOp::Eq) {
        plan.push_arg(i, SearchArg::Subject);
        plan.estimated_cost = ID_LOOKUP_COST;
    }
    plan
}
