use crate::plan::{Plan, SearchArg};
use common::{Field, SymqlError};
use index::records::RefKindMask;

/// Predicate values a cursor has received so far.
///
/// Buffers only grow across filter calls. They are dropped together with the
/// cursor, never when its stream is replaced.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterState {
    ids: Vec<String>,
    names: Vec<String>,
    scopes: Vec<String>,
    scope_prefix: bool,
    path_hint: Option<String>,
    /// Union of the kind masks of every filter call, `None` before the first.
    ref_mask: Option<RefKindMask>,
    filters: usize,
}

/// Text before the first LIKE wildcard.
pub fn like_prefix(pattern: &str) -> &str {
    match pattern.find(|c| c == '%' || c == '_') {
        Some(i) => &pattern[..i],
        None => pattern,
    }
}

/// The pattern with every LIKE wildcard removed.
pub fn strip_wildcards(pattern: &str) -> String {
    pattern.chars().filter(|c| *c != '%' && *c != '_').collect()
}

/// Textual form of an argument. SQL NULL never equals anything, so it
/// contributes nothing.
fn text_arg(value: &Field) -> Option<String> {
    match value {
        Field::Null => None,
        Field::TextField(s) => Some(s.clone()),
        Field::IntField(i) => Some(i.to_string()),
    }
}

/// Appends `value` unless already present. Insertion order is kept.
fn push_unique(buf: &mut Vec<String>, value: String) -> Result<(), SymqlError> {
    if buf.contains(&value) {
        return Ok(());
    }
    buf.try_reserve(1).map_err(|_| SymqlError::OutOfMemory)?;
    buf.push(value);
    Ok(())
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds the values of one filter call into the buffers.
    ///
    /// # Arguments
    ///
    /// * `plan` - Plan the values were produced for.
    /// * `values` - One value per `plan.args` entry, in the same order.
    pub fn accumulate(&mut self, plan: &Plan, values: &[Field]) -> Result<(), SymqlError> {
        if values.len() != plan.args.len() {
            return Err(SymqlError::ExecutionError(format!(
                "Plan expects {} filter arguments, got {}",
                plan.args.len(),
                values.len()
            )));
        }
        let mut call_mask = RefKindMask::all();
        for (arg, value) in plan.args.iter().zip(values) {
            match arg {
                SearchArg::RefFlag(kind) => {
                    // Only a false flag narrows this call's mask.
                    if value.as_int() == Some(0) {
                        call_mask.clear(*kind);
                    }
                }
                _ => {
                    if let Some(text) = text_arg(value) {
                        self.add_text(*arg, text)?;
                    }
                }
            }
        }
        self.ref_mask = Some(match self.ref_mask {
            Some(mask) => RefKindMask::from_bits(mask.bits() | call_mask.bits()),
            None => call_mask,
        });
        self.filters += 1;
        Ok(())
    }

    fn add_text(&mut self, arg: SearchArg, text: String) -> Result<(), SymqlError> {
        match arg {
            SearchArg::Id | SearchArg::Subject => push_unique(&mut self.ids, text),
            SearchArg::Name => push_unique(&mut self.names, text),
            SearchArg::NameLike => push_unique(&mut self.names, strip_wildcards(&text)),
            SearchArg::Scope => push_unique(&mut self.scopes, text),
            SearchArg::ScopeLike => {
                self.scope_prefix = true;
                push_unique(&mut self.scopes, like_prefix(&text).to_string())
            }
            SearchArg::PathLike => {
                self.path_hint = Some(like_prefix(&text).to_string());
                Ok(())
            }
            SearchArg::RefFlag(_) => Ok(()),
        }
    }

    /// Symbol ids, or relation subjects.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    /// True when no scope was given or any scope came from a prefix match.
    pub fn any_scope(&self) -> bool {
        self.scopes.is_empty() || self.scope_prefix
    }

    pub fn path_hint(&self) -> Option<&str> {
        self.path_hint.as_deref()
    }

    /// Ref kinds wanted by any filter call so far. Every kind before the
    /// first call.
    pub fn ref_mask(&self) -> RefKindMask {
        self.ref_mask.unwrap_or_else(RefKindMask::all)
    }

    /// Number of filter calls folded in so far.
    pub fn filter_count(&self) -> usize {
        self.filters
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::constraint::{Constraint, ConstraintOp};
    use crate::planner::best_plan;
    use crate::schema::{refs, symbols};
    use crate::table::TableKind;
    use index::records::RefKind;

    fn text(s: &str) -> Field {
        Field::TextField(s.to_string())
    }

    fn plan_of(args: Vec<SearchArg>) -> Plan {
        let mut plan = Plan::full_scan(args.len());
        for (i, arg) in args.into_iter().enumerate() {
            plan.push_arg(i, arg);
        }
        plan
    }

    #[test]
    fn test_like_helpers() {
        assert_eq!(like_prefix("clang::%"), "clang::");
        assert_eq!(like_prefix("a_b%"), "a");
        assert_eq!(like_prefix("exact"), "exact");
        assert_eq!(strip_wildcards("%Foo_Bar%"), "FooBar");
    }

    #[test]
    fn test_ids_accumulate_without_duplicates() {
        let plan = best_plan(
            TableKind::Symbols,
            &[Constraint::new(symbols::ID, ConstraintOp::Eq)],
        );
        let mut state = FilterState::new();
        state.accumulate(&plan, &[text("A")]).unwrap();
        state.accumulate(&plan, &[text("B")]).unwrap();
        state.accumulate(&plan, &[text("A")]).unwrap();
        state.accumulate(&plan, &[Field::Null]).unwrap();
        assert_eq!(state.ids(), &["A".to_string(), "B".to_string()]);
        assert_eq!(state.filter_count(), 4);
    }

    #[test]
    fn test_argument_count_mismatch() {
        let plan = plan_of(vec![SearchArg::Name]);
        let mut state = FilterState::new();
        assert!(state.accumulate(&plan, &[]).is_err());
        assert!(state.accumulate(&plan, &[text("a"), text("b")]).is_err());
    }

    #[test]
    fn test_scopes_and_any_scope() {
        let mut state = FilterState::new();
        assert!(state.any_scope());
        state
            .accumulate(&plan_of(vec![SearchArg::Scope]), &[text("ns::")])
            .unwrap();
        assert!(!state.any_scope());
        state
            .accumulate(&plan_of(vec![SearchArg::ScopeLike]), &[text("llvm::%")])
            .unwrap();
        assert!(state.any_scope());
        assert_eq!(state.scopes(), &["ns::".to_string(), "llvm::".to_string()]);
        // A prefix match once seen keeps the search open to every scope.
        state
            .accumulate(&plan_of(vec![SearchArg::Scope]), &[text("other::")])
            .unwrap();
        assert!(state.any_scope());
    }

    #[test]
    fn test_names_and_path() {
        let plan = plan_of(vec![SearchArg::NameLike, SearchArg::PathLike]);
        let mut state = FilterState::new();
        state
            .accumulate(&plan, &[text("%vector%"), text("/usr/include/%")])
            .unwrap();
        state
            .accumulate(&plan, &[text("map"), text("/src/%")])
            .unwrap();
        assert_eq!(state.names(), &["vector".to_string(), "map".to_string()]);
        assert_eq!(state.path_hint(), Some("/src/"));
    }

    #[test]
    fn test_ref_flags_clear_single_bits() {
        let plan = best_plan(
            TableKind::Refs,
            &[
                Constraint::new(refs::SYMBOL_ID, ConstraintOp::Eq),
                Constraint::new(refs::FIRST_KIND, ConstraintOp::Eq),
                Constraint::new(refs::FIRST_KIND + 1, ConstraintOp::Eq),
                Constraint::new(refs::FIRST_KIND + 2, ConstraintOp::Eq),
                Constraint::new(refs::FIRST_KIND + 3, ConstraintOp::Eq),
            ],
        );
        let mut state = FilterState::new();
        state
            .accumulate(
                &plan,
                &[
                    text("X"),
                    Field::IntField(1),
                    Field::IntField(0),
                    Field::IntField(0),
                    Field::IntField(0),
                ],
            )
            .unwrap();
        assert_eq!(state.ref_mask().bits(), RefKind::Declaration.bit());

        let mut state = FilterState::new();
        state
            .accumulate(
                &plan,
                &[
                    text("X"),
                    Field::Null,
                    Field::IntField(1),
                    Field::IntField(0),
                    Field::IntField(1),
                ],
            )
            .unwrap();
        let mask = state.ref_mask();
        assert!(mask.contains(RefKind::Declaration));
        assert!(mask.contains(RefKind::Definition));
        assert!(!mask.contains(RefKind::Reference));
        assert!(mask.contains(RefKind::Spelled));
    }

    #[test]
    fn test_ref_masks_union_across_calls() {
        let plan = best_plan(
            TableKind::Refs,
            &[
                Constraint::new(refs::SYMBOL_ID, ConstraintOp::Eq),
                Constraint::new(refs::FIRST_KIND, ConstraintOp::Eq),
            ],
        );
        let mut state = FilterState::new();
        assert_eq!(state.ref_mask(), RefKindMask::all());
        state
            .accumulate(&plan, &[text("A"), Field::IntField(0)])
            .unwrap();
        assert!(!state.ref_mask().contains(RefKind::Declaration));
        state
            .accumulate(&plan, &[text("A"), Field::IntField(1)])
            .unwrap();
        assert_eq!(state.ref_mask(), RefKindMask::all());
    }
}
