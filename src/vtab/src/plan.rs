use crate::constraint::ConstraintUsage;
use index::records::RefKind;
use std::fmt;

/// Cost of a point lookup by identity.
pub const ID_LOOKUP_COST: f64 = 1.0;
/// Cost of a remote search narrowed by at least one predicate.
pub const REMOTE_FILTER_COST: f64 = 1000.0;
/// Cost of scanning everything the remote side has.
pub const FULL_SCAN_COST: f64 = 1_000_000.0;

/// Bit set of the predicate categories a plan exploits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchFlags(u32);

impl SearchFlags {
    pub const ID_EQ: SearchFlags = SearchFlags(1 << 0);
    pub const NAME_EQ: SearchFlags = SearchFlags(1 << 1);
    pub const NAME_LIKE: SearchFlags = SearchFlags(1 << 2);
    pub const SCOPE_EQ: SearchFlags = SearchFlags(1 << 3);
    pub const SCOPE_LIKE: SearchFlags = SearchFlags(1 << 4);
    pub const PATH_LIKE: SearchFlags = SearchFlags(1 << 5);
    pub const DECLARATION_EQ: SearchFlags = SearchFlags(1 << 6);
    pub const DEFINITION_EQ: SearchFlags = SearchFlags(1 << 7);
    pub const REFERENCE_EQ: SearchFlags = SearchFlags(1 << 8);
    pub const SPELLED_EQ: SearchFlags = SearchFlags(1 << 9);
    pub const SUBJECT_EQ: SearchFlags = SearchFlags(1 << 10);

    pub fn empty() -> Self {
        SearchFlags(0)
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, other: SearchFlags) -> bool {
        self.0 & other.0 == other.0 && !other.is_empty()
    }

    pub fn insert(&mut self, other: SearchFlags) {
        self.0 |= other.0;
    }
}

/// What a delivered filter argument means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchArg {
    Id,
    Name,
    NameLike,
    Scope,
    ScopeLike,
    PathLike,
    RefFlag(RefKind),
    Subject,
}

impl SearchArg {
    /// The category bit this argument sets in a plan.
    pub fn flag(self) -> SearchFlags {
        match self {
            SearchArg::Id => SearchFlags::ID_EQ,
            SearchArg::Name => SearchFlags::NAME_EQ,
            SearchArg::NameLike => SearchFlags::NAME_LIKE,
            SearchArg::Scope => SearchFlags::SCOPE_EQ,
            SearchArg::ScopeLike => SearchFlags::SCOPE_LIKE,
            SearchArg::PathLike => SearchFlags::PATH_LIKE,
            SearchArg::RefFlag(RefKind::Declaration) => SearchFlags::DECLARATION_EQ,
            SearchArg::RefFlag(RefKind::Definition) => SearchFlags::DEFINITION_EQ,
            SearchArg::RefFlag(RefKind::Reference) => SearchFlags::REFERENCE_EQ,
            SearchArg::RefFlag(RefKind::Spelled) => SearchFlags::SPELLED_EQ,
            SearchArg::Subject => SearchFlags::SUBJECT_EQ,
        }
    }
}

/// Result of planning one table access.
///
/// A plan depends only on the constraint set, so the host compiles it once
/// and hands the same plan to every filter call of the query.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub mask: SearchFlags,
    /// `args[i]` is the meaning of the i-th value passed to filter.
    pub args: Vec<SearchArg>,
    /// One entry per input constraint, in input order.
    pub usage: Vec<ConstraintUsage>,
    pub estimated_cost: f64,
}

impl Plan {
    /// The plan that exploits nothing.
    ///
    /// # Arguments
    ///
    /// * `n_constraints` - Number of constraints offered to the planner.
    pub fn full_scan(n_constraints: usize) -> Self {
        Self {
            mask: SearchFlags::empty(),
            args: Vec::new(),
            usage: vec![ConstraintUsage::default(); n_constraints],
            estimated_cost: FULL_SCAN_COST,
        }
    }

    pub fn is_full_scan(&self) -> bool {
        self.mask.is_empty()
    }

    /// Consumes constraint `i` as the next filter argument.
    pub fn push_arg(&mut self, i: usize, arg: SearchArg) {
        self.usage[i] = ConstraintUsage {
            argv_index: Some(self.args.len()),
            omit: false,
        };
        self.args.push(arg);
        self.mask.insert(arg.flag());
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_full_scan() {
            return write!(f, "full scan (cost {})", self.estimated_cost);
        }
        write!(
            f,
            "mask {:#06x} args {:?} (cost {})",
            self.mask.bits(),
            self.args,
            self.estimated_cost
        )
    }
}
