use std::fmt;

/// Comparison operators the host can hand to a virtual table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Like,
    NotLike,
}

impl fmt::Display for ConstraintOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConstraintOp::Eq => "=",
            ConstraintOp::Ne => "<>",
            ConstraintOp::Lt => "<",
            ConstraintOp::Le => "<=",
            ConstraintOp::Gt => ">",
            ConstraintOp::Ge => ">=",
            ConstraintOp::Like => "LIKE",
            ConstraintOp::NotLike => "NOT LIKE",
        };
        write!(f, "{}", s)
    }
}

/// One column predicate offered to the planner at query compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Constraint {
    /// Column index in the table schema.
    pub column: usize,
    pub op: ConstraintOp,
    /// False when the host cannot supply a value for this constraint.
    pub usable: bool,
}

impl Constraint {
    pub fn new(column: usize, op: ConstraintOp) -> Self {
        Self {
            column,
            op,
            usable: true,
        }
    }

    pub fn unusable(column: usize, op: ConstraintOp) -> Self {
        Self {
            column,
            op,
            usable: false,
        }
    }

    /// True for a usable constraint on `column` with operator `op`.
    pub fn is(&self, column: usize, op: ConstraintOp) -> bool {
        self.usable && self.column == column && self.op == op
    }
}

/// How the plan consumes one constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConstraintUsage {
    /// Position of the constraint's value in the argument list passed to
    /// filter, or `None` when the constraint is not consumed.
    pub argv_index: Option<usize>,
    /// Set when the remote side enforces the constraint exactly and the host
    /// may skip re-checking it.
    pub omit: bool,
}
