#[macro_use]
extern crate log;

pub mod constraint;
pub mod cursor;
pub mod filter_state;
pub mod module;
pub mod plan;
pub mod planner;
pub mod projector;
pub mod record;
pub mod request;
pub mod rowid;
pub mod schema;
pub mod stream;
pub mod table;

pub use crate::constraint::{Constraint, ConstraintOp, ConstraintUsage};
pub use crate::cursor::{Cursor, CursorState};
pub use crate::module::Module;
pub use crate::plan::Plan;
pub use crate::table::{TableKind, VirtualTable};
