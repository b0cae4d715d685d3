use index::records::{Ref, Relation, Symbol};

/// A reference together with the symbol id it was requested for.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectRef {
    pub subject: String,
    pub reference: Ref,
}

/// One decoded record of any table kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Symbol(Symbol),
    Ref(SubjectRef),
    Relation(Relation),
}
