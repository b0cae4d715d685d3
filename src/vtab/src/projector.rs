//! Maps decoded records to column values.
//!
//! Every column walks a fixed path of optional fields. A missing level
//! anywhere on the path gives NULL, never an error.

use crate::record::{Record, SubjectRef};
use crate::schema::{refs, relations, symbols};
use common::Field;
use index::records::{Position, Relation, RefKind, Symbol, SymbolLocation, SymbolProperty};

fn text(value: Option<&String>) -> Field {
    match value {
        Some(s) => Field::TextField(s.clone()),
        None => Field::Null,
    }
}

fn int(value: Option<u32>) -> Field {
    match value {
        Some(i) => Field::IntField(i64::from(i)),
        None => Field::Null,
    }
}

/// Tests `bit` in an optional bit set. An unset bit set is NULL, not false.
fn flag(bits: Option<u32>, bit: u32) -> Field {
    Field::from_bool(bits.map(|b| b & bit != 0))
}

/// Column `offset` of a location: path, start line, start column, end line,
/// end column.
fn location_column(loc: Option<&SymbolLocation>, offset: usize) -> Field {
    let pos = |p: Option<&Position>, line: bool| {
        int(p.and_then(|p| if line { p.line } else { p.column }))
    };
    match offset {
        0 => text(loc.and_then(|l| l.file_path.as_ref())),
        1 => pos(loc.and_then(|l| l.start.as_ref()), true),
        2 => pos(loc.and_then(|l| l.start.as_ref()), false),
        3 => pos(loc.and_then(|l| l.end.as_ref()), true),
        4 => pos(loc.and_then(|l| l.end.as_ref()), false),
        _ => Field::Null,
    }
}

/// Value of column `col` of the symbols table.
pub fn symbol_column(sym: &Symbol, col: usize) -> Field {
    let info = sym.info.as_ref();
    match col {
        symbols::ID => text(sym.id.as_ref()),
        symbols::NAME => text(sym.name.as_ref()),
        symbols::SCOPE => text(sym.scope.as_ref()),
        symbols::SIGNATURE => text(sym.signature.as_ref()),
        symbols::DOCUMENTATION => text(sym.documentation.as_ref()),
        symbols::RETURN_TYPE => text(sym.return_type.as_ref()),
        symbols::TYPE => text(sym.type_name.as_ref()),
        symbols::DEF_PATH..=symbols::DEF_END_COL => {
            location_column(sym.definition.as_ref(), col - symbols::DEF_PATH)
        }
        symbols::DECL_PATH..=symbols::DECL_END_COL => {
            location_column(sym.canonical_declaration.as_ref(), col - symbols::DECL_PATH)
        }
        symbols::KIND => int(info.and_then(|i| i.kind)),
        symbols::SUBKIND => int(info.and_then(|i| i.subkind)),
        symbols::LANGUAGE => int(info.and_then(|i| i.language)),
        _ => match SymbolProperty::ALL.get(col.wrapping_sub(symbols::FIRST_PROPERTY)) {
            Some(prop) => flag(info.and_then(|i| i.properties), prop.bit()),
            None => Field::Null,
        },
    }
}

/// Value of column `col` of the refs table.
pub fn ref_column(r: &SubjectRef, col: usize) -> Field {
    let reference = &r.reference;
    match col {
        refs::SYMBOL_ID => Field::TextField(r.subject.clone()),
        refs::PATH..=refs::END_COL => {
            location_column(reference.location.as_ref(), col - refs::PATH)
        }
        _ => match RefKind::ALL.get(col.wrapping_sub(refs::FIRST_KIND)) {
            Some(kind) => flag(reference.kind, kind.bit()),
            None => Field::Null,
        },
    }
}

/// Value of column `col` of a relations table.
pub fn relation_column(rel: &Relation, col: usize) -> Field {
    match col {
        relations::SUBJECT => text(rel.subject_id.as_ref()),
        relations::OBJECT => text(rel.object.as_ref().and_then(|o| o.id.as_ref())),
        _ => Field::Null,
    }
}

/// Value of column `col` for any record.
pub fn project(record: &Record, col: usize) -> Field {
    match record {
        Record::Symbol(sym) => symbol_column(sym, col),
        Record::Ref(r) => ref_column(r, col),
        Record::Relation(rel) => relation_column(rel, col),
    }
}

/// All columns of `record`, in schema order.
///
/// # Arguments
///
/// * `record` - Record to project.
/// * `width` - Number of columns in the table.
pub fn project_all(record: &Record, width: usize) -> Vec<Field> {
    (0..width).map(|col| project(record, col)).collect()
}
