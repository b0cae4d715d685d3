//! Column layouts of the three table kinds.

use common::{DataType, TableSchema};

/// Columns of the symbols table.
pub mod symbols {
    pub const ID: usize = 0;
    pub const NAME: usize = 1;
    pub const SCOPE: usize = 2;
    pub const SIGNATURE: usize = 3;
    pub const DOCUMENTATION: usize = 4;
    pub const RETURN_TYPE: usize = 5;
    pub const TYPE: usize = 6;
    pub const DEF_PATH: usize = 7;
    pub const DEF_START_LINE: usize = 8;
    pub const DEF_START_COL: usize = 9;
    pub const DEF_END_LINE: usize = 10;
    pub const DEF_END_COL: usize = 11;
    pub const DECL_PATH: usize = 12;
    pub const DECL_START_LINE: usize = 13;
    pub const DECL_START_COL: usize = 14;
    pub const DECL_END_LINE: usize = 15;
    pub const DECL_END_COL: usize = 16;
    pub const KIND: usize = 17;
    pub const SUBKIND: usize = 18;
    pub const LANGUAGE: usize = 19;
    /// First of the nine property flag columns.
    pub const FIRST_PROPERTY: usize = 20;
    pub const COUNT: usize = 29;
}

/// Columns of the refs table.
pub mod refs {
    pub const SYMBOL_ID: usize = 0;
    /// First of the four ref kind flag columns.
    pub const FIRST_KIND: usize = 1;
    pub const PATH: usize = 5;
    pub const START_LINE: usize = 6;
    pub const START_COL: usize = 7;
    pub const END_LINE: usize = 8;
    pub const END_COL: usize = 9;
    pub const COUNT: usize = 10;
}

/// Columns of the relation tables.
pub mod relations {
    pub const SUBJECT: usize = 0;
    pub const OBJECT: usize = 1;
    pub const COUNT: usize = 2;
}

pub fn symbols_schema() -> TableSchema {
    let names = vec![
        "Id",
        "Name",
        "Scope",
        "Signature",
        "Documentation",
        "ReturnType",
        "Type",
        "DefPath",
        "DefStartLine",
        "DefStartCol",
        "DefEndLine",
        "DefEndCol",
        "DeclPath",
        "DeclStartLine",
        "DeclStartCol",
        "DeclEndLine",
        "DeclEndCol",
        "Kind",
        "SubKind",
        "Language",
        "Generic",
        "TemplatePartialSpecialization",
        "TemplateSpecialization",
        "UnitTest",
        "IBAnnotated",
        "IBOutletCollection",
        "GKInspectable",
        "Local",
        "ProtocolInterface",
    ];
    let dtypes = (0..names.len())
        .map(|i| match i {
            symbols::ID..=symbols::TYPE | symbols::DEF_PATH | symbols::DECL_PATH => DataType::Text,
            _ => DataType::Int,
        })
        .collect();
    TableSchema::from_vecs(names, dtypes)
}

pub fn refs_schema() -> TableSchema {
    TableSchema::from_vecs(
        vec![
            "SymbolId",
            "Declaration",
            "Definition",
            "Reference",
            "Spelled",
            "Path",
            "StartLine",
            "StartCol",
            "EndLine",
            "EndCol",
        ],
        vec![
            DataType::Text,
            DataType::Int,
            DataType::Int,
            DataType::Int,
            DataType::Int,
            DataType::Text,
            DataType::Int,
            DataType::Int,
            DataType::Int,
            DataType::Int,
        ],
    )
}

pub fn relations_schema() -> TableSchema {
    TableSchema::from_vecs(vec!["Subject", "Object"], vec![DataType::Text, DataType::Text])
}
