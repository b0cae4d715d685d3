//! Decoded records returned by the remote symbol index.
//!
//! Every field is optional: the remote side omits anything it does not know,
//! and nested messages (locations, positions, symbol info) may be missing at
//! any level.

/// A line/column position inside a file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Position {
    pub line: Option<u32>,
    pub column: Option<u32>,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self {
            line: Some(line),
            column: Some(column),
        }
    }
}

/// A source range in one file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct SymbolLocation {
    pub start: Option<Position>,
    pub end: Option<Position>,
    pub file_path: Option<String>,
}

impl SymbolLocation {
    /// Creates a location spanning `start` to `end` in `file_path`.
    pub fn new(file_path: &str, start: Position, end: Position) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            file_path: Some(file_path.to_string()),
        }
    }

    /// True when the file path starts with `prefix`.
    pub fn path_starts_with(&self, prefix: &str) -> bool {
        self.file_path
            .as_deref()
            .map(|p| p.starts_with(prefix))
            .unwrap_or(false)
    }
}

/// Classification of a symbol. `properties` is a bit set of [`SymbolProperty`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct SymbolInfo {
    pub kind: Option<u32>,
    pub subkind: Option<u32>,
    pub language: Option<u32>,
    pub properties: Option<u32>,
}

/// A symbol known to the index.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Symbol {
    /// Hexadecimal symbol id.
    pub id: Option<String>,
    pub info: Option<SymbolInfo>,
    pub name: Option<String>,
    pub definition: Option<SymbolLocation>,
    pub canonical_declaration: Option<SymbolLocation>,
    pub references: Option<u32>,
    pub scope: Option<String>,
    pub signature: Option<String>,
    pub documentation: Option<String>,
    pub return_type: Option<String>,
    #[serde(rename = "type")]
    pub type_name: Option<String>,
}

impl Symbol {
    /// Creates a symbol with only an id, name and scope set.
    pub fn named(id: &str, name: &str, scope: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            name: Some(name.to_string()),
            scope: Some(scope.to_string()),
            ..Default::default()
        }
    }
}

/// A single reference to a symbol. `kind` is a bit set of [`RefKind`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Ref {
    pub location: Option<SymbolLocation>,
    pub kind: Option<u32>,
}

/// An edge `subject -> object` of one relation kind.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Relation {
    pub subject_id: Option<String>,
    pub object: Option<Symbol>,
}

/// Property bits carried in [`SymbolInfo::properties`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolProperty {
    Generic,
    TemplatePartialSpecialization,
    TemplateSpecialization,
    UnitTest,
    IBAnnotated,
    IBOutletCollection,
    GKInspectable,
    Local,
    ProtocolInterface,
}

impl SymbolProperty {
    /// All properties, in column order.
    pub const ALL: [SymbolProperty; 9] = [
        SymbolProperty::Generic,
        SymbolProperty::TemplatePartialSpecialization,
        SymbolProperty::TemplateSpecialization,
        SymbolProperty::UnitTest,
        SymbolProperty::IBAnnotated,
        SymbolProperty::IBOutletCollection,
        SymbolProperty::GKInspectable,
        SymbolProperty::Local,
        SymbolProperty::ProtocolInterface,
    ];

    pub fn bit(self) -> u32 {
        1 << (self as u32)
    }
}

/// Kinds of reference. A reference may be of several kinds at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    Declaration,
    Definition,
    Reference,
    Spelled,
}

impl RefKind {
    pub const ALL: [RefKind; 4] = [
        RefKind::Declaration,
        RefKind::Definition,
        RefKind::Reference,
        RefKind::Spelled,
    ];

    pub fn bit(self) -> u32 {
        1 << (self as u32)
    }
}

/// Set of [`RefKind`]s used to filter reference requests.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(transparent)]
pub struct RefKindMask(u32);

impl RefKindMask {
    /// The mask with every kind included.
    pub fn all() -> Self {
        RefKind::ALL
            .iter()
            .fold(Self::empty(), |mut mask, kind| {
                mask.set(*kind);
                mask
            })
    }

    /// The mask with no kind included.
    pub fn empty() -> Self {
        RefKindMask(0)
    }

    pub fn from_bits(bits: u32) -> Self {
        RefKindMask(bits & Self::all().0)
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, kind: RefKind) -> bool {
        self.0 & kind.bit() != 0
    }

    pub fn set(&mut self, kind: RefKind) {
        self.0 |= kind.bit();
    }

    /// Removes exactly one kind, leaving the other bits untouched.
    pub fn clear(&mut self, kind: RefKind) {
        self.0 &= !kind.bit();
    }

    /// True when any kind in `bits` is part of this mask.
    pub fn intersects(self, bits: u32) -> bool {
        self.0 & bits != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl Default for RefKindMask {
    fn default() -> Self {
        Self::all()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_property_bits() {
        assert_eq!(SymbolProperty::Generic.bit(), 1);
        assert_eq!(SymbolProperty::UnitTest.bit(), 8);
        assert_eq!(SymbolProperty::ProtocolInterface.bit(), 1 << 8);
    }

    #[test]
    fn test_mask_clear_only_touches_one_bit() {
        let mut mask = RefKindMask::all();
        assert_eq!(mask.bits(), 0b1111);
        mask.clear(RefKind::Definition);
        assert_eq!(mask.bits(), 0b1101);
        assert!(mask.contains(RefKind::Declaration));
        assert!(!mask.contains(RefKind::Definition));
        mask.clear(RefKind::Definition);
        assert_eq!(mask.bits(), 0b1101);
        mask.clear(RefKind::Reference);
        mask.clear(RefKind::Spelled);
        assert_eq!(mask.bits(), RefKind::Declaration.bit());
        mask.clear(RefKind::Declaration);
        assert!(mask.is_empty());
    }

    #[test]
    fn test_symbol_decodes_with_missing_fields() {
        let json = r#"{"id":"AB","definition":{"file_path":"a.cc"},"type":"int"}"#;
        let sym: Symbol = serde_json::from_str(json).unwrap();
        assert_eq!(sym.id.as_deref(), Some("AB"));
        assert_eq!(sym.type_name.as_deref(), Some("int"));
        let def = sym.definition.unwrap();
        assert!(def.start.is_none());
        assert!(def.path_starts_with("a."));
        assert!(sym.info.is_none());
    }

    #[test]
    fn test_mask_serializes_as_integer() {
        let mut mask = RefKindMask::all();
        mask.clear(RefKind::Spelled);
        assert_eq!(serde_json::to_string(&mask).unwrap(), "7");
        let back: RefKindMask = serde_json::from_str("7").unwrap();
        assert_eq!(back, mask);
    }
}
