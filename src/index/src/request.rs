use crate::records::RefKindMask;
use std::fmt;

/// Point lookup of symbols by id.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct LookupRequest {
    pub ids: Vec<String>,
}

/// Approximate search of symbols by name.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FuzzyFindRequest {
    /// Name to fuzzy match. `None` matches every name.
    pub query: Option<String>,
    /// Scopes to search, e.g. `"ns::"`.
    #[serde(default)]
    pub scopes: Vec<String>,
    /// When set, symbols from any scope match and `scopes` only ranks.
    pub any_scope: bool,
    #[serde(default)]
    pub proximity_paths: Vec<String>,
    pub limit: Option<u32>,
}

impl Default for FuzzyFindRequest {
    fn default() -> Self {
        Self {
            query: None,
            scopes: Vec::new(),
            any_scope: true,
            proximity_paths: Vec::new(),
            limit: None,
        }
    }
}

/// Relation predicates understood by the index.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    BaseOf,
    OverriddenBy,
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationKind::BaseOf => write!(f, "base_of"),
            RelationKind::OverriddenBy => write!(f, "overridden_by"),
        }
    }
}

/// Edges of one relation kind, optionally restricted to some subjects.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RelationsRequest {
    #[serde(default)]
    pub subjects: Vec<String>,
    pub predicate: RelationKind,
    pub limit: Option<u32>,
}

/// References to symbols, restricted to the kinds in `filter`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RefsRequest {
    pub ids: Vec<String>,
    pub filter: RefKindMask,
    pub limit: Option<u32>,
}

/// One message to the remote index. Serializes as
/// `{"method": "...", "request": {...}}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "method", content = "request")]
pub enum RemoteRequest {
    Lookup(LookupRequest),
    FuzzyFind(FuzzyFindRequest),
    Relations(RelationsRequest),
    Refs(RefsRequest),
}

impl RemoteRequest {
    /// Name of the remote method this request is sent to.
    pub fn method(&self) -> &'static str {
        match self {
            RemoteRequest::Lookup(_) => "Lookup",
            RemoteRequest::FuzzyFind(_) => "FuzzyFind",
            RemoteRequest::Relations(_) => "Relations",
            RemoteRequest::Refs(_) => "Refs",
        }
    }
}
