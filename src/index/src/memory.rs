use crate::records::{Ref, Relation, Symbol};
use crate::request::{
    FuzzyFindRequest, LookupRequest, RefsRequest, RelationKind, RelationsRequest, RemoteRequest,
};
use crate::service::{Reply, SymbolIndex, VecReader};
use common::SymqlError;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Mutex;

/// References of one symbol in an index dump.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct RefEntry {
    pub symbol_id: String,
    pub refs: Vec<Ref>,
}

/// One relation edge in an index dump.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RelationEntry {
    pub predicate: RelationKind,
    pub subject_id: String,
    pub object_id: String,
}

/// Serialized form of a whole index.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct IndexDump {
    #[serde(default)]
    pub symbols: Vec<Symbol>,
    #[serde(default)]
    pub refs: Vec<RefEntry>,
    #[serde(default)]
    pub relations: Vec<RelationEntry>,
}

/// A symbol index held entirely in memory.
///
/// Answers the same four calls as the remote service and records every
/// request it receives, in order.
#[derive(Default)]
pub struct MemoryIndex {
    symbols: Vec<Symbol>,
    refs: HashMap<String, Vec<Ref>>,
    relations: Vec<(RelationKind, String, String)>,
    requests: Mutex<Vec<RemoteRequest>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an index from a dump.
    ///
    /// # Arguments
    ///
    /// * `dump` - Symbols, references and relations to serve.
    pub fn from_dump(dump: IndexDump) -> Self {
        let mut index = Self::new();
        for sym in dump.symbols {
            index.add_symbol(sym);
        }
        for entry in dump.refs {
            for r in entry.refs {
                index.add_ref(&entry.symbol_id, r);
            }
        }
        for rel in dump.relations {
            index.add_relation(rel.predicate, &rel.subject_id, &rel.object_id);
        }
        index
    }

    /// Loads a JSON index dump from `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SymqlError> {
        let contents = fs::read_to_string(path)?;
        let dump: IndexDump = serde_json::from_str(&contents)?;
        info!(
            "Loaded index dump: {} symbols, {} ref entries, {} relations",
            dump.symbols.len(),
            dump.refs.len(),
            dump.relations.len()
        );
        Ok(Self::from_dump(dump))
    }

    pub fn add_symbol(&mut self, sym: Symbol) {
        self.symbols.push(sym);
    }

    pub fn add_ref(&mut self, symbol_id: &str, r: Ref) {
        self.refs.entry(symbol_id.to_string()).or_default().push(r);
    }

    pub fn add_relation(&mut self, predicate: RelationKind, subject_id: &str, object_id: &str) {
        self.relations
            .push((predicate, subject_id.to_string(), object_id.to_string()));
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<RemoteRequest> {
        match self.requests.lock() {
            Ok(log) => log.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn clear_requests(&self) {
        if let Ok(mut log) = self.requests.lock() {
            log.clear();
        }
    }

    fn record(&self, req: RemoteRequest) {
        if let Ok(mut log) = self.requests.lock() {
            log.push(req);
        }
    }

    fn symbol_by_id(&self, id: &str) -> Option<&Symbol> {
        self.symbols.iter().find(|s| s.id.as_deref() == Some(id))
    }

    fn in_scope(req: &FuzzyFindRequest, sym: &Symbol) -> bool {
        if req.any_scope || req.scopes.is_empty() {
            return true;
        }
        let scope = sym.scope.as_deref().unwrap_or("");
        req.scopes.iter().any(|s| s == scope)
    }

    fn near(req: &FuzzyFindRequest, sym: &Symbol) -> bool {
        req.proximity_paths.iter().any(|p| {
            sym.definition
                .as_ref()
                .map(|d| d.path_starts_with(p))
                .unwrap_or(false)
                || sym
                    .canonical_declaration
                    .as_ref()
                    .map(|d| d.path_starts_with(p))
                    .unwrap_or(false)
        })
    }
}

/// Case-insensitive subsequence match of `query` against `name`.
pub fn fuzzy_matches(query: &str, name: &str) -> bool {
    let mut name_chars = name.chars().flat_map(char::to_lowercase);
    query
        .chars()
        .flat_map(char::to_lowercase)
        .all(|q| name_chars.any(|n| n == q))
}

fn truncate<T>(mut records: Vec<T>, limit: Option<u32>) -> Vec<T> {
    if let Some(limit) = limit {
        records.truncate(limit as usize);
    }
    records
}

impl SymbolIndex for MemoryIndex {
    fn lookup(&self, req: &LookupRequest) -> Result<Reply<Symbol>, SymqlError> {
        self.record(RemoteRequest::Lookup(req.clone()));
        let found = req
            .ids
            .iter()
            .filter_map(|id| self.symbol_by_id(id))
            .cloned()
            .collect();
        Ok(Box::new(VecReader::new(found)))
    }

    fn fuzzy_find(&self, req: &FuzzyFindRequest) -> Result<Reply<Symbol>, SymqlError> {
        self.record(RemoteRequest::FuzzyFind(req.clone()));
        let query = req.query.as_deref().unwrap_or("");
        let (near, far): (Vec<&Symbol>, Vec<&Symbol>) = self
            .symbols
            .iter()
            .filter(|s| fuzzy_matches(query, s.name.as_deref().unwrap_or("")))
            .filter(|s| Self::in_scope(req, s))
            .partition(|s| Self::near(req, s));
        let found = near.into_iter().chain(far).cloned().collect();
        Ok(Box::new(VecReader::new(truncate(found, req.limit))))
    }

    fn relations(&self, req: &RelationsRequest) -> Result<Reply<Relation>, SymqlError> {
        self.record(RemoteRequest::Relations(req.clone()));
        let found = self
            .relations
            .iter()
            .filter(|(kind, subject, _)| {
                *kind == req.predicate && (req.subjects.is_empty() || req.subjects.contains(subject))
            })
            .map(|(_, subject, object)| Relation {
                subject_id: Some(subject.clone()),
                object: Some(
                    self.symbol_by_id(object)
                        .cloned()
                        .unwrap_or_else(|| Symbol {
                            id: Some(object.clone()),
                            ..Default::default()
                        }),
                ),
            })
            .collect();
        Ok(Box::new(VecReader::new(truncate(found, req.limit))))
    }

    fn refs(&self, req: &RefsRequest) -> Result<Reply<Ref>, SymqlError> {
        self.record(RemoteRequest::Refs(req.clone()));
        let found = req
            .ids
            .iter()
            .filter_map(|id| self.refs.get(id))
            .flatten()
            .filter(|r| req.filter.intersects(r.kind.unwrap_or(0)))
            .cloned()
            .collect();
        Ok(Box::new(VecReader::new(truncate(found, req.limit))))
    }
}
