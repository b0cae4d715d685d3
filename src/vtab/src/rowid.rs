//! Row identities derived from hexadecimal entity ids.

use common::SymqlError;

/// Parses a hexadecimal entity id.
pub fn parse_hex_id(id: &str) -> Result<u64, SymqlError> {
    u64::from_str_radix(id, 16)
        .map_err(|e| SymqlError::ExecutionError(format!("Malformed identifier {:?}: {}", id, e)))
}

/// Row id of a single-entity row: the id's bits, reinterpreted as signed.
///
/// # Arguments
///
/// * `id` - Entity id, if the record carried one.
pub fn entity_rowid(id: Option<&str>) -> Result<i64, SymqlError> {
    match id {
        Some(id) => Ok(parse_hex_id(id)? as i64),
        None => Err(SymqlError::ExecutionError(String::from(
            "Record has no identifier",
        ))),
    }
}

/// Cantor pairing of `(a, b)`: `(a + b)(a + b + 1) / 2 + b`.
///
/// Injective over ordered pairs as long as the result fits in 64 bits;
/// larger results keep only their low 64 bits.
pub fn cantor_pair(a: u64, b: u64) -> u64 {
    let (a, b) = (u128::from(a), u128::from(b));
    let sum = a + b;
    // Halve the even factor first so only the discarded high bits can wrap.
    let triangle = if sum % 2 == 0 {
        (sum / 2).wrapping_mul(sum + 1)
    } else {
        sum.wrapping_mul((sum + 1) / 2)
    };
    triangle.wrapping_add(b) as u64
}

/// Row id of an edge row, pairing both endpoint ids in order.
pub fn edge_rowid(subject: Option<&str>, object: Option<&str>) -> Result<i64, SymqlError> {
    let a = entity_rowid(subject)? as u64;
    let b = entity_rowid(object)? as u64;
    Ok(cantor_pair(a, b) as i64)
}

#[cfg(test)]
mod test {
    use super::*;
    use common::testutil::gen_distinct_hex_ids;
    use std::collections::HashSet;

    #[test]
    fn test_entity_rowid() {
        assert_eq!(entity_rowid(Some("DEADBEEF")).unwrap(), 0xDEADBEEF);
        assert_eq!(entity_rowid(Some("deadbeef")).unwrap(), 0xDEADBEEF);
        assert_eq!(entity_rowid(Some("FFFFFFFFFFFFFFFF")).unwrap(), -1);
        assert!(entity_rowid(Some("xyz")).is_err());
        assert!(entity_rowid(Some("")).is_err());
        assert!(entity_rowid(None).is_err());
    }

    #[test]
    fn test_cantor_pair_values() {
        assert_eq!(cantor_pair(0, 0), 0);
        assert_eq!(cantor_pair(1, 0), 1);
        assert_eq!(cantor_pair(0, 1), 2);
        assert_eq!(cantor_pair(2, 0), 3);
        assert_eq!(cantor_pair(1, 1), 4);
        assert_eq!(cantor_pair(47, 32), 3192);
        // Out of range pairs truncate instead of overflowing.
        cantor_pair(u64::MAX, u64::MAX);
    }

    #[test]
    fn test_edge_rowid_is_ordered() {
        let ab = edge_rowid(Some("A"), Some("B")).unwrap();
        let ba = edge_rowid(Some("B"), Some("A")).unwrap();
        assert_ne!(ab, ba);
        assert!(edge_rowid(Some("A"), Some("not hex")).is_err());
        assert!(edge_rowid(None, Some("A")).is_err());
    }

    #[test]
    fn test_edge_rowid_injective() {
        // Seven hex digits keep every pairing inside 64 bits.
        let ids = gen_distinct_hex_ids(60, 7);
        let mut seen = HashSet::new();
        for a in &ids {
            for b in &ids {
                let id = edge_rowid(Some(a), Some(b)).unwrap();
                assert!(seen.insert(id), "collision for ({}, {})", a, b);
            }
        }
        assert_eq!(seen.len(), ids.len() * ids.len());
    }
}
