use crate::translate::{Predicate, ScanQuery};
use common::{Field, Row, SymqlError};
use std::cmp::Ordering;
use std::fmt;
use vtab::{Constraint, VirtualTable};

/// Rows produced by one query, with their column names.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl QueryResult {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }
}

impl fmt::Display for QueryResult {
    /// Renders the rows as a table with padded columns.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.len()).collect();
        let rendered: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.field_vals().map(|v| v.to_string()).collect())
            .collect();
        for row in &rendered {
            for (w, v) in widths.iter_mut().zip(row) {
                *w = (*w).max(v.len());
            }
        }
        let line = |cells: &[String]| {
            cells
                .iter()
                .zip(&widths)
                .map(|(c, w)| format!("{:width$}", c, width = w))
                .collect::<Vec<String>>()
                .join(" | ")
                .trim_end()
                .to_string()
        };
        writeln!(f, "{}", line(&self.columns))?;
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        writeln!(f, "{}", rule.join("-+-"))?;
        for row in &rendered {
            writeln!(f, "{}", line(row))?;
        }
        write!(f, "({} rows)", self.rows.len())
    }
}

/// SQL LIKE: `%` matches any run of characters, `_` exactly one. ASCII
/// letters match case-insensitively.
pub fn like_matches(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().map(|c| c.to_ascii_lowercase()).collect();
    let t: Vec<char> = text.chars().map(|c| c.to_ascii_lowercase()).collect();
    let (mut pi, mut ti) = (0, 0);
    // Last `%` seen and the text position it is currently absorbing up to.
    let mut star: Option<(usize, usize)> = None;
    while ti < t.len() {
        if pi < p.len() && (p[pi] == '_' || (p[pi] != '%' && p[pi] == t[ti])) {
            pi += 1;
            ti += 1;
        } else if pi < p.len() && p[pi] == '%' {
            star = Some((pi, ti));
            pi += 1;
        } else if let Some((sp, st)) = star {
            pi = sp + 1;
            ti = st + 1;
            star = Some((sp, st + 1));
        } else {
            return false;
        }
    }
    p[pi..].iter().all(|c| *c == '%')
}

/// Evaluates one predicate against a value. Comparisons with NULL are false.
pub fn predicate_matches(pred: &Predicate, value: &Field) -> bool {
    use vtab::ConstraintOp::*;
    match pred.op {
        Like | NotLike => {
            let (text, pattern) = match (value, &pred.value) {
                (Field::Null, _) | (_, Field::Null) => return false,
                (v, p) => (v.to_string(), p.to_string()),
            };
            like_matches(&pattern, &text) == (pred.op == Like)
        }
        op => match value.sql_cmp(&pred.value) {
            None => false,
            Some(ord) => match op {
                Eq => ord == Ordering::Equal,
                Ne => ord != Ordering::Equal,
                Lt => ord == Ordering::Less,
                Le => ord != Ordering::Greater,
                Gt => ord == Ordering::Greater,
                Ge => ord != Ordering::Less,
                Like | NotLike => false,
            },
        },
    }
}

/// Runs scan queries against virtual tables.
///
/// Plans the table access, hands the consumed predicate values to the
/// cursor and re-checks every predicate the plan did not omit.
pub struct Executor;

impl Executor {
    /// Runs `query` against `table`.
    ///
    /// # Arguments
    ///
    /// * `query` - Translated query.
    /// * `table` - Table named by the query.
    pub fn execute(query: &ScanQuery, table: &VirtualTable) -> Result<QueryResult, SymqlError> {
        let constraints: Vec<Constraint> = query
            .predicates
            .iter()
            .map(|p| Constraint::new(p.column, p.op))
            .collect();
        let plan = table.best_index(&constraints);
        debug!("Plan for {}: {}", table.name(), plan);

        let mut values = vec![Field::Null; plan.args.len()];
        let mut recheck = Vec::new();
        for (pred, usage) in query.predicates.iter().zip(&plan.usage) {
            if let Some(i) = usage.argv_index {
                values[i] = pred.value.clone();
            }
            if !usage.omit {
                recheck.push(pred);
            }
        }

        let mut rows = Vec::new();
        let mut cursor = table.open();
        if query.limit != Some(0) {
            cursor.filter(&plan, &values)?;
        }
        while !cursor.eof() {
            let mut keep = true;
            for pred in &recheck {
                if !predicate_matches(pred, &cursor.column(pred.column)?) {
                    keep = false;
                    break;
                }
            }
            if keep {
                let fields = query
                    .columns
                    .iter()
                    .map(|(col, _)| cursor.column(*col))
                    .collect::<Result<Vec<Field>, SymqlError>>()?;
                rows.push(Row::new(fields, cursor.rowid()?));
                if Some(rows.len()) == query.limit {
                    break;
                }
            }
            cursor.next()?;
        }
        cursor.close();
        info!("{} returned {} rows", table.name(), rows.len());
        Ok(QueryResult {
            columns: query.columns.iter().map(|(_, name)| name.clone()).collect(),
            rows,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use index::memory::MemoryIndex;
    use index::records::{Ref, RefKind, Symbol};
    use index::request::RelationKind;
    use std::sync::Arc;
    use vtab::schema::{refs, symbols};
    use vtab::{ConstraintOp, Module};

    fn text(s: &str) -> Field {
        Field::TextField(s.to_string())
    }

    fn pred(column: usize, op: ConstraintOp, value: Field) -> Predicate {
        Predicate { column, op, value }
    }

    fn test_index() -> Arc<MemoryIndex> {
        let mut index = MemoryIndex::new();
        index.add_symbol(Symbol::named("DEADBEEF", "Foo", "ns::"));
        index.add_symbol(Symbol::named("A", "FooBar", "ns::"));
        index.add_symbol(Symbol::named("B", "fob", "other::"));
        for kind in &[
            RefKind::Declaration.bit(),
            RefKind::Declaration.bit() | RefKind::Definition.bit(),
            RefKind::Reference.bit(),
        ] {
            index.add_ref(
                "A",
                Ref {
                    location: None,
                    kind: Some(*kind),
                },
            );
        }
        index.add_relation(RelationKind::OverriddenBy, "A", "B");
        Arc::new(index)
    }

    fn table(kind: &str, index: Arc<MemoryIndex>) -> VirtualTable {
        Module::create_with_index(&["symql", "main", kind, kind, "local"], index).unwrap()
    }

    fn all_columns(n: usize) -> Vec<(usize, String)> {
        (0..n).map(|i| (i, format!("c{}", i))).collect()
    }

    #[test]
    fn test_like_matches() {
        assert!(like_matches("foo%", "FooBar"));
        assert!(like_matches("%bar", "FooBar"));
        assert!(like_matches("f_o%", "fob and more"));
        assert!(like_matches("%", ""));
        assert!(like_matches("%o%o%", "foo"));
        assert!(!like_matches("foo", "FooBar"));
        assert!(!like_matches("_", ""));
        assert!(!like_matches("%x%", "foo"));
        assert!(like_matches("a%b%c", "aXbYbZc"));
    }

    #[test]
    fn test_predicate_matches() {
        let p = pred(0, ConstraintOp::Le, Field::IntField(3));
        assert!(predicate_matches(&p, &Field::IntField(3)));
        assert!(!predicate_matches(&p, &Field::IntField(4)));
        assert!(!predicate_matches(&p, &Field::Null));
        let p = pred(0, ConstraintOp::NotLike, text("std::%"));
        assert!(predicate_matches(&p, &text("ns::")));
        assert!(!predicate_matches(&p, &text("std::vector::")));
        assert!(!predicate_matches(&p, &Field::Null));
        let p = pred(0, ConstraintOp::Eq, Field::Null);
        assert!(!predicate_matches(&p, &Field::Null));
    }

    #[test]
    fn test_id_query() {
        let index = test_index();
        let syms = table("symbols", index.clone());
        let query = ScanQuery {
            table: String::from("symbols"),
            columns: all_columns(symbols::COUNT),
            predicates: vec![pred(symbols::ID, ConstraintOp::Eq, text("DEADBEEF"))],
            limit: None,
        };
        let result = Executor::execute(&query, &syms).unwrap();
        assert_eq!(result.rows().len(), 1);
        assert_eq!(result.rows()[0].row_id, 0xDEADBEEF);
        assert_eq!(result.rows()[0].get_field(symbols::NAME), Some(&text("Foo")));
        assert_eq!(index.requests().len(), 1);
    }

    #[test]
    fn test_fuzzy_results_are_rechecked() {
        let index = test_index();
        let syms = table("symbols", index);
        // The remote fuzzy search also returns FooBar and fob.
        let query = ScanQuery {
            table: String::from("symbols"),
            columns: vec![(symbols::NAME, String::from("Name"))],
            predicates: vec![pred(symbols::NAME, ConstraintOp::Eq, text("Foo"))],
            limit: None,
        };
        let result = Executor::execute(&query, &syms).unwrap();
        assert_eq!(result.rows().len(), 1);

        let query = ScanQuery {
            predicates: vec![pred(symbols::NAME, ConstraintOp::Like, text("fo%"))],
            ..query
        };
        let names: Vec<String> = Executor::execute(&query, &syms)
            .unwrap()
            .rows()
            .iter()
            .map(|r| r.get_field(0).unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["Foo", "FooBar", "fob"]);
    }

    #[test]
    fn test_refs_flags_and_limit() {
        let index = test_index();
        let refs_table = table("refs", index);
        let query = ScanQuery {
            table: String::from("refs"),
            columns: all_columns(refs::COUNT),
            predicates: vec![
                pred(refs::SYMBOL_ID, ConstraintOp::Eq, text("A")),
                pred(refs::FIRST_KIND, ConstraintOp::Eq, Field::IntField(1)),
                pred(refs::FIRST_KIND + 1, ConstraintOp::Eq, Field::IntField(0)),
                pred(refs::FIRST_KIND + 2, ConstraintOp::Eq, Field::IntField(0)),
                pred(refs::FIRST_KIND + 3, ConstraintOp::Eq, Field::IntField(0)),
            ],
            limit: None,
        };
        let result = Executor::execute(&query, &refs_table).unwrap();
        assert_eq!(result.rows().len(), 1);
        assert_eq!(
            result.rows()[0].get_field(refs::FIRST_KIND),
            Some(&Field::IntField(1))
        );

        let query = ScanQuery {
            predicates: vec![pred(refs::SYMBOL_ID, ConstraintOp::Eq, text("A"))],
            limit: Some(2),
            ..query
        };
        assert_eq!(Executor::execute(&query, &refs_table).unwrap().rows().len(), 2);
        let query = ScanQuery {
            limit: Some(0),
            ..query
        };
        assert!(Executor::execute(&query, &refs_table).unwrap().rows().is_empty());
    }

    #[test]
    fn test_relations_full_scan() {
        let index = test_index();
        let rel = table("overridden_by", index);
        let query = ScanQuery {
            table: String::from("overridden_by"),
            columns: all_columns(2),
            predicates: vec![pred(1, ConstraintOp::Eq, text("B"))],
            limit: None,
        };
        let result = Executor::execute(&query, &rel).unwrap();
        assert_eq!(result.rows().len(), 1);
        assert_eq!(result.rows()[0].get_field(0), Some(&text("A")));
    }

    #[test]
    fn test_render() {
        let result = QueryResult {
            columns: vec![String::from("Name"), String::from("Kind")],
            rows: vec![
                Row::new(vec![text("push_back"), Field::IntField(12)], 1),
                Row::new(vec![text("x"), Field::Null], 2),
            ],
        };
        let rendered = result.to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "Name      | Kind");
        assert_eq!(lines[1], "----------+-----");
        assert_eq!(lines[2], "push_back | 12");
        assert_eq!(lines[3], "x         | NULL");
        assert_eq!(lines[4], "(2 rows)");
    }
}
