use criterion::{black_box, criterion_group, criterion_main, Criterion};
use index::memory::MemoryIndex;
use index::records::{Position, Symbol, SymbolLocation};
use std::sync::Arc;
use vtab::schema::symbols;
use vtab::{Constraint, ConstraintOp, Module, VirtualTable};

/// The in-memory index records every request, so the benches clear it as
/// they go.
fn symbols_table(n: usize) -> (VirtualTable, Arc<MemoryIndex>) {
    let mut index = MemoryIndex::new();
    for i in 1..=n {
        let mut sym = Symbol::named(&format!("{:X}", i), &format!("sym{}", i), "bench::");
        sym.definition = Some(SymbolLocation::new(
            "/bench/file.cc",
            Position::new(i as u32, 0),
            Position::new(i as u32, 10),
        ));
        index.add_symbol(sym);
    }
    let index = Arc::new(index);
    let table = Module::create_with_index(
        &["symql", "main", "syms", "symbols", "memory:0"],
        index.clone(),
    )
    .unwrap();
    (table, index)
}

/// Drains a cursor, projecting every column of every row.
fn scan(table: &VirtualTable, constraints: &[Constraint], values: &[common::Field]) -> usize {
    let plan = table.best_index(constraints);
    let mut cursor = table.open();
    cursor.filter(&plan, values).unwrap();
    let mut rows = 0;
    while !cursor.eof() {
        for col in 0..symbols::COUNT {
            black_box(cursor.column(col).unwrap());
        }
        black_box(cursor.rowid().unwrap());
        rows += 1;
        cursor.next().unwrap();
    }
    rows
}

pub fn cursor_benchmark(c: &mut Criterion) {
    let (table, index) = symbols_table(10_000);
    c.bench_function("full scan 10k symbols", |b| {
        b.iter(|| {
            index.clear_requests();
            scan(&table, &[], &[])
        })
    });

    let by_id = [Constraint::new(symbols::ID, ConstraintOp::Eq)];
    let id = [common::Field::TextField(String::from("1F4"))];
    c.bench_function("lookup by id", |b| {
        b.iter(|| {
            index.clear_requests();
            scan(&table, &by_id, &id)
        })
    });
}

pub fn planner_benchmark(c: &mut Criterion) {
    let (table, _) = symbols_table(1);
    let constraints: Vec<Constraint> = (0..symbols::COUNT)
        .map(|col| Constraint::new(col, ConstraintOp::Like))
        .collect();
    c.bench_function("plan all columns", |b| {
        b.iter(|| table.best_index(black_box(&constraints)))
    });
}

criterion_group!(benches, cursor_benchmark, planner_benchmark);
criterion_main!(benches);
