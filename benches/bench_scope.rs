use autoimport::bindings::BindingsStack;
use autoimport::parser::parse_python;
use autoimport::scope::{missing_references, ScopeOptions};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// A realistic fragment mixing imports, functions, classes, comprehensions,
/// and control flow so the analyzer's full frame machinery gets exercised.
fn make_module(index: usize) -> String {
    format!(
        r#"
import os
import sys
from pathlib import Path

CONSTANT_{i} = {i}

def process_{i}(items, scale=CONSTANT_{i}):
    total = sum(x * scale for x in items if x > 0)
    return total

class Worker_{i}:
    base = CONSTANT_{i}

    def run(self, values):
        return [self.base + v for v in values]

def main_{i}():
    p = Path(".")
    w = Worker_{i}()
    return process_{i}(w.run([1, 2, 3])) + len(os.listdir(str(p)))

print(sys.version)
print(main_{i}())
"#,
        i = index
    )
}

fn bench_missing_references(c: &mut Criterion) {
    let bindings = BindingsStack::default();
    let opts = ScopeOptions::default();

    let small = make_module(0);
    let small_stmts = parse_python(&small, "small.py");
    c.bench_function("missing_references_single_module", |b| {
        b.iter(|| {
            let out = missing_references(black_box(&small_stmts), &bindings, opts);
            black_box(out);
        });
    });

    let large: String = (0..200).map(make_module).collect::<Vec<_>>().join("\n");
    let large_stmts = parse_python(&large, "large.py");
    c.bench_function("missing_references_large_module", |b| {
        b.iter(|| {
            let out = missing_references(black_box(&large_stmts), &bindings, opts);
            black_box(out);
        });
    });
}

criterion_group!(benches, bench_missing_references);
criterion_main!(benches);
