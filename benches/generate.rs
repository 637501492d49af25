//! Pipeline benchmark over synthetic schemas and rule-sets.
//!
//! Measures each stage separately, then the whole run:
//! 1. Schema loading
//! 2. Rule-set compilation
//! 3. Full generation (schema, rules, dispatch, emit)

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use seagen::cnames::CNames;
use seagen::pattern::compile_rule_set;
use seagen::source::SourceFile;
use seagen::{dispatch, generate, schema, GenerateOptions, Project};

/// `n` binary nodes plus a constant with a payload.
fn synthetic_schema(n: usize) -> String {
    let mut text = String::from("(opb 0 const { i64 value; })\n(op 1 neg)\n");
    for i in 0..n {
        text.push_str(&format!("(op 2 bin{})\n", i));
    }
    text
}

/// Four rules per binary node, mixing constraints, nesting and bindings.
fn synthetic_rules(n: usize) -> String {
    let mut text = String::new();
    for i in 0..n {
        text.push_str(&format!("(bin{0} x (const [value 0])) => x\n", i));
        text.push_str(&format!("(bin{0} (neg (neg a)) b) => a\n", i));
        text.push_str(&format!("r:(bin{0} _ (const [value 1])) => r\n", i));
        text.push_str(&format!("(bin{0} x _) => x\n", i));
    }
    text
}

fn bench_schema_load(c: &mut Criterion) {
    let small = synthetic_schema(10);
    let large = synthetic_schema(200);

    let mut group = c.benchmark_group("schema_load");
    group.bench_function("10_nodes", |b| b.iter(|| schema::load(black_box(&small), 0)));
    group.bench_function("200_nodes", |b| b.iter(|| schema::load(black_box(&large), 0)));
    group.finish();
}

fn bench_rule_compile(c: &mut Criterion) {
    let Ok(schema) = schema::load(&synthetic_schema(50), 0) else {
        panic!("synthetic schema should load");
    };
    let rules = synthetic_rules(50);
    let names = CNames::new("p9");

    let mut group = c.benchmark_group("rules");
    group.bench_function("compile_200", |b| {
        b.iter(|| compile_rule_set("peep", black_box(&rules), 1, &schema))
    });
    group.bench_function("compile_and_dispatch_200", |b| {
        b.iter(|| {
            compile_rule_set("peep", black_box(&rules), 1, &schema)
                .and_then(|set| dispatch::generate(&set, &schema, &names))
        })
    });
    group.finish();
}

fn bench_generate(c: &mut Criterion) {
    let mut project = Project::new(SourceFile::new("ir.sea", synthetic_schema(50)));
    project.add_rule_set("peep", SourceFile::new("peep.rules", synthetic_rules(50)));
    project.add_rule_set("fold", SourceFile::new("fold.rules", synthetic_rules(10)));
    let options = GenerateOptions::default();

    c.bench_function("generate_end_to_end", |b| {
        b.iter(|| generate(black_box(&project), &options))
    });
}

criterion_group!(benches, bench_schema_load, bench_rule_compile, bench_generate);
criterion_main!(benches);
