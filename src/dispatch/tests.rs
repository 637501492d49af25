use super::lower::{lower_lhs, lower_rhs, Binding, Lowered};
use super::*;
use crate::pattern::compile_rule_set;
use crate::schema;

fn setup(schema_src: &str, rules_src: &str) -> (Schema, RuleSet) {
    let schema = schema::load(schema_src, 0).unwrap();
    let set = compile_rule_set("peep", rules_src, 1, &schema).unwrap();
    (schema, set)
}

fn generate_ok(schema_src: &str, rules_src: &str) -> DispatchCode {
    let (schema, set) = setup(schema_src, rules_src);
    generate(&set, &schema, &CNames::new("p9")).unwrap()
}

fn lowered(schema_src: &str, rule_src: &str) -> Lowered {
    let (schema, set) = setup(schema_src, rule_src);
    lower_lhs(&set.rules[0].lhs, "n", &schema, &CNames::new("p9"))
}

fn binding(name: &str, path: &str) -> Binding {
    Binding {
        name: name.to_string(),
        path: path.to_string(),
    }
}

// --- Lowering ---

#[test]
fn test_lower_scenario_a() {
    let l = lowered("(opb 0 const { i64 value; i64 width; })(op 2 add)", "(add x (const [value 0])) => x");
    assert_eq!(l.bindings, [binding("x", "n->exprs[0]")]);
    assert_eq!(
        l.conditions,
        [
            "n->exprs[1]->kind == P9_CONST",
            "P9_EXTRA(const, n->exprs[1])->value == (0)",
        ]
    );
}

#[test]
fn test_lower_root_has_no_kind_test() {
    let l = lowered("(op 2 add)", "r:(add _ _) => r");
    assert_eq!(l.bindings, [binding("r", "n")]);
    assert!(l.conditions.is_empty());
    assert_eq!(l.condition(), None);
}

#[test]
fn test_constraint_value_keeps_its_precedence() {
    let l = lowered(
        "(opb 0 const { i64 value; })(op 2 add)",
        "(add x (const [value 0 || 1])) => x",
    );
    assert_eq!(
        l.condition().as_deref(),
        Some("n->exprs[1]->kind == P9_CONST && P9_EXTRA(const, n->exprs[1])->value == (0 || 1)")
    );
    let l = lowered(
        "(opb 0 const { i64 value; })(op 2 add)",
        "(add (const [value k ? 1 : 2]) x) => x",
    );
    assert_eq!(
        l.conditions[1],
        "P9_EXTRA(const, n->exprs[0])->value == (k ? 1 : 2)"
    );
}

#[test]
fn test_lower_root_constraints() {
    let l = lowered("(opb 0 const { i64 value; })", "c:(const [value 1]) => c");
    assert_eq!(l.conditions, ["P9_EXTRA(const, n)->value == (1)"]);
    assert_eq!(l.bindings, [binding("c", "n")]);
}

#[test]
fn test_lower_traversal_order() {
    let l = lowered(
        "(opb 0 const { i64 value; i64 width; })(op 1 neg)(op 2 add)",
        "(add (neg a:(neg b)) (const [value 2] [width 8])) => b",
    );
    assert_eq!(
        l.conditions,
        [
            "n->exprs[0]->kind == P9_NEG",
            "n->exprs[0]->exprs[0]->kind == P9_NEG",
            "n->exprs[1]->kind == P9_CONST",
            "P9_EXTRA(const, n->exprs[1])->value == (2)",
            "P9_EXTRA(const, n->exprs[1])->width == (8)",
        ]
    );
    assert_eq!(
        l.bindings,
        [
            binding("a", "n->exprs[0]->exprs[0]"),
            binding("b", "n->exprs[0]->exprs[0]->exprs[0]"),
        ]
    );
}

#[test]
fn test_lower_alias_and_variable_at_same_position() {
    let l = lowered("(op 1 neg)", "(neg whole:(x)) => whole");
    assert_eq!(
        l.bindings,
        [binding("whole", "n->exprs[0]"), binding("x", "n->exprs[0]")]
    );
    assert!(l.conditions.is_empty());
}

#[test]
fn test_condition_joins_with_and() {
    let l = Lowered {
        conditions: vec!["a".to_string(), "b".to_string()],
        bindings: Vec::new(),
    };
    assert_eq!(l.condition().as_deref(), Some("a && b"));
}

#[test]
fn test_lower_rhs_returns_bound_local() {
    let (schema, set) = setup("(op 2 add)", "(add x y) => y");
    let names = CNames::new("p9");
    let l = lower_lhs(&set.rules[0].lhs, "n", &schema, &names);
    assert_eq!(lower_rhs(&set.rules[0].rhs, &l, &names).unwrap(), "v_y");
}

#[test]
fn test_lower_rhs_rejects_node() {
    let (schema, set) = setup("(op 2 add)(op 2 mul)", "(add x y) => (mul y x)");
    let names = CNames::new("p9");
    let l = lower_lhs(&set.rules[0].lhs, "n", &schema, &names);
    let err = lower_rhs(&set.rules[0].rhs, &l, &names).unwrap_err();
    assert!(err.message.starts_with("unsupported right-hand side"), "{}", err.message);
    assert_eq!(err.span, set.rules[0].rhs.span);
}

// --- Generated functions ---

#[test]
fn test_scenario_a_rule_function() {
    let code = generate_ok("(opb 0 const { i64 value; i64 width; })(op 2 add)", "(add x (const [value 0])) => x");
    insta::assert_snapshot!(code.functions[0], @r"
    p9_t *p9_peep_rule_add(p9_t *n) {
        // (add x (const [value 0])) => x
        {
            p9_t *v_x = n->exprs[0];
            if (n->exprs[1]->kind == P9_CONST && P9_EXTRA(const, n->exprs[1])->value == (0)) {
                return v_x;
            }
        }
        return NULL;
    }
    ");
}

#[test]
fn test_switch_function() {
    let code = generate_ok(
        "(opb 0 const { i64 value; i64 width; })(op 1 neg)(op 2 add)",
        "(neg (neg x)) => x\n(add x (const [value 0])) => x",
    );
    insta::assert_snapshot!(code.functions[2], @r"
    p9_t *p9_peep(p9_t *n) {
        switch (n->kind) {
            case P9_NEG: return p9_peep_rule_neg(n);
            case P9_ADD: return p9_peep_rule_add(n);
            default: return NULL;
        }
    }
    ");
}

#[test]
fn test_functions_follow_node_declaration_order() {
    let code = generate_ok(
        "(opb 0 const { i64 value; i64 width; })(op 1 neg)(op 2 add)",
        "(add x (const [value 0])) => x\n(neg (neg x)) => x",
    );
    assert_eq!(
        code.prototypes,
        [
            "p9_t *p9_peep_rule_neg(p9_t *n);",
            "p9_t *p9_peep_rule_add(p9_t *n);",
            "p9_t *p9_peep(p9_t *n);",
        ]
    );
    assert!(code.functions[0].starts_with("p9_t *p9_peep_rule_neg(p9_t *n) {"));
    assert!(code.functions[1].starts_with("p9_t *p9_peep_rule_add(p9_t *n) {"));
}

#[test]
fn test_first_match_wins_in_source_order() {
    let code = generate_ok(
        "(opb 0 const { i64 value; i64 width; })(op 2 add)(op 1 neg)",
        "(add x _) => x
         (neg (neg y)) => y
         (add x (const [value 0])) => x",
    );
    let add = &code.functions[0];
    let general = add.find("// (add x _) => x").unwrap();
    let specific = add.find("// (add x (const [value 0])) => x").unwrap();
    assert!(general < specific);
    // The looser rule has no condition, so it returns unconditionally first.
    let first_return = add.find("return v_x;").unwrap();
    assert!(first_return < specific);
}

#[test]
fn test_unused_bindings_are_voided() {
    let code = generate_ok("(op 2 add)", "(add x y) => y");
    let f = &code.functions[0];
    assert!(f.contains("p9_t *v_x = n->exprs[0];"));
    assert!(f.contains("p9_t *v_y = n->exprs[1];"));
    assert!(f.contains("(void)v_x;"));
    assert!(!f.contains("(void)v_y;"));
    assert!(f.contains("        return v_y;\n    }\n    return NULL;"));
}

#[test]
fn test_empty_rule_set_still_has_dispatcher() {
    let code = generate_ok("(op 2 add)", "");
    assert_eq!(code.prototypes, ["p9_t *p9_peep(p9_t *n);"]);
    assert_eq!(code.functions.len(), 1);
    assert!(code.functions[0].contains("default: return NULL;"));
    assert!(!code.functions[0].contains("case "));
}

#[test]
fn test_generate_rejects_unsupported_rhs() {
    let (schema, set) = setup("(op 2 add)(op 2 mul)", "(add x y) => (mul y x)");
    let err = generate(&set, &schema, &CNames::new("p9")).unwrap_err();
    assert!(err.message.contains("building new nodes is not implemented"));
}

#[test]
fn test_custom_prefix() {
    let (schema, set) = setup("(op 1 neg)", "(neg (neg x)) => x");
    let code = generate(&set, &schema, &CNames::new("sea")).unwrap();
    assert!(code.functions[0].starts_with("sea_t *sea_peep_rule_neg(sea_t *n) {"));
    assert!(code.functions[0].contains("n->exprs[0]->kind == SEA_NEG"));
}
