//! Dispatch Generator: first-match-wins C functions for a rule-set.
//!
//! For every node kind owning rules there is one `<prefix>_<set>_rule_<node>`
//! function trying that kind's rules in source order, and one
//! `<prefix>_<set>` switch forwarding on `kind`. Both return `NULL` when no
//! rewrite applies.

pub mod lower;

#[cfg(test)]
mod tests;

use log::debug;

use crate::cnames::CNames;
use crate::diagnostic::Diagnostic;
use crate::pattern::{Rule, RuleSet};
use crate::schema::Schema;

use lower::{lower_lhs, lower_rhs};

/// Name of the node parameter of every generated function.
const ROOT: &str = "n";

/// Generated C for one rule-set.
#[derive(Clone, Debug, Default)]
pub struct DispatchCode {
    /// Forward declarations, one per generated function.
    pub prototypes: Vec<String>,
    /// Function definitions: per-node functions in node order, then the
    /// top-level switch.
    pub functions: Vec<String>,
}

/// C function writer. Lines are indented with four spaces per level.
struct Writer {
    output: Vec<String>,
    indent: usize,
}

impl Writer {
    fn new() -> Self {
        Self {
            output: Vec::new(),
            indent: 0,
        }
    }

    fn line(&mut self, text: impl AsRef<str>) {
        self.output
            .push(format!("{}{}", "    ".repeat(self.indent), text.as_ref()));
    }

    fn open(&mut self, text: impl AsRef<str>) {
        self.line(text);
        self.indent += 1;
    }

    fn close(&mut self, text: &str) {
        self.indent -= 1;
        self.line(text);
    }

    fn finish(self) -> String {
        self.output.join("\n")
    }
}

/// Generate the dispatch functions of one rule-set.
pub fn generate(set: &RuleSet, schema: &Schema, names: &CNames) -> Result<DispatchCode, Diagnostic> {
    let mut code = DispatchCode::default();
    let signature = |name: &str| format!("{0} *{1}({0} *{2})", names.node_type(), name, ROOT);

    for node in set.nodes() {
        let fn_name = names.rule_fn(&set.name, &schema.node(node).name);
        let rules: Vec<&Rule> = set.rules_for(node).collect();
        debug!("{}: {} rules", fn_name, rules.len());
        code.prototypes.push(format!("{};", signature(&fn_name)));
        code.functions
            .push(rule_function(&signature(&fn_name), &rules, schema, names)?);
    }

    let dispatcher = names.dispatcher(&set.name);
    code.prototypes.push(format!("{};", signature(&dispatcher)));
    code.functions.push(switch_function(
        &signature(&dispatcher),
        set,
        schema,
        names,
    ));
    Ok(code)
}

/// One function trying `rules` (all rooted at the same kind) in order.
fn rule_function(
    signature: &str,
    rules: &[&Rule],
    schema: &Schema,
    names: &CNames,
) -> Result<String, Diagnostic> {
    let mut w = Writer::new();
    w.open(format!("{} {{", signature));
    for rule in rules {
        let lowered = lower_lhs(&rule.lhs, ROOT, schema, names);
        let result = lower_rhs(&rule.rhs, &lowered, names)?;

        w.line(format!("// {}", rule.to_source(schema).replace('\n', " ")));
        w.open("{");
        for b in &lowered.bindings {
            w.line(format!("{} *{} = {};", names.node_type(), names.var(&b.name), b.path));
        }
        for b in &lowered.bindings {
            let var = names.var(&b.name);
            if var != result {
                w.line(format!("(void){};", var));
            }
        }
        match lowered.condition() {
            Some(cond) => {
                w.open(format!("if ({}) {{", cond));
                w.line(format!("return {};", result));
                w.close("}");
            }
            None => w.line(format!("return {};", result)),
        }
        w.close("}");
    }
    w.line("return NULL;");
    w.close("}");
    Ok(w.finish())
}

/// `switch (n->kind)` forwarding to the per-node functions.
fn switch_function(signature: &str, set: &RuleSet, schema: &Schema, names: &CNames) -> String {
    let mut w = Writer::new();
    w.open(format!("{} {{", signature));
    w.open(format!("switch ({}->kind) {{", ROOT));
    for node in set.nodes() {
        let name = &schema.node(node).name;
        w.line(format!(
            "case {}: return {}({});",
            names.kind(name),
            names.rule_fn(&set.name, name),
            ROOT
        ));
    }
    w.line("default: return NULL;");
    w.close("}");
    w.close("}");
    w.finish()
}
