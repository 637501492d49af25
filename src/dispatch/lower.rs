use crate::cnames::CNames;
use crate::diagnostic::Diagnostic;
use crate::pattern::{Expr, Head};
use crate::schema::Schema;

/// `name = position`, computed before the condition is tested.
#[derive(Clone, Debug, PartialEq)]
pub struct Binding {
    pub name: String,
    pub path: String,
}

/// Accumulated match of one left-hand side: conditions to AND together and
/// bindings to hoist, both in traversal order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Lowered {
    pub conditions: Vec<String>,
    pub bindings: Vec<Binding>,
}

impl Lowered {
    /// The C condition, or `None` when the pattern always matches.
    pub fn condition(&self) -> Option<String> {
        if self.conditions.is_empty() {
            None
        } else {
            Some(self.conditions.join(" && "))
        }
    }
}

/// Lower a left-hand side matched at `root`. The root's kind is already
/// known from the dispatch switch, so only its constraints are tested.
pub fn lower_lhs(expr: &Expr, root: &str, schema: &Schema, names: &CNames) -> Lowered {
    lower(expr, root.to_string(), true, Lowered::default(), schema, names)
}

fn lower(
    expr: &Expr,
    pos: String,
    is_root: bool,
    mut acc: Lowered,
    schema: &Schema,
    names: &CNames,
) -> Lowered {
    if let Some(alias) = &expr.binding {
        acc.bindings.push(Binding {
            name: alias.clone(),
            path: pos.clone(),
        });
    }

    match &expr.head {
        Head::Wildcard => {}
        Head::Var(name) => acc.bindings.push(Binding {
            name: name.clone(),
            path: pos.clone(),
        }),
        Head::Node(id) => {
            let node = schema.node(*id);
            if !is_root {
                acc.conditions
                    .push(format!("{}->kind == {}", pos, names.kind(&node.name)));
            }
            // The value is raw C text and may hold an operator of any precedence.
            for c in &expr.constraints {
                acc.conditions.push(format!(
                    "{}({}, {})->{} == ({})",
                    names.extra_macro(),
                    node.name,
                    pos,
                    c.field,
                    c.value
                ));
            }
        }
    }

    expr.children.iter().enumerate().fold(acc, |acc, (i, child)| {
        lower(child, format!("{}->exprs[{}]", pos, i), false, acc, schema, names)
    })
}

/// A right-hand side must be a single bound name; it lowers to that name's
/// local.
pub fn lower_rhs(expr: &Expr, lowered: &Lowered, names: &CNames) -> Result<String, Diagnostic> {
    let unsupported = |what: &str| {
        Diagnostic::error(
            format!("unsupported right-hand side: {}", what),
            expr.span,
        )
        .with_help("a rewrite may only return a variable bound on the left-hand side".to_string())
    };
    match &expr.head {
        Head::Var(name)
            if expr.children.is_empty()
                && expr.constraints.is_empty()
                && expr.binding.is_none() =>
        {
            if lowered.bindings.iter().any(|b| &b.name == name) {
                Ok(names.var(name))
            } else {
                Err(unsupported(&format!("`{}` is not bound by the pattern", name)))
            }
        }
        Head::Var(_) => Err(unsupported("variable with inputs or constraints")),
        Head::Node(_) => Err(unsupported("building new nodes is not implemented")),
        Head::Wildcard => Err(unsupported("`_`")),
    }
}
