use std::collections::HashSet;

use log::{debug, info};

use crate::diagnostic::Diagnostic;
use crate::schema::{is_identifier, Schema};
use crate::span::{Span, Spanned};
use crate::term::{self, Guard, Term};

use super::{Constraint, Expr, Head, Rule, RuleSet};

/// Variable names bound so far by the left-hand side of one rule.
pub type Bound = HashSet<String>;

/// Read and compile one rule-set source.
pub fn compile_rule_set(
    name: &str,
    source: &str,
    file_id: u16,
    schema: &Schema,
) -> Result<RuleSet, Diagnostic> {
    let items = term::read_items(source, file_id)?;
    compile_rules(name, &items, schema)
}

/// Compile `lhs => rhs` triples in order.
pub fn compile_rules(
    name: &str,
    items: &[Spanned<Term>],
    schema: &Schema,
) -> Result<RuleSet, Diagnostic> {
    let mut set = RuleSet::new(name);
    let mut rest = items;
    while !rest.is_empty() {
        let [lhs, sep, rhs, tail @ ..] = rest else {
            let span = rest
                .iter()
                .skip(1)
                .fold(rest[0].span, |acc, t| acc.merge(t.span));
            return Err(Diagnostic::error(
                "incomplete rule: expected `<pattern> => <pattern>`".to_string(),
                span,
            )
            .with_help("every rule needs a left side, `=>` and a right side".to_string()));
        };
        check_separator(sep)?;
        let rule = compile_rule(lhs, rhs, schema)?;
        debug!(
            "{}: rule {} for `{}`: {}",
            name,
            set.rules.len(),
            schema.node(rule.root).name,
            rule.to_source(schema)
        );
        set.push(rule);
        rest = tail;
    }
    info!("rule-set {}: {} rules", name, set.rules.len());
    Ok(set)
}

fn check_separator(sep: &Spanned<Term>) -> Result<(), Diagnostic> {
    match &sep.node {
        Term::Atom(a) if a == "=>" => Ok(()),
        Term::Guard(Guard::And) => Err(Diagnostic::error(
            "guard conditions are not supported in rule matching".to_string(),
            sep.span,
        )
        .with_help("express the condition as a field constraint `[field value]`".to_string())),
        other => Err(Diagnostic::error(
            format!(
                "unhandled rule: expected `=>` between patterns, found {} `{}`",
                other.kind_name(),
                other
            ),
            sep.span,
        )),
    }
}

fn compile_rule(
    lhs: &Spanned<Term>,
    rhs: &Spanned<Term>,
    schema: &Schema,
) -> Result<Rule, Diagnostic> {
    let mut bound = Bound::new();
    let lhs_expr = parse_match(lhs, true, &mut bound, schema)?;
    let root = match &lhs_expr.head {
        Head::Node(id) => *id,
        Head::Var(name) => {
            return Err(Diagnostic::error(
                format!("left-hand side must match a node, found variable `{}`", name),
                lhs_expr.span,
            ))
        }
        Head::Wildcard => {
            return Err(Diagnostic::error(
                "left-hand side must match a node, found `_`".to_string(),
                lhs_expr.span,
            ))
        }
    };
    let rhs_expr = parse_match(rhs, false, &mut bound, schema)?;
    Ok(Rule {
        lhs: lhs_expr,
        rhs: rhs_expr,
        root,
        span: lhs.span.merge(rhs.span),
    })
}

/// Parse one pattern. On the left side (`is_lhs`) variables and `name:(...)`
/// aliases are added to `bound`; on the right side they must already be in it.
pub fn parse_match(
    term: &Spanned<Term>,
    is_lhs: bool,
    bound: &mut Bound,
    schema: &Schema,
) -> Result<Expr, Diagnostic> {
    match &term.node {
        Term::Atom(name) => resolve(name, term.span, Vec::new(), Vec::new(), is_lhs, bound, schema),
        Term::List(items) => parse_list(items, term.span, is_lhs, bound, schema),
        Term::NamedList { name, items } => {
            if !is_lhs {
                return Err(Diagnostic::error(
                    format!("binding `{}:(...)` is only allowed on the left-hand side", name),
                    term.span,
                ));
            }
            bind(name, term.span, bound, schema)?;
            let mut expr = parse_list(items, term.span, is_lhs, bound, schema)?;
            expr.binding = Some(name.clone());
            Ok(expr)
        }
        other => Err(Diagnostic::error(
            format!("expected a pattern, found {} `{}`", other.kind_name(), other),
            term.span,
        )),
    }
}

/// `(head child... [field value]...)`
fn parse_list(
    items: &[Spanned<Term>],
    span: Span,
    is_lhs: bool,
    bound: &mut Bound,
    schema: &Schema,
) -> Result<Expr, Diagnostic> {
    let Some((head, rest)) = items.split_first() else {
        return Err(Diagnostic::error("empty pattern list `()`".to_string(), span));
    };
    let Term::Atom(head_name) = &head.node else {
        return Err(Diagnostic::error(
            format!(
                "pattern head must be a name, found {} `{}`",
                head.node.kind_name(),
                head.node
            ),
            head.span,
        ));
    };

    let mut children = Vec::new();
    let mut constraints: Vec<Constraint> = Vec::new();
    for item in rest {
        match &item.node {
            Term::Field { field, value } => constraints.push(Constraint {
                field: field.clone(),
                value: value.clone(),
                span: item.span,
            }),
            _ if !constraints.is_empty() => {
                return Err(Diagnostic::error(
                    format!("match after condition: `{}` follows a field constraint", item.node),
                    item.span,
                )
                .with_help("field constraints must come after all inputs".to_string()));
            }
            _ => children.push(item),
        }
    }

    resolve(head_name, span, children, constraints, is_lhs, bound, schema)
}

/// Resolve a head name, check it against its children and constraints, then
/// parse the children left to right.
fn resolve(
    name: &str,
    span: Span,
    children: Vec<&Spanned<Term>>,
    constraints: Vec<Constraint>,
    is_lhs: bool,
    bound: &mut Bound,
    schema: &Schema,
) -> Result<Expr, Diagnostic> {
    let head = if name == "_" {
        if !is_lhs {
            return Err(Diagnostic::error(
                "wildcard `_` cannot be used on the right-hand side".to_string(),
                span,
            ));
        }
        Head::Wildcard
    } else if let Some(id) = schema.node_id(name) {
        let inputs = schema.node(id).inputs as usize;
        if children.len() != inputs {
            return Err(Diagnostic::error(
                format!(
                    "wrong number of inputs: node `{}` takes {}, pattern has {}",
                    name,
                    inputs,
                    children.len()
                ),
                span,
            ));
        }
        if let (None, Some(c)) = (&schema.node(id).payload, constraints.first()) {
            return Err(Diagnostic::error(
                format!("node `{}` has no payload fields", name),
                c.span,
            )
            .with_help(format!(
                "declare the fields with `(opb {} {} {{ ... }})`",
                inputs, name
            )));
        }
        Head::Node(id)
    } else if schema.group_id(name).is_some() {
        return Err(Diagnostic::error(
            format!("groups not supported in rule matching: `{}` is a group", name),
            span,
        )
        .with_help("write one rule per member node".to_string()));
    } else {
        if is_lhs {
            bind(name, span, bound, schema)?;
        } else if !bound.contains(name) {
            return Err(Diagnostic::error(format!("unknown variable `{}`", name), span)
                .with_help("right-hand side variables must be bound on the left-hand side".to_string()));
        }
        Head::Var(name.to_string())
    };

    if !matches!(head, Head::Node(_)) {
        if !children.is_empty() {
            return Err(Diagnostic::error(
                format!("`{}` is not a node and cannot take inputs", name),
                span,
            ));
        }
        if let Some(c) = constraints.first() {
            return Err(Diagnostic::error(
                format!("field constraint `[{} {}]` requires a node pattern", c.field, c.value),
                c.span,
            ));
        }
    }

    let children = children
        .into_iter()
        .map(|child| parse_match(child, is_lhs, bound, schema))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Expr {
        head,
        children,
        binding: None,
        constraints,
        span,
    })
}

/// Introduce a new left-hand side name.
fn bind(name: &str, span: Span, bound: &mut Bound, schema: &Schema) -> Result<(), Diagnostic> {
    if !is_identifier(name) {
        return Err(Diagnostic::error(
            format!("`{}` is not a valid variable name", name),
            span,
        )
        .with_help("variables become C identifiers: use [A-Za-z_][A-Za-z0-9_]*".to_string()));
    }
    if schema.node_id(name).is_some() {
        return Err(Diagnostic::error(
            format!("binding `{}` shadows the node of the same name", name),
            span,
        ));
    }
    if !bound.insert(name.to_string()) {
        return Err(Diagnostic::error(
            format!("variable `{}` is already defined", name),
            span,
        ));
    }
    Ok(())
}
