use log::debug;

use crate::diagnostic::Diagnostic;
use crate::source::line_col;
use crate::span::{Span, Spanned};
use crate::term::{self, Number, Term};

use super::{GroupDef, NodeDef, NodeId, Schema};

/// Top-level schema forms.
enum Form {
    /// `(op inputs name)` or `(opb inputs name {body})`
    Node {
        name: Spanned<String>,
        inputs: Spanned<Term>,
        payload: Option<String>,
    },
    /// `(group name (node...))`
    Group {
        name: Spanned<String>,
        members: Vec<Spanned<String>>,
    },
    /// Anything else. Reported in a batch once the whole file was read.
    Unknown(Diagnostic),
}

/// A group whose members are resolved after every node is known.
struct PendingGroup {
    name: Spanned<String>,
    members: Vec<Spanned<String>>,
    span: Span,
}

/// Load a schema source. Unknown top-level forms are collected and reported
/// together; every other fault stops loading at once.
pub fn load(source: &str, file_id: u16) -> Result<Schema, Vec<Diagnostic>> {
    let items = term::read_items(source, file_id).map_err(|d| vec![d])?;

    let mut schema = Schema::default();
    let mut unknown: Vec<Diagnostic> = Vec::new();

    let pending = match read_forms(&mut schema, &items, source, &mut unknown) {
        Ok(pending) => pending,
        Err(fatal) => {
            unknown.push(fatal);
            return Err(unknown);
        }
    };
    if !unknown.is_empty() {
        return Err(unknown);
    }

    for group in pending {
        let def = resolve_group(&schema, group).map_err(|d| vec![d])?;
        debug!("group {} ({} members)", def.name, def.members.len());
        schema.push_group(def);
    }

    debug!(
        "schema: {} nodes, {} groups",
        schema.nodes().len(),
        schema.groups().len()
    );
    Ok(schema)
}

/// Declare nodes in order and collect groups for later resolution.
fn read_forms(
    schema: &mut Schema,
    items: &[Spanned<Term>],
    source: &str,
    unknown: &mut Vec<Diagnostic>,
) -> Result<Vec<PendingGroup>, Diagnostic> {
    let mut pending: Vec<PendingGroup> = Vec::new();
    for item in items {
        match classify(item)? {
            Form::Node {
                name,
                inputs,
                payload,
            } => {
                let def = check_node(schema, name, &inputs, payload, item.span, source)?;
                debug!(
                    "node {} ({} inputs{})",
                    def.name,
                    def.inputs,
                    if def.payload.is_some() { ", payload" } else { "" }
                );
                schema.push_node(def);
            }
            Form::Group { name, members } => {
                if let Some(prev) = pending.iter().find(|g| g.name.node == name.node) {
                    return Err(Diagnostic::error(
                        format!("group `{}` already exists", name.node),
                        name.span,
                    )
                    .with_note(format!(
                        "first declared on line {}",
                        line_col(source, prev.span.start as usize).0
                    )));
                }
                if members.is_empty() {
                    return Err(Diagnostic::error(
                        format!("group `{}` has no members", name.node),
                        item.span,
                    )
                    .with_help("list at least one node: `(group name (node...))`".to_string()));
                }
                pending.push(PendingGroup {
                    name,
                    members,
                    span: item.span,
                });
            }
            Form::Unknown(d) => unknown.push(d),
        }
    }
    Ok(pending)
}

fn classify(item: &Spanned<Term>) -> Result<Form, Diagnostic> {
    let Term::List(parts) = &item.node else {
        return Ok(Form::Unknown(Diagnostic::error(
            format!("unknown top-level {} `{}`", item.node.kind_name(), item.node),
            item.span,
        )
        .with_help("expected `(op ...)`, `(opb ...)` or `(group ...)`".to_string())));
    };
    let head = parts.first().and_then(|p| p.node.as_atom());
    match head {
        Some("op") => match parts.as_slice() {
            [_, inputs, name] => Ok(Form::Node {
                name: atom_name(name, "op")?,
                inputs: inputs.clone(),
                payload: None,
            }),
            _ => Err(malformed(item.span, "op", "(op <inputs> <name>)")),
        },
        Some("opb") => match parts.as_slice() {
            [_, inputs, name, body] => {
                let name = atom_name(name, "opb")?;
                let Term::Code(body) = &body.node else {
                    return Err(Diagnostic::error(
                        format!(
                            "payload of node `{}` must be a `{{ ... }}` block, found {}",
                            name.node,
                            body.node.kind_name()
                        ),
                        body.span,
                    ));
                };
                Ok(Form::Node {
                    name,
                    inputs: inputs.clone(),
                    payload: Some(body.clone()),
                })
            }
            _ => Err(malformed(item.span, "opb", "(opb <inputs> <name> { <fields> })")),
        },
        Some("group") => match parts.as_slice() {
            [_, name, members] => {
                let name = atom_name(name, "group")?;
                let Term::List(list) = &members.node else {
                    return Err(malformed(item.span, "group", "(group <name> (<node>...))"));
                };
                let members = list
                    .iter()
                    .map(|m| atom_name(m, "group"))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Form::Group { name, members })
            }
            _ => Err(malformed(item.span, "group", "(group <name> (<node>...))")),
        },
        _ => {
            let what = match parts.first() {
                Some(first) => format!("unknown top-level form `{}`", first.node),
                None => "unknown top-level form `()`".to_string(),
            };
            Ok(Form::Unknown(
                Diagnostic::error(what, item.span).with_help(
                    "expected `(op ...)`, `(opb ...)` or `(group ...)`".to_string(),
                ),
            ))
        }
    }
}

fn atom_name(term: &Spanned<Term>, form: &str) -> Result<Spanned<String>, Diagnostic> {
    match &term.node {
        Term::Atom(name) => Ok(Spanned::new(name.clone(), term.span)),
        other => Err(Diagnostic::error(
            format!(
                "expected a name in `{}` form, found {} `{}`",
                form,
                other.kind_name(),
                other
            ),
            term.span,
        )),
    }
}

fn malformed(span: Span, form: &str, shape: &str) -> Diagnostic {
    Diagnostic::error(format!("malformed `{}` form", form), span)
        .with_help(format!("expected `{}`", shape))
}

/// Name uniqueness, then name shape, then arity.
fn check_node(
    schema: &Schema,
    name: Spanned<String>,
    inputs: &Spanned<Term>,
    payload: Option<String>,
    span: Span,
    source: &str,
) -> Result<NodeDef, Diagnostic> {
    if let Some(prev) = schema.node_id(&name.node) {
        let prev = schema.node(prev);
        return Err(
            Diagnostic::error(format!("node `{}` already exists", name.node), name.span)
                .with_note(format!(
                    "first declared on line {}",
                    line_col(source, prev.span.start as usize).0
                )),
        );
    }
    if !is_identifier(&name.node) || name.node == "_" {
        return Err(Diagnostic::error(
            format!("node name `{}` is not a valid identifier", name.node),
            name.span,
        )
        .with_help("node names become C identifiers: use [a-z_][a-z0-9_]*".to_string()));
    }
    if name.node.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(Diagnostic::error(
            format!("node `{}` should be lowercase", name.node),
            name.span,
        ));
    }
    let inputs = match inputs.node {
        Term::Number(Number::Int(n)) if n >= 0 && n <= u32::MAX as i64 => n as u32,
        Term::Number(Number::Int(n)) if n < 0 => {
            return Err(Diagnostic::error(
                format!("node `{}` has a negative input count {}", name.node, n),
                inputs.span,
            ))
        }
        _ => {
            return Err(Diagnostic::error(
                format!(
                    "input count of node `{}` must be a non-negative integer, found `{}`",
                    name.node, inputs.node
                ),
                inputs.span,
            ))
        }
    };
    Ok(NodeDef {
        name: name.node,
        inputs,
        payload,
        span,
    })
}

/// Members must exist, be distinct, and share the first member's arity.
fn resolve_group(schema: &Schema, group: PendingGroup) -> Result<GroupDef, Diagnostic> {
    let mut members: Vec<NodeId> = Vec::with_capacity(group.members.len());
    for member in &group.members {
        let Some(id) = schema.node_id(&member.node) else {
            return Err(Diagnostic::error(
                format!(
                    "group `{}` member `{}` is not a declared node",
                    group.name.node, member.node
                ),
                member.span,
            ));
        };
        if members.contains(&id) {
            return Err(Diagnostic::error(
                format!(
                    "group `{}` lists node `{}` more than once",
                    group.name.node, member.node
                ),
                member.span,
            ));
        }
        if let Some(&first) = members.first() {
            let first = schema.node(first);
            let this = schema.node(id);
            if this.inputs != first.inputs {
                return Err(Diagnostic::error(
                    format!(
                        "group `{}` member `{}` has {} inputs, but `{}` has {}",
                        group.name.node, this.name, this.inputs, first.name, first.inputs
                    ),
                    member.span,
                )
                .with_help("all members of a group must have the same number of inputs".to_string()));
            }
        }
        members.push(id);
    }
    let inputs = schema.node(members[0]).inputs;
    Ok(GroupDef {
        name: group.name.node,
        members,
        inputs,
        span: group.span,
    })
}

pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
