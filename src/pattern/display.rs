use std::fmt;

use crate::schema::Schema;

use super::{Expr, Head, Rule};

/// Canonical text of a pattern; reading it back yields the same tree.
pub struct ExprDisplay<'a> {
    expr: &'a Expr,
    schema: &'a Schema,
}

impl Expr {
    pub fn display<'a>(&'a self, schema: &'a Schema) -> ExprDisplay<'a> {
        ExprDisplay { expr: self, schema }
    }

    fn head_name<'a>(&'a self, schema: &'a Schema) -> &'a str {
        match &self.head {
            Head::Wildcard => "_",
            Head::Var(name) => name,
            Head::Node(id) => &schema.node(*id).name,
        }
    }
}

impl fmt::Display for ExprDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let expr = self.expr;
        let head = expr.head_name(self.schema);
        let bare = expr.children.is_empty() && expr.constraints.is_empty();

        match (&expr.binding, bare) {
            (None, true) => return f.write_str(head),
            (Some(alias), _) => write!(f, "{}:({}", alias, head)?,
            (None, false) => write!(f, "({}", head)?,
        }
        for child in &expr.children {
            write!(f, " {}", child.display(self.schema))?;
        }
        for c in &expr.constraints {
            write!(f, " [{} {}]", c.field, c.value)?;
        }
        f.write_str(")")
    }
}

impl Rule {
    /// `lhs => rhs` in canonical form.
    pub fn to_source(&self, schema: &Schema) -> String {
        format!("{} => {}", self.lhs.display(schema), self.rhs.display(schema))
    }
}
