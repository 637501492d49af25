//! C identifiers of the generated code, all derived from one prefix.

/// Name builder for a prefix such as `p9`.
#[derive(Clone, Debug)]
pub struct CNames {
    lower: String,
    upper: String,
}

impl CNames {
    pub fn new(prefix: &str) -> Self {
        Self {
            lower: prefix.to_ascii_lowercase(),
            upper: prefix.to_ascii_uppercase(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.lower
    }

    /// `p9_t`
    pub fn node_type(&self) -> String {
        format!("{}_t", self.lower)
    }

    /// `p9_kind_t`
    pub fn kind_type(&self) -> String {
        format!("{}_kind_t", self.lower)
    }

    /// `P9_ADD`
    pub fn kind(&self, node: &str) -> String {
        format!("{}_{}", self.upper, node.to_ascii_uppercase())
    }

    /// `p9_ex_const_t`, the struct tag of a payload.
    pub fn payload_struct(&self, node: &str) -> String {
        format!("{}_ex_{}_t", self.lower, node)
    }

    /// `p9_const_t`, the payload typedef.
    pub fn payload_type(&self, node: &str) -> String {
        format!("{}_{}_t", self.lower, node)
    }

    /// `P9_EXTRA`, the payload access macro.
    pub fn extra_macro(&self) -> String {
        format!("{}_EXTRA", self.upper)
    }

    /// `p9_peep`, the top-level dispatcher of a rule-set.
    pub fn dispatcher(&self, rule_set: &str) -> String {
        format!("{}_{}", self.lower, rule_set)
    }

    /// `p9_peep_rule_add`
    pub fn rule_fn(&self, rule_set: &str, node: &str) -> String {
        format!("{}_{}_rule_{}", self.lower, rule_set, node)
    }

    /// Local holding a pattern variable.
    pub fn var(&self, name: &str) -> String {
        format!("v_{}", name)
    }

    /// `p9.h`
    pub fn header_file(&self) -> String {
        format!("{}.h", self.lower)
    }

    pub fn source_file(&self) -> String {
        format!("{}.c", self.lower)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prefix_names() {
        let n = CNames::new("p9");
        assert_eq!(n.node_type(), "p9_t");
        assert_eq!(n.kind_type(), "p9_kind_t");
        assert_eq!(n.kind("add"), "P9_ADD");
        assert_eq!(n.payload_struct("const"), "p9_ex_const_t");
        assert_eq!(n.payload_type("const"), "p9_const_t");
        assert_eq!(n.extra_macro(), "P9_EXTRA");
        assert_eq!(n.dispatcher("peep"), "p9_peep");
        assert_eq!(n.rule_fn("peep", "add"), "p9_peep_rule_add");
        assert_eq!(n.var("x"), "v_x");
        assert_eq!(n.header_file(), "p9.h");
        assert_eq!(n.source_file(), "p9.c");
    }

    #[test]
    fn test_prefix_case_is_normalized() {
        let n = CNames::new("Sea");
        assert_eq!(n.kind("load_i32"), "SEA_LOAD_I32");
        assert_eq!(n.node_type(), "sea_t");
    }
}
