//! Code Writer: assembles the generated header and source text.

use crate::cnames::CNames;
use crate::dispatch::DispatchCode;
use crate::schema::Schema;

/// Header and source text of one generation run.
#[derive(Clone, Debug, PartialEq)]
pub struct Output {
    pub header: String,
    pub source: String,
}

/// Line-buffered C writer.
pub struct Emitter<'a> {
    output: Vec<String>,
    names: &'a CNames,
}

impl<'a> Emitter<'a> {
    pub fn new(names: &'a CNames) -> Self {
        Self {
            output: Vec::new(),
            names,
        }
    }

    /// Emit the header: kind enum, node record, payload structs, access macro
    /// and forward declarations of every dispatch function.
    pub fn emit_header(mut self, schema: &Schema, dispatch: &[DispatchCode]) -> String {
        let n = self.names;
        let node_t = n.node_type();
        let kind_t = n.kind_type();

        self.raw("#pragma once");
        self.raw("");
        self.raw("#include <stdint.h>");
        self.raw("");
        self.raw(&format!("typedef struct {0} {0};", node_t));
        self.raw("");

        self.raw(&format!("typedef enum {} : uint8_t {{", kind_t));
        for node in schema.nodes() {
            self.inst(&format!("{},", n.kind(&node.name)));
        }
        self.raw(&format!("}} {};", kind_t));
        self.raw("");

        self.raw(&format!("struct {} {{", node_t));
        self.inst(&format!("{} kind;", kind_t));
        self.raw("");
        self.inst("// ordered def-use");
        self.inst(&format!("{} **exprs;", node_t));
        self.raw("");
        self.inst("uint8_t extra[];");
        self.raw("};");

        let payloads: Vec<_> = schema.payload_nodes().collect();
        if !payloads.is_empty() {
            self.raw("");
            for (node, _) in &payloads {
                self.raw(&format!(
                    "typedef struct {} {};",
                    n.payload_struct(&node.name),
                    n.payload_type(&node.name)
                ));
            }
            self.raw("");
            for (node, body) in &payloads {
                self.raw(&format!("struct {} {};", n.payload_struct(&node.name), body));
            }
        }

        self.raw("");
        self.raw(&format!(
            "#define {}(name, node) (({}_##name##_t *)(node)->extra)",
            n.extra_macro(),
            n.prefix()
        ));

        let prototypes: Vec<&String> = dispatch.iter().flat_map(|d| &d.prototypes).collect();
        if !prototypes.is_empty() {
            self.raw("");
            for proto in prototypes {
                self.raw(proto);
            }
        }
        self.finish()
    }

    /// Emit the source: the header include, then every rule-set's functions.
    pub fn emit_source(mut self, dispatch: &[DispatchCode]) -> String {
        self.raw(&format!("#include \"{}\"", self.names.header_file()));
        for function in dispatch.iter().flat_map(|d| &d.functions) {
            self.raw("");
            self.raw(function);
        }
        self.finish()
    }

    fn finish(mut self) -> String {
        self.output.push(String::new());
        self.output.join("\n")
    }

    fn inst(&mut self, line: &str) {
        self.output.push(format!("    {}", line));
    }

    fn raw(&mut self, line: &str) {
        self.output.push(line.to_string());
    }
}

/// Write both files for a loaded schema and its compiled rule-sets.
pub fn emit(schema: &Schema, dispatch: &[DispatchCode], names: &CNames) -> Output {
    Output {
        header: Emitter::new(names).emit_header(schema, dispatch),
        source: Emitter::new(names).emit_source(dispatch),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch;
    use crate::pattern::compile_rule_set;
    use crate::schema;

    fn run(schema_src: &str, rules: &[(&str, &str)]) -> Output {
        let schema = schema::load(schema_src, 0).unwrap();
        let names = CNames::new("p9");
        let code: Vec<DispatchCode> = rules
            .iter()
            .enumerate()
            .map(|(i, (name, src))| {
                let set = compile_rule_set(name, src, i as u16 + 1, &schema).unwrap();
                dispatch::generate(&set, &schema, &names).unwrap()
            })
            .collect();
        emit(&schema, &code, &names)
    }

    #[test]
    fn test_header() {
        let out = run(
            "(opb 0 const { i64 value; })\n(op 2 add)",
            &[("peep", "(add x (const [value 0])) => x")],
        );
        insta::assert_snapshot!(out.header, @r"
        #pragma once

        #include <stdint.h>

        typedef struct p9_t p9_t;

        typedef enum p9_kind_t : uint8_t {
            P9_CONST,
            P9_ADD,
        } p9_kind_t;

        struct p9_t {
            p9_kind_t kind;

            // ordered def-use
            p9_t **exprs;

            uint8_t extra[];
        };

        typedef struct p9_ex_const_t p9_const_t;

        struct p9_ex_const_t { i64 value; };

        #define P9_EXTRA(name, node) ((p9_##name##_t *)(node)->extra)

        p9_t *p9_peep_rule_add(p9_t *n);
        p9_t *p9_peep(p9_t *n);
        ");
    }

    #[test]
    fn test_header_without_payloads_or_rules() {
        let out = run("(op 1 neg)", &[]);
        assert!(out.header.contains("    P9_NEG,\n} p9_kind_t;"));
        assert!(!out.header.contains("typedef struct p9_ex_"));
        assert!(out
            .header
            .ends_with("#define P9_EXTRA(name, node) ((p9_##name##_t *)(node)->extra)\n"));
    }

    #[test]
    fn test_source_includes_header_and_functions_in_order() {
        let out = run(
            "(op 1 neg)(op 2 add)",
            &[("fold", "(neg (neg x)) => x"), ("peep", "(add x _) => x")],
        );
        assert!(out.source.starts_with("#include \"p9.h\"\n\np9_t *p9_fold_rule_neg(p9_t *n) {"));
        let order: Vec<usize> = [
            "p9_t *p9_fold_rule_neg(",
            "p9_t *p9_fold(",
            "p9_t *p9_peep_rule_add(",
            "p9_t *p9_peep(",
        ]
        .iter()
        .map(|f| out.source.find(f).unwrap())
        .collect();
        assert!(order.windows(2).all(|w| w[0] < w[1]));
        assert!(out.source.ends_with("}\n"));
    }

    #[test]
    fn test_source_without_rule_sets() {
        let out = run("(op 1 neg)", &[]);
        assert_eq!(out.source, "#include \"p9.h\"\n");
    }

    #[test]
    fn test_custom_prefix_macro() {
        let schema = schema::load("(opb 0 const { i64 value; })", 0).unwrap();
        let names = CNames::new("sea");
        let out = emit(&schema, &[], &names);
        assert!(out
            .header
            .contains("#define SEA_EXTRA(name, node) ((sea_##name##_t *)(node)->extra)"));
        assert!(out.header.contains("typedef struct sea_ex_const_t sea_const_t;"));
    }
}
