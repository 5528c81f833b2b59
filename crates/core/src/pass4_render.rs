//! Pass 4: canonical source rendering -- print a validated document back to
//! `.rec` text that parses and validates to the same `TypedDocument`.

use crate::ast::*;
use crate::pass2_registry::Registry;
use crate::value::{TypedDocument, TypedObject, TypedPayload, TypedValue, TypedVariant};
use indexmap::IndexMap;

const INDENT: &str = "  ";

/// Declarations in registry order, then the root object.
pub fn render(doc: &TypedDocument, registry: &Registry<'_>) -> String {
    let mut out = Writer::default();
    for decl in registry.iter() {
        out.decl(decl);
        out.buf.push('\n');
    }
    out.object_body(&doc.root.fields);
    out.buf.push('\n');
    out.buf
}

#[derive(Default)]
struct Writer {
    buf: String,
    depth: usize,
}

impl Writer {
    fn newline(&mut self) {
        self.buf.push('\n');
        for _ in 0..self.depth {
            self.buf.push_str(INDENT);
        }
    }

    // ── Declarations ─────────────────────────────────────────────────────────

    fn decl(&mut self, decl: &Decl) {
        match decl {
            Decl::Type(t) => {
                self.buf.push_str(&format!("@type {} ", t.name));
                self.field_block(&t.fields);
            }
            Decl::Enum(e) => {
                self.buf.push_str(&format!("@enum {} {{", e.name));
                self.depth += 1;
                for v in &e.variants {
                    self.newline();
                    self.buf.push_str(&v.name);
                    match &v.shape {
                        VariantShape::Unit => {}
                        VariantShape::Tuple(slots) => {
                            let types: Vec<String> =
                                slots.iter().map(|s| s.ty.to_string()).collect();
                            self.buf.push_str(&format!("({})", types.join(", ")));
                        }
                        VariantShape::Struct(fields) => {
                            self.buf.push(' ');
                            self.field_block(fields);
                        }
                    }
                }
                self.depth -= 1;
                self.newline();
                self.buf.push('}');
            }
        }
        self.buf.push('\n');
    }

    fn field_block(&mut self, fields: &[FieldDecl]) {
        if fields.is_empty() {
            self.buf.push_str("{}");
            return;
        }
        self.buf.push('{');
        self.depth += 1;
        for f in fields {
            self.newline();
            let marker = if f.optional { "?" } else { "" };
            self.buf.push_str(&format!("{}{}: {}", f.name, marker, f.ty));
        }
        self.depth -= 1;
        self.newline();
        self.buf.push('}');
    }

    // ── Values ───────────────────────────────────────────────────────────────

    fn value(&mut self, value: &TypedValue) {
        match value {
            TypedValue::String(s) => self.buf.push_str(&quote(s)),
            TypedValue::Int(n) => self.buf.push_str(&n.to_string()),
            TypedValue::Float(f) => self.buf.push_str(&float_literal(*f)),
            TypedValue::Bool(b) => self.buf.push_str(if *b { "true" } else { "false" }),
            TypedValue::Null => self.buf.push_str("null"),
            TypedValue::Url(u) => self.buf.push_str(&format!("url({})", quote(u.as_str()))),
            TypedValue::Socket(s) => {
                self.buf.push_str(&format!("socket({})", quote(&s.to_string())))
            }
            TypedValue::Pubkey(k) => {
                self.buf.push_str(&format!("pubkey({})", quote(&k.to_base58())))
            }
            TypedValue::Array(items) => self.array(items),
            TypedValue::Object(obj) => self.object(obj),
            TypedValue::Variant(v) => self.variant(v),
        }
    }

    fn object(&mut self, obj: &TypedObject) {
        if let Some(name) = &obj.type_name {
            self.buf.push_str(name);
            self.buf.push(' ');
        }
        self.object_body(&obj.fields);
    }

    fn object_body(&mut self, fields: &IndexMap<String, TypedValue>) {
        if fields.is_empty() {
            self.buf.push_str("{}");
            return;
        }
        self.buf.push('{');
        self.depth += 1;
        for (key, value) in fields {
            self.newline();
            self.buf.push_str(key);
            self.buf.push_str(": ");
            self.value(value);
        }
        self.depth -= 1;
        self.newline();
        self.buf.push('}');
    }

    /// Scalars stay on one line; anything with a block gets a line per element.
    fn array(&mut self, items: &[TypedValue]) {
        if !items.iter().any(is_block) {
            self.buf.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    self.buf.push_str(", ");
                }
                self.value(item);
            }
            self.buf.push(']');
            return;
        }
        self.buf.push('[');
        self.depth += 1;
        for item in items {
            self.newline();
            self.value(item);
        }
        self.depth -= 1;
        self.newline();
        self.buf.push(']');
    }

    fn variant(&mut self, v: &TypedVariant) {
        self.buf.push_str(&v.path());
        match &v.payload {
            TypedPayload::Unit => {}
            TypedPayload::Tuple(items) => {
                self.buf.push('(');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.buf.push_str(", ");
                    }
                    self.value(item);
                }
                self.buf.push(')');
            }
            TypedPayload::Struct(fields) => {
                self.buf.push(' ');
                self.object_body(fields);
            }
        }
    }
}

fn is_block(value: &TypedValue) -> bool {
    match value {
        TypedValue::Object(_) => true,
        TypedValue::Variant(v) => matches!(v.payload, TypedPayload::Struct(_)),
        _ => false,
    }
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\0' => out.push_str("\\0"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Always carries a `.` so the literal lexes back as a float.
fn float_literal(f: f64) -> String {
    let text = f.to_string();
    if text.contains('.') {
        text
    } else {
        format!("{}.0", text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pass1_include::parse_and_resolve_with_provider;
    use crate::pass3_validate::validate_with_options;
    use crate::source::InMemoryProvider;
    use std::path::Path;

    fn load(src: &str) -> crate::pass1_include::MergedDocument {
        parse_and_resolve_with_provider(src, Path::new("/r/a.rec"), &InMemoryProvider::default())
            .unwrap()
    }

    fn round_trip(src: &str) -> (String, TypedDocument, TypedDocument) {
        let first = load(src);
        let registry = Registry::build(&first.decls).unwrap();
        let typed = validate_with_options(&first, &Default::default()).unwrap();
        let text = render(&typed, &registry);
        let second = load(&text);
        let again = validate_with_options(&second, &Default::default()).unwrap();
        (text, typed, again)
    }

    #[test]
    fn floats_keep_a_decimal_point() {
        assert_eq!(float_literal(2.0), "2.0");
        assert_eq!(float_literal(-0.25), "-0.25");
        assert_eq!(float_literal(1e20), "100000000000000000000.0");
    }

    #[test]
    fn strings_are_escaped() {
        assert_eq!(quote("a\"b\\c\nd\t"), r#""a\"b\\c\nd\t""#);
    }

    #[test]
    fn canonical_layout() {
        let (text, _, _) = round_trip(
            "@type S { port: int  host?: string }\n@enum M { A B(int, [string]) C { x: float } }\n{ s: S { port: 1 }, m: M.B(2, [\"x\"]), xs: [1,2], e: {} }",
        );
        let expected = "\
@type S {
  port: int
  host?: string
}

@enum M {
  A
  B(int, [string])
  C {
    x: float
  }
}

{
  s: S {
    port: 1
  }
  m: M.B(2, [\"x\"])
  xs: [1, 2]
  e: {}
}
";
        assert_eq!(text, expected);
    }

    #[test]
    fn validated_documents_survive_a_round_trip() {
        let (_, typed, again) = round_trip(
            r#"@type Net { api: url  bind: socket  key?: pubkey  weight: float }
@enum Cache { Off  Ttl(int)  Lru { cap: int  note?: string } }
{
  name: "say \"hi\"\n"
  net: Net { api: "https://example.com" bind: socket("10.0.0.1:8080") key: null weight: 3 }
  caches: [Cache.Off, Cache.Ttl(30), Cache.Lru { cap: 4 }]
  nested: { ratio: -0.5, flags: [true, false], none: null }
  peers: [{ a: 1 }, { a: 2 }]
}"#,
        );
        assert_eq!(typed, again);
    }
}
