//! End-to-end checks through the public API: source text in, validated
//! document or diagnostics out.

use rec_core::{
    elaborate_source, parse_and_resolve, render, validate, ErrorKind, FromValue, InMemoryProvider,
    RecError, Registry, TypedDocument, TypedValue, ValidateOptions, ValidationError,
};
use std::net::SocketAddrV4;
use std::path::Path;

const SERVICE: &str = r#"
// Service configuration
@enum CacheStrategy {
  NoCache
  FixedTTL(int)
  Lru { capacity: int, evict_after?: int }
}

@type TlsConfig {
  cert: string
  key_id: pubkey
}

@type ServerConfig {
  host: string
  port: int
  bind: socket
  public_url: url
  tls?: TlsConfig
  cache: CacheStrategy
  weights: [float]
}

{
  name: "edge"
  server: ServerConfig {
    host: "0.0.0.0"
    port: 8443
    bind: socket("0.0.0.0:8443")
    public_url: url("https://edge.example.com/api")
    tls: { cert: "/etc/tls/cert.pem", key_id: pubkey("11111111111111111111111111111111") }
    cache: CacheStrategy.Lru { capacity: 512 }
    weights: [1, 0.5, 2.25]
  }
  /* fallbacks in priority order */
  fallbacks: [CacheStrategy.NoCache, CacheStrategy.FixedTTL(30)]
}
"#;

fn run(src: &str) -> Result<TypedDocument, Vec<RecError>> {
    elaborate_source(
        src,
        Path::new("/virtual/service.rec"),
        &InMemoryProvider::default(),
        &ValidateOptions::default(),
    )
}

fn validation_errors(src: &str) -> Vec<ValidationError> {
    run(src)
        .unwrap_err()
        .into_iter()
        .map(|e| match e.kind {
            ErrorKind::Validation(v) => v,
            other => panic!("expected a validation error, got {:?}", other),
        })
        .collect()
}

#[test]
fn full_document_validates() {
    let doc = run(SERVICE).unwrap();
    let server = doc.get("server").unwrap();
    assert_eq!(server.get("port").and_then(TypedValue::as_int), Some(8443));

    let bind = SocketAddrV4::from_value(server.get("bind").unwrap()).unwrap();
    assert_eq!(bind.port(), 8443);

    let weights = Vec::<f64>::from_value(server.get("weights").unwrap()).unwrap();
    assert_eq!(weights, vec![1.0, 0.5, 2.25]);

    let tls = server.get("tls").unwrap();
    assert!(matches!(tls.get("key_id"), Some(TypedValue::Pubkey(_))));

    let cache = server.get("cache").and_then(TypedValue::as_variant).unwrap();
    assert_eq!(cache.path(), "CacheStrategy.Lru");
}

#[test]
fn typed_document_serializes_to_json() {
    let doc = run(SERVICE).unwrap();
    let json = serde_json::to_value(&doc).unwrap();
    assert_eq!(json["name"], "edge");
    assert_eq!(json["server"]["bind"], "0.0.0.0:8443");
    assert_eq!(json["server"]["public_url"], "https://edge.example.com/api");
    assert_eq!(
        json["server"]["tls"]["key_id"],
        "11111111111111111111111111111111"
    );
    assert_eq!(json["server"]["cache"]["variant"], "CacheStrategy.Lru");
    assert_eq!(json["server"]["cache"]["data"]["capacity"], 512);
    assert_eq!(json["fallbacks"][0], "CacheStrategy.NoCache");
    assert_eq!(json["fallbacks"][1]["data"][0], 30);
}

#[test]
fn cache_strategy_literals() {
    let decl = "@enum CacheStrategy { NoCache FixedTTL(int) }\n";
    assert!(run(&format!("{}{{ c: CacheStrategy.FixedTTL(300) }}", decl)).is_ok());
    assert!(matches!(
        validation_errors(&format!("{}{{ c: CacheStrategy.FixedTTL(\"300\") }}", decl))[..],
        [ValidationError::TypeMismatch { .. }]
    ));
    assert!(matches!(
        validation_errors(&format!("{}{{ c: CacheStrategy.Bogus }}", decl))[..],
        [ValidationError::UnknownVariant { .. }]
    ));
}

#[test]
fn extended_literal_examples() {
    assert!(run(r#"{ s: socket("127.0.0.1:8080") }"#).is_ok());
    assert!(run(r#"{ k: pubkey("11111111111111111111111111111111") }"#).is_ok());
    for bad in [
        r#"{ s: socket("256.1.1.1:80") }"#,
        r#"{ s: socket("127.0.0.1:70000") }"#,
    ] {
        assert!(matches!(
            validation_errors(bad)[..],
            [ValidationError::InvalidSocket { .. }]
        ));
    }
    assert!(matches!(
        validation_errors(r#"{ k: pubkey("not-base58!!") }"#)[..],
        [ValidationError::InvalidPubkey { .. }]
    ));
}

#[test]
fn optional_fields_may_be_omitted_required_may_not() {
    let decl = "@type Db { host: string\n ssl_cert?: string }\n";
    assert!(run(&format!("{}{{ db: Db {{ host: \"h\" }} }}", decl)).is_ok());
    assert_eq!(
        validation_errors(&format!("{}{{ db: Db {{ ssl_cert: \"c\" }} }}", decl)),
        vec![ValidationError::MissingRequiredField {
            owner: "type Db".into(),
            field: "host".into()
        }]
    );
}

#[test]
fn one_run_reports_every_independent_defect() {
    let src = r#"
@type S { port: int  api: url }
@enum E { A }
{
  one: S { port: "x" api: "https://ok.example" }
  two: S { port: 1 api: "ftp://nope" extra: true }
  three: E.B
  four: Missing { }
  five: socket("1.2.3.4")
}
"#;
    let errs = run(src).unwrap_err();
    let codes: Vec<&str> = errs.iter().map(RecError::code).collect();
    assert_eq!(
        codes,
        vec![
            "TypeMismatch",
            "InvalidUrl",
            "UnknownField",
            "UnknownVariant",
            "UnknownType",
            "InvalidSocket",
        ]
    );
    assert!(errs.iter().all(|e| e.stage() == "validate"));
    let lines: Vec<u32> = errs.iter().map(|e| e.span.line).collect();
    assert_eq!(lines, vec![5, 6, 6, 7, 8, 9]);
}

#[test]
fn syntax_errors_stop_before_validation() {
    let errs = run("@type S { port: int }\n{ s: S { port: \"x\" } ").unwrap_err();
    assert_eq!(errs.len(), 1);
    assert_eq!(errs[0].stage(), "parse");
    assert_eq!(errs[0].code(), "UnbalancedBraces");

    let errs = run("{ a: \"open }").unwrap_err();
    assert_eq!(errs[0].stage(), "lex");
}

#[test]
fn diagnostics_render_as_json() {
    let err = run("@type S { port: int }\n{ s: S { port: true } }")
        .unwrap_err()
        .remove(0);
    let json = err.to_json_value();
    assert_eq!(json["code"], "TypeMismatch");
    assert_eq!(json["stage"], "validate");
    assert_eq!(json["file"], "/virtual/service.rec");
    assert_eq!(json["line"], 2);
    assert_eq!(json["message"], "type mismatch: expected int, found bool");
}

#[test]
fn validate_reuses_a_registry() {
    let merged = parse_and_resolve(SERVICE, Path::new("/virtual/service.rec")).unwrap();
    let registry = Registry::build(&merged.decls).unwrap();
    assert_eq!(registry.len(), 3);
    let first = validate(&merged, &registry).unwrap();
    let second = validate(&merged, &registry).unwrap();
    assert_eq!(first, second);
}

#[test]
fn render_round_trip_is_idempotent() {
    let merged = parse_and_resolve(SERVICE, Path::new("/virtual/service.rec")).unwrap();
    let registry = Registry::build(&merged.decls).unwrap();
    let typed = validate(&merged, &registry).unwrap();

    let text = render(&typed, &registry);
    let reparsed = parse_and_resolve(&text, Path::new("/virtual/rendered.rec")).unwrap();
    let registry2 = Registry::build(&reparsed.decls).unwrap();
    let again = validate(&reparsed, &registry2).unwrap();
    assert_eq!(typed, again);
    assert_eq!(render(&again, &registry2), text);
}

#[test]
fn deeply_nested_input_is_an_error_not_a_crash() {
    let src = format!("{{ x: {}1{} }}", "[".repeat(200_000), "]".repeat(200_000));
    let errs = run(&src).unwrap_err();
    assert_eq!(errs.len(), 1);
    assert_eq!(errs[0].stage(), "parse");
}

#[test]
fn float_literals_out_of_range_are_rejected() {
    let src = format!("{{ x: 1{}.0 }}", "0".repeat(400));
    let errs = run(&src).unwrap_err();
    assert_eq!(errs[0].code(), "InvalidNumber");
    assert_eq!(errs[0].stage(), "lex");
}
