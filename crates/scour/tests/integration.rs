//! Integration tests - Full pipeline from HTML to results
//!
//! Tests the complete workflow: declarations → plan → parse → ResultStore

use scour::{and, or, CaptureSpec, CompileError, Config, Engine, Error, ParseError, Query, QueryPlan};

const PAGE: &str = r#"
    <!DOCTYPE html>
    <html>
        <head><title>Catalog</title></head>
        <body>
            <main>
                <article class="product" data-sku="A1">
                    <h2>Lamp</h2>
                    <span class="price">19.99</span>
                    <ul class="tags"><li>home</li><li>light</li></ul>
                </article>
                <article class="product" data-sku="B2">
                    <h2>Desk</h2>
                    <ul class="tags"><li>office</li></ul>
                </article>
            </main>
            <footer><a href="/about">About</a></footer>
        </body>
    </html>
"#;

// ============================================================================
// FULL PIPELINE TESTS
// ============================================================================

#[test]
fn test_products_pipeline() {
    let plan = QueryPlan::builder()
        .key(
            "products",
            Query::all("article.product")
                .capture(CaptureSpec::new().text_content(false))
                .then([
                    Query::first("h2").capture(CaptureSpec::text_only()).alias("title"),
                    Query::first(".price").capture(CaptureSpec::text_only()).alias("price"),
                    Query::all("ul.tags > li").capture(CaptureSpec::text_only()).alias("tags"),
                ]),
        )
        .build()
        .unwrap();

    let store = scour::parse(PAGE, &plan).unwrap();
    let products = &store["products"];
    assert_eq!(products.len(), 2);

    assert_eq!(products[0].attribute("data-sku"), Some("A1"));
    assert_eq!(products[0]["title"][0].text_content(), Some("Lamp"));
    assert_eq!(products[0]["price"][0].text_content(), Some("19.99"));
    let tags: Vec<_> = products[0]["tags"].iter().filter_map(|r| r.text_content()).collect();
    assert_eq!(tags, vec!["home", "light"]);

    assert_eq!(products[1]["title"][0].text_content(), Some("Desk"));
    assert!(products[1]["price"].is_empty());
    assert!(products[1].text_content().is_none());
}

#[test]
fn test_bytes_and_text_sources_agree() {
    let plan = QueryPlan::builder().query(Query::all("li")).build().unwrap();
    let from_text = scour::parse(PAGE, &plan).unwrap();
    let from_bytes = scour::parse(PAGE.as_bytes(), &plan).unwrap();
    let from_vec = scour::parse(PAGE.as_bytes().to_vec(), &plan).unwrap();
    assert_eq!(from_text, from_bytes);
    assert_eq!(from_text, from_vec);
    assert_eq!(from_text["li"].len(), 3);
}

#[test]
fn test_combinators_through_engine() {
    let plan = QueryPlan::builder()
        .key("heading", or([Query::first("h1"), Query::first("h2")]))
        .key("complete", and([Query::all(".price"), Query::all("footer a")]))
        .key("broken", and([Query::all(".price"), Query::all("nav")]))
        .build()
        .unwrap();
    let store = scour::parse(PAGE, &plan).unwrap();

    assert_eq!(store["heading"].len(), 1);
    assert_eq!(store["heading"][0].text_content(), Some("Lamp"));
    assert_eq!(store["complete"].len(), 2);
    assert!(store["broken"].is_empty());
}

#[test]
fn test_engine_reused_for_many_documents() {
    let engine = Engine::default();
    let plan = QueryPlan::builder().query(Query::all("p")).build().unwrap();
    for n in 0..5 {
        let html: String = (0..n).map(|i| format!("<p>{i}</p>")).collect();
        assert_eq!(engine.parse(&html, &plan).unwrap()["p"].len(), n);
    }
}

#[test]
fn test_load_then_execute() {
    let engine = Engine::new(Config { url: "https://shop.example/".into(), ..Config::default() });
    let doc = engine.load(PAGE).unwrap();
    assert_eq!(doc.url(), "https://shop.example/");
    assert_eq!(doc.title(), "Catalog");

    let plan = QueryPlan::builder().query(Query::all("footer a")).build().unwrap();
    let store = engine.execute(&doc, &plan).unwrap();
    assert_eq!(store["footer a"][0].attribute("href"), Some("/about"));
}

#[test]
fn test_parallel_engine_matches_sequential() {
    let plan = QueryPlan::builder()
        .query(Query::all("article").all("li"))
        .query(Query::all("h2"))
        .query(Query::all("footer").refine(Query::all("a")))
        .build()
        .unwrap();

    let sequential = Engine::new(Config { parallel: false, ..Config::default() });
    let parallel = Engine::new(Config { parallel: true, max_threads: 3, ..Config::default() });
    assert_eq!(sequential.parse(PAGE, &plan).unwrap(), parallel.parse(PAGE, &plan).unwrap());
}

// ============================================================================
// ERRORS
// ============================================================================

#[test]
fn test_invalid_utf8_is_parse_error() {
    let plan = QueryPlan::builder().query(Query::all("p")).build().unwrap();
    let err = scour::parse([b'<', b'p', b'>', 0xff], &plan).unwrap_err();
    assert!(matches!(err, Error::Parse(ParseError::Encoding { valid_up_to: 3 })));
}

#[test]
fn test_compile_error_converts() {
    fn build() -> Result<QueryPlan, Error> {
        Ok(QueryPlan::builder().key("k", or([Query::all("a")])).build()?)
    }
    let err = build().unwrap_err();
    assert!(matches!(err, Error::Compile(CompileError::Arity { .. })));
    assert!(err.to_string().starts_with("Compile error: k: OR"));
}

#[test]
fn test_whitespace_text_option() {
    let html = "<div> <b>x</b> </div>";
    let plan = QueryPlan::builder().query(Query::all("div")).build().unwrap();

    let kept = scour::parse(html, &plan).unwrap();
    assert_eq!(kept["div"][0].text_content(), Some(" x "));

    let dropped = Engine::new(Config { keep_whitespace_text: false, ..Config::default() })
        .parse(html, &plan)
        .unwrap();
    assert_eq!(dropped["div"][0].text_content(), Some("x"));
}

#[test]
fn test_inline_siblings_keep_separator() {
    let html = "<p><b>Hello</b> <i>World</i></p>";
    let plan = QueryPlan::builder()
        .query(Query::all("p").capture(CaptureSpec::new().inner_html(true)))
        .build()
        .unwrap();

    let store = scour::parse(html, &plan).unwrap();
    assert_eq!(store["p"][0].text_content(), Some("Hello World"));
    assert_eq!(store["p"][0].inner_html(), Some("<b>Hello</b> <i>World</i>"));
}
