//! Edge case tests for scour-query
//!
//! Empty documents, selector corner cases, case policy, large inputs and
//! serialized result shapes.

use scour_html::parse;
use scour_query::{
    group, CaptureSpec, CompileError, MatchContext, Query, QueryPlan, Selection, SelectorChain,
};

fn plan(decl: impl Into<scour_query::QueryDecl>) -> QueryPlan {
    QueryPlan::builder().query(decl).build().unwrap()
}

// ============================================================================
// EMPTY RESULTS
// ============================================================================

#[test]
fn test_empty_document() {
    let doc = parse("").unwrap();
    let store = plan(Query::all("a")).execute(doc.tree()).unwrap();
    assert!(store.contains_key("a"));
    assert!(store["a"].is_empty());
    assert_eq!(store.len(), 1);
}

#[test]
fn test_no_match_deep_in_chain() {
    let doc = parse("<div><p>x</p></div>").unwrap();
    let store = plan(Query::all("div").all("p").all("a")).execute(doc.tree()).unwrap();
    let p = &store["div"][0]["p"][0];
    assert!(p.children.is_empty());
}

#[test]
fn test_unknown_key_lookup() {
    let doc = parse("<a>x</a>").unwrap();
    let store = plan(Query::all("a")).execute(doc.tree()).unwrap();
    assert!(store.get("b").is_none());
    assert!(!store.contains_key("b"));
}

// ============================================================================
// MATCHING POLICY
// ============================================================================

#[test]
fn test_tag_and_attribute_names_case_insensitive() {
    let doc = parse(r#"<DIV DATA-Kind="Box">x</DIV>"#).unwrap();
    let store = plan(Query::all("div[data-kind=Box]")).execute(doc.tree()).unwrap();
    assert_eq!(store["div[data-kind=Box]"].len(), 1);

    let store = plan(Query::all("DIV[DATA-KIND]")).execute(doc.tree()).unwrap();
    assert_eq!(store["DIV[DATA-KIND]"].len(), 1);
}

#[test]
fn test_attribute_values_case_sensitive() {
    let doc = parse(r#"<div data-kind="Box">x</div>"#).unwrap();
    let store = plan(Query::all("div[data-kind=box]")).execute(doc.tree()).unwrap();
    assert!(store["div[data-kind=box]"].is_empty());
}

#[test]
fn test_class_and_id_predicates() {
    let doc = parse(r#"<p class="a b">1</p><p class="a">2</p><p id="x" class="b">3</p>"#).unwrap();
    let texts = |sel: &str| -> Vec<String> {
        let store = plan(Query::all(sel)).execute(doc.tree()).unwrap();
        store[sel].iter().filter_map(|r| r.text_content().map(str::to_string)).collect()
    };
    assert_eq!(texts(".a"), vec!["1", "2"]);
    assert_eq!(texts(".a.b"), vec!["1"]);
    assert_eq!(texts("p#x.b"), vec!["3"]);
    assert_eq!(texts("#x.a"), Vec::<String>::new());
}

#[test]
fn test_sibling_not_adjacent() {
    let doc = parse("<div><h1>t</h1><span>s</span><p>1</p><p>2</p></div>").unwrap();
    let store = plan(Query::all("h1 ~ p")).execute(doc.tree()).unwrap();
    assert_eq!(store["h1 ~ p"].len(), 2);
}

#[test]
fn test_sibling_requires_following() {
    let doc = parse("<div><p>1</p><h1>t</h1></div>").unwrap();
    let store = plan(Query::all("h1 ~ p")).execute(doc.tree()).unwrap();
    assert!(store["h1 ~ p"].is_empty());
}

#[test]
fn test_leading_child_combinator_in_selector() {
    let doc = parse("<nav><a href='1'>1</a><div><a href='2'>2</a></div></nav>").unwrap();
    let store = plan(Query::all("nav").all("> a[href]")).execute(doc.tree()).unwrap();
    assert_eq!(store["nav"][0]["> a[href]"].len(), 1);
}

#[test]
fn test_matcher_directly() {
    let doc = parse("<ul><li>a</li><li>b</li></ul>").unwrap();
    let tree = doc.tree();
    let chain = SelectorChain::parse("ul > li").unwrap();
    let ctx = MatchContext::document(tree);

    let all = chain.select(&ctx, Selection::All);
    assert_eq!(all.len(), 2);
    assert!(all.iter().all(|&id| chain.matches(id, &ctx)));
    assert_eq!(chain.select(&ctx, Selection::First), vec![all[0]]);
}

// ============================================================================
// TEXT AND MARKUP
// ============================================================================

#[test]
fn test_text_content_concatenates_descendants() {
    let doc = parse("<div>a<b>b<i>c</i></b>d</div>").unwrap();
    let store = plan(Query::all("div")).execute(doc.tree()).unwrap();
    assert_eq!(store["div"][0].text_content(), Some("abcd"));
}

#[test]
fn test_inner_html_void_and_escaping() {
    let doc = parse("<div>1 &lt; 2<br><img src=\"a.png\"></div>").unwrap();
    let store = plan(Query::all("div").capture(CaptureSpec::html_only()))
        .execute(doc.tree())
        .unwrap();
    assert_eq!(store["div"][0].inner_html(), Some(r#"1 &lt; 2<br><img src="a.png">"#));
}

#[test]
fn test_inline_sibling_whitespace() {
    let doc = parse("<p><b>Hello</b> <i>World</i></p>").unwrap();
    let store = plan(Query::all("p").capture(CaptureSpec::everything()))
        .execute(doc.tree())
        .unwrap();
    let p = &store["p"][0];
    assert_eq!(p.text_content(), Some("Hello World"));
    assert_eq!(p.inner_html(), Some("<b>Hello</b> <i>World</i>"));
}

#[test]
fn test_whitespace_between_blocks_preserved() {
    let doc = parse("<ul>\n  <li>a</li>\n  <li>b</li>\n</ul>").unwrap();
    let store = plan(Query::all("ul").capture(CaptureSpec::everything()))
        .execute(doc.tree())
        .unwrap();
    let ul = &store["ul"][0];
    assert_eq!(ul.text_content(), Some("\n  a\n  b\n"));
    assert_eq!(ul.inner_html(), Some("\n  <li>a</li>\n  <li>b</li>\n"));
}

#[test]
fn test_empty_element_capture() {
    let doc = parse("<p></p>").unwrap();
    let store = plan(Query::all("p").capture(CaptureSpec::everything()))
        .execute(doc.tree())
        .unwrap();
    let p = &store["p"][0];
    assert_eq!(p.text_content(), Some(""));
    assert_eq!(p.inner_html(), Some(""));
    assert!(p.attributes().is_some_and(|a| a.is_empty()));
}

// ============================================================================
// STRESS
// ============================================================================

#[test]
fn test_deep_nesting() {
    let depth = 2_000;
    let mut html = String::new();
    for _ in 0..depth {
        html.push_str("<div>");
    }
    html.push_str("<span>deep</span>");
    for _ in 0..depth {
        html.push_str("</div>");
    }
    let doc = parse(&html).unwrap();

    let store = plan(Query::all("div > span")).execute(doc.tree()).unwrap();
    assert_eq!(store["div > span"].len(), 1);
    assert_eq!(store["div > span"][0].text_content(), Some("deep"));
}

#[test]
fn test_many_matches_in_order() {
    let items: String = (0..1_000).map(|i| format!("<li>{i}</li>")).collect();
    let doc = parse(&format!("<ul>{items}</ul>")).unwrap();
    let store = plan(Query::all("ul").all("li").capture(CaptureSpec::text_only()))
        .execute_parallel(doc.tree(), 4)
        .unwrap();

    let li = &store["ul"][0]["li"];
    assert_eq!(li.len(), 1_000);
    assert_eq!(li[999].text_content(), Some("999"));
}

// ============================================================================
// SHAPES
// ============================================================================

#[test]
fn test_store_json_shape() {
    let doc = parse(r#"<span id="world">Hello <a href="/x">World</a></span>"#).unwrap();
    let store = plan(
        Query::all("#world")
            .capture(CaptureSpec::new().attributes(false).name(false))
            .all("a"),
    )
    .execute(doc.tree())
    .unwrap();

    let json = serde_json::to_value(&store).unwrap();
    assert_eq!(json, serde_json::json!({
        "#world": [{
            "textContent": "Hello World",
            "children": {
                "a": [{ "textContent": "World" }]
            }
        }]
    }));
}

#[test]
fn test_plan_serializes() {
    let p = QueryPlan::compile([("k", group([Query::all("a"), Query::all("b")]))]).unwrap();
    let json = serde_json::to_value(&p).unwrap();
    assert!(json.get("k").is_some());
}

#[test]
fn test_invalid_selector_reports_path() {
    let err = QueryPlan::builder()
        .key("nav", Query::all("nav").all("a + b"))
        .build()
        .unwrap_err();
    match err {
        CompileError::InvalidSelector { path, selector, .. } => {
            assert_eq!(path.to_string(), "nav/0");
            assert_eq!(selector, "a + b");
        }
        other => panic!("unexpected error: {other}"),
    }
}
