//! Example: extract links and headings from a small page

use scour::{or, CaptureSpec, Config, Engine, Query, QueryPlan};
use tracing_subscriber::EnvFilter;

const PAGE: &str = r#"
<!DOCTYPE html>
<html>
    <head><title>scour demo</title></head>
    <body>
        <main>
            <section id="news">
                <h2>News</h2>
                <a href="/one">First story</a>
                <a href="/two">Second story</a>
            </section>
            <section id="links">
                <h2>Links</h2>
                <a href="https://www.example.com">Example</a>
            </section>
        </main>
    </body>
</html>
"#;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let plan = QueryPlan::builder()
        .query(
            Query::all("main > section")
                .capture(CaptureSpec::new().text_content(false))
                .then([
                    Query::first("h2").capture(CaptureSpec::text_only()),
                    Query::all("a[href]").alias("links"),
                ]),
        )
        .key("title", or([Query::first("h1"), Query::first("title")]))
        .build()?;

    let engine = Engine::new(Config { parallel: true, ..Config::default() });
    let store = engine.parse(PAGE, &plan)?;

    println!("scour v{}", scour::VERSION);
    println!("{}", serde_json::to_string_pretty(&store)?);
    Ok(())
}
