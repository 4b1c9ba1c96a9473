//! Sable CLI: parse HTML, run CSS selector queries and render the result.
//!
//! Diagnostics go to stderr through `tracing`; set `RUST_LOG` (for example
//! `RUST_LOG=sable_html=debug`) to see more. Results go to stdout.

mod config;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser};
use owo_colors::OwoColorize;
use sable_core::html::format_tree;
use sable_core::html::serializer::render_start_tag;
use sable_core::{Document, NodeId, RenderOptions, Selection, SelfClosingStyle};
use tracing_subscriber::EnvFilter;

use config::Config;

/// Parse tag-soup HTML and query it with CSS selectors
#[derive(Parser, Debug)]
#[command(name = "sable")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r"EXAMPLES:
    # Print a summary of a document
    sable page.html

    # List the start tags of every matching element
    sable page.html -s 'ul > li.active'

    # Render matches as HTML
    sable page.html -s 'table td:nth-child(2)' --render

    # Query relative to the first element matching --context
    sable page.html --context '#menu' -s '> li'

    # Dump the parsed tree
    sable --html '<ul><li>a<li>b</ul>' --tree
")]
struct Cli {
    /// Path to an HTML file
    #[arg(value_name = "FILE", required_unless_present = "html")]
    path: Option<PathBuf>,

    /// Parse this HTML string instead of a file
    #[arg(long, value_name = "HTML", conflicts_with = "path")]
    html: Option<String>,

    /// CSS selector to run against the document
    #[arg(short, long, value_name = "SELECTOR")]
    select: Option<String>,

    /// Scope the query to the first element matching this selector
    #[arg(long, value_name = "SELECTOR", requires = "select")]
    context: Option<String>,

    /// Print the matched elements (or the whole document) as HTML
    #[arg(short, long)]
    render: bool,

    /// Print the parsed tree as an indented outline
    #[arg(short, long)]
    tree: bool,

    /// Print the markup problems recovered while parsing
    #[arg(long)]
    issues: bool,

    /// JSON file with render options and parser rule tables
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(flatten)]
    style: StyleArgs,
}

/// Render flags that override the config file.
#[derive(Args, Debug)]
struct StyleArgs {
    /// Terminate void elements XHTML-style (`<br />`)
    #[arg(long)]
    xhtml: bool,

    /// Leave comments out of rendered output
    #[arg(long)]
    no_comments: bool,

    /// Leave attribute values unquoted where HTML allows it
    #[arg(long)]
    unquoted: bool,
}

impl StyleArgs {
    fn apply(&self, mut options: RenderOptions) -> RenderOptions {
        if self.xhtml {
            options.self_closing_style = SelfClosingStyle::Xhtml;
        }
        if self.no_comments {
            options.include_comments = false;
        }
        if self.unquoted {
            options.quote_all_attributes = false;
        }
        options
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let options = cli.style.apply(config.render);

    let html = read_input(&cli)?;
    let doc = Document::parse_with(&html, config.rules);

    if cli.tree {
        print!("{}", format_tree(doc.tree(), NodeId::ROOT));
    }
    if cli.issues {
        print_issues(&doc);
    }

    if let Some(selector) = &cli.select {
        let selection = run_query(&doc, selector, cli.context.as_deref())?;
        print_selection(&doc, &selection, cli.render, &options);
    } else if cli.render {
        println!("{}", doc.render_with(&options));
    } else if !cli.tree && !cli.issues {
        print_summary(&doc);
    }

    Ok(())
}

/// Log to stderr, filtered by `RUST_LOG` (default: warnings).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load the document source from CLI arguments
fn read_input(cli: &Cli) -> Result<String> {
    if let Some(html) = &cli.html {
        Ok(html.clone())
    } else if let Some(path) = &cli.path {
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
    } else {
        bail!("either a file path or --html is required")
    }
}

fn run_query<'a>(doc: &'a Document, selector: &str, context: Option<&str>) -> Result<Selection<'a>> {
    let Some(context) = context else {
        return Ok(doc.select(selector)?);
    };
    let scope = doc
        .select(context)?
        .first()
        .with_context(|| format!("context selector `{context}` matched nothing"))?;
    tracing::debug!(context, %scope, "scoped query");
    Ok(doc.select_within(selector, scope)?)
}

fn print_selection(doc: &Document, selection: &Selection<'_>, render: bool, options: &RenderOptions) {
    eprintln!(
        "{} {} element(s)",
        "matched".green().bold(),
        selection.len().bold()
    );
    for id in selection {
        if render {
            println!("{}", doc.render_node(id, options));
        } else if let Some(data) = doc.tree().as_element(id) {
            println!("{} {}", id.dimmed(), render_start_tag(data, options));
        }
    }
}

fn print_issues(doc: &Document) {
    if doc.issues().is_empty() {
        eprintln!("{}", "no parse issues".green());
        return;
    }
    eprintln!("{} {}", doc.issues().len().bold(), "parse issue(s)".yellow().bold());
    for issue in doc.issues() {
        println!("  - {issue}");
    }
}

fn print_summary(doc: &Document) {
    let tree = doc.tree();
    let elements = tree.node_ids().filter(|&id| tree.is_element(id)).count();
    println!(
        "{} {} nodes, {} elements, {} parse issue(s)",
        "parsed".cyan().bold(),
        tree.len(),
        elements,
        doc.issues().len()
    );
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_style_flags_override_config() {
        let cli = Cli::parse_from(["sable", "--html", "<p>", "--xhtml", "--unquoted"]);
        let options = cli.style.apply(RenderOptions::default());
        assert_eq!(options.self_closing_style, SelfClosingStyle::Xhtml);
        assert!(!options.quote_all_attributes);
        assert!(options.include_comments);
    }

    #[test]
    fn test_context_requires_select() {
        assert!(Cli::try_parse_from(["sable", "--html", "<p>", "--context", "div"]).is_err());
        assert!(Cli::try_parse_from(["sable"]).is_err());
    }

    #[test]
    fn test_scoped_query() {
        let doc = Document::parse(r#"<ul id="menu"><li><ul><li></li></ul></li></ul>"#);
        assert_eq!(run_query(&doc, "li", None).unwrap().len(), 2);
        assert_eq!(run_query(&doc, "> li", Some("#menu")).unwrap().len(), 1);
        assert!(run_query(&doc, "li", Some("table")).is_err());
    }
}
