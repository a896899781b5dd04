//! HTML → text cleaning.
//!
//! Pages are parsed with `scraper` (html5ever), so attributes, comments and
//! character references are handled by the parser. Tables are kept readable
//! by flattening each row into `cell | cell | cell`.

use crate::error::{IndexerError, Result};
use scraper::{ElementRef, Html, Selector};

const DROPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

fn is_block(tag: &str) -> bool {
    matches!(
        tag,
        "p" | "div"
            | "li"
            | "ul"
            | "ol"
            | "dl"
            | "dt"
            | "dd"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "tr"
            | "thead"
            | "tbody"
            | "tfoot"
            | "section"
            | "article"
            | "header"
            | "footer"
            | "nav"
            | "aside"
            | "main"
            | "title"
            | "blockquote"
            | "pre"
            | "hr"
            | "form"
            | "figure"
            | "figcaption"
            | "caption"
    )
}

pub struct MarkupCleaner {
    rows: Selector,
    cells: Selector,
}

impl MarkupCleaner {
    pub fn new() -> Result<Self> {
        Ok(Self {
            rows: parse_selector("tr")?,
            cells: parse_selector("th, td")?,
        })
    }

    /// Visible text of `html`, one trimmed non-empty line per block.
    pub fn clean(&self, html: &str) -> String {
        let document = Html::parse_document(html);
        let mut text = String::with_capacity(html.len() / 2);
        self.walk(document.root_element(), &mut text);

        text.lines()
            .map(collapse_whitespace)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn walk(&self, element: ElementRef<'_>, out: &mut String) {
        let tag = element.value().name();
        if DROPPED_ELEMENTS.contains(&tag) {
            return;
        }
        if tag == "br" {
            out.push('\n');
            return;
        }
        if tag == "table" {
            let rows = self.flatten_table(element);
            if !rows.is_empty() {
                out.push('\n');
                out.push_str(&rows);
                out.push('\n');
                return;
            }
        }

        let block = is_block(tag) || tag == "table";
        if block {
            out.push('\n');
        }
        for child in element.children() {
            if let Some(text) = child.value().as_text() {
                out.push_str(text);
            } else if let Some(child) = ElementRef::wrap(child) {
                self.walk(child, out);
            }
        }
        if block {
            out.push('\n');
        }
    }

    /// Rows owned by `table`; rows of nested tables are folded into the
    /// enclosing cell instead.
    fn flatten_table(&self, table: ElementRef<'_>) -> String {
        table
            .select(&self.rows)
            .filter(|row| owned_by(*row, "table", table))
            .filter_map(|row| {
                let cells: Vec<String> = row
                    .select(&self.cells)
                    .filter(|cell| owned_by(*cell, "tr", row))
                    .map(|cell| {
                        let mut text = String::new();
                        for child in cell.children() {
                            if let Some(fragment) = child.value().as_text() {
                                text.push_str(fragment);
                            } else if let Some(child) = ElementRef::wrap(child) {
                                self.walk(child, &mut text);
                            }
                        }
                        collapse_whitespace(&text)
                    })
                    .collect();
                (!cells.is_empty()).then(|| cells.join(" | "))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|err| IndexerError::InvalidSelector(format!("{selector}: {err}")))
}

/// Whether the closest `tag` ancestor of `element` is `owner`.
fn owned_by(element: ElementRef<'_>, tag: &str, owner: ElementRef<'_>) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| ancestor.value().name() == tag)
        .is_some_and(|ancestor| ancestor.id() == owner.id())
}

fn collapse_whitespace(line: &str) -> String {
    line.split_whitespace().collect::<Vec<_>>().join(" ")
}
