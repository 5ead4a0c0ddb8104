use scraper::{Html, Selector};
use serde_json::Value;

/// Every JSON-LD node in the document, flattening top-level arrays and `@graph`.
fn nodes(document: &Html) -> Vec<Value> {
    let mut nodes = Vec::new();

    if let Ok(script_selector) = Selector::parse("script[type='application/ld+json']") {
        for script in document.select(&script_selector) {
            let raw = script.text().collect::<String>();
            let Ok(json) = serde_json::from_str::<Value>(raw.trim()) else {
                continue;
            };
            if let Value::Array(items) = json {
                nodes.extend(items);
                continue;
            }
            if let Some(Value::Array(graph)) = json.get("@graph") {
                nodes.extend(graph.iter().cloned());
            }
            if json.is_object() {
                nodes.push(json);
            }
        }
    }

    nodes
}

/// Extracts authors from JSON-LD metadata in the HTML document.
/// Returns a vector of author names, without duplicates.
pub fn extract_authors(document: &Html) -> Vec<String> {
    let mut authors: Vec<String> = Vec::new();

    for node in nodes(document) {
        let Some(author) = node.get("author") else {
            continue;
        };
        let names: Vec<&str> = match author {
            Value::Array(arr) => arr
                .iter()
                .filter_map(|a| a.get("name").and_then(|n| n.as_str()).or_else(|| a.as_str()))
                .collect(),
            Value::Object(obj) => obj.get("name").and_then(|n| n.as_str()).into_iter().collect(),
            Value::String(s) => vec![s.as_str()],
            _ => vec![],
        };
        for name in names {
            let name = name.trim();
            if !name.is_empty() && !authors.iter().any(|a| a == name) {
                authors.push(name.to_string());
            }
        }
    }

    authors
}

pub fn extract_headline(document: &Html) -> Option<String> {
    nodes(document)
        .iter()
        .filter_map(|node| node.get("headline").and_then(|h| h.as_str()))
        .map(str::trim)
        .find(|h| !h.is_empty())
        .map(str::to_string)
}
