use std::io;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use walkdir::WalkDir;

static SVG_DOC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<svg\b([^>]*)>(.*)</svg>").unwrap());

static VIEWBOX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"viewBox="([^"]*)""#).unwrap());

/// Expand a symbol id pattern for one icon.
///
/// `[dir]` becomes the icon's directory path relative to the svg root
/// with separators replaced by hyphens, `[name]` the file stem. Hyphen
/// runs left behind by an empty `[dir]` collapse to a single hyphen.
pub fn symbol_id(pattern: &str, dir: &str, name: &str) -> String {
    let mut id = pattern.replace("[dir]", dir).replace("[name]", name);
    while id.contains("--") {
        id = id.replace("--", "-");
    }
    id
}

/// Assemble one sprite document from every `.svg` file under `svg_dir`,
/// visited in sorted order. Each icon becomes a `<symbol>` carrying its
/// source viewBox; files without a recognizable `<svg>` root are
/// skipped.
pub fn build_sprite(svg_dir: &Path, id_pattern: &str) -> io::Result<String> {
    let mut symbols = String::new();

    for entry in WalkDir::new(svg_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() || path.extension().map(|ext| ext != "svg").unwrap_or(true) {
            continue;
        }

        let content = std::fs::read_to_string(path)?;
        let Some(caps) = SVG_DOC_RE.captures(&content) else {
            log::warn!("skipping {}: no <svg> root element", path.display());
            continue;
        };
        let attrs = caps.get(1).map(|m| m.as_str()).unwrap_or("");
        let body = caps.get(2).map(|m| m.as_str()).unwrap_or("").trim();

        let dir = path
            .parent()
            .and_then(|p| p.strip_prefix(svg_dir).ok())
            .map(|p| {
                p.components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect::<Vec<_>>()
                    .join("-")
            })
            .unwrap_or_default();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let id = symbol_id(id_pattern, &dir, &name);

        let viewbox = VIEWBOX_RE
            .captures(attrs)
            .and_then(|c| c.get(1))
            .map(|m| format!(" viewBox=\"{}\"", m.as_str()))
            .unwrap_or_default();

        symbols.push_str(&format!(
            "<symbol id=\"{}\"{}>{}</symbol>",
            html_escape::encode_quoted_attribute(&id),
            viewbox,
            body
        ));
    }

    Ok(format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" style=\"display:none\" aria-hidden=\"true\">{}</svg>",
        symbols
    ))
}
