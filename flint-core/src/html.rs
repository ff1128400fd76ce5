use std::sync::LazyLock;

use regex::Regex;

static MODULE_SCRIPT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<script[^>]*type="module"[^>]*>.*?</script>"#).unwrap()
});

/// Move every `<script type="module">` tag to the end of the document
/// body.
///
/// Matched tags are removed in place and reinserted, newline separated
/// and in original order, immediately before the first closing body
/// tag. A document without a closing body tag comes back with the tags
/// stripped and nothing reinserted.
pub fn relocate_module_scripts(html: &str) -> String {
    let scripts: Vec<&str> = MODULE_SCRIPT_RE.find_iter(html).map(|m| m.as_str()).collect();
    if scripts.is_empty() {
        return html.to_string();
    }

    let stripped = MODULE_SCRIPT_RE.replace_all(html, "");
    let tail = format!("{}</body>", scripts.join("\n"));
    stripped.replacen("</body>", &tail, 1)
}

/// Insert `snippet` just before the last closing body tag, or append it
/// when the document has none.
pub fn inject_before_body(html: &str, snippet: &str) -> String {
    if let Some(pos) = html.rfind("</body>") {
        let mut result = String::with_capacity(html.len() + snippet.len());
        result.push_str(&html[..pos]);
        result.push_str(snippet);
        result.push_str(&html[pos..]);
        result
    } else {
        format!("{}{}", html, snippet)
    }
}
