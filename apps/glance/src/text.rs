//! Response text cleanup
//!
//! Two transforms applied to generation results: fence stripping when the
//! model ignores the no-markdown instruction, and comment-prefixing before
//! replay so half-typed code never executes in a focused terminal or REPL.

/// Remove markdown code-fence lines from a model response and trim the rest.
pub fn strip_markdown_fences(response: &str) -> String {
    response
        .lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Prefix every line with `# ` for safe typing. Empty lines become a bare
/// `#`, trailing whitespace is dropped.
pub fn comment_prefix(code: &str) -> String {
    code.lines()
        .map(|line| {
            let trimmed = line.trim_end();
            if trimmed.is_empty() {
                "#".to_string()
            } else {
                format!("# {trimmed}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
