use crate::Article;

const DELIMITER: &str = "---";

/// Render the metadata header block for an article.
///
/// Field order is fixed: title, emoji, type, topics, published.
pub fn generate_frontmatter(article: &Article) -> String {
    let topics = article
        .topics
        .iter()
        .map(|t| quote(t))
        .collect::<Vec<_>>()
        .join(", ");

    let mut frontmatter = String::from(DELIMITER);
    frontmatter.push_str(&format!("\ntitle: {}", quote(&article.title)));
    frontmatter.push_str(&format!("\nemoji: {}", quote(&article.emoji)));
    frontmatter.push_str(&format!("\ntype: {}", quote(article.article_type.as_str())));
    frontmatter.push_str(&format!("\ntopics: [{}]", topics));
    frontmatter.push_str(&format!("\npublished: {}", article.published));
    frontmatter.push('\n');
    frontmatter.push_str(DELIMITER);
    frontmatter.push('\n');

    frontmatter
}

/// Header block, a blank line, then the body verbatim.
pub fn render_document(article: &Article) -> String {
    let mut output = generate_frontmatter(article);
    output.push('\n');
    output.push_str(&article.content);
    output
}

/// Double-quote a string, escaping backslashes and quotes
fn quote(s: &str) -> String {
    if s.contains('"') || s.contains('\\') {
        format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        format!("\"{}\"", s)
    }
}
