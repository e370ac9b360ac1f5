pub mod frontmatter;
pub mod markdown;

pub use frontmatter::{generate_frontmatter, render_document};
pub use markdown::{EmbeddedWidgetRule, HeaderAnchorRule, MarkupConverter, RewriteContext, RewriteRule, convert_to_markdown};
