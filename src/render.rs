use pulldown_cmark::{html, Options, Parser};

/// Converts post markup into HTML that is embedded without further escaping.
pub trait MarkupRenderer {
    fn render(&self, markup: &str) -> String;
}

#[derive(Debug, Clone, Copy)]
pub struct Markdown {
    options: Options,
}

impl Default for Markdown {
    fn default() -> Markdown {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        Markdown { options }
    }
}

impl MarkupRenderer for Markdown {
    fn render(&self, markup: &str) -> String {
        let parser = Parser::new_ext(markup, self.options);
        let mut html_str = String::with_capacity(markup.len() * 3 / 2);
        html::push_html(&mut html_str, parser);
        html_str
    }
}

impl<R: MarkupRenderer + ?Sized> MarkupRenderer for &R {
    fn render(&self, markup: &str) -> String {
        (**self).render(markup)
    }
}

/// First `len` characters of `content`, with `...` appended when cut.
pub fn excerpt(content: &str, len: usize) -> String {
    match content.char_indices().nth(len) {
        Some((end, _)) => format!("{}...", &content[..end]),
        None => content.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_markdown() {
        let html = Markdown::default().render("# Title\n\nSome *text*.");
        assert_eq!(html, "<h1>Title</h1>\n<p>Some <em>text</em>.</p>\n");
    }

    #[test]
    fn renders_tables() {
        let html = Markdown::default().render("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<table>"));
    }

    #[test]
    fn excerpt_keeps_short_content() {
        assert_eq!(excerpt("short", 300), "short");
    }

    #[test]
    fn excerpt_cuts_on_char_boundary() {
        assert_eq!(excerpt("héllo wörld", 7), "héllo w...");
    }
}
