use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};

/// Renders assistant markdown to HTML. Raw HTML in the source is escaped
/// rather than passed through, and link/image targets with a scheme other
/// than http, https or mailto are replaced with `#`, since answers are
/// injected with `inner_html`.
pub fn render_markdown(source: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(source, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        other => other,
    });

    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

fn safe_url(url: CowStr<'_>) -> CowStr<'_> {
    if is_safe_url(&url) {
        url
    } else {
        log::warn!("dropping unsafe link target in answer");
        CowStr::Borrowed("#")
    }
}

/// Relative targets are allowed; anything carrying a scheme must be one of
/// http, https or mailto.
fn is_safe_url(url: &str) -> bool {
    // browsers ignore embedded whitespace and control characters in schemes
    let compact: String = url
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();

    match compact.split_once(':') {
        None => true,
        Some((scheme, _)) if scheme.contains(['/', '?', '#']) => true,
        Some((scheme, _)) => matches!(scheme, "http" | "https" | "mailto"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_lists_and_emphasis() {
        let html = render_markdown("**Yes.**\n\n- one\n- two\n");
        assert!(html.contains("<strong>Yes.</strong>"));
        assert!(html.contains("<li>one</li>"));
    }

    #[test]
    fn raw_html_is_escaped() {
        let html = render_markdown("<script>alert(1)</script>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn script_links_are_neutralized() {
        let html = render_markdown("[click](javascript:alert(document.cookie))");
        assert!(!html.contains("javascript:"));
        assert!(html.contains(r##"<a href="#">click</a>"##));

        let image = render_markdown("![x](data:text/html;base64,PHNjcmlwdD4=)");
        assert!(!image.contains("data:"));

        let obfuscated = render_markdown("[x](JavaScript&#58;alert(1))");
        assert!(!obfuscated.to_ascii_lowercase().contains("javascript:"));
    }

    #[test]
    fn ordinary_links_are_kept() {
        let html = render_markdown(
            "[doc](https://example.org/a.pdf) [mail](mailto:clerk@example.org) [page](/documents/bylaws.pdf) [top](#top)",
        );
        assert!(html.contains(r#"href="https://example.org/a.pdf""#));
        assert!(html.contains(r#"href="mailto:clerk@example.org""#));
        assert!(html.contains(r#"href="/documents/bylaws.pdf""#));
        assert!(html.contains(r##"href="#top""##));
    }
}
