use leptos::prelude::*;

use crate::markdown::render_markdown;

/// Renders markdown, or pre-rendered HTML when the answer already has it.
#[component]
pub fn MarkdownRenderer(
    #[prop(into)] content: String,
    html: Option<String>,
    #[prop(optional, into)] class: String,
) -> impl IntoView {
    let rendered = html.unwrap_or_else(|| render_markdown(&content));

    view! { <div class=format!("prose dark:prose-invert max-w-none {}", class) inner_html=rendered></div> }
}
