use leptos::prelude::*;

use crate::context::use_app_context;

/// Appends the PDF open-parameters fragment so the embedded viewer jumps to
/// the page.
fn page_url(url: &str, page: u32) -> String {
    let base = url.split('#').next().unwrap_or(url);
    format!("{}#page={}", base, page)
}

#[component]
pub fn DocumentViewerPanel() -> impl IntoView {
    let ctx = use_app_context();

    let is_open = Memo::new(move |_| ctx.viewer_state().is_open);
    let title = Memo::new(move |_| ctx.viewer_state().document_title.unwrap_or_default());
    let page = Memo::new(move |_| ctx.viewer_state().current_page);
    let src = Memo::new(move |_| {
        let state = ctx.viewer_state();
        state
            .document_url
            .map(|url| page_url(&url, state.current_page))
    });
    let highlighted = Memo::new(move |_| ctx.viewer_state().highlighted_citations().to_vec());

    view! {
        <Show when=move || is_open.get()>
            <section
                class="flex flex-col h-full min-h-0 bg-white dark:bg-teal-800 rounded-lg shadow-lg"
                aria-label="Document viewer"
            >
                <div class="flex items-center justify-between gap-2 p-3 border-b border-gray-200 dark:border-teal-700">
                    <h2 class="font-semibold text-gray-800 dark:text-gray-200 truncate">
                        {move || title.get()}
                    </h2>
                    <div class="flex items-center space-x-1 text-sm">
                        <button
                            class="px-2 py-1 rounded bg-gray-100 dark:bg-teal-700 disabled:opacity-50"
                            aria-label="Previous page"
                            prop:disabled=move || page.get() <= 1
                            on:click=move |_| ctx.viewer().set_page(page.get_untracked().saturating_sub(1))
                        >
                            "‹"
                        </button>
                        <span class="px-2 text-gray-600 dark:text-gray-300">
                            {move || format!("Page {}", page.get())}
                        </span>
                        <button
                            class="px-2 py-1 rounded bg-gray-100 dark:bg-teal-700"
                            aria-label="Next page"
                            on:click=move |_| ctx.viewer().set_page(page.get_untracked() + 1)
                        >
                            "›"
                        </button>
                        <button
                            class="ml-2 px-2 py-1 rounded text-gray-500 hover:text-gray-700 dark:text-gray-400"
                            aria-label="Close document"
                            on:click=move |_| ctx.viewer().close_document()
                        >
                            "✕"
                        </button>
                    </div>
                </div>

                {move || {
                    let citations = highlighted.get();
                    (!citations.is_empty())
                        .then(|| {
                            view! {
                                <div class="flex flex-wrap gap-2 px-3 py-2 border-b border-gray-200 dark:border-teal-700">
                                    {citations
                                        .into_iter()
                                        .map(|citation| {
                                            let id = citation.id.clone();
                                            let label = match &citation.quote {
                                                Some(quote) => format!("{}: {}", citation.title, quote),
                                                None => citation.title.clone(),
                                            };
                                            view! {
                                                <span class="inline-flex items-center max-w-xs text-xs rounded-full px-2 py-1
                                                bg-aqua-100 dark:bg-aqua-900 text-aqua-800 dark:text-aqua-100">
                                                    <span class="truncate" title=label.clone()>{label.clone()}</span>
                                                    <button
                                                        class="ml-1 opacity-70 hover:opacity-100"
                                                        aria-label="Remove highlight"
                                                        on:click=move |_| {
                                                            ctx.viewer().remove_highlighted_citation(&id)
                                                        }
                                                    >
                                                        "✕"
                                                    </button>
                                                </span>
                                            }
                                        })
                                        .collect_view()}
                                </div>
                            }
                        })
                }}

                <div class="flex-1 min-h-0">
                    {move || match src.get() {
                        Some(url) => {
                            view! {
                                <iframe
                                    class="w-full h-full min-h-[60vh] border-0 rounded-b-lg"
                                    src=url
                                    title=move || title.get()
                                ></iframe>
                            }
                                .into_any()
                        }
                        None => {
                            view! {
                                <p class="p-4 text-sm text-gray-500 dark:text-gray-400">
                                    "No document selected."
                                </p>
                            }
                                .into_any()
                        }
                    }}
                </div>
            </section>
        </Show>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_fragment_replaces_existing_fragment() {
        assert_eq!(page_url("http://h/d.pdf", 3), "http://h/d.pdf#page=3");
        assert_eq!(page_url("http://h/d.pdf#page=1", 7), "http://h/d.pdf#page=7");
    }
}
