use leptos::prelude::*;
use leptos_meta::{provide_meta_context, MetaTags, Stylesheet, Title};
use leptos_router::{
    components::{Route, Router, Routes},
    path,
};

use crate::components::chat::ChatPanel;
use crate::components::document_viewer::DocumentViewerPanel;
use crate::components::history::HistoryDrawer;
use crate::components::theme_selector::ThemeSelector;
use crate::components::tooltip::Tooltip;
use crate::components::upload::UploadZone;
use crate::context::{provide_app_context, use_app_context};
use crate::state::Drawer;

pub fn shell(options: LeptosOptions) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8" />
                <meta name="viewport" content="width=device-width, initial-scale=1, viewport-fit=cover" />
                <AutoReload options=options.clone() />
                <HydrationScripts options />
                <MetaTags />
            </head>
            <body class="bg-gray-100 dark:bg-teal-950 text-gray-900 dark:text-gray-100">
                <App />
            </body>
        </html>
    }
}

#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();
    provide_app_context();

    view! {
        <Stylesheet id="leptos" href="/pkg/docchat.css" />
        <Title text="Document Chat" />

        <Router>
            <main>
                <Routes fallback=|| view! { <NotFound /> }>
                    <Route path=path!("") view=HomePage />
                </Routes>
            </main>
        </Router>
    }
}

#[component]
fn NotFound() -> impl IntoView {
    view! {
        <div class="p-8 text-center">
            <h1 class="text-2xl font-bold">"Not found"</h1>
            <a href="/" class="text-seafoam-600 hover:underline">"Back to chat"</a>
        </div>
    }
}

#[component]
fn HomePage() -> impl IntoView {
    let ctx = use_app_context();
    let drawer = RwSignal::new(Drawer::default());
    let (show_library, set_show_library) = signal(false);

    let can_reopen = Memo::new(move |_| {
        let state = ctx.viewer_state();
        !state.is_open && state.document_url.is_some()
    });

    view! {
        <div class="flex h-[100dvh] overflow-hidden">
            <HistoryDrawer drawer=drawer />
            <div class="flex flex-col flex-1 min-w-0">
                <header class="flex items-center justify-between gap-2 px-4 py-2 border-b border-gray-200 dark:border-teal-800">
                    <div class="flex items-center gap-2">
                        <button
                            class="lg:hidden px-2 py-1 rounded bg-gray-200 dark:bg-teal-800"
                            aria-label="Open history"
                            on:click=move |_| drawer.update(|d| d.toggle())
                        >
                            "☰"
                        </button>
                        <h1 class="text-xl font-bold text-seafoam-700 dark:text-seafoam-300">"Document Chat"</h1>
                    </div>
                    <div class="flex items-center gap-2">
                        {move || {
                            can_reopen
                                .get()
                                .then(|| {
                                    view! {
                                        <Tooltip text="Show the last document again">
                                            <button
                                                class="px-2 py-1 text-sm rounded bg-gray-200 dark:bg-teal-800"
                                                on:click=move |_| ctx.viewer().reopen()
                                            >
                                                "Reopen document"
                                            </button>
                                        </Tooltip>
                                    }
                                })
                        }}
                        <button
                            class="px-2 py-1 text-sm rounded bg-gray-200 dark:bg-teal-800"
                            aria-pressed=move || show_library.get().to_string()
                            on:click=move |_| set_show_library.update(|v| *v = !*v)
                        >
                            "Documents"
                        </button>
                        <ThemeSelector />
                    </div>
                </header>
                <div class="flex flex-1 min-h-0 gap-4 p-4 flex-col lg:flex-row">
                    <div class="flex-1 min-h-0 min-w-0">
                        <ChatPanel />
                    </div>
                    <div class="lg:w-[45%] min-h-0 empty:hidden">
                        <DocumentViewerPanel />
                    </div>
                    <Show when=move || show_library.get()>
                        <aside class="lg:w-80 shrink-0 overflow-y-auto">
                            <UploadZone />
                        </aside>
                    </Show>
                </div>
            </div>
        </div>
    }
}
