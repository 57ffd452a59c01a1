use leptos::leptos_dom::helpers::TimeoutHandle;
use leptos::prelude::*;
use std::time::Duration;

const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Debounced search box for the conversation history.
#[component]
pub fn HistorySearch(#[prop(into)] on_search: Callback<String>) -> impl IntoView {
    let (search_term, set_search_term) = signal(String::new());
    let timeout_handle: StoredValue<Option<TimeoutHandle>> = StoredValue::new(None);

    // create debounced effect for search
    Effect::new(move |_| {
        let current = search_term.get();

        if let Some(handle) = timeout_handle.get_value() {
            handle.clear();
        }

        match set_timeout_with_handle(move || on_search.run(current), SEARCH_DEBOUNCE) {
            Ok(handle) => timeout_handle.set_value(Some(handle)),
            Err(e) => log::error!("failed to schedule history search: {:?}", e),
        }
    });

    let clear_search = move |_| {
        on_search.run(String::new());
        set_search_term.set(String::new());
    };

    view! {
        <div class="relative">
            <input
                type="search"
                placeholder="Search conversations..."
                prop:value=search_term
                on:input=move |ev| {
                    set_search_term.set(event_target_value(&ev));
                }
                class="w-full px-3 py-2 text-sm text-gray-800 dark:text-gray-200
                bg-white dark:bg-teal-800
                border-2 border-teal-600 dark:border-seafoam-600
                focus:border-seafoam-500 dark:focus:border-aqua-500
                rounded-lg shadow-sm
                focus:outline-none transition duration-0"
            />
            {move || {
                (!search_term.get().is_empty())
                    .then(|| {
                        view! {
                            <button
                                on:click=clear_search
                                aria-label="Clear search"
                                class="absolute right-3 top-1/2 -translate-y-1/2
                                text-gray-400 hover:text-gray-600
                                dark:text-gray-500 dark:hover:text-gray-300"
                            >
                                "✕"
                            </button>
                        }
                    })
            }}
        </div>
    }
}
