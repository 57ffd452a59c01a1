use leptos::prelude::*;

use crate::components::search::HistorySearch;
use crate::context::use_app_context;
use crate::state::{filter_groups, group_conversations, ConversationGroup, Drawer};

/// Horizontal swipe (px) that closes the drawer.
const SWIPE_CLOSE_DISTANCE: i32 = 60;

#[component]
pub fn HistoryDrawer(drawer: RwSignal<Drawer>) -> impl IntoView {
    let ctx = use_app_context();
    let (query, set_query) = signal(String::new());
    let touch_start_x: StoredValue<Option<i32>> = StoredValue::new(None);

    let groups = Memo::new(move |_| group_conversations(&ctx.chat_state().messages));
    let visible = Memo::new(move |_| filter_groups(&groups.get(), &query.get()));

    let on_touch_start = move |ev: web_sys::TouchEvent| {
        if let Some(touch) = ev.touches().get(0) {
            touch_start_x.set_value(Some(touch.client_x()));
        }
    };

    let on_touch_end = move |ev: web_sys::TouchEvent| {
        let start = touch_start_x.get_value();
        touch_start_x.set_value(None);
        if let (Some(start), Some(touch)) = (start, ev.changed_touches().get(0)) {
            if start - touch.client_x() > SWIPE_CLOSE_DISTANCE {
                drawer.update(|d| d.close());
            }
        }
    };

    let jump_to = move |message_id: String| {
        drawer.update(|d| d.close());
        if let Some(element) = document().get_element_by_id(&format!("msg-{}", message_id)) {
            element.scroll_into_view();
        }
    };

    view! {
        // Backdrop on small screens
        {move || {
            drawer
                .get()
                .is_open()
                .then(|| {
                    view! {
                        <div
                            class="fixed inset-0 z-30 bg-black/40 lg:hidden"
                            on:click=move |_| drawer.update(|d| d.close())
                        ></div>
                    }
                })
        }}
        <aside
            class=move || {
                format!(
                    "fixed inset-y-0 left-0 z-40 w-80 max-w-[85vw] transform transition-transform duration-200
                    bg-gray-50 dark:bg-teal-900 border-r border-gray-200 dark:border-teal-700
                    flex flex-col lg:static lg:translate-x-0 lg:z-auto {}",
                    if drawer.get().is_open() { "translate-x-0" } else { "-translate-x-full" },
                )
            }
            on:touchstart=on_touch_start
            on:touchend=on_touch_end
            aria-label="Conversation history"
        >
            <div class="flex items-center justify-between p-3 border-b border-gray-200 dark:border-teal-700">
                <h2 class="font-semibold text-gray-800 dark:text-gray-200">"History"</h2>
                <button
                    class="lg:hidden text-gray-500 hover:text-gray-700 dark:text-gray-400"
                    aria-label="Close history"
                    on:click=move |_| drawer.update(|d| d.close())
                >
                    "✕"
                </button>
            </div>
            <div class="p-3">
                <HistorySearch on_search=Callback::new(move |term: String| set_query.set(term)) />
            </div>
            <div class="flex-1 overflow-y-auto px-3 pb-3 space-y-2">
                {move || {
                    if visible.get().is_empty() {
                        let message = if groups.get().is_empty() {
                            "No conversations yet."
                        } else {
                            "No conversations match your search."
                        };
                        view! { <p class="text-sm text-gray-500 dark:text-gray-400">{message}</p> }
                            .into_any()
                    } else {
                        view! {
                            <For
                                each=move || visible.get()
                                key=|group| {
                                    (
                                        group.messages.first().map(|m| m.id.clone()),
                                        group.messages.len(),
                                        group.citation_count,
                                    )
                                }
                                children=move |group| {
                                    view! { <HistoryEntry group=group on_select=Callback::new(jump_to) /> }
                                }
                            />
                        }
                            .into_any()
                    }
                }}
            </div>
        </aside>
    }
}

#[component]
fn HistoryEntry(group: ConversationGroup, #[prop(into)] on_select: Callback<String>) -> impl IntoView {
    let first_id = group.messages.first().map(|m| m.id.clone()).unwrap_or_default();
    let preview = group.preview().to_string();
    let date = group
        .date
        .with_timezone(&chrono::Local)
        .format("%b %-d, %H:%M")
        .to_string();
    let summary = format!(
        "{} question{} · {} source{}",
        group.question_count,
        if group.question_count == 1 { "" } else { "s" },
        group.citation_count,
        if group.citation_count == 1 { "" } else { "s" },
    );

    view! {
        <button
            class="w-full text-left p-3 rounded-md bg-white dark:bg-teal-800 border border-gray-200 dark:border-teal-700
            hover:border-seafoam-400 dark:hover:border-seafoam-500 transition-colors"
            on:click=move |_| on_select.run(first_id.clone())
        >
            <div class="text-sm text-gray-800 dark:text-gray-200 line-clamp-2">{preview}</div>
            <div class="mt-1 flex justify-between text-xs text-gray-500 dark:text-gray-400">
                <span>{date}</span>
                <span>{summary}</span>
            </div>
        </button>
    }
}
