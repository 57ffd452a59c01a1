use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::components::markdown::MarkdownRenderer;
use crate::components::tooltip::Tooltip;
use crate::context::use_app_context;
use crate::state::SendError;
use crate::types::{Category, ChatMessage, Citation};

#[component]
pub fn ChatPanel() -> impl IntoView {
    let ctx = use_app_context();
    let (current_input, set_current_input) = signal(String::new());

    let is_typing = Memo::new(move |_| ctx.chat_state().is_typing);
    let status = Memo::new(move |_| ctx.chat_state().status);
    let last_error = Memo::new(move |_| ctx.chat_state().last_error);
    let is_empty = Memo::new(move |_| ctx.chat_state().messages.is_empty());

    let send_message = move || {
        let text = current_input.get_untracked();
        if text.trim().is_empty() || is_typing.get_untracked() {
            return;
        }
        set_current_input.set(String::new());

        let chat = ctx.chat();
        spawn_local(async move {
            match chat.send_message(&text).await {
                Ok(()) => {}
                Err(SendError::Api(e)) => log::warn!("chat request ended with error: {}", e),
                Err(e) => log::debug!("message not sent: {}", e),
            }
        });
    };

    let handle_key_press = move |ev: web_sys::KeyboardEvent| {
        if ev.key() == "Enter" && !ev.shift_key() {
            ev.prevent_default();
            send_message();
        }
    };

    let clear_chat = move |_| {
        ctx.chat().clear();
        ctx.viewer().clear_highlights();
    };

    view! {
        <div class="flex flex-col h-full min-h-0 bg-white dark:bg-teal-800 rounded-lg shadow-lg">
            // Header
            <div class="flex items-center justify-between gap-2 p-3 border-b border-gray-200 dark:border-teal-700">
                <h2 class="text-lg font-semibold text-gray-800 dark:text-gray-200 truncate">
                    "Ask the documents"
                </h2>
                <div class="flex items-center space-x-2">
                    <select
                        class="max-w-[12rem] px-2 py-1 text-sm rounded-md bg-gray-100 dark:bg-teal-700
                        text-gray-700 dark:text-gray-200 border border-gray-300 dark:border-teal-600"
                        on:change=move |ev| {
                            let value = event_target_value(&ev);
                            ctx.chat().set_category(Category::from_str(&value));
                        }
                    >
                        <option value="">"All categories"</option>
                        {Category::ALL
                            .into_iter()
                            .map(|category| {
                                view! {
                                    <option value=category.display_name()>
                                        {category.display_name()}
                                    </option>
                                }
                            })
                            .collect_view()}
                    </select>
                    <Tooltip text="Start a new conversation">
                        <button
                            class="px-3 py-1 text-sm bg-gray-500 hover:bg-gray-600 text-white rounded-md transition-colors"
                            on:click=clear_chat
                        >
                            "Clear"
                        </button>
                    </Tooltip>
                </div>
            </div>

            // Messages area
            <div class="flex-1 overflow-y-auto p-4 space-y-4 overscroll-contain">
                {move || {
                    if is_empty.get() && !is_typing.get() {
                        view! {
                            <div class="flex justify-center items-center h-full">
                                <div class="text-center text-gray-500 dark:text-gray-400">
                                    <p class="text-lg mb-2">"Ask a question about your documents."</p>
                                    <p class="text-sm">
                                        "Answers cite their sources; tap a source to open it."
                                    </p>
                                </div>
                            </div>
                        }
                            .into_any()
                    } else {
                        view! {
                            <For
                                each=move || ctx.chat_state().messages
                                key=|msg| {
                                    (
                                        msg.id.clone(),
                                        msg.content.len(),
                                        msg.citations.len(),
                                        msg.answer_html.is_some(),
                                        msg.is_error,
                                    )
                                }
                                children=move |message| {
                                    view! { <MessageBubble message=message /> }
                                }
                            />
                        }
                            .into_any()
                    }
                }}
                {move || {
                    is_typing
                        .get()
                        .then(|| view! { <TypingIndicator status=status.get() /> })
                }}
            </div>

            {move || {
                last_error
                    .get()
                    .map(|err| {
                        view! {
                            <div class="mx-4 mb-2 px-3 py-2 text-sm rounded-md bg-salmon-100 dark:bg-salmon-900 text-salmon-800 dark:text-salmon-200">
                                {format!("Last request failed: {}", err)}
                            </div>
                        }
                    })
            }}

            // Input area
            <div class="p-3 border-t border-gray-200 dark:border-teal-700">
                <div class="flex space-x-3">
                    <textarea
                        class="flex-1 p-3 border border-gray-300 dark:border-teal-600 rounded-lg
                        bg-white dark:bg-teal-700 text-gray-800 dark:text-gray-200
                        focus:outline-none focus:ring-2 focus:ring-seafoam-500 dark:focus:ring-aqua-400
                        resize-none placeholder-gray-400 dark:placeholder-gray-500"
                        placeholder="Ask a question... (Enter to send, Shift+Enter for new line)"
                        rows="2"
                        prop:value=current_input
                        on:input=move |ev| set_current_input.set(event_target_value(&ev))
                        on:keydown=handle_key_press
                        prop:disabled=is_typing
                    ></textarea>
                    <button
                        class="px-5 py-2 bg-seafoam-600 dark:bg-seafoam-500 text-white rounded-lg
                        hover:bg-seafoam-700 dark:hover:bg-seafoam-600 transition-colors
                        disabled:bg-gray-400 dark:disabled:bg-gray-600 disabled:cursor-not-allowed
                        flex items-center justify-center min-w-[72px]"
                        on:click=move |_| send_message()
                        prop:disabled=move || {
                            is_typing.get() || current_input.get().trim().is_empty()
                        }
                    >
                        {move || {
                            if is_typing.get() {
                                view! {
                                    <div class="animate-spin rounded-full h-4 w-4 border-b-2 border-white"></div>
                                }
                                    .into_any()
                            } else {
                                view! { <span>"Send"</span> }.into_any()
                            }
                        }}
                    </button>
                </div>
            </div>
        </div>
    }
}

#[component]
fn TypingIndicator(status: Option<String>) -> impl IntoView {
    view! {
        <div class="flex items-center text-sm text-gray-500 dark:text-gray-400 italic" aria-live="polite">
            <span class="typing-dots mr-2">
                <span></span>
                <span></span>
                <span></span>
            </span>
            {status.unwrap_or_else(|| "Thinking...".to_string())}
        </div>
    }
}

#[component]
fn MessageBubble(message: ChatMessage) -> impl IntoView {
    let is_user = message.is_user();
    let bubble_class = if is_user {
        "bg-seafoam-600 dark:bg-seafoam-500 text-white ml-auto max-w-3xl"
    } else if message.is_error {
        "bg-salmon-100 dark:bg-salmon-900 text-salmon-800 dark:text-salmon-100 max-w-none"
    } else {
        "bg-gray-100 dark:bg-teal-700 text-gray-800 dark:text-gray-200 max-w-none"
    };
    let timestamp = message
        .created_at
        .with_timezone(&chrono::Local)
        .format("%b %-d, %H:%M")
        .to_string();

    let body = if is_user {
        view! { <div class="whitespace-pre-wrap text-left">{message.content}</div> }.into_any()
    } else {
        view! {
            <div class="w-full text-left">
                <MarkdownRenderer content=message.content html=message.answer_html />
            </div>
        }
            .into_any()
    };

    view! {
        <div class="w-full scroll-mt-4" id=format!("msg-{}", message.id)>
            <div class=format!("w-full rounded-lg p-4 {}", bubble_class)>
                {body}
                {(!message.citations.is_empty())
                    .then(|| view! { <CitationsList citations=message.citations /> })}
                <div class="text-xs opacity-70 mt-2 text-left">{timestamp}</div>
            </div>
        </div>
    }
}

#[component]
fn CitationsList(citations: Vec<Citation>) -> impl IntoView {
    let ctx = use_app_context();
    let count = citations.len();

    view! {
        <div class="mt-4 pt-3 border-t border-gray-300 dark:border-teal-600">
            <div class="text-sm font-medium text-gray-600 dark:text-gray-300 mb-3 text-left">
                {format!("Sources ({}):", count)}
            </div>
            <div class="grid gap-2 max-h-48 overflow-y-auto">
                <For
                    each=move || citations.clone()
                    key=|citation| citation.id.clone()
                    children=move |citation| {
                        let id = citation.id.clone();
                        let to_open = citation.clone();
                        let to_toggle = citation.clone();
                        let is_highlighted = Memo::new(move |_| ctx.viewer_state().is_highlighted(&id));
                        let details = [
                            citation.category.clone(),
                            citation.section.clone(),
                            citation.year.map(|y| y.to_string()),
                        ]
                            .into_iter()
                            .flatten()
                            .collect::<Vec<_>>()
                            .join(" • ");

                        view! {
                            <div class=move || {
                                format!(
                                    "text-xs bg-white dark:bg-teal-800 rounded-md p-3 border transition-colors text-left {}",
                                    if is_highlighted.get() {
                                        "border-seafoam-500 dark:border-aqua-400"
                                    } else {
                                        "border-gray-200 dark:border-teal-600"
                                    },
                                )
                            }>
                                <div class="flex justify-between items-start gap-2">
                                    <button
                                        class="font-medium text-seafoam-600 dark:text-seafoam-400 hover:underline text-left"
                                        on:click=move |_| {
                                            let opened = ctx
                                                .viewer()
                                                .open_citation(&to_open, &ctx.resolver());
                                            if !opened {
                                                log::warn!("no document available for {}", to_open.title);
                                            }
                                        }
                                    >
                                        {citation.title.clone()}
                                    </button>
                                    <Tooltip text="Highlight in viewer">
                                        <button
                                            class="px-2 py-0.5 rounded bg-gray-100 dark:bg-teal-700 hover:bg-gray-200 dark:hover:bg-teal-600"
                                            aria-pressed=move || is_highlighted.get().to_string()
                                            on:click=move |_| {
                                                let viewer = ctx.viewer();
                                                if viewer.store().with(|s| s.is_highlighted(&to_toggle.id)) {
                                                    viewer.remove_highlighted_citation(&to_toggle.id);
                                                } else {
                                                    viewer.add_highlighted_citation(to_toggle.clone());
                                                }
                                            }
                                        >
                                            "★"
                                        </button>
                                    </Tooltip>
                                </div>
                                {(!details.is_empty())
                                    .then(|| {
                                        view! {
                                            <div class="text-gray-500 dark:text-gray-400 mt-1">{details}</div>
                                        }
                                    })}
                                {citation
                                    .quote
                                    .clone()
                                    .map(|quote| {
                                        view! {
                                            <blockquote class="mt-1 pl-2 border-l-2 border-gray-300 dark:border-teal-600 italic">
                                                {quote}
                                            </blockquote>
                                        }
                                    })}
                            </div>
                        }
                    }
                />
            </div>
        </div>
    }
}
