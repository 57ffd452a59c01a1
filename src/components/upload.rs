use leptos::html;
use leptos::prelude::*;
use leptos::task::spawn_local;
use wasm_bindgen_futures::JsFuture;

use crate::api::UploadFile;
use crate::context::{use_app_context, AppContext};
use crate::state::{validate_files, PullPhase, PullToRefresh, UploadError};
use crate::types::{Category, DocumentInfo};

async fn read_file(file: web_sys::File) -> Result<UploadFile, String> {
    let buffer = JsFuture::from(file.array_buffer())
        .await
        .map_err(|e| format!("could not read {}: {:?}", file.name(), e))?;
    let bytes = js_sys::Uint8Array::new(&buffer).to_vec();
    let content_type = file.type_();

    Ok(UploadFile {
        name: file.name(),
        content_type: (!content_type.is_empty()).then_some(content_type),
        bytes,
    })
}

async fn read_file_list(list: web_sys::FileList) -> Result<Vec<UploadFile>, String> {
    let mut files = Vec::with_capacity(list.length() as usize);
    for i in 0..list.length() {
        if let Some(file) = list.get(i) {
            files.push(read_file(file).await?);
        }
    }
    Ok(files)
}

fn refresh_documents(ctx: AppContext, category: Option<Category>) {
    let library = ctx.library();
    spawn_local(async move {
        if let Err(e) = library.load_documents(category).await {
            log::warn!("document list refresh failed: {}", e);
        }
    });
}

#[component]
pub fn UploadZone() -> impl IntoView {
    let ctx = use_app_context();
    let input_ref = NodeRef::<html::Input>::new();
    let (dragging, set_dragging) = signal(false);
    let (notice, set_notice) = signal(None::<String>);

    let disabled = Memo::new(move |_| ctx.library_state().disabled);

    let submit = move |list: web_sys::FileList| {
        if disabled.get_untracked() {
            set_notice.set(Some(UploadError::Disabled.to_string()));
            return;
        }
        set_notice.set(None);

        let library = ctx.library();
        spawn_local(async move {
            let files = match read_file_list(list).await {
                Ok(files) => files,
                Err(e) => {
                    log::error!("{}", e);
                    set_notice.set(Some(e));
                    return;
                }
            };
            if let Err(e) = validate_files(&files) {
                set_notice.set(Some(e.to_string()));
                return;
            }

            match library.upload(files).await {
                Ok(count) => {
                    log::info!("uploaded {} document(s)", count);
                    set_notice.set(Some(format!(
                        "Uploaded {} document{}.",
                        count,
                        if count == 1 { "" } else { "s" }
                    )));
                }
                Err(e) => set_notice.set(Some(e.to_string())),
            }
        });
    };

    let on_drop = move |ev: web_sys::DragEvent| {
        ev.prevent_default();
        set_dragging.set(false);
        if let Some(list) = ev.data_transfer().and_then(|dt| dt.files()) {
            submit(list);
        }
    };

    let on_browse = move |_| {
        let Some(input) = input_ref.get() else {
            return;
        };
        if let Some(list) = input.files() {
            submit(list);
        }
        // allow picking the same file again
        input.set_value("");
    };

    view! {
        <div class="space-y-4">
            <div
                class=move || {
                    format!(
                        "flex flex-col items-center justify-center p-6 border-2 border-dashed rounded-lg text-center transition-colors {}",
                        if disabled.get() {
                            "opacity-50 cursor-not-allowed border-gray-300 dark:border-teal-700"
                        } else if dragging.get() {
                            "border-seafoam-500 bg-seafoam-50 dark:bg-teal-700"
                        } else {
                            "border-gray-300 dark:border-teal-600 hover:border-seafoam-400"
                        },
                    )
                }
                aria-disabled=move || disabled.get().to_string()
                on:dragover=move |ev: web_sys::DragEvent| {
                    ev.prevent_default();
                    if !disabled.get_untracked() {
                        set_dragging.set(true);
                    }
                }
                on:dragleave=move |_| set_dragging.set(false)
                on:drop=on_drop
            >
                <p class="text-sm text-gray-600 dark:text-gray-300">
                    {move || {
                        if disabled.get() {
                            "Uploading..."
                        } else {
                            "Drop PDF, DOCX, TXT or MD files here (max 50 MB each)"
                        }
                    }}
                </p>
                <label class="mt-3 px-4 py-2 text-sm rounded-md bg-seafoam-600 hover:bg-seafoam-700 text-white cursor-pointer">
                    "Browse files"
                    <input
                        node_ref=input_ref
                        type="file"
                        class="sr-only"
                        multiple
                        accept=".pdf,.docx,.txt,.md"
                        prop:disabled=disabled
                        on:change=on_browse
                    />
                </label>
            </div>
            {move || {
                notice
                    .get()
                    .map(|text| {
                        view! {
                            <p class="text-sm text-gray-700 dark:text-gray-300" role="status">
                                {text}
                            </p>
                        }
                    })
            }}
            <DocumentList />
        </div>
    }
}

#[component]
fn DocumentList() -> impl IntoView {
    let ctx = use_app_context();
    let list_ref = NodeRef::<html::Div>::new();
    let pull = RwSignal::new(PullToRefresh::default());

    let documents = Memo::new(move |_| ctx.library_state().documents);
    let loading = Memo::new(move |_| ctx.library_state().loading);
    let error = Memo::new(move |_| ctx.library_state().error);
    let category = Memo::new(move |_| ctx.library_state().category);

    Effect::new(move |_| refresh_documents(ctx, None));

    let on_touch_start = move |ev: web_sys::TouchEvent| {
        let scroll_top = list_ref.get().map(|el| el.scroll_top()).unwrap_or(0);
        if let Some(touch) = ev.touches().get(0) {
            pull.update(|p| p.start(touch.client_y() as f64, scroll_top as f64));
        }
    };

    let on_touch_move = move |ev: web_sys::TouchEvent| {
        if let Some(touch) = ev.touches().get(0) {
            pull.update(|p| p.move_to(touch.client_y() as f64));
        }
    };

    let on_touch_end = move |_| {
        let mut triggered = false;
        pull.update(|p| triggered = p.end());
        if triggered {
            refresh_documents(ctx, category.get_untracked());
        }
    };

    view! {
        <div class="flex flex-col min-h-0">
            <div class="flex items-center justify-between mb-2">
                <h3 class="font-semibold text-gray-800 dark:text-gray-200">"Documents"</h3>
                <select
                    class="px-2 py-1 text-sm rounded-md bg-gray-100 dark:bg-teal-700
                    text-gray-700 dark:text-gray-200 border border-gray-300 dark:border-teal-600"
                    on:change=move |ev| refresh_documents(ctx, Category::from_str(&event_target_value(&ev)))
                >
                    <option value="">"All categories"</option>
                    {Category::ALL
                        .into_iter()
                        .map(|category| {
                            view! {
                                <option value=category.display_name()>{category.display_name()}</option>
                            }
                        })
                        .collect_view()}
                </select>
            </div>
            <div
                node_ref=list_ref
                class="max-h-80 overflow-y-auto overscroll-contain space-y-2"
                on:touchstart=on_touch_start
                on:touchmove=on_touch_move
                on:touchend=on_touch_end
            >
                {move || {
                    let label = match pull.get().phase() {
                        PullPhase::Idle => None,
                        PullPhase::Pulling { .. } => Some("Pull to refresh"),
                        PullPhase::Armed { .. } => Some("Release to refresh"),
                    };
                    label
                        .map(|label| {
                            view! {
                                <div
                                    class="text-center text-xs text-gray-500 dark:text-gray-400"
                                    style=move || format!("height: {}px", pull.get().distance())
                                >
                                    {label}
                                </div>
                            }
                        })
                }}
                {move || loading.get().then(|| view! { <p class="text-sm text-gray-500">"Loading..."</p> })}
                {move || {
                    error
                        .get()
                        .map(|e| {
                            view! {
                                <p class="text-sm text-salmon-700 dark:text-salmon-300">{e}</p>
                            }
                        })
                }}
                <For
                    each=move || documents.get()
                    key=|doc| (doc.id.clone(), doc.status.clone())
                    children=move |doc| view! { <DocumentRow doc=doc /> }
                />
                {move || {
                    (documents.get().is_empty() && !loading.get())
                        .then(|| {
                            view! {
                                <p class="text-sm text-gray-500 dark:text-gray-400">"No documents yet."</p>
                            }
                        })
                }}
            </div>
        </div>
    }
}

#[component]
fn DocumentRow(doc: DocumentInfo) -> impl IntoView {
    let status_class = match doc.status.as_str() {
        "ready" | "processed" | "completed" => "bg-seafoam-100 text-seafoam-800 dark:bg-seafoam-900 dark:text-seafoam-100",
        "error" | "failed" => "bg-salmon-100 text-salmon-800 dark:bg-salmon-900 dark:text-salmon-100",
        _ => "bg-gray-100 text-gray-700 dark:bg-teal-700 dark:text-gray-200",
    };

    view! {
        <div class="flex items-center justify-between gap-2 p-2 rounded-md bg-white dark:bg-teal-800 border border-gray-200 dark:border-teal-700">
            <div class="min-w-0">
                <div class="text-sm text-gray-800 dark:text-gray-200 truncate">{doc.name}</div>
                <div class="text-xs text-gray-500 dark:text-gray-400">
                    {format!("{} · {:.1} MB", doc.doc_type.to_uppercase(), doc.size_mb)}
                </div>
            </div>
            <span class=format!("shrink-0 text-xs px-2 py-0.5 rounded-full {}", status_class)>
                {doc.status}
            </span>
        </div>
    }
}
