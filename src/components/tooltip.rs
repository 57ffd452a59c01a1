use leptos::prelude::*;

/// Hover/long-press hint. Positioning and visibility are pure CSS
/// (`.tooltip` in style/tailwind.css), so it works on touch without handlers.
#[component]
pub fn Tooltip(#[prop(into)] text: String, children: Children) -> impl IntoView {
    let label = text.clone();
    view! {
        <span class="tooltip relative inline-flex" tabindex="0" aria-label=label>
            {children()}
            <span role="tooltip" class="tooltip-text">
                {text}
            </span>
        </span>
    }
}
