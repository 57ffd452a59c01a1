use cfg_if::cfg_if;
use leptos::prelude::*;

pub const THEME_STORAGE_KEY: &str = "docchat_theme";

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Theme {
    Light,
    Dark,
    Sepia,
}

impl Theme {
    pub const ALL: [Theme; 3] = [Theme::Light, Theme::Dark, Theme::Sepia];

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::Sepia => "sepia",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "dark" => Theme::Dark,
            "sepia" => Theme::Sepia,
            _ => Theme::Light,
        }
    }

    fn display_name(&self) -> &'static str {
        match self {
            Theme::Light => "Light",
            Theme::Dark => "Dark",
            Theme::Sepia => "Sepia",
        }
    }

    /// Tailwind's `dark:` variants key off a `dark` class on `<html>`.
    pub fn uses_dark_variant(&self) -> bool {
        matches!(self, Theme::Dark)
    }
}

/// Key/value persistence for the theme choice.
pub trait ThemeStorage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> bool;
}

/// The browser's `localStorage`; inert when rendering on the server.
pub struct BrowserStorage;

#[cfg(feature = "hydrate")]
impl ThemeStorage for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        web_sys::window()?
            .local_storage()
            .ok()
            .flatten()?
            .get_item(key)
            .ok()
            .flatten()
    }

    fn set(&self, key: &str, value: &str) -> bool {
        web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .is_some_and(|storage| storage.set_item(key, value).is_ok())
    }
}

#[cfg(not(feature = "hydrate"))]
impl ThemeStorage for BrowserStorage {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn set(&self, _key: &str, _value: &str) -> bool {
        false
    }
}

pub fn load_theme(storage: &impl ThemeStorage) -> Option<Theme> {
    storage.get(THEME_STORAGE_KEY).map(|value| Theme::from_str(&value))
}

pub fn save_theme(storage: &impl ThemeStorage, theme: Theme) {
    if !storage.set(THEME_STORAGE_KEY, theme.as_str()) {
        log::warn!("could not persist theme preference");
    }
}

/// Theme to use when nothing is stored: follows the OS preference.
fn system_theme() -> Theme {
    cfg_if! {
        if #[cfg(feature = "hydrate")] {
            let prefers_dark = web_sys::window()
                .and_then(|w| w.match_media("(prefers-color-scheme: dark)").ok().flatten())
                .is_some_and(|query| query.matches());
            if prefers_dark { Theme::Dark } else { Theme::Light }
        } else {
            Theme::Light
        }
    }
}

fn apply_theme_to_document(theme: Theme) {
    cfg_if! {
        if #[cfg(feature = "hydrate")] {
            use web_sys::window;
            if let Some(document) = window().and_then(|w| w.document()) {
                if let Some(html_element) = document.document_element() {
                    let _ = html_element.set_attribute("data-theme", theme.as_str());
                    let class_list = html_element.class_list();
                    if theme.uses_dark_variant() {
                        let _ = class_list.add_1("dark");
                    } else {
                        let _ = class_list.remove_1("dark");
                    }
                }
            }
        }
    }
}

#[component]
pub fn ThemeSelector() -> impl IntoView {
    let (current_theme, set_current_theme) = signal(Theme::Light);

    // effects only run in the browser
    Effect::new(move |_| {
        set_current_theme.set(load_theme(&BrowserStorage).unwrap_or_else(system_theme));
    });

    Effect::new(move |_| {
        let theme = current_theme.get();
        apply_theme_to_document(theme);
        save_theme(&BrowserStorage, theme);
    });

    view! {
        <div class="flex items-center space-x-2">
            <label class="sr-only sm:not-sr-only text-sm font-medium text-gray-700 dark:text-gray-300">
                "Theme:"
            </label>
            <select
                class="px-2 py-1 text-sm rounded border border-gray-300 dark:border-gray-600
                bg-white dark:bg-gray-800 text-gray-900 dark:text-gray-100"
                on:change=move |ev| {
                    let value = event_target_value(&ev);
                    set_current_theme.set(Theme::from_str(&value));
                }
                prop:value=move || current_theme.get().as_str()
            >
                {Theme::ALL
                    .into_iter()
                    .map(|theme| {
                        view! { <option value=theme.as_str()>{theme.display_name()}</option> }
                    })
                    .collect_view()}
            </select>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[test]
    fn theme_names_round_trip() {
        for theme in Theme::ALL {
            assert_eq!(Theme::from_str(theme.as_str()), theme);
        }
    }

    #[test]
    fn unknown_stored_value_falls_back_to_light() {
        assert_eq!(Theme::from_str("neon"), Theme::Light);
    }

    #[derive(Default)]
    struct MemoryStorage {
        items: RefCell<HashMap<String, String>>,
    }

    impl ThemeStorage for MemoryStorage {
        fn get(&self, key: &str) -> Option<String> {
            self.items.borrow().get(key).cloned()
        }

        fn set(&self, key: &str, value: &str) -> bool {
            self.items.borrow_mut().insert(key.to_string(), value.to_string());
            true
        }
    }

    #[test]
    fn theme_round_trips_through_its_storage_key() {
        let storage = MemoryStorage::default();
        assert_eq!(load_theme(&storage), None);

        save_theme(&storage, Theme::Sepia);

        assert_eq!(
            storage.items.borrow().get(THEME_STORAGE_KEY).map(String::as_str),
            Some("sepia")
        );
        assert_eq!(load_theme(&storage), Some(Theme::Sepia));
    }

    #[test]
    fn corrupted_stored_theme_loads_as_light() {
        let storage = MemoryStorage::default();
        storage.set(THEME_STORAGE_KEY, "plaid");
        assert_eq!(load_theme(&storage), Some(Theme::Light));
    }
}
