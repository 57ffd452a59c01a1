use leptos::prelude::*;

use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::state::{
    ChatController, ChatState, DocumentViewer, DocumentViewerState, LibraryState, Reducer,
    SlugResolver, Store, UploadCoordinator,
};

#[derive(Clone)]
pub struct AppServices {
    pub chat: ChatController<ApiClient>,
    pub viewer: DocumentViewer,
    pub library: UploadCoordinator<ApiClient>,
    pub resolver: SlugResolver,
}

/// Handle to the app's state containers, shared through leptos context.
///
/// The containers are single-threaded, so they live in local storage; each
/// store bumps a version signal on change so views re-render.
#[derive(Clone, Copy)]
pub struct AppContext {
    services: StoredValue<AppServices, LocalStorage>,
    chat_version: RwSignal<u64>,
    viewer_version: RwSignal<u64>,
    library_version: RwSignal<u64>,
}

fn bind_version<S: Reducer + 'static>(store: &Store<S>, version: RwSignal<u64>) {
    store.subscribe(move || version.update(|v| *v += 1));
}

pub fn provide_app_context() -> AppContext {
    let config = ClientConfig::from_env();
    let api = ApiClient::new(config.clone());

    let services = AppServices {
        chat: ChatController::new(api.clone()),
        viewer: DocumentViewer::new(config.fallback_document_url.clone()),
        library: UploadCoordinator::new(api),
        resolver: SlugResolver::new(config.api_base_url.clone()),
    };

    let ctx = AppContext {
        services: StoredValue::new_local(services.clone()),
        chat_version: RwSignal::new(0),
        viewer_version: RwSignal::new(0),
        library_version: RwSignal::new(0),
    };

    bind_version(services.chat.store(), ctx.chat_version);
    bind_version(services.viewer.store(), ctx.viewer_version);
    bind_version(services.library.store(), ctx.library_version);

    provide_context(ctx);
    ctx
}

pub fn use_app_context() -> AppContext {
    expect_context::<AppContext>()
}

impl AppContext {
    pub fn chat(&self) -> ChatController<ApiClient> {
        self.services.with_value(|s| s.chat.clone())
    }

    pub fn viewer(&self) -> DocumentViewer {
        self.services.with_value(|s| s.viewer.clone())
    }

    pub fn library(&self) -> UploadCoordinator<ApiClient> {
        self.services.with_value(|s| s.library.clone())
    }

    pub fn resolver(&self) -> SlugResolver {
        self.services.with_value(|s| s.resolver.clone())
    }

    /// Reactive read of the chat state.
    pub fn chat_state(&self) -> ChatState {
        self.chat_version.track();
        self.chat().state()
    }

    pub fn viewer_state(&self) -> DocumentViewerState {
        self.viewer_version.track();
        self.viewer().store().snapshot()
    }

    pub fn library_state(&self) -> LibraryState {
        self.library_version.track();
        self.library().store().snapshot()
    }
}
