use cfg_if::cfg_if;

cfg_if! {
    if #[cfg(feature = "ssr")] {
        use anyhow::Context;
        use axum::{extract::FromRef, Router};
        use dotenv::dotenv;
        use env_logger::Env;
        use leptos::prelude::*;
        use leptos_axum::{generate_route_list, LeptosRoutes};
        use tower_http::trace::TraceLayer;
        use docchat::app::*;
        use docchat::config::ClientConfig;

        #[derive(FromRef, Clone)]
        pub struct AppState {
            pub leptos_options: LeptosOptions,
        }

        #[tokio::main]
        async fn main() -> anyhow::Result<()> {
            dotenv().ok();
            env_logger::init_from_env(Env::default().default_filter_or("info"));

            let conf = get_configuration(None).context("failed to read leptos configuration")?;
            let leptos_options = conf.leptos_options;
            let addr = leptos_options.site_addr;
            let routes = generate_route_list(App);

            let client_config = ClientConfig::from_env();
            log::info!("document API at {}", client_config.api_base_url);

            let app_state = AppState {
                leptos_options: leptos_options.clone(),
            };

            let app = Router::new()
                .leptos_routes(&app_state, routes, {
                    let leptos_options = leptos_options.clone();
                    move || shell(leptos_options.clone())
                })
                .fallback(leptos_axum::file_and_error_handler::<AppState, _>(shell))
                .layer(TraceLayer::new_for_http())
                .with_state(app_state);

            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("failed to bind {}", addr))?;
            log::info!("listening on http://{}", &addr);
            axum::serve(listener, app.into_make_service())
                .await
                .context("server error")?;
            Ok(())
        }
    } else {
        pub fn main() {
            // no client-side main function
            // see lib.rs for hydration function instead
        }
    }
}
