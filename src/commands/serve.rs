use std::net::SocketAddr;
use std::time::Duration;

use axum::extract::{DefaultBodyLimit, Host, Path, State};
use axum::response::{Html, Redirect};
use axum::routing::get;
use axum::Router;
use chrono::Utc;
use minijinja::context;
use tower_http::trace::TraceLayer;
use tracing::info;
use urlencoding::encode;

use crate::commands::purge_expired;
use crate::config::Config;
use crate::controllers::paste;
use crate::templates::Templates;
use crate::types::{CreatePaste, ViewPaste};
use crate::App;

pub async fn run(app: App) -> anyhow::Result<()> {
    let addr = SocketAddr::new(app.config.host, app.config.port);

    if let Some(secs) = app.config.purge_interval_secs {
        info!("purging expired pastes every {secs}s");
        tokio::spawn(purge_expired::run_periodically(
            app.clone(),
            Duration::from_secs(secs),
        ));
    }

    info!("listening on {addr}");

    axum::Server::bind(&addr)
        .serve(router(app).into_make_service())
        .await?;

    Ok(())
}

pub fn router(app: App) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/create", get(create_form).post(create_paste))
        .route("/view/*id", get(view_paste))
        .layer(DefaultBodyLimit::disable())
        .layer(TraceLayer::new_for_http())
        .with_state(app)
}

async fn home(State(templates): State<Templates>) -> crate::AppResult<Html<String>> {
    Ok(Html(templates.render("home.html", context! {})?))
}

async fn create_form(State(templates): State<Templates>) -> crate::AppResult<Html<String>> {
    Ok(Html(templates.render("create.html", context! {})?))
}

async fn create_paste(
    State(app): State<App>,
    form: CreatePaste,
) -> crate::AppResult<Redirect> {
    let id = paste::create(&app, &form.content, Utc::now()).await?;
    Ok(Redirect::to(&format!("/view/{}", encode(&id))))
}

async fn view_paste(
    State(app): State<App>,
    host: Option<Host>,
    Path(id): Path<String>,
) -> crate::AppResult<Html<String>> {
    let content = paste::fetch(&app, &id, Utc::now()).await?;
    let url = public_url(&app.config, host.as_ref().map(|Host(h)| h.as_str()), &id);
    let page = app.templates.render("view.html", ViewPaste { content, url })?;
    Ok(Html(page))
}

fn public_url(config: &Config, host: Option<&str>, id: &str) -> String {
    let id = encode(id);
    match &config.base_url {
        Some(base_url) => format!("{base_url}/view/{id}"),
        None => format!("https://{host}/view/{id}", host = host.unwrap_or("localhost")),
    }
}
