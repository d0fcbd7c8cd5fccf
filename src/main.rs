#[macro_use]
extern crate rocket;

use log::info;
use rocket::fairing::AdHoc;
use std::env;
use std::sync::Arc;

use cyber_worm::config::Config;
use cyber_worm::event_log::EventLogger;
use cyber_worm::host::GameHost;
use cyber_worm::score_sink::{JsonlScoreSink, ScoreSink};

mod handler;

#[launch]
async fn rocket() -> _ {
    // Lots of web hosting services expect you to bind to the port specified by the `PORT`
    // environment variable. However, Rocket looks at the `ROCKET_PORT` environment variable.
    // If we find a value for `PORT`, we set `ROCKET_PORT` to that value.
    if let Ok(port) = env::var("PORT") {
        env::set_var("ROCKET_PORT", &port);
    }

    // We default to 'info' level logging. But if the `RUST_LOG` environment variable is set,
    // we keep that value instead.
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }

    env_logger::init();

    info!("Starting Cyber Worm host...");

    // Load configuration once at startup
    let config = Config::load_or_default();

    let sink: Option<Arc<dyn ScoreSink>> = if config.scores.enabled {
        Some(Arc::new(
            JsonlScoreSink::new(true, &config.scores.log_file_path).await,
        ))
    } else {
        None
    };
    let logger = EventLogger::new(config.debug.enabled, &config.debug.log_file_path).await;

    let (host, _loop_handle) = GameHost::spawn(&config, sink, logger);

    rocket::build()
        .manage(host)
        .attach(AdHoc::on_response("Server ID Middleware", |_, res| {
            Box::pin(async move {
                res.set_raw_header("Server", "cyber-worm");
            })
        }))
        .mount(
            "/",
            routes![
                handler::index,
                handler::state,
                handler::input,
                handler::pause,
                handler::resume
            ],
        )
}
