// HTTP handler bindings for the game host
//
// Thin wrappers that translate requests into host events and serve snapshots.
// Handlers never mutate game state themselves.

use rocket::http::Status;
use rocket::serde::json::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use cyber_worm::controller::Snapshot;
use cyber_worm::host::GameHost;
use cyber_worm::types::{HostEvent, InputEvent};

/// Body of POST /input
#[derive(Deserialize, Debug)]
pub struct KeyPress {
    pub key: String,
}

/// GET / endpoint
/// Returns host metadata
#[get("/")]
pub fn index(host: &rocket::State<GameHost>) -> Json<Value> {
    let snapshot = host.snapshot();
    Json(json!({
        "apiversion": "1",
        "game": "cyber-worm",
        "session": snapshot.session_id,
        "controls": {
            "turn": ["up", "down", "left", "right", "w", "a", "s", "d"],
            "toggle_mode": "space",
            "confirm": "r",
        },
    }))
}

/// GET /state endpoint
/// Current chain, items, scores and phase
#[get("/state")]
pub fn state(host: &rocket::State<GameHost>) -> Json<Snapshot> {
    Json(host.snapshot())
}

/// POST /input endpoint
/// One key press; unknown keys are rejected
#[post("/input", format = "json", data = "<press>")]
pub fn input(host: &rocket::State<GameHost>, press: Json<KeyPress>) -> Status {
    let event = match InputEvent::from_key(&press.key) {
        Ok(event) => event,
        Err(e) => {
            log::warn!("{}", e);
            return Status::BadRequest;
        }
    };
    forward(host, HostEvent::Input { input: event })
}

/// POST /pause endpoint
/// Called by the question overlay when it takes over
#[post("/pause")]
pub fn pause(host: &rocket::State<GameHost>) -> Status {
    forward(host, HostEvent::Pause)
}

/// POST /resume endpoint
/// Called by the question overlay once answered
#[post("/resume")]
pub fn resume(host: &rocket::State<GameHost>) -> Status {
    forward(host, HostEvent::Resume)
}

fn forward(host: &GameHost, event: HostEvent) -> Status {
    match host.send(event) {
        Ok(()) => Status::Accepted,
        Err(e) => {
            log::error!("{}", e);
            Status::ServiceUnavailable
        }
    }
}
