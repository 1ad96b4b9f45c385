//! Minimal reqtrail service: JSON endpoints behind correlation and access logging.
//!
//! Run with:
//!   LOG_LEVEL=debug RUST_LOG=reqtrail=info cargo run --example basic
//!
//! Try:
//!   curl -i http://localhost:3000/users/42
//!   curl -i -H 'X-Correlation-Id: abc' http://localhost:3000/users/42
//!   curl -i -X POST http://localhost:3000/users -d '{"name":"alice"}'
//!   curl -i -X DELETE http://localhost:3000/users/42
//!
//! Every request prints one access record on stdout; the server's own
//! diagnostics go to stderr through tracing.

use http::header::LOCATION;
use http::{HeaderValue, Method, StatusCode};
use reqtrail::config::Settings;
use reqtrail::middleware::{access_log, correlate};
use reqtrail::{
    CorrelationIds, Level, Logger, Params, Request, ResponseWriter, Router, Server, route_fn,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            let logger = Logger::new(Level::Info);
            logger.fatal(&format!("invalid configuration: {e}"), &[]).enforce();
            return;
        }
    };

    reqtrail::configure(settings.log_level);
    let logger = reqtrail::global();
    logger.log_app_start(&settings.app_name, &settings);

    let router = Router::new()
        .on(Method::GET, "/users/{id}", access_log(route_fn(|rw, req, params| Box::pin(get_user(rw, req, params)))))
        .on(Method::POST, "/users", access_log(route_fn(|rw, req, params| Box::pin(create_user(rw, req, params)))))
        .on(Method::DELETE, "/users/{id}", access_log(route_fn(|rw, req, params| Box::pin(delete_user(rw, req, params)))));

    let app = correlate(router);

    match Server::from_addr(settings.http_addr).serve(app).await {
        Ok(signal) => logger.log_app_stop(&settings.app_name, signal, None),
        Err(e) => logger.log_app_stop(&settings.app_name, reqtrail::Signal::Terminate, Some(&e)),
    }
}

// GET /users/{id}
async fn get_user(rw: &mut dyn ResponseWriter, req: &mut Request, params: &Params) {
    let id = params.get("id").unwrap_or("unknown");

    let ids = CorrelationIds::from_request(req);
    let _ = reqtrail::global().log_with_correlation_ids(
        Level::Debug,
        &format!("loading user {id}"),
        &ids.correlation_id,
        &ids.user_correlation_id,
    );

    rw.json(StatusCode::OK, format!(r#"{{"id":"{id}","name":"alice"}}"#).as_bytes());
}

// POST /users
//
// req.body() is &[u8]; parse with serde_json::from_slice.
async fn create_user(rw: &mut dyn ResponseWriter, req: &mut Request, _params: &Params) {
    if req.body().is_empty() {
        rw.write_header(StatusCode::BAD_REQUEST);
        return;
    }

    rw.headers_mut().insert(LOCATION, HeaderValue::from_static("/users/99"));
    rw.json(StatusCode::CREATED, br#"{"id":"99","name":"new_user"}"#);
}

// DELETE /users/{id} → 204 No Content
async fn delete_user(rw: &mut dyn ResponseWriter, _req: &mut Request, _params: &Params) {
    rw.write_header(StatusCode::NO_CONTENT);
}
