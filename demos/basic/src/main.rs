use axum::body::Bytes;
use axum::http::Method;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use triggerflare::{
    AdapterConfig, BufferedResponse, CallableRequest, CloudEvent, NativeRequest, RequestTemplate,
    TriggerAdapter, TriggerContext, TriggerMetadata,
};

#[tokio::main]
async fn main() -> triggerflare::Result<()> {
    tracing_subscriber::fmt::init();

    let config = AdapterConfig::from_env()?;

    let http = TriggerAdapter::new(router())
        .config(config.clone())
        .on_request();
    let mut res = BufferedResponse::new();
    let req = NativeRequest::new("GET", "/").header("host", "demo.local");
    http.call(&req, &mut res).await?;
    println!(
        "onRequest -> {} {}",
        res.status,
        String::from_utf8_lossy(res.body.as_deref().unwrap_or_default())
    );

    let callable = TriggerAdapter::new(router())
        .config(config.clone())
        .template(RequestTemplate::new().url("https://demo.local/greet"))
        .on_call();
    let reply = callable
        .call(&CallableRequest::new(json!({ "name": "ferris" })))
        .await?;
    println!("onCall -> {reply}");

    let jobs = RequestTemplate::new()
        .url("https://demo.local/jobs")
        .method(Method::POST);
    let events = TriggerAdapter::new(router())
        .config(config.clone())
        .template(jobs.clone())
        .on_event();
    events
        .call(&CloudEvent::new(
            "evt-1",
            "//demo/source",
            "demo.item.created",
            json!({ "item": 1 }),
        ))
        .await?;

    let schedule = TriggerAdapter::new(router())
        .config(config)
        .template(jobs)
        .on_schedule();
    schedule.call().await?;

    Ok(())
}

fn router() -> Router {
    Router::new()
        .route("/", get(metadata))
        .route("/greet", get(greet))
        .route("/jobs", post(job))
}

async fn metadata(context: TriggerContext) -> Json<TriggerMetadata> {
    Json(context.metadata().clone())
}

async fn greet(body: Bytes) -> Json<Value> {
    let payload: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    Json(json!({ "greeting": format!("hello, {}", payload["name"].as_str().unwrap_or("stranger")) }))
}

async fn job(context: TriggerContext, body: Bytes) -> &'static str {
    println!(
        "{} job received {} bytes",
        context.trigger(),
        body.len()
    );
    "queued"
}
