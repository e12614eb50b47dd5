use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer, Result as ActixResult};
use askschema_core::{Assistant, ChatRequest, Error};
use std::sync::Arc;
use tracing::{error, warn};

pub struct RestApi;

impl RestApi {
    pub async fn start(assistant: Arc<Assistant>, port: u16) -> std::io::Result<()> {
        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new()
                .wrap(cors)
                .configure(configure(assistant.clone()))
        })
        .bind(("0.0.0.0", port))?
        .run()
        .await
    }
}

/// Routes and shared state, usable by `App::configure` in tests.
pub fn configure(assistant: Arc<Assistant>) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(assistant))
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                let message = err.to_string();
                actix_web::error::InternalError::from_response(
                    err,
                    HttpResponse::BadRequest().json(serde_json::json!({ "error": message })),
                )
                .into()
            }))
            .route("/health", web::get().to(health))
            .route("/api/chat", web::post().to(chat))
            .route("/api/datasets", web::get().to(list_datasets))
            .route("/api/datasets/{dataset}/index", web::delete().to(evict_index));
    }
}

async fn health() -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({ "status": "ok" })))
}

async fn chat(
    assistant: web::Data<Arc<Assistant>>,
    req: web::Json<ChatRequest>,
) -> ActixResult<HttpResponse> {
    match assistant.answer(&req).await {
        Ok(response) => Ok(HttpResponse::Ok().json(response)),
        Err(e) => Ok(error_response(&req.dataset, e)),
    }
}

async fn list_datasets(assistant: web::Data<Arc<Assistant>>) -> ActixResult<HttpResponse> {
    if !assistant.has_catalog() {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({
            "error": "No dataset catalog configured"
        })));
    }

    match assistant.datasets().await {
        Ok(datasets) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "datasets": datasets
        }))),
        Err(e) => Ok(error_response("", e)),
    }
}

/// Drop the in-process index so the next chat reloads it from the cache.
async fn evict_index(
    assistant: web::Data<Arc<Assistant>>,
    path: web::Path<String>,
) -> ActixResult<HttpResponse> {
    let dataset = path.into_inner();
    let evicted = assistant.resolver().evict(&dataset);
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "dataset": dataset,
        "evicted": evicted
    })))
}

fn error_response(dataset: &str, e: Error) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e {
        Error::InvalidRequest(_) => {
            warn!(dataset, error = %e, "rejected request");
            HttpResponse::BadRequest().json(body)
        }
        e if e.is_service_unavailable() => {
            error!(dataset, error = %e, "service unavailable");
            HttpResponse::ServiceUnavailable().json(body)
        }
        e => {
            error!(dataset, error = %e, "request failed");
            HttpResponse::InternalServerError().json(body)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test};
    use askschema_core::{
        AssistantConfig, ChatModel, CompletionRequest, DatasetCatalog, Embedder, IndexResolver,
        MemoryCacheStore, Result, SchemaSource, DOCS_URL,
    };
    use async_trait::async_trait;

    struct Schema(bool);

    #[async_trait]
    impl SchemaSource for Schema {
        async fn columns(&self, dataset: &str) -> Result<Vec<String>> {
            if !self.0 {
                return Err(Error::SchemaFetch(format!("catalog down for {}", dataset)));
            }
            Ok(vec!["latency_ms".into(), "status_code".into(), "user_id".into()])
        }
    }

    struct Unit;

    #[async_trait]
    impl Embedder for Unit {
        async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(inputs.iter().map(|_| vec![1.0, 0.0]).collect())
        }
    }

    struct Model(&'static str);

    #[async_trait]
    impl ChatModel for Model {
        async fn complete(&self, _request: &CompletionRequest) -> Result<Option<String>> {
            Ok(Some(self.0.to_string()))
        }
    }

    struct Catalog;

    #[async_trait]
    impl DatasetCatalog for Catalog {
        async fn datasets(&self) -> Result<Vec<String>> {
            Ok(vec!["frontend".into()])
        }
    }

    struct Wide;

    #[async_trait]
    impl Embedder for Wide {
        async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(inputs.iter().map(|_| vec![1.0, 0.0, 0.0]).collect())
        }
    }

    fn assistant(schema_up: bool, reply: &'static str) -> Arc<Assistant> {
        assistant_with(schema_up, reply, Arc::new(Unit))
    }

    fn assistant_with(
        schema_up: bool,
        reply: &'static str,
        query_embedder: Arc<dyn Embedder>,
    ) -> Arc<Assistant> {
        let resolver = IndexResolver::new(
            Arc::new(MemoryCacheStore::new()),
            Arc::new(Schema(schema_up)),
            Arc::new(Unit),
        );
        Arc::new(
            Assistant::new(resolver, query_embedder, Arc::new(Model(reply)), AssistantConfig::default())
                .with_catalog(Arc::new(Catalog)),
        )
    }

    const VERDICT: &str = r#"{"data_to_use":{"columns":["latency_ms"],"explanation":"timing"},
        "preferred_data_if_not_exists":{"columns":[],"explanation":""}}"#;

    #[actix_web::test]
    async fn test_chat_ok() {
        let app = test::init_service(App::new().configure(configure(assistant(true, VERDICT)))).await;
        let req = test::TestRequest::post()
            .uri("/api/chat")
            .set_json(serde_json::json!({ "input": "slow pages?", "dataset": "frontend" }))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert!(body["content"].as_str().unwrap().contains("\t* latency_ms"));
        assert_eq!(body["urls"][0], DOCS_URL);
    }

    #[actix_web::test]
    async fn test_chat_degrades_on_bad_verdict() {
        let app = test::init_service(App::new().configure(configure(assistant(true, "nope")))).await;
        let req = test::TestRequest::post()
            .uri("/api/chat")
            .set_json(serde_json::json!({ "query": "slow pages?", "dataset": "frontend" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["urls"], serde_json::json!([]));
    }

    #[actix_web::test]
    async fn test_chat_schema_failure_is_503() {
        let app = test::init_service(App::new().configure(configure(assistant(false, VERDICT)))).await;
        let req = test::TestRequest::post()
            .uri("/api/chat")
            .set_json(serde_json::json!({ "input": "slow pages?", "dataset": "frontend" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[actix_web::test]
    async fn test_chat_bad_body_is_400() {
        let app = test::init_service(App::new().configure(configure(assistant(true, VERDICT)))).await;
        let req = test::TestRequest::post()
            .uri("/api/chat")
            .set_json(serde_json::json!({ "dataset": "frontend" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_datasets() {
        let app = test::init_service(App::new().configure(configure(assistant(true, VERDICT)))).await;
        let req = test::TestRequest::get().uri("/api/datasets").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["datasets"], serde_json::json!(["frontend"]));
    }

    #[actix_web::test]
    async fn test_chat_dimension_mismatch_is_503() {
        let assistant = assistant_with(true, VERDICT, Arc::new(Wide));
        let app = test::init_service(App::new().configure(configure(assistant))).await;
        let req = test::TestRequest::post()
            .uri("/api/chat")
            .set_json(serde_json::json!({ "input": "slow pages?", "dataset": "frontend" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("dimension"));
    }

    #[actix_web::test]
    async fn test_evict_index() {
        let assistant = assistant(true, VERDICT);
        let app = test::init_service(App::new().configure(configure(assistant.clone()))).await;
        let chat = test::TestRequest::post()
            .uri("/api/chat")
            .set_json(serde_json::json!({ "input": "slow pages?", "dataset": "frontend" }))
            .to_request();
        test::call_service(&app, chat).await;
        assert!(assistant.resolver().is_loaded("frontend"));

        let req = test::TestRequest::delete().uri("/api/datasets/frontend/index").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["evicted"], true);
        assert!(!assistant.resolver().is_loaded("frontend"));
    }
}
