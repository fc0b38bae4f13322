use actix_web::{http::header, web, App, HttpResponse, HttpServer, Responder};
use serde::{Deserialize, Serialize};

use crate::{
    config::Config,
    error::PipelineError,
    pipelines::{PredictionPipeline, TrainPipeline},
};

static DOCS: &str = "Hate speech classifier\n\
\n\
GET  /train    run the training pipeline and promote the model if it improved\n\
POST /predict  {\"text\": \"...\"} -> {\"prediction\": \"hate and abusive\" | \"no hate\"}\n";

/// Body of a prediction request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    /// The raw text to classify
    pub text: String,
}

/// Body of a successful prediction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    /// The verdict
    pub prediction: String,
}

/// Body of a failed request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// What went wrong
    pub error: String,
}

/// HTTP front-end for training and prediction
pub struct Server;

impl Server {
    /// Bind to the configured address and serve until shut down
    pub async fn run(config: Config) -> Result<(), std::io::Error> {
        let address = (config.server.host.clone(), config.server.port);
        let config = web::Data::new(config);

        log::info!("starting HTTP server on {}:{}", address.0, address.1);

        HttpServer::new(move || App::new().app_data(config.clone()).configure(routes))
            .bind(address)?
            .run()
            .await
    }
}

/// Register every route
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/docs", web::get().to(docs))
        .route("/train", web::get().to(train))
        .route("/predict", web::post().to(predict));
}

// Route handlers
async fn index() -> impl Responder {
    HttpResponse::TemporaryRedirect()
        .insert_header((header::LOCATION, "/docs"))
        .finish()
}

async fn docs() -> impl Responder {
    HttpResponse::Ok().content_type("text/plain").body(DOCS)
}

async fn train(config: web::Data<Config>) -> impl Responder {
    let config = config.get_ref().clone();

    let result = web::block(move || TrainPipeline::new(&config).run().map(|_| ())).await;

    let message = match result {
        Ok(Ok(())) => "Training completed successfully!".to_string(),
        Ok(Err(PipelineError::ModelNotImproved)) => {
            log::warn!("training finished without promoting a model");

            format!("Error during training: {}", PipelineError::ModelNotImproved)
        }
        Ok(Err(e)) => {
            log::error!("training failed: {}", e);

            format!("Error during training: {}", e)
        }
        Err(e) => format!("Error during training: {}", e),
    };

    HttpResponse::Ok().content_type("text/plain").body(message)
}

async fn predict(config: web::Data<Config>, req: web::Json<PredictRequest>) -> impl Responder {
    let config = config.get_ref().clone();
    let text = req.into_inner().text;

    let result = web::block(move || {
        PredictionPipeline::new(&config)
            .and_then(|pipeline| pipeline.predict(&text))
            .map(|prediction| prediction.to_string())
            .map_err(|e| e.to_string())
    })
    .await;

    match result {
        Ok(Ok(prediction)) => HttpResponse::Ok().json(PredictResponse { prediction }),
        Ok(Err(error)) => {
            log::error!("prediction failed: {}", error);

            HttpResponse::InternalServerError().json(ErrorResponse { error })
        }
        Err(e) => HttpResponse::InternalServerError().json(ErrorResponse {
            error: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test};
    use pretty_assertions::assert_eq;

    use super::*;

    fn app_config(root: &std::path::Path) -> web::Data<Config> {
        let mut config = Config::new();
        config.artifacts_root = root.to_string_lossy().into_owned();
        web::Data::new(config)
    }

    #[actix_web::test]
    async fn index_redirects_to_docs() {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(
            App::new()
                .app_data(app_config(dir.path()))
                .configure(routes),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;

        assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            resp.headers().get(header::LOCATION).unwrap().to_str().unwrap(),
            "/docs"
        );

        let body = test::call_and_read_body(
            &app,
            test::TestRequest::get().uri("/docs").to_request(),
        )
        .await;
        assert!(String::from_utf8_lossy(&body).contains("/predict"));
    }

    #[actix_web::test]
    async fn predict_without_a_model_is_a_server_error() {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(
            App::new()
                .app_data(app_config(dir.path()))
                .configure(routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/predict")
            .set_json(PredictRequest {
                text: "hello".to_string(),
            })
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body: ErrorResponse = test::read_body_json(resp).await;
        assert!(body.error.contains("not found"));
    }

    #[actix_web::test]
    async fn train_reports_failures_as_text() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::new();
        config.artifacts_root = dir.path().to_string_lossy().into_owned();
        config.ingestion.archive_path = dir.path().join("absent.zip").to_string_lossy().into_owned();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(config))
                .configure(routes),
        )
        .await;

        let body = test::call_and_read_body(
            &app,
            test::TestRequest::get().uri("/train").to_request(),
        )
        .await;

        assert!(String::from_utf8_lossy(&body).starts_with("Error during training:"));
    }
}
