use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryFormRepository};
use crate::routes::with_intake_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use eb1a_intake::config::AppConfig;
use eb1a_intake::error::AppError;
use eb1a_intake::intake::{IntakeService, LocalDirectoryStore};
use eb1a_intake::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    apply_overrides(&mut config, args);
    let public_url = config.uploads.public_url(&config.server);

    telemetry::init(&config.telemetry)?;

    tokio::fs::create_dir_all(&config.uploads.directory).await?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        upload_root: Arc::new(config.uploads.directory.clone()),
    };

    let repository = Arc::new(InMemoryFormRepository::default());
    let store = Arc::new(LocalDirectoryStore::new(
        config.uploads.directory.clone(),
        public_url.clone(),
    ));
    let intake_service = Arc::new(IntakeService::new(
        repository,
        store,
        config.uploads.policy(),
    ));

    let app = with_intake_routes(intake_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        uploads = %config.uploads.directory.display(),
        %public_url,
        max_upload_mb = config.uploads.max_megabytes,
        "eb1a intake service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

fn apply_overrides(config: &mut AppConfig, args: ServeArgs) {
    let ServeArgs {
        host,
        port,
        upload_dir,
    } = args;

    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    if let Some(directory) = upload_dir {
        config.uploads.directory = directory;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eb1a_intake::config::{AppEnvironment, ServerConfig, TelemetryConfig, UploadConfig};
    use std::path::PathBuf;

    fn config(public_base_url: Option<&str>) -> AppConfig {
        AppConfig {
            environment: AppEnvironment::Test,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
            telemetry: TelemetryConfig {
                log_level: "info".to_string(),
            },
            uploads: UploadConfig {
                max_megabytes: 10,
                directory: PathBuf::from("uploads"),
                public_base_url: public_base_url.map(str::to_string),
            },
        }
    }

    #[test]
    fn overridden_port_is_reflected_in_upload_urls() {
        let mut config = config(None);
        apply_overrides(
            &mut config,
            ServeArgs {
                host: None,
                port: Some(8080),
                upload_dir: Some(PathBuf::from("/srv/evidence")),
            },
        );

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.uploads.directory, PathBuf::from("/srv/evidence"));
        assert_eq!(
            config.uploads.public_url(&config.server),
            "http://127.0.0.1:8080/files"
        );
    }

    #[test]
    fn explicit_public_base_url_survives_overrides() {
        let mut config = config(Some("https://cdn.example.org/eb1a"));
        apply_overrides(
            &mut config,
            ServeArgs {
                host: Some("0.0.0.0".to_string()),
                port: Some(9090),
                upload_dir: None,
            },
        );

        assert_eq!(
            config.uploads.public_url(&config.server),
            "https://cdn.example.org/eb1a"
        );
    }
}
