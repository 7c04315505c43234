//! Test utilities shared by repository and HTTP tests.

use crate::config::{Config, PoolSettings};
use crate::db::models::informatieobjecten::InformatieObjectCreateDBRequest;
use crate::types::Vertrouwelijkheidaanduiding;
use axum_test::TestServer;
use chrono::NaiveDate;
use serde_json::{Value, json};
use sqlx::PgPool;
use std::path::Path;
use tempfile::TempDir;
use uuid::Uuid;

pub const DOCUMENTS_PATH: &str = "/api/v1/enkelvoudiginformatieobjecten";
pub const LINKS_PATH: &str = "/api/v1/zaakinformatieobjecten";

/// Application on a fresh storage directory. Keep the returned directory alive for the
/// duration of the test.
pub async fn create_test_app(pool: PgPool) -> (TestServer, TempDir) {
    create_test_app_with_config(pool, create_test_config()).await
}

pub async fn create_test_app_with_config(pool: PgPool, mut config: Config) -> (TestServer, TempDir) {
    let storage = TempDir::new().expect("Failed to create storage directory");
    config.storage.path = storage.path().to_path_buf();

    let app = crate::Application::new_with_pool(config, Some(pool))
        .await
        .expect("Failed to create application");

    (app.into_test_server(), storage)
}

pub fn create_test_config() -> Config {
    let mut config = Config::default();
    config.host = "127.0.0.1".to_string();
    config.port = 0;
    config.database.pool = PoolSettings {
        max_connections: 2,
        min_connections: 0,
        ..Default::default()
    };
    config
}

/// A valid document creation body: "hello world" as content
pub fn document_payload() -> Value {
    json!({
        "identificatie": "DOC-2018-0001",
        "bronorganisatie": "517439943",
        "creatiedatum": "2018-06-27",
        "titel": "Aanvraagformulier",
        "vertrouwelijkaanduiding": "openbaar",
        "auteur": "Afdeling Vergunningen",
        "taal": "dut",
        "inhoud": "aGVsbG8gd29ybGQ=",
        "informatieobjecttype": "https://ztc.example.com/api/v1/catalogussen/1/informatieobjecttypen/1"
    })
}

/// Database request for a document whose content key is unique
pub fn document_request() -> InformatieObjectCreateDBRequest {
    let id = Uuid::new_v4();
    InformatieObjectCreateDBRequest {
        id,
        identificatie: format!("DOC-{}", &id.simple().to_string()[..8]),
        bronorganisatie: "517439943".to_string(),
        creatiedatum: NaiveDate::from_ymd_opt(2018, 6, 27).expect("valid date"),
        titel: "Aanvraagformulier".to_string(),
        vertrouwelijkaanduiding: Some(Vertrouwelijkheidaanduiding::Openbaar),
        auteur: "Afdeling Vergunningen".to_string(),
        beschrijving: String::new(),
        informatieobjecttype: "https://ztc.example.com/api/v1/catalogussen/1/informatieobjecttypen/1".to_string(),
        formaat: String::new(),
        taal: "dut".to_string(),
        inhoud: format!("uploads/2018/06/{id}.bin"),
        link: String::new(),
    }
}

/// Path and query of a hyperlink, for requests against the test server
pub fn path_of(hyperlink: &str) -> String {
    let url = url::Url::parse(hyperlink).expect("hyperlink should be absolute");
    match url.query() {
        Some(query) => format!("{}?{query}", url.path()),
        None => url.path().to_string(),
    }
}

/// Number of regular files below `root`
pub fn count_files(root: &Path) -> usize {
    let Ok(entries) = std::fs::read_dir(root) else {
        return 0;
    };
    entries
        .filter_map(|entry| entry.ok())
        .map(|entry| {
            let path = entry.path();
            if path.is_dir() { count_files(&path) } else { 1 }
        })
        .sum()
}
