// src/state.rs

use std::path::PathBuf;

use crate::settings::AppSettings;

/// Shared state behind the HTTP surface. Database connections are opened per
/// operation (see `db::open_db`), so nothing here needs interior mutability.
pub struct AppState {
    pub http: reqwest::Client,
    pub settings: AppSettings,
    pub api_key: Option<String>,
    pub db_path: PathBuf,
}

impl AppState {
    pub fn new(settings: AppSettings, api_key: Option<String>, db_path: PathBuf) -> Self {
        Self {
            http: reqwest::Client::new(),
            settings,
            api_key,
            db_path,
        }
    }
}
