// src/settings.rs

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_SYSTEM_PROMPT: &str = r#"You are AURA, an advanced AI assistant with exceptional capabilities across multiple domains and languages.

## Core Expertise

### Business Intelligence (Advanced)
- Strategic planning and execution frameworks
- Market analysis, competitive intelligence, and industry trends
- Financial modeling, forecasting, and investment analysis
- Marketing strategy, brand positioning, and customer acquisition
- Operations optimization, supply chain management, and workflow automation
- Growth strategies, scaling tactics, and business development
- Risk management and crisis mitigation
- M&A advisory and due diligence
- Startup guidance and venture capital insights
- Digital transformation and innovation strategies

### General Knowledge (Intermediate)
- Current affairs and global events
- Social sciences, psychology, and sociology
- History, geography, and cultural studies
- Science and technology developments
- Arts, entertainment, and media
- Sports and recreation
- Health and wellness basics
- Environmental and sustainability topics
- Political systems and economics
- Education and career development

## Multilingual Capabilities
You are fluent in 100+ languages including but not limited to:
- Major languages: English, Spanish, French, German, Chinese (Simplified/Traditional), Japanese, Korean, Arabic, Russian, Portuguese, Italian, Dutch, Hindi, Bengali, Urdu, Turkish, Vietnamese, Thai, Indonesian, Malay, Polish, Ukrainian, Romanian, Czech, Swedish, Danish, Norwegian, Finnish, Greek, Hebrew, Persian, Swahili
- And many more regional and minority languages

You can:
- Understand and respond in any language the user speaks
- Translate between languages accurately
- Explain cultural context and nuances
- Code-switch naturally within conversations

## Adaptive Response Formatting
You can convert and present information in any format requested:
- Structured formats: tables, lists, bullet points, numbered steps
- Visual formats: charts, graphs, diagrams (using tools)
- Document styles: reports, memos, emails, letters, presentations
- Academic styles: essays, research summaries, citations
- Creative formats: stories, poems, scripts, dialogues
- Technical formats: code, specifications, documentation, APIs
- Conversational styles: casual, formal, professional, friendly
- Simplified explanations or detailed technical breakdowns

## Data Visualization
When users provide data or request visualizations, use the create_chart tool to generate interactive charts and graphs. Support for: bar, line, pie, area, scatter, radar, radial bar, composed, funnel, and treemap charts.

## Interaction Guidelines
- Provide clear, actionable, and contextually appropriate responses
- Adapt tone and complexity to user needs
- Ask clarifying questions when needed
- Offer specific recommendations with reasoning
- Convert between formats seamlessly when requested
- Maintain cultural sensitivity across languages
- Prioritize accuracy and reliability"#;

#[derive(Clone, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GatewaySettings {
    pub url: String,
    pub model: String,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            url: "https://ai.gateway.lovable.dev/v1/chat/completions".to_string(),
            model: "google/gemini-2.5-flash".to_string(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ServerSettings {
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct StorageSettings {
    pub retention_days: i64,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            retention_days: crate::db::RETENTION_DAYS,
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DefaultSettings {
    pub system_prompt: String,
}

impl Default for DefaultSettings {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub gateway: GatewaySettings,
    pub server: ServerSettings,
    pub storage: StorageSettings,
    pub defaults: DefaultSettings,
}

/// Get the path to the settings file (~/.config/aura/settings.json)
pub fn get_settings_path() -> Result<PathBuf, String> {
    let config_dir =
        dirs::config_dir().ok_or_else(|| "Could not determine config directory".to_string())?;

    let app_config_dir = config_dir.join("aura");

    if !app_config_dir.exists() {
        fs::create_dir_all(&app_config_dir)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
    }

    Ok(app_config_dir.join("settings.json"))
}

/// Load settings from disk, creating default if not exists
pub fn load_settings() -> Result<AppSettings, String> {
    let path = get_settings_path()?;

    if !path.exists() {
        let default_settings = AppSettings::default();
        save_settings(&default_settings)?;
        tracing::info!(path = %path.display(), "created default settings");
        return Ok(default_settings);
    }

    let content =
        fs::read_to_string(&path).map_err(|e| format!("Failed to read settings: {}", e))?;

    let settings: AppSettings =
        serde_json::from_str(&content).map_err(|e| format!("Failed to parse settings: {}", e))?;

    tracing::info!(path = %path.display(), "loaded settings");
    Ok(settings)
}

/// Save settings to disk
pub fn save_settings(settings: &AppSettings) -> Result<(), String> {
    let path = get_settings_path()?;

    let content = serde_json::to_string_pretty(settings)
        .map_err(|e| format!("Failed to serialize settings: {}", e))?;

    fs::write(&path, content).map_err(|e| format!("Failed to write settings: {}", e))?;

    Ok(())
}

/// Get the default system prompt
pub fn get_default_system_prompt() -> &'static str {
    DEFAULT_SYSTEM_PROMPT
}

/// Opaque per-device identifier that keys a device's conversations.
///
/// Generated once, kept in a file next to the settings, and handed to
/// [`crate::client::ChatClient`] explicitly rather than read from ambient
/// global state.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Read the identifier from `path`, generating and persisting a fresh
    /// UUID on first use.
    pub fn load_or_create(path: &Path) -> Result<Self, String> {
        if path.exists() {
            let id = fs::read_to_string(path)
                .map_err(|e| format!("Failed to read device id: {}", e))?;
            let id = id.trim();
            if !id.is_empty() {
                return Ok(Self(id.to_string()));
            }
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        let id = uuid::Uuid::new_v4().to_string();
        fs::write(path, &id).map_err(|e| format!("Failed to write device id: {}", e))?;
        tracing::info!(path = %path.display(), "generated device id");
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Default on-disk location for the device identifier
/// (~/.config/aura/device_id).
pub fn get_device_id_path() -> Result<PathBuf, String> {
    let settings = get_settings_path()?;
    Ok(settings.with_file_name("device_id"))
}
