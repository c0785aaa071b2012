//! Configuration management for the call-center assistant.
//!
//! Configuration is layered, later layers winning:
//! - Built-in defaults
//! - The YAML config file (`.assist/config.yaml` or `ASSIST_CONFIG`)
//! - Environment variables
//! - Command-line flags
//!
//! The config file only needs the sections it changes; every field has a default.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Models the completion service is known to serve for this deployment.
pub const SUPPORTED_MODELS: &[&str] = &[
    "claude-3-5-sonnet",
    "llama3-70b",
    "mistral-large2",
    "llama3.1-70b",
];

/// Completion modes: REST inference endpoint or SQL function.
pub const COMPLETE_MODES: &[&str] = &["api", "sql"];

/// Intent labels accepted for `chat.defaultIntent`.
pub const INTENTS: &[&str] = &["recordings", "faq", "data"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .assist/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Data platform connection settings
    pub platform: PlatformConfig,

    /// Completion settings
    pub completion: CompletionConfig,

    /// Semantic search services
    pub search: SearchConfig,

    /// Chat pipeline switches
    pub chat: ChatConfig,

    /// Follow-up email settings
    pub email: EmailConfig,

    /// Bearer token resolved from `ASSIST_TOKEN` or `platform.tokenEnv`
    #[serde(skip)]
    pub token: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Log output format ("text" or "json")
    pub log_format: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Connection settings for the hosted data platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// Account URL, e.g. `https://xy12345.snowflakecomputing.com`
    #[serde(rename = "accountUrl")]
    pub account_url: Option<String>,

    /// Environment variable holding the bearer token
    #[serde(rename = "tokenEnv")]
    pub token_env: String,

    /// Value sent as `X-Snowflake-Authorization-Token-Type`
    #[serde(rename = "tokenType")]
    pub token_type: String,

    pub database: String,
    pub schema: String,
    pub warehouse: Option<String>,
    pub role: Option<String>,

    /// Stage holding FAQ documents, call recordings and the semantic model
    pub stage: String,

    /// Semantic model path relative to the stage
    #[serde(rename = "semanticModelFile")]
    pub semantic_model_file: String,

    /// Denormalized member table used for caller lookup
    #[serde(rename = "memberTable")]
    pub member_table: String,

    /// Request timeout in seconds
    #[serde(rename = "timeoutSeconds")]
    pub timeout_seconds: u64,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            account_url: None,
            token_env: "SNOWFLAKE_TOKEN".to_string(),
            token_type: "PROGRAMMATIC_ACCESS_TOKEN".to_string(),
            database: "CALL_CENTER".to_string(),
            schema: "PUBLIC".to_string(),
            warehouse: None,
            role: None,
            stage: "RAW_DATA_TX".to_string(),
            semantic_model_file: "DATA_PRODUCT/Call_Center_Member_Denormalized.yaml".to_string(),
            member_table: "CALL_CENTER_MEMBER_DENORMALIZED_WITH_INTENT".to_string(),
            timeout_seconds: 30,
        }
    }
}

/// Completion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    pub model: String,

    /// "api" or "sql"
    pub mode: String,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            model: "claude-3-5-sonnet".to_string(),
            mode: "api".to_string(),
        }
    }
}

/// One semantic search service and how its hits map to stage files.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchServiceConfig {
    /// Search service name
    pub service: String,

    /// Number of chunks to retrieve
    pub limit: u32,

    /// Stage directory matched with `LIKE '%<filter>%'`
    #[serde(rename = "pathFilter")]
    pub path_filter: String,

    /// Lifetime of presigned URLs
    #[serde(rename = "urlExpirySeconds")]
    pub url_expiry_seconds: u32,
}

/// Semantic search services.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub transcripts: SearchServiceConfig,
    pub faq: SearchServiceConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            transcripts: SearchServiceConfig {
                service: "CALL_CENTER_RECORDING_SEARCH_TX".to_string(),
                limit: 10,
                path_filter: "CALL_RECORDINGS".to_string(),
                url_expiry_seconds: 360,
            },
            faq: SearchServiceConfig {
                service: "CALL_CENTER_FAQ_SEARCH".to_string(),
                limit: 1,
                path_filter: "FAQ".to_string(),
                url_expiry_seconds: 3600,
            },
        }
    }
}

/// Chat pipeline switches.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Number of trailing messages used as chat history
    #[serde(rename = "slideWindow")]
    pub slide_window: usize,

    #[serde(rename = "useChatHistory")]
    pub use_chat_history: bool,

    /// Rewrite follow-up questions into standalone queries
    #[serde(rename = "summarizeWithChatHistory")]
    pub summarize_with_chat_history: bool,

    /// Retrieve context from the search services
    #[serde(rename = "cortexSearch")]
    pub cortex_search: bool,

    /// Run the intent classification prompt
    #[serde(rename = "classifyIntent")]
    pub classify_intent: bool,

    /// Intent used when classification is off
    #[serde(rename = "defaultIntent")]
    pub default_intent: String,

    /// Check restricted sessions for questions about other members
    #[serde(rename = "checkViolation")]
    pub check_violation: bool,

    /// Show intermediate results (refined query, classification)
    pub debug: bool,

    /// Show rendered prompts
    #[serde(rename = "showPrompt")]
    pub show_prompt: bool,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            slide_window: 3,
            use_chat_history: true,
            summarize_with_chat_history: true,
            cortex_search: true,
            classify_intent: false,
            default_intent: "recordings".to_string(),
            check_violation: false,
            debug: false,
            show_prompt: false,
        }
    }
}

/// Follow-up email settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    /// Notification integration used by SYSTEM$SEND_EMAIL
    pub integration: String,

    /// Default recipient
    pub recipient: Option<String>,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            integration: "payers_cc_email_int".to_string(),
            recipient: None,
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    platform: Option<PlatformConfig>,
    completion: Option<CompletionConfig>,
    search: Option<SearchConfig>,
    chat: Option<ChatConfig>,
    email: Option<EmailConfig>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    format: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            platform: PlatformConfig::default(),
            completion: CompletionConfig::default(),
            search: SearchConfig::default(),
            chat: ChatConfig::default(),
            email: EmailConfig::default(),
            token: None,
            log_level: None,
            log_format: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the YAML file and environment variables.
    ///
    /// Environment variables:
    /// - `ASSIST_WORKSPACE`: Override workspace path
    /// - `ASSIST_CONFIG`: Path to config file
    /// - `ASSIST_ACCOUNT_URL`: Platform account URL
    /// - `ASSIST_TOKEN`: Bearer token (otherwise read from `platform.tokenEnv`)
    /// - `ASSIST_MODEL`: Completion model
    /// - `ASSIST_COMPLETE_MODE`: "api" or "sql"
    /// - `ASSIST_EMAIL`: Follow-up email recipient
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        Self::load_from(None, None)
    }

    /// Like [`AppConfig::load`], with an explicit workspace and config file
    /// taking precedence over `ASSIST_WORKSPACE` and `ASSIST_CONFIG`.
    pub fn load_from(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        let workspace =
            workspace.or_else(|| std::env::var("ASSIST_WORKSPACE").ok().map(PathBuf::from));
        if let Some(workspace) = workspace {
            config.workspace = workspace;
        }

        config.config_file =
            config_file.or_else(|| std::env::var("ASSIST_CONFIG").ok().map(PathBuf::from));

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| config.assist_dir().join("config.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        } else if config.config_file.is_some() {
            return Err(AppError::Config(format!(
                "Config file not found: {:?}",
                config_path
            )));
        }

        config.apply_env();

        Ok(config)
    }

    /// Apply environment variable overrides on top of file settings.
    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("ASSIST_ACCOUNT_URL") {
            self.platform.account_url = Some(url);
        }

        if let Ok(model) = std::env::var("ASSIST_MODEL") {
            self.completion.model = model;
        }

        if let Ok(mode) = std::env::var("ASSIST_COMPLETE_MODE") {
            self.completion.mode = mode.to_lowercase();
        }

        if let Ok(email) = std::env::var("ASSIST_EMAIL") {
            self.email.recipient = Some(email);
        }

        self.token = std::env::var("ASSIST_TOKEN")
            .ok()
            .or_else(|| std::env::var(&self.platform.token_env).ok())
            .filter(|t| !t.trim().is_empty());

        if let Ok(level) = std::env::var("RUST_LOG") {
            self.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            self.no_color = true;
        }
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        tracing::debug!("Merged config file {:?}", path);

        Ok(self.merge_file(file))
    }

    fn merge_file(&self, file: ConfigFile) -> Self {
        let mut result = self.clone();

        if let Some(platform) = file.platform {
            result.platform = platform;
        }
        if let Some(completion) = file.completion {
            result.completion = completion;
        }
        if let Some(search) = file.search {
            result.search = search;
        }
        if let Some(chat) = file.chat {
            result.chat = chat;
        }
        if let Some(email) = file.email {
            result.email = email;
        }

        if let Some(logging) = file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(format) = logging.format {
                result.log_format = Some(format);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        result
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over environment variables and
    /// the config file.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        model: Option<String>,
        mode: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(model) = model {
            self.completion.model = model;
        }

        if let Some(mode) = mode {
            self.completion.mode = mode.to_lowercase();
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .assist directory.
    pub fn assist_dir(&self) -> PathBuf {
        self.workspace.join(".assist")
    }

    /// Fully qualified stage reference, e.g. `@DB.SCHEMA.STAGE`.
    pub fn stage_ref(&self) -> String {
        format!(
            "@{}.{}.{}",
            self.platform.database, self.platform.schema, self.platform.stage
        )
    }

    /// Validate settings that do not need the network.
    pub fn validate(&self) -> AppResult<()> {
        if !SUPPORTED_MODELS.contains(&self.completion.model.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown model: {}. Supported: {}",
                self.completion.model,
                SUPPORTED_MODELS.join(", ")
            )));
        }

        if !COMPLETE_MODES.contains(&self.completion.mode.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown completion mode: {}. Supported: {}",
                self.completion.mode,
                COMPLETE_MODES.join(", ")
            )));
        }

        // These names are interpolated into SQL text.
        for (label, value) in [
            ("platform.database", &self.platform.database),
            ("platform.schema", &self.platform.schema),
            ("platform.stage", &self.platform.stage),
            ("platform.memberTable", &self.platform.member_table),
        ] {
            if !is_plain_identifier(value) {
                return Err(AppError::Config(format!(
                    "{} must be a plain identifier, got {:?}",
                    label, value
                )));
            }
        }

        for search in [&self.search.transcripts, &self.search.faq] {
            if !is_plain_identifier(&search.path_filter) {
                return Err(AppError::Config(format!(
                    "search pathFilter must be a plain identifier, got {:?}",
                    search.path_filter
                )));
            }
            if search.limit == 0 {
                return Err(AppError::Config(format!(
                    "search limit for {} must be at least 1",
                    search.service
                )));
            }
        }

        if !is_plain_identifier(&self.email.integration) {
            return Err(AppError::Config(format!(
                "email.integration must be a plain identifier, got {:?}",
                self.email.integration
            )));
        }

        if !INTENTS.contains(&self.chat.default_intent.to_lowercase().as_str()) {
            return Err(AppError::Config(format!(
                "Unknown default intent: {}. Supported: {}",
                self.chat.default_intent,
                INTENTS.join(", ")
            )));
        }

        if self.chat.slide_window == 0 && self.chat.use_chat_history {
            return Err(AppError::Config(
                "chat.slideWindow must be at least 1 when chat history is enabled".to_string(),
            ));
        }

        Ok(())
    }

    /// Validate that everything needed for remote calls is present.
    pub fn validate_remote(&self) -> AppResult<()> {
        self.validate()?;

        match self.platform.account_url.as_deref() {
            Some(url) if url.starts_with("http://") || url.starts_with("https://") => {}
            Some(url) => {
                return Err(AppError::Config(format!(
                    "platform.accountUrl must start with http:// or https://, got {}",
                    url
                )))
            }
            None => {
                return Err(AppError::Config(
                    "platform.accountUrl is not set (config file or ASSIST_ACCOUNT_URL)"
                        .to_string(),
                ))
            }
        }

        if self.token.is_none() {
            return Err(AppError::Config(format!(
                "No access token found in ASSIST_TOKEN or {}",
                self.platform.token_env
            )));
        }

        Ok(())
    }
}

/// True for names made only of ASCII letters, digits and underscores.
pub fn is_plain_identifier(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.completion.model, "claude-3-5-sonnet");
        assert_eq!(config.completion.mode, "api");
        assert_eq!(config.chat.slide_window, 3);
        assert_eq!(config.search.transcripts.limit, 10);
        assert_eq!(config.search.faq.limit, 1);
        assert!(!config.chat.classify_intent);
        assert!(!config.verbose);
    }

    #[test]
    fn test_assist_dir() {
        let config = AppConfig::default();
        assert!(config.assist_dir().ends_with(".assist"));
    }

    #[test]
    fn test_stage_ref() {
        let mut config = AppConfig::default();
        config.platform.database = "CC".to_string();
        config.platform.schema = "DATA".to_string();
        assert_eq!(config.stage_ref(), "@CC.DATA.RAW_DATA_TX");
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default();
        let overridden = config.with_overrides(
            None,
            Some("llama3-70b".to_string()),
            Some("SQL".to_string()),
            None,
            true,
            false,
        );

        assert_eq!(overridden.completion.model, "llama3-70b");
        assert_eq!(overridden.completion.mode, "sql");
        assert!(overridden.verbose);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_merge_partial_yaml_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            r#"
platform:
  accountUrl: https://acme.snowflakecomputing.com
  database: CC_DB
  schema: CC_SCHEMA
chat:
  slideWindow: 5
  classifyIntent: true
logging:
  level: info
  color: false
"#,
        )
        .unwrap();

        let merged = AppConfig::default().merge_yaml(&path).unwrap();
        assert_eq!(
            merged.platform.account_url.as_deref(),
            Some("https://acme.snowflakecomputing.com")
        );
        assert_eq!(merged.platform.database, "CC_DB");
        assert_eq!(merged.platform.stage, "RAW_DATA_TX");
        assert_eq!(merged.platform.token_env, "SNOWFLAKE_TOKEN");
        assert_eq!(merged.chat.slide_window, 5);
        assert!(merged.chat.classify_intent);
        assert!(merged.chat.use_chat_history);
        assert_eq!(merged.completion.model, "claude-3-5-sonnet");
        assert_eq!(merged.log_level.as_deref(), Some("info"));
        assert!(merged.no_color);
    }

    #[test]
    fn test_load_from_explicit_workspace_reads_assist_config() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".assist")).unwrap();
        std::fs::write(
            dir.path().join(".assist/config.yaml"),
            "email:\n  integration: cc_mail\n",
        )
        .unwrap();

        let config = AppConfig::load_from(Some(dir.path().to_path_buf()), None).unwrap();
        assert_eq!(config.workspace, dir.path());
        assert_eq!(config.email.integration, "cc_mail");
    }

    #[test]
    fn test_load_from_missing_config_file() {
        let dir = TempDir::new().unwrap();
        let result = AppConfig::load_from(
            Some(dir.path().to_path_buf()),
            Some(dir.path().join("nope.yaml")),
        );
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_merge_invalid_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "chat: [not, a, map").unwrap();
        assert!(AppConfig::default().merge_yaml(&path).is_err());
    }

    #[test]
    fn test_validate_unknown_model() {
        let mut config = AppConfig::default();
        config.completion.model = "gpt-unknown".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_unknown_mode() {
        let mut config = AppConfig::default();
        config.completion.mode = "grpc".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_sql_in_identifiers() {
        let mut config = AppConfig::default();
        config.platform.stage = "RAW; DROP TABLE X".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_default_intent() {
        let mut config = AppConfig::default();
        config.chat.default_intent = "FAQ".to_string();
        assert!(config.validate().is_ok());

        config.chat.default_intent = "billing".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_remote_requires_account_and_token() {
        let mut config = AppConfig::default();
        assert!(config.validate_remote().is_err());

        config.platform.account_url = Some("https://acme.snowflakecomputing.com".to_string());
        assert!(config.validate_remote().is_err());

        config.token = Some("secret".to_string());
        assert!(config.validate_remote().is_ok());
    }

    #[test]
    fn test_is_plain_identifier() {
        assert!(is_plain_identifier("CALL_RECORDINGS"));
        assert!(!is_plain_identifier(""));
        assert!(!is_plain_identifier("a'b"));
        assert!(!is_plain_identifier("a.b"));
    }
}
