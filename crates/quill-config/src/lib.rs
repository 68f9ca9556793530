//! Configuration management for Quill.
//!
//! Parses `quill.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `site.title`
//! - `site.description`
//! - `site.base_url`

mod expand;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the blog content directory.
    pub blog_dir: Option<PathBuf>,
    /// Override the export output directory.
    pub output_dir: Option<PathBuf>,
    /// Override the public base URL.
    pub base_url: Option<String>,
    /// Override the theme name.
    pub theme: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "quill.toml";

/// Page size used when `posts_per_page` is not configured.
pub const DEFAULT_POSTS_PER_PAGE: usize = 10;

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Site metadata exposed to templates.
    pub site: SiteConfig,
    /// Theme name (directory under `content.themes_dir`).
    pub theme: String,
    /// Records per home page.
    pub posts_per_page: usize,
    /// Content locations (relative strings from TOML).
    content: ContentConfigRaw,
    /// Search index location.
    search: SearchConfigRaw,
    /// Static export settings.
    export: ExportConfigRaw,

    /// Resolved content configuration (set after loading).
    #[serde(skip)]
    pub content_resolved: ContentConfig,
    /// Resolved search index directory (set after loading).
    #[serde(skip)]
    pub search_index_path: PathBuf,
    /// Resolved export output directory (set after loading).
    #[serde(skip)]
    pub output_dir: PathBuf,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Site metadata.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Site title.
    pub title: String,
    /// Short description used in feeds.
    pub description: String,
    /// Public base URL without trailing slash (empty for relative links).
    pub base_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Quill".to_owned(),
            description: String::new(),
            base_url: String::new(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ContentConfigRaw {
    blog_dir: Option<String>,
    pages_dir: Option<String>,
    themes_dir: Option<String>,
}

/// Resolved content locations with absolute paths.
#[derive(Clone, Debug, Default)]
pub struct ContentConfig {
    /// Root of blog documents (`<root>/<category>/<file>.md`).
    pub blog_dir: PathBuf,
    /// Root of standalone pages.
    pub pages_dir: PathBuf,
    /// Directory holding themes.
    pub themes_dir: PathBuf,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct SearchConfigRaw {
    index_path: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ExportConfigRaw {
    output_dir: Option<String>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`site.base_url`").
        field: String,
        /// Error message (e.g., "${`BLOG_URL`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `quill.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the resulting configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Directory of the active theme.
    #[must_use]
    pub fn theme_dir(&self) -> PathBuf {
        self.content_resolved.themes_dir.join(&self.theme)
    }

    /// Template directory of the active theme.
    #[must_use]
    pub fn layouts_dir(&self) -> PathBuf {
        self.theme_dir().join("layouts")
    }

    /// Static asset directory of the active theme.
    #[must_use]
    pub fn static_dir(&self) -> PathBuf {
        self.theme_dir().join("static")
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(blog_dir) = &settings.blog_dir {
            self.content_resolved.blog_dir.clone_from(blog_dir);
        }
        if let Some(output_dir) = &settings.output_dir {
            self.output_dir.clone_from(output_dir);
        }
        if let Some(base_url) = &settings.base_url {
            self.site.base_url = base_url.trim_end_matches('/').to_owned();
        }
        if let Some(theme) = &settings.theme {
            self.theme.clone_from(theme);
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            site: SiteConfig::default(),
            theme: "default".to_owned(),
            posts_per_page: DEFAULT_POSTS_PER_PAGE,
            content: ContentConfigRaw::default(),
            search: SearchConfigRaw::default(),
            export: ExportConfigRaw::default(),
            content_resolved: ContentConfig {
                blog_dir: base.join("content/blog"),
                pages_dir: base.join("content/page"),
                themes_dir: base.join("themes"),
            },
            search_index_path: base.join("data/search"),
            output_dir: base.join("public"),
            config_path: None,
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before validation
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file and after CLI overrides.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.theme, "theme")?;
        if self.posts_per_page == 0 {
            return Err(ConfigError::Validation(
                "posts_per_page must be greater than 0".to_owned(),
            ));
        }
        // Empty base_url is allowed and produces root-relative links
        if !self.site.base_url.is_empty() {
            require_http_url(&self.site.base_url, "site.base_url")?;
        }
        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.site.title = expand::expand_env(&self.site.title, "site.title")?;
        self.site.description = expand::expand_env(&self.site.description, "site.description")?;
        let base_url = expand::expand_env(&self.site.base_url, "site.base_url")?;
        self.site.base_url = base_url.trim_end_matches('/').to_owned();
        Ok(())
    }

    /// Resolve relative paths against the config file directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));

        self.content_resolved = ContentConfig {
            blog_dir: resolve(self.content.blog_dir.as_deref(), "content/blog"),
            pages_dir: resolve(self.content.pages_dir.as_deref(), "content/page"),
            themes_dir: resolve(self.content.themes_dir.as_deref(), "themes"),
        };
        self.search_index_path = resolve(self.search.index_path.as_deref(), "data/search");
        self.output_dir = resolve(self.export.output_dir.as_deref(), "public");
    }
}
