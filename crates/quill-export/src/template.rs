//! Template rendering seam for the exporter.

use std::path::PathBuf;

use minijinja::Environment;

/// Flat key-value context handed to a template.
pub type Context = serde_json::Map<String, serde_json::Value>;

/// Error returned when a template fails to load or render.
#[derive(Debug, thiserror::Error)]
#[error("Template {name} failed: {message}")]
pub struct TemplateError {
    /// Template name.
    pub name: String,
    /// Engine error message.
    pub message: String,
}

impl TemplateError {
    /// Create an error for template `name`.
    #[must_use]
    pub fn new(name: &str, message: impl Into<String>) -> Self {
        Self {
            name: name.to_owned(),
            message: message.into(),
        }
    }
}

/// Renders named templates against a flat context.
pub trait Templates: Send + Sync {
    /// Render template `name` with `context`.
    ///
    /// # Errors
    ///
    /// Returns `TemplateError` if the template is missing or fails to render.
    fn render(&self, name: &str, context: &Context) -> Result<String, TemplateError>;
}

/// [`Templates`] backed by minijinja, loading files from a layouts directory.
///
/// Templates are loaded lazily on first use and cached by the environment.
/// Auto-escaping is on for `.html` templates, so bodies must be emitted with
/// the `safe` filter.
pub struct MiniJinjaTemplates {
    env: Environment<'static>,
}

impl MiniJinjaTemplates {
    /// Load templates from `layouts_dir`.
    #[must_use]
    pub fn from_dir(layouts_dir: impl Into<PathBuf>) -> Self {
        let mut env = Environment::new();
        env.set_loader(minijinja::path_loader(layouts_dir.into()));
        Self { env }
    }
}

impl Templates for MiniJinjaTemplates {
    fn render(&self, name: &str, context: &Context) -> Result<String, TemplateError> {
        let template = self
            .env
            .get_template(name)
            .map_err(|e| TemplateError::new(name, e.to_string()))?;
        template
            .render(context)
            .map_err(|e| TemplateError::new(name, e.to_string()))
    }
}
