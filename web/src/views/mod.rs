//! View rendering.
//!
//! Handlers describe a page as a [`View`]: a [`Template`] plus a
//! [`PageContext`]. A [`ViewRenderer`] turns it into HTML.

pub mod html;

pub use html::HtmlRenderer;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Every page the site can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Template {
    /// Home page.
    Index,
    /// Registration form.
    Register,
    /// Login form.
    Login,
    /// User listing.
    Users,
    /// One user.
    User,
    /// User edit form.
    UpdateUser,
    /// Email form.
    SendEmail,
    /// File upload form.
    UploadFile,
    /// File listing.
    Files,
    /// One file.
    File,
    /// Image upload form.
    UploadImage,
    /// Image listing.
    Images,
    /// One image.
    Image,
    /// Mailing list listing.
    MailingLists,
    /// One mailing list.
    MailingList,
}

impl Template {
    /// Template name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::Register => "register",
            Self::Login => "login",
            Self::Users => "users",
            Self::User => "user",
            Self::UpdateUser => "update-user",
            Self::SendEmail => "send-email",
            Self::UploadFile => "upload-file",
            Self::Files => "files",
            Self::File => "file",
            Self::UploadImage => "upload-image",
            Self::Images => "images",
            Self::Image => "image",
            Self::MailingLists => "mailing-lists",
            Self::MailingList => "mailing-list",
        }
    }
}

impl std::fmt::Display for Template {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Data handed to a template.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PageContext(Map<String, Value>);

impl PageContext {
    /// Empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key`, builder style.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Serialize) -> Self {
        self.insert(key, value);
        self
    }

    /// Set `key`. Values that cannot be represented as JSON become `null`.
    pub fn insert(&mut self, key: &str, value: impl Serialize) {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.0.insert(key.to_string(), value);
    }

    /// Value of `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// String value of `key`, or `""`.
    #[must_use]
    pub fn str(&self, key: &str) -> &str {
        self.get(key).and_then(Value::as_str).unwrap_or_default()
    }

    /// Whether `key` is set to `true`.
    #[must_use]
    pub fn flag(&self, key: &str) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Whether `key` is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Keys in the context.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// A page to render.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    /// Which page.
    pub template: Template,
    /// What goes on it.
    pub context: PageContext,
}

impl View {
    /// A view with an empty context.
    #[must_use]
    pub fn new(template: Template) -> Self {
        Self {
            template,
            context: PageContext::new(),
        }
    }

    /// Set a context value, builder style.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Serialize) -> Self {
        self.context.insert(key, value);
        self
    }
}

/// Rendering failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The context lacks something the template needs.
    #[error("template {template} needs `{key}` in its context")]
    MissingContext {
        /// Template name.
        template: &'static str,
        /// Missing key.
        key: &'static str,
    },
}

/// Renders templates to HTML.
pub trait ViewRenderer: Send + Sync {
    /// Render `template` with `context`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if the context does not fit the template.
    fn render(&self, template: Template, context: &PageContext) -> Result<String, RenderError>;
}
