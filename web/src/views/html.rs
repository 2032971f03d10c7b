//! Built-in HTML renderer.

use super::{PageContext, RenderError, Template, ViewRenderer};
use serde_json::Value;

/// Renders every [`Template`] as a plain HTML page with shared navigation.
///
/// Every interpolated value is escaped.
#[derive(Debug, Clone)]
pub struct HtmlRenderer {
    title: String,
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlRenderer {
    /// Renderer with the default site title.
    #[must_use]
    pub fn new() -> Self {
        Self::with_title("Base Site")
    }

    /// Renderer with a custom site title.
    #[must_use]
    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }
}

impl ViewRenderer for HtmlRenderer {
    fn render(&self, template: Template, context: &PageContext) -> Result<String, RenderError> {
        let body = match template {
            Template::Index => index(),
            Template::Register => register(context),
            Template::Login => login(context),
            Template::Users => listing(context, "Users", "/users", user_item),
            Template::User => user(require(context, template, "user")?),
            Template::UpdateUser => update_user(context),
            Template::SendEmail => send_email(context),
            Template::UploadFile => upload(context, "Upload file", "/upload-file", "file"),
            Template::Files => listing(context, "Files", "/files", file_item),
            Template::File => file(require(context, template, "file")?),
            Template::UploadImage => upload(context, "Upload image", "/upload-image", "image"),
            Template::Images => listing(context, "Images", "/images", image_item),
            Template::Image => image(require(context, template, "image")?),
            Template::MailingLists => {
                listing(context, "Mailing lists", "/mailing-lists", mailing_list_item)
            }
            Template::MailingList => mailing_list(require(context, template, "list")?),
        };

        Ok(layout(&self.title, context.flag("logged_in"), &body))
    }
}

/// Escape text for use in HTML content and quoted attributes.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn require<'a>(
    context: &'a PageContext,
    template: Template,
    key: &'static str,
) -> Result<&'a Value, RenderError> {
    context
        .get(key)
        .filter(|value| value.is_object())
        .ok_or(RenderError::MissingContext {
            template: template.name(),
            key,
        })
}

fn text<'a>(value: &'a Value, key: &str) -> &'a str {
    value.get(key).and_then(Value::as_str).unwrap_or_default()
}

fn layout(title: &str, logged_in: bool, body: &str) -> String {
    let account = if logged_in {
        r#"<a href="/logout">Logout</a>"#.to_string()
    } else {
        r#"<a href="/login">Login</a> <a href="/register">Register</a>"#.to_string()
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
</head>
<body>
<nav>
<a href="/">Home</a>
<a href="/users">Users</a>
<a href="/files">Files</a>
<a href="/images">Images</a>
<a href="/mailing-lists">Mailing lists</a>
<a href="/send-email">Send email</a>
{account}
</nav>
<main>
{body}
</main>
</body>
</html>
"#,
        title = escape(title),
    )
}

fn error_block(context: &PageContext) -> String {
    let error = context.str("error");
    if error.is_empty() {
        String::new()
    } else {
        format!(r#"<p class="error">{}</p>"#, escape(error))
    }
}

fn input(label: &str, name: &str, kind: &str, value: &str) -> String {
    format!(
        r#"<label>{label} <input type="{kind}" name="{name}" value="{value}"></label>"#,
        value = escape(value),
    )
}

fn textarea(label: &str, name: &str, value: &str) -> String {
    format!(
        r#"<label>{label} <textarea name="{name}">{value}</textarea></label>"#,
        value = escape(value),
    )
}

fn index() -> String {
    "<h1>Welcome</h1>\n<p>A small site built on the Base API.</p>".to_string()
}

fn register(context: &PageContext) -> String {
    format!(
        r#"<h1>Register</h1>
{error}
<form method="post" action="/register">
{email}
{password}
{confirmation}
{custom_data}
<button type="submit">Register</button>
</form>"#,
        error = error_block(context),
        email = input("Email", "email", "email", context.str("email")),
        password = input("Password", "password", "password", ""),
        confirmation = input("Confirmation", "confirmation", "password", ""),
        custom_data = textarea("Custom data (JSON)", "custom_data", context.str("custom_data")),
    )
}

fn login(context: &PageContext) -> String {
    format!(
        r#"<h1>Login</h1>
{error}
<form method="post" action="/login">
{email}
{password}
<button type="submit">Login</button>
</form>"#,
        error = error_block(context),
        email = input("Email", "email", "email", context.str("email")),
        password = input("Password", "password", "password", ""),
    )
}

fn listing(
    context: &PageContext,
    heading: &str,
    path: &str,
    item: fn(&Value) -> String,
) -> String {
    let items: String = context
        .get("data")
        .and_then(|data| data.get("items"))
        .and_then(Value::as_array)
        .map(|items| items.iter().map(item).collect())
        .unwrap_or_default();

    let page = context.get("page").and_then(Value::as_i64).unwrap_or(1);
    let previous = if page > 1 {
        format!(r#"<a href="{path}?page={}">Previous</a> "#, page - 1)
    } else {
        String::new()
    };

    format!(
        r#"<h1>{heading}</h1>
{error}
<ul>
{items}</ul>
<p>{previous}Page {page} <a href="{path}?page={next}">Next</a></p>"#,
        error = error_block(context),
        next = page.saturating_add(1),
    )
}

fn user_item(user: &Value) -> String {
    let id = escape(text(user, "id"));
    format!(
        "<li><a href=\"/users/{id}\">{}</a></li>\n",
        escape(text(user, "email"))
    )
}

fn file_item(file: &Value) -> String {
    let id = escape(text(file, "id"));
    let label = file
        .get("name")
        .and_then(Value::as_str)
        .map_or_else(|| id.clone(), escape);
    format!(
        "<li><a href=\"/files/{id}\">{label}</a> ({})</li>\n",
        escape(text(file, "content_type"))
    )
}

fn image_item(image: &Value) -> String {
    let id = escape(text(image, "id"));
    format!("<li><a href=\"/images/{id}\">{id}</a></li>\n")
}

fn mailing_list_item(list: &Value) -> String {
    let id = escape(text(list, "id"));
    let label = list
        .get("name")
        .and_then(Value::as_str)
        .map_or_else(|| id.clone(), escape);
    format!("<li><a href=\"/mailing-lists/{id}\">{label}</a></li>\n")
}

fn custom_data_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(raw)) => raw.clone(),
        Some(other) => serde_json::to_string_pretty(other).unwrap_or_default(),
    }
}

fn user(user: &Value) -> String {
    let id = escape(text(user, "id"));
    format!(
        r#"<h1>{email}</h1>
<dl>
<dt>Id</dt><dd>{id}</dd>
<dt>Custom data</dt><dd><pre>{custom_data}</pre></dd>
</dl>
<p><a href="/users/{id}/update">Edit</a></p>
<form method="post" action="/users/{id}/delete">
<button type="submit">Delete</button>
</form>"#,
        email = escape(text(user, "email")),
        custom_data = escape(&custom_data_text(user.get("custom_data"))),
    )
}

fn update_user(context: &PageContext) -> String {
    let id = escape(context.str("id"));
    format!(
        r#"<h1>Edit user</h1>
{error}
<form method="post" action="/users/{id}">
{email}
{custom_data}
<button type="submit">Save</button>
</form>"#,
        error = error_block(context),
        email = input("Email", "email", "email", context.str("email")),
        custom_data = textarea(
            "Custom data (JSON)",
            "custom_data",
            &custom_data_text(context.get("custom_data"))
        ),
    )
}

fn send_email(context: &PageContext) -> String {
    let success = if context.flag("success") {
        r#"<p class="success">Email sent!</p>"#
    } else {
        ""
    };

    format!(
        r#"<h1>Send email</h1>
{success}
{error}
<form method="post" action="/send-email">
{subject}
{from}
{to}
{html}
{text}
<button type="submit">Send</button>
</form>"#,
        error = error_block(context),
        subject = input("Subject", "subject", "text", context.str("subject")),
        from = input("From", "from", "email", context.str("from")),
        to = input("To", "to", "email", context.str("to")),
        html = textarea("HTML", "html", context.str("html")),
        text = textarea("Text", "text", context.str("text")),
    )
}

fn upload(context: &PageContext, heading: &str, action: &str, field: &str) -> String {
    format!(
        r#"<h1>{heading}</h1>
{error}
<form method="post" action="{action}" enctype="multipart/form-data">
<input type="file" name="{field}">
<button type="submit">Upload</button>
</form>"#,
        error = error_block(context),
    )
}

fn file(file: &Value) -> String {
    let id = escape(text(file, "id"));
    format!(
        r#"<h1>File {id}</h1>
<dl>
<dt>Name</dt><dd>{name}</dd>
<dt>Content type</dt><dd>{content_type}</dd>
</dl>
<form method="post" action="/files/{id}/delete">
<button type="submit">Delete</button>
</form>"#,
        name = escape(text(file, "name")),
        content_type = escape(text(file, "content_type")),
    )
}

fn image(image: &Value) -> String {
    let id = escape(text(image, "id"));
    format!(
        r#"<h1>Image {id}</h1>
<dl>
<dt>Content type</dt><dd>{content_type}</dd>
</dl>
<form method="post" action="/images/{id}/delete">
<button type="submit">Delete</button>
</form>"#,
        content_type = escape(text(image, "content_type")),
    )
}

fn mailing_list(list: &Value) -> String {
    let id = escape(text(list, "id"));
    let name = list
        .get("name")
        .and_then(Value::as_str)
        .map_or_else(|| id.clone(), escape);

    let subscribers: String = list
        .get("subscribers")
        .and_then(Value::as_array)
        .map(|emails| {
            emails
                .iter()
                .filter_map(Value::as_str)
                .map(|email| {
                    let email = escape(email);
                    format!(
                        r#"<li>{email}
<form method="post" action="/mailing-lists/{id}/unsubscribe">
<input type="hidden" name="email" value="{email}">
<button type="submit">Unsubscribe</button>
</form></li>
"#
                    )
                })
                .collect()
        })
        .unwrap_or_default();

    format!(
        r#"<h1>{name}</h1>
<h2>Subscribers</h2>
<ul>
{subscribers}</ul>
<form method="post" action="/mailing-lists/{id}/subscribe">
{email}
<button type="submit">Subscribe</button>
</form>
<h2>Send a message</h2>
<form method="post" action="/mailing-lists/{id}/send">
{subject}
{from}
{html}
{text}
<button type="submit">Send</button>
</form>"#,
        email = input("Email", "email", "email", ""),
        subject = input("Subject", "subject", "text", ""),
        from = input("From", "from", "email", ""),
        html = textarea("HTML", "html", ""),
        text = textarea("Text", "text", ""),
    )
}
