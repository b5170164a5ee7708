//! HTML rendering with Tera.
//!
//! Templates are compiled into the binary and registered once at startup.
//! Every name ends in `.html`, so Tera escapes all interpolated values with
//! [`escape_html`].

use axum::{http::StatusCode, response::Html};
use model::StoreError;
use std::fmt;
use std::sync::Arc;
use tera::{Context, Tera};
use tracing::{error, trace, warn};

const TEMPLATES: [(&str, &str); 12] = [
    ("base.html", include_str!("../templates/base.html")),
    ("index.html", include_str!("../templates/index.html")),
    ("404.html", include_str!("../templates/404.html")),
    ("manufacturer_list.html", include_str!("../templates/manufacturer_list.html")),
    ("car_list.html", include_str!("../templates/car_list.html")),
    ("car_detail.html", include_str!("../templates/car_detail.html")),
    ("driver_list.html", include_str!("../templates/driver_list.html")),
    ("driver_detail.html", include_str!("../templates/driver_detail.html")),
    ("driver_license_update.html", include_str!("../templates/driver_license_update.html")),
    ("admin/driver_changelist.html", include_str!("../templates/admin/driver_changelist.html")),
    ("admin/driver_change.html", include_str!("../templates/admin/driver_change.html")),
    ("admin/driver_add.html", include_str!("../templates/admin/driver_add.html")),
];

/// Error half of every HTML handler result
pub type PageError = (StatusCode, Html<String>);

/// Compiled template registry shared by the HTML handlers.
#[derive(Clone)]
pub struct Templates {
    tera: Arc<Tera>,
}

impl fmt::Debug for Templates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Templates")
            .field("count", &self.tera.get_template_names().count())
            .finish()
    }
}

impl Templates {
    /// Parses every built-in template.
    pub fn load() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.set_escape_fn(escape_html);
        tera.add_raw_templates(TEMPLATES)?;
        trace!("Loaded {} templates", TEMPLATES.len());
        Ok(Self {
            tera: Arc::new(tera),
        })
    }

    /// Renders `name`, turning engine failures into a 500 page.
    pub fn render(&self, name: &str, context: &Context) -> Result<Html<String>, PageError> {
        self.tera.render(name, context).map(Html).map_err(|e| {
            error!("Failed to render template '{}': {:?}", name, e);
            internal_error()
        })
    }

    /// The 404 page with an explanatory message.
    pub fn not_found(&self, message: &str) -> PageError {
        let mut context = Context::new();
        context.insert("message", message);
        match self.tera.render("404.html", &context) {
            Ok(body) => (StatusCode::NOT_FOUND, Html(body)),
            Err(e) => {
                error!("Failed to render 404 page: {:?}", e);
                (StatusCode::NOT_FOUND, Html("<h1>Not Found</h1>".to_string()))
            }
        }
    }

    /// Maps a store failure onto an error page.
    pub fn store_error(&self, err: StoreError) -> PageError {
        match err {
            StoreError::NotFound { .. } => {
                warn!("{}", err);
                self.not_found(&err.to_string())
            }
            other => {
                error!("Store operation failed while rendering a page: {}", other);
                internal_error()
            }
        }
    }
}

/// Escapes the HTML special characters `& < > " '`.
///
/// Tera's built-in escaper also rewrites `/`, which would stop values such as
/// `CX-5/Sport` from appearing verbatim in the pages.
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn internal_error() -> PageError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html("<h1>Server Error (500)</h1>".to_string()),
    )
}
