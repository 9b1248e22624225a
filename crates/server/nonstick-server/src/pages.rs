//! HTML pages.
//!
//! The login shell and the consent form carry request data and are rendered
//! through Handlebars, which escapes every interpolated value.

use anyhow::{Result, anyhow};
use axum::http::StatusCode;
use handlebars::{Handlebars, RenderError};
use nonstick_core::ConsentInfo;
use serde::Serialize;

const PARTIALS: [(&str, &str); 2] = [
    ("header", include_str!("../templates/header.hbs")),
    ("footer", include_str!("../templates/footer.hbs")),
];

const TEMPLATES: [(&str, &str); 2] = [
    ("login", include_str!("../templates/login.hbs")),
    ("consent", include_str!("../templates/consent.hbs")),
];

#[derive(Serialize)]
struct LoginView {
    title: &'static str,
    socket: String,
}

#[derive(Serialize)]
struct ScopeView<'a> {
    field: String,
    description: &'a str,
    hidden: bool,
}

#[derive(Serialize)]
struct ConsentView<'a> {
    title: &'static str,
    target: &'a str,
    action: String,
    scopes: Vec<ScopeView<'a>>,
}

fn with_query(path: &str, query: Option<&str>) -> String {
    match query {
        Some(query) if !query.is_empty() => format!("{path}?{query}"),
        _ => path.to_string(),
    }
}

/// Registered page templates.
pub struct Pages {
    handlebars: Handlebars<'static>,
}

impl Pages {
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);

        for (name, source) in PARTIALS {
            handlebars
                .register_partial(name, source)
                .map_err(|e| anyhow!("Failed to register partial '{}': {}", name, e))?;
        }
        for (name, source) in TEMPLATES {
            handlebars
                .register_template_string(name, source)
                .map_err(|e| anyhow!("Failed to register template '{}': {}", name, e))?;
        }

        Ok(Self { handlebars })
    }

    /// The login shell; the conversation itself runs over the PAM socket.
    pub fn login(&self, query: Option<&str>) -> Result<String, RenderError> {
        let view = LoginView {
            title: "Sign in",
            socket: with_query("/api/pamws", query),
        };
        self.handlebars.render("login", &view)
    }

    /// Scope selection form. Hidden scopes are submitted as granted.
    pub fn consent(&self, info: &ConsentInfo, query: Option<&str>) -> Result<String, RenderError> {
        let view = ConsentView {
            title: "Authorize application",
            target: &info.target,
            action: with_query("/consent", query),
            scopes: info
                .scopes
                .iter()
                .map(|scope| ScopeView {
                    field: scope.field_name(),
                    description: &scope.description,
                    hidden: scope.hidden,
                })
                .collect(),
        };
        self.handlebars.render("consent", &view)
    }
}

/// Generic failure page; carries nothing from the request.
pub fn error_page(status: StatusCode) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Error</title>\n</head>\n<body>\n<main>\n<h1>{} {}</h1>\n\
         <p>Something went wrong while processing your request. \
         Please start the sign-in again.</p>\n</main>\n</body>\n</html>\n",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Error")
    )
}
