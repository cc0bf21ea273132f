//! One-shot status messages carried on the redirect target's query string.

use actix_web::http::header::LOCATION;
use actix_web::HttpResponse;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Danger,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Success => "success",
            Level::Danger => "danger",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub level: Level,
}

#[derive(Debug, Default, Deserialize)]
pub struct NoticeQuery {
    pub notice: Option<String>,
    pub level: Option<String>,
}

impl NoticeQuery {
    pub fn notice(&self) -> Option<Notice> {
        let message = self.notice.as_deref()?.trim();
        if message.is_empty() {
            return None;
        }
        let level = match self.level.as_deref() {
            Some("danger") => Level::Danger,
            _ => Level::Success,
        };
        Some(Notice {
            message: message.to_string(),
            level,
        })
    }
}

pub fn location(path: &str, message: &str, level: Level) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("notice", message)
        .append_pair("level", level.as_str())
        .finish();
    format!("{}?{}", path, query)
}

/// 303 so the browser follows a POST with a GET.
pub fn redirect(path: &str, message: &str, level: Level) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((LOCATION, location(path, message, level)))
        .finish()
}
