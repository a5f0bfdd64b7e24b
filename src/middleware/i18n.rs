// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

// Idiomas com mensagens traduzidas
const SUPPORTED: &[&str] = &["en", "pt"];
const DEFAULT_LANG: &str = "en";

// Extrator de idioma (a partir do Accept-Language)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale(pub String);

impl Default for Locale {
    fn default() -> Self {
        Locale(DEFAULT_LANG.to_string())
    }
}

impl Locale {
    pub fn from_header(header_str: &str) -> Self {
        let supported: Vec<String> = accept_language::parse(header_str)
            .into_iter()
            // "pt-BR" -> "pt"
            .map(|tag| tag.split('-').next().unwrap_or(&tag).to_lowercase())
            .filter(|lang| SUPPORTED.contains(&lang.as_str()))
            .collect();

        supported
            .into_iter()
            .next()
            .map(Locale)
            .unwrap_or_default()
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let locale = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|header_value| header_value.to_str().ok())
            .map(Locale::from_header)
            .unwrap_or_default();

        Ok(locale)
    }
}
