// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

/// Idiomas com catálogo de mensagens. O primeiro é o padrão.
const SUPPORTED: [&str; 2] = ["en", "pt"];

// Extrator de idioma (Accept-Language). Nunca falha.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale(pub String);

impl Locale {
    /// Primeiro idioma suportado na ordem de preferência do cliente.
    /// "pt-BR" conta como "pt".
    pub fn from_header(header_str: &str) -> Self {
        let lang = accept_language::parse(header_str)
            .into_iter()
            .map(|tag| tag.split('-').next().unwrap_or_default().to_lowercase())
            .find(|lang| SUPPORTED.contains(&lang.as_str()))
            .unwrap_or_else(|| SUPPORTED[0].to_string());

        Locale(lang)
    }
}

impl Default for Locale {
    fn default() -> Self {
        Locale(SUPPORTED[0].to_string())
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let locale = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok())
            .map(Locale::from_header)
            .unwrap_or_default();

        Ok(locale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_first_supported_language() {
        assert_eq!(Locale::from_header("pt-BR,pt;q=0.9,en;q=0.8").0, "pt");
        assert_eq!(Locale::from_header("fr-FR,en;q=0.5").0, "en");
        assert_eq!(Locale::from_header("de").0, "en");
        assert_eq!(Locale::from_header("").0, "en");
    }
}
