// src/common/i18n.rs

use std::{collections::HashMap, sync::Arc};

pub const DEFAULT_LANG: &str = "en";

// Catálogo: (chave, inglês, português)
const MESSAGES: &[(&str, &str, &str)] = &[
    ("validation", "One or more fields are invalid.", "Um ou mais campos são inválidos."),
    (
        "insufficient_stock",
        "Insufficient stock: requested {requested}, available {available}.",
        "Estoque insuficiente: solicitado {requested}, disponível {available}.",
    ),
    ("access_denied", "You do not have access to this medicine.", "Você não tem acesso a este medicamento."),
    ("medicine_not_found", "Medicine not found.", "Medicamento não encontrado."),
    (
        "invalid_action",
        "Invalid stock action '{action}'. Use 'add' or 'sell'.",
        "Ação de estoque inválida '{action}'. Use 'add' ou 'sell'.",
    ),
    ("username_exists", "This username is already taken.", "Este nome de usuário já está em uso."),
    ("email_exists", "This e-mail is already in use.", "Este e-mail já está em uso."),
    ("invalid_credentials", "Invalid username or password.", "Usuário ou senha inválidos."),
    ("invalid_token", "Authentication token is invalid or missing.", "Token de autenticação inválido ou ausente."),
    ("user_not_found", "User not found.", "Usuário não encontrado."),
    ("internal", "An unexpected error occurred.", "Ocorreu um erro inesperado."),
];

/// Mensagens de erro por idioma, carregadas uma vez no AppState.
#[derive(Clone)]
pub struct I18nStore {
    catalogs: Arc<HashMap<&'static str, HashMap<&'static str, &'static str>>>,
}

impl I18nStore {
    pub fn new() -> Self {
        let mut en = HashMap::new();
        let mut pt = HashMap::new();
        for (key, en_msg, pt_msg) in MESSAGES {
            en.insert(*key, *en_msg);
            pt.insert(*key, *pt_msg);
        }

        let mut catalogs = HashMap::new();
        catalogs.insert("en", en);
        catalogs.insert("pt", pt);

        Self { catalogs: Arc::new(catalogs) }
    }

    /// Traduz `key`, substituindo `{nome}` pelos parâmetros.
    /// Idioma desconhecido cai para o inglês; chave desconhecida volta como está.
    pub fn translate(&self, lang: &str, key: &str, params: &[(&str, String)]) -> String {
        let template = self
            .catalogs
            .get(lang)
            .and_then(|c| c.get(key))
            .or_else(|| self.catalogs.get(DEFAULT_LANG).and_then(|c| c.get(key)))
            .copied()
            .unwrap_or(key);

        params.iter().fold(template.to_string(), |msg, (name, value)| {
            msg.replace(&format!("{{{}}}", name), value)
        })
    }
}

impl Default for I18nStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translates_with_params() {
        let store = I18nStore::new();
        let msg = store.translate(
            "pt",
            "insufficient_stock",
            &[("requested", "100".into()), ("available", "40".into())],
        );
        assert_eq!(msg, "Estoque insuficiente: solicitado 100, disponível 40.");
    }

    #[test]
    fn unknown_language_falls_back_to_english() {
        let store = I18nStore::new();
        assert_eq!(store.translate("de", "medicine_not_found", &[]), "Medicine not found.");
    }

    #[test]
    fn unknown_key_is_returned_verbatim() {
        let store = I18nStore::new();
        assert_eq!(store.translate("en", "nope", &[]), "nope");
    }
}
