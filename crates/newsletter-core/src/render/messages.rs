//! Default localized strings

use serde::{Deserialize, Serialize};

/// Locales with built-in default messages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Es,
    Pt,
}

impl Locale {
    /// Parse a language tag such as `pt-BR` or `es_AR`
    ///
    /// Unknown languages fall back to English.
    pub fn from_tag(tag: &str) -> Self {
        let language = tag
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match language.as_str() {
            "es" => Locale::Es,
            "pt" => Locale::Pt,
            _ => Locale::En,
        }
    }
}

/// Message identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    Success,
    Error,
    InvalidEmail,
    InvalidName,
    InvalidPhone,
}

/// Default text for `message` in `locale`
pub fn message(locale: Locale, message: Message) -> &'static str {
    match (locale, message) {
        (Locale::En, Message::Success) => "Thank you for subscribing!",
        (Locale::En, Message::Error) => "Something went wrong. Please try again.",
        (Locale::En, Message::InvalidEmail) => "Please enter a valid email address.",
        (Locale::En, Message::InvalidName) => "Please enter your name.",
        (Locale::En, Message::InvalidPhone) => "Please enter your phone number.",

        (Locale::Es, Message::Success) => "¡Gracias por suscribirte!",
        (Locale::Es, Message::Error) => "Algo salió mal. Inténtalo de nuevo.",
        (Locale::Es, Message::InvalidEmail) => "Introduce un correo electrónico válido.",
        (Locale::Es, Message::InvalidName) => "Introduce tu nombre.",
        (Locale::Es, Message::InvalidPhone) => "Introduce tu número de teléfono.",

        (Locale::Pt, Message::Success) => "Obrigado por se inscrever!",
        (Locale::Pt, Message::Error) => "Algo deu errado. Tente novamente.",
        (Locale::Pt, Message::InvalidEmail) => "Digite um e-mail válido.",
        (Locale::Pt, Message::InvalidName) => "Digite seu nome.",
        (Locale::Pt, Message::InvalidPhone) => "Digite seu telefone.",
    }
}
