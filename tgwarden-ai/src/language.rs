//! Language detection and localized fallback apologies.
//!
//! Detection is offline (`whatlang`); codes are ISO 639-3 three-letter
//! tags. The apology table covers the languages the bot most often sees and
//! falls back to English.

use whatlang::detect;

/// Detects the language of `text`, returning its ISO 639-3 code.
pub fn detect_language(text: &str) -> Option<String> {
    detect(text).map(|info| info.lang().code().to_string())
}

const APOLOGY_EN: &str = "I'm sorry, I couldn't process your request at the moment.";

/// Fallback apology in the given language. Unknown languages get English.
pub fn apology_for(language: Option<&str>) -> &'static str {
    match language {
        Some("rus") => "Извините, я не смог обработать ваш запрос в данный момент.",
        Some("ukr") => "Вибачте, я не зміг обробити ваш запит у цей момент.",
        Some("spa") => "Lo siento, no pude procesar tu solicitud en este momento.",
        Some("deu") => "Es tut mir leid, ich konnte Ihre Anfrage momentan nicht bearbeiten.",
        Some("fra") => "Désolé, je n'ai pas pu traiter votre demande pour le moment.",
        Some("ita") => "Mi dispiace, al momento non sono riuscito a elaborare la tua richiesta.",
        Some("por") => "Desculpe, não consegui processar sua solicitação no momento.",
        _ => APOLOGY_EN,
    }
}
