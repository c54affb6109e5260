//! Built-in prompts for personal-information detection
//!
//! All locale strings live here. Each language supplies a system prompt,
//! the simple-strategy framing lines, the advanced-strategy instructions and
//! follow-up questions, and its yes/no classification words.

use crate::schema::{AdvancedSchema, SimpleSchema};
use crate::types::Language;

const SYSTEM_PROMPT_EN: &str = r#"You are an assistant for the anonymization of text data.
You receive texts from different sources and in different formats and languages.
Under no circumstances may these texts contain information that could be used to identify the author of the text, e.g. names, addresses, telephone numbers or e-mail addresses."#;

const SIMPLE_PREFIX_EN: &str = "Given the following text:";

const SIMPLE_SUFFIX_EN: &str =
    "Tell me the location in the text where a person is identified by a name.";

const ADVANCED_INSTRUCTIONS_EN: &str = r#"First answer "Yes" or "No", depending on whether the text contains personal information.

If the text contains personal information:

1. briefly describe what type of personal information is contained in the text.
2. provide a list of text passages or references to text passages that contain the personal information."#;

const CONTAINS_PROMPT_EN: &str = "Does the text above contain personal information?";

const YES_ACKNOWLEDGEMENT_EN: &str = "Yes, the text contains personal information.";

const DESCRIPTION_PROMPT_EN: &str =
    "Provide a description of the personal information in the text above.";

const DETAILS_PROMPT_EN: &str =
    "Provide a list of references to the personal information in the text above as JSON.";

const SYSTEM_PROMPT_DE: &str = r#"Du bist ein Assistent für die Anonymisierung von Textdaten.
Du erhälst Texte aus verschiedenen Quellen und in verschiedenen Formaten oder Sprachen.
Diese Texte dürfen auf keinen Fall personenbezogene Daten oder Informationen enthalten, die zur Identifizierung des Verfassers des Textes verwendet werden könnten; z. B. Namen, Adressen, Telefonnummern oder E-Mail-Adressen."#;

const SIMPLE_PREFIX_DE: &str = "Gegeben den Text:";

const SIMPLE_SUFFIX_DE: &str =
    "Nenne mir die Stelle in dem Text, an der eine Person durch einen Namen identifiziert wird.";

const ADVANCED_INSTRUCTIONS_DE: &str = r#"Antworte zunächst mit "Ja" oder "Nein", je nachdem, ob der Text personenbezogene Daten oder Informationen enthält.

Wenn der Text personenbezogene Daten oder Informationen enthält:

1. Beschreibe kurz, welche Art von persönlichen Informationen in dem Text enthalten sind.
2. Gebe eine Liste von Textpassagen oder Verweisen auf Textpassagen an, welche die persönlichen Informationen enthalten."#;

const CONTAINS_PROMPT_DE: &str = "Enthält der Text personenbezogene Daten oder Informationen?";

const YES_ACKNOWLEDGEMENT_DE: &str =
    "Ja, der Text enthält personenbezogene Daten oder Informationen.";

const DESCRIPTION_PROMPT_DE: &str =
    "Beschreibe kurz, welche Art von persönlichen Informationen in dem Text enthalten sind.";

const DETAILS_PROMPT_DE: &str = "Gebe eine Liste von Textpassagen oder Verweisen auf Textpassagen an, welche die persönlichen Informationen enthalten, im JSON-Format.";

struct Locale {
    system: &'static str,
    simple_prefix: &'static str,
    simple_suffix: &'static str,
    advanced_instructions: &'static str,
    contains_prompt: &'static str,
    yes_acknowledgement: &'static str,
    description_prompt: &'static str,
    details_prompt: &'static str,
    token_yes: &'static str,
    token_no: &'static str,
}

const ENGLISH: Locale = Locale {
    system: SYSTEM_PROMPT_EN,
    simple_prefix: SIMPLE_PREFIX_EN,
    simple_suffix: SIMPLE_SUFFIX_EN,
    advanced_instructions: ADVANCED_INSTRUCTIONS_EN,
    contains_prompt: CONTAINS_PROMPT_EN,
    yes_acknowledgement: YES_ACKNOWLEDGEMENT_EN,
    description_prompt: DESCRIPTION_PROMPT_EN,
    details_prompt: DETAILS_PROMPT_EN,
    token_yes: "Yes",
    token_no: "No",
};

const GERMAN: Locale = Locale {
    system: SYSTEM_PROMPT_DE,
    simple_prefix: SIMPLE_PREFIX_DE,
    simple_suffix: SIMPLE_SUFFIX_DE,
    advanced_instructions: ADVANCED_INSTRUCTIONS_DE,
    contains_prompt: CONTAINS_PROMPT_DE,
    yes_acknowledgement: YES_ACKNOWLEDGEMENT_DE,
    description_prompt: DESCRIPTION_PROMPT_DE,
    details_prompt: DETAILS_PROMPT_DE,
    token_yes: "Ja",
    token_no: "Nein",
};

fn locale(language: Language) -> &'static Locale {
    match language {
        Language::En => &ENGLISH,
        Language::De => &GERMAN,
    }
}

/// The (yes, no) classification words of `language`
pub fn classification_tokens(language: Language) -> (&'static str, &'static str) {
    let locale = locale(language);
    (locale.token_yes, locale.token_no)
}

/// Built-in single-shot schema for `language`
pub fn simple_schema(language: Language) -> SimpleSchema {
    let locale = locale(language);
    SimpleSchema {
        system: locale.system.to_string(),
        prefix: locale.simple_prefix.to_string(),
        suffix: locale.simple_suffix.to_string(),
    }
}

/// Built-in multi-turn schema for `language`
pub fn advanced_schema(language: Language) -> AdvancedSchema {
    let locale = locale(language);
    AdvancedSchema {
        system: format!("{}\n\n{}", locale.system, locale.advanced_instructions),
        text_contains_indicator_prompt: locale.contains_prompt.to_string(),
        indicator_yes_acknowledgement: locale.yes_acknowledgement.to_string(),
        description_prompt: locale.description_prompt.to_string(),
        details_prompt: locale.details_prompt.to_string(),
        token_yes: locale.token_yes.to_string(),
        token_no: Some(locale.token_no.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advanced_system_embeds_instructions() {
        let schema = advanced_schema(Language::De);
        assert!(schema.system.starts_with(SYSTEM_PROMPT_DE));
        assert!(schema.system.ends_with(ADVANCED_INSTRUCTIONS_DE));
        assert!(schema.system.contains("\n\n"));
    }

    #[test]
    fn test_instructions_mention_classification_words() {
        for language in Language::ALL {
            let (yes, no) = classification_tokens(language);
            let schema = advanced_schema(language);
            assert!(schema.system.contains(&format!("\"{}\"", yes)));
            assert!(schema.system.contains(&format!("\"{}\"", no)));
            assert!(schema.indicator_yes_acknowledgement.starts_with(yes));
        }
    }

    #[test]
    fn test_simple_schema_is_language_specific() {
        let english = simple_schema(Language::En);
        let german = simple_schema(Language::De);
        assert_ne!(english.prefix, german.prefix);
        assert_ne!(english.system, german.system);
        assert!(german.suffix.contains("Namen"));
    }

    #[test]
    fn test_details_prompt_requests_json() {
        for language in Language::ALL {
            assert!(advanced_schema(language).details_prompt.contains("JSON"));
        }
    }
}
