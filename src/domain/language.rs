// ============================================================
// Layer 3 — Tokenizer Languages
// ============================================================
// Language names accepted for the source and target sides.
// Names are matched case-insensitively; unknown names are a
// configuration error rather than a silent fallback.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::DatasetError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Czech,
    Danish,
    Dutch,
    English,
    Estonian,
    Finnish,
    French,
    German,
    Greek,
    Italian,
    Norwegian,
    Polish,
    Portuguese,
    Russian,
    Slovene,
    Spanish,
    Swedish,
    Turkish,
}

impl Language {
    pub const ALL: [Language; 18] = [
        Language::Czech,
        Language::Danish,
        Language::Dutch,
        Language::English,
        Language::Estonian,
        Language::Finnish,
        Language::French,
        Language::German,
        Language::Greek,
        Language::Italian,
        Language::Norwegian,
        Language::Polish,
        Language::Portuguese,
        Language::Russian,
        Language::Slovene,
        Language::Spanish,
        Language::Swedish,
        Language::Turkish,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Language::Czech      => "czech",
            Language::Danish     => "danish",
            Language::Dutch      => "dutch",
            Language::English    => "english",
            Language::Estonian   => "estonian",
            Language::Finnish    => "finnish",
            Language::French     => "french",
            Language::German     => "german",
            Language::Greek      => "greek",
            Language::Italian    => "italian",
            Language::Norwegian  => "norwegian",
            Language::Polish     => "polish",
            Language::Portuguese => "portuguese",
            Language::Russian    => "russian",
            Language::Slovene    => "slovene",
            Language::Spanish    => "spanish",
            Language::Swedish    => "swedish",
            Language::Turkish    => "turkish",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Language {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        Language::ALL
            .iter()
            .copied()
            .find(|lang| lang.name() == lowered)
            .ok_or_else(|| DatasetError::Config(format!("unsupported tokenizer language '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("English".parse::<Language>().unwrap(), Language::English);
        assert_eq!(" FRENCH ".parse::<Language>().unwrap(), Language::French);
    }

    #[test]
    fn test_unknown_language_is_config_error() {
        let err = "klingon".parse::<Language>().unwrap_err();
        assert!(matches!(err, DatasetError::Config(_)));
    }
}
