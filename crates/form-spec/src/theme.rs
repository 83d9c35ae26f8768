use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Style family of a template. `creative` carries a fixed section padding
/// that wins over the spacing table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemplateFlavor {
    #[default]
    Modern,
    Classic,
    Minimal,
    Creative,
    #[serde(other)]
    Unknown,
}

/// Registry entry for a named template style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ThemeSpec {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub flavor: TemplateFlavor,
    /// Primary and accent overrides; `None` keeps the ambient palette.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<String>>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ThemeError {
    #[error("theme id must not be empty")]
    EmptyId,
    #[error("theme '{0}' is already registered")]
    Duplicate(String),
    #[error("theme color '{0}' is not a hex color")]
    BadColor(String),
}

/// Immutable set of registered template styles. Registering a custom theme
/// yields a new registry value; existing holders never observe the change.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ThemeRegistry {
    themes: BTreeMap<String, ThemeSpec>,
}

impl ThemeRegistry {
    /// The built-in template styles every session starts from.
    pub fn builtin() -> Self {
        let mut themes = BTreeMap::new();
        for theme in [
            ThemeSpec {
                id: "modern".to_string(),
                label: "Modern".to_string(),
                flavor: TemplateFlavor::Modern,
                colors: None,
            },
            ThemeSpec {
                id: "classic".to_string(),
                label: "Classic".to_string(),
                flavor: TemplateFlavor::Classic,
                colors: Some(vec!["#1e3a5f".to_string(), "#b45309".to_string()]),
            },
            ThemeSpec {
                id: "minimal".to_string(),
                label: "Minimal".to_string(),
                flavor: TemplateFlavor::Minimal,
                colors: Some(vec!["#111827".to_string(), "#6b7280".to_string()]),
            },
            ThemeSpec {
                id: "creative".to_string(),
                label: "Creative".to_string(),
                flavor: TemplateFlavor::Creative,
                colors: Some(vec!["#7c3aed".to_string(), "#ec4899".to_string()]),
            },
        ] {
            themes.insert(theme.id.clone(), theme);
        }
        Self { themes }
    }

    pub fn get(&self, id: &str) -> Option<&ThemeSpec> {
        self.themes.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.themes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.themes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }

    /// Custom-theme upload: validates the entry and returns a new registry
    /// containing it. `self` stays untouched.
    pub fn with_theme(&self, theme: ThemeSpec) -> Result<Self, ThemeError> {
        if theme.id.is_empty() {
            return Err(ThemeError::EmptyId);
        }
        if self.themes.contains_key(&theme.id) {
            return Err(ThemeError::Duplicate(theme.id));
        }
        if let Some(colors) = &theme.colors {
            for color in colors {
                if !is_hex_color(color) {
                    return Err(ThemeError::BadColor(color.clone()));
                }
            }
        }
        let mut themes = self.themes.clone();
        themes.insert(theme.id.clone(), theme);
        Ok(Self { themes })
    }
}

fn is_hex_color(text: &str) -> bool {
    match text.strip_prefix('#') {
        Some(rest) => {
            (rest.len() == 3 || rest.len() == 6) && rest.chars().all(|c| c.is_ascii_hexdigit())
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_carries_the_four_template_styles() {
        let registry = ThemeRegistry::builtin();
        assert_eq!(registry.len(), 4);
        assert_eq!(
            registry.get("creative").map(|t| t.flavor),
            Some(TemplateFlavor::Creative)
        );
    }

    #[test]
    fn with_theme_returns_a_new_registry_value() {
        let registry = ThemeRegistry::builtin();
        let grown = registry
            .with_theme(ThemeSpec {
                id: "brand".to_string(),
                label: "Brand".to_string(),
                flavor: TemplateFlavor::Modern,
                colors: Some(vec!["#ff0000".to_string()]),
            })
            .unwrap();

        assert_eq!(registry.len(), 4);
        assert_eq!(grown.len(), 5);
        assert!(registry.get("brand").is_none());
        assert!(grown.get("brand").is_some());
    }

    #[test]
    fn with_theme_rejects_bad_entries() {
        let registry = ThemeRegistry::builtin();
        assert_eq!(
            registry
                .with_theme(ThemeSpec {
                    id: String::new(),
                    label: "Nameless".to_string(),
                    flavor: TemplateFlavor::Modern,
                    colors: None,
                })
                .unwrap_err(),
            ThemeError::EmptyId
        );
        assert_eq!(
            registry
                .with_theme(ThemeSpec {
                    id: "modern".to_string(),
                    label: "Again".to_string(),
                    flavor: TemplateFlavor::Modern,
                    colors: None,
                })
                .unwrap_err(),
            ThemeError::Duplicate("modern".to_string())
        );
        assert_eq!(
            registry
                .with_theme(ThemeSpec {
                    id: "loud".to_string(),
                    label: "Loud".to_string(),
                    flavor: TemplateFlavor::Creative,
                    colors: Some(vec!["red".to_string()]),
                })
                .unwrap_err(),
            ThemeError::BadColor("red".to_string())
        );
    }

    #[test]
    fn hex_colors_accept_short_and_long_forms() {
        assert!(is_hex_color("#abc"));
        assert!(is_hex_color("#A1B2C3"));
        assert!(!is_hex_color("abc"));
        assert!(!is_hex_color("#ab"));
        assert!(!is_hex_color("#ggg"));
    }
}
