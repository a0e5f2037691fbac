//! Data files compiled into the binary

use rust_embed::Embed;

use crate::rates::error::RateError;

#[derive(Embed)]
#[folder = "data/"]
pub(crate) struct EmbeddedData;

impl EmbeddedData {
    /// Embedded file names under a directory prefix, sorted
    pub(crate) fn names_under(prefix: &str) -> Vec<String> {
        let mut names: Vec<String> = Self::iter()
            .filter(|name| name.starts_with(prefix))
            .map(|name| name.into_owned())
            .collect();
        names.sort();
        names
    }

    /// Read an embedded file as UTF-8 text
    pub(crate) fn read(name: &str) -> Result<String, RateError> {
        Self::get(name)
            .and_then(|file| String::from_utf8(file.data.into_owned()).ok())
            .ok_or_else(|| RateError::Embedded {
                name: name.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_files_embedded() {
        let names = EmbeddedData::names_under("rates/");
        assert_eq!(names, vec!["rates/2024.yaml", "rates/2025.yaml"]);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(matches!(
            EmbeddedData::read("rates/1999.yaml"),
            Err(RateError::Embedded { .. })
        ));
    }
}
