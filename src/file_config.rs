//! INI configuration files.
//!
//! Hosts that keep writer settings on disk load them with [`load_overrides`]
//! and layer the result under per-writer values before calling
//! `initialize`. Parsing is delegated to `rust-ini`.

use std::{collections::BTreeMap, fs, path::Path};

use ini::Ini;

use crate::connection::ConfigError;

/// Read the key/value pairs of one section of an INI file.
///
/// `None` selects the keys that precede any section header. A file with no
/// such keys yields an empty map rather than an error.
pub fn load_overrides(
    path: &Path,
    section: Option<&str>,
) -> Result<BTreeMap<String, String>, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_overrides(path, &text, section)
}

fn parse_overrides(
    path: &Path,
    text: &str,
    section: Option<&str>,
) -> Result<BTreeMap<String, String>, ConfigError> {
    let ini = Ini::load_from_str(text).map_err(|err| ConfigError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    let Some(props) = ini.section(section) else {
        return match section {
            Some(name) => Err(ConfigError::MissingSection {
                path: path.to_path_buf(),
                section: name.to_owned(),
            }),
            None => Ok(BTreeMap::new()),
        };
    };
    Ok(props
        .iter()
        .map(|(key, value)| (key.to_owned(), value.to_owned()))
        .collect())
}
