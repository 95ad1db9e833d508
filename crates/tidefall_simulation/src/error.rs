//! Load-time ошибки (level / loadout / tuning документы)
//!
//! Gameplay ошибки сюда НЕ попадают: gating failures идут через event bus,
//! ballistic failures → fallback. Только загрузка может прервать операцию целиком.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid {what}: {reason}")]
    Invalid { what: String, reason: String },

    #[error("loadout lists {0} abilities (max 4)")]
    TooManyAbilities(usize),

    #[error("unknown weapon id '{0}'")]
    UnknownWeapon(String),

    #[error("unknown ability id '{0}'")]
    UnknownAbility(String),

    #[error("world already disposed")]
    WorldDisposed,
}

impl LoadError {
    pub fn invalid(what: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            what: what.into(),
            reason: reason.into(),
        }
    }
}

/// Прочитать файл целиком (с путём в ошибке)
pub fn read_document(path: impl AsRef<std::path::Path>) -> Result<String, LoadError> {
    let path = path.as_ref();
    std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })
}
