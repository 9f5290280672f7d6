use crate::{
    models::theme::Theme,
    storage::{Storage, StorageError, THEME_KEY},
};

/// The saved theme, `Light` when nothing (or something unreadable) is stored.
pub fn load_theme(storage: &impl Storage) -> Result<Theme, StorageError> {
    let Some(raw) = storage.get(THEME_KEY)? else {
        return Ok(Theme::default());
    };
    match raw.parse() {
        Ok(theme) => Ok(theme),
        Err(e) => {
            tracing::warn!(error = %e, "ignoring stored theme");
            Ok(Theme::default())
        }
    }
}

pub fn save_theme(storage: &impl Storage, theme: Theme) -> Result<(), StorageError> {
    storage.set(THEME_KEY, theme.as_str())?;
    tracing::info!(%theme, "theme saved");
    Ok(())
}

pub fn toggle_theme(storage: &impl Storage) -> Result<Theme, StorageError> {
    let theme = load_theme(storage)?.toggled();
    save_theme(storage, theme)?;
    Ok(theme)
}
