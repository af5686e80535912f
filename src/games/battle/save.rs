//! 選択テーマの永続化。
//!
//! 保存するのはテーマキー (`"alienspecies"` / `"energy"`) の文字列だけ。
//! バトルの進行状況は保存しない。リロードすると次のバトルは最初から。

use super::state::Theme;

#[cfg(target_arch = "wasm32")]
const STORAGE_KEY: &str = "selected_theme";

/// Decode a stored value. Unknown or empty strings mean "no theme".
pub fn decode_theme(raw: &str) -> Option<Theme> {
    Theme::from_key(raw.trim())
}

#[cfg(target_arch = "wasm32")]
fn get_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok()?
}

#[cfg(target_arch = "wasm32")]
pub fn save_theme(theme: Theme) {
    if let Some(storage) = get_storage() {
        if let Err(e) = storage.set_item(STORAGE_KEY, theme.key()) {
            web_sys::console::warn_1(
                &format!("Eco Battle Quiz: localStorage への保存に失敗: {e:?}").into(),
            );
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub fn load_theme() -> Option<Theme> {
    let storage = get_storage()?;
    let raw = match storage.get_item(STORAGE_KEY) {
        Ok(Some(v)) => v,
        _ => return None,
    };
    let theme = decode_theme(&raw);
    if theme.is_none() {
        web_sys::console::warn_1(
            &format!("Eco Battle Quiz: 不明なテーマを破棄します: {raw}").into(),
        );
        let _ = storage.remove_item(STORAGE_KEY);
    }
    theme
}
