//! Web Storage backend for the token store

use singularity_core::{CoreError, CoreResult, SessionStorage, StorageScope};
use wasm_bindgen::JsValue;
use web_sys::Storage;

/// Session scope in `window.sessionStorage`, persistent scope in `window.localStorage`
///
/// Holds no browser handles itself; the storage object is looked up on every
/// call.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserStorage;

impl BrowserStorage {
    fn backend(scope: StorageScope) -> CoreResult<Storage> {
        let window = web_sys::window().ok_or_else(|| CoreError::storage("no window available"))?;
        let storage = match scope {
            StorageScope::Session => window.session_storage(),
            StorageScope::Persistent => window.local_storage(),
        };
        storage
            .map_err(js_error)?
            .ok_or_else(|| CoreError::storage(format!("{scope:?} storage is unavailable")))
    }
}

fn js_error(value: JsValue) -> CoreError {
    CoreError::storage(format!("{value:?}"))
}

impl SessionStorage for BrowserStorage {
    fn get(&self, scope: StorageScope, key: &str) -> CoreResult<Option<String>> {
        Self::backend(scope)?.get_item(key).map_err(js_error)
    }

    fn set(&self, scope: StorageScope, key: &str, value: &str) -> CoreResult<()> {
        Self::backend(scope)?.set_item(key, value).map_err(js_error)
    }

    fn remove(&self, scope: StorageScope, key: &str) -> CoreResult<()> {
        Self::backend(scope)?.remove_item(key).map_err(js_error)
    }
}
