use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};

#[derive(Debug, Error)]
pub enum SiteError {
    #[error("track index {index} out of range (playlist has {len} tracks)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("missing element '{selector}'")]
    MissingElement { selector: String },

    #[error("element '{selector}' is not a {expected}")]
    WrongElementType {
        selector: String,
        expected: &'static str,
    },

    #[error("no global window exists")]
    NoWindow,

    #[error("window has no document")]
    NoDocument,

    #[error("player is not running")]
    PlayerUnavailable,

    #[error("canvas has no 2d rendering context")]
    NoCanvasContext,

    #[error("invalid site config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("javascript error: {0}")]
    Js(String),
}

impl From<JsValue> for SiteError {
    fn from(value: JsValue) -> Self {
        let message = value
            .as_string()
            .or_else(|| {
                value
                    .dyn_ref::<js_sys::Error>()
                    .map(|e| String::from(e.message()))
            })
            .unwrap_or_else(|| format!("{value:?}"));
        SiteError::Js(message)
    }
}

impl From<SiteError> for JsValue {
    fn from(err: SiteError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SiteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_out_of_range_names_index_and_len() {
        let err = SiteError::IndexOutOfRange { index: 7, len: 4 };
        assert_eq!(
            err.to_string(),
            "track index 7 out of range (playlist has 4 tracks)"
        );
    }

    #[test]
    fn config_errors_convert_from_serde() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{");
        let err: SiteError = parse.unwrap_err().into();
        assert!(matches!(err, SiteError::Config(_)));
    }
}
