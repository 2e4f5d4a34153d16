use thiserror::Error;

/// Errors surfaced by the tree engine
#[derive(Debug, Error)]
pub enum TreeError {
    #[error("config parse error: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("render error: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, TreeError>;

impl From<TreeError> for wasm_bindgen::JsValue {
    fn from(err: TreeError) -> Self {
        wasm_bindgen::JsValue::from_str(&err.to_string())
    }
}
