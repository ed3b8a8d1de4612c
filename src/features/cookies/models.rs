use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CookieEntry {
    pub host_key: String,
    pub name: String,
    /// `None` when the stored value could not be decrypted.
    pub value: Option<String>,
}
