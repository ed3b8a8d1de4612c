pub mod models;
pub mod protection;
pub mod crypto;
pub mod collector;

pub use models::CookieEntry;
pub use protection::{DataProtection, DpapiProtection};
pub use crypto::{decrypt_aes_gcm, decrypt_cookie_value, derive_encryption_key};
pub use collector::{parse_cookie_file, CookieCollector, COOKIE_DB_NAME};
