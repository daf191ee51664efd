pub mod email;
pub mod phone;
pub mod record;

pub use email::email_match_key;
pub use phone::{normalize_phone, Region};
pub use record::{ContactRecord, Property};
