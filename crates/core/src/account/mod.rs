mod error;
mod types;

pub use error::AccountError;
pub use types::{AccessKey, Account, AccountNumber, DeviceId, ACCESS_KEY_LEN};
