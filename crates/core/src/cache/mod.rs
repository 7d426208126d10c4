mod error;
mod keys;
mod serialization;
mod traits;

pub use error::{CacheError, Result};
pub use keys::{account_key, ACCOUNT_KEY_PREFIX};
pub use serialization::{deserialize_account, serialize_account, SerializationError};
pub use traits::{CacheConnection, ReplicatedCache};
