//! SQLite row conversion functions.
//!
//! Pure functions for converting between SQLite rows and domain types.
//! These are testable in isolation without database access.

use std::collections::BTreeSet;

use accountsync_core::account::{AccessKey, Account, AccountNumber, DeviceId};
use accountsync_core::storage::RepositoryError;
use rusqlite::types::Type;
use rusqlite::Row;

/// Convert a SQLite row to an Account.
///
/// Expected columns: number, profile_name, access_key, devices
pub fn row_to_account(row: &Row) -> rusqlite::Result<Account> {
    let number: String = row.get(0)?;
    let profile_name: Option<String> = row.get(1)?;
    let access_key: Option<Vec<u8>> = row.get(2)?;
    let devices: String = row.get(3)?;

    let number = AccountNumber::new(number)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))?;
    let access_key = access_key
        .map(|bytes| AccessKey::try_from(bytes.as_slice()))
        .transpose()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Blob, Box::new(e)))?;

    Ok(Account::from_parts(
        number,
        json_to_devices(&devices)?,
        access_key,
        profile_name,
    ))
}

/// Convert a device set to its JSON column value.
pub fn devices_to_json(devices: &BTreeSet<DeviceId>) -> Result<String, RepositoryError> {
    serde_json::to_string(devices).map_err(|e| RepositoryError::Serialization(e.to_string()))
}

/// Parse the devices JSON column.
fn json_to_devices(json: &str) -> rusqlite::Result<BTreeSet<DeviceId>> {
    serde_json::from_str(json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))
}
