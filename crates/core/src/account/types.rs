use std::collections::BTreeSet;
use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::AccountError;

/// Length in bytes of an unidentified access key.
pub const ACCESS_KEY_LEN: usize = 16;

/// The unique identifier of an account, typically a normalized phone number.
///
/// The value is opaque: it is only checked for emptiness and is otherwise
/// used verbatim (e.g. when deriving cache keys).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountNumber(String);

impl AccountNumber {
    /// Creates a new account number.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::EmptyNumber` if the value is empty or only whitespace.
    pub fn new(number: impl Into<String>) -> Result<Self, AccountError> {
        let number = number.into();
        if number.trim().is_empty() {
            return Err(AccountError::EmptyNumber);
        }
        Ok(Self(number))
    }

    /// Returns the number as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AccountNumber {
    type Error = AccountError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl std::str::FromStr for AccountNumber {
    type Err = AccountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl From<AccountNumber> for String {
    fn from(number: AccountNumber) -> Self {
        number.0
    }
}

impl fmt::Display for AccountNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a device registered to an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(pub u32);

/// Fixed-length key material attached to an account.
///
/// Serialized as a base64 string. The `Debug` output never includes the key bytes.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct AccessKey([u8; ACCESS_KEY_LEN]);

impl AccessKey {
    /// Returns the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; ACCESS_KEY_LEN] {
        &self.0
    }
}

impl From<[u8; ACCESS_KEY_LEN]> for AccessKey {
    fn from(bytes: [u8; ACCESS_KEY_LEN]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for AccessKey {
    type Error = AccountError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let key: [u8; ACCESS_KEY_LEN] = bytes
            .try_into()
            .map_err(|_| AccountError::InvalidAccessKeyLength(bytes.len()))?;
        Ok(Self(key))
    }
}

impl fmt::Debug for AccessKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessKey(..)")
    }
}

impl Serialize for AccessKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(self.0))
    }
}

impl<'de> Deserialize<'de> for AccessKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        let bytes = STANDARD
            .decode(encoded.as_bytes())
            .map_err(|e| AccountError::InvalidAccessKeyEncoding(e.to_string()))
            .map_err(serde::de::Error::custom)?;
        AccessKey::try_from(bytes.as_slice()).map_err(serde::de::Error::custom)
    }
}

/// An account record as owned by the persistent store.
///
/// The number is fixed at construction; there is no setter for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    number: AccountNumber,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    devices: BTreeSet<DeviceId>,
    #[serde(rename = "uak", default, skip_serializing_if = "Option::is_none")]
    unidentified_access_key: Option<AccessKey>,
    #[serde(rename = "name", default, skip_serializing_if = "Option::is_none")]
    profile_name: Option<String>,
}

impl Account {
    /// Creates a new account.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::InvalidAccessKeyLength` unless `access_key` is
    /// exactly 16 bytes long.
    pub fn new(
        number: AccountNumber,
        devices: BTreeSet<DeviceId>,
        access_key: &[u8],
    ) -> Result<Self, AccountError> {
        Ok(Self {
            number,
            devices,
            unidentified_access_key: Some(AccessKey::try_from(access_key)?),
            profile_name: None,
        })
    }

    /// Rebuilds an account from its stored parts.
    ///
    /// Storage backends use this when reading a record back; the access key
    /// length has already been enforced by `AccessKey`.
    pub fn from_parts(
        number: AccountNumber,
        devices: BTreeSet<DeviceId>,
        unidentified_access_key: Option<AccessKey>,
        profile_name: Option<String>,
    ) -> Self {
        Self {
            number,
            devices,
            unidentified_access_key,
            profile_name,
        }
    }

    /// Sets the profile (display) name for this account.
    pub fn with_profile_name(mut self, name: impl Into<String>) -> Self {
        self.profile_name = Some(name.into());
        self
    }

    pub fn number(&self) -> &AccountNumber {
        &self.number
    }

    pub fn devices(&self) -> &BTreeSet<DeviceId> {
        &self.devices
    }

    pub fn unidentified_access_key(&self) -> Option<&AccessKey> {
        self.unidentified_access_key.as_ref()
    }

    pub fn profile_name(&self) -> Option<&str> {
        self.profile_name.as_deref()
    }
}
