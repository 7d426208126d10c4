//! Demo accounts for the in-memory storage backend.

use std::collections::BTreeSet;

use accountsync_core::account::{Account, AccountError, AccountNumber, DeviceId};

/// Builds the demo accounts seeded into in-memory storage at startup.
pub fn demo_accounts() -> Result<Vec<Account>, AccountError> {
    let demo = [
        ("+14152222222", "test", vec![1]),
        ("+14153333333", "Alice", vec![1, 2]),
        ("+442071838750", "Bob", vec![1]),
    ];

    demo.into_iter()
        .enumerate()
        .map(|(i, (number, name, devices))| {
            let devices: BTreeSet<DeviceId> = devices.into_iter().map(DeviceId).collect();
            let key = [i as u8; 16];
            Ok(Account::new(AccountNumber::new(number)?, devices, &key)?.with_profile_name(name))
        })
        .collect()
}
