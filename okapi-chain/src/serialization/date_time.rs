//! DateTime64 represents times in the Okapi protocol.
//!
//! Okapi headers and templates carry millisecond-precision Unix timestamps,
//! so this type wraps a signed 64-bit millisecond count rather than a
//! `chrono` value. The all-zero value doubles as "never set" for fields like
//! the mempool's last-updated time.

use std::{fmt, io};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::{OkapiDeserialize, OkapiSerialize, SerializationError};

/// A millisecond-precision Unix timestamp.
#[derive(
    Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
pub struct DateTime64(i64);

impl DateTime64 {
    /// The zero value, also used as the "never set" sentinel.
    pub const ZERO: DateTime64 = DateTime64(0);

    /// Returns the current time.
    pub fn now() -> DateTime64 {
        DateTime64(Utc::now().timestamp_millis())
    }

    /// Returns the timestamp for `millis` milliseconds since the Unix epoch.
    pub const fn from_unix_millis(millis: i64) -> DateTime64 {
        DateTime64(millis)
    }

    /// Returns the number of milliseconds since the Unix epoch.
    pub const fn unix_millis(&self) -> i64 {
        self.0
    }

    /// Returns the number of whole seconds since the Unix epoch.
    pub fn unix_seconds(&self) -> i64 {
        self.0.div_euclid(1000)
    }

    /// Returns true if this timestamp has never been set.
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Returns this timestamp moved `millis` milliseconds into the future,
    /// saturating at the representable maximum.
    pub fn saturating_add_millis(&self, millis: u64) -> DateTime64 {
        let millis = i64::try_from(millis).unwrap_or(i64::MAX);
        DateTime64(self.0.saturating_add(millis))
    }
}

impl fmt::Display for DateTime64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match Utc.timestamp_millis_opt(self.0).single() {
            Some(date_time) => write!(f, "{date_time}"),
            None => write!(f, "{}ms", self.0),
        }
    }
}

impl fmt::Debug for DateTime64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DateTime64")
            .field(&self.0)
            .field(&format_args!("{self}"))
            .finish()
    }
}

impl OkapiSerialize for DateTime64 {
    fn okapi_serialize<W: io::Write>(&self, mut writer: W) -> Result<(), io::Error> {
        writer.write_i64::<LittleEndian>(self.0)
    }
}

impl OkapiDeserialize for DateTime64 {
    fn okapi_deserialize<R: io::Read>(mut reader: R) -> Result<Self, SerializationError> {
        Ok(DateTime64(reader.read_i64::<LittleEndian>()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unix_seconds_truncates_sub_second_precision() {
        assert_eq!(DateTime64::from_unix_millis(1_999).unix_seconds(), 1);
        assert_eq!(DateTime64::from_unix_millis(2_000).unix_seconds(), 2);
        assert_eq!(DateTime64::from_unix_millis(-1).unix_seconds(), -1);
    }

    #[test]
    fn zero_is_the_never_set_sentinel() {
        assert!(DateTime64::ZERO.is_zero());
        assert!(DateTime64::default().is_zero());
        assert!(!DateTime64::now().is_zero());
    }

    #[test]
    fn saturating_add_does_not_wrap() {
        let max = DateTime64::from_unix_millis(i64::MAX);
        assert_eq!(max.saturating_add_millis(1), max);
        assert_eq!(
            DateTime64::from_unix_millis(5).saturating_add_millis(10),
            DateTime64::from_unix_millis(15),
        );
    }
}
