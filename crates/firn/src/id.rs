use core::fmt;

/// A 64-bit snowflake identifier.
///
/// - 42 bits timestamp (ms since [`CUSTOM_EPOCH`])
/// - 5 bits salt (random, fixed per generator instance)
/// - 5 bits machine ID (fixed per generator instance)
/// - 12 bits sequence
///
/// ```text
///  Bit Index:  63             22 21        17 16             12 11             0
///              +----------------+------------+-----------------+---------------+
///  Field:      | timestamp (42) |  salt (5)  |  machine ID (5) | sequence (12) |
///              +----------------+------------+-----------------+---------------+
///              |<------ MSB ------------- 64 bits ------------- LSB ---------->|
/// ```
///
/// Identifiers generated by one instance are roughly time-ordered: the
/// timestamp occupies the most significant bits, so ids produced in later
/// milliseconds compare strictly greater than earlier ones.
///
/// [`CUSTOM_EPOCH`]: crate::CUSTOM_EPOCH
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SnowflakeId {
    id: u64,
}

impl SnowflakeId {
    /// Bitmask for extracting the 42-bit timestamp field. Occupies bits 22
    /// through 63.
    pub const TIMESTAMP_MASK: u64 = (1 << 42) - 1;

    /// Bitmask for extracting the 5-bit salt field. Occupies bits 17 through
    /// 21.
    pub const SALT_MASK: u64 = (1 << 5) - 1;

    /// Bitmask for extracting the 5-bit machine ID field. Occupies bits 12
    /// through 16.
    pub const MACHINE_ID_MASK: u64 = (1 << 5) - 1;

    /// Bitmask for extracting the 12-bit sequence field. Occupies bits 0
    /// through 11.
    pub const SEQUENCE_MASK: u64 = (1 << 12) - 1;

    /// Number of bits to shift the timestamp to its correct position (bit 22).
    pub const TIMESTAMP_SHIFT: u64 = 22;

    /// Number of bits to shift the salt to its correct position (bit 17).
    pub const SALT_SHIFT: u64 = 17;

    /// Number of bits to shift the machine ID to its correct position (bit
    /// 12).
    pub const MACHINE_ID_SHIFT: u64 = 12;

    /// Number of bits to shift the sequence field (bit 0).
    pub const SEQUENCE_SHIFT: u64 = 0;

    /// Constructs a new ID from its components.
    ///
    /// Every component is masked to its field width before packing, so
    /// overlong inputs truncate to their low bits rather than corrupting
    /// neighboring fields.
    pub const fn from_components(timestamp: u64, salt: u64, machine_id: u64, sequence: u64) -> Self {
        let timestamp = (timestamp & Self::TIMESTAMP_MASK) << Self::TIMESTAMP_SHIFT;
        let salt = (salt & Self::SALT_MASK) << Self::SALT_SHIFT;
        let machine_id = (machine_id & Self::MACHINE_ID_MASK) << Self::MACHINE_ID_SHIFT;
        let sequence = (sequence & Self::SEQUENCE_MASK) << Self::SEQUENCE_SHIFT;
        Self {
            id: timestamp | salt | machine_id | sequence,
        }
    }

    /// Extracts the timestamp from the packed ID.
    pub const fn timestamp(&self) -> u64 {
        (self.id >> Self::TIMESTAMP_SHIFT) & Self::TIMESTAMP_MASK
    }

    /// Extracts the salt from the packed ID.
    pub const fn salt(&self) -> u64 {
        (self.id >> Self::SALT_SHIFT) & Self::SALT_MASK
    }

    /// Extracts the machine ID from the packed ID.
    pub const fn machine_id(&self) -> u64 {
        (self.id >> Self::MACHINE_ID_SHIFT) & Self::MACHINE_ID_MASK
    }

    /// Extracts the sequence number from the packed ID.
    pub const fn sequence(&self) -> u64 {
        (self.id >> Self::SEQUENCE_SHIFT) & Self::SEQUENCE_MASK
    }

    /// Returns the ID as its raw `u64` representation.
    ///
    /// This is the value a caller persists as an opaque primary key.
    pub const fn to_raw(&self) -> u64 {
        self.id
    }

    /// Reconstructs an ID from its raw `u64` representation.
    pub const fn from_raw(raw: u64) -> Self {
        Self { id: raw }
    }

    /// Returns the ID as a zero-padded 20-digit string.
    pub fn to_padded_string(&self) -> String {
        format!("{:020}", self.id)
    }
}

impl From<SnowflakeId> for u64 {
    fn from(id: SnowflakeId) -> Self {
        id.to_raw()
    }
}

impl From<u64> for SnowflakeId {
    fn from(raw: u64) -> Self {
        Self::from_raw(raw)
    }
}

impl fmt::Display for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl fmt::Debug for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnowflakeId")
            .field("raw", &format_args!("0x{:016x}", self.id))
            .field("timestamp", &self.timestamp())
            .field("salt", &self.salt())
            .field("machine_id", &self.machine_id())
            .field("sequence", &self.sequence())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_round_trips_all_fields() {
        let id = SnowflakeId::from_components(123_456_789_012, 0b10101, 0b01010, 4095);
        assert_eq!(id.timestamp(), 123_456_789_012);
        assert_eq!(id.salt(), 0b10101);
        assert_eq!(id.machine_id(), 0b01010);
        assert_eq!(id.sequence(), 4095);
    }

    #[test]
    fn packing_matches_shift_or_formula() {
        let (ts, salt, machine, seq) = (1_000_000, 7, 3, 42);
        let id = SnowflakeId::from_components(ts, salt, machine, seq);
        assert_eq!(id.to_raw(), (ts << 22) | (salt << 17) | (machine << 12) | seq);
    }

    #[test]
    fn oversized_components_truncate_to_low_bits() {
        let id = SnowflakeId::from_components(0, 0x20, 0x3F, 0x1000);
        assert_eq!(id.salt(), 0);
        assert_eq!(id.machine_id(), 0x1F);
        assert_eq!(id.sequence(), 0);
        assert_eq!(id.timestamp(), 0);
    }

    #[test]
    fn max_components_fill_but_never_overflow_64_bits() {
        let id = SnowflakeId::from_components(
            SnowflakeId::TIMESTAMP_MASK,
            SnowflakeId::SALT_MASK,
            SnowflakeId::MACHINE_ID_MASK,
            SnowflakeId::SEQUENCE_MASK,
        );
        assert_eq!(id.to_raw(), u64::MAX);
        assert_eq!(id.timestamp(), SnowflakeId::TIMESTAMP_MASK);
    }

    #[test]
    fn raw_round_trip() {
        let id = SnowflakeId::from_components(42, 1, 2, 3);
        assert_eq!(SnowflakeId::from_raw(id.to_raw()), id);
        assert_eq!(u64::from(id), id.to_raw());
    }

    #[test]
    fn later_millisecond_compares_greater() {
        // Sequence wrapped back to zero on the later id; the timestamp still
        // dominates the ordering.
        let earlier = SnowflakeId::from_components(100, 31, 31, 4095);
        let later = SnowflakeId::from_components(102, 0, 0, 0);
        assert!(later > earlier);
    }

    #[test]
    fn display_and_padded_string() {
        let id = SnowflakeId::from_raw(12345);
        assert_eq!(id.to_string(), "12345");
        assert_eq!(id.to_padded_string(), "00000000000000012345");
        assert_eq!(id.to_padded_string().len(), 20);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_round_trip() {
        let id = SnowflakeId::from_components(987_654, 5, 9, 77);
        let json = serde_json::to_string(&id).unwrap();
        let back: SnowflakeId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
