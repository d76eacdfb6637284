use thiserror::Error;

/// Errors raised while packing or unpacking a packet id
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodingError {
    /// Counter does not fit the layout's counter width
    #[error("Packet counter {counter} exceeds {bits}-bit width")]
    CounterOverflow {
        /// Offending counter
        counter: u64,
        /// Configured width
        bits: u32,
    },

    /// Chain slug does not fit the layout's slug width
    #[error("Chain slug {slug} exceeds {bits}-bit width")]
    SlugOverflow {
        /// Offending slug
        slug: u32,
        /// Configured width
        bits: u32,
    },

    /// Capacitor address does not fit a narrowed address width
    #[error("Capacitor address does not fit {bits}-bit width")]
    AddressOverflow {
        /// Configured width
        bits: u32,
    },

    /// The zero address never hosts a capacitor
    #[error("Capacitor address is the zero address")]
    ZeroCapacitor,

    /// Capacitor address string could not be parsed
    #[error("Invalid capacitor address: {0}")]
    InvalidAddress(String),

    /// Packed value has bits set above the layout's total width
    #[error("Packed packet id has bits above the {total_bits}-bit layout")]
    ExcessBits {
        /// Layout width
        total_bits: u32,
    },

    /// Layout widths are not usable
    #[error("Invalid packet id layout: {0}")]
    InvalidLayout(&'static str),
}
