//! Packet identifiers
//!
//! A packet id is packed into one `uint256` so contracts can carry it in a single word:
//!
//! ```text
//!   | local chain slug | capacitor address | counter |
//!   |    slug_bits     |   address_bits    | counter_bits |
//!   ^ most significant                      least significant ^
//! ```
//!
//! The default layout (32 / 160 / 64) fills the word exactly.

pub mod errors;

use alloy_primitives::{Address, B256, U256};
use std::fmt;

use crate::chains::ChainSlug;

pub use errors::EncodingError;

/// Bit widths of the three packet id fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketIdLayout {
    /// Width of the local chain slug (high bits)
    pub slug_bits: u32,
    /// Width of the capacitor address (middle bits)
    pub address_bits: u32,
    /// Width of the counter (low bits)
    pub counter_bits: u32,
}

impl PacketIdLayout {
    /// 32-bit slug, full 160-bit address, 64-bit counter.
    pub const DEFAULT: Self = Self {
        slug_bits: 32,
        address_bits: 160,
        counter_bits: 64,
    };

    /// Build a validated layout.
    pub fn new(
        slug_bits: u32,
        address_bits: u32,
        counter_bits: u32,
    ) -> Result<Self, EncodingError> {
        let layout = Self {
            slug_bits,
            address_bits,
            counter_bits,
        };
        layout.validate()?;
        Ok(layout)
    }

    /// Check widths against the field types and the 256-bit word.
    pub fn validate(&self) -> Result<(), EncodingError> {
        if self.slug_bits == 0 || self.address_bits == 0 || self.counter_bits == 0 {
            return Err(EncodingError::InvalidLayout("field widths must be non-zero"));
        }
        if self.slug_bits > 32 {
            return Err(EncodingError::InvalidLayout("slug width exceeds 32 bits"));
        }
        if self.address_bits > 160 {
            return Err(EncodingError::InvalidLayout("address width exceeds 160 bits"));
        }
        if self.counter_bits > 64 {
            return Err(EncodingError::InvalidLayout("counter width exceeds 64 bits"));
        }
        if self.total_bits() > 256 {
            return Err(EncodingError::InvalidLayout("layout exceeds 256 bits"));
        }
        Ok(())
    }

    /// Sum of the three widths.
    pub const fn total_bits(&self) -> u32 {
        self.slug_bits + self.address_bits + self.counter_bits
    }

    /// Largest counter representable in this layout.
    pub fn max_counter(&self) -> u64 {
        if self.counter_bits >= 64 {
            u64::MAX
        } else {
            (1u64 << self.counter_bits) - 1
        }
    }

    /// Pack the three fields into one word.
    pub fn pack(
        &self,
        local_slug: ChainSlug,
        capacitor: Address,
        counter: u64,
    ) -> Result<U256, EncodingError> {
        self.validate()?;

        if capacitor == Address::ZERO {
            return Err(EncodingError::ZeroCapacitor);
        }
        if u64::from(local_slug.get()) > max_for_bits(self.slug_bits) {
            return Err(EncodingError::SlugOverflow {
                slug: local_slug.get(),
                bits: self.slug_bits,
            });
        }
        if counter > self.max_counter() {
            return Err(EncodingError::CounterOverflow {
                counter,
                bits: self.counter_bits,
            });
        }

        let address_value = U256::from_be_slice(capacitor.as_slice());
        if address_value > mask(self.address_bits) {
            return Err(EncodingError::AddressOverflow {
                bits: self.address_bits,
            });
        }

        let slug_shift = (self.address_bits + self.counter_bits) as usize;
        let address_shift = self.counter_bits as usize;

        Ok((U256::from(local_slug.get()) << slug_shift)
            | (address_value << address_shift)
            | U256::from(counter))
    }

    /// Split a packed word back into its fields.
    pub fn unpack(&self, packed: U256) -> Result<PacketId, EncodingError> {
        self.validate()?;

        if packed > mask(self.total_bits()) {
            return Err(EncodingError::ExcessBits {
                total_bits: self.total_bits(),
            });
        }

        let counter_shift = self.counter_bits as usize;
        let slug_shift = (self.address_bits + self.counter_bits) as usize;

        let counter = packed & mask(self.counter_bits);
        let address = (packed >> counter_shift) & mask(self.address_bits);
        let slug = packed >> slug_shift;

        Ok(PacketId {
            local_slug: ChainSlug(slug.to::<u32>()),
            capacitor: Address::from_word(B256::from(address.to_be_bytes::<32>())),
            counter: counter.to::<u64>(),
        })
    }
}

impl Default for PacketIdLayout {
    fn default() -> Self {
        Self::DEFAULT
    }
}

fn max_for_bits(bits: u32) -> u64 {
    if bits >= 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

fn mask(bits: u32) -> U256 {
    if bits >= 256 {
        U256::MAX
    } else {
        (U256::from(1) << bits as usize) - U256::from(1)
    }
}

/// Structured packet identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PacketId {
    /// Chain the packet was created on
    pub local_slug: ChainSlug,
    /// Capacitor that accumulated the packet
    pub capacitor: Address,
    /// Per-capacitor packet counter
    pub counter: u64,
}

impl PacketId {
    /// Create a packet id.
    pub fn new(local_slug: ChainSlug, capacitor: Address, counter: u64) -> Self {
        Self {
            local_slug,
            capacitor,
            counter,
        }
    }

    /// Pack with the default layout.
    pub fn pack(&self) -> Result<U256, EncodingError> {
        self.pack_with(&PacketIdLayout::DEFAULT)
    }

    /// Pack with a specific layout.
    pub fn pack_with(&self, layout: &PacketIdLayout) -> Result<U256, EncodingError> {
        layout.pack(self.local_slug, self.capacitor, self.counter)
    }

    /// Unpack with the default layout.
    pub fn unpack(packed: U256) -> Result<Self, EncodingError> {
        PacketIdLayout::DEFAULT.unpack(packed)
    }

    /// Id of the packet following this one on the same capacitor.
    ///
    /// Counters are never reused, so running out of counter space is an error.
    pub fn next(&self, layout: &PacketIdLayout) -> Result<Self, EncodingError> {
        if self.counter >= layout.max_counter() {
            return Err(EncodingError::CounterOverflow {
                counter: self.counter,
                bits: layout.counter_bits,
            });
        }
        Ok(Self {
            counter: self.counter + 1,
            ..*self
        })
    }
}

impl fmt::Display for PacketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.local_slug, self.capacitor, self.counter)
    }
}

/// Parse a capacitor address string (with or without `0x`).
pub fn parse_capacitor(input: &str) -> Result<Address, EncodingError> {
    let address = input
        .trim()
        .parse::<Address>()
        .map_err(|_| EncodingError::InvalidAddress(input.to_string()))?;
    if address == Address::ZERO {
        return Err(EncodingError::ZeroCapacitor);
    }
    Ok(address)
}
