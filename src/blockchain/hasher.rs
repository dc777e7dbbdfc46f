use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

/// Domain tag prefixed to every block preimage.
const DOMAIN_TAG: &[u8] = b"pow-block/v1";

/// A 32-byte SHA-256 block digest. Displayed and serialized as lowercase hex.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BlockHash([u8; 32]);

impl BlockHash {
    /// The all-zero digest, used as the genesis block's predecessor.
    pub const ZERO: BlockHash = BlockHash([0u8; 32]);

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Number of leading `0` characters in the hex rendering.
    pub fn leading_zero_nibbles(&self) -> u32 {
        let mut count = 0;
        for byte in self.0 {
            if byte == 0 {
                count += 2;
                continue;
            }
            if byte >> 4 == 0 {
                count += 1;
            }
            break;
        }
        count
    }

    /// A digest qualifies for `difficulty` iff its first `difficulty` hex
    /// characters are all `0`.
    pub fn meets_difficulty(&self, difficulty: u32) -> bool {
        self.leading_zero_nibbles() >= difficulty
    }
}

impl fmt::Display for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockHash({})", self.to_hex())
    }
}

impl FromStr for BlockHash {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl Serialize for BlockHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for BlockHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Hash the canonical encoding of a block's fields and a candidate nonce.
///
/// The preimage is the domain tag followed by `index` (u64 BE), the 32 raw
/// bytes of `previous`, `timestamp` (i64 BE), the payload length (u64 BE)
/// and payload bytes, and finally `nonce` (u64 BE). The payload is the only
/// variable-length field and it is length-prefixed, so distinct field tuples
/// never share a preimage.
pub fn digest(
    index: u64,
    previous: &BlockHash,
    timestamp: i64,
    payload: &[u8],
    nonce: u64,
) -> BlockHash {
    let mut hasher = Sha256::new();
    hasher.update(DOMAIN_TAG);
    hasher.update(index.to_be_bytes());
    hasher.update(previous.as_bytes());
    hasher.update(timestamp.to_be_bytes());
    hasher.update((payload.len() as u64).to_be_bytes());
    hasher.update(payload);
    hasher.update(nonce.to_be_bytes());
    BlockHash(hasher.finalize().into())
}
