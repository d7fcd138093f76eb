//! Sharded string interner.
//!
//! O(1) interning and lookup with thread-safe concurrent access via
//! per-shard locking, so a single interner can be shared by multiple
//! engines compiling concurrently.

use crate::Name;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

const SHARD_BITS: u32 = 4;
const SHARD_COUNT: usize = 1 << SHARD_BITS;

struct Shard {
    map: FxHashMap<String, u32>,
    strings: Vec<String>,
}

impl Shard {
    fn new() -> Self {
        Shard {
            map: FxHashMap::default(),
            strings: Vec::new(),
        }
    }
}

/// Sharded string interner: identifiers and string-literal contents become
/// `Name(u32)` handles with O(1) equality and hashing.
pub struct StringInterner {
    shards: Vec<RwLock<Shard>>,
}

impl Default for StringInterner {
    fn default() -> Self {
        StringInterner {
            shards: (0..SHARD_COUNT).map(|_| RwLock::new(Shard::new())).collect(),
        }
    }
}

impl StringInterner {
    pub fn new() -> Self {
        Self::default()
    }

    fn shard_index(s: &str) -> usize {
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for b in s.as_bytes() {
            hash ^= u64::from(*b);
            hash = hash.wrapping_mul(0x0000_0100_0000_01B3);
        }
        (hash as usize) & (SHARD_COUNT - 1)
    }

    /// Intern `s`, returning its stable `Name`.
    pub fn intern(&self, s: &str) -> Name {
        let shard_idx = Self::shard_index(s);
        {
            let shard = self.shards[shard_idx].read();
            if let Some(&local) = shard.map.get(s) {
                return Name(pack(shard_idx, local));
            }
        }
        let mut shard = self.shards[shard_idx].write();
        if let Some(&local) = shard.map.get(s) {
            return Name(pack(shard_idx, local));
        }
        let local = shard.strings.len() as u32;
        shard.strings.push(s.to_string());
        shard.map.insert(s.to_string(), local);
        Name(pack(shard_idx, local))
    }

    /// Resolve a previously-interned `Name` back to its text.
    ///
    /// # Panics
    /// Panics if `name` was not produced by this interner.
    pub fn resolve(&self, name: Name) -> String {
        let (shard_idx, local) = unpack(name.0);
        let shard = self.shards[shard_idx].read();
        shard.strings[local as usize].clone()
    }
}

fn pack(shard_idx: usize, local: u32) -> u32 {
    debug_assert!(local < (1 << (32 - SHARD_BITS)));
    ((shard_idx as u32) << (32 - SHARD_BITS)) | local
}

fn unpack(packed: u32) -> (usize, u32) {
    let shard_idx = (packed >> (32 - SHARD_BITS)) as usize;
    let local = packed & ((1 << (32 - SHARD_BITS)) - 1);
    (shard_idx, local)
}

/// A `StringInterner` shared across an engine's compilations.
pub type SharedInterner = std::sync::Arc<StringInterner>;
