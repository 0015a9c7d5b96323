// ============================================================================
// Key Partitioner
// ============================================================================
//
// Kafka's default murmur2 key hash, as used by the Java client and by
// librdkafka's `murmur2_random` partitioner. Records sharing a key always
// land on the same partition for a fixed partition count.
//
// ============================================================================

const SEED: u32 = 0x9747_b28c;
const M: u32 = 0x5bd1_e995;
const R: u32 = 24;

/// 32-bit murmur2 hash compatible with `org.apache.kafka.common.utils.Utils.murmur2`
pub fn murmur2(data: &[u8]) -> u32 {
    let mut h: u32 = SEED ^ (data.len() as u32);

    let chunks = data.chunks_exact(4);
    let tail = chunks.remainder();
    for chunk in chunks {
        let mut k = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        k = k.wrapping_mul(M);
        k ^= k >> R;
        k = k.wrapping_mul(M);

        h = h.wrapping_mul(M);
        h ^= k;
    }

    match tail.len() {
        3 => {
            h ^= (tail[2] as u32) << 16;
            h ^= (tail[1] as u32) << 8;
            h ^= tail[0] as u32;
            h = h.wrapping_mul(M);
        }
        2 => {
            h ^= (tail[1] as u32) << 8;
            h ^= tail[0] as u32;
            h = h.wrapping_mul(M);
        }
        1 => {
            h ^= tail[0] as u32;
            h = h.wrapping_mul(M);
        }
        _ => {}
    }

    h ^= h >> 13;
    h = h.wrapping_mul(M);
    h ^= h >> 15;
    h
}

/// Deterministic key → partition mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyHashPartitioner {
    partition_count: i32,
}

impl KeyHashPartitioner {
    /// Returns `None` for a topic without partitions
    pub fn new(partition_count: i32) -> Option<Self> {
        (partition_count > 0).then_some(Self { partition_count })
    }

    pub fn partition_count(&self) -> i32 {
        self.partition_count
    }

    pub fn partition_for(&self, key: &[u8]) -> i32 {
        ((murmur2(key) & 0x7fff_ffff) % self.partition_count as u32) as i32
    }
}
