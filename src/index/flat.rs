//! Flat (exhaustive) vector index over squared-L2 distance.
//!
//! Per-document corpora are small, hundreds of chunks at most, so an
//! exhaustive scan is both simpler and faster than an approximate structure.
//! Squared L2 preserves the ordering of true L2, so no square root is taken.

use crate::error::{LaereError, Result};

/// Artifact header: magic, format version, dimension, vector count.
const MAGIC: &[u8; 4] = b"LIDX";
const FORMAT_VERSION: u32 = 1;

/// An immutable flat index over fixed-dimension f32 vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatIndex {
    dim: usize,
    /// Row-major vector data, `len * dim` values.
    data: Vec<f32>,
}

/// A single nearest-neighbor hit: vector position and squared-L2 distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub index: usize,
    pub distance: f32,
}

impl FlatIndex {
    /// Build an index from vectors, all of which must have dimension `dim`.
    pub fn from_vectors(dim: usize, vectors: &[Vec<f32>]) -> Result<Self> {
        let mut data = Vec::with_capacity(vectors.len() * dim);
        for vector in vectors {
            if vector.len() != dim {
                return Err(LaereError::DimensionMismatch {
                    expected: dim,
                    actual: vector.len(),
                });
            }
            data.extend_from_slice(vector);
        }
        Ok(Self { dim, data })
    }

    /// The dimension every vector in this index shares.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of vectors in the index.
    pub fn len(&self) -> usize {
        if self.dim == 0 {
            0
        } else {
            self.data.len() / self.dim
        }
    }

    /// Whether the index holds no vectors.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Find the `k` nearest vectors to `query` by squared-L2 distance.
    ///
    /// Returns `min(k, len)` hits ordered nearest first; equidistant vectors
    /// rank by ascending position. An empty index yields an empty list.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Hit>> {
        if query.len() != self.dim {
            return Err(LaereError::DimensionMismatch {
                expected: self.dim,
                actual: query.len(),
            });
        }
        if self.data.is_empty() {
            return Ok(Vec::new());
        }

        let mut hits: Vec<Hit> = self
            .data
            .chunks_exact(self.dim)
            .enumerate()
            .map(|(index, row)| Hit {
                index,
                distance: squared_l2(query, row),
            })
            .collect();

        hits.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.index.cmp(&b.index))
        });
        hits.truncate(k);

        Ok(hits)
    }

    /// Serialize to the on-disk artifact layout.
    ///
    /// Layout: `LIDX` magic, u32 format version, u64 dimension, u64 count,
    /// then `count * dim` f32 values, all little-endian.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(4 + 4 + 8 + 8 + self.data.len() * 4);
        bytes.extend_from_slice(MAGIC);
        bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        bytes.extend_from_slice(&(self.dim as u64).to_le_bytes());
        bytes.extend_from_slice(&(self.len() as u64).to_le_bytes());
        for value in &self.data {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        bytes
    }

    /// Deserialize from the on-disk artifact layout.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let header_len = 4 + 4 + 8 + 8;
        if bytes.len() < header_len {
            return Err(LaereError::Storage(
                "index artifact truncated before header".to_string(),
            ));
        }
        if &bytes[0..4] != MAGIC {
            return Err(LaereError::Storage(
                "index artifact has wrong magic".to_string(),
            ));
        }

        let version = u32::from_le_bytes(bytes[4..8].try_into().unwrap_or_default());
        if version != FORMAT_VERSION {
            return Err(LaereError::Storage(format!(
                "unsupported index format version {}",
                version
            )));
        }

        let dim = u64::from_le_bytes(bytes[8..16].try_into().unwrap_or_default()) as usize;
        let count = u64::from_le_bytes(bytes[16..24].try_into().unwrap_or_default()) as usize;

        let expected_len = header_len + count * dim * 4;
        if bytes.len() != expected_len {
            return Err(LaereError::Storage(format!(
                "index artifact length {} does not match header ({} vectors of dim {})",
                bytes.len(),
                count,
                dim
            )));
        }

        let data = bytes[header_len..]
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes(b.try_into().unwrap_or_default()))
            .collect();

        Ok(Self { dim, data })
    }
}

/// Squared Euclidean distance between two equal-length vectors.
fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index() -> FlatIndex {
        FlatIndex::from_vectors(
            3,
            &[
                vec![1.0, 0.0, 0.0],
                vec![0.0, 1.0, 0.0],
                vec![0.0, 0.0, 1.0],
                vec![1.0, 1.0, 0.0],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_own_vector_is_nearest() {
        let index = sample_index();
        let hits = index.search(&[0.0, 1.0, 0.0], 1).unwrap();

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].index, 1);
        assert_eq!(hits[0].distance, 0.0);
    }

    #[test]
    fn test_distances_non_decreasing() {
        let index = sample_index();
        let hits = index.search(&[0.9, 0.1, 0.0], 4).unwrap();

        assert_eq!(hits.len(), 4);
        for pair in hits.windows(2) {
            assert!(pair[0].distance <= pair[1].distance);
        }
    }

    #[test]
    fn test_ties_break_by_position() {
        let index = FlatIndex::from_vectors(
            2,
            &[vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 0.0]],
        )
        .unwrap();

        // Vectors 0 and 2 are identical; 0 must rank first.
        let hits = index.search(&[1.0, 0.0], 3).unwrap();
        assert_eq!(hits[0].index, 0);
        assert_eq!(hits[1].index, 2);
        assert_eq!(hits[2].index, 1);
    }

    #[test]
    fn test_k_clamped_to_len() {
        let index = sample_index();
        let hits = index.search(&[0.0, 0.0, 0.0], 100).unwrap();
        assert_eq!(hits.len(), 4);
    }

    #[test]
    fn test_empty_index_returns_no_hits() {
        let index = FlatIndex::from_vectors(3, &[]).unwrap();
        let hits = index.search(&[0.0, 0.0, 0.0], 5).unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_dimension_mismatch() {
        let index = sample_index();
        let err = index.search(&[1.0, 0.0], 1).unwrap_err();
        assert!(matches!(
            err,
            LaereError::DimensionMismatch {
                expected: 3,
                actual: 2
            }
        ));

        let err = FlatIndex::from_vectors(3, &[vec![1.0]]).unwrap_err();
        assert!(matches!(err, LaereError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_bytes_round_trip() {
        let index = sample_index();
        let decoded = FlatIndex::from_bytes(&index.to_bytes()).unwrap();

        assert_eq!(decoded, index);
        assert_eq!(decoded.dim(), 3);
        assert_eq!(decoded.len(), 4);
    }

    #[test]
    fn test_corrupt_bytes_rejected() {
        assert!(matches!(
            FlatIndex::from_bytes(b"short"),
            Err(LaereError::Storage(_))
        ));

        let mut bytes = sample_index().to_bytes();
        bytes[0] = b'X';
        assert!(matches!(
            FlatIndex::from_bytes(&bytes),
            Err(LaereError::Storage(_))
        ));

        let mut truncated = sample_index().to_bytes();
        truncated.pop();
        assert!(matches!(
            FlatIndex::from_bytes(&truncated),
            Err(LaereError::Storage(_))
        ));
    }
}
