// Vector index module
// Exact nearest-neighbour search over the corpus embeddings

#[cfg(test)]
mod tests;

use tracing::debug;

use crate::{RagError, Result};

/// A single nearest-neighbour result
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchHit {
    /// Row id, which is also the position of the chunk in the corpus
    pub id: usize,
    /// Squared Euclidean distance to the query
    pub distance: f32,
}

/// Flat (brute-force) index over fixed-dimension vectors.
///
/// Row `i` holds the embedding of corpus chunk `i`. Search cost is linear in
/// the number of rows.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatIndex {
    dimension: usize,
    vectors: Vec<Vec<f32>>,
}

impl FlatIndex {
    /// Build an index whose dimension is taken from the first vector
    #[inline]
    pub fn build(vectors: Vec<Vec<f32>>) -> Result<Self> {
        let dimension = match vectors.first() {
            Some(first) if !first.is_empty() => first.len(),
            Some(_) => {
                return Err(RagError::InvalidArgument(
                    "cannot index zero-length vectors".to_string(),
                ));
            }
            None => {
                return Err(RagError::InvalidArgument(
                    "cannot build an index from zero vectors".to_string(),
                ));
            }
        };

        if let Some((row, vector)) = vectors
            .iter()
            .enumerate()
            .find(|(_, v)| v.len() != dimension)
        {
            return Err(RagError::DimensionMismatch {
                expected: dimension,
                found: vector.len(),
                row,
            });
        }

        debug!(
            "Built flat index with {} vectors of dimension {}",
            vectors.len(),
            dimension
        );

        Ok(Self { dimension, vectors })
    }

    /// Append a vector as the next row, returning its row id
    #[inline]
    pub fn append(&mut self, vector: Vec<f32>) -> Result<usize> {
        if vector.len() != self.dimension {
            return Err(RagError::DimensionMismatch {
                expected: self.dimension,
                found: vector.len(),
                row: self.vectors.len(),
            });
        }

        self.vectors.push(vector);
        Ok(self.vectors.len() - 1)
    }

    /// Find the `k` nearest rows to `query`.
    ///
    /// Results are ordered by ascending squared Euclidean distance, with ties
    /// broken by the lower row id.
    #[inline]
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        if k == 0 || k > self.vectors.len() {
            return Err(RagError::InvalidArgument(format!(
                "k must be between 1 and {}, got {}",
                self.vectors.len(),
                k
            )));
        }

        if query.len() != self.dimension {
            return Err(RagError::DimensionMismatch {
                expected: self.dimension,
                found: query.len(),
                row: 0,
            });
        }

        let mut hits = self
            .vectors
            .iter()
            .enumerate()
            .map(|(id, vector)| SearchHit {
                id,
                distance: squared_l2(query, vector),
            })
            .collect::<Vec<_>>();

        hits.sort_unstable_by(|a, b| a.distance.total_cmp(&b.distance).then(a.id.cmp(&b.id)));
        hits.truncate(k);

        Ok(hits)
    }

    #[inline]
    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).fold(0.0, |acc, (x, y)| {
        let diff = x - y;
        diff.mul_add(diff, acc)
    })
}
