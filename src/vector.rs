//! Scalar kernels for embedding similarity: dot product, cosine similarity,
//! Euclidean distance, and a batched cosine similarity sweep.
//!
//! Ported from `conduit_vector_ops.c`'s scalar fallback path. The original
//! also carries an Accelerate/vDSP path behind `CONDUIT_HAS_ACCELERATE`;
//! that's a macOS-only SIMD backend with no portable Rust equivalent in this
//! crate's dependency stack, so only the scalar path is carried over here
//! (see DESIGN.md).

/// Dot product of `a` and `b`. Returns `0.0` for zero-length vectors.
///
/// # Panics
///
/// Panics if `a.len() != b.len()`.
pub fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    assert_eq!(a.len(), b.len(), "vector length mismatch");
    if a.is_empty() {
        return 0.0;
    }
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Cosine similarity of `a` and `b`, in `[-1.0, 1.0]`. Returns `0.0` if
/// either vector has zero magnitude, matching the reference implementation
/// rather than producing `NaN`.
///
/// # Panics
///
/// Panics if `a.len() != b.len()`.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    assert_eq!(a.len(), b.len(), "vector length mismatch");
    if a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (&x, &y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom > 0.0 {
        dot / denom
    } else {
        0.0
    }
}

/// Euclidean (L2) distance between `a` and `b`. Returns `0.0` for
/// zero-length vectors.
///
/// # Panics
///
/// Panics if `a.len() != b.len()`.
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    assert_eq!(a.len(), b.len(), "vector length mismatch");
    if a.is_empty() {
        return 0.0;
    }
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum::<f32>()
        .sqrt()
}

/// Computes cosine similarity between `query` and each of `count` vectors
/// packed contiguously in `vectors` (row-major, `dimensions` floats per
/// row), writing one result per row into `results`.
///
/// If `query` has zero magnitude, every result is `0.0`. A no-op if
/// `dimensions == 0` or `vectors` is empty.
///
/// # Panics
///
/// Panics if `vectors.len()` is not a multiple of `dimensions`, or if
/// `results.len()` does not match the row count.
pub fn cosine_similarity_batch(query: &[f32], vectors: &[f32], dimensions: usize, results: &mut [f32]) {
    if dimensions == 0 || vectors.is_empty() {
        return;
    }
    assert_eq!(
        vectors.len() % dimensions,
        0,
        "vectors length must be a multiple of dimensions"
    );
    assert_eq!(query.len(), dimensions, "query length must equal dimensions");
    let count = vectors.len() / dimensions;
    assert_eq!(results.len(), count, "results length must equal row count");

    let query_norm_sq: f32 = query.iter().map(|x| x * x).sum();
    let query_norm = query_norm_sq.sqrt();

    if query_norm == 0.0 {
        results.fill(0.0);
        return;
    }

    for (row, result) in vectors.chunks_exact(dimensions).zip(results.iter_mut()) {
        let mut dot = 0.0f32;
        let mut vec_norm_sq = 0.0f32;
        for (&q, &v) in query.iter().zip(row) {
            dot += q * v;
            vec_norm_sq += v * v;
        }
        let vec_norm = vec_norm_sq.sqrt();
        *result = if vec_norm > 0.0 {
            dot / (query_norm * vec_norm)
        } else {
            0.0
        };
    }
}

/// Owning convenience wrapper over [`cosine_similarity_batch`].
pub fn cosine_similarity_batch_to_vec(query: &[f32], vectors: &[f32], dimensions: usize) -> Vec<f32> {
    let count = if dimensions == 0 { 0 } else { vectors.len() / dimensions };
    let mut results = vec![0.0f32; count];
    cosine_similarity_batch(query, vectors, dimensions, &mut results);
    results
}
