//! The 8x8 inverse discrete cosine transform.
//!
//! This is the direct separable formula rather than a fast (AAN/Loeffler)
//! variant: `out[x][y] = 0.25 * sum_{u,v} C[u][x] * C[v][y] * in[u][v]`,
//! with `C[u][x] = cos((2x+1) u pi / 16)` scaled by `1/sqrt(2)` when
//! `u == 0`. Clarity over speed, since nothing here is on a hot loop that
//! needs SIMD.
use std::f32::consts::PI;

/// `basis[u][x] = C[u][x]` from the formula above, precomputed once.
fn cosine_basis() -> [[f32; 8]; 8] {
    let mut basis = [[0f32; 8]; 8];
    for u in 0..8 {
        let scale = if u == 0 { 1.0 / std::f32::consts::SQRT_2 } else { 1.0 };
        for x in 0..8 {
            basis[u][x] = scale * ((2 * x + 1) as f32 * u as f32 * PI / 16.0).cos();
        }
    }
    basis
}

/// Apply the inverse DCT to a dequantized, natural-order (not zig-zag) 8x8
/// block of coefficients, returning the spatial-domain samples in the same
/// row-major layout.
pub(crate) fn idct_8x8(block: &[i32; 64]) -> [f32; 64] {
    let basis = cosine_basis();
    let mut out = [0f32; 64];

    for x in 0..8 {
        for y in 0..8 {
            let mut sum = 0f32;
            for u in 0..8 {
                for v in 0..8 {
                    let coeff = block[u * 8 + v] as f32;
                    if coeff == 0.0 {
                        continue;
                    }
                    sum += basis[u][x] * basis[v][y] * coeff;
                }
            }
            out[x * 8 + y] = 0.25 * sum;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dc_only_block_is_flat() {
        let mut block = [0i32; 64];
        block[0] = 8; // DC-only input should produce a perfectly flat plane
        let out = idct_8x8(&block);
        let expected = out[0];
        for v in out.iter() {
            assert!((v - expected).abs() < 1e-3);
        }
    }

    #[test]
    fn all_zero_block_is_zero() {
        let block = [0i32; 64];
        let out = idct_8x8(&block);
        assert!(out.iter().all(|&v| v == 0.0));
    }
}
