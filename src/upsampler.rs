//! Chroma upsampling: nearest-neighbor replication of a subsampled
//! component's 8x8 reconstructed tile into the full MCU pixel region.
//!
//! Production libjpeg-style decoders use fancy (bilinear) upsampling;
//! this decoder intentionally does the simpler nearest-neighbor
//! replication, which is what the reconstruction pipeline specifies.

/// No subsampling: the tile is already at full resolution.
pub(crate) fn upsample_no_op(tile: &[i16], _h_factor: usize, _v_factor: usize) -> Vec<i16> {
    tile.to_vec()
}

/// Replicate each sample `h_factor` times horizontally and `v_factor` times
/// vertically. `tile` is a flat 8x8 (64-entry) row-major block.
pub(crate) fn upsample_nearest(tile: &[i16], h_factor: usize, v_factor: usize) -> Vec<i16> {
    if h_factor == 1 && v_factor == 1 {
        return upsample_no_op(tile, 1, 1);
    }
    let out_w = 8 * h_factor;
    let out_h = 8 * v_factor;
    let mut out = vec![0i16; out_w * out_h];

    for row in 0..out_h {
        let src_row = row / v_factor;
        for col in 0..out_w {
            let src_col = col / h_factor;
            out[row * out_w + col] = tile[src_row * 8 + src_col];
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_op_is_identity() {
        let tile: Vec<i16> = (0..64).collect();
        assert_eq!(upsample_no_op(&tile, 1, 1), tile);
    }

    #[test]
    fn horizontal_and_vertical_replication() {
        let mut tile = [0i16; 64];
        tile[0] = 7; // top-left sample
        let out = upsample_nearest(&tile, 2, 2);
        assert_eq!(out.len(), 16 * 16);
        // the 2x2 block at the top-left of the output should all be 7
        assert_eq!(out[0], 7);
        assert_eq!(out[1], 7);
        assert_eq!(out[16], 7);
        assert_eq!(out[17], 7);
        // one step further right/down should fall back into the (0,1)/(1,0) source sample (0)
        assert_eq!(out[2], 0);
    }
}
