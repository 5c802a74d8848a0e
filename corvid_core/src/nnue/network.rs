//! Parses the embedded network weight blob into typed slices.
//!
//! The blob is a flat little-endian `i16` array laid out as, in order:
//! `INPUT_SIZE * HIDDEN` L0 weights (feature-major: all 256 hidden weights
//! for feature 0, then feature 1, ...), `HIDDEN` L0 biases, `HIDDEN` "us"
//! L1 weights, `HIDDEN` "them" L1 weights, and finally a single L1 bias.

use once_cell::sync::OnceCell;

use super::{FEATURES_PER_BUCKET, HIDDEN, INPUT_SIZE, KING_BUCKETS};

const RAW_BYTES: &[u8] = include_bytes!("../../resources/net.bin");

const L0_WEIGHTS_LEN: usize = INPUT_SIZE * HIDDEN;
const L0_BIAS_LEN: usize = HIDDEN;
const L1_WEIGHTS_LEN: usize = HIDDEN * 2;
const L1_BIAS_LEN: usize = 1;
const TOTAL_I16S: usize =
    L0_WEIGHTS_LEN + L0_BIAS_LEN + L1_WEIGHTS_LEN + L1_BIAS_LEN;

/// Parsed, ready-to-use network weights.
pub struct Network {
    l0_weights: Vec<i16>,
    pub(super) l0_bias: Vec<i16>,
    pub(super) l1_weight_us: Vec<i16>,
    pub(super) l1_weight_them: Vec<i16>,
    pub(super) l1_bias: i16,
}

impl Network {
    fn parse(bytes: &[u8]) -> Network {
        assert_eq!(
            bytes.len(),
            TOTAL_I16S * 2,
            "net.bin has {} bytes, expected {} for a {}-bucket/{}-hidden network",
            bytes.len(),
            TOTAL_I16S * 2,
            KING_BUCKETS,
            HIDDEN
        );
        let mut values = Vec::with_capacity(TOTAL_I16S);
        for chunk in bytes.chunks_exact(2) {
            values.push(i16::from_le_bytes([chunk[0], chunk[1]]));
        }

        let mut cursor = 0usize;
        let l0_weights = values[cursor..cursor + L0_WEIGHTS_LEN].to_vec();
        cursor += L0_WEIGHTS_LEN;
        let l0_bias = values[cursor..cursor + L0_BIAS_LEN].to_vec();
        cursor += L0_BIAS_LEN;
        let l1_weight_us = values[cursor..cursor + HIDDEN].to_vec();
        cursor += HIDDEN;
        let l1_weight_them = values[cursor..cursor + HIDDEN].to_vec();
        cursor += HIDDEN;
        let l1_bias = values[cursor];

        Network {
            l0_weights,
            l0_bias,
            l1_weight_us,
            l1_weight_them,
            l1_bias,
        }
    }

    /// The `HIDDEN` weights feeding hidden neurons from input `feature`.
    #[inline]
    pub(super) fn l0_weight_row(&self, feature: usize) -> &[i16] {
        let start = feature * HIDDEN;
        &self.l0_weights[start..start + HIDDEN]
    }
}

static NETWORK_CELL: OnceCell<Network> = OnceCell::new();

/// Lazily-parsed handle to the embedded network. Parsing happens once, the
/// first time any evaluation is requested.
pub struct NetworkHandle;

impl NetworkHandle {
    #[inline]
    pub fn get(&self) -> &'static Network {
        NETWORK_CELL.get_or_init(|| Network::parse(RAW_BYTES))
    }
}

/// Global handle to the embedded network weights.
pub static NETWORK: NetworkHandle = NetworkHandle;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_embedded_blob_without_panicking() {
        let net = NETWORK.get();
        assert_eq!(net.l0_bias.len(), HIDDEN);
        assert_eq!(net.l1_weight_us.len(), HIDDEN);
        assert_eq!(net.l1_weight_them.len(), HIDDEN);
    }

    #[test]
    fn weight_row_has_expected_width() {
        let net = NETWORK.get();
        assert_eq!(net.l0_weight_row(0).len(), HIDDEN);
        assert_eq!(net.l0_weight_row(FEATURES_PER_BUCKET - 1).len(), HIDDEN);
    }
}
