#![allow(dead_code)]

use std::path::PathBuf;

pub fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(std::env::var("CARGO_MANIFEST_DIR").unwrap());
    path.push("tests/fixtures");
    path.push(name);
    path
}

/// Packs fields MSB-first into bytes, zero padding the final byte.
#[derive(Default)]
pub struct BitWriter {
    bits: Vec<bool>,
}

impl BitWriter {
    pub fn uint(mut self, value: u64, width: u8) -> Self {
        self.bits
            .extend((0..width).rev().map(|i| (value >> i) & 1 == 1));
        self
    }

    pub fn int(self, value: i64, width: u8) -> Self {
        self.uint(value as u64, width)
    }

    pub fn len_bits(&self) -> usize {
        self.bits.len()
    }

    pub fn finish(self) -> Vec<u8> {
        self.bits
            .chunks(8)
            .map(|chunk| {
                chunk
                    .iter()
                    .enumerate()
                    .fold(0u8, |acc, (i, b)| acc | (u8::from(*b) << (7 - i)))
            })
            .collect()
    }
}

/// An MSM7 payload with the given masks. Every block field is filled with a value
/// derived from its block index so blocks can be told apart.
pub fn msm7_payload(type_code: u16, satellite_mask: u64, signal_mask: u32, cells: &[bool]) -> Vec<u8> {
    let nsat = satellite_mask.count_ones() as u64;
    let nsig = signal_mask.count_ones() as u64;
    assert_eq!(cells.len() as u64, nsat * nsig);

    let mut w = BitWriter::default()
        .uint(type_code.into(), 12)
        .uint(1234, 12)
        .uint(518_400_000, 30)
        .uint(0, 1)
        .uint(0, 3)
        .uint(0, 7)
        .uint(0, 2)
        .uint(0, 2)
        .uint(0, 1)
        .uint(0, 3)
        .uint(satellite_mask, 64)
        .uint(signal_mask.into(), 32);
    for cell in cells {
        w = w.uint(u64::from(*cell), 1);
    }
    for sat in 0..nsat {
        w = w.uint(60 + sat, 8).uint(0, 4).uint(sat, 10).int(-(sat as i64), 14);
    }
    for sig in 0..nsig {
        w = w
            .int(-(sig as i64) * 100, 20)
            .int(sig as i64 * 1000, 24)
            .uint(sig, 10)
            .uint(sig & 1, 1)
            .uint(640 + sig, 10)
            .int(-(sig as i64), 15);
    }
    w.finish()
}
