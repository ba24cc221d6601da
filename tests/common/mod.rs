#![allow(dead_code)]

use std::hash::Hasher;
use std::sync::Once;

use env_logger::Builder;
use log::LevelFilter;

static INIT: Once = Once::new();

pub fn initialize_logger() {
    INIT.call_once_force(|_| {
        let mut builder = Builder::new();

        builder
            .filter_level(LevelFilter::Info)
            .format_timestamp_millis()
            .is_test(true)
            .parse_default_env();

        let _ = builder.try_init();
    });
}

/// Keeps only the low `BITS` bits of an integer key, so many keys collide
/// on a short hash and the split paths get exercised heavily
#[derive(Default)]
pub struct TruncatingHasher<const BITS: u32>(u64);

impl<const BITS: u32> Hasher for TruncatingHasher<BITS> {
    fn finish(&self) -> u64 {
        self.0 & ((1u64 << BITS) - 1)
    }

    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.0 = self.0.rotate_left(8) ^ u64::from(byte);
        }
    }

    fn write_u64(&mut self, i: u64) {
        self.0 = i;
    }
}
