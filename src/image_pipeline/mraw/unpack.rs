//! Packed 12-bit to 16-bit sample unpacking.
//!
//! MRAW stores two 12-bit samples in every three bytes:
//!
//! ```text
//! byte 0:  a11 a10 a9 a8 a7 a6 a5 a4
//! byte 1:  a3  a2  a1 a0 b11 b10 b9 b8
//! byte 2:  b7  b6  b5 b4 b3  b2  b1 b0
//! ```
//!
//! Triplets never depend on each other, so large buffers are split into
//! contiguous runs of whole triplets and unpacked on the rayon pool, each
//! worker writing its own disjoint slice of the output.

use rayon::prelude::*;
use tracing::trace;

use crate::image_pipeline::common::error::{MrawError, Result};

/// Bytes in one packed group.
pub const BYTES_PER_TRIPLET: usize = 3;

/// Samples produced by one packed group.
pub const SAMPLES_PER_TRIPLET: usize = 2;

/// Triplets handed to a single rayon task.
const TRIPLETS_PER_TASK: usize = 16 * 1024;

/// Below this many triplets the serial loop beats the cost of splitting work.
const PARALLEL_THRESHOLD: usize = 2 * TRIPLETS_PER_TASK;

/// Unpacks `data` into `out` and returns the filled output.
///
/// `data.len()` must be a multiple of 3 and `out.len()` must equal
/// `data.len() / 3 * 2`. Both are checked before anything is written, so a
/// rejected call leaves `out` untouched.
///
/// # Examples
///
/// ```
/// use mraw_rs::image_pipeline::mraw::unpack_12bit;
///
/// let mut out = [0u16; 2];
/// unpack_12bit(&[0xAB, 0xCD, 0xEF], &mut out).unwrap();
/// assert_eq!(out, [0xABC, 0xDEF]);
/// ```
pub fn unpack_12bit<'a>(data: &[u8], out: &'a mut [u16]) -> Result<&'a mut [u16]> {
    check_lengths(data.len(), out.len())?;

    let triplets = data.len() / BYTES_PER_TRIPLET;
    if triplets < PARALLEL_THRESHOLD {
        unpack_serial(data, out);
    } else {
        trace!(triplets, tasks = triplets.div_ceil(TRIPLETS_PER_TASK), "Parallel unpack");
        data.par_chunks(TRIPLETS_PER_TASK * BYTES_PER_TRIPLET)
            .zip(out.par_chunks_mut(TRIPLETS_PER_TASK * SAMPLES_PER_TRIPLET))
            .for_each(|(src, dst)| unpack_serial(src, dst));
    }

    Ok(out)
}

/// Allocates a fresh sample buffer and unpacks `data` into it.
pub fn unpack_12bit_to_vec(data: &[u8]) -> Result<Vec<u16>> {
    if data.len() % BYTES_PER_TRIPLET != 0 {
        return Err(not_whole_triplets(data.len()));
    }
    let mut out = vec![0u16; data.len() / BYTES_PER_TRIPLET * SAMPLES_PER_TRIPLET];
    unpack_12bit(data, &mut out)?;
    Ok(out)
}

fn check_lengths(data_len: usize, out_len: usize) -> Result<()> {
    if data_len % BYTES_PER_TRIPLET != 0 {
        return Err(not_whole_triplets(data_len));
    }

    let expected = data_len / BYTES_PER_TRIPLET * SAMPLES_PER_TRIPLET;
    if out_len != expected {
        return Err(MrawError::Precondition(format!(
            "output holds {} samples, {} packed bytes unpack to {}",
            out_len, data_len, expected
        )));
    }

    Ok(())
}

fn not_whole_triplets(len: usize) -> MrawError {
    MrawError::Precondition(format!(
        "packed input of {} bytes is not a multiple of {}",
        len, BYTES_PER_TRIPLET
    ))
}

/// Lengths are already validated; `chunks_exact` keeps the loop free of
/// bounds checks.
#[inline]
fn unpack_serial(src: &[u8], dst: &mut [u16]) {
    for (packed, samples) in src
        .chunks_exact(BYTES_PER_TRIPLET)
        .zip(dst.chunks_exact_mut(SAMPLES_PER_TRIPLET))
    {
        let b0 = packed[0] as u16;
        let b1 = packed[1] as u16;
        let b2 = packed[2] as u16;

        samples[0] = (b0 << 4) | (b1 >> 4);
        samples[1] = ((b1 & 0x0F) << 8) | b2;
    }
}

