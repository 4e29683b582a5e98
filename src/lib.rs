//! Decoder and reporter for x87 FPU architectural state.
//!
//! Captures (via a [`SnapshotSource`]) the x87 control, status and tag words
//! plus the eight 80-bit stack registers, decodes the packed bit fields into
//! structured values, renders a textual report, and restores the original
//! state bit-for-bit so the instrumented program is unaffected.
//!
//! The decode path is a pure function over a [`RawEnvironment`]: no hardware
//! access, no shared state, total over every input bit pattern. Only the
//! snapshot layer can fail, and it fails before decoding ever starts.

mod decode;
mod env;
mod ext80;
mod report;
mod snapshot;

pub use crate::decode::{
    decode, decode_tags, phys_index, Comparison, ConditionCodes, DecodedControl, DecodedRegister,
    DecodedState, DecodedStatus, PrecisionControl, RoundingControl, Tag,
};
pub use crate::env::{RawEnvironment, RawExtended, FSAVE_IMAGE_SIZE};
pub use crate::ext80::{mantissa_high, mantissa_low, sign_exponent, to_f64, widen};
pub use crate::report::{render, Report};
pub use crate::snapshot::{LiveFpu, Result, SnapshotError, SnapshotSource};

use std::panic::Location;

/// Capture, decode, render and restore in one step.
///
/// The report is labelled with the caller's source location. The snapshot is
/// restored before returning, so on success the observed unit ends up in the
/// captured state.
#[track_caller]
pub fn dump_with<S: SnapshotSource>(source: &mut S, verbose: bool) -> Result<String> {
    let loc = Location::caller();
    let env = source.capture()?;
    tracing::debug!(
        file = loc.file(),
        line = loc.line(),
        "captured x87 environment"
    );
    let state = decode(&env);
    let text = render(&state, loc.file(), loc.line(), verbose);
    source.restore(&env)?;
    tracing::debug!("restored x87 environment");
    Ok(text)
}

/// [`dump_with`] over the calling thread's own FPU.
#[track_caller]
pub fn dump(verbose: bool) -> Result<String> {
    dump_with(&mut LiveFpu, verbose)
}
