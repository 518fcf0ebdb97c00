pub mod bidi;
pub mod wrapper;

pub use self::bidi::visual_fragments;
pub use self::wrapper::{Fragment, LineBox, wrap_block};

use crate::LayoutError;

/// Slices `text` with offsets produced by a pluggable Unicode strategy.
///
/// Offsets past the end, inside a character or going backwards are reported
/// instead of panicking.
pub(crate) fn strategy_slice<'t>(
    text: &'t str,
    start: usize,
    end: usize,
    strategy: &'static str,
) -> Result<&'t str, LayoutError> {
    text.get(start..end).ok_or(LayoutError::Strategy {
        strategy,
        start,
        end,
        len: text.len(),
    })
}
