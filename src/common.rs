/// Stream sample rate (samples per second per channel).
pub type SampleRate = u32;

/// Number of channels in a stream.
pub type ChannelCount = u16;

/// Represents value of a single sample.
///
/// Samples are normalized floats, nominally within `[-1.0, 1.0]`.
pub type Sample = f32;

/// Compile-time check that an error type is usable across threads and can be cloned into
/// diagnostics.
macro_rules! assert_error_traits {
    ($to_test:path) => {
        const _: () = {
            $crate::common::use_required_traits::<$to_test>();
        };
    };
}

pub(crate) use assert_error_traits;

pub(crate) const fn use_required_traits<
    T: std::error::Error + std::fmt::Debug + std::fmt::Display + Send + Sync + Clone + 'static,
>() {
}
