// Common test utilities and fixtures

pub mod fixtures;

// Re-export commonly used items
// Note: These may appear unused in some test binaries but are used in others
#[allow(unused_imports)]
pub use fixtures::{sample, SampleFile};
#[allow(unused_imports)]
pub use helpers::{
    assert_lossless, create_test_services, make_chunks, ConstantAnswer, TimingAnswer,
    ScriptedAnswer, Step,
};
