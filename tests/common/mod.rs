//! Shared test utilities

pub mod fixtures;
pub mod mock_platform;
pub mod recording_progress;

pub use fixtures::*;
pub use mock_platform::MockHostingService;
pub use recording_progress::RecordingProgress;
