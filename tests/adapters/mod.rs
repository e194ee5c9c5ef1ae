// Mock implementations for adapter layer testing

pub mod mock_members;
pub mod mock_sink;
pub mod mock_transport;

pub use mock_members::MockMemberProvider;
pub use mock_sink::{MockProgressSink, SinkEvent};
pub use mock_transport::MockTransport;
