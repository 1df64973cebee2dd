pub mod ordering;
pub mod mutation;
pub mod events;
pub mod sink;
pub mod store;
pub mod queue;

pub use mutation::QueueMutation;
pub use sink::{ConsultationSink, NullSink};
pub use store::{ClinicQueueStore, QueueStoreRegistry};
pub use queue::WaitingQueueService;
