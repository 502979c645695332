pub mod questionnaire;
pub mod recording;
pub mod store;
pub mod subject;
pub mod synth;

pub use recording::{label_name, unit_label, ChannelInfo, Inventory, LabelInfo, Recording};
pub use store::{RecordingStore, StoreError};
