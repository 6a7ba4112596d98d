pub mod band;
pub mod events;
pub mod record;

pub use band::{ActivityStage, BandDataResponse, BandDay, SleepStage, SleepSummary, StepSummary};
pub use events::{
    BloodOxygenEvent, ClickExtra, EventsResponse, OsaExtra, PaiEvent, StressEvent, StressPoint,
};
pub use record::{FieldValue, Record};
