mod capacity_triple;
mod clock_time;
mod frequency;
mod resource_id;
pub(crate) mod serde_helpers;
mod timezone;
mod week_day;
mod window_duration;

pub use capacity_triple::CapacityTriple;
pub use clock_time::ClockTime;
pub use frequency::Frequency;
pub use resource_id::ResourceId;
pub use timezone::Timezone;
pub use week_day::WeekDay;
pub use window_duration::WindowDuration;
