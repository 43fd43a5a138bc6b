// ── Domain model ──

pub mod address;
pub mod profile;

pub use address::ProfileAddress;
pub use profile::{
    AttributeInput, AttributeOperator, DEFAULT_WEIGHT, MAX_WEIGHT, MIN_WEIGHT, PROFILE_ID_PATTERN,
    ProfileInput, RadiusAttribute, RadiusProfile,
};
