pub mod normalize;
pub mod relay;
pub mod validate;

pub use relay::SubmissionRelay;
