// Resume upload pipeline: validate → store → relay to parser → discard.

pub mod handlers;
pub mod relay;
pub mod storage;
pub mod validator;
