// Recommendation relay: boundary parse into a tagged request, then forward.

pub mod handlers;
pub mod request;
