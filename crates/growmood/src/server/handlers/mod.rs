pub mod recommendation;
pub mod status;
