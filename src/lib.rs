pub mod creation;
pub mod error;
pub mod graph;
pub mod math;
pub mod picking;
pub mod render;
pub mod seam;
pub mod session;
pub mod topology;

pub use error::{Result, SeamcutError};
