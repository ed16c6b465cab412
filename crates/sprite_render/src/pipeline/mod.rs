pub mod compose;
pub mod distortion;
pub mod export;
