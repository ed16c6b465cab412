pub mod grid;
pub mod palette;
pub mod raster;
pub mod resource;
pub mod sequence;
