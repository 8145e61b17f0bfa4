//! Region detector implementations.

pub mod bordered;
pub mod component;
pub mod contour;
pub mod flood_fill;
pub mod grid;
pub mod sections;
pub mod shadow;
pub mod solid_color;

pub use bordered::BorderedRegionFinder;
pub use component::ComponentDetector;
pub use contour::ContourDetector;
pub use flood_fill::FloodFillDetector;
pub use grid::{tile, GridTiler};
pub use sections::SectionDetector;
pub use shadow::ShadowBoundedRegionFinder;
pub use solid_color::SolidColorRegionFinder;
