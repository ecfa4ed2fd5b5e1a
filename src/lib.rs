pub mod blend;
pub mod camera;
pub mod compositor;
pub mod driver;
pub mod geometry;
pub mod renderer;
pub mod scene;
pub mod scroll;
pub mod texture;
