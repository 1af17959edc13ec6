pub mod blend;
pub mod compositor;
pub mod surface;
