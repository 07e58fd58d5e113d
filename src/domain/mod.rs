pub mod actor;
pub mod collision;
pub mod entity;
pub mod grid;
pub mod spawn;
pub mod tile;
