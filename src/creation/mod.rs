mod make_grid;
mod make_tube;

pub use make_grid::MakeGrid;
pub use make_tube::MakeTube;
