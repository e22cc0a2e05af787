pub mod app;
pub mod flicker_grid;
pub mod hero;

pub use app::App;
pub use flicker_grid::FlickerGrid;
pub use hero::Hero;
