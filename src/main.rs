use flicker_grid::components::App;
use flicker_grid::util::init_logging;
use log::LevelFilter;

fn main() {
    init_logging(if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    });
    yew::Renderer::<App>::new().render();
}
