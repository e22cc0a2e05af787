use log::warn;
use yew::prelude::*;

use super::hero::Hero;
use crate::config::GridConfig;

pub const CONFIG_STORAGE_KEY: &str = "flicker_grid_config";

fn default_grid() -> GridConfig {
    GridConfig {
        text: "Nyxie".to_string(),
        max_opacity: 0.3,
        ..GridConfig::default()
    }
}

/// Demo grid config, optionally overridden by JSON stored in localStorage.
fn load_grid_config() -> GridConfig {
    let Some(raw) = web_sys::window()
        .and_then(|win| win.local_storage().ok().flatten())
        .and_then(|store| store.get_item(CONFIG_STORAGE_KEY).ok().flatten())
    else {
        return default_grid();
    };
    match GridConfig::from_json(&raw) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("ignoring stored {CONFIG_STORAGE_KEY}: {e}");
            default_grid()
        }
    }
}

#[function_component(App)]
pub fn app() -> Html {
    let grid = use_state(load_grid_config);

    html! {
        <div id="root" style="min-height:100vh; background:#0e1116;">
            <Hero
                grid={(*grid).clone()}
                title="Nyxie"
                tagline="Bookings, clients and follow-ups in one place."
            />
        </div>
    }
}
