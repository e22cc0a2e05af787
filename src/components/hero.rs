use yew::prelude::*;

use super::flicker_grid::FlickerGrid;
use crate::config::GridConfig;

#[derive(Properties, PartialEq, Clone)]
pub struct HeroProps {
    pub grid: GridConfig,
    pub title: AttrValue,
    pub tagline: AttrValue,
}

#[function_component(Hero)]
pub fn hero(props: &HeroProps) -> Html {
    html! {
        <section style="position:relative; height:420px; overflow:hidden; background:#0e1116; border-bottom:1px solid #30363d;">
            <div style="position:absolute; inset:0;">
                <FlickerGrid config={props.grid.clone()} />
            </div>
            <div style="position:absolute; left:50%; bottom:36px; transform:translateX(-50%); text-align:center; color:#c9d1d9;">
                <h1 style="margin:0 0 6px 0; font-size:28px; font-weight:600;">{ props.title.clone() }</h1>
                <p style="margin:0; font-size:14px; opacity:0.75;">{ props.tagline.clone() }</p>
            </div>
        </section>
    }
}
