use web_sys::{HtmlCanvasElement, HtmlElement};
use yew::prelude::*;

use crate::config::GridConfig;
use crate::web::mount_canvas;

#[derive(Properties, PartialEq, Clone)]
pub struct FlickerGridProps {
    #[prop_or_default]
    pub config: GridConfig,
    #[prop_or_default]
    pub class: Classes,
}

#[function_component(FlickerGrid)]
pub fn flicker_grid(props: &FlickerGridProps) -> Html {
    let container_ref = use_node_ref();
    let canvas_ref = use_node_ref();

    // A config change tears the old instance down and mounts a fresh one.
    {
        let container_ref = container_ref.clone();
        let canvas_ref = canvas_ref.clone();
        use_effect_with(props.config.clone(), move |config| {
            let mounted = match (
                container_ref.cast::<HtmlElement>(),
                canvas_ref.cast::<HtmlCanvasElement>(),
            ) {
                (Some(container), Some(canvas)) => mount_canvas(&container, &canvas, config.clone()),
                _ => None,
            };
            move || {
                if let Some(mut m) = mounted {
                    m.teardown();
                }
            }
        });
    }

    html! {
        <div ref={container_ref} class={classes!("flicker-grid", props.class.clone())} style="position:relative; width:100%; height:100%;">
            <canvas ref={canvas_ref} style="display:block; pointer-events:none;" />
        </div>
    }
}
