use boardodds_www::{good_from_attr, App, AppProps, GOOD_ATTR};
use log::debug;
use sycamore::prelude::*;

fn main() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Debug).expect("Failed to init logger");

    debug!("main");

    // mount to an inner element b/c `trunk` puts some preload stuff in the
    // body, which gets overwritten if we just render to body.
    let window = web_sys::window().unwrap();
    let document = window.document().unwrap();
    let mount = document.get_element_by_id("sycamore-mount").unwrap();

    // pick up the good-set `render-static` baked into the page, if any
    let good_attr = mount
        .query_selector(".page-wrapper")
        .ok()
        .flatten()
        .and_then(|wrapper| wrapper.get_attribute(GOOD_ATTR));
    let good = good_from_attr(good_attr.as_deref());
    debug!("main: hydrating with good: {good}");

    sycamore::hydrate_to(
        |ctx| {
            view! { ctx,
                App(AppProps::with_good(ctx, good))
            }
        },
        &mount,
    );
}
