use boardodds::good_set::GoodSet;
use boardodds_www::{App, AppProps};
use std::{
    env,
    io::{self, Read, Write},
    str::FromStr,
};
use sycamore::prelude::*;
use trice::Instant;

const HYDRATION_MARKER: &str = "<!-- HYDRATION-STATION -->";

/// Pre-render the board page into an html template.
///
/// usage: render-static [GOOD] < index.html > dist/index.html
///
/// The template comes in on stdin. If it has exactly one `HYDRATION_MARKER`,
/// the marker is swapped for the rendered app, with `GOOD` (same format as
/// the cli's `--good`) already marked.
fn main() {
    #[cfg(target_arch = "wasm32")]
    panic!("render-static is a native build tool");

    let good = match env::args().nth(1) {
        Some(arg) => GoodSet::from_str(&arg).unwrap_or_else(|err| {
            eprintln!("boardodds-www::render-static: invalid good set: {err}");
            std::process::exit(1);
        }),
        None => GoodSet::new(),
    };

    eprintln!("boardodds-www::render-static: start, good: {good}");
    let start = Instant::now();

    let mut template = String::new();
    io::stdin()
        .read_to_string(&mut template)
        .expect("Failed to read from stdin");

    let num_markers = template.matches(HYDRATION_MARKER).count();
    let output = match num_markers {
        0 => template,
        1 => {
            let rendered = sycamore::render_to_string(|ctx| {
                view! { ctx,
                    App(AppProps::with_good(ctx, good))
                }
            });
            template.replacen(HYDRATION_MARKER, &rendered, 1)
        }
        _ => panic!("expected at most one hydration marker, found {num_markers}"),
    };

    io::stdout()
        .write_all(output.as_bytes())
        .expect("Failed to write to stdout");

    eprintln!(
        "boardodds-www::render-static: end, markers: {num_markers}, time: {:?}",
        start.elapsed(),
    );
}
