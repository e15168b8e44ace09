use boardodds::{
    board::{Tile, TileGroup, NUM_TILES},
    good_set::GoodSet,
    odds::{self, Breakdown},
};
use log::{debug, trace, warn};
use std::str::FromStr;
use sycamore::prelude::*;
use web_sys::Event;

/// The attribute on the page wrapper that carries the good-set, so a page
/// pre-rendered with some tiles marked hydrates with the same tiles marked.
pub const GOOD_ATTR: &str = "data-good";

/// Read the good-set back out of a `GOOD_ATTR` value. A missing or invalid
/// value starts from the empty set.
pub fn good_from_attr(attr: Option<&str>) -> GoodSet {
    match attr.map(GoodSet::from_str) {
        Some(Ok(good)) => good,
        Some(Err(err)) => {
            warn!("good_from_attr: ignoring invalid good set: {err}");
            GoodSet::new()
        }
        None => GoodSet::new(),
    }
}

/// Tiles per side of the board, counting both corners.
const SIDE: u8 = NUM_TILES / 4 + 1;

/// The `(row, col)` CSS grid cell (1-based) of `tile` on an `SIDE x SIDE` ring.
/// GO sits in the bottom-right corner and play runs clockwise.
pub fn grid_position(tile: Tile) -> (u8, u8) {
    let idx = tile.index();
    let edge = SIDE - 1;
    match idx / edge {
        // bottom row, right to left
        0 => (SIDE, SIDE - idx),
        // left column, bottom to top
        1 => (SIDE - (idx - edge), 1),
        // top row, left to right
        2 => (1, 1 + (idx - 2 * edge)),
        // right column, top to bottom
        _ => (1 + (idx - 3 * edge), SIDE),
    }
}

#[derive(Debug, Prop)]
pub struct AppProps<'a> {
    board_props: BoardPageProps<'a>,
}

impl<'a> AppProps<'a> {
    pub fn init_placeholders(ctx: ScopeRef<'a>) -> Self {
        Self::with_good(ctx, GoodSet::new())
    }

    /// Start the page with `good` already marked, e.g., when pre-rendering a
    /// shared board.
    pub fn with_good(ctx: ScopeRef<'a>, good: GoodSet) -> Self {
        let good = ctx.create_signal(good);
        let start_str = ctx.create_signal(Tile::GO.to_string());

        AppProps {
            board_props: BoardPageProps { good, start_str },
        }
    }
}

#[component]
pub fn App<'a, G: Html>(ctx: ScopeRef<'a>, props: AppProps<'a>) -> View<G> {
    debug!("init App component: props: {:?}", props);

    let good = props.board_props.good;
    let good_str = ctx.create_memo(move || good.get().to_string());

    view! { ctx,
        // central container
        div(class="page-wrapper", data-good=good_str.get()) {
            Title {}

            main {
                section(id="board-page") {
                    BoardPage(props.board_props)
                }
            }

            Info {}
        }
    }
}

#[component]
fn Title<G: Html>(ctx: ScopeRef) -> View<G> {
    trace!("Title: init");

    view! { ctx,
        header {
            h1 { "boardodds" }
            h2 { "where does one roll take you?" }
        }
    }
}

#[derive(Clone, Debug, Prop)]
pub struct BoardPageProps<'a> {
    good: &'a Signal<GoodSet>,
    start_str: &'a Signal<String>,
}

#[component]
fn BoardPage<'a, G: Html>(ctx: ScopeRef<'a>, props: BoardPageProps<'a>) -> View<G> {
    trace!("BoardPage: init");

    let good = props.good;
    let start_str = props.start_str;

    let start = ctx.create_memo(move || {
        let start_str = start_str.get();
        let start = Tile::from_str(start_str.as_str());
        if let Err(err) = &start {
            warn!("BoardPage: invalid start tile: {err}");
        }
        start
    });

    let heatmap = ctx.create_memo(move || odds::heatmap(&good.get()));

    let tiles = View::new_fragment(
        Tile::all()
            .map(move |tile| {
                let (row, col) = grid_position(tile);
                let style = ctx.create_memo(move || format!("grid-row: {row}; grid-column: {col};"));

                let tile_class = ctx.create_memo(move || {
                    let mut class = String::from("tile");
                    if good.get().is_good(tile) {
                        class.push_str(" good");
                    }
                    if matches!(*start.get(), Ok(start) if start == tile) {
                        class.push_str(" selected");
                    }
                    class
                });

                let chance_str = ctx.create_memo(move || {
                    format!("{:.2}%", heatmap.get()[tile.index() as usize])
                });

                let handle_click = move |event: Event| {
                    trace!("BoardPage::handle_click: tile: {tile}, event: {event:?}");
                    let mut set = *good.get();
                    set.toggle(tile);
                    good.set(set);
                };

                view! { ctx,
                    div(class=tile_class.get(), style=style.get(), on:click=handle_click) {
                        span(class="tile-idx") { (tile.index()) }
                        span(class="tile-name") { (tile.name()) }
                        span(class="tile-chance") { (chance_str.get()) }
                    }
                }
            })
            .collect::<Vec<_>>(),
    );

    let group_buttons = View::new_fragment(
        TileGroup::all()
            .iter()
            .copied()
            .map(move |group| {
                let handle_click = move |event: Event| {
                    trace!("BoardPage::handle_group_click: group: {group}, event: {event:?}");
                    let mut set = *good.get();
                    set.toggle_group(group.tiles().iter().copied());
                    good.set(set);
                };

                view! { ctx,
                    button(class="group", type="button", on:click=handle_click) {
                        (group.as_human_readable())
                    }
                }
            })
            .collect::<Vec<_>>(),
    );

    let breakdown = ctx.create_memo(move || match start.get().as_ref() {
        Ok(start) => Ok(odds::breakdown_from(*start, &good.get())),
        Err(err) => Err(err.clone()),
    });

    view! { ctx,
        div(id="board") {
            (tiles)
        }

        form(id="controls") {
            div(class="input-wrapper") {
                label(for="start-tile") { "start tile" }
                input(
                    id="start-tile",
                    name="start-tile",
                    placeholder="0",
                    inputmode="numeric",
                    bind:value=start_str,
                )
            }

            div(class="group-buttons") {
                (group_buttons)
            }
        }

        BreakdownOutput(BreakdownOutputProps { breakdown })
    }
}

#[derive(Clone, Debug, Prop)]
pub struct BreakdownOutputProps<'a> {
    breakdown: &'a ReadSignal<Result<Breakdown, String>>,
}

#[component]
fn BreakdownOutput<'a, G: Html>(ctx: ScopeRef<'a>, props: BreakdownOutputProps<'a>) -> View<G> {
    trace!("BreakdownOutput: init");

    let breakdown = props.breakdown;

    let total_str = ctx.create_memo(move || match breakdown.get().as_ref() {
        Ok(breakdown) => format!("{:.2}%", breakdown.total_percentage),
        Err(_err) => "Error".to_owned(),
    });

    let maybe_err_str = ctx.create_memo(move || match breakdown.get().as_ref() {
        Ok(_breakdown) => None,
        Err(err) => Some(err.clone()),
    });

    let rows = ctx.create_memo(move || match breakdown.get().as_ref() {
        Ok(breakdown) => breakdown.rows.clone(),
        Err(_err) => Vec::new(),
    });

    view! { ctx,
        section(id="output") {
            div(id="output-wrapper-main") {
                span(id="output-label") { "chance" }
                span(id="output-main") { (total_str.get()) }
            }

            ul(id="output-rows") {
                (View::new_fragment(
                    rows.get()
                        .iter()
                        .map(|row| {
                            let text = format!(
                                "roll {} → {} {} ({:.2}%)",
                                row.roll,
                                row.tile,
                                row.name,
                                row.probability_mass * 100.0,
                            );
                            view! { ctx, li { (text) } }
                        })
                        .collect::<Vec<_>>()
                ))
            }

            div(id="output-wrapper-err") {
                (if let Some(err_str) = maybe_err_str.get().as_ref().clone() {
                    view! { ctx,
                        span(id="output-err") { (err_str) }
                    }
                } else {
                    View::empty()
                })
            }
        }
    }
}

#[component]
fn GroupsTable<G: Html>(ctx: ScopeRef) -> View<G> {
    let entries = View::new_fragment(
        TileGroup::all()
            .iter()
            .map(|group| {
                let memnonic = group.as_memnonic();
                let name = group.as_human_readable();
                let tiles = group
                    .tiles()
                    .iter()
                    .map(|tile| tile.to_string())
                    .collect::<Vec<_>>()
                    .join(" ");

                view! { ctx,
                    div(class="entry") {
                        span(class="memnonic") { (memnonic) }
                        span(class="name") { (name) }
                        span(class="tiles") { (tiles) }
                    }
                }
            })
            .collect::<Vec<_>>(),
    );

    view! { ctx,
        div(id="groups-table") {
            (entries)
        }
    }
}

#[component]
fn Info<G: Html>(ctx: ScopeRef) -> View<G> {
    view! { ctx,
        section(id="info-wrapper") {
            h3 {
                "Tile Groups"
            }

            GroupsTable {}

            p {
                "Click a tile to mark it good. A group button marks the whole group, \
                 or clears it if every tile in it is already good."
            }
        }
    }
}
