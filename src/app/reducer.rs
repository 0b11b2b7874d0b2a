use super::event::*;
use super::state::*;
use crate::models::{ChartDataPoint, PairSource, TradingMode, Venue};
use crate::orderbook::store::Applied;
use crate::{directory, feed::FeedEventKind, view};

/// Initial mount: empty chart, load the pair list, open the feed.
pub fn startup(state: &mut AppState) -> Transition {
    state.chart.clear();
    Transition::changed()
        .with(Effect::LoadSymbols)
        .with(Effect::ReconnectFeed)
}

/// Applies one event to the state. `now_ms` is the local receipt time used
/// for chart samples.
pub fn reduce(state: &mut AppState, ev: AppEvent, now_ms: i64) -> Transition {
    match ev {
        AppEvent::Ui(u) => reduce_ui(state, u),
        AppEvent::Feed(f) => {
            if f.epoch != state.feed_epoch {
                tracing::debug!(
                    "[app] dropping event from stale connection {} (current {})",
                    f.epoch,
                    state.feed_epoch
                );
                return Transition::unchanged();
            }
            reduce_feed(state, f.kind, now_ms)
        }
        AppEvent::Directory(d) => reduce_directory(state, d),
        AppEvent::FeedReplaced { epoch } => {
            state.feed_epoch = epoch;
            state.connection = ConnectionStatus::Connecting;
            Transition::changed()
        }
    }
}

fn reduce_feed(state: &mut AppState, kind: FeedEventKind, now_ms: i64) -> Transition {
    match kind {
        FeedEventKind::Connected => {
            state.connection = ConnectionStatus::Connected;
            Transition::changed()
        }
        FeedEventKind::Disconnected => {
            state.connection = ConnectionStatus::Disconnected;
            Transition::changed()
        }
        FeedEventKind::Update(update) => {
            let selection = &state.selection;
            match state.market.apply(&update, &selection.symbol, selection.mode) {
                Applied::Ignored => Transition::unchanged(),
                Applied::BooksOnly => Transition::changed(),
                Applied::BooksAndSpread => {
                    state.chart.append(ChartDataPoint {
                        timestamp: now_ms,
                        spread: update.spread_data.spread,
                        spread_percentage: update.spread_data.spread_percentage,
                        time: view::format_receipt_time(now_ms),
                    });
                    Transition::changed()
                }
            }
        }
    }
}

fn reduce_directory(state: &mut AppState, ev: DirectoryEvent) -> Transition {
    match ev {
        DirectoryEvent::SymbolsLoaded(Ok(symbols)) => {
            tracing::info!("[app] {} pairs available", symbols.len());
            state.available_symbols = symbols;
            Transition::changed()
        }
        DirectoryEvent::SymbolsLoaded(Err(e)) => {
            tracing::error!("[app] failed to load pair list: {e}");
            state.available_symbols.clear();
            Transition::changed()
        }
        DirectoryEvent::SymbolSet { symbol, result } => {
            if state.pending_symbol.as_deref() != Some(symbol.as_str()) {
                tracing::debug!("[app] ignoring superseded symbol response for {symbol}");
                return Transition::unchanged();
            }
            state.pending_symbol = None;

            if let Err(e) = result {
                tracing::error!("[app] failed to switch to {symbol}: {e}");
                return Transition::unchanged();
            }

            if symbol == state.selection.symbol {
                return Transition::unchanged();
            }

            tracing::info!("[app] switched pair to {symbol}");
            state.selection.symbol = symbol;
            state.search_term.clear();
            state.chart.clear();
            Transition::changed().with(Effect::ReconnectFeed)
        }
        DirectoryEvent::CustomListsLoaded(Ok((mx, lbank))) => {
            state.custom.mx_symbol = mx.first().cloned();
            state.custom.lbank_symbol = lbank.first().cloned();
            state.custom.lists = CustomLists::Ready { mx, lbank };
            log_custom_request(&state.custom);
            Transition::changed()
        }
        DirectoryEvent::CustomListsLoaded(Err(e)) => {
            tracing::error!("[app] failed to load per-exchange pair lists: {e}");
            state.custom.lists = CustomLists::Failed("failed to load symbol lists".to_string());
            Transition::changed()
        }
    }
}

fn reduce_ui(state: &mut AppState, ev: UiEvent) -> Transition {
    match ev {
        UiEvent::SymbolRequested { symbol } => request_symbol(state, symbol),
        UiEvent::PickFirstMatch { term } => {
            let first = directory::filter_symbols(&state.available_symbols, &term)
                .first()
                .map(|s| s.to_string());
            match first {
                Some(symbol) => request_symbol(state, symbol),
                None => {
                    state.status_message = format!("no pair matches {term:?}");
                    Transition::changed()
                }
            }
        }
        UiEvent::SearchChanged { term } => {
            state.search_term = term;
            Transition::changed()
        }
        UiEvent::ModeChanged { mode } => change_mode(state, mode),
        UiEvent::ModeToggled => {
            let mode = state.selection.mode.flipped();
            change_mode(state, mode)
        }
        UiEvent::PairSourceChanged { source } => {
            if source == state.pair_source {
                return Transition::unchanged();
            }
            state.pair_source = source;

            let needs_lists = matches!(state.custom.lists, CustomLists::Idle | CustomLists::Failed(_));
            if source == PairSource::Custom && needs_lists {
                state.custom.lists = CustomLists::Loading;
                return Transition::changed().with(Effect::LoadCustomLists);
            }
            Transition::changed()
        }
        UiEvent::CustomSymbolPicked { venue, symbol } => pick_custom(state, venue, symbol),
        UiEvent::RetryCustomLists => {
            if !matches!(state.custom.lists, CustomLists::Failed(_)) {
                return Transition::unchanged();
            }
            state.custom.lists = CustomLists::Loading;
            Transition::changed().with(Effect::LoadCustomLists)
        }
        UiEvent::CommandLineEdited { text } => {
            if text == state.command_line {
                return Transition::unchanged();
            }
            state.command_line = text;
            Transition::changed()
        }
        UiEvent::Notice { text } => {
            state.status_message = text;
            Transition::changed()
        }
    }
}

// Selection only moves once the server confirms the change.
fn request_symbol(state: &mut AppState, symbol: String) -> Transition {
    if symbol == state.selection.symbol && state.pending_symbol.is_none() {
        return Transition::unchanged();
    }
    state.pending_symbol = Some(symbol.clone());
    state.status_message = format!("switching to {symbol}...");
    Transition::changed().with(Effect::SetSymbol(symbol))
}

fn change_mode(state: &mut AppState, mode: TradingMode) -> Transition {
    if mode == state.selection.mode {
        return Transition::unchanged();
    }
    tracing::info!("[app] trading mode now {mode}");
    state.selection.mode = mode;
    state.chart.clear();
    state.market.clear_spread();
    Transition::changed().with(Effect::ReconnectFeed)
}

fn pick_custom(state: &mut AppState, venue: Venue, symbol: String) -> Transition {
    let CustomLists::Ready { mx, lbank } = &state.custom.lists else {
        state.status_message = "custom pair lists are not loaded".to_string();
        return Transition::changed();
    };

    let list = match venue {
        Venue::Mx => mx,
        Venue::Lbank => lbank,
    };
    let Some(found) = list.iter().find(|s| s.eq_ignore_ascii_case(&symbol)).cloned() else {
        state.status_message = format!("{} does not list {symbol}", venue.title());
        return Transition::changed();
    };

    match venue {
        Venue::Mx => state.custom.mx_symbol = Some(found),
        Venue::Lbank => state.custom.lbank_symbol = Some(found),
    }
    log_custom_request(&state.custom);
    Transition::changed()
}

fn log_custom_request(custom: &CustomSelector) {
    if let Some(req) = custom.request() {
        tracing::info!(
            "[app] custom pair selected: mx={} lbank={}",
            req.mx_symbol,
            req.lbank_symbol
        );
    }
}
