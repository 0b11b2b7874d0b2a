use super::Tone;
use crate::app::{ConnectionStatus, CustomLists, CustomSelector};
use crate::directory::filter_symbols;
use crate::models::{PairSource, TradingMode};
use ratatui::{
    style::{Modifier, Style},
    symbols,
    text::{Line, Span},
};

const MAX_LISTED: usize = 8;

pub fn connection_indicator(status: ConnectionStatus) -> Line<'static> {
    let (label, tone) = match status {
        ConnectionStatus::Connected => ("connected", Tone::Profit),
        ConnectionStatus::Connecting => ("connecting", Tone::Neutral),
        ConnectionStatus::Disconnected => ("disconnected", Tone::Loss),
    };
    Line::from(vec![
        Span::styled(symbols::DOT, tone.style()),
        Span::styled(format!(" {label}"), tone.style()),
    ])
}

fn toggle(label: &str, options: &[(&str, bool)]) -> Line<'static> {
    let mut spans = vec![Span::raw(format!("{label}: "))];
    for (name, active) in options {
        if *active {
            spans.push(Span::styled(
                format!("[{name}]"),
                Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD),
            ));
        } else {
            spans.push(Span::styled(format!(" {name} "), Tone::Neutral.style()));
        }
        spans.push(Span::raw(" "));
    }
    spans.pop();
    Line::from(spans)
}

pub fn mode_toggle(current: TradingMode) -> Line<'static> {
    let modes = [TradingMode::MxBuyLbankSell, TradingMode::LbankBuyMxSell];
    let options: Vec<(&str, bool)> = modes.iter().map(|m| (m.display_name(), *m == current)).collect();
    toggle("mode", &options)
}

pub fn pair_source_toggle(current: PairSource) -> Line<'static> {
    toggle(
        "pairs",
        &[
            ("common", current == PairSource::Common),
            ("custom", current == PairSource::Custom),
        ],
    )
}

/// Current pair, or the filtered pair list while a search term is set.
pub fn symbol_search(symbols: &[String], term: &str, current: &str) -> String {
    if term.trim().is_empty() {
        return format!("pair: {current}  ({} available)", symbols.len());
    }

    let matches = filter_symbols(symbols, term);
    if matches.is_empty() {
        return format!("search {term:?}: no matching pairs");
    }

    let mut listed: Vec<String> = matches
        .iter()
        .take(MAX_LISTED)
        .map(|s| if *s == current { format!("{s}*") } else { s.to_string() })
        .collect();
    if matches.len() > MAX_LISTED {
        listed.push("...".to_string());
    }

    format!(
        "search {term:?}: {}  (showing {} / {} pairs)",
        listed.join(", "),
        matches.len(),
        symbols.len()
    )
}

pub fn custom_selector(selector: &CustomSelector) -> Line<'static> {
    match &selector.lists {
        CustomLists::Idle | CustomLists::Loading => {
            Line::styled("custom pairs: loading symbol lists...", Tone::Neutral.style())
        }
        CustomLists::Failed(reason) => Line::styled(
            format!("custom pairs: {reason} (type `retry`)"),
            Tone::Loss.style(),
        ),
        CustomLists::Ready { mx, lbank } => Line::from(format!(
            "custom pairs: Mexc [{}] / LBank [{}]  ({} / {} listed)",
            selector.mx_symbol.as_deref().unwrap_or("-"),
            selector.lbank_symbol.as_deref().unwrap_or("-"),
            mx.len(),
            lbank.len()
        )),
    }
}
