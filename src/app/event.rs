use crate::feed::FeedEvent;
use crate::models::{PairSource, TradingMode, Venue};

#[derive(Debug, Clone)]
pub enum AppEvent {
    Ui(UiEvent),
    Feed(FeedEvent),
    Directory(DirectoryEvent),
    /// The runtime opened a new feed connection under this epoch.
    FeedReplaced { epoch: u64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    SymbolRequested { symbol: String },
    PickFirstMatch { term: String },
    SearchChanged { term: String },
    ModeChanged { mode: TradingMode },
    ModeToggled,
    PairSourceChanged { source: PairSource },
    CustomSymbolPicked { venue: Venue, symbol: String },
    RetryCustomLists,
    /// The command being typed changed; nothing is submitted yet.
    CommandLineEdited { text: String },
    Notice { text: String },
}

/// Results of REST calls, delivered back to the controller.
#[derive(Debug, Clone)]
pub enum DirectoryEvent {
    SymbolsLoaded(Result<Vec<String>, String>),
    SymbolSet {
        symbol: String,
        result: Result<(), String>,
    },
    CustomListsLoaded(Result<(Vec<String>, Vec<String>), String>),
}

/// Side effects requested by a transition; the runtime carries them out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    ReconnectFeed,
    SetSymbol(String),
    LoadSymbols,
    LoadCustomLists,
}

#[derive(Debug, Default, PartialEq)]
pub struct Transition {
    pub changed: bool,
    pub effects: Vec<Effect>,
}

impl Transition {
    pub fn unchanged() -> Self {
        Self::default()
    }

    pub fn changed() -> Self {
        Self {
            changed: true,
            effects: Vec::new(),
        }
    }

    pub fn with(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}
