use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::categories::{CategoryMap, Collection, Taxonomy};
use crate::histogram::HistogramRow;
use crate::theme::{ColorScheme, Theme};
use crate::time_range::TimeRange;
use crate::types::AppEvent;

/// Keyboard actions, decoupled from the terminal backend.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Quit,
    Refresh,
    NextCollection,
    NextRange,
    SelectCollection(usize),
}

impl Action {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'q' => Some(Action::Quit),
            'r' => Some(Action::Refresh),
            'c' => Some(Action::NextCollection),
            't' => Some(Action::NextRange),
            '1'..='9' => Some(Action::SelectCollection(c as usize - '1' as usize)),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Status {
    Loading,
    Ready { at: DateTime<Utc> },
    Error(String),
}

pub struct App {
    quit: bool,
    collection: Collection,
    range: TimeRange,
    taxonomy: Arc<Taxonomy>,
    rows: Vec<HistogramRow>,
    status: Status,
    theme: Theme,
}

impl App {
    pub fn new(
        collection: Collection,
        range: TimeRange,
        theme: Theme,
        taxonomy: Arc<Taxonomy>,
    ) -> Self {
        Self {
            quit: false,
            collection,
            range,
            taxonomy,
            rows: Vec::new(),
            status: Status::Loading,
            theme,
        }
    }

    pub fn collection(&self) -> Collection {
        self.collection
    }

    pub fn range(&self) -> TimeRange {
        self.range
    }

    pub fn rows(&self) -> &[HistogramRow] {
        &self.rows
    }

    pub fn category_map(&self) -> &CategoryMap {
        self.taxonomy.map(self.collection)
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn colors(&self) -> ColorScheme {
        self.theme.colors()
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Mark the view as loading and return what to fetch.
    pub fn request(&mut self) -> (Collection, TimeRange) {
        self.status = Status::Loading;
        (self.collection, self.range)
    }

    /// Apply a key action. Returns a fetch request when the view changed.
    pub fn handle(&mut self, action: Action) -> Option<(Collection, TimeRange)> {
        match action {
            Action::Quit => {
                self.quit = true;
                None
            }
            Action::Refresh => Some(self.request()),
            Action::NextCollection => {
                self.set_collection(self.collection.next());
                Some(self.request())
            }
            Action::NextRange => {
                self.range = self.range.next();
                Some(self.request())
            }
            Action::SelectCollection(i) => {
                let c = *Collection::ALL.get(i)?;
                if c == self.collection {
                    return None;
                }
                self.set_collection(c);
                Some(self.request())
            }
        }
    }

    fn set_collection(&mut self, c: Collection) {
        self.collection = c;
        // rows of another taxonomy would mislabel the chart
        self.rows.clear();
    }

    /// Fold a background event into the view. Results for a view the user has
    /// since left are dropped.
    pub fn apply(&mut self, event: AppEvent) {
        match event {
            AppEvent::Histogram {
                collection,
                range,
                rows,
            } => {
                if collection != self.collection || range != self.range {
                    log::debug!("Dropping stale {collection}/{range} histogram");
                    return;
                }
                self.rows = rows;
                self.status = Status::Ready { at: Utc::now() };
            }
            AppEvent::FetchFailed {
                collection,
                range,
                error,
            } => {
                if collection != self.collection || range != self.range {
                    log::debug!("Dropping stale {collection}/{range} failure: {error}");
                    return;
                }
                self.status = Status::Error(error);
            }
            AppEvent::Quit => self.quit = true,
        }
    }
}
