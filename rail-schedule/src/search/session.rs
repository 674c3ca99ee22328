//! Station search session: query text, matches and keyboard selection.
//!
//! The session is an explicit state machine. Focus and cursor live in a
//! single [`SearchPhase`], so "focus lost while the pointer is over the
//! results" can no longer leave a half-updated mix of flags behind.
//! Committing a selection is a transition whose output is the chosen
//! station; the caller forwards it to whatever handles station changes.

use tracing::{debug, trace};

use crate::domain::Station;

use super::index::{FuzzyIndex, Match};

/// Default number of matches kept per query.
pub const DEFAULT_MAX_MATCHES: usize = 10;

/// Focus and cursor state of the search box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    /// The search box does not have focus.
    ///
    /// `cursor` is where navigation resumes when focus returns.
    Idle { cursor: Option<usize> },

    /// Focused, nothing highlighted.
    Focused,

    /// Focused, with match `cursor` highlighted.
    Navigating { cursor: usize },
}

/// Input events delivered to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchEvent {
    TextChanged(String),
    ArrowUp,
    ArrowDown,
    Enter,
    /// Pointer selection of the match at this position.
    Click(usize),
    /// A station chosen outside the search box (e.g. a favourite).
    ExternalSelect(Station),
    FocusGained,
    FocusLost,
    PointerEntered,
    PointerLeft,
}

/// State of one station search box.
#[derive(Debug, Clone)]
pub struct SearchSession {
    index: Option<FuzzyIndex<Station>>,
    query: String,
    matches: Vec<Match<Station>>,
    phase: SearchPhase,
    pointer_over_results: bool,
    max_matches: usize,
}

impl Default for SearchSession {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_MATCHES)
    }
}

impl SearchSession {
    /// Create a session with no station list yet.
    pub fn new(max_matches: usize) -> Self {
        Self {
            index: None,
            query: String::new(),
            matches: Vec::new(),
            phase: SearchPhase::Idle { cursor: None },
            pointer_over_results: false,
            max_matches,
        }
    }

    /// Install a new station collection, rebuilding the index.
    ///
    /// Matches computed against the previous collection are dropped so no
    /// result from a stale index survives.
    pub fn set_stations(&mut self, stations: impl IntoIterator<Item = Station>) {
        let index = FuzzyIndex::build(stations);
        debug!(stations = index.len(), "rebuilt station index");
        self.index = Some(index);
        self.matches.clear();
        self.phase = self.phase_without_cursor();
    }

    /// Whether a station list has been installed.
    pub fn is_ready(&self) -> bool {
        self.index.is_some()
    }

    /// The stations the current index was built from.
    pub fn stations(&self) -> &[Station] {
        match &self.index {
            Some(index) => &index.records()[..],
            None => &[],
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn matches(&self) -> &[Match<Station>] {
        &self.matches
    }

    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    /// Highlighted match, `None` when nothing is highlighted.
    pub fn cursor(&self) -> Option<usize> {
        match self.phase {
            SearchPhase::Navigating { cursor } => Some(cursor),
            SearchPhase::Idle { cursor } => cursor,
            SearchPhase::Focused => None,
        }
    }

    pub fn has_focus(&self) -> bool {
        !matches!(self.phase, SearchPhase::Idle { .. })
    }

    /// Whether the result overlay should be shown.
    pub fn overlay_visible(&self) -> bool {
        self.has_focus() && !self.matches.is_empty()
    }

    /// Apply one event. Returns the station to switch to if the event
    /// committed a selection.
    pub fn handle(&mut self, event: SearchEvent) -> Option<Station> {
        trace!(?event, phase = ?self.phase, "search event");
        match event {
            SearchEvent::TextChanged(text) => {
                self.text_changed(text);
                None
            }
            SearchEvent::ArrowUp => {
                self.arrow_up();
                None
            }
            SearchEvent::ArrowDown => {
                self.arrow_down();
                None
            }
            SearchEvent::Enter => self.enter(),
            SearchEvent::Click(position) => self.click(position),
            SearchEvent::ExternalSelect(station) => Some(self.commit(station)),
            SearchEvent::FocusGained => {
                self.focus_gained();
                None
            }
            SearchEvent::FocusLost => {
                self.focus_lost();
                None
            }
            SearchEvent::PointerEntered => {
                self.pointer_over_results = true;
                None
            }
            SearchEvent::PointerLeft => {
                self.pointer_over_results = false;
                None
            }
        }
    }

    /// Replace the query text and recompute matches.
    ///
    /// Without an index (station list not loaded yet) there are no matches.
    pub fn text_changed(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.matches = match &self.index {
            Some(index) => index.query(&text, self.max_matches),
            None => Vec::new(),
        };
        self.query = text;
        self.phase = SearchPhase::Focused;
    }

    /// Move the highlight up; no-op at the top or with nothing highlighted.
    pub fn arrow_up(&mut self) {
        self.focus_gained();
        if let SearchPhase::Navigating { cursor } = self.phase
            && cursor > 0
        {
            self.phase = SearchPhase::Navigating { cursor: cursor - 1 };
        }
    }

    /// Move the highlight down; no-op at the last match.
    pub fn arrow_down(&mut self) {
        self.focus_gained();
        let next = match self.phase {
            SearchPhase::Navigating { cursor } => cursor + 1,
            _ => 0,
        };
        if next < self.matches.len() {
            self.phase = SearchPhase::Navigating { cursor: next };
        }
    }

    /// Commit the sole match, or the highlighted one.
    ///
    /// With several matches and nothing highlighted the user has to
    /// navigate first, so this is a no-op.
    pub fn enter(&mut self) -> Option<Station> {
        self.focus_gained();
        let selected = match (self.matches.len(), self.phase) {
            (0, _) => None,
            (1, _) => Some(0),
            (_, SearchPhase::Navigating { cursor }) => Some(cursor),
            _ => None,
        }?;
        let station = self.matches[selected].item.clone();
        Some(self.commit(station))
    }

    /// Commit the match at `position` in the current list.
    pub fn click(&mut self, position: usize) -> Option<Station> {
        let station = self.matches.get(position)?.item.clone();
        Some(self.commit(station))
    }

    /// Clear query and matches and hand back the chosen station.
    ///
    /// The index is left untouched.
    pub fn commit(&mut self, station: Station) -> Station {
        debug!(station = %station.code, "station selected");
        self.query.clear();
        self.matches.clear();
        self.phase = self.phase_without_cursor();
        station
    }

    /// Focus returns to the search box.
    pub fn focus_gained(&mut self) {
        if let SearchPhase::Idle { cursor } = self.phase {
            self.phase = match cursor {
                Some(cursor) => SearchPhase::Navigating { cursor },
                None => SearchPhase::Focused,
            };
        }
    }

    /// Focus leaves the search box.
    ///
    /// Ignored while the pointer is over the results, so clicking a match
    /// does not hide the overlay before the click lands. Otherwise the
    /// cursor is parked on the first match.
    pub fn focus_lost(&mut self) {
        if self.pointer_over_results {
            return;
        }
        let cursor = (!self.matches.is_empty()).then_some(0);
        self.phase = SearchPhase::Idle { cursor };
    }

    /// Same focus state, no highlighted match.
    fn phase_without_cursor(&self) -> SearchPhase {
        match self.phase {
            SearchPhase::Idle { .. } => SearchPhase::Idle { cursor: None },
            _ => SearchPhase::Focused,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StationCode;

    fn station(name: &str, code: &str) -> Station {
        Station::new(name, StationCode::parse(code).unwrap())
    }

    fn session() -> SearchSession {
        let mut session = SearchSession::default();
        session.set_stations(vec![
            station("Belfast", "BFF"),
            station("Dun Laoghaire", "DRL"),
            station("Dublin Connolly", "CNLLY"),
            station("Dublin Heuston", "HSTON"),
            station("Dublin Pearse", "PERSE"),
        ]);
        session.focus_gained();
        session
    }

    #[test]
    fn text_change_queries_and_resets_cursor() {
        let mut s = session();
        s.text_changed("dublin");
        assert_eq!(s.matches().len(), 3);
        assert_eq!(s.cursor(), None);

        s.arrow_down();
        assert_eq!(s.cursor(), Some(0));

        s.text_changed("dublin h");
        assert_eq!(s.cursor(), None);
        assert_eq!(s.query(), "dublin h");
    }

    #[test]
    fn not_ready_means_no_matches() {
        let mut s = SearchSession::default();
        assert!(!s.is_ready());
        s.text_changed("belfast");
        assert!(s.matches().is_empty());
        assert_eq!(s.query(), "belfast");
    }

    #[test]
    fn arrow_navigation_bounds() {
        let mut s = session();
        s.text_changed("dublin");

        s.arrow_up();
        assert_eq!(s.cursor(), None, "up with nothing highlighted");

        s.arrow_down();
        s.arrow_up();
        assert_eq!(s.cursor(), Some(0), "up at the top is a no-op");

        s.arrow_down();
        s.arrow_down();
        assert_eq!(s.cursor(), Some(2));
        s.arrow_down();
        assert_eq!(s.cursor(), Some(2), "down at the bottom is a no-op");

        s.arrow_up();
        assert_eq!(s.cursor(), Some(1));
    }

    #[test]
    fn arrow_down_without_matches() {
        let mut s = session();
        s.text_changed("zzz");
        s.arrow_down();
        assert_eq!(s.cursor(), None);
    }

    #[test]
    fn enter_with_single_match_selects_it() {
        let mut s = session();
        s.text_changed("belfst");
        assert_eq!(s.matches().len(), 1);
        let selected = s.enter().unwrap();
        assert_eq!(selected.name, "Belfast");
        assert_eq!(s.query(), "");
        assert!(s.matches().is_empty());
        assert_eq!(s.cursor(), None);
    }

    #[test]
    fn enter_selects_first_match() {
        // The first match must be selectable; position 0 is not "nothing".
        let mut s = session();
        s.text_changed("dublin");
        s.arrow_down();
        let selected = s.enter().unwrap();
        assert_eq!(selected.name, "Dublin Connolly");
    }

    #[test]
    fn enter_without_cursor_and_many_matches_is_noop() {
        let mut s = session();
        s.text_changed("dublin");
        assert!(s.enter().is_none());
        assert_eq!(s.query(), "dublin");
        assert_eq!(s.matches().len(), 3);
    }

    #[test]
    fn enter_without_matches_is_noop() {
        let mut s = session();
        s.text_changed("zzz");
        assert!(s.enter().is_none());
    }

    #[test]
    fn enter_selects_highlighted() {
        let mut s = session();
        s.text_changed("dublin");
        s.arrow_down();
        s.arrow_down();
        let selected = s.enter().unwrap();
        assert_eq!(selected.name, "Dublin Heuston");
    }

    #[test]
    fn click_selects_position() {
        let mut s = session();
        s.text_changed("dublin");
        assert!(s.click(7).is_none());
        let selected = s.click(2).unwrap();
        assert_eq!(selected.name, "Dublin Pearse");
        assert!(s.matches().is_empty());
    }

    #[test]
    fn external_select_commits_directly() {
        let mut s = session();
        s.text_changed("dublin");
        s.arrow_down();
        let chosen = station("Bray", "BRAY");
        let out = s.handle(SearchEvent::ExternalSelect(chosen.clone()));
        assert_eq!(out, Some(chosen));
        assert_eq!(s.query(), "");
        assert!(s.matches().is_empty());
        assert_eq!(s.cursor(), None);
        // Index untouched
        assert_eq!(s.stations().len(), 5);
    }

    #[test]
    fn focus_lost_parks_cursor_on_first_match() {
        let mut s = session();
        s.text_changed("dublin");
        s.arrow_down();
        s.arrow_down();
        s.focus_lost();
        assert!(!s.has_focus());
        assert!(!s.overlay_visible());
        assert_eq!(s.cursor(), Some(0));

        s.focus_gained();
        assert_eq!(s.phase(), SearchPhase::Navigating { cursor: 0 });
    }

    #[test]
    fn focus_lost_without_matches_has_no_cursor() {
        let mut s = session();
        s.focus_lost();
        assert_eq!(s.phase(), SearchPhase::Idle { cursor: None });
    }

    #[test]
    fn focus_lost_ignored_while_pointer_over_results() {
        let mut s = session();
        s.text_changed("dublin");
        s.handle(SearchEvent::PointerEntered);
        s.handle(SearchEvent::FocusLost);
        assert!(s.has_focus());
        assert!(s.overlay_visible());

        s.handle(SearchEvent::PointerLeft);
        s.handle(SearchEvent::FocusLost);
        assert!(!s.has_focus());
    }

    #[test]
    fn new_station_list_drops_stale_matches() {
        let mut s = session();
        s.text_changed("dublin");
        s.arrow_down();
        s.set_stations(vec![station("Galway", "GALWY")]);
        assert!(s.matches().is_empty());
        assert_eq!(s.cursor(), None);

        s.text_changed("dublin");
        assert!(s.matches().is_empty());
        s.text_changed("galway");
        assert_eq!(s.matches()[0].item.name, "Galway");
    }

    #[test]
    fn max_matches_respected() {
        let mut s = SearchSession::new(2);
        s.set_stations((0..5).map(|i| station(&format!("Dublin {}", i), &format!("D{}", i))));
        s.text_changed("dublin");
        assert_eq!(s.matches().len(), 2);
    }
}
