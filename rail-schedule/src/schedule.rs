//! Sortable projection of a station's train list.
//!
//! The view keeps the rows in the order they arrived from the source and
//! derives the displayed order from that snapshot plus the sort state, so
//! switching back to "unsorted" restores the fetch order exactly.

use std::cmp::Ordering;

use crate::domain::Train;

/// Sortable columns of the schedule table, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScheduleColumn {
    Due,
    Departs,
    From,
    To,
    Ends,
    LastSeen,
}

impl ScheduleColumn {
    /// All columns in display order.
    pub const ALL: [ScheduleColumn; 6] = [
        ScheduleColumn::Due,
        ScheduleColumn::Departs,
        ScheduleColumn::From,
        ScheduleColumn::To,
        ScheduleColumn::Ends,
        ScheduleColumn::LastSeen,
    ];

    /// Header label.
    pub fn label(self) -> &'static str {
        match self {
            ScheduleColumn::Due => "Due",
            ScheduleColumn::Departs => "Departs",
            ScheduleColumn::From => "From",
            ScheduleColumn::To => "To",
            ScheduleColumn::Ends => "Ends",
            ScheduleColumn::LastSeen => "Last Seen",
        }
    }

    /// Name of the source field the column shows.
    pub fn field_key(self) -> &'static str {
        match self {
            ScheduleColumn::Due => "Exparrival",
            ScheduleColumn::Departs => "Expdepart",
            ScheduleColumn::From => "Origin",
            ScheduleColumn::To => "Destination",
            ScheduleColumn::Ends => "Destinationtime",
            ScheduleColumn::LastSeen => "Lastlocation",
        }
    }

    /// The raw value of this column for `train`.
    pub fn value(self, train: &Train) -> &str {
        match self {
            ScheduleColumn::Due => &train.expected_arrival,
            ScheduleColumn::Departs => &train.expected_departure,
            ScheduleColumn::From => &train.origin,
            ScheduleColumn::To => &train.destination,
            ScheduleColumn::Ends => &train.destination_time,
            ScheduleColumn::LastSeen => &train.last_location,
        }
    }
}

/// Sort direction of the active column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
    Unsorted,
}

impl SortDirection {
    /// +1 ascending, -1 descending, 0 unsorted.
    pub fn sign(self) -> i8 {
        match self {
            SortDirection::Ascending => 1,
            SortDirection::Descending => -1,
            SortDirection::Unsorted => 0,
        }
    }

    /// Next direction when the same column is selected again.
    fn cycle(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Unsorted,
            SortDirection::Unsorted => SortDirection::Ascending,
        }
    }
}

/// Active column and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub column: ScheduleColumn,
    pub direction: SortDirection,
}

impl Default for SortState {
    /// Departure time, earliest first.
    fn default() -> Self {
        Self {
            column: ScheduleColumn::Departs,
            direction: SortDirection::Ascending,
        }
    }
}

impl SortState {
    /// State after the user selects `column`.
    ///
    /// A different column starts ascending; the same column cycles
    /// ascending, descending, unsorted.
    pub fn select(self, column: ScheduleColumn) -> Self {
        if column == self.column {
            Self {
                column,
                direction: self.direction.cycle(),
            }
        } else {
            Self {
                column,
                direction: SortDirection::Ascending,
            }
        }
    }
}

/// Order `rows` by `column` in `direction`.
///
/// Ties keep their relative order. `Unsorted` returns the rows as given.
pub fn sort_rows(rows: &[Train], column: ScheduleColumn, direction: SortDirection) -> Vec<&Train> {
    sorted_order(rows, column, direction)
        .into_iter()
        .map(|i| &rows[i])
        .collect()
}

/// Indices of `rows` in display order.
fn sorted_order(rows: &[Train], column: ScheduleColumn, direction: SortDirection) -> Vec<usize> {
    let mut order: Vec<usize> = (0..rows.len()).collect();
    let compare = |a: &usize, b: &usize| -> Ordering {
        column.value(&rows[*a]).cmp(column.value(&rows[*b]))
    };
    match direction {
        SortDirection::Ascending => order.sort_by(compare),
        SortDirection::Descending => order.sort_by(|a, b| compare(b, a)),
        SortDirection::Unsorted => {}
    }
    order
}

/// A station's trains plus the user's sort choice.
#[derive(Debug, Clone, Default)]
pub struct ScheduleView {
    /// Rows in fetch order.
    original: Vec<Train>,
    state: SortState,
    /// Indices into `original`, in display order.
    order: Vec<usize>,
}

impl ScheduleView {
    /// Create a view sorted by the default state.
    pub fn new(rows: Vec<Train>) -> Self {
        Self::with_state(rows, SortState::default())
    }

    /// Create a view with an explicit sort state.
    pub fn with_state(rows: Vec<Train>, state: SortState) -> Self {
        let mut view = Self {
            original: rows,
            state,
            order: Vec::new(),
        };
        view.recompute();
        view
    }

    /// Install a fresh fetch, keeping the current sort state.
    pub fn replace_rows(&mut self, rows: Vec<Train>) {
        self.original = rows;
        self.recompute();
    }

    /// Apply a header selection.
    pub fn select_column(&mut self, column: ScheduleColumn) {
        self.state = self.state.select(column);
        self.recompute();
    }

    pub fn state(&self) -> SortState {
        self.state
    }

    /// Rows in fetch order.
    pub fn original_rows(&self) -> &[Train] {
        &self.original
    }

    /// Rows in display order.
    pub fn rows(&self) -> impl Iterator<Item = &Train> {
        self.order.iter().map(|&i| &self.original[i])
    }

    pub fn len(&self) -> usize {
        self.original.len()
    }

    pub fn is_empty(&self) -> bool {
        self.original.is_empty()
    }

    /// Header cells: label plus the direction arrow to draw, if any.
    pub fn header(&self) -> Vec<(&'static str, Option<SortDirection>)> {
        ScheduleColumn::ALL
            .iter()
            .map(|&column| {
                let arrow = (column == self.state.column
                    && self.state.direction != SortDirection::Unsorted)
                    .then_some(self.state.direction);
                (column.label(), arrow)
            })
            .collect()
    }

    fn recompute(&mut self) {
        self.order = sorted_order(&self.original, self.state.column, self.state.direction);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Direction, StationCode, TrainCode};

    fn train(code: &str, departs: &str, destination: &str) -> Train {
        Train {
            server_time: String::new(),
            code: TrainCode::parse(code).unwrap(),
            station_name: "Bray".into(),
            station_code: StationCode::parse("BRAY").unwrap(),
            query_time: String::new(),
            train_date: "05 Mar 2024".into(),
            origin: "Howth".into(),
            destination: destination.into(),
            origin_time: String::new(),
            destination_time: String::new(),
            status: "En Route".into(),
            last_location: String::new(),
            due_in: None,
            late: None,
            expected_arrival: departs.into(),
            expected_departure: departs.into(),
            scheduled_arrival: departs.into(),
            scheduled_departure: departs.into(),
            direction: Direction::Southbound,
            train_type: "DART".into(),
            location_type: "S".into(),
        }
    }

    fn fetched() -> Vec<Train> {
        vec![
            train("E101", "14:30", "Greystones"),
            train("E102", "14:05", "Bray"),
            train("E103", "14:45", "Malahide"),
            train("E104", "14:05", "Howth"),
        ]
    }

    fn codes<'a>(rows: impl Iterator<Item = &'a Train>) -> Vec<&'a str> {
        rows.map(|t| t.code.as_str()).collect()
    }

    #[test]
    fn default_sorts_by_departure() {
        let view = ScheduleView::new(fetched());
        assert_eq!(view.state(), SortState::default());
        assert_eq!(codes(view.rows()), vec!["E102", "E104", "E101", "E103"]);
    }

    #[test]
    fn column_cycle() {
        let mut view = ScheduleView::with_state(
            fetched(),
            SortState {
                column: ScheduleColumn::Departs,
                direction: SortDirection::Unsorted,
            },
        );

        view.select_column(ScheduleColumn::To);
        assert_eq!(view.state().direction, SortDirection::Ascending);
        assert_eq!(codes(view.rows()), vec!["E102", "E101", "E104", "E103"]);

        view.select_column(ScheduleColumn::To);
        assert_eq!(view.state().direction, SortDirection::Descending);
        assert_eq!(codes(view.rows()), vec!["E103", "E104", "E101", "E102"]);

        view.select_column(ScheduleColumn::To);
        assert_eq!(view.state().direction, SortDirection::Unsorted);
        assert_eq!(codes(view.rows()), vec!["E101", "E102", "E103", "E104"]);

        view.select_column(ScheduleColumn::To);
        assert_eq!(view.state().direction, SortDirection::Ascending);
    }

    #[test]
    fn unsorted_restores_fetch_order_not_reverse() {
        // Ties in the sort column would come back in a different order if
        // "unsorted" merely reversed the descending sort.
        let mut view = ScheduleView::new(fetched());
        view.select_column(ScheduleColumn::Departs); // descending
        view.select_column(ScheduleColumn::Departs); // unsorted
        assert_eq!(
            codes(view.rows()),
            codes(view.original_rows().iter())
        );
    }

    #[test]
    fn new_column_starts_ascending() {
        let mut view = ScheduleView::new(fetched());
        view.select_column(ScheduleColumn::Departs);
        assert_eq!(view.state().direction, SortDirection::Descending);
        view.select_column(ScheduleColumn::From);
        assert_eq!(
            view.state(),
            SortState {
                column: ScheduleColumn::From,
                direction: SortDirection::Ascending
            }
        );
    }

    #[test]
    fn ascending_is_ordered() {
        let view = ScheduleView::new(fetched());
        let rows: Vec<_> = view.rows().collect();
        for pair in rows.windows(2) {
            assert!(pair[0].expected_departure <= pair[1].expected_departure);
        }
    }

    #[test]
    fn replace_rows_keeps_state() {
        let mut view = ScheduleView::new(fetched());
        view.select_column(ScheduleColumn::Departs);
        view.replace_rows(vec![train("A1", "09:00", "Cork"), train("A2", "10:00", "Cork")]);
        assert_eq!(view.state().direction, SortDirection::Descending);
        assert_eq!(codes(view.rows()), vec!["A2", "A1"]);
    }

    #[test]
    fn header_marks_active_column() {
        let mut view = ScheduleView::new(fetched());
        let header = view.header();
        assert_eq!(header.len(), 6);
        assert_eq!(header[1], ("Departs", Some(SortDirection::Ascending)));
        assert_eq!(header[0], ("Due", None));

        view.select_column(ScheduleColumn::Departs);
        view.select_column(ScheduleColumn::Departs);
        assert!(view.header().iter().all(|(_, arrow)| arrow.is_none()));
    }

    #[test]
    fn columns_and_fields() {
        let labels: Vec<_> = ScheduleColumn::ALL.iter().map(|c| c.label()).collect();
        assert_eq!(labels, vec!["Due", "Departs", "From", "To", "Ends", "Last Seen"]);
        assert_eq!(ScheduleColumn::Due.field_key(), "Exparrival");
        assert_eq!(ScheduleColumn::LastSeen.field_key(), "Lastlocation");
    }

    #[test]
    fn sort_rows_function() {
        let rows = fetched();
        let asc = sort_rows(&rows, ScheduleColumn::Departs, SortDirection::Ascending);
        assert_eq!(codes(asc.into_iter()), vec!["E102", "E104", "E101", "E103"]);
        let none = sort_rows(&rows, ScheduleColumn::Departs, SortDirection::Unsorted);
        assert_eq!(codes(none.into_iter()), vec!["E101", "E102", "E103", "E104"]);
        assert_eq!(SortDirection::Descending.sign(), -1);
    }

    #[test]
    fn empty_view() {
        let view = ScheduleView::default();
        assert!(view.is_empty());
        assert_eq!(view.rows().count(), 0);
    }
}
