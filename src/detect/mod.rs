//! Header-row detection.
//!
//! Exports often carry a title block or notes above the real header row, so
//! the header is searched for in the first few rows of each grid. A row is
//! accepted when it has enough filled cells and a [`HeaderClassifier`] says it
//! looks like a header. The first accepted row wins.

use crate::config::{DetectionConfig, MatchMode};
use crate::error::{FusionError, Result};
use crate::model::{Cell, filled_count};

/// Decides whether a row looks like a header row.
pub trait HeaderClassifier {
    fn classify(&self, row: &[Cell]) -> bool;
}

/// Classifier that accepts a row when one of its cells matches a known
/// header term.
#[derive(Debug, Clone, PartialEq)]
pub struct VocabularyClassifier {
    terms: Vec<String>,
    mode: MatchMode,
}

impl VocabularyClassifier {
    pub fn new<I, S>(terms: I, mode: MatchMode) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let terms = terms
            .into_iter()
            .map(|term| term.as_ref().trim().to_lowercase())
            .filter(|term| !term.is_empty())
            .collect();
        Self { terms, mode }
    }

    fn matches(&self, cell: &Cell) -> bool {
        let Cell::Text(value) = cell else {
            return false;
        };
        let value = value.trim().to_lowercase();
        if value.is_empty() {
            return false;
        }
        match self.mode {
            MatchMode::Exact => self.terms.iter().any(|term| *term == value),
            MatchMode::Contains => self.terms.iter().any(|term| value.contains(term.as_str())),
        }
    }
}

impl Default for VocabularyClassifier {
    fn default() -> Self {
        let config = DetectionConfig::default();
        Self::new(&config.header_terms, config.match_mode)
    }
}

impl HeaderClassifier for VocabularyClassifier {
    fn classify(&self, row: &[Cell]) -> bool {
        row.iter().any(|cell| self.matches(cell))
    }
}

/// Per-row evaluation produced while scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderCandidateScore {
    pub filled: usize,
    pub looks_like_header: bool,
}

/// Locates the header row of a grid.
pub struct HeaderLocator<C = VocabularyClassifier> {
    classifier: C,
    scan_window: usize,
    min_filled_cells: usize,
}

impl HeaderLocator<VocabularyClassifier> {
    /// Builds a locator using the vocabulary classifier described by `config`.
    pub fn from_config(config: &DetectionConfig) -> Self {
        Self::new(
            VocabularyClassifier::new(&config.header_terms, config.match_mode),
            config.scan_window,
            config.min_filled_cells,
        )
    }
}

impl Default for HeaderLocator<VocabularyClassifier> {
    fn default() -> Self {
        Self::from_config(&DetectionConfig::default())
    }
}

impl<C: HeaderClassifier> HeaderLocator<C> {
    pub fn new(classifier: C, scan_window: usize, min_filled_cells: usize) -> Self {
        Self {
            classifier,
            scan_window,
            min_filled_cells,
        }
    }

    pub fn score(&self, row: &[Cell]) -> HeaderCandidateScore {
        HeaderCandidateScore {
            filled: filled_count(row),
            looks_like_header: self.classifier.classify(row),
        }
    }

    fn qualifies(&self, score: HeaderCandidateScore) -> bool {
        score.filled >= self.min_filled_cells && score.looks_like_header
    }

    /// Returns the index of the first qualifying row within the scan window.
    ///
    /// Fails with [`FusionError::EmptyFile`] for a grid without rows and with
    /// [`FusionError::HeaderNotFound`] when no scanned row qualifies.
    pub fn locate(&self, grid: &[Vec<Cell>]) -> Result<usize> {
        if grid.is_empty() {
            return Err(FusionError::EmptyFile);
        }
        let scanned = grid.len().min(self.scan_window);
        grid.iter()
            .take(scanned)
            .position(|row| self.qualifies(self.score(row)))
            .ok_or(FusionError::HeaderNotFound { scanned })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<Cell> {
        cells.iter().map(|cell| Cell::from(*cell)).collect()
    }

    fn header() -> Vec<Cell> {
        row(&["Title", "Composer", "Artist", "Album", "Year"])
    }

    #[test]
    fn finds_header_below_title_block() {
        let grid = vec![
            row(&["My library export"]),
            row(&[]),
            row(&["", "", "", "", ""]),
            header(),
            row(&["Song", "Bach", "Ann", "Best of", "1999"]),
        ];
        assert_eq!(HeaderLocator::default().locate(&grid).expect("header"), 3);
    }

    #[test]
    fn vocabulary_match_ignores_case_and_padding() {
        let grid = vec![row(&["  TITLE ", "a", "b", "c", "d"])];
        assert_eq!(HeaderLocator::default().locate(&grid).expect("header"), 0);
    }

    #[test]
    fn wide_row_without_vocabulary_is_rejected() {
        let grid = vec![
            row(&["id", "name", "length", "genre", "rating", "plays"]),
            row(&["1", "Song", "3:10", "Jazz", "5", "12"]),
        ];
        let result = HeaderLocator::default().locate(&grid);
        assert!(matches!(result, Err(FusionError::HeaderNotFound { scanned: 2 })));
    }

    #[test]
    fn narrow_row_with_vocabulary_is_rejected() {
        let grid = vec![row(&["Title", "Artist", "", "", ""]), header()];
        assert_eq!(HeaderLocator::default().locate(&grid).expect("header"), 1);
    }

    #[test]
    fn filled_cell_threshold_is_inclusive() {
        let four = row(&["Title", "Composer", "Artist", "Album", ""]);
        let five = row(&["Title", "Composer", "Artist", "Album", "Year"]);
        let locator = HeaderLocator::default();
        assert_eq!(locator.score(&four).filled, 4);
        assert!(matches!(
            locator.locate(&[four.clone()]),
            Err(FusionError::HeaderNotFound { scanned: 1 })
        ));
        assert_eq!(locator.locate(&[four, five]).expect("header"), 1);
    }

    #[test]
    fn first_qualifying_row_wins() {
        let grid = vec![row(&["x"]), header(), header()];
        assert_eq!(HeaderLocator::default().locate(&grid).expect("header"), 1);
    }

    #[test]
    fn rows_beyond_scan_window_are_ignored() {
        let mut grid: Vec<Vec<Cell>> = (0..10).map(|_| row(&["junk"])).collect();
        grid.push(header());
        let result = HeaderLocator::default().locate(&grid);
        assert!(matches!(result, Err(FusionError::HeaderNotFound { scanned: 10 })));
    }

    #[test]
    fn empty_grid_is_reported() {
        let result = HeaderLocator::default().locate(&[]);
        assert!(matches!(result, Err(FusionError::EmptyFile)));
    }

    #[test]
    fn numeric_cells_never_match_vocabulary() {
        let classifier = VocabularyClassifier::new(["1999"], MatchMode::Exact);
        assert!(!classifier.classify(&[Cell::Number(1999.0)]));
        assert!(classifier.classify(&[Cell::text("1999")]));
    }

    #[test]
    fn contains_mode_accepts_decorated_terms() {
        let grid = vec![row(&["Track Title", "Main Artist", "Label", "Genre", "Year"])];
        let exact = HeaderLocator::default();
        assert!(exact.locate(&grid).is_err());

        let config = DetectionConfig {
            match_mode: MatchMode::Contains,
            ..DetectionConfig::default()
        };
        let loose = HeaderLocator::from_config(&config);
        assert_eq!(loose.locate(&grid).expect("header"), 0);
    }

    #[test]
    fn custom_classifier_plugs_in() {
        struct FirstCellIsHash;
        impl HeaderClassifier for FirstCellIsHash {
            fn classify(&self, row: &[Cell]) -> bool {
                matches!(row.first(), Some(Cell::Text(value)) if value == "#")
            }
        }

        let grid = vec![row(&["Title", "b"]), row(&["#", "b"])];
        let locator = HeaderLocator::new(FirstCellIsHash, 10, 2);
        assert_eq!(locator.locate(&grid).expect("header"), 1);
    }

    #[test]
    fn located_index_always_qualifies() {
        let locator = HeaderLocator::default();
        let grids = vec![
            vec![header()],
            vec![row(&["a"]), row(&["b", "c"]), header()],
            vec![row(&["Title"]); 12],
        ];
        for grid in grids {
            if let Ok(index) = locator.locate(&grid) {
                assert!(index < grid.len().min(10));
                let score = locator.score(&grid[index]);
                assert!(score.filled >= 5 && score.looks_like_header);
            }
        }
    }
}
