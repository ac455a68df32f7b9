use crate::record::ImageRecord;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Next,
    Previous,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Next => write!(f, "next"),
            Direction::Previous => write!(f, "previous"),
        }
    }
}

/// Outcome of moving the cursor.
#[derive(Debug, PartialEq, Eq)]
pub enum Step<'a> {
    Moved(&'a ImageRecord),
    /// The cursor is already at the edge (or the list is empty); nothing moved.
    Exhausted,
}

/// The current picture list and the cursor into it.
///
/// The list is only ever replaced wholesale. Whenever it is non-empty the
/// cursor is a valid index.
#[derive(Debug, Clone, Default)]
pub struct Slideshow {
    pictures: Vec<ImageRecord>,
    cursor: usize,
}

impl Slideshow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, pictures: Vec<ImageRecord>) {
        log::debug!("Slideshow replaced with {} pictures", pictures.len());
        self.pictures = pictures;
        self.cursor = 0;
    }

    pub fn advance(&mut self, direction: Direction) -> Step<'_> {
        if self.pictures.is_empty() {
            return Step::Exhausted;
        }

        match direction {
            Direction::Next => {
                if self.cursor + 1 >= self.pictures.len() {
                    return Step::Exhausted;
                }
                self.cursor += 1;
            }
            Direction::Previous => {
                if self.cursor == 0 {
                    return Step::Exhausted;
                }
                self.cursor -= 1;
            }
        }

        Step::Moved(&self.pictures[self.cursor])
    }

    pub fn current(&self) -> Option<&ImageRecord> {
        self.pictures.get(self.cursor)
    }

    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.pictures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pictures.is_empty()
    }

    pub fn pictures(&self) -> &[ImageRecord] {
        &self.pictures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn show(n: usize) -> Slideshow {
        let mut show = Slideshow::new();
        show.replace(
            (1..=n)
                .map(|i| ImageRecord::new(format!("/test/{}.jpg", i)))
                .collect(),
        );
        show
    }

    #[test]
    fn test_next_stops_at_last_picture() {
        let mut show = show(3);

        assert_eq!(show.current().unwrap().image_url, "/test/1.jpg");
        assert!(matches!(show.advance(Direction::Next), Step::Moved(r) if r.image_url == "/test/2.jpg"));
        assert!(matches!(show.advance(Direction::Next), Step::Moved(r) if r.image_url == "/test/3.jpg"));

        // Boundary: cursor stays put
        assert_eq!(show.advance(Direction::Next), Step::Exhausted);
        assert_eq!(show.position(), 2);
        assert_eq!(show.advance(Direction::Next), Step::Exhausted);
        assert_eq!(show.position(), 2);
    }

    #[test]
    fn test_previous_stops_at_first_picture() {
        let mut show = show(2);

        assert_eq!(show.advance(Direction::Previous), Step::Exhausted);
        assert_eq!(show.position(), 0);

        show.advance(Direction::Next);
        assert!(matches!(show.advance(Direction::Previous), Step::Moved(r) if r.image_url == "/test/1.jpg"));
        assert_eq!(show.position(), 0);
    }

    #[test]
    fn test_empty_list_never_moves() {
        let mut show = Slideshow::new();

        assert_eq!(show.advance(Direction::Next), Step::Exhausted);
        assert_eq!(show.advance(Direction::Previous), Step::Exhausted);
        assert!(show.current().is_none());
    }

    #[test]
    fn test_replace_resets_cursor() {
        let mut show = show(4);
        show.advance(Direction::Next);
        show.advance(Direction::Next);
        assert_eq!(show.position(), 2);

        show.replace(vec![ImageRecord::new("/other/a.jpg")]);
        assert_eq!(show.position(), 0);
        assert_eq!(show.len(), 1);
        assert_eq!(show.current().unwrap().image_url, "/other/a.jpg");
    }

    #[test]
    fn test_cursor_stays_in_bounds_under_any_walk() {
        let mut show = show(5);
        let walk = [
            Direction::Previous,
            Direction::Next,
            Direction::Next,
            Direction::Next,
            Direction::Next,
            Direction::Next,
            Direction::Next,
            Direction::Previous,
            Direction::Previous,
            Direction::Previous,
            Direction::Previous,
            Direction::Previous,
            Direction::Previous,
        ];

        for direction in walk {
            show.advance(direction);
            assert!(show.position() < show.len());
        }
    }
}
