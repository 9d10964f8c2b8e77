//! Lazy, forward-only cursors over backend rows.
//!
//! A [`Cursor`] sequences pulls from a backend-supplied [`RowSource`] and
//! enforces the single-pass contract: once the source reports exhaustion the
//! resource is released and every later pull yields `None`. Release happens
//! exactly once on every exit path because [`Drop`] closes whatever is still
//! open.

use std::fmt;
use std::iter::FusedIterator;

use log::{debug, trace};
use strata_foundation::{Result, Row};

/// Backend hook supplying raw rows to a [`Cursor`].
///
/// Implementations own the live resource (statement handle, socket, file).
/// `next_row` returns `Ok(None)` on natural exhaustion; `close` releases the
/// resource and is called at most once by the owning cursor.
pub trait RowSource {
    /// Pulls the next raw row.
    ///
    /// # Errors
    ///
    /// Returns the backend's error unchanged; the cursor does not retry.
    fn next_row(&mut self) -> Result<Option<Row>>;

    /// Releases the underlying resource.
    fn close(&mut self);
}

/// Single-pass lazy sequence of raw backend rows.
pub struct Cursor {
    resource: Option<Box<dyn RowSource>>,
    current: Option<Row>,
    position: usize,
}

impl Cursor {
    /// Creates a cursor over an open resource.
    #[must_use]
    pub fn new(resource: impl RowSource + 'static) -> Self {
        Self {
            resource: Some(Box::new(resource)),
            current: None,
            position: 0,
        }
    }

    /// Creates a cursor from an already boxed resource.
    #[must_use]
    pub fn from_boxed(resource: Box<dyn RowSource>) -> Self {
        Self {
            resource: Some(resource),
            current: None,
            position: 0,
        }
    }

    /// Creates a cursor whose resource was never opened.
    ///
    /// Every pull signals exhaustion.
    #[must_use]
    pub fn closed() -> Self {
        Self {
            resource: None,
            current: None,
            position: 0,
        }
    }

    /// Returns true while the resource is open.
    #[must_use]
    pub fn valid(&self) -> bool {
        self.resource.is_some()
    }

    /// Returns the number of rows pulled so far.
    #[must_use]
    pub fn key(&self) -> usize {
        self.position
    }

    /// Returns the most recently pulled row.
    #[must_use]
    pub fn current(&self) -> Option<&Row> {
        self.current.as_ref()
    }

    /// Releases the resource. Closing a closed cursor is a no-op.
    pub fn close(&mut self) {
        if let Some(mut resource) = self.resource.take() {
            resource.close();
            debug!(
                "event=cursor_close module=cursor status=ok rows={}",
                self.position
            );
        }
    }
}

impl Iterator for Cursor {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        let Some(resource) = self.resource.as_mut() else {
            self.current = None;
            return None;
        };

        match resource.next_row() {
            Ok(Some(row)) => {
                self.position += 1;
                trace!(
                    "event=cursor_pull module=cursor status=ok position={}",
                    self.position
                );
                self.current = Some(row.clone());
                Some(Ok(row))
            }
            Ok(None) => {
                self.current = None;
                self.close();
                None
            }
            Err(err) => {
                debug!(
                    "event=cursor_pull module=cursor status=error position={} error={}",
                    self.position, err
                );
                Some(Err(err))
            }
        }
    }
}

impl FusedIterator for Cursor {}

impl Drop for Cursor {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("open", &self.valid())
            .field("position", &self.position)
            .finish_non_exhaustive()
    }
}

/// In-memory [`RowSource`] over a fixed list of rows.
#[derive(Debug, Clone, Default)]
pub struct VecRows {
    rows: std::collections::VecDeque<Row>,
}

impl VecRows {
    /// Creates a row source yielding `rows` in order.
    #[must_use]
    pub fn new(rows: impl IntoIterator<Item = Row>) -> Self {
        Self {
            rows: rows.into_iter().collect(),
        }
    }
}

impl RowSource for VecRows {
    fn next_row(&mut self) -> Result<Option<Row>> {
        Ok(self.rows.pop_front())
    }

    fn close(&mut self) {
        self.rows.clear();
    }
}

impl From<Vec<Row>> for Cursor {
    fn from(rows: Vec<Row>) -> Self {
        Self::new(VecRows::new(rows))
    }
}
