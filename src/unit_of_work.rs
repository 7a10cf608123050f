//! Transactional scope shared by every mutating operation.
//!
//! The outermost scope begins a transaction on the adapter and commits it when the
//! work succeeds. Nested scopes join the outermost transaction through a savepoint:
//! success releases it, and a nested failure only undoes the nested scope's writes.
//! A scope dropped without committing, because the work failed or panicked, rolls
//! back to where it began.

use std::cell::Cell;

use tracing::{debug, warn};

use crate::{adapter::GraphAdapter, errors::FrameGraphError};

/// Nesting depth of open units of work for one graph context.
#[derive(Debug, Default)]
pub(crate) struct UnitDepth(Cell<usize>);

impl UnitDepth {
    pub(crate) fn get(&self) -> usize {
        self.0.get()
    }
}

/// Guard over one (possibly nested) unit of work.
pub(crate) struct UnitOfWork<'a> {
    adapter: &'a dyn GraphAdapter,
    depth: &'a UnitDepth,
    /// `None` for the outermost unit, which owns the transaction.
    savepoint: Option<String>,
    committed: bool,
}

impl<'a> UnitOfWork<'a> {
    pub(crate) fn begin(
        adapter: &'a dyn GraphAdapter,
        depth: &'a UnitDepth,
    ) -> Result<Self, FrameGraphError> {
        let level = depth.get();
        let savepoint = if level == 0 {
            adapter.begin()?;
            None
        } else {
            let name = format!("unit_{level}");
            adapter.savepoint(&name)?;
            Some(name)
        };
        depth.0.set(level + 1);
        Ok(Self {
            adapter,
            depth,
            savepoint,
            committed: false,
        })
    }

    pub(crate) fn commit(mut self) -> Result<(), FrameGraphError> {
        match &self.savepoint {
            None => self.adapter.commit()?,
            Some(name) => self.adapter.release_savepoint(name)?,
        }
        self.committed = true;
        Ok(())
    }

    /// Runs `f` inside this unit, committing on `Ok` and rolling back otherwise.
    pub(crate) fn run<R, F>(self, f: F) -> Result<R, FrameGraphError>
    where
        F: FnOnce() -> Result<R, FrameGraphError>,
    {
        let result = f()?;
        self.commit()?;
        Ok(result)
    }
}

impl Drop for UnitOfWork<'_> {
    fn drop(&mut self) {
        self.depth.0.set(self.depth.get().saturating_sub(1));
        if self.committed {
            return;
        }
        match &self.savepoint {
            None => {
                warn!("unit of work aborted, rolling back");
                if let Err(err) = self.adapter.rollback() {
                    warn!(error = %err, "rollback failed");
                }
            }
            Some(name) => {
                debug!(savepoint = %name, "nested unit of work aborted");
                if let Err(err) = self.adapter.rollback_to_savepoint(name) {
                    warn!(savepoint = %name, error = %err, "savepoint rollback failed");
                }
            }
        }
    }
}
