//! Fixed-size pool of backend connections, handed out round-robin.

use crate::balance::RotatingIndex;
use crate::error::PoolError;

/// Ordered, immutable set of connection handles shared by all callers.
///
/// The pool never checks liveness and never closes its handles; whoever
/// created the connections owns their shutdown.
#[derive(Debug)]
pub struct ConnectionPool<C> {
    connections: Vec<C>,
    index: RotatingIndex,
}

impl<C> ConnectionPool<C> {
    /// Builds a pool over `connections`, in the given order.
    ///
    /// # Errors
    /// Returns [`PoolError::Empty`] if `connections` is empty.
    pub fn new(connections: Vec<C>) -> Result<Self, PoolError> {
        if connections.is_empty() {
            return Err(PoolError::Empty);
        }
        let index = RotatingIndex::new(connections.len())?;
        Ok(Self { connections, index })
    }

    /// Returns the next connection in the rotation.
    ///
    /// Never blocks and never fails; the shared rotation advances for every
    /// caller.
    #[must_use]
    pub fn acquire(&self) -> &C {
        &self.connections[self.index.next()]
    }

    /// Number of connections in the pool.
    #[must_use]
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Always `false`: an empty pool cannot be constructed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// All connections, in rotation order.
    #[must_use]
    pub fn connections(&self) -> &[C] {
        &self.connections
    }

    /// Builds a pool of per-connection derivatives (typically typed gRPC
    /// stubs) with its own rotation, starting at position `0`.
    #[must_use]
    pub fn map<D, F>(&self, f: F) -> ConnectionPool<D>
    where
        F: FnMut(&C) -> D,
    {
        ConnectionPool {
            connections: self.connections.iter().map(f).collect(),
            index: self.index.restarted(),
        }
    }
}
