use std::collections::BTreeMap;

/// Identifies a cell of a [`Grid2d`](super::Grid2d) by its axis indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellIndex {
    pub u: usize,
    pub v: usize,
}

impl CellIndex {
    #[must_use]
    pub fn new(u: usize, v: usize) -> Self {
        Self { u, v }
    }
}

/// A role assignment for grid cells.
///
/// Each layout pass consumes the previous assignment and returns a new one;
/// the grid itself is never retagged.
#[derive(Debug, Clone, PartialEq)]
pub struct CellRoles<R> {
    roles: BTreeMap<CellIndex, R>,
}

impl<R> Default for CellRoles<R> {
    fn default() -> Self {
        Self {
            roles: BTreeMap::new(),
        }
    }
}

impl<R: Copy + PartialEq> CellRoles<R> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, index: CellIndex) -> Option<R> {
        self.roles.get(&index).copied()
    }

    /// Returns this assignment with `index` set to `role`.
    #[must_use]
    pub fn with(mut self, index: CellIndex, role: R) -> Self {
        self.roles.insert(index, role);
        self
    }

    /// Cells in (u, v) order together with their role.
    pub fn iter(&self) -> impl Iterator<Item = (CellIndex, R)> + '_ {
        self.roles.iter().map(|(k, v)| (*k, *v))
    }

    /// Cells assigned `role`, in (u, v) order.
    pub fn cells_with(&self, role: R) -> impl Iterator<Item = CellIndex> + '_ {
        self.iter().filter(move |(_, r)| *r == role).map(|(k, _)| k)
    }

    #[must_use]
    pub fn count(&self, role: R) -> usize {
        self.cells_with(role).count()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

impl<R> FromIterator<(CellIndex, R)> for CellRoles<R> {
    fn from_iter<I: IntoIterator<Item = (CellIndex, R)>>(iter: I) -> Self {
        Self {
            roles: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Role {
        Open,
        Taken,
    }

    #[test]
    fn with_returns_updated_copy() {
        let base: CellRoles<Role> = (0..3).map(|u| (CellIndex::new(u, 0), Role::Open)).collect();
        let next = base.clone().with(CellIndex::new(1, 0), Role::Taken);
        assert_eq!(base.get(CellIndex::new(1, 0)), Some(Role::Open));
        assert_eq!(next.get(CellIndex::new(1, 0)), Some(Role::Taken));
        assert_eq!(next.count(Role::Open), 2);
        assert_eq!(next.len(), 3);
    }

    #[test]
    fn iteration_is_u_major() {
        let roles: CellRoles<Role> = [
            (CellIndex::new(1, 0), Role::Open),
            (CellIndex::new(0, 1), Role::Open),
            (CellIndex::new(0, 0), Role::Taken),
        ]
        .into_iter()
        .collect();
        let order: Vec<_> = roles.iter().map(|(c, _)| (c.u, c.v)).collect();
        assert_eq!(order, vec![(0, 0), (0, 1), (1, 0)]);
    }
}
