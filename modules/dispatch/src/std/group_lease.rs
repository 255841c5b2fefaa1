use super::Group;

/// Outstanding membership in a [`Group`]; leaves the group when dropped.
///
/// Dropping also happens while a panicking work item unwinds, so waiters are always released.
#[must_use = "dropping the lease leaves the group immediately"]
#[derive(Debug)]
pub struct GroupLease {
  group: Group,
}

impl GroupLease {
  pub(crate) const fn new(group: Group) -> Self {
    Self { group }
  }

  /// Returns the group this lease belongs to.
  #[must_use]
  pub const fn group(&self) -> &Group {
    &self.group
  }
}

impl Drop for GroupLease {
  fn drop(&mut self) {
    self.group.leave();
  }
}
