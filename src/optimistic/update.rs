/// Where an optimistic update stands relative to the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStatus {
    Pending,
    Confirmed,
    RolledBack,
    /// The device refused the value but the control keeps showing it.
    Unconfirmed,
}

/// What a control does when the device refuses a proposed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Restore the last confirmed value.
    Rollback,
    /// Keep showing the user's value and only log the failure.
    Retain,
}

/// Identifies one proposal. Only the most recent ticket may resolve an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

#[derive(Debug, Clone, PartialEq)]
pub struct OptimisticUpdate<T> {
    previous_confirmed: T,
    proposed: T,
    status: UpdateStatus,
    ticket: Ticket,
}

impl<T: Copy + PartialEq> OptimisticUpdate<T> {
    pub fn confirmed(value: T) -> Self {
        OptimisticUpdate {
            previous_confirmed: value,
            proposed: value,
            status: UpdateStatus::Confirmed,
            ticket: Ticket(0),
        }
    }

    /// The value the UI shows, which is always the latest intent.
    pub fn value(&self) -> T {
        self.proposed
    }

    pub fn previous_confirmed(&self) -> T {
        self.previous_confirmed
    }

    pub fn status(&self) -> UpdateStatus {
        self.status
    }

    pub fn is_pending(&self) -> bool {
        self.status == UpdateStatus::Pending
    }

    /// Replaces the displayed value, superseding any pending proposal.
    ///
    /// Returns `None` when the value is already displayed, in which case no request must be sent.
    /// A value the device refused but the control kept showing may always be sent again.
    pub fn propose(&mut self, value: T) -> Option<Ticket> {
        if value == self.proposed && self.status != UpdateStatus::Unconfirmed {
            return None;
        }

        self.ticket = Ticket(self.ticket.0 + 1);
        self.proposed = value;
        self.status = UpdateStatus::Pending;
        Some(self.ticket)
    }

    /// Returns `false` when the ticket was superseded and the acknowledgement must be ignored.
    pub fn confirm(&mut self, ticket: Ticket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }

        self.previous_confirmed = self.proposed;
        self.status = UpdateStatus::Confirmed;
        true
    }

    /// Applies a failure for `ticket` and returns the value now displayed, or `None` when stale.
    pub fn fail(&mut self, ticket: Ticket, policy: FailurePolicy) -> Option<T> {
        if !self.is_current(ticket) {
            return None;
        }

        match policy {
            FailurePolicy::Rollback => {
                self.proposed = self.previous_confirmed;
                self.status = UpdateStatus::RolledBack;
            }
            FailurePolicy::Retain => self.status = UpdateStatus::Unconfirmed,
        }

        Some(self.proposed)
    }

    fn is_current(&self, ticket: Ticket) -> bool {
        self.is_pending() && ticket == self.ticket
    }
}
