pub mod loan;
pub mod mortgage;
pub mod refinance;

use crate::types::{AmortizationRow, Money};

pub(crate) fn total_interest(schedule: &[AmortizationRow]) -> Money {
    schedule.iter().map(|row| row.interest).sum()
}

pub(crate) fn total_paid(schedule: &[AmortizationRow]) -> Money {
    schedule.iter().map(|row| row.payment).sum()
}
