//! Collection names and owner scoping for every stored record.

use paymate_core::attendance::{AttendanceRecord, Holiday};
use paymate_core::invoice::{CatalogItem, Invoice};
use paymate_core::leave::LeaveRequest;
use paymate_core::ledger::Transaction;
use paymate_core::payroll::Payslip;
use paymate_core::types::{ExpenseClaim, TeamMember, UserProfile};

use super::Document;

impl Document for Invoice {
    const COLLECTION: &'static str = "invoices";

    fn id(&self) -> &str {
        &self.id
    }

    fn owner_id(&self) -> &str {
        &self.enterprise_id
    }
}

impl Document for CatalogItem {
    const COLLECTION: &'static str = "catalog";

    fn id(&self) -> &str {
        &self.id
    }

    fn owner_id(&self) -> &str {
        &self.enterprise_id
    }
}

impl Document for Payslip {
    const COLLECTION: &'static str = "payslips";

    fn id(&self) -> &str {
        &self.id
    }

    fn owner_id(&self) -> &str {
        &self.enterprise_id
    }
}

impl Document for LeaveRequest {
    const COLLECTION: &'static str = "leave_requests";

    fn id(&self) -> &str {
        &self.id
    }

    fn owner_id(&self) -> &str {
        &self.enterprise_id
    }
}

impl Document for Transaction {
    const COLLECTION: &'static str = "transactions";

    fn id(&self) -> &str {
        &self.id
    }

    fn owner_id(&self) -> &str {
        &self.enterprise_id
    }
}

impl Document for TeamMember {
    const COLLECTION: &'static str = "team_members";

    fn id(&self) -> &str {
        &self.id
    }

    fn owner_id(&self) -> &str {
        &self.enterprise_id
    }
}

impl Document for ExpenseClaim {
    const COLLECTION: &'static str = "claims";

    fn id(&self) -> &str {
        &self.id
    }

    fn owner_id(&self) -> &str {
        ExpenseClaim::owner_id(self)
    }
}

/// Profiles are keyed and owned by the identity itself.
impl Document for UserProfile {
    const COLLECTION: &'static str = "users";

    fn id(&self) -> &str {
        &self.id
    }

    fn owner_id(&self) -> &str {
        &self.id
    }
}

impl Document for AttendanceRecord {
    const COLLECTION: &'static str = "attendance";

    fn id(&self) -> &str {
        &self.id
    }

    fn owner_id(&self) -> &str {
        AttendanceRecord::owner_id(self)
    }
}

impl Document for Holiday {
    const COLLECTION: &'static str = "holidays";

    fn id(&self) -> &str {
        &self.id
    }

    fn owner_id(&self) -> &str {
        &self.enterprise_id
    }
}
