//! # Domain Types
//!
//! Records mirrored from the document store that are not owned by a
//! calculation module: profiles, team members, expense claims.
//!
//! ## Owner Scoping
//! Every enterprise-scoped record carries an `enterprise_id`. For a solo
//! account that is the user's own id, see [`UserProfile::owner_id`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::invoice::{InvoiceNumbering, PaymentDetails};
use crate::leave::LeaveBalance;
use crate::payroll::SalaryStructure;

// =============================================================================
// Enumerations
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanType {
    #[default]
    Free,
    Pro,
    Enterprise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    #[default]
    User,
    SuperAdmin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    #[default]
    Active,
    Suspended,
}

/// Affects leave rules: students and interns are not held to balances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmployeeType {
    #[default]
    Private,
    CentralGovt,
    StateGovt,
    Student,
    Intern,
}

impl EmployeeType {
    pub fn is_student_or_intern(&self) -> bool {
        matches!(self, EmployeeType::Student | EmployeeType::Intern)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnterpriseRole {
    Owner,
    Hr,
    Manager,
    #[default]
    Staff,
}

// =============================================================================
// User Profile
// =============================================================================

/// Profile document, one per signed-in identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub designation: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub plan: PlanType,
    #[serde(default)]
    pub status: AccountStatus,
    #[serde(default)]
    pub employee_type: Option<EmployeeType>,
    #[serde(default)]
    pub enterprise_role: Option<EnterpriseRole>,
    #[serde(default)]
    pub enterprise_id: Option<String>,
    #[ts(as = "String")]
    pub joined_at: DateTime<Utc>,
    #[serde(default)]
    pub balance: Option<LeaveBalance>,
    #[serde(default)]
    pub default_invoice_prefix: Option<String>,
    #[serde(default)]
    pub next_invoice_sequence: Option<u32>,
    #[serde(default)]
    pub default_payment: Option<PaymentDetails>,
    #[serde(default)]
    pub default_terms: Option<String>,
    #[serde(default)]
    pub default_currency: Option<String>,
    #[serde(default)]
    pub gst_number: Option<String>,
}

impl UserProfile {
    /// The profile synthesized on first sight of a new identity.
    pub fn new_default(id: impl Into<String>, display_name: Option<&str>, email: Option<&str>) -> Self {
        UserProfile {
            id: id.into(),
            name: display_name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or("New User")
                .to_string(),
            email: email.unwrap_or_default().to_string(),
            designation: String::new(),
            company: String::new(),
            role: UserRole::User,
            plan: PlanType::Free,
            status: AccountStatus::Active,
            employee_type: None,
            enterprise_role: None,
            enterprise_id: None,
            joined_at: Utc::now(),
            balance: None,
            default_invoice_prefix: None,
            next_invoice_sequence: None,
            default_payment: None,
            default_terms: None,
            default_currency: None,
            gst_number: None,
        }
    }

    /// Id that scopes this user's enterprise records.
    pub fn owner_id(&self) -> &str {
        self.enterprise_id.as_deref().unwrap_or(&self.id)
    }

    /// Leave balance, or the default entitlement if none is stored.
    pub fn leave_balance(&self) -> LeaveBalance {
        self.balance.unwrap_or_default()
    }

    pub fn employee_type(&self) -> EmployeeType {
        self.employee_type.unwrap_or_default()
    }

    /// The numbering state for this profile's next invoice.
    pub fn invoice_numbering(&self, today: NaiveDate) -> InvoiceNumbering {
        InvoiceNumbering::from_profile(
            self.default_invoice_prefix.as_deref(),
            self.next_invoice_sequence,
            today,
        )
    }
}

// =============================================================================
// Team Member
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberStatus {
    #[default]
    Active,
    Pending,
    OnLeave,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub role: String,
    pub email: String,
    #[serde(default)]
    pub enterprise_role: EnterpriseRole,
    #[serde(default)]
    pub status: MemberStatus,
    pub enterprise_id: String,
    #[serde(default)]
    pub salary_structure: Option<SalaryStructure>,
}

impl TeamMember {
    /// Configured structure, or the default one.
    pub fn salary(&self) -> SalaryStructure {
        self.salary_structure.unwrap_or_default()
    }
}

// =============================================================================
// Expense Claim
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ClaimCategory {
    Travel,
    Food,
    Internet,
    Hardware,
    #[default]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClaimStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseClaim {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub category: ClaimCategory,
    pub amount: f64,
    pub status: ClaimStatus,
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub description: String,
    /// Link or data URL of the uploaded receipt.
    #[serde(default)]
    pub receipt: Option<String>,
    /// Claims filed before the member joined an enterprise carry none.
    #[serde(default)]
    pub enterprise_id: Option<String>,
}

impl ExpenseClaim {
    /// The enterprise the claim belongs to, or the claimant when unaffiliated.
    pub fn owner_id(&self) -> &str {
        self.enterprise_id.as_deref().unwrap_or(&self.user_id)
    }
}
