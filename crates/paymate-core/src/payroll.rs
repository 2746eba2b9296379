//! # Payroll Module
//!
//! Turns a flat monthly salary structure and a count of unpaid-leave days
//! into a payslip.
//!
//! ## Payslip Arithmetic
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  gross         = basic + hra + conveyance + special_allowance           │
//! │  day_rate      = gross / working_days                                   │
//! │  lop_deduction = round(lop_days × day_rate)                             │
//! │                                                                         │
//! │  deductions    = [pf, prof_tax, tds] (+ LOP line if lop_deduction > 0)  │
//! │  net_pay       = gross − Σ deductions          (not floored at zero)    │
//! │                                                                         │
//! │  Example: 25000 + 10000 + 2000 + 5000 = 42000 over 30 days, 3 LOP       │
//! │    day_rate 1400 → LOP 4200 → deductions 1800 + 200 + 0 + 4200 = 6200   │
//! │    net_pay 35800                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `lop_days` comes from [`crate::leave::lop_days_for_period`]; this module
//! never looks at leave records.

use chrono::{DateTime, Datelike, Month, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::ledger::{PaymentMode, Transaction, TransactionKind, PAYROLL_CATEGORY};

// =============================================================================
// Salary Structure
// =============================================================================

/// Flat monthly salary components. No history is kept.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SalaryStructure {
    pub basic: f64,
    pub hra: f64,
    pub conveyance: f64,
    pub special_allowance: f64,
    pub pf: f64,
    pub prof_tax: f64,
    pub tds: f64,
}

impl SalaryStructure {
    /// Sum of the four earning components.
    #[inline]
    pub fn gross_monthly(&self) -> f64 {
        self.basic + self.hra + self.conveyance + self.special_allowance
    }

    /// Sum of the three fixed deductions (no LOP).
    #[inline]
    pub fn fixed_deductions(&self) -> f64 {
        self.pf + self.prof_tax + self.tds
    }
}

/// Structure applied to members that have none configured.
impl Default for SalaryStructure {
    fn default() -> Self {
        SalaryStructure {
            basic: 25_000.0,
            hra: 10_000.0,
            conveyance: 2_000.0,
            special_allowance: 5_000.0,
            pf: 1_800.0,
            prof_tax: 200.0,
            tds: 0.0,
        }
    }
}

// =============================================================================
// Pay Period
// =============================================================================

/// A calendar month of a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PayPeriod {
    year: i32,
    month: u32,
}

impl PayPeriod {
    /// ## Errors
    /// `InvalidPeriod` if `month` is not 1-12.
    pub fn new(year: i32, month: u32) -> CoreResult<Self> {
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(CoreError::InvalidPeriod { year, month });
        }
        Ok(PayPeriod { year, month })
    }

    /// The period containing `date`.
    pub fn containing(date: NaiveDate) -> Self {
        PayPeriod {
            year: date.year(),
            month: date.month(),
        }
    }

    #[inline]
    pub fn year(&self) -> i32 {
        self.year
    }

    #[inline]
    pub fn month(&self) -> u32 {
        self.month
    }

    /// English month name, e.g. "January".
    pub fn month_name(&self) -> &'static str {
        u8::try_from(self.month)
            .ok()
            .and_then(|m| Month::try_from(m).ok())
            .map(|m| m.name())
            .unwrap_or("")
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Calendar days in the month (28-31).
    pub fn days_in_month(&self) -> u32 {
        let (next_year, next_month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(next_year, next_month, 1)
            .map(|next| next.signed_duration_since(self.first_day()).num_days() as u32)
            .unwrap_or(0)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl std::fmt::Display for PayPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.month_name(), self.year)
    }
}

// =============================================================================
// Payslip Figures
// =============================================================================

/// A labelled earning or deduction row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PayLine {
    pub label: String,
    pub amount: f64,
}

impl PayLine {
    fn new(label: impl Into<String>, amount: f64) -> Self {
        PayLine {
            label: label.into(),
            amount,
        }
    }
}

/// Output of the payroll computer, before it is attached to a member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PayslipFigures {
    pub working_days: u32,
    /// `working_days − lop_days`; negative if more LOP than days.
    pub paid_days: i64,
    pub lop_days: u32,
    pub day_rate: f64,
    pub lop_deduction: f64,
    pub earnings: Vec<PayLine>,
    pub deductions: Vec<PayLine>,
    pub gross_pay: f64,
    pub total_deductions: f64,
    pub net_pay: f64,
}

/// Computes payslip figures.
///
/// ## Errors
/// `NoWorkingDays` when `working_days == 0`. Any other input is computed
/// as-is: negative components give negative pay, nothing is clamped.
///
/// ## Example
/// ```rust
/// use paymate_core::payroll::{compute_payslip, SalaryStructure};
///
/// let figures = compute_payslip(&SalaryStructure::default(), 30, 3).unwrap();
/// assert_eq!(figures.lop_deduction, 4200.0);
/// assert_eq!(figures.net_pay, 35800.0);
/// ```
pub fn compute_payslip(
    structure: &SalaryStructure,
    working_days: u32,
    lop_days: u32,
) -> CoreResult<PayslipFigures> {
    if working_days == 0 {
        return Err(CoreError::NoWorkingDays);
    }

    let gross = structure.gross_monthly();
    let day_rate = gross / f64::from(working_days);
    let lop_deduction = (f64::from(lop_days) * day_rate).round();

    let earnings = vec![
        PayLine::new("Basic Salary", structure.basic),
        PayLine::new("HRA", structure.hra),
        PayLine::new("Conveyance", structure.conveyance),
        PayLine::new("Special Allowance", structure.special_allowance),
    ];

    let mut deductions = vec![
        PayLine::new("Provident Fund (PF)", structure.pf),
        PayLine::new("Professional Tax", structure.prof_tax),
        PayLine::new("TDS (Income Tax)", structure.tds),
    ];
    if lop_deduction > 0.0 {
        deductions.push(PayLine::new(format!("LOP ({} Days)", lop_days), lop_deduction));
    }

    let gross_pay: f64 = earnings.iter().map(|line| line.amount).sum();
    let total_deductions: f64 = deductions.iter().map(|line| line.amount).sum();

    Ok(PayslipFigures {
        working_days,
        paid_days: i64::from(working_days) - i64::from(lop_days),
        lop_days,
        day_rate,
        lop_deduction,
        earnings,
        deductions,
        gross_pay,
        total_deductions,
        net_pay: gross_pay - total_deductions,
    })
}

// =============================================================================
// Payslip
// =============================================================================

/// A generated payslip for one member and one month.
///
/// Reprocessing the same member and period replaces the stored payslip;
/// see [`Payslip::same_slot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Payslip {
    pub id: String,
    pub member_id: String,
    pub member_name: String,
    /// Month name, e.g. "January".
    pub month: String,
    pub year: i32,
    pub structure: SalaryStructure,
    pub working_days: u32,
    pub paid_days: i64,
    pub lop_days: u32,
    pub earnings: Vec<PayLine>,
    pub deductions: Vec<PayLine>,
    pub gross_pay: f64,
    pub total_deductions: f64,
    pub net_pay: f64,
    pub enterprise_id: String,
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub currency: Option<String>,
}

impl Payslip {
    /// Generates a payslip for a calendar month; working days are the
    /// month's calendar days.
    pub fn generate(
        member_id: impl Into<String>,
        member_name: impl Into<String>,
        enterprise_id: impl Into<String>,
        structure: SalaryStructure,
        period: PayPeriod,
        lop_days: u32,
    ) -> CoreResult<Self> {
        let figures = compute_payslip(&structure, period.days_in_month(), lop_days)?;

        Ok(Payslip {
            id: Uuid::new_v4().to_string(),
            member_id: member_id.into(),
            member_name: member_name.into(),
            month: period.month_name().to_string(),
            year: period.year(),
            structure,
            working_days: figures.working_days,
            paid_days: figures.paid_days,
            lop_days: figures.lop_days,
            earnings: figures.earnings,
            deductions: figures.deductions,
            gross_pay: figures.gross_pay,
            total_deductions: figures.total_deductions,
            net_pay: figures.net_pay,
            enterprise_id: enterprise_id.into(),
            timestamp: Utc::now(),
            currency: None,
        })
    }

    /// True when `other` is for the same member, month and year.
    pub fn same_slot(&self, other: &Payslip) -> bool {
        self.member_id == other.member_id && self.month == other.month && self.year == other.year
    }

    /// True when this payslip is for `period`.
    pub fn is_for(&self, period: PayPeriod) -> bool {
        self.year == period.year() && self.month == period.month_name()
    }

    /// `PAY-{first 4 of member id}-{first 3 of month}`, upper-cased.
    pub fn payout_reference(&self) -> String {
        let member: String = self.member_id.chars().take(4).collect();
        let month: String = self.month.chars().take(3).collect();
        format!("PAY-{}-{}", member.to_uppercase(), month.to_uppercase())
    }

    /// The expense entry booked when the salary is paid out.
    pub fn payout_transaction(&self, paid_on: NaiveDate) -> Transaction {
        Transaction::new(
            TransactionKind::Expense,
            self.net_pay,
            paid_on,
            PAYROLL_CATEGORY,
            self.enterprise_id.clone(),
        )
        .with_payment_mode(PaymentMode::BankTransfer)
        .with_reference(self.payout_reference())
        .with_description(format!(
            "Salary Payout: {} ({} {})",
            self.member_name, self.month, self.year
        ))
        .with_currency(self.currency.clone())
    }
}

/// Total net pay across the payslips for `period`.
pub fn monthly_payout(payslips: &[Payslip], period: PayPeriod) -> f64 {
    payslips
        .iter()
        .filter(|slip| slip.is_for(period))
        .map(|slip| slip.net_pay)
        .sum()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn structure() -> SalaryStructure {
        SalaryStructure::default()
    }

    #[test]
    fn test_reference_scenario() {
        let figures = compute_payslip(&structure(), 30, 3).unwrap();
        assert_eq!(figures.gross_pay, 42_000.0);
        assert_eq!(figures.day_rate, 1_400.0);
        assert_eq!(figures.lop_deduction, 4_200.0);
        assert_eq!(figures.total_deductions, 6_200.0);
        assert_eq!(figures.net_pay, 35_800.0);
        assert_eq!(figures.paid_days, 27);
        assert_eq!(figures.deductions.len(), 4);
        assert_eq!(figures.deductions[3].label, "LOP (3 Days)");
    }

    #[test]
    fn test_no_lop_line_without_lop_days() {
        let figures = compute_payslip(&structure(), 31, 0).unwrap();
        assert_eq!(figures.deductions.len(), 3);
        assert_eq!(figures.lop_deduction, 0.0);
        assert_eq!(figures.net_pay, 40_000.0);
    }

    #[test]
    fn test_lop_deduction_is_rounded() {
        // 42000 / 31 = 1354.838..., × 1 → 1355
        let figures = compute_payslip(&structure(), 31, 1).unwrap();
        assert_eq!(figures.lop_deduction, 1_355.0);
        assert_eq!(figures.net_pay, 42_000.0 - 2_000.0 - 1_355.0);
    }

    #[test]
    fn test_net_pay_identity() {
        let structures = [
            structure(),
            SalaryStructure {
                basic: 18_500.0,
                hra: 7_400.0,
                conveyance: 1_600.0,
                special_allowance: 3_250.0,
                pf: 2_220.0,
                prof_tax: 200.0,
                tds: 1_150.0,
            },
        ];
        for s in &structures {
            for working_days in [28, 29, 30, 31] {
                for lop_days in [0, 1, 2, 5, 10] {
                    let figures = compute_payslip(s, working_days, lop_days).unwrap();
                    let gross = s.basic + s.hra + s.conveyance + s.special_allowance;
                    let lop = (f64::from(lop_days) * (gross / f64::from(working_days))).round();
                    assert_eq!(figures.lop_deduction, lop);
                    let expected = gross - s.pf - s.prof_tax - s.tds - lop;
                    assert!((figures.net_pay - expected).abs() < 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_net_pay_can_go_negative() {
        let figures = compute_payslip(&structure(), 30, 45).unwrap();
        assert!(figures.net_pay < 0.0);
        assert_eq!(figures.paid_days, -15);
    }

    #[test]
    fn test_zero_working_days_is_an_error() {
        assert!(matches!(
            compute_payslip(&structure(), 0, 0),
            Err(CoreError::NoWorkingDays)
        ));
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let a = compute_payslip(&structure(), 30, 3).unwrap();
        let b = compute_payslip(&structure(), 30, 3).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_pay_period() {
        assert_eq!(PayPeriod::new(2024, 2).unwrap().days_in_month(), 29);
        assert_eq!(PayPeriod::new(2023, 2).unwrap().days_in_month(), 28);
        assert_eq!(PayPeriod::new(2024, 12).unwrap().days_in_month(), 31);
        assert_eq!(PayPeriod::new(2024, 4).unwrap().days_in_month(), 30);
        assert_eq!(PayPeriod::new(2024, 9).unwrap().month_name(), "September");
        assert!(PayPeriod::new(2024, 13).is_err());
        assert!(PayPeriod::new(2024, 0).is_err());
    }

    #[test]
    fn test_generate_payslip_and_payout() {
        let period = PayPeriod::new(2024, 6).unwrap();
        let slip = Payslip::generate("ab12cd", "Asha", "ent-1", structure(), period, 3).unwrap();
        assert_eq!(slip.month, "June");
        assert_eq!(slip.working_days, 30);
        assert_eq!(slip.net_pay, 35_800.0);
        assert_eq!(slip.payout_reference(), "PAY-AB12-JUN");

        let tx = slip.payout_transaction(NaiveDate::from_ymd_opt(2024, 6, 30).unwrap());
        assert_eq!(tx.kind, TransactionKind::Expense);
        assert_eq!(tx.amount, 35_800.0);
        assert_eq!(tx.category, PAYROLL_CATEGORY);
        assert_eq!(tx.payment_mode, PaymentMode::BankTransfer);
        assert_eq!(tx.description, "Salary Payout: Asha (June 2024)");
    }

    #[test]
    fn test_monthly_payout_and_slots() {
        let june = PayPeriod::new(2024, 6).unwrap();
        let july = PayPeriod::new(2024, 7).unwrap();
        let a = Payslip::generate("m1", "A", "ent-1", structure(), june, 0).unwrap();
        let b = Payslip::generate("m2", "B", "ent-1", structure(), june, 3).unwrap();
        let c = Payslip::generate("m1", "A", "ent-1", structure(), july, 0).unwrap();
        let again = Payslip::generate("m1", "A", "ent-1", structure(), june, 1).unwrap();

        assert!(a.same_slot(&again));
        assert!(!a.same_slot(&c));

        let total = monthly_payout(&[a.clone(), b.clone(), c], june);
        assert_eq!(total, a.net_pay + b.net_pay);
    }
}
