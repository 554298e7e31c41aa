// ============================================================================
// Platform Core - Cost Read Models
// File: crates/platform-core/src/domain/cost.rs
// Description: Billing query shape and the summaries built from its groups
// ============================================================================

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use platform_shared::constants::{DATE_FORMAT, DEFAULT_CURRENCY, UNKNOWN};

use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Granularity {
    Hourly,
    Daily,
    Monthly,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Hourly => "HOURLY",
            Granularity::Daily => "DAILY",
            Granularity::Monthly => "MONTHLY",
        }
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HOURLY" => Ok(Granularity::Hourly),
            "DAILY" => Ok(Granularity::Daily),
            "MONTHLY" => Ok(Granularity::Monthly),
            other => Err(DomainError::Validation(format!(
                "granularity must be one of DAILY, MONTHLY, HOURLY (got '{}')",
                other
            ))),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive start, end as passed to the billing backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CostWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl CostWindow {
    pub fn parse(start: &str, end: &str) -> Result<Self, DomainError> {
        let start = parse_date("start_date", start)?;
        let end = parse_date("end_date", end)?;
        if end < start {
            return Err(DomainError::Validation(format!(
                "end_date {} precedes start_date {}",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    pub fn period(&self) -> String {
        format!(
            "{} to {}",
            self.start.format(DATE_FORMAT),
            self.end.format(DATE_FORMAT)
        )
    }
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate, DomainError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|e| {
        DomainError::Validation(format!("invalid {} '{}': {}", field, value, e))
    })
}

/// Raw cost request as received from callers.
#[derive(Debug, Clone, Deserialize)]
pub struct CostRequest {
    pub start_date: String,
    pub end_date: String,
    pub granularity: String,
    pub group_by: String,
}

impl CostRequest {
    pub fn resolve(&self) -> Result<CostQuery, DomainError> {
        let group_by = self.group_by.trim();
        if group_by.is_empty() {
            return Err(DomainError::Validation("group_by must not be empty".to_string()));
        }
        Ok(CostQuery {
            window: CostWindow::parse(&self.start_date, &self.end_date)?,
            granularity: Granularity::parse(&self.granularity)?,
            group_by: group_by.to_ascii_uppercase(),
        })
    }
}

/// Validated cost request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostQuery {
    pub window: CostWindow,
    pub granularity: Granularity,
    pub group_by: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupDimension {
    Tag(String),
    Dimension(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagFilter {
    pub key: String,
    pub values: Vec<String>,
}

/// What the billing backend is asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillingQuery {
    pub window: CostWindow,
    pub granularity: Granularity,
    pub group_by: Vec<GroupDimension>,
    pub filter: TagFilter,
}

/// One group returned by the billing backend. `amount` is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostGroup {
    pub keys: Vec<String>,
    pub amount: String,
    pub unit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostDatum {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<Uuid>,
    pub service: String,
    pub amount: Decimal,
    pub currency: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub granularity: Granularity,
}

#[derive(Debug, Clone, Serialize)]
pub struct TenantCostSummary {
    pub tenant_id: Uuid,
    pub tenant_name: String,
    pub total_cost: Decimal,
    pub currency: String,
    pub period: String,
    pub services: Vec<CostDatum>,
    pub last_updated: DateTime<Utc>,
}

/// `tenant_costs` and `monthly_trend` are part of the view but not filled in yet.
#[derive(Debug, Clone, Serialize)]
pub struct PlatformCostOverview {
    pub total_cost: Decimal,
    pub currency: String,
    pub period: String,
    pub tenant_costs: Vec<TenantCostSummary>,
    pub service_costs: Vec<CostDatum>,
    pub monthly_trend: Vec<CostDatum>,
    pub last_updated: DateTime<Utc>,
}

/// Per-service rows and running total folded from billing groups.
///
/// Amounts are summed as-is: units are never converted, and the currency is
/// whichever non-empty unit shows up first.
#[derive(Debug, Clone, PartialEq)]
pub struct CostBreakdown {
    pub services: Vec<CostDatum>,
    pub total: Decimal,
    pub currency: String,
    pub skipped: usize,
}

impl CostBreakdown {
    /// `service_key` is the index of the group key holding the service name.
    pub fn from_groups(
        groups: &[CostGroup],
        service_key: usize,
        tenant_id: Option<Uuid>,
        query: &CostQuery,
    ) -> Self {
        let mut services = Vec::with_capacity(groups.len());
        let mut total = Decimal::ZERO;
        let mut currency: Option<String> = None;
        let mut skipped = 0;

        for group in groups {
            let Some(amount) = parse_amount(&group.amount) else {
                tracing::warn!(amount = %group.amount, keys = ?group.keys, "Skipping cost group with unparseable amount");
                skipped += 1;
                continue;
            };

            let Some(sum) = total.checked_add(amount) else {
                tracing::warn!(amount = %group.amount, keys = ?group.keys, "Skipping cost group that overflows the total");
                skipped += 1;
                continue;
            };
            total = sum;

            let unit = group.unit.as_deref().filter(|u| !u.is_empty());
            if currency.is_none() {
                currency = unit.map(str::to_string);
            }

            let service = group
                .keys
                .get(service_key)
                .cloned()
                .unwrap_or_else(|| UNKNOWN.to_string());

            services.push(CostDatum {
                tenant_id,
                service,
                amount,
                currency: unit.unwrap_or(DEFAULT_CURRENCY).to_string(),
                start_date: query.window.start,
                end_date: query.window.end,
                granularity: query.granularity,
            });
        }

        Self {
            services,
            total,
            currency: currency.unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            skipped,
        }
    }
}

/// Billing backends report plain decimals and occasionally scientific notation.
fn parse_amount(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}
