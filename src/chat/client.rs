// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{ChatRequest, ChatResponse, assistant};
use crate::error::ChatError;
use crate::models::{BillCalculation, SavedBill};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplianceSummary {
    pub name: String,
    pub monthly_cost: f64,
    pub monthly_kwh: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentBillSummary {
    pub monthly_bill: f64,
    pub yearly_bill: f64,
    pub total_kwh: f64,
    pub daily_average: f64,
    pub top_appliances: Vec<ApplianceSummary>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillHistoryEntry {
    pub name: String,
    pub month: String,
    pub year: i32,
    pub monthly_bill: f64,
    pub total_kwh: f64,
    pub top_appliance: String,
}

/// What the assistant gets to know about the household.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatContext {
    pub user_name: String,
    pub current_bill: Option<CurrentBillSummary>,
    pub bill_history: Vec<BillHistoryEntry>,
    pub total_bills: usize,
    pub average_monthly_bill: f64,
}

impl ChatContext {
    pub fn new(user_name: &str, current: Option<&BillCalculation>, bills: &[SavedBill]) -> Self {
        let current_bill = current.map(|c| CurrentBillSummary {
            monthly_bill: c.monthly_bill,
            yearly_bill: c.yearly_bill,
            total_kwh: c.total_kwh,
            daily_average: c.daily_average,
            top_appliances: c
                .appliance_breakdown
                .iter()
                .take(3)
                .map(|u| ApplianceSummary {
                    name: u.appliance.name.clone(),
                    monthly_cost: u.monthly_cost,
                    monthly_kwh: u.monthly_kwh,
                    percentage: u.percentage,
                })
                .collect(),
        });
        let bill_history = bills
            .iter()
            .map(|b| BillHistoryEntry {
                name: b.name.clone(),
                month: b.month.clone(),
                year: b.year,
                monthly_bill: b.calculation.monthly_bill,
                total_kwh: b.calculation.total_kwh,
                top_appliance: b
                    .calculation
                    .appliance_breakdown
                    .first()
                    .map(|u| u.appliance.name.clone())
                    .unwrap_or_else(|| "Unknown".to_string()),
            })
            .collect();
        let average_monthly_bill = if bills.is_empty() {
            0.0
        } else {
            bills.iter().map(|b| b.calculation.monthly_bill).sum::<f64>() / bills.len() as f64
        };
        Self {
            user_name: user_name.to_string(),
            current_bill,
            bill_history,
            total_bills: bills.len(),
            average_monthly_bill,
        }
    }
}

/// Single POST to the proxy; no retry.
pub fn send(
    client: &reqwest::blocking::Client,
    endpoint: &str,
    request: &ChatRequest,
) -> Result<ChatResponse, ChatError> {
    let resp = client
        .post(endpoint)
        .json(request)
        .send()
        .map_err(|err| {
            if err.is_connect() || err.is_timeout() {
                ChatError::Connection {
                    endpoint: endpoint.to_string(),
                    source: err,
                }
            } else {
                ChatError::Transport(err)
            }
        })?;
    let status = resp.status();
    if !status.is_success() {
        return Err(ChatError::Status(status));
    }
    let body: ChatResponse = resp.json().map_err(|_| ChatError::UnexpectedFormat)?;
    match body {
        ChatResponse { reply: Some(_), .. } => Ok(body),
        ChatResponse {
            error: Some(msg), ..
        } => Err(ChatError::Backend(msg)),
        _ => Err(ChatError::UnexpectedFormat),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    Remote { reply: String, model: Option<String> },
    /// The proxy failed; `notice` says why.
    Fallback { notice: String, reply: String },
}

impl Answer {
    pub fn reply(&self) -> &str {
        match self {
            Answer::Remote { reply, .. } | Answer::Fallback { reply, .. } => reply,
        }
    }
}

/// Asks the proxy and degrades to the keyword assistant on any failure.
pub fn ask(client: &reqwest::blocking::Client, endpoint: &str, request: &ChatRequest) -> Answer {
    match send(client, endpoint, request) {
        Ok(ChatResponse { reply, model, .. }) => Answer::Remote {
            reply: reply.unwrap_or_default(),
            model,
        },
        Err(err) => {
            tracing::warn!(endpoint, error = %err, "chat proxy failed, using fallback");
            Answer::Fallback {
                notice: err.user_message(),
                reply: assistant::fallback_reply(&request.message).to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Appliance, BillSettings};

    #[test]
    fn context_summarises_top_three_and_history() {
        let appliances: Vec<Appliance> = (1..=4)
            .map(|i| Appliance {
                id: i.to_string(),
                name: format!("Device {}", i),
                category: "Electronics".into(),
                wattage: 100.0 * i as f64,
                hours_per_day: 1.0,
                days_per_month: 30.0,
            })
            .collect();
        let calc = crate::calc::calculate(&appliances, &BillSettings::default());
        let ctx = ChatContext::new("Sam", Some(&calc), &[]);
        let v = serde_json::to_value(&ctx).unwrap();
        assert_eq!(v["userName"], "Sam");
        assert_eq!(v["currentBill"]["topAppliances"].as_array().unwrap().len(), 3);
        assert_eq!(v["totalBills"], 0);
        assert_eq!(v["averageMonthlyBill"], 0.0);
    }
}
