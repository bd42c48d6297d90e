//! Transaction data structures for fraud detection

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The 15 feature columns, in schema order.
///
/// This order is the contract between training and prediction: the scaler's
/// per-feature means/stds and the classifier's importances are aligned to it.
pub const FEATURE_NAMES: [&str; 15] = [
    "TX_AMOUNT",
    "TX_DURING_WEEKEND",
    "TX_DURING_NIGHT",
    "CUSTOMER_ID_NB_TX_1DAY_WINDOW",
    "CUSTOMER_ID_NB_TX_7DAY_WINDOW",
    "CUSTOMER_ID_NB_TX_30DAY_WINDOW",
    "CUSTOMER_ID_AVG_AMOUNT_1DAY_WINDOW",
    "CUSTOMER_ID_AVG_AMOUNT_7DAY_WINDOW",
    "CUSTOMER_ID_AVG_AMOUNT_30DAY_WINDOW",
    "TERMINAL_ID_NB_TX_1DAY_WINDOW",
    "TERMINAL_ID_NB_TX_7DAY_WINDOW",
    "TERMINAL_ID_NB_TX_30DAY_WINDOW",
    "TERMINAL_ID_RISK_1DAY_WINDOW",
    "TERMINAL_ID_RISK_7DAY_WINDOW",
    "TERMINAL_ID_RISK_30DAY_WINDOW",
];

/// One transaction, either a labeled training row or an unlabeled
/// prediction request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Transaction amount
    #[serde(rename = "TX_AMOUNT")]
    pub tx_amount: f64,

    /// 1 if the transaction happened on a weekend
    #[serde(rename = "TX_DURING_WEEKEND")]
    pub tx_during_weekend: i64,

    /// 1 if the transaction happened at night
    #[serde(rename = "TX_DURING_NIGHT")]
    pub tx_during_night: i64,

    #[serde(rename = "CUSTOMER_ID_NB_TX_1DAY_WINDOW")]
    pub customer_nb_tx_1day: f64,

    #[serde(rename = "CUSTOMER_ID_NB_TX_7DAY_WINDOW")]
    pub customer_nb_tx_7day: f64,

    #[serde(rename = "CUSTOMER_ID_NB_TX_30DAY_WINDOW")]
    pub customer_nb_tx_30day: f64,

    #[serde(rename = "CUSTOMER_ID_AVG_AMOUNT_1DAY_WINDOW")]
    pub customer_avg_amount_1day: f64,

    #[serde(rename = "CUSTOMER_ID_AVG_AMOUNT_7DAY_WINDOW")]
    pub customer_avg_amount_7day: f64,

    #[serde(rename = "CUSTOMER_ID_AVG_AMOUNT_30DAY_WINDOW")]
    pub customer_avg_amount_30day: f64,

    #[serde(rename = "TERMINAL_ID_NB_TX_1DAY_WINDOW")]
    pub terminal_nb_tx_1day: f64,

    #[serde(rename = "TERMINAL_ID_NB_TX_7DAY_WINDOW")]
    pub terminal_nb_tx_7day: f64,

    #[serde(rename = "TERMINAL_ID_NB_TX_30DAY_WINDOW")]
    pub terminal_nb_tx_30day: f64,

    #[serde(rename = "TERMINAL_ID_RISK_1DAY_WINDOW")]
    pub terminal_risk_1day: f64,

    #[serde(rename = "TERMINAL_ID_RISK_7DAY_WINDOW")]
    pub terminal_risk_7day: f64,

    #[serde(rename = "TERMINAL_ID_RISK_30DAY_WINDOW")]
    pub terminal_risk_30day: f64,

    /// Fraud label, present only in training rows
    #[serde(rename = "TX_FRAUD", default, skip_serializing_if = "Option::is_none")]
    pub tx_fraud: Option<u8>,
}

impl TransactionRecord {
    /// Feature vector in `FEATURE_NAMES` order.
    pub fn to_feature_vector(&self) -> [f64; 15] {
        [
            self.tx_amount,
            self.tx_during_weekend as f64,
            self.tx_during_night as f64,
            self.customer_nb_tx_1day,
            self.customer_nb_tx_7day,
            self.customer_nb_tx_30day,
            self.customer_avg_amount_1day,
            self.customer_avg_amount_7day,
            self.customer_avg_amount_30day,
            self.terminal_nb_tx_1day,
            self.terminal_nb_tx_7day,
            self.terminal_nb_tx_30day,
            self.terminal_risk_1day,
            self.terminal_risk_7day,
            self.terminal_risk_30day,
        ]
    }

    /// Build a record from a prediction payload.
    ///
    /// Missing and null fields default to 0, numeric strings coerce, unknown
    /// extra fields are ignored. Anything else is a validation error.
    pub fn from_json(value: &Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| AppError::Validation("request body must be a JSON object".to_string()))?;

        Ok(Self {
            tx_amount: coerce_float(obj.get("TX_AMOUNT"), "TX_AMOUNT")?,
            tx_during_weekend: coerce_flag(obj.get("TX_DURING_WEEKEND"), "TX_DURING_WEEKEND")?,
            tx_during_night: coerce_flag(obj.get("TX_DURING_NIGHT"), "TX_DURING_NIGHT")?,
            customer_nb_tx_1day: coerce_float(
                obj.get("CUSTOMER_ID_NB_TX_1DAY_WINDOW"),
                "CUSTOMER_ID_NB_TX_1DAY_WINDOW",
            )?,
            customer_nb_tx_7day: coerce_float(
                obj.get("CUSTOMER_ID_NB_TX_7DAY_WINDOW"),
                "CUSTOMER_ID_NB_TX_7DAY_WINDOW",
            )?,
            customer_nb_tx_30day: coerce_float(
                obj.get("CUSTOMER_ID_NB_TX_30DAY_WINDOW"),
                "CUSTOMER_ID_NB_TX_30DAY_WINDOW",
            )?,
            customer_avg_amount_1day: coerce_float(
                obj.get("CUSTOMER_ID_AVG_AMOUNT_1DAY_WINDOW"),
                "CUSTOMER_ID_AVG_AMOUNT_1DAY_WINDOW",
            )?,
            customer_avg_amount_7day: coerce_float(
                obj.get("CUSTOMER_ID_AVG_AMOUNT_7DAY_WINDOW"),
                "CUSTOMER_ID_AVG_AMOUNT_7DAY_WINDOW",
            )?,
            customer_avg_amount_30day: coerce_float(
                obj.get("CUSTOMER_ID_AVG_AMOUNT_30DAY_WINDOW"),
                "CUSTOMER_ID_AVG_AMOUNT_30DAY_WINDOW",
            )?,
            terminal_nb_tx_1day: coerce_float(
                obj.get("TERMINAL_ID_NB_TX_1DAY_WINDOW"),
                "TERMINAL_ID_NB_TX_1DAY_WINDOW",
            )?,
            terminal_nb_tx_7day: coerce_float(
                obj.get("TERMINAL_ID_NB_TX_7DAY_WINDOW"),
                "TERMINAL_ID_NB_TX_7DAY_WINDOW",
            )?,
            terminal_nb_tx_30day: coerce_float(
                obj.get("TERMINAL_ID_NB_TX_30DAY_WINDOW"),
                "TERMINAL_ID_NB_TX_30DAY_WINDOW",
            )?,
            terminal_risk_1day: coerce_float(
                obj.get("TERMINAL_ID_RISK_1DAY_WINDOW"),
                "TERMINAL_ID_RISK_1DAY_WINDOW",
            )?,
            terminal_risk_7day: coerce_float(
                obj.get("TERMINAL_ID_RISK_7DAY_WINDOW"),
                "TERMINAL_ID_RISK_7DAY_WINDOW",
            )?,
            terminal_risk_30day: coerce_float(
                obj.get("TERMINAL_ID_RISK_30DAY_WINDOW"),
                "TERMINAL_ID_RISK_30DAY_WINDOW",
            )?,
            tx_fraud: None,
        })
    }

    /// Fraud label for training rows.
    pub fn label(&self) -> Result<usize> {
        match self.tx_fraud {
            Some(l) => Ok(l as usize),
            None => Err(AppError::Dataset(
                "row is missing the TX_FRAUD label".to_string(),
            )),
        }
    }
}

/// Coerce a float field: numbers pass through, numeric strings parse,
/// missing/null default to 0.
fn coerce_float(value: Option<&Value>, name: &str) -> Result<f64> {
    match value {
        None | Some(Value::Null) => Ok(0.0),
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| AppError::Validation(format!("field {name} is out of range"))),
        Some(Value::String(s)) => s.trim().parse::<f64>().map_err(|_| {
            AppError::Validation(format!("could not convert '{s}' to a number for {name}"))
        }),
        Some(Value::Bool(b)) => Ok(if *b { 1.0 } else { 0.0 }),
        Some(other) => Err(AppError::Validation(format!(
            "field {name} must be numeric, got {other}"
        ))),
    }
}

/// Coerce an integer-flag field. Fractional numbers truncate; fractional
/// strings do not parse.
fn coerce_flag(value: Option<&Value>, name: &str) -> Result<i64> {
    match value {
        None | Some(Value::Null) => Ok(0),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(i) => Ok(i),
            None => n
                .as_f64()
                .map(|f| f.trunc() as i64)
                .ok_or_else(|| AppError::Validation(format!("field {name} is out of range"))),
        },
        Some(Value::String(s)) => s.trim().parse::<i64>().map_err(|_| {
            AppError::Validation(format!("could not convert '{s}' to an integer for {name}"))
        }),
        Some(Value::Bool(b)) => Ok(*b as i64),
        Some(other) => Err(AppError::Validation(format!(
            "field {name} must be numeric, got {other}"
        ))),
    }
}
