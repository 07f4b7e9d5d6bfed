use credit_risk_core::ApplicantRecord;
use serde::{Deserialize, Serialize};

/// The prediction form exactly as submitted. Every field is kept as text so
/// a bad value can be echoed back next to its error message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictForm {
    pub age: String,
    pub income: String,
    pub home_ownership: String,
    pub employment_length: String,
    pub loan_intent: String,
    pub loan_grade: String,
    pub loan_amount: String,
    pub interest_rate: String,
    pub default_on_file: String,
    pub loan_percent_income: String,
    pub credit_history_length: String,
}

fn required<'a>(name: &str, value: &'a str) -> Result<&'a str, String> {
    let value = value.trim();
    if value.is_empty() {
        Err(format!("{} is required", name))
    } else {
        Ok(value)
    }
}

fn number(name: &str, value: &str) -> Result<f64, String> {
    let value = required(name, value)?;
    value
        .parse::<f64>()
        .map_err(|_| format!("{} must be a number, got '{}'", name, value))
}

impl PredictForm {
    /// Parse the submitted text into a validated applicant record.
    pub fn to_record(&self) -> Result<ApplicantRecord, String> {
        let age_text = required("age", &self.age)?;
        let age = age_text
            .parse::<u32>()
            .map_err(|_| format!("age must be a whole number, got '{}'", age_text))?;

        let record = ApplicantRecord {
            age,
            income: number("income", &self.income)?,
            home_ownership: required("home_ownership", &self.home_ownership)?.to_string(),
            employment_length: Some(number("employment_length", &self.employment_length)?),
            loan_intent: required("loan_intent", &self.loan_intent)?.to_string(),
            loan_grade: required("loan_grade", &self.loan_grade)?.to_string(),
            loan_amount: number("loan_amount", &self.loan_amount)?,
            interest_rate: Some(number("interest_rate", &self.interest_rate)?),
            default_on_file: required("default_on_file", &self.default_on_file)?.to_string(),
            loan_percent_income: number("loan_percent_income", &self.loan_percent_income)?,
            credit_history_length: number("credit_history_length", &self.credit_history_length)?,
        };
        record.validated().map_err(|e| e.to_string())
    }
}
