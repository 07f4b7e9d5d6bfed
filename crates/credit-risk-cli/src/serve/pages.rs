//! HTML pages rendered with maud.
use credit_risk_core::Decision;
use maud::{html, Markup, PreEscaped, DOCTYPE};

use super::form::PredictForm;

const STYLE: &str = "
body { font-family: sans-serif; max-width: 720px; margin: 2em auto; color: #222; }
nav a { margin-right: 1em; }
label { display: block; margin-top: 0.6em; }
input, select { width: 100%; padding: 4px; }
.error { color: #a00; border: 1px solid #a00; padding: 0.5em; }
.approved { color: #070; }
.declined { color: #a00; }
table { border-collapse: collapse; }
td { border: 1px solid #ccc; padding: 4px 8px; }";

const HOME_OWNERSHIP: [&str; 4] = ["RENT", "OWN", "MORTGAGE", "OTHER"];
const LOAN_INTENT: [&str; 6] = [
    "EDUCATION",
    "MEDICAL",
    "VENTURE",
    "PERSONAL",
    "DEBTCONSOLIDATION",
    "HOMEIMPROVEMENT",
];
const LOAN_GRADE: [&str; 7] = ["A", "B", "C", "D", "E", "F", "G"];
const DEFAULT_ON_FILE: [&str; 2] = ["N", "Y"];

fn layout(title: &str, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { (title) " | Credit Risk" }
                style { (PreEscaped(STYLE)) }
            }
            body {
                nav {
                    a href="/" { "Home" }
                    a href="/predict" { "Predict" }
                    a href="/about" { "About" }
                }
                h1 { (title) }
                (body)
            }
        }
    }
}

fn text_input(name: &str, label: &str, value: &str) -> Markup {
    html! {
        label for=(name) { (label) }
        input type="text" id=(name) name=(name) value=(value) required;
    }
}

fn select_input(name: &str, label: &str, options: &[&str], value: &str) -> Markup {
    html! {
        label for=(name) { (label) }
        select id=(name) name=(name) required {
            option value="" selected[value.is_empty()] { "--" }
            @for opt in options {
                option value=(opt) selected[value.eq_ignore_ascii_case(opt)] { (opt) }
            }
        }
    }
}

pub fn index_page() -> Markup {
    layout(
        "Loan Default Predictor",
        html! {
            p { "Estimate whether a loan application is likely to default." }
            p { a href="/predict" { "Start a prediction" } }
        },
    )
}

pub fn about_page() -> Markup {
    layout(
        "About",
        html! {
            p {
                "Predictions come from a classifier selected by cross-validated F1 across "
                "logistic regression, gradient boosting and decision tree candidates, trained "
                "on SMOTE-balanced data."
            }
            p { "A predicted default declines the application; otherwise it is approved." }
        },
    )
}

pub fn predict_page(form: &PredictForm, error: Option<&str>) -> Markup {
    layout(
        "Applicant Details",
        html! {
            @if let Some(message) = error {
                p class="error" { (message) }
            }
            form method="post" action="/predict" {
                (text_input("age", "Age", &form.age))
                (text_input("income", "Annual income", &form.income))
                (select_input("home_ownership", "Home ownership", &HOME_OWNERSHIP, &form.home_ownership))
                (text_input("employment_length", "Employment length (years)", &form.employment_length))
                (select_input("loan_intent", "Loan intent", &LOAN_INTENT, &form.loan_intent))
                (select_input("loan_grade", "Loan grade", &LOAN_GRADE, &form.loan_grade))
                (text_input("loan_amount", "Loan amount", &form.loan_amount))
                (text_input("interest_rate", "Interest rate (%)", &form.interest_rate))
                (select_input("default_on_file", "Previous default on file", &DEFAULT_ON_FILE, &form.default_on_file))
                (text_input("loan_percent_income", "Loan as fraction of income", &form.loan_percent_income))
                (text_input("credit_history_length", "Credit history length (years)", &form.credit_history_length))
                p { button type="submit" { "Predict" } }
            }
        },
    )
}

pub fn result_page(decision: Decision, form: &PredictForm) -> Markup {
    let rows = [
        ("Age", &form.age),
        ("Annual income", &form.income),
        ("Home ownership", &form.home_ownership),
        ("Employment length", &form.employment_length),
        ("Loan intent", &form.loan_intent),
        ("Loan grade", &form.loan_grade),
        ("Loan amount", &form.loan_amount),
        ("Interest rate", &form.interest_rate),
        ("Previous default on file", &form.default_on_file),
        ("Loan as fraction of income", &form.loan_percent_income),
        ("Credit history length", &form.credit_history_length),
    ];
    layout(
        "Prediction Result",
        html! {
            p class=(decision.to_string()) {
                "The loan application is " strong { (decision.to_string()) } "."
            }
            table {
                @for (label, value) in rows {
                    tr { td { (label) } td { (value) } }
                }
            }
            p { a href="/predict" { "New prediction" } }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serve::form::tests::sample_form;

    #[test]
    fn form_echoes_values_and_errors() {
        let html = predict_page(&sample_form(), Some("artifact not found: x")).into_string();
        assert!(html.contains("artifact not found: x"));
        assert!(html.contains("value=\"50000\""));
        assert!(html.contains("<option value=\"RENT\" selected>"));
    }

    #[test]
    fn submitted_text_is_escaped() {
        let mut form = sample_form();
        form.age = "<script>".into();
        let html = predict_page(&form, None).into_string();
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn result_names_the_decision() {
        let html = result_page(Decision::Declined, &sample_form()).into_string();
        assert!(html.contains("declined"));
        assert!(html.contains("EDUCATION"));
    }
}
