//! Request payloads and their validation.
use axum::{
    body::Bytes,
    extract::{Multipart, multipart::MultipartError},
};
use ledger::BankingDetails;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::AppError;

pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Bytes,
}

/// Raw multipart fields of a raffle create or update.
#[derive(Default)]
pub struct RaffleForm {
    pub name: Option<String>,
    pub draw_date: Option<String>,
    pub prize: Option<String>,
    pub ticket_cost: Option<String>,
    pub payment_link: Option<String>,
    pub banking_details: Option<String>,
    pub image: Option<ImageUpload>,
}

/// A [`RaffleForm`] with every required field present.
pub struct RaffleFields {
    pub name: String,
    pub draw_date: String,
    pub prize: String,
    pub ticket_cost: f64,
    pub payment_link: String,
    pub banking_details: Option<BankingDetails>,
    pub image: Option<ImageUpload>,
}

fn malformed(e: MultipartError) -> AppError {
    AppError::from_body(e.status(), e.body_text())
}

impl RaffleForm {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(malformed)? {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };

            match name.as_str() {
                "image" => {
                    let file_name = field.file_name().unwrap_or_default().to_owned();
                    let bytes = field.bytes().await.map_err(malformed)?;

                    form.image = Some(ImageUpload { file_name, bytes });
                }
                "name" => form.name = Some(field.text().await.map_err(malformed)?),
                "drawDate" => form.draw_date = Some(field.text().await.map_err(malformed)?),
                "prize" => form.prize = Some(field.text().await.map_err(malformed)?),
                "ticketCost" => form.ticket_cost = Some(field.text().await.map_err(malformed)?),
                "paymentLink" => form.payment_link = Some(field.text().await.map_err(malformed)?),
                "bankingDetails" => {
                    form.banking_details = Some(field.text().await.map_err(malformed)?)
                }
                other => debug!("Ignoring form field {other}"),
            }
        }

        Ok(form)
    }

    pub fn validate(self) -> Result<RaffleFields, AppError> {
        let required = [
            ("name", &self.name),
            ("drawDate", &self.draw_date),
            ("prize", &self.prize),
            ("ticketCost", &self.ticket_cost),
            ("paymentLink", &self.payment_link),
        ];

        let missing: Vec<&'static str> = required
            .iter()
            .filter(|(_, value)| value.as_deref().is_none_or(str::is_empty))
            .map(|(field, _)| *field)
            .collect();

        if !missing.is_empty() {
            return Err(AppError::MissingFields(missing));
        }

        let ticket_cost = parse_ticket_cost(self.ticket_cost.as_deref().unwrap_or_default())?;

        Ok(RaffleFields {
            name: self.name.unwrap_or_default(),
            draw_date: self.draw_date.unwrap_or_default(),
            prize: self.prize.unwrap_or_default(),
            ticket_cost,
            payment_link: self.payment_link.unwrap_or_default(),
            banking_details: parse_banking_details(self.banking_details.as_deref()),
            image: self.image,
        })
    }
}

fn parse_ticket_cost(raw: &str) -> Result<f64, AppError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|cost| cost.is_finite() && *cost >= 0.0)
        .ok_or_else(|| AppError::BadRequest(format!("Invalid ticketCost: {raw}")))
}

/// Malformed or empty details are dropped with a warning instead of failing the request.
pub fn parse_banking_details(raw: Option<&str>) -> Option<BankingDetails> {
    let raw = raw.map(str::trim).filter(|raw| !raw.is_empty())?;

    match serde_json::from_str::<BankingDetails>(raw) {
        Ok(details) if details.is_empty() => None,
        Ok(details) => Some(details),
        Err(e) => {
            warn!("Failed to parse banking details JSON: {e}");
            None
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBuyer {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub surname: String,

    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub mobile: String,

    #[serde(default)]
    pub tickets: u32,

    #[serde(default)]
    pub purchase_date: Option<String>,

    #[serde(default)]
    pub payment_received: bool,
}

impl NewBuyer {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut missing = Vec::new();

        for (field, value) in [
            ("name", &self.name),
            ("surname", &self.surname),
            ("email", &self.email),
        ] {
            if value.trim().is_empty() {
                missing.push(field);
            }
        }

        if self.tickets == 0 {
            missing.push("tickets");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::MissingFields(missing))
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentUpdate {
    pub payment_received: Option<bool>,
}

#[derive(Deserialize)]
pub struct OpenBrowser {
    pub url: Option<String>,
}

pub fn parse_buyer_number(raw: &str) -> Result<u32, AppError> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid buyer number: {raw}")))
}
