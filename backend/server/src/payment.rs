//! # Payment QR
//!
//! The QR code carries only the raffle's payment link. Amount and reference travel in the text
//! summary next to it:
//!
//! ```text
//! Payment for Prize A
//! Amount: R150.00
//! Reference: RAFFLE-1-3
//! Link: http://pay
//! ```
use std::io::Cursor;

use base64::{Engine, engine::general_purpose::STANDARD};
use image::{GrayImage, ImageFormat, Luma, imageops};
use ledger::{Buyer, Raffle, Store, models::find_buyer};
use qrcode::QrCode;
use serde::Serialize;

use crate::error::AppError;

pub const MODULE_PIXELS: u32 = 10;

pub const BORDER_MODULES: u32 = 5;

#[derive(Serialize, Debug)]
pub struct PaymentQr {
    pub qr_code: String,
    pub payment_info: String,
    pub payment_url: String,
    pub amount: f64,
    pub reference: String,
}

pub fn payment_qr(
    store: &dyn Store,
    raffle_id: &str,
    buyer_number: u32,
) -> Result<PaymentQr, AppError> {
    let buyers = store.load_buyers()?.remove(raffle_id).unwrap_or_default();
    let buyer = find_buyer(&buyers, buyer_number)
        .ok_or_else(|| AppError::NotFound("Buyer not found".to_string()))?;

    let raffles = store.load_raffles()?;
    let raffle = raffles
        .find(raffle_id)
        .ok_or_else(|| AppError::NotFound("Raffle not found".to_string()))?;

    let amount = f64::from(buyer.tickets) * raffle.ticket_cost;
    let reference = reference(raffle, buyer);

    Ok(PaymentQr {
        qr_code: STANDARD.encode(render_png(&raffle.payment_link)?),
        payment_info: summary(raffle, amount, &reference),
        payment_url: raffle.payment_link.clone(),
        amount,
        reference,
    })
}

pub fn reference(raffle: &Raffle, buyer: &Buyer) -> String {
    format!("RAFFLE-{}-{}", raffle.id, buyer.buyer_number)
}

pub fn summary(raffle: &Raffle, amount: f64, reference: &str) -> String {
    format!(
        "Payment for {}\nAmount: R{amount:.2}\nReference: {reference}\nLink: {}",
        raffle.name, raffle.payment_link
    )
}

/// Black-on-white PNG of `data` with a [`BORDER_MODULES`] wide quiet zone.
pub fn render_png(data: &str) -> Result<Vec<u8>, AppError> {
    let code = QrCode::new(data.as_bytes())?;
    let modules = code
        .render::<Luma<u8>>()
        .quiet_zone(false)
        .module_dimensions(MODULE_PIXELS, MODULE_PIXELS)
        .dark_color(Luma([0]))
        .light_color(Luma([255]))
        .build();

    let border = BORDER_MODULES * MODULE_PIXELS;
    let mut canvas = GrayImage::from_pixel(
        modules.width() + 2 * border,
        modules.height() + 2 * border,
        Luma([255]),
    );
    imageops::overlay(&mut canvas, &modules, i64::from(border), i64::from(border));

    let mut bytes = Vec::new();
    canvas.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use image::GenericImageView;
    use ledger::{BuyerDocument, MemoryStore, RaffleDocument};

    use super::*;

    fn store() -> MemoryStore {
        let raffle = Raffle {
            id: "1".to_string(),
            name: "Prize A".to_string(),
            draw_date: "2025-01-01".to_string(),
            prize: "TV".to_string(),
            ticket_cost: 50.0,
            payment_link: "http://pay".to_string(),
            drawn: false,
            winner: None,
            image: None,
            thumbnail: None,
            banking_details: None,
        };

        let buyer = Buyer {
            buyer_number: 3,
            name: "Ann".to_string(),
            surname: "Lee".to_string(),
            email: "ann@example.com".to_string(),
            mobile: String::new(),
            tickets: 3,
            ticket_numbers: vec![100001, 100002, 100003],
            payment_received: false,
            purchase_date: None,
        };

        let mut buyers = BuyerDocument::new();
        buyers.insert("1".to_string(), vec![buyer]);

        MemoryStore::with_documents(
            RaffleDocument {
                raffles: vec![raffle],
                current_raffle: None,
            },
            buyers,
        )
    }

    #[test]
    fn test_summary_and_reference() {
        let qr = payment_qr(&store(), "1", 3).unwrap();

        assert_eq!(qr.amount, 150.0);
        assert_eq!(qr.reference, "RAFFLE-1-3");
        assert_eq!(qr.payment_url, "http://pay");
        assert_eq!(
            qr.payment_info,
            "Payment for Prize A\nAmount: R150.00\nReference: RAFFLE-1-3\nLink: http://pay"
        );
    }

    #[test]
    fn test_qr_is_png_with_border() {
        let qr = payment_qr(&store(), "1", 3).unwrap();
        let png = STANDARD.decode(qr.qr_code).unwrap();
        let decoded = image::load_from_memory_with_format(&png, ImageFormat::Png).unwrap();

        let (width, height) = decoded.dimensions();
        assert_eq!(width, height);
        // version 1 is 21 modules wide
        assert_eq!(width, (21 + 2 * BORDER_MODULES) * MODULE_PIXELS);
        assert_eq!(decoded.to_luma8().get_pixel(0, 0).0, [255]);
    }

    #[test]
    fn test_missing_buyer_then_raffle() {
        let store = store();

        match payment_qr(&store, "1", 9) {
            Err(AppError::NotFound(message)) => assert_eq!(message, "Buyer not found"),
            other => panic!("unexpected {other:?}"),
        }

        let mut raffles = store.load_raffles().unwrap();
        raffles.raffles.clear();
        store.save_raffles(&raffles).unwrap();

        match payment_qr(&store, "1", 3) {
            Err(AppError::NotFound(message)) => assert_eq!(message, "Raffle not found"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
