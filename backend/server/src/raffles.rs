//! # Raffles
//!
//! Create, read, update and delete raffle records.
//!
//! - New ids are the largest numeric id plus one
//! - Updates keep `drawn` and `winner`, and keep the image unless a new one is uploaded
//! - Deleting a raffle also drops its buyer list, in a second write
use ledger::{Raffle, Store, Uploads, uploads::accepted_extension};
use tracing::info;

use crate::{
    error::AppError,
    forms::{ImageUpload, RaffleFields},
};

pub fn list(store: &dyn Store) -> Result<Vec<Raffle>, AppError> {
    Ok(store.load_raffles()?.raffles)
}

pub fn get(store: &dyn Store, id: &str) -> Result<Raffle, AppError> {
    store
        .load_raffles()?
        .find(id)
        .cloned()
        .ok_or_else(|| AppError::NotFound("Raffle not found".to_string()))
}

pub fn create(
    store: &dyn Store,
    uploads: &Uploads,
    fields: RaffleFields,
) -> Result<Raffle, AppError> {
    let mut document = store.load_raffles()?;
    let id = document.next_id();

    let (image, thumbnail) = match &fields.image {
        Some(upload) => store_image(uploads, &id, upload)?.unzip(),
        None => (None, None),
    };

    let raffle = Raffle {
        id,
        name: fields.name,
        draw_date: fields.draw_date,
        prize: fields.prize,
        ticket_cost: fields.ticket_cost,
        payment_link: fields.payment_link,
        drawn: false,
        winner: None,
        image,
        thumbnail: thumbnail.flatten(),
        banking_details: fields.banking_details,
    };

    document.raffles.push(raffle.clone());
    store.save_raffles(&document)?;

    info!("Raffle created: {} ({})", raffle.id, raffle.name);
    Ok(raffle)
}

pub fn update(
    store: &dyn Store,
    uploads: &Uploads,
    id: &str,
    fields: RaffleFields,
) -> Result<Raffle, AppError> {
    let mut document = store.load_raffles()?;
    let existing = document
        .find_mut(id)
        .ok_or_else(|| AppError::NotFound("Raffle not found".to_string()))?;

    let mut image = existing.image.clone();
    let mut thumbnail = existing.thumbnail.clone();

    // the new files are written before the old ones go, and only differing names are removed
    let stored = match &fields.image {
        Some(upload) => store_image(uploads, id, upload)?,
        None => None,
    };

    if let Some((new_image, new_thumbnail)) = stored {
        if let Some(old) = image.take().filter(|old| *old != new_image) {
            uploads.remove_image(&old);
        }
        if let Some(old) = thumbnail.take().filter(|old| Some(old) != new_thumbnail.as_ref()) {
            uploads.remove_thumbnail(&old);
        }

        image = Some(new_image);
        thumbnail = new_thumbnail;
    }

    *existing = Raffle {
        id: existing.id.clone(),
        name: fields.name,
        draw_date: fields.draw_date,
        prize: fields.prize,
        ticket_cost: fields.ticket_cost,
        payment_link: fields.payment_link,
        drawn: existing.drawn,
        winner: existing.winner.take(),
        thumbnail: image.as_ref().and(thumbnail),
        image,
        banking_details: fields.banking_details,
    };

    let updated = existing.clone();
    store.save_raffles(&document)?;

    info!("Raffle updated: {} ({})", updated.id, updated.name);
    Ok(updated)
}

/// Unknown ids succeed without touching anything.
pub fn delete(store: &dyn Store, id: &str) -> Result<(), AppError> {
    let mut document = store.load_raffles()?;
    if document.remove(id) {
        store.save_raffles(&document)?;
    }

    let mut buyers = store.load_buyers()?;
    if buyers.remove(id).is_some() {
        store.save_buyers(&buyers)?;
    }

    info!("Raffle deleted: {id}");
    Ok(())
}

/// Saves an accepted upload and its thumbnail. Unaccepted files are ignored.
fn store_image(
    uploads: &Uploads,
    raffle_id: &str,
    upload: &ImageUpload,
) -> Result<Option<(String, Option<String>)>, AppError> {
    let Some(extension) = accepted_extension(&upload.file_name) else {
        info!("Ignoring upload {:?} for raffle {raffle_id}", upload.file_name);
        return Ok(None);
    };

    let image = uploads.save_image(raffle_id, &extension, &upload.bytes)?;
    let thumbnail = uploads.create_thumbnail(raffle_id, &image);

    Ok(Some((image, thumbnail)))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use axum::body::Bytes;
    use image::{ImageFormat, Rgb, RgbImage};
    use ledger::{MemoryStore, models::Buyer};
    use tempfile::tempdir;

    use super::*;

    fn fields(name: &str) -> RaffleFields {
        RaffleFields {
            name: name.to_string(),
            draw_date: "2025-01-01".to_string(),
            prize: "TV".to_string(),
            ticket_cost: 50.0,
            payment_link: "http://pay".to_string(),
            banking_details: None,
            image: None,
        }
    }

    fn png_upload(file_name: &str) -> ImageUpload {
        let mut bytes = Vec::new();
        RgbImage::from_pixel(8, 8, Rgb([200, 0, 0]))
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();

        ImageUpload {
            file_name: file_name.to_string(),
            bytes: Bytes::from(bytes),
        }
    }

    #[test]
    fn test_ids_increment() {
        let dir = tempdir().unwrap();
        let uploads = Uploads::new(dir.path());
        let store = MemoryStore::new();

        let first = create(&store, &uploads, fields("A")).unwrap();
        let second = create(&store, &uploads, fields("B")).unwrap();

        assert_eq!(first.id, "1");
        assert_eq!(second.id, "2");
        assert!(!first.drawn);
        assert_eq!(first.winner, None);

        delete(&store, "2").unwrap();
        assert_eq!(create(&store, &uploads, fields("C")).unwrap().id, "2");
    }

    #[test]
    fn test_update_keeps_draw_result_and_image() {
        let dir = tempdir().unwrap();
        let uploads = Uploads::new(dir.path());
        let store = MemoryStore::new();

        let mut with_image = fields("A");
        with_image.image = Some(png_upload("photo.png"));
        let raffle = create(&store, &uploads, with_image).unwrap();
        assert_eq!(raffle.image.as_deref(), Some("raffle_1.png"));
        assert_eq!(raffle.thumbnail.as_deref(), Some("raffle_1_thumb.jpg"));

        let mut document = store.load_raffles().unwrap();
        let stored = document.find_mut("1").unwrap();
        stored.drawn = true;
        stored.winner = Some("Winner: Ticket #123456 - Ann Lee".to_string());
        store.save_raffles(&document).unwrap();

        let updated = update(&store, &uploads, "1", fields("Renamed")).unwrap();

        assert_eq!(updated.name, "Renamed");
        assert!(updated.drawn);
        assert_eq!(updated.winner.as_deref(), Some("Winner: Ticket #123456 - Ann Lee"));
        assert_eq!(updated.image.as_deref(), Some("raffle_1.png"));
        assert_eq!(updated.thumbnail.as_deref(), Some("raffle_1_thumb.jpg"));
    }

    #[test]
    fn test_update_replaces_image_files() {
        let dir = tempdir().unwrap();
        let uploads = Uploads::new(dir.path());
        let store = MemoryStore::new();

        let mut with_image = fields("A");
        with_image.image = Some(png_upload("photo.png"));
        create(&store, &uploads, with_image).unwrap();

        let mut replacement = fields("A");
        replacement.image = Some(png_upload("poster.JPG"));

        let updated = update(&store, &uploads, "1", replacement).unwrap();

        assert_eq!(updated.image.as_deref(), Some("raffle_1.jpg"));
        assert_eq!(updated.thumbnail.as_deref(), Some("raffle_1_thumb.jpg"));
        assert!(!uploads.image_path("raffle_1.png").exists());
        assert!(uploads.image_path("raffle_1.jpg").exists());
        assert!(uploads.thumbnail_path("raffle_1_thumb.jpg").exists());
    }

    #[test]
    fn test_failed_image_write_keeps_old_files() {
        let dir = tempdir().unwrap();
        let uploads = Uploads::new(dir.path());
        let store = MemoryStore::new();

        let mut with_image = fields("A");
        with_image.image = Some(png_upload("photo.png"));
        create(&store, &uploads, with_image).unwrap();

        // a directory in the way makes the new image unwritable
        std::fs::create_dir_all(uploads.image_path("raffle_1.gif")).unwrap();

        let mut replacement = fields("B");
        replacement.image = Some(png_upload("banner.gif"));
        assert!(update(&store, &uploads, "1", replacement).is_err());

        let stored = get(&store, "1").unwrap();
        assert_eq!(stored.name, "A");
        assert_eq!(stored.image.as_deref(), Some("raffle_1.png"));
        assert!(uploads.image_path("raffle_1.png").exists());
        assert!(uploads.thumbnail_path("raffle_1_thumb.jpg").exists());
    }

    #[test]
    fn test_same_name_replacement_keeps_files() {
        let dir = tempdir().unwrap();
        let uploads = Uploads::new(dir.path());
        let store = MemoryStore::new();

        let mut with_image = fields("A");
        with_image.image = Some(png_upload("photo.png"));
        create(&store, &uploads, with_image).unwrap();

        let mut replacement = fields("A");
        replacement.image = Some(png_upload("other.PNG"));
        let updated = update(&store, &uploads, "1", replacement).unwrap();

        assert_eq!(updated.image.as_deref(), Some("raffle_1.png"));
        assert!(uploads.image_path("raffle_1.png").exists());
        assert!(uploads.thumbnail_path("raffle_1_thumb.jpg").exists());
    }

    #[test]
    fn test_update_unknown_raffle() {
        let dir = tempdir().unwrap();
        let store = MemoryStore::new();

        let err = update(&store, &Uploads::new(dir.path()), "7", fields("A")).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_rejected_extension_is_ignored() {
        let dir = tempdir().unwrap();
        let uploads = Uploads::new(dir.path());
        let store = MemoryStore::new();

        let mut with_text = fields("A");
        with_text.image = Some(png_upload("notes.txt"));
        let raffle = create(&store, &uploads, with_text).unwrap();

        assert_eq!(raffle.image, None);
        assert_eq!(raffle.thumbnail, None);
    }

    #[test]
    fn test_delete_cascades_to_buyers() {
        let dir = tempdir().unwrap();
        let uploads = Uploads::new(dir.path());
        let store = MemoryStore::new();
        create(&store, &uploads, fields("A")).unwrap();

        let mut buyers = store.load_buyers().unwrap();
        buyers.insert(
            "1".to_string(),
            vec![Buyer {
                buyer_number: 1,
                name: "Ann".to_string(),
                surname: "Lee".to_string(),
                email: "ann@example.com".to_string(),
                mobile: String::new(),
                tickets: 1,
                ticket_numbers: vec![100001],
                payment_received: false,
                purchase_date: None,
            }],
        );
        store.save_buyers(&buyers).unwrap();

        delete(&store, "1").unwrap();

        assert!(list(&store).unwrap().is_empty());
        assert!(!store.load_buyers().unwrap().contains_key("1"));

        delete(&store, "1").unwrap();
    }
}
