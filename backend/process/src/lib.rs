//! # Thumbnail Regeneration
//!
//! Raffles created before thumbnails existed, or whose thumbnail step failed, only carry an
//! `image`. This walks the raffle file and fills in the missing thumbnails.
//!
//! ## Per raffle
//! 1. No `image`: skipped.
//! 2. Already has a `thumbnail`: skipped.
//! 3. Otherwise it counts as processed. If the image file is gone it is reported and left alone.
//! 4. The thumbnail is rendered into `uploads/thumbnails` and recorded on the raffle.
//!
//! The raffle file is only written back when at least one thumbnail was created.
use indicatif::{ProgressBar, ProgressStyle};
use ledger::{Store, Uploads};
use tracing::{info, warn};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub processed: usize,
    pub created: usize,
    pub skipped: usize,
}

impl Summary {
    pub fn updated(&self) -> bool {
        self.created > 0
    }
}

pub fn generate_missing_thumbnails(
    store: &dyn Store,
    uploads: &Uploads,
    progress: &ProgressBar,
) -> anyhow::Result<Summary> {
    uploads.ensure_dirs()?;

    let mut document = store.load_raffles()?;
    let mut summary = Summary {
        total: document.raffles.len(),
        ..Summary::default()
    };

    progress.set_length(summary.total as u64);

    for raffle in &mut document.raffles {
        progress.set_message(format!("Raffle #{}", raffle.id));
        progress.inc(1);

        let Some(image) = raffle.image.clone() else {
            info!("Raffle #{} ({}): No image", raffle.id, raffle.name);
            summary.skipped += 1;
            continue;
        };

        if raffle.thumbnail.is_some() {
            info!("Raffle #{} ({}): Already has thumbnail", raffle.id, raffle.name);
            summary.skipped += 1;
            continue;
        }

        summary.processed += 1;

        let image_path = uploads.image_path(&image);
        if !image_path.exists() {
            warn!(
                "Raffle #{} ({}): Image file not found: {}",
                raffle.id,
                raffle.name,
                image_path.display()
            );
            continue;
        }

        match uploads.create_thumbnail(&raffle.id, &image) {
            Some(thumbnail) => {
                raffle.thumbnail = Some(thumbnail);
                summary.created += 1;
            }
            None => warn!("Failed to create thumbnail for raffle #{}", raffle.id),
        }
    }

    if summary.updated() {
        store.save_raffles(&document)?;
        info!("Updated raffle file with thumbnail references");
    }

    progress.finish_with_message("Done");
    Ok(summary)
}

pub fn progress_bar() -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )?
        .progress_chars("=> "),
    );

    Ok(pb)
}

#[cfg(test)]
mod tests {
    use image::{ImageFormat, Rgb, RgbImage};
    use ledger::{MemoryStore, Raffle, RaffleDocument, uploads::thumbnail_name};
    use tempfile::tempdir;

    use super::*;

    fn raffle(id: &str, image: Option<&str>, thumbnail: Option<&str>) -> Raffle {
        Raffle {
            id: id.to_string(),
            name: format!("Raffle {id}"),
            draw_date: "2025-01-01".to_string(),
            prize: "TV".to_string(),
            ticket_cost: 10.0,
            payment_link: "http://pay".to_string(),
            drawn: false,
            winner: None,
            image: image.map(str::to_string),
            thumbnail: thumbnail.map(str::to_string),
            banking_details: None,
        }
    }

    fn store(raffles: Vec<Raffle>) -> MemoryStore {
        MemoryStore::with_documents(
            RaffleDocument {
                raffles,
                current_raffle: None,
            },
            Default::default(),
        )
    }

    #[test]
    fn test_fills_missing_thumbnails() {
        let dir = tempdir().unwrap();
        let uploads = Uploads::new(dir.path());
        uploads.ensure_dirs().unwrap();

        RgbImage::from_pixel(640, 480, Rgb([200, 10, 10]))
            .save_with_format(uploads.image_path("raffle_2.png"), ImageFormat::Png)
            .unwrap();

        let store = store(vec![
            raffle("1", None, None),
            raffle("2", Some("raffle_2.png"), None),
            raffle("3", Some("raffle_3.png"), Some("raffle_3_thumb.jpg")),
            raffle("4", Some("raffle_4.png"), None),
        ]);

        let summary =
            generate_missing_thumbnails(&store, &uploads, &ProgressBar::hidden()).unwrap();

        assert_eq!(
            summary,
            Summary {
                total: 4,
                processed: 2,
                created: 1,
                skipped: 2,
            }
        );

        let saved = store.load_raffles().unwrap();
        assert_eq!(
            saved.find("2").unwrap().thumbnail.as_deref(),
            Some(thumbnail_name("2").as_str())
        );
        assert_eq!(saved.find("4").unwrap().thumbnail, None);
        assert!(uploads.thumbnail_path(&thumbnail_name("2")).exists());

        let thumbnail = image::open(uploads.thumbnail_path(&thumbnail_name("2"))).unwrap();
        assert!(thumbnail.width() <= 300 && thumbnail.height() <= 300);
    }

    #[test]
    fn test_nothing_to_do_leaves_file_alone() {
        let dir = tempdir().unwrap();
        let uploads = Uploads::new(dir.path());

        let store = store(vec![raffle("1", None, None)]);
        let summary =
            generate_missing_thumbnails(&store, &uploads, &ProgressBar::hidden()).unwrap();

        assert!(!summary.updated());
        assert_eq!(summary.skipped, 1);
        assert!(dir.path().join("thumbnails").is_dir());
    }
}
