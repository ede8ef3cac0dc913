//! Kata reference library: static Shotokan catalogue, PDF links and progress.

use crate::api::Backend;
use crate::error::{Outcome, Result};
use crate::types::{Kata, KataPractice, KataProgress};

/// Shotokan kata with their PDF sheet numbering.
pub const SHOTOKAN_KATA: [(u32, &str, &str); 30] = [
    (1, "Taikyoku Shodan", "White"),
    (2, "Heian Shodan", "White"),
    (3, "Heian Nidan", "Yellow"),
    (4, "Heian Sandan", "Orange"),
    (5, "Heian Yondan", "Green"),
    (6, "Heian Godan", "Purple"),
    (7, "Tekki Shodan", "Brown"),
    (8, "Tekki Nidan", "Black"),
    (9, "Tekki Sandan", "Black"),
    (10, "Bassai Dai", "Brown"),
    (11, "Bassai Sho", "Black"),
    (12, "Kanku Dai", "Brown"),
    (13, "Kanku Sho", "Black"),
    (14, "Empi", "Brown"),
    (15, "Jion", "Brown"),
    (16, "Jiin", "Black"),
    (17, "Jitte", "Black"),
    (18, "Hangetsu", "Black"),
    (19, "Gankaku", "Black"),
    (20, "Chinte", "Black"),
    (21, "Nijushiho", "Black"),
    (22, "Sochin", "Black"),
    (23, "Meikyo", "Black"),
    (24, "Unsu", "Black"),
    (25, "Wankan", "Black"),
    (26, "Gojushiho Dai", "Black"),
    (27, "Gojushiho Sho", "Black"),
    (28, "Taikyoku Nidan", "White"),
    (29, "Taikyoku Sandan", "White"),
    (30, "Ten No Kata", "White"),
];

pub fn kata_name(id: u32) -> Option<&'static str> {
    SHOTOKAN_KATA.iter().find(|(k, _, _)| *k == id).map(|(_, name, _)| *name)
}

/// `/katas/<NN>_<Kata_Name>.pdf` for a known kata id.
pub fn pdf_path(prefix: &str, id: u32) -> Option<String> {
    let name = kata_name(id)?;
    Some(format!("{}/{:02}_{}.pdf", prefix, id, name.replace(' ', "_")))
}

pub fn static_library() -> Vec<Kata> {
    SHOTOKAN_KATA
        .iter()
        .map(|(id, name, belt)| Kata {
            id: *id,
            name: name.to_string(),
            description: String::new(),
            belt: belt.to_string(),
            move_count: 0,
            video_url: None,
        })
        .collect()
}

pub fn search<'a>(katas: &'a [Kata], query: &str) -> Vec<&'a Kata> {
    let query = query.trim().to_lowercase();
    katas
        .iter()
        .filter(|k| query.is_empty() || k.name.to_lowercase().contains(&query))
        .collect()
}

pub fn progress_for(progress: &[KataProgress], kata_id: u32) -> Option<&KataProgress> {
    progress.iter().find(|p| p.kata_id == kata_id)
}

pub async fn fetch_katas<B: Backend>(backend: &B) -> Outcome<Vec<Kata>> {
    Outcome::or_degraded(backend.fetch_katas().await, static_library)
}

pub async fn fetch_kata<B: Backend>(backend: &B, id: u32) -> Outcome<Kata> {
    match backend.fetch_kata(id).await {
        Ok(kata) => Outcome::Live(kata),
        Err(e) => match static_library().into_iter().find(|k| k.id == id) {
            Some(kata) => Outcome::Degraded(kata),
            None => Outcome::Failed(e),
        },
    }
}

pub async fn fetch_progress<B: Backend>(backend: &B, user_id: &str) -> Outcome<Vec<KataProgress>> {
    Outcome::or_degraded(backend.fetch_kata_progress(user_id).await, Vec::new)
}

pub async fn record_practice<B: Backend>(backend: &B, practice: &KataPractice) -> Result<KataProgress> {
    let progress = backend.record_kata_practice(practice).await;
    if let Err(e) = &progress {
        tracing::warn!("kata practice not recorded: {}", e);
    }
    progress
}

/// Replace or insert a progress entry returned by the backend.
pub fn merge_progress(progress: &mut Vec<KataProgress>, update: KataProgress) {
    match progress.iter_mut().find(|p| p.kata_id == update.kata_id) {
        Some(existing) => *existing = update,
        None => progress.push(update),
    }
}
