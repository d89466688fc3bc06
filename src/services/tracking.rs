//! Public tracking codes for adoption requests.

use rand::Rng;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter};

use crate::entities::{adoption_request, AdoptionRequest};

pub const CODE_LENGTH: usize = 8;
const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub fn random_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..CODE_LENGTH)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Draws codes until one is not used by any adoption request.
pub async fn generate_unique<C: ConnectionTrait>(db: &C) -> Result<String, DbErr> {
    generate_unique_with(db, || random_code(&mut rand::thread_rng())).await
}

pub async fn generate_unique_with<C, F>(db: &C, mut draw: F) -> Result<String, DbErr>
where
    C: ConnectionTrait,
    F: FnMut() -> String,
{
    loop {
        let code = draw();
        let taken = AdoptionRequest::find()
            .filter(adoption_request::Column::TrackingCode.eq(code.as_str()))
            .count(db)
            .await?
            > 0;
        if !taken {
            return Ok(code);
        }
        tracing::debug!("Tracking code collision, drawing again");
    }
}

/// Codes are stored uppercase; user input is trimmed and uppercased before lookup.
pub fn normalize(raw: &str) -> String {
    raw.trim().to_uppercase()
}

pub async fn find_by_code<C: ConnectionTrait>(
    db: &C,
    raw: &str,
) -> Result<Option<adoption_request::Model>, DbErr> {
    let code = normalize(raw);
    if code.is_empty() {
        return Ok(None);
    }
    AdoptionRequest::find()
        .filter(adoption_request::Column::TrackingCode.eq(code))
        .one(db)
        .await
}
