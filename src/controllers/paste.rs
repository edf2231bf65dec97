//! The paste lifecycle: create, read with lazy expiry, and sweeping.
//!
//! Every operation takes the current time from the caller.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::models::Paste;
use crate::{App, AppError};

/// Store `content` under a freshly generated id and return the id.
///
/// Id collisions are not retried and surface as a database error.
pub async fn create(app: &App, content: &str, now: DateTime<Utc>) -> crate::AppResult<String> {
    let paste = Paste::new(app.ids.generate(), content.to_owned(), now);

    app.database.insert_paste(&paste).await?;

    info!(
        "new paste: id='{id}', size={size}",
        id = paste.id,
        size = paste.content.len()
    );

    Ok(paste.id)
}

/// Get the content of a paste that has not expired yet.
///
/// Expired pastes are deleted on the way out. A failed delete is only
/// logged; the caller sees `NotFound` either way.
pub async fn fetch(app: &App, id: &str, now: DateTime<Utc>) -> crate::AppResult<String> {
    let paste = app.database.get_paste(id).await?;

    if paste.is_expired(&now) {
        debug!("evicting expired paste: {id}");
        if let Err(err) = app.database.delete_paste(id).await {
            warn!("failed to delete expired paste '{id}': {err:?}");
        }
        return Err(AppError::NotFound);
    }

    Ok(paste.content)
}

/// Delete every paste whose expiry has passed, returning how many went.
pub async fn purge_expired(app: &App, now: DateTime<Utc>) -> crate::AppResult<usize> {
    let expirations = app.database.get_all_expirations().await?;

    let mut count = 0;
    for (id, expires_at) in expirations {
        if now > expires_at {
            app.database.delete_paste(&id).await?;
            count += 1;
        }
    }

    if count > 0 {
        info!("deleted {count} expired pastes");
    }

    Ok(count)
}
