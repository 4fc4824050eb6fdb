use crate::core::shuffle::shuffled;
use crate::domain::model::{Pool, WinnerSet};
use crate::utils::error::{Result, ValidationError};
use rand::Rng;

/// 檢查抽獎條件：池子不可為空，1 <= k <= 池子大小
pub fn validate_selection(pool: &Pool, k: usize) -> Result<()> {
    if pool.is_empty() {
        return Err(ValidationError::EmptyPool.into());
    }
    if k == 0 {
        return Err(ValidationError::WinnerCountTooSmall { requested: k }.into());
    }
    if k > pool.len() {
        return Err(ValidationError::WinnerCountExceedsPool {
            requested: k,
            pool_size: pool.len(),
        }
        .into());
    }
    Ok(())
}

/// Draws `k` distinct winners without replacement. The shuffle order is the
/// winner ranking.
pub fn select_winners<R: Rng + ?Sized>(pool: &Pool, k: usize, rng: &mut R) -> Result<WinnerSet> {
    validate_selection(pool, k)?;

    let mut order = shuffled(pool.entries(), rng);
    order.truncate(k);

    tracing::debug!("Selected {} of {} entries", k, pool.len());
    Ok(WinnerSet(order))
}
