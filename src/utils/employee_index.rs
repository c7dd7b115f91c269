//! In-memory index of taken employee emails and ids.
//!
//! Lookups go cuckoo filter (fast negative), then moka cache (fast
//! positive), then the database.

use anyhow::{Context, Result};
use autoscale_cuckoo_filter::CuckooFilter;
use futures_util::StreamExt;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::sync::RwLock;
use std::time::Duration;

const FILTER_CAPACITY: usize = 100_000;
const FALSE_POSITIVE_RATE: f64 = 0.001;

static TAKEN_FILTER: Lazy<RwLock<CuckooFilter<String>>> =
    Lazy::new(|| RwLock::new(CuckooFilter::new(FILTER_CAPACITY, FALSE_POSITIVE_RATE)));

static TAKEN_CACHE: Lazy<Cache<String, bool>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(500_000)
        .time_to_live(Duration::from_secs(86400))
        .build()
});

/// A unique employee attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKey<'a> {
    Email(&'a str),
    EmpId(&'a str),
}

impl IndexKey<'_> {
    fn entry(&self) -> String {
        match self {
            IndexKey::Email(email) => format!("email:{}", email.trim().to_lowercase()),
            IndexKey::EmpId(id) => format!("emp:{}", id.trim()),
        }
    }

    fn exists_sql(&self) -> &'static str {
        match self {
            IndexKey::Email(_) => "SELECT EXISTS(SELECT 1 FROM employees WHERE email = ? LIMIT 1)",
            IndexKey::EmpId(_) => "SELECT EXISTS(SELECT 1 FROM employees WHERE emp_id = ? LIMIT 1)",
        }
    }

    fn value(&self) -> String {
        match self {
            IndexKey::Email(email) => email.trim().to_lowercase(),
            IndexKey::EmpId(id) => id.trim().to_string(),
        }
    }
}

/// `false` means definitely free; `true` may be a false positive.
pub fn might_exist(key: IndexKey<'_>) -> bool {
    TAKEN_FILTER
        .read()
        .map(|filter| filter.contains(&key.entry()))
        .unwrap_or(true)
}

pub async fn is_cached_taken(key: IndexKey<'_>) -> bool {
    TAKEN_CACHE.get(&key.entry()).await.unwrap_or(false)
}

pub async fn mark_taken(key: IndexKey<'_>) {
    let entry = key.entry();
    if let Ok(mut filter) = TAKEN_FILTER.write() {
        if !filter.contains(&entry) {
            filter.add(&entry);
        }
    }
    TAKEN_CACHE.insert(entry, true).await;
}

/// Drops `key` after its employee is deleted or changes the value.
pub async fn forget(key: IndexKey<'_>) {
    let entry = key.entry();
    if let Ok(mut filter) = TAKEN_FILTER.write() {
        filter.remove(&entry);
    }
    TAKEN_CACHE.invalidate(&entry).await;
}

/// true => taken
pub async fn is_taken(pool: &MySqlPool, key: IndexKey<'_>) -> Result<bool, sqlx::Error> {
    if !might_exist(key) {
        return Ok(false);
    }

    if is_cached_taken(key).await {
        return Ok(true);
    }

    let exists = sqlx::query_scalar::<_, bool>(key.exists_sql())
        .bind(key.value())
        .fetch_one(pool)
        .await?;

    if exists {
        mark_taken(key).await;
    }

    Ok(exists)
}

/// Streams every employee into the index in batches.
pub async fn warmup_employee_index(pool: &MySqlPool, batch_size: usize) -> Result<()> {
    let mut stream =
        sqlx::query_as::<_, (String, String)>("SELECT email, emp_id FROM employees").fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total = 0usize;

    while let Some(row) = stream.next().await {
        let (email, emp_id) = row.context("Employee index row fetch failed")?;
        batch.push((email, emp_id));
        total += 1;

        if batch.len() >= batch_size {
            insert_batch(&batch).await;
            batch.clear();
        }
    }

    if !batch.is_empty() {
        insert_batch(&batch).await;
    }

    tracing::info!(total, "Employee index warmup complete");
    Ok(())
}

async fn insert_batch(rows: &[(String, String)]) {
    let inserts = rows.iter().flat_map(|(email, emp_id)| {
        [
            mark_taken(IndexKey::Email(email)),
            mark_taken(IndexKey::EmpId(emp_id)),
        ]
    });
    futures::future::join_all(inserts).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_namespaced_and_normalised() {
        assert_eq!(IndexKey::Email(" Ann@Pal.Tech ").entry(), "email:ann@pal.tech");
        assert_eq!(IndexKey::EmpId(" PT-1 ").entry(), "emp:PT-1");
        assert_ne!(IndexKey::Email("x").entry(), IndexKey::EmpId("x").entry());
    }

    #[actix_web::test]
    async fn marked_keys_are_found_until_forgotten() {
        let key = IndexKey::Email("index-test@pal.tech");
        assert!(!is_cached_taken(key).await);

        mark_taken(key).await;
        assert!(might_exist(key));
        assert!(is_cached_taken(key).await);
        assert!(!is_cached_taken(IndexKey::EmpId("index-test@pal.tech")).await);

        forget(key).await;
        assert!(!is_cached_taken(key).await);
    }
}
