use serde::Serialize;

pub(crate) const MAX_LIMIT: i64 = 1000;

pub(crate) const fn default_limit() -> i64 {
    100
}

/// Clamps raw `skip`/`limit` query values to what the repositories apply.
pub(crate) fn normalize(skip: i64, limit: i64) -> (i64, i64) {
    (skip.max(0), limit.clamp(1, MAX_LIMIT))
}

#[derive(Debug, Serialize)]
pub(crate) struct PaginatedResponse<T> {
    pub(crate) items: Vec<T>,
    pub(crate) total_count: i64,
    pub(crate) skip: i64,
    pub(crate) limit: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_clamps_bounds() {
        assert_eq!(normalize(-5, 0), (0, 1));
        assert_eq!(normalize(20, 5000), (20, MAX_LIMIT));
        assert_eq!(normalize(0, default_limit()), (0, 100));
    }
}
