use crate::model::WorkRequest;

/// Case-sensitive substring match against company, program and creator.
pub fn matches_query(row: &WorkRequest, query: &str) -> bool {
    row.company.contains(query)
        || row.program.contains(query)
        || row.creator.as_deref().is_some_and(|c| c.contains(query))
}
