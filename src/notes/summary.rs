//! Machine readable overview of pending changesets.
use serde::Serialize;
use std::collections::BTreeMap;

use crate::{
    Result, changeset::ChangesetRecord, classifier::ChangeType,
    notes::aggregator::AggregateTarget, version::BumpType,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisSummary {
    pub target: String,
    pub total: usize,
    pub categories: BTreeMap<ChangeType, usize>,
    pub breaking: Vec<u64>,
    pub suggested_bump: Option<BumpType>,
}

impl AnalysisSummary {
    pub fn from_records(
        target: &AggregateTarget,
        records: &[ChangesetRecord],
    ) -> Self {
        let mut categories: BTreeMap<ChangeType, usize> = BTreeMap::new();
        let mut breaking = vec![];

        for record in records.iter() {
            let category = if record.is_breaking {
                breaking.push(record.pr_number);
                ChangeType::Breaking
            } else {
                record.change_type
            };
            *categories.entry(category).or_default() += 1;
        }

        breaking.sort_unstable();
        breaking.dedup();

        Self {
            target: target.to_string(),
            total: records.len(),
            categories,
            breaking,
            suggested_bump: BumpType::for_records(records),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
