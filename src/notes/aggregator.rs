//! Selects, deduplicates, groups and orders changeset records into
//! [`ReleaseNotes`].
use log::*;
use std::{
    collections::{BTreeMap, BTreeSet, btree_map::Entry},
    fmt::Display,
};

use crate::{
    Result,
    changeset::{ChangesetRecord, ChangesetStore},
    classifier::ChangeType,
    config::Config,
    notes::{NotesEntry, NotesSection, ReleaseNotes},
};

/// What release notes are being generated for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggregateTarget {
    /// A tracked branch such as `develop` or `main`.
    Branch(String),
    /// A milestone name, with or without the milestone branch prefix.
    Milestone(String),
}

impl Display for AggregateTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AggregateTarget::Branch(branch) => f.write_str(branch),
            AggregateTarget::Milestone(name) => write!(f, "milestone {name}"),
        }
    }
}

/// Records selected for a target together with their rendered notes.
#[derive(Debug, Clone)]
pub struct Aggregation {
    pub target: AggregateTarget,
    pub records: Vec<ChangesetRecord>,
    pub notes: ReleaseNotes,
}

/// Builds release notes from the changeset store.
pub struct Aggregator<'c> {
    config: &'c Config,
}

impl<'c> Aggregator<'c> {
    pub fn new(config: &'c Config) -> Self {
        Self { config }
    }

    /// Read the store and aggregate every record relevant to `target`.
    pub fn aggregate(
        &self,
        store: &ChangesetStore,
        target: &AggregateTarget,
    ) -> Result<Aggregation> {
        let records = self.select(store.load()?, target);

        info!(
            "aggregating {} changesets for {}",
            records.len(),
            target
        );

        let notes = self.build_notes(&records);

        Ok(Aggregation {
            target: target.clone(),
            records,
            notes,
        })
    }

    /// Keep the records belonging to `target`, one per PR, ordered by PR
    /// number.
    pub fn select(
        &self,
        records: Vec<ChangesetRecord>,
        target: &AggregateTarget,
    ) -> Vec<ChangesetRecord> {
        let preferred = self.preferred_branch(target);
        let mut by_pr: BTreeMap<u64, ChangesetRecord> = BTreeMap::new();

        for record in self.included(records, target) {
            match by_pr.entry(record.pr_number) {
                Entry::Vacant(slot) => {
                    slot.insert(record);
                }
                Entry::Occupied(mut slot) => {
                    debug!(
                        "PR #{} has changesets for {} and {}",
                        record.pr_number,
                        slot.get().target_branch,
                        record.target_branch
                    );
                    if outranks(&record, slot.get(), &preferred) {
                        slot.insert(record);
                    }
                }
            }
        }

        by_pr.into_values().collect()
    }

    /// Every record belonging to `target`, duplicates included.
    ///
    /// `develop` and `main` only pick up milestone records once the milestone
    /// itself has been merged along their promotion path, which is known from
    /// a promotion path record whose source branch is the milestone branch.
    pub fn included(
        &self,
        records: Vec<ChangesetRecord>,
        target: &AggregateTarget,
    ) -> Vec<ChangesetRecord> {
        let merged = self.merged_milestones(&records, target);
        if !merged.is_empty() {
            debug!("merged milestones for {target}: {merged:?}");
        }

        records
            .into_iter()
            .filter(|r| self.matches(r, target, &merged))
            .collect()
    }

    /// Group already selected records into ordered sections.
    pub fn build_notes(&self, records: &[ChangesetRecord]) -> ReleaseNotes {
        let mut groups: BTreeMap<ChangeType, Vec<&ChangesetRecord>> =
            BTreeMap::new();

        for record in records.iter() {
            let category = if record.is_breaking {
                ChangeType::Breaking
            } else {
                record.change_type
            };
            groups.entry(category).or_default().push(record);
        }

        let sections = groups
            .into_iter()
            .map(|(category, mut records)| {
                records.sort_by(|a, b| {
                    a.pr_number
                        .cmp(&b.pr_number)
                        .then_with(|| a.id().cmp(&b.id()))
                });

                let entries = records
                    .into_iter()
                    .map(|r| NotesEntry {
                        pr_number: r.pr_number,
                        text: r.entry(),
                        details: if category == ChangeType::Breaking {
                            r.breaking_details()
                        } else {
                            vec![]
                        },
                    })
                    .collect();

                NotesSection { category, entries }
            })
            .collect();

        ReleaseNotes {
            sections,
            placeholder: self.config.placeholder.clone(),
        }
    }

    fn matches(
        &self,
        record: &ChangesetRecord,
        target: &AggregateTarget,
        merged: &BTreeSet<String>,
    ) -> bool {
        let branch = record.target_branch.as_str();

        match target {
            AggregateTarget::Branch(name) => match self.promotion_path(name) {
                Some(path) => path.contains(&branch) || merged.contains(branch),
                None => branch == name,
            },
            AggregateTarget::Milestone(name) => {
                branch == name || branch == self.config.milestone_branch(name)
            }
        }
    }

    /// Branches whose records flow into `branch`: `develop` for itself and
    /// `develop` plus `main` for `main`.
    fn promotion_path(&self, branch: &str) -> Option<Vec<&'c str>> {
        let config: &'c Config = self.config;
        let develop = config.develop_branch.as_str();
        let main = config.main_branch.as_str();

        if branch == main {
            Some(vec![develop, main])
        } else if branch == develop {
            Some(vec![develop])
        } else {
            None
        }
    }

    /// Milestone branches merged into the promotion path of `target`.
    fn merged_milestones(
        &self,
        records: &[ChangesetRecord],
        target: &AggregateTarget,
    ) -> BTreeSet<String> {
        let AggregateTarget::Branch(name) = target else {
            return BTreeSet::new();
        };
        let Some(path) = self.promotion_path(name) else {
            return BTreeSet::new();
        };

        records
            .iter()
            .filter(|r| path.contains(&r.target_branch.as_str()))
            .filter(|r| self.config.is_milestone_branch(&r.source_branch))
            .map(|r| r.source_branch.clone())
            .collect()
    }

    fn preferred_branch(&self, target: &AggregateTarget) -> String {
        match target {
            AggregateTarget::Branch(name) => name.clone(),
            AggregateTarget::Milestone(name) => {
                self.config.milestone_branch(name)
            }
        }
    }
}

/// Whether `candidate` should replace `current` for the same PR.
fn outranks(
    candidate: &ChangesetRecord,
    current: &ChangesetRecord,
    preferred: &str,
) -> bool {
    let candidate_preferred = candidate.target_branch == preferred;
    let current_preferred = current.target_branch == preferred;

    if candidate_preferred != current_preferred {
        return candidate_preferred;
    }

    (candidate.created_at, candidate.id()) > (current.created_at, current.id())
}

#[cfg(test)]
#[path = "./aggregator_tests.rs"]
mod tests;
