use log::*;
use semver::Version;

use crate::{
    ChangesetError, Result, changeset::ChangesetRecord, version::BumpType,
};

/// Next version after `last`.
///
/// An explicit `bump` always wins. Otherwise the records decide: a breaking
/// change is major, a feature minor, anything else patch.
pub fn resolve(
    records: &[ChangesetRecord],
    last: &Version,
    bump: Option<BumpType>,
) -> Result<Version> {
    let bump = match bump {
        Some(bump) => {
            debug!("using requested {bump} bump");
            bump
        }
        None => {
            BumpType::for_records(records).ok_or(ChangesetError::NoChanges)?
        }
    };

    let next = bump.apply(last)?;
    info!("resolved {bump} bump: {last} -> {next}");

    Ok(next)
}
