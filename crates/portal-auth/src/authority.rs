use portal_db::GrantRepo;
use portal_types::authority::Authority;
use portal_types::{AuthError, Result};
use tracing::warn;

/// Fails closed: a missing grant is level 0 and a failed lookup is
/// `Forbidden`, never silently allowed.
pub fn require_authority(grants: &GrantRepo<'_>, account_id: i64, min: Authority) -> Result<()> {
    let level = match grants.authority_level(account_id) {
        Ok(level) => level,
        Err(e) => {
            warn!(account_id, "authority lookup failed, denying: {e}");
            return Err(AuthError::Forbidden.into());
        }
    };

    if Authority::from_level(level).can_access(min) {
        Ok(())
    } else {
        Err(AuthError::Forbidden.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_db::Stores;
    use portal_types::Error;

    #[test]
    fn no_grant_is_denied_for_any_min_level() {
        let stores = Stores::open_in_memory().unwrap();
        let err = require_authority(&stores.grants(), 42, Authority::Player).unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::Forbidden)));
    }

    #[test]
    fn grant_at_or_above_min_level_passes() {
        let stores = Stores::open_in_memory().unwrap();
        stores.grants().upsert(7, Authority::God.level()).unwrap();

        require_authority(&stores.grants(), 7, Authority::God).unwrap();
        require_authority(&stores.grants(), 7, Authority::LowWizard).unwrap();

        let err = require_authority(&stores.grants(), 7, Authority::Implementor).unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::Forbidden)));
    }

    #[test]
    fn no_grant_passes_level_zero_checks() {
        let stores = Stores::open_in_memory().unwrap();
        require_authority(&stores.grants(), 42, Authority::Playable).unwrap();
    }
}
