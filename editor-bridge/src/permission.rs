use std::cell::Cell;

use crate::host::Host;

/// Features the engine gates behind a claim
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim {
    Premium,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Claims {
    pub premium: bool,
}

impl Claims {
    pub fn grants(&self, claim: Claim) -> bool {
        match claim {
            Claim::Premium => self.premium,
        }
    }
}

/// Claims are refreshed from the settings on every render.
#[derive(Debug, Default)]
pub struct PermissionGate {
    claims: Cell<Claims>,
}

impl PermissionGate {
    pub fn update(&self, claims: Claims) {
        self.claims.set(claims);
    }

    pub fn claims(&self) -> Claims {
        self.claims.get()
    }

    /// A denial is reported to the host, which shows its own prompt.
    pub fn check(&self, claim: Claim, host: Option<&dyn Host>) -> bool {
        if self.claims.get().grants(claim) {
            return true;
        }
        tracing::debug!(?claim, "permission denied");
        if let Some(host) = host {
            host.on_permission_denied();
        }
        false
    }
}
