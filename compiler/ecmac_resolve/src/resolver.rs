//! The shared handle `ResolveVariables` carries across a whole source unit:
//! the parsed arena, the scope chain and global table it mutates, and the
//! host runtime's prototype registry (`spec.md` §4.6). Split out from
//! [`crate::context::ResolveContext`], which instead holds the part that
//! resets per function.

use crate::facts::ResolvedFacts;
use crate::globals::GlobalEnvironment;
use ecmac_ir::Arena;
use ecmac_proto::HostRuntime;
use ecmac_scope::ScopeChain;
use std::sync::Arc;

pub struct Resolver<'a, R: HostRuntime> {
    pub(crate) arena: &'a Arena,
    pub(crate) chain: &'a mut ScopeChain,
    pub(crate) globals: &'a mut GlobalEnvironment,
    pub(crate) runtime: &'a mut R,
    pub(crate) facts: &'a mut ResolvedFacts,
    pub(crate) path: Arc<str>,
    pub(crate) source: &'a str,
    pub(crate) collapse_warning: bool,
}

impl<'a, R: HostRuntime> Resolver<'a, R> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        arena: &'a Arena,
        chain: &'a mut ScopeChain,
        globals: &'a mut GlobalEnvironment,
        runtime: &'a mut R,
        facts: &'a mut ResolvedFacts,
        path: Arc<str>,
        source: &'a str,
        collapse_warning: bool,
    ) -> Self {
        Resolver { arena, chain, globals, runtime, facts, path, source, collapse_warning }
    }

    /// A variable or return-type accumulator just widened to the universal
    /// type (`spec.md` §4.7 "Type collapse", §6 `CollapseWarning`): logged
    /// at `warn` when `collapse_warning` asked for visibility without an
    /// `ECMAC_LOG` override, `debug` otherwise.
    pub(crate) fn log_collapse(&self, what: &str, name: ecmac_ir::Name) {
        if self.collapse_warning {
            tracing::warn!(%what, name = name.0, "type collapsed to universal");
        } else {
            tracing::debug!(%what, name = name.0, "type collapsed to universal");
        }
    }

    /// Same as [`Self::log_collapse`], for a function's return-type
    /// accumulator — the one collapse site with no single name to attach.
    pub(crate) fn log_return_collapse(&self) {
        if self.collapse_warning {
            tracing::warn!(path = %self.path, "return type collapsed to universal");
        } else {
            tracing::debug!(path = %self.path, "return type collapsed to universal");
        }
    }
}
